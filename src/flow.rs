//! Maximum flow solvers and minimum cut extraction.
//!
//! Both solvers work on the residual arcs of a [`FlowNetwork`] in place and are interchangeable:
//! pick one through [`Algorithm`] or use the [`MaxFlow`] implementations directly.
//!
//! ```
//! use flow_cut::FlowNetwork;
//!
//! let mut network = FlowNetwork::from_forward_edges(
//!     4,
//!     [(0, 1, 10.0), (1, 2, 5.0), (2, 1, 7.0), (2, 3, 10.0)],
//! ).unwrap();
//! let max_flow = network.solve_push_relabel(0, 3).unwrap();
//! assert!((max_flow - 5.0).abs() < 1e-9);
//!
//! let cut = network.min_cut().unwrap();
//! assert!((cut.capacity - max_flow).abs() < 1e-9);
//! ```

mod augmenting_path;
mod min_cut;
mod push_relabel;

use std::collections::BTreeSet;

pub use augmenting_path::AugmentingPath;
pub use min_cut::MinCut;
pub use push_relabel::PushRelabel;

use crate::error::{FlowError, FlowResult};
use crate::network::FlowNetwork;

/// A strategy computing a maximum flow from `source` to `sink`.
///
/// Implementations bind the network's terminals, leave the residual capacities in their
/// post-flow state and return the flow value.
pub trait MaxFlow {
    fn max_flow(&mut self, network: &mut FlowNetwork, source: usize, sink: usize)
        -> FlowResult<f64>;
}

/// Runtime choice between the two solvers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Algorithm {
    PushRelabel,
    AugmentingPath,
}

impl FlowNetwork {
    pub fn solve_push_relabel(&mut self, source: usize, sink: usize) -> FlowResult<f64> {
        self.solve_with(Algorithm::PushRelabel, source, sink)
    }

    pub fn solve_augmenting_path(&mut self, source: usize, sink: usize) -> FlowResult<f64> {
        self.solve_with(Algorithm::AugmentingPath, source, sink)
    }

    /// Runs `algorithm` with this network's configuration.
    pub fn solve_with(
        &mut self,
        algorithm: Algorithm,
        source: usize,
        sink: usize,
    ) -> FlowResult<f64> {
        let config = *self.config();
        match algorithm {
            Algorithm::PushRelabel => PushRelabel::new(&config).max_flow(self, source, sink),
            Algorithm::AugmentingPath => AugmentingPath::new(&config).max_flow(self, source, sink),
        }
    }

    /// Minimum cut induced by the residual arcs left behind by the last solve.
    pub fn min_cut(&self) -> FlowResult<MinCut> {
        MinCut::extract(self)
    }

    /// Nodes on the source side of the minimum cut, excluding the source itself.
    pub fn source_side_nodes(&self) -> FlowResult<BTreeSet<usize>> {
        self.min_cut().map(|cut| cut.source_side)
    }

    /// Nodes not reachable from the source, excluding the sink.
    pub fn sink_side_nodes(&self) -> FlowResult<BTreeSet<usize>> {
        self.min_cut().map(|cut| cut.sink_side)
    }

    /// Sum of the excess held by every node other than source and sink.
    pub fn inner_excess(&self) -> FlowResult<f64> {
        let (source, sink) = self.terminals().ok_or(FlowError::Unbound)?;
        Ok(self
            .graph()
            .node_indices()
            .filter(|&node| node != source && node != sink)
            .map(|node| self.graph()[node].excess())
            .sum())
    }
}
