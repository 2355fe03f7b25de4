use std::collections::BTreeSet;

use petgraph::visit::EdgeRef;

use crate::error::{FlowError, FlowResult};
use crate::network::{ArcId, FlowNetwork};

/// A minimum s-t cut read off the residual network after a solve.
///
/// Neither side lists the terminals themselves. When several minimum cuts exist this is the
/// one closest to the source.
#[derive(Clone, Debug, PartialEq)]
pub struct MinCut {
    pub source: usize,
    pub sink: usize,
    /// Nodes reachable from the source over positive residual arcs.
    pub source_side: BTreeSet<usize>,
    pub sink_side: BTreeSet<usize>,
    /// Forward arcs leaving the source side, except those within epsilon of zero capacity.
    pub cut_arcs: Vec<ArcId>,
    /// Summed original capacity of `cut_arcs`, equal to the maximum flow.
    pub capacity: f64,
}

impl MinCut {
    pub(crate) fn extract(network: &FlowNetwork) -> FlowResult<Self> {
        let (source, sink) = network.terminals().ok_or(FlowError::Unbound)?;
        let reachable = network.reachable(source);
        if reachable[sink.index()] {
            return Err(FlowError::Contract(format!(
                "sink {} is still reachable from the source, the flow is not maximal",
                sink.index()
            )));
        }

        let source_side = (0..network.node_count())
            .filter(|&node| reachable[node] && node != source.index())
            .collect();
        let sink_side = (0..network.node_count())
            .filter(|&node| !reachable[node] && node != sink.index())
            .collect();

        let epsilon = network.config().epsilon;
        let mut cut_arcs = vec![];
        let mut capacity = 0.0;
        for edge in network.arcs() {
            let arc = edge.weight();
            if arc.is_forward()
                && arc.original() > epsilon
                && reachable[edge.source().index()]
                && !reachable[edge.target().index()]
            {
                cut_arcs.push(edge.id());
                capacity += arc.original();
            }
        }

        Ok(Self {
            source: source.index(),
            sink: sink.index(),
            source_side,
            sink_side,
            cut_arcs,
            capacity,
        })
    }

    /// Whether `node` lies on the source's side of the cut, the source included.
    pub fn is_source_side(&self, node: usize) -> bool {
        node == self.source || self.source_side.contains(&node)
    }

    pub fn is_cut_arc(&self, arc: ArcId) -> bool {
        self.cut_arcs.contains(&arc)
    }
}
