use std::collections::VecDeque;

use petgraph::visit::EdgeRef;
use tracing::{debug, trace, warn};

use crate::config::{Selection, SolverConfig};
use crate::error::{FlowError, FlowResult};
use crate::flow::MaxFlow;
use crate::network::{ArcId, FlowNetwork, NodeId};

/// Generic preflow push-relabel, O(V^2 E).
///
/// The preflow saturates every arc leaving the source, including a direct arc into the sink.
/// Active nodes are then discharged one at a time in the configured [`Selection`] order until
/// none is left; the sink's excess is the maximum flow. A node is active while its excess
/// exceeds epsilon, and only arcs with more than epsilon residual capacity are pushed over or
/// relabelled across, matching the reachability used for the cut.
///
/// With exact arithmetic no height passes `2n - 1`. Float rounding can leave a little excess
/// that only sub-epsilon or unbacked residual capacity leads away from; such excess is dropped
/// once the node has nowhere left to go.
#[derive(Clone, Debug)]
pub struct PushRelabel {
    config: SolverConfig,
}

impl PushRelabel {
    pub fn new(config: &SolverConfig) -> Self {
        Self { config: *config }
    }
}

impl Default for PushRelabel {
    fn default() -> Self {
        Self::new(&SolverConfig::default())
    }
}

impl MaxFlow for PushRelabel {
    #[tracing::instrument(
        level = "debug",
        skip(self, network),
        fields(nodes = network.node_count(), edges = network.edge_count())
    )]
    fn max_flow(
        &mut self,
        network: &mut FlowNetwork,
        source: usize,
        sink: usize,
    ) -> FlowResult<f64> {
        let (source, sink) = network.bind_terminals(source, sink)?;
        let node_count = network.node_count();
        let limit = self.config.step_limit(node_count, network.edge_count());
        let run = Discharge::new(source, sink, self.config.epsilon, node_count);
        let mut active = ActiveNodes::new(self.config.selection, run.epsilon, node_count);

        run.saturate_source_arcs(network, &mut active);
        network.state_mut(source).height = node_count;

        let mut steps = 0u64;
        while let Some(node) = active.pop() {
            while network.graph()[node].excess > run.epsilon {
                steps += 1;
                if steps > limit {
                    warn!(limit, "push-relabel hit its step limit");
                    return Err(FlowError::StepLimitExceeded { limit });
                }
                run.discharge(network, node, &mut active)?;
            }
        }

        let max_flow = network.graph()[sink].excess;
        debug!(steps, max_flow, "push-relabel finished");
        Ok(max_flow)
    }
}

/// Nodes holding more than epsilon excess, at most one entry per node.
struct ActiveNodes {
    selection: Selection,
    epsilon: f64,
    queue: VecDeque<NodeId>,
    queued: Vec<bool>,
}

impl ActiveNodes {
    fn new(selection: Selection, epsilon: f64, node_count: usize) -> Self {
        Self {
            selection,
            epsilon,
            queue: VecDeque::new(),
            queued: vec![false; node_count],
        }
    }

    /// Queues `node` if it holds more than epsilon excess and is not queued yet.
    fn insert(&mut self, node: NodeId, excess: f64) {
        if excess > self.epsilon && !self.queued[node.index()] {
            self.queued[node.index()] = true;
            self.queue.push_back(node);
        }
    }

    fn pop(&mut self) -> Option<NodeId> {
        let node = match self.selection {
            Selection::Fifo => self.queue.pop_front(),
            Selection::Lifo => self.queue.pop_back(),
        }?;
        self.queued[node.index()] = false;
        Some(node)
    }
}

/// What stays fixed while one network is being solved.
struct Discharge {
    source: NodeId,
    sink: NodeId,
    epsilon: f64,
    /// `2n - 1`, the highest label a node can legitimately reach.
    max_height: usize,
}

impl Discharge {
    fn new(source: NodeId, sink: NodeId, epsilon: f64, node_count: usize) -> Self {
        Self {
            source,
            sink,
            epsilon,
            max_height: (2 * node_count).saturating_sub(1),
        }
    }

    /// Builds the initial preflow over the source arcs above epsilon.
    fn saturate_source_arcs(&self, network: &mut FlowNetwork, active: &mut ActiveNodes) {
        let source_arcs: Vec<(ArcId, NodeId, f64)> = network
            .graph()
            .edges(self.source)
            .filter(|edge| edge.weight().capacity > self.epsilon)
            .map(|edge| (edge.id(), edge.target(), edge.weight().capacity))
            .collect();

        for (arc, neighbour, capacity) in source_arcs {
            network.push_along(arc, capacity);
            let excess = {
                let state = network.state_mut(neighbour);
                state.excess += capacity;
                state.excess
            };
            if neighbour != self.sink {
                active.insert(neighbour, excess);
            }
        }
    }

    /// One push out of `node`, relabelling first if no arc is admissible.
    fn discharge(
        &self,
        network: &mut FlowNetwork,
        node: NodeId,
        active: &mut ActiveNodes,
    ) -> FlowResult<()> {
        if node == self.source || node == self.sink {
            return Err(FlowError::Contract(format!(
                "terminal node {} cannot be discharged",
                node.index()
            )));
        }
        let excess = network.graph()[node].excess;
        if excess <= 0.0 {
            return Err(FlowError::Contract(format!(
                "node {} has no excess to discharge",
                node.index()
            )));
        }

        loop {
            match admissible_arc(network, node, self.epsilon) {
                Admissible::Push(arc, neighbour, capacity) => {
                    let amount = excess.min(capacity);
                    network.push_along(arc, amount);
                    network.state_mut(node).excess -= amount;
                    let received = {
                        let state = network.state_mut(neighbour);
                        state.excess += amount;
                        state.excess
                    };
                    trace!(from = node.index(), to = neighbour.index(), amount, "push");

                    if neighbour != self.source && neighbour != self.sink {
                        active.insert(neighbour, received);
                    }
                    return Ok(());
                }
                Admissible::Relabel(lowest) if lowest + 1 > self.max_height => {
                    drop_residue(network, node);
                    return Ok(());
                }
                Admissible::Relabel(lowest) => {
                    network.state_mut(node).height = lowest + 1;
                    trace!(node = node.index(), height = lowest + 1, "relabel");
                }
                Admissible::Residue => {
                    drop_residue(network, node);
                    return Ok(());
                }
                Admissible::Stuck => {
                    return Err(FlowError::Contract(format!(
                        "node {} holds excess but has no residual arc to relabel over",
                        node.index()
                    )));
                }
            }
        }
    }
}

/// Forgets the excess of a node that can no longer get rid of it.
fn drop_residue(network: &mut FlowNetwork, node: NodeId) {
    let state = network.state_mut(node);
    debug!(
        node = node.index(),
        excess = state.excess,
        height = state.height,
        "dropping rounding residue"
    );
    state.excess = 0.0;
}

enum Admissible {
    Push(ArcId, NodeId, f64),
    /// Lowest neighbour height over arcs above epsilon.
    Relabel(usize),
    /// Only arcs within epsilon of zero are left.
    Residue,
    Stuck,
}

fn admissible_arc(network: &FlowNetwork, node: NodeId, epsilon: f64) -> Admissible {
    let graph = network.graph();
    let height = graph[node].height;
    let mut lowest: Option<usize> = None;
    let mut residue = false;

    for edge in graph.edges(node) {
        let capacity = edge.weight().capacity;
        if capacity <= epsilon {
            residue |= capacity > 0.0;
            continue;
        }
        let neighbour_height = graph[edge.target()].height;
        if height > neighbour_height {
            return Admissible::Push(edge.id(), edge.target(), capacity);
        }
        lowest = Some(lowest.map_or(neighbour_height, |h| h.min(neighbour_height)));
    }

    match lowest {
        Some(lowest) => Admissible::Relabel(lowest),
        None if residue => Admissible::Residue,
        None => Admissible::Stuck,
    }
}
