use std::collections::{BTreeSet, VecDeque};
use std::fmt;

use itertools::Itertools;
use petgraph::graph::{EdgeIndex, EdgeReferences, NodeIndex};
use petgraph::visit::{EdgeRef, IntoEdgeReferences, NodeIndexable};
use petgraph::{Directed, Graph};
use tracing::trace;

use crate::config::SolverConfig;
use crate::error::{FlowError, FlowResult};
use crate::network::arc::{Arc, NodeState};

pub type NodeId = NodeIndex<usize>;
pub type ArcId = EdgeIndex<usize>;

pub(crate) type ArcGraph = Graph<NodeState, Arc, Directed, usize>;

/// Whether a reachability query reports its start node.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Reach {
    IncludeStart,
    ExcludeStart,
}

/// A directed network of capacitated arcs.
///
/// Nodes get dense ids `0..n` in creation order. Adding an edge `(u, v)` stores two arcs next to
/// each other: the forward arc `(u, v)` carrying the capacity and the reverse arc `(v, u)`
/// starting at 0. Arc `2k` is the forward arc of the `k`-th edge and `2k + 1` its reverse, so
/// an arc's partner is found by flipping the lowest index bit.
///
/// Once a solver binds source and sink the network becomes read-only.
#[derive(Clone, Debug, Default)]
pub struct FlowNetwork {
    graph: ArcGraph,
    config: SolverConfig,
    terminals: Option<(NodeId, NodeId)>,
}

impl FlowNetwork {
    pub fn new() -> Self {
        Self::default()
    }

    /// Network with `node_count` zero-valued nodes `0..node_count`.
    pub fn with_nodes(node_count: usize) -> Self {
        let mut network = Self {
            graph: Graph::with_capacity(node_count, 0),
            ..Self::default()
        };
        for _ in 0..node_count {
            network.add_node(0.0);
        }
        network
    }

    /// Builds a network from plain forward edges, pairing each with its residual arc.
    pub fn from_forward_edges<I>(node_count: usize, edges: I) -> FlowResult<Self>
    where
        I: IntoIterator<Item = (usize, usize, f64)>,
    {
        let mut network = Self::with_nodes(node_count);
        for (from, to, capacity) in edges {
            network.add_edge(from, to, capacity)?;
        }
        Ok(network)
    }

    /// Builds a network from any petgraph graph, reading each edge's capacity with `capacity`.
    ///
    /// Edges are taken as directed from their source to their target, also for undirected
    /// graphs.
    pub fn from_graph<G, F>(graph: G, mut capacity: F) -> FlowResult<Self>
    where
        G: IntoEdgeReferences + NodeIndexable,
        F: FnMut(G::EdgeRef) -> f64,
    {
        let mut network = Self::with_nodes(graph.node_bound());
        for edge in graph.edge_references() {
            let from = graph.to_index(edge.source());
            let to = graph.to_index(edge.target());
            network.add_edge(from, to, capacity(edge))?;
        }
        Ok(network)
    }

    pub fn with_config(mut self, config: SolverConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Number of edges added, not counting residual arcs.
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count() / 2
    }

    pub fn contains_node(&self, node: usize) -> bool {
        node < self.graph.node_count()
    }

    pub fn node(&self, node: usize) -> Option<&NodeState> {
        self.graph.node_weight(NodeIndex::new(node))
    }

    pub fn source(&self) -> Option<usize> {
        self.terminals.map(|(source, _)| source.index())
    }

    pub fn sink(&self) -> Option<usize> {
        self.terminals.map(|(_, sink)| sink.index())
    }

    pub fn is_bound(&self) -> bool {
        self.terminals.is_some()
    }

    /// Appends a node and returns its id.
    pub fn add_node(&mut self, value: f64) -> usize {
        self.graph.add_node(NodeState::new(value)).index()
    }

    /// Adds the edge `(from, to)` and returns the id of its forward arc.
    ///
    /// Nothing is modified when the call fails. Negative and non-finite capacities are rejected
    /// rather than clamped.
    pub fn add_edge(&mut self, from: usize, to: usize, capacity: f64) -> FlowResult<ArcId> {
        if self.is_bound() {
            return Err(FlowError::NetworkBound);
        }
        let (from_id, to_id) = (self.node_id(from)?, self.node_id(to)?);
        if from == to {
            return Err(FlowError::SelfLoop(from));
        }
        if !capacity.is_finite() || capacity < 0.0 {
            return Err(FlowError::InvalidCapacity(capacity));
        }
        if self.edge_exists(from, to, true) {
            return Err(FlowError::DuplicateEdge {
                from,
                to,
                is_forward: true,
            });
        }

        let forward = self.graph.add_edge(from_id, to_id, Arc::forward(capacity));
        self.graph.add_edge(to_id, from_id, Arc::reverse());
        trace!(from, to, capacity, "added edge");
        Ok(forward)
    }

    pub fn edge_exists(&self, from: usize, to: usize, is_forward: bool) -> bool {
        self.find_arc(from, to, is_forward).is_some()
    }

    /// Id of the arc `(from, to)` with the given direction flag.
    pub fn find_arc(&self, from: usize, to: usize, is_forward: bool) -> Option<ArcId> {
        if !self.contains_node(from) || !self.contains_node(to) {
            return None;
        }
        self.graph
            .edges_connecting(NodeIndex::new(from), NodeIndex::new(to))
            .find(|edge| edge.weight().is_forward == is_forward)
            .map(|edge| edge.id())
    }

    /// Residual capacity of the arc `(from, to)`.
    pub fn weight(&self, from: usize, to: usize, is_forward: bool) -> FlowResult<f64> {
        self.find_arc(from, to, is_forward)
            .map(|arc| self.graph[arc].capacity)
            .ok_or(FlowError::NoSuchEdge {
                from,
                to,
                is_forward,
            })
    }

    /// Adds `delta` to the residual capacity of a single arc, leaving its partner alone.
    ///
    /// Results within epsilon below zero are clamped to zero, anything lower is rejected.
    pub fn adjust_capacity(
        &mut self,
        from: usize,
        to: usize,
        delta: f64,
        is_forward: bool,
    ) -> FlowResult<()> {
        if self.is_bound() {
            return Err(FlowError::NetworkBound);
        }
        let arc = self
            .find_arc(from, to, is_forward)
            .ok_or(FlowError::NoSuchEdge {
                from,
                to,
                is_forward,
            })?;
        let capacity = self.graph[arc].capacity + delta;
        if capacity < -self.config.epsilon || capacity.is_nan() {
            return Err(FlowError::NegativeCapacity { from, to, capacity });
        }
        self.graph[arc].capacity = capacity.max(0.0);
        Ok(())
    }

    /// Nodes reachable from `start` over arcs, forward or reverse, whose residual capacity
    /// exceeds epsilon.
    pub fn reachable_from(&self, start: usize, reach: Reach) -> FlowResult<BTreeSet<usize>> {
        let start_id = self.node_id(start)?;
        let visited = self.reachable(start_id);
        Ok(visited
            .iter()
            .enumerate()
            .filter(|&(node, &seen)| seen && (reach == Reach::IncludeStart || node != start))
            .map(|(node, _)| node)
            .collect())
    }

    /// Every arc including residual ones, in insertion order.
    pub fn arcs(&self) -> EdgeReferences<'_, Arc, usize> {
        self.graph.edge_references()
    }

    /// Whether `check` holds for every arc.
    pub fn all_arcs<F>(&self, mut check: F) -> bool
    where
        F: FnMut(&Arc) -> bool,
    {
        self.graph.edge_weights().all(|arc| check(arc))
    }

    pub fn arc(&self, arc: ArcId) -> Option<&Arc> {
        self.graph.edge_weight(arc)
    }

    pub fn arc_endpoints(&self, arc: ArcId) -> Option<(usize, usize)> {
        self.graph
            .edge_endpoints(arc)
            .map(|(from, to)| (from.index(), to.index()))
    }

    /// Flow routed over the edge owning `arc`.
    pub fn flow_on(&self, arc: ArcId) -> Option<f64> {
        self.arc(arc).map(Arc::flow)
    }

    pub(crate) fn node_id(&self, node: usize) -> FlowResult<NodeId> {
        if self.contains_node(node) {
            Ok(NodeIndex::new(node))
        } else {
            Err(FlowError::NodeOutOfRange {
                node,
                node_count: self.node_count(),
            })
        }
    }

    pub(crate) fn graph(&self) -> &ArcGraph {
        &self.graph
    }

    pub(crate) fn state_mut(&mut self, node: NodeId) -> &mut NodeState {
        &mut self.graph[node]
    }

    pub(crate) fn terminals(&self) -> Option<(NodeId, NodeId)> {
        self.terminals
    }

    /// Fixes source and sink for good; a second call fails.
    pub(crate) fn bind_terminals(
        &mut self,
        source: usize,
        sink: usize,
    ) -> FlowResult<(NodeId, NodeId)> {
        if let Some((source_id, sink_id)) = self.terminals {
            return Err(FlowError::TerminalsAlreadyBound {
                source_node: source_id.index(),
                sink_node: sink_id.index(),
            });
        }
        let terminals = (self.node_id(source)?, self.node_id(sink)?);
        if source == sink {
            return Err(FlowError::SameTerminal(source));
        }
        self.terminals = Some(terminals);
        Ok(terminals)
    }

    /// Moves `amount` units of residual capacity from `arc` to its partner.
    pub(crate) fn push_along(&mut self, arc: ArcId, amount: f64) {
        let residual = &mut self.graph[arc].capacity;
        *residual = (*residual - amount).max(0.0);
        self.graph[partner(arc)].capacity += amount;
    }

    /// Visited flags of a BFS from `start` over arcs with capacity above epsilon.
    pub(crate) fn reachable(&self, start: NodeId) -> Vec<bool> {
        let epsilon = self.config.epsilon;
        let mut visited = vec![false; self.node_count()];
        let mut queue = VecDeque::new();
        visited[start.index()] = true;
        queue.push_back(start);

        while let Some(node) = queue.pop_front() {
            for edge in self.graph.edges(node) {
                let next = edge.target();
                if !visited[next.index()] && edge.weight().capacity > epsilon {
                    visited[next.index()] = true;
                    queue.push_back(next);
                }
            }
        }

        visited
    }
}

/// The arc paired with `arc`.
pub(crate) fn partner(arc: ArcId) -> ArcId {
    EdgeIndex::new(arc.index() ^ 1)
}

impl fmt::Display for FlowNetwork {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for node in self.graph.node_indices() {
            let arcs = self
                .graph
                .edges(node)
                .sorted_by_key(|edge| edge.id())
                .map(|edge| {
                    let direction = if edge.weight().is_forward { 'f' } else { 'r' };
                    format!(
                        "({}, {}, {})",
                        edge.target().index(),
                        edge.weight().capacity,
                        direction
                    )
                })
                .join(", ");
            writeln!(f, "{}: [{}]", node.index(), arcs)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use petgraph::graph::DiGraph;
    use petgraph::visit::EdgeRef;

    use crate::error::FlowError;
    use crate::network::{partner, FlowNetwork, Reach};

    #[test]
    fn add_node_keeps_value() {
        let mut network = FlowNetwork::with_nodes(2);
        let node = network.add_node(2.5);

        assert_eq!(2, node);
        assert_eq!(3, network.node_count());
        assert_eq!(Some(2.5), network.node(node).map(|node| node.value()));
        assert_eq!(Some(0.0), network.node(0).map(|node| node.value()));
        assert_eq!(Some(0), network.node(node).map(|node| node.height()));
        assert!(network.node(3).is_none());
    }

    #[test]
    fn add_edge_creates_residual_pair() {
        let mut network = FlowNetwork::with_nodes(2);
        let forward = network.add_edge(0, 1, 3.0).unwrap();

        assert_eq!(1, network.edge_count());
        assert!(network.edge_exists(0, 1, true));
        assert!(network.edge_exists(1, 0, false));
        assert!(!network.edge_exists(1, 0, true));
        assert!(!network.edge_exists(0, 1, false));
        assert_eq!(Ok(3.0), network.weight(0, 1, true));
        assert_eq!(Ok(0.0), network.weight(1, 0, false));
        assert_eq!(Some((1, 0)), network.arc_endpoints(partner(forward)));
    }

    #[test]
    fn duplicate_edge_is_rejected_without_mutation() {
        let mut network = FlowNetwork::with_nodes(2);
        network.add_edge(0, 1, 3.0).unwrap();

        let duplicate = network.add_edge(0, 1, 4.0);
        assert_eq!(
            Err(FlowError::DuplicateEdge {
                from: 0,
                to: 1,
                is_forward: true
            }),
            duplicate
        );
        assert_eq!(1, network.edge_count());
        assert_eq!(Ok(3.0), network.weight(0, 1, true));
    }

    #[test]
    fn antiparallel_edges_are_distinct() {
        let mut network = FlowNetwork::with_nodes(2);
        network.add_edge(0, 1, 3.0).unwrap();
        network.add_edge(1, 0, 3.0).unwrap();

        assert_eq!(2, network.edge_count());
        assert_eq!(Ok(3.0), network.weight(0, 1, true));
        assert_eq!(Ok(0.0), network.weight(0, 1, false));
        assert_eq!(Ok(3.0), network.weight(1, 0, true));
        assert_eq!(Ok(0.0), network.weight(1, 0, false));
    }

    #[test]
    fn invalid_edges() {
        let mut network = FlowNetwork::with_nodes(2);
        assert_eq!(
            Err(FlowError::NodeOutOfRange {
                node: 2,
                node_count: 2
            }),
            network.add_edge(0, 2, 1.0)
        );
        assert_eq!(Err(FlowError::SelfLoop(1)), network.add_edge(1, 1, 1.0));
        assert_eq!(
            Err(FlowError::InvalidCapacity(-1.0)),
            network.add_edge(0, 1, -1.0)
        );
        assert!(network.add_edge(0, 1, f64::NAN).is_err());
        assert_eq!(0, network.edge_count());
    }

    #[test]
    fn missing_edge_weight() {
        let network = FlowNetwork::with_nodes(3);
        assert_eq!(
            Err(FlowError::NoSuchEdge {
                from: 0,
                to: 2,
                is_forward: true
            }),
            network.weight(0, 2, true)
        );
        assert!(network.weight(7, 0, true).is_err());
    }

    #[test]
    fn modifying_weights() {
        let mut network = FlowNetwork::with_nodes(3);
        network.add_edge(1, 2, 3.0).unwrap();

        network.adjust_capacity(1, 2, -3.0, true).unwrap();
        assert_eq!(Ok(0.0), network.weight(1, 2, true));

        network.adjust_capacity(1, 2, 2.0, true).unwrap();
        assert_eq!(Ok(2.0), network.weight(1, 2, true));

        // the partner arc is not touched by a single-arc adjustment
        assert_eq!(Ok(0.0), network.weight(2, 1, false));
    }

    #[test]
    fn adjustment_below_zero_is_rejected() {
        let mut network = FlowNetwork::with_nodes(2);
        network.add_edge(0, 1, 1.0).unwrap();

        assert!(matches!(
            network.adjust_capacity(0, 1, -2.0, true),
            Err(FlowError::NegativeCapacity { from: 0, to: 1, .. })
        ));
        assert_eq!(Ok(1.0), network.weight(0, 1, true));

        // tiny undershoots count as rounding error
        network.adjust_capacity(0, 1, -1.0 - 1e-12, true).unwrap();
        assert_eq!(Ok(0.0), network.weight(0, 1, true));

        assert!(network.adjust_capacity(1, 0, 1.0, true).is_err());
    }

    #[test]
    fn all_reachable() {
        let mut network = FlowNetwork::with_nodes(5);
        network.add_edge(1, 2, 3.0).unwrap();
        network.add_edge(2, 3, 3.0).unwrap();
        network.add_edge(4, 1, 1.0).unwrap();

        let reachable = network.reachable_from(1, Reach::IncludeStart).unwrap();
        assert_eq!(vec![1, 2, 3], reachable.into_iter().collect::<Vec<_>>());

        let reachable = network.reachable_from(1, Reach::ExcludeStart).unwrap();
        assert_eq!(vec![2, 3], reachable.into_iter().collect::<Vec<_>>());
    }

    #[test]
    fn reachability_ignores_capacity_within_epsilon() {
        let mut network = FlowNetwork::with_nodes(3);
        network.add_edge(0, 1, 1e-12).unwrap();
        network.add_edge(0, 2, 1.0).unwrap();

        let reachable = network.reachable_from(0, Reach::IncludeStart).unwrap();
        assert_eq!(vec![0, 2], reachable.into_iter().collect::<Vec<_>>());
    }

    #[test]
    fn residual_network_from_petgraph() {
        let graph = DiGraph::<(), f64>::from_edges(&[(0, 1, 2.0), (1, 2, 1.5), (2, 1, 0.5)]);
        let network = FlowNetwork::from_graph(&graph, |edge| *edge.weight()).unwrap();

        assert_eq!(3, network.node_count());
        assert_eq!(3, network.edge_count());
        assert_eq!(Ok(1.5), network.weight(1, 2, true));
        assert_eq!(Ok(0.0), network.weight(2, 1, false));
        assert_eq!(Ok(0.5), network.weight(2, 1, true));
        assert!(network.all_arcs(|arc| arc.is_forward() || arc.capacity() == 0.0));
    }

    #[test]
    fn arcs_alternate_forward_and_reverse() {
        let network =
            FlowNetwork::from_forward_edges(3, [(0, 1, 1.0), (1, 2, 2.0), (0, 2, 3.0)]).unwrap();

        let directions: Vec<bool> = network
            .arcs()
            .map(|edge| edge.weight().is_forward())
            .collect();
        assert_eq!(vec![true, false, true, false, true, false], directions);
        assert!(network.arcs().all(|edge| {
            let pair = network.arc_endpoints(partner(edge.id())).unwrap();
            pair == (edge.target().index(), edge.source().index())
        }));
    }

    #[test]
    fn display_lists_arcs_per_node() {
        let network = FlowNetwork::from_forward_edges(2, [(0, 1, 2.5)]).unwrap();
        assert_eq!("0: [(1, 2.5, f)]\n1: [(0, 0, r)]\n", network.to_string());
    }
}
