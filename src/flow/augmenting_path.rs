use std::collections::VecDeque;

use petgraph::visit::EdgeRef;
use tracing::{debug, trace, warn};

use crate::config::{PathSearch, SolverConfig};
use crate::error::{FlowError, FlowResult};
use crate::flow::MaxFlow;
use crate::network::{ArcId, FlowNetwork, NodeId};

/// Ford-Fulkerson on the residual arcs of a network.
///
/// With [`PathSearch::Bfs`] this is Edmonds-Karp. Only arcs whose residual capacity exceeds
/// epsilon are usable, so an arc can never be driven below zero.
#[derive(Clone, Debug)]
pub struct AugmentingPath {
    config: SolverConfig,
}

impl AugmentingPath {
    pub fn new(config: &SolverConfig) -> Self {
        Self { config: *config }
    }

    /// Arcs of a source to sink path, ordered from the source, if one exists.
    fn find_path(
        &self,
        network: &FlowNetwork,
        source: NodeId,
        sink: NodeId,
    ) -> Option<Vec<ArcId>> {
        let graph = network.graph();
        let mut predecessor: Vec<Option<ArcId>> = vec![None; graph.node_count()];
        let mut visited = vec![false; graph.node_count()];
        let mut frontier: VecDeque<NodeId> = VecDeque::new();
        visited[source.index()] = true;
        frontier.push_back(source);

        while let Some(node) = match self.config.path_search {
            PathSearch::Bfs => frontier.pop_front(),
            PathSearch::Dfs => frontier.pop_back(),
        } {
            for edge in graph.edges(node) {
                let next = edge.target();
                if visited[next.index()] || edge.weight().capacity <= self.config.epsilon {
                    continue;
                }
                predecessor[next.index()] = Some(edge.id());
                if next == sink {
                    return Some(walk_back(network, &predecessor, sink));
                }
                visited[next.index()] = true;
                frontier.push_back(next);
            }
        }

        None
    }
}

impl Default for AugmentingPath {
    fn default() -> Self {
        Self::new(&SolverConfig::default())
    }
}

/// Follows the recorded predecessor arcs from `sink` back to the source.
fn walk_back(network: &FlowNetwork, predecessor: &[Option<ArcId>], sink: NodeId) -> Vec<ArcId> {
    let mut path = vec![];
    let mut node = sink.index();
    while let Some(arc) = predecessor[node] {
        path.push(arc);
        match network.arc_endpoints(arc) {
            Some((from, _)) => node = from,
            None => break,
        }
    }
    path.reverse();
    path
}

impl MaxFlow for AugmentingPath {
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
        let mut max_flow = 0.0;
        let limit = self.config.step_limit(network.node_count(), network.edge_count());
        let mut augmentations = 0u64;

        while let Some(path) = self.find_path(network, source, sink) {
            augmentations += 1;
            if augmentations > limit {
                warn!(limit, "augmenting path solver hit its step limit");
                return Err(FlowError::StepLimitExceeded { limit });
            }

            let bottleneck = path
                .iter()
                .map(|&arc| network.graph()[arc].capacity)
                .fold(f64::INFINITY, f64::min);
            for &arc in &path {
                network.push_along(arc, bottleneck);
            }
            max_flow += bottleneck;
            trace!(length = path.len(), bottleneck, "augmented");
        }

        network.state_mut(sink).excess = max_flow;
        debug!(augmentations, max_flow, "augmenting path finished");
        Ok(max_flow)
    }
}

#[cfg(test)]
mod tests {
    use petgraph::graph::EdgeIndex;

    use crate::config::{PathSearch, SolverConfig};
    use crate::flow::tests::{
        assert_valid_max_flow, clrs_network, scenario_disconnected, TOLERANCE,
    };
    use crate::flow::{AugmentingPath, MaxFlow};
    use crate::network::{FlowNetwork, NodeId};

    fn path_tuples(network: &FlowNetwork, path: &[EdgeIndex<usize>]) -> Vec<(usize, usize)> {
        path.iter()
            .filter_map(|&arc| network.arc_endpoints(arc))
            .collect()
    }

    #[test]
    fn simple_augmenting_path() {
        let network = FlowNetwork::from_forward_edges(
            5,
            [(0, 1, 1.0), (1, 2, 1.0), (2, 3, 1.0), (3, 4, 1.0)],
        )
        .unwrap();
        let path = AugmentingPath::default()
            .find_path(&network, NodeId::new(0), NodeId::new(4))
            .unwrap();
        assert_eq!(
            vec![(0, 1), (1, 2), (2, 3), (3, 4)],
            path_tuples(&network, &path)
        );
    }

    #[test]
    fn augmenting_path_with_alternatives() {
        let network = FlowNetwork::from_forward_edges(
            6,
            [(0, 1, 1.0), (1, 2, 1.0), (2, 5, 1.0), (0, 3, 1.0), (3, 4, 1.0), (4, 5, 1.0)],
        )
        .unwrap();
        for search in [PathSearch::Bfs, PathSearch::Dfs] {
            let solver = AugmentingPath::new(&SolverConfig::default().with_path_search(search));
            let path = solver
                .find_path(&network, NodeId::new(0), NodeId::new(5))
                .unwrap();
            let tuples = path_tuples(&network, &path);
            assert!(
                tuples == vec![(0, 1), (1, 2), (2, 5)] || tuples == vec![(0, 3), (3, 4), (4, 5)]
            );
        }
    }

    #[test]
    fn exhausted_arcs_block_paths() {
        let network =
            FlowNetwork::from_forward_edges(4, [(0, 1, 1.0), (1, 2, 1e-12), (2, 3, 1.0)]).unwrap();
        assert!(AugmentingPath::default()
            .find_path(&network, NodeId::new(0), NodeId::new(3))
            .is_none());
    }

    #[test]
    fn push_flow_with_cycle() {
        let mut network =
            FlowNetwork::from_forward_edges(4, [(1, 2, 3.0), (2, 1, 3.0), (2, 3, 1.0)]).unwrap();
        let max_flow = AugmentingPath::default().max_flow(&mut network, 1, 3).unwrap();

        assert!((max_flow - 1.0).abs() < TOLERANCE);
        assert_eq!(Ok(2.0), network.weight(1, 2, true));
        assert_eq!(Ok(1.0), network.weight(2, 1, false));
        assert_eq!(Ok(3.0), network.weight(2, 1, true));
        assert_eq!(Ok(0.0), network.weight(1, 2, false));
        assert_eq!(Ok(0.0), network.weight(2, 3, true));
        assert_eq!(Ok(1.0), network.weight(3, 2, false));
    }

    #[test]
    fn flow_is_mirrored_into_sink_excess() {
        let mut network = clrs_network();
        let max_flow = AugmentingPath::default().max_flow(&mut network, 0, 5).unwrap();
        assert_eq!(Some(max_flow), network.node(5).map(|node| node.excess()));
        assert_valid_max_flow(&network, max_flow);
    }

    #[test]
    fn depth_first_search() {
        let config = SolverConfig::default().with_path_search(PathSearch::Dfs);
        let mut network = clrs_network();
        let max_flow = AugmentingPath::new(&config).max_flow(&mut network, 0, 5).unwrap();
        assert!((max_flow - 23.0).abs() < TOLERANCE);
        assert_valid_max_flow(&network, max_flow);
    }

    #[test]
    fn no_path_no_flow() {
        let mut network = scenario_disconnected();
        let max_flow = AugmentingPath::default().max_flow(&mut network, 0, 3).unwrap();
        assert_eq!(0.0, max_flow);
        assert_eq!(Ok(5.0), network.weight(0, 1, true));
    }

    #[test]
    fn fractional_capacities() {
        let mut network = FlowNetwork::from_forward_edges(
            4,
            [(0, 1, 0.1), (0, 2, 0.2), (1, 3, 0.3), (2, 3, 0.15), (1, 2, 0.05)],
        )
        .unwrap();
        let max_flow = AugmentingPath::default().max_flow(&mut network, 0, 3).unwrap();
        assert!((max_flow - 0.25).abs() < TOLERANCE);
        assert_valid_max_flow(&network, max_flow);
    }
}
