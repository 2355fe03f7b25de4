/*!
`flow_cut` computes maximum flows and minimum s-t cuts on capacitated directed networks.

A [`FlowNetwork`] owns nodes with dense ids `0..n` and edges with real-valued capacities. Each
edge is stored as a forward arc plus its residual reverse arc, so solvers work on the residual
network in place.

Two interchangeable solvers are provided, both behind the [`MaxFlow`](flow::MaxFlow) trait:
- [`PushRelabel`](flow::PushRelabel), generic preflow push-relabel,
- [`AugmentingPath`](flow::AugmentingPath), Ford-Fulkerson with BFS (Edmonds-Karp) or DFS
  path search.

After a solve, [`FlowNetwork::min_cut`] reads the minimum cut off the residual network.

# Usage

```
use flow_cut::FlowNetwork;

let mut network = FlowNetwork::with_nodes(3);
network.add_edge(0, 1, 5.0).unwrap();
network.add_edge(1, 2, 5.0).unwrap();

let max_flow = network.solve_augmenting_path(0, 2).unwrap();
assert!((max_flow - 5.0).abs() < 1e-9);
assert!(network.source_side_nodes().unwrap().is_empty());
assert!(network.sink_side_nodes().unwrap().contains(&1));
```

A network binds its source and sink on the first solve and cannot be modified or solved again
afterwards; clone it beforehand to compare solvers.
*/

pub mod config;
pub mod error;
pub mod flow;
pub mod network;

pub use config::SolverConfig;
pub use error::{FlowError, FlowResult};
pub use flow::{Algorithm, MinCut};
pub use network::{FlowNetwork, Reach};
