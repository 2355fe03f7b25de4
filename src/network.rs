mod arc;
mod graph;

pub use arc::{Arc, NodeState};
pub(crate) use graph::partner;
pub use graph::{ArcId, FlowNetwork, NodeId, Reach};
