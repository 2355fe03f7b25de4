//! Error types for building and solving flow networks.

use thiserror::Error;

/// Result type alias for flow network operations
pub type FlowResult<T> = std::result::Result<T, FlowError>;

/// Everything that can go wrong while building a network, solving it or reading back a cut.
///
/// Apart from [`FlowError::StepLimitExceeded`] all variants are caller contract violations:
/// they are reported immediately and nothing is retried.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FlowError {
    /// A node id does not name a node of the network
    #[error("node {node} is out of range (network has {node_count} nodes)")]
    NodeOutOfRange { node: usize, node_count: usize },

    /// An arc with the same endpoints and direction flag already exists
    #[error("edge ({from}, {to}) with forward = {is_forward} already exists")]
    DuplicateEdge {
        from: usize,
        to: usize,
        is_forward: bool,
    },

    /// Arcs from a node to itself carry no flow and would stall push-relabel
    #[error("self-loop on node {0} is not allowed")]
    SelfLoop(usize),

    /// The requested arc does not exist
    #[error("no such edge exists: ({from}, {to}) with forward = {is_forward}")]
    NoSuchEdge {
        from: usize,
        to: usize,
        is_forward: bool,
    },

    /// Capacities must be finite and non-negative
    #[error("invalid capacity {0}, capacities must be finite and non-negative")]
    InvalidCapacity(f64),

    /// An adjustment would have left an arc with negative residual capacity
    #[error("capacity of ({from}, {to}) would become negative ({capacity})")]
    NegativeCapacity { from: usize, to: usize, capacity: f64 },

    /// Source and sink can only be bound once per network
    #[error("source and sink are already bound to ({source_node}, {sink_node})")]
    TerminalsAlreadyBound { source_node: usize, sink_node: usize },

    /// The network was handed to a solver and is read-only now
    #[error("network is bound to a solve and can no longer be modified")]
    NetworkBound,

    /// Source and sink must be distinct nodes
    #[error("source and sink must differ, both are {0}")]
    SameTerminal(usize),

    /// A cut was requested before any solver bound source and sink
    #[error("no solver has bound a source and sink yet")]
    Unbound,

    /// The configured ceiling on solver steps was reached
    #[error("step limit of {limit} exceeded, partial flow must not be reused")]
    StepLimitExceeded { limit: u64 },

    /// A solver invariant was broken
    #[error("solver contract violated: {0}")]
    Contract(String),
}
