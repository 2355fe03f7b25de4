/// Per-node state of a flow network.
///
/// `height` and `excess` are only touched by the push-relabel solver; `value` is an opaque
/// payload for whoever builds the network.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct NodeState {
    pub(crate) value: f64,
    pub(crate) height: usize,
    pub(crate) excess: f64,
}

impl NodeState {
    pub(crate) fn new(value: f64) -> Self {
        Self {
            value,
            height: 0,
            excess: 0.0,
        }
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Flow that entered the node and has not left it yet. Never negative.
    pub fn excess(&self) -> f64 {
        self.excess
    }
}

/// One direction of a capacitated edge.
///
/// Every edge of a [`FlowNetwork`](crate::FlowNetwork) is stored as a forward arc followed by
/// its reverse (residual) arc, so their capacities always add up to the forward arc's original
/// capacity.
#[derive(Clone, Debug, PartialEq)]
pub struct Arc {
    pub(crate) capacity: f64,
    pub(crate) original: f64,
    pub(crate) is_forward: bool,
}

impl Arc {
    pub(crate) fn forward(capacity: f64) -> Self {
        Self {
            capacity,
            original: capacity,
            is_forward: true,
        }
    }

    pub(crate) fn reverse() -> Self {
        Self {
            capacity: 0.0,
            original: 0.0,
            is_forward: false,
        }
    }

    /// Remaining residual capacity.
    pub fn capacity(&self) -> f64 {
        self.capacity
    }

    /// Capacity at insertion time, 0 for reverse arcs.
    pub fn original(&self) -> f64 {
        self.original
    }

    pub fn is_forward(&self) -> bool {
        self.is_forward
    }

    /// Flow currently routed over the edge this arc belongs to, seen from this arc.
    pub fn flow(&self) -> f64 {
        if self.is_forward {
            self.original - self.capacity
        } else {
            self.capacity
        }
    }
}
