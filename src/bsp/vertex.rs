/// Scheduling state of a vertex between supersteps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VertexStatus {
    /// Invoked in the next superstep.
    Active,
    /// Skipped until a message arrives for it.
    Halted,
}

/// Per-vertex state kept in the engine's arena.
///
/// Only `value` and `status` change during a job, and only through the
/// transition returned by the vertex's own computation.
#[derive(Debug, Clone, Copy)]
pub struct VertexRecord<V> {
    pub(crate) id: u64,
    pub(crate) value: V,
    pub(crate) status: VertexStatus,
}

impl<V: Copy> VertexRecord<V> {
    /// Creates an active record.
    pub fn new(id: u64, value: V) -> Self {
        Self {
            id,
            value,
            status: VertexStatus::Active,
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn value(&self) -> V {
        self.value
    }

    pub fn status(&self) -> VertexStatus {
        self.status
    }

    pub fn is_active(&self) -> bool {
        self.status == VertexStatus::Active
    }

    pub(crate) fn halt(&mut self) {
        self.status = VertexStatus::Halted;
    }

    pub(crate) fn reactivate(&mut self) {
        self.status = VertexStatus::Active;
    }
}
