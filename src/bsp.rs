//! Bulk-synchronous-parallel runtime.
//!
//! A job runs in supersteps. In every superstep the engine evaluates a
//! [`VertexProgram`] once for every active vertex (and for every halted vertex
//! that has mail), in parallel. Messages emitted in superstep `n` only become
//! visible in superstep `n + 1`. The job ends when every vertex has voted to
//! halt and no message is in flight.
//!
//! ```text
//!  superstep n            barrier              superstep n + 1
//! ┌─────────────────┐                        ┌─────────────────┐
//! │ compute(v, M_n) │ ──► deliver M_{n+1} ──►│ compute(v, M_n+1)│
//! │  per partition  │     all halted?        │  per partition  │
//! └─────────────────┘                        └─────────────────┘
//! ```

use std::fmt::Debug;

pub mod engine;
pub mod message;
pub mod stats;
pub mod vertex;

pub use engine::{BspEngine, BspResult};
pub use message::MessageStore;
pub use stats::SuperstepStats;
pub use vertex::{VertexRecord, VertexStatus};

/// What a vertex program sees of a vertex during one invocation.
///
/// The view is a copy: the program returns the next value through a
/// [`Transition`] instead of writing to the vertex record.
#[derive(Debug, Clone, Copy)]
pub struct VertexView<'a, V> {
    pub id: u64,
    pub value: V,
    pub neighbors: &'a [u64],
}

/// Messages a vertex emits in one invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outbound<M> {
    Silent,
    /// Deliver the payload once to every outgoing neighbor in the next superstep.
    AllNeighbors(M),
}

/// Result of one vertex invocation: the next value, the outgoing messages and
/// the halt vote.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition<V, M> {
    pub value: V,
    pub outbound: Outbound<M>,
    pub vote_to_halt: bool,
}

impl<V, M> Transition<V, M> {
    /// Keep `value`, send nothing and vote to halt.
    pub fn halt(value: V) -> Self {
        Self {
            value,
            outbound: Outbound::Silent,
            vote_to_halt: true,
        }
    }

    /// Take `value`, send `message` to every neighbor and stay active.
    pub fn broadcast(value: V, message: M) -> Self {
        Self {
            value,
            outbound: Outbound::AllNeighbors(message),
            vote_to_halt: false,
        }
    }
}

/// A vertex-centric computation.
///
/// `compute` is a plain function of the vertex view, the messages delivered to
/// the vertex for this superstep and the superstep number. It must not rely on
/// the order of `messages`.
pub trait VertexProgram: Sync {
    type Value: Copy + PartialEq + Debug + Send + Sync;
    type Message: Copy + Debug + Send + Sync;

    fn name(&self) -> &str;

    /// Value a vertex holds before superstep 0.
    fn initial_value(&self, vertex_id: u64) -> Self::Value;

    fn compute(
        &self,
        vertex: VertexView<'_, Self::Value>,
        messages: Vec<Self::Message>,
        superstep: u64,
    ) -> Transition<Self::Value, Self::Message>;
}
