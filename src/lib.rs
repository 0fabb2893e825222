//! Vertex-centric label propagation on a bulk-synchronous-parallel engine.
//!
//! The crate is split the same way the computation is:
//!
//! - [`types`] holds the immutable vertex/edge store the engine iterates over.
//! - [`bsp`] holds the vertex/message model and the superstep engine that owns
//!   scheduling, message delivery and the global halt vote.
//! - [`algorithms`] holds the vertex programs (label propagation) and the
//!   analysis helpers built on top of their results.
//! - [`export`] streams final `(id, label)` pairs to a persistence sink.

pub mod algorithms;
pub mod bsp;
pub mod config;
pub mod error;
pub mod export;
pub mod generator;
pub mod types;

pub use error::LpError;
