//! # Worker abstractions.
//!
//! This module provides the pluggable side of the supervisor:
//! - [`WorkerBehavior`] — trait for implementing the unit of work
//! - [`WorkerFn`] — closure-based behavior implementation
//! - [`BehaviorRef`] — shared handle (`Arc<dyn WorkerBehavior>`)

mod behavior;
mod behavior_fn;

pub use behavior::{BehaviorRef, WorkerBehavior};
pub use behavior_fn::WorkerFn;
