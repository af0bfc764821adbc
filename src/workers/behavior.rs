//! # Worker behavior: the pluggable unit-of-work definition.
//!
//! [`WorkerBehavior`] is what an embedding supplies to the supervisor. It is
//! instantiated into a [`WorkerUnit`](crate::WorkerUnit) by the supervisor;
//! behavior state is entirely owned by the implementation and never
//! inspected by the core.
//!
//! A behavior's `run` should periodically check
//! [`WorkerContext::stop_requested`](crate::WorkerContext::stop_requested)
//! and exit promptly once it flips — immediately when
//! [`stop_graceful`](crate::WorkerContext::stop_graceful) is false, after
//! finishing the current unit of work otherwise.

use std::sync::Arc;

use async_trait::async_trait;

use crate::core::WorkerContext;
use crate::error::WorkerError;

/// Shared handle to a behavior, suitable for storing in the supervisor.
pub type BehaviorRef = Arc<dyn WorkerBehavior>;

/// Pluggable unit-of-work definition.
///
/// # Example
/// ```
/// use async_trait::async_trait;
/// use workvisor::{WorkerBehavior, WorkerContext, WorkerError};
///
/// struct Poller;
///
/// #[async_trait]
/// impl WorkerBehavior for Poller {
///     fn name(&self) -> &str { "poller" }
///
///     async fn run(&self, ctx: WorkerContext) -> Result<(), WorkerError> {
///         while !ctx.stop_requested() {
///             // one unit of work...
///             # break;
///         }
///         Ok(())
///     }
/// }
/// ```
#[async_trait]
pub trait WorkerBehavior: Send + Sync + 'static {
    /// Stable, human-readable behavior name.
    fn name(&self) -> &str {
        "worker"
    }

    /// One-time setup, run after the base wiring of the unit is in place.
    ///
    /// Must not block indefinitely; the supervisor imposes no timeout here.
    async fn init(&self, ctx: &WorkerContext) -> Result<(), WorkerError> {
        let _ = ctx;
        Ok(())
    }

    /// The run loop. Poll the context's stop state to cooperate with
    /// shutdown; return [`WorkerError::Canceled`] (or `Ok`) after a stop.
    async fn run(&self, ctx: WorkerContext) -> Result<(), WorkerError>;
}
