//! # Function-backed behavior (`WorkerFn`)
//!
//! [`WorkerFn`] wraps a closure `F: Fn(WorkerContext) -> Fut`, producing a
//! fresh future per run. State shared across runs goes into an explicit
//! `Arc` inside the closure; nothing is mutated behind the caller's back.

use std::borrow::Cow;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;

use crate::core::WorkerContext;
use crate::error::WorkerError;
use crate::workers::WorkerBehavior;

/// Function-backed [`WorkerBehavior`] implementation.
///
/// ## Example
/// ```
/// use workvisor::{WorkerBehavior, WorkerContext, WorkerError, WorkerFn};
///
/// let behavior = WorkerFn::arc("ticker", |ctx: WorkerContext| async move {
///     if ctx.stop_requested() {
///         return Err(WorkerError::Canceled);
///     }
///     Ok(())
/// });
/// assert_eq!(behavior.name(), "ticker");
/// ```
pub struct WorkerFn<F> {
    name: Cow<'static, str>,
    f: F,
}

impl<F> WorkerFn<F> {
    /// Creates a new function-backed behavior.
    ///
    /// Prefer [`WorkerFn::arc`] when you immediately need a
    /// [`BehaviorRef`](crate::BehaviorRef).
    pub fn new(name: impl Into<Cow<'static, str>>, f: F) -> Self {
        Self {
            name: name.into(),
            f,
        }
    }

    /// Creates the behavior and returns it as a shared handle.
    pub fn arc(name: impl Into<Cow<'static, str>>, f: F) -> Arc<Self> {
        Arc::new(Self::new(name, f))
    }
}

#[async_trait]
impl<F, Fut> WorkerBehavior for WorkerFn<F>
where
    F: Fn(WorkerContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), WorkerError>> + Send + 'static,
{
    fn name(&self) -> &str {
        &self.name
    }

    async fn run(&self, ctx: WorkerContext) -> Result<(), WorkerError> {
        (self.f)(ctx).await
    }
}
