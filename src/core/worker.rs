//! # Worker unit: the instantiated, supervised piece of behavior.
//!
//! A [`WorkerUnit`] binds a [`WorkerBehavior`](crate::WorkerBehavior) to an
//! identity and to a [`WorkerContext`] — the capability-narrowed view of the
//! supervisor the behavior is allowed to touch. The context can read the
//! stop state and reach the logger; it cannot mutate supervisor state.
//!
//! ## Creation order
//! Base wiring is established first (context construction), then the
//! behavior's own initializer runs, so behavior code may assume the context
//! is fully usable from inside `init`.

use std::sync::Arc;

use crate::core::stop::StopFlag;
use crate::error::WorkerError;
use crate::sinks::LogSink;
use crate::workers::BehaviorRef;

/// The worker-facing view of the supervisor.
///
/// Cheap to clone; all fields are shared handles. Behaviors poll
/// [`WorkerContext::stop_requested`] to cooperate with shutdown, or park on
/// [`WorkerContext::stopped`] between units of work.
#[derive(Clone)]
pub struct WorkerContext {
    id: u32,
    stop: Arc<StopFlag>,
    logger: Option<Arc<dyn LogSink>>,
}

impl WorkerContext {
    pub(crate) fn new(id: u32, stop: Arc<StopFlag>, logger: Option<Arc<dyn LogSink>>) -> Self {
        Self { id, stop, logger }
    }

    /// The opaque worker id assigned at creation.
    pub fn id(&self) -> u32 {
        self.id
    }

    /// True once the supervisor has been asked to stop.
    pub fn stop_requested(&self) -> bool {
        self.stop.is_requested()
    }

    /// True when the recorded stop request allows the current unit of work
    /// to finish. Only meaningful after [`WorkerContext::stop_requested`].
    pub fn stop_graceful(&self) -> bool {
        self.stop.is_graceful()
    }

    /// Completes once a stop has been requested.
    pub async fn stopped(&self) {
        self.stop.requested().await;
    }

    /// The supervisor's log sink, if one exists yet.
    ///
    /// `None` before the first `main()` call creates the logger.
    pub fn logger(&self) -> Option<&Arc<dyn LogSink>> {
        self.logger.as_ref()
    }
}

/// One supervised unit of work: identity + context + behavior.
pub struct WorkerUnit {
    ctx: WorkerContext,
    behavior: BehaviorRef,
}

impl std::fmt::Debug for WorkerUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkerUnit")
            .field("id", &self.ctx.id())
            .finish_non_exhaustive()
    }
}

impl WorkerUnit {
    /// Creates a unit bound to `id`, then runs the behavior's initializer.
    ///
    /// Initializers must not block indefinitely; no timeout is imposed at
    /// this layer. An `Err` here is fatal to this worker's startup.
    pub(crate) async fn create(
        id: u32,
        stop: Arc<StopFlag>,
        logger: Option<Arc<dyn LogSink>>,
        behavior: BehaviorRef,
    ) -> Result<Self, WorkerError> {
        let ctx = WorkerContext::new(id, stop, logger);
        let unit = Self { ctx, behavior };
        unit.behavior.init(&unit.ctx).await?;
        Ok(unit)
    }

    /// The worker id.
    pub fn id(&self) -> u32 {
        self.ctx.id()
    }

    /// The context handed to the behavior.
    pub fn context(&self) -> &WorkerContext {
        &self.ctx
    }

    /// Drives the behavior to completion or cooperative exit.
    pub async fn run(&self) -> Result<(), WorkerError> {
        self.behavior.run(self.ctx.clone()).await
    }
}
