//! # Supervisor: the lifecycle state machine around one worker.
//!
//! The [`Supervisor`] owns the configuration snapshot, the stop flag, the
//! log sink, and the pluggable behavior. It binds control signals to
//! lifecycle transitions, sequences startup/run/teardown, and coordinates
//! reload/restart against the running worker and the sink.
//!
//! ## Lifecycle
//! ```text
//! Constructed ──► Running ──► { StopRequested, RestartRequested, ReloadRequested }
//!                    ▲                │                │               │
//!                    │                ▼                └──────┬────────┘
//!                    │            Terminated                  │ (config reload +
//!                    └────────────────────────────────────────┘  logger reopen,
//!                                                                run loop untouched)
//! ```
//!
//! ## Control flow of `main()`
//! ```text
//! main():
//!   ├─► create logger if absent (lazy, at most one per supervisor)
//!   ├─► start StreamRedirector per enabled stream (once per process)
//!   ├─► hooks.after_start()
//!   ├─► hooks.before_run()
//!   ├─► run(): create_worker(0) ──► WorkerUnit::run()
//!   └─► hooks.after_run()          (every exit path, panics included)
//! ```
//!
//! Signal handlers run concurrently with `run()` at any time. The handler
//! bodies therefore use only race-free state: the stop flag is one atomic,
//! the config swap and logger reopen share a single mutex (two requests
//! arriving close together cannot tear a snapshot or interleave reopens),
//! and readers of the config clone an `Arc` instead of locking across use.

use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, OnceLock, PoisonError, RwLock};

use async_trait::async_trait;
use futures::FutureExt;

use crate::core::config::{Config, ConfigSource, LogTarget};
#[cfg(unix)]
use crate::core::redirect::{StdStream, StreamRedirector};
use crate::core::stop::StopFlag;
use crate::core::worker::WorkerUnit;
use crate::diag::{DumpHandler, ErrorReporter};
use crate::error::{ConfigError, RuntimeError, WorkerError};
use crate::events::{Bus, Event, EventKind};
use crate::signals::{Signal, SignalDispatcher, SignalHandler};
use crate::sinks::{ConsoleSink, FileSink, LogSink};
use crate::subscribers::SubscriberSet;
use crate::workers::BehaviorRef;

/// Extension points around the run loop.
///
/// All hooks default to no-ops; an embedding composes behavior by
/// implementing the ones it needs (the static counterpart of subclassing).
#[async_trait]
pub trait Hooks: Send + Sync + 'static {
    /// Runs once startup is complete (logger + redirectors in place).
    async fn after_start(&self) {}

    /// Runs immediately before the worker run loop.
    async fn before_run(&self) {}

    /// Runs after the run loop on every exit path, failures included.
    async fn after_run(&self) {}
}

pub(crate) struct NoopHooks;

#[async_trait]
impl Hooks for NoopHooks {}

/// Single-process worker supervisor.
///
/// Constructed via [`Supervisor::builder`]; all control entry points
/// (`stop`, `restart`, `reload`, `dump`) are safe to invoke concurrently
/// with an in-progress [`Supervisor::main`].
pub struct Supervisor {
    source: Box<dyn ConfigSource>,
    config: RwLock<Arc<Config>>,
    stop: Arc<StopFlag>,
    logger: OnceLock<Arc<dyn LogSink>>,
    seed_logger: Option<Arc<dyn LogSink>>,
    log_stdout: bool,
    log_stderr: bool,
    behavior: BehaviorRef,
    hooks: Arc<dyn Hooks>,
    bus: Bus,
    subs: Arc<SubscriberSet>,
    reporter: Arc<dyn ErrorReporter>,
    dumper: Arc<dyn DumpHandler>,
    /// Guards the reload/reopen critical section.
    reload_lock: Mutex<()>,
    redirect_started: AtomicBool,
    listener_started: AtomicBool,
    #[cfg(unix)]
    redirectors: Mutex<Vec<StreamRedirector>>,
}

impl std::fmt::Debug for Supervisor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Supervisor")
            .field("log_stdout", &self.log_stdout)
            .field("log_stderr", &self.log_stderr)
            .finish_non_exhaustive()
    }
}

impl Supervisor {
    /// Starts building a supervisor around the given behavior.
    pub fn builder(behavior: BehaviorRef) -> super::builder::SupervisorBuilder {
        super::builder::SupervisorBuilder::new(behavior)
    }

    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new_internal(
        source: Box<dyn ConfigSource>,
        config: Config,
        log_stdout: bool,
        log_stderr: bool,
        behavior: BehaviorRef,
        hooks: Arc<dyn Hooks>,
        seed_logger: Option<Arc<dyn LogSink>>,
        bus: Bus,
        subs: Arc<SubscriberSet>,
        reporter: Arc<dyn ErrorReporter>,
        dumper: Arc<dyn DumpHandler>,
    ) -> Self {
        Self {
            source,
            config: RwLock::new(Arc::new(config)),
            stop: Arc::new(StopFlag::new()),
            logger: OnceLock::new(),
            seed_logger,
            log_stdout,
            log_stderr,
            behavior,
            hooks,
            bus,
            subs,
            reporter,
            dumper,
            reload_lock: Mutex::new(()),
            redirect_started: AtomicBool::new(false),
            listener_started: AtomicBool::new(false),
            #[cfg(unix)]
            redirectors: Mutex::new(Vec::new()),
        }
    }

    /// The current configuration snapshot.
    ///
    /// The returned `Arc` stays internally consistent across a concurrent
    /// reload; re-call to observe the newest snapshot.
    pub fn config(&self) -> Arc<Config> {
        let guard = self.config.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&guard)
    }

    /// The event bus; subscribe for lifecycle transitions.
    pub fn bus(&self) -> &Bus {
        &self.bus
    }

    /// True once any stop has been requested.
    pub fn stop_requested(&self) -> bool {
        self.stop.is_requested()
    }

    /// The graceful qualifier of the recorded stop request.
    pub fn stop_graceful(&self) -> bool {
        self.stop.is_graceful()
    }

    /// Whether stdout capture was enabled at construction.
    pub fn captures_stdout(&self) -> bool {
        self.log_stdout
    }

    /// Whether stderr capture was enabled at construction.
    pub fn captures_stderr(&self) -> bool {
        self.log_stderr
    }

    /// Requests a stop. The first request wins the `graceful` qualifier;
    /// later requests are idempotent no-ops. The run loop observes the flag
    /// on its next poll.
    pub fn stop(&self, graceful: bool) {
        if self.stop.request(graceful) {
            self.bus
                .publish(Event::now(EventKind::StopRequested).with_graceful(graceful));
        }
    }

    /// Reloads configuration and reopens the logger.
    ///
    /// `graceful` is forwarded for observers; this layer does not branch on
    /// it. The stop flag is untouched — a running worker continues unless
    /// it independently observes a stop.
    pub fn restart(&self, graceful: bool) -> Result<(), ConfigError> {
        self.bus
            .publish(Event::now(EventKind::RestartRequested).with_graceful(graceful));
        self.reload_and_reopen()
    }

    /// Reloads configuration and reopens the logger, without any
    /// implication about the worker's run state.
    ///
    /// Deliberately the same effect as [`Supervisor::restart`]: the two are
    /// distinct entry points because distinct signals trigger them.
    pub fn reload(&self) -> Result<(), ConfigError> {
        self.bus.publish(Event::now(EventKind::ReloadRequested));
        self.reload_and_reopen()
    }

    /// Triggers the diagnostic dump collaborator. Best effort; lifecycle
    /// state never changes.
    pub fn dump(&self) {
        self.bus.publish(Event::now(EventKind::DumpRequested));
        self.dumper.dump();
    }

    /// Registers one handler per logical signal with the dispatcher.
    ///
    /// Takes an `Arc` clone but the handlers capture only a non-owning
    /// reference; dropping the last external handle turns later deliveries
    /// into no-ops. Requires a Tokio runtime when the dispatcher spawns
    /// listener tasks (as [`OsSignals`] does).
    ///
    /// [`OsSignals`]: crate::OsSignals
    pub fn install_signal_handlers(
        self: Arc<Self>,
        dispatcher: &dyn SignalDispatcher,
    ) -> Result<(), RuntimeError> {
        for signal in Signal::ALL {
            let weak = Arc::downgrade(&self);
            let handler: SignalHandler = Box::new(move || {
                let Some(sup) = weak.upgrade() else { return };
                match signal {
                    Signal::GracefulStop | Signal::Detach => sup.stop(true),
                    Signal::ImmediateStop => sup.stop(false),
                    Signal::GracefulRestart => sup.restart_from_signal(true),
                    Signal::ImmediateRestart => sup.restart_from_signal(false),
                    Signal::Reload => sup.reload_from_signal(),
                    Signal::Dump => sup.dump(),
                }
            });
            dispatcher
                .register(signal, handler)
                .map_err(|e| RuntimeError::Signal {
                    signal: signal.as_label(),
                    error: e.to_string(),
                })?;
        }
        Ok(())
    }

    /// Runs the supervised lifecycle to completion.
    ///
    /// Creates the logger if absent, starts one redirector per enabled
    /// stream, then drives the worker. `after_run` fires on every exit
    /// path; run-loop failures surface in the returned result.
    pub async fn main(&self) -> Result<(), RuntimeError> {
        self.subscriber_listener();
        let logger = self.ensure_logger()?;
        self.start_redirectors(&logger)?;

        self.hooks.after_start().await;
        self.hooks.before_run().await;
        let outcome = AssertUnwindSafe(self.run()).catch_unwind().await;
        self.hooks.after_run().await;

        match outcome {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => Err(e.into()),
            Err(panic) => std::panic::resume_unwind(panic),
        }
    }

    /// Creates the worker unit and drives it.
    ///
    /// A cooperative [`WorkerError::Canceled`] exit after a stop request is
    /// a clean shutdown, not a failure.
    async fn run(&self) -> Result<(), WorkerError> {
        let unit = self.create_worker(0).await?;
        self.bus
            .publish(Event::now(EventKind::WorkerStarting).with_worker(unit.id()));

        match unit.run().await {
            Ok(()) | Err(WorkerError::Canceled) => {
                self.bus
                    .publish(Event::now(EventKind::WorkerStopped).with_worker(unit.id()));
                Ok(())
            }
            Err(e) => {
                self.bus.publish(
                    Event::now(EventKind::WorkerFailed)
                        .with_worker(unit.id())
                        .with_reason(e.to_string()),
                );
                Err(e)
            }
        }
    }

    /// Instantiates a worker unit bound to this supervisor and `id`.
    pub(crate) async fn create_worker(&self, id: u32) -> Result<WorkerUnit, WorkerError> {
        WorkerUnit::create(
            id,
            Arc::clone(&self.stop),
            self.logger.get().cloned(),
            Arc::clone(&self.behavior),
        )
        .await
    }

    fn restart_from_signal(&self, graceful: bool) {
        if let Err(e) = self.restart(graceful) {
            self.bus
                .publish(Event::now(EventKind::ReloadFailed).with_reason(e.to_string()));
        }
    }

    fn reload_from_signal(&self) {
        if let Err(e) = self.reload() {
            self.bus
                .publish(Event::now(EventKind::ReloadFailed).with_reason(e.to_string()));
        }
    }

    /// The reload/reopen critical section shared by `restart` and `reload`.
    ///
    /// A failed source load returns before anything is touched: the
    /// previous snapshot and logger stay fully operative.
    fn reload_and_reopen(&self) -> Result<(), ConfigError> {
        let _section = self
            .reload_lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        let fresh = Arc::new(self.source.reload()?);
        {
            let mut config = self.config.write().unwrap_or_else(PoisonError::into_inner);
            *config = fresh;
        }
        self.bus.publish(Event::now(EventKind::ConfigReloaded));

        if let Some(logger) = self.logger.get() {
            match logger.reopen() {
                Ok(()) => self.bus.publish(Event::now(EventKind::LoggerReopened)),
                // The sink keeps its previous resource on a failed reopen.
                Err(e) => self.reporter.report("logger", &e),
            }
        }
        Ok(())
    }

    /// Returns the logger, creating it on first use.
    fn ensure_logger(&self) -> Result<Arc<dyn LogSink>, RuntimeError> {
        if let Some(existing) = self.logger.get() {
            return Ok(Arc::clone(existing));
        }
        let sink = match &self.seed_logger {
            Some(seed) => Arc::clone(seed),
            None => self.open_sink()?,
        };
        Ok(Arc::clone(self.logger.get_or_init(|| sink)))
    }

    /// Builds a sink from the configured log target.
    fn open_sink(&self) -> Result<Arc<dyn LogSink>, RuntimeError> {
        let target = self
            .config()
            .log_target()
            .map_err(|e| RuntimeError::Logger {
                error: e.to_string(),
            })?;
        Ok(match target {
            LogTarget::Stdout => Arc::new(ConsoleSink::stdout()),
            LogTarget::Stderr => Arc::new(ConsoleSink::stderr()),
            LogTarget::File(path) => {
                Arc::new(FileSink::open(&path).map_err(|e| RuntimeError::Logger {
                    error: e.to_string(),
                })?)
            }
        })
    }

    /// Starts one redirector per enabled stream, once per process.
    fn start_redirectors(&self, logger: &Arc<dyn LogSink>) -> Result<(), RuntimeError> {
        if self.redirect_started.swap(true, Ordering::AcqRel) {
            return Ok(());
        }

        #[cfg(unix)]
        {
            let mut started = self
                .redirectors
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            for stream in [StdStream::Stdout, StdStream::Stderr] {
                let enabled = match stream {
                    StdStream::Stdout => self.log_stdout,
                    StdStream::Stderr => self.log_stderr,
                };
                if !enabled {
                    continue;
                }
                let redirector =
                    StreamRedirector::start(stream, Arc::clone(logger), Arc::clone(&self.reporter))
                        .map_err(|e| RuntimeError::Redirect {
                            stream: stream.as_label(),
                            error: e.to_string(),
                        })?;
                started.push(redirector);
                self.bus
                    .publish(Event::now(EventKind::RedirectStarted).with_scope(stream.as_label()));
            }
        }
        #[cfg(not(unix))]
        {
            let _ = logger;
        }
        Ok(())
    }

    /// Forwards bus events to the subscriber set, once per supervisor.
    fn subscriber_listener(&self) {
        if self.subs.is_empty() {
            return;
        }
        if self.listener_started.swap(true, Ordering::AcqRel) {
            return;
        }
        let mut rx = self.bus.subscribe();
        let set = Arc::clone(&self.subs);
        tokio::spawn(async move {
            use tokio::sync::broadcast::error::RecvError;
            loop {
                match rx.recv().await {
                    Ok(ev) => set.emit(&ev),
                    Err(RecvError::Lagged(_)) => continue,
                    Err(RecvError::Closed) => break,
                }
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::io;
    use std::sync::atomic::AtomicUsize;
    use std::time::Duration;

    use tokio::sync::broadcast::error::TryRecvError;
    use tokio::time::sleep;

    use super::*;
    use crate::core::config::{MapSource, Value};
    use crate::core::worker::WorkerContext;
    use crate::workers::WorkerFn;

    /// Sink recording writes and counting reopens.
    #[derive(Default)]
    struct ReopenSink {
        lines: Mutex<Vec<String>>,
        reopens: AtomicUsize,
    }

    impl LogSink for ReopenSink {
        fn write(&self, line: &str) -> io::Result<()> {
            self.lines
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(line.to_string());
            Ok(())
        }

        fn reopen(&self) -> io::Result<()> {
            self.reopens.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    #[derive(Default)]
    struct CountingHooks {
        order: Mutex<Vec<&'static str>>,
    }

    impl CountingHooks {
        fn calls(&self, name: &str) -> usize {
            self.order
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .iter()
                .filter(|c| **c == name)
                .count()
        }
    }

    #[async_trait]
    impl Hooks for CountingHooks {
        async fn after_start(&self) {
            self.order
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push("after_start");
        }

        async fn before_run(&self) {
            self.order
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push("before_run");
        }

        async fn after_run(&self) {
            self.order
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push("after_run");
        }
    }

    #[derive(Default)]
    struct CountingDump {
        calls: AtomicUsize,
    }

    impl DumpHandler for CountingDump {
        fn dump(&self) {
            self.calls.fetch_add(1, Ordering::SeqCst);
        }
    }

    /// In-test dispatcher: records handlers and invokes them on demand.
    #[derive(Default)]
    struct TestDispatcher {
        handlers: Mutex<HashMap<Signal, Vec<SignalHandler>>>,
    }

    impl TestDispatcher {
        fn deliver(&self, signal: Signal) {
            let handlers = self
                .handlers
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            for handler in handlers.get(&signal).into_iter().flatten() {
                handler();
            }
        }
    }

    impl SignalDispatcher for TestDispatcher {
        fn register(&self, signal: Signal, handler: SignalHandler) -> io::Result<()> {
            self.handlers
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .entry(signal)
                .or_default()
                .push(handler);
            Ok(())
        }
    }

    /// Source that can be told to fail its next loads.
    struct FlakySource {
        snapshot: Config,
        failing: AtomicBool,
    }

    impl ConfigSource for FlakySource {
        fn load(&self) -> Result<Config, ConfigError> {
            if self.failing.load(Ordering::SeqCst) {
                return Err(ConfigError::Load {
                    error: "source offline".into(),
                });
            }
            Ok(self.snapshot.clone())
        }
    }

    fn noop_behavior() -> BehaviorRef {
        WorkerFn::arc("noop", |_ctx: WorkerContext| async move {
            Ok::<_, WorkerError>(())
        })
    }

    /// Config that keeps `main()` away from real descriptor redirection.
    fn quiet_config() -> Config {
        Config::new().with("log_stdout", false).with("log_stderr", false)
    }

    fn drain_kinds(rx: &mut tokio::sync::broadcast::Receiver<Event>) -> Vec<EventKind> {
        let mut kinds = Vec::new();
        loop {
            match rx.try_recv() {
                Ok(ev) => kinds.push(ev.kind),
                Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => break,
                Err(TryRecvError::Lagged(_)) => continue,
            }
        }
        kinds
    }

    #[test]
    fn test_capture_flags_follow_the_loop_prevention_rule() {
        // Default target is stderr: stdout captured, stderr not.
        let sup = Supervisor::builder(noop_behavior())
            .build()
            .expect("build");
        assert!(sup.captures_stdout());
        assert!(!sup.captures_stderr());

        // Target is stdout: stdout capture disabled, stderr captured.
        let sup = Supervisor::builder(noop_behavior())
            .with_config(Config::new().with("log", "-"))
            .build()
            .expect("build");
        assert!(!sup.captures_stdout());
        assert!(sup.captures_stderr());

        // File target: both captured, explicit opt-out respected.
        let sup = Supervisor::builder(noop_behavior())
            .with_config(
                Config::new()
                    .with("log", "/tmp/app.log")
                    .with("log_stdout", false),
            )
            .build()
            .expect("build");
        assert!(!sup.captures_stdout());
        assert!(sup.captures_stderr());
    }

    #[test]
    fn test_construction_propagates_config_errors() {
        let failing = FlakySource {
            snapshot: Config::new(),
            failing: AtomicBool::new(true),
        };
        let err = Supervisor::builder(noop_behavior())
            .with_config_source(failing)
            .build()
            .expect_err("load failure must surface");
        assert_eq!(err.as_label(), "config_load_failed");

        let err = Supervisor::builder(noop_behavior())
            .with_config(Config::new().with("log_stdout", "yes"))
            .build()
            .expect_err("bad option shape must surface");
        assert_eq!(err.as_label(), "config_invalid_option");
    }

    #[tokio::test]
    async fn test_stop_is_idempotent_and_first_request_wins() {
        let sup = Supervisor::builder(noop_behavior())
            .build()
            .expect("build");
        let mut rx = sup.bus().subscribe();

        sup.stop(true);
        sup.stop(false);
        sup.stop(false);

        assert!(sup.stop_requested());
        assert!(sup.stop_graceful(), "first (graceful) request sticks");
        let kinds = drain_kinds(&mut rx);
        assert_eq!(
            kinds,
            vec![EventKind::StopRequested],
            "exactly one event for many requests"
        );
    }

    #[tokio::test]
    async fn test_reload_swaps_snapshot_atomically() {
        let source = Arc::new(MapSource::new(Config::new().with("answer", 1)));
        let sup = Supervisor::builder(noop_behavior())
            .with_config_source(Arc::clone(&source))
            .build()
            .expect("build");

        let before = sup.config();
        source.replace(Config::new().with("answer", 42));
        sup.reload().expect("reload");

        assert_eq!(sup.config().get("answer"), Some(&Value::Int(42)));
        // Readers holding the old snapshot keep a consistent view.
        assert_eq!(before.get("answer"), Some(&Value::Int(1)));
        assert!(!sup.stop_requested());
    }

    #[tokio::test]
    async fn test_failed_reload_leaves_config_and_logger_intact() {
        let source = Arc::new(FlakySource {
            snapshot: quiet_config().with("answer", 1),
            failing: AtomicBool::new(false),
        });
        let sink = Arc::new(ReopenSink::default());
        let sup = Supervisor::builder(noop_behavior())
            .with_config_source(Arc::clone(&source))
            .with_logger(sink.clone())
            .build()
            .expect("build");
        sup.main().await.expect("main");

        source.failing.store(true, Ordering::SeqCst);
        let reopens_before = sink.reopens.load(Ordering::SeqCst);
        let err = sup.restart(true).expect_err("reload must fail");
        assert_eq!(err.as_label(), "config_load_failed");

        assert_eq!(sup.config().get("answer"), Some(&Value::Int(1)));
        assert_eq!(
            sink.reopens.load(Ordering::SeqCst),
            reopens_before,
            "logger untouched when the load fails"
        );
    }

    #[tokio::test]
    async fn test_restart_mid_run_reopens_logger_and_keeps_worker_running() {
        let running = Arc::new(AtomicBool::new(false));
        let behavior = {
            let running = Arc::clone(&running);
            WorkerFn::arc("waiter", move |ctx: WorkerContext| {
                let running = Arc::clone(&running);
                async move {
                    running.store(true, Ordering::SeqCst);
                    ctx.stopped().await;
                    Err(WorkerError::Canceled)
                }
            })
        };

        let source = Arc::new(MapSource::new(quiet_config().with("answer", 1)));
        let sink = Arc::new(ReopenSink::default());
        let sup = Supervisor::builder(behavior)
            .with_config_source(Arc::clone(&source))
            .with_logger(sink.clone())
            .build()
            .expect("build");

        let main_task = {
            let sup = Arc::clone(&sup);
            tokio::spawn(async move { sup.main().await })
        };
        while !running.load(Ordering::SeqCst) {
            sleep(Duration::from_millis(2)).await;
        }

        source.replace(quiet_config().with("answer", 42));
        sup.restart(true).expect("restart");

        assert_eq!(sink.reopens.load(Ordering::SeqCst), 1);
        assert_eq!(sup.config().get("answer"), Some(&Value::Int(42)));
        assert!(!sup.stop_requested(), "restart does not request a stop");
        assert!(!main_task.is_finished(), "run loop continues uninterrupted");

        sup.stop(true);
        main_task
            .await
            .expect("join")
            .expect("cooperative exit maps to Ok");
    }

    #[tokio::test]
    async fn test_after_run_fires_on_success_and_failure() {
        for worker_fails in [false, true] {
            let hooks = Arc::new(CountingHooks::default());
            let behavior = WorkerFn::arc("maybe-fail", move |_ctx: WorkerContext| async move {
                if worker_fails {
                    Err(WorkerError::Fail {
                        error: "boom".into(),
                    })
                } else {
                    Ok(())
                }
            });
            let sup = Supervisor::builder(behavior)
                .with_config(quiet_config())
                .with_hooks(hooks.clone())
                .build()
                .expect("build");

            let result = sup.main().await;
            assert_eq!(result.is_err(), worker_fails);
            assert_eq!(hooks.calls("after_start"), 1);
            assert_eq!(hooks.calls("before_run"), 1);
            assert_eq!(hooks.calls("after_run"), 1, "after_run on every exit path");
        }
    }

    #[tokio::test]
    async fn test_after_run_fires_when_run_panics() {
        let hooks = Arc::new(CountingHooks::default());
        let behavior = WorkerFn::arc("panicker", |ctx: WorkerContext| async move {
            if ctx.id() == 0 {
                panic!("worker bug");
            }
            Ok(())
        });
        let sup = Supervisor::builder(behavior)
            .with_config(quiet_config())
            .with_hooks(hooks.clone())
            .build()
            .expect("build");

        let joined = {
            let sup = Arc::clone(&sup);
            tokio::spawn(async move { sup.main().await }).await
        };
        assert!(joined.expect_err("panic propagates").is_panic());
        assert_eq!(hooks.calls("after_run"), 1);
    }

    #[tokio::test]
    async fn test_polling_worker_observes_immediate_stop() {
        let hooks = Arc::new(CountingHooks::default());
        let behavior = WorkerFn::arc("poller", |ctx: WorkerContext| async move {
            loop {
                if ctx.stop_requested() {
                    return if ctx.stop_graceful() {
                        Ok(())
                    } else {
                        Err(WorkerError::Canceled)
                    };
                }
                sleep(Duration::from_millis(2)).await;
            }
        });
        let sup = Supervisor::builder(behavior)
            .with_config(quiet_config())
            .with_hooks(hooks.clone())
            .build()
            .expect("build");

        let main_task = {
            let sup = Arc::clone(&sup);
            tokio::spawn(async move { sup.main().await })
        };
        sleep(Duration::from_millis(10)).await;
        sup.stop(false);

        main_task.await.expect("join").expect("clean exit");
        assert_eq!(hooks.calls("before_run"), 1, "no second run is started");
    }

    #[tokio::test]
    async fn test_signal_bindings_drive_the_lifecycle() {
        let dumper = Arc::new(CountingDump::default());
        let source = Arc::new(MapSource::new(Config::new().with("answer", 1)));
        let sup = Supervisor::builder(noop_behavior())
            .with_config_source(Arc::clone(&source))
            .with_dump(dumper.clone())
            .build()
            .expect("build");
        let dispatcher = TestDispatcher::default();
        Arc::clone(&sup)
            .install_signal_handlers(&dispatcher)
            .expect("install");
        let mut rx = sup.bus().subscribe();

        dispatcher.deliver(Signal::Dump);
        assert_eq!(dumper.calls.load(Ordering::SeqCst), 1);
        assert!(!sup.stop_requested(), "dump never changes lifecycle state");

        source.replace(Config::new().with("answer", 2));
        dispatcher.deliver(Signal::Reload);
        assert_eq!(sup.config().get("answer"), Some(&Value::Int(2)));
        assert!(!sup.stop_requested());

        source.replace(Config::new().with("answer", 3));
        dispatcher.deliver(Signal::GracefulRestart);
        assert_eq!(sup.config().get("answer"), Some(&Value::Int(3)));

        dispatcher.deliver(Signal::Detach);
        assert!(sup.stop_requested(), "detach is modeled as a graceful stop");
        assert!(sup.stop_graceful());

        let kinds = drain_kinds(&mut rx);
        assert_eq!(
            kinds,
            vec![
                EventKind::DumpRequested,
                EventKind::ReloadRequested,
                EventKind::ConfigReloaded,
                EventKind::RestartRequested,
                EventKind::ConfigReloaded,
                EventKind::StopRequested,
            ]
        );
    }

    #[tokio::test]
    async fn test_immediate_stop_signal_is_not_graceful() {
        let sup = Supervisor::builder(noop_behavior())
            .build()
            .expect("build");
        let dispatcher = TestDispatcher::default();
        Arc::clone(&sup)
            .install_signal_handlers(&dispatcher)
            .expect("install");

        dispatcher.deliver(Signal::ImmediateStop);
        assert!(sup.stop_requested());
        assert!(!sup.stop_graceful());
    }

    #[tokio::test]
    async fn test_failed_reload_from_signal_publishes_event() {
        let source = Arc::new(FlakySource {
            snapshot: Config::new(),
            failing: AtomicBool::new(false),
        });
        let sup = Supervisor::builder(noop_behavior())
            .with_config_source(Arc::clone(&source))
            .build()
            .expect("build");
        let dispatcher = TestDispatcher::default();
        Arc::clone(&sup)
            .install_signal_handlers(&dispatcher)
            .expect("install");
        let mut rx = sup.bus().subscribe();

        source.failing.store(true, Ordering::SeqCst);
        dispatcher.deliver(Signal::Reload);

        let kinds = drain_kinds(&mut rx);
        assert_eq!(kinds, vec![EventKind::ReloadRequested, EventKind::ReloadFailed]);
    }
}
