//! # Builder: wires a supervisor from its collaborators.
//!
//! Construction loads configuration once and derives the capture flags from
//! it, so a bad config fails here — before any signal handler or worker
//! exists. Every collaborator has a sensible default; only the behavior is
//! mandatory.

use std::sync::Arc;

use crate::core::config::{Config, ConfigSource, LogTarget, MapSource};
use crate::core::supervisor::{Hooks, NoopHooks, Supervisor};
use crate::diag::{DumpHandler, ErrorReporter, EventReporter, NoopDump};
use crate::error::ConfigError;
use crate::events::Bus;
use crate::sinks::LogSink;
use crate::subscribers::{Subscribe, SubscriberSet};
use crate::workers::BehaviorRef;

const DEFAULT_BUS_CAPACITY: usize = 256;

/// Builder for [`Supervisor`].
///
/// ## Defaults
/// - config source: empty [`MapSource`] (all options at their defaults)
/// - logger: created lazily from the configured log target
/// - hooks: no-ops
/// - error reporter: [`EventReporter`] on the supervisor's bus
/// - dump handler: no-op
/// - subscribers: none
pub struct SupervisorBuilder {
    behavior: BehaviorRef,
    source: Option<Box<dyn ConfigSource>>,
    logger: Option<Arc<dyn LogSink>>,
    hooks: Option<Arc<dyn Hooks>>,
    reporter: Option<Arc<dyn ErrorReporter>>,
    dumper: Option<Arc<dyn DumpHandler>>,
    subscribers: Vec<Arc<dyn Subscribe>>,
    bus_capacity: usize,
}

impl SupervisorBuilder {
    /// Creates a builder around the given behavior.
    pub fn new(behavior: BehaviorRef) -> Self {
        Self {
            behavior,
            source: None,
            logger: None,
            hooks: None,
            reporter: None,
            dumper: None,
            subscribers: Vec::new(),
            bus_capacity: DEFAULT_BUS_CAPACITY,
        }
    }

    /// Sets the configuration source consulted at build time and on every
    /// restart/reload.
    pub fn with_config_source(mut self, source: impl ConfigSource) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Shorthand for a fixed in-memory configuration.
    pub fn with_config(self, config: Config) -> Self {
        self.with_config_source(MapSource::new(config))
    }

    /// Injects the log sink instead of building one from the config's log
    /// target on first `main()`.
    pub fn with_logger(mut self, logger: Arc<dyn LogSink>) -> Self {
        self.logger = Some(logger);
        self
    }

    /// Sets the lifecycle hooks.
    pub fn with_hooks(mut self, hooks: Arc<dyn Hooks>) -> Self {
        self.hooks = Some(hooks);
        self
    }

    /// Sets the uncaught-error sink.
    pub fn with_reporter(mut self, reporter: Arc<dyn ErrorReporter>) -> Self {
        self.reporter = Some(reporter);
        self
    }

    /// Sets the diagnostic dump collaborator.
    pub fn with_dump(mut self, dumper: Arc<dyn DumpHandler>) -> Self {
        self.dumper = Some(dumper);
        self
    }

    /// Sets event subscribers for observability.
    ///
    /// Subscribers receive lifecycle events through dedicated workers with
    /// bounded queues; requires a Tokio runtime at build time when
    /// non-empty.
    pub fn with_subscribers(mut self, subscribers: Vec<Arc<dyn Subscribe>>) -> Self {
        self.subscribers = subscribers;
        self
    }

    /// Overrides the event bus capacity.
    pub fn with_bus_capacity(mut self, capacity: usize) -> Self {
        self.bus_capacity = capacity;
        self
    }

    /// Loads configuration and assembles the supervisor.
    ///
    /// Fails with [`ConfigError`] when the source cannot produce a snapshot
    /// or when a core option carries a value of the wrong shape.
    pub fn build(self) -> Result<Arc<Supervisor>, ConfigError> {
        let source = self
            .source
            .unwrap_or_else(|| Box::new(MapSource::new(Config::new())));
        let config = source.load()?;

        // Capture a stream unless the log target *is* that stream; anything
        // else would feed the logger's own output back into the capture pipe.
        let target = config.log_target()?;
        let log_stdout = config.bool_or("log_stdout", true)? && target != LogTarget::Stdout;
        let log_stderr = config.bool_or("log_stderr", true)? && target != LogTarget::Stderr;

        let bus = Bus::new(self.bus_capacity);
        let reporter = self
            .reporter
            .unwrap_or_else(|| Arc::new(EventReporter::new(bus.clone())));
        let subs = Arc::new(SubscriberSet::new(self.subscribers));

        Ok(Arc::new(Supervisor::new_internal(
            source,
            config,
            log_stdout,
            log_stderr,
            self.behavior,
            self.hooks.unwrap_or_else(|| Arc::new(NoopHooks)),
            self.logger,
            bus,
            subs,
            reporter,
            self.dumper.unwrap_or_else(|| Arc::new(NoopDump)),
        )))
    }
}
