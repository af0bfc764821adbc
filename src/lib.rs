//! # workvisor
//!
//! **Workvisor** is a single-process worker supervisor for Rust.
//!
//! It owns one logical "server": a long-lived [`Supervisor`] drives a
//! pluggable unit of work (the [`WorkerBehavior`]) and reacts to external
//! control signals — stop, restart, reload, dump, detach — by stepping
//! through a well-defined lifecycle. It also redirects the process's own
//! stdout/stderr into a structured log sink, so arbitrary prints from
//! worker code are captured instead of lost or interleaved.
//!
//! ## Architecture
//! ```text
//!                 ┌────────────────┐        ┌────────────────┐
//!                 │  ConfigSource  │        │ SignalDispatcher│
//!                 │ (load/reload)  │        │ (OS or custom)  │
//!                 └──────┬─────────┘        └───────┬────────┘
//!                        ▼                          ▼ stop/restart/reload/dump
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  Supervisor (lifecycle state machine)                             │
//! │  - config snapshot (Arc swap, never torn)                         │
//! │  - StopFlag (monotonic, first request wins)                       │
//! │  - logger (lazy, at most one, shared with redirectors)            │
//! │  - Bus (broadcast lifecycle events) ──► SubscriberSet             │
//! └──────┬──────────────────────┬────────────────────┬────────────────┘
//!        ▼                      ▼                    ▼
//! ┌──────────────┐      ┌──────────────┐     ┌──────────────┐
//! │  WorkerUnit  │      │ StreamRedir. │     │ StreamRedir. │
//! │ (behavior +  │      │   (stdout)   │     │   (stderr)   │
//! │  context)    │      └──────┬───────┘     └──────┬───────┘
//! └──────────────┘             └───────► LogSink ◄──┘
//! ```
//!
//! ## Lifecycle
//! ```text
//! Constructed ──► Running ──► { StopRequested } ──► Terminated
//!                    ▲
//!                    └── RestartRequested / ReloadRequested re-enter Running
//!                        (config reload + logger reopen; run loop untouched)
//! ```
//!
//! | Area | Description | Key types / traits |
//! |---|---|---|
//! | **Supervision** | Lifecycle, signals, reload, teardown. | [`Supervisor`], [`Hooks`] |
//! | **Workers** | Pluggable unit of work. | [`WorkerBehavior`], [`WorkerFn`], [`WorkerContext`] |
//! | **Capture** | stdout/stderr into the log sink. | [`StreamRedirector`], [`LogSink`] |
//! | **Signals** | Logical control signals and delivery. | [`Signal`], [`SignalDispatcher`], [`OsSignals`] |
//! | **Config** | Immutable snapshots and sources. | [`Config`], [`ConfigSource`], [`MapSource`] |
//! | **Observability** | Lifecycle events, fan-out. | [`Event`], [`Bus`], [`Subscribe`] |
//! | **Errors** | Typed failures per layer. | [`ConfigError`], [`WorkerError`], [`RuntimeError`] |
//!
//! ## Example
//! ```no_run
//! use workvisor::{Config, OsSignals, Supervisor, WorkerContext, WorkerError, WorkerFn};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let behavior = WorkerFn::arc("ticker", |ctx: WorkerContext| async move {
//!         while !ctx.stop_requested() {
//!             println!("tick"); // captured into the log sink
//!             tokio::time::sleep(std::time::Duration::from_secs(1)).await;
//!         }
//!         Ok::<_, WorkerError>(())
//!     });
//!
//!     let supervisor = Supervisor::builder(behavior)
//!         .with_config(Config::new().with("log", "/var/log/app.log"))
//!         .build()?;
//!
//!     supervisor.clone().install_signal_handlers(&OsSignals::new())?;
//!     supervisor.main().await?;
//!     Ok(())
//! }
//! ```

mod core;
mod diag;
mod error;
mod events;
mod signals;
mod sinks;
mod subscribers;
mod workers;

// ---- Public re-exports ----

pub use crate::core::{
    Config, ConfigSource, Hooks, LogTarget, MapSource, StdStream, Supervisor, SupervisorBuilder,
    Value, WorkerContext, WorkerUnit,
};
#[cfg(unix)]
pub use crate::core::StreamRedirector;
pub use diag::{DumpHandler, ErrorReporter, EventReporter, NoopDump};
pub use error::{ConfigError, RuntimeError, WorkerError};
pub use events::{Bus, Event, EventKind};
pub use signals::{OsSignals, Signal, SignalDispatcher, SignalHandler};
pub use sinks::{ConsoleSink, FileSink, LogSink};
pub use subscribers::{LogWriter, Subscribe, SubscriberSet};
pub use workers::{BehaviorRef, WorkerBehavior, WorkerFn};
