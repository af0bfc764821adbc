//! Runtime core: lifecycle orchestration.
//!
//! This module contains the embedded implementation of the supervisor
//! runtime.
//!
//! Internal modules:
//! - [`supervisor`]: the state machine — signals, reload, startup, teardown;
//! - [`builder`]: collaborator wiring and construction-time validation;
//! - [`config`]: immutable snapshots and the source seam;
//! - [`stop`]: the monotonic stop flag;
//! - [`redirect`]: stdout/stderr capture into the log sink;
//! - [`worker`]: the supervised unit and its context.

mod builder;
mod config;
mod redirect;
mod stop;
mod supervisor;
mod worker;

pub use builder::SupervisorBuilder;
pub use config::{Config, ConfigSource, LogTarget, MapSource, Value};
pub use redirect::StdStream;
#[cfg(unix)]
pub use redirect::StreamRedirector;
pub use stop::StopFlag;
pub use supervisor::{Hooks, Supervisor};
pub use worker::{WorkerContext, WorkerUnit};
