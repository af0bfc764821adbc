//! Error types used by the workvisor runtime and workers.
//!
//! This module defines three error enums:
//!
//! - [`ConfigError`] — configuration load/reload failures.
//! - [`WorkerError`] — errors raised by the supervised worker unit.
//! - [`RuntimeError`] — errors raised by supervisor startup and teardown.
//!
//! All types provide helper methods (`as_label`, `as_message`) for logging
//! and metrics. Config failures are always propagated to the caller of the
//! operation that triggered the load; a failed reload never disturbs the
//! snapshot already in place.

use thiserror::Error;

/// # Errors produced by configuration loading.
///
/// Returned by [`ConfigSource`](crate::ConfigSource) implementations and by
/// supervisor operations that re-read configuration (`restart`, `reload`).
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The configuration source could not produce a snapshot.
    #[error("config load failed: {error}")]
    Load {
        /// The underlying error message.
        error: String,
    },

    /// An option was present but carried a value of the wrong shape.
    #[error("invalid value for option `{key}`: {value}")]
    Invalid {
        /// The offending option name.
        key: String,
        /// Human-readable rendering of the rejected value.
        value: String,
    },
}

impl ConfigError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            ConfigError::Load { .. } => "config_load_failed",
            ConfigError::Invalid { .. } => "config_invalid_option",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            ConfigError::Load { error } => format!("load failed: {error}"),
            ConfigError::Invalid { key, value } => format!("option {key} rejected value {value}"),
        }
    }
}

/// # Errors produced by the supervised worker.
///
/// `Init` comes out of worker creation; the surrounding system decides
/// whether to retry. `Canceled` is the cooperative exit taken after a stop
/// request and is treated as a clean shutdown by the supervisor.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum WorkerError {
    /// The behavior's initializer failed; the worker never started.
    #[error("worker init failed: {error}")]
    Init {
        /// The underlying error message.
        error: String,
    },

    /// The worker's run loop failed.
    #[error("worker failed: {error}")]
    Fail {
        /// The underlying error message.
        error: String,
    },

    /// The worker observed a stop request and exited cooperatively.
    #[error("stop requested")]
    Canceled,
}

impl WorkerError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            WorkerError::Init { .. } => "worker_init_failed",
            WorkerError::Fail { .. } => "worker_failed",
            WorkerError::Canceled => "worker_canceled",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            WorkerError::Init { error } => format!("init: {error}"),
            WorkerError::Fail { error } => format!("run: {error}"),
            WorkerError::Canceled => "stop requested".to_string(),
        }
    }

    /// True for failures raised before the run loop started.
    pub fn is_init(&self) -> bool {
        matches!(self, WorkerError::Init { .. })
    }
}

/// # Errors produced by the supervisor itself.
///
/// Raised by `main()` and `install_signal_handlers()`; worker and config
/// failures are wrapped so callers get one result type for the whole
/// lifecycle.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum RuntimeError {
    /// Configuration could not be (re)loaded.
    #[error("config: {0}")]
    Config(#[from] ConfigError),

    /// The log sink could not be created from the configured target.
    #[error("logger setup failed: {error}")]
    Logger {
        /// The underlying error message.
        error: String,
    },

    /// A stream redirector could not be started.
    #[error("stream redirect failed on {stream}: {error}")]
    Redirect {
        /// Which process stream was being captured.
        stream: &'static str,
        /// The underlying error message.
        error: String,
    },

    /// A signal handler could not be registered with the dispatcher.
    #[error("signal registration failed for {signal}: {error}")]
    Signal {
        /// Label of the logical signal.
        signal: &'static str,
        /// The underlying error message.
        error: String,
    },

    /// The worker unit failed to initialize or run.
    #[error("worker: {0}")]
    Worker(#[from] WorkerError),
}

impl RuntimeError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            RuntimeError::Config(_) => "runtime_config",
            RuntimeError::Logger { .. } => "runtime_logger_setup",
            RuntimeError::Redirect { .. } => "runtime_redirect",
            RuntimeError::Signal { .. } => "runtime_signal_install",
            RuntimeError::Worker(_) => "runtime_worker",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            RuntimeError::Config(e) => e.as_message(),
            RuntimeError::Logger { error } => format!("logger: {error}"),
            RuntimeError::Redirect { stream, error } => format!("redirect {stream}: {error}"),
            RuntimeError::Signal { signal, error } => format!("signal {signal}: {error}"),
            RuntimeError::Worker(e) => e.as_message(),
        }
    }
}
