//! # Configuration snapshots and sources.
//!
//! A [`Config`] is an immutable mapping of option name → [`Value`]. The
//! supervisor never mutates a snapshot in place: a reload produces a whole
//! new snapshot that replaces the previous one atomically, while readers
//! holding the old `Arc<Config>` keep a consistent view.
//!
//! [`ConfigSource`] is the external collaborator that produces snapshots;
//! file formats and parsing live behind it, outside this crate's scope.
//! [`MapSource`] is the built-in in-memory source used by tests and
//! embeddings that assemble configuration programmatically.
//!
//! ## Options consumed by the core
//! - `log_stdout` (bool, default `true`) — capture stdout into the logger
//! - `log_stderr` (bool, default `true`) — capture stderr into the logger
//! - `log` (string) — log target: absent → stderr, `-` → stdout, anything
//!   else → file path. Also feeds the capture loop-prevention rule: a
//!   stream is never captured when the log target *is* that stream.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError};

use crate::error::ConfigError;

/// A single configuration value.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Bool(bool),
    Int(i64),
    Str(String),
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Str(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Str(v)
    }
}

impl Value {
    fn type_and_render(&self) -> String {
        match self {
            Value::Bool(b) => format!("bool {b}"),
            Value::Int(i) => format!("int {i}"),
            Value::Str(s) => format!("str {s:?}"),
        }
    }
}

/// Where log lines ultimately go, as configured by the `log` option.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LogTarget {
    /// Raw process stdout (`log = "-"`).
    Stdout,
    /// Raw process stderr (the default when `log` is absent).
    Stderr,
    /// A file path.
    File(PathBuf),
}

/// Immutable configuration snapshot.
///
/// ## Example
/// ```
/// use workvisor::Config;
///
/// let cfg = Config::new()
///     .with("log", "/var/log/app.log")
///     .with("log_stderr", false);
///
/// assert_eq!(cfg.bool_or("log_stdout", true).unwrap(), true);
/// assert_eq!(cfg.bool_or("log_stderr", true).unwrap(), false);
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Config {
    entries: HashMap<String, Value>,
}

impl Config {
    /// Creates an empty snapshot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of the snapshot with one option set.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.entries.insert(key.into(), value.into());
        self
    }

    /// Looks up a raw option value.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    /// Reads a boolean option, falling back to `default` when absent.
    ///
    /// A present value of any other shape is a [`ConfigError::Invalid`].
    pub fn bool_or(&self, key: &str, default: bool) -> Result<bool, ConfigError> {
        match self.entries.get(key) {
            None => Ok(default),
            Some(Value::Bool(b)) => Ok(*b),
            Some(other) => Err(ConfigError::Invalid {
                key: key.to_string(),
                value: other.type_and_render(),
            }),
        }
    }

    /// Resolves the configured log target (see module docs for the rules).
    pub fn log_target(&self) -> Result<LogTarget, ConfigError> {
        match self.entries.get("log") {
            None => Ok(LogTarget::Stderr),
            Some(Value::Str(s)) if s == "-" => Ok(LogTarget::Stdout),
            Some(Value::Str(s)) => Ok(LogTarget::File(PathBuf::from(s))),
            Some(other) => Err(ConfigError::Invalid {
                key: "log".to_string(),
                value: other.type_and_render(),
            }),
        }
    }
}

/// External collaborator that produces configuration snapshots.
///
/// `load` is called once at supervisor construction; `reload` on every
/// restart/reload request. Both propagate [`ConfigError`] — the supervisor
/// never recovers a failed load on the source's behalf.
pub trait ConfigSource: Send + Sync + 'static {
    /// Produces a fresh snapshot.
    fn load(&self) -> Result<Config, ConfigError>;

    /// Re-reads and produces a new snapshot. Defaults to `load`.
    fn reload(&self) -> Result<Config, ConfigError> {
        self.load()
    }
}

impl<T: ConfigSource> ConfigSource for Arc<T> {
    fn load(&self) -> Result<Config, ConfigError> {
        self.as_ref().load()
    }

    fn reload(&self) -> Result<Config, ConfigError> {
        self.as_ref().reload()
    }
}

/// In-memory [`ConfigSource`].
///
/// `replace` swaps the snapshot that subsequent `load`/`reload` calls
/// return, which is how tests model an edited config file.
pub struct MapSource {
    current: Mutex<Config>,
}

impl MapSource {
    /// Creates a source that serves the given snapshot.
    pub fn new(config: Config) -> Self {
        Self {
            current: Mutex::new(config),
        }
    }

    /// Replaces the snapshot served by future loads.
    pub fn replace(&self, config: Config) {
        *self.current.lock().unwrap_or_else(PoisonError::into_inner) = config;
    }
}

impl ConfigSource for MapSource {
    fn load(&self) -> Result<Config, ConfigError> {
        Ok(self
            .current
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone())
    }
}
