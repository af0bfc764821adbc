//! # Log sinks: where captured output and worker log lines go.
//!
//! This module provides the [`LogSink`] trait plus two built-in
//! implementations:
//! - [`FileSink`] — append-only file with reopen-for-rotation
//! - [`ConsoleSink`] — raw stdout/stderr, reopen is a no-op
//!
//! The concrete storage, formatting, and rotation scheduling live outside
//! the supervisor; the core only relies on the two-method contract below.
//!
//! ## Contract
//! - `write` appends one line (without its trailing newline); concurrent
//!   writers are allowed.
//! - `reopen` atomically re-points the underlying resource while preserving
//!   the sink's identity to callers. Lines accepted before the reopen are
//!   never dropped; on failure the previous resource stays in service.

mod console;
mod file;

use std::io;

pub use console::ConsoleSink;
pub use file::FileSink;

/// Destination for log lines, shared by the supervisor, the worker, and
/// every stream redirector.
pub trait LogSink: Send + Sync + 'static {
    /// Appends one line. The line carries no trailing newline.
    fn write(&self, line: &str) -> io::Result<()>;

    /// Re-points the underlying resource (e.g. after log rotation) without
    /// dropping already-accepted lines. On failure the previous resource
    /// remains in service.
    fn reopen(&self) -> io::Result<()>;
}
