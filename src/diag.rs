//! # Diagnostic collaborators: uncaught-error sink and dump hook.
//!
//! Both collaborators are injected interfaces rather than process-wide
//! globals so they can be substituted in tests and embeddings.
//!
//! - [`ErrorReporter`] receives errors that were isolated from the main
//!   control flow (a log line that failed to forward, a reopen that failed).
//!   Reporting is best effort and must never panic.
//! - [`DumpHandler`] is invoked on the dump signal. It is best effort; the
//!   supervisor ignores whatever it does or fails to do, and lifecycle state
//!   never changes because of it.

use std::error::Error;

use crate::events::{Bus, Event, EventKind};

/// Sink for errors that are reported instead of propagated.
///
/// Implementations must not panic; the callers are isolation boundaries
/// (redirector pump loops, the reload critical section) that assume
/// reporting cannot fail.
pub trait ErrorReporter: Send + Sync + 'static {
    /// Reports one isolated error.
    ///
    /// `scope` names where the error surfaced (`stdout`, `stderr`,
    /// `logger`, ...).
    fn report(&self, scope: &str, error: &(dyn Error + 'static));
}

/// Hook invoked by the dump signal.
pub trait DumpHandler: Send + Sync + 'static {
    /// Produces a diagnostic dump (stack traces, state snapshot, ...).
    fn dump(&self);
}

/// Default [`ErrorReporter`]: publishes each report as an
/// [`EventKind::UncaughtError`] event on the bus.
pub struct EventReporter {
    bus: Bus,
}

impl EventReporter {
    /// Creates a reporter publishing to the given bus.
    pub fn new(bus: Bus) -> Self {
        Self { bus }
    }
}

impl ErrorReporter for EventReporter {
    fn report(&self, scope: &str, error: &(dyn Error + 'static)) {
        self.bus.publish(
            Event::now(EventKind::UncaughtError)
                .with_scope(scope)
                .with_reason(error.to_string()),
        );
    }
}

/// Default [`DumpHandler`]: does nothing.
pub struct NoopDump;

impl DumpHandler for NoopDump {
    fn dump(&self) {}
}
