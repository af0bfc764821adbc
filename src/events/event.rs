//! # Lifecycle events emitted by the supervisor.
//!
//! The [`EventKind`] enum classifies transitions across three categories:
//! - **Control events**: externally triggered requests (stop, restart,
//!   reload, dump).
//! - **Resource events**: config snapshot swaps, logger reopen, stream
//!   capture startup.
//! - **Worker events**: the supervised unit starting, stopping, failing.
//!
//! The [`Event`] struct carries metadata such as timestamps, the worker id,
//! reasons, and the graceful qualifier of a request.
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases
//! monotonically. Use `seq` to restore the exact order when events are
//! observed out of order.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::SystemTime;

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of supervisor lifecycle events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Control events ===
    /// A stop was requested (signal or direct call).
    ///
    /// Sets:
    /// - `graceful`: whether the current unit of work may finish
    /// - `at`: wall-clock timestamp
    /// - `seq`: global sequence
    ///
    /// Published at most once per supervisor; later requests are no-ops.
    StopRequested,

    /// A restart was requested; config reload + logger reopen follow.
    ///
    /// Sets:
    /// - `graceful`: qualifier of the triggering signal
    /// - `at` / `seq`
    RestartRequested,

    /// A reload was requested; config reload + logger reopen follow.
    ///
    /// Sets: `at` / `seq`
    ReloadRequested,

    /// A diagnostic dump was requested. Lifecycle state is unchanged.
    ///
    /// Sets: `at` / `seq`
    DumpRequested,

    // === Resource events ===
    /// A fresh config snapshot replaced the previous one.
    ///
    /// Sets: `at` / `seq`
    ConfigReloaded,

    /// Config reload failed; the previous snapshot and logger stay in place.
    ///
    /// Sets:
    /// - `reason`: the load failure message
    /// - `at` / `seq`
    ReloadFailed,

    /// The log sink re-pointed its underlying resource.
    ///
    /// Sets: `at` / `seq`
    LoggerReopened,

    /// A stream redirector started capturing a process stream.
    ///
    /// Sets:
    /// - `scope`: stream label (`stdout` / `stderr`)
    /// - `at` / `seq`
    RedirectStarted,

    /// An isolated error was reported to the uncaught-error sink.
    ///
    /// Sets:
    /// - `scope`: where the error surfaced (stream label, `logger`, ...)
    /// - `reason`: the error message
    /// - `at` / `seq`
    UncaughtError,

    // === Worker events ===
    /// The worker unit was created and is about to run.
    ///
    /// Sets:
    /// - `worker`: worker id
    /// - `at` / `seq`
    WorkerStarting,

    /// The worker finished or exited cooperatively after a stop request.
    ///
    /// Sets:
    /// - `worker`: worker id
    /// - `at` / `seq`
    WorkerStopped,

    /// The worker's run loop failed.
    ///
    /// Sets:
    /// - `worker`: worker id
    /// - `reason`: failure message
    /// - `at` / `seq`
    WorkerFailed,
}

/// Lifecycle event with optional metadata.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp (for logs)
/// - other optional fields are set depending on the [`EventKind`]
#[derive(Clone, Debug)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,

    /// Worker id, if the event concerns the supervised unit.
    pub worker: Option<u32>,
    /// Where the event originated (stream label, `logger`, ...).
    pub scope: Option<Arc<str>>,
    /// Human-readable reason (errors, failure details).
    pub reason: Option<Arc<str>>,
    /// Graceful qualifier of a stop/restart request.
    pub graceful: Option<bool>,
}

impl Event {
    /// Creates a new event of the given kind with the current timestamp and
    /// next sequence number.
    pub fn now(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            worker: None,
            scope: None,
            reason: None,
            graceful: None,
        }
    }

    /// Attaches a worker id.
    #[inline]
    pub fn with_worker(mut self, id: u32) -> Self {
        self.worker = Some(id);
        self
    }

    /// Attaches an origin scope (stream label, `logger`, ...).
    #[inline]
    pub fn with_scope(mut self, scope: impl Into<Arc<str>>) -> Self {
        self.scope = Some(scope.into());
        self
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Attaches the graceful qualifier of a request.
    #[inline]
    pub fn with_graceful(mut self, graceful: bool) -> Self {
        self.graceful = Some(graceful);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seq_is_monotonic() {
        let a = Event::now(EventKind::StopRequested);
        let b = Event::now(EventKind::ConfigReloaded);
        assert!(b.seq > a.seq, "seq {} should exceed {}", b.seq, a.seq);
    }

    #[test]
    fn test_builders_set_fields() {
        let ev = Event::now(EventKind::WorkerFailed)
            .with_worker(0)
            .with_reason("boom")
            .with_graceful(false);
        assert_eq!(ev.kind, EventKind::WorkerFailed);
        assert_eq!(ev.worker, Some(0));
        assert_eq!(ev.reason.as_deref(), Some("boom"));
        assert_eq!(ev.graceful, Some(false));
    }
}
