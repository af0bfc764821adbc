//! # Simple logging subscriber for debugging and demos.
//!
//! [`LogWriter`] prints lifecycle events to stdout in a human-readable
//! format. Useful for development and examples; implement a custom
//! [`Subscribe`] for structured logging or metrics collection.
//!
//! ## Output format
//! ```text
//! [stop-requested] graceful=true
//! [restart-requested] graceful=false
//! [config-reloaded]
//! [reload-failed] err="config load failed: ..."
//! [logger-reopened]
//! [redirect-started] stream=stdout
//! [worker-starting] wid=0
//! [worker-failed] wid=0 err="worker failed: boom"
//! ```

use async_trait::async_trait;

use crate::events::{Event, EventKind};

use super::Subscribe;

/// Simple stdout logging subscriber.
///
/// When stdout capture is enabled, its output flows through the redirector
/// into the log sink like any other print.
#[derive(Default)]
pub struct LogWriter;

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_event(&self, e: &Event) {
        match e.kind {
            EventKind::StopRequested => {
                println!("[stop-requested] graceful={:?}", e.graceful.unwrap_or(true));
            }
            EventKind::RestartRequested => {
                println!(
                    "[restart-requested] graceful={:?}",
                    e.graceful.unwrap_or(true)
                );
            }
            EventKind::ReloadRequested => {
                println!("[reload-requested]");
            }
            EventKind::DumpRequested => {
                println!("[dump-requested]");
            }
            EventKind::ConfigReloaded => {
                println!("[config-reloaded]");
            }
            EventKind::ReloadFailed => {
                println!("[reload-failed] err={:?}", e.reason.as_deref());
            }
            EventKind::LoggerReopened => {
                println!("[logger-reopened]");
            }
            EventKind::RedirectStarted => {
                println!("[redirect-started] stream={:?}", e.scope.as_deref());
            }
            EventKind::UncaughtError => {
                println!(
                    "[uncaught-error] scope={:?} err={:?}",
                    e.scope.as_deref(),
                    e.reason.as_deref()
                );
            }
            EventKind::WorkerStarting => {
                println!("[worker-starting] wid={:?}", e.worker);
            }
            EventKind::WorkerStopped => {
                println!("[worker-stopped] wid={:?}", e.worker);
            }
            EventKind::WorkerFailed => {
                println!(
                    "[worker-failed] wid={:?} err={:?}",
                    e.worker,
                    e.reason.as_deref()
                );
            }
        }
    }

    fn name(&self) -> &'static str {
        "log_writer"
    }
}
