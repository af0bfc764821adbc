//! # Control signals: logical names and the dispatcher seam.
//!
//! The supervisor reacts to seven *logical* signals. How they are delivered
//! — which OS signals map to them, or whether they come from a test harness
//! or an admin endpoint — is behind the [`SignalDispatcher`] trait.
//!
//! | Logical signal | Lifecycle effect |
//! |---|---|
//! | `GracefulStop` | `stop(graceful = true)` |
//! | `ImmediateStop` | `stop(graceful = false)` |
//! | `GracefulRestart` | `restart(graceful = true)` |
//! | `ImmediateRestart` | `restart(graceful = false)` |
//! | `Reload` | `reload()` |
//! | `Detach` | `stop(graceful = true)` — process-detach mechanics belong to the daemonization layer |
//! | `Dump` | diagnostic dump; lifecycle state unchanged |
//!
//! Handlers run asynchronously relative to the run loop: a dispatcher may
//! invoke them from any task at any time, including mid-`run()`.

mod os;

use std::io;

pub use os::OsSignals;

/// The logical control signals understood by the supervisor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Signal {
    GracefulStop,
    ImmediateStop,
    GracefulRestart,
    ImmediateRestart,
    Reload,
    Detach,
    Dump,
}

impl Signal {
    /// Every logical signal, in registration order.
    pub const ALL: [Signal; 7] = [
        Signal::GracefulStop,
        Signal::ImmediateStop,
        Signal::GracefulRestart,
        Signal::ImmediateRestart,
        Signal::Reload,
        Signal::Detach,
        Signal::Dump,
    ];

    /// Stable label for logs and error messages.
    pub fn as_label(&self) -> &'static str {
        match self {
            Signal::GracefulStop => "graceful_stop",
            Signal::ImmediateStop => "immediate_stop",
            Signal::GracefulRestart => "graceful_restart",
            Signal::ImmediateRestart => "immediate_restart",
            Signal::Reload => "reload",
            Signal::Detach => "detach",
            Signal::Dump => "dump",
        }
    }
}

/// Callback bound to one logical signal.
///
/// Invoked once per delivery, possibly concurrently with the run loop; the
/// supervisor's handler bodies are all safe under that concurrency.
pub type SignalHandler = Box<dyn Fn() + Send + Sync + 'static>;

/// Delivery mechanism for logical signals.
///
/// Registrations for distinct signals coexist independently. The dispatcher
/// holds only the handlers — never the supervisor itself; supervisor
/// handlers capture a non-owning reference internally.
pub trait SignalDispatcher: Send + Sync + 'static {
    /// Arranges for `handler` to be invoked on every delivery of `signal`.
    fn register(&self, signal: Signal, handler: SignalHandler) -> io::Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labels_are_distinct() {
        let mut labels: Vec<_> = Signal::ALL.iter().map(Signal::as_label).collect();
        labels.sort_unstable();
        labels.dedup();
        assert_eq!(labels.len(), Signal::ALL.len());
    }
}
