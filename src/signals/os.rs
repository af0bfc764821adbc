//! # OS-backed signal dispatcher.
//!
//! Maps the logical control signals onto POSIX signals and delivers them
//! through [`tokio::signal`]. One listener task is spawned per
//! registration, so `register` must be called within a Tokio runtime.
//!
//! ## Unix mapping
//! | POSIX | Logical |
//! |---|---|
//! | `SIGTERM` | graceful stop |
//! | `SIGQUIT` | immediate stop |
//! | `SIGUSR1` | graceful restart |
//! | `SIGHUP` | immediate restart |
//! | `SIGUSR2` | reload |
//! | `SIGINT` | detach |
//! | `SIGCONT` | dump |
//!
//! ## Other platforms
//! Only Ctrl-C is wired, to the graceful stop; the remaining registrations
//! succeed as no-ops.

use std::io;

use super::{Signal, SignalDispatcher, SignalHandler};

/// [`SignalDispatcher`] backed by the process's OS signal set.
#[derive(Default)]
pub struct OsSignals;

impl OsSignals {
    pub fn new() -> Self {
        Self
    }
}

#[cfg(unix)]
impl SignalDispatcher for OsSignals {
    fn register(&self, signal: Signal, handler: SignalHandler) -> io::Result<()> {
        use tokio::signal::unix::{SignalKind, signal as listen};

        let kind = match signal {
            Signal::GracefulStop => SignalKind::terminate(),
            Signal::ImmediateStop => SignalKind::quit(),
            Signal::GracefulRestart => SignalKind::user_defined1(),
            Signal::ImmediateRestart => SignalKind::hangup(),
            Signal::Reload => SignalKind::user_defined2(),
            Signal::Detach => SignalKind::interrupt(),
            Signal::Dump => SignalKind::from_raw(nix::libc::SIGCONT),
        };

        let mut rx = listen(kind)?;
        tokio::spawn(async move {
            while rx.recv().await.is_some() {
                handler();
            }
        });
        Ok(())
    }
}

#[cfg(not(unix))]
impl SignalDispatcher for OsSignals {
    fn register(&self, signal: Signal, handler: SignalHandler) -> io::Result<()> {
        if signal != Signal::GracefulStop {
            return Ok(());
        }
        tokio::spawn(async move {
            loop {
                if tokio::signal::ctrl_c().await.is_err() {
                    break;
                }
                handler();
            }
        });
        Ok(())
    }
}
