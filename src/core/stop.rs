//! # Stop flag: the one-way switch the run loop polls.
//!
//! [`StopFlag`] encodes "no stop requested" / "graceful stop" / "immediate
//! stop" in a single atomic, so the request and its qualifier become visible
//! together and the first request wins races against later ones.
//!
//! ## Rules
//! - The transition is monotonic: once requested, never cleared for the
//!   lifetime of the process.
//! - Repeated requests are no-ops; the `graceful` qualifier of the *first*
//!   request is the one workers observe.
//! - No cancellation token is handed to behavior code; cooperation is by
//!   polling. A [`CancellationToken`] is kept internally so async waiters
//!   can park on [`StopFlag::requested`] instead of spinning.

use std::sync::atomic::{AtomicU8, Ordering};

use tokio_util::sync::CancellationToken;

const RUNNING: u8 = 0;
const STOP_GRACEFUL: u8 = 1;
const STOP_IMMEDIATE: u8 = 2;

/// Single-writer-many-reader stop switch.
#[derive(Debug, Default)]
pub struct StopFlag {
    state: AtomicU8,
    token: CancellationToken,
}

impl StopFlag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a stop request. Returns `true` only for the request that won
    /// the false→true transition; later calls change nothing.
    pub(crate) fn request(&self, graceful: bool) -> bool {
        let next = if graceful { STOP_GRACEFUL } else { STOP_IMMEDIATE };
        let won = self
            .state
            .compare_exchange(RUNNING, next, Ordering::AcqRel, Ordering::Acquire)
            .is_ok();
        if won {
            self.token.cancel();
        }
        won
    }

    /// True once any stop has been requested.
    pub fn is_requested(&self) -> bool {
        self.state.load(Ordering::Acquire) != RUNNING
    }

    /// True when the recorded request allows the current unit of work to
    /// finish. Only meaningful after [`StopFlag::is_requested`] is true.
    pub fn is_graceful(&self) -> bool {
        self.state.load(Ordering::Acquire) == STOP_GRACEFUL
    }

    /// Completes once a stop has been requested.
    pub async fn requested(&self) {
        self.token.cancelled().await;
    }
}
