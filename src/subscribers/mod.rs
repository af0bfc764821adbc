//! # Event subscribers for the supervisor.
//!
//! This module provides the [`Subscribe`] trait, the [`SubscriberSet`]
//! fan-out machinery, and a demo-grade [`LogWriter`].
//!
//! ```text
//! Event flow:
//!   Supervisor ── publish(Event) ──► Bus ──► subscriber listener
//!                                                │
//!                                           SubscriberSet::emit
//!                                      ┌─────────┼─────────┐
//!                                      ▼         ▼         ▼
//!                                 [queue S1] [queue S2] [queue SN]
//!                                      ▼         ▼         ▼
//!                               sub1.on_event  sub2...  subN...
//! ```

mod log;
mod set;
mod subscribe;

pub use log::LogWriter;
pub use set::SubscriberSet;
pub use subscribe::Subscribe;
