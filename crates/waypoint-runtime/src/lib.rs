#![forbid(unsafe_code)]

//! Scheduling primitives for Waypoint.
//!
//! The tour engine runs on a single cooperative event loop. Nothing here
//! spawns threads or sleeps: time is a virtual clock advanced by the host,
//! and every wait is a cancellable entry in a [`TimerQueue`].

pub mod retry;
pub mod timer;

pub use retry::{BackoffStrategy, RetryPolicy};
pub use timer::{Fired, TimerId, TimerQueue};
