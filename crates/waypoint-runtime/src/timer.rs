#![forbid(unsafe_code)]

//! Virtual-clock timer queue.
//!
//! A [`TimerQueue`] holds one-shot timers keyed by [`TimerId`]. The owner
//! advances time explicitly and pops due timers one at a time, so a handler
//! that cancels or arms timers is observed by the very next pop within the
//! same tick.
//!
//! # Invariants
//!
//! 1. A cancelled timer is never returned by [`TimerQueue::pop_due`].
//! 2. Due timers pop in `(deadline, id)` order; ids grow monotonically, so
//!    timers sharing a deadline fire in the order they were armed.
//! 3. The clock never moves backwards.
//!
//! # Example
//!
//! ```
//! use waypoint_runtime::timer::TimerQueue;
//! use web_time::Duration;
//!
//! let mut timers = TimerQueue::new();
//! let slow = timers.schedule(Duration::from_millis(300), "slow");
//! timers.schedule(Duration::from_millis(100), "fast");
//! timers.cancel(slow);
//!
//! let until = timers.now() + Duration::from_millis(500);
//! let fired = timers.pop_due(until).map(|f| f.payload);
//! assert_eq!(fired, Some("fast"));
//! assert!(timers.pop_due(until).is_none());
//! ```

use web_time::Duration;

/// Identifier of a scheduled timer. Never reused by the queue that issued it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

impl TimerId {
    /// Raw numeric id (for logging).
    #[inline]
    pub const fn get(self) -> u64 {
        self.0
    }
}

/// A timer that reached its deadline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fired<T> {
    pub id: TimerId,
    /// Clock reading at which the timer was due.
    pub deadline: Duration,
    pub payload: T,
}

#[derive(Debug, Clone)]
struct Pending<T> {
    id: TimerId,
    deadline: Duration,
    payload: T,
}

/// One-shot timers on a host-driven clock.
#[derive(Debug, Clone)]
pub struct TimerQueue<T> {
    now: Duration,
    next_id: u64,
    pending: Vec<Pending<T>>,
}

impl<T> Default for TimerQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> TimerQueue<T> {
    /// Create an empty queue with the clock at zero.
    #[must_use]
    pub fn new() -> Self {
        Self {
            now: Duration::ZERO,
            next_id: 0,
            pending: Vec::new(),
        }
    }

    /// Current clock reading.
    #[must_use]
    pub fn now(&self) -> Duration {
        self.now
    }

    /// Number of pending timers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Arm a timer that becomes due `delay` after the current clock reading.
    pub fn schedule(&mut self, delay: Duration, payload: T) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        let deadline = self.now.checked_add(delay).unwrap_or(Duration::MAX);
        self.pending.push(Pending {
            id,
            deadline,
            payload,
        });
        id
    }

    /// Cancel a pending timer, returning its payload if it was still armed.
    pub fn cancel(&mut self, id: TimerId) -> Option<T> {
        let pos = self.pending.iter().position(|p| p.id == id)?;
        Some(self.pending.swap_remove(pos).payload)
    }

    /// Cancel everything. Returns how many timers were removed.
    pub fn clear(&mut self) -> usize {
        let n = self.pending.len();
        self.pending.clear();
        n
    }

    /// Count pending timers whose payload matches.
    #[must_use]
    pub fn count_where(&self, mut pred: impl FnMut(&T) -> bool) -> usize {
        self.pending.iter().filter(|p| pred(&p.payload)).count()
    }

    /// Earliest pending deadline, if any.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Duration> {
        self.pending.iter().map(|p| p.deadline).min()
    }

    /// How long until the next timer is due (zero if one is already due).
    #[must_use]
    pub fn time_until_next(&self) -> Option<Duration> {
        self.next_deadline()
            .map(|deadline| deadline.saturating_sub(self.now))
    }

    /// Remove and return the earliest timer due at or before `until`.
    ///
    /// The clock moves forward to the popped timer's deadline so anything
    /// armed by its handler is scheduled relative to the moment it fired.
    pub fn pop_due(&mut self, until: Duration) -> Option<Fired<T>> {
        let pos = self
            .pending
            .iter()
            .enumerate()
            .filter(|(_, p)| p.deadline <= until)
            .min_by_key(|(_, p)| (p.deadline, p.id))
            .map(|(pos, _)| pos)?;
        let Pending {
            id,
            deadline,
            payload,
        } = self.pending.swap_remove(pos);
        self.now = self.now.max(deadline);
        Some(Fired {
            id,
            deadline,
            payload,
        })
    }

    /// Move the clock forward to `until` without firing anything.
    ///
    /// Call after draining [`pop_due`](Self::pop_due) for the same instant.
    pub fn settle(&mut self, until: Duration) {
        self.now = self.now.max(until);
    }
}
