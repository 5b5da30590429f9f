//! Trailing-edge debouncer driven by its owner's event loop.
//!
//! The debouncer owns no task and no timer. The owner asks for the
//! [`deadline`](Debouncer::deadline), sleeps until it alongside its other
//! inputs, then calls [`take_due`](Debouncer::take_due).

use std::time::Duration;

use tokio::time::Instant;

/// Coalesces values pushed within `window` of each other into one.
#[derive(Debug)]
pub struct Debouncer<T> {
    window: Duration,
    pending: Option<T>,
    deadline: Option<Instant>,
}

impl<T: Default> Debouncer<T> {
    #[must_use]
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            pending: None,
            deadline: None,
        }
    }

    /// Update the pending value in place and restart the window at `now`.
    pub fn push_with(&mut self, now: Instant, update: impl FnOnce(&mut T)) {
        update(self.pending.get_or_insert_with(T::default));
        self.deadline = Some(now + self.window);
    }

    #[must_use]
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Take the pending value when the window has elapsed at `now`.
    pub fn take_due(&mut self, now: Instant) -> Option<T> {
        match self.deadline {
            Some(deadline) if deadline <= now => self.take(),
            _ => None,
        }
    }

    /// Take the pending value regardless of the deadline.
    pub fn take(&mut self) -> Option<T> {
        self.deadline = None;
        self.pending.take()
    }

    /// Drop the pending value.
    pub fn cancel(&mut self) {
        self.take();
    }
}
