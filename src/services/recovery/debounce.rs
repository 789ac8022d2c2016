//! Trailing debounce as an explicit two-state machine.
//!
//! The debouncer owns no timer. Callers pass the current instant in, and the
//! host loop polls it; this keeps the cancel-and-reschedule contract testable
//! with a logical clock.

use std::time::{Duration, Instant};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DebounceState<T> {
    Idle,
    Pending { deadline: Instant, payload: T },
}

#[derive(Debug)]
pub struct Debouncer<T> {
    window: Duration,
    state: DebounceState<T>,
}

impl<T> Debouncer<T> {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            state: DebounceState::Idle,
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    pub fn state(&self) -> &DebounceState<T> {
        &self.state
    }

    pub fn is_pending(&self) -> bool {
        matches!(self.state, DebounceState::Pending { .. })
    }

    pub fn deadline(&self) -> Option<Instant> {
        match &self.state {
            DebounceState::Pending { deadline, .. } => Some(*deadline),
            DebounceState::Idle => None,
        }
    }

    /// Replace any pending payload and restart the window from `now`.
    ///
    /// Returns true if a pending payload was superseded.
    pub fn schedule(&mut self, now: Instant, payload: T) -> bool {
        let superseded = self.is_pending();
        self.state = DebounceState::Pending {
            deadline: now + self.window,
            payload,
        };
        superseded
    }

    /// Yield the payload if its deadline has been reached.
    pub fn poll(&mut self, now: Instant) -> Option<T> {
        match self.deadline() {
            Some(deadline) if now >= deadline => self.take(),
            _ => None,
        }
    }

    /// Yield the pending payload regardless of its deadline.
    pub fn take(&mut self) -> Option<T> {
        match std::mem::replace(&mut self.state, DebounceState::Idle) {
            DebounceState::Pending { payload, .. } => Some(payload),
            DebounceState::Idle => None,
        }
    }

    /// Drop the pending payload without yielding it.
    pub fn cancel(&mut self) -> bool {
        self.take().is_some()
    }
}
