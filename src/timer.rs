//! Idle shutdown timer.
//!
//! Armed whenever demand drops to zero and disarmed as soon as demand
//! returns. If it runs out while still armed, the service should exit.
//!
//! Times are monotonic milliseconds (see [`Clock::monotonic_ms`]), so wall
//! clock steps neither stretch nor shorten the grace period.
//!
//! [`Clock::monotonic_ms`]: crate::clock::Clock::monotonic_ms

/// Timer state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TimerState {
    /// Disarmed; there is demand.
    Active,
    /// Counting down to `deadline`.
    Idle { deadline: u64 },
    /// Expired. Terminal.
    TerminateRequested,
}

/// Single-shot countdown with a fixed grace period.
#[derive(Debug)]
pub struct IdleTimer {
    grace_ms: u64,
    state: TimerState,
}

impl IdleTimer {
    /// A disarmed timer.
    pub fn new(grace_ms: u64) -> Self {
        Self {
            grace_ms,
            state: TimerState::Active,
        }
    }

    pub fn grace_ms(&self) -> u64 {
        self.grace_ms
    }

    pub fn state(&self) -> TimerState {
        self.state
    }

    /// Start a full countdown from `now`, replacing any running one.
    pub fn arm(&mut self, now: u64) {
        if self.state == TimerState::TerminateRequested {
            return;
        }
        self.state = TimerState::Idle {
            deadline: now.saturating_add(self.grace_ms),
        };
    }

    /// Cancel a running countdown. Returns true if one was running.
    pub fn disarm(&mut self) -> bool {
        match self.state {
            TimerState::Idle { .. } => {
                self.state = TimerState::Active;
                true
            }
            _ => false,
        }
    }

    pub fn is_armed(&self) -> bool {
        matches!(self.state, TimerState::Idle { .. })
    }

    pub fn deadline(&self) -> Option<u64> {
        match self.state {
            TimerState::Idle { deadline } => Some(deadline),
            _ => None,
        }
    }

    /// Check for expiry. Returns true exactly once, on the first poll at or
    /// after the deadline.
    pub fn poll(&mut self, now: u64) -> bool {
        match self.state {
            TimerState::Idle { deadline } if now >= deadline => {
                self.state = TimerState::TerminateRequested;
                true
            }
            _ => false,
        }
    }
}
