//! Time sources: wall clock for fix freshness, monotonic for idle deadlines.

use crate::types::Timestamp;
use std::sync::OnceLock;
use std::time::Instant;

/// Source of the current time.
pub trait Clock: Send {
    /// Milliseconds since Unix epoch. Fixes are stamped on this scale.
    fn now(&self) -> Timestamp;

    /// Milliseconds on a clock that never steps. Only differences are
    /// meaningful.
    fn monotonic_ms(&self) -> u64;
}

/// The system clocks.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Timestamp::now()
    }

    fn monotonic_ms(&self) -> u64 {
        static ORIGIN: OnceLock<Instant> = OnceLock::new();
        let origin = *ORIGIN.get_or_init(Instant::now);
        origin.elapsed().as_millis() as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_monotonic_never_goes_back() {
        let clock = SystemClock;
        let first = clock.monotonic_ms();
        std::thread::sleep(std::time::Duration::from_millis(5));
        assert!(clock.monotonic_ms() >= first + 5);
    }
}
