//! Manually advanced clock.

use crate::providers::Clock;
use chrono::{DateTime, Utc};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Clock that only moves when told to.
///
/// Clones share the same time, so a test can advance the clock after
/// handing a clone to a [`super::MockTokenStore`].
///
/// # Example
///
/// ```
/// use passwordless::mocks::ManualClock;
/// use passwordless::providers::Clock;
/// use std::time::Duration;
///
/// let clock = ManualClock::default();
/// let start = clock.now();
/// clock.advance(Duration::from_millis(250));
/// assert_eq!((clock.now() - start).num_milliseconds(), 250);
/// ```
#[derive(Debug, Clone)]
pub struct ManualClock {
    time: Arc<Mutex<DateTime<Utc>>>,
}

impl ManualClock {
    /// Create a clock frozen at `time`.
    #[must_use]
    pub fn new(time: DateTime<Utc>) -> Self {
        Self {
            time: Arc::new(Mutex::new(time)),
        }
    }

    /// Move the clock forward.
    pub fn advance(&self, by: Duration) {
        let by = chrono::Duration::from_std(by).unwrap_or(chrono::Duration::MAX);
        let mut time = self
            .time
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        *time = time.checked_add_signed(by).unwrap_or(DateTime::<Utc>::MAX_UTC);
    }

    /// Jump to `time`.
    pub fn set(&self, time: DateTime<Utc>) {
        *self
            .time
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner) = time;
    }
}

impl Default for ManualClock {
    /// 2025-01-01 00:00:00 UTC.
    fn default() -> Self {
        Self::new(
            DateTime::<Utc>::from_timestamp(1_735_689_600, 0).unwrap_or(DateTime::<Utc>::MIN_UTC),
        )
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self
            .time
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_share_time() {
        let clock = ManualClock::default();
        let other = clock.clone();
        clock.advance(Duration::from_secs(60));
        assert_eq!(clock.now(), other.now());
        assert_eq!(other.now().to_rfc3339(), "2025-01-01T00:01:00+00:00");
    }
}
