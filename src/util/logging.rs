//! # Logging Utilities
//!
//! Rate-limited logging for the polling loop. A unit that stays unplugged would
//! otherwise repeat the same warning every recovery cycle for hours.
//!
//! ## Usage
//!
//! ```rust
//! use std::time::Duration;
//! use vmc_rs::util::logging::LogThrottle;
//!
//! // At most 3 warnings per 10 minutes
//! let mut throttle = LogThrottle::new(Duration::from_secs(600), 3);
//! if throttle.allow() {
//!     log::warn!("device unreachable");
//! }
//! ```

use std::time::Duration;
use tokio::time::Instant;

/// Fixed-window message limiter on the tokio clock, so paused-time tests
/// observe the same windows as the polling loop.
#[derive(Debug)]
pub struct LogThrottle {
    window: Duration,
    per_window: u32,
    emitted: u32,
    dropped: u32,
    window_start: Instant,
}

impl LogThrottle {
    pub fn new(window: Duration, per_window: u32) -> Self {
        LogThrottle {
            window,
            per_window,
            emitted: 0,
            dropped: 0,
            window_start: Instant::now(),
        }
    }

    /// Returns whether the next message may be logged and counts it.
    pub fn allow(&mut self) -> bool {
        if self.window_start.elapsed() > self.window {
            self.restart();
        }
        if self.emitted < self.per_window {
            self.emitted += 1;
            true
        } else {
            self.dropped = self.dropped.saturating_add(1);
            false
        }
    }

    /// Messages dropped in the current window.
    pub fn suppressed(&self) -> u32 {
        self.dropped
    }

    /// Starts a new window and returns how many messages the old one dropped.
    pub fn reset(&mut self) -> u32 {
        let dropped = self.dropped;
        self.restart();
        dropped
    }

    fn restart(&mut self) {
        self.window_start = Instant::now();
        self.emitted = 0;
        self.dropped = 0;
    }
}

/// Logs at `$lvl` when `$throttle` allows it.
#[macro_export]
macro_rules! log_throttled {
    ($throttle:expr, $lvl:expr, $($arg:tt)*) => {
        if $throttle.allow() {
            log::log!($lvl, $($arg)*);
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cap_per_window() {
        let mut throttle = LogThrottle::new(Duration::from_secs(1), 3);
        assert!((0..3).all(|_| throttle.allow()));
        assert!(!throttle.allow());
        assert!(!throttle.allow());
        assert_eq!(throttle.suppressed(), 2);
    }

    #[test]
    fn test_reset_reports_dropped() {
        let mut throttle = LogThrottle::new(Duration::from_secs(1), 1);
        assert!(throttle.allow());
        assert!(!throttle.allow());
        assert_eq!(throttle.reset(), 1);
        assert_eq!(throttle.suppressed(), 0);
        assert!(throttle.allow());
    }

    #[tokio::test(start_paused = true)]
    async fn test_window_expiry() {
        let mut throttle = LogThrottle::new(Duration::from_secs(1), 1);
        assert!(throttle.allow());
        assert!(!throttle.allow());

        tokio::time::advance(Duration::from_millis(1001)).await;
        assert!(throttle.allow());
        assert_eq!(throttle.suppressed(), 0);
    }
}
