//! [`PerceptionWatchdog`] – notices when perception goes quiet.
//!
//! The render loop feeds it one observation per tick: whether a new sample
//! arrived since the previous tick.  When no sample has arrived for longer
//! than the timeout the feed is reported [`PerceptionHealth::Stale`]; the next
//! sample flips it back to [`PerceptionHealth::Fresh`].
//!
//! Staleness is informational only.  The controller keeps acting on the last
//! known sample, exactly as it would for a hand held perfectly still.
//!
//! # Example
//!
//! ```
//! use std::time::{Duration, Instant};
//! use handspin_runtime::watchdog::{PerceptionHealth, PerceptionWatchdog};
//!
//! let t0 = Instant::now();
//! let mut wd = PerceptionWatchdog::new(Duration::from_millis(500), t0);
//!
//! assert_eq!(wd.observe(false, t0 + Duration::from_millis(100)), None);
//! assert_eq!(
//!     wd.observe(false, t0 + Duration::from_millis(600)),
//!     Some(PerceptionHealth::Stale)
//! );
//! assert_eq!(
//!     wd.observe(true, t0 + Duration::from_millis(700)),
//!     Some(PerceptionHealth::Fresh)
//! );
//! ```

use std::time::{Duration, Instant};

/// Freshness of the perception feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PerceptionHealth {
    /// A sample arrived within the timeout.
    Fresh,
    /// No sample within the timeout.
    Stale,
}

/// Tracks the time of the last perception update.
#[derive(Debug, Clone)]
pub struct PerceptionWatchdog {
    timeout: Duration,
    last_update: Instant,
    health: PerceptionHealth,
}

impl PerceptionWatchdog {
    /// Start in the [`PerceptionHealth::Fresh`] state as of `now`.
    pub fn new(timeout: Duration, now: Instant) -> Self {
        Self {
            timeout,
            last_update: now,
            health: PerceptionHealth::Fresh,
        }
    }

    /// Record a perception update at `now`.
    pub fn heartbeat(&mut self, now: Instant) {
        self.last_update = now;
    }

    /// Health as of `now`, without changing the reported state.
    pub fn health(&self, now: Instant) -> PerceptionHealth {
        if now.saturating_duration_since(self.last_update) <= self.timeout {
            PerceptionHealth::Fresh
        } else {
            PerceptionHealth::Stale
        }
    }

    /// Feed one tick's observation and return the new state if it changed.
    pub fn observe(&mut self, updated: bool, now: Instant) -> Option<PerceptionHealth> {
        if updated {
            self.heartbeat(now);
        }
        let health = self.health(now);
        if health == self.health {
            return None;
        }
        self.health = health;
        Some(health)
    }

    /// Time since the last update.
    pub fn silence(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.last_update)
    }
}
