//! Monotonic time sources.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Instant;

/// Seconds elapsed since some fixed, monotonic origin.
pub trait Clock: Send {
    fn elapsed_secs(&self) -> f64;
}

/// Wall clock anchored at construction.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn elapsed_secs(&self) -> f64 {
        self.origin.elapsed().as_secs_f64()
    }
}

/// Hand-driven clock for deterministic tests.  Clones share the same time.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    secs: Arc<Mutex<f64>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, secs: f64) {
        *self.secs.lock().unwrap_or_else(PoisonError::into_inner) += secs;
    }

    pub fn set(&self, secs: f64) {
        *self.secs.lock().unwrap_or_else(PoisonError::into_inner) = secs;
    }
}

impl Clock for ManualClock {
    fn elapsed_secs(&self) -> f64 {
        *self.secs.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_clock_is_monotonic() {
        let clock = SystemClock::new();
        let a = clock.elapsed_secs();
        let b = clock.elapsed_secs();
        assert!(a >= 0.0);
        assert!(b >= a);
    }

    #[test]
    fn manual_clock_clones_share_time() {
        let clock = ManualClock::new();
        let shared = clock.clone();
        clock.advance(1.5);
        clock.advance(0.25);
        assert_eq!(shared.elapsed_secs(), 1.75);
        shared.set(10.0);
        assert_eq!(clock.elapsed_secs(), 10.0);
    }
}
