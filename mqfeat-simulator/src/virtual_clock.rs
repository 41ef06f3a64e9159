//! # Virtual Clock for Simulation
//!
//! Deterministic time source for generated traffic. Record timestamps are
//! derived from it, never from the wall clock.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

const NANOS_PER_SEC: f64 = 1e9;

/// A virtual clock that advances in nanoseconds.
#[derive(Clone, Debug)]
pub struct VirtualClock {
    offset: Arc<AtomicU64>,
}

impl VirtualClock {
    /// Creates a clock reading `start_ns`.
    pub fn new(start_ns: u64) -> Self {
        Self {
            offset: Arc::new(AtomicU64::new(start_ns)),
        }
    }

    #[inline]
    pub fn now_ns(&self) -> u64 {
        self.offset.load(Ordering::Acquire)
    }

    /// Current time in seconds, the unit of record timestamps.
    #[inline]
    pub fn now_secs(&self) -> f64 {
        self.now_ns() as f64 / NANOS_PER_SEC
    }

    #[inline]
    pub fn advance(&self, ns: u64) {
        self.offset.fetch_add(ns, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_at_given_offset() {
        let clock = VirtualClock::new(1_500_000_000);
        assert_eq!(clock.now_ns(), 1_500_000_000);
        assert_eq!(clock.now_secs(), 1.5);
    }

    #[test]
    fn clones_share_time() {
        let clock = VirtualClock::new(0);
        let handle = clock.clone();
        clock.advance(500);
        handle.advance(250);
        assert_eq!(clock.now_ns(), 750);
    }
}
