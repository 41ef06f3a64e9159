use serde::Serialize;

/// Length of the authentication-failure window in seconds.
pub const AUTH_WINDOW_SECS: f64 = 1.0;

/// Counts refused connections inside a window that restarts once it expires.
///
/// This is a reset-on-expiry counter, not a sliding window: the first failure
/// more than [`AUTH_WINDOW_SECS`] after the window start opens a fresh window
/// with a count of one.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct AuthFailureWindow {
    pub start: f64,
    pub count: u32,
}

impl AuthFailureWindow {
    pub fn record(&mut self, timestamp: f64) {
        if self.count == 0 || timestamp - self.start > AUTH_WINDOW_SECS {
            self.start = timestamp;
            self.count = 1;
        } else {
            self.count = self.count.saturating_add(1);
        }
    }

    /// Failures per second since the window opened.
    ///
    /// Falls back to the raw count when no time has passed (or the clock went
    /// backwards) and is zero for an empty window.
    pub fn rate(&self, now: f64) -> f64 {
        if self.count == 0 {
            return 0.0;
        }
        let elapsed = now - self.start;
        if elapsed > 0.0 {
            f64::from(self.count) / elapsed
        } else {
            f64::from(self.count)
        }
    }
}

/// Timing and authentication history of one flow.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct FlowTimingState {
    pub first_seen: f64,
    pub last_seen: f64,
    pub packet_count: u64,
    pub failed_auth_count: u64,
    pub auth_window: AuthFailureWindow,
}

impl FlowTimingState {
    /// State for a flow first seen at `timestamp`, before any packet is counted.
    pub fn new(timestamp: f64) -> Self {
        Self {
            first_seen: timestamp,
            last_seen: timestamp,
            packet_count: 0,
            failed_auth_count: 0,
            auth_window: AuthFailureWindow::default(),
        }
    }

    /// Accounts one packet arriving at `timestamp`.
    pub fn observe(&mut self, timestamp: f64, auth_failure: bool) {
        self.packet_count = self.packet_count.saturating_add(1);
        self.last_seen = timestamp;

        if auth_failure {
            self.failed_auth_count = self.failed_auth_count.saturating_add(1);
            self.auth_window.record(timestamp);
        }
    }

    /// Microseconds between the flow's first packet and `now`.
    ///
    /// Zero until a second packet has been seen, and never negative.
    pub fn elapsed_us(&self, now: f64) -> f64 {
        if self.packet_count < 2 {
            return 0.0;
        }
        ((now - self.first_seen) * 1e6).max(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_resets_after_expiry() {
        let mut window = AuthFailureWindow::default();
        let counts: Vec<u32> = [0.0, 0.5, 1.6]
            .into_iter()
            .map(|ts| {
                window.record(ts);
                window.count
            })
            .collect();
        assert_eq!(counts, vec![1, 2, 1]);
        assert_eq!(window.start, 1.6);
    }

    #[test]
    fn window_boundary_is_inclusive() {
        let mut window = AuthFailureWindow::default();
        window.record(2.0);
        window.record(3.0);
        assert_eq!(window.count, 2);
        assert_eq!(window.start, 2.0);
    }

    #[test]
    fn rate_guards_elapsed() {
        let mut window = AuthFailureWindow::default();
        assert_eq!(window.rate(10.0), 0.0);

        window.record(10.0);
        assert_eq!(window.rate(10.0), 1.0);
        assert_eq!(window.rate(9.0), 1.0);

        window.record(10.25);
        assert_eq!(window.rate(10.5), 4.0);
    }

    #[test]
    fn first_packet_counts_once() {
        let mut state = FlowTimingState::new(5.0);
        state.observe(5.0, false);
        assert_eq!(state.packet_count, 1);
        assert_eq!(state.first_seen, 5.0);
        assert_eq!(state.last_seen, 5.0);
        assert_eq!(state.elapsed_us(5.0), 0.0);
    }

    #[test]
    fn later_packets_advance_last_seen() {
        let mut state = FlowTimingState::new(1.0);
        state.observe(1.0, false);
        state.observe(1.5, true);
        state.observe(2.0, false);
        assert_eq!(state.packet_count, 3);
        assert_eq!(state.first_seen, 1.0);
        assert_eq!(state.last_seen, 2.0);
        assert_eq!(state.failed_auth_count, 1);
        assert_eq!(state.auth_window.count, 1);
        assert_eq!(state.elapsed_us(2.0), 1_000_000.0);
    }

    #[test]
    fn out_of_order_timestamp_clamps_delta() {
        let mut state = FlowTimingState::new(4.0);
        state.observe(4.0, false);
        state.observe(3.0, false);
        assert_eq!(state.elapsed_us(3.0), 0.0);
    }
}
