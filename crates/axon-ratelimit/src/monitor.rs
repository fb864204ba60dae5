use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use crate::error::RateLimitError;

/// Read-only utilization monitor for backend calls
///
/// Tracks how much of a configured request budget the current window has
/// consumed. The chat flow consults it for utilization and
/// recommended-wait figures; enforcement lives elsewhere (server
/// middleware). Never blocks a caller.
pub struct RateLimitMonitor {
    limit: u32,
    window: Duration,
    events: Mutex<VecDeque<Instant>>,
}

impl RateLimitMonitor {
    /// Create a monitor for `limit` calls per `window`
    pub fn new(limit: u32, window: Duration) -> Result<Self, RateLimitError> {
        if limit == 0 {
            return Err(RateLimitError::Config("monitor limit must be > 0".to_string()));
        }
        if window.is_zero() {
            return Err(RateLimitError::Config("monitor window must be > 0".to_string()));
        }

        Ok(Self {
            limit,
            window,
            events: Mutex::new(VecDeque::new()),
        })
    }

    /// Record one backend call
    pub fn record(&self) {
        let now = Instant::now();
        let mut events = self.events.lock().expect("monitor lock poisoned");
        Self::prune(&mut events, now, self.window);
        events.push_back(now);
    }

    /// Fraction of the window budget currently consumed (may exceed 1.0)
    #[allow(clippy::cast_precision_loss)]
    pub fn utilization(&self) -> f64 {
        let now = Instant::now();
        let mut events = self.events.lock().expect("monitor lock poisoned");
        Self::prune(&mut events, now, self.window);
        events.len() as f64 / f64::from(self.limit)
    }

    /// Suggested delay before the next call, if the budget is exhausted
    pub fn recommended_wait(&self) -> Option<Duration> {
        let now = Instant::now();
        let mut events = self.events.lock().expect("monitor lock poisoned");
        Self::prune(&mut events, now, self.window);

        if events.len() < self.limit as usize {
            return None;
        }

        // The budget frees up when the oldest event leaves the window
        events
            .front()
            .map(|oldest| self.window.saturating_sub(now.duration_since(*oldest)))
    }

    fn prune(events: &mut VecDeque<Instant>, now: Instant, window: Duration) {
        while let Some(front) = events.front() {
            if now.duration_since(*front) > window {
                events.pop_front();
            } else {
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_monitor_is_idle() {
        let monitor = RateLimitMonitor::new(10, Duration::from_secs(60)).unwrap();
        assert!(monitor.utilization() < f64::EPSILON);
        assert!(monitor.recommended_wait().is_none());
    }

    #[test]
    fn utilization_tracks_recorded_calls() {
        let monitor = RateLimitMonitor::new(4, Duration::from_secs(60)).unwrap();
        monitor.record();
        monitor.record();
        let utilization = monitor.utilization();
        assert!((utilization - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn exhausted_budget_recommends_waiting() {
        let monitor = RateLimitMonitor::new(2, Duration::from_secs(60)).unwrap();
        monitor.record();
        monitor.record();
        let wait = monitor.recommended_wait().expect("budget exhausted");
        assert!(wait <= Duration::from_secs(60));
    }

    #[test]
    fn zero_limit_is_config_error() {
        assert!(RateLimitMonitor::new(0, Duration::from_secs(1)).is_err());
    }
}
