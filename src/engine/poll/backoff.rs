use std::time::Duration;

use crate::shared::config::PollConfig;

const MIN_INTERVAL: Duration = Duration::from_millis(1);

/// Geometric backoff between polls, capped at `max`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Backoff {
    pub initial: Duration,
    pub max: Duration,
    pub multiplier: f64,
}

impl Backoff {
    pub fn new(initial: Duration, max: Duration, multiplier: f64) -> Self {
        let initial = initial.max(MIN_INTERVAL);
        Self {
            initial,
            max: max.max(initial),
            multiplier: if multiplier.is_finite() && multiplier >= 1.0 {
                multiplier
            } else {
                1.0
            },
        }
    }

    /// Constant interval.
    pub fn fixed(interval: Duration) -> Self {
        Self::new(interval, interval, 1.0)
    }

    pub fn from_config(config: &PollConfig) -> Self {
        Self::new(
            Duration::from_millis(config.initial_interval_ms),
            Duration::from_millis(config.max_interval_ms),
            config.multiplier,
        )
    }

    pub fn next(&self, current: Duration) -> Duration {
        let nanos = (current.as_nanos() as f64 * self.multiplier).round();
        Duration::from_nanos(nanos.min(u64::MAX as f64) as u64).min(self.max)
    }
}

impl Default for Backoff {
    fn default() -> Self {
        Self::new(Duration::from_millis(100), Duration::from_secs(2), 2.0)
    }
}
