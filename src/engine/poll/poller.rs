use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, trace};

use crate::engine::compare::{CompareMode, Diff, FloatPolicy, MatchResult, compare};
use crate::engine::errors::{HarnessError, PollTimeout};
use crate::engine::poll::{Backoff, Probe};
use crate::engine::types::ResultSet;
use crate::shared::time::Clock;

/// What the last attempt before the deadline observed.
#[derive(Debug, Clone)]
pub enum LastSeen {
    Mismatch(Diff),
    Error(String),
}

impl fmt::Display for LastSeen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LastSeen::Mismatch(diff) => write!(f, "mismatch\n{}", diff),
            LastSeen::Error(message) => write!(f, "error: {}", message),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollOutcome {
    pub attempts: u32,
    pub elapsed: Duration,
}

/// Repeats a probe until its result matches or the deadline passes.
#[derive(Clone)]
pub struct Poller {
    clock: Arc<dyn Clock>,
    backoff: Backoff,
    policy: FloatPolicy,
}

impl Poller {
    pub fn new(clock: Arc<dyn Clock>, backoff: Backoff) -> Self {
        Self {
            clock,
            backoff,
            policy: FloatPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: FloatPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    /// Probes at least once. Errors from a closed client end the wait
    /// immediately; any other backend error counts as "not yet". A probe
    /// still running at the deadline is abandoned.
    pub async fn await_match(
        &self,
        probe: &mut dyn Probe,
        expected: &ResultSet,
        mode: CompareMode,
        timeout: Duration,
    ) -> Result<PollOutcome, HarnessError> {
        let start = self.clock.now();
        let deadline = start.checked_add(timeout).unwrap_or(Duration::MAX);
        let mut interval = self.backoff.initial;
        let mut attempts = 0u32;

        loop {
            attempts += 1;
            let remaining = deadline.saturating_sub(self.clock.now());
            let observed = tokio::select! {
                biased;
                result = probe.probe() => Some(result),
                _ = self.clock.sleep(remaining) => None,
            };
            let last_seen = match observed {
                Some(Ok(actual)) => match compare(&actual, expected, mode, self.policy) {
                    MatchResult::Match => {
                        let elapsed = self.clock.now().saturating_sub(start);
                        debug!(attempts, ?elapsed, "Poll matched");
                        return Ok(PollOutcome { attempts, elapsed });
                    }
                    MatchResult::Mismatch(diff) => {
                        trace!(attempts, "Poll not matched yet");
                        LastSeen::Mismatch(diff)
                    }
                },
                Some(Err(e)) if e.is_transient() => {
                    trace!(attempts, error = %e, "Poll probe failed");
                    LastSeen::Error(e.to_string())
                }
                Some(Err(e)) => return Err(e.into()),
                None => {
                    debug!(attempts, "Poll probe still running at deadline");
                    LastSeen::Error("probe still running at deadline".to_string())
                }
            };

            let now = self.clock.now();
            if now >= deadline {
                return Err(HarnessError::Timeout(PollTimeout {
                    timeout,
                    attempts,
                    last_seen,
                }));
            }
            self.clock.sleep(interval.min(deadline - now)).await;
            interval = self.backoff.next(interval);
        }
    }
}
