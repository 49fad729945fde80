use super::error::EwsError;
use std::time::Duration;

/// Bounded automatic retry applied to transient failures.
///
/// Delays start at `initial_backoff` and double per attempt unless the
/// server suggests its own. The policy gives up once the next delay would
/// push the cumulative wait past `max_wait`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_wait: Duration,
    pub initial_backoff: Duration,
}

impl RetryPolicy {
    pub fn new(max_wait: Duration, initial_backoff: Duration) -> Self {
        Self {
            max_wait,
            initial_backoff,
        }
    }

    /// Start tracking back-off for one request
    pub fn backoff(&self) -> Backoff {
        Backoff {
            policy: *self,
            attempt: 0,
            waited: Duration::ZERO,
        }
    }
}

/// Back-off state for a single logical request
#[derive(Debug)]
pub struct Backoff {
    policy: RetryPolicy,
    attempt: u32,
    waited: Duration,
}

impl Backoff {
    /// Delay before the next attempt, or `None` when the budget is spent
    pub fn next_delay(&mut self, hint: Option<Duration>) -> Option<Duration> {
        let delay = hint.unwrap_or_else(|| {
            let factor = 1u32.checked_shl(self.attempt).unwrap_or(u32::MAX);
            self.policy.initial_backoff.saturating_mul(factor)
        });

        if self.waited.saturating_add(delay) > self.policy.max_wait {
            return None;
        }

        self.attempt += 1;
        self.waited += delay;
        Some(delay)
    }

    /// Total time slept so far
    pub fn waited(&self) -> Duration {
        self.waited
    }

    /// Number of retries granted so far
    pub fn retries(&self) -> u32 {
        self.attempt
    }
}

/// A failure worth retrying
#[derive(Debug)]
pub enum Transient {
    /// 429/503 or ErrorServerBusy
    Throttled { back_off: Option<Duration> },
    /// Connection-level failure or gateway error
    Transport { message: String },
}

impl Transient {
    pub fn hint(&self) -> Option<Duration> {
        match self {
            Transient::Throttled { back_off } => *back_off,
            Transient::Transport { .. } => None,
        }
    }

    /// Final error once retries are exhausted
    pub fn exhausted(self, waited: Duration) -> EwsError {
        match self {
            Transient::Throttled { .. } => EwsError::Throttled { waited },
            Transient::Transport { message } => EwsError::Transport(message),
        }
    }
}

/// Outcome of a single failed attempt
#[derive(Debug)]
pub enum Failure {
    Fatal(EwsError),
    Transient(Transient),
}

impl From<EwsError> for Failure {
    fn from(err: EwsError) -> Self {
        Failure::Fatal(err)
    }
}
