//! Reconnect-and-retry around simulator calls.
//!
//! A recoverable failure triggers a reconnect, a sleep, and another attempt.
//! The sleep starts at `retry_backoff_ms` and doubles per attempt, capped at
//! [`MAX_BACKOFF`].  After `max_retries` failed retries, or on the first
//! unrecoverable error, the call fails with [`EnvError::FatalSimulation`].

use std::time::Duration;

use tracing::{error, warn};

use rm_core::SimulatorConfig;
use rm_traffic::{SimulatorError, SimulatorResult};

use crate::{EnvError, EnvResult};

const MAX_BACKOFF: Duration = Duration::from_secs(30);

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub backoff_ms: u64,
}

impl RetryPolicy {
    pub fn from_config(config: &SimulatorConfig) -> Self {
        Self { max_retries: config.max_retries, backoff_ms: config.retry_backoff_ms }
    }

    /// Sleep before retry number `attempt` (1-based).
    pub fn delay(&self, attempt: u32) -> Duration {
        let shift = attempt.saturating_sub(1).min(20);
        Duration::from_millis(self.backoff_ms.saturating_mul(1 << shift)).min(MAX_BACKOFF)
    }

    /// Call `op(attempt)` until it succeeds.  `attempt` is 0 for the first
    /// call; a non-zero value tells `op` to reconnect first.
    ///
    /// Every failure that will be retried is passed to `on_retry` as
    /// [`EnvError::RecoverableSimulation`].  Returns the value and the
    /// number of retries it took.
    pub fn run<T>(
        &self,
        what: &'static str,
        completed_days: u64,
        mut op: impl FnMut(u32) -> SimulatorResult<T>,
        mut on_retry: impl FnMut(&EnvError),
    ) -> EnvResult<(T, u32)> {
        let mut attempt = 0u32;
        loop {
            let err: SimulatorError = match op(attempt) {
                Ok(value) => return Ok((value, attempt)),
                Err(e) => e,
            };

            if !err.is_recoverable() {
                error!(operation = what, error = %err, "unrecoverable simulator failure");
                return Err(EnvError::FatalSimulation { reason: err.to_string(), completed_days });
            }
            if attempt >= self.max_retries {
                error!(operation = what, retries = attempt, error = %err, "simulator retries exhausted");
                return Err(EnvError::FatalSimulation {
                    reason: format!("{err} (gave up after {attempt} retries)"),
                    completed_days,
                });
            }

            attempt += 1;
            let delay = self.delay(attempt);
            warn!(operation = what, attempt, ?delay, error = %err, "simulator failed, reconnecting");
            on_retry(&EnvError::RecoverableSimulation { attempt, reason: err.to_string() });
            if !delay.is_zero() {
                std::thread::sleep(delay);
            }
        }
    }
}
