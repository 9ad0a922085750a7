//! Optimistic concurrency retry combinator.
//!
//! Each round reads the current state, then attempts a conditional update
//! against that state. A lost race is reported as [`Attempt::Conflict`] and
//! retried after the configured backoff; any other error aborts immediately.
//! The loop is bounded: after `max_attempts` conflicts it gives up with
//! [`RetryError::Exhausted`].

use super::Backoff;
use std::fmt;
use std::future::Future;
use tracing::debug;

/// Outcome of one conditional update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Attempt<T> {
    /// The update applied.
    Done(T),
    /// Another writer changed the state since it was read.
    Conflict,
}

/// Failure of an optimistic retry loop.
#[derive(Debug)]
pub enum RetryError<E> {
    /// Every attempt lost its race.
    Exhausted { attempts: u32 },
    /// Reading or updating failed outright.
    Failed(E),
}

impl<E: fmt::Display> fmt::Display for RetryError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exhausted { attempts } => write!(f, "still conflicting after {} attempts", attempts),
            Self::Failed(e) => write!(f, "{}", e),
        }
    }
}

impl<E: std::error::Error + 'static> std::error::Error for RetryError<E> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Exhausted { .. } => None,
            Self::Failed(e) => Some(e),
        }
    }
}

/// Bounded read / compare-and-swap retry loop.
#[derive(Debug, Clone)]
pub struct OptimisticRetry {
    /// Maximum number of read/update rounds.
    pub max_attempts: u32,
    /// Wait between a conflict and the next round.
    pub backoff: Backoff,
}

impl OptimisticRetry {
    #[must_use]
    pub const fn new(max_attempts: u32, backoff: Backoff) -> Self {
        Self {
            max_attempts,
            backoff,
        }
    }

    /// Runs `read_current` then `try_update` until an update applies.
    pub async fn run<S, T, E, R, RFut, U, UFut>(
        &self,
        mut read_current: R,
        mut try_update: U,
    ) -> Result<T, RetryError<E>>
    where
        R: FnMut() -> RFut,
        RFut: Future<Output = Result<S, E>>,
        U: FnMut(S) -> UFut,
        UFut: Future<Output = Result<Attempt<T>, E>>,
    {
        for attempt in 1..=self.max_attempts {
            let current = read_current().await.map_err(RetryError::Failed)?;

            match try_update(current).await.map_err(RetryError::Failed)? {
                Attempt::Done(value) => return Ok(value),
                Attempt::Conflict if attempt < self.max_attempts => {
                    let delay = self.backoff.delay_for_attempt(attempt);
                    debug!("Optimistic update conflicted on attempt {}; retrying after {:?}", attempt, delay);
                    tokio::time::sleep(delay).await;
                }
                Attempt::Conflict => {
                    debug!("Optimistic update conflicted on final attempt {}", attempt);
                }
            }
        }

        Err(RetryError::Exhausted {
            attempts: self.max_attempts,
        })
    }
}
