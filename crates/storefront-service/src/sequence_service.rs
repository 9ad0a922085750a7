//! Order number generation.
//!
//! Each calendar day owns an independent counter in the sequence store.
//! The generator prefers the store's atomic insert-or-increment and falls
//! back to a bounded read / compare-and-swap loop when the store has none.
//! A storage failure aborts: an order is never placed without a number.
//! A number handed out to a caller that then abandons the order is burned.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use storefront_config::SequenceConfig;
use storefront_core::{DateKey, OrderNumber, OrderNumberFormat, StorefrontError, StorefrontResult};
use storefront_repository::SequenceStore;
use storefront_resilience::{Attempt, Backoff, OptimisticRetry, RetryError};
use tracing::{debug, info, warn};

/// Default number of compare-and-swap rounds before giving up.
pub const DEFAULT_SEQUENCE_ATTEMPTS: u32 = 5;

/// Default linear backoff unit between compare-and-swap rounds.
pub const DEFAULT_SEQUENCE_BASE_DELAY: Duration = Duration::from_millis(25);

/// Mints collision-free order numbers.
pub struct SequenceGenerator {
    store: Arc<dyn SequenceStore>,
    format: OrderNumberFormat,
    retry: OptimisticRetry,
    use_atomic: bool,
    atomic_available: AtomicBool,
}

impl SequenceGenerator {
    /// Creates a generator with the default retry policy.
    pub fn new(store: Arc<dyn SequenceStore>, format: OrderNumberFormat) -> Self {
        Self {
            store,
            format,
            retry: OptimisticRetry::new(
                DEFAULT_SEQUENCE_ATTEMPTS,
                Backoff::Linear(DEFAULT_SEQUENCE_BASE_DELAY),
            ),
            use_atomic: true,
            atomic_available: AtomicBool::new(true),
        }
    }

    /// Creates a generator from the `sequence` configuration section.
    pub fn from_config(store: Arc<dyn SequenceStore>, config: &SequenceConfig) -> StorefrontResult<Self> {
        let format = OrderNumberFormat::new(config.prefix.clone(), config.pad_width)?;
        Ok(Self::new(store, format)
            .with_retry(OptimisticRetry::new(
                config.max_attempts,
                Backoff::Linear(config.base_delay()),
            ))
            .with_atomic(config.use_atomic))
    }

    #[must_use]
    pub fn with_retry(mut self, retry: OptimisticRetry) -> Self {
        self.retry = retry;
        self
    }

    /// `false` skips the atomic primitive and always uses compare-and-swap.
    #[must_use]
    pub fn with_atomic(mut self, use_atomic: bool) -> Self {
        self.use_atomic = use_atomic;
        self
    }

    #[must_use]
    pub fn format(&self) -> &OrderNumberFormat {
        &self.format
    }

    /// Mints the next order number for `date_key`.
    pub async fn next(&self, date_key: &DateKey) -> StorefrontResult<OrderNumber> {
        let counter = self.next_counter(date_key).await?;
        let number = self.format.format(date_key, counter);
        info!("Minted order number {}", number);
        Ok(number)
    }

    /// Mints the next order number for the current UTC day.
    pub async fn next_for_today(&self) -> StorefrontResult<OrderNumber> {
        self.next(&DateKey::today_utc()).await
    }

    /// Parses an order number rendered by this generator's format.
    pub fn parse(&self, s: &str) -> StorefrontResult<OrderNumber> {
        self.format.parse(s)
    }

    /// Advances the counter for `date_key` and returns its new value.
    pub async fn next_counter(&self, date_key: &DateKey) -> StorefrontResult<u64> {
        if self.use_atomic && self.atomic_available.load(Ordering::Relaxed) {
            match self.store.atomic_increment(date_key).await? {
                Some(counter) => return Ok(counter),
                None => {
                    warn!("Sequence store has no atomic increment; switching to compare-and-swap");
                    self.atomic_available.store(false, Ordering::Relaxed);
                }
            }
        }

        self.next_counter_optimistic(date_key).await
    }

    async fn next_counter_optimistic(&self, date_key: &DateKey) -> StorefrontResult<u64> {
        let store = self.store.as_ref();

        let result = self
            .retry
            .run(
                move || store.read(date_key),
                move |current| try_advance(store, date_key, current),
            )
            .await;

        match result {
            Ok(counter) => {
                debug!("Sequence {} advanced to {} via compare-and-swap", date_key, counter);
                Ok(counter)
            }
            Err(RetryError::Exhausted { attempts }) => {
                warn!("Sequence {} still contended after {} attempts", date_key, attempts);
                Err(StorefrontError::RaceExhausted {
                    date_key: date_key.to_string(),
                    attempts,
                })
            }
            Err(RetryError::Failed(e)) => Err(e),
        }
    }
}

/// One compare-and-swap round against the value read in this round.
async fn try_advance(
    store: &dyn SequenceStore,
    date_key: &DateKey,
    current: Option<u64>,
) -> StorefrontResult<Attempt<u64>> {
    let Some(counter) = current else {
        let created = store.insert_if_absent(date_key, 1).await?;
        return Ok(if created { Attempt::Done(1) } else { Attempt::Conflict });
    };

    let next = counter
        .checked_add(1)
        .ok_or_else(|| StorefrontError::internal(format!("Order sequence {} overflowed", date_key)))?;

    if store.compare_and_swap(date_key, counter, next).await? {
        Ok(Attempt::Done(next))
    } else {
        Ok(Attempt::Conflict)
    }
}

impl std::fmt::Debug for SequenceGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SequenceGenerator")
            .field("format", &self.format)
            .field("retry", &self.retry)
            .field("use_atomic", &self.use_atomic)
            .finish_non_exhaustive()
    }
}
