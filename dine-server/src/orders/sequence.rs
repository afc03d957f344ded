//! Daily order numbers
//!
//! `ORD-{n}` where `n` restarts at 1 every business day, per restaurant.
//! Numbers are claimed in a ledger with a uniqueness constraint; a writer
//! that loses the race recounts and tries again after a short backoff.

use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use sqlx::SqlitePool;

use crate::db::repository::{RepoError, RepoResult, order_number};

/// Storage of claimed numbers
#[async_trait]
pub trait NumberLedger: Send + Sync {
    /// Numbers already claimed for the day
    async fn count(&self, restaurant_id: i64, order_day: &str) -> RepoResult<i64>;

    /// Claim a number. Fails with `RepoError::Duplicate` when it is taken.
    async fn claim(&self, restaurant_id: i64, order_day: &str, order_number: &str) -> RepoResult<()>;
}

/// Ledger in the `order_number_ledger` table
#[derive(Clone, Debug)]
pub struct SqliteLedger {
    pool: SqlitePool,
}

impl SqliteLedger {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl NumberLedger for SqliteLedger {
    async fn count(&self, restaurant_id: i64, order_day: &str) -> RepoResult<i64> {
        order_number::count_for_day(&self.pool, restaurant_id, order_day).await
    }

    async fn claim(&self, restaurant_id: i64, order_day: &str, order_number: &str) -> RepoResult<()> {
        order_number::claim(&self.pool, restaurant_id, order_day, order_number).await
    }
}

/// Retry policy
#[derive(Debug, Clone, Copy)]
pub struct SequenceConfig {
    pub max_attempts: u32,
    /// Base delay, scaled by the attempt number
    pub backoff: Duration,
}

impl Default for SequenceConfig {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            backoff: Duration::from_millis(100),
        }
    }
}

pub fn format_number(n: i64) -> String {
    format!("ORD-{n}")
}

/// Hands out order numbers
pub struct SequenceGenerator {
    ledger: Arc<dyn NumberLedger>,
    config: SequenceConfig,
    /// Last timestamp handed out as a fallback number
    last_fallback: AtomicI64,
}

impl std::fmt::Debug for SequenceGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SequenceGenerator")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl SequenceGenerator {
    pub fn new(ledger: Arc<dyn NumberLedger>, config: SequenceConfig) -> Self {
        Self {
            ledger,
            config,
            last_fallback: AtomicI64::new(0),
        }
    }

    /// Next number of the day. Never fails: once the attempts are used up
    /// the number falls back to `ORD-{unix_millis}`, see [`Self::fallback_number`].
    pub async fn next_number(&self, restaurant_id: i64, order_day: &str) -> String {
        for attempt in 0..self.config.max_attempts {
            match self.try_claim(restaurant_id, order_day).await {
                Ok(number) => return number,
                Err(RepoError::Duplicate(_)) => {
                    tracing::debug!(
                        restaurant_id = %restaurant_id,
                        order_day = %order_day,
                        attempt = attempt + 1,
                        "Order number collision, retrying"
                    );
                }
                Err(e) => {
                    tracing::warn!(
                        restaurant_id = %restaurant_id,
                        attempt = attempt + 1,
                        error = %e,
                        "Order number claim failed, retrying"
                    );
                }
            }
            if attempt + 1 < self.config.max_attempts {
                tokio::time::sleep(self.config.backoff * (attempt + 1)).await;
            }
        }

        let fallback = self.fallback_number(restaurant_id, order_day).await;
        tracing::warn!(
            restaurant_id = %restaurant_id,
            order_day = %order_day,
            order_number = %fallback,
            "Order number retries exhausted, using timestamp number"
        );
        fallback
    }

    /// Timestamp number, strictly increasing within the process so two
    /// fallbacks in the same millisecond still differ. The number is claimed
    /// in the ledger too; a taken one moves on to the next millisecond.
    async fn fallback_number(&self, restaurant_id: i64, order_day: &str) -> String {
        let mut number = format_number(self.next_fallback_millis());
        for _ in 0..self.config.max_attempts {
            match self.ledger.claim(restaurant_id, order_day, &number).await {
                Ok(()) => break,
                Err(RepoError::Duplicate(_)) => {
                    number = format_number(self.next_fallback_millis());
                }
                Err(e) => {
                    tracing::warn!(
                        restaurant_id = %restaurant_id,
                        order_number = %number,
                        error = %e,
                        "Fallback number not recorded in the ledger"
                    );
                    break;
                }
            }
        }
        number
    }

    fn next_fallback_millis(&self) -> i64 {
        let now = shared::util::now_millis();
        let previous = self
            .last_fallback
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| {
                Some(now.max(last + 1))
            })
            .unwrap_or(now);
        now.max(previous + 1)
    }

    async fn try_claim(&self, restaurant_id: i64, order_day: &str) -> RepoResult<String> {
        let count = self.ledger.count(restaurant_id, order_day).await?;
        let number = format_number(count + 1);
        self.ledger.claim(restaurant_id, order_day, &number).await?;
        Ok(number)
    }
}
