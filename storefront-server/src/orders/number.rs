//! Order number generation
//!
//! Format: `{prefix}{YYYYMMDD}{suffix}`, e.g. `RB202401154821`. The date is the
//! business-local day; the suffix is a random number in 1000..=9999.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use rand::Rng;
use sqlx::SqliteConnection;

use super::OrderError;
use crate::db::repository::order;

pub const SUFFIX_MIN: u16 = 1000;
pub const SUFFIX_MAX: u16 = 9999;

/// Attempts before giving up on a day
pub const MAX_ATTEMPTS: u32 = 1000;

/// Source of the 4-digit suffix
pub trait SuffixSource: Send + Sync {
    fn next_suffix(&self) -> u16;
}

/// Uniform random suffix
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomSuffix;

impl SuffixSource for RandomSuffix {
    fn next_suffix(&self) -> u16 {
        rand::thread_rng().gen_range(SUFFIX_MIN..=SUFFIX_MAX)
    }
}

/// Order number generator
#[derive(Clone)]
pub struct OrderNumberGenerator {
    prefix: String,
    tz: Tz,
    source: Arc<dyn SuffixSource>,
    max_attempts: u32,
}

impl std::fmt::Debug for OrderNumberGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrderNumberGenerator")
            .field("prefix", &self.prefix)
            .field("tz", &self.tz)
            .field("max_attempts", &self.max_attempts)
            .finish()
    }
}

impl OrderNumberGenerator {
    pub fn new(prefix: impl Into<String>, tz: Tz) -> Self {
        Self::with_source(prefix, tz, Arc::new(RandomSuffix))
    }

    pub fn with_source(prefix: impl Into<String>, tz: Tz, source: Arc<dyn SuffixSource>) -> Self {
        Self {
            prefix: prefix.into(),
            tz,
            source,
            max_attempts: MAX_ATTEMPTS,
        }
    }

    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    /// One candidate for `now`; uniqueness is not checked
    pub fn candidate(&self, now: DateTime<Utc>) -> String {
        let date = now.with_timezone(&self.tz).format("%Y%m%d");
        let suffix = self.source.next_suffix().clamp(SUFFIX_MIN, SUFFIX_MAX);
        format!("{}{}{:04}", self.prefix, date, suffix)
    }

    /// Draw candidates until one is unused. Run inside the placement
    /// transaction; the UNIQUE index on `order_number` backs the check.
    pub async fn generate(&self, conn: &mut SqliteConnection) -> Result<String, OrderError> {
        let now = Utc::now();
        for attempt in 1..=self.max_attempts {
            let number = self.candidate(now);
            if !order::number_exists(&mut *conn, &number).await? {
                return Ok(number);
            }
            tracing::debug!(order_number = %number, attempt, "Order number collision, retrying");
        }
        Err(OrderError::NumberExhausted(self.max_attempts))
    }
}

/// Replays a fixed suffix list, then repeats the last value
#[cfg(test)]
pub(crate) struct SequenceSuffix {
    values: Vec<u16>,
    next: std::sync::atomic::AtomicUsize,
}

#[cfg(test)]
impl SequenceSuffix {
    pub(crate) fn new(values: Vec<u16>) -> Self {
        Self {
            values,
            next: std::sync::atomic::AtomicUsize::new(0),
        }
    }
}

#[cfg(test)]
impl SuffixSource for SequenceSuffix {
    fn next_suffix(&self) -> u16 {
        let i = self.next.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        self.values
            .get(i)
            .or_else(|| self.values.last())
            .copied()
            .unwrap_or(SUFFIX_MIN)
    }
}
