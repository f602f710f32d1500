use std::collections::BTreeSet;

use tracing::{debug, warn};

use crate::adapters::store::{LocationStore, StoreError};
use crate::runtime::contract::ValidationError;
use crate::runtime::record::Record;
use crate::runtime::retry::RetryPolicy;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SeedError {
    #[error("invalid seed request: {0}")]
    Validation(#[from] ValidationError),
    #[error(
        "the following were unprocessed after {attempts} attempts: {}",
        .unprocessed_ids.join(", ")
    )]
    Write {
        attempts: u32,
        unprocessed_ids: Vec<String>,
    },
    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeedReport {
    pub attempts: u32,
    pub records_written: usize,
}

/// Writes a fixed record set as one logical batch, resubmitting only the
/// items the store left unprocessed until they land or the retry budget
/// runs out.
pub struct BatchSeeder<'a> {
    store: &'a dyn LocationStore,
    policy: RetryPolicy,
}

impl<'a> BatchSeeder<'a> {
    pub fn new(store: &'a dyn LocationStore, policy: RetryPolicy) -> Self {
        Self { store, policy }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    pub async fn seed(
        &self,
        collection: &str,
        records: &[Record],
    ) -> Result<SeedReport, SeedError> {
        validate_seed_request(collection, records)?;

        let mut pending = records.to_vec();
        let mut attempt = 0u32;
        loop {
            attempt += 1;
            if attempt > 1 {
                let delay = self.policy.delay_before_retry(attempt - 1);
                debug!(attempt, delay = ?delay, "backing off before retry");
                tokio::time::sleep(delay).await;
            }

            let unprocessed = self.store.batch_write(collection, &pending).await?;
            debug!(
                collection,
                attempt,
                submitted = pending.len(),
                unprocessed = unprocessed.len(),
                "batch write attempt finished"
            );

            if unprocessed.is_empty() {
                return Ok(SeedReport {
                    attempts: attempt,
                    records_written: records.len(),
                });
            }

            if attempt >= self.policy.max_attempts() {
                let unprocessed_ids: Vec<String> =
                    unprocessed.into_iter().map(|record| record.id).collect();
                warn!(
                    collection,
                    attempts = attempt,
                    unprocessed = ?unprocessed_ids,
                    "retry budget exhausted with unprocessed records"
                );
                return Err(SeedError::Write {
                    attempts: attempt,
                    unprocessed_ids,
                });
            }

            pending = unprocessed;
        }
    }
}

fn validate_seed_request(collection: &str, records: &[Record]) -> Result<(), ValidationError> {
    if collection.trim().is_empty() {
        return Err(ValidationError::new("collection name cannot be empty"));
    }

    if records.is_empty() {
        return Err(ValidationError::new("seed records cannot be empty"));
    }

    let mut seen = BTreeSet::new();
    for record in records {
        if record.id.trim().is_empty() || record.name.trim().is_empty() {
            return Err(ValidationError::new("seed records need a non-empty id and name"));
        }
        if !seen.insert(record.id.as_str()) {
            return Err(ValidationError::new(format!(
                "duplicate seed record id '{}'",
                record.id
            )));
        }
    }

    Ok(())
}
