use async_trait::async_trait;

use crate::runtime::record::{Record, StoredItem};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("store request failed: {0}")]
    Request(String),
    #[error("store response could not be decoded: {0}")]
    Decode(String),
}

/// Key-value capability the seeder and query paths run against.
#[async_trait]
pub trait LocationStore: Send + Sync {
    /// Upserts the records by id as one logical batch. Returns the records
    /// the store left unprocessed, in submission order; an empty vector
    /// means the whole batch was applied.
    async fn batch_write(
        &self,
        collection: &str,
        records: &[Record],
    ) -> Result<Vec<Record>, StoreError>;

    /// Returns every item in the collection using an eventually consistent
    /// read.
    async fn scan(&self, collection: &str) -> Result<Vec<StoredItem>, StoreError>;
}
