use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;

use crate::adapters::store::{LocationStore, StoreError};
use crate::runtime::record::{Record, StoredItem};

/// Process-local store with upsert-by-id semantics.
///
/// Rejections can be scripted per `batch_write` call or pinned to specific
/// ids, which is how throttled partial writes are simulated. Every call is
/// counted so callers can assert that a path never touched the store.
#[derive(Debug, Default)]
pub struct InMemoryLocationStore {
    collections: Mutex<BTreeMap<String, BTreeMap<String, StoredItem>>>,
    scripted_rejections: Mutex<VecDeque<BTreeSet<String>>>,
    always_rejected: Mutex<BTreeSet<String>>,
    unavailable: Mutex<Option<String>>,
    submissions: Mutex<Vec<Vec<String>>>,
    scan_calls: Mutex<usize>,
}

impl InMemoryLocationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a set of ids to leave unprocessed on the next un-scripted
    /// `batch_write` call. Calls consume queued sets in order.
    pub fn reject_on_next_write<I, S>(&self, ids: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        lock(&self.scripted_rejections).push_back(ids.into_iter().map(Into::into).collect());
    }

    /// Leaves the id unprocessed on every write.
    pub fn always_reject(&self, id: impl Into<String>) {
        lock(&self.always_rejected).insert(id.into());
    }

    /// Makes every subsequent call fail as if the store were unreachable.
    pub fn set_unavailable(&self, message: impl Into<String>) {
        *lock(&self.unavailable) = Some(message.into());
    }

    /// Stores an item as-is, bypassing record mapping.
    pub fn insert_raw(&self, collection: &str, key: impl Into<String>, item: StoredItem) {
        lock(&self.collections)
            .entry(collection.to_string())
            .or_default()
            .insert(key.into(), item);
    }

    pub fn items(&self, collection: &str) -> BTreeMap<String, StoredItem> {
        lock(&self.collections)
            .get(collection)
            .cloned()
            .unwrap_or_default()
    }

    /// Ids submitted on each `batch_write` call, in call order.
    pub fn submissions(&self) -> Vec<Vec<String>> {
        lock(&self.submissions).clone()
    }

    pub fn batch_write_calls(&self) -> usize {
        lock(&self.submissions).len()
    }

    pub fn scan_calls(&self) -> usize {
        *lock(&self.scan_calls)
    }

    pub fn total_calls(&self) -> usize {
        self.batch_write_calls() + self.scan_calls()
    }

    fn check_available(&self) -> Result<(), StoreError> {
        match lock(&self.unavailable).as_ref() {
            Some(message) => Err(StoreError::Request(message.clone())),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl LocationStore for InMemoryLocationStore {
    async fn batch_write(
        &self,
        collection: &str,
        records: &[Record],
    ) -> Result<Vec<Record>, StoreError> {
        lock(&self.submissions).push(records.iter().map(|record| record.id.clone()).collect());
        self.check_available()?;

        let scripted = lock(&self.scripted_rejections).pop_front().unwrap_or_default();
        let always = lock(&self.always_rejected).clone();

        let mut collections = lock(&self.collections);
        let items = collections.entry(collection.to_string()).or_default();
        let mut unprocessed = Vec::new();
        for record in records {
            if scripted.contains(&record.id) || always.contains(&record.id) {
                unprocessed.push(record.clone());
                continue;
            }
            items.insert(record.id.clone(), record.to_item());
        }

        Ok(unprocessed)
    }

    async fn scan(&self, collection: &str) -> Result<Vec<StoredItem>, StoreError> {
        *lock(&self.scan_calls) += 1;
        self.check_available()?;

        Ok(lock(&self.collections)
            .get(collection)
            .map(|items| items.values().cloned().collect())
            .unwrap_or_default())
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
