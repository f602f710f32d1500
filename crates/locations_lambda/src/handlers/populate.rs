use serde_json::Value;

use crate::adapters::store::LocationStore;
use crate::runtime::contract::{
    LifecycleEvent, LifecycleOutcome, OutcomeData, RequestType, UNSUPPORTED_REQUEST_REASON,
};
use crate::runtime::record::Record;
use crate::runtime::retry::RetryPolicy;
use crate::runtime::seed::seed_set;
use crate::seeder::BatchSeeder;

/// Maps orchestrator lifecycle events onto seeding of the locations
/// collection. Holds no state between events.
pub struct LifecycleController<'a> {
    seeder: BatchSeeder<'a>,
    records: Vec<Record>,
}

impl<'a> LifecycleController<'a> {
    pub fn new(store: &'a dyn LocationStore, policy: RetryPolicy) -> Self {
        Self::with_records(store, policy, seed_set())
    }

    pub fn with_records(
        store: &'a dyn LocationStore,
        policy: RetryPolicy,
        records: Vec<Record>,
    ) -> Self {
        Self {
            seeder: BatchSeeder::new(store, policy),
            records,
        }
    }

    /// Never fails: every error ends up as a `Failed` outcome.
    pub async fn handle(&self, event: &LifecycleEvent) -> LifecycleOutcome {
        match &event.request_type {
            RequestType::Create | RequestType::Update => self.ensure_seeded(event).await,
            // The collection is torn down with its table; nothing to remove here.
            RequestType::Delete => LifecycleOutcome::success(event, None),
            RequestType::Unsupported(_) => {
                LifecycleOutcome::failed(event, UNSUPPORTED_REQUEST_REASON)
            }
        }
    }

    /// Decodes a raw orchestrator payload before handling it. Payloads that
    /// cannot be decoded still produce a `Failed` outcome carrying whatever
    /// identifiers could be read.
    pub async fn handle_payload(&self, payload: Value) -> LifecycleOutcome {
        match decode_lifecycle_event(payload) {
            Ok(event) => self.handle(&event).await,
            Err(outcome) => outcome,
        }
    }

    async fn ensure_seeded(&self, event: &LifecycleEvent) -> LifecycleOutcome {
        let collection = match event.target_collection() {
            Ok(value) => value,
            Err(error) => return LifecycleOutcome::failed(event, error.message()),
        };

        match self.seeder.seed(collection, &self.records).await {
            Ok(report) => LifecycleOutcome::success(
                event,
                Some(OutcomeData {
                    record_count: report.records_written,
                }),
            ),
            Err(error) => LifecycleOutcome::failed(event, error.to_string()),
        }
    }
}

pub fn decode_lifecycle_event(payload: Value) -> Result<LifecycleEvent, LifecycleOutcome> {
    match serde_json::from_value::<LifecycleEvent>(payload.clone()) {
        Ok(event) => Ok(event),
        Err(error) => {
            let field = |name: &str| {
                payload
                    .get(name)
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string()
            };
            Err(LifecycleOutcome::failed_with_ids(
                &field("RequestId"),
                &field("LogicalResourceId"),
                &field("StackId"),
                format!("malformed lifecycle event: {error}"),
            ))
        }
    }
}
