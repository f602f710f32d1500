//! DynamoDB-backed location store.
//!
//! Table schema:
//! - PK: `Id` (String)
//! - `Name` (String)

use std::collections::HashMap;
use std::future::Future;

use async_trait::async_trait;
use aws_sdk_dynamodb::error::DisplayErrorContext;
use aws_sdk_dynamodb::operation::batch_write_item::BatchWriteItemOutput;
use aws_sdk_dynamodb::operation::scan::ScanOutput;
use aws_sdk_dynamodb::types::{AttributeValue, PutRequest, WriteRequest};
use aws_sdk_dynamodb::Client;
use tracing::{debug, info};

use crate::adapters::store::{LocationStore, StoreError};
use crate::runtime::record::{Record, StoredItem};

/// `BatchWriteItem` accepts at most this many requests per call.
pub const MAX_BATCH_WRITE_ITEMS: usize = 25;

type AttributeMap = HashMap<String, AttributeValue>;

pub struct DynamoLocationStore {
    client: Client,
}

impl DynamoLocationStore {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Loads the default AWS configuration, optionally pointing the client at
    /// a local endpoint.
    pub async fn from_env(endpoint_url: Option<&str>) -> Self {
        let config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;

        let client = if let Some(endpoint) = endpoint_url {
            let dynamo_config = aws_sdk_dynamodb::config::Builder::from(&config)
                .endpoint_url(endpoint)
                .build();
            Client::from_conf(dynamo_config)
        } else {
            Client::new(&config)
        };

        info!(endpoint = endpoint_url.unwrap_or("default"), "dynamodb client ready");
        Self { client }
    }

    async fn write_chunk(
        &self,
        collection: &str,
        chunk: &[Record],
    ) -> Result<Vec<Record>, StoreError> {
        let requests = chunk
            .iter()
            .map(to_write_request)
            .collect::<Result<Vec<_>, _>>()?;

        let output = self
            .client
            .batch_write_item()
            .request_items(collection, requests)
            .send()
            .await
            .map_err(|error| {
                StoreError::Request(format!(
                    "dynamodb batch_write_item failed: {}",
                    DisplayErrorContext(&error)
                ))
            })?;

        unprocessed_records(&output, collection)
    }
}

#[async_trait]
impl LocationStore for DynamoLocationStore {
    async fn batch_write(
        &self,
        collection: &str,
        records: &[Record],
    ) -> Result<Vec<Record>, StoreError> {
        let mut unprocessed = Vec::new();
        for chunk in records.chunks(MAX_BATCH_WRITE_ITEMS) {
            unprocessed.extend(self.write_chunk(collection, chunk).await?);
        }

        debug!(
            table = %collection,
            submitted = records.len(),
            unprocessed = unprocessed.len(),
            "dynamodb batch write finished"
        );
        Ok(unprocessed)
    }

    async fn scan(&self, collection: &str) -> Result<Vec<StoredItem>, StoreError> {
        let (items, pages) = collect_scan_pages(|start_key| async move {
            self.client
                .scan()
                .table_name(collection)
                .consistent_read(false)
                .set_exclusive_start_key(start_key)
                .send()
                .await
                .map_err(|error| {
                    StoreError::Request(format!(
                        "dynamodb scan failed: {}",
                        DisplayErrorContext(&error)
                    ))
                })
        })
        .await?;

        debug!(table = %collection, pages, items = items.len(), "dynamodb scan finished");
        Ok(items)
    }
}

/// Decodes the put requests DynamoDB handed back for `collection` into
/// records, preserving their order.
fn unprocessed_records(
    output: &BatchWriteItemOutput,
    collection: &str,
) -> Result<Vec<Record>, StoreError> {
    let Some(unprocessed) = output
        .unprocessed_items()
        .and_then(|tables| tables.get(collection))
    else {
        return Ok(Vec::new());
    };

    unprocessed
        .iter()
        .filter_map(WriteRequest::put_request)
        .map(|put| from_attribute_map(put.item()))
        .map(|item| {
            Record::from_item(&item).map_err(|error| StoreError::Decode(error.to_string()))
        })
        .collect()
}

/// Drives `fetch_page` from the first page until `LastEvaluatedKey` comes
/// back absent or empty. Returns the items and the number of pages read.
async fn collect_scan_pages<F, Fut>(
    mut fetch_page: F,
) -> Result<(Vec<StoredItem>, usize), StoreError>
where
    F: FnMut(Option<AttributeMap>) -> Fut,
    Fut: Future<Output = Result<ScanOutput, StoreError>>,
{
    let mut items = Vec::new();
    let mut start_key: Option<AttributeMap> = None;
    let mut pages = 0usize;

    loop {
        let output = fetch_page(start_key.take()).await?;
        pages += 1;

        items.extend(output.items().iter().map(from_attribute_map));

        match output.last_evaluated_key() {
            Some(key) if !key.is_empty() => start_key = Some(key.clone()),
            _ => return Ok((items, pages)),
        }
    }
}

fn to_write_request(record: &Record) -> Result<WriteRequest, StoreError> {
    let item: AttributeMap = record
        .to_item()
        .into_iter()
        .map(|(name, value)| (name, AttributeValue::S(value)))
        .collect();

    let put = PutRequest::builder()
        .set_item(Some(item))
        .build()
        .map_err(|error| StoreError::Request(format!("invalid put request: {error}")))?;

    Ok(WriteRequest::builder().put_request(put).build())
}

/// Keeps string attributes only; anything else is left out so the record
/// mapping reports it as missing.
fn from_attribute_map(attributes: &AttributeMap) -> StoredItem {
    attributes
        .iter()
        .filter_map(|(name, value)| match value {
            AttributeValue::S(text) => Some((name.clone(), text.clone())),
            _ => None,
        })
        .collect()
}
