use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{error, info};

use crate::adapters::store::{LocationStore, StoreError};
use crate::runtime::record::{IntegrityError, Record};

pub const INTERNAL_ERROR_BODY: &str = "An error occurred";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ApiGatewayResponse {
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    pub headers: Value,
    pub body: String,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QueryError {
    #[error("items not found in collection '{collection}'")]
    NotFound { collection: String },
    #[error("stored item failed integrity check: {0}")]
    Integrity(#[from] IntegrityError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Lists every record in the collection.
///
/// An empty collection is an error, not an empty list: an unseeded table and
/// a seeded-but-empty one both surface as `NotFound`. A single malformed
/// item fails the whole request.
pub async fn list_all(
    store: &dyn LocationStore,
    collection: &str,
) -> Result<Vec<Record>, QueryError> {
    let items = store.scan(collection).await?;
    if items.is_empty() {
        return Err(QueryError::NotFound {
            collection: collection.to_string(),
        });
    }

    items
        .iter()
        .map(|item| Record::from_item(item).map_err(QueryError::from))
        .collect()
}

/// Runs `list_all` and shapes the result as a proxy response. Failures
/// collapse into a generic 500 so store detail never reaches the client;
/// the detail is logged instead.
pub async fn handle_list_request(
    store: &dyn LocationStore,
    collection: &str,
) -> ApiGatewayResponse {
    let records = match list_all(store, collection).await {
        Ok(value) => value,
        Err(error) => {
            error!(collection, error = %error, "list locations failed");
            return error_response();
        }
    };

    match serde_json::to_string(&records) {
        Ok(body) => {
            info!(collection, count = records.len(), "listed locations");
            success_response(body)
        }
        Err(error) => {
            error!(error = %error, "failed to serialize locations");
            error_response()
        }
    }
}

fn success_response(body: String) -> ApiGatewayResponse {
    ApiGatewayResponse {
        status_code: 200,
        headers: json!({"Content-Type": "application/json"}),
        body,
    }
}

fn error_response() -> ApiGatewayResponse {
    ApiGatewayResponse {
        status_code: 500,
        headers: json!({"Content-Type": "text/plain"}),
        body: INTERNAL_ERROR_BODY.to_string(),
    }
}
