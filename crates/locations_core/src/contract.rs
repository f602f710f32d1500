use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::seed::PHYSICAL_RESOURCE_ID;

pub const MISSING_COLLECTION_REASON: &str = "table name not supplied";
pub const UNSUPPORTED_REQUEST_REASON: &str = "unsupported request type";

/// Lifecycle request kind sent by the orchestrator. Anything other than the
/// three known kinds is kept verbatim so it can be reported back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RequestType {
    Create,
    Update,
    Delete,
    Unsupported(String),
}

impl From<String> for RequestType {
    fn from(value: String) -> Self {
        match value.as_str() {
            "Create" => Self::Create,
            "Update" => Self::Update,
            "Delete" => Self::Delete,
            _ => Self::Unsupported(value),
        }
    }
}

impl From<RequestType> for String {
    fn from(value: RequestType) -> Self {
        match value {
            RequestType::Create => "Create".to_string(),
            RequestType::Update => "Update".to_string(),
            RequestType::Delete => "Delete".to_string(),
            RequestType::Unsupported(other) => other,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ResourceProperties {
    #[serde(rename = "tableName", default, skip_serializing_if = "Option::is_none")]
    pub table_name: Option<String>,
    #[serde(rename = "ServiceToken", default, skip_serializing_if = "Option::is_none")]
    pub service_token: Option<String>,
}

/// Custom resource lifecycle event as delivered by the provisioning
/// orchestrator.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct LifecycleEvent {
    pub request_type: RequestType,
    #[serde(default)]
    pub request_id: String,
    #[serde(default)]
    pub logical_resource_id: String,
    #[serde(default)]
    pub stack_id: String,
    #[serde(default)]
    pub resource_properties: ResourceProperties,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub old_resource_properties: Option<Value>,
    #[serde(rename = "ResponseURL", default, skip_serializing_if = "Option::is_none")]
    pub response_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub physical_resource_id: Option<String>,
}

impl LifecycleEvent {
    pub fn new(
        request_type: RequestType,
        request_id: impl Into<String>,
        logical_resource_id: impl Into<String>,
        stack_id: impl Into<String>,
        target_collection: impl Into<String>,
    ) -> Self {
        Self {
            request_type,
            request_id: request_id.into(),
            logical_resource_id: logical_resource_id.into(),
            stack_id: stack_id.into(),
            resource_properties: ResourceProperties {
                table_name: Some(target_collection.into()),
                service_token: None,
            },
            old_resource_properties: None,
            response_url: None,
            resource_type: None,
            physical_resource_id: None,
        }
    }

    /// Target collection name, required before any write is attempted.
    pub fn target_collection(&self) -> Result<&str, ValidationError> {
        match self.resource_properties.table_name.as_deref() {
            Some(name) if !name.trim().is_empty() => Ok(name.trim()),
            _ => Err(ValidationError::new(MISSING_COLLECTION_REASON)),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum OutcomeStatus {
    #[serde(rename = "SUCCESS")]
    Success,
    #[serde(rename = "FAILED")]
    Failed,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct OutcomeData {
    pub record_count: usize,
}

/// Structured response returned to the orchestrator for every event.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct LifecycleOutcome {
    pub status: OutcomeStatus,
    pub reason: String,
    pub physical_resource_id: String,
    pub request_id: String,
    pub logical_resource_id: String,
    pub stack_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<OutcomeData>,
}

impl LifecycleOutcome {
    pub fn success(event: &LifecycleEvent, data: Option<OutcomeData>) -> Self {
        Self {
            status: OutcomeStatus::Success,
            reason: String::new(),
            physical_resource_id: PHYSICAL_RESOURCE_ID.to_string(),
            request_id: event.request_id.clone(),
            logical_resource_id: event.logical_resource_id.clone(),
            stack_id: event.stack_id.clone(),
            data,
        }
    }

    pub fn failed(event: &LifecycleEvent, reason: impl Into<String>) -> Self {
        Self::failed_with_ids(
            &event.request_id,
            &event.logical_resource_id,
            &event.stack_id,
            reason,
        )
    }

    pub fn failed_with_ids(
        request_id: &str,
        logical_resource_id: &str,
        stack_id: &str,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            status: OutcomeStatus::Failed,
            reason: reason.into(),
            physical_resource_id: PHYSICAL_RESOURCE_ID.to_string(),
            request_id: request_id.to_string(),
            logical_resource_id: logical_resource_id.to_string(),
            stack_id: stack_id.to_string(),
            data: None,
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == OutcomeStatus::Success
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct ValidationError {
    message: String,
}

impl ValidationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}
