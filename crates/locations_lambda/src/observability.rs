//! Logging setup and the per-invocation correlation wrapper.
//!
//! Handlers stay free of correlation concerns: `with_correlation` opens a
//! span carrying a fresh correlation id, logs the request and whatever the
//! handler produced, and hands the handler's value back untouched.

use std::future::Future;

use serde::Serialize;
use tracing::{info, info_span, Instrument};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use crate::config::LOG_FILTER_ENV;

/// Initialize JSON tracing with the `LOCATIONS_LOG` filter.
///
/// Defaults to "info" if `LOCATIONS_LOG` is not set. Timestamps are left to
/// the Lambda log pipeline.
pub fn init_tracing() {
    let filter =
        EnvFilter::try_from_env(LOG_FILTER_ENV).unwrap_or_else(|_| EnvFilter::new("info"));

    // A subscriber may already be installed (tests, warm re-init).
    let _ = tracing_subscriber::fmt()
        .json()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_target(false)
        .with_current_span(true)
        .with_span_list(false)
        .without_time()
        .try_init();
}

pub fn new_correlation_id() -> String {
    Uuid::new_v4().to_string()
}

pub async fn with_correlation<Req, Out, Fut>(
    handler: &'static str,
    request: &Req,
    run: Fut,
) -> Out
where
    Req: Serialize + ?Sized,
    Out: Serialize,
    Fut: Future<Output = Out>,
{
    let correlation_id = new_correlation_id();
    let span = info_span!("invocation", correlation_id = %correlation_id, handler);

    async move {
        info!("started");
        info!(request = %to_log_json(request), "request received");
        let output = run.await;
        info!(response = %to_log_json(&output), "response produced");
        output
    }
    .instrument(span)
    .await
}

fn to_log_json<T: Serialize + ?Sized>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_else(|error| format!("<unserializable: {error}>"))
}

#[cfg(test)]
mod tests {
    use std::io;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use serde_json::{json, Value};

    use super::*;
    use crate::adapters::memory::InMemoryLocationStore;
    use crate::handlers::populate::LifecycleController;
    use crate::runtime::contract::{LifecycleOutcome, OutcomeStatus};
    use crate::runtime::retry::RetryPolicy;

    #[derive(Clone, Default)]
    struct CapturedLogs {
        buffer: Arc<Mutex<Vec<u8>>>,
    }

    impl CapturedLogs {
        fn lines(&self) -> Vec<Value> {
            let bytes = self.buffer.lock().expect("poisoned mutex").clone();
            String::from_utf8(bytes)
                .expect("logs should be utf-8")
                .lines()
                .map(|line| serde_json::from_str(line).expect("log line should be json"))
                .collect()
        }
    }

    impl io::Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.buffer.lock().expect("poisoned mutex").extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    async fn handle_with_captured_logs(payload: Value) -> (LifecycleOutcome, Vec<Value>) {
        let logs = CapturedLogs::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .json()
            .with_writer(move || writer.clone())
            .with_current_span(true)
            .with_span_list(false)
            .without_time()
            .finish();
        let _guard = tracing::subscriber::set_default(subscriber);

        let store = InMemoryLocationStore::new();
        let policy = RetryPolicy::new(3, Duration::from_millis(10)).expect("valid policy");
        let controller = LifecycleController::new(&store, policy);
        let outcome = with_correlation(
            "populate-locations.handler",
            &payload,
            controller.handle_payload(payload.clone()),
        )
        .await;

        (outcome, logs.lines())
    }

    fn message(line: &Value) -> &str {
        line["fields"]["message"].as_str().unwrap_or_default()
    }

    fn find<'a>(lines: &'a [Value], text: &str) -> &'a Value {
        lines
            .iter()
            .find(|line| message(line) == text)
            .unwrap_or_else(|| panic!("missing '{text}' log line"))
    }

    fn assert_correlated(lines: &[Value]) {
        let ids: Vec<&str> = lines
            .iter()
            .filter_map(|line| line["span"]["correlation_id"].as_str())
            .collect();

        assert_eq!(ids.len(), lines.len(), "every line carries a correlation id");
        assert!(Uuid::parse_str(ids[0]).is_ok());
        assert!(ids.iter().all(|id| *id == ids[0]));
        assert!(lines
            .iter()
            .all(|line| line["span"]["handler"] == "populate-locations.handler"));
    }

    #[test]
    fn correlation_ids_are_unique_uuids() {
        let first = new_correlation_id();
        let second = new_correlation_id();

        assert_ne!(first, second);
        assert!(Uuid::parse_str(&first).is_ok());
    }

    #[tokio::test]
    async fn wrapper_returns_the_handler_output_unchanged() {
        let request = json!({"RequestType": "Delete"});
        let output = with_correlation("populate-locations.handler", &request, async {
            json!({"Status": "SUCCESS"})
        })
        .await;

        assert_eq!(output, json!({"Status": "SUCCESS"}));
    }

    #[tokio::test]
    async fn create_logs_request_and_success_outcome_under_one_correlation_id() {
        let (outcome, lines) = handle_with_captured_logs(json!({
            "RequestType": "Create",
            "RequestId": "req-create",
            "LogicalResourceId": "CustomResource",
            "StackId": "stack-1",
            "ResourceProperties": { "tableName": "Locations" }
        }))
        .await;

        assert_eq!(outcome.status, OutcomeStatus::Success);
        assert_correlated(&lines);
        find(&lines, "started");

        let request = find(&lines, "request received")["fields"]["request"]
            .as_str()
            .expect("request field");
        let request: Value = serde_json::from_str(request).expect("request is logged as json");
        assert_eq!(request["RequestType"], "Create");
        assert_eq!(request["RequestId"], "req-create");

        let response = find(&lines, "response produced")["fields"]["response"]
            .as_str()
            .expect("response field");
        let response: Value = serde_json::from_str(response).expect("response is logged as json");
        assert_eq!(
            response,
            serde_json::to_value(&outcome).expect("outcome should serialize")
        );
    }

    #[tokio::test]
    async fn failed_outcomes_are_logged_with_their_reason() {
        let (outcome, lines) = handle_with_captured_logs(json!({
            "RequestType": "Unknown",
            "RequestId": "req-unknown",
            "ResourceProperties": { "tableName": "Locations" }
        }))
        .await;

        assert_eq!(outcome.status, OutcomeStatus::Failed);
        assert_correlated(&lines);

        let request = find(&lines, "request received")["fields"]["request"]
            .as_str()
            .expect("request field");
        assert!(request.contains("req-unknown"));

        let response = find(&lines, "response produced")["fields"]["response"]
            .as_str()
            .expect("response field");
        let response: Value = serde_json::from_str(response).expect("response is logged as json");
        assert_eq!(response["Status"], "FAILED");
        assert_eq!(response["Reason"], "unsupported request type");
        assert_eq!(response["RequestId"], "req-unknown");
    }
}
