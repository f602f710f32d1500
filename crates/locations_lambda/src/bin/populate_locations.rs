use lambda_runtime::{service_fn, Error, LambdaEvent};
use locations_lambda::adapters::dynamo::DynamoLocationStore;
use locations_lambda::config::ServiceConfig;
use locations_lambda::handlers::populate::LifecycleController;
use locations_lambda::observability::{init_tracing, with_correlation};
use locations_lambda::runtime::contract::LifecycleOutcome;
use serde_json::Value;

const HANDLER_NAME: &str = "populate-locations.handler";

struct RuntimeDependencies {
    config: ServiceConfig,
    store: DynamoLocationStore,
}

async fn handle_request(
    event: LambdaEvent<Value>,
    deps: &RuntimeDependencies,
) -> Result<LifecycleOutcome, Error> {
    let controller = LifecycleController::new(&deps.store, deps.config.retry_policy);
    let payload = event.payload;

    let outcome = with_correlation(
        HANDLER_NAME,
        &payload,
        controller.handle_payload(payload.clone()),
    )
    .await;
    Ok(outcome)
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    init_tracing();

    let config = ServiceConfig::from_env()?;
    let store = DynamoLocationStore::from_env(config.dynamodb_endpoint_url.as_deref()).await;
    let deps = RuntimeDependencies { config, store };
    let deps = &deps;

    lambda_runtime::run(service_fn(move |event| handle_request(event, deps))).await
}
