use lambda_runtime::{service_fn, Error, LambdaEvent};
use locations_lambda::adapters::dynamo::DynamoLocationStore;
use locations_lambda::config::ServiceConfig;
use locations_lambda::handlers::list::{handle_list_request, ApiGatewayResponse};
use locations_lambda::observability::{init_tracing, with_correlation};
use serde_json::Value;

const HANDLER_NAME: &str = "list-locations.handler";

struct RuntimeDependencies {
    table_name: String,
    store: DynamoLocationStore,
}

async fn handle_request(
    event: LambdaEvent<Value>,
    deps: &RuntimeDependencies,
) -> Result<ApiGatewayResponse, Error> {
    let response = with_correlation(
        HANDLER_NAME,
        &event.payload,
        handle_list_request(&deps.store, &deps.table_name),
    )
    .await;
    Ok(response)
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    init_tracing();

    let config = ServiceConfig::from_env()?;
    let table_name = config.require_locations_table()?.to_string();
    let store = DynamoLocationStore::from_env(config.dynamodb_endpoint_url.as_deref()).await;
    let deps = RuntimeDependencies { table_name, store };
    let deps = &deps;

    lambda_runtime::run(service_fn(move |event| handle_request(event, deps))).await
}
