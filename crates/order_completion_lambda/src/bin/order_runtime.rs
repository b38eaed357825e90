use std::time::Duration;

use lambda_runtime::{service_fn, Error, LambdaEvent};
use serde_json::Value;

use order_completion_lambda::adapters::attributes::order_to_item;
use order_completion_lambda::adapters::order_store::OrderStore;
use order_completion_lambda::handlers::complete::{
    handle_completion_batch, per_order_delay_from, CompletionHandlerConfig,
};
use order_completion_lambda::handlers::generate::{handle_generate_event, ApiGatewayResponse};
use order_completion_lambda::runtime::contract::OrderRecord;

struct DynamoDbOrderStore {
    table_name: String,
    dynamodb_client: aws_sdk_dynamodb::Client,
}

impl OrderStore for DynamoDbOrderStore {
    fn put_order(&self, order: &OrderRecord) -> Result<(), String> {
        let item = order_to_item(order);
        let table_name = self.table_name.clone();
        let client = self.dynamodb_client.clone();

        tokio::task::block_in_place(|| {
            tokio::runtime::Handle::current().block_on(async move {
                client
                    .put_item()
                    .table_name(table_name)
                    .set_item(Some(item))
                    .send()
                    .await
                    .map(|_| ())
                    .map_err(|error| format!("failed to put order item to dynamodb: {error}"))
            })
        })
    }
}

#[derive(Clone)]
struct RuntimeDependencies {
    queue_url: Option<String>,
    table_name: String,
    per_order_delay: Duration,
    dynamodb_client: aws_sdk_dynamodb::Client,
    sqs_client: aws_sdk_sqs::Client,
}

async fn handle_request(
    event: LambdaEvent<Value>,
    deps: &RuntimeDependencies,
) -> Result<Value, Error> {
    if is_sqs_event(&event.payload) {
        let bodies = extract_order_bodies(&event.payload)?;
        let config = CompletionHandlerConfig {
            table_name: deps.table_name.clone(),
            per_order_delay: deps.per_order_delay,
        };
        let store = DynamoDbOrderStore {
            table_name: deps.table_name.clone(),
            dynamodb_client: deps.dynamodb_client.clone(),
        };

        let summary = handle_completion_batch(&bodies, &config, &store)
            .map_err(|error| Error::from(error.message))?;
        serde_json::to_value(summary).map_err(|error| {
            Error::from(format!("failed to serialize completion summary: {error}"))
        })
    } else {
        let sqs_client = deps.sqs_client.clone();
        let queue_url = deps.queue_url.clone();
        let response: ApiGatewayResponse = handle_generate_event(
            event.payload,
            deps.queue_url.as_deref(),
            &move |payload: &[u8]| -> Result<(), String> {
                let body = String::from_utf8(payload.to_vec())
                    .map_err(|error| format!("invalid UTF-8 order payload: {error}"))?;
                let target_queue_url = queue_url
                    .clone()
                    .ok_or_else(|| "ORDER_QUEUE_URL must be configured".to_string())?;
                let client = sqs_client.clone();
                tokio::task::block_in_place(|| {
                    tokio::runtime::Handle::current().block_on(async move {
                        client
                            .send_message()
                            .queue_url(target_queue_url)
                            .message_body(body)
                            .send()
                            .await
                            .map(|_| ())
                            .map_err(|error| format!("failed to enqueue order message: {error}"))
                    })
                })
            },
        );
        serde_json::to_value(response)
            .map_err(|error| Error::from(format!("failed to serialize api response: {error}")))
    }
}

fn is_sqs_event(event: &Value) -> bool {
    event
        .get("Records")
        .and_then(Value::as_array)
        .map(|records| {
            !records.is_empty()
                && records.iter().all(|record| {
                    record
                        .get("eventSource")
                        .and_then(Value::as_str)
                        .map(|source| source == "aws:sqs")
                        .unwrap_or(false)
                })
        })
        .unwrap_or(false)
}

fn extract_order_bodies(event: &Value) -> Result<Vec<String>, Error> {
    let records = event
        .get("Records")
        .and_then(Value::as_array)
        .ok_or_else(|| Error::from("SQS event must include Records array"))?;

    let mut bodies = Vec::with_capacity(records.len());
    for record in records {
        let body = record
            .get("body")
            .and_then(Value::as_str)
            .ok_or_else(|| Error::from("SQS record body must be a string"))?;
        bodies.push(body.to_string());
    }

    Ok(bodies)
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    let aws_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
    let deps = RuntimeDependencies {
        queue_url: std::env::var("ORDER_QUEUE_URL").ok(),
        table_name: std::env::var("ORDERS_TABLE_NAME")
            .unwrap_or_else(|_| "orders_table".to_string()),
        per_order_delay: per_order_delay_from(
            std::env::var("ORDER_PROCESS_DELAY_SECONDS").ok().as_deref(),
        )
        .map_err(Error::from)?,
        dynamodb_client: aws_sdk_dynamodb::Client::new(&aws_config),
        sqs_client: aws_sdk_sqs::Client::new(&aws_config),
    };

    lambda_runtime::run(service_fn(|event: LambdaEvent<Value>| {
        handle_request(event, &deps)
    }))
    .await
}
