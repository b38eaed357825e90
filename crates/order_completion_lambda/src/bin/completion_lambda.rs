use lambda_runtime::{service_fn, Error, LambdaEvent};
use serde_json::Value;

use order_completion_lambda::adapters::attributes::order_to_item;
use order_completion_lambda::adapters::order_store::OrderStore;
use order_completion_lambda::handlers::complete::{
    handle_completion_batch, per_order_delay_from, CompletionHandlerConfig,
};
use order_completion_lambda::runtime::contract::{CompletionSummary, OrderRecord};

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

async fn handle_request(
    event: LambdaEvent<Value>,
    config: &CompletionHandlerConfig,
    store: &DynamoDbOrderStore,
) -> Result<CompletionSummary, Error> {
    let bodies = extract_order_bodies(&event.payload)?;
    handle_completion_batch(&bodies, config, store).map_err(|error| Error::from(error.message))
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    let table_name =
        std::env::var("ORDERS_TABLE_NAME").unwrap_or_else(|_| "orders_table".to_string());
    let per_order_delay =
        per_order_delay_from(std::env::var("ORDER_PROCESS_DELAY_SECONDS").ok().as_deref())
            .map_err(Error::from)?;

    let aws_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
    let store = DynamoDbOrderStore {
        table_name: table_name.clone(),
        dynamodb_client: aws_sdk_dynamodb::Client::new(&aws_config),
    };
    let config = CompletionHandlerConfig {
        table_name,
        per_order_delay,
    };

    lambda_runtime::run(service_fn(|event: LambdaEvent<Value>| {
        handle_request(event, &config, &store)
    }))
    .await
}
