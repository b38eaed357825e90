use lambda_runtime::{service_fn, Error, LambdaEvent};
use serde_json::Value;

use order_completion_lambda::adapters::dispatch::OrderDispatcher;
use order_completion_lambda::handlers::generate::{handle_generate_event, ApiGatewayResponse};

struct SqsOrderDispatcher {
    sqs_client: aws_sdk_sqs::Client,
    queue_url: String,
}

struct NoopDispatcher;

impl OrderDispatcher for NoopDispatcher {
    fn dispatch_order(&self, _payload: &[u8]) -> Result<(), String> {
        Ok(())
    }
}

impl OrderDispatcher for SqsOrderDispatcher {
    fn dispatch_order(&self, payload: &[u8]) -> Result<(), String> {
        let body = String::from_utf8(payload.to_vec())
            .map_err(|error| format!("invalid UTF-8 order payload: {error}"))?;
        let client = self.sqs_client.clone();
        let queue_url = self.queue_url.clone();

        tokio::task::block_in_place(|| {
            tokio::runtime::Handle::current().block_on(async move {
                client
                    .send_message()
                    .queue_url(queue_url)
                    .message_body(body)
                    .send()
                    .await
                    .map(|_| ())
                    .map_err(|error| format!("failed to enqueue order message: {error}"))
            })
        })
    }
}

async fn handle_request(
    event: LambdaEvent<Value>,
    dispatcher: Option<&SqsOrderDispatcher>,
    queue_url: Option<&str>,
) -> Result<ApiGatewayResponse, Error> {
    let noop_dispatcher = NoopDispatcher;
    let response = handle_generate_event(
        event.payload,
        queue_url,
        dispatcher
            .map(|value| value as &dyn OrderDispatcher)
            .unwrap_or(&noop_dispatcher),
    );
    Ok(response)
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    let aws_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
    let sqs_client = aws_sdk_sqs::Client::new(&aws_config);

    let queue_url = std::env::var("ORDER_QUEUE_URL").ok();
    let dispatcher = queue_url.as_ref().map(|url| SqsOrderDispatcher {
        sqs_client: sqs_client.clone(),
        queue_url: url.clone(),
    });

    lambda_runtime::run(service_fn(|event: LambdaEvent<Value>| {
        handle_request(event, dispatcher.as_ref(), queue_url.as_deref())
    }))
    .await
}
