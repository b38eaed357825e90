use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::adapters::dispatch::OrderDispatcher;
use crate::runtime::contract::{normalize_generate_request, GenerateOrdersRequest};
use crate::runtime::generate::generate_order;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ApiGatewayResponse {
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    pub headers: Value,
    pub body: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GenerateAcceptedResponse {
    pub message: String,
    pub count: usize,
}

/// Fabricates a batch of synthetic orders and enqueues each one for
/// completion. The first dispatch failure aborts the run.
pub fn handle_generate_event(
    event: Value,
    queue_url: Option<&str>,
    dispatcher: &dyn OrderDispatcher,
) -> ApiGatewayResponse {
    let payload = match normalize_apigw_event(event) {
        Ok(value) => value,
        Err(message) => return validation_error_response(&message),
    };

    let request = match serde_json::from_value::<GenerateOrdersRequest>(payload) {
        Ok(value) => value,
        Err(error) => return validation_error_response(&format!("Malformed request: {error}")),
    };

    let normalized = match normalize_generate_request(request) {
        Ok(value) => value,
        Err(error) => return validation_error_response(error.message()),
    };

    let queue_url = match queue_url {
        Some(value) if !value.trim().is_empty() => value,
        _ => {
            return error_response(
                500,
                json!({
                    "error": "misconfiguration",
                    "message": "ORDER_QUEUE_URL must be configured",
                }),
            );
        }
    };

    let mut rng = rand::thread_rng();
    for _ in 0..normalized.count {
        let order = generate_order(&mut rng, Utc::now());
        let bytes = match serde_json::to_vec(&order) {
            Ok(value) => value,
            Err(error) => {
                return error_response(
                    500,
                    json!({
                        "error": "serialization_error",
                        "message": error.to_string(),
                    }),
                );
            }
        };

        if let Err(error) = dispatcher.dispatch_order(&bytes) {
            return error_response(
                502,
                json!({
                    "error": "dispatch_failed",
                    "message": error,
                    "queue_url": queue_url,
                }),
            );
        }

        log_generate_info(
            "order_dispatched",
            json!({"order_id": order.display_id()}),
        );
    }

    let response = GenerateAcceptedResponse {
        message: format!("{} orders sent to SQS", normalized.count),
        count: normalized.count,
    };
    success_response(200, response)
}

fn normalize_apigw_event(event: Value) -> Result<Value, String> {
    let Some(object) = event.as_object() else {
        return Err("Request payload must be a JSON object".to_string());
    };

    let Some(body) = object.get("body") else {
        return Ok(event);
    };

    match body {
        Value::Null => Ok(json!({})),
        Value::Object(_) => Ok(body.clone()),
        Value::String(text) => {
            serde_json::from_str(text).map_err(|error| format!("Malformed JSON body: {error}"))
        }
        _ => Err("Request body must be a JSON object".to_string()),
    }
}

fn log_generate_info(event: &str, details: Value) {
    eprintln!(
        "{}",
        json!({
            "component": "generate_handler",
            "event": event,
            "timestamp": chrono::Utc::now().to_rfc3339(),
            "details": details,
        })
    );
}

fn validation_error_response(message: &str) -> ApiGatewayResponse {
    error_response(
        400,
        json!({
            "error": "validation_error",
            "message": message,
        }),
    )
}

fn success_response(status_code: u16, payload: impl Serialize) -> ApiGatewayResponse {
    ApiGatewayResponse {
        status_code,
        headers: json!({"Content-Type": "application/json"}),
        body: serde_json::to_string(&payload).expect("response payload should serialize"),
    }
}

fn error_response(status_code: u16, payload: Value) -> ApiGatewayResponse {
    ApiGatewayResponse {
        status_code,
        headers: json!({"Content-Type": "application/json"}),
        body: payload.to_string(),
    }
}
