use std::thread;
use std::time::{Duration, Instant};

use chrono::Utc;
use serde_json::json;

use crate::adapters::order_store::OrderStore;
use crate::runtime::completion::complete_order;
use crate::runtime::contract::{CompletionSummary, OrderRecord};

pub const DEFAULT_PER_ORDER_DELAY_SECONDS: u64 = 7;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionHandlerConfig {
    pub table_name: String,
    /// Constant throttle applied after every write. Not a backoff: it models
    /// the fixed per-order processing cost. Zero disables it.
    pub per_order_delay: Duration,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionHandlerError {
    pub message: String,
    pub failed_order_id: Option<String>,
}

/// Parses the per-order throttle from its environment override; absent means
/// the default.
pub fn per_order_delay_from(raw: Option<&str>) -> Result<Duration, String> {
    match raw {
        None => Ok(Duration::from_secs(DEFAULT_PER_ORDER_DELAY_SECONDS)),
        Some(text) => text.trim().parse::<u64>().map(Duration::from_secs).map_err(
            |error| format!("invalid ORDER_PROCESS_DELAY_SECONDS value {text:?}: {error}"),
        ),
    }
}

/// Processes one delivered batch: each body is decoded, stamped as completed,
/// and written as a full replace, strictly in delivery order. The first fault
/// of any kind aborts the batch; messages already written stay written.
pub fn handle_completion_batch(
    bodies: &[String],
    config: &CompletionHandlerConfig,
    store: &impl OrderStore,
) -> Result<CompletionSummary, CompletionHandlerError> {
    let started_at = Instant::now();
    log_completion_info(
        "batch_started",
        json!({
            "batch_size": bodies.len(),
            "table_name": config.table_name.clone(),
        }),
    );

    match process_batch(bodies, config, store) {
        Ok(summary) => {
            log_completion_info(
                "batch_completed",
                json!({
                    "batch_size": bodies.len(),
                    "duration_ms": started_at.elapsed().as_millis(),
                }),
            );
            Ok(summary)
        }
        Err(failure) => {
            log_completion_error(
                "batch_failed",
                json!({
                    "duration_ms": started_at.elapsed().as_millis(),
                    "error": failure.message.clone(),
                    "order_id": failure.failed_order_id.clone(),
                }),
            );
            Err(failure)
        }
    }
}

fn process_batch(
    bodies: &[String],
    config: &CompletionHandlerConfig,
    store: &impl OrderStore,
) -> Result<CompletionSummary, CompletionHandlerError> {
    for (index, body) in bodies.iter().enumerate() {
        let order: OrderRecord =
            serde_json::from_str(body).map_err(|error| CompletionHandlerError {
                message: format!("Malformed order message at index {index}: {error}"),
                failed_order_id: None,
            })?;

        // The stamp is taken per message, not at batch start.
        let order = complete_order(order, Utc::now().naive_utc());

        store
            .put_order(&order)
            .map_err(|error| CompletionHandlerError {
                message: format!("Failed to persist completed order: {error}"),
                failed_order_id: Some(order.display_id()),
            })?;

        if !config.per_order_delay.is_zero() {
            thread::sleep(config.per_order_delay);
        }

        log_completion_info(
            "order_completed",
            json!({
                "order_id": order.display_id(),
                "index": index,
            }),
        );
    }

    Ok(CompletionSummary::processed(bodies.len()))
}

fn log_completion_info(event: &str, details: serde_json::Value) {
    eprintln!(
        "{}",
        json!({
            "component": "completion_handler",
            "event": event,
            "timestamp": chrono::Utc::now().to_rfc3339(),
            "details": details,
        })
    );
}

fn log_completion_error(event: &str, details: serde_json::Value) {
    eprintln!(
        "{}",
        json!({
            "component": "completion_handler",
            "level": "error",
            "event": event,
            "timestamp": chrono::Utc::now().to_rfc3339(),
            "details": details,
        })
    );
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use chrono::NaiveDateTime;
    use serde_json::Value;

    use crate::runtime::completion::{completion_timestamp, COMPLETION_TIMESTAMP_FORMAT};
    use crate::runtime::contract::ORDER_STATUS_COMPLETED;

    use super::*;

    struct RecordingStore {
        orders: Mutex<Vec<OrderRecord>>,
    }

    impl RecordingStore {
        fn new() -> Self {
            Self {
                orders: Mutex::new(Vec::new()),
            }
        }

        fn orders(&self) -> Vec<OrderRecord> {
            self.orders.lock().expect("poisoned mutex").clone()
        }
    }

    impl OrderStore for RecordingStore {
        fn put_order(&self, order: &OrderRecord) -> Result<(), String> {
            self.orders
                .lock()
                .expect("poisoned mutex")
                .push(order.clone());
            Ok(())
        }
    }

    struct SelectiveFailStore {
        orders: Mutex<Vec<OrderRecord>>,
        denied_id: &'static str,
    }

    impl SelectiveFailStore {
        fn new(denied_id: &'static str) -> Self {
            Self {
                orders: Mutex::new(Vec::new()),
                denied_id,
            }
        }

        fn orders(&self) -> Vec<OrderRecord> {
            self.orders.lock().expect("poisoned mutex").clone()
        }
    }

    impl OrderStore for SelectiveFailStore {
        fn put_order(&self, order: &OrderRecord) -> Result<(), String> {
            if order.display_id() == self.denied_id {
                return Err(format!("simulated write failure for order: {}", self.denied_id));
            }

            self.orders
                .lock()
                .expect("poisoned mutex")
                .push(order.clone());
            Ok(())
        }
    }

    fn sample_config() -> CompletionHandlerConfig {
        CompletionHandlerConfig {
            table_name: "orders_table".to_string(),
            per_order_delay: Duration::ZERO,
        }
    }

    fn body(raw: serde_json::Value) -> String {
        raw.to_string()
    }

    fn summary_message(summary: &CompletionSummary) -> String {
        serde_json::from_str(&summary.body).expect("summary body should be a JSON string")
    }

    #[test]
    fn single_order_is_completed_and_written() {
        let store = RecordingStore::new();
        let invocation_start = Utc::now().naive_utc();

        let summary = handle_completion_batch(
            &[body(serde_json::json!({"id": "A1", "amount": 10}))],
            &sample_config(),
            &store,
        )
        .expect("batch should succeed");

        assert_eq!(summary.status_code, 200);
        assert_eq!(summary_message(&summary), "Processed 1 orders");

        let orders = store.orders();
        assert_eq!(orders.len(), 1);
        let written = &orders[0];
        assert_eq!(written.display_id(), "A1");
        assert_eq!(written.status(), Some(ORDER_STATUS_COMPLETED));
        assert_eq!(written.field("amount"), Some(&Value::from(10)));

        let stamp = written
            .completion_date()
            .expect("completion_date should be set");
        NaiveDateTime::parse_from_str(stamp, COMPLETION_TIMESTAMP_FORMAT)
            .expect("completion_date should be a valid timestamp");
        assert!(stamp >= completion_timestamp(invocation_start).as_str());
    }

    #[test]
    fn two_orders_are_written_in_delivery_order() {
        let store = RecordingStore::new();

        let summary = handle_completion_batch(
            &[
                body(serde_json::json!({"id": "A1"})),
                body(serde_json::json!({"id": "A2"})),
            ],
            &sample_config(),
            &store,
        )
        .expect("batch should succeed");

        assert_eq!(summary_message(&summary), "Processed 2 orders");

        let ids: Vec<String> = store
            .orders()
            .iter()
            .map(OrderRecord::display_id)
            .collect();
        assert_eq!(ids, vec!["A1".to_string(), "A2".to_string()]);
    }

    #[test]
    fn every_input_field_passes_through_to_the_stored_record() {
        let store = RecordingStore::new();

        handle_completion_batch(
            &[body(serde_json::json!({
                "id": "A1",
                "qty": 3,
                "price": "129.99",
                "customer_id": "CUST-17",
                "shipping": {"carrier": "dhl", "insured": true}
            }))],
            &sample_config(),
            &store,
        )
        .expect("batch should succeed");

        let written = &store.orders()[0];
        assert_eq!(written.field("qty"), Some(&Value::from(3)));
        assert_eq!(written.field("price"), Some(&Value::from("129.99")));
        assert_eq!(written.field("customer_id"), Some(&Value::from("CUST-17")));
        assert_eq!(
            written.field("shipping"),
            Some(&serde_json::json!({"carrier": "dhl", "insured": true}))
        );
    }

    #[test]
    fn malformed_body_aborts_the_batch_after_earlier_writes() {
        let store = RecordingStore::new();

        let error = handle_completion_batch(
            &[
                body(serde_json::json!({"id": "A1"})),
                "not a json document".to_string(),
                body(serde_json::json!({"id": "A3"})),
            ],
            &sample_config(),
            &store,
        )
        .expect_err("batch should fail");

        assert!(error.message.contains("Malformed order message at index 1"));
        assert_eq!(error.failed_order_id, None);

        let ids: Vec<String> = store
            .orders()
            .iter()
            .map(OrderRecord::display_id)
            .collect();
        assert_eq!(ids, vec!["A1".to_string()]);
    }

    #[test]
    fn missing_identity_aborts_without_writing() {
        let store = RecordingStore::new();

        let error = handle_completion_batch(
            &[body(serde_json::json!({"amount": 10}))],
            &sample_config(),
            &store,
        )
        .expect_err("batch should fail");

        assert!(error.message.contains("Malformed order message at index 0"));
        assert!(store.orders().is_empty());
    }

    #[test]
    fn store_failure_aborts_and_names_the_order() {
        let store = SelectiveFailStore::new("A2");

        let error = handle_completion_batch(
            &[
                body(serde_json::json!({"id": "A1"})),
                body(serde_json::json!({"id": "A2"})),
                body(serde_json::json!({"id": "A3"})),
            ],
            &sample_config(),
            &store,
        )
        .expect_err("batch should fail");

        assert!(error.message.contains("Failed to persist completed order"));
        assert_eq!(error.failed_order_id, Some("A2".to_string()));

        let ids: Vec<String> = store
            .orders()
            .iter()
            .map(OrderRecord::display_id)
            .collect();
        assert_eq!(ids, vec!["A1".to_string()]);
    }

    #[test]
    fn per_order_delay_defaults_when_unset() {
        let delay = per_order_delay_from(None).expect("default should parse");
        assert_eq!(delay, Duration::from_secs(DEFAULT_PER_ORDER_DELAY_SECONDS));
    }

    #[test]
    fn per_order_delay_accepts_zero_to_disable_the_throttle() {
        let delay = per_order_delay_from(Some("0")).expect("zero should parse");
        assert!(delay.is_zero());
    }

    #[test]
    fn per_order_delay_rejects_garbage() {
        let error = per_order_delay_from(Some("soon")).expect_err("garbage should fail");
        assert!(error.contains("ORDER_PROCESS_DELAY_SECONDS"));
    }
}
