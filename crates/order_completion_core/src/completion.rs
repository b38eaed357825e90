use chrono::NaiveDateTime;
use serde_json::Value;

use crate::contract::{OrderRecord, ORDER_STATUS_COMPLETED};

/// ISO-8601 wall-clock format used for `completion_date`: naive UTC with
/// microsecond precision and no offset suffix.
pub const COMPLETION_TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6f";

pub fn completion_timestamp(completed_at: NaiveDateTime) -> String {
    completed_at.format(COMPLETION_TIMESTAMP_FORMAT).to_string()
}

/// Marks an order as completed: overwrites `status` and `completion_date`
/// unconditionally, leaves every other field untouched.
pub fn complete_order(mut order: OrderRecord, completed_at: NaiveDateTime) -> OrderRecord {
    order.fields.insert(
        "status".to_string(),
        Value::from(ORDER_STATUS_COMPLETED),
    );
    order.fields.insert(
        "completion_date".to_string(),
        Value::from(completion_timestamp(completed_at)),
    );
    order
}
