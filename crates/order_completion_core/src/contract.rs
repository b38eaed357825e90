use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const ORDER_STATUS_COMPLETED: &str = "completed";
pub const ORDER_STATUS_IN_PROCESSING: &str = "in-processing";
pub const DEFAULT_GENERATED_ORDER_COUNT: usize = 10;
pub const MAX_GENERATED_ORDER_COUNT: usize = 1_000;

/// An order document as it travels through the queue and into the table.
///
/// Only `id` is interpreted by the pipeline; every other field rides along in
/// `fields` and is persisted unchanged. `status` and `completion_date` live in
/// `fields` too so their input values, whatever their type, are replaced
/// wholesale during completion.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderRecord {
    pub id: Value,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl OrderRecord {
    /// Order identity as a log-friendly string.
    pub fn display_id(&self) -> String {
        match &self.id {
            Value::String(text) => text.clone(),
            other => other.to_string(),
        }
    }

    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    pub fn status(&self) -> Option<&str> {
        self.fields.get("status").and_then(Value::as_str)
    }

    pub fn completion_date(&self) -> Option<&str> {
        self.fields.get("completion_date").and_then(Value::as_str)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GenerateOrdersRequest {
    #[serde(default)]
    pub count: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NormalizedGenerateRequest {
    pub count: usize,
}

/// Invocation result for a completed batch: fixed success code plus a
/// JSON-encoded human-readable count message.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CompletionSummary {
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    pub body: String,
}

impl CompletionSummary {
    /// The count reflects the batch size as received, not a success count.
    pub fn processed(count: usize) -> Self {
        let message = format!("Processed {count} orders");
        Self {
            status_code: 200,
            body: serde_json::to_string(&message)
                .expect("serialization of summary message should not fail"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
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

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for ValidationError {}

pub fn normalize_generate_request(
    request: GenerateOrdersRequest,
) -> Result<NormalizedGenerateRequest, ValidationError> {
    let count = request.count.unwrap_or(DEFAULT_GENERATED_ORDER_COUNT);

    if count == 0 {
        return Err(ValidationError::new("count must be a positive integer"));
    }

    if count > MAX_GENERATED_ORDER_COUNT {
        return Err(ValidationError::new(format!(
            "count exceeds MAX_GENERATED_ORDER_COUNT={MAX_GENERATED_ORDER_COUNT}"
        )));
    }

    Ok(NormalizedGenerateRequest { count })
}
