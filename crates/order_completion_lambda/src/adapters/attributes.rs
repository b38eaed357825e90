use std::collections::HashMap;

use aws_sdk_dynamodb::types::AttributeValue;
use serde_json::Value;

use crate::runtime::contract::OrderRecord;

/// Builds the DynamoDB item for a full-record replace. The table's partition
/// key attribute is `id`, taken from the record's identity.
pub fn order_to_item(order: &OrderRecord) -> HashMap<String, AttributeValue> {
    let mut item = HashMap::with_capacity(order.fields.len() + 1);
    item.insert("id".to_string(), json_to_attribute_value(&order.id));
    for (name, value) in &order.fields {
        item.insert(name.clone(), json_to_attribute_value(value));
    }
    item
}

pub fn json_to_attribute_value(value: &Value) -> AttributeValue {
    match value {
        Value::Null => AttributeValue::Null(true),
        Value::Bool(flag) => AttributeValue::Bool(*flag),
        Value::Number(number) => AttributeValue::N(number.to_string()),
        Value::String(text) => AttributeValue::S(text.clone()),
        Value::Array(entries) => {
            AttributeValue::L(entries.iter().map(json_to_attribute_value).collect())
        }
        Value::Object(entries) => AttributeValue::M(
            entries
                .iter()
                .map(|(name, entry)| (name.clone(), json_to_attribute_value(entry)))
                .collect(),
        ),
    }
}
