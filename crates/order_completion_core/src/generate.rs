use chrono::{DateTime, SecondsFormat, Utc};
use rand::Rng;
use serde_json::{Map, Value};

use crate::contract::{OrderRecord, ORDER_STATUS_IN_PROCESSING};

pub const PRODUCT_NAMES: [&str; 8] = [
    "Laptop", "Mouse", "Keyboard", "Monitor", "Headset", "Webcam", "Desk", "Chair",
];

const ORDER_ID_SUFFIX_CHARSET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const ORDER_ID_SUFFIX_LEN: usize = 9;

/// Fabricates one synthetic order, ready to be enqueued for completion.
///
/// Identity is `ORD-{millis}-{random base-36 suffix}`, so orders minted in the
/// same millisecond still get distinct ids.
pub fn generate_order(rng: &mut impl Rng, now: DateTime<Utc>) -> OrderRecord {
    let suffix: String = (0..ORDER_ID_SUFFIX_LEN)
        .map(|_| ORDER_ID_SUFFIX_CHARSET[rng.gen_range(0..ORDER_ID_SUFFIX_CHARSET.len())] as char)
        .collect();
    let product = PRODUCT_NAMES[rng.gen_range(0..PRODUCT_NAMES.len())];
    let price = rng.gen::<f64>() * 1000.0 + 10.0;

    let mut fields = Map::new();
    fields.insert("product_name".to_string(), Value::from(product));
    fields.insert("qty".to_string(), Value::from(rng.gen_range(1..=10)));
    fields.insert("price".to_string(), Value::from(format!("{price:.2}")));
    fields.insert(
        "customer_id".to_string(),
        Value::from(format!("CUST-{}", rng.gen_range(0..10_000))),
    );
    fields.insert(
        "status".to_string(),
        Value::from(ORDER_STATUS_IN_PROCESSING),
    );
    fields.insert(
        "time".to_string(),
        Value::from(now.to_rfc3339_opts(SecondsFormat::Millis, true)),
    );

    OrderRecord {
        id: Value::from(format!("ORD-{}-{suffix}", now.timestamp_millis())),
        fields,
    }
}
