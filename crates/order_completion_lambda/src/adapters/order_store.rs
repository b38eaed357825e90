use crate::runtime::contract::OrderRecord;

pub trait OrderStore {
    /// Full-record replace keyed by the record's identity.
    fn put_order(&self, order: &OrderRecord) -> Result<(), String>;
}
