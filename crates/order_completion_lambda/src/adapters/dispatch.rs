pub trait OrderDispatcher {
    fn dispatch_order(&self, payload: &[u8]) -> Result<(), String>;
}

impl<F> OrderDispatcher for F
where
    F: Fn(&[u8]) -> Result<(), String>,
{
    fn dispatch_order(&self, payload: &[u8]) -> Result<(), String> {
        self(payload)
    }
}
