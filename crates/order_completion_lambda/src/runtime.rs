//! Module boundary for the core order primitives used by handlers and
//! binaries.

pub use order_completion_core::completion;
pub use order_completion_core::contract;
pub use order_completion_core::generate;
