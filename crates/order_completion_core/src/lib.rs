//! Shared order-pipeline domain primitives.
//!
//! This crate owns the order record contract, completion stamping, and
//! synthetic order generation. It intentionally excludes AWS SDK and Lambda
//! runtime concerns.

pub mod completion;
pub mod contract;
pub mod generate;
