//! AWS-oriented adapters and handlers for the order completion pipeline.
//!
//! This crate owns runtime integration details (Lambda handlers, queue
//! dispatch, and storage adapters) and exposes a single runtime module
//! boundary for the order contract, completion, and generation primitives.

pub mod adapters;
pub mod handlers;
pub mod runtime;
