//! AWS-oriented adapters and handlers for the locations service.
//!
//! This crate owns runtime integration details (Lambda handlers, the store
//! adapters, configuration and logging) and exposes a single runtime module
//! boundary for the record, contract, seed and retry primitives.

pub mod adapters;
pub mod config;
pub mod handlers;
pub mod observability;
pub mod runtime;
pub mod seeder;
