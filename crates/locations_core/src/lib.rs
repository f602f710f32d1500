//! Shared domain primitives for the locations service.
//!
//! This crate owns the record shape, the lifecycle event/outcome contract,
//! the fixed seed set, and retry timing. It intentionally excludes AWS SDK
//! and Lambda runtime concerns.

pub mod contract;
pub mod record;
pub mod retry;
pub mod seed;
