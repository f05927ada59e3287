//! # Arecibo Common Library
//!
//! Shared utilities used by both the agent and the collector.
//!
//! This crate provides:
//! - Custom error type
//! - Structured logging setup

pub mod error;
pub mod logging;

pub use error::{Error, Result};
pub use logging::{init_tracing, init_tracing_json};
