//! Common infrastructure for the bcryypt crates
//!
//! This crate provides shared functionality used across the workspace:
//! - Logging bootstrap and redacting log helpers
//! - Default result and error handlers for the builder API

pub mod handlers;
pub mod logging;

pub use handlers::{on_error, on_result};
pub use logging::LoggingTransformer;
