//! Observability helpers for the Webex client.
//!
//! Provides span helpers and secret redaction for log output.

pub mod logging;
pub mod tracing_utils;

pub use logging::*;
pub use tracing_utils::*;
