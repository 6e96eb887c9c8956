//! Logging infrastructure
//!
//! Structured logging with tracing, to the console and optionally a file.

pub mod logging;

pub use logging::{init_logging, LogConfig};
