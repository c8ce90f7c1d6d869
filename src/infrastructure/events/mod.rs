//! Event Sink Implementations
//!
//! Provides concrete implementations of DeployEventSink:
//! - JsonEventSink: NDJSON output for CI/automation
//! - LogEventSink: forwards to the `log` facade

mod json;
mod log_sink;

pub use log_sink::LogEventSink;
pub use json::{event_json, JsonEventSink};
