//! # mqfeat Telemetry
//!
//! Structured logging and prometheus metrics for extraction runs.

pub mod logging;
pub mod metrics;

pub use logging::EventLogger;
pub use metrics::MetricsRecorder;
