//! ## mqfeat-telemetry::logging
//! Structured logging with tracing and OpenTelemetry attributes.
//!
//! `RUST_LOG` overrides the configured level when set.

use opentelemetry::KeyValue;
use tracing::{info_span, Instrument};
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Clone)]
pub struct EventLogger;

impl EventLogger {
    /// Installs the global subscriber, writing to stderr so stdout stays free
    /// for vector output. Later calls are no-ops.
    pub fn init(default_level: &str) {
        let _ = fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
            )
            .with_writer(std::io::stderr)
            .with_thread_names(true)
            .with_span_events(FmtSpan::CLOSE)
            .try_init();
    }

    /// Emits one run-level event (start, summary, digest mismatch) with its
    /// attributes.
    #[inline]
    pub async fn log_event(event_type: &str, metadata: Vec<KeyValue>) {
        let span = info_span!(
            "extraction_event",
            event_type = event_type,
            otel.kind = "INTERNAL"
        );

        async {
            tracing::info!(
                metadata = ?metadata,
                "Extraction event recorded"
            );
        }
        .instrument(span)
        .await
    }
}
