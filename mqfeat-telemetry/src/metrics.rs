//! ## mqfeat-telemetry::metrics
//! Prometheus counters for extraction runs.
//!
//! Message categories follow the inference plugin's statistics: CONNECT,
//! PUBLISH and everything else.

use prometheus::{
    Encoder, Histogram, HistogramOpts, IntCounter, IntCounterVec, IntGauge, Opts, Registry,
    TextEncoder,
};

#[derive(Debug, Clone)]
pub struct MetricsRecorder {
    pub registry: Registry,
    pub records: IntCounter,
    pub vectors: IntCounter,
    pub skipped: IntCounterVec,
    pub messages: IntCounterVec,
    pub truncated: IntCounter,
    pub active_flows: IntGauge,
    pub extraction_latency: Histogram,
}

impl MetricsRecorder {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();
        let records = IntCounter::new("mqfeat_records_total", "Input records processed")?;
        let vectors = IntCounter::new("mqfeat_vectors_total", "Feature vectors emitted")?;
        let skipped = IntCounterVec::new(
            Opts::new("mqfeat_skipped_total", "Input records skipped"),
            &["reason"],
        )?;
        let messages = IntCounterVec::new(
            Opts::new("mqfeat_messages_total", "MQTT messages by category"),
            &["category"],
        )?;
        let truncated = IntCounter::new(
            "mqfeat_truncated_total",
            "Packets whose type-specific fields were cut short",
        )?;
        let active_flows = IntGauge::new("mqfeat_active_flows", "Flows with timing state")?;
        let extraction_latency = Histogram::with_opts(
            HistogramOpts::new(
                "mqfeat_extraction_latency_ns",
                "Per-record extraction time",
            )
            .buckets(vec![250.0, 1_000.0, 10_000.0, 100_000.0, 1_000_000.0]),
        )?;

        registry.register(Box::new(records.clone()))?;
        registry.register(Box::new(vectors.clone()))?;
        registry.register(Box::new(skipped.clone()))?;
        registry.register(Box::new(messages.clone()))?;
        registry.register(Box::new(truncated.clone()))?;
        registry.register(Box::new(active_flows.clone()))?;
        registry.register(Box::new(extraction_latency.clone()))?;

        Ok(Self {
            registry,
            records,
            vectors,
            skipped,
            messages,
            truncated,
            active_flows,
            extraction_latency,
        })
    }

    pub fn gather_metrics(&self) -> Result<String, prometheus::Error> {
        let encoder = TextEncoder::new();
        let mut buffer = Vec::<u8>::new();
        encoder.encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }

    pub fn inc_records(&self) {
        self.records.inc();
    }

    /// Accounts one emitted vector of the named MQTT message type.
    pub fn record_vector(&self, message_type: &str, truncated: bool) {
        self.vectors.inc();
        self.messages
            .with_label_values(&[message_category(message_type)])
            .inc();
        if truncated {
            self.truncated.inc();
        }
    }

    pub fn record_skip(&self, reason: &str) {
        self.skipped.with_label_values(&[reason]).inc();
    }

    pub fn set_active_flows(&self, flows: usize) {
        self.active_flows.set(flows as i64);
    }

    pub fn observe_latency_ns(&self, nanos: f64) {
        self.extraction_latency.observe(nanos);
    }
}

fn message_category(message_type: &str) -> &'static str {
    match message_type {
        "CONNECT" => "connect",
        "PUBLISH" => "publish",
        _ => "other",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_by_category_and_reason() {
        let metrics = MetricsRecorder::new().unwrap();
        metrics.inc_records();
        metrics.inc_records();
        metrics.record_vector("CONNECT", false);
        metrics.record_vector("PINGREQ", true);
        metrics.record_skip("not_mqtt_port");
        metrics.set_active_flows(3);

        assert_eq!(metrics.records.get(), 2);
        assert_eq!(metrics.vectors.get(), 2);
        assert_eq!(metrics.truncated.get(), 1);
        assert_eq!(metrics.messages.with_label_values(&["connect"]).get(), 1);
        assert_eq!(metrics.messages.with_label_values(&["other"]).get(), 1);
        assert_eq!(metrics.skipped.with_label_values(&["not_mqtt_port"]).get(), 1);
        assert_eq!(metrics.active_flows.get(), 3);
    }

    #[test]
    fn text_exposition_lists_metrics() {
        let metrics = MetricsRecorder::new().unwrap();
        metrics.record_vector("PUBLISH", false);
        metrics.observe_latency_ns(800.0);

        let text = metrics.gather_metrics().unwrap();
        assert!(text.contains("mqfeat_vectors_total 1"));
        assert!(text.contains("mqfeat_messages_total{category=\"publish\"} 1"));
        assert!(text.contains("mqfeat_extraction_latency_ns_count 1"));
    }
}
