//! ## mqfeat-features::extractor
//! Per-record pipeline: filter, decode, update the flow, build the vector.
//!
//! Records are checked in a fixed order and the first failing check decides
//! the [`SkipReason`]. A skipped record never touches flow state.

use mqfeat_core::events::PacketRecord;
use mqfeat_core::flow::{FlowKey, FlowStore};
use mqfeat_protocols::{MessageType, MqttParseError, MqttParser};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, trace, warn};

use crate::builder::{FeatureError, FeatureVector, FeatureVectorBuilder};

/// Standard MQTT and MQTT-over-TLS ports.
pub const DEFAULT_MQTT_PORTS: [u16; 2] = [1883, 8883];

#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum SkipReason {
    #[error("neither endpoint uses an MQTT port")]
    NotMqttPort,
    #[error("payload shorter than an MQTT fixed header")]
    ShortPayload,
    #[error("not a TCP segment")]
    NotTcp,
    #[error("invalid MQTT message type {0}")]
    InvalidMessageType(u8),
}

impl SkipReason {
    /// Stable label for metrics.
    pub fn as_str(&self) -> &'static str {
        match self {
            SkipReason::NotMqttPort => "not_mqtt_port",
            SkipReason::ShortPayload => "short_payload",
            SkipReason::NotTcp => "not_tcp",
            SkipReason::InvalidMessageType(_) => "invalid_message_type",
        }
    }
}

impl From<FeatureError> for SkipReason {
    fn from(err: FeatureError) -> Self {
        match err {
            FeatureError::InvalidMessageType(t) => SkipReason::InvalidMessageType(t),
        }
    }
}

/// One emitted vector with the context it was computed in.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ExtractedVector {
    /// Position of the source record in the input.
    pub sequence: u64,
    pub flow: FlowKey,
    pub timestamp: f64,
    pub message_type: &'static str,
    pub features: FeatureVector,
    /// Where decoding stopped, for packets cut short.
    #[serde(skip)]
    pub truncation: Option<MqttParseError>,
}

pub struct FeatureExtractor<S: FlowStore> {
    store: S,
    parser: MqttParser,
    builder: FeatureVectorBuilder,
    mqtt_ports: Vec<u16>,
    next_sequence: u64,
}

impl<S: FlowStore> FeatureExtractor<S> {
    pub fn new(store: S) -> Self {
        Self::with_ports(store, DEFAULT_MQTT_PORTS.to_vec())
    }

    pub fn with_ports(store: S, mqtt_ports: Vec<u16>) -> Self {
        Self {
            store,
            parser: MqttParser::new(),
            builder: FeatureVectorBuilder::new(),
            mqtt_ports,
            next_sequence: 0,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// Processes the next record of the input, numbering it after the
    /// previous one.
    pub fn process(&mut self, record: &PacketRecord) -> Result<ExtractedVector, SkipReason> {
        let sequence = self.next_sequence;
        self.next_sequence += 1;
        self.process_sequenced(sequence, record)
    }

    /// Processes a record whose input position is already known.
    pub fn process_sequenced(
        &mut self,
        sequence: u64,
        record: &PacketRecord,
    ) -> Result<ExtractedVector, SkipReason> {
        let result = self.extract(sequence, record);
        if let Err(reason) = &result {
            debug!(sequence, %reason, "record skipped");
        }
        result
    }

    fn extract(
        &mut self,
        sequence: u64,
        record: &PacketRecord,
    ) -> Result<ExtractedVector, SkipReason> {
        if !record.transport.touches_port(&self.mqtt_ports) {
            return Err(SkipReason::NotMqttPort);
        }
        if record.payload.len() < 2 {
            return Err(SkipReason::ShortPayload);
        }
        let flow = FlowKey::from_transport(&record.transport).ok_or(SkipReason::NotTcp)?;

        let parsed = self
            .parser
            .parse(&record.payload)
            .map_err(|_| SkipReason::ShortPayload)?;
        let msg_type = parsed.fields.header.msg_type;
        let message_type =
            MessageType::from_u8(msg_type).ok_or(SkipReason::InvalidMessageType(msg_type))?;
        if let Some(truncation) = &parsed.truncation {
            warn!(sequence, %flow, %truncation, "partial MQTT decode");
        }

        let state = self.store.observe(
            flow,
            record.timestamp,
            parsed.fields.is_auth_failure(),
        );
        let features = self.builder.build(&parsed.fields, &state, record.timestamp)?;
        trace!(sequence, %flow, message_type = message_type.as_str(), "vector built");

        Ok(ExtractedVector {
            sequence,
            flow,
            timestamp: record.timestamp,
            message_type: message_type.as_str(),
            features,
            truncation: parsed.truncation,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mqfeat_core::events::{TransportMeta, TransportProtocol};
    use mqfeat_core::flow::FlowTimingTracker;

    fn tcp(src_port: u16, dst_port: u16) -> TransportMeta {
        TransportMeta {
            protocol: TransportProtocol::Tcp,
            src: "10.1.0.5".parse().unwrap(),
            dst: "10.1.0.1".parse().unwrap(),
            src_port,
            dst_port,
        }
    }

    fn extractor() -> FeatureExtractor<FlowTimingTracker> {
        FeatureExtractor::new(FlowTimingTracker::new())
    }

    #[test]
    fn skips_in_filter_order() {
        let mut ex = extractor();
        let cases = [
            (PacketRecord::new(0.0, tcp(40000, 80), vec![0x10, 0x00]), SkipReason::NotMqttPort),
            (PacketRecord::new(0.0, tcp(40000, 1883), vec![0x10]), SkipReason::ShortPayload),
            (
                PacketRecord::new(
                    0.0,
                    TransportMeta {
                        protocol: TransportProtocol::Udp,
                        ..tcp(40000, 1883)
                    },
                    vec![0x10, 0x00],
                ),
                SkipReason::NotTcp,
            ),
            (
                PacketRecord::new(0.0, tcp(40000, 1883), vec![0xF0, 0x00]),
                SkipReason::InvalidMessageType(15),
            ),
            (
                PacketRecord::new(0.0, tcp(40000, 1883), vec![0x00, 0x00]),
                SkipReason::InvalidMessageType(0),
            ),
        ];
        for (record, expected) in cases {
            assert_eq!(ex.process(&record).unwrap_err(), expected);
        }
        assert!(ex.store().is_empty());
    }

    #[test]
    fn broker_side_port_is_accepted() {
        let mut ex = extractor();
        let record = PacketRecord::new(0.0, tcp(8883, 40000), vec![0xD0, 0x00]);
        let vector = ex.process(&record).unwrap();
        assert_eq!(vector.message_type, "PINGRESP");
    }

    #[test]
    fn custom_ports_replace_defaults() {
        let mut ex = FeatureExtractor::with_ports(FlowTimingTracker::new(), vec![11883]);
        let standard = PacketRecord::new(0.0, tcp(40000, 1883), vec![0xC0, 0x00]);
        assert_eq!(ex.process(&standard).unwrap_err(), SkipReason::NotMqttPort);
        let custom = PacketRecord::new(0.0, tcp(40000, 11883), vec![0xC0, 0x00]);
        assert!(ex.process(&custom).is_ok());
    }

    #[test]
    fn sequence_counts_skipped_records() {
        let mut ex = extractor();
        let skipped = PacketRecord::new(0.0, tcp(40000, 80), vec![0xC0, 0x00]);
        let kept = PacketRecord::new(0.1, tcp(40000, 1883), vec![0xC0, 0x00]);
        assert!(ex.process(&skipped).is_err());
        assert_eq!(ex.process(&kept).unwrap().sequence, 1);
    }

    #[test]
    fn truncated_publish_still_yields_vector() {
        let mut ex = extractor();
        let record = PacketRecord::new(0.0, tcp(40000, 1883), vec![0x32, 0x05, 0x00, 0x01, b't']);
        let vector = ex.process(&record).unwrap();
        assert!(vector.truncation.is_some());
        assert!(vector.features.is_bounded());
    }

    #[test]
    fn flow_history_accumulates() {
        let mut ex = extractor();
        let refused = vec![0x20, 0x02, 0x00, 0x05];
        for ts in [0.0, 0.4, 0.8] {
            ex.process(&PacketRecord::new(ts, tcp(1883, 40000), refused.clone()))
                .unwrap();
        }
        let key = FlowKey::from_transport(&tcp(1883, 40000)).unwrap();
        let state = ex.store().get(&key).unwrap();
        assert_eq!(state.packet_count, 3);
        assert_eq!(state.failed_auth_count, 3);
        assert_eq!(state.auth_window.count, 3);
    }
}
