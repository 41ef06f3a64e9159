//! ## mqfeat-features::builder
//! Assembles raw per-packet values and normalizes them through the contract.

use mqfeat_core::flow::FlowTimingState;
use mqfeat_protocols::{DecodedPacketFields, MessageType};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::contract::{FEATURE_CONTRACT, FEATURE_COUNT};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum FeatureError {
    #[error("Invalid MQTT message type {0} (expected 1-14)")]
    InvalidMessageType(u8),
}

/// One normalized feature vector; every value lies in `[0, 1]`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeatureVector([f32; FEATURE_COUNT]);

impl FeatureVector {
    #[inline]
    pub fn values(&self) -> &[f32; FEATURE_COUNT] {
        &self.0
    }

    #[inline]
    pub fn get(&self, index: usize) -> Option<f32> {
        self.0.get(index).copied()
    }

    /// True when every value is a number in `[0, 1]`.
    pub fn is_bounded(&self) -> bool {
        self.0.iter().all(|v| (0.0..=1.0).contains(v))
    }

    /// Little-endian bytes of every value, in contract order.
    pub fn to_le_bytes(&self) -> [u8; FEATURE_COUNT * 4] {
        let mut out = [0u8; FEATURE_COUNT * 4];
        for (chunk, value) in out.chunks_exact_mut(4).zip(self.0.iter()) {
            chunk.copy_from_slice(&value.to_le_bytes());
        }
        out
    }
}

impl AsRef<[f32]> for FeatureVector {
    fn as_ref(&self) -> &[f32] {
        &self.0
    }
}

#[inline]
fn bit(value: bool) -> f32 {
    if value {
        1.0
    } else {
        0.0
    }
}

/// Stateless vector builder. Reads flow state, never mutates it.
#[derive(Default, Debug, Copy, Clone)]
pub struct FeatureVectorBuilder;

impl FeatureVectorBuilder {
    pub fn new() -> Self {
        Self
    }

    /// Raw, un-normalized values in contract order.
    pub fn raw(
        &self,
        fields: &DecodedPacketFields,
        flow: &FlowTimingState,
        now: f64,
    ) -> Result<[f32; FEATURE_COUNT], FeatureError> {
        let msg_type = fields.header.msg_type;
        if MessageType::from_u8(msg_type).is_none() {
            return Err(FeatureError::InvalidMessageType(msg_type));
        }

        let header = &fields.header;
        let connect = &fields.connect;
        let connack = &fields.connack;
        let publish = &fields.publish;
        let delta_us = flow.elapsed_us(now) as f32;

        Ok([
            f32::from(msg_type),
            bit(header.dup),
            f32::from(header.qos),
            bit(header.retain),
            header.remaining_len as f32,
            f32::from(connect.protocol_version),
            bit(connect.flags.clean_session),
            bit(connect.flags.will),
            f32::from(connect.flags.will_qos),
            bit(connect.flags.will_retain),
            bit(connect.flags.password),
            bit(connect.flags.username),
            f32::from(connect.keep_alive),
            f32::from(connect.client_id_len),
            f32::from(connect.username_len),
            f32::from(connect.password_len),
            f32::from(connect.will_topic_len),
            f32::from(connect.will_msg_len),
            f32::from(connack.return_code),
            bit(connack.session_present),
            f32::from(publish.topic_len),
            publish.payload_len as f32,
            f32::from(publish.packet_id),
            delta_us,
            delta_us,
            flow.auth_window.rate(now) as f32,
            flow.failed_auth_count as f32,
            flow.packet_count as f32,
        ])
    }

    /// Builds the normalized vector for one packet.
    ///
    /// `flow` must already account for this packet.
    pub fn build(
        &self,
        fields: &DecodedPacketFields,
        flow: &FlowTimingState,
        now: f64,
    ) -> Result<FeatureVector, FeatureError> {
        let raw = self.raw(fields, flow, now)?;
        let mut values = [0.0f32; FEATURE_COUNT];
        for ((out, raw), feature) in values.iter_mut().zip(raw).zip(FEATURE_CONTRACT.iter()) {
            *out = feature.normalization.apply(raw);
        }
        Ok(FeatureVector(values))
    }
}
