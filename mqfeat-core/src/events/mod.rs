//! ## mqfeat-core::events
//! Input records for the extraction pipeline.
//!
//! Capture and TCP reassembly happen upstream; what arrives here is one
//! timestamped TCP payload plus the endpoints it travelled between.

use std::net::{IpAddr, SocketAddr};

use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// Transport protocol of a captured segment.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportProtocol {
    Tcp,
    Udp,
    /// Any other IP protocol number.
    Other(u8),
}

/// Endpoints of a captured segment.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TransportMeta {
    pub protocol: TransportProtocol,
    pub src: IpAddr,
    pub dst: IpAddr,
    pub src_port: u16,
    pub dst_port: u16,
}

impl TransportMeta {
    pub fn tcp(src: SocketAddr, dst: SocketAddr) -> Self {
        Self {
            protocol: TransportProtocol::Tcp,
            src: src.ip(),
            dst: dst.ip(),
            src_port: src.port(),
            dst_port: dst.port(),
        }
    }

    /// True when either endpoint uses one of `ports`.
    #[inline]
    pub fn touches_port(&self, ports: &[u16]) -> bool {
        ports.contains(&self.src_port) || ports.contains(&self.dst_port)
    }
}

/// One captured application payload.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PacketRecord {
    /// Capture time in seconds.
    pub timestamp: f64,
    pub transport: TransportMeta,
    /// Raw TCP payload, hex encoded when serialized.
    #[serde(with = "payload_hex")]
    pub payload: Bytes,
}

impl PacketRecord {
    #[inline]
    pub fn new(timestamp: f64, transport: TransportMeta, payload: impl Into<Bytes>) -> Self {
        Self {
            timestamp,
            transport,
            payload: payload.into(),
        }
    }
}

mod payload_hex {
    use bytes::Bytes;
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(payload: &Bytes, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex::encode(payload))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Bytes, D::Error> {
        let text = String::deserialize(deserializer)?;
        hex::decode(text.trim()).map(Bytes::from).map_err(D::Error::custom)
    }
}
