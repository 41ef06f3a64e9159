//! # mqfeat Protocol Parsers
//!
//! Crate for decoding MQTT control packets out of raw, untrusted TCP payloads
//! and for splitting a TCP byte stream into MQTT PDUs.

pub mod mqtt;
pub mod splitter;

pub use mqtt::{
    decode_remaining_length, encode_remaining_length, ConnackFields, ConnectFields, ConnectFlags,
    DecodedPacketFields, FixedHeader, MessageType, MqttParseError, MqttParser, ParsedPacket,
    PublishFields,
};
pub use splitter::{MqttSplitter, PduReassembler, SplitStatus, DEFAULT_MAX_PDU};
