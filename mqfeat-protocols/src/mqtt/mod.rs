//! ## mqfeat-protocols::mqtt
//! Best‑effort MQTT control packet decoder for untrusted payloads.
//!
//! The decoder never panics and never reads out of bounds. Only a payload too
//! short to hold a fixed header is rejected outright; everything else yields a
//! [`ParsedPacket`] carrying whatever fields could be read, plus a note on
//! where decoding stopped if the packet was cut short.

mod fields;
mod fixed_header;
pub mod remaining_length;

pub use fixed_header::FixedHeader;
pub use remaining_length::{decode_remaining_length, encode_remaining_length};

use thiserror::Error;

/// Errors that can occur while parsing an MQTT packet.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum MqttParseError {
    #[error("Insufficient data to parse MQTT fixed header")]
    InsufficientData,
    #[error("{packet} packet truncated before {field}")]
    Truncated {
        packet: &'static str,
        field: &'static str,
    },
}

impl MqttParseError {
    pub(crate) const fn truncated(packet: &'static str, field: &'static str) -> Self {
        Self::Truncated { packet, field }
    }
}

/// MQTT 3.1.1 control packet types.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum MessageType {
    Connect = 1,
    Connack = 2,
    Publish = 3,
    Puback = 4,
    Pubrec = 5,
    Pubrel = 6,
    Pubcomp = 7,
    Subscribe = 8,
    Suback = 9,
    Unsubscribe = 10,
    Unsuback = 11,
    Pingreq = 12,
    Pingresp = 13,
    Disconnect = 14,
}

impl MessageType {
    /// Maps a fixed‑header type nibble to a message type; 0 and 15 are reserved.
    pub fn from_u8(value: u8) -> Option<Self> {
        use MessageType::*;
        Some(match value {
            1 => Connect,
            2 => Connack,
            3 => Publish,
            4 => Puback,
            5 => Pubrec,
            6 => Pubrel,
            7 => Pubcomp,
            8 => Subscribe,
            9 => Suback,
            10 => Unsubscribe,
            11 => Unsuback,
            12 => Pingreq,
            13 => Pingresp,
            14 => Disconnect,
            _ => return None,
        })
    }

    pub fn as_str(self) -> &'static str {
        use MessageType::*;
        match self {
            Connect => "CONNECT",
            Connack => "CONNACK",
            Publish => "PUBLISH",
            Puback => "PUBACK",
            Pubrec => "PUBREC",
            Pubrel => "PUBREL",
            Pubcomp => "PUBCOMP",
            Subscribe => "SUBSCRIBE",
            Suback => "SUBACK",
            Unsubscribe => "UNSUBSCRIBE",
            Unsuback => "UNSUBACK",
            Pingreq => "PINGREQ",
            Pingresp => "PINGRESP",
            Disconnect => "DISCONNECT",
        }
    }
}

/// The six sub‑flags of the CONNECT flags byte (bit 0 is reserved).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ConnectFlags {
    pub clean_session: bool,
    pub will: bool,
    pub will_qos: u8,
    pub will_retain: bool,
    pub password: bool,
    pub username: bool,
}

impl ConnectFlags {
    pub fn from_byte(flags: u8) -> Self {
        Self {
            clean_session: (flags >> 1) & 0x01 == 1,
            will: (flags >> 2) & 0x01 == 1,
            will_qos: (flags >> 3) & 0x03,
            will_retain: (flags >> 5) & 0x01 == 1,
            password: (flags >> 6) & 0x01 == 1,
            username: (flags >> 7) & 0x01 == 1,
        }
    }
}

/// CONNECT variable header and payload lengths. String contents are not kept.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ConnectFields {
    pub protocol_version: u8,
    pub flags: ConnectFlags,
    pub keep_alive: u16,
    pub client_id_len: u16,
    pub username_len: u16,
    pub password_len: u16,
    pub will_topic_len: u16,
    pub will_msg_len: u16,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ConnackFields {
    pub session_present: bool,
    /// 0 = accepted, 1‑5 = refused. Values above 5 are kept as seen.
    pub return_code: u8,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PublishFields {
    pub topic_len: u16,
    pub payload_len: u32,
    /// Only present on the wire when QoS > 0; zero otherwise.
    pub packet_id: u16,
}

/// Every field the feature layer reads from one MQTT packet.
///
/// This is a superset across message types rather than a per‑type variant:
/// fields that do not apply to the decoded type stay at zero.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DecodedPacketFields {
    pub header: FixedHeader,
    pub connect: ConnectFields,
    pub connack: ConnackFields,
    pub publish: PublishFields,
}

impl DecodedPacketFields {
    pub fn message_type(&self) -> Option<MessageType> {
        MessageType::from_u8(self.header.msg_type)
    }

    /// A CONNACK refusing the connection, i.e. a failed authentication attempt.
    pub fn is_auth_failure(&self) -> bool {
        self.message_type() == Some(MessageType::Connack) && self.connack.return_code != 0
    }
}

/// Result of decoding one packet.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ParsedPacket {
    /// Fields populated before decoding finished or stopped.
    pub fields: DecodedPacketFields,
    /// Set when a type‑specific decoder ran out of bytes.
    pub truncation: Option<MqttParseError>,
}

impl ParsedPacket {
    pub fn is_complete(&self) -> bool {
        self.truncation.is_none()
    }
}

/// A stateless MQTT parser working on borrowed payload bytes.
#[derive(Default, Debug, Copy, Clone)]
pub struct MqttParser;

impl MqttParser {
    pub fn new() -> Self {
        Self
    }

    /// Decodes the fixed header and, for CONNECT, CONNACK and PUBLISH, the
    /// type‑specific fields.
    pub fn parse(&self, data: &[u8]) -> Result<ParsedPacket, MqttParseError> {
        let header = FixedHeader::parse(data)?;
        let mut fields = DecodedPacketFields {
            header,
            ..Default::default()
        };

        let outcome = match MessageType::from_u8(header.msg_type) {
            Some(MessageType::Connect) => fields::parse_connect(data, &mut fields),
            Some(MessageType::Connack) => fields::parse_connack(data, &mut fields),
            Some(MessageType::Publish) => fields::parse_publish(data, &mut fields),
            _ => Ok(()),
        };

        Ok(ParsedPacket {
            fields,
            truncation: outcome.err(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    // Example CONNECT from https://www.hivemq.com/mqtt-essentials/mqtt-message-format/
    const CONNECT: &str = "101700044d5154540402003c000b74657374636c69656e7431";

    #[test]
    fn parses_connect_packet() {
        let data = hex::decode(CONNECT).unwrap();
        let parsed = MqttParser::new().parse(&data).unwrap();
        assert!(parsed.is_complete());
        let fields = parsed.fields;
        assert_eq!(fields.message_type(), Some(MessageType::Connect));
        assert_eq!(fields.header.remaining_len, 23);
        assert_eq!(fields.connect.protocol_version, 4);
        assert!(fields.connect.flags.clean_session);
        assert_eq!(fields.connect.keep_alive, 60);
        assert_eq!(fields.connect.client_id_len, 11);
        assert_eq!(fields.publish, PublishFields::default());
    }

    #[test]
    fn parses_refused_connack() {
        let parsed = MqttParser::new().parse(&[0x20, 0x02, 0x00, 0x01]).unwrap();
        assert!(parsed.is_complete());
        assert_eq!(parsed.fields.connack.return_code, 1);
        assert!(!parsed.fields.connack.session_present);
        assert!(parsed.fields.is_auth_failure());
    }

    #[test]
    fn accepted_connack_is_not_auth_failure() {
        let parsed = MqttParser::new().parse(&[0x20, 0x02, 0x01, 0x00]).unwrap();
        assert!(!parsed.fields.is_auth_failure());
    }

    #[test]
    fn header_only_types_carry_no_body_fields() {
        let parsed = MqttParser::new().parse(&[0xC0, 0x00]).unwrap();
        assert_eq!(parsed.fields.message_type(), Some(MessageType::Pingreq));
        assert!(parsed.is_complete());
        assert_eq!(parsed.fields.connect, ConnectFields::default());
    }

    #[test]
    fn reserved_type_is_decoded_but_unnamed() {
        let parsed = MqttParser::new().parse(&[0xF0, 0x00]).unwrap();
        assert_eq!(parsed.fields.header.msg_type, 15);
        assert_eq!(parsed.fields.message_type(), None);
    }

    #[test]
    fn truncated_publish_reports_field() {
        let parsed = MqttParser::new().parse(&[0x30, 0x05, 0x00]).unwrap();
        assert_eq!(
            parsed.truncation,
            Some(MqttParseError::Truncated {
                packet: "PUBLISH",
                field: "topic name"
            })
        );
    }

    #[test]
    fn insufficient_data() {
        assert_eq!(
            MqttParser::new().parse(&[0x10]),
            Err(MqttParseError::InsufficientData)
        );
    }

    #[test]
    fn connect_flag_bits() {
        let flags = ConnectFlags::from_byte(0b1101_0110);
        assert!(flags.username);
        assert!(flags.password);
        assert!(!flags.will_retain);
        assert_eq!(flags.will_qos, 2);
        assert!(flags.will);
        assert!(flags.clean_session);
    }

    #[test]
    fn message_type_round_trip_names() {
        for value in 1..=14u8 {
            let ty = MessageType::from_u8(value).unwrap();
            assert_eq!(ty as u8, value);
            assert!(!ty.as_str().is_empty());
        }
        assert!(MessageType::from_u8(0).is_none());
        assert!(MessageType::from_u8(15).is_none());
    }

    proptest! {
        #[test]
        fn arbitrary_bytes_never_panic(data in proptest::collection::vec(any::<u8>(), 0..64)) {
            let result = MqttParser::new().parse(&data);
            if data.len() < 2 {
                prop_assert_eq!(result, Err(MqttParseError::InsufficientData));
            } else {
                let parsed = result.unwrap();
                prop_assert!(parsed.fields.header.qos <= 3);
                let header = &parsed.fields.header;
                prop_assert!(header.remaining_len <= remaining_length::MAX_REMAINING_LENGTH);
                prop_assert!(parsed.fields.publish.payload_len as usize <= data.len());
            }
        }
    }
}
