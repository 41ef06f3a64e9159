//! ## mqfeat-protocols::mqtt::fixed_header
//! The 1‑byte control field plus the remaining‑length field that open every
//! MQTT control packet.

use super::remaining_length::decode_remaining_length;
use super::MqttParseError;

/// Decoded MQTT fixed header.
///
/// `msg_type` is the raw high nibble and is not range checked here.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FixedHeader {
    pub msg_type: u8,
    pub dup: bool,
    pub qos: u8,
    pub retain: bool,
    pub remaining_len: u32,
    /// Offset of the first byte after the remaining‑length field.
    pub body_offset: usize,
}

impl FixedHeader {
    /// Parses the fixed header from the start of `data`.
    pub fn parse(data: &[u8]) -> Result<Self, MqttParseError> {
        if data.len() < 2 {
            return Err(MqttParseError::InsufficientData);
        }
        let control = data[0];
        let (remaining_len, body_offset) = decode_remaining_length(data, 1);

        Ok(Self {
            msg_type: control >> 4,
            dup: (control >> 3) & 0x01 == 1,
            qos: (control >> 1) & 0x03,
            retain: control & 0x01 == 1,
            remaining_len,
            body_offset,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_single_byte() {
        assert_eq!(
            FixedHeader::parse(&[0x30]),
            Err(MqttParseError::InsufficientData)
        );
        assert_eq!(FixedHeader::parse(&[]), Err(MqttParseError::InsufficientData));
    }

    #[test]
    fn splits_control_byte() {
        // PUBLISH, DUP, QoS 2, RETAIN
        let header = FixedHeader::parse(&[0x3D, 0x05]).unwrap();
        assert_eq!(header.msg_type, 3);
        assert!(header.dup);
        assert_eq!(header.qos, 2);
        assert!(header.retain);
        assert_eq!(header.remaining_len, 5);
        assert_eq!(header.body_offset, 2);
    }

    #[test]
    fn multi_byte_remaining_length() {
        let header = FixedHeader::parse(&[0x30, 0xC1, 0x02, 0x00]).unwrap();
        assert_eq!(header.remaining_len, 321);
        assert_eq!(header.body_offset, 3);
    }

    #[test]
    fn does_not_validate_type() {
        let header = FixedHeader::parse(&[0xF0, 0x00]).unwrap();
        assert_eq!(header.msg_type, 15);
        let header = FixedHeader::parse(&[0x00, 0x00]).unwrap();
        assert_eq!(header.msg_type, 0);
    }
}
