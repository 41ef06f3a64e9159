//! ## mqfeat-protocols::mqtt::fields
//! Per‑type decoders for the CONNECT, CONNACK and PUBLISH variable headers.
//!
//! Each decoder extends a [`DecodedPacketFields`] in place. Reads are bounds
//! checked; when one would overrun, the decoder stops and reports which field
//! it could not read, leaving everything decoded before that point intact.

use super::{ConnectFlags, DecodedPacketFields, MqttParseError};

/// Smallest buffer worth attempting a CONNECT decode on.
const MIN_CONNECT_LEN: usize = 12;
/// Smallest buffer worth attempting a CONNACK decode on.
const MIN_CONNACK_LEN: usize = 4;

fn read_u16(data: &[u8], offset: usize) -> Option<u16> {
    let bytes = data.get(offset..offset.checked_add(2)?)?;
    Some(u16::from_be_bytes([bytes[0], bytes[1]]))
}

/// Offset just past a length‑prefixed string whose header sits at `offset`.
fn skip_string(offset: usize, len: u16) -> usize {
    offset.saturating_add(2).saturating_add(usize::from(len))
}

pub(crate) fn parse_connect(
    data: &[u8],
    fields: &mut DecodedPacketFields,
) -> Result<(), MqttParseError> {
    if data.len() < MIN_CONNECT_LEN {
        return Err(MqttParseError::truncated("CONNECT", "variable header"));
    }
    let mut offset = fields.header.body_offset;

    let proto_len = read_u16(data, offset)
        .ok_or_else(|| MqttParseError::truncated("CONNECT", "protocol name"))?;
    offset = skip_string(offset, proto_len);

    let Some(fixed) = offset
        .checked_add(4)
        .and_then(|end| data.get(offset..end))
    else {
        return Err(MqttParseError::truncated("CONNECT", "connect flags"));
    };
    let connect = &mut fields.connect;
    connect.protocol_version = fixed[0];
    connect.flags = ConnectFlags::from_byte(fixed[1]);
    connect.keep_alive = u16::from_be_bytes([fixed[2], fixed[3]]);
    offset += 4;

    // Everything past keep-alive is optional: a short CONNECT still counts as parsed.
    let Some(client_id_len) = read_u16(data, offset) else {
        return Ok(());
    };
    connect.client_id_len = client_id_len;
    offset = skip_string(offset, client_id_len);

    if connect.flags.will {
        if let Some(len) = read_u16(data, offset) {
            connect.will_topic_len = len;
            offset = skip_string(offset, len);
        }
        if let Some(len) = read_u16(data, offset) {
            connect.will_msg_len = len;
            offset = skip_string(offset, len);
        }
    }

    if connect.flags.username {
        if let Some(len) = read_u16(data, offset) {
            connect.username_len = len;
            offset = skip_string(offset, len);
        }
    }

    if connect.flags.password {
        if let Some(len) = read_u16(data, offset) {
            connect.password_len = len;
        }
    }

    Ok(())
}

pub(crate) fn parse_connack(
    data: &[u8],
    fields: &mut DecodedPacketFields,
) -> Result<(), MqttParseError> {
    if data.len() < MIN_CONNACK_LEN {
        return Err(MqttParseError::truncated("CONNACK", "variable header"));
    }
    let offset = fields.header.body_offset;
    let Some(body) = data.get(offset..offset + 2) else {
        return Err(MqttParseError::truncated("CONNACK", "return code"));
    };

    fields.connack.session_present = body[0] & 0x01 == 1;
    fields.connack.return_code = body[1];
    Ok(())
}

pub(crate) fn parse_publish(
    data: &[u8],
    fields: &mut DecodedPacketFields,
) -> Result<(), MqttParseError> {
    let mut offset = fields.header.body_offset;

    let topic_len = read_u16(data, offset)
        .ok_or_else(|| MqttParseError::truncated("PUBLISH", "topic name"))?;
    fields.publish.topic_len = topic_len;
    offset = skip_string(offset, topic_len);

    if fields.header.qos > 0 {
        let packet_id = read_u16(data, offset)
            .ok_or_else(|| MqttParseError::truncated("PUBLISH", "packet identifier"))?;
        fields.publish.packet_id = packet_id;
        offset += 2;
    }

    let payload = data.len().saturating_sub(offset);
    fields.publish.payload_len = u32::try_from(payload).unwrap_or(u32::MAX);
    Ok(())
}
