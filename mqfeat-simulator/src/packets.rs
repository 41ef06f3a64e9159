//! MQTT 3.1 / 3.1.1 packet encoders for synthetic traffic.

use mqfeat_protocols::{encode_remaining_length, MessageType};

/// Last-will settings carried in a CONNECT.
#[derive(Clone, Debug)]
pub struct Will {
    pub topic: String,
    pub message: Vec<u8>,
    pub qos: u8,
    pub retain: bool,
}

#[derive(Clone, Debug)]
pub struct ConnectOptions {
    /// 3 encodes the `MQIsdp` protocol name, anything else `MQTT`.
    pub protocol_version: u8,
    pub clean_session: bool,
    pub keep_alive: u16,
    pub client_id: String,
    pub username: Option<String>,
    pub password: Option<Vec<u8>>,
    pub will: Option<Will>,
}

fn packet(control: u8, body: &[u8]) -> Vec<u8> {
    let length = encode_remaining_length(body.len() as u32);
    let mut out = Vec::with_capacity(1 + length.len() + body.len());
    out.push(control);
    out.extend_from_slice(&length);
    out.extend_from_slice(body);
    out
}

fn put_prefixed(buf: &mut Vec<u8>, data: &[u8]) {
    let len = data.len().min(usize::from(u16::MAX));
    buf.extend_from_slice(&(len as u16).to_be_bytes());
    buf.extend_from_slice(&data[..len]);
}

pub fn connect(options: &ConnectOptions) -> Vec<u8> {
    let mut body = Vec::new();
    let name: &[u8] = if options.protocol_version == 3 {
        b"MQIsdp"
    } else {
        b"MQTT"
    };
    put_prefixed(&mut body, name);
    body.push(options.protocol_version);

    let mut flags = 0u8;
    if options.clean_session {
        flags |= 0x02;
    }
    if let Some(will) = &options.will {
        flags |= 0x04 | ((will.qos & 0x03) << 3);
        if will.retain {
            flags |= 0x20;
        }
    }
    if options.password.is_some() {
        flags |= 0x40;
    }
    if options.username.is_some() {
        flags |= 0x80;
    }
    body.push(flags);
    body.extend_from_slice(&options.keep_alive.to_be_bytes());

    put_prefixed(&mut body, options.client_id.as_bytes());
    if let Some(will) = &options.will {
        put_prefixed(&mut body, will.topic.as_bytes());
        put_prefixed(&mut body, &will.message);
    }
    if let Some(username) = &options.username {
        put_prefixed(&mut body, username.as_bytes());
    }
    if let Some(password) = &options.password {
        put_prefixed(&mut body, password);
    }

    packet((MessageType::Connect as u8) << 4, &body)
}

pub fn connack(session_present: bool, return_code: u8) -> Vec<u8> {
    packet(
        (MessageType::Connack as u8) << 4,
        &[u8::from(session_present), return_code],
    )
}

/// A PUBLISH. `packet_id` is only written for QoS 1 and 2.
pub fn publish(
    topic: &str,
    payload: &[u8],
    qos: u8,
    packet_id: u16,
    retain: bool,
    dup: bool,
) -> Vec<u8> {
    let mut control = (MessageType::Publish as u8) << 4 | (qos & 0x03) << 1;
    if dup {
        control |= 0x08;
    }
    if retain {
        control |= 0x01;
    }

    let mut body = Vec::with_capacity(topic.len() + payload.len() + 4);
    put_prefixed(&mut body, topic.as_bytes());
    if qos > 0 {
        body.extend_from_slice(&packet_id.to_be_bytes());
    }
    body.extend_from_slice(payload);
    packet(control, &body)
}

/// PUBACK, PUBREC, PUBREL, PUBCOMP or UNSUBACK for `packet_id`.
pub fn ack(kind: MessageType, packet_id: u16) -> Vec<u8> {
    let reserved = if kind == MessageType::Pubrel { 0x02 } else { 0x00 };
    packet((kind as u8) << 4 | reserved, &packet_id.to_be_bytes())
}

pub fn subscribe(packet_id: u16, topic: &str, qos: u8) -> Vec<u8> {
    let mut body = packet_id.to_be_bytes().to_vec();
    put_prefixed(&mut body, topic.as_bytes());
    body.push(qos & 0x03);
    packet((MessageType::Subscribe as u8) << 4 | 0x02, &body)
}

pub fn suback(packet_id: u16, granted_qos: u8) -> Vec<u8> {
    let [hi, lo] = packet_id.to_be_bytes();
    packet((MessageType::Suback as u8) << 4, &[hi, lo, granted_qos])
}

/// PINGREQ, PINGRESP or DISCONNECT, which carry no body.
pub fn empty(kind: MessageType) -> Vec<u8> {
    packet((kind as u8) << 4, &[])
}
