//! Scripts for individual client sessions.
//!
//! A script is the ordered list of segments one session puts on the wire,
//! in both directions. The simulator interleaves scripts on a shared clock.

use std::collections::VecDeque;
use std::net::SocketAddr;

use mqfeat_core::events::{TransportMeta, TransportProtocol};
use mqfeat_protocols::MessageType;
use rand::Rng;

use crate::packets::{self, ConnectOptions, Will};

pub(crate) type Script = VecDeque<(TransportMeta, Vec<u8>)>;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionKind {
    /// Connect, subscribe, publish at mixed QoS, ping, disconnect.
    Normal,
    /// Repeated CONNECTs refused with bad credentials.
    BruteForce,
    /// Traffic the extractor must skip: other ports and UDP.
    Noise,
}

impl SessionKind {
    pub(crate) fn pick<R: Rng>(rng: &mut R) -> Self {
        match rng.random_range(0..10) {
            0..=6 => SessionKind::Normal,
            7..=8 => SessionKind::BruteForce,
            _ => SessionKind::Noise,
        }
    }
}

const TOPIC_ROOTS: [&str; 4] = ["sensors", "devices", "home", "plant"];
const USERNAMES: [&str; 4] = ["admin", "root", "mqtt", "user"];

fn pick<'a, T, R: Rng>(rng: &mut R, items: &'a [T]) -> &'a T {
    &items[rng.random_range(0..items.len())]
}

fn token<R: Rng>(rng: &mut R, min: usize, max: usize) -> String {
    const ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";
    let len = rng.random_range(min..=max);
    (0..len)
        .map(|_| char::from(*pick(rng, ALPHABET)))
        .collect()
}

fn bytes<R: Rng>(rng: &mut R, max: usize) -> Vec<u8> {
    let mut out = vec![0u8; rng.random_range(0..=max)];
    rng.fill(&mut out[..]);
    out
}

pub(crate) fn script<R: Rng>(
    kind: SessionKind,
    rng: &mut R,
    client: SocketAddr,
    broker: SocketAddr,
) -> Script {
    match kind {
        SessionKind::Normal => normal(rng, client, broker),
        SessionKind::BruteForce => brute_force(rng, client, broker),
        SessionKind::Noise => noise(rng, client, broker),
    }
}

fn normal<R: Rng>(rng: &mut R, client: SocketAddr, broker: SocketAddr) -> Script {
    let up = TransportMeta::tcp(client, broker);
    let down = TransportMeta::tcp(broker, client);
    let mut steps = Script::new();

    let clean_session = rng.random_bool(0.7);
    let options = ConnectOptions {
        protocol_version: *pick(rng, &[4, 4, 4, 3, 5]),
        clean_session,
        keep_alive: *pick(rng, &[10, 30, 60, 120, 300]),
        client_id: token(rng, 4, 23),
        username: rng.random_bool(0.5).then(|| token(rng, 3, 12)),
        password: rng.random_bool(0.5).then(|| bytes(rng, 16)),
        will: rng.random_bool(0.2).then(|| Will {
            topic: format!("status/{}", token(rng, 2, 8)),
            message: b"offline".to_vec(),
            qos: rng.random_range(0..=2),
            retain: rng.random_bool(0.5),
        }),
    };
    steps.push_back((up, packets::connect(&options)));
    let session_present = !clean_session && rng.random_bool(0.5);
    steps.push_back((down, packets::connack(session_present, 0)));

    let mut next_id: u16 = 1;
    if rng.random_bool(0.5) {
        let topic = format!("{}/#", pick(rng, &TOPIC_ROOTS));
        steps.push_back((up, packets::subscribe(next_id, &topic, 1)));
        steps.push_back((down, packets::suback(next_id, 1)));
        next_id += 1;
    }

    for _ in 0..rng.random_range(1..=8) {
        let qos: u8 = rng.random_range(0..=2);
        let topic = format!("{}/{}", pick(rng, &TOPIC_ROOTS), token(rng, 2, 10));
        let payload = bytes(rng, 256);
        let packet_id = if qos > 0 {
            next_id = next_id.wrapping_add(1).max(1);
            next_id
        } else {
            0
        };
        let retain = rng.random_bool(0.1);
        steps.push_back((up, packets::publish(&topic, &payload, qos, packet_id, retain, false)));

        match qos {
            1 => steps.push_back((down, packets::ack(MessageType::Puback, packet_id))),
            2 => {
                steps.push_back((down, packets::ack(MessageType::Pubrec, packet_id)));
                steps.push_back((up, packets::ack(MessageType::Pubrel, packet_id)));
                steps.push_back((down, packets::ack(MessageType::Pubcomp, packet_id)));
            }
            _ => {}
        }

        if rng.random_bool(0.2) {
            steps.push_back((up, packets::empty(MessageType::Pingreq)));
            steps.push_back((down, packets::empty(MessageType::Pingresp)));
        }
    }

    steps.push_back((up, packets::empty(MessageType::Disconnect)));
    steps
}

fn brute_force<R: Rng>(rng: &mut R, client: SocketAddr, broker: SocketAddr) -> Script {
    let up = TransportMeta::tcp(client, broker);
    let down = TransportMeta::tcp(broker, client);
    let mut steps = Script::new();
    let username = pick(rng, &USERNAMES).to_string();

    let attempt = |rng: &mut R| ConnectOptions {
        protocol_version: 4,
        clean_session: true,
        keep_alive: 60,
        client_id: token(rng, 4, 12),
        username: Some(username.clone()),
        password: Some(token(rng, 4, 16).into_bytes()),
        will: None,
    };

    for _ in 0..rng.random_range(3..=20) {
        steps.push_back((up, packets::connect(&attempt(rng))));
        // 4: bad user name or password, 5: not authorized
        steps.push_back((down, packets::connack(false, *pick(rng, &[4, 5]))));
    }

    if rng.random_bool(0.1) {
        steps.push_back((up, packets::connect(&attempt(rng))));
        steps.push_back((down, packets::connack(false, 0)));
        steps.push_back((up, packets::empty(MessageType::Disconnect)));
    }
    steps
}

fn noise<R: Rng>(rng: &mut R, client: SocketAddr, broker: SocketAddr) -> Script {
    let mut steps = Script::new();
    for _ in 0..rng.random_range(1..=4) {
        let meta = if rng.random_bool(0.5) {
            TransportMeta::tcp(client, SocketAddr::new(broker.ip(), 80))
        } else {
            TransportMeta {
                protocol: TransportProtocol::Udp,
                ..TransportMeta::tcp(client, broker)
            }
        };
        let mut payload = bytes(rng, 64);
        payload.insert(0, 0x30);
        steps.push_back((meta, payload));
    }
    steps
}

#[cfg(test)]
mod tests {
    use super::*;
    use mqfeat_protocols::MqttParser;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    fn endpoints() -> (SocketAddr, SocketAddr) {
        (
            "10.0.1.7:50123".parse().unwrap(),
            "10.0.0.1:1883".parse().unwrap(),
        )
    }

    #[test]
    fn normal_session_is_well_formed() {
        let (client, broker) = endpoints();
        let mut rng = SmallRng::seed_from_u64(3);
        for _ in 0..50 {
            let steps = script(SessionKind::Normal, &mut rng, client, broker);
            let parser = MqttParser::new();
            let types: Vec<u8> = steps
                .iter()
                .map(|(_, payload)| {
                    let parsed = parser.parse(payload).unwrap();
                    assert!(parsed.is_complete());
                    parsed.fields.header.msg_type
                })
                .collect();
            assert_eq!(types.first(), Some(&1));
            assert_eq!(types.get(1), Some(&2));
            assert_eq!(types.last(), Some(&14));
        }
    }

    #[test]
    fn brute_force_is_mostly_refusals() {
        let (client, broker) = endpoints();
        let mut rng = SmallRng::seed_from_u64(11);
        let steps = script(SessionKind::BruteForce, &mut rng, client, broker);
        let parser = MqttParser::new();
        let refusals = steps
            .iter()
            .filter(|(_, payload)| parser.parse(payload).unwrap().fields.is_auth_failure())
            .count();
        assert!(refusals >= 3);
        assert!(steps.iter().all(|(meta, _)| meta.protocol == TransportProtocol::Tcp));
    }

    #[test]
    fn noise_is_never_mqtt_over_tcp() {
        let (client, broker) = endpoints();
        let mut rng = SmallRng::seed_from_u64(5);
        for _ in 0..20 {
            for (meta, _) in script(SessionKind::Noise, &mut rng, client, broker) {
                let mqtt_tcp =
                    meta.protocol == TransportProtocol::Tcp && meta.touches_port(&[1883]);
                assert!(!mqtt_tcp);
            }
        }
    }
}
