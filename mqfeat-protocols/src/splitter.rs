//! ## mqfeat-protocols::splitter
//! Finds MQTT PDU boundaries in a TCP byte stream.
//!
//! [`MqttSplitter`] is a resumable scanner: feed it whatever bytes arrived and
//! it reports either a flush point or that it needs more data. It keeps its
//! position across calls, so a PDU may straddle any number of segments.
//! [`PduReassembler`] wraps it with a buffer and hands out complete PDUs.
//!
//! A PDU whose header announces more than `max_pdu` bytes is treated as
//! corrupt: the fixed header is flushed on its own and scanning resumes on the
//! next byte, so a bogus length cannot hold the rest of the stream hostage.

use bytes::{Bytes, BytesMut};

use crate::mqtt::remaining_length::MAX_LENGTH_BYTES;

/// Default upper bound on a whole PDU, fixed header included.
pub const DEFAULT_MAX_PDU: u32 = 16_384;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SplitStatus {
    /// A PDU ends this many bytes into the scanned slice.
    Flush(usize),
    /// Every byte was consumed without completing a PDU.
    Search,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
enum State {
    #[default]
    FixedHeader,
    RemainingLength,
    Body,
    Flush,
}

#[derive(Clone, Debug)]
pub struct MqttSplitter {
    state: State,
    body_len: u32,
    length_bytes: u8,
    body_read: u32,
    max_pdu: u32,
}

impl Default for MqttSplitter {
    fn default() -> Self {
        Self::with_max_pdu(DEFAULT_MAX_PDU)
    }
}

impl MqttSplitter {
    pub fn new() -> Self {
        Self::default()
    }

    /// A splitter that rejects PDUs longer than `max_pdu` bytes.
    pub fn with_max_pdu(max_pdu: u32) -> Self {
        Self {
            state: State::FixedHeader,
            body_len: 0,
            length_bytes: 0,
            body_read: 0,
            max_pdu,
        }
    }

    pub fn max_pdu(&self) -> u32 {
        self.max_pdu
    }

    /// Scans `data`, which must start right after the bytes already scanned.
    pub fn scan(&mut self, data: &[u8]) -> SplitStatus {
        let mut idx = 0;

        while idx < data.len() {
            match self.state {
                State::FixedHeader => {
                    idx += 1;
                    self.state = State::RemainingLength;
                    self.body_len = 0;
                    self.length_bytes = 0;
                }
                State::RemainingLength => {
                    let byte = data[idx];
                    idx += 1;
                    self.body_len |= u32::from(byte & 0x7F) << (7 * u32::from(self.length_bytes));
                    self.length_bytes += 1;

                    if byte & 0x80 == 0 {
                        let pdu_len = 1 + u32::from(self.length_bytes) + self.body_len;
                        if pdu_len > self.max_pdu {
                            self.state = State::FixedHeader;
                            return SplitStatus::Flush(idx);
                        }
                        if self.body_len == 0 {
                            self.state = State::Flush;
                        } else {
                            self.state = State::Body;
                            self.body_read = 0;
                        }
                    } else if usize::from(self.length_bytes) >= MAX_LENGTH_BYTES {
                        // Malformed length: cut here and resynchronise on the next byte.
                        self.state = State::FixedHeader;
                        return SplitStatus::Flush(idx);
                    }
                }
                State::Body => {
                    let available = data.len() - idx;
                    let need = (self.body_len - self.body_read) as usize;
                    if available >= need {
                        idx += need;
                        self.state = State::Flush;
                    } else {
                        self.body_read += available as u32;
                        return SplitStatus::Search;
                    }
                }
                State::Flush => {
                    self.state = State::FixedHeader;
                    return SplitStatus::Flush(idx);
                }
            }
        }

        if self.state == State::Flush {
            self.state = State::FixedHeader;
            return SplitStatus::Flush(idx);
        }
        SplitStatus::Search
    }
}

/// Buffers one direction of a TCP stream and yields whole MQTT PDUs.
#[derive(Debug, Default)]
pub struct PduReassembler {
    splitter: MqttSplitter,
    pending: BytesMut,
    scanned: usize,
}

impl PduReassembler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_pdu(max_pdu: u32) -> Self {
        Self {
            splitter: MqttSplitter::with_max_pdu(max_pdu),
            ..Self::default()
        }
    }

    /// Appends `data` and returns every PDU it completed, in stream order.
    pub fn push(&mut self, data: &[u8]) -> Vec<Bytes> {
        self.pending.extend_from_slice(data);
        let mut pdus = Vec::new();

        while self.scanned < self.pending.len() {
            match self.splitter.scan(&self.pending[self.scanned..]) {
                SplitStatus::Flush(end) => {
                    let pdu = self.pending.split_to(self.scanned + end).freeze();
                    self.scanned = 0;
                    pdus.push(pdu);
                }
                SplitStatus::Search => self.scanned = self.pending.len(),
            }
        }

        pdus
    }

    /// Bytes held back waiting for the rest of a PDU.
    pub fn buffered(&self) -> usize {
        self.pending.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const PINGREQ: &[u8] = &[0xC0, 0x00];
    const CONNACK: &[u8] = &[0x20, 0x02, 0x00, 0x00];
    const PUBLISH: &[u8] = &[0x30, 0x06, 0x00, 0x01, b't', b'a', b'b', b'c'];

    fn stream() -> Vec<u8> {
        [PINGREQ, CONNACK, PUBLISH, PINGREQ].concat()
    }

    #[test]
    fn flushes_each_pdu_in_one_segment() {
        let mut splitter = MqttSplitter::new();
        let data = stream();
        assert_eq!(splitter.scan(&data), SplitStatus::Flush(2));
        assert_eq!(splitter.scan(&data[2..]), SplitStatus::Flush(4));
        assert_eq!(splitter.scan(&data[6..]), SplitStatus::Flush(8));
        assert_eq!(splitter.scan(&data[14..]), SplitStatus::Flush(2));
    }

    #[test]
    fn body_spanning_segments() {
        let mut splitter = MqttSplitter::new();
        assert_eq!(splitter.scan(&PUBLISH[..3]), SplitStatus::Search);
        assert_eq!(splitter.scan(&PUBLISH[3..5]), SplitStatus::Search);
        assert_eq!(splitter.scan(&PUBLISH[5..]), SplitStatus::Flush(3));
    }

    #[test]
    fn overlong_length_field_is_cut() {
        let mut splitter = MqttSplitter::new();
        let data = [0x30, 0xFF, 0xFF, 0xFF, 0xFF, 0xC0, 0x00];
        assert_eq!(splitter.scan(&data), SplitStatus::Flush(5));
        assert_eq!(splitter.scan(&data[5..]), SplitStatus::Flush(2));
    }

    #[test]
    fn reassembler_holds_partial_pdu() {
        let mut reassembler = PduReassembler::new();
        let pdus = reassembler.push(&[0xC0, 0x00, 0x30, 0x06, 0x00]);
        assert_eq!(pdus, vec![Bytes::from_static(PINGREQ)]);
        assert_eq!(reassembler.buffered(), 3);

        let pdus = reassembler.push(&PUBLISH[3..]);
        assert_eq!(pdus, vec![Bytes::from_static(PUBLISH)]);
        assert_eq!(reassembler.buffered(), 0);
    }

    #[test]
    fn oversized_length_is_cut_and_stream_resyncs() {
        let mut reassembler = PduReassembler::new();
        let mut pdus = reassembler.push(&[0x30, 0xFF, 0xFF, 0xFF, 0x7F]);
        for _ in 0..10_000 {
            pdus.extend(reassembler.push(PINGREQ));
        }

        assert_eq!(pdus.len(), 10_001);
        assert_eq!(&pdus[0][..], &[0x30, 0xFF, 0xFF, 0xFF, 0x7F]);
        assert!(pdus[1..].iter().all(|pdu| &pdu[..] == PINGREQ));
        assert_eq!(reassembler.buffered(), 0);
    }

    #[test]
    fn max_pdu_is_configurable() {
        // 8 bytes on the wire
        let mut strict = PduReassembler::with_max_pdu(7);
        let pdus = strict.push(PUBLISH);
        assert_eq!(&pdus[0][..], &PUBLISH[..2]);
        assert!(strict.buffered() <= 7);

        let mut exact = PduReassembler::with_max_pdu(8);
        assert_eq!(exact.push(PUBLISH), vec![Bytes::from_static(PUBLISH)]);
        assert_eq!(MqttSplitter::new().max_pdu(), DEFAULT_MAX_PDU);
    }

    #[test]
    fn buffer_never_exceeds_max_pdu() {
        let mut reassembler = PduReassembler::with_max_pdu(64);
        reassembler.push(&[0x30, 0x3E]);
        for _ in 0..100 {
            reassembler.push(&[0xAB]);
            assert!(reassembler.buffered() <= 64);
        }
    }

    proptest! {
        #[test]
        fn chunking_does_not_change_pdus(cuts in proptest::collection::vec(0usize..16, 0..6)) {
            let data = stream();
            let mut cuts = cuts;
            cuts.sort_unstable();
            cuts.dedup();

            let mut reassembler = PduReassembler::new();
            let mut pdus = Vec::new();
            let mut start = 0;
            for cut in cuts.into_iter().chain(std::iter::once(data.len())) {
                pdus.extend(reassembler.push(&data[start..cut]));
                start = cut;
            }

            let expected: Vec<Bytes> = [PINGREQ, CONNACK, PUBLISH, PINGREQ]
                .iter()
                .map(|pdu| Bytes::copy_from_slice(pdu))
                .collect();
            prop_assert_eq!(pdus, expected);
            prop_assert_eq!(reassembler.buffered(), 0);
        }
    }
}
