//! ## mqfeat-protocols::mqtt::remaining_length
//! MQTT's variable‑length "remaining length" integer.
//!
//! Each byte carries 7 value bits, least significant group first; bit 7 is a
//! continuation flag. The field is at most 4 bytes long, which caps the value
//! at 2^28 − 1.

/// Largest value representable in a 4‑byte remaining‑length field.
pub const MAX_REMAINING_LENGTH: u32 = 268_435_455;

/// Maximum number of bytes a remaining‑length field may occupy.
pub const MAX_LENGTH_BYTES: usize = 4;

/// Decodes a remaining‑length field starting at `offset`.
///
/// Returns `(value, next_offset)`. Decoding stops after 4 bytes even when the
/// continuation bit is still set, and at the end of `data`. Neither case is an
/// error: the value accumulated so far and the offset reached are returned.
pub fn decode_remaining_length(data: &[u8], offset: usize) -> (u32, usize) {
    let end = data.len().min(offset.saturating_add(MAX_LENGTH_BYTES));
    let mut value: u32 = 0;
    let mut shift = 0u32;
    let mut pos = offset;

    while pos < end {
        let byte = data[pos];
        value |= u32::from(byte & 0x7F) << shift;
        shift += 7;
        pos += 1;
        if byte & 0x80 == 0 {
            break;
        }
    }

    (value, pos)
}

/// Encodes `value` as a remaining‑length field.
///
/// Values above [`MAX_REMAINING_LENGTH`] are truncated to their low 28 bits.
pub fn encode_remaining_length(value: u32) -> Vec<u8> {
    let mut remaining = value & MAX_REMAINING_LENGTH;
    let mut out = Vec::with_capacity(MAX_LENGTH_BYTES);
    loop {
        let mut byte = (remaining & 0x7F) as u8;
        remaining >>= 7;
        if remaining > 0 {
            byte |= 0x80;
        }
        out.push(byte);
        if remaining == 0 {
            return out;
        }
    }
}
