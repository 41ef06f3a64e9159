//! Chaos module.
//!
//! Damages generated payloads the way a lossy capture or a hostile client
//! would, so the decoder is exercised on malformed input.

use rand::Rng;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Fault {
    /// Payload cut at a random length, possibly below a fixed header.
    Truncate,
    /// One random byte overwritten.
    Corrupt,
    /// Type nibble set to reserved 0 or 15.
    ReservedType,
    /// Remaining length replaced by an unterminated 4-byte run.
    OverlongLength,
}

impl Fault {
    const ALL: [Fault; 4] = [
        Fault::Truncate,
        Fault::Corrupt,
        Fault::ReservedType,
        Fault::OverlongLength,
    ];
}

/// Applies one random fault to `payload` and reports which.
pub fn inject_fault<R: Rng>(payload: &mut Vec<u8>, rng: &mut R) -> Fault {
    let fault = Fault::ALL[rng.random_range(0..Fault::ALL.len())];
    match fault {
        Fault::Truncate => {
            let keep = rng.random_range(0..payload.len().max(1));
            payload.truncate(keep);
        }
        Fault::Corrupt => {
            if !payload.is_empty() {
                let at = rng.random_range(0..payload.len());
                payload[at] = rng.random();
            }
        }
        Fault::ReservedType => {
            if let Some(control) = payload.first_mut() {
                let nibble = if rng.random_bool(0.5) { 0x00 } else { 0xF0 };
                *control = nibble | (*control & 0x0F);
            }
        }
        Fault::OverlongLength => {
            let control = payload.first().copied().unwrap_or(0x30);
            let mut damaged = vec![control, 0xFF, 0xFF, 0xFF, 0xFF];
            damaged.extend(payload.iter().skip(2));
            *payload = damaged;
        }
    }
    fault
}
