//! ## mqfeat-features::contract
//! The frozen layout of the feature vector.
//!
//! Position, name and normalization of every feature live here as data. Any
//! change to this table changes the model input and must be made on both the
//! training and the inference side.

use std::fmt;

use serde::Serialize;

use crate::normalize;

pub const FEATURE_COUNT: usize = 28;

const MAX_U16: f32 = 65_535.0;
const MAX_REMAINING: f32 = 268_435_455.0;
/// One minute in microseconds.
const MAX_DELTA_US: f32 = 6e7;
const MAX_AUTH_FAILURES: f32 = 100.0;
const MAX_PACKETS: f32 = 10_000.0;

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Normalization {
    MinMax { lo: f32, hi: f32 },
    Log { max: f32 },
    Flag,
}

impl Normalization {
    #[inline]
    pub fn apply(self, raw: f32) -> f32 {
        match self {
            Normalization::MinMax { lo, hi } => normalize::minmax(raw, lo, hi),
            Normalization::Log { max } => normalize::log_ratio(raw, max),
            Normalization::Flag => normalize::flag(raw),
        }
    }
}

impl fmt::Display for Normalization {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Normalization::MinMax { lo, hi } => write!(f, "minmax[{lo}, {hi}]"),
            Normalization::Log { max } => write!(f, "log[{max}]"),
            Normalization::Flag => f.write_str("bool"),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct FeatureSpec {
    pub index: usize,
    pub name: &'static str,
    pub normalization: Normalization,
}

const fn minmax(index: usize, name: &'static str, lo: f32, hi: f32) -> FeatureSpec {
    FeatureSpec {
        index,
        name,
        normalization: Normalization::MinMax { lo, hi },
    }
}

const fn log(index: usize, name: &'static str, max: f32) -> FeatureSpec {
    FeatureSpec {
        index,
        name,
        normalization: Normalization::Log { max },
    }
}

const fn flag(index: usize, name: &'static str) -> FeatureSpec {
    FeatureSpec {
        index,
        name,
        normalization: Normalization::Flag,
    }
}

pub const FEATURE_CONTRACT: [FeatureSpec; FEATURE_COUNT] = [
    minmax(0, "msg_type", 1.0, 14.0),
    flag(1, "dup_flag"),
    minmax(2, "qos", 0.0, 2.0),
    flag(3, "retain"),
    log(4, "remaining_len", MAX_REMAINING),
    minmax(5, "protocol_version", 3.0, 5.0),
    flag(6, "clean_session"),
    flag(7, "will_flag"),
    minmax(8, "will_qos", 0.0, 2.0),
    flag(9, "will_retain"),
    flag(10, "passwd_flag"),
    flag(11, "uname_flag"),
    log(12, "keep_alive", MAX_U16),
    log(13, "client_id_len", MAX_U16),
    log(14, "username_len", MAX_U16),
    log(15, "passwd_len", MAX_U16),
    log(16, "will_topic_len", MAX_U16),
    log(17, "will_msg_len", MAX_U16),
    minmax(18, "conack_return_code", 0.0, 5.0),
    flag(19, "conack_session_present"),
    log(20, "topic_len", MAX_U16),
    log(21, "payload_len", MAX_REMAINING),
    log(22, "msg_id", MAX_U16),
    log(23, "time_delta_us", MAX_DELTA_US),
    log(24, "time_relative_us", MAX_DELTA_US),
    log(25, "failed_auth_per_sec", MAX_AUTH_FAILURES),
    log(26, "failed_auth_count", MAX_AUTH_FAILURES),
    log(27, "pkt_count", MAX_PACKETS),
];

/// Looks a feature up by name.
pub fn feature_index(name: &str) -> Option<usize> {
    FEATURE_CONTRACT
        .iter()
        .find(|feature| feature.name == name)
        .map(|feature| feature.index)
}
