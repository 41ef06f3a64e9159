//! # mqfeat-features
//!
//! Turns decoded MQTT packets and their flow history into the fixed 28-value
//! feature vector shared by model training and live inference.
//!
//! ### Components:
//! - `normalize`: scalar normalizers, single precision
//! - `contract`: the frozen index/name/normalization table
//! - `builder`: raw feature assembly and normalization
//! - `extractor`: per-record filtering, decoding and flow update

pub mod builder;
pub mod contract;
pub mod extractor;
pub mod normalize;

pub use builder::{FeatureError, FeatureVector, FeatureVectorBuilder};
pub use contract::{FeatureSpec, Normalization, FEATURE_CONTRACT, FEATURE_COUNT};
pub use extractor::{ExtractedVector, FeatureExtractor, SkipReason, DEFAULT_MQTT_PORTS};
