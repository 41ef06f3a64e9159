use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoreError {
    #[error("Invalid shard count {0} (must be a non-zero power of two)")]
    InvalidShardCount(usize),
}
