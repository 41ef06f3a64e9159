//! Vector output and run digests.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use mqfeat_features::ExtractedVector;

use super::error::EngineError;

/// BLAKE3 over the little-endian bytes of every vector, in order, as hex.
///
/// Two runs agree on the digest exactly when they emitted the same values in
/// the same order.
pub fn vector_digest(vectors: &[ExtractedVector]) -> String {
    let mut hasher = blake3::Hasher::new();
    for vector in vectors {
        hasher.update(&vector.features.to_le_bytes());
    }
    hex::encode(hasher.finalize().as_bytes())
}

/// Writes `vectors` as a YAML sequence to `path`, or to stdout when `None`.
pub fn write_vectors(vectors: &[ExtractedVector], path: Option<&Path>) -> Result<(), EngineError> {
    match path {
        Some(path) => {
            let mut writer = BufWriter::new(File::create(path)?);
            serde_yaml::to_writer(&mut writer, vectors)?;
            writer.flush()?;
        }
        None => {
            let mut writer = BufWriter::new(io::stdout().lock());
            serde_yaml::to_writer(&mut writer, vectors)?;
            writer.flush()?;
        }
    }
    Ok(())
}
