//! # mqfeat-engine
//!
//! Extraction runtimes shared by the frontends: sequential and sharded
//! extraction over scenarios, vector digests, simulation and fuzzing runs,
//! and bug reports when a run fails validation.

pub mod engine;

pub use engine::{
    vector_digest, EngineError, ExtractionMode, ExtractionRuntime, FuzzOptions, FuzzReport,
    RunSummary, SimulationOptions,
};
