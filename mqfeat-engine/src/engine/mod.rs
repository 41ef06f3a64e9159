mod diagnostics;
mod error;
mod output;
mod pipeline;
mod runtime;

pub use self::{
    diagnostics::{generate_bug_report, BugReport, DiagnosticsCollector},
    error::EngineError,
    output::{vector_digest, write_vectors},
    pipeline::{
        extract_sequential, extract_sharded, split_records, ExtractionMode, ExtractionSettings,
    },
    runtime::{ExtractionRuntime, FuzzOptions, FuzzReport, RunSummary, SimulationOptions},
};

pub mod prelude {
    pub use super::{EngineError, ExtractionMode, ExtractionRuntime, RunSummary};
}
