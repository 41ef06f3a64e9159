//! # mqfeat-core
//!
//! Shared data model for MQTT feature extraction: the packet records fed into
//! the pipeline and the per-flow timing state carried between them.
//!
//! ### Key Submodules:
//! - `events`: `PacketRecord` and its transport metadata
//! - `flow`: flow identity, timing state and the stores that own it

pub mod error;
pub mod events;
pub mod flow;

pub mod prelude {
    pub use crate::error::*;
    pub use crate::events::*;
    pub use crate::flow::*;
}

pub use error::CoreError;
