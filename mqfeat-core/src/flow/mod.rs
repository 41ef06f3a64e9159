//! ## mqfeat-core::flow
//! Per-flow state carried across packets.
//!
//! A flow is one direction of a TCP session. Its timing state is created on
//! the first packet, updated by every later one and never evicted here.

mod key;
mod table;
mod timing;

pub use key::FlowKey;
pub use table::{shard_index, FlowStore, FlowTimingTracker, ShardedFlowTable};
pub use timing::{AuthFailureWindow, FlowTimingState, AUTH_WINDOW_SECS};
