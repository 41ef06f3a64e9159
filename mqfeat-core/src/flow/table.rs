use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};

use parking_lot::Mutex;

use super::{FlowKey, FlowTimingState};
use crate::error::CoreError;

/// Owner of per-flow timing state.
pub trait FlowStore {
    /// Accounts one packet for `key` and returns the flow's updated state.
    fn observe(&mut self, key: FlowKey, timestamp: f64, auth_failure: bool) -> FlowTimingState;

    /// Number of flows tracked.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Single-threaded flow store backed by a `HashMap`.
#[derive(Debug, Default)]
pub struct FlowTimingTracker {
    flows: HashMap<FlowKey, FlowTimingState>,
}

impl FlowTimingTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &FlowKey) -> Option<&FlowTimingState> {
        self.flows.get(key)
    }
}

impl FlowStore for FlowTimingTracker {
    fn observe(&mut self, key: FlowKey, timestamp: f64, auth_failure: bool) -> FlowTimingState {
        let state = self
            .flows
            .entry(key)
            .or_insert_with(|| FlowTimingState::new(timestamp));
        state.observe(timestamp, auth_failure);
        *state
    }

    fn len(&self) -> usize {
        self.flows.len()
    }
}

/// Shard a flow belongs to when flows are spread over `shards` partitions.
///
/// Stable for the lifetime of the process, so callers routing work by flow
/// agree with [`ShardedFlowTable`]. `shards` must be a power of two.
#[inline]
pub fn shard_index(key: &FlowKey, shards: usize) -> usize {
    let mut hasher = DefaultHasher::new();
    key.hash(&mut hasher);
    (hasher.finish() as usize) & (shards - 1)
}

/// Flow store shared between threads.
///
/// Each shard is its own lock, so only flows hashing to the same shard
/// contend. A given flow always lands in the same shard and its updates are
/// applied one at a time.
#[derive(Debug)]
pub struct ShardedFlowTable {
    shards: Box<[Mutex<FlowTimingTracker>]>,
}

impl ShardedFlowTable {
    /// Creates a table with `shards` partitions.
    ///
    /// # Arguments
    ///
    /// * `shards` - Must be a non-zero power of two.
    pub fn with_shards(shards: usize) -> Result<Self, CoreError> {
        if !shards.is_power_of_two() {
            return Err(CoreError::InvalidShardCount(shards));
        }
        let shards = (0..shards)
            .map(|_| Mutex::new(FlowTimingTracker::new()))
            .collect::<Vec<_>>()
            .into_boxed_slice();
        Ok(Self { shards })
    }

    pub fn shard_count(&self) -> usize {
        self.shards.len()
    }

    #[inline]
    pub fn shard_of(&self, key: &FlowKey) -> usize {
        shard_index(key, self.shards.len())
    }

    pub fn observe(&self, key: FlowKey, timestamp: f64, auth_failure: bool) -> FlowTimingState {
        self.shards[self.shard_of(&key)]
            .lock()
            .observe(key, timestamp, auth_failure)
    }

    pub fn get(&self, key: &FlowKey) -> Option<FlowTimingState> {
        self.shards[self.shard_of(key)].lock().get(key).copied()
    }

    pub fn len(&self) -> usize {
        self.shards.iter().map(|shard| shard.lock().len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl FlowStore for &ShardedFlowTable {
    fn observe(&mut self, key: FlowKey, timestamp: f64, auth_failure: bool) -> FlowTimingState {
        ShardedFlowTable::observe(*self, key, timestamp, auth_failure)
    }

    fn len(&self) -> usize {
        ShardedFlowTable::len(*self)
    }
}
