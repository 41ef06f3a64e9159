//! Sequential and sharded extraction over a batch of records.
//!
//! Both modes number records by input position and return vectors in that
//! order, so their output (and digest) is identical for the same input.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use crossbeam::channel::bounded;
use mqfeat_config::MqfeatConfig;
use mqfeat_core::events::PacketRecord;
use mqfeat_core::flow::{FlowKey, FlowStore, FlowTimingTracker, ShardedFlowTable};
use mqfeat_features::{ExtractedVector, FeatureExtractor};
use mqfeat_protocols::PduReassembler;
use mqfeat_telemetry::MetricsRecorder;
use tokio::task::spawn_blocking;
use tracing::{debug, instrument, trace};

use super::error::EngineError;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExtractionMode {
    /// One flow store, records in arrival order.
    Sequential,
    /// One worker per shard, flows routed by key hash.
    Sharded,
}

/// The parts of [`MqfeatConfig`] extraction depends on.
#[derive(Clone, Debug)]
pub struct ExtractionSettings {
    pub mqtt_ports: Vec<u16>,
    pub split_pdus: bool,
    pub max_pdu_bytes: u32,
    pub shards: usize,
    pub queue_capacity: usize,
}

impl From<&MqfeatConfig> for ExtractionSettings {
    fn from(config: &MqfeatConfig) -> Self {
        Self {
            mqtt_ports: config.ingest.mqtt_ports.clone(),
            split_pdus: config.ingest.split_pdus,
            max_pdu_bytes: config.ingest.max_pdu_bytes,
            shards: config.engine.shards,
            queue_capacity: config.engine.queue_capacity,
        }
    }
}

impl Default for ExtractionSettings {
    fn default() -> Self {
        Self::from(&MqfeatConfig::default())
    }
}

/// Re-cuts MQTT-port TCP payloads into whole PDUs, per flow.
///
/// A segment ending mid-PDU contributes nothing until the rest arrives; a
/// segment holding several PDUs becomes several records with the same
/// timestamp. Records on other ports or transports pass through unchanged so
/// the extractor still reports why they were skipped.
///
/// Only flows with an unfinished PDU keep a reassembler, and none of them
/// buffers more than `settings.max_pdu_bytes`.
pub fn split_records(
    records: Vec<PacketRecord>,
    settings: &ExtractionSettings,
) -> Vec<PacketRecord> {
    let mut reassemblers: HashMap<FlowKey, PduReassembler> = HashMap::new();
    let mut out = Vec::with_capacity(records.len());

    for record in records {
        let key = match FlowKey::from_transport(&record.transport) {
            Some(key) if record.transport.touches_port(&settings.mqtt_ports) => key,
            _ => {
                out.push(record);
                continue;
            }
        };
        let reassembler = reassemblers
            .entry(key)
            .or_insert_with(|| PduReassembler::with_max_pdu(settings.max_pdu_bytes));
        let pdus = reassembler.push(&record.payload);
        if reassembler.buffered() == 0 {
            reassemblers.remove(&key);
        }
        trace!(flow = %key, pdus = pdus.len(), "segment split");
        out.extend(
            pdus.into_iter()
                .map(|pdu| PacketRecord::new(record.timestamp, record.transport, pdu)),
        );
    }

    if !reassemblers.is_empty() {
        let pending: usize = reassemblers.values().map(PduReassembler::buffered).sum();
        debug!(flows = reassemblers.len(), pending, "bytes left in unfinished PDUs");
    }
    out
}

fn extract_one<S: FlowStore>(
    extractor: &mut FeatureExtractor<S>,
    sequence: u64,
    record: &PacketRecord,
    metrics: Option<&MetricsRecorder>,
) -> Option<ExtractedVector> {
    let started = Instant::now();
    let result = extractor.process_sequenced(sequence, record);
    let Some(metrics) = metrics else {
        return result.ok();
    };

    metrics.inc_records();
    metrics.observe_latency_ns(started.elapsed().as_nanos() as f64);
    match result {
        Ok(vector) => {
            metrics.record_vector(vector.message_type, vector.truncation.is_some());
            Some(vector)
        }
        Err(reason) => {
            metrics.record_skip(reason.as_str());
            None
        }
    }
}

/// Runs every record through a single flow store in arrival order.
#[instrument(level = "debug", skip_all, fields(records = records.len()))]
pub fn extract_sequential(
    records: &[PacketRecord],
    settings: &ExtractionSettings,
    metrics: Option<&MetricsRecorder>,
) -> Vec<ExtractedVector> {
    let mut extractor =
        FeatureExtractor::with_ports(FlowTimingTracker::new(), settings.mqtt_ports.clone());
    let vectors: Vec<_> = records
        .iter()
        .enumerate()
        .filter_map(|(seq, record)| extract_one(&mut extractor, seq as u64, record, metrics))
        .collect();

    if let Some(metrics) = metrics {
        metrics.set_active_flows(extractor.store().len());
    }
    debug!(vectors = vectors.len(), "sequential extraction done");
    vectors
}

/// Spreads flows over `settings.shards` blocking workers.
///
/// Flow state lives in one [`ShardedFlowTable`] and worker `i` is fed exactly
/// the flows of table shard `i`, so a flow's updates are applied by one thread
/// in arrival order and no two workers share a lock. Records without a TCP
/// flow key go to shard 0, where they are skipped like in sequential mode.
#[instrument(
    level = "debug",
    skip_all,
    fields(records = records.len(), shards = settings.shards)
)]
pub async fn extract_sharded(
    records: Vec<PacketRecord>,
    settings: &ExtractionSettings,
    metrics: Option<&MetricsRecorder>,
) -> Result<Vec<ExtractedVector>, EngineError> {
    let table = Arc::new(ShardedFlowTable::with_shards(settings.shards)?);
    let shards = table.shard_count();

    let mut senders = Vec::with_capacity(shards);
    let mut workers = Vec::with_capacity(shards);
    for shard in 0..shards {
        let (tx, rx) = bounded::<(u64, PacketRecord)>(settings.queue_capacity);
        senders.push(tx);

        let table = Arc::clone(&table);
        let ports = settings.mqtt_ports.clone();
        let metrics = metrics.cloned();
        workers.push(spawn_blocking(move || {
            let mut extractor = FeatureExtractor::with_ports(&*table, ports);
            let vectors: Vec<_> = rx
                .iter()
                .filter_map(|(seq, record)| {
                    extract_one(&mut extractor, seq, &record, metrics.as_ref())
                })
                .collect();
            trace!(shard, vectors = vectors.len(), "shard drained");
            vectors
        }));
    }

    // Sends block while a shard's queue is full, so dispatch off the runtime.
    let router = Arc::clone(&table);
    let dispatcher = spawn_blocking(move || {
        for (seq, record) in records.into_iter().enumerate() {
            let shard = FlowKey::from_transport(&record.transport)
                .map_or(0, |key| router.shard_of(&key));
            if senders[shard].send((seq as u64, record)).is_err() {
                break;
            }
        }
    });
    dispatcher.await?;

    let mut vectors = Vec::new();
    for worker in workers {
        vectors.extend(worker.await?);
    }
    vectors.sort_unstable_by_key(|v| v.sequence);

    let flows = table.len();
    if let Some(metrics) = metrics {
        metrics.set_active_flows(flows);
    }
    debug!(vectors = vectors.len(), flows, "sharded extraction done");
    Ok(vectors)
}
