/*!
# mqfeat Simulator

Deterministic generator of synthetic MQTT traffic for testing the feature
pipeline end to end.

## Key Components:
- **Virtual Clock:** record timestamps with nanosecond resolution, no wall clock.
- **Sessions:** normal clients, credential brute forcing and non-MQTT noise.
- **Chaos Engine:** optional truncation and corruption of payloads.
- **Scenarios:** YAML files that replay the exact same records later.

The same seed always yields the same scenario.
*/

use std::collections::VecDeque;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use mqfeat_core::events::PacketRecord;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, trace};

pub mod chaos;
pub mod packets;
pub mod scenario;
mod session;
pub mod virtual_clock;

pub use scenario::{Scenario, ScenarioError};
pub use session::SessionKind;
pub use virtual_clock::VirtualClock;

const BROKER_IP: Ipv4Addr = Ipv4Addr::new(10, 0, 0, 1);
/// First client address; session `i` uses this plus `i`.
const CLIENT_BASE: u32 = 0x0A00_0100;
const MIN_GAP_NS: u64 = 100_000;
const MAX_GAP_NS: u64 = 50_000_000;

/// Interleaves generated sessions on a virtual clock, optionally damaging
/// payloads on the way out.
pub struct Simulator {
    seed: u64,
    clock: VirtualClock,
    rng: SmallRng,
    fault_probability: f64,
    faults_injected: usize,
}

impl Simulator {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            clock: VirtualClock::new(0),
            rng: SmallRng::seed_from_u64(seed),
            fault_probability: 0.0,
            faults_injected: 0,
        }
    }

    /// Damages each emitted payload with the given probability.
    pub fn with_chaos(mut self, fault_probability: f64) -> Self {
        self.fault_probability = if fault_probability.is_nan() {
            0.0
        } else {
            fault_probability.clamp(0.0, 1.0)
        };
        self
    }

    pub fn clock(&self) -> &VirtualClock {
        &self.clock
    }

    pub fn faults_injected(&self) -> usize {
        self.faults_injected
    }

    /// Generates `sessions` sessions and returns their records in time order.
    pub fn generate(&mut self, sessions: usize) -> Scenario {
        let broker_port = if self.rng.random_bool(0.8) { 1883 } else { 8883 };
        let broker = SocketAddr::new(IpAddr::V4(BROKER_IP), broker_port);

        let mut scripts: Vec<VecDeque<_>> = (0..sessions)
            .map(|i| {
                let kind = SessionKind::pick(&mut self.rng);
                let ip = Ipv4Addr::from(CLIENT_BASE.wrapping_add(i as u32));
                let port = self.rng.random_range(10_000..=60_000);
                let client = SocketAddr::new(IpAddr::V4(ip), port);
                trace!(session = i, ?kind, %client, "session scripted");
                session::script(kind, &mut self.rng, client, broker)
            })
            .filter(|script| !script.is_empty())
            .collect();

        let mut records = Vec::new();
        while !scripts.is_empty() {
            let idx = self.rng.random_range(0..scripts.len());
            self.clock
                .advance(self.rng.random_range(MIN_GAP_NS..=MAX_GAP_NS));

            if let Some((transport, mut payload)) = scripts[idx].pop_front() {
                if self.fault_probability > 0.0 && self.rng.random_bool(self.fault_probability) {
                    let fault = chaos::inject_fault(&mut payload, &mut self.rng);
                    trace!(?fault, record = records.len(), "fault injected");
                    self.faults_injected += 1;
                }
                records.push(PacketRecord::new(self.clock.now_secs(), transport, payload));
            }
            if scripts[idx].is_empty() {
                scripts.swap_remove(idx);
            }
        }

        debug!(
            seed = self.seed,
            sessions,
            records = records.len(),
            faults = self.faults_injected,
            "scenario generated"
        );
        Scenario::new(Some(self.seed), records)
    }
}
