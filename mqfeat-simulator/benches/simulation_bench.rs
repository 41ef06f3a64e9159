#[macro_use]
extern crate criterion;

use criterion::{black_box, Criterion};
use mqfeat_simulator::{Scenario, Simulator};

/// Scenario generation throughput for a fixed seed.
fn benchmark_generation(c: &mut Criterion) {
    let sessions = 1_000;
    let seed = 42;

    c.bench_function("generate_sessions", |b| {
        b.iter(|| {
            let mut simulator = Simulator::new(seed);
            black_box(simulator.generate(sessions));
        })
    });

    c.bench_function("generate_sessions_with_chaos", |b| {
        b.iter(|| {
            let mut simulator = Simulator::new(seed).with_chaos(0.25);
            black_box(simulator.generate(sessions));
        })
    });
}

fn benchmark_scenario_yaml(c: &mut Criterion) {
    let scenario = Simulator::new(7).generate(200);
    let text = scenario.to_yaml_string().unwrap();

    c.bench_function("scenario_to_yaml", |b| {
        b.iter(|| black_box(scenario.to_yaml_string().unwrap()))
    });
    c.bench_function("scenario_from_yaml", |b| {
        b.iter(|| black_box(Scenario::from_yaml_str(&text).unwrap()))
    });
}

criterion_group!(benches, benchmark_generation, benchmark_scenario_yaml);
criterion_main!(benches);
