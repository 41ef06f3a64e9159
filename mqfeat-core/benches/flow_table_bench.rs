#[macro_use]
extern crate criterion;

use std::net::{IpAddr, Ipv4Addr};

use criterion::{black_box, Criterion};

use mqfeat_core::flow::{FlowKey, FlowStore, FlowTimingTracker, ShardedFlowTable};

fn key(port: u16) -> FlowKey {
    FlowKey {
        src: IpAddr::V4(Ipv4Addr::new(10, 0, 0, 2)),
        dst: IpAddr::V4(Ipv4Addr::new(10, 0, 0, 1)),
        src_port: port,
        dst_port: 1883,
    }
}

fn bench_flow_observe(c: &mut Criterion) {
    let mut group = c.benchmark_group("flow_observe");

    for flows in [16u16, 1024] {
        group.throughput(criterion::Throughput::Elements(u64::from(flows)));
        group.bench_function(format!("tracker_{}", flows), |b| {
            let mut tracker = FlowTimingTracker::new();
            b.iter(|| {
                for port in 0..flows {
                    black_box(tracker.observe(key(port), 1.0, port % 7 == 0));
                }
            });
        });
        group.bench_function(format!("sharded_{}", flows), |b| {
            let table = ShardedFlowTable::with_shards(8).unwrap();
            b.iter(|| {
                for port in 0..flows {
                    black_box(table.observe(key(port), 1.0, port % 7 == 0));
                }
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_flow_observe);
criterion_main!(benches);
