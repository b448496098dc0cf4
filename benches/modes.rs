//! Benchmarks for MODE batching and decoding.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use slirc_chanstate::{batch_mode_changes, CapabilityTable, Channel, ConnectionId, ModeChange, UserStatusMap};

const CHANMODES: &str = "beI,kfL,lj,psmntirRcOAQKVCuzNSMTGZ";
const PREFIX: &str = "(qaohv)~&@%+";

fn caps() -> CapabilityTable {
    CapabilityTable::parse(CHANMODES, PREFIX, "6", "~&@%+").unwrap()
}

fn requests(n: usize) -> Vec<ModeChange> {
    (0..n)
        .map(|i| match i % 4 {
            0 => ModeChange::plus('o').with_target(format!("nick{}", i)),
            1 => ModeChange::minus('v').with_target(format!("nick{}", i)),
            2 => ModeChange::plus('b').with_target(format!("*!*@host{}.example", i)),
            _ => ModeChange::plus('n'),
        })
        .collect()
}

fn benchmark_encoding(c: &mut Criterion) {
    let caps = caps();
    let mut group = c.benchmark_group("Mode Batching");

    for size in [1usize, 6, 32, 128] {
        let changes = requests(size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &changes, |b, changes| {
            b.iter(|| black_box(batch_mode_changes("#bench", &caps, changes.clone())))
        });
    }

    group.finish();
}

fn benchmark_decoding(c: &mut Criterion) {
    let caps = caps();
    let mut group = c.benchmark_group("Mode Decoding");

    group.bench_function("status_grants", |b| {
        let targets = ["alice", "bob", "carol", "dave", "erin", "frank"];
        b.iter(|| {
            let mut chan = Channel::new("#bench", ConnectionId::new(1));
            let mut users = UserStatusMap::new();
            chan.apply_modes(&caps, &mut users, "srv", black_box("+qaohvo"), &targets)
                .unwrap();
            black_box(chan)
        })
    });

    group.bench_function("mixed_reply", |b| {
        let targets = ["*!*@spam", "hunter2", "50", "alice"];
        b.iter(|| {
            let mut chan = Channel::new("#bench", ConnectionId::new(1));
            let mut users = UserStatusMap::new();
            chan.apply_modes(&caps, &mut users, "srv", black_box("+bntkl-m+o"), &targets)
                .unwrap();
            black_box(chan)
        })
    });

    group.finish();
}

criterion_group!(benches, benchmark_encoding, benchmark_decoding);
criterion_main!(benches);
