//! Benchmarks for the pursuit core.
//!
//! Covers the two hot paths: building a balanced graph at session start,
//! and driving a session tick-by-tick to resolution.

#![allow(missing_docs)]

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion};

use arena::{GameConfig, Policy, Session};

fn bench_session_start(c: &mut Criterion) {
    c.bench_function("session_start_greedy_min", |b| {
        b.iter(|| {
            let session = Session::start(
                black_box(Policy::GreedyMin),
                black_box(GameConfig::with_seed(42)),
            );
            black_box(session)
        });
    });
}

fn bench_tick_throughput(c: &mut Criterion) {
    c.bench_function("1000_ticks_bfs", |b| {
        b.iter(|| {
            let mut session =
                Session::start(Policy::Bfs, GameConfig::with_seed(42)).expect("session start");
            for _ in 0..1000 {
                black_box(session.tick(black_box(16)));
            }
            black_box(session)
        });
    });
}

fn bench_session_to_resolution(c: &mut Criterion) {
    c.bench_function("full_session_greedy_min", |b| {
        b.iter(|| {
            let mut session =
                Session::start(Policy::GreedyMin, GameConfig::with_seed(42)).expect("session start");
            let mut ticks = 0u32;
            while !session.outcome().is_terminal() && ticks < 10_000 {
                session.tick(100);
                ticks += 1;
            }
            black_box(session)
        });
    });
}

criterion_group!(
    benches,
    bench_session_start,
    bench_tick_throughput,
    bench_session_to_resolution
);
criterion_main!(benches);
