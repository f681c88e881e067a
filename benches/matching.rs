//! Criterion microbenchmarks over the matching engine.
//!
//! Measures:
//! - Add limit (no cross)
//! - Market order sweeping a level of varying depth
//! - Cancel at varying book sizes
//! - Mixed add/cancel workload

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use tickbook::{OrderBook, Side};

fn random_side(rng: &mut ChaCha8Rng) -> Side {
    if rng.gen_bool(0.5) {
        Side::Buy
    } else {
        Side::Sell
    }
}

/// Benchmark: add a limit order that rests (no crossing).
fn bench_add_no_cross(c: &mut Criterion) {
    let mut book = OrderBook::new();

    c.bench_function("add_no_cross", |b| {
        b.iter(|| {
            // Far below any ask; always rests.
            black_box(book.add_limit(Side::Buy, 9_000, 100))
        })
    });
}

/// Benchmark: market order consuming a level of N resting makers.
fn bench_market_sweep(c: &mut Criterion) {
    let mut group = c.benchmark_group("market_sweep");

    for depth in [1i64, 10, 100] {
        group.bench_with_input(BenchmarkId::from_parameter(depth), &depth, |b, &depth| {
            let mut book = OrderBook::new();
            for _ in 0..depth {
                book.add_limit(Side::Sell, 10_000, 10);
            }

            b.iter(|| {
                let result = book.market(Side::Buy, depth * 10);
                // Replenish what the sweep consumed.
                for _ in 0..depth {
                    book.add_limit(Side::Sell, 10_000, 10);
                }
                black_box(result)
            })
        });
    }

    group.finish();
}

/// Benchmark: cancel a resting order and replace it.
fn bench_cancel(c: &mut Criterion) {
    let mut group = c.benchmark_group("cancel");

    for book_size in [100i64, 1_000, 10_000] {
        group.bench_with_input(
            BenchmarkId::from_parameter(book_size),
            &book_size,
            |b, &book_size| {
                let mut book = OrderBook::new();
                let mut ids = std::collections::VecDeque::new();
                for i in 0..book_size {
                    let side = if i % 2 == 0 { Side::Buy } else { Side::Sell };
                    let price = if i % 2 == 0 { 9_000 + i % 100 } else { 11_000 + i % 100 };
                    ids.push_back(book.add_limit(side, price, 100).id);
                }

                let mut i = book_size;
                b.iter(|| {
                    let id = ids.pop_front().unwrap();
                    let ok = book.cancel(id);
                    let side = if i % 2 == 0 { Side::Buy } else { Side::Sell };
                    let price = if i % 2 == 0 { 9_000 + i % 100 } else { 11_000 + i % 100 };
                    ids.push_back(book.add_limit(side, price, 100).id);
                    i += 1;
                    black_box(ok)
                })
            },
        );
    }

    group.finish();
}

/// Benchmark: mixed workload, 70% adds / 30% cancels.
fn bench_mixed_workload(c: &mut Criterion) {
    let mut group = c.benchmark_group("mixed_workload");

    group.bench_function("70_add_30_cancel", |b| {
        let mut book = OrderBook::new();
        let mut rng = ChaCha8Rng::seed_from_u64(0xDEAD_BEEF);
        let mut resting: Vec<u64> = Vec::new();

        // Pre-populate.
        for _ in 0..1_000 {
            let out = book.add_limit(
                random_side(&mut rng),
                rng.gen_range(9_900..10_100),
                rng.gen_range(1..1_000),
            );
            if out.rested() {
                resting.push(out.id);
            }
        }

        b.iter(|| {
            if resting.is_empty() || rng.gen_bool(0.7) {
                let out = book.add_limit(
                    random_side(&mut rng),
                    rng.gen_range(9_900..10_100),
                    rng.gen_range(1..1_000),
                );
                if out.rested() {
                    resting.push(out.id);
                }
                black_box(out.taker.filled)
            } else {
                let pick = rng.gen_range(0..resting.len());
                let id = resting.swap_remove(pick);
                black_box(book.cancel(id) as i64)
            }
        })
    });

    group.finish();
}

/// Benchmark: throughput over a 1000-order batch.
fn bench_throughput(c: &mut Criterion) {
    let mut group = c.benchmark_group("throughput");
    group.throughput(criterion::Throughput::Elements(1_000));

    group.bench_function("1000_adds", |b| {
        let mut rng = ChaCha8Rng::seed_from_u64(0xCAFE_BABE);

        b.iter(|| {
            let mut book = OrderBook::new();
            for _ in 0..1_000 {
                black_box(book.add_limit(
                    random_side(&mut rng),
                    rng.gen_range(9_900..10_100),
                    rng.gen_range(1..1_000),
                ));
            }
            book.clear();
        })
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_add_no_cross,
    bench_market_sweep,
    bench_cancel,
    bench_mixed_workload,
    bench_throughput,
);

criterion_main!(benches);
