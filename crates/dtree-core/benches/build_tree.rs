//! Benchmarks for forest assembly and valuation.
//!
//! Run with: cargo bench -p dtree-core --bench build_tree

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use dtree_core::{build_operation_tree, build_tree, Operation, TreeConfig};
use dtree_test_utils::{add, chain, multiply, start};

/// One START with `len` direct children, alternating `+` and `×`
fn wide(len: u64) -> Vec<Operation> {
    std::iter::once(start(1))
        .chain((2..=len).map(|id| {
            if id % 2 == 0 {
                add(id, 1, 1.0)
            } else {
                multiply(id, 1, 1.5)
            }
        }))
        .collect()
}

/// Children listed before their parents
fn reversed(len: u64) -> Vec<Operation> {
    let mut ops = chain(len);
    ops.reverse();
    ops
}

fn bench_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("build_tree");

    for size in [100u64, 1_000, 10_000] {
        group.throughput(Throughput::Elements(size));

        let deep = chain(size);
        group.bench_with_input(BenchmarkId::new("chain", size), &deep, |b, ops| {
            b.iter(|| build_tree(black_box(ops)));
        });

        let flat = wide(size);
        group.bench_with_input(BenchmarkId::new("wide", size), &flat, |b, ops| {
            b.iter(|| build_tree(black_box(ops)));
        });

        let backwards = reversed(size);
        group.bench_with_input(BenchmarkId::new("reversed", size), &backwards, |b, ops| {
            b.iter(|| build_tree(black_box(ops)));
        });
    }

    group.finish();
}

fn bench_valuation(c: &mut Criterion) {
    let mut group = c.benchmark_group("build_operation_tree");
    let config = TreeConfig::default();

    for size in [100u64, 1_000, 10_000] {
        group.throughput(Throughput::Elements(size));

        let deep = chain(size);
        group.bench_with_input(BenchmarkId::new("chain", size), &deep, |b, ops| {
            b.iter(|| build_operation_tree(black_box(ops), 10.0, &config));
        });

        let flat = wide(size);
        group.bench_with_input(BenchmarkId::new("wide", size), &flat, |b, ops| {
            b.iter(|| build_operation_tree(black_box(ops), 10.0, &config));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_build, bench_valuation);
criterion_main!(benches);
