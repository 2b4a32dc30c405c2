//! Benchmarks for the grouped aggregation, join and parallel reduction paths.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rust_data_frame::execution::{ExecutionEngine, ExecutionOptions};
use rust_data_frame::processing::ReduceOp;
use rust_data_frame::{Frame, Sorter};

#[derive(Debug, Clone)]
struct Sale {
    id: u64,
    region: u32,
    product: u32,
    amount: f64,
}

fn sales(n: u64) -> Frame<Sale> {
    (0..n)
        .map(|i| Sale {
            id: i,
            region: (i % 17) as u32,
            product: (i % 101) as u32,
            amount: (i % 1_000) as f64 * 0.25,
        })
        .collect()
}

fn bench_group_by(c: &mut Criterion) {
    let mut group = c.benchmark_group("group_by_sum");
    for n in [1_000u64, 10_000, 100_000] {
        let frame = sales(n);
        group.throughput(Throughput::Elements(n));
        group.bench_with_input(BenchmarkId::new("one_key", n), &frame, |b, frame| {
            b.iter(|| black_box(frame.group_by_sum(|s| s.region, |s| s.amount)))
        });
        group.bench_with_input(BenchmarkId::new("two_keys", n), &frame, |b, frame| {
            b.iter(|| black_box(frame.group_by2(|s| s.region, |s| s.product).sum(|s| s.amount)))
        });
    }
    group.finish();
}

fn bench_join(c: &mut Criterion) {
    let mut group = c.benchmark_group("join");
    let regions: Frame<u32> = (0..17).collect();
    for n in [1_000u64, 10_000] {
        let frame = sales(n);
        group.throughput(Throughput::Elements(n));
        group.bench_with_input(BenchmarkId::new("left_join_once", n), &frame, |b, frame| {
            b.iter(|| {
                black_box(frame.left_join_once(&regions, |s, r| s.region == *r, |s, r| (s.id, r.copied())))
            })
        });
    }
    group.finish();
}

fn bench_rank(c: &mut Criterion) {
    let frame = sales(10_000);
    let sorter = Sorter::desc(|s: &Sale| s.product).then_asc(|s: &Sale| s.id);
    c.bench_function("add_rank_col_10k", |b| b.iter(|| black_box(frame.add_rank_col(&sorter))));
}

fn bench_parallel_sum(c: &mut Criterion) {
    let mut group = c.benchmark_group("sum");
    let frame = sales(200_000);
    group.throughput(Throughput::Elements(200_000));
    group.bench_function("sequential", |b| b.iter(|| black_box(frame.sum(|s| s.amount))));
    for chunk_size in [1_024usize, 16_384] {
        let engine = ExecutionEngine::new(ExecutionOptions {
            chunk_size,
            ..Default::default()
        })
        .unwrap();
        group.bench_with_input(BenchmarkId::new("engine", chunk_size), &engine, |b, engine| {
            b.iter(|| black_box(engine.reduce(&frame, |s| s.amount, ReduceOp::Sum)))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_group_by, bench_join, bench_rank, bench_parallel_sum);
criterion_main!(benches);
