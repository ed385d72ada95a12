//! Benchmarks for linesplit.
//!
//! Run with:
//!     cargo bench

use std::sync::Arc;

use criterion::{Criterion, Throughput, black_box, criterion_group, criterion_main};

use linesplit::{ChunkPlanner, HashConfig, MemorySink, OutputLayout, SplitConfig, Splitter};

/// Deterministic CSV rows of varying width, about `size` bytes in total.
fn csv_rows(size: usize) -> Vec<u8> {
    let mut data = Vec::with_capacity(size + 64);
    let mut i = 0usize;
    while data.len() < size {
        let width = (i * 7 + 13) % 48;
        data.extend_from_slice(format!("{},{},{}\n", i, i % 5, "r".repeat(width)).as_bytes());
        i += 1;
    }
    data
}

fn bench_planner(c: &mut Criterion) {
    let mut group = c.benchmark_group("planner");

    for size in [1024 * 1024, 10 * 1024 * 1024] {
        let data = csv_rows(size);
        group.throughput(Throughput::Bytes(data.len() as u64));

        for chunk_count in [4, 64] {
            let config = SplitConfig::new(chunk_count).unwrap();
            group.bench_function(
                format!("{}mb_{}_chunks", size / (1024 * 1024), chunk_count),
                |b| {
                    b.iter(|| {
                        let planner =
                            ChunkPlanner::new(black_box(&data[..]), data.len() as u64, &config);
                        let mut bytes = 0usize;
                        for chunk in planner {
                            bytes += chunk.unwrap().len();
                        }
                        black_box(bytes)
                    });
                },
            );
        }
    }

    group.finish();
}

fn bench_split(c: &mut Criterion) {
    let mut group = c.benchmark_group("split");
    let data = csv_rows(8 * 1024 * 1024);
    group.throughput(Throughput::Bytes(data.len() as u64));

    for workers in [1, 4] {
        group.bench_function(format!("memory_sink_{}_workers", workers), |b| {
            let config = SplitConfig::new(32).unwrap().with_workers(workers);
            b.iter(|| {
                let splitter = Splitter::new(config.clone()).with_sink(Arc::new(MemorySink::new()));
                let report = splitter
                    .split_reader(
                        black_box(&data[..]),
                        data.len() as u64,
                        OutputLayout::new("bench", "tmp_rows"),
                    )
                    .unwrap();
                black_box(report.len())
            });
        });
    }

    // No hashing
    group.bench_function("memory_sink_no_hash", |b| {
        let config = SplitConfig::new(32)
            .unwrap()
            .with_hash_config(HashConfig::disabled());
        b.iter(|| {
            let splitter = Splitter::new(config.clone()).with_sink(MemorySink::new());
            let report = splitter
                .split_reader(
                    black_box(&data[..]),
                    data.len() as u64,
                    OutputLayout::new("bench", "tmp_rows"),
                )
                .unwrap();
            black_box(report.len())
        });
    });

    group.finish();
}

criterion_group!(benches, bench_planner, bench_split);
criterion_main!(benches);
