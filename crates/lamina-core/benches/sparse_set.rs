//! Benchmarks for the SparseSet arena

use lamina_core::alloc::{
    HashMap,
    sparse_set::{IndexSlot, SparseSet},
};
use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};

#[derive(Clone, Copy, Debug, Default)]
struct NodeRecord {
    rect: (i32, i32, i32, i32),
    flags: u32,
}

fn bench_sparse_set_insert(c: &mut Criterion) {
    let mut group = c.benchmark_group("sparse_set_insert");

    for size in [10, 100, 1000, 10000] {
        group.throughput(Throughput::Elements(size as u64));

        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, &size| {
            b.iter(|| {
                let mut set = SparseSet::new();
                for _ in 0..size {
                    set.push(black_box(NodeRecord::default()));
                }
                set
            });
        });
    }

    group.finish();
}

fn bench_lookup_vs_hashmap(c: &mut Criterion) {
    let mut group = c.benchmark_group("sparse_set_lookup");

    for size in [100, 1000, 10000] {
        group.throughput(Throughput::Elements(size as u64));

        let mut set = SparseSet::new();
        let indices: Vec<IndexSlot> = (0..size).map(|_| set.push(NodeRecord::default())).collect();

        group.bench_with_input(BenchmarkId::new("sparse_set", size), &size, |b, _| {
            b.iter(|| {
                let mut sum = 0u32;
                for &idx in &indices {
                    if let Some(record) = set.get(idx) {
                        sum = sum.wrapping_add(record.flags);
                    }
                }
                black_box(sum)
            });
        });

        let map: HashMap<u32, NodeRecord> = (0..size as u32).map(|i| (i, NodeRecord::default())).collect();

        group.bench_with_input(BenchmarkId::new("ahash_map", size), &size, |b, _| {
            b.iter(|| {
                let mut sum = 0u32;
                for i in 0..size as u32 {
                    if let Some(record) = map.get(&i) {
                        sum = sum.wrapping_add(record.flags + record.rect.0 as u32);
                    }
                }
                black_box(sum)
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_sparse_set_insert, bench_lookup_vs_hashmap);
criterion_main!(benches);
