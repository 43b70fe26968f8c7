// =====================================================================
// File: benches/btree_benchmark.rs
//
// Description:
//   Criterion benchmark over insert/iterate/find/upper_bound/delete,
//   mirroring the operation set exercised by
//   original_source/btree/btree_benchmark.py against random int keys.
// =====================================================================
use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use ordered_containers::OrderedMap;

const SIZES: [usize; 3] = [1_000, 10_000, 100_000];

fn lcg_keys(n: usize) -> Vec<i64> {
    let mut state: u64 = 0x2545F4914F6CDD1D;
    (0..n)
        .map(|_| {
            state = state.wrapping_mul(6364136223846793005).wrapping_add(1);
            (state >> 16) as i64
        })
        .collect()
}

fn bench_insert(c: &mut Criterion) {
    let mut group = c.benchmark_group("insert");
    for &n in &SIZES {
        let keys = lcg_keys(n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &keys, |b, keys| {
            b.iter(|| {
                let mut map: OrderedMap<i64, i64> = OrderedMap::new();
                for &k in keys {
                    map.insert(k, k);
                }
                map
            });
        });
    }
    group.finish();
}

fn bench_iterate(c: &mut Criterion) {
    let mut group = c.benchmark_group("iterate");
    for &n in &SIZES {
        let keys = lcg_keys(n);
        let mut map: OrderedMap<i64, i64> = OrderedMap::new();
        for &k in &keys {
            map.insert(k, k);
        }
        group.bench_with_input(BenchmarkId::from_parameter(n), &map, |b, map| {
            b.iter(|| map.iter().map(|(k, v)| k + v).sum::<i64>());
        });
    }
    group.finish();
}

fn bench_find(c: &mut Criterion) {
    let mut group = c.benchmark_group("find");
    for &n in &SIZES {
        let keys = lcg_keys(n);
        let mut map: OrderedMap<i64, i64> = OrderedMap::new();
        for &k in &keys {
            map.insert(k, k);
        }
        group.bench_with_input(BenchmarkId::from_parameter(n), &(map, keys), |b, (map, keys)| {
            b.iter(|| {
                for &k in keys {
                    let _ = map.get(&k);
                }
            });
        });
    }
    group.finish();
}

fn bench_upper_bound(c: &mut Criterion) {
    let mut group = c.benchmark_group("upper_bound");
    for &n in &SIZES {
        let keys = lcg_keys(n);
        let mut map: OrderedMap<i64, i64> = OrderedMap::new();
        for &k in &keys {
            map.insert(k, k);
        }
        group.bench_with_input(BenchmarkId::from_parameter(n), &(map, keys), |b, (map, keys)| {
            b.iter(|| {
                for &k in keys {
                    let cursor = map.upper_bound(&k);
                    if cursor != map.end() {
                        let _ = map.get_at(&cursor);
                    }
                }
            });
        });
    }
    group.finish();
}

fn bench_delete(c: &mut Criterion) {
    let mut group = c.benchmark_group("delete");
    for &n in &SIZES {
        let keys = lcg_keys(n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &keys, |b, keys| {
            b.iter_batched(
                || {
                    let mut map: OrderedMap<i64, i64> = OrderedMap::new();
                    for &k in keys {
                        map.insert(k, k);
                    }
                    map
                },
                |mut map| {
                    for &k in keys {
                        let _ = map.erase(&k);
                    }
                },
                criterion::BatchSize::LargeInput,
            );
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_insert,
    bench_iterate,
    bench_find,
    bench_upper_bound,
    bench_delete
);
criterion_main!(benches);
