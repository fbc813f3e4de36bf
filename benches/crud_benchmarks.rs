use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use rank_rbtree::{AllocationMode, MultiRankMap, NaturalOrder, RankMap};
use std::collections::BTreeMap;
use std::hint::black_box;

const N: usize = 10_000;

const MODES: [(&str, AllocationMode); 3] = [
    ("discard", AllocationMode::DynamicDiscard),
    ("retain", AllocationMode::DynamicRetain),
    ("fixed", AllocationMode::Fixed),
];

// ─── Helper functions to generate key sequences ─────────────────────────────

fn ordered_keys(n: usize) -> Vec<i64> {
    (0..n as i64).collect()
}

fn reverse_ordered_keys(n: usize) -> Vec<i64> {
    (0..n as i64).rev().collect()
}

fn random_keys(n: usize) -> Vec<i64> {
    // Use a simple LCG for deterministic pseudo-random sequence
    let mut keys = Vec::with_capacity(n);
    let mut x: u64 = 12345;
    for _ in 0..n {
        x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
        keys.push((x >> 33) as i64);
    }
    keys
}

fn patterns() -> [(&'static str, Vec<i64>); 3] {
    [
        ("ordered", ordered_keys(N)),
        ("reverse", reverse_ordered_keys(N)),
        ("random", random_keys(N)),
    ]
}

fn build(keys: &[i64], mode: AllocationMode) -> RankMap<i64, i64> {
    let mut map = RankMap::with_options(NaturalOrder, N, mode);
    for &k in keys {
        let _ = map.try_add(k, k);
    }
    map
}

// ─── Map Benchmarks ─────────────────────────────────────────────────────────

fn bench_map_insert(c: &mut Criterion) {
    for (pattern, keys) in patterns() {
        let mut group = c.benchmark_group(format!("map_insert_{pattern}"));

        for (name, mode) in MODES {
            group.bench_function(BenchmarkId::new(format!("RankMap/{name}"), N), |b| {
                b.iter(|| build(&keys, mode));
            });
        }

        group.bench_function(BenchmarkId::new("BTreeMap", N), |b| {
            b.iter(|| {
                let mut map = BTreeMap::new();
                for &k in &keys {
                    map.entry(k).or_insert(k);
                }
                map
            });
        });

        group.finish();
    }
}

fn bench_map_get(c: &mut Criterion) {
    for (pattern, keys) in patterns() {
        let mut group = c.benchmark_group(format!("map_get_{pattern}"));
        let map = build(&keys, AllocationMode::DynamicDiscard);
        let bt_map: BTreeMap<i64, i64> = keys.iter().map(|&k| (k, k)).collect();

        group.bench_function(BenchmarkId::new("RankMap", N), |b| {
            b.iter(|| {
                for k in &keys {
                    black_box(map.try_get(k));
                }
            });
        });

        group.bench_function(BenchmarkId::new("BTreeMap", N), |b| {
            b.iter(|| {
                for k in &keys {
                    black_box(bt_map.get(k));
                }
            });
        });

        group.finish();
    }
}

fn bench_map_remove(c: &mut Criterion) {
    for (pattern, keys) in patterns() {
        let mut group = c.benchmark_group(format!("map_remove_{pattern}"));

        for (name, mode) in MODES {
            let map = build(&keys, mode);
            group.bench_function(BenchmarkId::new(format!("RankMap/{name}"), N), |b| {
                b.iter_batched(
                    || map.clone(),
                    |mut map| {
                        for k in &keys {
                            map.try_remove(k);
                        }
                        map
                    },
                    criterion::BatchSize::LargeInput,
                );
            });
        }

        let bt_map: BTreeMap<i64, i64> = keys.iter().map(|&k| (k, k)).collect();
        group.bench_function(BenchmarkId::new("BTreeMap", N), |b| {
            b.iter_batched(
                || bt_map.clone(),
                |mut map| {
                    for k in &keys {
                        map.remove(k);
                    }
                    map
                },
                criterion::BatchSize::LargeInput,
            );
        });

        group.finish();
    }
}

// ─── Order-statistic Benchmarks ─────────────────────────────────────────────

fn bench_rank_queries(c: &mut Criterion) {
    let keys = random_keys(N);
    let map = build(&keys, AllocationMode::DynamicDiscard);
    let mut group = c.benchmark_group("rank_queries");

    group.bench_function(BenchmarkId::new("get_rank", N), |b| {
        b.iter(|| {
            for k in &keys {
                black_box(map.try_get_rank(k));
            }
        });
    });

    group.bench_function(BenchmarkId::new("get_key_by_rank", N), |b| {
        b.iter(|| {
            for rank in 0..map.extent() {
                black_box(map.try_get_key_by_rank(rank).ok());
            }
        });
    });

    group.bench_function(BenchmarkId::new("nearest_greater", N), |b| {
        b.iter(|| {
            for k in &keys {
                black_box(map.nearest_greater(k).rank());
            }
        });
    });

    group.finish();
}

fn bench_enumeration(c: &mut Criterion) {
    let map = build(&random_keys(N), AllocationMode::DynamicDiscard);
    let mut group = c.benchmark_group("enumeration");

    group.bench_function(BenchmarkId::new("iter", N), |b| {
        b.iter(|| map.iter().map(|(_, _, rank)| rank).sum::<isize>());
    });

    group.bench_function(BenchmarkId::new("fast_cursor", N), |b| {
        b.iter(|| {
            let mut cursor = map.fast_cursor();
            let mut sum = 0;
            while let Some(Ok((_, _, rank))) = cursor.next(&map) {
                sum += rank;
            }
            sum
        });
    });

    group.bench_function(BenchmarkId::new("robust_cursor", N), |b| {
        b.iter(|| {
            let mut cursor = map.robust_cursor();
            let mut sum = 0;
            while let Some((_, _, rank)) = cursor.next(&map) {
                sum += rank;
            }
            sum
        });
    });

    group.finish();
}

fn bench_adjust_count(c: &mut Criterion) {
    let keys = random_keys(N);
    let mut group = c.benchmark_group("adjust_count");

    group.bench_function(BenchmarkId::new("MultiRankMap", N), |b| {
        b.iter(|| {
            let mut bag: MultiRankMap<i64, ()> = MultiRankMap::new();
            for &k in &keys {
                let _ = bag.adjust_count(k % 1_000, 2);
            }
            for &k in &keys {
                let _ = bag.adjust_count(k % 1_000, -1);
            }
            bag
        });
    });

    group.finish();
}

criterion_group!(map_benches, bench_map_insert, bench_map_get, bench_map_remove);

criterion_group!(rank_benches, bench_rank_queries, bench_enumeration, bench_adjust_count);

criterion_main!(map_benches, rank_benches);
