use std::collections::BTreeSet;
use std::hint::black_box;
use std::time::Duration;

use criterion::measurement::Measurement;
use criterion::{BenchmarkGroup, BenchmarkId, Criterion, criterion_group, criterion_main};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use rbtree::RbTree;

const SIZES: [usize; 3] = [1_000, 16_000, 64_000];
const OPS_PER_ITER: usize = 200;
const FIND_HIT_RATE_PERCENT: u64 = 80;
const RNG_SEED: u64 = 0xB1A5_2026;

fn apply_runtime_config<M: Measurement>(group: &mut BenchmarkGroup<'_, M>) {
    group.sample_size(15);
    group.warm_up_time(Duration::from_millis(200));
    group.measurement_time(Duration::from_millis(500));
}

fn random_keys(rng: &mut StdRng, n: usize) -> Vec<i64> {
    (0..n).map(|_| rng.random()).collect()
}

fn bench_insert(c: &mut Criterion) {
    let mut group = c.benchmark_group("rbtree/insert");
    apply_runtime_config(&mut group);
    for &size in SIZES.iter() {
        let mut rng = StdRng::seed_from_u64(RNG_SEED);
        let keys = random_keys(&mut rng, size);

        group.bench_with_input(BenchmarkId::new("rb", size), &keys, |b, keys| {
            b.iter(|| {
                let mut tree = RbTree::new();
                for &key in keys {
                    black_box(tree.insert(key));
                }
                tree
            });
        });
        group.bench_with_input(BenchmarkId::new("std_btree", size), &keys, |b, keys| {
            b.iter(|| {
                let mut set = BTreeSet::new();
                for &key in keys {
                    black_box(set.insert(key));
                }
                set
            });
        });
    }
    group.finish();
}

fn bench_find(c: &mut Criterion) {
    let mut group = c.benchmark_group("rbtree/find");
    apply_runtime_config(&mut group);
    for &size in SIZES.iter() {
        let mut rng = StdRng::seed_from_u64(RNG_SEED);
        let keys = random_keys(&mut rng, size);
        let mut tree = RbTree::new();
        for &key in &keys {
            tree.insert(key);
        }
        let queries: Vec<i64> = (0..OPS_PER_ITER)
            .map(|_| {
                if rng.random_range(0..100) < FIND_HIT_RATE_PERCENT {
                    keys[rng.random_range(0..keys.len())]
                } else {
                    rng.random()
                }
            })
            .collect();

        group.bench_with_input(BenchmarkId::new("rb", size), &queries, |b, queries| {
            b.iter(|| {
                for &key in queries {
                    black_box(tree.find(key));
                }
            });
        });
    }
    group.finish();
}

fn bench_churn(c: &mut Criterion) {
    let mut group = c.benchmark_group("rbtree/churn");
    apply_runtime_config(&mut group);
    for &size in SIZES.iter() {
        let mut rng = StdRng::seed_from_u64(RNG_SEED);
        let keys = random_keys(&mut rng, size);
        let fresh = random_keys(&mut rng, OPS_PER_ITER);
        let mut tree = RbTree::new();
        for &key in &keys {
            tree.insert(key);
        }

        group.bench_with_input(BenchmarkId::new("rb", size), &fresh, |b, fresh| {
            b.iter(|| {
                for &key in fresh {
                    let handle = tree.insert(key);
                    tree.erase(handle).expect("freshly inserted handle");
                }
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_insert, bench_find, bench_churn);
criterion_main!(benches);
