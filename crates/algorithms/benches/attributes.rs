//! Benchmarks for attributes, filtering and pruning

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use morphtree_algorithms::attribute::{compactness, size, volume_levelling};
use morphtree_algorithms::build::max_tree;
use morphtree_algorithms::filtering::{attribute_filter, AttributeFilterParams, PruningPolicy};
use morphtree_algorithms::pruning::{granulometry, GranulometryParams};
use morphtree_core::tree::AttributeSlot;
use morphtree_core::{ComponentTree, Connectivity, Raster};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn create_test_tree(size: usize) -> ComponentTree<u8> {
    let mut rng = StdRng::seed_from_u64(42);
    let data: Vec<u8> = (0..size * size).map(|_| rng.random_range(0..64)).collect();
    let raster = Raster::from_vec(data, &[size, size]).unwrap();
    max_tree(&raster, Connectivity::Face).unwrap()
}

fn bench_attributes(c: &mut Criterion) {
    let slot = AttributeSlot::new(0).unwrap();
    let mut group = c.benchmark_group("attribute");
    for n in [128, 512] {
        let tree = create_test_tree(n);
        group.bench_with_input(BenchmarkId::new("size", n), &n, |b, _| {
            b.iter_batched(
                || tree.clone(),
                |mut t| size(black_box(&mut t), slot),
                criterion::BatchSize::LargeInput,
            )
        });
        group.bench_with_input(BenchmarkId::new("compactness", n), &n, |b, _| {
            b.iter_batched(
                || tree.clone(),
                |mut t| compactness(black_box(&mut t), slot, false),
                criterion::BatchSize::LargeInput,
            )
        });
        group.bench_with_input(BenchmarkId::new("volume", n), &n, |b, _| {
            b.iter_batched(
                || tree.clone(),
                |mut t| volume_levelling(black_box(&mut t), slot),
                criterion::BatchSize::LargeInput,
            )
        });
    }
    group.finish();
}

fn bench_pruning(c: &mut Criterion) {
    let slot = AttributeSlot::new(0).unwrap();
    let mut group = c.benchmark_group("pruning");
    for n in [128, 512] {
        let mut tree = create_test_tree(n);
        size(&mut tree, slot);
        for policy in [PruningPolicy::Direct, PruningPolicy::Subtract, PruningPolicy::Maximum] {
            let params = AttributeFilterParams {
                slot,
                threshold: 20.0,
                policy,
                reverse_ordering: false,
            };
            group.bench_with_input(
                BenchmarkId::new(format!("{:?}", policy), n),
                &n,
                |b, _| {
                    b.iter_batched(
                        || tree.clone(),
                        |mut t| attribute_filter(black_box(&mut t), &params),
                        criterion::BatchSize::LargeInput,
                    )
                },
            );
        }
        let params = GranulometryParams {
            slot,
            reverse_ordering: false,
        };
        group.bench_with_input(BenchmarkId::new("granulometry", n), &n, |b, _| {
            b.iter_batched(
                || tree.clone(),
                |mut t| granulometry(black_box(&mut t), &params),
                criterion::BatchSize::LargeInput,
            )
        });
    }
    group.finish();
}

criterion_group!(benches, bench_attributes, bench_pruning);
criterion_main!(benches);
