//! Benchmarks for tree construction and reconstruction

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use morphtree_algorithms::build::{max_tree, min_tree};
use morphtree_algorithms::reconstruct::tree_to_image;
use morphtree_core::{Connectivity, Raster};

fn create_test_raster(size: usize) -> Raster<u16> {
    // Varied surface with many plateaus
    let data: Vec<u16> = (0..size * size)
        .map(|i| {
            let (row, col) = (i / size, i % size);
            ((row * 7 + col * 13) % 256) as u16
        })
        .collect();
    Raster::from_vec(data, &[size, size]).unwrap()
}

fn bench_max_tree(c: &mut Criterion) {
    let mut group = c.benchmark_group("tree/max_tree");
    for size in [128, 256, 512, 1024] {
        let raster = create_test_raster(size);
        group.bench_with_input(BenchmarkId::new("face", size), &size, |b, _| {
            b.iter(|| max_tree(black_box(&raster), Connectivity::Face).unwrap())
        });
        group.bench_with_input(BenchmarkId::new("full", size), &size, |b, _| {
            b.iter(|| max_tree(black_box(&raster), Connectivity::Full).unwrap())
        });
    }
    group.finish();
}

fn bench_min_tree_3d(c: &mut Criterion) {
    let mut group = c.benchmark_group("tree/min_tree_3d");
    for size in [32, 64] {
        let data: Vec<u8> = (0..size * size * size).map(|i| ((i * 31) % 97) as u8).collect();
        let raster = Raster::from_vec(data, &[size, size, size]).unwrap();
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, _| {
            b.iter(|| min_tree(black_box(&raster), Connectivity::Face).unwrap())
        });
    }
    group.finish();
}

fn bench_reconstruct(c: &mut Criterion) {
    let mut group = c.benchmark_group("tree/reconstruct");
    for size in [256, 1024] {
        let raster = create_test_raster(size);
        let tree = max_tree(&raster, Connectivity::Face).unwrap();
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, _| {
            b.iter(|| tree_to_image(black_box(&tree)).unwrap())
        });
    }
    group.finish();
}

criterion_group!(benches, bench_max_tree, bench_min_tree_3d, bench_reconstruct);
criterion_main!(benches);
