//! Benchmarks for the interpolation methods

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use phreatic_algorithms::interpolation::{
    fit_polynomial, idw, ordinary_kriging, IdwParams, OrdinaryKrigingParams, PolynomialDegree,
    VariogramModel,
};
use phreatic_core::{Grid, SampleSet};

fn create_samples(n: usize) -> SampleSet {
    // Deterministic scatter over [0, 1000]² with a gently sloping field
    let triples: Vec<(f64, f64, f64)> = (0..n)
        .map(|i| {
            let x = ((i * 7919) % 1000) as f64 + 0.5;
            let y = ((i * 104_729) % 997) as f64 + 0.25;
            let z = 120.0 + 0.01 * x - 0.02 * y + ((i * 13) % 17) as f64 / 10.0;
            (x, y, z)
        })
        .collect();
    SampleSet::from_xyz(&triples).unwrap()
}

fn create_grid(size: usize) -> Grid {
    let step = 1000.0 / (size - 1) as f64;
    Grid::with_step((0.0, 1000.0), (0.0, 1000.0), step).unwrap()
}

fn bench_idw(c: &mut Criterion) {
    let mut group = c.benchmark_group("idw");
    let samples = create_samples(50);

    for size in [64, 128, 256].iter() {
        let grid = create_grid(*size);
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| idw(black_box(&samples), black_box(&grid), IdwParams::default()).unwrap())
        });
    }

    group.finish();
}

fn bench_polynomial(c: &mut Criterion) {
    let samples = create_samples(200);
    let grid = create_grid(256);

    c.bench_function("polynomial_quadratic_256", |b| {
        b.iter(|| {
            fit_polynomial(black_box(&samples), PolynomialDegree::Quadratic)
                .unwrap()
                .predict(&grid)
                .unwrap()
        })
    });
}

fn bench_kriging(c: &mut Criterion) {
    let mut group = c.benchmark_group("ordinary_kriging");
    let grid = create_grid(128);
    let params = OrdinaryKrigingParams::new(VariogramModel::spherical(0.1, 4.0, 400.0).unwrap());

    for n in [10, 50, 200].iter() {
        let samples = create_samples(*n);
        group.bench_with_input(BenchmarkId::from_parameter(n), n, |b, _| {
            b.iter(|| ordinary_kriging(black_box(&samples), black_box(&grid), params).unwrap())
        });
    }

    group.finish();
}

criterion_group!(benches, bench_idw, bench_polynomial, bench_kriging);
criterion_main!(benches);
