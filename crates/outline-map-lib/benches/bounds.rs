//! Benchmarks for bounds and fit computation over long route geometries
//!
//! Run with: cargo bench --package outline-map-lib

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use outline_map_lib::{Bounds, Coordinates, FIT_PADDING, FitRequest, fit_view};

/// A wiggly route of `num_points` points heading north-east from a base position
fn generate_route(num_points: usize, base_lat: f64, base_lon: f64) -> Vec<Coordinates> {
    (0..num_points)
        .map(|i| {
            let t = i as f64 / num_points as f64;
            Coordinates::new(
                base_lat + t * 0.5 + (t * 50.0).sin() * 0.01,
                base_lon + t * 0.5 + (t * 30.0).cos() * 0.01,
            )
        })
        .collect()
}

fn bench_bounds(c: &mut Criterion) {
    let mut group = c.benchmark_group("bounds_from_points");
    for &size in &[1_000usize, 10_000, 100_000] {
        let route = generate_route(size, 40.7, -74.0);
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &route, |b, route| {
            b.iter(|| Bounds::from_points(route.iter().copied()))
        });
    }
    group.finish();
}

fn bench_fit(c: &mut Criterion) {
    let route = generate_route(10_000, 51.5, -0.1);
    let bounds = Bounds::from_points(route.iter().copied()).expect("non-empty route");

    c.bench_function("fit_view", |b| {
        b.iter(|| fit_view(&bounds, [1920.0, 1080.0], FIT_PADDING))
    });
    c.bench_function("fit_request_for_points", |b| {
        b.iter(|| FitRequest::for_points(route.iter().copied()).map(|r| r.view([1280.0, 720.0])))
    });
}

criterion_group!(benches, bench_bounds, bench_fit);
criterion_main!(benches);
