use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use footprint_backend::adjustment::adjust;
use footprint_backend::geodesy::{ellipsoidal_distance, haversine_km, vincenty_inverse_km};
use footprint_backend::models::{Coordinate, TransportMode};

fn benchmark_geodesic_distance(c: &mut Criterion) {
    let mut group = c.benchmark_group("geodesic_distance");

    let test_cases = vec![
        ("city_hop", Coordinate::new(48.8566, 2.3522), Coordinate::new(51.5074, -0.1278)),
        ("transatlantic", Coordinate::new(40.7128, -74.0060), Coordinate::new(51.5074, -0.1278)),
        ("pole_to_pole", Coordinate::new(90.0, 0.0), Coordinate::new(-90.0, 0.0)),
        // Vincenty fails to converge here and falls back to haversine
        ("near_antipodal", Coordinate::new(0.0, 0.0), Coordinate::new(0.5, 179.7)),
    ];

    for (name, a, b) in &test_cases {
        group.bench_with_input(BenchmarkId::new("vincenty", name), &(*a, *b), |bench, (a, b)| {
            bench.iter(|| vincenty_inverse_km(black_box(*a), black_box(*b)));
        });
        group.bench_with_input(BenchmarkId::new("haversine", name), &(*a, *b), |bench, (a, b)| {
            bench.iter(|| haversine_km(black_box(*a), black_box(*b)));
        });
        group.bench_with_input(BenchmarkId::new("ellipsoidal", name), &(*a, *b), |bench, (a, b)| {
            bench.iter(|| ellipsoidal_distance(black_box(*a), black_box(*b)));
        });
    }

    group.finish();
}

fn benchmark_mode_adjustment(c: &mut Criterion) {
    c.bench_function("adjust_all_modes", |b| {
        b.iter(|| {
            for mode in TransportMode::ALL {
                black_box(adjust(black_box(1_234.5), mode, 45.0, 12.0));
            }
        });
    });
}

criterion_group!(benches, benchmark_geodesic_distance, benchmark_mode_adjustment);
criterion_main!(benches);
