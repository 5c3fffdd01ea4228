//! Recommendation throughput benchmarks
//!
//! Run with: `cargo bench --bench recommendation`

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use agri_advisor_rust::{
    AdvisoryRequest, EconomicProfile, RecommendationEngine, SoilProfile, WeatherProfile,
};

/// Requests spread across the pH and rainfall ranges of the rule table
fn synthetic_requests(count: usize) -> Vec<AdvisoryRequest> {
    const TEXTURES: [&str; 4] = ["Loam", "Sandy Loam", "Clay Loam", "Sandy"];

    (0..count)
        .map(|i| AdvisoryRequest {
            soil: SoilProfile {
                ph: 4.5 + (i % 40) as f64 * 0.1,
                organic_carbon: 0.2 + (i % 25) as f64 * 0.1,
                nitrogen: 150.0,
                phosphorus: 40.0,
                potassium: 200.0,
                texture: TEXTURES[i % TEXTURES.len()].to_string(),
                drainage: "Moderate".to_string(),
            },
            weather: WeatherProfile {
                rainfall_mm: 300.0 + (i % 30) as f64 * 80.0,
                temperature_c: 15.0 + (i % 20) as f64,
                humidity: 65.0,
                solar_radiation: 5.5,
            },
            economic: EconomicProfile {
                budget_inr: 20000.0 + (i % 10) as f64 * 10000.0,
                labor_availability: "Medium".to_string(),
                input_cost_type: "Organic".to_string(),
            },
            land_area_acres: 1.0 + (i % 8) as f64,
            location: format!("plot-{}", i),
        })
        .collect()
}

fn bench_single(c: &mut Criterion) {
    let engine = RecommendationEngine::new();
    let request = &synthetic_requests(1)[0];

    c.bench_function("generate_recommendation", |b| {
        b.iter(|| {
            engine.generate_recommendation(
                black_box(&request.soil),
                black_box(&request.weather),
                black_box(&request.economic),
                black_box(request.land_area_acres),
                black_box(&request.location),
            )
        })
    });

    c.bench_function("generate_report", |b| {
        b.iter(|| {
            engine.generate_report(
                black_box(&request.soil),
                black_box(&request.weather),
                black_box(&request.economic),
                black_box(request.land_area_acres),
                black_box(&request.location),
            )
        })
    });
}

fn bench_batch(c: &mut Criterion) {
    let engine = RecommendationEngine::new();
    let mut group = c.benchmark_group("generate_batch");

    for size in [100, 1_000, 10_000] {
        let requests = synthetic_requests(size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &requests, |b, requests| {
            b.iter(|| engine.generate_batch(black_box(requests)))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_single, bench_batch);
criterion_main!(benches);
