//! Benchmarks for snapshot construction and the full analysis pipeline.

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use flight_guard::analyzers::{Analyzer, IntegrityAnalyzer, OutlierAnalyzer, RankingAnalyzer};
use flight_guard::prelude::*;
use std::hint::black_box;
use std::time::Duration;
use tokio::runtime::Runtime;

/// Builds a network of `routes` routes over 500 airports and 50 airlines,
/// with roughly one route in fifty pointing at something that does not exist.
fn network(routes: usize) -> (Vec<Airport>, Vec<Airline>, Vec<Route>) {
    let airports: Vec<Airport> = (0..500)
        .map(|i| Airport::new(format!("P{i:03}"), format!("Airport {i}")))
        .collect();
    let airlines: Vec<Airline> = (0..50)
        .map(|i| Airline::new(format!("L{i:02}"), format!("Airline {i}")))
        .collect();
    let routes = (0..routes)
        .map(|i| {
            // Skew sources so a handful of hubs stand out.
            let source = if i % 7 == 0 { i % 5 } else { (i * 31) % 500 };
            let destination = (i * 17 + 3) % 500;
            let source = format!("P{source:03}");
            let destination = if i % 50 == 49 {
                "NOWHERE".to_string()
            } else {
                format!("P{destination:03}")
            };
            let airline = if i % 97 == 0 {
                String::new()
            } else {
                format!("L{:02}", i % 50)
            };
            Route::new(source, destination, airline)
        })
        .collect();
    (airports, airlines, routes)
}

fn bench_snapshot(c: &mut Criterion) {
    let mut group = c.benchmark_group("snapshot");

    for size in [1_000usize, 10_000, 50_000] {
        let (airports, airlines, routes) = network(size);
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::new("from_records", size), &size, |b, _| {
            b.iter(|| {
                Dataset::from_records(black_box(&airports), black_box(&airlines), black_box(&routes))
            });
        });
    }

    group.finish();
}

fn bench_analyzers(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let (airports, airlines, routes) = network(20_000);
    let dataset = Dataset::from_records(&airports, &airlines, &routes).unwrap();

    let mut group = c.benchmark_group("analyzers");
    group.measurement_time(Duration::from_secs(8));

    group.bench_function("integrity", |b| {
        let analyzer = IntegrityAnalyzer::new();
        b.iter(|| rt.block_on(analyzer.analyze(black_box(&dataset))));
    });
    group.bench_function("outliers", |b| {
        let analyzer = OutlierAnalyzer::default();
        b.iter(|| rt.block_on(analyzer.analyze(black_box(&dataset))));
    });
    group.bench_function("ranking", |b| {
        let analyzer = RankingAnalyzer::default();
        b.iter(|| rt.block_on(analyzer.analyze(black_box(&dataset))));
    });

    group.finish();
}

fn bench_engine(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let engine = AnomalyEngine::new(AnalysisConfig::default()).unwrap();

    let mut group = c.benchmark_group("engine");
    group.measurement_time(Duration::from_secs(10));

    for size in [1_000usize, 20_000] {
        let (airports, airlines, routes) = network(size);
        let dataset = Dataset::from_records(&airports, &airlines, &routes).unwrap();
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::new("run", size), &dataset, |b, dataset| {
            b.iter(|| rt.block_on(engine.run(black_box(dataset))));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_snapshot, bench_analyzers, bench_engine);
criterion_main!(benches);
