//! Performance benchmarks for correlation and aggregation
//!
//! The lag scan dominates correlation cost: one Pearson pass per lag.

use chrono::{Duration, TimeZone, Utc};
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use sentiment_signals::{CorrelationEngine, PriceDataPoint, SentimentAggregator, SentimentSample};
use sentiment_types::{DataPointParams, SentimentDataPoint, SourceKind};

fn synthetic_series(hours: usize) -> (Vec<SentimentSample>, Vec<PriceDataPoint>) {
    let mut rng = StdRng::seed_from_u64(7);
    let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    let mut price = 40_000.0;

    let mut samples = Vec::with_capacity(hours);
    let mut prices = Vec::with_capacity(hours);
    for i in 0..hours {
        let timestamp = start + Duration::hours(i as i64);
        price *= 1.0 + rng.gen_range(-0.01..0.01);
        prices.push(PriceDataPoint::from_close(timestamp, price));
        samples.push(SentimentSample::new(timestamp, rng.gen_range(-100.0..100.0)));
    }
    (samples, prices)
}

fn bench_correlate(c: &mut Criterion) {
    let engine = CorrelationEngine::default();
    let mut group = c.benchmark_group("correlate");

    for hours in [24usize, 168, 720] {
        let (samples, prices) = synthetic_series(hours);
        group.bench_with_input(BenchmarkId::from_parameter(hours), &hours, |b, _| {
            b.iter(|| {
                let result = engine.correlate(
                    "BTC",
                    criterion::black_box(&samples),
                    criterion::black_box(&prices),
                    "bench",
                );
                criterion::black_box(result)
            })
        });
    }

    group.finish();
}

fn bench_aggregate(c: &mut Criterion) {
    let aggregator = SentimentAggregator::default();
    let as_of = Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap();
    let mut rng = StdRng::seed_from_u64(11);

    let points: Vec<SentimentDataPoint> = (0..1_000)
        .map(|i| {
            SentimentDataPoint::new(DataPointParams {
                source: "twitter".to_string(),
                kind: SourceKind::Social,
                score: rng.gen_range(-100.0..100.0),
                magnitude: rng.gen_range(0.0..1.0),
                confidence: rng.gen_range(0.0..1.0),
                timestamp: as_of - Duration::seconds(i * 80),
                weight: 0.6,
                engagement: Some(rng.gen_range(0..50_000)),
                is_influencer: i % 17 == 0,
                symbols: ["BTC".to_string()].into_iter().collect(),
            })
        })
        .collect();

    c.bench_function("aggregate_symbol_1000_points", |b| {
        b.iter(|| {
            let aggregated = aggregator.aggregate_symbol("BTC", criterion::black_box(&points), as_of);
            criterion::black_box(aggregated)
        })
    });
}

criterion_group!(benches, bench_correlate, bench_aggregate);
criterion_main!(benches);
