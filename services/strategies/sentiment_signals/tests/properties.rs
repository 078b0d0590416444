//! Sentiment Engine Property Tests
//!
//! Mathematical properties that must hold for any input: bounded outputs,
//! monotonic decay, and well-defined statistics.

use chrono::{DateTime, Duration, TimeZone, Utc};
use proptest::prelude::*;
use sentiment_config::{AggregatorConfig, FearGreedConfig, FearGreedWeights};
use sentiment_signals::fear_greed::{FearGreedComposer, FearGreedInputs};
use sentiment_signals::signals::{confidence_for, MAX_CONFIDENCE};
use sentiment_signals::statistics::{correlation_p_value, pearson};
use sentiment_signals::SentimentAggregator;
use sentiment_types::{DataPointParams, SentimentDataPoint, SourceKind};

fn as_of() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 11, 1, 0, 0, 0).unwrap()
}

prop_compose! {
    fn arb_point()(
        score in -150.0f64..150.0,
        magnitude in -0.5f64..1.5,
        confidence in -0.5f64..1.5,
        minutes_ago in 0i64..(24 * 60),
        weight in 0.0f64..2.0,
        engagement in proptest::option::of(0u64..1_000_000),
        is_influencer in any::<bool>(),
    ) -> SentimentDataPoint {
        SentimentDataPoint::new(DataPointParams {
            source: "reddit".to_string(),
            kind: SourceKind::Social,
            score,
            magnitude,
            confidence,
            timestamp: as_of() - Duration::minutes(minutes_ago),
            weight,
            engagement,
            is_influencer,
            symbols: ["SOL".to_string()].into_iter().collect(),
        })
    }
}

prop_compose! {
    fn arb_weights()(a in 0.0f64..1.0, b in 0.0f64..1.0, c in 0.0f64..1.0, d in 0.01f64..1.0)
        -> FearGreedWeights {
        let sum = a + b + c + d;
        FearGreedWeights {
            sentiment: a / sum,
            volume: b / sum,
            volatility: c / sum,
            momentum: 1.0 - (a + b + c) / sum,
        }
    }
}

proptest! {
    #[test]
    fn aggregate_stays_in_bounds(points in prop::collection::vec(arb_point(), 1..40)) {
        let aggregator = SentimentAggregator::new(AggregatorConfig {
            min_data_points: 1,
            ..Default::default()
        }).unwrap();

        let aggregated = aggregator.aggregate("SOL", points.iter(), as_of()).unwrap();

        prop_assert!((-100.0..=100.0).contains(&aggregated.score));
        prop_assert!((0.0..=1.0).contains(&aggregated.magnitude));
        prop_assert!((0.0..=1.0).contains(&aggregated.confidence));
        prop_assert!((0.0..=1.0).contains(&aggregated.trend.strength));
        prop_assert_eq!(aggregated.data_points, points.len());
    }

    #[test]
    fn recency_never_increases_with_age(
        decay in 0.0f64..10.0,
        younger in 0.0f64..500.0,
        extra in 0.0f64..500.0,
    ) {
        let aggregator = SentimentAggregator::new(AggregatorConfig {
            recency_decay: decay,
            ..Default::default()
        }).unwrap();

        let young = aggregator.recency_multiplier(younger);
        let old = aggregator.recency_multiplier(younger + extra);
        prop_assert!(old <= young);
        prop_assert!(young <= 1.0 && old >= 0.0);
    }

    #[test]
    fn fear_greed_stays_in_range(
        weights in arb_weights(),
        sentiment_score in -1_000.0f64..1_000.0,
        social_volume in -10.0f64..1e9,
        price_volatility in -1.0f64..5.0,
        price_momentum in -500.0f64..500.0,
    ) {
        let composer = FearGreedComposer::new(FearGreedConfig {
            weights,
            ..Default::default()
        }).unwrap();
        let inputs = FearGreedInputs { sentiment_score, social_volume, price_volatility, price_momentum };

        let index = composer.calculate(&inputs, as_of());
        prop_assert!((0.0..=100.0).contains(&index.value));
    }

    #[test]
    fn pearson_of_series_with_itself_is_one(
        values in prop::collection::vec(-1e3f64..1e3, 3..60)
    ) {
        let spread = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max)
            - values.iter().cloned().fold(f64::INFINITY, f64::min);
        prop_assume!(spread > 1e-6);

        prop_assert!((pearson(&values, &values) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn pearson_and_p_value_are_bounded(
        pairs in prop::collection::vec((-1e3f64..1e3, -1e3f64..1e3), 0..60)
    ) {
        let (x, y): (Vec<f64>, Vec<f64>) = pairs.into_iter().unzip();
        let r = pearson(&x, &y);
        let p = correlation_p_value(r, x.len());

        prop_assert!((-1.0..=1.0).contains(&r));
        prop_assert!((0.0..=1.0).contains(&p));
    }

    #[test]
    fn signal_confidence_is_capped(total in -5.0f64..5.0) {
        let confidence = confidence_for(total);
        prop_assert!(confidence >= 0.5 && confidence <= MAX_CONFIDENCE);
    }
}
