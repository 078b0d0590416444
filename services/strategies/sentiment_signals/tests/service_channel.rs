//! Request/event channel behavior of the sentiment service

use chrono::{Duration, TimeZone, Utc};
use sentiment_config::{AggregatorConfig, EngineConfig};
use sentiment_signals::{EngineEvent, EngineRequest, NewsItem, SentimentEngine, SentimentService};
use tokio::sync::mpsc;

fn engine() -> SentimentEngine {
    SentimentEngine::new(EngineConfig {
        aggregator: AggregatorConfig {
            min_data_points: 2,
            ..Default::default()
        },
        ..Default::default()
    })
    .unwrap()
}

#[tokio::test]
async fn test_requests_produce_events_in_order() {
    let (tx, rx) = mpsc::channel(16);
    let service = SentimentService::new(engine(), rx);
    let mut events = service.subscribe();
    let handle = tokio::spawn(service.run());

    let as_of = Utc.with_ymd_and_hms(2024, 12, 1, 0, 0, 0).unwrap();
    let headline = |score: f64, hours_ago: i64| NewsItem {
        source: "theblock".to_string(),
        published_at: as_of - Duration::hours(hours_ago),
        sentiment_score: Some(score),
        sentiment_magnitude: Some(0.5),
        votes: None,
        is_important: Some(true),
        is_trending: None,
        symbols: vec!["ETH".to_string()],
    };

    tx.send(EngineRequest::Aggregate {
        symbol: "ETH".to_string(),
        as_of: Some(as_of),
    })
    .await
    .unwrap();
    tx.send(EngineRequest::Ingest {
        news: vec![headline(40.0, 1), headline(60.0, 2)],
        social: Vec::new(),
    })
    .await
    .unwrap();
    tx.send(EngineRequest::Aggregate {
        symbol: "eth".to_string(),
        as_of: Some(as_of),
    })
    .await
    .unwrap();
    tx.send(EngineRequest::Metrics).await.unwrap();
    drop(tx);

    assert_eq!(
        events.recv().await.unwrap(),
        EngineEvent::Quiet {
            symbol: "ETH".to_string()
        }
    );
    assert_eq!(
        events.recv().await.unwrap(),
        EngineEvent::Ingested {
            accepted: 2,
            dropped: 0,
            retained: 2
        }
    );
    match events.recv().await.unwrap() {
        EngineEvent::Aggregated { sentiment } => {
            assert_eq!(sentiment.symbol, "ETH");
            assert_eq!(sentiment.data_points, 2);
            assert!(sentiment.score > 40.0 && sentiment.score < 60.0);
        }
        other => panic!("expected aggregate, got {other:?}"),
    }
    match events.recv().await.unwrap() {
        EngineEvent::Metrics { metrics } => {
            assert_eq!(metrics.requests, 4);
            assert_eq!(metrics.aggregations, 1);
            assert_eq!(metrics.quiet_windows, 1);
        }
        other => panic!("expected metrics, got {other:?}"),
    }

    handle.await.unwrap().unwrap();
}

#[tokio::test]
async fn test_service_stops_when_senders_drop() {
    let (tx, rx) = mpsc::channel::<EngineRequest>(1);
    let service = SentimentService::new(engine(), rx);
    let mut events = service.subscribe();
    drop(tx);

    service.run().await.unwrap();
    assert!(events.recv().await.is_err());
}

#[tokio::test]
async fn test_event_stream_delivers_every_event_to_a_slow_reader() {
    let requests = 400;
    let (tx, rx) = mpsc::channel(512);
    let mut service = SentimentService::new(engine(), rx);
    let mut stream = service.event_stream();
    let handle = tokio::spawn(service.run());

    // More requests than the event buffer holds, all queued before reading
    for _ in 0..requests {
        tx.send(EngineRequest::Metrics).await.unwrap();
    }
    drop(tx);

    let mut received = Vec::new();
    while let Some(event) = stream.recv().await {
        received.push(event);
    }
    handle.await.unwrap().unwrap();

    assert_eq!(received.len(), requests);
    match received.last().unwrap() {
        EngineEvent::Metrics { metrics } => assert_eq!(metrics.requests, requests as u64),
        other => panic!("expected metrics, got {other:?}"),
    }
}

#[tokio::test]
async fn test_observers_and_stream_see_the_same_events() {
    let (tx, rx) = mpsc::channel(4);
    let mut service = SentimentService::new(engine(), rx);
    let mut stream = service.event_stream();
    let mut observer = service.subscribe();
    let handle = tokio::spawn(service.run());

    tx.send(EngineRequest::Aggregate {
        symbol: "SOL".to_string(),
        as_of: None,
    })
    .await
    .unwrap();
    drop(tx);

    let expected = EngineEvent::Quiet {
        symbol: "SOL".to_string(),
    };
    assert_eq!(stream.recv().await.unwrap(), expected);
    assert_eq!(observer.recv().await.unwrap(), expected);
    assert!(stream.recv().await.is_none());
    handle.await.unwrap().unwrap();
}

#[test]
fn test_events_serialize_with_type_tag() {
    let event = EngineEvent::Quiet {
        symbol: "BTC".to_string(),
    };
    let json = serde_json::to_value(&event).unwrap();
    assert_eq!(json["type"], "quiet");
    assert_eq!(json["symbol"], "BTC");
}
