//! Sentiment Signals Service Main Entry Point
//!
//! Reads one JSON [`EngineRequest`] per line on stdin and writes one JSON
//! [`EngineEvent`] per line on stdout. Logs go to stderr.

use anyhow::{Context, Result};
use sentiment_config::{load_config_file, resolve_config_path, EngineConfig};
use sentiment_signals::logging::init_logging;
use sentiment_signals::{EngineEvent, EngineRequest, SentimentEngine, SentimentService};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::signal;
use tokio::sync::mpsc;
use tracing::{error, info, warn};

const REQUEST_CHANNEL_CAPACITY: usize = 1024;

#[tokio::main]
async fn main() -> Result<()> {
    init_logging("sentiment_signals_service")?;

    info!("Starting Sentiment Signals Service");

    let config = load_config().context("Failed to load sentiment engine configuration")?;
    info!(
        window_hours = config.aggregator.time_window_hours,
        timeframes = config.correlation.timeframes.len(),
        sources = config.sources.len(),
        "Configuration loaded"
    );

    let engine = SentimentEngine::new(config).context("Invalid sentiment engine configuration")?;
    let (request_tx, request_rx) = mpsc::channel(REQUEST_CHANNEL_CAPACITY);
    let mut service = SentimentService::new(engine, request_rx);
    let events = service.event_stream();

    let writer_handle = tokio::spawn(write_events(events));
    let service_handle = tokio::spawn(async move {
        if let Err(e) = service.run().await {
            error!("Sentiment service failed: {:?}", e);
        }
    });

    info!("Sentiment Signals Service running. Reading requests from stdin, Ctrl+C to stop.");

    tokio::select! {
        result = read_requests(request_tx) => {
            result.context("Failed reading requests from stdin")?;
            info!("Input closed, draining pending requests");
            service_handle.await.context("Sentiment service task panicked")?;
            writer_handle.await.context("Event writer task panicked")??;
        }
        result = signal::ctrl_c() => {
            result.context("Failed to listen for shutdown signal")?;
            info!("Shutting down Sentiment Signals Service");
            service_handle.abort();
            writer_handle.abort();
        }
    }

    Ok(())
}

fn load_config() -> Result<EngineConfig> {
    let config_path = resolve_config_path("SENTIMENT_CONFIG_PATH", "configs/sentiment.toml");
    load_config_file(&config_path)
}

/// Forward stdin lines to the service; returns when stdin closes
async fn read_requests(requests: mpsc::Sender<EngineRequest>) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match serde_json::from_str::<EngineRequest>(line) {
            Ok(request) => {
                if requests.send(request).await.is_err() {
                    warn!("Sentiment service stopped accepting requests");
                    break;
                }
            }
            Err(e) => warn!(error = %e, "Ignoring malformed request line"),
        }
    }

    Ok(())
}

/// Print every event as a JSON line until the service shuts down
async fn write_events(mut events: mpsc::Receiver<EngineEvent>) -> Result<()> {
    let mut stdout = tokio::io::stdout();

    while let Some(event) = events.recv().await {
        let mut line = serde_json::to_vec(&event).context("Failed to encode event")?;
        line.push(b'\n');
        stdout.write_all(&line).await?;
        stdout.flush().await?;
    }

    Ok(())
}
