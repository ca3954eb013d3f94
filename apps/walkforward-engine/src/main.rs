//! Walk-forward Engine Binary
//!
//! Runs one walk-forward optimization and prints the report as JSON.
//!
//! # Usage
//!
//! ```bash
//! WALKFORWARD_SERIES=bars.json cargo run --bin walkforward-engine
//! ```
//!
//! # Environment Variables
//!
//! ## Required
//! - `WALKFORWARD_SERIES`: path to a JSON array of bars
//!   (`timestamp`, `open`, `high`, `low`, `close`, optional `volume`)
//!
//! ## Optional
//! - `WALKFORWARD_CONFIG`: YAML config path (default: config.yaml)
//! - `RUST_LOG`: Log level (default: info)

use std::time::Instant;

use anyhow::{Context, Result, bail};
use tokio::signal;
use tokio_util::sync::CancellationToken;
use walkforward_engine::backtest::{
    Bar, Cancellation, PriceSeries, WalkForwardEngine, WalkForwardReport, registry,
};
use walkforward_engine::config::{AppConfig, load_config};
use walkforward_engine::telemetry::init_tracing;

/// Default config path when `WALKFORWARD_CONFIG` is unset.
const DEFAULT_CONFIG_PATH: &str = "config.yaml";

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let config_path =
        std::env::var("WALKFORWARD_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    let config = load_config(Some(&config_path))
        .with_context(|| format!("loading configuration from {config_path}"))?;

    let series_path = std::env::var("WALKFORWARD_SERIES")
        .context("WALKFORWARD_SERIES must point to a JSON bar file")?;
    let series = load_series(&series_path)?;

    tracing::info!(
        config = %config_path,
        series = %series_path,
        bars = series.len(),
        start = %series.start(),
        end = %series.end(),
        strategy = %config.strategy.name,
        "Starting walk-forward run"
    );

    let token = CancellationToken::new();
    let mut cancel = Cancellation::none().with_token(token.clone());
    if let Some(deadline) = config.run.deadline() {
        cancel = cancel.with_timeout(deadline);
    }

    let signal_token = token.clone();
    tokio::spawn(async move {
        if signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, stopping after the current candidates");
            signal_token.cancel();
        }
    });

    let started = Instant::now();
    let report = tokio::task::spawn_blocking(move || run(&config, &series, &cancel))
        .await
        .context("optimization task panicked")??;

    tracing::info!(
        elapsed_ms = started.elapsed().as_millis() as u64,
        windows = report.windows.len(),
        cancelled = report.cancelled,
        "Walk-forward run finished"
    );

    let json = serde_json::to_string_pretty(&report).context("serializing report")?;
    println!("{json}");

    Ok(())
}

/// Read and validate the bar file.
fn load_series(path: &str) -> Result<PriceSeries> {
    let contents =
        std::fs::read_to_string(path).with_context(|| format!("reading series from {path}"))?;
    let bars: Vec<Bar> =
        serde_json::from_str(&contents).with_context(|| format!("parsing bars in {path}"))?;
    let series = PriceSeries::new(bars).with_context(|| format!("validating bars in {path}"))?;
    Ok(series)
}

/// Resolve the strategy and run the optimization.
fn run(config: &AppConfig, series: &PriceSeries, cancel: &Cancellation) -> Result<WalkForwardReport> {
    let Some(strategy) = registry::by_name(&config.strategy.name) else {
        bail!("unknown strategy '{}'", config.strategy.name);
    };

    let engine = WalkForwardEngine::new(
        config.walk_forward.clone(),
        config.backtest.clone(),
        config.metrics,
        config.parallel.clone(),
    );

    let report = engine.optimize(series, strategy.as_ref(), &config.strategy.parameters, cancel)?;
    Ok(report)
}
