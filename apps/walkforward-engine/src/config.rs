//! Configuration loading for the walk-forward binary.
//!
//! Provides YAML loading, validation, and environment variable
//! interpolation. The library itself never reads configuration; the binary
//! loads it here and passes the sections to the engine explicitly.
//!
//! # Usage
//!
//! ```rust,ignore
//! use walkforward_engine::config::load_config;
//!
//! // Load from default path (config.yaml)
//! let config = load_config(None)?;
//!
//! // Load from custom path
//! let config = load_config(Some("runs/sma.yaml"))?;
//!
//! println!("strategy: {}", config.strategy.name);
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::backtest::{
    BacktestConfig, MetricsConfig, ParallelConfig, ParameterSpace, WalkForwardConfig, registry,
};

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read configuration file.
    #[error("Failed to read config file '{path}': {source}")]
    ReadError {
        /// Path to the config file.
        path: String,
        /// The underlying IO error.
        source: std::io::Error,
    },

    /// Failed to parse YAML configuration.
    #[error("Failed to parse config YAML: {0}")]
    ParseError(#[from] serde_yaml_bw::Error),

    /// Configuration validation failed.
    #[error("Config validation failed: {0}")]
    ValidationError(String),
}

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Simulation settings.
    #[serde(default)]
    pub backtest: BacktestConfig,
    /// Metric settings.
    #[serde(default)]
    pub metrics: MetricsConfig,
    /// Window layout and selection.
    #[serde(default)]
    pub walk_forward: WalkForwardConfig,
    /// Grid executor settings.
    #[serde(default)]
    pub parallel: ParallelConfig,
    /// Strategy to optimize.
    pub strategy: StrategyConfig,
    /// Run control.
    #[serde(default)]
    pub run: RunConfig,
}

/// Strategy selection and its parameter space.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrategyConfig {
    /// Registry name of the strategy.
    pub name: String,
    /// Candidate values per parameter.
    #[serde(default)]
    pub parameters: ParameterSpace,
}

/// Run control settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunConfig {
    /// Wall-clock limit for the optimization, in seconds.
    #[serde(default)]
    pub deadline_secs: Option<u64>,
}

impl RunConfig {
    /// Deadline as a duration, if configured.
    #[must_use]
    pub fn deadline(&self) -> Option<Duration> {
        self.deadline_secs.map(Duration::from_secs)
    }
}

/// Load configuration from a YAML file.
///
/// # Errors
///
/// Returns a `ConfigError` if the file cannot be read, parsed or validated.
pub fn load_config(path: Option<&str>) -> Result<AppConfig, ConfigError> {
    let path = path.unwrap_or("config.yaml");

    let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
        path: path.to_string(),
        source: e,
    })?;

    load_config_from_string(&contents)
}

/// Load configuration from a YAML string.
///
/// # Errors
///
/// Returns a `ConfigError` if the YAML cannot be parsed or validated.
pub fn load_config_from_string(yaml: &str) -> Result<AppConfig, ConfigError> {
    let interpolated = interpolate_env_vars(yaml);
    let config: AppConfig = serde_yaml_bw::from_str(&interpolated)?;
    validate_config(&config)?;
    Ok(config)
}

/// Interpolate environment variables in a string.
///
/// Supports both `${VAR}` and `${VAR:-default}` syntax.
#[allow(clippy::expect_used)] // Regex is compile-time constant
fn interpolate_env_vars(input: &str) -> String {
    use std::sync::OnceLock;

    static ENV_VAR_REGEX: OnceLock<regex::Regex> = OnceLock::new();

    let re = ENV_VAR_REGEX.get_or_init(|| {
        regex::Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)(?::-([^}]*))?\}")
            .expect("env var regex is valid")
    });

    re.replace_all(input, |cap: &regex::Captures<'_>| {
        let default_value = cap.get(2).map_or("", |m| m.as_str());
        match std::env::var(&cap[1]) {
            Ok(v) if !v.is_empty() => v,
            _ => default_value.to_string(),
        }
    })
    .into_owned()
}

/// Validate configuration values.
fn validate_config(config: &AppConfig) -> Result<(), ConfigError> {
    config
        .backtest
        .validate()
        .map_err(|e| ConfigError::ValidationError(format!("backtest: {e}")))?;

    config
        .walk_forward
        .validate()
        .map_err(|e| ConfigError::ValidationError(format!("walk_forward: {e}")))?;

    config
        .metrics
        .validate()
        .map_err(|e| ConfigError::ValidationError(format!("metrics: {e}")))?;

    if registry::by_name(&config.strategy.name).is_none() {
        return Err(ConfigError::ValidationError(format!(
            "unknown strategy '{}', expected one of: {}",
            config.strategy.name,
            registry::STRATEGY_NAMES.join(", ")
        )));
    }

    config
        .strategy
        .parameters
        .grid()
        .map_err(|e| ConfigError::ValidationError(format!("strategy.parameters: {e}")))?;

    if config.run.deadline_secs == Some(0) {
        return Err(ConfigError::ValidationError(
            "run.deadline_secs must be positive".to_string(),
        ));
    }

    Ok(())
}
