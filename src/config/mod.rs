//! Simulation configuration: the YAML knobs file and the JSON fixtures it
//! points at. Everything here is fatal at startup; nothing is retried.

mod fixtures;

pub use fixtures::{fetch_orders, fetch_shelves, validate_orders, validate_shelves};

use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

/// Load-time failures. All of these abort the run before the simulation
/// starts; the binary prints the chain and exits non-zero.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("unable to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("unable to parse simulation config yaml: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("unable to parse {what} json: {source}")]
    Json {
        what: &'static str,
        #[source]
        source: serde_json::Error,
    },
    #[error("unable to fetch orders from {url}: {source}")]
    Fetch {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("simulation config is not valid: {0}")]
    InvalidConfig(String),
    #[error("shelf definition is not valid: {0}")]
    InvalidShelf(String),
    #[error("order definition is not valid: {0}")]
    InvalidOrder(String),
}

/// Pacing and courier knobs for the produced orders.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct OrdersConfig {
    #[serde(rename = "orders-per-second")]
    pub orders_per_second: u32,
    #[serde(rename = "delivery-min-seconds")]
    pub delivery_min_seconds: f64,
    #[serde(rename = "delivery-max-seconds")]
    pub delivery_max_seconds: f64,
}

impl OrdersConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.orders_per_second < 1 {
            return Err(ConfigError::InvalidConfig(
                "orders-per-second has to be >= 1".to_string(),
            ));
        }
        if self.delivery_min_seconds < 0.0 {
            return Err(ConfigError::InvalidConfig(
                "delivery-min-seconds has to be >= 0".to_string(),
            ));
        }
        if self.delivery_max_seconds < self.delivery_min_seconds {
            return Err(ConfigError::InvalidConfig(
                "delivery-max-seconds has to be >= delivery-min-seconds".to_string(),
            ));
        }
        Ok(())
    }
}

/// Top-level simulation config file.
#[derive(Debug, Clone, Deserialize)]
pub struct SimulationConfig {
    #[serde(rename = "shelves-path")]
    pub shelves_path: String,
    #[serde(rename = "orders-path")]
    pub orders_path: String,
    #[serde(rename = "orders-config")]
    pub orders: OrdersConfig,
}

impl SimulationConfig {
    /// Read and parse the YAML config, then validate the order knobs.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        let config: SimulationConfig = serde_yaml::from_str(&raw)?;
        config.orders.validate()?;
        Ok(config)
    }
}
