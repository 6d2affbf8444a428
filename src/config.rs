//! Configuration management
//!
//! Handles loading and parsing of JSON configuration files with environment
//! variable support for API credentials. All parameters are validated
//! eagerly, before the gateway is ever constructed.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::error::ConfigError;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub exchange: ExchangeConfig,
    pub strategy: StrategyConfig,
    #[serde(default)]
    pub runtime: RuntimeConfig,
}

impl Config {
    /// Load configuration from JSON file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let contents = fs::read_to_string(path.as_ref()).context("Failed to read config file")?;
        let mut config: Config =
            serde_json::from_str(&contents).context("Failed to parse config JSON")?;

        // Load API credentials from environment if not set
        if let Ok(api_key) = std::env::var("COINPILOT_API_KEY") {
            config.exchange.api_key = Some(api_key);
        }
        if let Ok(api_secret) = std::env::var("COINPILOT_API_SECRET") {
            config.exchange.api_secret = Some(api_secret);
        }
        if let Ok(passphrase) = std::env::var("COINPILOT_API_PASSPHRASE") {
            config.exchange.api_passphrase = Some(passphrase);
        }

        Ok(config)
    }

    /// Validate every parameter. Called once at startup; any error here is
    /// fatal and the strategy must not start.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.strategy.validate()?;
        self.runtime.validate()?;
        self.exchange.validate()
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            exchange: ExchangeConfig::default(),
            strategy: StrategyConfig::default(),
            runtime: RuntimeConfig::default(),
        }
    }
}

/// Exchange connectivity configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExchangeConfig {
    /// Venue selector: "binance" or "okx"
    pub venue: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_secret: Option<String>,
    /// Required by OKX only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_passphrase: Option<String>,
    /// Route to the venue's test/demo environment instead of production
    #[serde(default)]
    pub testnet: bool,
}

impl ExchangeConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        match self.venue.as_str() {
            "binance" | "okx" => {}
            other => return Err(ConfigError::UnknownExchange(other.to_string())),
        }
        if self.api_key.as_deref().unwrap_or("").is_empty()
            || self.api_secret.as_deref().unwrap_or("").is_empty()
        {
            return Err(ConfigError::MissingCredentials(self.venue.clone()));
        }
        if self.venue == "okx" && self.api_passphrase.as_deref().unwrap_or("").is_empty() {
            return Err(ConfigError::MissingCredentials("okx passphrase".to_string()));
        }
        Ok(())
    }
}

impl Default for ExchangeConfig {
    fn default() -> Self {
        ExchangeConfig {
            venue: "binance".to_string(),
            api_key: None,
            api_secret: None,
            api_passphrase: None,
            testnet: false,
        }
    }
}

/// Grid and DCA strategy parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrategyConfig {
    /// Trading pair, venue format (e.g. "BTCUSDT" on Binance)
    pub symbol: String,

    /// Number of grid levels per side (default: 15)
    #[serde(default = "default_grid_levels")]
    pub grid_levels: usize,

    /// Grid spacing as a fraction of the base price (e.g. 0.008 = 0.8%)
    #[serde(default = "default_grid_spacing")]
    pub grid_spacing: f64,

    /// Total investment in quote currency
    #[serde(default = "default_investment")]
    pub investment_usd: f64,

    /// Enable drawdown-triggered DCA buys (default: true)
    #[serde(default = "default_true")]
    pub dca_enabled: bool,

    /// Martingale multiplier applied per DCA tier (default: 1.8)
    #[serde(default = "default_dca_multiplier")]
    pub dca_multiplier: f64,

    /// Submit ladder legs as resting limits at their computed prices
    /// instead of market-style orders at the current price.
    ///
    /// Off by default: the stock behavior sends every leg at the market
    /// price and records the ladder price for bookkeeping only.
    #[serde(default)]
    pub resting_limit_orders: bool,
}

fn default_grid_levels() -> usize {
    15
}

fn default_grid_spacing() -> f64 {
    0.008
}

fn default_investment() -> f64 {
    1000.0
}

fn default_dca_multiplier() -> f64 {
    1.8
}

fn default_true() -> bool {
    true
}

impl StrategyConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.symbol.trim().is_empty() {
            return Err(ConfigError::EmptySymbol);
        }
        if self.grid_levels < 1 {
            return Err(ConfigError::InvalidGridLevels(self.grid_levels));
        }
        if !(self.grid_spacing > 0.0) || !self.grid_spacing.is_finite() {
            return Err(ConfigError::InvalidGridSpacing(self.grid_spacing));
        }
        // The deepest buy sits at base x (1 - spacing x levels); keep it positive
        if self.grid_spacing * self.grid_levels as f64 >= 1.0 {
            return Err(ConfigError::GridTooWide {
                spacing: self.grid_spacing,
                levels: self.grid_levels,
            });
        }
        if !(self.investment_usd > 0.0) || !self.investment_usd.is_finite() {
            return Err(ConfigError::InvalidInvestment(self.investment_usd));
        }
        if !(self.dca_multiplier >= 1.0) || !self.dca_multiplier.is_finite() {
            return Err(ConfigError::InvalidDcaMultiplier(self.dca_multiplier));
        }
        Ok(())
    }
}

impl Default for StrategyConfig {
    fn default() -> Self {
        StrategyConfig {
            symbol: "BTCUSDT".to_string(),
            grid_levels: 15,
            grid_spacing: 0.008,
            investment_usd: 1000.0,
            dca_enabled: true,
            dca_multiplier: 1.8,
            resting_limit_orders: false,
        }
    }
}

/// Poll loop timing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuntimeConfig {
    /// Seconds between polling ticks (default: 30)
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,

    /// Shortened sleep after a failed tick (default: 10)
    #[serde(default = "default_error_backoff")]
    pub error_backoff_secs: u64,
}

fn default_poll_interval() -> u64 {
    30
}

fn default_error_backoff() -> u64 {
    10
}

impl RuntimeConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.poll_interval_secs == 0 {
            return Err(ConfigError::InvalidPollInterval);
        }
        if self.error_backoff_secs == 0 || self.error_backoff_secs >= self.poll_interval_secs {
            return Err(ConfigError::InvalidErrorBackoff);
        }
        Ok(())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    pub fn error_backoff(&self) -> Duration {
        Duration::from_secs(self.error_backoff_secs)
    }
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        RuntimeConfig {
            poll_interval_secs: 30,
            error_backoff_secs: 10,
        }
    }
}
