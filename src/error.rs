//! Error taxonomy for the bot
//!
//! Two families: `ConfigError` is validated eagerly and always fatal;
//! `GatewayError` is fatal during grid setup and transient during a
//! polling tick (the runner logs it and retries after a short backoff).

use thiserror::Error;

/// Failures surfaced by an exchange gateway
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("connectivity: {0}")]
    Connectivity(String),

    #[error("malformed venue response: {0}")]
    Data(String),

    #[error("order rejected: {0}")]
    OrderRejected(String),

    #[error("insufficient funds")]
    InsufficientFunds,
}

impl From<reqwest::Error> for GatewayError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            GatewayError::Data(e.to_string())
        } else {
            GatewayError::Connectivity(e.to_string())
        }
    }
}

/// Invalid strategy or exchange parameters, rejected before any
/// network call is made.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("grid_levels must be >= 1, got {0}")]
    InvalidGridLevels(usize),

    #[error("grid_spacing must be > 0, got {0}")]
    InvalidGridSpacing(f64),

    #[error("investment_usd must be > 0, got {0}")]
    InvalidInvestment(f64),

    #[error(
        "grid_spacing ({spacing}) x grid_levels ({levels}) must be < 1, \
         otherwise the deepest buy level has a non-positive price"
    )]
    GridTooWide { spacing: f64, levels: usize },

    #[error("dca_multiplier must be >= 1, got {0}")]
    InvalidDcaMultiplier(f64),

    #[error("poll_interval_secs must be > 0")]
    InvalidPollInterval,

    #[error("error_backoff_secs must be > 0 and < poll_interval_secs")]
    InvalidErrorBackoff,

    #[error("trading symbol must not be empty")]
    EmptySymbol,

    #[error("unknown exchange '{0}' (expected one of: binance, okx)")]
    UnknownExchange(String),

    #[error("missing API credentials for {0}")]
    MissingCredentials(String),
}
