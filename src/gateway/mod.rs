//! Exchange gateway abstraction
//!
//! The strategy engine talks to exactly two venue capabilities: a spot
//! price read and an order submission. Each supported venue implements
//! the [`Gateway`] trait; the engine never branches on venue identity.

pub mod binance;
pub mod okx;

pub use binance::BinanceGateway;
pub use okx::OkxGateway;

use async_trait::async_trait;

use crate::config::ExchangeConfig;
use crate::error::{ConfigError, GatewayError};
use crate::types::{OrderAck, Side};

/// Venue capability set the strategy engine depends on.
///
/// No per-call timeout is applied beyond the HTTP client's own; a hung
/// venue blocks the polling loop until the client times out.
#[async_trait]
pub trait Gateway: Send + Sync {
    /// Latest traded/mark price for the configured symbol
    async fn current_price(&self) -> Result<f64, GatewayError>;

    /// Submit an order for `quantity` of the base asset.
    ///
    /// `limit_price: None` sends a market-style order at the venue's
    /// current price; `Some(px)` rests a limit at `px`.
    async fn submit_order(
        &self,
        side: Side,
        quantity: f64,
        limit_price: Option<f64>,
    ) -> Result<OrderAck, GatewayError>;
}

/// Build the gateway selected by the exchange section of the config,
/// bound to a single trading symbol.
///
/// Assumes `config.validate()` already passed, so credentials are present.
pub fn create(config: &ExchangeConfig, symbol: &str) -> Result<Box<dyn Gateway>, ConfigError> {
    let api_key = config.api_key.clone().unwrap_or_default();
    let api_secret = config.api_secret.clone().unwrap_or_default();

    match config.venue.as_str() {
        "binance" => Ok(Box::new(BinanceGateway::new(
            symbol,
            api_key,
            api_secret,
            config.testnet,
        ))),
        "okx" => Ok(Box::new(OkxGateway::new(
            symbol,
            api_key,
            api_secret,
            config.api_passphrase.clone().unwrap_or_default(),
            config.testnet,
        ))),
        other => Err(ConfigError::UnknownExchange(other.to_string())),
    }
}
