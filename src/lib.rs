//! CoinPilot - grid trading with drawdown-triggered DCA
//!
//! Places a symmetric ladder of buy/sell orders around a reference price
//! sampled at startup, then polls the market and buys additional
//! tranches when price crosses geometric drawdown tiers (15%, 27.75%,
//! 38.59%... below the reference).
//!
//! The strategy engine depends only on the [`gateway::Gateway`] trait;
//! Binance spot and OKX v5 are the built-in venues, each selectable into
//! its production or test environment.
//!
//! # Example
//! ```no_run
//! use coinpilot::{runner, Config};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::from_file("configs/btc_grid.json")?;
//!     runner::run(config).await
//! }
//! ```
//!
//! Known limitation: no per-call timeout is applied to gateway calls
//! beyond the HTTP client's own, so a hung venue blocks the polling loop
//! for up to that timeout.

pub mod config;
pub mod error;
pub mod gateway;
pub mod runner;
pub mod strategy;
pub mod types;

pub use config::{Config, ExchangeConfig, RuntimeConfig, StrategyConfig};
pub use error::{ConfigError, GatewayError};
pub use gateway::Gateway;
pub use strategy::{DcaState, GridStrategy};
pub use types::*;
