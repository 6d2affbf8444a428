//! Poll/supervise loop
//!
//! Two phases: grid initialization runs exactly once and is fatal on
//! failure; after that the loop polls forever, isolating each tick.
//! A failed tick is logged and followed by the shortened backoff sleep
//! instead of the normal poll interval, so a single bad tick never brings
//! the process down. Ctrl-C is the only orderly exit.

use anyhow::{Context, Result};
use tokio::time::sleep;
use tracing::{error, info, warn};

use crate::config::Config;
use crate::gateway::{self, Gateway};
use crate::strategy::GridStrategy;

pub async fn run(config: Config) -> Result<()> {
    config.validate().context("Invalid configuration")?;

    let gateway = gateway::create(&config.exchange, &config.strategy.symbol)
        .context("Failed to create exchange gateway")?;

    info!(
        venue = %config.exchange.venue,
        symbol = %config.strategy.symbol,
        testnet = config.exchange.testnet,
        grid_levels = config.strategy.grid_levels,
        grid_spacing = config.strategy.grid_spacing,
        investment_usd = config.strategy.investment_usd,
        dca_enabled = config.strategy.dca_enabled,
        dca_multiplier = config.strategy.dca_multiplier,
        poll_interval_secs = config.runtime.poll_interval_secs,
        "Starting grid strategy"
    );
    if !config.exchange.testnet {
        warn!("Production trading environment selected - real funds at risk");
    }

    run_with_gateway(gateway.as_ref(), config).await
}

/// Loop body, split from [`run`] so tests can drive it with an in-memory
/// gateway.
pub async fn run_with_gateway(gateway: &dyn Gateway, config: Config) -> Result<()> {
    let mut strategy = GridStrategy::initialize(gateway, config.strategy.clone())
        .await
        .context("Grid initialization failed")?;

    let poll_interval = config.runtime.poll_interval();
    let error_backoff = config.runtime.error_backoff();

    info!("Entering polling loop");

    loop {
        let delay = match strategy.poll_tick(gateway).await {
            Ok(()) => poll_interval,
            Err(e) => {
                error!(error = %e, "Tick failed, retrying after backoff");
                error_backoff
            }
        };

        tokio::select! {
            _ = sleep(delay) => {}
            _ = tokio::signal::ctrl_c() => {
                info!(
                    dca_count = strategy.dca_count(),
                    "Received Ctrl+C, shutting down"
                );
                return Ok(());
            }
        }
    }
}
