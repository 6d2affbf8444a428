//! Grid construction
//!
//! Plans a symmetric ladder of `2 × grid_levels` orders around the
//! reference price and submits it through the gateway. Planning is pure
//! arithmetic and separated from submission so the ladder invariants can
//! be tested without a venue.

use tracing::info;

use crate::config::StrategyConfig;
use crate::error::GatewayError;
use crate::gateway::Gateway;
use crate::types::{GridLevel, GridPlan, Side};

/// Quote amount spread over one grid order, in base-asset units.
///
/// The whole investment is split evenly over both legs of the ladder.
pub fn amount_per_grid(config: &StrategyConfig, base_price: f64) -> f64 {
    config.investment_usd / (config.grid_levels as f64 * 2.0) / base_price
}

/// Plan the ladder: for `i = 1..=grid_levels`, one buy at
/// `base × (1 − spacing·i)` and one sell at `base × (1 + spacing·i)`,
/// every level carrying the same quantity. Buy legs first, both legs
/// ordered by increasing distance from the base price.
pub fn plan_levels(config: &StrategyConfig, base_price: f64) -> Vec<GridLevel> {
    let quantity = amount_per_grid(config, base_price);
    let mut levels = Vec::with_capacity(config.grid_levels * 2);

    for i in 1..=config.grid_levels {
        levels.push(GridLevel {
            side: Side::Buy,
            price: base_price * (1.0 - config.grid_spacing * i as f64),
            quantity,
        });
    }
    for i in 1..=config.grid_levels {
        levels.push(GridLevel {
            side: Side::Sell,
            price: base_price * (1.0 + config.grid_spacing * i as f64),
            quantity,
        });
    }

    levels
}

/// Sample the reference price once and submit the full ladder.
///
/// Stock behavior submits every leg as a market-style order at the
/// venue's current price; the planned ladder price is recorded for
/// bookkeeping only. With `resting_limit_orders` each leg instead rests
/// as a limit at its planned price. The first submission failure
/// propagates: grid setup is all-or-nothing from the caller's view.
pub async fn initialize(
    gateway: &dyn Gateway,
    config: &StrategyConfig,
) -> Result<GridPlan, GatewayError> {
    let base_price = gateway.current_price().await?;
    info!(symbol = %config.symbol, base_price, "Reference price sampled");

    let levels = plan_levels(config, base_price);
    for level in &levels {
        let limit_price = config.resting_limit_orders.then_some(level.price);
        gateway
            .submit_order(level.side, level.quantity, limit_price)
            .await?;
    }

    info!(
        symbol = %config.symbol,
        levels = levels.len(),
        per_side = config.grid_levels,
        quantity = amount_per_grid(config, base_price),
        "Grid initialized"
    );

    Ok(GridPlan { base_price, levels })
}
