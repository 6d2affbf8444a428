//! Grid strategy engine
//!
//! [`GridStrategy`] is constructed by initializing the grid, so a value
//! of this type is always past its setup phase; the engine never
//! re-initializes. After construction the runner drives it one
//! [`poll_tick`](GridStrategy::poll_tick) at a time.

pub mod dca;
pub mod grid;

pub use dca::{DcaOrder, DcaState};

use tracing::info;

use crate::config::StrategyConfig;
use crate::error::GatewayError;
use crate::gateway::Gateway;
use crate::types::{GridPlan, Side};

pub struct GridStrategy {
    config: StrategyConfig,
    plan: GridPlan,
    dca: DcaState,
}

impl GridStrategy {
    /// Sample the reference price, submit the full ladder, and return the
    /// armed engine. Any gateway failure here propagates: setup is fatal,
    /// the strategy must not start on a partial grid.
    pub async fn initialize(
        gateway: &dyn Gateway,
        config: StrategyConfig,
    ) -> Result<Self, GatewayError> {
        let plan = grid::initialize(gateway, &config).await?;
        Ok(GridStrategy {
            config,
            plan,
            dca: DcaState::new(),
        })
    }

    /// One polling tick: read price, log it, evaluate the DCA ladder and
    /// submit a tranche if a new tier was crossed.
    ///
    /// The DCA counter advances only after the venue acknowledged the
    /// order, so a failed tick leaves the tier eligible for the next one.
    pub async fn poll_tick(&mut self, gateway: &dyn Gateway) -> Result<(), GatewayError> {
        let current_price = gateway.current_price().await?;
        info!(
            symbol = %self.config.symbol,
            price = format!("{:.2}", current_price),
            "Tick"
        );

        if let Some(order) = dca::evaluate(current_price, self.plan.base_price, &self.dca, &self.config)
        {
            gateway.submit_order(Side::Buy, order.quantity, None).await?;
            self.dca.record_fill();
            info!(
                symbol = %self.config.symbol,
                tier = order.tier,
                amount = format!("{:.4}", order.quantity),
                price = format!("{:.2}", current_price),
                "DCA tranche filled"
            );
        }

        Ok(())
    }

    /// Reference price sampled at grid initialization; fixed for the run.
    pub fn base_price(&self) -> f64 {
        self.plan.base_price
    }

    /// The planned ladder, kept for bookkeeping
    pub fn plan(&self) -> &GridPlan {
        &self.plan
    }

    /// Number of DCA tiers fired so far
    pub fn dca_count(&self) -> u32 {
        self.dca.count()
    }
}
