//! Drawdown-triggered DCA tiers
//!
//! Tiers are geometric: tier `n` sits at `base_price × 0.85^n`, i.e. 15%,
//! 27.75%, 38.59%… below the reference price. Each tier fires at most
//! once, and only the next tier is ever checked: a gap down through
//! several tiers still fires them one tick at a time.

use crate::config::StrategyConfig;

/// Drawdown ratio per tier: tier n arms at `base × TRIGGER_RATIO^n`
pub const TRIGGER_RATIO: f64 = 0.85;

/// Fixed divisor applied to every DCA tranche. Keeps add-on buys small
/// relative to the initial grid; intentional sizing, not a scale factor
/// that grows with the tier.
pub const SIZE_DIVISOR: f64 = 100.0;

/// Count of DCA tiers fired so far. The only long-lived mutable state in
/// the engine; the counter only ever increases, and only after a
/// successful order submission.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DcaState {
    dca_count: u32,
}

impl DcaState {
    pub fn new() -> Self {
        DcaState::default()
    }

    pub fn count(&self) -> u32 {
        self.dca_count
    }

    /// Record a successfully submitted tranche. Call only after the
    /// gateway acknowledged the order, so a failed submission leaves the
    /// tier eligible to retry on the next tick.
    pub fn record_fill(&mut self) {
        self.dca_count += 1;
    }
}

/// A tranche the engine should buy right now
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DcaOrder {
    /// 1-based tier index this tranche corresponds to
    pub tier: u32,
    /// Base-asset quantity to buy at the current price
    pub quantity: f64,
}

/// Decide whether the current price crosses the next unfired tier.
///
/// Armed only while DCA is enabled and price sits below
/// `base × 0.85`. Fires on the first event unconditionally once armed,
/// afterwards only when price drops below `base × 0.85^(count + 1)`.
/// Pure: never touches the state.
pub fn evaluate(
    current_price: f64,
    base_price: f64,
    state: &DcaState,
    config: &StrategyConfig,
) -> Option<DcaOrder> {
    if !config.dca_enabled || current_price >= base_price * TRIGGER_RATIO {
        return None;
    }

    let next_tier = state.dca_count + 1;
    let crossed = state.dca_count == 0
        || current_price < base_price * TRIGGER_RATIO.powi(next_tier as i32);
    if !crossed {
        return None;
    }

    let quantity = config.investment_usd * config.dca_multiplier.powi(state.dca_count as i32)
        / current_price
        / SIZE_DIVISOR;

    Some(DcaOrder {
        tier: next_tier,
        quantity,
    })
}
