//! Core data types used across the trading system

use serde::{Deserialize, Serialize};

/// Trade direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Buy => "buy",
            Side::Sell => "sell",
        }
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One planned ladder order at a fixed offset from the reference price.
///
/// Levels are immutable once planned and kept for bookkeeping only; the
/// engine does not reconcile them against fills.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridLevel {
    pub side: Side,
    /// Computed ladder price for this level
    pub price: f64,
    /// Base-asset quantity, constant across the whole ladder
    pub quantity: f64,
}

/// The initialized ladder: reference price plus all planned levels,
/// buy legs first, each leg ordered by increasing distance from the base.
#[derive(Debug, Clone)]
pub struct GridPlan {
    pub base_price: f64,
    pub levels: Vec<GridLevel>,
}

impl GridPlan {
    pub fn buy_levels(&self) -> impl Iterator<Item = &GridLevel> {
        self.levels.iter().filter(|l| l.side == Side::Buy)
    }

    pub fn sell_levels(&self) -> impl Iterator<Item = &GridLevel> {
        self.levels.iter().filter(|l| l.side == Side::Sell)
    }
}

/// Venue acknowledgement for a submitted order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderAck {
    pub order_id: String,
}

impl OrderAck {
    pub fn new(order_id: impl Into<String>) -> Self {
        OrderAck {
            order_id: order_id.into(),
        }
    }
}
