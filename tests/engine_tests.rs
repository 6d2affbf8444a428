//! Integration tests for the grid/DCA engine
//!
//! These drive the real engine against an in-memory gateway with a
//! scripted price path, checking ladder invariants, tier firing order,
//! and tick-failure isolation.

use std::sync::Mutex;

use approx::assert_relative_eq;
use async_trait::async_trait;

use coinpilot::error::GatewayError;
use coinpilot::gateway::Gateway;
use coinpilot::strategy::GridStrategy;
use coinpilot::{OrderAck, Side, StrategyConfig};

/// Scripted in-memory venue: serves prices from a queue and records
/// every submitted order. Failures are injected per call.
struct MockGateway {
    prices: Mutex<Vec<f64>>,
    orders: Mutex<Vec<SubmittedOrder>>,
    fail_next_price: Mutex<bool>,
    fail_next_order: Mutex<bool>,
}

#[derive(Debug, Clone, PartialEq)]
struct SubmittedOrder {
    side: Side,
    quantity: f64,
    limit_price: Option<f64>,
}

impl MockGateway {
    fn new(prices: &[f64]) -> Self {
        let mut queue: Vec<f64> = prices.to_vec();
        queue.reverse();
        MockGateway {
            prices: Mutex::new(queue),
            orders: Mutex::new(Vec::new()),
            fail_next_price: Mutex::new(false),
            fail_next_order: Mutex::new(false),
        }
    }

    fn orders(&self) -> Vec<SubmittedOrder> {
        self.orders.lock().unwrap().clone()
    }

    fn fail_next_price(&self) {
        *self.fail_next_price.lock().unwrap() = true;
    }

    fn fail_next_order(&self) {
        *self.fail_next_order.lock().unwrap() = true;
    }
}

#[async_trait]
impl Gateway for MockGateway {
    async fn current_price(&self) -> Result<f64, GatewayError> {
        if std::mem::take(&mut *self.fail_next_price.lock().unwrap()) {
            return Err(GatewayError::Connectivity("venue unreachable".to_string()));
        }
        let mut prices = self.prices.lock().unwrap();
        match prices.len() {
            0 => Err(GatewayError::Data("price script exhausted".to_string())),
            // Last scripted price repeats forever
            1 => Ok(prices[0]),
            _ => Ok(prices.pop().unwrap()),
        }
    }

    async fn submit_order(
        &self,
        side: Side,
        quantity: f64,
        limit_price: Option<f64>,
    ) -> Result<OrderAck, GatewayError> {
        if std::mem::take(&mut *self.fail_next_order.lock().unwrap()) {
            return Err(GatewayError::OrderRejected("venue rejected".to_string()));
        }
        let mut orders = self.orders.lock().unwrap();
        orders.push(SubmittedOrder {
            side,
            quantity,
            limit_price,
        });
        Ok(OrderAck::new(format!("mock-{}", orders.len())))
    }
}

fn strategy_config() -> StrategyConfig {
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

// =============================================================================
// Grid initialization
// =============================================================================

#[tokio::test]
async fn initialize_submits_full_ladder_at_market() {
    let gateway = MockGateway::new(&[100.0]);
    let strategy = GridStrategy::initialize(&gateway, strategy_config())
        .await
        .unwrap();

    assert_eq!(strategy.base_price(), 100.0);

    let orders = gateway.orders();
    assert_eq!(orders.len(), 30);
    assert_eq!(orders.iter().filter(|o| o.side == Side::Buy).count(), 15);
    assert_eq!(orders.iter().filter(|o| o.side == Side::Sell).count(), 15);

    // Stock mode: every leg goes out market-style, the ladder price is
    // bookkeeping only
    assert!(orders.iter().all(|o| o.limit_price.is_none()));

    // Constant quantity: 1000 / (2 × 15) / 100
    let expected_qty = 1000.0 / 30.0 / 100.0;
    for order in &orders {
        assert_relative_eq!(order.quantity, expected_qty, epsilon = 1e-12);
    }
}

#[tokio::test]
async fn initialize_records_ladder_prices_for_bookkeeping() {
    let gateway = MockGateway::new(&[50_000.0]);
    let strategy = GridStrategy::initialize(&gateway, strategy_config())
        .await
        .unwrap();

    let plan = strategy.plan();
    assert_eq!(plan.levels.len(), 30);

    let buys: Vec<f64> = plan.buy_levels().map(|l| l.price).collect();
    let sells: Vec<f64> = plan.sell_levels().map(|l| l.price).collect();
    assert!(buys.iter().all(|&p| p < 50_000.0));
    assert!(sells.iter().all(|&p| p > 50_000.0));
    assert_relative_eq!(buys[0], 50_000.0 * (1.0 - 0.008), epsilon = 1e-6);
    assert_relative_eq!(sells[14], 50_000.0 * (1.0 + 0.008 * 15.0), epsilon = 1e-6);
}

#[tokio::test]
async fn resting_limit_mode_submits_at_ladder_prices() {
    let gateway = MockGateway::new(&[100.0]);
    let config = StrategyConfig {
        grid_levels: 3,
        resting_limit_orders: true,
        ..strategy_config()
    };
    let strategy = GridStrategy::initialize(&gateway, config).await.unwrap();

    let orders = gateway.orders();
    assert_eq!(orders.len(), 6);
    for (order, level) in orders.iter().zip(strategy.plan().levels.iter()) {
        assert_eq!(order.limit_price, Some(level.price));
    }
}

#[tokio::test]
async fn initialize_propagates_first_submission_failure() {
    let gateway = MockGateway::new(&[100.0]);
    gateway.fail_next_order();

    let result = GridStrategy::initialize(&gateway, strategy_config()).await;
    assert!(matches!(result, Err(GatewayError::OrderRejected(_))));
    assert!(gateway.orders().is_empty());
}

// =============================================================================
// DCA tier ladder
// =============================================================================

#[tokio::test]
async fn dca_fires_tiers_in_order_with_martingale_sizing() {
    // init at 100, then ticks at 84 (tier 1), 83 (no refire), 72 (tier 2)
    let gateway = MockGateway::new(&[100.0, 84.0, 83.0, 72.0]);
    let mut strategy = GridStrategy::initialize(&gateway, strategy_config())
        .await
        .unwrap();
    let grid_orders = gateway.orders().len();

    strategy.poll_tick(&gateway).await.unwrap();
    assert_eq!(strategy.dca_count(), 1);
    let orders = gateway.orders();
    assert_eq!(orders.len(), grid_orders + 1);
    let tier1 = orders.last().unwrap();
    assert_eq!(tier1.side, Side::Buy);
    assert!(tier1.limit_price.is_none());
    // 1000 × 1.8^0 / 84 / 100 ≈ 0.119
    assert_relative_eq!(tier1.quantity, 0.119, epsilon = 1e-3);

    // 83 is still inside tier 1: no new order, no state drift
    strategy.poll_tick(&gateway).await.unwrap();
    assert_eq!(strategy.dca_count(), 1);
    assert_eq!(gateway.orders().len(), grid_orders + 1);

    // 72 < 100 × 0.85^2 = 72.25: tier 2 fires
    strategy.poll_tick(&gateway).await.unwrap();
    assert_eq!(strategy.dca_count(), 2);
    let orders = gateway.orders();
    assert_eq!(orders.len(), grid_orders + 2);
    // 1000 × 1.8^1 / 72 / 100 = 0.25
    assert_relative_eq!(orders.last().unwrap().quantity, 0.25, epsilon = 1e-6);
}

#[tokio::test]
async fn dca_never_fires_while_disabled() {
    let gateway = MockGateway::new(&[100.0, 84.0, 60.0, 30.0, 5.0]);
    let config = StrategyConfig {
        dca_enabled: false,
        ..strategy_config()
    };
    let mut strategy = GridStrategy::initialize(&gateway, config).await.unwrap();
    let grid_orders = gateway.orders().len();

    for _ in 0..4 {
        strategy.poll_tick(&gateway).await.unwrap();
    }

    assert_eq!(strategy.dca_count(), 0);
    assert_eq!(gateway.orders().len(), grid_orders);
}

#[tokio::test]
async fn repeated_ticks_without_new_tier_are_noops() {
    let gateway = MockGateway::new(&[100.0, 80.0]);
    let mut strategy = GridStrategy::initialize(&gateway, strategy_config())
        .await
        .unwrap();
    let grid_orders = gateway.orders().len();

    // First tick at 80 fires tier 1; the price then holds at 80
    for _ in 0..8 {
        strategy.poll_tick(&gateway).await.unwrap();
    }

    assert_eq!(strategy.dca_count(), 1);
    assert_eq!(gateway.orders().len(), grid_orders + 1);
}

// =============================================================================
// Tick failure isolation
// =============================================================================

#[tokio::test]
async fn failed_price_read_leaves_state_untouched() {
    let gateway = MockGateway::new(&[100.0, 84.0]);
    let mut strategy = GridStrategy::initialize(&gateway, strategy_config())
        .await
        .unwrap();
    let grid_orders = gateway.orders().len();

    gateway.fail_next_price();
    let result = strategy.poll_tick(&gateway).await;
    assert!(matches!(result, Err(GatewayError::Connectivity(_))));
    assert_eq!(strategy.dca_count(), 0);
    assert_eq!(gateway.orders().len(), grid_orders);

    // Next tick succeeds and the tier is still eligible
    strategy.poll_tick(&gateway).await.unwrap();
    assert_eq!(strategy.dca_count(), 1);
}

#[tokio::test]
async fn failed_dca_submission_keeps_tier_eligible() {
    let gateway = MockGateway::new(&[100.0, 84.0]);
    let mut strategy = GridStrategy::initialize(&gateway, strategy_config())
        .await
        .unwrap();
    let grid_orders = gateway.orders().len();

    gateway.fail_next_order();
    let result = strategy.poll_tick(&gateway).await;
    assert!(matches!(result, Err(GatewayError::OrderRejected(_))));
    // Counter must not advance past a rejected order
    assert_eq!(strategy.dca_count(), 0);

    // Same tier fires on the retry tick
    strategy.poll_tick(&gateway).await.unwrap();
    assert_eq!(strategy.dca_count(), 1);
    assert_eq!(gateway.orders().len(), grid_orders + 1);
}
