//! Binance spot gateway
//!
//! Price reads use the public ticker endpoint; order submission uses the
//! signed `/api/v3/order` endpoint (HMAC-SHA256 over the query string,
//! `X-MBX-APIKEY` header). The `testnet` flag routes everything to
//! `testnet.binance.vision`.

use async_trait::async_trait;
use chrono::Utc;
use hmac::{Hmac, Mac};
use reqwest::Client;
use serde::Deserialize;
use sha2::Sha256;
use std::time::Duration;
use tracing::debug;

use super::Gateway;
use crate::error::GatewayError;
use crate::types::{OrderAck, Side};

type HmacSha256 = Hmac<Sha256>;

const PROD_API_BASE: &str = "https://api.binance.com";
const TESTNET_API_BASE: &str = "https://testnet.binance.vision";

/// Binance error code for insufficient balance
const CODE_INSUFFICIENT_BALANCE: i64 = -2010;

#[derive(Debug, Clone)]
pub struct BinanceGateway {
    client: Client,
    base_url: String,
    symbol: String,
    api_key: String,
    api_secret: String,
}

#[derive(Debug, Deserialize)]
struct TickerPrice {
    price: String,
}

#[derive(Debug, Deserialize)]
struct OrderResponse {
    #[serde(rename = "orderId")]
    order_id: i64,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    code: i64,
    msg: String,
}

impl BinanceGateway {
    pub fn new(
        symbol: impl Into<String>,
        api_key: impl Into<String>,
        api_secret: impl Into<String>,
        testnet: bool,
    ) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("Failed to create HTTP client");

        let base_url = if testnet {
            TESTNET_API_BASE
        } else {
            PROD_API_BASE
        };

        BinanceGateway {
            client,
            base_url: base_url.to_string(),
            symbol: symbol.into(),
            api_key: api_key.into(),
            api_secret: api_secret.into(),
        }
    }

    fn sign(&self, query: &str) -> String {
        let mut mac = HmacSha256::new_from_slice(self.api_secret.as_bytes())
            .expect("HMAC can take key of any size");
        mac.update(query.as_bytes());
        hex::encode(mac.finalize().into_bytes())
    }

    async fn order_error(response: reqwest::Response) -> GatewayError {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        if let Ok(err) = serde_json::from_str::<ApiError>(&body) {
            if err.code == CODE_INSUFFICIENT_BALANCE {
                return GatewayError::InsufficientFunds;
            }
            return GatewayError::OrderRejected(format!("{} (code {})", err.msg, err.code));
        }
        GatewayError::OrderRejected(format!("HTTP {}: {}", status, body))
    }
}

#[async_trait]
impl Gateway for BinanceGateway {
    async fn current_price(&self) -> Result<f64, GatewayError> {
        let url = format!("{}/api/v3/ticker/price", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[("symbol", self.symbol.as_str())])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(GatewayError::Connectivity(format!(
                "ticker HTTP {}: {}",
                status, body
            )));
        }

        let ticker: TickerPrice = response.json().await?;
        let price: f64 = ticker
            .price
            .parse()
            .map_err(|_| GatewayError::Data(format!("unparseable price '{}'", ticker.price)))?;

        if !(price > 0.0) || !price.is_finite() {
            return Err(GatewayError::Data(format!(
                "non-positive price {} for {}",
                price, self.symbol
            )));
        }

        Ok(price)
    }

    async fn submit_order(
        &self,
        side: Side,
        quantity: f64,
        limit_price: Option<f64>,
    ) -> Result<OrderAck, GatewayError> {
        let side_str = match side {
            Side::Buy => "BUY",
            Side::Sell => "SELL",
        };

        let timestamp = Utc::now().timestamp_millis();
        let mut query = format!(
            "symbol={}&side={}&quantity={:.8}&timestamp={}",
            self.symbol, side_str, quantity, timestamp
        );
        match limit_price {
            Some(px) => {
                query.push_str(&format!("&type=LIMIT&timeInForce=GTC&price={:.8}", px));
            }
            None => query.push_str("&type=MARKET"),
        }
        let signature = self.sign(&query);
        let url = format!(
            "{}/api/v3/order?{}&signature={}",
            self.base_url, query, signature
        );

        debug!(symbol = %self.symbol, side = %side, quantity, ?limit_price, "Submitting Binance order");

        let response = self
            .client
            .post(&url)
            .header("X-MBX-APIKEY", &self.api_key)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::order_error(response).await);
        }

        let order: OrderResponse = response.json().await?;
        Ok(OrderAck::new(order.order_id.to_string()))
    }
}
