//! OKX v5 gateway
//!
//! Price reads use the public market ticker; order submission uses the
//! signed `/api/v5/trade/order` endpoint. OKX signs with a base64 HMAC
//! over `timestamp + method + path + body` and additionally requires the
//! account passphrase header. The `testnet` flag enables OKX demo
//! trading via the `x-simulated-trading` header.

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use chrono::{SecondsFormat, Utc};
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

const API_BASE: &str = "https://www.okx.com";

/// OKX per-order error code for insufficient balance
const SCODE_INSUFFICIENT_BALANCE: &str = "51008";

#[derive(Debug, Clone)]
pub struct OkxGateway {
    client: Client,
    /// OKX instrument id, e.g. "BTC-USDT"
    inst_id: String,
    api_key: String,
    api_secret: String,
    passphrase: String,
    simulated: bool,
}

#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    code: String,
    #[serde(default)]
    msg: String,
    #[serde(default = "Vec::new")]
    data: Vec<T>,
}

#[derive(Debug, Deserialize)]
struct TickerData {
    last: String,
}

#[derive(Debug, Deserialize)]
struct OrderData {
    #[serde(rename = "ordId")]
    ord_id: String,
    #[serde(rename = "sCode")]
    s_code: String,
    #[serde(rename = "sMsg")]
    s_msg: String,
}

impl OkxGateway {
    pub fn new(
        symbol: impl Into<String>,
        api_key: impl Into<String>,
        api_secret: impl Into<String>,
        passphrase: impl Into<String>,
        testnet: bool,
    ) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("Failed to create HTTP client");

        OkxGateway {
            client,
            inst_id: symbol.into(),
            api_key: api_key.into(),
            api_secret: api_secret.into(),
            passphrase: passphrase.into(),
            simulated: testnet,
        }
    }

    fn sign(&self, timestamp: &str, method: &str, path: &str, body: &str) -> String {
        let mut mac = HmacSha256::new_from_slice(self.api_secret.as_bytes())
            .expect("HMAC can take key of any size");
        mac.update(format!("{}{}{}{}", timestamp, method, path, body).as_bytes());
        BASE64.encode(mac.finalize().into_bytes())
    }
}

#[async_trait]
impl Gateway for OkxGateway {
    async fn current_price(&self) -> Result<f64, GatewayError> {
        let url = format!("{}/api/v5/market/ticker", API_BASE);
        let response = self
            .client
            .get(&url)
            .query(&[("instId", self.inst_id.as_str())])
            .send()
            .await?;

        let body: ApiResponse<TickerData> = response.json().await?;
        if body.code != "0" {
            return Err(GatewayError::Connectivity(format!(
                "ticker error {}: {}",
                body.code, body.msg
            )));
        }

        let ticker = body
            .data
            .first()
            .ok_or_else(|| GatewayError::Data(format!("empty ticker for {}", self.inst_id)))?;
        let price: f64 = ticker
            .last
            .parse()
            .map_err(|_| GatewayError::Data(format!("unparseable price '{}'", ticker.last)))?;

        if !(price > 0.0) || !price.is_finite() {
            return Err(GatewayError::Data(format!(
                "non-positive price {} for {}",
                price, self.inst_id
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
        let path = "/api/v5/trade/order";
        let mut order = serde_json::json!({
            "instId": self.inst_id,
            "tdMode": "cash",
            "side": side.as_str(),
            "ordType": "market",
            "sz": format!("{:.8}", quantity),
        });
        if let Some(px) = limit_price {
            order["ordType"] = serde_json::json!("limit");
            order["px"] = serde_json::json!(format!("{:.8}", px));
        }
        let body = order.to_string();

        let timestamp = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
        let signature = self.sign(&timestamp, "POST", path, &body);

        debug!(inst_id = %self.inst_id, side = %side, quantity, ?limit_price, "Submitting OKX order");

        let mut request = self
            .client
            .post(format!("{}{}", API_BASE, path))
            .header("OK-ACCESS-KEY", &self.api_key)
            .header("OK-ACCESS-SIGN", signature)
            .header("OK-ACCESS-TIMESTAMP", &timestamp)
            .header("OK-ACCESS-PASSPHRASE", &self.passphrase)
            .header("Content-Type", "application/json")
            .body(body);
        if self.simulated {
            request = request.header("x-simulated-trading", "1");
        }

        let response: ApiResponse<OrderData> = request.send().await?.json().await?;

        let order = response
            .data
            .first()
            .ok_or_else(|| GatewayError::OrderRejected(format!(
                "error {}: {}",
                response.code, response.msg
            )))?;

        if order.s_code != "0" {
            if order.s_code == SCODE_INSUFFICIENT_BALANCE {
                return Err(GatewayError::InsufficientFunds);
            }
            return Err(GatewayError::OrderRejected(format!(
                "{} (sCode {})",
                order.s_msg, order.s_code
            )));
        }

        Ok(OrderAck::new(order.ord_id.clone()))
    }
}
