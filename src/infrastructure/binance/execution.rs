//! Binance futures endpoints built on the request pipeline:
//! exchange info, order placement / cancellation / query, account.

use crate::domain::errors::ClientError;
use crate::domain::ports::{HttpMethod, OrderGateway};
use crate::domain::trading::params::{ParamValue, RequestParams};
use crate::infrastructure::binance::client::BinanceFuturesClient;
use async_trait::async_trait;
use serde_json::Value;
use tracing::info;

pub const EXCHANGE_INFO_PATH: &str = "/fapi/v1/exchangeInfo";
pub const ORDER_PATH: &str = "/fapi/v1/order";
pub const ACCOUNT_PATH: &str = "/fapi/v2/account";

impl BinanceFuturesClient {
    /// Trading rules and symbol information (public)
    pub async fn exchange_info(&self, symbol: Option<&str>) -> Result<Value, ClientError> {
        let mut params = RequestParams::new();
        if let Some(symbol) = symbol {
            params.insert("symbol", symbol);
        }
        self.send(HttpMethod::Get, EXCHANGE_INFO_PATH, params, false)
            .await
    }

    pub async fn place_order(&self, params: RequestParams) -> Result<Value, ClientError> {
        info!(
            symbol = %params.get("symbol").map(ParamValue::to_string).unwrap_or_default(),
            side = %params.get("side").map(ParamValue::to_string).unwrap_or_default(),
            "Placing order"
        );
        self.send(HttpMethod::Post, ORDER_PATH, params, true).await
    }

    pub async fn cancel_order(&self, symbol: &str, order_id: i64) -> Result<Value, ClientError> {
        info!(symbol, order_id, "Cancelling order");
        let params = RequestParams::new()
            .with("symbol", symbol)
            .with("orderId", order_id);
        self.send(HttpMethod::Delete, ORDER_PATH, params, true).await
    }

    pub async fn get_order(&self, symbol: &str, order_id: i64) -> Result<Value, ClientError> {
        let params = RequestParams::new()
            .with("symbol", symbol)
            .with("orderId", order_id);
        self.send(HttpMethod::Get, ORDER_PATH, params, true).await
    }

    pub async fn account_info(&self) -> Result<Value, ClientError> {
        self.send(HttpMethod::Get, ACCOUNT_PATH, RequestParams::new(), true)
            .await
    }
}

#[async_trait]
impl OrderGateway for BinanceFuturesClient {
    async fn place_order(&self, params: RequestParams) -> Result<Value, ClientError> {
        BinanceFuturesClient::place_order(self, params).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ClientSettings, Credentials};
    use crate::domain::ports::HttpResponse;
    use crate::infrastructure::mock::{FixedClock, MockTransport, RecordingSleeper};
    use std::sync::Arc;

    fn client(transport: Arc<MockTransport>) -> BinanceFuturesClient {
        BinanceFuturesClient::with_components(
            Credentials::new("k", "s"),
            ClientSettings::new("https://fapi.example"),
            transport,
            Arc::new(FixedClock(1_000_000)),
            Arc::new(RecordingSleeper::new()),
        )
    }

    #[tokio::test]
    async fn test_endpoint_routing() {
        let transport = Arc::new(
            MockTransport::default().with_fallback(HttpResponse::new(200, r#"{"ok":true}"#)),
        );
        let client = client(transport.clone());

        client.exchange_info(Some("BTCUSDT")).await.unwrap();
        client.cancel_order("BTCUSDT", 11).await.unwrap();
        client.get_order("BTCUSDT", 11).await.unwrap();
        client.account_info().await.unwrap();
        OrderGateway::place_order(&client, RequestParams::new().with("symbol", "BTCUSDT"))
            .await
            .unwrap();

        let routed: Vec<(HttpMethod, String)> = transport
            .requests()
            .iter()
            .map(|r| {
                let path = r.url.trim_start_matches("https://fapi.example");
                let path = path.split('?').next().unwrap_or_default().to_string();
                (r.method, path)
            })
            .collect();

        assert_eq!(
            routed,
            vec![
                (HttpMethod::Get, EXCHANGE_INFO_PATH.to_string()),
                (HttpMethod::Delete, ORDER_PATH.to_string()),
                (HttpMethod::Get, ORDER_PATH.to_string()),
                (HttpMethod::Get, ACCOUNT_PATH.to_string()),
                (HttpMethod::Post, ORDER_PATH.to_string()),
            ]
        );

        let requests = transport.requests();
        assert_eq!(requests[0].url, "https://fapi.example/fapi/v1/exchangeInfo?symbol=BTCUSDT");
        assert!(requests[1].url.contains("symbol=BTCUSDT&orderId=11&timestamp=998000"));
        assert!(requests.iter().skip(1).all(|r| r.url.contains("&signature=")));
    }
}
