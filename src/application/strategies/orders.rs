//! Single-order execution.
//!
//! Market, limit, stop-limit and take-profit orders share one executor; the
//! [`OrderKind`] decides which extra fields end up in the request.

use crate::domain::errors::{OrderError, ValidationError};
use crate::domain::ports::OrderGateway;
use crate::domain::trading::params::RequestParams;
use crate::domain::trading::types::{OrderAck, OrderSide, OrderType, TimeInForce};
use crate::domain::validation::{NumericInput, OrderValidator};
use rust_decimal::Decimal;
use serde_json::Value;
use std::sync::Arc;
use tracing::{error, info};

#[derive(Debug, Clone, PartialEq)]
pub enum OrderKind {
    Market,
    Limit {
        price: Decimal,
        time_in_force: TimeInForce,
    },
    /// Exchange type `STOP`: a limit order armed once `stop_price` trades
    StopLimit {
        stop_price: Decimal,
        limit_price: Decimal,
        time_in_force: TimeInForce,
    },
    TakeProfit {
        price: Decimal,
        stop_price: Decimal,
        time_in_force: TimeInForce,
    },
}

impl OrderKind {
    pub fn order_type(&self) -> OrderType {
        match self {
            OrderKind::Market => OrderType::Market,
            OrderKind::Limit { .. } => OrderType::Limit,
            OrderKind::StopLimit { .. } => OrderType::Stop,
            OrderKind::TakeProfit { .. } => OrderType::TakeProfit,
        }
    }
}

/// A validated order, ready to be encoded
#[derive(Debug, Clone, PartialEq)]
pub struct OrderRequest {
    pub symbol: String,
    pub side: OrderSide,
    pub quantity: Decimal,
    pub kind: OrderKind,
}

impl OrderRequest {
    pub fn new(symbol: impl Into<String>, side: OrderSide, quantity: Decimal, kind: OrderKind) -> Self {
        Self {
            symbol: symbol.into(),
            side,
            quantity,
            kind,
        }
    }

    pub fn market(
        symbol: &str,
        side: &str,
        quantity: impl NumericInput,
    ) -> Result<Self, ValidationError> {
        Ok(Self::new(
            OrderValidator::validate_symbol(symbol)?,
            OrderValidator::validate_side(side)?,
            OrderValidator::validate_quantity(quantity)?,
            OrderKind::Market,
        ))
    }

    pub fn limit(
        symbol: &str,
        side: &str,
        quantity: impl NumericInput,
        price: impl NumericInput,
        time_in_force: &str,
    ) -> Result<Self, ValidationError> {
        Ok(Self::new(
            OrderValidator::validate_symbol(symbol)?,
            OrderValidator::validate_side(side)?,
            OrderValidator::validate_quantity(quantity)?,
            OrderKind::Limit {
                price: OrderValidator::validate_price(price)?,
                time_in_force: OrderValidator::validate_time_in_force(time_in_force)?,
            },
        ))
    }

    pub fn stop_limit(
        symbol: &str,
        side: &str,
        quantity: impl NumericInput,
        stop_price: impl NumericInput,
        limit_price: impl NumericInput,
        time_in_force: &str,
    ) -> Result<Self, ValidationError> {
        Ok(Self::new(
            OrderValidator::validate_symbol(symbol)?,
            OrderValidator::validate_side(side)?,
            OrderValidator::validate_quantity(quantity)?,
            OrderKind::StopLimit {
                stop_price: OrderValidator::validate_price(stop_price)?,
                limit_price: OrderValidator::validate_price(limit_price)?,
                time_in_force: OrderValidator::validate_time_in_force(time_in_force)?,
            },
        ))
    }

    pub fn order_type(&self) -> OrderType {
        self.kind.order_type()
    }

    /// Wire parameters: symbol, side, type, quantity, then the kind-specific fields
    pub fn to_params(&self) -> RequestParams {
        let params = RequestParams::new()
            .with("symbol", self.symbol.as_str())
            .with("side", self.side)
            .with("type", self.order_type())
            .with("quantity", self.quantity);

        match &self.kind {
            OrderKind::Market => params,
            OrderKind::Limit {
                price,
                time_in_force,
            } => params
                .with("price", *price)
                .with("timeInForce", *time_in_force),
            OrderKind::StopLimit {
                stop_price,
                limit_price,
                time_in_force,
            } => params
                .with("price", *limit_price)
                .with("stopPrice", *stop_price)
                .with("timeInForce", *time_in_force),
            OrderKind::TakeProfit {
                price,
                stop_price,
                time_in_force,
            } => params
                .with("price", *price)
                .with("stopPrice", *stop_price)
                .with("timeInForce", *time_in_force),
        }
    }
}

/// Places one order at a time through an [`OrderGateway`]
#[derive(Clone)]
pub struct OrderExecutor {
    gateway: Arc<dyn OrderGateway>,
}

impl OrderExecutor {
    pub fn new(gateway: Arc<dyn OrderGateway>) -> Self {
        Self { gateway }
    }

    pub async fn place(&self, request: &OrderRequest) -> Result<Value, OrderError> {
        info!(
            symbol = %request.symbol,
            side = %request.side,
            order_type = %request.order_type(),
            quantity = %request.quantity,
            "Executing order"
        );

        match self.gateway.place_order(request.to_params()).await {
            Ok(response) => {
                let ack = OrderAck::from_value(&response);
                info!(
                    order_id = ?ack.order_id,
                    status = ?ack.status,
                    executed_qty = ?ack.executed_qty,
                    avg_price = ?ack.avg_price,
                    "{} order placed",
                    request.order_type()
                );
                Ok(response)
            }
            Err(e) => {
                error!(
                    symbol = %request.symbol,
                    order_type = %request.order_type(),
                    error = %e,
                    "Order placement failed"
                );
                Err(e.into())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::mock::MockOrderGateway;
    use rust_decimal_macros::dec;

    #[test]
    fn test_market_params() {
        let request = OrderRequest::market("btcusdt", "buy", "0.01").unwrap();
        assert_eq!(
            request.to_params().encode(),
            "symbol=BTCUSDT&side=BUY&type=MARKET&quantity=0.01"
        );
    }

    #[test]
    fn test_limit_params() {
        let request = OrderRequest::limit("ETHUSDT", "SELL", "1.5", "3200.50", "ioc").unwrap();
        assert_eq!(
            request.to_params().encode(),
            "symbol=ETHUSDT&side=SELL&type=LIMIT&quantity=1.5&price=3200.5&timeInForce=IOC"
        );
    }

    #[test]
    fn test_stop_limit_params() {
        let request =
            OrderRequest::stop_limit("BTCUSDT", "SELL", "0.01", "51000", "50800", "GTC").unwrap();
        assert_eq!(request.order_type(), OrderType::Stop);
        assert_eq!(
            request.to_params().encode(),
            "symbol=BTCUSDT&side=SELL&type=STOP&quantity=0.01&price=50800&stopPrice=51000&timeInForce=GTC"
        );
    }

    #[test]
    fn test_take_profit_params() {
        let request = OrderRequest::new(
            "BTCUSDT",
            OrderSide::Sell,
            dec!(0.01),
            OrderKind::TakeProfit {
                price: dec!(52000),
                stop_price: dec!(52000),
                time_in_force: TimeInForce::Gtc,
            },
        );
        assert_eq!(
            request.to_params().encode(),
            "symbol=BTCUSDT&side=SELL&type=TAKE_PROFIT&quantity=0.01&price=52000&stopPrice=52000&timeInForce=GTC"
        );
    }

    #[test]
    fn test_constructors_validate() {
        assert!(matches!(
            OrderRequest::market("BTC-USDT", "BUY", "1"),
            Err(ValidationError::InvalidSymbol { .. })
        ));
        assert!(matches!(
            OrderRequest::limit("BTCUSDT", "BUY", "1", "0", "GTC"),
            Err(ValidationError::NotPositive { field: "Price", .. })
        ));
        assert!(matches!(
            OrderRequest::limit("BTCUSDT", "BUY", "1", "100", "DAY"),
            Err(ValidationError::InvalidTimeInForce { .. })
        ));
    }

    #[tokio::test]
    async fn test_executor_returns_gateway_response() {
        let gateway = Arc::new(MockOrderGateway::new());
        let executor = OrderExecutor::new(gateway.clone());

        let response = executor
            .place(&OrderRequest::market("BTCUSDT", "BUY", "0.5").unwrap())
            .await
            .unwrap();

        assert_eq!(OrderAck::from_value(&response).order_id, Some(1));
        assert_eq!(gateway.placed().len(), 1);
    }

    #[tokio::test]
    async fn test_executor_surfaces_gateway_errors() {
        let gateway = Arc::new(MockOrderGateway::new().failing_on_calls(&[1]));
        let executor = OrderExecutor::new(gateway);

        let err = executor
            .place(&OrderRequest::market("BTCUSDT", "BUY", "0.5").unwrap())
            .await
            .unwrap_err();

        assert!(matches!(err, OrderError::Client(_)));
    }
}
