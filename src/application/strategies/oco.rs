//! Simulated OCO (one-cancels-the-other).
//!
//! Futures has no linked-order primitive here, so the take-profit and the
//! stop-loss are placed as two independent orders. Nothing cancels the
//! surviving leg when the other fills; the caller has to do it.

use crate::application::strategies::orders::{OrderExecutor, OrderKind, OrderRequest};
use crate::domain::errors::OrderError;
use crate::domain::trading::types::{OrderAck, TimeInForce};
use crate::domain::validation::{NumericInput, OrderValidator};
use serde_json::Value;
use tracing::{info, warn};

pub const OCO_NOTICE: &str = "OCO strategy orders placed. Monitor and cancel manually when one fills.";

#[derive(Debug, Clone)]
pub struct OcoReport {
    pub take_profit_order: Value,
    pub stop_loss_order: Value,
    pub message: &'static str,
}

pub struct OcoExecutor {
    orders: OrderExecutor,
}

impl OcoExecutor {
    pub fn new(orders: OrderExecutor) -> Self {
        Self { orders }
    }

    pub async fn execute(
        &self,
        symbol: &str,
        side: &str,
        quantity: impl NumericInput,
        take_profit_price: impl NumericInput,
        stop_loss_price: impl NumericInput,
        stop_limit_price: impl NumericInput,
    ) -> Result<OcoReport, OrderError> {
        let symbol = OrderValidator::validate_symbol(symbol)?;
        let side = OrderValidator::validate_side(side)?;
        let quantity = OrderValidator::validate_quantity(quantity)?;
        let take_profit = OrderValidator::validate_price(take_profit_price)?;
        let stop_loss = OrderValidator::validate_price(stop_loss_price)?;
        let stop_limit = OrderValidator::validate_price(stop_limit_price)?;

        info!(
            symbol = %symbol,
            side = %side,
            quantity = %quantity,
            take_profit = %take_profit,
            stop_loss = %stop_loss,
            "Executing OCO order strategy"
        );

        let take_profit_request = OrderRequest::new(
            symbol.clone(),
            side,
            quantity,
            OrderKind::TakeProfit {
                price: take_profit,
                stop_price: take_profit,
                time_in_force: TimeInForce::Gtc,
            },
        );
        let take_profit_order = self.orders.place(&take_profit_request).await?;
        let take_profit_id = OrderAck::from_value(&take_profit_order).order_id;
        info!(order_id = ?take_profit_id, "Take-profit order placed");

        let stop_loss_request = OrderRequest::new(
            symbol,
            side,
            quantity,
            OrderKind::StopLimit {
                stop_price: stop_loss,
                limit_price: stop_limit,
                time_in_force: TimeInForce::Gtc,
            },
        );
        let stop_loss_order = match self.orders.place(&stop_loss_request).await {
            Ok(order) => order,
            Err(e) => {
                warn!(
                    take_profit_order_id = ?take_profit_id,
                    "Stop-loss leg failed; take-profit order is still live and must be cancelled manually"
                );
                return Err(e);
            }
        };
        info!(
            order_id = ?OrderAck::from_value(&stop_loss_order).order_id,
            "Stop-loss order placed"
        );

        Ok(OcoReport {
            take_profit_order,
            stop_loss_order,
            message: OCO_NOTICE,
        })
    }
}
