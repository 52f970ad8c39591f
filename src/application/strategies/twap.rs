//! TWAP: split a quantity into equal market orders spaced by a fixed interval.
//!
//! A failed slice is recorded and the schedule carries on. The interval is
//! still observed after a failure, so the remaining slices keep their spacing.

use crate::application::strategies::orders::{OrderExecutor, OrderKind, OrderRequest};
use crate::domain::errors::{OrderError, ValidationError};
use crate::domain::ports::Sleeper;
use crate::domain::trading::types::{OrderAck, OrderSide};
use crate::domain::validation::{NumericInput, OrderValidator};
use rust_decimal::Decimal;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};

const QUANTITY_DP: u32 = 8;

pub fn slice_quantity(total: Decimal, num_orders: u32) -> Decimal {
    (total / Decimal::from(num_orders.max(1))).round_dp(QUANTITY_DP)
}

#[derive(Debug, Clone)]
pub enum SliceOutcome {
    Filled(Value),
    Failed(String),
}

#[derive(Debug, Clone)]
pub struct TwapSlice {
    /// 1-based position in the schedule
    pub index: u32,
    pub quantity: Decimal,
    pub outcome: SliceOutcome,
}

#[derive(Debug, Clone)]
pub struct TwapReport {
    pub symbol: String,
    pub side: OrderSide,
    pub slices: Vec<TwapSlice>,
}

impl TwapReport {
    pub fn acks(&self) -> impl Iterator<Item = OrderAck> + '_ {
        self.slices.iter().filter_map(|slice| match &slice.outcome {
            SliceOutcome::Filled(response) => Some(OrderAck::from_value(response)),
            SliceOutcome::Failed(_) => None,
        })
    }

    pub fn successful(&self) -> usize {
        self.acks().count()
    }

    pub fn failed(&self) -> usize {
        self.slices.len() - self.successful()
    }

    pub fn total_executed(&self) -> Decimal {
        self.acks()
            .filter_map(|ack| ack.executed_quantity())
            .fold(Decimal::ZERO, |total, qty| total.saturating_add(qty))
    }

    /// Quantity-weighted average fill price over slices that report one
    pub fn average_price(&self) -> Option<Decimal> {
        let (notional, quantity) = self
            .acks()
            .filter_map(|ack| Some((ack.average_price()?, ack.executed_quantity()?)))
            .filter(|(price, _)| *price > Decimal::ZERO)
            .try_fold((Decimal::ZERO, Decimal::ZERO), |(n, q), (price, qty)| {
                Some((n.checked_add(price.checked_mul(qty)?)?, q.checked_add(qty)?))
            })?;

        if quantity > Decimal::ZERO {
            notional.checked_div(quantity)
        } else {
            None
        }
    }
}

pub struct TwapExecutor {
    orders: OrderExecutor,
    sleeper: Arc<dyn Sleeper>,
}

impl TwapExecutor {
    pub fn new(orders: OrderExecutor, sleeper: Arc<dyn Sleeper>) -> Self {
        Self { orders, sleeper }
    }

    pub async fn execute(
        &self,
        symbol: &str,
        side: &str,
        total_quantity: impl NumericInput,
        num_orders: u32,
        interval_seconds: u64,
    ) -> Result<TwapReport, OrderError> {
        let symbol = OrderValidator::validate_symbol(symbol)?;
        let side = OrderValidator::validate_side(side)?;
        let total = OrderValidator::validate_quantity(total_quantity)?;

        if num_orders < 1 {
            return Err(ValidationError::parameter("Number of orders must be at least 1").into());
        }
        if interval_seconds < 1 {
            return Err(ValidationError::parameter("Interval must be at least 1 second").into());
        }

        let quantity = slice_quantity(total, num_orders);
        let interval = Duration::from_secs(interval_seconds);
        info!(
            symbol = %symbol,
            side = %side,
            total_quantity = %total,
            num_orders,
            order_size = %quantity,
            interval_secs = interval_seconds,
            "Starting TWAP execution"
        );

        let mut slices = Vec::with_capacity(num_orders as usize);
        for index in 1..=num_orders {
            info!("Executing TWAP slice {}/{}", index, num_orders);
            let request = OrderRequest::new(symbol.clone(), side, quantity, OrderKind::Market);

            let outcome = match self.orders.place(&request).await {
                Ok(response) => {
                    let ack = OrderAck::from_value(&response);
                    info!(
                        slice = index,
                        order_id = ?ack.order_id,
                        executed_qty = ?ack.executed_qty,
                        "TWAP slice executed"
                    );
                    SliceOutcome::Filled(response)
                }
                Err(e) => {
                    error!(slice = index, error = %e, "Error on TWAP slice");
                    SliceOutcome::Failed(e.to_string())
                }
            };
            slices.push(TwapSlice {
                index,
                quantity,
                outcome,
            });

            if index < num_orders {
                self.sleeper.sleep(interval).await;
            }
        }

        let report = TwapReport {
            symbol,
            side,
            slices,
        };
        info!(
            total_orders = report.slices.len(),
            successful = report.successful(),
            "TWAP execution completed"
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::trading::params::ParamValue;
    use crate::infrastructure::mock::{MockOrderGateway, RecordingSleeper};
    use rust_decimal_macros::dec;

    fn twap(gateway: Arc<MockOrderGateway>, sleeper: Arc<RecordingSleeper>) -> TwapExecutor {
        TwapExecutor::new(OrderExecutor::new(gateway), sleeper)
    }

    #[test]
    fn test_slice_quantity() {
        assert_eq!(slice_quantity(dec!(1.0), 4), dec!(0.25));
        assert_eq!(slice_quantity(dec!(1), 3), dec!(0.33333333));
    }

    #[tokio::test]
    async fn test_four_slices_three_delays() {
        let gateway = Arc::new(MockOrderGateway::new());
        let sleeper = Arc::new(RecordingSleeper::new());

        let report = twap(gateway.clone(), sleeper.clone())
            .execute("BTCUSDT", "buy", "1.0", 4, 60)
            .await
            .unwrap();

        assert_eq!(report.slices.len(), 4);
        assert!(report.slices.iter().all(|s| s.quantity == dec!(0.25)));
        assert_eq!(sleeper.sleeps(), vec![Duration::from_secs(60); 3]);
        assert!(
            gateway
                .placed()
                .iter()
                .all(|p| p.get("type") == Some(&ParamValue::Str("MARKET".into())))
        );
        assert_eq!(report.total_executed(), dec!(1.0));
        assert_eq!(report.average_price(), Some(dec!(100)));
    }

    #[tokio::test]
    async fn test_failed_slice_is_recorded_and_pacing_kept() {
        let gateway = Arc::new(MockOrderGateway::new().failing_on_calls(&[2]));
        let sleeper = Arc::new(RecordingSleeper::new());

        let report = twap(gateway.clone(), sleeper.clone())
            .execute("BTCUSDT", "SELL", "0.3", 3, 5)
            .await
            .unwrap();

        assert_eq!(gateway.call_count(), 3);
        assert_eq!(report.successful(), 2);
        assert_eq!(report.failed(), 1);
        assert!(matches!(report.slices[1].outcome, SliceOutcome::Failed(_)));
        assert_eq!(report.slices[1].index, 2);
        assert_eq!(sleeper.sleeps().len(), 2);
        assert_eq!(report.total_executed(), dec!(0.2));
    }

    #[tokio::test]
    async fn test_single_order_never_sleeps() {
        let gateway = Arc::new(MockOrderGateway::new());
        let sleeper = Arc::new(RecordingSleeper::new());

        let report = twap(gateway, sleeper.clone())
            .execute("BTCUSDT", "BUY", "0.5", 1, 10)
            .await
            .unwrap();

        assert_eq!(report.slices.len(), 1);
        assert!(sleeper.sleeps().is_empty());
    }

    #[tokio::test]
    async fn test_invalid_schedule_aborts_before_any_order() {
        let gateway = Arc::new(MockOrderGateway::new());
        let sleeper = Arc::new(RecordingSleeper::new());
        let executor = twap(gateway.clone(), sleeper);

        assert!(executor.execute("BTCUSDT", "BUY", "1", 0, 10).await.is_err());
        assert!(executor.execute("BTCUSDT", "BUY", "1", 4, 0).await.is_err());
        assert!(executor.execute("BTCUSDT", "HOLD", "1", 4, 10).await.is_err());
        assert_eq!(gateway.call_count(), 0);
    }
}
