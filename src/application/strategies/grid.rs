//! Grid strategy: a ladder of GTC limit orders between two price bounds.
//!
//! Levels below the midpoint are BUY orders, levels above are SELL orders.
//! A level sitting exactly on the midpoint is not placed.

use crate::application::strategies::orders::{OrderExecutor, OrderKind, OrderRequest};
use crate::domain::errors::{OrderError, ValidationError};
use crate::domain::trading::types::{OrderSide, TimeInForce};
use crate::domain::validation::{NumericInput, OrderValidator};
use rust_decimal::Decimal;
use serde_json::Value;
use tracing::{error, info, warn};

/// Grid prices are quoted with two decimals
const PRICE_DP: u32 = 2;

/// Evenly spaced levels from `lower` to `upper` inclusive.
///
/// Fails when the bounds are too large for decimal arithmetic.
pub fn grid_levels(
    lower: Decimal,
    upper: Decimal,
    num_grids: u32,
) -> Result<Vec<Decimal>, ValidationError> {
    if num_grids < 2 {
        return Ok(vec![lower.round_dp(PRICE_DP)]);
    }
    let step = upper
        .checked_sub(lower)
        .and_then(|span| span.checked_div(Decimal::from(num_grids - 1)))
        .ok_or_else(out_of_range)?;
    (0..num_grids)
        .map(|i| {
            step.checked_mul(Decimal::from(i))
                .and_then(|offset| lower.checked_add(offset))
                .map(|level| level.round_dp(PRICE_DP))
                .ok_or_else(out_of_range)
        })
        .collect()
}

fn midpoint(lower: Decimal, upper: Decimal) -> Result<Decimal, ValidationError> {
    lower
        .checked_add(upper)
        .and_then(|sum| sum.checked_div(Decimal::TWO))
        .ok_or_else(out_of_range)
}

fn out_of_range() -> ValidationError {
    ValidationError::parameter("Grid bounds out of range")
}

#[derive(Debug, Clone)]
pub struct GridFailure {
    pub price: Decimal,
    pub side: OrderSide,
    pub error: String,
}

#[derive(Debug, Clone, Default)]
pub struct GridReport {
    pub buy_orders: Vec<Value>,
    pub sell_orders: Vec<Value>,
    pub failures: Vec<GridFailure>,
    /// Levels not placed because they coincide with the midpoint
    pub skipped_levels: Vec<Decimal>,
}

impl GridReport {
    pub fn total_orders(&self) -> usize {
        self.buy_orders.len() + self.sell_orders.len()
    }
}

pub struct GridExecutor {
    orders: OrderExecutor,
}

impl GridExecutor {
    pub fn new(orders: OrderExecutor) -> Self {
        Self { orders }
    }

    pub async fn execute(
        &self,
        symbol: &str,
        lower_price: impl NumericInput,
        upper_price: impl NumericInput,
        num_grids: u32,
        quantity_per_grid: impl NumericInput,
    ) -> Result<GridReport, OrderError> {
        let symbol = OrderValidator::validate_symbol(symbol)?;
        let lower = OrderValidator::validate_price(lower_price)?;
        let upper = OrderValidator::validate_price(upper_price)?;
        let quantity = OrderValidator::validate_quantity(quantity_per_grid)?;

        if upper <= lower {
            return Err(ValidationError::parameter("Upper price must be greater than lower price").into());
        }
        if num_grids < 2 {
            return Err(ValidationError::parameter("Number of grids must be at least 2").into());
        }

        let levels = grid_levels(lower, upper, num_grids)?;
        let mid_price = midpoint(lower, upper)?;
        info!(
            symbol = %symbol,
            lower_price = %lower,
            upper_price = %upper,
            num_grids,
            mid_price = %mid_price,
            "Starting grid order placement"
        );

        let mut report = GridReport::default();
        for price in levels {
            let side = if price < mid_price {
                OrderSide::Buy
            } else if price > mid_price {
                OrderSide::Sell
            } else {
                warn!(price = %price, "Grid level equals midpoint, not placed");
                report.skipped_levels.push(price);
                continue;
            };

            let request = OrderRequest::new(
                symbol.clone(),
                side,
                quantity,
                OrderKind::Limit {
                    price,
                    time_in_force: TimeInForce::Gtc,
                },
            );

            match self.orders.place(&request).await {
                Ok(response) => {
                    info!(side = %side, price = %price, "Grid order placed");
                    match side {
                        OrderSide::Buy => report.buy_orders.push(response),
                        OrderSide::Sell => report.sell_orders.push(response),
                    }
                }
                Err(e) => {
                    error!(side = %side, price = %price, error = %e, "Error placing grid level");
                    report.failures.push(GridFailure {
                        price,
                        side,
                        error: e.to_string(),
                    });
                }
            }
        }

        info!(
            buy_orders = report.buy_orders.len(),
            sell_orders = report.sell_orders.len(),
            failed = report.failures.len(),
            "Grid orders placed"
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::trading::params::ParamValue;
    use crate::infrastructure::mock::MockOrderGateway;
    use rust_decimal_macros::dec;
    use std::sync::Arc;

    #[test]
    fn test_three_levels_hit_both_bounds() {
        assert_eq!(
            grid_levels(dec!(100), dec!(200), 3).unwrap(),
            vec![dec!(100), dec!(150), dec!(200)]
        );
    }

    #[test]
    fn test_levels_are_rounded_to_cents() {
        let levels = grid_levels(dec!(100), dec!(101), 4).unwrap();
        assert_eq!(levels, vec![dec!(100), dec!(100.33), dec!(100.67), dec!(101)]);
    }

    #[tokio::test]
    async fn test_midpoint_level_is_skipped() {
        let gateway = Arc::new(MockOrderGateway::new());
        let grid = GridExecutor::new(OrderExecutor::new(gateway.clone()));

        let report = grid.execute("btcusdt", "100", "200", 3, "0.01").await.unwrap();

        assert_eq!(report.buy_orders.len(), 1);
        assert_eq!(report.sell_orders.len(), 1);
        assert_eq!(report.skipped_levels, vec![dec!(150)]);
        assert_eq!(report.total_orders(), 2);

        let placed = gateway.placed();
        assert_eq!(placed[0].get("side"), Some(&ParamValue::Str("BUY".into())));
        assert_eq!(placed[0].get("price"), Some(&ParamValue::Decimal(dec!(100))));
        assert_eq!(placed[1].get("side"), Some(&ParamValue::Str("SELL".into())));
        assert_eq!(placed[1].get("timeInForce"), Some(&ParamValue::Str("GTC".into())));
    }

    #[tokio::test]
    async fn test_failed_level_does_not_abort_grid() {
        let gateway = Arc::new(MockOrderGateway::new().failing_on_calls(&[2]));
        let grid = GridExecutor::new(OrderExecutor::new(gateway.clone()));

        let report = grid.execute("BTCUSDT", "100", "200", 4, "0.01").await.unwrap();

        assert_eq!(gateway.call_count(), 4);
        assert_eq!(report.buy_orders.len(), 1);
        assert_eq!(report.sell_orders.len(), 2);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].side, OrderSide::Buy);
        assert_eq!(report.failures[0].price, dec!(133.33));
    }

    #[tokio::test]
    async fn test_invalid_bounds_abort_before_any_order() {
        let gateway = Arc::new(MockOrderGateway::new());
        let grid = GridExecutor::new(OrderExecutor::new(gateway.clone()));

        assert!(grid.execute("BTCUSDT", "200", "100", 3, "0.01").await.is_err());
        assert!(grid.execute("BTCUSDT", "100", "200", 1, "0.01").await.is_err());
        assert!(grid.execute("BTCUSDT", "100", "200", 3, "-1").await.is_err());
        assert_eq!(gateway.call_count(), 0);
    }

    #[tokio::test]
    async fn test_huge_bounds_are_rejected_not_overflowed() {
        let gateway = Arc::new(MockOrderGateway::new());
        let grid = GridExecutor::new(OrderExecutor::new(gateway.clone()));

        let result = grid
            .execute(
                "BTCUSDT",
                "50000000000000000000000000000",
                "70000000000000000000000000000",
                3,
                "1",
            )
            .await;

        match result {
            Err(OrderError::Validation(ValidationError::InvalidParameter { reason })) => {
                assert_eq!(reason, "Grid bounds out of range")
            }
            other => panic!("expected out-of-range error, got {other:?}"),
        }
        assert_eq!(gateway.call_count(), 0);
    }

    #[test]
    fn test_levels_overflow_is_an_error() {
        assert!(grid_levels(Decimal::MIN, Decimal::MAX, 3).is_err());
    }
}
