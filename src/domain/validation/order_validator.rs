//! Order input validation.
//!
//! Every check either returns the normalized value or a [`ValidationError`];
//! nothing here touches the network.

use crate::domain::errors::ValidationError;
use crate::domain::trading::types::{OrderSide, OrderType, TimeInForce};
use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;
use std::fmt;
use std::str::FromStr;
use tracing::debug;

/// Anything a caller may hand over as a quantity or price
pub trait NumericInput: fmt::Display {
    fn to_decimal(&self) -> Option<Decimal>;
}

impl NumericInput for &str {
    fn to_decimal(&self) -> Option<Decimal> {
        parse_decimal(self)
    }
}

impl NumericInput for String {
    fn to_decimal(&self) -> Option<Decimal> {
        parse_decimal(self)
    }
}

impl NumericInput for Decimal {
    fn to_decimal(&self) -> Option<Decimal> {
        Some(*self)
    }
}

impl NumericInput for f64 {
    fn to_decimal(&self) -> Option<Decimal> {
        Decimal::from_f64(*self)
    }
}

impl NumericInput for i32 {
    fn to_decimal(&self) -> Option<Decimal> {
        Some(Decimal::from(*self))
    }
}

impl NumericInput for i64 {
    fn to_decimal(&self) -> Option<Decimal> {
        Some(Decimal::from(*self))
    }
}

fn parse_decimal(raw: &str) -> Option<Decimal> {
    let trimmed = raw.trim();
    Decimal::from_str(trimmed)
        .or_else(|_| Decimal::from_scientific(trimmed))
        .ok()
}

pub struct OrderValidator;

impl OrderValidator {
    pub fn validate_symbol(symbol: &str) -> Result<String, ValidationError> {
        if symbol.trim().is_empty() {
            return Err(ValidationError::EmptySymbol);
        }

        let symbol = symbol.to_uppercase();
        if !symbol
            .chars()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit())
        {
            return Err(ValidationError::InvalidSymbol { symbol });
        }

        debug!(symbol = %symbol, "Symbol validated");
        Ok(symbol)
    }

    pub fn validate_side(side: &str) -> Result<OrderSide, ValidationError> {
        let side = match side.to_uppercase().as_str() {
            "BUY" => OrderSide::Buy,
            "SELL" => OrderSide::Sell,
            _ => {
                return Err(ValidationError::InvalidSide {
                    side: side.to_string(),
                });
            }
        };

        debug!(side = %side, "Side validated");
        Ok(side)
    }

    pub fn validate_quantity<T: NumericInput>(quantity: T) -> Result<Decimal, ValidationError> {
        let quantity = Self::positive_decimal("Quantity", &quantity)?;
        debug!(quantity = %quantity, "Quantity validated");
        Ok(quantity)
    }

    pub fn validate_price<T: NumericInput>(price: T) -> Result<Decimal, ValidationError> {
        let price = Self::positive_decimal("Price", &price)?;
        debug!(price = %price, "Price validated");
        Ok(price)
    }

    pub fn validate_order_type(order_type: &str) -> Result<OrderType, ValidationError> {
        let upper = order_type.to_uppercase();
        let order_type = OrderType::ALL
            .into_iter()
            .find(|t| t.as_str() == upper)
            .ok_or_else(|| ValidationError::InvalidOrderType {
                order_type: order_type.to_string(),
            })?;

        debug!(order_type = %order_type, "Order type validated");
        Ok(order_type)
    }

    pub fn validate_time_in_force(value: &str) -> Result<TimeInForce, ValidationError> {
        let upper = value.to_uppercase();
        TimeInForce::ALL
            .into_iter()
            .find(|t| t.as_str() == upper)
            .ok_or_else(|| ValidationError::InvalidTimeInForce {
                value: value.to_string(),
            })
    }

    fn positive_decimal<T: NumericInput>(
        field: &'static str,
        raw: &T,
    ) -> Result<Decimal, ValidationError> {
        let Some(value) = raw.to_decimal() else {
            return Err(Self::classify_unrepresentable(field, raw));
        };

        if value <= Decimal::ZERO {
            return Err(ValidationError::NotPositive {
                field,
                value: raw.to_string(),
            });
        }

        Ok(value)
    }

    /// Input that is a finite number but does not fit in a `Decimal` is out of
    /// range (or not positive); anything else is not a number at all.
    fn classify_unrepresentable<T: NumericInput>(field: &'static str, raw: &T) -> ValidationError {
        let value = raw.to_string();
        match value.trim().parse::<f64>() {
            Ok(number) if number.is_finite() && number <= 0.0 => {
                ValidationError::NotPositive { field, value }
            }
            Ok(number) if number.is_finite() => ValidationError::OutOfRange { field, value },
            _ => ValidationError::NotANumber { field, value },
        }
    }
}
