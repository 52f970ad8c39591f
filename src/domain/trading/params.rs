//! Ordered request parameters.
//!
//! The encoded form doubles as the signing payload, so the order in which
//! parameters are inserted is the order in which they are sent and signed.

use crate::domain::trading::types::{OrderSide, OrderType, TimeInForce};
use rust_decimal::Decimal;
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    Str(String),
    Int(i64),
    Decimal(Decimal),
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Str(s) => f.write_str(s),
            ParamValue::Int(i) => write!(f, "{}", i),
            ParamValue::Decimal(d) => write!(f, "{}", d.normalize()),
        }
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        ParamValue::Str(value.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        ParamValue::Str(value)
    }
}

impl From<i64> for ParamValue {
    fn from(value: i64) -> Self {
        ParamValue::Int(value)
    }
}

impl From<u32> for ParamValue {
    fn from(value: u32) -> Self {
        ParamValue::Int(i64::from(value))
    }
}

impl From<Decimal> for ParamValue {
    fn from(value: Decimal) -> Self {
        ParamValue::Decimal(value)
    }
}

impl From<OrderSide> for ParamValue {
    fn from(value: OrderSide) -> Self {
        ParamValue::Str(value.to_string())
    }
}

impl From<OrderType> for ParamValue {
    fn from(value: OrderType) -> Self {
        ParamValue::Str(value.as_str().to_string())
    }
}

impl From<TimeInForce> for ParamValue {
    fn from(value: TimeInForce) -> Self {
        ParamValue::Str(value.as_str().to_string())
    }
}

/// Insertion-ordered key/value parameters.
///
/// Re-inserting an existing key replaces the value without moving it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestParams {
    entries: Vec<(String, ParamValue)>,
}

impl RequestParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    pub fn with(mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<ParamValue>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&ParamValue> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// `application/x-www-form-urlencoded` encoding in insertion order
    pub fn encode(&self) -> String {
        self.encode_filtered(|_| true)
    }

    /// Encoding with one key left out (used to keep `signature` out of its own input)
    pub fn encode_excluding(&self, excluded: &str) -> String {
        self.encode_filtered(|key| key != excluded)
    }

    fn encode_filtered(&self, keep: impl Fn(&str) -> bool) -> String {
        let mut serializer = url::form_urlencoded::Serializer::new(String::new());
        for (key, value) in self.entries.iter().filter(|(k, _)| keep(k)) {
            serializer.append_pair(key, &value.to_string());
        }
        serializer.finish()
    }
}
