use serde_json::Value;
use thiserror::Error;

/// Errors raised when caller-supplied order input breaks a rule
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Symbol must be a non-empty string")]
    EmptySymbol,

    #[error("Invalid symbol format: {symbol}")]
    InvalidSymbol { symbol: String },

    #[error("Side must be one of [BUY, SELL], got: {side}")]
    InvalidSide { side: String },

    #[error("{field} must be a number, got: {value}")]
    NotANumber { field: &'static str, value: String },

    #[error("{field} must be positive, got: {value}")]
    NotPositive { field: &'static str, value: String },

    #[error("{field} is outside the supported range (28 significant decimal digits), got: {value}")]
    OutOfRange { field: &'static str, value: String },

    #[error(
        "Order type must be one of [MARKET, LIMIT, STOP, STOP_MARKET, TAKE_PROFIT, TAKE_PROFIT_MARKET], got: {order_type}"
    )]
    InvalidOrderType { order_type: String },

    #[error("Time in force must be one of [GTC, IOC, FOK, GTX], got: {value}")]
    InvalidTimeInForce { value: String },

    #[error("{reason}")]
    InvalidParameter { reason: String },
}

impl ValidationError {
    pub fn parameter(reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            reason: reason.into(),
        }
    }
}

/// Network-level failure reported by a transport (connection refused, timeout, reset)
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{reason}")]
pub struct TransportError {
    pub reason: String,
    pub timed_out: bool,
}

impl TransportError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
            timed_out: false,
        }
    }

    pub fn timeout(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
            timed_out: true,
        }
    }
}

/// Errors surfaced by the authenticated request pipeline
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Unsupported HTTP method: {0}")]
    UnsupportedMethod(String),

    #[error("Invalid request: {reason}")]
    InvalidRequest { reason: String },

    #[error("Max retries exceeded after {attempts} attempts: {cause}")]
    MaxRetriesExceeded {
        attempts: u32,
        #[source]
        cause: TransportError,
    },

    #[error("IP banned or WAF limit violated (HTTP {status}): {body}")]
    Banned { status: u16, body: String },

    #[error("API Error {status}: {body}")]
    Api { status: u16, body: Value },

    #[error("Malformed response body (HTTP {status}): {reason}")]
    Decode { status: u16, reason: String },

    #[error("Request failed after {attempts} attempts")]
    RequestFailed { attempts: u32 },
}

impl ClientError {
    /// Exchange error code (`{"code": -1121, "msg": "..."}`) when the body carries one
    pub fn api_code(&self) -> Option<i64> {
        match self {
            ClientError::Api { body, .. } => body.get("code").and_then(Value::as_i64),
            _ => None,
        }
    }

    pub fn is_banned(&self) -> bool {
        matches!(self, ClientError::Banned { .. })
    }
}

/// Errors returned by strategy executors
#[derive(Debug, Error)]
pub enum OrderError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Exchange error: {0}")]
    Client(#[from] ClientError),
}
