//! In-process fakes for the ports: scripted transport, recording sleeper,
//! frozen clock and an order gateway that fills everything it is given.

use crate::domain::errors::{ClientError, TransportError};
use crate::domain::ports::{Clock, HttpRequest, HttpResponse, OrderGateway, Sleeper, Transport};
use crate::domain::trading::params::RequestParams;
use async_trait::async_trait;
use serde_json::{Map, Value, json};
use std::collections::{HashSet, VecDeque};
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Transport replaying a fixed script of outcomes, recording each request
#[derive(Default)]
pub struct MockTransport {
    script: Mutex<VecDeque<Result<HttpResponse, TransportError>>>,
    fallback: Option<HttpResponse>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl MockTransport {
    pub fn new(script: Vec<Result<HttpResponse, TransportError>>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            fallback: None,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Script of bare status codes with empty JSON bodies
    pub fn with_statuses(statuses: &[u16]) -> Self {
        Self::new(
            statuses
                .iter()
                .map(|status| Ok(HttpResponse::new(*status, "{}")))
                .collect(),
        )
    }

    /// Response returned once the script runs dry
    pub fn with_fallback(mut self, response: HttpResponse) -> Self {
        self.fallback = Some(response);
        self
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        lock(&self.requests).clone()
    }

    pub fn call_count(&self) -> usize {
        lock(&self.requests).len()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        lock(&self.requests).push(request.clone());
        match lock(&self.script).pop_front() {
            Some(outcome) => outcome,
            None => self
                .fallback
                .clone()
                .ok_or_else(|| TransportError::new("mock transport script exhausted")),
        }
    }
}

/// Sleeper that returns immediately and remembers what it was asked to wait
#[derive(Default)]
pub struct RecordingSleeper {
    sleeps: Mutex<Vec<Duration>>,
}

impl RecordingSleeper {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sleeps(&self) -> Vec<Duration> {
        lock(&self.sleeps).clone()
    }

    pub fn total(&self) -> Duration {
        lock(&self.sleeps).iter().sum()
    }
}

#[async_trait]
impl Sleeper for RecordingSleeper {
    async fn sleep(&self, duration: Duration) {
        lock(&self.sleeps).push(duration);
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub i64);

impl Clock for FixedClock {
    fn now_ms(&self) -> i64 {
        self.0
    }
}

/// Average price reported by [`MockOrderGateway`] fills
pub const MOCK_FILL_PRICE: &str = "100";

/// Gateway that acknowledges every order as FILLED at [`MOCK_FILL_PRICE`],
/// except for the 1-based call numbers listed in `failing_calls`.
pub struct MockOrderGateway {
    placed: Mutex<Vec<RequestParams>>,
    failing_calls: HashSet<usize>,
    next_order_id: AtomicI64,
    calls: Mutex<usize>,
}

impl Default for MockOrderGateway {
    fn default() -> Self {
        Self::new()
    }
}

impl MockOrderGateway {
    pub fn new() -> Self {
        Self {
            placed: Mutex::new(Vec::new()),
            failing_calls: HashSet::new(),
            next_order_id: AtomicI64::new(1),
            calls: Mutex::new(0),
        }
    }

    pub fn failing_on_calls(mut self, calls: &[usize]) -> Self {
        self.failing_calls = calls.iter().copied().collect();
        self
    }

    /// Parameters of every accepted order, in placement order
    pub fn placed(&self) -> Vec<RequestParams> {
        lock(&self.placed).clone()
    }

    pub fn call_count(&self) -> usize {
        *lock(&self.calls)
    }
}

#[async_trait]
impl OrderGateway for MockOrderGateway {
    async fn place_order(&self, params: RequestParams) -> Result<Value, ClientError> {
        let call = {
            let mut calls = lock(&self.calls);
            *calls += 1;
            *calls
        };

        if self.failing_calls.contains(&call) {
            return Err(ClientError::Api {
                status: 400,
                body: json!({"code": -2019, "msg": "Margin is insufficient."}),
            });
        }

        let mut body = Map::new();
        for (key, value) in params.iter() {
            body.insert(key.to_string(), Value::String(value.to_string()));
        }
        let quantity = params
            .get("quantity")
            .map(|q| q.to_string())
            .unwrap_or_default();
        let order_id = self.next_order_id.fetch_add(1, Ordering::SeqCst);
        body.insert("orderId".to_string(), json!(order_id));
        body.insert("status".to_string(), json!("FILLED"));
        body.insert("origQty".to_string(), json!(quantity));
        body.insert("executedQty".to_string(), json!(quantity));
        body.insert(
            "avgPrice".to_string(),
            json!(MOCK_FILL_PRICE),
        );

        lock(&self.placed).push(params);
        Ok(Value::Object(body))
    }
}
