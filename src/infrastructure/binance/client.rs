//! Authenticated request pipeline for the Binance USDT-M futures REST API.
//!
//! One call to [`BinanceFuturesClient::send`]:
//! - signs the parameters when asked (`timestamp`, `recvWindow`, `signature`)
//! - runs up to `max_retries` attempts through the [`Transport`]
//! - classifies each attempt as an [`ApiResponse`] and lets the loop decide
//!   between returning, backing off, or failing
//!
//! Rate limiting (429) is transient and backed off linearly. Bans (418/403)
//! and every other non-200 status are final on the first occurrence.

use crate::config::{ClientSettings, Credentials};
use crate::domain::errors::{ClientError, TransportError};
use crate::domain::ports::{Clock, HttpMethod, HttpRequest, HttpResponse, Sleeper, Transport};
use crate::domain::trading::params::RequestParams;
use crate::infrastructure::binance::signer::{self, SIGNATURE_PARAM};
use crate::infrastructure::core::{ReqwestTransport, SystemClock, TokioSleeper};
use crate::infrastructure::observability::Redactor;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Outcome of a single HTTP attempt
#[derive(Debug)]
pub enum ApiResponse {
    Success(Value),
    RateLimited,
    Banned { status: u16, body: String },
    ApiError { status: u16, body: Value },
    Malformed { status: u16, reason: String },
    Transport(TransportError),
}

impl ApiResponse {
    pub fn classify(outcome: Result<HttpResponse, TransportError>) -> Self {
        let response = match outcome {
            Ok(response) => response,
            Err(err) => return ApiResponse::Transport(err),
        };

        match response.status {
            200 => match serde_json::from_str(&response.body) {
                Ok(body) => ApiResponse::Success(body),
                Err(e) => ApiResponse::Malformed {
                    status: 200,
                    reason: e.to_string(),
                },
            },
            429 => ApiResponse::RateLimited,
            418 | 403 => ApiResponse::Banned {
                status: response.status,
                body: response.body,
            },
            status => ApiResponse::ApiError {
                status,
                body: serde_json::from_str(&response.body)
                    .unwrap_or(Value::String(response.body)),
            },
        }
    }
}

pub struct BinanceFuturesClient {
    transport: Arc<dyn Transport>,
    clock: Arc<dyn Clock>,
    sleeper: Arc<dyn Sleeper>,
    credentials: Credentials,
    settings: ClientSettings,
    redactor: Arc<Redactor>,
}

impl BinanceFuturesClient {
    /// Production wiring: reqwest transport, wall clock, tokio timer
    pub fn new(credentials: Credentials, settings: ClientSettings) -> Self {
        let transport = Arc::new(ReqwestTransport::new(settings.request_timeout));
        Self::with_components(
            credentials,
            settings,
            transport,
            Arc::new(SystemClock),
            Arc::new(TokioSleeper),
        )
    }

    pub fn with_components(
        credentials: Credentials,
        settings: ClientSettings,
        transport: Arc<dyn Transport>,
        clock: Arc<dyn Clock>,
        sleeper: Arc<dyn Sleeper>,
    ) -> Self {
        let redactor = Arc::new(Redactor::for_credentials(&credentials));
        info!(base_url = %settings.base_url, "Binance futures client initialized");

        Self {
            transport,
            clock,
            sleeper,
            credentials,
            settings,
            redactor,
        }
    }

    /// Adds `timestamp`, `recvWindow` and `signature` to `params`; returns the signature
    fn sign_params(&self, params: &mut RequestParams) -> String {
        params.insert(
            "timestamp",
            self.clock.now_ms() - self.settings.timestamp_offset_ms,
        );
        params.insert("recvWindow", self.settings.recv_window_ms);
        let signature = signer::sign(self.credentials.api_secret(), params);
        params.insert(SIGNATURE_PARAM, signature.clone());
        signature
    }

    pub async fn send(
        &self,
        method: HttpMethod,
        path: &str,
        mut params: RequestParams,
        signed: bool,
    ) -> Result<Value, ClientError> {
        let signature = if signed {
            Some(self.sign_params(&mut params))
        } else {
            None
        };
        let extra_secrets: Vec<&str> = signature.iter().map(String::as_str).collect();

        let query = params.encode();
        let url = if query.is_empty() {
            format!("{}{}", self.settings.base_url, path)
        } else {
            format!("{}{}?{}", self.settings.base_url, path, query)
        };
        url::Url::parse(&url).map_err(|e| ClientError::InvalidRequest {
            reason: format!("{path}: {e}"),
        })?;
        let request = HttpRequest {
            method,
            url,
            api_key: self.credentials.api_key().to_string(),
        };

        let max_retries = self.settings.max_retries;
        for attempt in 0..max_retries {
            debug!(
                method = %method,
                path,
                attempt = attempt + 1,
                params = %self.redactor.redact_params(&params, &extra_secrets),
                "API request"
            );

            let outcome = self.transport.execute(&request).await;
            if let Ok(response) = &outcome
                && let Some(weight) = &response.used_weight
            {
                debug!(used_weight = %weight, "Rate limit weight used");
            }

            match ApiResponse::classify(outcome) {
                ApiResponse::Success(body) => {
                    info!(method = %method, path, status = 200, "API success");
                    return Ok(body);
                }
                ApiResponse::RateLimited => {
                    let delay = self.settings.retry_delay * (attempt + 1);
                    warn!(
                        method = %method,
                        path,
                        attempt = attempt + 1,
                        delay_ms = delay.as_millis() as u64,
                        "Rate limit exceeded, backing off"
                    );
                    self.sleeper.sleep(delay).await;
                }
                ApiResponse::Banned { status, body } => {
                    error!(
                        critical = true,
                        method = %method,
                        path,
                        status,
                        "IP banned or WAF limit violated"
                    );
                    return Err(ClientError::Banned {
                        status,
                        body: self.redactor.redact(&body, &extra_secrets),
                    });
                }
                ApiResponse::ApiError { status, body } => {
                    error!(
                        method = %method,
                        path,
                        status,
                        error = %self.redactor.redact(&body.to_string(), &extra_secrets),
                        "API error"
                    );
                    return Err(ClientError::Api { status, body });
                }
                ApiResponse::Malformed { status, reason } => {
                    error!(method = %method, path, status, reason = %reason, "Undecodable response body");
                    return Err(ClientError::Decode { status, reason });
                }
                ApiResponse::Transport(cause) => {
                    error!(
                        method = %method,
                        path,
                        attempt = attempt + 1,
                        timed_out = cause.timed_out,
                        error = %self.redactor.redact(&cause.reason, &extra_secrets),
                        "Request failed"
                    );
                    if attempt + 1 >= max_retries {
                        return Err(ClientError::MaxRetriesExceeded {
                            attempts: max_retries,
                            cause: TransportError {
                                reason: self.redactor.redact(&cause.reason, &extra_secrets),
                                timed_out: cause.timed_out,
                            },
                        });
                    }
                    self.sleeper.sleep(self.settings.retry_delay).await;
                }
            }
        }

        error!(method = %method, path, attempts = max_retries, "Request failed after all retries");
        Err(ClientError::RequestFailed {
            attempts: max_retries,
        })
    }

    /// `send` for callers holding the method as text; anything but GET/POST/DELETE fails before any I/O
    pub async fn send_raw(
        &self,
        method: &str,
        path: &str,
        params: RequestParams,
        signed: bool,
    ) -> Result<Value, ClientError> {
        let method: HttpMethod = method.parse()?;
        self.send(method, path, params, signed).await
    }
}
