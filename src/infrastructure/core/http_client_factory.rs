use crate::domain::errors::TransportError;
use crate::domain::ports::{HttpMethod, HttpRequest, HttpResponse, Transport};
use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::CONTENT_TYPE;
use std::time::Duration;

pub const API_KEY_HEADER: &str = "X-MBX-APIKEY";
pub const USED_WEIGHT_HEADER: &str = "X-MBX-USED-WEIGHT-1M";

pub struct HttpClientFactory;

impl HttpClientFactory {
    /// Creates a pooled HTTP client. No retry middleware: the request
    /// pipeline owns retry and backoff decisions.
    pub fn create_client(timeout: Duration) -> Client {
        Client::builder()
            .pool_max_idle_per_host(5)
            .timeout(timeout)
            .connect_timeout(timeout)
            .build()
            .unwrap_or_else(|_| Client::new())
    }
}

/// [`Transport`] backed by `reqwest`
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new(timeout: Duration) -> Self {
        Self {
            client: HttpClientFactory::create_client(timeout),
        }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        let builder = match request.method {
            HttpMethod::Get => self.client.get(&request.url),
            HttpMethod::Post => self.client.post(&request.url),
            HttpMethod::Delete => self.client.delete(&request.url),
        };

        let response = builder
            .header(API_KEY_HEADER, &request.api_key)
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status().as_u16();
        let used_weight = response
            .headers()
            .get(USED_WEIGHT_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = response.text().await.map_err(transport_error)?;

        Ok(HttpResponse {
            status,
            body,
            used_weight,
        })
    }
}

fn transport_error(err: reqwest::Error) -> TransportError {
    // reqwest errors can echo the full URL, which carries the signature
    let err = err.without_url();
    if err.is_timeout() {
        TransportError::timeout(err.to_string())
    } else {
        TransportError::new(err.to_string())
    }
}
