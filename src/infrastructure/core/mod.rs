pub mod http_client_factory;
pub mod time;

pub use http_client_factory::{HttpClientFactory, ReqwestTransport};
pub use time::{SystemClock, TokioSleeper};
