pub mod client;
pub mod execution;
pub mod signer;

pub use client::{ApiResponse, BinanceFuturesClient};
