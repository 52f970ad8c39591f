use std::sync::Arc;
use tracing::info;

use crate::application::strategies::{GridExecutor, OcoExecutor, OrderExecutor, TwapExecutor};
use crate::config::Config;
use crate::domain::ports::{Clock, Sleeper, Transport};
use crate::infrastructure::binance::BinanceFuturesClient;
use crate::infrastructure::core::TokioSleeper;

/// Everything a command needs, wired once from the configuration.
///
/// The client and executors are shared read-only; commands run one after
/// another on the same instances.
pub struct Application {
    pub config: Config,
    pub client: Arc<BinanceFuturesClient>,
    pub orders: OrderExecutor,
    pub grid: GridExecutor,
    pub twap: TwapExecutor,
    pub oco: OcoExecutor,
}

impl Application {
    pub fn build(config: Config) -> Self {
        info!(
            testnet = config.binance.testnet,
            base_url = %config.binance.base_url,
            "Building trading application"
        );
        let client = Arc::new(BinanceFuturesClient::new(
            config.binance.credentials.clone(),
            config.client_settings(),
        ));
        Self::assemble(config, client, Arc::new(TokioSleeper))
    }

    /// Wiring with caller-supplied transport, clock and sleeper
    pub fn with_components(
        config: Config,
        transport: Arc<dyn Transport>,
        clock: Arc<dyn Clock>,
        sleeper: Arc<dyn Sleeper>,
    ) -> Self {
        let client = Arc::new(BinanceFuturesClient::with_components(
            config.binance.credentials.clone(),
            config.client_settings(),
            transport,
            clock,
            Arc::clone(&sleeper),
        ));
        Self::assemble(config, client, sleeper)
    }

    fn assemble(config: Config, client: Arc<BinanceFuturesClient>, sleeper: Arc<dyn Sleeper>) -> Self {
        let orders = OrderExecutor::new(client.clone());
        Self {
            config,
            grid: GridExecutor::new(orders.clone()),
            twap: TwapExecutor::new(orders.clone(), sleeper),
            oco: OcoExecutor::new(orders.clone()),
            orders,
            client,
        }
    }
}
