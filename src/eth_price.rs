//! ETH price feed
//!
//! A periodic task that refreshes the DAI-per-ETH mid price from the
//! Uniswap pair and writes it into a single shared slot. The evaluation
//! loop reads the slot to convert gas cost into DAI; only this task
//! writes it.

use crate::pricing::{uniswap, UniswapPairSource};
use ethers::prelude::Middleware;
use ethers::types::U256;
use ethers::utils::format_ether;
use std::sync::Arc;
use tokio::sync::RwLock;
use tokio::time::{interval, Duration};
use tracing::{debug, warn};

/// DAI smallest units per 1 ETH, 1e18-scaled. Zero means "unknown".
pub type SharedEthPrice = Arc<RwLock<U256>>;

pub fn shared_price(initial: U256) -> SharedEthPrice {
    Arc::new(RwLock::new(initial))
}

pub struct EthPriceUpdater<M> {
    source: Arc<UniswapPairSource<M>>,
    price: SharedEthPrice,
    refresh: Duration,
}

impl<M: Middleware + 'static> EthPriceUpdater<M> {
    pub fn new(source: Arc<UniswapPairSource<M>>, price: SharedEthPrice, refresh_secs: u64) -> Self {
        Self {
            source,
            price,
            refresh: Duration::from_secs(refresh_secs),
        }
    }

    /// Runs forever; a failed refresh keeps the previous value.
    pub async fn run(&self) {
        // First tick fires immediately, replacing the configured seed
        let mut ticker = interval(self.refresh);

        loop {
            ticker.tick().await;

            match self.source.reserves().await {
                Ok((dai_reserve, weth_reserve)) => {
                    let mid = uniswap::mid_price_dai_per_eth(dai_reserve, weth_reserve);
                    if mid.is_zero() {
                        warn!("Pair mid price is zero - keeping previous ETH price");
                        continue;
                    }

                    let mut slot = self.price.write().await;
                    *slot = mid;
                    debug!("ETH price refreshed: {} DAI", format_ether(mid));
                }
                Err(e) => warn!("ETH price refresh failed: {}", e),
            }
        }
    }
}
