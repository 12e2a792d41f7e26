//! Kyber price source
//!
//! Quotes both legs via `getExpectedRate` on the KyberNetworkProxy.
//! Rates come back 1e18-scaled, destination units per source unit.
//! ETH is not an ERC-20, so Kyber addresses it with a sentinel token.

use crate::contracts::IKyberNetworkProxy;
use crate::pricing::{PriceSource, QuoteError};
use crate::types::{Quote, Venue, VenueQuotes};
use anyhow::{Context, Result};
use async_trait::async_trait;
use ethers::prelude::Middleware;
use ethers::types::{Address, U256};
use std::str::FromStr;
use std::sync::Arc;

/// Kyber's convention for native ETH.
pub const KYBER_ETH_TOKEN: &str = "0xEeeeeEeeeEeEeeEeEeEeeEEEeeeeEeeeeeeeEEeE";

pub struct KyberSource<M> {
    proxy: IKyberNetworkProxy<M>,
    dai: Address,
    eth: Address,
}

impl<M: Middleware + 'static> KyberSource<M> {
    pub fn new(client: Arc<M>, proxy: Address, dai: Address) -> Self {
        Self {
            proxy: IKyberNetworkProxy::new(proxy, client),
            dai,
            eth: Address::from_str(KYBER_ETH_TOKEN).expect("static sentinel address"),
        }
    }

    /// Apply a 1e18-scaled rate to an input amount.
    fn apply_rate(amount_in: U256, rate: U256) -> U256 {
        amount_in * rate / U256::exp10(18)
    }
}

#[async_trait]
impl<M: Middleware + 'static> PriceSource for KyberSource<M> {
    fn venue(&self) -> Venue {
        Venue::Kyber
    }

    async fn quotes(&self, dai_in: U256, eth_in: U256) -> Result<VenueQuotes> {
        let buy_call = self.proxy.get_expected_rate(self.dai, self.eth, dai_in);
        let sell_call = self.proxy.get_expected_rate(self.eth, self.dai, eth_in);

        // Read-only calls, issued together
        let ((buy_rate, _), (sell_rate, _)) = tokio::try_join!(buy_call.call(), sell_call.call())
            .context("Kyber getExpectedRate failed")?;

        if buy_rate.is_zero() {
            return Err(QuoteError::ZeroRate { leg: "DAI->ETH" }.into());
        }
        if sell_rate.is_zero() {
            return Err(QuoteError::ZeroRate { leg: "ETH->DAI" }.into());
        }

        Ok(VenueQuotes {
            venue: Venue::Kyber,
            buy: Quote::new(Venue::Kyber, dai_in, Self::apply_rate(dai_in, buy_rate)),
            sell: Quote::new(Venue::Kyber, eth_in, Self::apply_rate(eth_in, sell_rate)),
        })
    }
}
