//! Uniswap V2 pair source
//!
//! Quotes both legs off a single `getReserves` read using the constant
//! product formula with the 0.30% fee. Token ordering inside the pair is
//! discovered once at connect time.

use crate::contracts::IUniswapV2Pair;
use crate::pricing::{PriceSource, QuoteError};
use crate::types::{Quote, Venue, VenueQuotes};
use anyhow::{Context, Result};
use async_trait::async_trait;
use ethers::prelude::Middleware;
use ethers::types::{Address, U256};
use std::sync::Arc;

pub struct UniswapPairSource<M> {
    pair: IUniswapV2Pair<M>,
    dai_is_token0: bool,
}

impl<M: Middleware + 'static> UniswapPairSource<M> {
    /// Connect to the pair and discover which side DAI sits on.
    pub async fn connect(client: Arc<M>, pair_address: Address, dai: Address) -> Result<Self> {
        let pair = IUniswapV2Pair::new(pair_address, client);
        let token0 = pair
            .token_0()
            .call()
            .await
            .context("pair token0() failed")?;

        Ok(Self {
            pair,
            dai_is_token0: token0 == dai,
        })
    }

    /// Current reserves as (DAI, WETH) regardless of pair ordering.
    pub async fn reserves(&self) -> Result<(U256, U256)> {
        let (reserve0, reserve1, _) = self
            .pair
            .get_reserves()
            .call()
            .await
            .context("pair getReserves() failed")?;

        let (reserve0, reserve1) = (U256::from(reserve0), U256::from(reserve1));
        Ok(if self.dai_is_token0 {
            (reserve0, reserve1)
        } else {
            (reserve1, reserve0)
        })
    }
}

/// Constant product output with the 0.30% fee (997/1000).
///
/// amount_out = (amount_in * 997 * reserve_out) / (reserve_in * 1000 + amount_in * 997)
pub fn get_amount_out(amount_in: U256, reserve_in: U256, reserve_out: U256) -> U256 {
    if amount_in.is_zero() || reserve_in.is_zero() || reserve_out.is_zero() {
        return U256::zero();
    }

    let amount_in_with_fee = amount_in * U256::from(997);
    let numerator = amount_in_with_fee * reserve_out;
    let denominator = (reserve_in * U256::from(1000)) + amount_in_with_fee;

    numerator / denominator
}

/// Mid price in DAI smallest units per 1 ETH, 1e18-scaled.
pub fn mid_price_dai_per_eth(dai_reserve: U256, weth_reserve: U256) -> U256 {
    if weth_reserve.is_zero() {
        return U256::zero();
    }
    dai_reserve * U256::exp10(18) / weth_reserve
}

#[async_trait]
impl<M: Middleware + 'static> PriceSource for UniswapPairSource<M> {
    fn venue(&self) -> Venue {
        Venue::Uniswap
    }

    async fn quotes(&self, dai_in: U256, eth_in: U256) -> Result<VenueQuotes> {
        let (dai_reserve, weth_reserve) = self.reserves().await?;
        if dai_reserve.is_zero() || weth_reserve.is_zero() {
            return Err(QuoteError::EmptyReserves.into());
        }

        Ok(VenueQuotes {
            venue: Venue::Uniswap,
            buy: Quote::new(
                Venue::Uniswap,
                dai_in,
                get_amount_out(dai_in, dai_reserve, weth_reserve),
            ),
            sell: Quote::new(
                Venue::Uniswap,
                eth_in,
                get_amount_out(eth_in, weth_reserve, dai_reserve),
            ),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_amount_out() {
        // 1 ETH into a 100 ETH / 200,000 DAI pool
        let amount_in = U256::exp10(18);
        let reserve_in = U256::from(100u64) * U256::exp10(18);
        let reserve_out = U256::from(200_000u64) * U256::exp10(18);

        let amount_out = get_amount_out(amount_in, reserve_in, reserve_out);

        // ~1974 DAI after the fee and slippage
        assert!(amount_out > U256::from(1_970u64) * U256::exp10(18));
        assert!(amount_out < U256::from(1_980u64) * U256::exp10(18));
    }

    #[test]
    fn test_get_amount_out_zero_inputs() {
        let hundred = U256::from(100u64);
        assert_eq!(get_amount_out(U256::zero(), hundred, hundred), U256::zero());
        assert_eq!(get_amount_out(hundred, U256::zero(), hundred), U256::zero());
        assert_eq!(get_amount_out(hundred, hundred, U256::zero()), U256::zero());
    }

    #[test]
    fn test_mid_price() {
        let dai_reserve = U256::from(40_000_000u64) * U256::exp10(18);
        let weth_reserve = U256::from(20_000u64) * U256::exp10(18);

        assert_eq!(
            mid_price_dai_per_eth(dai_reserve, weth_reserve),
            U256::from(2000u64) * U256::exp10(18)
        );
        assert_eq!(
            mid_price_dai_per_eth(dai_reserve, U256::zero()),
            U256::zero()
        );
    }
}
