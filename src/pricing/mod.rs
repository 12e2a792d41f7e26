//! Pricing sources
//!
//! The two independent quoting venues for the ETH/DAI pair, behind one
//! async seam so the evaluation loop does not care how a venue derives
//! its numbers (aggregator rate vs. AMM reserves).

pub mod kyber;
pub mod uniswap;

pub use kyber::KyberSource;
pub use uniswap::UniswapPairSource;

use crate::types::{Venue, VenueQuotes};
use anyhow::Result;
use async_trait::async_trait;
use ethers::types::U256;
use thiserror::Error;

/// Domain failures a venue can report besides transport errors.
#[derive(Debug, Error)]
pub enum QuoteError {
    /// Kyber signals missing liquidity with a zero expected rate.
    #[error("zero expected rate for {leg} leg")]
    ZeroRate { leg: &'static str },
    /// The pair has nothing to quote against.
    #[error("pair has empty reserves")]
    EmptyReserves,
}

/// A venue that quotes both legs of the ETH/DAI round trip.
///
/// `dai_in` is the DAI notional for the buy leg (DAI -> ETH), `eth_in`
/// the ETH notional for the sell leg (ETH -> DAI). Implementations may
/// fetch the legs concurrently; both must come back before the quotes
/// are returned.
#[async_trait]
pub trait PriceSource: Send + Sync {
    fn venue(&self) -> Venue;

    async fn quotes(&self, dai_in: U256, eth_in: U256) -> Result<VenueQuotes>;
}
