//! ETH/DAI Arbitrage Watcher Library
//!
//! Monitors the Kyber proxy and the Uniswap V2 DAI/WETH pair for a
//! gas-adjusted price discrepancy on every new block, and can trigger a
//! flash-loan arbitrage transaction when one appears.

pub mod arbitrage;
pub mod block_feed;
pub mod config;
pub mod contracts;
pub mod eth_price;
pub mod pricing;
pub mod types;

// Re-export commonly used items
pub use config::load_config;
pub use types::{
    ArbDirection, ArbitrageOpportunity, BotConfig, GasEstimate, Quote, TradeResult, Venue,
    VenueQuotes,
};
