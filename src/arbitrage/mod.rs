//! Arbitrage module
//!
//! Opportunity evaluation and flash-loan execution for the ETH/DAI pair.

pub mod evaluator;
pub mod executor;

pub use executor::FlashLoanExecutor;
