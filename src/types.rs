//! Core data structures for the ETH/DAI arbitrage watcher.
//!
//! All amounts are `U256` in the token's smallest unit (18 decimals for
//! both DAI and WETH); profit deltas are `I256`. Prices never touch
//! floating point on the decision path.

use ethers::types::{Address, U256};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The two pricing venues we compare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Venue {
    Kyber,
    Uniswap,
}

impl fmt::Display for Venue {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Venue::Kyber => write!(f, "Kyber"),
            Venue::Uniswap => write!(f, "Uniswap"),
        }
    }
}

/// Round-trip direction: the venue where ETH is bought comes first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ArbDirection {
    KyberToUniswap,
    UniswapToKyber,
}

impl ArbDirection {
    /// Venue where the DAI -> ETH leg executes.
    pub fn buy_venue(&self) -> Venue {
        match self {
            ArbDirection::KyberToUniswap => Venue::Kyber,
            ArbDirection::UniswapToKyber => Venue::Uniswap,
        }
    }

    /// Venue where the ETH -> DAI leg executes.
    pub fn sell_venue(&self) -> Venue {
        match self {
            ArbDirection::KyberToUniswap => Venue::Uniswap,
            ArbDirection::UniswapToKyber => Venue::Kyber,
        }
    }

    /// Encoding expected by the flash-loan contract's Direction enum.
    pub fn flash_loan_code(&self) -> U256 {
        match self {
            ArbDirection::KyberToUniswap => U256::zero(),
            ArbDirection::UniswapToKyber => U256::one(),
        }
    }
}

impl fmt::Display for ArbDirection {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "buy ETH on {}, sell on {}", self.buy_venue(), self.sell_venue())
    }
}

/// One observed exchange rate: `amount_in` of one asset bought
/// `amount_out` of the other on `venue` at one instant. Recomputed every
/// block, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quote {
    pub venue: Venue,
    pub amount_in: U256,
    pub amount_out: U256,
}

impl Quote {
    pub fn new(venue: Venue, amount_in: U256, amount_out: U256) -> Self {
        Self {
            venue,
            amount_in,
            amount_out,
        }
    }

    /// Output linearly rescaled to a different input amount.
    ///
    /// Ignores slippage between the quoted notional and `amount_in`;
    /// acceptable because the two are within one trade of each other.
    pub fn output_for(&self, amount_in: U256) -> U256 {
        if self.amount_in.is_zero() {
            return U256::zero();
        }
        self.amount_out * amount_in / self.amount_in
    }
}

/// Both legs quoted by one venue for the fixed notionals:
/// `buy` spends DAI for ETH, `sell` spends ETH for DAI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VenueQuotes {
    pub venue: Venue,
    pub buy: Quote,
    pub sell: Quote,
}

/// Current gas price plus the unit estimate for the candidate
/// transaction. Used only to compute cost, not retained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GasEstimate {
    pub gas_price: U256,
    pub gas_units: u64,
}

impl GasEstimate {
    /// Transaction cost in ETH wei.
    pub fn cost_wei(&self) -> U256 {
        self.gas_price * U256::from(self.gas_units)
    }

    /// Transaction cost converted into DAI smallest units at the given
    /// 1e18-scaled DAI-per-ETH price.
    pub fn cost_dai(&self, eth_price_dai: U256) -> U256 {
        self.cost_wei() * eth_price_dai / U256::exp10(18)
    }
}

/// A profitable gas-adjusted spread. Ephemeral, discarded after one
/// evaluation cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArbitrageOpportunity {
    pub direction: ArbDirection,
    /// DAI notional entering the round trip.
    pub dai_in: U256,
    /// DAI expected back from the round trip.
    pub expected_dai_out: U256,
    /// Gas cost in DAI already deducted from `net_profit_dai`.
    pub gas_cost_dai: U256,
    /// Strictly positive by construction.
    pub net_profit_dai: U256,
    pub block_number: u64,
}

/// Trade execution result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradeResult {
    pub direction: String,
    pub tx_hash: Option<String>,
    pub block_number: Option<u64>,
    pub success: bool,
    pub net_profit_dai: U256,
    pub execution_time_ms: u64,
    pub error: Option<String>,
}

/// Bot configuration
#[derive(Debug, Clone)]
pub struct BotConfig {
    // Network
    pub ws_rpc_url: String,
    pub chain_id: u64,

    // Wallet (required only in live mode)
    pub private_key: Option<String>,

    // Contracts
    pub kyber_proxy: Address,
    pub uniswap_pair: Address,
    pub dai: Address,
    pub weth: Address,
    pub dydx_solo: Address,
    pub flashloan_contract: Option<Address>,

    // Trading parameters
    pub trade_amount_eth: U256,
    pub flash_arb_gas_units: u64,
    pub max_gas_price_gwei: u64,
    pub min_profit_dai: U256,

    // ETH price refresh
    pub fallback_eth_price_dai: U256,
    pub price_refresh_secs: u64,

    // Mode
    pub live_mode: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_output_scales_linearly() {
        // 20000 DAI -> 10 ETH, so 10000 DAI -> 5 ETH
        let quote = Quote::new(
            Venue::Uniswap,
            U256::from(20_000u64) * U256::exp10(18),
            U256::from(10u64) * U256::exp10(18),
        );

        let half = quote.output_for(U256::from(10_000u64) * U256::exp10(18));
        assert_eq!(half, U256::from(5u64) * U256::exp10(18));

        // Quoted notional maps to the quoted output exactly
        assert_eq!(quote.output_for(quote.amount_in), quote.amount_out);
    }

    #[test]
    fn test_quote_output_zero_notional() {
        let quote = Quote::new(Venue::Kyber, U256::zero(), U256::zero());
        assert_eq!(quote.output_for(U256::exp10(18)), U256::zero());
    }

    #[test]
    fn test_gas_cost_conversion() {
        // 200k gas at 25 gwei = 0.005 ETH; at 2000 DAI/ETH that is 10 DAI
        let gas = GasEstimate {
            gas_price: U256::from(25_000_000_000u64),
            gas_units: 200_000,
        };
        assert_eq!(gas.cost_wei(), U256::from(5_000_000_000_000_000u64));

        let eth_price = U256::from(2000u64) * U256::exp10(18);
        assert_eq!(gas.cost_dai(eth_price), U256::from(10u64) * U256::exp10(18));
    }

    #[test]
    fn test_direction_encoding() {
        assert_eq!(ArbDirection::KyberToUniswap.flash_loan_code(), U256::zero());
        assert_eq!(ArbDirection::UniswapToKyber.flash_loan_code(), U256::one());
        assert_eq!(ArbDirection::KyberToUniswap.buy_venue(), Venue::Kyber);
        assert_eq!(ArbDirection::KyberToUniswap.sell_venue(), Venue::Uniswap);
    }
}
