//! Opportunity evaluator
//!
//! The per-block decision core: normalizes both venues' quotes into one
//! DAI round trip per direction, nets out the gas cost in DAI, and picks
//! the more profitable direction if it clears zero. Pure integer fixed
//! point — `U256` amounts, `I256` deltas — so 1e18-denominated amounts
//! compare exactly.

use crate::types::{ArbDirection, ArbitrageOpportunity, GasEstimate, VenueQuotes};
use ethers::types::{I256, U256};
use ethers::utils::format_ether;
use tracing::debug;

/// DAI received from a full round trip: the `buy` venue turns its DAI
/// notional into ETH, the `sell` venue turns that ETH back into DAI.
/// The sell leg is rescaled linearly from its quoted ETH notional.
pub fn round_trip_dai_out(buy: &VenueQuotes, sell: &VenueQuotes) -> U256 {
    sell.sell.output_for(buy.buy.amount_out)
}

/// Net result of a round trip in DAI smallest units. Saturating: a
/// pathological quote cannot wrap into a fake profit.
pub fn net_profit(dai_in: U256, dai_out: U256, gas_cost_dai: U256) -> I256 {
    I256::from_raw(dai_out)
        .saturating_sub(I256::from_raw(dai_in))
        .saturating_sub(I256::from_raw(gas_cost_dai))
}

/// Evaluate one block's quotes against each other.
///
/// Returns the more profitable direction iff its net profit is strictly
/// greater than zero; a zero-profit spread is not actionable. The
/// decision is a function of its arguments only — identical frozen
/// inputs always yield the identical decision.
pub fn evaluate(
    block_number: u64,
    kyber: &VenueQuotes,
    uniswap: &VenueQuotes,
    gas: &GasEstimate,
    eth_price_dai: U256,
) -> Option<ArbitrageOpportunity> {
    let gas_cost_dai = gas.cost_dai(eth_price_dai);

    let kyber_first_out = round_trip_dai_out(kyber, uniswap);
    let uniswap_first_out = round_trip_dai_out(uniswap, kyber);

    let kyber_first = net_profit(kyber.buy.amount_in, kyber_first_out, gas_cost_dai);
    let uniswap_first = net_profit(uniswap.buy.amount_in, uniswap_first_out, gas_cost_dai);

    debug!(
        "Block {}: Kyber-first {} DAI, Uniswap-first {} DAI, gas {} DAI",
        block_number,
        kyber_first,
        uniswap_first,
        format_ether(gas_cost_dai)
    );

    let (direction, dai_in, expected_dai_out, profit) = if kyber_first >= uniswap_first {
        (
            ArbDirection::KyberToUniswap,
            kyber.buy.amount_in,
            kyber_first_out,
            kyber_first,
        )
    } else {
        (
            ArbDirection::UniswapToKyber,
            uniswap.buy.amount_in,
            uniswap_first_out,
            uniswap_first,
        )
    };

    if profit > I256::zero() {
        Some(ArbitrageOpportunity {
            direction,
            dai_in,
            expected_dai_out,
            gas_cost_dai,
            net_profit_dai: profit.into_raw(),
            block_number,
        })
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Quote, Venue};

    fn dai(n: u64) -> U256 {
        U256::from(n) * U256::exp10(18)
    }

    fn eth(n: u64) -> U256 {
        U256::from(n) * U256::exp10(18)
    }

    fn venue_quotes(venue: Venue, dai_in: U256, eth_out: U256, eth_in: U256, dai_out: U256) -> VenueQuotes {
        VenueQuotes {
            venue,
            buy: Quote::new(venue, dai_in, eth_out),
            sell: Quote::new(venue, eth_in, dai_out),
        }
    }

    /// 200k gas at 25 gwei with ETH at 2000 DAI costs exactly 10 DAI.
    fn ten_dai_gas() -> (GasEstimate, U256) {
        let gas = GasEstimate {
            gas_price: U256::from(25_000_000_000u64),
            gas_units: 200_000,
        };
        let eth_price = dai(2000);
        assert_eq!(gas.cost_dai(eth_price), dai(10));
        (gas, eth_price)
    }

    #[test]
    fn test_equal_quotes_no_opportunity() {
        let kyber = venue_quotes(Venue::Kyber, dai(20_000), eth(10), eth(10), dai(20_000));
        let uniswap = venue_quotes(Venue::Uniswap, dai(20_000), eth(10), eth(10), dai(20_000));
        let (gas, eth_price) = ten_dai_gas();

        assert_eq!(evaluate(1, &kyber, &uniswap, &gas, eth_price), None);
    }

    #[test]
    fn test_known_spread_nets_gas() {
        // Kyber-first round trip returns 20050 DAI on 20000 in,
        // Uniswap-first returns 19950. Gas costs 10 DAI.
        let kyber = venue_quotes(Venue::Kyber, dai(20_000), eth(10), eth(10), dai(19_950));
        let uniswap = venue_quotes(Venue::Uniswap, dai(20_000), eth(10), eth(10), dai(20_050));
        let (gas, eth_price) = ten_dai_gas();

        let opp = evaluate(1, &kyber, &uniswap, &gas, eth_price).expect("spread clears gas");

        assert_eq!(opp.direction, ArbDirection::KyberToUniswap);
        assert_eq!(opp.dai_in, dai(20_000));
        assert_eq!(opp.expected_dai_out, dai(20_050));
        assert_eq!(opp.gas_cost_dai, dai(10));
        assert_eq!(opp.net_profit_dai, dai(40));

        // The reverse direction is underwater before gas is even counted
        let reverse = net_profit(dai(20_000), dai(19_950), dai(10));
        assert!(reverse < I256::zero());
    }

    #[test]
    fn test_zero_profit_is_not_actionable() {
        // Round trip returns exactly notional + gas: nothing left
        let kyber = venue_quotes(Venue::Kyber, dai(20_000), eth(10), eth(10), dai(19_000));
        let uniswap = venue_quotes(Venue::Uniswap, dai(20_000), eth(10), eth(10), dai(20_010));
        let (gas, eth_price) = ten_dai_gas();

        assert_eq!(evaluate(1, &kyber, &uniswap, &gas, eth_price), None);

        // One smallest unit above the break-even line flips the decision
        let uniswap = venue_quotes(
            Venue::Uniswap,
            dai(20_000),
            eth(10),
            eth(10),
            dai(20_010) + U256::one(),
        );
        let opp = evaluate(1, &kyber, &uniswap, &gas, eth_price).expect("one wei of profit");
        assert_eq!(opp.net_profit_dai, U256::one());
    }

    #[test]
    fn test_gas_cost_can_erase_the_spread() {
        // 50 DAI gross spread, but gas at 400 gwei costs 160 DAI
        let kyber = venue_quotes(Venue::Kyber, dai(20_000), eth(10), eth(10), dai(19_950));
        let uniswap = venue_quotes(Venue::Uniswap, dai(20_000), eth(10), eth(10), dai(20_050));
        let gas = GasEstimate {
            gas_price: U256::from(400_000_000_000u64),
            gas_units: 200_000,
        };

        assert_eq!(evaluate(1, &kyber, &uniswap, &gas, dai(2000)), None);
    }

    #[test]
    fn test_sell_leg_rescaled_to_bought_eth() {
        // Buy leg yields 5 ETH; sell quote is for 10 ETH and must scale down
        let kyber = venue_quotes(Venue::Kyber, dai(20_000), eth(5), eth(10), dai(19_000));
        let uniswap = venue_quotes(Venue::Uniswap, dai(20_000), eth(5), eth(10), dai(41_000));

        assert_eq!(round_trip_dai_out(&kyber, &uniswap), dai(20_500));
    }

    #[test]
    fn test_idempotent_for_frozen_inputs() {
        let kyber = venue_quotes(Venue::Kyber, dai(20_000), eth(10), eth(10), dai(19_950));
        let uniswap = venue_quotes(Venue::Uniswap, dai(20_000), eth(10), eth(10), dai(20_050));
        let (gas, eth_price) = ten_dai_gas();

        let first = evaluate(7, &kyber, &uniswap, &gas, eth_price);
        let second = evaluate(7, &kyber, &uniswap, &gas, eth_price);
        assert_eq!(first, second);
    }
}
