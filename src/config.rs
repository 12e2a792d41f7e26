//! Configuration management
//! Load settings from .env / process environment.
//!
//! Only `WS_RPC_URL` is required for watch-only operation; contract
//! addresses default to Ethereum mainnet. Live mode additionally needs
//! `PRIVATE_KEY` and `FLASHLOAN_CONTRACT`.

use crate::types::BotConfig;
use anyhow::{Context, Result};
use ethers::types::Address;
use ethers::utils::parse_ether;
use std::str::FromStr;

// Ethereum mainnet addresses
const DEFAULT_KYBER_PROXY: &str = "0x818E6FECD516Ecc3849DAf6845e3EC868087B755";
const DEFAULT_UNISWAP_PAIR: &str = "0xA478c2975Ab1Ea89e8196811F51A7B7Ade33eB11"; // DAI/WETH
const DEFAULT_DAI: &str = "0x6B175474E89094C44Da98b954EedeAC495271d0F";
const DEFAULT_WETH: &str = "0xC02aaA39b223FE8D0A0e5C4F27eAD9083C756Cc2";
const DEFAULT_DYDX_SOLO: &str = "0x1E0447b19BB6EcFdAe1e4AE1694b0C3659614e4e";

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn addr_env_or(key: &str, default: &str) -> Result<Address> {
    Address::from_str(&env_or(key, default))
        .with_context(|| format!("invalid address in {}", key))
}

pub fn load_config() -> Result<BotConfig> {
    dotenv::dotenv().ok();

    let ws_rpc_url = std::env::var("WS_RPC_URL").context("WS_RPC_URL not set")?;

    let live_mode = env_or("LIVE_MODE", "false")
        .parse::<bool>()
        .context("LIVE_MODE must be true or false")?;

    let private_key = std::env::var("PRIVATE_KEY").ok();
    let flashloan_contract = match std::env::var("FLASHLOAN_CONTRACT") {
        Ok(s) => Some(Address::from_str(&s).context("invalid FLASHLOAN_CONTRACT")?),
        Err(_) => None,
    };

    if live_mode && private_key.is_none() {
        anyhow::bail!("LIVE_MODE requires PRIVATE_KEY");
    }
    if live_mode && flashloan_contract.is_none() {
        anyhow::bail!("LIVE_MODE requires FLASHLOAN_CONTRACT");
    }

    Ok(BotConfig {
        ws_rpc_url,
        chain_id: env_or("CHAIN_ID", "1")
            .parse()
            .context("invalid CHAIN_ID")?,

        private_key,

        kyber_proxy: addr_env_or("KYBER_PROXY", DEFAULT_KYBER_PROXY)?,
        uniswap_pair: addr_env_or("UNISWAP_PAIR", DEFAULT_UNISWAP_PAIR)?,
        dai: addr_env_or("DAI_ADDRESS", DEFAULT_DAI)?,
        weth: addr_env_or("WETH_ADDRESS", DEFAULT_WETH)?,
        dydx_solo: addr_env_or("DYDX_SOLO", DEFAULT_DYDX_SOLO)?,
        flashloan_contract,

        // Notional: large enough to clear gas, small enough to limit slippage
        trade_amount_eth: parse_ether(env_or("TRADE_AMOUNT_ETH", "100"))
            .context("invalid TRADE_AMOUNT_ETH")?,
        flash_arb_gas_units: env_or("FLASH_ARB_GAS_UNITS", "200000")
            .parse()
            .context("invalid FLASH_ARB_GAS_UNITS")?,
        max_gas_price_gwei: env_or("MAX_GAS_PRICE_GWEI", "400")
            .parse()
            .context("invalid MAX_GAS_PRICE_GWEI")?,
        min_profit_dai: parse_ether(env_or("MIN_PROFIT_DAI", "0"))
            .context("invalid MIN_PROFIT_DAI")?,

        // Seed until the on-chain refresh lands
        fallback_eth_price_dai: parse_ether(env_or("FALLBACK_ETH_PRICE_DAI", "1825"))
            .context("invalid FALLBACK_ETH_PRICE_DAI")?,
        price_refresh_secs: env_or("PRICE_REFRESH_SECS", "30")
            .parse()
            .context("invalid PRICE_REFRESH_SECS")?,

        live_mode,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_or_default_and_override() {
        // Unique key so parallel tests cannot collide
        let key = "ETHDAI_ARB_TEST_ENV_OR";
        std::env::remove_var(key);
        assert_eq!(env_or(key, "fallback"), "fallback");

        std::env::set_var(key, "explicit");
        assert_eq!(env_or(key, "fallback"), "explicit");
        std::env::remove_var(key);
    }

    #[test]
    fn test_default_addresses_parse() {
        assert!(Address::from_str(DEFAULT_KYBER_PROXY).is_ok());
        assert!(Address::from_str(DEFAULT_UNISWAP_PAIR).is_ok());
        assert!(Address::from_str(DEFAULT_DAI).is_ok());
        assert!(Address::from_str(DEFAULT_WETH).is_ok());
        assert!(Address::from_str(DEFAULT_DYDX_SOLO).is_ok());
    }
}
