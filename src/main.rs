//! ETH/DAI Kyber <-> Uniswap arbitrage watcher
//!
//! Main entry point. Subscribes to new heads over WS and, on every
//! block, fetches quotes from both venues together with the current gas
//! price, then evaluates the gas-adjusted spread in DAI fixed point.
//! A separate timer refreshes the DAI-per-ETH price used to convert gas
//! cost into the compared denomination.
//!
//! Architecture:
//! - Two WS connections: RPC calls + dedicated newHeads subscription
//! - Head feed -> bounded channel with drop-if-busy back-pressure
//! - Per cycle: Kyber + Uniswap + gas price fetched concurrently (join)
//! - A failed fetch skips that cycle; the subscription keeps running
//! - Dry-run by default; --live (or LIVE_MODE=true) sends the flash loan

use anyhow::Result;
use clap::Parser;
use ethdai_arb::arbitrage::{evaluator, FlashLoanExecutor};
use ethdai_arb::block_feed::BlockFeed;
use ethdai_arb::config::load_config;
use ethdai_arb::eth_price::{shared_price, EthPriceUpdater};
use ethdai_arb::pricing::{KyberSource, PriceSource, UniswapPairSource};
use ethdai_arb::types::GasEstimate;
use ethers::prelude::*;
use ethers::utils::format_ether;
use std::sync::Arc;
use tracing::{debug, error, info, warn, Level};

/// ETH/DAI Kyber <-> Uniswap arbitrage watcher
#[derive(Parser)]
#[command(name = "ethdai-arb")]
struct Args {
    /// Send the flash-loan transaction when a profitable spread is found
    #[arg(long)]
    live: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_max_level(Level::INFO)
        .with_target(false)
        .init();

    let args = Args::parse();
    let mut config = load_config()?;
    if args.live {
        config.live_mode = true;
    }
    if config.live_mode && (config.private_key.is_none() || config.flashloan_contract.is_none()) {
        anyhow::bail!("live mode requires PRIVATE_KEY and FLASHLOAN_CONTRACT");
    }

    info!("ETH/DAI arbitrage watcher starting (chain_id: {})", config.chain_id);
    info!("Trade notional: {} ETH", format_ether(config.trade_amount_eth));
    info!("Kyber proxy: {:?}", config.kyber_proxy);
    info!("Uniswap pair: {:?}", config.uniswap_pair);

    // Two WS connections: one for RPC traffic, one dedicated newHeads reader
    let provider = Arc::new(Provider::<Ws>::connect(&config.ws_rpc_url).await?);
    let sub_provider = Arc::new(Provider::<Ws>::connect(&config.ws_rpc_url).await?);

    let block = provider.get_block_number().await?;
    info!("Connected! Current block: {} (2 WS connections)", block);

    // Pricing sources
    let kyber = KyberSource::new(Arc::clone(&provider), config.kyber_proxy, config.dai);
    let uniswap = Arc::new(
        UniswapPairSource::connect(Arc::clone(&provider), config.uniswap_pair, config.dai).await?,
    );
    info!("Uniswap pair connected (token ordering discovered)");

    // Shared ETH price: seeded from config, refreshed on a timer
    let eth_price = shared_price(config.fallback_eth_price_dai);
    let updater = EthPriceUpdater::new(
        Arc::clone(&uniswap),
        Arc::clone(&eth_price),
        config.price_refresh_secs,
    );
    tokio::spawn(async move { updater.run().await });

    // Head feed with drop-if-busy back-pressure
    let (head_tx, mut head_rx) = BlockFeed::channel();
    let feed = BlockFeed::new(Arc::clone(&sub_provider));
    tokio::spawn(async move { feed.run(head_tx).await });

    // Executor: dry-run unless live mode was requested
    let wallet = match &config.private_key {
        Some(key) => Some(key.parse::<LocalWallet>()?),
        None => None,
    };
    let mut executor = FlashLoanExecutor::new(Arc::clone(&provider), wallet, config.clone());
    if config.live_mode {
        executor.set_dry_run(false);
        warn!("LIVE MODE ENABLED - flash loan transactions will be sent!");
    } else {
        info!("Executor initialized (DRY RUN mode)");
    }

    let eth_in = config.trade_amount_eth;
    let gas_units = config.flash_arb_gas_units;

    // Statistics tracking
    let mut iteration = 0u64;
    let mut opportunities_found = 0u64;
    let mut last_block = 0u64;

    info!("Starting evaluation loop (WS head subscription)...");

    while let Some(block_number) = head_rx.recv().await {
        iteration += 1;

        // Log status periodically
        if iteration % 100 == 0 {
            info!(
                "Iteration {} | block {} | {} opportunities so far",
                iteration, block_number, opportunities_found
            );
        }

        // WS can deliver the same head twice; stale heads are skipped
        if block_number <= last_block {
            continue;
        }
        last_block = block_number;

        let price = *eth_price.read().await;
        if price.is_zero() {
            warn!("ETH price unknown - skipping block {}", block_number);
            continue;
        }

        // DAI notional for this cycle at the current price
        let dai_in = eth_in * price / U256::exp10(18);

        // Both venues plus the gas price; all must land before comparing
        let (kyber_quotes, uniswap_quotes, gas_price) = tokio::join!(
            kyber.quotes(dai_in, eth_in),
            uniswap.quotes(dai_in, eth_in),
            provider.get_gas_price(),
        );

        let kyber_quotes = match kyber_quotes {
            Ok(quotes) => quotes,
            Err(e) => {
                warn!("Kyber quote failed at block {}: {}", block_number, e);
                continue;
            }
        };
        let uniswap_quotes = match uniswap_quotes {
            Ok(quotes) => quotes,
            Err(e) => {
                warn!("Uniswap quote failed at block {}: {}", block_number, e);
                continue;
            }
        };
        let gas_price = match gas_price {
            Ok(gas_price) => gas_price,
            Err(e) => {
                warn!("Gas price query failed at block {}: {}", block_number, e);
                continue;
            }
        };

        let gas = GasEstimate {
            gas_price,
            gas_units,
        };

        let opportunity = match evaluator::evaluate(block_number, &kyber_quotes, &uniswap_quotes, &gas, price) {
            Some(opportunity) => opportunity,
            None => {
                debug!("Block {}: no opportunity", block_number);
                continue;
            }
        };

        opportunities_found += 1;

        if opportunity.net_profit_dai < config.min_profit_dai {
            debug!(
                "Block {}: +{} DAI below the {} DAI minimum",
                block_number,
                format_ether(opportunity.net_profit_dai),
                format_ether(config.min_profit_dai)
            );
            continue;
        }

        info!(
            "🎯 OPPORTUNITY at block {}: {} | {} DAI in | +{} DAI net of {} DAI gas",
            block_number,
            opportunity.direction,
            format_ether(opportunity.dai_in),
            format_ether(opportunity.net_profit_dai),
            format_ether(opportunity.gas_cost_dai)
        );

        match executor.execute(&opportunity).await {
            Ok(result) if result.success => {
                info!(
                    "Trade complete: {} | tx: {} | {}ms",
                    result.direction,
                    result.tx_hash.as_deref().unwrap_or("dry-run"),
                    result.execution_time_ms
                );
            }
            Ok(result) => {
                warn!(
                    "Trade failed: {} | {}",
                    result.direction,
                    result.error.unwrap_or_else(|| "unknown".to_string())
                );
            }
            Err(e) => error!("Execution error: {}", e),
        }
    }

    // The feed task ended and dropped its sender: WS disconnected.
    // Exit so a supervisor can restart the process.
    error!("Head feed closed - exiting for restart");
    Ok(())
}
