//! Flash-loan executor
//!
//! Submits the on-chain flash-loan transaction for a detected
//! opportunity: one call to `initiateFlashLoan` on the deployed
//! contract, which borrows the DAI notional from dYdX, runs both swap
//! legs, and repays within the same transaction. Dry-run by default.

use crate::contracts::IFlashloan;
use crate::types::{ArbitrageOpportunity, BotConfig, TradeResult};
use anyhow::{anyhow, Context, Result};
use ethers::prelude::*;
use ethers::utils::format_ether;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

pub struct FlashLoanExecutor {
    provider: Arc<Provider<Ws>>,
    wallet: Option<LocalWallet>,
    config: BotConfig,
    /// Simulates trades without sending when set.
    dry_run: bool,
}

impl FlashLoanExecutor {
    pub fn new(provider: Arc<Provider<Ws>>, wallet: Option<LocalWallet>, config: BotConfig) -> Self {
        Self {
            provider,
            wallet,
            config,
            dry_run: true, // Default to dry run for safety
        }
    }

    /// Enable or disable dry run mode
    pub fn set_dry_run(&mut self, dry_run: bool) {
        self.dry_run = dry_run;
        if dry_run {
            info!("Executor in DRY RUN mode - trades will be simulated");
        } else {
            warn!("⚠️ Executor in LIVE mode - flash loans will be sent!");
        }
    }

    /// Execute (or simulate) a detected opportunity.
    pub async fn execute(&self, opportunity: &ArbitrageOpportunity) -> Result<TradeResult> {
        let start_time = Instant::now();

        info!(
            "🚀 Executing: {} | {} DAI in | +{} DAI expected net of {} DAI gas",
            opportunity.direction,
            format_ether(opportunity.dai_in),
            format_ether(opportunity.net_profit_dai),
            format_ether(opportunity.gas_cost_dai)
        );

        if self.dry_run {
            return Ok(self.simulate(opportunity, start_time));
        }

        let wallet = self
            .wallet
            .clone()
            .ok_or_else(|| anyhow!("live execution requires a wallet"))?;
        let contract_address = self
            .config
            .flashloan_contract
            .ok_or_else(|| anyhow!("live execution requires FLASHLOAN_CONTRACT"))?;

        // Gas can spike between evaluation and submission; re-check the cap
        let gas_price = self
            .provider
            .get_gas_price()
            .await
            .context("gas price query failed")?;
        let max_gas_price = U256::from(self.config.max_gas_price_gwei) * U256::exp10(9);
        if gas_price > max_gas_price {
            return Ok(TradeResult {
                direction: opportunity.direction.to_string(),
                tx_hash: None,
                block_number: None,
                success: false,
                net_profit_dai: U256::zero(),
                execution_time_ms: start_time.elapsed().as_millis() as u64,
                error: Some(format!(
                    "Gas price too high: {} gwei > {} gwei max",
                    gas_price / U256::exp10(9),
                    self.config.max_gas_price_gwei
                )),
            });
        }

        let client = Arc::new(SignerMiddleware::new(
            self.provider.as_ref().clone(),
            wallet.with_chain_id(self.config.chain_id),
        ));
        let flashloan = IFlashloan::new(contract_address, client);

        let call = flashloan.initiate_flash_loan(
            self.config.dydx_solo,
            self.config.dai,
            opportunity.dai_in,
            opportunity.direction.flash_loan_code(),
        );

        let pending = call
            .send()
            .await
            .context("initiateFlashLoan submission failed")?;
        let tx_hash = *pending;
        info!("Flash loan tx submitted: {:?}", tx_hash);

        let receipt = pending
            .await
            .context("waiting for flash loan receipt failed")?
            .ok_or_else(|| anyhow!("transaction dropped from the mempool: {:?}", tx_hash))?;

        let success = receipt.status == Some(1u64.into());
        if success {
            info!(
                "🎉 Flash loan confirmed in block {} | tx {:?}",
                receipt.block_number.map(|b| b.as_u64()).unwrap_or_default(),
                tx_hash
            );
        } else {
            warn!("Flash loan reverted: {:?}", tx_hash);
        }

        Ok(TradeResult {
            direction: opportunity.direction.to_string(),
            tx_hash: Some(format!("{:?}", tx_hash)),
            block_number: receipt.block_number.map(|b| b.as_u64()),
            success,
            net_profit_dai: if success {
                opportunity.net_profit_dai
            } else {
                U256::zero()
            },
            execution_time_ms: start_time.elapsed().as_millis() as u64,
            error: if success {
                None
            } else {
                Some("transaction reverted".to_string())
            },
        })
    }

    fn simulate(&self, opportunity: &ArbitrageOpportunity, start_time: Instant) -> TradeResult {
        info!(
            "🔬 DRY RUN: would borrow {} DAI from dYdX and run {}",
            format_ether(opportunity.dai_in),
            opportunity.direction
        );

        TradeResult {
            direction: opportunity.direction.to_string(),
            tx_hash: None,
            block_number: Some(opportunity.block_number),
            success: true,
            net_profit_dai: opportunity.net_profit_dai,
            execution_time_ms: start_time.elapsed().as_millis() as u64,
            error: None,
        }
    }
}
