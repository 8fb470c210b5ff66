//! Bridge orchestration.
//!
//! One attempt moves through
//! `Start -> VaultResolved -> BalanceChecked -> FeeResolved -> FundsVerified`
//! and then either stops with a dry-run summary or submits and waits for
//! confirmation. Every funds check runs before the bridge entry point is
//! called; a failure at any stage aborts the attempt.

use alloy::primitives::utils::{format_ether, format_units};
use alloy::primitives::{Address, Bytes, B256, U256};
use std::fmt;
use tracing::{debug, info, instrument, warn};
use vault_chain::VaultBackend;

use crate::error::{Result, VaultError};
use crate::fees::{FeeQuote, FeeResolver};

/// Stages of one bridge attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BridgeStage {
    Start,
    VaultResolved,
    BalanceChecked,
    FeeResolved,
    FundsVerified,
    DryRunReported,
    Submitted,
    Confirmed,
}

/// Parameters of one bridge attempt.
#[derive(Debug, Clone)]
pub struct BridgeRequest {
    pub receiver: Address,
    pub token: Address,
    pub price_updates: Vec<Bytes>,
    pub use_alternate_fee_token: bool,
    pub adapter_params: Bytes,
    pub dry_run: bool,
}

impl BridgeRequest {
    pub fn new(receiver: Address, token: Address) -> Self {
        Self {
            receiver,
            token,
            price_updates: Vec::new(),
            use_alternate_fee_token: false,
            adapter_params: Bytes::new(),
            dry_run: false,
        }
    }
}

/// Everything checked before submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BridgeSummary {
    pub signer: Address,
    /// Per-receiver vault holding the tokens
    pub vault: Address,
    pub token: Address,
    pub symbol: String,
    pub decimals: u8,
    pub balance: U256,
    /// Token fee deducted by the vault
    pub fee: U256,
    /// `balance - fee`
    pub bridge_amount: U256,
    pub quote: FeeQuote,
    pub native_balance: U256,
}

fn trim_fraction(formatted: String) -> String {
    if !formatted.contains('.') {
        return formatted;
    }
    formatted
        .trim_end_matches('0')
        .trim_end_matches('.')
        .to_string()
}

fn token_units(amount: U256, decimals: u8) -> String {
    format_units(amount, decimals)
        .map(trim_fraction)
        .unwrap_or_else(|_| amount.to_string())
}

fn ether(amount: U256) -> String {
    trim_fraction(format_ether(amount))
}

impl fmt::Display for BridgeSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Signer: {}", self.signer)?;
        writeln!(f, "Vault Address: {}", self.vault)?;
        writeln!(f, "Token: {} ({})", self.token, self.symbol)?;
        writeln!(f, "Balance: {} {}", token_units(self.balance, self.decimals), self.symbol)?;
        writeln!(f, "Estimated Fee: {} {}", token_units(self.fee, self.decimals), self.symbol)?;
        writeln!(
            f,
            "Bridge Amount: {} {}",
            token_units(self.bridge_amount, self.decimals),
            self.symbol
        )?;
        writeln!(f, "ETH Required: {} ETH", ether(self.quote.total))?;
        write!(f, "Current ETH Balance: {} ETH", ether(self.native_balance))
    }
}

/// Result of a bridge attempt that was not aborted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BridgeOutcome {
    DryRun(BridgeSummary),
    Confirmed {
        summary: BridgeSummary,
        tx_hash: B256,
        /// Native value carried by the transaction
        value: U256,
    },
}

impl BridgeOutcome {
    pub fn summary(&self) -> &BridgeSummary {
        match self {
            BridgeOutcome::DryRun(summary) => summary,
            BridgeOutcome::Confirmed { summary, .. } => summary,
        }
    }
}

/// Drives bridge attempts against a vault backend.
pub struct BridgeOrchestrator<'a, V: VaultBackend + ?Sized> {
    vault: &'a V,
}

impl<'a, V: VaultBackend + ?Sized> BridgeOrchestrator<'a, V> {
    pub fn new(vault: &'a V) -> Self {
        Self { vault }
    }

    /// Run one attempt. Errors abort it at the stage where they occur.
    #[instrument(skip(self, request), fields(network = %self.vault.network(), receiver = %request.receiver, token = %request.token))]
    pub async fn execute(&self, request: &BridgeRequest) -> Result<BridgeOutcome> {
        let mut stage = BridgeStage::Start;
        let result = self.run(request, &mut stage).await;
        if let Err(e) = &result {
            warn!(stage = ?stage, error = %e, "Bridge aborted");
        }
        result
    }

    fn advance(stage: &mut BridgeStage, next: BridgeStage) {
        debug!(from = ?*stage, to = ?next, "Bridge stage");
        *stage = next;
    }

    async fn run(&self, request: &BridgeRequest, stage: &mut BridgeStage) -> Result<BridgeOutcome> {
        let vault = self
            .vault
            .get_vault(request.receiver)
            .await
            .map_err(VaultError::rpc)?;
        Self::advance(stage, BridgeStage::VaultResolved);

        let holding = self
            .vault
            .token_holding(request.token, vault)
            .await
            .map_err(VaultError::rpc)?;
        Self::advance(stage, BridgeStage::BalanceChecked);

        let fee = self.resolve_token_fee(request).await?;
        Self::advance(stage, BridgeStage::FeeResolved);

        if holding.balance <= fee {
            return Err(VaultError::InsufficientBalance {
                balance: holding.balance,
                fee,
            });
        }

        let quote = FeeResolver::new(self.vault)
            .quote(
                &request.price_updates,
                request.use_alternate_fee_token,
                &request.adapter_params,
            )
            .await;

        let signer = self.vault.signer();
        let native_balance = self
            .vault
            .native_balance(signer)
            .await
            .map_err(VaultError::rpc)?;
        if native_balance < quote.total {
            return Err(VaultError::InsufficientNativeFunds {
                required: quote.total,
                available: native_balance,
            });
        }
        Self::advance(stage, BridgeStage::FundsVerified);

        let summary = BridgeSummary {
            signer,
            vault,
            token: request.token,
            symbol: holding.symbol,
            decimals: holding.decimals,
            balance: holding.balance,
            fee,
            bridge_amount: holding.balance - fee,
            quote,
            native_balance,
        };

        if request.dry_run {
            Self::advance(stage, BridgeStage::DryRunReported);
            info!(bridge_amount = %summary.bridge_amount, required = %quote.total, "Dry run complete");
            return Ok(BridgeOutcome::DryRun(summary));
        }

        let value = quote.submission_value();
        Self::advance(stage, BridgeStage::Submitted);
        let tx_hash = self
            .vault
            .bridge_vault_tokens(request.receiver, request.token, &request.price_updates, value)
            .await
            .map_err(VaultError::transaction)?;
        Self::advance(stage, BridgeStage::Confirmed);

        info!(tx_hash = %tx_hash, value = %value, "Bridge confirmed");
        Ok(BridgeOutcome::Confirmed {
            summary,
            tx_hash,
            value,
        })
    }

    /// Token fee the vault will deduct.
    ///
    /// With price updates the authoritative calculation is used, otherwise
    /// the cached-price view. A failed lookup counts as a zero fee, which
    /// still requires a strictly positive balance downstream. An unbound
    /// facade is not a lookup failure.
    async fn resolve_token_fee(&self, request: &BridgeRequest) -> Result<U256> {
        let fee = if request.price_updates.is_empty() {
            self.vault.view_fee_amount(request.token).await
        } else {
            self.vault
                .calculate_fee_amount(request.token, &request.price_updates)
                .await
        };

        match fee {
            Ok(fee) => Ok(fee),
            Err(e) => match VaultError::rpc(e) {
                VaultError::NotDeployed(not_deployed) => Err(VaultError::NotDeployed(not_deployed)),
                other => {
                    warn!(error = %other, "Fee calculation failed, continuing with zero fee");
                    Ok(U256::ZERO)
                }
            },
        }
    }
}
