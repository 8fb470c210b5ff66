//! Token whitelist reconciliation between the config and the vault.

use alloy::primitives::{Address, B256};
use tracing::{error, info, instrument};
use vault_chain::{VaultBackend, UNSET_PRICE_FEED};

use crate::config::TokenWhitelist;
use crate::error::{Result, VaultError};
use crate::validation::{parse_address, parse_price_feed_id};

/// What reconciliation did for one token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcileAction {
    /// On-chain feed already matches
    Unchanged,
    /// `whitelistToken` confirmed
    Whitelisted(B256),
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconcileEntry {
    pub token: String,
    pub price_feed_id: String,
    pub action: ReconcileAction,
}

/// Per-token results of one reconciliation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    pub entries: Vec<ReconcileEntry>,
}

impl ReconcileReport {
    /// Transactions submitted.
    pub fn submitted(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| matches!(e.action, ReconcileAction::Whitelisted(_)))
            .count()
    }

    pub fn failed(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| matches!(e.action, ReconcileAction::Failed(_)))
            .count()
    }
}

async fn reconcile_token<V: VaultBackend + ?Sized>(
    vault: &V,
    token: &str,
    price_feed_id: &str,
) -> Result<ReconcileAction> {
    let address = parse_address(token)
        .ok_or_else(|| VaultError::Validation(format!("Invalid Token address: {token}")))?;
    let wanted = parse_price_feed_id(price_feed_id)
        .ok_or_else(|| VaultError::Validation(format!("Invalid price feed ID: {price_feed_id}")))?;

    let current = vault
        .token_price_feed(address)
        .await
        .map_err(VaultError::rpc)?;
    if current != UNSET_PRICE_FEED && current == wanted {
        return Ok(ReconcileAction::Unchanged);
    }

    info!(token = %address, price_feed_id = %wanted, "Whitelisting token");
    let tx_hash = vault
        .whitelist_token(address, wanted)
        .await
        .map_err(VaultError::transaction)?;
    Ok(ReconcileAction::Whitelisted(tx_hash))
}

/// Bring the on-chain whitelist in line with `whitelist`.
///
/// A transaction is sent only for tokens whose recorded feed is unset or
/// differs, so a second pass over an unchanged whitelist sends nothing.
/// Failures are recorded per token and do not stop the pass.
#[instrument(skip(vault, whitelist), fields(network = %vault.network(), tokens = whitelist.len()))]
pub async fn reconcile_whitelist<V: VaultBackend + ?Sized>(
    vault: &V,
    whitelist: &TokenWhitelist,
) -> ReconcileReport {
    let mut report = ReconcileReport::default();

    for (token, price_feed_id) in whitelist {
        let action = match reconcile_token(vault, token, price_feed_id).await {
            Ok(action) => action,
            Err(e) => {
                error!(token = %token, error = %e, "Error updating whitelist for token");
                ReconcileAction::Failed(e.to_string())
            }
        };
        report.entries.push(ReconcileEntry {
            token: token.clone(),
            price_feed_id: price_feed_id.clone(),
            action,
        });
    }

    info!(
        submitted = report.submitted(),
        failed = report.failed(),
        "Whitelist reconciliation complete"
    );
    report
}

/// Tokens from `whitelist` that the vault has a price feed recorded for.
pub async fn on_chain_whitelist<V: VaultBackend + ?Sized>(
    vault: &V,
    whitelist: &TokenWhitelist,
) -> Result<Vec<(Address, B256)>> {
    let mut recorded = Vec::new();

    for token in whitelist.keys() {
        let Some(address) = parse_address(token) else {
            continue;
        };
        let feed = vault
            .token_price_feed(address)
            .await
            .map_err(VaultError::rpc)?;
        if feed != UNSET_PRICE_FEED {
            recorded.push((address, feed));
        }
    }

    Ok(recorded)
}
