//! Vault parameter updates that are mirrored in the configuration.

use alloy::primitives::{Address, B256};
use tracing::{info, warn};
use vault_chain::VaultBackend;

use crate::config::ConfigStore;
use crate::error::{Result, VaultError};

/// A contract address the vault points at and the config records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContractUpdate {
    Bridge(Address),
    PythOracle(Address),
}

/// Submit `update` and, once confirmed, record the new address in the
/// network's contract set.
///
/// The transaction hash is logged before the config write so a failed
/// save still leaves a trace of the confirmed change.
pub async fn update_contract<V: VaultBackend + ?Sized>(
    vault: &V,
    store: &ConfigStore,
    update: ContractUpdate,
) -> Result<B256> {
    let network = vault.network();
    // Fail before sending if nothing is recorded to update
    let mut contracts = store.get_contract_set(network)?;

    let tx_hash = match update {
        ContractUpdate::Bridge(bridge) => vault.update_bridge(bridge).await,
        ContractUpdate::PythOracle(oracle) => vault.update_pyth_oracle(oracle).await,
    }
    .map_err(VaultError::transaction)?;
    info!(network, update = ?update, tx_hash = %tx_hash, "Vault contract updated");

    match update {
        ContractUpdate::Bridge(bridge) => contracts.bridge = bridge.to_checksum(None),
        ContractUpdate::PythOracle(oracle) => contracts.pyth_oracle = oracle.to_checksum(None),
    }
    store.set_contract_set(network, contracts).inspect_err(|e| {
        warn!(network, update = ?update, tx_hash = %tx_hash, error = %e, "Update confirmed but not recorded");
    })?;

    Ok(tx_hash)
}
