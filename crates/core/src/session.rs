//! Wiring from configuration to a signing vault facade.

use tracing::debug;
use vault_chain::{ContractBinding, VaultContract};

use crate::config::{ConfigStore, NetworkConfig};
use crate::error::{Result, VaultError};
use crate::validation::validate_address;

/// Environment variable holding the signing key.
pub const PRIVATE_KEY_ENV: &str = "PRIVATE_KEY";

/// Signing key from the environment, with or without `0x`.
pub fn private_key_from_env() -> Result<String> {
    match std::env::var(PRIVATE_KEY_ENV) {
        Ok(key) if !key.trim().is_empty() => Ok(key.trim().to_string()),
        _ => Err(VaultError::MissingPrivateKey),
    }
}

/// Resolved network plus the facade bound to its recorded vault.
#[derive(Debug)]
pub struct Session {
    pub network_name: String,
    pub network: NetworkConfig,
    pub vault: VaultContract,
}

impl Session {
    /// Build a facade for `network_name` signing with `PRIVATE_KEY`.
    ///
    /// Only local state is touched: the key is checked before any
    /// network handle exists. Without a recorded contract set the facade
    /// is unbound.
    pub fn open(store: &ConfigStore, network_name: &str) -> Result<Self> {
        let network = store.get_network(network_name)?;
        let private_key = private_key_from_env()?;
        Self::with_key(network_name, network, &private_key)
    }

    pub fn with_key(network_name: &str, network: NetworkConfig, private_key: &str) -> Result<Self> {
        let binding = match &network.contracts {
            Some(contracts) => ContractBinding::Bound(validate_address(&contracts.vault, "Vault")?),
            None => ContractBinding::Unbound,
        };

        let rpc_url = network.resolved_rpc_url();
        debug!(network = network_name, rpc_url = %rpc_url, binding = ?binding, "Opening session");

        let vault = VaultContract::new(network_name, &rpc_url, network.chain_id, private_key, binding)
            .map_err(|e| VaultError::Validation(format!("Invalid private key: {e:#}")))?;

        Ok(Self {
            network_name: network_name.to_string(),
            network,
            vault,
        })
    }
}
