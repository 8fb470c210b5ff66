use alloy::primitives::Address;
use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;
use tracing::info;
use vault_chain::{load_creation_code, DeployedContract};
use vault_core::{ConfigStore, ContractSet, Session, VaultError};

use super::address_arg;

#[derive(Debug, Args)]
pub struct DeployArgs {
    /// Network to deploy to
    #[arg(short, long)]
    network: String,

    /// Address receiving vault fees
    #[arg(long, value_parser = address_arg)]
    fee_recipient: Address,

    /// Messaging bridge contract
    #[arg(long, value_parser = address_arg)]
    bridge_contract: Address,

    /// Pyth oracle contract
    #[arg(long, value_parser = address_arg)]
    pyth_oracle: Address,

    /// Foundry artifact holding the vault creation code
    #[arg(long, default_value = "contracts/out/BridgeVault.sol/BridgeVault.json")]
    artifact: PathBuf,
}

pub async fn run(args: DeployArgs, store: &ConfigStore) -> Result<()> {
    let mut session = Session::open(store, &args.network)?;
    let creation_code = load_creation_code(&args.artifact)?;

    info!(network = %args.network, artifact = %args.artifact.display(), "Deploying contracts");
    let deployed = session
        .vault
        .deploy(
            creation_code,
            args.fee_recipient,
            args.bridge_contract,
            args.pyth_oracle,
        )
        .await
        .map_err(VaultError::transaction)?;

    // Printed before persisting so a failed save cannot hide a live contract
    println!("Vault deployed on {} at {}", args.network, deployed.address);
    println!("Transaction: {}", deployed.tx_hash);
    println!("Bridge: {}", args.bridge_contract);
    println!("Pyth Oracle: {}", args.pyth_oracle);
    println!("Fee Recipient: {}", args.fee_recipient);

    record_deployment(
        store,
        &args.network,
        &deployed,
        args.bridge_contract,
        args.pyth_oracle,
    )?;

    info!(network = %args.network, vault = %deployed.address, "Contract set recorded");
    Ok(())
}

/// Store the deployed contract set. A failure names the live contract.
fn record_deployment(
    store: &ConfigStore,
    network: &str,
    deployed: &DeployedContract,
    bridge: Address,
    pyth_oracle: Address,
) -> Result<()> {
    store
        .set_contract_set(
            network,
            ContractSet {
                vault: deployed.address.to_checksum(None),
                bridge: bridge.to_checksum(None),
                pyth_oracle: pyth_oracle.to_checksum(None),
            },
        )
        .with_context(|| {
            format!(
                "Vault {} deployed (tx {}) but not recorded for network '{network}'",
                deployed.address, deployed.tx_hash
            )
        })
}
