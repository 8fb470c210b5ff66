use alloy::primitives::Address;
use anyhow::Result;
use clap::Subcommand;
use vault_chain::VaultBackend;
use vault_core::{update_contract, ConfigStore, ContractUpdate, Session, VaultError};

use super::{address_arg, print_tx};

#[derive(Debug, Subcommand)]
pub enum AdminCommand {
    /// Pause bridging
    Pause {
        #[arg(short, long)]
        network: String,
    },

    /// Resume bridging
    Unpause {
        #[arg(short, long)]
        network: String,
    },

    /// Show whether the vault is paused
    Status {
        #[arg(short, long)]
        network: String,
    },

    /// Point the vault at a new messaging bridge
    UpdateBridge {
        #[arg(short, long)]
        network: String,
        #[arg(long, value_parser = address_arg)]
        bridge: Address,
    },

    /// Point the vault at a new Pyth oracle
    UpdateOracle {
        #[arg(short, long)]
        network: String,
        #[arg(long, value_parser = address_arg)]
        oracle: Address,
    },

    /// Change the fee recipient
    UpdateFeeRecipient {
        #[arg(short, long)]
        network: String,
        #[arg(long, value_parser = address_arg)]
        recipient: Address,
    },

    /// Change the remote chain id used by the messaging layer
    UpdateChainId {
        #[arg(short, long)]
        network: String,
        #[arg(long, value_parser = clap::value_parser!(u16).range(1..))]
        chain_id: u16,
    },
}

pub async fn run(command: AdminCommand, store: &ConfigStore) -> Result<()> {
    match command {
        AdminCommand::Pause { network } => {
            let session = Session::open(store, &network)?;
            let tx_hash = session.vault.pause().await.map_err(VaultError::transaction)?;
            print_tx("Vault paused", &tx_hash);
        }

        AdminCommand::Unpause { network } => {
            let session = Session::open(store, &network)?;
            let tx_hash = session.vault.unpause().await.map_err(VaultError::transaction)?;
            print_tx("Vault unpaused", &tx_hash);
        }

        AdminCommand::Status { network } => {
            let session = Session::open(store, &network)?;
            let paused = session.vault.is_paused().await.map_err(VaultError::rpc)?;
            let address = session.vault.vault_address()?;
            println!("Vault: {address}");
            println!("Status: {}", if paused { "PAUSED" } else { "ACTIVE" });
        }

        AdminCommand::UpdateBridge { network, bridge } => {
            let session = Session::open(store, &network)?;
            let tx_hash =
                update_contract(&session.vault, store, ContractUpdate::Bridge(bridge)).await?;
            print_tx(&format!("Bridge updated to {bridge}"), &tx_hash);
        }

        AdminCommand::UpdateOracle { network, oracle } => {
            let session = Session::open(store, &network)?;
            let tx_hash =
                update_contract(&session.vault, store, ContractUpdate::PythOracle(oracle)).await?;
            print_tx(&format!("Pyth oracle updated to {oracle}"), &tx_hash);
        }

        AdminCommand::UpdateFeeRecipient { network, recipient } => {
            let session = Session::open(store, &network)?;
            let tx_hash = session
                .vault
                .update_fee_recipient(recipient)
                .await
                .map_err(VaultError::transaction)?;
            print_tx(&format!("Fee recipient updated to {recipient}"), &tx_hash);
        }

        AdminCommand::UpdateChainId { network, chain_id } => {
            let session = Session::open(store, &network)?;
            let tx_hash = session
                .vault
                .update_remote_chain_id(chain_id)
                .await
                .map_err(VaultError::transaction)?;
            print_tx(&format!("Remote chain id updated to {chain_id}"), &tx_hash);
        }
    }

    Ok(())
}
