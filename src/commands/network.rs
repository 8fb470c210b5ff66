use anyhow::Result;
use clap::Subcommand;
use vault_core::{ConfigStore, NetworkConfig};

#[derive(Debug, Subcommand)]
pub enum NetworkCommand {
    /// List configured networks
    List,

    /// Show one network's settings
    Show {
        #[arg(short, long)]
        network: String,
    },

    /// Add or replace a network
    Add {
        /// Network key (letters, numbers, hyphens)
        #[arg(short, long)]
        network: String,
        /// RPC endpoint; `${VAR}` references are expanded at use
        #[arg(long)]
        rpc_url: String,
        #[arg(long)]
        chain_id: u64,
        /// Display name (defaults to the key)
        #[arg(long)]
        name: Option<String>,
    },

    /// Remove a network
    Remove {
        #[arg(short, long)]
        network: String,
    },
}

pub fn run(command: NetworkCommand, store: &ConfigStore) -> Result<()> {
    match command {
        NetworkCommand::List => {
            let config = store.load_config();
            for (key, network) in &config.networks {
                let status = if network.contracts.is_some() {
                    "deployed"
                } else {
                    "not deployed"
                };
                println!("{key:<16} {:<20} chain {:<8} {status}", network.name, network.chain_id);
            }
        }

        NetworkCommand::Show { network } => {
            let config = store.get_network(&network)?;
            println!("{}", serde_json::to_string_pretty(&config)?);
        }

        NetworkCommand::Add {
            network,
            rpc_url,
            chain_id,
            name,
        } => {
            let display = name.unwrap_or_else(|| network.clone());
            store.add_network(&network, NetworkConfig::new(display, rpc_url, chain_id))?;
            println!("Network '{network}' saved");
        }

        NetworkCommand::Remove { network } => {
            store.remove_network(&network)?;
            println!("Network '{network}' removed");
        }
    }

    Ok(())
}
