use alloy::primitives::utils::format_ether;
use alloy::primitives::{Address, Bytes};
use anyhow::Result;
use clap::Subcommand;
use vault_api::HermesClient;
use vault_core::{
    fetch_token_price_updates, BridgeOrchestrator, BridgeOutcome, BridgeRequest, ConfigStore,
    FeeResolver, Session,
};

use super::{address_arg, bytes_arg};

#[derive(Debug, Subcommand)]
pub enum BridgeCommand {
    /// Bridge a receiver's vault balance of a token to the remote chain
    Execute {
        #[arg(short, long)]
        network: String,
        #[arg(short, long, value_parser = address_arg)]
        receiver: Address,
        #[arg(short, long, value_parser = address_arg)]
        token: Address,
        /// Encoded price update (hex); repeat for several
        #[arg(long = "price-update", value_parser = bytes_arg)]
        price_updates: Vec<Bytes>,
        /// Fetch price updates for the token's configured feed
        #[arg(long)]
        fetch_price: bool,
        /// Pay the messaging fee in the alternate fee token
        #[arg(long)]
        use_alt_fee_token: bool,
        /// Messaging adapter parameters (hex)
        #[arg(long, value_parser = bytes_arg)]
        adapter_params: Option<Bytes>,
        /// Run every check and print the summary without submitting
        #[arg(long)]
        dry_run: bool,
    },

    /// Quote the messaging fee
    EstimateFee {
        #[arg(short, long)]
        network: String,
        #[arg(long)]
        use_alt_fee_token: bool,
        #[arg(long, value_parser = bytes_arg)]
        adapter_params: Option<Bytes>,
    },

    /// Show the native currency a bridge transaction needs
    Quote {
        #[arg(short, long)]
        network: String,
        #[arg(long = "price-update", value_parser = bytes_arg)]
        price_updates: Vec<Bytes>,
        #[arg(long)]
        use_alt_fee_token: bool,
        #[arg(long, value_parser = bytes_arg)]
        adapter_params: Option<Bytes>,
    },
}

pub async fn run(command: BridgeCommand, store: &ConfigStore) -> Result<()> {
    match command {
        BridgeCommand::Execute {
            network,
            receiver,
            token,
            price_updates,
            fetch_price,
            use_alt_fee_token,
            adapter_params,
            dry_run,
        } => {
            let session = Session::open(store, &network)?;

            let price_updates = if price_updates.is_empty() && fetch_price {
                let whitelist = store.get_token_whitelist(&network)?;
                fetch_token_price_updates(
                    &HermesClient::new(),
                    &whitelist,
                    token,
                    session.network.chain_id,
                )
                .await?
            } else {
                price_updates
            };

            let request = BridgeRequest {
                receiver,
                token,
                price_updates,
                use_alternate_fee_token: use_alt_fee_token,
                adapter_params: adapter_params.unwrap_or_default(),
                dry_run,
            };

            match BridgeOrchestrator::new(&session.vault).execute(&request).await? {
                BridgeOutcome::DryRun(summary) => {
                    println!("Dry run - no transaction submitted");
                    println!("{summary}");
                }
                BridgeOutcome::Confirmed {
                    summary,
                    tx_hash,
                    value,
                } => {
                    println!("{summary}");
                    println!("Value Sent: {} ETH", format_ether(value));
                    println!("Bridge confirmed (tx: {tx_hash})");
                }
            }
            Ok(())
        }

        BridgeCommand::EstimateFee {
            network,
            use_alt_fee_token,
            adapter_params,
        } => {
            let session = Session::open(store, &network)?;
            let estimate = FeeResolver::new(&session.vault)
                .estimate_bridge_fee(use_alt_fee_token, &adapter_params.unwrap_or_default())
                .await;
            println!("Native Fee: {} ETH", format_ether(estimate.native_fee));
            println!("Alternate Token Fee: {}", estimate.alternate_fee);
            Ok(())
        }

        BridgeCommand::Quote {
            network,
            price_updates,
            use_alt_fee_token,
            adapter_params,
        } => {
            let session = Session::open(store, &network)?;
            let quote = FeeResolver::new(&session.vault)
                .quote(
                    &price_updates,
                    use_alt_fee_token,
                    &adapter_params.unwrap_or_default(),
                )
                .await;
            println!("Price Update Fee: {} ETH", format_ether(quote.price_update_fee));
            println!("Messaging Fee: {} ETH", format_ether(quote.messaging_fee));
            println!("Buffer (10%): {} ETH", format_ether(quote.buffer));
            println!("Total Required: {} ETH", format_ether(quote.total));
            println!("Submission Value (+20%): {} ETH", format_ether(quote.submission_value()));
            Ok(())
        }
    }
}
