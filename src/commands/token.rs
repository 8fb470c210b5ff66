use alloy::primitives::{Address, B256};
use anyhow::{bail, Result};
use clap::Subcommand;
use vault_chain::VaultBackend;
use vault_core::validation::parse_address;
use vault_core::{
    on_chain_whitelist, reconcile_whitelist, short_address, short_feed_id, ConfigStore,
    ReconcileAction, ReconcileReport, Session, TokenWhitelist, VaultError,
};

use super::{address_arg, feed_id_arg, print_tx};

#[derive(Debug, Subcommand)]
pub enum TokenCommand {
    /// Whitelist a token against a Pyth price feed
    Whitelist {
        #[arg(short, long)]
        network: String,
        #[arg(short, long, value_parser = address_arg)]
        token: Address,
        /// Pyth price feed id (32 bytes hex)
        #[arg(short, long, value_parser = feed_id_arg)]
        price_id: B256,
    },

    /// Remove a token from the whitelist
    Remove {
        #[arg(short, long)]
        network: String,
        #[arg(short, long, value_parser = address_arg)]
        token: Address,
    },

    /// Push every configured whitelist entry that differs on-chain
    UpdateWhitelist {
        #[arg(short, long)]
        network: String,
    },

    /// Show the whitelist recorded on-chain
    Show {
        #[arg(short, long)]
        network: String,
    },

    /// Show the fee the vault charges for a token (cached prices)
    Fee {
        #[arg(short, long)]
        network: String,
        #[arg(short, long, value_parser = address_arg)]
        token: Address,
    },
}

pub async fn run(command: TokenCommand, store: &ConfigStore) -> Result<()> {
    match command {
        TokenCommand::Whitelist {
            network,
            token,
            price_id,
        } => {
            let session = Session::open(store, &network)?;

            let mut whitelist = store.get_token_whitelist(&network)?;
            whitelist.retain(|key, _| parse_address(key) != Some(token));
            whitelist.insert(token.to_checksum(None), price_id.to_string());
            store.set_token_whitelist(&network, whitelist)?;

            let single = TokenWhitelist::from([(token.to_checksum(None), price_id.to_string())]);
            let report = reconcile_whitelist(&session.vault, &single).await;
            print_report(&report);
            ensure_no_failures(&report)
        }

        TokenCommand::Remove { network, token } => {
            let session = Session::open(store, &network)?;
            let tx_hash = session
                .vault
                .remove_token(token)
                .await
                .map_err(VaultError::transaction)?;

            let mut whitelist = store.get_token_whitelist(&network)?;
            whitelist.retain(|key, _| parse_address(key) != Some(token));
            store.set_token_whitelist(&network, whitelist)?;

            print_tx(&format!("Token {token} removed from whitelist"), &tx_hash);
            Ok(())
        }

        TokenCommand::UpdateWhitelist { network } => {
            let session = Session::open(store, &network)?;
            let whitelist = store.get_token_whitelist(&network)?;
            if whitelist.is_empty() {
                println!("No tokens configured for {network}");
                return Ok(());
            }

            let report = reconcile_whitelist(&session.vault, &whitelist).await;
            print_report(&report);
            println!();
            print_on_chain(&session, &whitelist).await?;
            ensure_no_failures(&report)
        }

        TokenCommand::Show { network } => {
            let session = Session::open(store, &network)?;
            let whitelist = store.get_token_whitelist(&network)?;
            print_on_chain(&session, &whitelist).await
        }

        TokenCommand::Fee { network, token } => {
            let session = Session::open(store, &network)?;
            let fee = session
                .vault
                .view_fee_amount(token)
                .await
                .map_err(VaultError::rpc)?;
            println!("Fee for {token}: {fee}");
            Ok(())
        }
    }
}

fn print_report(report: &ReconcileReport) {
    for entry in &report.entries {
        match &entry.action {
            ReconcileAction::Unchanged => println!("{}: already whitelisted", entry.token),
            ReconcileAction::Whitelisted(tx_hash) => {
                print_tx(&format!("{}: whitelisted", entry.token), tx_hash)
            }
            ReconcileAction::Failed(reason) => println!("{}: failed: {reason}", entry.token),
        }
    }
    println!(
        "{} transaction(s) sent, {} failure(s)",
        report.submitted(),
        report.failed()
    );
}

fn ensure_no_failures(report: &ReconcileReport) -> Result<()> {
    if report.failed() > 0 {
        bail!("{} token(s) could not be whitelisted", report.failed());
    }
    Ok(())
}

async fn print_on_chain(session: &Session, whitelist: &TokenWhitelist) -> Result<()> {
    let recorded = on_chain_whitelist(&session.vault, whitelist).await?;
    if recorded.is_empty() {
        println!("No whitelisted tokens on {}", session.network_name);
        return Ok(());
    }

    println!("Whitelisted tokens on {}:", session.network_name);
    for (token, feed) in &recorded {
        println!("  {}  {}", short_address(token), short_feed_id(feed));
    }
    Ok(())
}
