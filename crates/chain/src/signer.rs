//! Transaction signer and sender for vault administration.
//! Uses Alloy providers for type-safe RPC interactions.
//!
//! Nonce, gas and chain id are filled by the provider's recommended fillers;
//! every send waits for the receipt before returning.

use alloy::network::{EthereumWallet, TransactionBuilder};
use alloy::primitives::{Address, Bytes, B256, U256};
use alloy::providers::{Provider, ProviderBuilder};
use alloy::rpc::types::TransactionRequest;
use alloy::signers::local::PrivateKeySigner;
use anyhow::{Context, Result};
use std::time::Instant;
use thiserror::Error;
use tracing::{debug, info, warn};

/// A transaction was mined but its execution reverted.
#[derive(Debug, Error)]
#[error("Transaction reverted: {tx_hash}")]
pub struct TransactionReverted {
    pub tx_hash: B256,
}

/// Result of a confirmed contract deployment.
#[derive(Debug, Clone, Copy)]
pub struct DeployedContract {
    pub address: Address,
    pub tx_hash: B256,
}

/// Transaction sender bound to one signer and one RPC endpoint.
pub struct TransactionSender {
    /// RPC URL for sending transactions
    rpc_url: String,
    /// Signer wallet
    wallet: EthereumWallet,
    /// Signer address
    pub address: Address,
    /// Chain ID
    chain_id: u64,
}

impl TransactionSender {
    /// Create a new transaction sender from a private key.
    ///
    /// Accepts the key with or without `0x`. Performs no network I/O.
    pub fn new(private_key: &str, rpc_url: &str, chain_id: u64) -> Result<Self> {
        let key_str = private_key.trim().trim_start_matches("0x");
        let signer: PrivateKeySigner = key_str.parse().context("Invalid private key")?;
        let address = signer.address();
        let wallet = EthereumWallet::from(signer);

        debug!(address = %address, chain_id, "Transaction sender initialized");

        Ok(Self {
            rpc_url: rpc_url.to_string(),
            wallet,
            address,
            chain_id,
        })
    }

    /// Send a transaction and wait for confirmation.
    ///
    /// Returns the transaction hash once the receipt reports success; a
    /// reverted receipt is returned as [`TransactionReverted`].
    pub async fn send_transaction(&self, to: Address, calldata: Bytes, value: U256) -> Result<B256> {
        let tx = TransactionRequest::default()
            .with_to(to)
            .with_input(calldata)
            .with_value(value)
            .with_chain_id(self.chain_id);

        debug!(to = %to, value = %value, "Preparing transaction");

        let (tx_hash, _) = self.submit(tx).await?;
        Ok(tx_hash)
    }

    /// Deploy creation code and wait for the contract address.
    pub async fn deploy(&self, creation_code: Bytes) -> Result<DeployedContract> {
        let tx = TransactionRequest::default()
            .with_deploy_code(creation_code)
            .with_chain_id(self.chain_id);

        let (tx_hash, contract_address) = self.submit(tx).await?;
        let address = contract_address
            .ok_or_else(|| anyhow::anyhow!("Deployment receipt has no contract address: {}", tx_hash))?;

        Ok(DeployedContract { address, tx_hash })
    }

    async fn submit(&self, tx: TransactionRequest) -> Result<(B256, Option<Address>)> {
        let total_start = Instant::now();

        let provider = ProviderBuilder::new()
            .wallet(self.wallet.clone())
            .on_http(self.rpc_url.parse()?);

        let submit_start = Instant::now();
        let pending = provider.send_transaction(tx).await?;
        let tx_hash = *pending.tx_hash();
        let submit_elapsed = submit_start.elapsed();

        info!(
            tx_hash = %tx_hash,
            submit_ms = submit_elapsed.as_millis(),
            "Transaction submitted, waiting for confirmation"
        );

        let receipt = pending.get_receipt().await?;

        if receipt.status() {
            info!(
                tx_hash = %tx_hash,
                block = receipt.block_number.unwrap_or(0),
                gas_used = receipt.gas_used,
                total_ms = total_start.elapsed().as_millis(),
                "Transaction confirmed"
            );
            Ok((tx_hash, receipt.contract_address))
        } else {
            warn!(tx_hash = %tx_hash, "Transaction reverted");
            Err(TransactionReverted { tx_hash }.into())
        }
    }
}

impl std::fmt::Debug for TransactionSender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransactionSender")
            .field("address", &self.address)
            .field("chain_id", &self.chain_id)
            .field("rpc_url", &self.rpc_url)
            .finish_non_exhaustive()
    }
}
