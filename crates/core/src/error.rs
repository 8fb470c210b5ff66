use alloy::primitives::U256;
use thiserror::Error;
use vault_chain::{NotDeployed, TransactionReverted};

#[derive(Error, Debug)]
pub enum VaultError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Network '{name}' not found in config. Available networks: {available}")]
    NotFound { name: String, available: String },

    #[error(transparent)]
    NotDeployed(#[from] NotDeployed),

    #[error("Insufficient balance. Vault balance: {balance}, Fee: {fee}")]
    InsufficientBalance { balance: U256, fee: U256 },

    #[error("Insufficient ETH balance. Required: {required} wei, Available: {available} wei")]
    InsufficientNativeFunds { required: U256, available: U256 },

    #[error("Remote query failed: {0}")]
    RemoteQuery(String),

    #[error("Failed to save configuration: {0}")]
    Persistence(String),

    #[error("Transaction failed: {0}")]
    Transaction(String),

    #[error("PRIVATE_KEY environment variable is required for this operation")]
    MissingPrivateKey,

    #[error("RPC error: {0}")]
    Rpc(String),
}

impl VaultError {
    /// Classify a failed read against the chain.
    pub fn rpc(err: anyhow::Error) -> Self {
        match err.downcast::<NotDeployed>() {
            Ok(not_deployed) => VaultError::NotDeployed(not_deployed),
            Err(err) => VaultError::Rpc(format!("{err:#}")),
        }
    }

    /// Classify a failed transaction submission.
    pub fn transaction(err: anyhow::Error) -> Self {
        if let Some(reverted) = err.downcast_ref::<TransactionReverted>() {
            return VaultError::Transaction(reverted.to_string());
        }
        match err.downcast::<NotDeployed>() {
            Ok(not_deployed) => VaultError::NotDeployed(not_deployed),
            Err(err) => VaultError::Transaction(format!("{err:#}")),
        }
    }
}

pub type Result<T> = std::result::Result<T, VaultError>;
