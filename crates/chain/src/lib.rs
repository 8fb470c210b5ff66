//! Vault chain interaction layer.
//!
//! This crate provides:
//! - Contract bindings for the bridge vault, the Pyth oracle and ERC20 tokens
//! - The [`VaultBackend`] facade trait and its JSON-RPC implementation
//! - Read-only balance and token metadata access
//! - Transaction signing, sending and deployment

pub mod contracts;
mod provider;
mod signer;
mod vault;

pub use contracts::{load_creation_code, UNSET_PRICE_FEED};
pub use provider::{ChainReader, TokenHolding};
pub use signer::{DeployedContract, TransactionReverted, TransactionSender};
pub use vault::{BridgeFeeEstimate, ContractBinding, NotDeployed, VaultBackend, VaultContract};
