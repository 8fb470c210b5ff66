//! Vault contract facade.
//!
//! [`VaultBackend`] is the narrow, typed surface the fee engine and the
//! bridge orchestrator drive. [`VaultContract`] implements it against a
//! deployed contract over JSON-RPC.
//!
//! # Example
//!
//! ```rust,ignore
//! use vault_chain::{ContractBinding, VaultBackend, VaultContract};
//!
//! let vault = VaultContract::new("arbitrum", rpc_url, 42161, &private_key, ContractBinding::Bound(addr))?;
//! let receiver_vault = vault.get_vault(receiver).await?;
//! ```

mod contract;

pub use contract::VaultContract;

use alloy::primitives::{Address, Bytes, B256, U256};
use anyhow::Result;
use async_trait::async_trait;
use thiserror::Error;

use crate::provider::TokenHolding;

/// Whether the facade knows which vault contract to call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContractBinding {
    /// No vault recorded for the network yet.
    Unbound,
    /// Calls target the vault at this address.
    Bound(Address),
}

impl ContractBinding {
    /// Resolve the bound address or fail with [`NotDeployed`].
    pub fn address(&self, network: &str) -> Result<Address, NotDeployed> {
        match self {
            ContractBinding::Bound(address) => Ok(*address),
            ContractBinding::Unbound => Err(NotDeployed {
                network: network.to_string(),
            }),
        }
    }
}

/// The facade was asked to call a vault that has not been deployed.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Vault contract not deployed on network '{network}'. Please deploy contracts first.")]
pub struct NotDeployed {
    pub network: String,
}

/// Messaging-layer fee estimate returned by the vault.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BridgeFeeEstimate {
    /// Fee payable in native currency
    pub native_fee: U256,
    /// Fee payable in the alternate fee token
    pub alternate_fee: U256,
}

/// Typed operations on a deployed vault.
///
/// Mutating operations return only after the transaction is confirmed and
/// yield its hash. Every operation on an unbound facade fails with
/// [`NotDeployed`].
#[async_trait]
pub trait VaultBackend: Send + Sync {
    /// Name of the network this facade is bound to.
    fn network(&self) -> &str;

    /// Address that signs transactions.
    fn signer(&self) -> Address;

    /// Address of the bound vault contract.
    fn vault_address(&self) -> Result<Address>;

    /// Per-receiver vault address (deterministic in `receiver`).
    async fn get_vault(&self, receiver: Address) -> Result<Address>;

    /// ERC20 balance of `holder` with decimals and symbol.
    async fn token_holding(&self, token: Address, holder: Address) -> Result<TokenHolding>;

    /// Native currency balance of `account`.
    async fn native_balance(&self, account: Address) -> Result<U256>;

    /// Authoritative token fee given fresh price updates.
    async fn calculate_fee_amount(&self, token: Address, price_updates: &[Bytes]) -> Result<U256>;

    /// Token fee computed from the contract's cached price data.
    async fn view_fee_amount(&self, token: Address) -> Result<U256>;

    /// Oracle the vault is configured with.
    async fn pyth_oracle(&self) -> Result<Address>;

    /// Fee the oracle charges to accept `price_updates`.
    async fn oracle_update_fee(&self, oracle: Address, price_updates: &[Bytes]) -> Result<U256>;

    /// Messaging-layer fee quote.
    async fn estimate_bridge_fee(
        &self,
        use_alternate_fee_token: bool,
        adapter_params: &Bytes,
    ) -> Result<BridgeFeeEstimate>;

    /// Bridge the receiver's vault balance of `token`, carrying `value` wei.
    async fn bridge_vault_tokens(
        &self,
        receiver: Address,
        token: Address,
        price_updates: &[Bytes],
        value: U256,
    ) -> Result<B256>;

    /// Price feed recorded for `token` (zero if not whitelisted).
    async fn token_price_feed(&self, token: Address) -> Result<B256>;

    async fn whitelist_token(&self, token: Address, price_id: B256) -> Result<B256>;

    async fn remove_token(&self, token: Address) -> Result<B256>;

    async fn is_paused(&self) -> Result<bool>;

    async fn pause(&self) -> Result<B256>;

    async fn unpause(&self) -> Result<B256>;

    async fn update_bridge(&self, bridge: Address) -> Result<B256>;

    async fn update_pyth_oracle(&self, oracle: Address) -> Result<B256>;

    async fn update_fee_recipient(&self, recipient: Address) -> Result<B256>;

    async fn update_remote_chain_id(&self, chain_id: u16) -> Result<B256>;
}
