//! In-memory [`VaultBackend`] for unit tests.

use alloy::primitives::{Address, Bytes, B256, U256};
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use vault_chain::{BridgeFeeEstimate, NotDeployed, TokenHolding, VaultBackend};

pub const SIGNER: Address = Address::repeat_byte(0x11);
pub const VAULT: Address = Address::repeat_byte(0x22);
pub const RECEIVER: Address = Address::repeat_byte(0x33);
pub const RECEIVER_VAULT: Address = Address::repeat_byte(0x44);
pub const TOKEN: Address = Address::repeat_byte(0x55);
pub const ORACLE: Address = Address::repeat_byte(0x66);

/// Scripted chain state. `None` fee fields make the matching call fail.
#[derive(Debug, Clone)]
pub struct MockState {
    pub bound: bool,
    pub holding: TokenHolding,
    pub native_balance: U256,
    pub view_fee: Option<U256>,
    pub calculated_fee: Option<U256>,
    pub oracle_fee: Option<U256>,
    pub bridge_fee: Option<BridgeFeeEstimate>,
    pub price_feeds: HashMap<Address, B256>,
    pub failing_tokens: Vec<Address>,
    pub paused: bool,
    pub bridge_calls: Vec<U256>,
    pub whitelist_calls: Vec<(Address, B256)>,
    pub contract_updates: Vec<(&'static str, Address)>,
    pub revert_bridge: bool,
}

impl Default for MockState {
    fn default() -> Self {
        Self {
            bound: true,
            holding: TokenHolding {
                balance: U256::ZERO,
                decimals: 18,
                symbol: "TKN".to_string(),
            },
            native_balance: U256::ZERO,
            view_fee: Some(U256::ZERO),
            calculated_fee: Some(U256::ZERO),
            oracle_fee: Some(U256::ZERO),
            bridge_fee: Some(BridgeFeeEstimate::default()),
            price_feeds: HashMap::new(),
            failing_tokens: Vec::new(),
            paused: false,
            bridge_calls: Vec::new(),
            whitelist_calls: Vec::new(),
            contract_updates: Vec::new(),
            revert_bridge: false,
        }
    }
}

#[derive(Debug, Default)]
pub struct MockVault {
    pub state: Mutex<MockState>,
}

impl MockVault {
    pub fn new(state: MockState) -> Self {
        Self {
            state: Mutex::new(state),
        }
    }

    pub fn bridge_calls(&self) -> Vec<U256> {
        self.state.lock().bridge_calls.clone()
    }

    pub fn whitelist_calls(&self) -> Vec<(Address, B256)> {
        self.state.lock().whitelist_calls.clone()
    }

    pub fn contract_updates(&self) -> Vec<(&'static str, Address)> {
        self.state.lock().contract_updates.clone()
    }

    fn check_bound(&self) -> Result<()> {
        if self.state.lock().bound {
            Ok(())
        } else {
            Err(NotDeployed {
                network: "mock".to_string(),
            }
            .into())
        }
    }

    fn tx_hash(n: usize) -> B256 {
        B256::from(U256::from(n + 1))
    }
}

#[async_trait]
impl VaultBackend for MockVault {
    fn network(&self) -> &str {
        "mock"
    }

    fn signer(&self) -> Address {
        SIGNER
    }

    fn vault_address(&self) -> Result<Address> {
        self.check_bound()?;
        Ok(VAULT)
    }

    async fn get_vault(&self, _receiver: Address) -> Result<Address> {
        self.check_bound()?;
        Ok(RECEIVER_VAULT)
    }

    async fn token_holding(&self, _token: Address, _holder: Address) -> Result<TokenHolding> {
        Ok(self.state.lock().holding.clone())
    }

    async fn native_balance(&self, _account: Address) -> Result<U256> {
        Ok(self.state.lock().native_balance)
    }

    async fn calculate_fee_amount(&self, _token: Address, _price_updates: &[Bytes]) -> Result<U256> {
        self.check_bound()?;
        self.state
            .lock()
            .calculated_fee
            .ok_or_else(|| anyhow!("execution reverted: stale price"))
    }

    async fn view_fee_amount(&self, _token: Address) -> Result<U256> {
        self.check_bound()?;
        self.state
            .lock()
            .view_fee
            .ok_or_else(|| anyhow!("execution reverted: no price"))
    }

    async fn pyth_oracle(&self) -> Result<Address> {
        self.check_bound()?;
        Ok(ORACLE)
    }

    async fn oracle_update_fee(&self, _oracle: Address, _price_updates: &[Bytes]) -> Result<U256> {
        self.state
            .lock()
            .oracle_fee
            .ok_or_else(|| anyhow!("oracle unreachable"))
    }

    async fn estimate_bridge_fee(
        &self,
        _use_alternate_fee_token: bool,
        _adapter_params: &Bytes,
    ) -> Result<BridgeFeeEstimate> {
        self.check_bound()?;
        self.state
            .lock()
            .bridge_fee
            .ok_or_else(|| anyhow!("estimateBridgeFee reverted"))
    }

    async fn bridge_vault_tokens(
        &self,
        _receiver: Address,
        _token: Address,
        _price_updates: &[Bytes],
        value: U256,
    ) -> Result<B256> {
        self.check_bound()?;
        let mut state = self.state.lock();
        state.bridge_calls.push(value);
        if state.revert_bridge {
            return Err(vault_chain::TransactionReverted {
                tx_hash: Self::tx_hash(state.bridge_calls.len()),
            }
            .into());
        }
        Ok(Self::tx_hash(state.bridge_calls.len()))
    }

    async fn token_price_feed(&self, token: Address) -> Result<B256> {
        self.check_bound()?;
        let state = self.state.lock();
        if state.failing_tokens.contains(&token) {
            return Err(anyhow!("tokenPriceFeeds reverted"));
        }
        Ok(state.price_feeds.get(&token).copied().unwrap_or(B256::ZERO))
    }

    async fn whitelist_token(&self, token: Address, price_id: B256) -> Result<B256> {
        self.check_bound()?;
        let mut state = self.state.lock();
        state.whitelist_calls.push((token, price_id));
        state.price_feeds.insert(token, price_id);
        Ok(Self::tx_hash(state.whitelist_calls.len()))
    }

    async fn remove_token(&self, token: Address) -> Result<B256> {
        self.check_bound()?;
        self.state.lock().price_feeds.remove(&token);
        Ok(Self::tx_hash(0))
    }

    async fn is_paused(&self) -> Result<bool> {
        self.check_bound()?;
        Ok(self.state.lock().paused)
    }

    async fn pause(&self) -> Result<B256> {
        self.check_bound()?;
        self.state.lock().paused = true;
        Ok(Self::tx_hash(0))
    }

    async fn unpause(&self) -> Result<B256> {
        self.check_bound()?;
        self.state.lock().paused = false;
        Ok(Self::tx_hash(0))
    }

    async fn update_bridge(&self, bridge: Address) -> Result<B256> {
        self.check_bound()?;
        self.state.lock().contract_updates.push(("bridge", bridge));
        Ok(Self::tx_hash(0))
    }

    async fn update_pyth_oracle(&self, oracle: Address) -> Result<B256> {
        self.check_bound()?;
        self.state.lock().contract_updates.push(("pythOracle", oracle));
        Ok(Self::tx_hash(0))
    }

    async fn update_fee_recipient(&self, _recipient: Address) -> Result<B256> {
        self.check_bound()?;
        Ok(Self::tx_hash(0))
    }

    async fn update_remote_chain_id(&self, _chain_id: u16) -> Result<B256> {
        self.check_bound()?;
        Ok(Self::tx_hash(0))
    }
}
