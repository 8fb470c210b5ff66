//! JSON-RPC implementation of [`VaultBackend`].

use alloy::primitives::{Address, Bytes, B256, U256};
use alloy::providers::{Provider, ProviderBuilder};
use alloy::sol_types::{SolCall, SolValue};
use anyhow::Result;
use async_trait::async_trait;
use tracing::{debug, info};

use super::{BridgeFeeEstimate, ContractBinding, VaultBackend};
use crate::contracts::{IBridgeVault, IPyth};
use crate::provider::{ChainReader, TokenHolding};
use crate::signer::{DeployedContract, TransactionSender};

/// Vault contract wrapper with transaction sending capability.
#[derive(Debug)]
pub struct VaultContract {
    /// Network name (for error messages and logs)
    network: String,
    /// Vault address, if deployed
    binding: ContractBinding,
    /// Read-only access
    reader: ChainReader,
    /// Transaction sender
    sender: TransactionSender,
}

impl VaultContract {
    /// Create a facade for `network`.
    ///
    /// No network I/O happens here; an invalid key fails immediately.
    pub fn new(
        network: &str,
        rpc_url: &str,
        chain_id: u64,
        private_key: &str,
        binding: ContractBinding,
    ) -> Result<Self> {
        let sender = TransactionSender::new(private_key, rpc_url, chain_id)?;

        info!(
            network,
            signer = %sender.address,
            binding = ?binding,
            "Vault facade initialized"
        );

        Ok(Self {
            network: network.to_string(),
            binding,
            reader: ChainReader::new(rpc_url),
            sender,
        })
    }

    /// Current binding.
    pub fn binding(&self) -> ContractBinding {
        self.binding
    }

    /// Deploy a new vault and bind this facade to it.
    pub async fn deploy(
        &mut self,
        creation_code: Bytes,
        fee_recipient: Address,
        bridge: Address,
        pyth_oracle: Address,
    ) -> Result<DeployedContract> {
        let args = (fee_recipient, bridge, pyth_oracle).abi_encode_params();
        let mut code = creation_code.to_vec();
        code.extend_from_slice(&args);

        info!(
            network = %self.network,
            fee_recipient = %fee_recipient,
            bridge = %bridge,
            pyth_oracle = %pyth_oracle,
            code_len = code.len(),
            "Deploying vault contract"
        );

        let deployed = self.sender.deploy(Bytes::from(code)).await?;
        self.binding = ContractBinding::Bound(deployed.address);
        Ok(deployed)
    }

    fn bound(&self) -> Result<Address> {
        Ok(self.binding.address(&self.network)?)
    }

    async fn send<C: SolCall>(&self, call: C, value: U256) -> Result<B256> {
        let vault = self.bound()?;
        self.sender
            .send_transaction(vault, Bytes::from(call.abi_encode()), value)
            .await
    }

    fn reader_provider(&self) -> Result<impl Provider> {
        Ok(ProviderBuilder::new().on_http(self.reader.rpc_url().parse()?))
    }
}

#[async_trait]
impl VaultBackend for VaultContract {
    fn network(&self) -> &str {
        &self.network
    }

    fn signer(&self) -> Address {
        self.sender.address
    }

    fn vault_address(&self) -> Result<Address> {
        self.bound()
    }

    async fn get_vault(&self, receiver: Address) -> Result<Address> {
        let provider = self.reader_provider()?;
        let vault = IBridgeVault::new(self.bound()?, &provider);
        Ok(vault.getVault(receiver).call().await?._0)
    }

    async fn token_holding(&self, token: Address, holder: Address) -> Result<TokenHolding> {
        self.reader.token_holding(token, holder).await
    }

    async fn native_balance(&self, account: Address) -> Result<U256> {
        self.reader.native_balance(account).await
    }

    async fn calculate_fee_amount(&self, token: Address, price_updates: &[Bytes]) -> Result<U256> {
        let provider = self.reader_provider()?;
        let vault = IBridgeVault::new(self.bound()?, &provider);
        Ok(vault
            .calculateFeeAmount(token, price_updates.to_vec())
            .call()
            .await?
            ._0)
    }

    async fn view_fee_amount(&self, token: Address) -> Result<U256> {
        let provider = self.reader_provider()?;
        let vault = IBridgeVault::new(self.bound()?, &provider);
        Ok(vault.viewFeeAmount(token).call().await?._0)
    }

    async fn pyth_oracle(&self) -> Result<Address> {
        let provider = self.reader_provider()?;
        let vault = IBridgeVault::new(self.bound()?, &provider);
        Ok(vault.pythOracle().call().await?._0)
    }

    async fn oracle_update_fee(&self, oracle: Address, price_updates: &[Bytes]) -> Result<U256> {
        // Read-only handle on the oracle, independent of the signing path
        let provider = self.reader_provider()?;
        let pyth = IPyth::new(oracle, &provider);
        let fee = pyth.getUpdateFee(price_updates.to_vec()).call().await?.feeAmount;
        debug!(oracle = %oracle, updates = price_updates.len(), fee = %fee, "Oracle update fee");
        Ok(fee)
    }

    async fn estimate_bridge_fee(
        &self,
        use_alternate_fee_token: bool,
        adapter_params: &Bytes,
    ) -> Result<BridgeFeeEstimate> {
        let provider = self.reader_provider()?;
        let vault = IBridgeVault::new(self.bound()?, &provider);
        let quote = vault
            .estimateBridgeFee(use_alternate_fee_token, adapter_params.clone())
            .call()
            .await?;
        Ok(BridgeFeeEstimate {
            native_fee: quote.nativeFee,
            alternate_fee: quote.zroFee,
        })
    }

    async fn bridge_vault_tokens(
        &self,
        receiver: Address,
        token: Address,
        price_updates: &[Bytes],
        value: U256,
    ) -> Result<B256> {
        info!(
            network = %self.network,
            receiver = %receiver,
            token = %token,
            value = %value,
            updates = price_updates.len(),
            "[CONTRACT] Sending bridgeVaultTokens"
        );
        let call = IBridgeVault::bridgeVaultTokensCall {
            receiver,
            token,
            priceUpdate: price_updates.to_vec(),
        };
        self.send(call, value).await
    }

    async fn token_price_feed(&self, token: Address) -> Result<B256> {
        let provider = self.reader_provider()?;
        let vault = IBridgeVault::new(self.bound()?, &provider);
        Ok(vault.tokenPriceFeeds(token).call().await?._0)
    }

    async fn whitelist_token(&self, token: Address, price_id: B256) -> Result<B256> {
        info!(token = %token, price_id = %price_id, "[CONTRACT] Sending whitelistToken");
        self.send(IBridgeVault::whitelistTokenCall { token, priceId: price_id }, U256::ZERO)
            .await
    }

    async fn remove_token(&self, token: Address) -> Result<B256> {
        info!(token = %token, "[CONTRACT] Sending removeToken");
        self.send(IBridgeVault::removeTokenCall { token }, U256::ZERO).await
    }

    async fn is_paused(&self) -> Result<bool> {
        let provider = self.reader_provider()?;
        let vault = IBridgeVault::new(self.bound()?, &provider);
        Ok(vault.paused().call().await?._0)
    }

    async fn pause(&self) -> Result<B256> {
        self.send(IBridgeVault::pauseCall {}, U256::ZERO).await
    }

    async fn unpause(&self) -> Result<B256> {
        self.send(IBridgeVault::unPauseCall {}, U256::ZERO).await
    }

    async fn update_bridge(&self, bridge: Address) -> Result<B256> {
        self.send(IBridgeVault::updateBridgeCall { newBridge: bridge }, U256::ZERO)
            .await
    }

    async fn update_pyth_oracle(&self, oracle: Address) -> Result<B256> {
        self.send(IBridgeVault::updatePythOracleCall { newOracle: oracle }, U256::ZERO)
            .await
    }

    async fn update_fee_recipient(&self, recipient: Address) -> Result<B256> {
        self.send(
            IBridgeVault::updateFeeRecipientCall {
                newRecipient: recipient,
            },
            U256::ZERO,
        )
        .await
    }

    async fn update_remote_chain_id(&self, chain_id: u16) -> Result<B256> {
        self.send(
            IBridgeVault::updateRemoteChainIdCall {
                newChainId: chain_id,
            },
            U256::ZERO,
        )
        .await
    }
}
