//! Read-only chain access for balances and token metadata.
//! Uses Alloy providers for type-safe RPC interactions.

use alloy::primitives::{Address, U256};
use alloy::providers::{Provider, ProviderBuilder};
use anyhow::Result;
use tracing::debug;

use crate::contracts::IERC20;

/// Token balance of a holder plus the metadata needed to render it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenHolding {
    pub balance: U256,
    pub decimals: u8,
    pub symbol: String,
}

/// Read-only access to one RPC endpoint.
///
/// A fresh HTTP provider is built per call; the CLI issues a handful of
/// sequential reads per command.
#[derive(Debug, Clone)]
pub struct ChainReader {
    rpc_url: String,
}

impl ChainReader {
    /// Create a reader for the given RPC URL.
    pub fn new(rpc_url: &str) -> Self {
        Self {
            rpc_url: rpc_url.to_string(),
        }
    }

    /// Get the RPC URL.
    pub fn rpc_url(&self) -> &str {
        &self.rpc_url
    }

    /// Read `holder`'s balance of `token` together with decimals and symbol.
    pub async fn token_holding(&self, token: Address, holder: Address) -> Result<TokenHolding> {
        let provider = ProviderBuilder::new().on_http(self.rpc_url.parse()?);
        let erc20 = IERC20::new(token, &provider);

        let balance = erc20.balanceOf(holder).call().await?._0;
        let decimals = erc20.decimals().call().await?._0;
        let symbol = erc20.symbol().call().await?._0;

        debug!(
            token = %token,
            holder = %holder,
            balance = %balance,
            decimals,
            symbol = %symbol,
            "Token holding fetched"
        );

        Ok(TokenHolding {
            balance,
            decimals,
            symbol,
        })
    }

    /// Native currency balance of `account`.
    pub async fn native_balance(&self, account: Address) -> Result<U256> {
        let provider = ProviderBuilder::new().on_http(self.rpc_url.parse()?);
        let balance = provider.get_balance(account).await?;
        Ok(balance)
    }
}
