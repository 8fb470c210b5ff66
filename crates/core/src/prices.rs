//! Price update retrieval for whitelisted tokens.

use alloy::primitives::{Address, Bytes};
use tracing::info;
use vault_api::HermesClient;

use crate::config::TokenWhitelist;
use crate::error::{Result, VaultError};
use crate::validation::parse_address;

/// Feed id configured for `token`, matched by address rather than spelling.
pub fn configured_feed_id(whitelist: &TokenWhitelist, token: Address) -> Option<&str> {
    whitelist
        .iter()
        .find(|(key, _)| parse_address(key) == Some(token))
        .map(|(_, feed_id)| feed_id.as_str())
}

/// Fetch fresh update blobs for `token`'s configured feed, targeted at
/// `chain_id`.
pub async fn fetch_token_price_updates(
    hermes: &HermesClient,
    whitelist: &TokenWhitelist,
    token: Address,
    chain_id: u64,
) -> Result<Vec<Bytes>> {
    let feed_id = configured_feed_id(whitelist, token).ok_or_else(|| {
        VaultError::Validation(format!("Token {token} has no price feed configured"))
    })?;

    info!(token = %token, feed_id, chain_id, "Fetching price updates");
    hermes
        .fetch_price_update_data(feed_id, chain_id)
        .await
        .map_err(|e| VaultError::RemoteQuery(format!("{e:#}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOKEN: &str = "0x5FbDB2315678afecb367f032d93F642f64180aa3";

    #[test]
    fn test_feed_lookup_matches_any_spelling() {
        let whitelist = TokenWhitelist::from([(TOKEN.to_lowercase(), "0xfeed".to_string())]);
        let token: Address = TOKEN.parse().unwrap();

        assert_eq!(configured_feed_id(&whitelist, token), Some("0xfeed"));
        assert_eq!(configured_feed_id(&whitelist, Address::ZERO), None);
    }

    #[tokio::test]
    async fn test_unconfigured_token_fails_before_fetch() {
        // Unroutable base URL: reaching the network would fail differently
        let hermes = HermesClient::with_base_url("http://127.0.0.1:9");
        let err = fetch_token_price_updates(&hermes, &TokenWhitelist::new(), Address::ZERO, 1)
            .await
            .unwrap_err();
        assert!(matches!(err, VaultError::Validation(_)));
    }
}
