//! Pyth Hermes price service client.

use alloy::primitives::Bytes;
use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::{debug, instrument};

/// Default public Hermes endpoint.
pub const DEFAULT_HERMES_URL: &str = "https://hermes.pyth.network";

/// Price component of a Hermes feed.
#[derive(Debug, Clone, Deserialize)]
pub struct FeedPrice {
    /// Integer price, scaled by `10^expo`
    pub price: String,
    /// Confidence interval, same scale as `price`
    #[serde(default)]
    pub conf: String,
    pub expo: i32,
    pub publish_time: i64,
}

/// Latest price feed as reported by Hermes.
#[derive(Debug, Clone, Deserialize)]
pub struct PriceFeed {
    /// Feed id (hex, without 0x)
    pub id: String,
    pub price: FeedPrice,
    #[serde(default)]
    pub ema_price: Option<FeedPrice>,
}

/// Update blob as returned by the service: a hex string, or a serialized
/// Node `Buffer`.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum RawUpdate {
    Hex(String),
    Buffer {
        #[serde(rename = "type")]
        kind: String,
        data: Vec<u8>,
    },
}

impl RawUpdate {
    fn into_bytes(self) -> Result<Bytes> {
        match self {
            RawUpdate::Hex(s) => {
                let digits = s.strip_prefix("0x").unwrap_or(&s);
                let raw = hex::decode(digits)
                    .with_context(|| format!("Unexpected price update data format: {s}"))?;
                Ok(Bytes::from(raw))
            }
            RawUpdate::Buffer { kind, data } if kind == "Buffer" => Ok(Bytes::from(data)),
            RawUpdate::Buffer { kind, .. } => {
                anyhow::bail!("Unexpected price update data format: {kind}")
            }
        }
    }
}

/// Hermes client for price feeds and encoded update blobs.
#[derive(Debug, Clone)]
pub struct HermesClient {
    client: reqwest::Client,
    base_url: String,
}

impl Default for HermesClient {
    fn default() -> Self {
        Self::new()
    }
}

impl HermesClient {
    /// Create a client against the public Hermes endpoint.
    pub fn new() -> Self {
        Self::with_base_url(DEFAULT_HERMES_URL)
    }

    /// Create a client with custom base URL.
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Latest price data for one feed.
    #[instrument(skip(self))]
    pub async fn latest_price_feeds(&self, price_feed_id: &str) -> Result<Vec<PriceFeed>> {
        let url = format!("{}/api/latest_price_feeds", self.base_url);

        let response = self
            .client
            .get(&url)
            .query(&[("ids[]", price_feed_id)])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Hermes API error: {} - {}", status, body);
        }

        let feeds: Vec<PriceFeed> = response.json().await?;
        if feeds.is_empty() {
            anyhow::bail!("No price data found for price feed ID: {}", price_feed_id);
        }

        debug!(feeds = feeds.len(), "Got price feeds");
        Ok(feeds)
    }

    /// Latest encoded update blobs for one feed, targeted at `chain_id`.
    #[instrument(skip(self))]
    pub async fn latest_update_blobs(&self, price_feed_id: &str, chain_id: u64) -> Result<Vec<Bytes>> {
        let url = format!("{}/api/latest_vaas", self.base_url);
        let chain = chain_id.to_string();

        let response = self
            .client
            .get(&url)
            .query(&[
                ("ids[]", price_feed_id),
                ("encoding", "hex"),
                ("target_chains[]", chain.as_str()),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Hermes API error: {} - {}", status, body);
        }

        let raw: Vec<RawUpdate> = response.json().await?;
        let blobs = normalize_updates(raw)?;
        if blobs.is_empty() {
            anyhow::bail!("No price update data available for network ID: {}", chain_id);
        }

        debug!(blobs = blobs.len(), "Got price update blobs");
        Ok(blobs)
    }

    /// Fetch update blobs after confirming the feed exists.
    pub async fn fetch_price_update_data(&self, price_feed_id: &str, chain_id: u64) -> Result<Vec<Bytes>> {
        self.latest_price_feeds(price_feed_id)
            .await
            .context("Failed to fetch price update data")?;
        self.latest_update_blobs(price_feed_id, chain_id)
            .await
            .context("Failed to fetch price update data")
    }
}

fn normalize_updates(raw: Vec<RawUpdate>) -> Result<Vec<Bytes>> {
    raw.into_iter().map(RawUpdate::into_bytes).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> Result<Vec<Bytes>> {
        let raw: Vec<RawUpdate> = serde_json::from_str(json)?;
        normalize_updates(raw)
    }

    #[test]
    fn test_hex_with_and_without_prefix() {
        let blobs = parse(r#"["0x0102", "0a0b"]"#).unwrap();
        assert_eq!(blobs[0].as_ref(), &[0x01, 0x02]);
        assert_eq!(blobs[1].as_ref(), &[0x0a, 0x0b]);
    }

    #[test]
    fn test_buffer_object() {
        let blobs = parse(r#"[{"type": "Buffer", "data": [1, 2, 255]}]"#).unwrap();
        assert_eq!(blobs[0].as_ref(), &[1, 2, 255]);
    }

    #[test]
    fn test_unexpected_formats_rejected() {
        assert!(parse(r#"["not-hex"]"#).is_err());
        assert!(parse(r#"[{"type": "Uint8Array", "data": [1]}]"#).is_err());
        assert!(serde_json::from_str::<Vec<RawUpdate>>("[42]").is_err());
    }

    #[test]
    fn test_price_feed_deserialize() {
        let json = r#"[{
            "id": "ff61491a931112ddf1bd8147cd1b641375f79f5825126d665480874634fd0ace",
            "price": {"price": "342512000000", "conf": "151000000", "expo": -8, "publish_time": 1700000000},
            "ema_price": {"price": "342000000000", "conf": "150000000", "expo": -8, "publish_time": 1700000000}
        }]"#;
        let feeds: Vec<PriceFeed> = serde_json::from_str(json).unwrap();
        assert_eq!(feeds[0].price.expo, -8);
        assert!(feeds[0].ema_price.is_some());
    }

    #[test]
    fn test_base_url_trailing_slash() {
        let client = HermesClient::with_base_url("http://localhost:9000/");
        assert_eq!(client.base_url, "http://localhost:9000");
    }

    #[tokio::test]
    #[ignore] // Requires network
    async fn test_fetch_eth_usd_updates() {
        let client = HermesClient::new();
        let blobs = client
            .fetch_price_update_data(
                "0xff61491a931112ddf1bd8147cd1b641375f79f5825126d665480874634fd0ace",
                42161,
            )
            .await
            .unwrap();
        assert!(!blobs.is_empty());
    }
}
