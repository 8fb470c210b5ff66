//! Persisted configuration types.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::LazyLock;

/// Token address to price feed id.
pub type TokenWhitelist = BTreeMap<String, String>;

/// Deployed contract addresses for one network.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ContractSet {
    pub vault: String,
    pub bridge: String,
    pub pyth_oracle: String,
}

/// Settings for one named network.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkConfig {
    /// RPC endpoint; may reference `${VAR}` environment variables
    #[serde(default)]
    pub rpc_url: String,
    /// Zero when the stored value is missing or not a positive integer
    #[serde(default, deserialize_with = "lenient_chain_id")]
    pub chain_id: u64,
    /// Display name
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contracts: Option<ContractSet>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_whitelist: Option<TokenWhitelist>,
}

impl NetworkConfig {
    pub fn new(name: impl Into<String>, rpc_url: impl Into<String>, chain_id: u64) -> Self {
        Self {
            rpc_url: rpc_url.into(),
            chain_id,
            name: name.into(),
            contracts: None,
            token_whitelist: Some(TokenWhitelist::new()),
        }
    }

    /// RPC URL with environment references expanded.
    pub fn resolved_rpc_url(&self) -> String {
        expand_env(&self.rpc_url)
    }
}

/// Accept a number or a numeric string; anything else reads as 0 and is
/// reported by config validation.
fn lenient_chain_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(match &value {
        Value::Number(n) => n.as_u64().unwrap_or(0),
        Value::String(s) => s.trim().parse().unwrap_or(0),
        _ => 0,
    })
}

/// Top-level configuration: network name to settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub networks: BTreeMap<String, NetworkConfig>,
}

impl Config {
    pub fn network_names(&self) -> Vec<String> {
        self.networks.keys().cloned().collect()
    }
}

/// Built-in networks every configuration starts from.
pub fn default_config() -> Config {
    let arbitrum_rpc =
        std::env::var("ARBITRUM_RPC_URL").unwrap_or_else(|_| "https://arb1.arbitrum.io/rpc".to_string());
    let localhost_rpc =
        std::env::var("LOCALHOST_RPC_URL").unwrap_or_else(|_| "http://127.0.0.1:8545".to_string());

    let mut networks = BTreeMap::new();
    networks.insert(
        "arbitrum".to_string(),
        NetworkConfig::new("Arbitrum One", arbitrum_rpc, 42161),
    );
    networks.insert(
        "localhost".to_string(),
        NetworkConfig::new("Localhost", localhost_rpc, 31337),
    );

    Config { networks }
}

/// Merge `overlay` into `base`.
///
/// Objects merge key by key; anything else in `overlay` replaces `base`.
pub fn deep_merge(base: &mut Value, overlay: Value) {
    match (base, overlay) {
        (Value::Object(base), Value::Object(overlay)) => {
            for (key, value) in overlay {
                match base.get_mut(&key) {
                    Some(existing) => deep_merge(existing, value),
                    None => {
                        base.insert(key, value);
                    }
                }
            }
        }
        (base, overlay) => *base = overlay,
    }
}

static ENV_REF: LazyLock<regex_lite::Regex> = LazyLock::new(|| {
    regex_lite::Regex::new(r"\$\{([^}]+)\}").expect("env reference pattern compiles")
});

/// Expand ${VAR_NAME} patterns with environment variable values.
///
/// Unset variables are left as written.
pub fn expand_env(s: &str) -> String {
    let mut result = s.to_string();

    for cap in ENV_REF.captures_iter(s) {
        if let (Some(full_match), Some(var_match)) = (cap.get(0), cap.get(1)) {
            if let Ok(value) = std::env::var(var_match.as_str()) {
                result = result.replace(full_match.as_str(), &value);
            }
        }
    }

    result
}
