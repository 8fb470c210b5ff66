//! Input validation.
//!
//! `is_valid_*` predicates never fail; `validate_*` assertions log and
//! return [`VaultError::Validation`]. [`validate_config`] collects every
//! structural problem as a message and leaves the decision to the caller.

use alloy::primitives::{Address, B256};
use std::sync::LazyLock;
use tracing::warn;

use crate::config::{expand_env, Config};
use crate::error::{Result, VaultError};

static NETWORK_NAME: LazyLock<regex_lite::Regex> = LazyLock::new(|| {
    regex_lite::Regex::new(r"^[A-Za-z0-9-]+$").expect("network name pattern compiles")
});

/// Parse an address, with or without `0x`.
///
/// Mixed-case input must carry a valid EIP-55 checksum.
pub fn parse_address(input: &str) -> Option<Address> {
    let digits = input.strip_prefix("0x").unwrap_or(input);
    let prefixed = format!("0x{digits}");

    let has_lower = digits.bytes().any(|b| b.is_ascii_lowercase());
    let has_upper = digits.bytes().any(|b| b.is_ascii_uppercase());
    if has_lower && has_upper {
        Address::parse_checksummed(&prefixed, None).ok()
    } else {
        prefixed.parse().ok()
    }
}

pub fn is_valid_address(input: &str) -> bool {
    parse_address(input).is_some()
}

/// Parse `input` as an address, failing with a message naming `label`.
pub fn validate_address(input: &str, label: &str) -> Result<Address> {
    parse_address(input).ok_or_else(|| {
        warn!(label, input, "Rejected address");
        VaultError::Validation(format!("Invalid {label} address: {input}"))
    })
}

pub fn is_valid_network_name(name: &str) -> bool {
    NETWORK_NAME.is_match(name)
}

pub fn validate_network_name(name: &str) -> Result<()> {
    if is_valid_network_name(name) {
        Ok(())
    } else {
        warn!(name, "Rejected network name");
        Err(VaultError::Validation(format!(
            "Invalid network name: '{name}'. Use only letters, numbers and hyphens."
        )))
    }
}

pub fn is_valid_url(input: &str) -> bool {
    url::Url::parse(input).is_ok()
}

pub fn validate_url(input: &str) -> Result<()> {
    if is_valid_url(input) {
        Ok(())
    } else {
        warn!(input, "Rejected URL");
        Err(VaultError::Validation(format!("Invalid URL: {input}")))
    }
}

pub fn is_valid_chain_id(chain_id: u64) -> bool {
    chain_id > 0
}

pub fn validate_chain_id(chain_id: u64) -> Result<()> {
    if is_valid_chain_id(chain_id) {
        Ok(())
    } else {
        warn!(chain_id, "Rejected chain id");
        Err(VaultError::Validation(format!(
            "Invalid chain ID: {chain_id}. Must be a positive integer."
        )))
    }
}

/// Parse a 32-byte price feed id, with or without `0x`.
pub fn parse_price_feed_id(input: &str) -> Option<B256> {
    let digits = input.strip_prefix("0x").unwrap_or(input);
    format!("0x{digits}").parse().ok()
}

pub fn validate_price_feed_id(input: &str) -> Result<B256> {
    parse_price_feed_id(input).ok_or_else(|| {
        warn!(input, "Rejected price feed id");
        VaultError::Validation(format!(
            "Invalid price feed ID: {input}. Expected 32 bytes of hex."
        ))
    })
}

/// Every structural problem in `config`, as human-readable messages.
pub fn validate_config(config: &Config) -> Vec<String> {
    let mut problems = Vec::new();

    if config.networks.is_empty() {
        problems.push("No networks configured".to_string());
    }

    for (name, network) in &config.networks {
        if !is_valid_network_name(name) {
            problems.push(format!("Invalid network name: '{name}'"));
        }

        let rpc_url = expand_env(&network.rpc_url);
        if !is_valid_url(&rpc_url) {
            problems.push(format!("Network '{name}': invalid RPC URL '{}'", network.rpc_url));
        }

        if !is_valid_chain_id(network.chain_id) {
            problems.push(format!("Network '{name}': invalid chain ID {}", network.chain_id));
        }

        if let Some(contracts) = &network.contracts {
            for (label, address) in [
                ("vault", &contracts.vault),
                ("bridge", &contracts.bridge),
                ("pythOracle", &contracts.pyth_oracle),
            ] {
                if !is_valid_address(address) {
                    problems.push(format!("Network '{name}': invalid {label} address '{address}'"));
                }
            }
        }

        if let Some(whitelist) = &network.token_whitelist {
            for (token, feed_id) in whitelist {
                if !is_valid_address(token) {
                    problems.push(format!("Network '{name}': invalid token address '{token}'"));
                }
                if feed_id.trim().is_empty() {
                    problems.push(format!("Network '{name}': empty price feed ID for token {token}"));
                }
            }
        }
    }

    problems
}
