//! Command handlers.
//!
//! Each handler resolves what it needs from the [`ConfigStore`], drives the
//! core, and prints one success outcome to stdout. Errors propagate to
//! `main`, which prints them and exits non-zero.

pub mod admin;
pub mod bridge;
pub mod cache;
pub mod deploy;
pub mod network;
pub mod token;

use alloy::primitives::{Address, Bytes, B256};
use vault_core::validation::{parse_address, parse_price_feed_id};

/// clap value parser for addresses (EIP-55 checked when mixed case).
pub fn address_arg(input: &str) -> Result<Address, String> {
    parse_address(input).ok_or_else(|| format!("invalid address: {input}"))
}

/// clap value parser for 32-byte price feed ids.
pub fn feed_id_arg(input: &str) -> Result<B256, String> {
    parse_price_feed_id(input).ok_or_else(|| format!("invalid price feed ID: {input}"))
}

/// clap value parser for hex byte strings, with or without `0x`.
pub fn bytes_arg(input: &str) -> Result<Bytes, String> {
    input
        .parse::<Bytes>()
        .map_err(|e| format!("invalid hex data {input}: {e}"))
}

/// Print a confirmed transaction line.
pub fn print_tx(action: &str, tx_hash: &B256) {
    println!("{action} (tx: {tx_hash})");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_address_arg() {
        assert!(address_arg("0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266").is_ok());
        assert_eq!(address_arg("0x12").unwrap_err(), "invalid address: 0x12");
    }

    #[test]
    fn test_bytes_arg() {
        assert_eq!(bytes_arg("0x0102").unwrap().as_ref(), &[1, 2]);
        assert_eq!(bytes_arg("0a").unwrap().as_ref(), &[10]);
        assert!(bytes_arg("0xzz").is_err());
    }

    #[test]
    fn test_feed_id_arg() {
        assert!(feed_id_arg("ff61491a931112ddf1bd8147cd1b641375f79f5825126d665480874634fd0ace").is_ok());
        assert!(feed_id_arg("0xff").is_err());
    }
}
