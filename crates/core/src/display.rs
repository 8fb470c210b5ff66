//! Compact renderings for console tables.

use alloy::primitives::{Address, B256};

fn shorten(full: &str) -> String {
    if full.len() <= 12 {
        return full.to_string();
    }
    format!("{}...{}", &full[..6], &full[full.len() - 4..])
}

/// `0x1234...abcd`, checksummed.
pub fn short_address(address: &Address) -> String {
    shorten(&address.to_checksum(None))
}

/// `0x1234...abcd`.
pub fn short_feed_id(feed_id: &B256) -> String {
    shorten(&feed_id.to_string())
}
