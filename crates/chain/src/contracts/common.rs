//! Common contract interfaces shared across the vault tooling.
//!
//! Only the read-only ERC20 surface is needed: the vault's token balance and
//! the metadata used to render it.

use alloy::primitives::B256;
use alloy::sol;

// ERC20 interface for token reads
sol! {
    /// Standard ERC20 interface (read-only subset)
    #[sol(rpc)]
    interface IERC20 {
        function balanceOf(address account) external view returns (uint256);
        function decimals() external view returns (uint8);
        function symbol() external view returns (string);
    }
}

/// Value the vault reports for a token that has no price feed recorded.
pub const UNSET_PRICE_FEED: B256 = B256::ZERO;
