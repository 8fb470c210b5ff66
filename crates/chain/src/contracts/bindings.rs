//! Contract bindings for the bridge vault and the Pyth oracle.
//!
//! The vault interface mirrors the deployed `BridgeVault` ABI. Only the entry
//! points the CLI drives are declared here.
//!
//! # Usage
//!
//! ```rust,ignore
//! use vault_chain::contracts::bindings::IBridgeVault;
//!
//! let vault = IBridgeVault::new(address, &provider);
//! let receiver_vault = vault.getVault(receiver).call().await?._0;
//! ```

use alloy::sol;

// ============================================================================
// Bridge Vault
// ============================================================================

sol! {
    /// Bridge vault contract interface (matches deployed contract)
    #[sol(rpc)]
    #[derive(Debug)]
    interface IBridgeVault {
        function getVault(address receiver) external view returns (address);
        function calculateFeeAmount(address token, bytes[] calldata priceUpdate) external returns (uint256);
        function viewFeeAmount(address token) external view returns (uint256);
        function estimateBridgeFee(bool useZro, bytes calldata adapterParams) external view returns (uint256 nativeFee, uint256 zroFee);
        function bridgeVaultTokens(address receiver, address token, bytes[] calldata priceUpdate) external payable;

        function paused() external view returns (bool);
        function pause() external;
        function unPause() external;

        function pythOracle() external view returns (address);
        function tokenPriceFeeds(address token) external view returns (bytes32);
        function whitelistToken(address token, bytes32 priceId) external;
        function removeToken(address token) external;

        function updateBridge(address newBridge) external;
        function updatePythOracle(address newOracle) external;
        function updateFeeRecipient(address newRecipient) external;
        function updateRemoteChainId(uint16 newChainId) external;
    }
}

// ============================================================================
// Pyth Oracle
// ============================================================================

sol! {
    /// Pyth oracle interface (fee query only)
    #[sol(rpc)]
    #[derive(Debug)]
    interface IPyth {
        function getUpdateFee(bytes[] calldata updateData) external view returns (uint256 feeAmount);
    }
}
