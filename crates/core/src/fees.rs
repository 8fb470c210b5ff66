//! Fee and funds resolution.
//!
//! All amounts are wei as [`U256`]. The buffer and the submission margin
//! use truncating integer division: round down, then add. Remote fee
//! queries that fail fall back to fixed conservative amounts so a bridge
//! stays attemptable while the oracle or messaging layer is unreachable.

use alloy::primitives::{Bytes, U256};
use tracing::{debug, warn};
use vault_chain::{BridgeFeeEstimate, VaultBackend};

/// Price update fee assumed when the oracle cannot be queried (0.001 ETH).
pub const FALLBACK_PRICE_UPDATE_FEE: U256 = U256::from_limbs([1_000_000_000_000_000, 0, 0, 0]);

/// Native messaging fee assumed when the vault cannot quote (0.005 ETH).
pub const FALLBACK_NATIVE_FEE: U256 = U256::from_limbs([5_000_000_000_000_000, 0, 0, 0]);

/// Estimation-time buffer, percent of the fee sum.
pub const BUFFER_PERCENT: u64 = 10;

/// Submission-time margin over the total, as a ratio (12/10 = +20%).
const SUBMISSION_MARGIN_NUM: u64 = 12;
const SUBMISSION_MARGIN_DEN: u64 = 10;

/// Native currency needed for one bridge transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FeeQuote {
    pub price_update_fee: U256,
    pub messaging_fee: U256,
    pub buffer: U256,
    pub total: U256,
}

impl FeeQuote {
    /// `total = p + n + floor((p + n) * 10 / 100)`
    pub fn from_parts(price_update_fee: U256, messaging_fee: U256) -> Self {
        let sum = price_update_fee.saturating_add(messaging_fee);
        let buffer = sum.saturating_mul(U256::from(BUFFER_PERCENT)) / U256::from(100);
        Self {
            price_update_fee,
            messaging_fee,
            buffer,
            total: sum.saturating_add(buffer),
        }
    }

    /// Value carried by the bridge transaction: `floor(total * 1.2)`.
    pub fn submission_value(&self) -> U256 {
        submission_value(self.total)
    }
}

pub fn submission_value(total: U256) -> U256 {
    total.saturating_mul(U256::from(SUBMISSION_MARGIN_NUM)) / U256::from(SUBMISSION_MARGIN_DEN)
}

/// Resolves fees against a vault backend.
pub struct FeeResolver<'a, V: VaultBackend + ?Sized> {
    vault: &'a V,
}

impl<'a, V: VaultBackend + ?Sized> FeeResolver<'a, V> {
    pub fn new(vault: &'a V) -> Self {
        Self { vault }
    }

    /// Oracle fee for `price_updates`; zero when there are none.
    pub async fn price_update_fee(&self, price_updates: &[Bytes]) -> U256 {
        if price_updates.is_empty() {
            return U256::ZERO;
        }

        let fee = match self.vault.pyth_oracle().await {
            Ok(oracle) => self.vault.oracle_update_fee(oracle, price_updates).await,
            Err(e) => Err(e),
        };

        match fee {
            Ok(fee) => {
                debug!(fee = %fee, updates = price_updates.len(), "Price update fee");
                fee
            }
            Err(e) => {
                warn!(
                    error = %format!("{e:#}"),
                    fallback = %FALLBACK_PRICE_UPDATE_FEE,
                    "Error getting price update fee, using fallback"
                );
                FALLBACK_PRICE_UPDATE_FEE
            }
        }
    }

    /// Messaging fee quote from the vault.
    pub async fn estimate_bridge_fee(
        &self,
        use_alternate_fee_token: bool,
        adapter_params: &Bytes,
    ) -> BridgeFeeEstimate {
        match self
            .vault
            .estimate_bridge_fee(use_alternate_fee_token, adapter_params)
            .await
        {
            Ok(estimate) => {
                debug!(
                    native_fee = %estimate.native_fee,
                    alternate_fee = %estimate.alternate_fee,
                    "Bridge fee estimate"
                );
                estimate
            }
            Err(e) => {
                warn!(
                    error = %format!("{e:#}"),
                    fallback = %FALLBACK_NATIVE_FEE,
                    "Error estimating bridge fee, using fallback"
                );
                BridgeFeeEstimate {
                    native_fee: FALLBACK_NATIVE_FEE,
                    alternate_fee: U256::ZERO,
                }
            }
        }
    }

    /// Full quote: price update fee, messaging fee and buffer.
    pub async fn quote(
        &self,
        price_updates: &[Bytes],
        use_alternate_fee_token: bool,
        adapter_params: &Bytes,
    ) -> FeeQuote {
        let price_update_fee = self.price_update_fee(price_updates).await;
        let estimate = self
            .estimate_bridge_fee(use_alternate_fee_token, adapter_params)
            .await;
        let quote = FeeQuote::from_parts(price_update_fee, estimate.native_fee);

        debug!(
            price_update_fee = %quote.price_update_fee,
            messaging_fee = %quote.messaging_fee,
            buffer = %quote.buffer,
            total = %quote.total,
            "Total ETH required"
        );
        quote
    }

    /// Total native currency required, buffer included.
    pub async fn calculate_total_eth_required(
        &self,
        price_updates: &[Bytes],
        use_alternate_fee_token: bool,
        adapter_params: &Bytes,
    ) -> U256 {
        self.quote(price_updates, use_alternate_fee_token, adapter_params)
            .await
            .total
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{MockState, MockVault};

    fn wei(n: u64) -> U256 {
        U256::from(n)
    }

    #[test]
    fn test_buffer_law() {
        for (p, n) in [(0u64, 0u64), (0, 50), (1, 0), (9, 0), (10, 0), (999, 1), (123_456, 789)] {
            let quote = FeeQuote::from_parts(wei(p), wei(n));
            let sum = p + n;
            assert_eq!(quote.buffer, wei(sum * 10 / 100), "p={p} n={n}");
            assert_eq!(quote.total, wei(sum + sum * 10 / 100), "p={p} n={n}");
        }
    }

    #[test]
    fn test_buffer_truncates() {
        // 9 * 10 / 100 = 0.9 -> 0
        assert_eq!(FeeQuote::from_parts(wei(9), wei(0)).total, wei(9));
        assert_eq!(FeeQuote::from_parts(wei(15), wei(0)).total, wei(16));
    }

    #[test]
    fn test_submission_margin_law() {
        for total in [0u64, 1, 4, 5, 155, 1_000, 999_999_999] {
            assert_eq!(submission_value(wei(total)), wei(total * 12 / 10), "total={total}");
        }
        assert_eq!(FeeQuote::from_parts(wei(0), wei(50)).submission_value(), wei(66));
    }

    #[test]
    fn test_large_amounts_do_not_overflow() {
        let quote = FeeQuote::from_parts(U256::MAX, U256::MAX);
        assert_eq!(quote.total, U256::MAX);
    }

    #[test]
    fn test_fallback_constants() {
        assert_eq!(FALLBACK_PRICE_UPDATE_FEE, U256::from(10u64).pow(U256::from(15)));
        assert_eq!(FALLBACK_NATIVE_FEE, U256::from(5u64) * U256::from(10u64).pow(U256::from(15)));
    }

    #[tokio::test]
    async fn test_no_updates_means_no_price_fee() {
        let vault = MockVault::new(MockState {
            oracle_fee: None,
            ..MockState::default()
        });
        assert_eq!(FeeResolver::new(&vault).price_update_fee(&[]).await, U256::ZERO);
    }

    #[tokio::test]
    async fn test_oracle_fee_and_fallback() {
        let updates = vec![Bytes::from_static(&[1, 2, 3])];

        let vault = MockVault::new(MockState {
            oracle_fee: Some(wei(7)),
            ..MockState::default()
        });
        assert_eq!(FeeResolver::new(&vault).price_update_fee(&updates).await, wei(7));

        let failing = MockVault::new(MockState {
            oracle_fee: None,
            ..MockState::default()
        });
        assert_eq!(
            FeeResolver::new(&failing).price_update_fee(&updates).await,
            FALLBACK_PRICE_UPDATE_FEE
        );
    }

    #[tokio::test]
    async fn test_bridge_fee_fallback() {
        let vault = MockVault::new(MockState {
            bridge_fee: None,
            ..MockState::default()
        });
        let estimate = FeeResolver::new(&vault)
            .estimate_bridge_fee(false, &Bytes::new())
            .await;
        assert_eq!(estimate.native_fee, FALLBACK_NATIVE_FEE);
        assert_eq!(estimate.alternate_fee, U256::ZERO);
    }

    #[tokio::test]
    async fn test_total_required() {
        let vault = MockVault::new(MockState {
            oracle_fee: Some(wei(100)),
            bridge_fee: Some(BridgeFeeEstimate {
                native_fee: wei(900),
                alternate_fee: wei(3),
            }),
            ..MockState::default()
        });
        let updates = vec![Bytes::from_static(&[0xaa])];

        let resolver = FeeResolver::new(&vault);
        let quote = resolver.quote(&updates, false, &Bytes::new()).await;
        assert_eq!(quote.buffer, wei(100));
        assert_eq!(quote.total, wei(1_100));
        assert_eq!(
            resolver
                .calculate_total_eth_required(&updates, false, &Bytes::new())
                .await,
            wei(1_100)
        );
    }
}
