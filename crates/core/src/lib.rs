//! Vault core logic.
//!
//! This crate provides the client-side orchestration for the bridge vault:
//! - Namespaced TTL cache persisted per user
//! - Configuration store (candidate files, deep merge over defaults, atomic saves)
//! - Input validation for addresses, network names, URLs and chain ids
//! - Fee and funds resolution with conservative fallbacks
//! - Bridge orchestration with pre-submission funds checks and dry runs
//! - Idempotent token whitelist reconciliation
//! - Contract address updates mirrored into the configuration
//! - Price update retrieval for whitelisted tokens
//! - Session wiring from configuration to a signing vault facade

mod admin;
pub mod cache;
pub mod config;
mod bridge;
mod display;
mod error;
mod fees;
mod prices;
mod session;
pub mod validation;
mod whitelist;

#[cfg(test)]
mod testing;

pub use admin::{update_contract, ContractUpdate};
pub use bridge::{BridgeOrchestrator, BridgeOutcome, BridgeRequest, BridgeStage, BridgeSummary};
pub use cache::{Cache, DEFAULT_CACHE_TTL};
pub use config::{Config, ConfigStore, ContractSet, NetworkConfig, TokenWhitelist};
pub use display::{short_address, short_feed_id};
pub use error::{Result, VaultError};
pub use fees::{
    submission_value, FeeQuote, FeeResolver, BUFFER_PERCENT, FALLBACK_NATIVE_FEE,
    FALLBACK_PRICE_UPDATE_FEE,
};
pub use prices::{configured_feed_id, fetch_token_price_updates};
pub use session::{private_key_from_env, Session, PRIVATE_KEY_ENV};
pub use whitelist::{
    on_chain_whitelist, reconcile_whitelist, ReconcileAction, ReconcileEntry, ReconcileReport,
};
