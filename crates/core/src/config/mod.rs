//! Configuration system for per-network vault settings.
//!
//! This module provides:
//! - Persisted types (networks, deployed contracts, token whitelists)
//! - The built-in default networks and the deep-merge used to overlay files
//! - [`ConfigStore`], which resolves, caches and persists the configuration

mod network;
mod store;

pub use network::{
    deep_merge, default_config, expand_env, Config, ContractSet, NetworkConfig, TokenWhitelist,
};
pub use store::{default_config_paths, ConfigStore, CONFIG_CACHE_TTL, CONFIG_FILE_NAME};
