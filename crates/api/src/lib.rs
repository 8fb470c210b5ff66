//! Vault API clients for external services.
//!
//! This crate provides HTTP clients for:
//! - Pyth Hermes: latest price feeds and encoded price update blobs

mod hermes;

pub use hermes::{FeedPrice, HermesClient, PriceFeed, DEFAULT_HERMES_URL};
