//! Contract bindings for the bridge vault.
//!
//! This module provides the `sol!` interfaces the facade encodes calls
//! against:
//! - [`bindings::IBridgeVault`]: the deployed vault
//! - [`bindings::IPyth`]: the price oracle fee query
//! - [`common::IERC20`]: token balance and metadata reads

pub mod bindings;
pub mod common;

pub use bindings::{IBridgeVault, IPyth};
pub use common::{IERC20, UNSET_PRICE_FEED};

use alloy::primitives::Bytes;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

/// Foundry artifact subset needed to deploy a contract.
#[derive(Debug, Deserialize)]
struct FoundryArtifact {
    bytecode: ArtifactBytecode,
}

#[derive(Debug, Deserialize)]
struct ArtifactBytecode {
    object: String,
}

/// Load creation bytecode from a Foundry JSON artifact
/// (`contracts/out/BridgeVault.sol/BridgeVault.json`).
pub fn load_creation_code(path: impl AsRef<Path>) -> Result<Bytes> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read artifact {}", path.display()))?;
    parse_creation_code(&content)
        .with_context(|| format!("Invalid artifact {}", path.display()))
}

fn parse_creation_code(content: &str) -> Result<Bytes> {
    let artifact: FoundryArtifact = serde_json::from_str(content)?;
    let code: Bytes = artifact.bytecode.object.parse()?;
    if code.is_empty() {
        anyhow::bail!("Artifact has empty creation bytecode (abstract contract or interface?)");
    }
    Ok(code)
}
