//! Configuration resolution and persistence.

use anyhow::Context;
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, error, info, warn};

use super::network::{deep_merge, default_config, Config, ContractSet, NetworkConfig, TokenWhitelist};
use crate::cache::{default_cache_dir, Cache};
use crate::error::{Result, VaultError};
use crate::validation::{
    validate_address, validate_chain_id, validate_config, validate_network_name, validate_url,
};
use vault_chain::NotDeployed;

/// File name looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = "vault-config.json";

/// How long a resolved configuration is reused without touching disk.
pub const CONFIG_CACHE_TTL: Duration = Duration::from_secs(30);

const CACHE_NAMESPACE: &str = "config";
const CACHE_KEY: &str = "config";

/// Candidate files in priority order: working directory, then home.
pub fn default_config_paths() -> Vec<PathBuf> {
    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
    vec![
        cwd.join(CONFIG_FILE_NAME),
        home.join(".bridge-vault-cli").join("config.json"),
    ]
}

fn write_atomic(path: &Path, contents: &str) -> std::io::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    let tmp = path.with_extension("json.tmp");
    std::fs::write(&tmp, contents)?;
    std::fs::rename(&tmp, path).inspect_err(|_| {
        let _ = std::fs::remove_file(&tmp);
    })
}

/// Resolves, caches and persists the configuration.
#[derive(Debug)]
pub struct ConfigStore {
    paths: Vec<PathBuf>,
    cache: Cache,
}

impl ConfigStore {
    /// Store over the default candidate paths and per-user cache.
    pub fn open() -> Self {
        Self::new(
            default_config_paths(),
            Cache::open_in(default_cache_dir(), CACHE_NAMESPACE, CONFIG_CACHE_TTL),
        )
    }

    pub fn new(paths: Vec<PathBuf>, cache: Cache) -> Self {
        Self { paths, cache }
    }

    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }

    fn read_candidate(path: &Path) -> anyhow::Result<Config> {
        let raw = std::fs::read_to_string(path).context("read failed")?;
        let overlay: Value = serde_json::from_str(&raw).context("invalid JSON")?;

        let mut merged = serde_json::to_value(default_config())?;
        deep_merge(&mut merged, overlay);
        serde_json::from_value(merged).context("unexpected structure")
    }

    fn warn_problems(config: &Config, source: &str) {
        let problems = validate_config(config);
        if !problems.is_empty() {
            warn!(source, count = problems.len(), "Config validation warnings");
            for problem in &problems {
                warn!("- {problem}");
            }
        }
    }

    /// Resolve the configuration.
    ///
    /// Consults the cache, then the first existing candidate file merged
    /// over the defaults. With no candidate on disk the defaults are
    /// written to the first path. Unreadable files are logged and left
    /// untouched.
    pub fn load_config(&self) -> Config {
        if let Some(cached) = self.cache.get::<Config>(CACHE_KEY) {
            return cached;
        }

        let mut any_exists = false;
        for path in &self.paths {
            if !path.exists() {
                continue;
            }
            any_exists = true;

            match Self::read_candidate(path) {
                Ok(config) => {
                    Self::warn_problems(&config, &path.display().to_string());
                    debug!(path = %path.display(), networks = config.networks.len(), "Config loaded");
                    self.cache.set(CACHE_KEY, &config, None);
                    return config;
                }
                Err(e) => {
                    error!(path = %path.display(), error = %format!("{e:#}"), "Error loading config");
                }
            }
        }

        let config = default_config();
        if any_exists {
            warn!("No readable config file. Using default configuration.");
            return config;
        }

        warn!("No config file found. Using default configuration.");
        if let Some(first) = self.paths.first() {
            match serde_json::to_string_pretty(&config)
                .map_err(std::io::Error::other)
                .and_then(|json| write_atomic(first, &json))
            {
                Ok(()) => info!(path = %first.display(), "Created default config"),
                Err(e) => error!(path = %first.display(), error = %e, "Failed to create default config"),
            }
        }
        self.cache.set(CACHE_KEY, &config, None);
        config
    }

    /// Configuration a mutation can be applied to and saved.
    ///
    /// Unlike [`load_config`](Self::load_config), an existing candidate that
    /// cannot be read is an error: saving over it would drop whatever it
    /// records, deployed contracts included.
    fn load_for_update(&self) -> Result<Config> {
        if let Some(cached) = self.cache.get::<Config>(CACHE_KEY) {
            return Ok(cached);
        }

        let Some(path) = self.paths.iter().find(|p| p.exists()) else {
            return Ok(self.load_config());
        };

        match Self::read_candidate(path) {
            Ok(config) => {
                Self::warn_problems(&config, &path.display().to_string());
                self.cache.set(CACHE_KEY, &config, None);
                Ok(config)
            }
            Err(e) => {
                error!(path = %path.display(), error = %format!("{e:#}"), "Refusing to modify unreadable config");
                Err(VaultError::Persistence(format!(
                    "{} is unreadable ({e:#}); fix or remove it first",
                    path.display()
                )))
            }
        }
    }

    /// Persist the whole configuration to the first writable candidate.
    pub fn save_config(&self, config: &Config) -> Result<()> {
        Self::warn_problems(config, "save");

        let json = serde_json::to_string_pretty(config)
            .map_err(|e| VaultError::Persistence(e.to_string()))?;

        let mut last_error = String::from("no candidate paths configured");
        for path in &self.paths {
            match write_atomic(path, &json) {
                Ok(()) => {
                    self.cache.set(CACHE_KEY, config, None);
                    debug!(path = %path.display(), "Config saved");
                    return Ok(());
                }
                Err(e) => {
                    debug!(path = %path.display(), error = %e, "Config path not writable");
                    last_error = format!("{}: {e}", path.display());
                }
            }
        }

        error!(error = %last_error, "Error saving config");
        Err(VaultError::Persistence(last_error))
    }

    fn not_found(name: &str, config: &Config) -> VaultError {
        VaultError::NotFound {
            name: name.to_string(),
            available: config.network_names().join(", "),
        }
    }

    pub fn get_network(&self, name: &str) -> Result<NetworkConfig> {
        validate_network_name(name)?;
        let config = self.load_config();
        config
            .networks
            .get(name)
            .cloned()
            .ok_or_else(|| Self::not_found(name, &config))
    }

    /// Network names in sorted order.
    pub fn get_available_networks(&self) -> Vec<String> {
        self.load_config().network_names()
    }

    pub fn get_contract_set(&self, name: &str) -> Result<ContractSet> {
        self.get_network(name)?.contracts.ok_or_else(|| {
            VaultError::NotDeployed(NotDeployed {
                network: name.to_string(),
            })
        })
    }

    /// Record deployed contracts. Addresses are stored checksummed.
    pub fn set_contract_set(&self, name: &str, contracts: ContractSet) -> Result<()> {
        validate_network_name(name)?;
        let contracts = ContractSet {
            vault: validate_address(&contracts.vault, "Vault")?.to_checksum(None),
            bridge: validate_address(&contracts.bridge, "Bridge")?.to_checksum(None),
            pyth_oracle: validate_address(&contracts.pyth_oracle, "Pyth Oracle")?.to_checksum(None),
        };

        let mut config = self.load_for_update()?;
        if !config.networks.contains_key(name) {
            return Err(Self::not_found(name, &config));
        }
        if let Some(network) = config.networks.get_mut(name) {
            network.contracts = Some(contracts);
        }

        self.save_config(&config)?;
        debug!(network = name, "Contract set updated");
        Ok(())
    }

    pub fn get_token_whitelist(&self, name: &str) -> Result<TokenWhitelist> {
        Ok(self.get_network(name)?.token_whitelist.unwrap_or_default())
    }

    /// Replace the whitelist. Token addresses are stored checksummed.
    pub fn set_token_whitelist(&self, name: &str, whitelist: TokenWhitelist) -> Result<()> {
        validate_network_name(name)?;

        let mut normalized = TokenWhitelist::new();
        for (token, feed_id) in whitelist {
            let address = validate_address(&token, "Token")?;
            let feed_id = feed_id.trim();
            if feed_id.is_empty() {
                return Err(VaultError::Validation(format!(
                    "Empty price feed ID for token {token}"
                )));
            }
            normalized.insert(address.to_checksum(None), feed_id.to_string());
        }

        let mut config = self.load_for_update()?;
        if !config.networks.contains_key(name) {
            return Err(Self::not_found(name, &config));
        }
        if let Some(network) = config.networks.get_mut(name) {
            network.token_whitelist = Some(normalized);
        }

        self.save_config(&config)?;
        debug!(network = name, "Token whitelist updated");
        Ok(())
    }

    /// Add or replace a network.
    pub fn add_network(&self, name: &str, network: NetworkConfig) -> Result<()> {
        validate_network_name(name)?;
        validate_url(&network.resolved_rpc_url())?;
        validate_chain_id(network.chain_id)?;

        let mut config = self.load_for_update()?;
        if config.networks.insert(name.to_string(), network).is_some() {
            info!(network = name, "Replacing existing network");
        }

        self.save_config(&config)?;
        info!(network = name, "Network added");
        Ok(())
    }

    pub fn remove_network(&self, name: &str) -> Result<()> {
        validate_network_name(name)?;

        let mut config = self.load_for_update()?;
        if config.networks.remove(name).is_none() {
            return Err(Self::not_found(name, &config));
        }

        self.save_config(&config)?;
        info!(network = name, "Network removed");
        Ok(())
    }

    /// Drop the cached configuration so the next read goes to disk.
    pub fn invalidate(&self) {
        self.cache.remove(CACHE_KEY);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::DEFAULT_CACHE_TTL;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::TempDir;

    const VAULT: &str = "0x5fbdb2315678afecb367f032d93f642f64180aa3";
    const BRIDGE: &str = "0xe7f1725e7734ce288f8367e1bb143e90bb3f0512";
    const ORACLE: &str = "0x9fe46736679d2d9a65f0992f2272de9f3c7fa6e0";

    static NEXT_CACHE: AtomicUsize = AtomicUsize::new(0);

    struct Fixture {
        dir: TempDir,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                dir: tempfile::tempdir().unwrap(),
            }
        }

        fn cwd_path(&self) -> PathBuf {
            self.dir.path().join("cwd").join(CONFIG_FILE_NAME)
        }

        fn home_path(&self) -> PathBuf {
            self.dir.path().join("home").join("config.json")
        }

        /// Fresh store over the fixture files, with its own empty cache.
        fn store(&self) -> ConfigStore {
            let cache_dir = self
                .dir
                .path()
                .join(format!("cache-{}", NEXT_CACHE.fetch_add(1, Ordering::SeqCst)));
            ConfigStore::new(
                vec![self.cwd_path(), self.home_path()],
                Cache::open_in(cache_dir, CACHE_NAMESPACE, DEFAULT_CACHE_TTL),
            )
        }

        fn write(&self, path: &Path, value: Value) {
            std::fs::create_dir_all(path.parent().unwrap()).unwrap();
            std::fs::write(path, value.to_string()).unwrap();
        }
    }

    fn contracts() -> ContractSet {
        ContractSet {
            vault: VAULT.to_string(),
            bridge: BRIDGE.to_string(),
            pyth_oracle: ORACLE.to_string(),
        }
    }

    #[test]
    fn test_self_initializes_default_file() {
        let fx = Fixture::new();
        let config = fx.store().load_config();

        assert_eq!(config, default_config());
        let written: Config =
            serde_json::from_str(&std::fs::read_to_string(fx.cwd_path()).unwrap()).unwrap();
        assert_eq!(written, default_config());
        assert!(!fx.home_path().exists());
    }

    #[test]
    fn test_partial_override_keeps_defaults() {
        let fx = Fixture::new();
        fx.write(
            &fx.home_path(),
            json!({
                "networks": {
                    "arbitrum": { "rpcUrl": "https://arb.example/rpc" },
                    "base": { "rpcUrl": "https://mainnet.base.org", "chainId": 8453, "name": "Base" }
                }
            }),
        );

        let config = fx.store().load_config();
        assert_eq!(config.network_names(), vec!["arbitrum", "base", "localhost"]);

        let arbitrum = &config.networks["arbitrum"];
        assert_eq!(arbitrum.rpc_url, "https://arb.example/rpc");
        assert_eq!(arbitrum.chain_id, 42161);
        assert_eq!(arbitrum.name, "Arbitrum One");
        assert_eq!(config.networks["base"].chain_id, 8453);

        // Reading from the second candidate never writes the first
        assert!(!fx.cwd_path().exists());
    }

    #[test]
    fn test_first_existing_candidate_wins() {
        let fx = Fixture::new();
        fx.write(&fx.cwd_path(), json!({"networks": {"localhost": {"chainId": 1337}}}));
        fx.write(&fx.home_path(), json!({"networks": {"localhost": {"chainId": 7}}}));

        let network = fx.store().get_network("localhost").unwrap();
        assert_eq!(network.chain_id, 1337);
    }

    #[test]
    fn test_unreadable_file_is_not_clobbered() {
        let fx = Fixture::new();
        std::fs::create_dir_all(fx.cwd_path().parent().unwrap()).unwrap();
        std::fs::write(fx.cwd_path(), "{ broken").unwrap();

        let config = fx.store().load_config();
        assert_eq!(config, default_config());
        assert_eq!(std::fs::read_to_string(fx.cwd_path()).unwrap(), "{ broken");
    }

    #[test]
    fn test_mutations_refuse_to_overwrite_unreadable_file() {
        let fx = Fixture::new();
        fx.write(
            &fx.home_path(),
            json!({"networks": {"arbitrum": {"rpcUrl": "https://arb.example/rpc"}}}),
        );
        std::fs::create_dir_all(fx.cwd_path().parent().unwrap()).unwrap();
        std::fs::write(fx.cwd_path(), "{ broken").unwrap();
        let store = fx.store();

        let network = NetworkConfig::new("Dev", "http://127.0.0.1:8545", 1337);
        assert!(matches!(store.add_network("devnet", network), Err(VaultError::Persistence(_))));
        assert!(matches!(
            store.set_contract_set("arbitrum", contracts()),
            Err(VaultError::Persistence(_))
        ));
        assert!(matches!(
            store.set_token_whitelist("arbitrum", TokenWhitelist::new()),
            Err(VaultError::Persistence(_))
        ));
        assert!(matches!(store.remove_network("localhost"), Err(VaultError::Persistence(_))));

        assert_eq!(std::fs::read_to_string(fx.cwd_path()).unwrap(), "{ broken");
        assert!(!std::fs::read_to_string(fx.home_path()).unwrap().contains("devnet"));
    }

    #[test]
    fn test_malformed_network_keeps_recorded_contracts() {
        let fx = Fixture::new();
        fx.write(
            &fx.cwd_path(),
            json!({
                "networks": {
                    "arbitrum": {
                        "contracts": { "vault": VAULT, "bridge": BRIDGE, "pythOracle": ORACLE }
                    },
                    "base": { "chainId": 8453 }
                }
            }),
        );
        let store = fx.store();

        assert_eq!(store.get_contract_set("arbitrum").unwrap().vault, VAULT);

        let network = NetworkConfig::new("Dev", "http://127.0.0.1:8545", 1337);
        store.add_network("devnet", network).unwrap();

        let written = std::fs::read_to_string(fx.cwd_path()).unwrap();
        assert!(written.contains(VAULT));
        assert!(written.contains("\"base\""));
        assert!(written.contains("devnet"));

        let reloaded = fx.store().load_config();
        assert_eq!(reloaded.networks["base"].chain_id, 8453);
        assert_eq!(reloaded.networks["base"].rpc_url, "");
        assert!(validate_config(&reloaded)
            .iter()
            .any(|p| p.contains("'base': invalid RPC URL")));
    }

    #[test]
    fn test_unknown_network_lists_available() {
        let fx = Fixture::new();
        let err = fx.store().get_network("optimism").unwrap_err();
        match err {
            VaultError::NotFound { name, available } => {
                assert_eq!(name, "optimism");
                assert_eq!(available, "arbitrum, localhost");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_bad_network_name_rejected_before_file_access() {
        let fx = Fixture::new();
        let store = fx.store();

        assert!(matches!(store.get_network("my network"), Err(VaultError::Validation(_))));
        assert!(matches!(
            store.set_contract_set("my network", contracts()),
            Err(VaultError::Validation(_))
        ));
        assert!(!fx.cwd_path().exists());
        assert!(!fx.home_path().exists());
    }

    #[test]
    fn test_contract_set_round_trip() {
        let fx = Fixture::new();
        let store = fx.store();

        assert!(matches!(
            store.get_contract_set("localhost"),
            Err(VaultError::NotDeployed(n)) if n.network == "localhost"
        ));

        store.set_contract_set("localhost", contracts()).unwrap();

        // A fresh store (cold cache) sees the persisted, checksummed set
        let stored = fx.store().get_contract_set("localhost").unwrap();
        assert_eq!(stored.vault, "0x5FbDB2315678afecb367f032d93F642f64180aa3");
        assert_eq!(stored.pyth_oracle.to_lowercase(), ORACLE);
    }

    #[test]
    fn test_invalid_address_writes_nothing() {
        let fx = Fixture::new();
        let store = fx.store();
        store.load_config();
        let before = std::fs::read_to_string(fx.cwd_path()).unwrap();

        let mut bad = contracts();
        bad.bridge = "0x1234".to_string();
        let err = store.set_contract_set("localhost", bad).unwrap_err();
        assert!(err.to_string().contains("Invalid Bridge address"));

        assert_eq!(std::fs::read_to_string(fx.cwd_path()).unwrap(), before);
    }

    #[test]
    fn test_token_whitelist_normalized() {
        let fx = Fixture::new();
        let store = fx.store();
        assert!(store.get_token_whitelist("arbitrum").unwrap().is_empty());

        let mut whitelist = TokenWhitelist::new();
        whitelist.insert(VAULT.to_string(), " 0xabc ".to_string());
        store.set_token_whitelist("arbitrum", whitelist).unwrap();

        let stored = fx.store().get_token_whitelist("arbitrum").unwrap();
        assert_eq!(
            stored.get("0x5FbDB2315678afecb367f032d93F642f64180aa3").map(String::as_str),
            Some("0xabc")
        );

        let mut bad = TokenWhitelist::new();
        bad.insert("not-an-address".to_string(), "0xabc".to_string());
        assert!(store.set_token_whitelist("arbitrum", bad).is_err());
    }

    #[test]
    fn test_add_and_remove_network() {
        let fx = Fixture::new();
        let store = fx.store();

        let network = NetworkConfig::new("Base", "https://mainnet.base.org", 8453);
        store.add_network("base", network.clone()).unwrap();
        assert_eq!(store.get_network("base").unwrap(), network);
        assert_eq!(fx.store().get_available_networks(), vec!["arbitrum", "base", "localhost"]);

        assert!(store
            .add_network("bad", NetworkConfig::new("Bad", "nope", 1))
            .is_err());
        assert!(store
            .add_network("zero", NetworkConfig::new("Zero", "http://x", 0))
            .is_err());

        store.remove_network("base").unwrap();
        assert!(matches!(store.remove_network("base"), Err(VaultError::NotFound { .. })));
        assert_eq!(fx.store().get_available_networks(), vec!["arbitrum", "localhost"]);
    }

    #[test]
    fn test_save_falls_back_to_next_writable_path() {
        let fx = Fixture::new();
        // A regular file where the first candidate's directory should be
        let blocker = fx.dir.path().join("blocker");
        std::fs::write(&blocker, "").unwrap();

        let cache_dir = fx.dir.path().join("cache");
        let store = ConfigStore::new(
            vec![blocker.join(CONFIG_FILE_NAME), fx.home_path()],
            Cache::open_in(cache_dir, CACHE_NAMESPACE, DEFAULT_CACHE_TTL),
        );

        store.save_config(&default_config()).unwrap();
        assert!(fx.home_path().exists());
    }

    #[test]
    fn test_save_fails_when_nothing_writable() {
        let fx = Fixture::new();
        let blocker = fx.dir.path().join("blocker");
        std::fs::write(&blocker, "").unwrap();

        let store = ConfigStore::new(
            vec![blocker.join("a.json"), blocker.join("b.json")],
            Cache::open_in(fx.dir.path().join("cache"), CACHE_NAMESPACE, DEFAULT_CACHE_TTL),
        );

        assert!(matches!(
            store.save_config(&default_config()),
            Err(VaultError::Persistence(_))
        ));
    }

    #[test]
    fn test_env_reference_kept_in_file() {
        let fx = Fixture::new();
        let store = fx.store();
        std::env::set_var("VAULT_STORE_TEST_RPC", "http://10.0.0.1:8545");

        store
            .add_network("devnet", NetworkConfig::new("Dev", "${VAULT_STORE_TEST_RPC}", 1337))
            .unwrap();

        let network = fx.store().get_network("devnet").unwrap();
        assert_eq!(network.rpc_url, "${VAULT_STORE_TEST_RPC}");
        assert_eq!(network.resolved_rpc_url(), "http://10.0.0.1:8545");
        std::env::remove_var("VAULT_STORE_TEST_RPC");
    }
}
