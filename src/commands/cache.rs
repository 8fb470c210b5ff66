use anyhow::{bail, Result};
use clap::Subcommand;
use vault_core::cache::{clear_all_in, default_cache_dir, Cache};
use vault_core::validation::is_valid_network_name;
use vault_core::ConfigStore;

#[derive(Debug, Subcommand)]
pub enum CacheCommand {
    /// Drop cached entries
    Clear {
        /// Only this namespace (e.g. `config`); all when omitted
        #[arg(long)]
        namespace: Option<String>,
    },
}

pub fn run(command: CacheCommand, store: &ConfigStore) -> Result<()> {
    match command {
        CacheCommand::Clear { namespace: Some(namespace) } => {
            // Namespaces become file names
            if !is_valid_network_name(&namespace) {
                bail!("Invalid cache namespace: '{namespace}'");
            }
            Cache::open(&namespace).clear();
            println!("Cache namespace '{namespace}' cleared");
        }
        CacheCommand::Clear { namespace: None } => {
            store.invalidate();
            let removed = clear_all_in(default_cache_dir())?;
            println!("Cleared {removed} cache namespace(s)");
        }
    }

    Ok(())
}
