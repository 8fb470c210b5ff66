//! Bridge Vault CLI
//!
//! Operator tool for the cross-chain bridge vault:
//! - Deploy the vault and record its addresses per network
//! - Whitelist tokens against Pyth price feeds (idempotent reconciliation)
//! - Bridge vault balances with pre-submission funds checks and dry runs
//! - Pause, unpause and update vault parameters
//! - Manage networks and the local cache

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use tracing::debug;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use vault_core::ConfigStore;

use commands::admin::AdminCommand;
use commands::bridge::BridgeCommand;
use commands::cache::CacheCommand;
use commands::deploy::DeployArgs;
use commands::network::NetworkCommand;
use commands::token::TokenCommand;

#[derive(Parser)]
#[command(name = "vault")]
#[command(about = "Bridge vault operator CLI", long_about = None)]
#[command(version)]
struct Cli {
    /// Log level used when RUST_LOG is not set
    #[arg(long, global = true, value_enum, default_value_t = LogLevel::Info)]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    fn directive(self) -> &'static str {
        match self {
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

#[derive(Subcommand)]
enum Command {
    /// Deploy the vault contract
    Deploy(DeployArgs),

    /// Token whitelist management
    #[command(subcommand)]
    Token(TokenCommand),

    /// Bridge tokens and quote fees
    #[command(subcommand)]
    Bridge(BridgeCommand),

    /// Vault administration
    #[command(subcommand)]
    Admin(AdminCommand),

    /// Network configuration
    #[command(subcommand)]
    Network(NetworkCommand),

    /// Local cache
    #[command(subcommand)]
    Cache(CacheCommand),
}

/// Install the process-wide subscriber. Diagnostics go to stderr so
/// command output on stdout stays clean.
fn init_tracing(level: LogLevel) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.directive()));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .init();
}

async fn run(command: Command) -> Result<()> {
    let store = ConfigStore::open();
    debug!(paths = ?store.paths(), "Config candidates");

    match command {
        Command::Deploy(args) => commands::deploy::run(args, &store).await,
        Command::Token(cmd) => commands::token::run(cmd, &store).await,
        Command::Bridge(cmd) => commands::bridge::run(cmd, &store).await,
        Command::Admin(cmd) => commands::admin::run(cmd, &store).await,
        Command::Network(cmd) => commands::network::run(cmd, &store),
        Command::Cache(cmd) => commands::cache::run(cmd, &store),
    }
}

#[tokio::main]
async fn main() {
    // Load environment variables
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_tracing(cli.log_level);

    if let Err(e) = run(cli.command).await {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}
