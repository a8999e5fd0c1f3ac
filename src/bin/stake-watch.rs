// Subnet Stake Watcher - unified CLI
// Single entry point for the buy and sell watchers

use clap::{Parser, Subcommand};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use subnet_stake_watcher::{BuyArgs, Config, SellArgs, WatcherError, WatcherResult};

// Load command modules from cli directory
#[path = "../cli/watch_commands.rs"]
mod watch_commands;
#[path = "../cli/wallet_commands.rs"]
mod wallet_commands;

#[derive(Parser)]
#[command(name = "stake-watch")]
#[command(version = "0.2.0")]
#[command(about = "Price-triggered subnet stake watcher", long_about = None)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Configuration file path
    #[arg(short, long, global = true, default_value = subnet_stake_watcher::config::DEFAULT_CONFIG_PATH)]
    config: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Add stake when the subnet price falls to the threshold
    Buy(BuyArgs),

    /// Remove stake when the subnet price rises to the threshold
    Sell(SellArgs),

    /// List local wallets registered on a subnet
    Wallets {
        /// Wallet directory (defaults to chain.wallet_path)
        #[arg(long)]
        path: Option<String>,

        /// Subnet to look up
        #[arg(long, default_value = "117")]
        netuid: u16,

        /// Network preset or ws:// endpoint
        #[arg(long, default_value = "local")]
        network: String,
    },

    /// Write a default configuration file
    Init,

    /// Show configuration, network presets and wallet directory
    Status,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Setup logging first (before config load so we can see config errors)
    let log_level = if cli.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!("🚀 Subnet Stake Watcher v0.2.0");

    let code = match execute(cli).await {
        Ok(code) => code,
        Err(e) => {
            error!("❌ {}", e.user_message());
            e.exit_code()
        }
    };

    std::process::exit(code);
}

async fn execute(cli: Cli) -> WatcherResult<i32> {
    match cli.command {
        // Init doesn't require config (it creates it)
        Commands::Init => {
            wallet_commands::init_config(&cli.config)?;
            Ok(0)
        }

        Commands::Status => {
            let config = load_config(&cli.config)?;
            wallet_commands::show_status(&cli.config, &config)?;
            Ok(0)
        }

        Commands::Wallets { path, netuid, network } => {
            let config = load_config(&cli.config)?;
            wallet_commands::list_registered(path.as_deref(), netuid, &network, &config).await?;
            Ok(0)
        }

        Commands::Buy(args) => {
            let config = load_config(&cli.config)?;
            watch_commands::run_buy(&args, &config).await
        }

        Commands::Sell(args) => {
            let config = load_config(&cli.config)?;
            watch_commands::run_sell(&args, &config).await
        }
    }
}

/// Load the config file, or defaults when it doesn't exist
fn load_config(path: &str) -> WatcherResult<Config> {
    let config = Config::load_or_default(path).map_err(WatcherError::from)?;
    info!("📁 Config: {}", path);
    Ok(config)
}
