// Wallet and workspace command implementations
use std::path::Path;
use tracing::{debug, info, warn};
use subnet_stake_watcher::config::NETWORK_PRESETS;
use subnet_stake_watcher::{
    list_wallet_names, match_registered, ChainClient, Config, HttpChainClient, Wallet,
    WatcherResult,
};

/// List local wallets whose default hotkey is registered on `netuid`
pub async fn list_registered(
    path: Option<&str>,
    netuid: u16,
    network: &str,
    config: &Config,
) -> WatcherResult<()> {
    let wallet_dir = match path {
        Some(p) => subnet_stake_watcher::config::expand_home(p),
        None => config.chain.wallet_dir(),
    };

    info!("🔍 Scanning wallets in {}", wallet_dir.display());
    let mut wallets = Vec::new();
    for name in list_wallet_names(&wallet_dir)? {
        match Wallet::load(&wallet_dir, &name, "default") {
            Ok(wallet) => wallets.push(wallet),
            Err(e) => debug!("Skipping {}: {}", name, e),
        }
    }

    if wallets.is_empty() {
        warn!("⚠️  No wallets with a default hotkey found");
        return Ok(());
    }

    let endpoint = config.chain.resolve_network(network)?;
    let client = HttpChainClient::new(
        &config.chain.gateway_url,
        &endpoint,
        config.chain.request_timeout(),
    )?;
    let hotkeys = client.subnet_hotkeys(netuid).await?;

    let registered = match_registered(wallets, &hotkeys);
    info!("📋 Registered wallets on netuid {}", netuid);
    info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    for entry in &registered {
        info!("  Wallet Name: {}, UID: {}", entry.wallet.name, entry.uid);
    }
    info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    info!("Total: {} registered", registered.len());

    Ok(())
}

pub fn init_config(config_path: &str) -> WatcherResult<()> {
    info!("🔧 Initializing configuration...");

    if Path::new(config_path).exists() {
        warn!("⚠️  {} already exists, skipping", config_path);
    } else {
        Config::default().to_file(config_path)?;
        info!("📝 Created {}", config_path);
    }

    info!("💡 Next steps:");
    info!("   1. Set gateway_url and wallet_path in {}", config_path);
    info!("   2. Run: stake-watch buy --wallet.name <name> --amount-tao 0.5 --dry-run");
    Ok(())
}

pub fn show_status(config_path: &str, config: &Config) -> WatcherResult<()> {
    info!("📊 System Status");
    info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    if Path::new(config_path).exists() {
        info!("⚙️  Config: {}", config_path);
    } else {
        info!("⚙️  Config: defaults ({} not found, run: stake-watch init)", config_path);
    }

    info!("🔗 Gateway: {}", config.chain.gateway_url);
    for (name, _) in NETWORK_PRESETS {
        if let Ok(endpoint) = config.chain.resolve_network(name) {
            info!("   {} -> {}", name, endpoint);
        }
    }
    for (name, endpoint) in &config.chain.networks {
        info!("   {} -> {} (configured)", name, endpoint);
    }

    let wallet_dir = config.chain.wallet_dir();
    match list_wallet_names(&wallet_dir) {
        Ok(names) if !names.is_empty() => {
            info!("👛 Wallets: {} in {}", names.len(), wallet_dir.display());
        }
        _ => info!("👛 Wallets: none found in {}", wallet_dir.display()),
    }

    if config.journal.enabled {
        info!("📝 Journal: {}", config.journal.directory);
    } else {
        info!("📝 Journal: disabled");
    }

    info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    Ok(())
}
