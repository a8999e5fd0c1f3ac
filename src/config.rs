// Configuration management for the stake watcher

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Built-in network presets (name -> chain endpoint)
pub const NETWORK_PRESETS: &[(&str, &str)] = &[
    ("finney", "wss://entrypoint-finney.opentensor.ai:443"),
    ("test", "wss://test.finney.opentensor.ai:443"),
    ("archive", "wss://archive.chain.opentensor.ai:443"),
    ("local", "ws://127.0.0.1:9944"),
];

pub const DEFAULT_CONFIG_PATH: &str = "stake-watch.toml";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChainConfig {
    /// Base URL of the JSON gateway that talks to the chain and signs extrinsics
    #[serde(default = "default_gateway_url")]
    pub gateway_url: String,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_wallet_path")]
    pub wallet_path: String,
    /// Extra or overriding network presets
    #[serde(default)]
    pub networks: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuyDefaults {
    #[serde(default = "default_buy_network")]
    pub network: String,
    #[serde(default = "default_wallet_hotkey")]
    pub wallet_hotkey: String,
    #[serde(default = "default_netuid")]
    pub netuid: u16,
    #[serde(default)]
    pub origin_netuid: u16,
    #[serde(default = "default_buy_threshold")]
    pub threshold_tao: Decimal,
    #[serde(default = "default_interval")]
    pub interval_secs: f64,
    #[serde(default = "default_rate_tolerance")]
    pub rate_tolerance: Decimal,
    #[serde(default = "default_max_swaps")]
    pub max_swaps: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SellDefaults {
    #[serde(default = "default_sell_network")]
    pub network: String,
    #[serde(default = "default_netuid")]
    pub netuid: u16,
    #[serde(default = "default_sell_wallet")]
    pub wallet_name: String,
    #[serde(default = "default_wallet_hotkey")]
    pub wallet_hotkey: String,
    /// Trigger level: unstake at or above this price
    #[serde(default = "default_sell_threshold")]
    pub threshold_tao: Decimal,
    /// Interest level: status logging only, never gates an action
    #[serde(default = "default_interest_threshold")]
    pub interest_tao: Decimal,
    #[serde(default = "default_sell_amount")]
    pub amount_tao: Decimal,
    #[serde(default = "default_status_every")]
    pub status_every: u64,
    #[serde(default = "default_active_sleep_ms")]
    pub active_sleep_ms: u64,
    #[serde(default = "default_idle_sleep_ms")]
    pub idle_sleep_ms: u64,
    /// 0 = run until interrupted
    #[serde(default)]
    pub max_actions: u32,
    #[serde(default = "default_true")]
    pub confirm_by_balance: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JournalConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_journal_dir")]
    pub directory: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub chain: ChainConfig,
    #[serde(default)]
    pub buy: BuyDefaults,
    #[serde(default)]
    pub sell: SellDefaults,
    #[serde(default)]
    pub journal: JournalConfig,
}

// Default value functions
fn default_gateway_url() -> String { "http://127.0.0.1:8090".to_string() }
fn default_request_timeout() -> u64 { 30 }
fn default_wallet_path() -> String { "~/.bittensor/wallets".to_string() }
fn default_buy_network() -> String { "finney".to_string() }
fn default_sell_network() -> String { "local".to_string() }
fn default_netuid() -> u16 { 117 }
fn default_buy_threshold() -> Decimal { Decimal::new(17, 4) }
fn default_interval() -> f64 { 60.0 }
fn default_rate_tolerance() -> Decimal { Decimal::new(25, 3) }
fn default_max_swaps() -> u32 { 1 }
fn default_sell_wallet() -> String { "c0".to_string() }
fn default_wallet_hotkey() -> String { "default".to_string() }
fn default_sell_threshold() -> Decimal { Decimal::new(20, 4) }
fn default_interest_threshold() -> Decimal { Decimal::new(15, 4) }
fn default_sell_amount() -> Decimal { Decimal::new(10, 0) }
fn default_status_every() -> u64 { 200 }
fn default_active_sleep_ms() -> u64 { 50 }
fn default_idle_sleep_ms() -> u64 { 100 }
fn default_true() -> bool { true }
fn default_journal_dir() -> String { "logs/actions".to_string() }

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            gateway_url: default_gateway_url(),
            request_timeout_secs: default_request_timeout(),
            wallet_path: default_wallet_path(),
            networks: BTreeMap::new(),
        }
    }
}

impl Default for BuyDefaults {
    fn default() -> Self {
        Self {
            network: default_buy_network(),
            wallet_hotkey: default_wallet_hotkey(),
            netuid: default_netuid(),
            origin_netuid: 0,
            threshold_tao: default_buy_threshold(),
            interval_secs: default_interval(),
            rate_tolerance: default_rate_tolerance(),
            max_swaps: default_max_swaps(),
        }
    }
}

impl Default for SellDefaults {
    fn default() -> Self {
        Self {
            network: default_sell_network(),
            netuid: default_netuid(),
            wallet_name: default_sell_wallet(),
            wallet_hotkey: default_wallet_hotkey(),
            threshold_tao: default_sell_threshold(),
            interest_tao: default_interest_threshold(),
            amount_tao: default_sell_amount(),
            status_every: default_status_every(),
            active_sleep_ms: default_active_sleep_ms(),
            idle_sleep_ms: default_idle_sleep_ms(),
            max_actions: 0,
            confirm_by_balance: true,
        }
    }
}

impl Default for JournalConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            directory: default_journal_dir(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            chain: ChainConfig::default(),
            buy: BuyDefaults::default(),
            sell: SellDefaults::default(),
            journal: JournalConfig::default(),
        }
    }
}

impl ChainConfig {
    /// Resolve a network name (or a raw ws:// URL) to a chain endpoint
    pub fn resolve_network(&self, network: &str) -> Result<String, ConfigError> {
        if network.starts_with("ws://") || network.starts_with("wss://") {
            return Ok(network.to_string());
        }

        if let Some(endpoint) = self.networks.get(network) {
            return Ok(endpoint.clone());
        }

        NETWORK_PRESETS
            .iter()
            .find(|(name, _)| *name == network)
            .map(|(_, endpoint)| endpoint.to_string())
            .ok_or_else(|| ConfigError::UnknownNetwork(network.to_string()))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Wallet directory with a leading `~` expanded
    pub fn wallet_dir(&self) -> PathBuf {
        expand_home(&self.wallet_path)
    }
}

pub fn expand_home(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    } else if path == "~" {
        if let Some(home) = dirs::home_dir() {
            return home;
        }
    }
    PathBuf::from(path)
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)
            .map_err(|e| ConfigError::FileRead(e.to_string()))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| ConfigError::Parse(e.to_string()))?;

        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::Serialize(e.to_string()))?;

        fs::write(path, content)
            .map_err(|e| ConfigError::FileWrite(e.to_string()))?;

        Ok(())
    }

    /// Load configuration from file, or fall back to defaults if it doesn't exist
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        if path.as_ref().exists() {
            Self::from_file(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.chain.gateway_url.is_empty() {
            return Err(ConfigError::Validation("gateway_url must not be empty".to_string()));
        }

        if self.chain.request_timeout_secs == 0 {
            return Err(ConfigError::Validation("request_timeout_secs must be greater than 0".to_string()));
        }

        if self.buy.threshold_tao <= Decimal::ZERO {
            return Err(ConfigError::Validation("buy.threshold_tao must be positive".to_string()));
        }

        if self.buy.interval_secs <= 0.0 || !self.buy.interval_secs.is_finite() {
            return Err(ConfigError::Validation("buy.interval_secs must be positive".to_string()));
        }

        if Duration::try_from_secs_f64(self.buy.interval_secs).is_err() {
            return Err(ConfigError::Validation("buy.interval_secs is too large".to_string()));
        }

        if self.buy.rate_tolerance < Decimal::ZERO {
            return Err(ConfigError::Validation("buy.rate_tolerance must be non-negative".to_string()));
        }

        if self.sell.threshold_tao <= Decimal::ZERO {
            return Err(ConfigError::Validation("sell.threshold_tao must be positive".to_string()));
        }

        if self.sell.interest_tao < Decimal::ZERO {
            return Err(ConfigError::Validation("sell.interest_tao must be non-negative".to_string()));
        }

        if self.sell.amount_tao <= Decimal::ZERO {
            return Err(ConfigError::Validation("sell.amount_tao must be positive".to_string()));
        }

        if self.sell.active_sleep_ms == 0 || self.sell.idle_sleep_ms == 0 {
            return Err(ConfigError::Validation("sell sleep durations must be greater than 0".to_string()));
        }

        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    FileRead(String),

    #[error("Failed to write config file: {0}")]
    FileWrite(String),

    #[error("Failed to parse config: {0}")]
    Parse(String),

    #[error("Failed to serialize config: {0}")]
    Serialize(String),

    #[error("Configuration validation error: {0}")]
    Validation(String),

    #[error("Unknown network '{0}' (expected finney, test, archive, local, a configured name or a ws:// URL)")]
    UnknownNetwork(String),
}
