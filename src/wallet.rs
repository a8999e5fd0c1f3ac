//! On-disk wallet access
//!
//! Only public addresses are read here. Signing happens behind the chain
//! client, which resolves keys by wallet name.
//!
//! Layout under the wallet directory:
//! `<name>/coldkeypub.txt` and `<name>/hotkeys/<hotkey>`, both JSON documents
//! carrying an `ss58Address` field.

use serde::Deserialize;
use std::fs;
use std::path::Path;
use tracing::debug;

use crate::error::{WatcherError, WatcherResult};

#[derive(Debug, Deserialize)]
struct KeyFile {
    #[serde(rename = "ss58Address")]
    ss58_address: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Wallet {
    pub name: String,
    pub hotkey_name: String,
    pub coldkey_ss58: String,
    pub hotkey_ss58: String,
}

impl Wallet {
    /// Load a wallet's coldkey and hotkey addresses
    pub fn load(wallet_dir: &Path, name: &str, hotkey: &str) -> WatcherResult<Self> {
        if name.is_empty() {
            return Err(WatcherError::Auth("wallet name is empty".to_string()));
        }
        if hotkey.is_empty() {
            return Err(WatcherError::Auth("hotkey name is empty".to_string()));
        }

        let root = wallet_dir.join(name);
        let coldkey_ss58 = read_address(&root.join("coldkeypub.txt"))
            .map_err(|e| WatcherError::Auth(format!("unable to load coldkey of wallet '{}': {}", name, e)))?;
        let hotkey_ss58 = read_address(&root.join("hotkeys").join(hotkey)).map_err(|e| {
            WatcherError::Auth(format!(
                "unable to load hotkey '{}' from wallet '{}': {}",
                hotkey, name, e
            ))
        })?;

        debug!("Loaded wallet {} (coldkey {}, hotkey {})", name, coldkey_ss58, hotkey_ss58);

        Ok(Self {
            name: name.to_string(),
            hotkey_name: hotkey.to_string(),
            coldkey_ss58,
            hotkey_ss58,
        })
    }
}

fn read_address(path: &Path) -> Result<String, String> {
    let content = fs::read_to_string(path).map_err(|e| format!("{}: {}", path.display(), e))?;
    let key: KeyFile = serde_json::from_str(&content)
        .map_err(|e| format!("{}: not a valid key file ({})", path.display(), e))?;
    if key.ss58_address.is_empty() {
        return Err(format!("{}: empty ss58Address", path.display()));
    }
    Ok(key.ss58_address)
}

/// Coldkey wallet names under `wallet_dir` that start with `c` or `x`,
/// ordered by first letter then numeric suffix (c2 before c10).
pub fn list_wallet_names(wallet_dir: &Path) -> WatcherResult<Vec<String>> {
    if !wallet_dir.exists() {
        return Ok(Vec::new());
    }

    let mut names = Vec::new();
    for entry in fs::read_dir(wallet_dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_dir() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().to_string();
        if name.starts_with('c') || name.starts_with('x') {
            names.push(name);
        }
    }

    names.sort_by_key(|name| wallet_sort_key(name));
    Ok(names)
}

fn wallet_sort_key(name: &str) -> (char, u8, u64, String) {
    let mut chars = name.chars();
    let first = chars.next().unwrap_or_default();
    let suffix: String = chars.collect();
    match suffix.parse::<u64>() {
        Ok(number) => (first, 0, number, String::new()),
        Err(_) => (first, 1, 0, suffix),
    }
}

/// A wallet whose default hotkey is registered on a subnet
#[derive(Debug, Clone, PartialEq)]
pub struct RegisteredWallet {
    pub wallet: Wallet,
    pub uid: usize,
}

/// Match wallets against a subnet's metagraph hotkeys; UID is the index
pub fn match_registered(wallets: Vec<Wallet>, metagraph_hotkeys: &[String]) -> Vec<RegisteredWallet> {
    wallets
        .into_iter()
        .filter_map(|wallet| {
            metagraph_hotkeys
                .iter()
                .position(|hotkey| *hotkey == wallet.hotkey_ss58)
                .map(|uid| RegisteredWallet { wallet, uid })
        })
        .collect()
}
