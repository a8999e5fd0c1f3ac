// Pre-flight validation and wallet discovery against a temp wallet directory

mod common;

use common::write_wallet_files;
use rust_decimal_macros::dec;
use subnet_stake_watcher::{
    list_wallet_names, match_registered, BuyArgs, Config, PreFlightValidator, Wallet,
    WatchPlan, WatcherError,
};
use tempfile::TempDir;

fn config_for(temp_dir: &TempDir) -> Config {
    let mut config = Config::default();
    config.chain.wallet_path = temp_dir.path().join("wallets").display().to_string();
    config.journal.directory = temp_dir.path().join("journal").display().to_string();
    config
}

fn buy_plan(wallet_name: &str, network: &str) -> WatchPlan {
    let args = BuyArgs {
        wallet_name: wallet_name.to_string(),
        wallet_hotkey: None,
        network: Some(network.to_string()),
        origin_netuid: None,
        netuid: None,
        amount_tao: dec!(0.5),
        threshold_tao: None,
        interval: None,
        max_swaps: None,
        dry_run: true,
        safe_staking: false,
        allow_partial: false,
        rate_tolerance: None,
        wait_for_finalization: false,
        no_wait_for_inclusion: false,
    };
    args.resolve(&Config::default().buy).expect("Plan should resolve")
}

#[test]
fn test_preflight_ready_with_valid_wallet() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config = config_for(&temp_dir);
    write_wallet_files(&config.chain.wallet_dir(), "c1", "default", "5Cold1", "5Hot1");

    let preflight = PreFlightValidator::new(config.clone()).validate(&buy_plan("c1", "local"));
    assert!(preflight.result.passed);

    let (wallet, endpoint) = preflight.into_ready().expect("Preflight should pass");
    assert_eq!(wallet.coldkey_ss58, "5Cold1");
    assert_eq!(wallet.hotkey_ss58, "5Hot1");
    assert_eq!(endpoint, "ws://127.0.0.1:9944");
    assert!(temp_dir.path().join("journal").exists());
}

#[test]
fn test_preflight_missing_wallet_is_auth_error() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config = config_for(&temp_dir);

    let preflight = PreFlightValidator::new(config).validate(&buy_plan("c9", "local"));
    assert!(!preflight.result.passed);

    let error = preflight.into_ready().expect_err("Wallet is missing");
    assert!(matches!(error, WatcherError::Auth(_)));
    assert_eq!(error.exit_code(), 1);
}

#[test]
fn test_preflight_unknown_network_fails() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config = config_for(&temp_dir);
    write_wallet_files(&config.chain.wallet_dir(), "c1", "default", "5Cold1", "5Hot1");

    let preflight = PreFlightValidator::new(config).validate(&buy_plan("c1", "nowhere"));

    let error = preflight.into_ready().expect_err("Network is unknown");
    assert!(matches!(error, WatcherError::Validation(ref name, _) if name == "Network"));
    assert_eq!(error.exit_code(), 2);
}

#[test]
fn test_wallet_listing_and_registration() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let wallet_dir = temp_dir.path().join("wallets");
    write_wallet_files(&wallet_dir, "c10", "default", "5C10", "5H10");
    write_wallet_files(&wallet_dir, "c2", "default", "5C2", "5H2");
    write_wallet_files(&wallet_dir, "x1", "default", "5X1", "5HX1");
    write_wallet_files(&wallet_dir, "miner", "default", "5M", "5HM");

    let names = list_wallet_names(&wallet_dir).expect("Listing should succeed");
    assert_eq!(names, vec!["c2", "c10", "x1"]);

    let wallets: Vec<Wallet> = names
        .iter()
        .map(|name| Wallet::load(&wallet_dir, name, "default").expect("Wallet should load"))
        .collect();
    let metagraph = vec!["5Other".to_string(), "5HX1".to_string(), "5H2".to_string()];

    let registered = match_registered(wallets, &metagraph);
    let summary: Vec<(&str, usize)> = registered
        .iter()
        .map(|entry| (entry.wallet.name.as_str(), entry.uid))
        .collect();
    assert_eq!(summary, vec![("c2", 2), ("x1", 1)]);
}
