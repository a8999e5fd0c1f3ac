// Common test utilities and helpers

#![allow(dead_code)]

use async_trait::async_trait;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::VecDeque;
use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;
use subnet_stake_watcher::{
    shutdown_channel, ChainClient, PolicyConfig, ShutdownSignal, Side, StakeRequest,
    StakeTarget, SubmitOutcome, Wallet, WatcherError, WatcherResult,
};

/// Chain client that replays scripted responses and counts calls
#[derive(Default)]
pub struct ScriptedChainClient {
    prices: Mutex<VecDeque<WatcherResult<Decimal>>>,
    fallback_price: Option<Decimal>,
    price_delay: Option<Duration>,
    balances: Mutex<VecDeque<WatcherResult<Decimal>>>,
    fallback_balance: Option<Decimal>,
    stake: Option<Decimal>,
    submissions: Mutex<VecDeque<WatcherResult<SubmitOutcome>>>,
    pub submitted: Mutex<Vec<StakeRequest>>,
    pub price_calls: AtomicUsize,
    pub balance_calls: AtomicUsize,
    pub stake_calls: AtomicUsize,
    pub submit_calls: AtomicUsize,
}

impl ScriptedChainClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Price returned once the scripted queue is empty
    pub fn with_price(mut self, price: Decimal) -> Self {
        self.fallback_price = Some(price);
        self
    }

    /// Every price query takes this long to answer
    pub fn with_price_delay(mut self, delay: Duration) -> Self {
        self.price_delay = Some(delay);
        self
    }

    pub fn with_balance(mut self, balance: Decimal) -> Self {
        self.fallback_balance = Some(balance);
        self
    }

    pub fn with_stake(mut self, stake: Decimal) -> Self {
        self.stake = Some(stake);
        self
    }

    pub fn push_price(self, price: WatcherResult<Decimal>) -> Self {
        self.prices.lock().unwrap().push_back(price);
        self
    }

    pub fn push_price_errors(self, count: usize) -> Self {
        for i in 0..count {
            self.prices
                .lock()
                .unwrap()
                .push_back(Err(WatcherError::Query(format!("timeout #{}", i))));
        }
        self
    }

    pub fn push_balance(self, balance: WatcherResult<Decimal>) -> Self {
        self.balances.lock().unwrap().push_back(balance);
        self
    }

    pub fn push_submission(self, outcome: WatcherResult<SubmitOutcome>) -> Self {
        self.submissions.lock().unwrap().push_back(outcome);
        self
    }

    pub fn prices_queried(&self) -> usize {
        self.price_calls.load(Ordering::SeqCst)
    }

    pub fn submissions_made(&self) -> usize {
        self.submit_calls.load(Ordering::SeqCst)
    }

    fn record_submission(&self, request: &StakeRequest) -> WatcherResult<SubmitOutcome> {
        self.submit_calls.fetch_add(1, Ordering::SeqCst);
        self.submitted.lock().unwrap().push(request.clone());
        self.submissions
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Ok(SubmitOutcome::Confirmed))
    }
}

#[async_trait]
impl ChainClient for ScriptedChainClient {
    async fn get_price(&self, _netuid: u16) -> WatcherResult<Decimal> {
        self.price_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.price_delay {
            tokio::time::sleep(delay).await;
        }
        if let Some(scripted) = self.prices.lock().unwrap().pop_front() {
            return scripted;
        }
        self.fallback_price
            .ok_or_else(|| WatcherError::Query("no price scripted".to_string()))
    }

    async fn get_balance(&self, _coldkey_ss58: &str) -> WatcherResult<Decimal> {
        self.balance_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(scripted) = self.balances.lock().unwrap().pop_front() {
            return scripted;
        }
        self.fallback_balance
            .ok_or_else(|| WatcherError::Query("no balance scripted".to_string()))
    }

    async fn get_stake(&self, _hotkey_ss58: &str, _netuid: u16) -> WatcherResult<Decimal> {
        self.stake_calls.fetch_add(1, Ordering::SeqCst);
        self.stake
            .ok_or_else(|| WatcherError::Query("no stake scripted".to_string()))
    }

    async fn submit_stake(&self, request: &StakeRequest) -> WatcherResult<SubmitOutcome> {
        self.record_submission(request)
    }

    async fn submit_unstake(&self, request: &StakeRequest) -> WatcherResult<SubmitOutcome> {
        self.record_submission(request)
    }

    async fn subnet_hotkeys(&self, _netuid: u16) -> WatcherResult<Vec<String>> {
        Ok(vec!["5HotkeyA".to_string()])
    }

    fn name(&self) -> &'static str {
        "scripted"
    }
}

/// Stop request that fires after `delay`
pub fn shutdown_after(delay: Duration) -> ShutdownSignal {
    let (trigger, signal) = shutdown_channel();
    tokio::spawn(async move {
        tokio::time::sleep(delay).await;
        trigger.trigger();
    });
    signal
}

/// Stop request that has already fired
pub fn shutdown_requested() -> ShutdownSignal {
    let (trigger, signal) = shutdown_channel();
    trigger.trigger();
    signal
}

pub fn test_wallet() -> Wallet {
    Wallet {
        name: "c0".to_string(),
        hotkey_name: "default".to_string(),
        coldkey_ss58: "5ColdkeyA".to_string(),
        hotkey_ss58: "5HotkeyA".to_string(),
    }
}

/// Buy-side policy at threshold 0.0017 TAO with a 60 s interval
pub fn buy_policy(amount: Decimal, allow_partial: bool, max_actions: u32) -> PolicyConfig {
    PolicyConfig {
        side: Side::Stake,
        netuid: 117,
        origin_netuid: 0,
        threshold: dec!(0.0017),
        interest_threshold: None,
        amount,
        allow_partial,
        rate_tolerance: dec!(0.025),
        max_actions,
        poll_interval: Duration::from_secs(60),
        target: StakeTarget { hotkey: "5HotkeyA".to_string(), netuid: 117 },
    }
}

/// Sell-side policy: interest 0.0015, trigger 0.0020, 10 per unstake
pub fn sell_policy(max_actions: u32) -> PolicyConfig {
    PolicyConfig {
        side: Side::Unstake,
        netuid: 117,
        origin_netuid: 117,
        threshold: dec!(0.0020),
        interest_threshold: Some(dec!(0.0015)),
        amount: dec!(10),
        allow_partial: false,
        rate_tolerance: Decimal::ZERO,
        max_actions,
        poll_interval: Duration::from_millis(100),
        target: StakeTarget { hotkey: "5Validator".to_string(), netuid: 117 },
    }
}

/// Write a wallet in the on-disk layout: coldkeypub.txt + hotkeys/<hotkey>
pub fn write_wallet_files(dir: &Path, name: &str, hotkey: &str, coldkey_ss58: &str, hotkey_ss58: &str) {
    let root = dir.join(name);
    fs::create_dir_all(root.join("hotkeys")).expect("Failed to create wallet dir");
    fs::write(
        root.join("coldkeypub.txt"),
        format!(r#"{{"ss58Address":"{}"}}"#, coldkey_ss58),
    )
    .expect("Failed to write coldkeypub");
    fs::write(
        root.join("hotkeys").join(hotkey),
        format!(r#"{{"ss58Address":"{}"}}"#, hotkey_ss58),
    )
    .expect("Failed to write hotkey");
}
