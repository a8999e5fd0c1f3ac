//! Command line arguments for the `buy` and `sell` watchers
//!
//! Flags left unset fall back to the `[buy]` / `[sell]` sections of the
//! config file. Everything is validated here, before a wallet is opened or
//! any request leaves the process.

use clap::Args;
use rust_decimal::Decimal;
use std::time::Duration;

use crate::clients::chain::SubmitOptions;
use crate::config::{BuyDefaults, SellDefaults};
use crate::core::schedule::SleepSchedule;
use crate::core::types::{PolicyConfig, Side, StakeTarget};
use crate::error::{WatcherError, WatcherResult};
use crate::wallet::Wallet;

#[derive(Debug, Clone, Args)]
pub struct BuyArgs {
    /// Name of the coldkey wallet
    #[arg(long = "wallet.name")]
    pub wallet_name: String,

    /// Hotkey name stored under the wallet [default: default]
    #[arg(long = "wallet.hotkey")]
    pub wallet_hotkey: Option<String>,

    /// Network preset (finney, test, archive, local) or ws:// endpoint
    #[arg(long)]
    pub network: Option<String>,

    /// Netuid to monitor existing stake on [default: 0]
    #[arg(long)]
    pub origin_netuid: Option<u16>,

    /// Netuid to stake on when conditions are met [default: 117]
    #[arg(long, alias = "destination-netuid")]
    pub netuid: Option<u16>,

    /// Amount of stake (in TAO) to add per successful interval
    #[arg(long, allow_hyphen_values = true)]
    pub amount_tao: Decimal,

    /// Trigger price in TAO [default: 0.0017]
    #[arg(long, allow_hyphen_values = true)]
    pub threshold_tao: Option<Decimal>,

    /// Polling interval in seconds between price checks [default: 60]
    #[arg(long, allow_hyphen_values = true)]
    pub interval: Option<f64>,

    /// Maximum number of stake operations before exiting (0 = run forever) [default: 1]
    #[arg(long, alias = "max-actions", allow_hyphen_values = true)]
    pub max_swaps: Option<i64>,

    /// Only log what would happen without submitting extrinsics
    #[arg(long)]
    pub dry_run: bool,

    /// Enable slippage-limited staking
    #[arg(long)]
    pub safe_staking: bool,

    /// Stake what is available when the balance (or tolerance) does not cover the full amount
    #[arg(long)]
    pub allow_partial: bool,

    /// Maximum price ratio increase allowed when safe staking [default: 0.025]
    #[arg(long, allow_hyphen_values = true)]
    pub rate_tolerance: Option<Decimal>,

    /// Wait for block finalization before reporting success
    #[arg(long)]
    pub wait_for_finalization: bool,

    /// Return immediately after submitting the extrinsic
    #[arg(long)]
    pub no_wait_for_inclusion: bool,
}

#[derive(Debug, Clone, Args)]
pub struct SellArgs {
    /// Name of the coldkey wallet [default: c0]
    #[arg(long = "wallet.name")]
    pub wallet_name: Option<String>,

    /// Hotkey name stored under the wallet [default: default]
    #[arg(long = "wallet.hotkey")]
    pub wallet_hotkey: Option<String>,

    /// Network preset or ws:// endpoint [default: local]
    #[arg(long)]
    pub network: Option<String>,

    /// Netuid to watch and unstake from [default: 117]
    #[arg(long)]
    pub netuid: Option<u16>,

    /// Validator hotkey (ss58) to unstake from
    #[arg(long)]
    pub validator: String,

    /// Amount to unstake per trigger [default: 10]
    #[arg(long, allow_hyphen_values = true)]
    pub amount_tao: Option<Decimal>,

    /// Unstake when the price is at or above this level [default: 0.0020]
    #[arg(long, allow_hyphen_values = true)]
    pub threshold_tao: Option<Decimal>,

    /// Log status while the price is at or above this level [default: 0.0015]
    #[arg(long, allow_hyphen_values = true)]
    pub interest_tao: Option<Decimal>,

    /// Print a status line every N interesting polls [default: 200]
    #[arg(long)]
    pub status_every: Option<u64>,

    /// Sleep between polls while the price is interesting, in ms [default: 50]
    #[arg(long)]
    pub active_sleep_ms: Option<u64>,

    /// Sleep between polls otherwise, in ms [default: 100]
    #[arg(long)]
    pub idle_sleep_ms: Option<u64>,

    /// Stop after this many unstakes (0 = run forever) [default: 0]
    #[arg(long, allow_hyphen_values = true)]
    pub max_actions: Option<i64>,

    /// Only log what would happen without submitting extrinsics
    #[arg(long)]
    pub dry_run: bool,

    /// Never infer success from a coldkey balance increase
    #[arg(long)]
    pub no_balance_confirmation: bool,
}

/// Validated run parameters for one watcher
#[derive(Debug, Clone, PartialEq)]
pub struct WatchPlan {
    pub policy: PolicyConfig,
    pub network: String,
    pub wallet_name: String,
    pub wallet_hotkey: String,
    pub dry_run: bool,
    pub options: SubmitOptions,
    pub schedule: SleepSchedule,
    pub status_every: u64,
    pub confirm_by_balance: bool,
}

impl WatchPlan {
    /// Fill in the stake target from the wallet when no explicit one was given
    pub fn bind_wallet(&mut self, wallet: &Wallet) {
        if self.policy.target.hotkey.is_empty() {
            self.policy.target.hotkey = wallet.hotkey_ss58.clone();
        }
    }
}

fn require_positive(param: &str, value: Decimal) -> WatcherResult<Decimal> {
    if value <= Decimal::ZERO {
        return Err(WatcherError::validation(param, "must be greater than zero"));
    }
    Ok(value)
}

fn require_non_negative(param: &str, value: Decimal) -> WatcherResult<Decimal> {
    if value < Decimal::ZERO {
        return Err(WatcherError::validation(param, "must be non-negative"));
    }
    Ok(value)
}

fn require_max_actions(param: &str, value: i64) -> WatcherResult<u32> {
    if value < 0 {
        return Err(WatcherError::validation(param, "must be zero or a positive integer"));
    }
    u32::try_from(value).map_err(|_| WatcherError::validation(param, "is too large"))
}

fn require_name(param: &str, value: &str) -> WatcherResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(WatcherError::validation(param, "is required"));
    }
    Ok(trimmed.to_string())
}

fn require_interval(param: &str, seconds: f64) -> WatcherResult<Duration> {
    if !seconds.is_finite() || seconds <= 0.0 {
        return Err(WatcherError::validation(param, "must be greater than zero"));
    }
    Duration::try_from_secs_f64(seconds).map_err(|_| WatcherError::validation(param, "is too large"))
}

impl BuyArgs {
    pub fn resolve(&self, defaults: &BuyDefaults) -> WatcherResult<WatchPlan> {
        let wallet_name = require_name("--wallet.name", &self.wallet_name)?;
        let wallet_hotkey = require_name(
            "--wallet.hotkey",
            self.wallet_hotkey.as_deref().unwrap_or(&defaults.wallet_hotkey),
        )?;
        let amount = require_positive("--amount-tao", self.amount_tao)?;
        let threshold = require_positive(
            "--threshold-tao",
            self.threshold_tao.unwrap_or(defaults.threshold_tao),
        )?;
        let poll_interval =
            require_interval("--interval", self.interval.unwrap_or(defaults.interval_secs))?;
        let max_actions = require_max_actions(
            "--max-swaps",
            self.max_swaps.unwrap_or(i64::from(defaults.max_swaps)),
        )?;
        let rate_tolerance = require_non_negative(
            "--rate-tolerance",
            self.rate_tolerance.unwrap_or(defaults.rate_tolerance),
        )?;
        let netuid = self.netuid.unwrap_or(defaults.netuid);

        let policy = PolicyConfig {
            side: Side::Stake,
            netuid,
            origin_netuid: self.origin_netuid.unwrap_or(defaults.origin_netuid),
            threshold,
            interest_threshold: None,
            amount,
            allow_partial: self.allow_partial,
            rate_tolerance,
            max_actions,
            poll_interval,
            // Bound to the wallet's own hotkey once it is loaded
            target: StakeTarget { hotkey: String::new(), netuid },
        };
        policy.validate()?;

        Ok(WatchPlan {
            policy,
            network: self.network.clone().unwrap_or_else(|| defaults.network.clone()),
            wallet_name,
            wallet_hotkey,
            dry_run: self.dry_run,
            options: SubmitOptions {
                wait_for_inclusion: !self.no_wait_for_inclusion,
                wait_for_finalization: self.wait_for_finalization,
                safe_staking: self.safe_staking,
                allow_partial: self.allow_partial,
                rate_tolerance,
            },
            schedule: SleepSchedule::fixed(poll_interval),
            status_every: 1,
            confirm_by_balance: false,
        })
    }
}

impl SellArgs {
    pub fn resolve(&self, defaults: &SellDefaults) -> WatcherResult<WatchPlan> {
        let wallet_name = require_name(
            "--wallet.name",
            self.wallet_name.as_deref().unwrap_or(&defaults.wallet_name),
        )?;
        let wallet_hotkey = require_name(
            "--wallet.hotkey",
            self.wallet_hotkey.as_deref().unwrap_or(&defaults.wallet_hotkey),
        )?;
        let validator = require_name("--validator", &self.validator)?;
        let amount = require_positive("--amount-tao", self.amount_tao.unwrap_or(defaults.amount_tao))?;
        let threshold = require_positive(
            "--threshold-tao",
            self.threshold_tao.unwrap_or(defaults.threshold_tao),
        )?;
        let interest = require_non_negative(
            "--interest-tao",
            self.interest_tao.unwrap_or(defaults.interest_tao),
        )?;
        let max_actions = require_max_actions(
            "--max-actions",
            self.max_actions.unwrap_or(i64::from(defaults.max_actions)),
        )?;

        let active_ms = self.active_sleep_ms.unwrap_or(defaults.active_sleep_ms);
        let idle_ms = self.idle_sleep_ms.unwrap_or(defaults.idle_sleep_ms);
        if active_ms == 0 {
            return Err(WatcherError::validation("--active-sleep-ms", "must be greater than zero"));
        }
        if idle_ms == 0 {
            return Err(WatcherError::validation("--idle-sleep-ms", "must be greater than zero"));
        }
        let schedule = SleepSchedule::high_frequency(
            Duration::from_millis(active_ms),
            Duration::from_millis(idle_ms),
        );

        let netuid = self.netuid.unwrap_or(defaults.netuid);
        let policy = PolicyConfig {
            side: Side::Unstake,
            netuid,
            origin_netuid: netuid,
            threshold,
            interest_threshold: Some(interest),
            amount,
            allow_partial: false,
            rate_tolerance: Decimal::ZERO,
            max_actions,
            poll_interval: schedule.idle,
            target: StakeTarget { hotkey: validator, netuid },
        };
        policy.validate()?;

        Ok(WatchPlan {
            policy,
            network: self.network.clone().unwrap_or_else(|| defaults.network.clone()),
            wallet_name,
            wallet_hotkey,
            dry_run: self.dry_run,
            options: SubmitOptions::default(),
            schedule,
            status_every: self.status_every.unwrap_or(defaults.status_every).max(1),
            confirm_by_balance: defaults.confirm_by_balance && !self.no_balance_confirmation,
        })
    }
}
