// Common types used across the watcher

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

use crate::error::{WatcherError, WatcherResult};

/// Which way the watcher trades
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    /// Buy alpha: add stake when price is at or below the threshold
    Stake,
    /// Sell alpha: remove stake when price is at or above the threshold
    Unstake,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Stake => write!(f, "stake"),
            Side::Unstake => write!(f, "unstake"),
        }
    }
}

/// Hotkey and subnet an action is applied to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StakeTarget {
    pub hotkey: String,
    pub netuid: u16,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PriceObservation {
    pub netuid: u16,
    pub price: Decimal,
    pub observed_at: DateTime<Utc>,
}

impl PriceObservation {
    pub fn now(netuid: u16, price: Decimal) -> Self {
        Self {
            netuid,
            price,
            observed_at: Utc::now(),
        }
    }
}

/// Balances read during one cycle; `None` means that query failed
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AccountSnapshot {
    pub liquid_balance: Option<Decimal>,
    pub origin_stake: Option<Decimal>,
    pub destination_stake: Option<Decimal>,
}

impl AccountSnapshot {
    pub fn with_balance(balance: Decimal) -> Self {
        Self {
            liquid_balance: Some(balance),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PolicyConfig {
    pub side: Side,
    /// Subnet whose price is watched and traded
    pub netuid: u16,
    /// Subnet whose existing stake is reported alongside (buy side)
    pub origin_netuid: u16,
    /// Trigger price
    pub threshold: Decimal,
    /// Status-logging gate for the sell side; never gates an action
    pub interest_threshold: Option<Decimal>,
    /// Requested amount per action, in TAO (stake) or alpha (unstake)
    pub amount: Decimal,
    pub allow_partial: bool,
    pub rate_tolerance: Decimal,
    /// 0 = run until interrupted
    pub max_actions: u32,
    pub poll_interval: Duration,
    pub target: StakeTarget,
}

impl PolicyConfig {
    pub fn validate(&self) -> WatcherResult<()> {
        if self.threshold <= Decimal::ZERO {
            return Err(WatcherError::validation("threshold", "must be greater than zero"));
        }
        if self.amount <= Decimal::ZERO {
            return Err(WatcherError::validation("amount", "must be greater than zero"));
        }
        if self.poll_interval.is_zero() {
            return Err(WatcherError::validation("interval", "must be greater than zero"));
        }
        if self.rate_tolerance < Decimal::ZERO {
            return Err(WatcherError::validation("rate tolerance", "must be non-negative"));
        }
        if let Some(interest) = self.interest_threshold {
            if interest < Decimal::ZERO {
                return Err(WatcherError::validation("interest threshold", "must be non-negative"));
            }
        }
        Ok(())
    }

    pub fn is_bounded(&self) -> bool {
        self.max_actions > 0
    }
}

/// Why the policy decided not to act this cycle
#[derive(Debug, Clone, PartialEq)]
pub enum HoldReason {
    PriceAboveTrigger,
    PriceBelowTrigger,
    BalanceUnknown,
    NoLiquidBalance(Decimal),
    InsufficientBalance { available: Decimal, requested: Decimal },
    ZeroSize,
}

impl fmt::Display for HoldReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HoldReason::PriceAboveTrigger => write!(f, "price above trigger"),
            HoldReason::PriceBelowTrigger => write!(f, "price below trigger"),
            HoldReason::BalanceUnknown => write!(f, "coldkey balance unavailable"),
            HoldReason::NoLiquidBalance(available) => {
                write!(f, "no liquid TAO available (available {:.9} TAO)", available)
            }
            HoldReason::InsufficientBalance { available, requested } => write!(
                f,
                "insufficient coldkey balance (have {:.9} TAO, need {:.9} TAO)",
                available, requested
            ),
            HoldReason::ZeroSize => write!(f, "calculated amount is zero"),
        }
    }
}

/// Outcome of one policy evaluation; never retained past the cycle
#[derive(Debug, Clone, PartialEq)]
pub enum ActionDecision {
    Hold(HoldReason),
    Execute { amount: Decimal, target: StakeTarget },
}

impl ActionDecision {
    pub fn is_hold(&self) -> bool {
        matches!(self, ActionDecision::Hold(_))
    }

    pub fn amount(&self) -> Option<Decimal> {
        match self {
            ActionDecision::Execute { amount, .. } => Some(*amount),
            ActionDecision::Hold(_) => None,
        }
    }
}

/// Per-process counters, owned by the poll loop
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunState {
    pub actions_completed: u32,
    pub cycles: u64,
    /// Cycles that saw the price at or past the interest level
    pub interest_hits: u64,
    /// Last liquid balance seen, used to confirm unstakes by balance delta
    pub last_known_balance: Option<Decimal>,
}

impl RunState {
    pub fn new(last_known_balance: Option<Decimal>) -> Self {
        Self {
            last_known_balance,
            ..Self::default()
        }
    }

    pub fn record_action(&mut self) {
        self.actions_completed += 1;
    }

    pub fn budget_exhausted(&self, config: &PolicyConfig) -> bool {
        config.is_bounded() && self.actions_completed >= config.max_actions
    }
}

/// Format an optional balance the way the cycle log line shows it
pub fn format_tao(amount: Option<Decimal>) -> String {
    match amount {
        Some(value) => format!("{:.9} TAO", value),
        None => "n/a".to_string(),
    }
}
