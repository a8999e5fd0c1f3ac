// Chain client capability used by the poll loop

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::WatcherResult;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmitOptions {
    pub wait_for_inclusion: bool,
    pub wait_for_finalization: bool,
    /// Slippage-limited execution
    pub safe_staking: bool,
    /// Fill what fits inside the tolerance instead of aborting
    pub allow_partial: bool,
    /// Maximum price ratio move accepted when safe staking (0.025 = 2.5%)
    pub rate_tolerance: Decimal,
}

impl Default for SubmitOptions {
    fn default() -> Self {
        Self {
            wait_for_inclusion: true,
            wait_for_finalization: false,
            safe_staking: false,
            allow_partial: false,
            rate_tolerance: Decimal::new(25, 3),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StakeRequest {
    /// Coldkey wallet name; the signer resolves keys by name
    pub wallet: String,
    pub hotkey_ss58: String,
    pub netuid: u16,
    pub amount: Decimal,
    pub options: SubmitOptions,
}

/// What the backend reported after a submission
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    Confirmed,
    Rejected,
    /// No direct success signal from the backend
    Unknown,
}

impl From<Option<bool>> for SubmitOutcome {
    fn from(success: Option<bool>) -> Self {
        match success {
            Some(true) => SubmitOutcome::Confirmed,
            Some(false) => SubmitOutcome::Rejected,
            None => SubmitOutcome::Unknown,
        }
    }
}

/// Queries fail with `WatcherError::Query`, submissions with
/// `WatcherError::Submission`.
#[async_trait]
pub trait ChainClient: Send + Sync {
    /// Alpha price of a subnet in TAO
    async fn get_price(&self, netuid: u16) -> WatcherResult<Decimal>;

    /// Free balance of a coldkey in TAO
    async fn get_balance(&self, coldkey_ss58: &str) -> WatcherResult<Decimal>;

    /// Stake held by a hotkey on a subnet
    async fn get_stake(&self, hotkey_ss58: &str, netuid: u16) -> WatcherResult<Decimal>;

    async fn submit_stake(&self, request: &StakeRequest) -> WatcherResult<SubmitOutcome>;

    async fn submit_unstake(&self, request: &StakeRequest) -> WatcherResult<SubmitOutcome>;

    /// Metagraph hotkeys of a subnet, indexed by UID
    async fn subnet_hotkeys(&self, netuid: u16) -> WatcherResult<Vec<String>>;

    fn name(&self) -> &'static str;
}
