// Poll loop driving the conditional staking policy
//
// One cycle: query price, query balances, decide, execute, record. Nothing
// raised inside a cycle escapes it; failures become a skipped cycle. The only
// place an operator interrupt is observed is the sleep between cycles.

use rust_decimal::Decimal;
use std::sync::Arc;
use tokio::time::sleep;
use tracing::{debug, error, info, warn};

use crate::clients::chain::{ChainClient, StakeRequest, SubmitOptions, SubmitOutcome};
use crate::core::policy::ConditionalStakePolicy;
use crate::core::schedule::{LoopPhase, SleepSchedule};
use crate::core::shutdown::ShutdownSignal;
use crate::core::types::{
    format_tao, AccountSnapshot, ActionDecision, HoldReason, PolicyConfig, PriceObservation,
    RunState, Side, StakeTarget,
};
use crate::journal::{ActionJournal, ActionOutcome, ActionRecord};
use crate::wallet::Wallet;

/// Where the loop is in its cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Polling,
    Deciding,
    Idle,
    Executing,
    Sleeping,
    Stopped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    MaxActionsReached,
    Interrupted,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub actions_completed: u32,
    pub cycles: u64,
    pub stop_reason: StopReason,
}

impl RunSummary {
    pub fn exit_code(&self) -> i32 {
        match self.stop_reason {
            StopReason::MaxActionsReached => 0,
            StopReason::Interrupted => 130,
        }
    }
}

pub struct PollLoop {
    client: Arc<dyn ChainClient>,
    wallet: Wallet,
    config: PolicyConfig,
    options: SubmitOptions,
    schedule: SleepSchedule,
    dry_run: bool,
    confirm_by_balance: bool,
    status_every: u64,
    journal: ActionJournal,
    state: RunState,
    loop_state: LoopState,
}

impl PollLoop {
    pub fn new(client: Arc<dyn ChainClient>, wallet: Wallet, config: PolicyConfig) -> Self {
        let schedule = SleepSchedule::fixed(config.poll_interval);
        Self {
            client,
            wallet,
            config,
            options: SubmitOptions::default(),
            schedule,
            dry_run: false,
            confirm_by_balance: false,
            status_every: 200,
            journal: ActionJournal::disabled(),
            state: RunState::default(),
            loop_state: LoopState::Polling,
        }
    }

    pub fn with_schedule(mut self, schedule: SleepSchedule) -> Self {
        self.schedule = schedule;
        self
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn with_submit_options(mut self, options: SubmitOptions) -> Self {
        self.options = options;
        self
    }

    /// Unstake side: when the backend reports no outcome, count the action
    /// only if the coldkey balance went up
    pub fn with_balance_confirmation(mut self, enable: bool) -> Self {
        self.confirm_by_balance = enable;
        self
    }

    pub fn with_status_every(mut self, cycles: u64) -> Self {
        self.status_every = cycles.max(1);
        self
    }

    pub fn with_journal(mut self, journal: ActionJournal) -> Self {
        self.journal = journal;
        self
    }

    pub fn state(&self) -> &RunState {
        &self.state
    }

    pub fn loop_state(&self) -> LoopState {
        self.loop_state
    }

    pub fn config(&self) -> &PolicyConfig {
        &self.config
    }

    fn is_done(&self) -> bool {
        self.state.budget_exhausted(&self.config)
    }

    fn summary(&self, stop_reason: StopReason) -> RunSummary {
        RunSummary {
            actions_completed: self.state.actions_completed,
            cycles: self.state.cycles,
            stop_reason,
        }
    }

    /// Run until the action budget is spent or `shutdown` fires.
    ///
    /// A stop request is seen at the top of each iteration and during the
    /// sleep; a cycle already in progress always completes.
    pub async fn run(&mut self, mut shutdown: ShutdownSignal) -> RunSummary {
        if self.config.side == Side::Unstake && self.confirm_by_balance && !self.dry_run {
            self.prime_balance().await;
        }

        let stop_reason = loop {
            if self.is_done() {
                break StopReason::MaxActionsReached;
            }

            if shutdown.is_triggered() {
                warn!("🛑 Watcher interrupted by operator");
                break StopReason::Interrupted;
            }

            let phase = self.run_cycle().await;

            if self.is_done() {
                break StopReason::MaxActionsReached;
            }

            let pause = self.schedule.sleep_for(phase);
            self.loop_state = LoopState::Sleeping;
            tokio::select! {
                _ = sleep(pause) => {
                    self.loop_state = LoopState::Polling;
                }
                _ = shutdown.wait() => {
                    warn!("🛑 Watcher interrupted by operator");
                    break StopReason::Interrupted;
                }
            }
        };

        self.loop_state = LoopState::Stopped;
        let verb = match self.config.side {
            Side::Stake => "stake",
            Side::Unstake => "unstake",
        };
        info!(
            "🏁 Finished after executing {} {}(s) in {} cycle(s)",
            self.state.actions_completed, verb, self.state.cycles
        );

        self.summary(stop_reason)
    }

    /// Execute one full cycle and return the phase that picks the next sleep
    pub async fn run_cycle(&mut self) -> LoopPhase {
        self.loop_state = LoopState::Polling;
        self.state.cycles += 1;
        let netuid = self.config.netuid;

        let price = match self.client.get_price(netuid).await {
            Ok(price) => price,
            Err(e) => {
                error!("❌ [{}] Failed to fetch subnet price: {}", e.category(), e);
                self.loop_state = LoopState::Sleeping;
                return LoopPhase::Retry;
            }
        };
        let observation = PriceObservation::now(netuid, price);

        let snapshot = match self.config.side {
            Side::Stake => self.collect_snapshot(&observation).await,
            Side::Unstake => {
                self.log_sell_status(&observation);
                AccountSnapshot::default()
            }
        };

        self.loop_state = LoopState::Deciding;
        let decision =
            ConditionalStakePolicy::decide(&observation, &snapshot, &self.config, &self.state);

        let phase = match decision {
            ActionDecision::Hold(reason) => {
                self.loop_state = LoopState::Idle;
                self.log_hold(&observation, &reason);
                self.phase_for(&observation)
            }
            ActionDecision::Execute { amount, target } => {
                self.loop_state = LoopState::Executing;
                self.execute(&observation, amount, &target).await;
                LoopPhase::Active
            }
        };

        self.loop_state = LoopState::Sleeping;
        phase
    }

    fn phase_for(&self, observation: &PriceObservation) -> LoopPhase {
        if ConditionalStakePolicy::is_interesting(observation.price, &self.config)
            || ConditionalStakePolicy::is_triggered(observation.price, &self.config)
        {
            LoopPhase::Active
        } else {
            LoopPhase::Idle
        }
    }

    async fn collect_snapshot(&self, observation: &PriceObservation) -> AccountSnapshot {
        info!(
            "📈 Subnet {} price: {:.9} TAO (threshold {:.9} TAO)",
            observation.netuid, observation.price, self.config.threshold
        );

        let liquid_balance = match self.client.get_balance(&self.wallet.coldkey_ss58).await {
            Ok(balance) => Some(balance),
            Err(e) => {
                error!("❌ [{}] Failed to fetch coldkey balance: {}", e.category(), e);
                None
            }
        };

        let origin_stake = match self
            .client
            .get_stake(&self.wallet.hotkey_ss58, self.config.origin_netuid)
            .await
        {
            Ok(stake) => Some(stake),
            Err(e) => {
                error!(
                    "❌ [{}] Unable to fetch stake on origin netuid {}: {}",
                    e.category(),
                    self.config.origin_netuid,
                    e
                );
                None
            }
        };

        let destination_stake = match self
            .client
            .get_stake(&self.wallet.hotkey_ss58, self.config.netuid)
            .await
        {
            Ok(stake) => Some(stake),
            Err(e) => {
                error!(
                    "❌ [{}] Unable to fetch stake on destination netuid {}: {}",
                    e.category(),
                    self.config.netuid,
                    e
                );
                None
            }
        };

        info!(
            "💰 Balances: coldkey {} | origin netuid {} stake {} | target netuid {} stake {}",
            format_tao(liquid_balance),
            self.config.origin_netuid,
            format_tao(origin_stake),
            self.config.netuid,
            format_tao(destination_stake)
        );

        AccountSnapshot {
            liquid_balance,
            origin_stake,
            destination_stake,
        }
    }

    fn log_sell_status(&mut self, observation: &PriceObservation) {
        if !ConditionalStakePolicy::is_interesting(observation.price, &self.config) {
            debug!("Subnet {} price {} TAO", observation.netuid, observation.price);
            return;
        }

        if self.state.interest_hits % self.status_every == 0 {
            if let Some(interest) = self.config.interest_threshold {
                info!(
                    "👀 Current subnet price is {} TAO, above interest level {} TAO (trigger {} TAO)",
                    observation.price, interest, self.config.threshold
                );
            }
        }
        self.state.interest_hits += 1;
    }

    fn log_hold(&self, observation: &PriceObservation, reason: &HoldReason) {
        match reason {
            HoldReason::PriceAboveTrigger | HoldReason::PriceBelowTrigger => {
                debug!("Price {} TAO outside trigger region; holding", observation.price);
            }
            HoldReason::InsufficientBalance { .. } => {
                info!("📉 Price below threshold, preparing stake of {:.9} TAO", self.config.amount);
                warn!(
                    "⚠️  {}. Enable --allow-partial to stake the available amount.",
                    capitalize(&reason.to_string())
                );
            }
            other => {
                info!("📉 Price below threshold, preparing stake of {:.9} TAO", self.config.amount);
                warn!("⚠️  {}; skipping this interval", capitalize(&other.to_string()));
            }
        }
    }

    async fn execute(&mut self, observation: &PriceObservation, amount: Decimal, target: &StakeTarget) {
        let verb = match self.config.side {
            Side::Stake => "stake",
            Side::Unstake => "unstake",
        };

        let (outcome, detail) = if self.dry_run {
            info!(
                "🧪 Dry run: would {} {:.9} on netuid {} (hotkey {})",
                verb, amount, target.netuid, target.hotkey
            );
            (ActionOutcome::DryRun, None)
        } else {
            info!(
                "🚀 Submitting {} of {:.9} on netuid {} at price {} TAO",
                verb, amount, target.netuid, observation.price
            );
            self.submit(amount, target).await
        };

        if outcome.counts() {
            self.state.record_action();
            info!(
                "✅ {} #{} completed ({:.9} on netuid {})",
                capitalize(verb),
                self.state.actions_completed,
                amount,
                target.netuid
            );
        }

        let mut record = ActionRecord::new(
            self.config.side,
            target.netuid,
            &target.hotkey,
            amount,
            observation.price,
            self.dry_run,
            outcome,
        );
        if let Some(detail) = detail {
            record = record.with_detail(detail);
        }
        if let Err(e) = self.journal.append(&record) {
            warn!("⚠️  Could not journal action {}: {}", record.id, e);
        }
    }

    async fn submit(&mut self, amount: Decimal, target: &StakeTarget) -> (ActionOutcome, Option<String>) {
        let request = StakeRequest {
            wallet: self.wallet.name.clone(),
            hotkey_ss58: target.hotkey.clone(),
            netuid: target.netuid,
            amount,
            options: self.options.clone(),
        };

        let result = match self.config.side {
            Side::Stake => self.client.submit_stake(&request).await,
            Side::Unstake => self.client.submit_unstake(&request).await,
        };

        match result {
            Ok(SubmitOutcome::Confirmed) => {
                info!("🎉 Extrinsic submitted successfully via {}", self.client.name());
                if self.config.side == Side::Unstake && self.confirm_by_balance {
                    self.prime_balance().await;
                }
                (ActionOutcome::Confirmed, None)
            }
            Ok(SubmitOutcome::Rejected) => {
                warn!("⚠️  Extrinsic was not confirmed as successful");
                (ActionOutcome::Rejected, None)
            }
            Ok(SubmitOutcome::Unknown) => {
                if self.config.side == Side::Unstake && self.confirm_by_balance {
                    self.confirm_by_balance_delta().await
                } else {
                    warn!("⚠️  Backend gave no success signal; not counting this action");
                    (ActionOutcome::Unconfirmed, None)
                }
            }
            Err(e) => {
                if e.is_retryable() {
                    error!("❌ [{}] Submission failed, retrying on a later trigger: {}", e.category(), e);
                } else {
                    error!("❌ [{}] Submission failed: {}", e.category(), e);
                }
                (ActionOutcome::Failed, Some(e.to_string()))
            }
        }
    }

    async fn prime_balance(&mut self) {
        match self.client.get_balance(&self.wallet.coldkey_ss58).await {
            Ok(balance) => {
                debug!("Coldkey balance baseline {} TAO", balance);
                self.state.last_known_balance = Some(balance);
            }
            Err(e) => warn!("⚠️  Could not read coldkey balance baseline: {}", e),
        }
    }

    async fn confirm_by_balance_delta(&mut self) -> (ActionOutcome, Option<String>) {
        let new_balance = match self.client.get_balance(&self.wallet.coldkey_ss58).await {
            Ok(balance) => balance,
            Err(e) => {
                warn!("⚠️  Could not confirm unstake, balance query failed: {}", e);
                return (ActionOutcome::Unconfirmed, Some(e.to_string()));
            }
        };

        let previous = self.state.last_known_balance.replace(new_balance);
        match previous {
            Some(previous) if new_balance > previous => {
                info!(
                    "💸 Sell successful! New balance: {} TAO (was {} TAO)",
                    new_balance, previous
                );
                (ActionOutcome::ConfirmedByBalance, None)
            }
            Some(previous) => {
                warn!(
                    "⚠️  Balance did not increase ({} TAO -> {} TAO); not counting this unstake",
                    previous, new_balance
                );
                (ActionOutcome::Unconfirmed, None)
            }
            None => {
                warn!("⚠️  No balance baseline; recorded {} TAO for next time", new_balance);
                (ActionOutcome::Unconfirmed, Some("no balance baseline".to_string()))
            }
        }
    }
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        let done = RunSummary { actions_completed: 1, cycles: 3, stop_reason: StopReason::MaxActionsReached };
        let interrupted = RunSummary { actions_completed: 0, cycles: 9, stop_reason: StopReason::Interrupted };
        assert_eq!(done.exit_code(), 0);
        assert_eq!(interrupted.exit_code(), 130);
    }

    #[test]
    fn test_capitalize() {
        assert_eq!(capitalize("insufficient balance"), "Insufficient balance");
        assert_eq!(capitalize(""), "");
    }
}
