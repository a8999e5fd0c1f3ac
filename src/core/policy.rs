// Price-triggered conditional staking policy
//
// `decide` is a pure function of its inputs. The poll loop owns every side
// effect (queries, submission, counters, logging).

use rust_decimal::Decimal;

use crate::core::types::{
    AccountSnapshot, ActionDecision, HoldReason, PolicyConfig, PriceObservation, RunState, Side,
};

pub struct ConditionalStakePolicy;

impl ConditionalStakePolicy {
    /// Decide whether to act this cycle and with what size.
    ///
    /// The boundary price is actionable on both sides: `price <= threshold`
    /// triggers a stake, `price >= threshold` triggers an unstake.
    pub fn decide(
        observation: &PriceObservation,
        snapshot: &AccountSnapshot,
        config: &PolicyConfig,
        _state: &RunState,
    ) -> ActionDecision {
        match config.side {
            Side::Stake => Self::decide_stake(observation, snapshot, config),
            Side::Unstake => Self::decide_unstake(observation, config),
        }
    }

    /// True when the price is inside the trigger region for this side
    pub fn is_triggered(price: Decimal, config: &PolicyConfig) -> bool {
        match config.side {
            Side::Stake => price <= config.threshold,
            Side::Unstake => price >= config.threshold,
        }
    }

    /// Sell side only: price has reached the status-logging level.
    /// Unrelated to whether an unstake fires.
    pub fn is_interesting(price: Decimal, config: &PolicyConfig) -> bool {
        match (config.side, config.interest_threshold) {
            (Side::Unstake, Some(interest)) => price >= interest,
            _ => false,
        }
    }

    fn decide_stake(
        observation: &PriceObservation,
        snapshot: &AccountSnapshot,
        config: &PolicyConfig,
    ) -> ActionDecision {
        if !Self::is_triggered(observation.price, config) {
            return ActionDecision::Hold(HoldReason::PriceAboveTrigger);
        }

        let available = match snapshot.liquid_balance {
            Some(balance) => balance,
            None => return ActionDecision::Hold(HoldReason::BalanceUnknown),
        };

        if available <= Decimal::ZERO {
            return ActionDecision::Hold(HoldReason::NoLiquidBalance(available));
        }

        let requested = config.amount;
        if !config.allow_partial && available < requested {
            return ActionDecision::Hold(HoldReason::InsufficientBalance { available, requested });
        }

        let size = if config.allow_partial {
            available.min(requested)
        } else {
            requested
        };

        if size <= Decimal::ZERO {
            return ActionDecision::Hold(HoldReason::ZeroSize);
        }

        ActionDecision::Execute {
            amount: size,
            target: config.target.clone(),
        }
    }

    fn decide_unstake(observation: &PriceObservation, config: &PolicyConfig) -> ActionDecision {
        if Self::is_triggered(observation.price, config) {
            ActionDecision::Execute {
                amount: config.amount,
                target: config.target.clone(),
            }
        } else {
            ActionDecision::Hold(HoldReason::PriceBelowTrigger)
        }
    }
}
