// Watcher command implementations
use std::sync::Arc;
use tracing::{info, warn};
use subnet_stake_watcher::{
    listen_for_interrupt, ActionJournal, BuyArgs, Config, HttpChainClient, PollLoop,
    PreFlightValidator, SellArgs, WatchPlan, WatcherResult,
};

pub async fn run_buy(args: &BuyArgs, config: &Config) -> WatcherResult<i32> {
    let plan = args.resolve(&config.buy)?;
    info!(
        "🎯 Starting auto-buy watcher (monitoring netuid {} → staking netuid {}, threshold {:.6} TAO)",
        plan.policy.origin_netuid, plan.policy.netuid, plan.policy.threshold
    );
    run_watch(plan, config).await
}

pub async fn run_sell(args: &SellArgs, config: &Config) -> WatcherResult<i32> {
    let plan = args.resolve(&config.sell)?;
    if let Some(interest) = plan.policy.interest_threshold {
        info!(
            "🎯 Starting auto-sell watcher on netuid {} (interest {} TAO, trigger {} TAO, {} per unstake)",
            plan.policy.netuid, interest, plan.policy.threshold, plan.policy.amount
        );
        if interest > plan.policy.threshold {
            warn!("⚠️  Interest level is above the trigger; status lines will only show after unstakes fire");
        }
    }
    run_watch(plan, config).await
}

async fn run_watch(mut plan: WatchPlan, config: &Config) -> WatcherResult<i32> {
    // Installed before any network call so Ctrl+C mid-cycle still stops cleanly
    let shutdown = listen_for_interrupt()?;

    if plan.dry_run {
        info!("🧪 DRY RUN mode (no extrinsics)");
    } else {
        info!("🚀 LIVE mode");
        warn!("⚠️  Real funds!");
    }

    let validator = PreFlightValidator::new(config.clone());
    let preflight = validator.validate(&plan);
    preflight.result.display();
    let (wallet, chain_endpoint) = preflight.into_ready()?;

    plan.bind_wallet(&wallet);
    info!("🔑 Using hotkey {}", wallet.hotkey_ss58);

    let client = HttpChainClient::new(
        &config.chain.gateway_url,
        &chain_endpoint,
        config.chain.request_timeout(),
    )?;
    info!("🔗 Connected to network '{}' via {}", plan.network, client.base_url());

    let journal = if config.journal.enabled {
        ActionJournal::in_directory(&config.journal.directory)
    } else {
        ActionJournal::disabled()
    };
    if let Some(path) = journal.path() {
        info!("📝 Journal: {}", path.display());
    }

    let mut watcher = PollLoop::new(Arc::new(client), wallet, plan.policy.clone())
        .with_schedule(plan.schedule.clone())
        .with_dry_run(plan.dry_run)
        .with_submit_options(plan.options.clone())
        .with_balance_confirmation(plan.confirm_by_balance)
        .with_status_every(plan.status_every)
        .with_journal(journal);

    info!("▶️  Watching - press Ctrl+C to stop");
    let summary = watcher.run(shutdown).await;

    info!("📊 Final Summary:");
    info!("   🔄 Cycles: {}", summary.cycles);
    info!("   ✅ Actions completed: {}", summary.actions_completed);
    info!("   🛑 Stop reason: {:?}", summary.stop_reason);

    Ok(summary.exit_code())
}
