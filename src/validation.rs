//! Pre-flight validation for the stake watcher
//!
//! Runs before the poll loop starts and never touches the network: it checks
//! the network preset, the gateway URL, the wallet key files and the journal
//! directory.

use std::fs;
use std::path::Path;
use tracing::{error, info, warn};

use crate::config::Config;
use crate::error::{WatcherError, WatcherResult};
use crate::wallet::Wallet;
use crate::watch_args::WatchPlan;

/// Validation result with detailed findings
#[derive(Debug, Clone)]
pub struct ValidationResult {
    pub passed: bool,
    pub checks: Vec<ValidationCheck>,
}

#[derive(Debug, Clone)]
pub struct ValidationCheck {
    pub name: String,
    pub passed: bool,
    pub message: String,
    pub level: ValidationLevel,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ValidationLevel {
    Critical,  // Must pass for the watcher to start
    Warning,   // Should pass, but the watcher can run
    Info,      // Informational only
}

impl ValidationCheck {
    fn pass(name: &str, level: ValidationLevel, message: impl Into<String>) -> Self {
        Self { name: name.to_string(), passed: true, message: message.into(), level }
    }

    fn fail(name: &str, level: ValidationLevel, message: impl Into<String>) -> Self {
        Self { name: name.to_string(), passed: false, message: message.into(), level }
    }
}

impl Default for ValidationResult {
    fn default() -> Self {
        Self::new()
    }
}

impl ValidationResult {
    pub fn new() -> Self {
        ValidationResult {
            passed: true,
            checks: Vec::new(),
        }
    }

    pub fn add_check(&mut self, check: ValidationCheck) {
        if !check.passed && check.level == ValidationLevel::Critical {
            self.passed = false;
        }
        self.checks.push(check);
    }

    pub fn critical_failures(&self) -> Vec<&ValidationCheck> {
        self.checks
            .iter()
            .filter(|c| !c.passed && c.level == ValidationLevel::Critical)
            .collect()
    }

    pub fn warnings(&self) -> Vec<&ValidationCheck> {
        self.checks
            .iter()
            .filter(|c| !c.passed && c.level == ValidationLevel::Warning)
            .collect()
    }

    pub fn display(&self) {
        info!("🔍 Pre-flight Validation");
        info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

        for check in &self.checks {
            let icon = if check.passed {
                "✅"
            } else {
                match check.level {
                    ValidationLevel::Critical => "❌",
                    ValidationLevel::Warning => "⚠️",
                    ValidationLevel::Info => "ℹ️",
                }
            };

            info!("{} {} - {}", icon, check.name, check.message);
        }

        info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

        if !self.passed {
            let failures = self.critical_failures();
            error!("❌ Validation failed: {} critical issue(s)", failures.len());
            for failure in failures {
                error!("   • {}: {}", failure.name, failure.message);
            }
        } else {
            let warnings = self.warnings();
            if !warnings.is_empty() {
                warn!("⚠️  {} warning(s) detected", warnings.len());
                for warning in warnings {
                    warn!("   • {}: {}", warning.name, warning.message);
                }
            }
            info!("✅ All critical checks passed");
        }
    }
}

/// What the watcher needs to start, gathered during validation
#[derive(Debug, Clone)]
pub struct PreFlight {
    pub result: ValidationResult,
    pub wallet: Option<Wallet>,
    pub chain_endpoint: Option<String>,
}

impl PreFlight {
    /// The loaded wallet and chain endpoint, or the first critical failure
    pub fn into_ready(self) -> WatcherResult<(Wallet, String)> {
        if let Some(failure) = self.result.critical_failures().first() {
            return Err(match failure.name.as_str() {
                "Wallet" => WatcherError::Auth(failure.message.clone()),
                _ => WatcherError::validation(failure.name.clone(), failure.message.clone()),
            });
        }

        match (self.wallet, self.chain_endpoint) {
            (Some(wallet), Some(endpoint)) => Ok((wallet, endpoint)),
            _ => Err(WatcherError::validation("pre-flight", "incomplete validation")),
        }
    }
}

/// Pre-flight validator for watcher runs
pub struct PreFlightValidator {
    config: Config,
}

impl PreFlightValidator {
    pub fn new(config: Config) -> Self {
        PreFlightValidator { config }
    }

    /// Run the full suite for a resolved watch plan
    pub fn validate(&self, plan: &WatchPlan) -> PreFlight {
        let mut result = ValidationResult::new();

        result.add_check(self.check_plan(plan));
        result.add_check(self.check_gateway());

        let (network_check, chain_endpoint) = self.check_network(&plan.network);
        result.add_check(network_check);

        let (wallet_check, wallet) = self.check_wallet(&plan.wallet_name, &plan.wallet_hotkey);
        result.add_check(wallet_check);

        if let Some(check) = self.check_journal() {
            result.add_check(check);
        }

        if plan.dry_run {
            result.add_check(ValidationCheck::pass(
                "Mode",
                ValidationLevel::Info,
                "Dry run: no extrinsics will be submitted",
            ));
        }

        PreFlight { result, wallet, chain_endpoint }
    }

    fn check_plan(&self, plan: &WatchPlan) -> ValidationCheck {
        let policy = &plan.policy;
        match policy.validate() {
            Ok(()) => {
                let budget = if policy.max_actions == 0 {
                    "unbounded".to_string()
                } else {
                    policy.max_actions.to_string()
                };
                ValidationCheck::pass(
                    "Parameters",
                    ValidationLevel::Critical,
                    format!(
                        "{} {} on netuid {} at threshold {} TAO (max actions: {})",
                        policy.side, policy.amount, policy.netuid, policy.threshold, budget
                    ),
                )
            }
            Err(e) => ValidationCheck::fail("Parameters", ValidationLevel::Critical, e.to_string()),
        }
    }

    fn check_gateway(&self) -> ValidationCheck {
        let url = &self.config.chain.gateway_url;
        if url.starts_with("http://") || url.starts_with("https://") {
            ValidationCheck::pass("Gateway", ValidationLevel::Critical, url.clone())
        } else {
            ValidationCheck::fail(
                "Gateway",
                ValidationLevel::Critical,
                format!("gateway_url must be an http(s) URL, got '{}'", url),
            )
        }
    }

    fn check_network(&self, network: &str) -> (ValidationCheck, Option<String>) {
        match self.config.chain.resolve_network(network) {
            Ok(endpoint) => (
                ValidationCheck::pass(
                    "Network",
                    ValidationLevel::Critical,
                    format!("{} -> {}", network, endpoint),
                ),
                Some(endpoint),
            ),
            Err(e) => (
                ValidationCheck::fail("Network", ValidationLevel::Critical, e.to_string()),
                None,
            ),
        }
    }

    fn check_wallet(&self, name: &str, hotkey: &str) -> (ValidationCheck, Option<Wallet>) {
        let wallet_dir = self.config.chain.wallet_dir();
        match Wallet::load(&wallet_dir, name, hotkey) {
            Ok(wallet) => (
                ValidationCheck::pass(
                    "Wallet",
                    ValidationLevel::Critical,
                    format!("{} / {} (hotkey {})", wallet.name, wallet.hotkey_name, wallet.hotkey_ss58),
                ),
                Some(wallet),
            ),
            Err(e) => (
                ValidationCheck::fail("Wallet", ValidationLevel::Critical, e.to_string()),
                None,
            ),
        }
    }

    fn check_journal(&self) -> Option<ValidationCheck> {
        if !self.config.journal.enabled {
            return None;
        }

        let dir = Path::new(&self.config.journal.directory);
        match fs::create_dir_all(dir) {
            Ok(()) => Some(ValidationCheck::pass(
                "Journal",
                ValidationLevel::Warning,
                format!("Actions recorded under {}", dir.display()),
            )),
            Err(e) => Some(ValidationCheck::fail(
                "Journal",
                ValidationLevel::Warning,
                format!("Cannot create {}: {}", dir.display(), e),
            )),
        }
    }
}
