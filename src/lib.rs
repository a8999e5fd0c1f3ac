// Subnet Stake Watcher Library
//
// Price-triggered conditional staking for subnet alpha: a pure decision
// policy, the poll loop that drives it, and the chain client seam it talks to.

pub mod core;
pub mod clients;
pub mod config;
pub mod error;       // Unified error handling
pub mod journal;     // Action audit log
pub mod validation;  // Pre-flight validation
pub mod wallet;
pub mod watch_args;  // buy / sell command line arguments

// Re-export core types
pub use crate::core::{
    AccountSnapshot, ActionDecision, ConditionalStakePolicy, HoldReason, LoopPhase, LoopState,
    PolicyConfig, PollLoop, PriceObservation, RunState, RunSummary, ShutdownSignal,
    ShutdownTrigger, Side, SleepSchedule, StakeTarget, StopReason,
};
pub use crate::core::{listen_for_interrupt, shutdown_channel};

// Re-export error types
pub use error::{WatcherError, WatcherResult};

// Re-export validation types
pub use validation::{PreFlight, PreFlightValidator, ValidationCheck, ValidationLevel, ValidationResult};

// Re-export client types
pub use clients::{ChainClient, HttpChainClient, StakeRequest, SubmitOptions, SubmitOutcome};

// Re-export configuration
pub use config::{BuyDefaults, ChainConfig, Config, ConfigError, JournalConfig, SellDefaults};

pub use journal::{ActionJournal, ActionOutcome, ActionRecord};
pub use wallet::{list_wallet_names, match_registered, RegisteredWallet, Wallet};
pub use watch_args::{BuyArgs, SellArgs, WatchPlan};
