// Core watcher logic modules

pub mod types;
pub mod policy;
pub mod schedule;
pub mod poll_loop;
pub mod shutdown;

// Re-export commonly used types
pub use types::{
    AccountSnapshot, ActionDecision, HoldReason, PolicyConfig, PriceObservation, RunState, Side,
    StakeTarget,
};
pub use policy::ConditionalStakePolicy;
pub use schedule::{LoopPhase, SleepSchedule};
pub use poll_loop::{LoopState, PollLoop, RunSummary, StopReason};
pub use shutdown::{listen_for_interrupt, shutdown_channel, ShutdownSignal, ShutdownTrigger};
