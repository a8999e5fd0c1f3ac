// Sleep durations per loop phase

use std::time::Duration;

/// Where the loop is when it goes to sleep
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopPhase {
    /// Price outside the region of interest
    Idle,
    /// Price at or past the interest level, or an action was just attempted
    Active,
    /// The price query failed
    Retry,
}

/// Maps each phase to how long the loop sleeps before the next cycle
#[derive(Debug, Clone, PartialEq)]
pub struct SleepSchedule {
    pub idle: Duration,
    pub active: Duration,
    pub retry: Duration,
}

impl SleepSchedule {
    /// Long-poll cadence: the same interval in every phase
    pub fn fixed(interval: Duration) -> Self {
        Self {
            idle: interval,
            active: interval,
            retry: interval,
        }
    }

    /// Tight cadence for the sell watcher: shorter sleeps while the price is
    /// interesting, the idle sleep after errors
    pub fn high_frequency(active: Duration, idle: Duration) -> Self {
        Self {
            idle,
            active,
            retry: idle,
        }
    }

    pub fn sleep_for(&self, phase: LoopPhase) -> Duration {
        match phase {
            LoopPhase::Idle => self.idle,
            LoopPhase::Active => self.active,
            LoopPhase::Retry => self.retry,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_schedule() {
        let schedule = SleepSchedule::fixed(Duration::from_secs(60));
        assert_eq!(schedule.sleep_for(LoopPhase::Idle), Duration::from_secs(60));
        assert_eq!(schedule.sleep_for(LoopPhase::Active), Duration::from_secs(60));
        assert_eq!(schedule.sleep_for(LoopPhase::Retry), Duration::from_secs(60));
    }

    #[test]
    fn test_high_frequency_is_asymmetric() {
        let schedule = SleepSchedule::high_frequency(Duration::from_millis(50), Duration::from_millis(100));
        assert_eq!(schedule.sleep_for(LoopPhase::Active), Duration::from_millis(50));
        assert_eq!(schedule.sleep_for(LoopPhase::Idle), Duration::from_millis(100));
        assert_eq!(schedule.sleep_for(LoopPhase::Retry), Duration::from_millis(100));
    }
}
