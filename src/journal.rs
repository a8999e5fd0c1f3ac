// Append-only journal of attempted actions, one JSON document per line

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use uuid::Uuid;

use crate::core::types::Side;
use crate::error::{WatcherError, WatcherResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionOutcome {
    DryRun,
    Confirmed,
    /// Backend gave no signal; the liquid balance went up afterwards
    ConfirmedByBalance,
    Rejected,
    Unconfirmed,
    Failed,
}

impl ActionOutcome {
    /// Outcomes that count against the action budget
    pub fn counts(&self) -> bool {
        matches!(
            self,
            ActionOutcome::DryRun | ActionOutcome::Confirmed | ActionOutcome::ConfirmedByBalance
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionRecord {
    pub id: Uuid,
    pub recorded_at: DateTime<Utc>,
    pub side: Side,
    pub netuid: u16,
    pub hotkey: String,
    pub amount: Decimal,
    pub price: Decimal,
    pub dry_run: bool,
    pub outcome: ActionOutcome,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl ActionRecord {
    pub fn new(
        side: Side,
        netuid: u16,
        hotkey: &str,
        amount: Decimal,
        price: Decimal,
        dry_run: bool,
        outcome: ActionOutcome,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            recorded_at: Utc::now(),
            side,
            netuid,
            hotkey: hotkey.to_string(),
            amount,
            price,
            dry_run,
            outcome,
            detail: None,
        }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}

#[derive(Debug, Clone, Default)]
pub struct ActionJournal {
    path: Option<PathBuf>,
}

impl ActionJournal {
    /// Journal that drops every record
    pub fn disabled() -> Self {
        Self { path: None }
    }

    /// One file per run: `<dir>/actions_<timestamp>.jsonl`
    pub fn in_directory<P: AsRef<Path>>(dir: P) -> Self {
        let timestamp = Utc::now().format("%Y%m%d_%H%M%S");
        Self {
            path: Some(dir.as_ref().join(format!("actions_{}.jsonl", timestamp))),
        }
    }

    pub fn at_path<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: Some(path.as_ref().to_path_buf()),
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn append(&self, record: &ActionRecord) -> WatcherResult<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| WatcherError::Journal(format!("{}: {}", parent.display(), e)))?;
        }

        let line = serde_json::to_string(record)?;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|e| WatcherError::Journal(format!("{}: {}", path.display(), e)))?;
        writeln!(file, "{}", line)
            .map_err(|e| WatcherError::Journal(format!("{}: {}", path.display(), e)))?;

        Ok(())
    }

    /// Read every record back, oldest first
    pub fn read_all(&self) -> WatcherResult<Vec<ActionRecord>> {
        let Some(path) = &self.path else {
            return Ok(Vec::new());
        };
        if !path.exists() {
            return Ok(Vec::new());
        }

        let content = fs::read_to_string(path)?;
        content
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(|line| serde_json::from_str(line).map_err(WatcherError::from))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use tempfile::TempDir;

    #[test]
    fn test_append_and_read_back() {
        let temp = TempDir::new().unwrap();
        let journal = ActionJournal::in_directory(temp.path().join("logs/actions"));

        let first = ActionRecord::new(Side::Stake, 117, "5Hot", dec!(0.5), dec!(0.0010), true, ActionOutcome::DryRun);
        let second = ActionRecord::new(Side::Stake, 117, "5Hot", dec!(0.5), dec!(0.0011), false, ActionOutcome::Rejected)
            .with_detail("slippage");
        journal.append(&first).unwrap();
        journal.append(&second).unwrap();

        let records = journal.read_all().unwrap();
        assert_eq!(records, vec![first, second]);
        assert!(journal.path().unwrap().to_string_lossy().ends_with(".jsonl"));
    }

    #[test]
    fn test_disabled_journal_is_noop() {
        let journal = ActionJournal::disabled();
        let record = ActionRecord::new(Side::Unstake, 117, "5V", dec!(10), dec!(0.002), false, ActionOutcome::Confirmed);
        journal.append(&record).unwrap();
        assert!(journal.read_all().unwrap().is_empty());
    }

    #[test]
    fn test_outcomes_that_count() {
        assert!(ActionOutcome::DryRun.counts());
        assert!(ActionOutcome::ConfirmedByBalance.counts());
        assert!(!ActionOutcome::Unconfirmed.counts());
        assert!(!ActionOutcome::Failed.counts());
    }
}
