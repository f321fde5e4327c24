//! Client-side request limiting.
//!
//! [`QuotaGate`] caps provider-calling actions per calendar day and
//! persists its counter through a [`UsageStore`]. [`IntervalGuard`] drops
//! count requests that arrive too soon after the previous one. Neither is
//! a security boundary: they keep an interactive user from running up
//! provider costs by accident.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use chrono::{NaiveDate, NaiveDateTime, TimeDelta};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::clock::Clock;
use crate::error::{LlmCountError, Result};

/// Default number of quota-consuming actions per day.
pub const DEFAULT_DAILY_QUOTA: u32 = 100;

/// Default minimum spacing between count requests.
pub const DEFAULT_MIN_INTERVAL_MS: u64 = 3000;

// ---------------------------------------------------------------------------
// Usage record and storage
// ---------------------------------------------------------------------------

/// Requests made on a given day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageRecord {
    pub date: NaiveDate,
    pub count: u32,
}

impl UsageRecord {
    pub fn fresh(date: NaiveDate) -> Self {
        Self { date, count: 0 }
    }
}

/// Persistence for the usage counter.
pub trait UsageStore: Send + Sync {
    /// The stored record, or `None` if nothing has been saved yet.
    fn load(&self) -> Result<Option<UsageRecord>>;

    fn save(&self, record: &UsageRecord) -> Result<()>;
}

/// In-memory store, mostly for tests.
#[derive(Debug, Default)]
pub struct MemoryStore {
    record: Mutex<Option<UsageRecord>>,
}

impl MemoryStore {
    pub fn with_record(record: UsageRecord) -> Self {
        Self {
            record: Mutex::new(Some(record)),
        }
    }
}

impl UsageStore for MemoryStore {
    fn load(&self) -> Result<Option<UsageRecord>> {
        Ok(*self.record.lock().unwrap_or_else(|e| e.into_inner()))
    }

    fn save(&self, record: &UsageRecord) -> Result<()> {
        *self.record.lock().unwrap_or_else(|e| e.into_inner()) = Some(*record);
        Ok(())
    }
}

/// Stores the record as a small JSON file, e.g. `{"date":"2024-05-01","count":3}`.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl UsageStore for JsonFileStore {
    fn load(&self) -> Result<Option<UsageRecord>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let content = std::fs::read_to_string(&self.path).map_err(|e| {
            LlmCountError::io(format!("reading usage file '{}'", self.path.display()), e)
        })?;
        // A corrupt file is treated like a missing one; the next save rewrites it.
        match serde_json::from_str(&content) {
            Ok(record) => Ok(Some(record)),
            Err(e) => {
                debug!(path = %self.path.display(), error = %e, "ignoring unreadable usage file");
                Ok(None)
            }
        }
    }

    fn save(&self, record: &UsageRecord) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                LlmCountError::io(format!("creating directory '{}'", parent.display()), e)
            })?;
        }
        let content = serde_json::to_string(record)
            .map_err(|e| LlmCountError::config_with_source("failed to serialize usage", e))?;
        std::fs::write(&self.path, content).map_err(|e| {
            LlmCountError::io(format!("writing usage file '{}'", self.path.display()), e)
        })
    }
}

// ---------------------------------------------------------------------------
// Daily quota
// ---------------------------------------------------------------------------

/// Daily cap on quota-consuming actions.
pub struct QuotaGate {
    clock: Arc<dyn Clock>,
    store: Box<dyn UsageStore>,
    limit: u32,
}

impl QuotaGate {
    pub fn new(clock: Arc<dyn Clock>, store: Box<dyn UsageStore>, limit: u32) -> Self {
        Self {
            clock,
            store,
            limit,
        }
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    /// Today's usage. A record from an earlier day reads as zero.
    pub fn status(&self) -> Result<UsageRecord> {
        let today = self.clock.today();
        Ok(match self.store.load()? {
            Some(record) if record.date == today => record,
            _ => UsageRecord::fresh(today),
        })
    }

    /// Refuse if today's quota is used up. Does not consume anything.
    pub fn check(&self) -> Result<UsageRecord> {
        let status = self.status()?;
        if status.count >= self.limit {
            return Err(LlmCountError::QuotaExceeded { limit: self.limit });
        }
        Ok(status)
    }

    /// Count one successful quota-consuming action.
    pub fn record_use(&self) -> Result<UsageRecord> {
        let mut status = self.status()?;
        status.count = status.count.saturating_add(1);
        self.store.save(&status)?;
        debug!(date = %status.date, count = status.count, "recorded quota use");
        Ok(status)
    }

    pub fn remaining(&self) -> Result<u32> {
        Ok(self.limit.saturating_sub(self.status()?.count))
    }

    /// Start today's count over.
    pub fn reset(&self) -> Result<()> {
        self.store.save(&UsageRecord::fresh(self.clock.today()))
    }
}

// ---------------------------------------------------------------------------
// Minimum interval
// ---------------------------------------------------------------------------

/// Drops attempts closer together than `min_interval`.
///
/// Dropped attempts are not queued and do not move the window.
#[derive(Debug, Clone)]
pub struct IntervalGuard {
    min_interval: TimeDelta,
    last: Option<NaiveDateTime>,
}

impl IntervalGuard {
    pub fn new(min_interval: TimeDelta) -> Self {
        Self {
            min_interval,
            last: None,
        }
    }

    /// Values beyond what [`TimeDelta`] can hold saturate to its maximum.
    pub fn from_millis(ms: u64) -> Self {
        let window = i64::try_from(ms)
            .ok()
            .and_then(TimeDelta::try_milliseconds)
            .unwrap_or(TimeDelta::MAX);
        Self::new(window)
    }

    /// True if an attempt at `now` may proceed; records it when admitted.
    pub fn admit(&mut self, now: NaiveDateTime) -> bool {
        if let Some(last) = self.last {
            if now - last < self.min_interval {
                return false;
            }
        }
        self.last = Some(now);
        true
    }
}

impl Default for IntervalGuard {
    fn default() -> Self {
        Self::from_millis(DEFAULT_MIN_INTERVAL_MS)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, d).unwrap()
    }

    fn gate(clock: Arc<ManualClock>, store: MemoryStore) -> QuotaGate {
        QuotaGate::new(clock, Box::new(store), DEFAULT_DAILY_QUOTA)
    }

    #[test]
    fn exhausted_quota_refuses_without_incrementing() {
        let clock = Arc::new(ManualClock::at_noon(day(10)));
        let gate = gate(clock, MemoryStore::with_record(UsageRecord {
            date: day(10),
            count: 100,
        }));

        let err = gate.check().unwrap_err();
        assert!(matches!(err, LlmCountError::QuotaExceeded { limit: 100 }));
        assert_eq!(gate.status().unwrap().count, 100);
    }

    #[test]
    fn new_day_resets_count() {
        let clock = Arc::new(ManualClock::at_noon(day(11)));
        let gate = gate(clock, MemoryStore::with_record(UsageRecord {
            date: day(10),
            count: 100,
        }));

        let status = gate.check().unwrap();
        assert_eq!(status, UsageRecord::fresh(day(11)));
        let after = gate.record_use().unwrap();
        assert_eq!(after.count, 1);
        assert_eq!(after.date, day(11));
    }

    #[test]
    fn record_use_persists() {
        let clock = Arc::new(ManualClock::at_noon(day(1)));
        let gate = gate(clock, MemoryStore::default());
        gate.record_use().unwrap();
        gate.record_use().unwrap();
        assert_eq!(gate.status().unwrap().count, 2);
        assert_eq!(gate.remaining().unwrap(), 98);
    }

    #[test]
    fn rollover_at_midnight() {
        let clock = Arc::new(ManualClock::at_noon(day(1)));
        let gate = gate(clock.clone(), MemoryStore::default());
        gate.record_use().unwrap();
        clock.advance(TimeDelta::hours(12));
        assert_eq!(gate.status().unwrap(), UsageRecord::fresh(day(2)));
    }

    #[test]
    fn reset_clears_today() {
        let clock = Arc::new(ManualClock::at_noon(day(3)));
        let gate = gate(clock, MemoryStore::default());
        gate.record_use().unwrap();
        gate.reset().unwrap();
        assert_eq!(gate.status().unwrap().count, 0);
    }

    #[test]
    fn json_file_store_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("nested").join("usage.json"));
        assert_eq!(store.load().unwrap(), None);

        let record = UsageRecord {
            date: day(7),
            count: 42,
        };
        store.save(&record).unwrap();
        assert_eq!(store.load().unwrap(), Some(record));

        let raw = std::fs::read_to_string(store.path()).unwrap();
        assert!(raw.contains("\"date\":\"2024-06-07\""));
    }

    #[test]
    fn json_file_store_ignores_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("usage.json");
        std::fs::write(&path, "not json").unwrap();
        assert_eq!(JsonFileStore::new(path).load().unwrap(), None);
    }

    #[test]
    fn interval_guard_drops_early_attempts() {
        let start = day(1).and_hms_opt(9, 0, 0).unwrap();
        let mut guard = IntervalGuard::default();

        assert!(guard.admit(start));
        assert!(!guard.admit(start + TimeDelta::milliseconds(500)));
        // The dropped attempt did not move the window.
        assert!(guard.admit(start + TimeDelta::milliseconds(3000)));
    }

    #[test]
    fn interval_guard_saturates_huge_windows() {
        let start = day(1).and_hms_opt(9, 0, 0).unwrap();
        let mut guard = IntervalGuard::from_millis(u64::MAX);

        assert!(guard.admit(start));
        assert!(!guard.admit(start + TimeDelta::days(365)));
    }
}
