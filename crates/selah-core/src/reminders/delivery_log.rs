//! Per-day delivery deduplication.
//!
//! The log is the sole idempotency guarantee: a reminder fires at most
//! once per (id, calendar day) no matter how often the engine is invoked.
//! It persists as one JSON object mapping reminder id to the last date
//! that reminder was delivered. Because a reminder can fire at most once
//! per day, "was it delivered on `date`" is just "does the recorded date
//! equal `date`", and each delivery supersedes the previous record for
//! that id.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use log::warn;

use crate::error::StoreError;
use crate::storage::SettingsStore;

pub(crate) const DELIVERED_KEY: &str = "reminders/delivered";

/// Records older than this many days are swept on the next write. Purely
/// housekeeping; correctness never depends on pruning.
const RETENTION_DAYS: i64 = 2;

/// Idempotency guard keyed by (reminder id, calendar date).
#[derive(Debug, Default)]
pub struct DeliveryLog {
    entries: BTreeMap<String, NaiveDate>,
}

impl DeliveryLog {
    /// Load the log from the store.
    ///
    /// A missing key yields an empty log. An unreadable or undecodable
    /// value also yields an empty log, with a warning: delivery checks
    /// must keep working, and the worst case is one duplicate delivery
    /// before the next successful write repairs the record.
    pub fn load(store: &impl SettingsStore) -> Self {
        let raw = match store.get(DELIVERED_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Self::default(),
            Err(e) => {
                warn!("could not read delivery log, starting empty: {e}");
                return Self::default();
            }
        };
        match serde_json::from_str(&raw) {
            Ok(entries) => Self { entries },
            Err(e) => {
                warn!("delivery log is malformed, starting empty: {e}");
                Self::default()
            }
        }
    }

    /// Was `id` already delivered on `date`?
    pub fn already_delivered(&self, id: &str, date: NaiveDate) -> bool {
        self.entries.get(id) == Some(&date)
    }

    /// Record a delivery and persist the log.
    ///
    /// Idempotent: marking the same (id, date) twice leaves the same
    /// state as marking it once. Stale records beyond the retention
    /// window are dropped on the way out.
    ///
    /// # Errors
    ///
    /// Returns an error if the updated log cannot be written back. The
    /// in-memory record is kept either way, so a repeated check within
    /// the same invocation still sees the delivery.
    pub fn mark_delivered(
        &mut self,
        store: &impl SettingsStore,
        id: &str,
        date: NaiveDate,
    ) -> Result<(), StoreError> {
        self.entries.insert(id.to_string(), date);
        self.entries
            .retain(|_, recorded| date.signed_duration_since(*recorded).num_days() <= RETENTION_DAYS);
        let json = serde_json::to_string(&self.entries).map_err(|source| StoreError::Encode {
            key: DELIVERED_KEY.to_string(),
            source,
        })?;
        store.set(DELIVERED_KEY, &json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn empty_log_reports_nothing_delivered() {
        let store = MemoryStore::new();
        let log = DeliveryLog::load(&store);
        assert!(!log.already_delivered("qt", date(2024, 1, 1)));
    }

    #[test]
    fn mark_then_check() {
        let store = MemoryStore::new();
        let mut log = DeliveryLog::load(&store);
        log.mark_delivered(&store, "qt", date(2024, 1, 1)).unwrap();
        assert!(log.already_delivered("qt", date(2024, 1, 1)));
        assert!(!log.already_delivered("qt", date(2024, 1, 2)));
        assert!(!log.already_delivered("prayer", date(2024, 1, 1)));
    }

    #[test]
    fn marks_persist_across_loads() {
        let store = MemoryStore::new();
        let mut log = DeliveryLog::load(&store);
        log.mark_delivered(&store, "qt", date(2024, 1, 1)).unwrap();

        let reloaded = DeliveryLog::load(&store);
        assert!(reloaded.already_delivered("qt", date(2024, 1, 1)));
    }

    #[test]
    fn marking_twice_is_idempotent() {
        let store = MemoryStore::new();
        let mut log = DeliveryLog::load(&store);
        log.mark_delivered(&store, "qt", date(2024, 1, 1)).unwrap();
        let first = store.get(DELIVERED_KEY).unwrap();
        log.mark_delivered(&store, "qt", date(2024, 1, 1)).unwrap();
        assert_eq!(store.get(DELIVERED_KEY).unwrap(), first);
    }

    #[test]
    fn newer_delivery_supersedes_older_date() {
        let store = MemoryStore::new();
        let mut log = DeliveryLog::load(&store);
        log.mark_delivered(&store, "qt", date(2024, 1, 1)).unwrap();
        log.mark_delivered(&store, "qt", date(2024, 1, 2)).unwrap();
        assert!(!log.already_delivered("qt", date(2024, 1, 1)));
        assert!(log.already_delivered("qt", date(2024, 1, 2)));
    }

    #[test]
    fn stale_records_are_pruned_on_write() {
        let store = MemoryStore::new();
        let mut log = DeliveryLog::load(&store);
        log.mark_delivered(&store, "old", date(2024, 1, 1)).unwrap();
        log.mark_delivered(&store, "fresh", date(2024, 1, 5)).unwrap();

        let reloaded = DeliveryLog::load(&store);
        assert!(!reloaded.already_delivered("old", date(2024, 1, 1)));
        assert!(reloaded.already_delivered("fresh", date(2024, 1, 5)));
    }

    #[test]
    fn malformed_stored_log_starts_empty() {
        let store = MemoryStore::new();
        store.set(DELIVERED_KEY, "not json").unwrap();
        let mut log = DeliveryLog::load(&store);
        assert!(!log.already_delivered("qt", date(2024, 1, 1)));
        // The next write repairs the stored value.
        log.mark_delivered(&store, "qt", date(2024, 1, 1)).unwrap();
        let reloaded = DeliveryLog::load(&store);
        assert!(reloaded.already_delivered("qt", date(2024, 1, 1)));
    }
}
