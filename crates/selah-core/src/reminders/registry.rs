//! Reminder registry: normalizes stored configuration into descriptors.
//!
//! Two kinds of reminders live in the store. Each fixed category has its
//! own record under `reminders/category/<slug>`; per-note reminders share
//! one JSON map under `reminders/notes`, keyed by note id. Listing reads
//! everything fresh from the store on every call, since configuration may
//! have changed between engine invocations.
//!
//! Decoding is deliberately forgiving. A missing field falls back to its
//! safe default (recurrence to daily, enabled to off), one undecodable
//! note entry is skipped without dropping the rest, and a malformed
//! category record degrades to "disabled at the default time". Times are
//! not revalidated on the way out; an out-of-range stored time never
//! matches any minute, so the reminder simply never fires.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use log::warn;
use serde::{Deserialize, Serialize};

use crate::error::StoreError;
use crate::reminders::{Category, Payload, Reminder, Repeat, TimeOfDay};
use crate::storage::SettingsStore;

pub(crate) const NOTES_KEY: &str = "reminders/notes";

fn category_key(category: Category) -> String {
    format!("reminders/category/{}", category.slug())
}

/// Stored form of a fixed category reminder.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
struct CategoryRecord {
    #[serde(default)]
    enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    hour: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    minute: Option<u8>,
}

/// Stored form of a per-note reminder.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct NoteRecord {
    #[serde(default)]
    enabled: bool,
    #[serde(default)]
    hour: u8,
    #[serde(default)]
    minute: u8,
    #[serde(default)]
    repeat: Repeat,
    #[serde(default)]
    created_on: Option<NaiveDate>,
    #[serde(default)]
    title: String,
    #[serde(default)]
    body: String,
}

impl NoteRecord {
    fn from_reminder(reminder: &Reminder) -> Self {
        Self {
            enabled: reminder.enabled,
            hour: reminder.time.hour,
            minute: reminder.time.minute,
            repeat: reminder.repeat,
            created_on: reminder.created_on,
            title: reminder.payload.title.clone(),
            body: reminder.payload.body.clone(),
        }
    }

    fn into_reminder(self, id: String) -> Reminder {
        Reminder {
            id,
            enabled: self.enabled,
            time: TimeOfDay {
                hour: self.hour,
                minute: self.minute,
            },
            repeat: self.repeat,
            created_on: self.created_on,
            payload: Payload {
                title: self.title,
                body: self.body,
            },
        }
    }
}

/// Reads and writes reminder configuration through a [`SettingsStore`].
///
/// Mutations are read-modify-write against the store, so the registry
/// assumes it is the only writer while an operation runs.
pub struct ReminderRegistry<'a, S> {
    store: &'a S,
}

impl<'a, S: SettingsStore> ReminderRegistry<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// All descriptors: the three fixed categories followed by every
    /// per-note reminder, fresh from the store.
    ///
    /// Never fails. A category that was never configured lists as
    /// disabled at its default time.
    pub fn list(&self) -> Vec<Reminder> {
        let mut reminders: Vec<Reminder> =
            Category::ALL.into_iter().map(|c| self.category(c)).collect();
        reminders.extend(
            self.note_records()
                .into_iter()
                .map(|(id, record)| record.into_reminder(id)),
        );
        reminders
    }

    /// The descriptor for one fixed category.
    pub fn category(&self, category: Category) -> Reminder {
        let record = self.category_record(category);
        let default_time = category.default_time();
        Reminder {
            id: category.slug().to_string(),
            enabled: record.enabled,
            time: TimeOfDay {
                hour: record.hour.unwrap_or(default_time.hour),
                minute: record.minute.unwrap_or(default_time.minute),
            },
            repeat: Repeat::Daily,
            created_on: None,
            payload: category.payload(),
        }
    }

    /// Per-note descriptors only.
    pub fn note_reminders(&self) -> Vec<Reminder> {
        self.note_records()
            .into_iter()
            .map(|(id, record)| record.into_reminder(id))
            .collect()
    }

    /// Turn a fixed category on or off, keeping its configured time.
    pub fn set_category_enabled(
        &self,
        category: Category,
        enabled: bool,
    ) -> Result<(), StoreError> {
        let mut record = self.category_record(category);
        record.enabled = enabled;
        self.save_category(category, &record)
    }

    /// Change a fixed category's delivery time, keeping its enabled flag.
    pub fn set_category_time(&self, category: Category, time: TimeOfDay) -> Result<(), StoreError> {
        let mut record = self.category_record(category);
        record.hour = Some(time.hour);
        record.minute = Some(time.minute);
        self.save_category(category, &record)
    }

    /// Create or replace the reminder attached to a note. The reminder's
    /// id is the note id.
    pub fn upsert_note_reminder(&self, reminder: &Reminder) -> Result<(), StoreError> {
        let mut records = self.note_records();
        records.insert(reminder.id.clone(), NoteRecord::from_reminder(reminder));
        self.save_notes(&records)
    }

    /// Remove a note's reminder. Returns whether one was present.
    pub fn remove_note_reminder(&self, note_id: &str) -> Result<bool, StoreError> {
        let mut records = self.note_records();
        if records.remove(note_id).is_none() {
            return Ok(false);
        }
        self.save_notes(&records)?;
        Ok(true)
    }

    /// Disable a reminder by descriptor id.
    ///
    /// Note ids are resolved first, then category slugs. Unknown ids are
    /// a no-op: the engine calls this to consume one-shots, and a
    /// descriptor removed between listing and delivery is not an error.
    pub fn disable(&self, id: &str) -> Result<(), StoreError> {
        let mut records = self.note_records();
        if let Some(record) = records.get_mut(id) {
            record.enabled = false;
            return self.save_notes(&records);
        }
        if let Some(category) = Category::from_slug(id) {
            return self.set_category_enabled(category, false);
        }
        Ok(())
    }

    fn category_record(&self, category: Category) -> CategoryRecord {
        let key = category_key(category);
        let raw = match self.store.get(&key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return CategoryRecord::default(),
            Err(e) => {
                warn!("could not read '{key}', listing {category} as disabled: {e}");
                return CategoryRecord::default();
            }
        };
        serde_json::from_str(&raw).unwrap_or_else(|e| {
            warn!("malformed record under '{key}', listing {category} as disabled: {e}");
            CategoryRecord::default()
        })
    }

    fn save_category(&self, category: Category, record: &CategoryRecord) -> Result<(), StoreError> {
        let key = category_key(category);
        let json = serde_json::to_string(record).map_err(|source| StoreError::Encode {
            key: key.clone(),
            source,
        })?;
        self.store.set(&key, &json)
    }

    fn note_records(&self) -> BTreeMap<String, NoteRecord> {
        let raw = match self.store.get(NOTES_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return BTreeMap::new(),
            Err(e) => {
                warn!("could not read '{NOTES_KEY}', listing no note reminders: {e}");
                return BTreeMap::new();
            }
        };
        let values: BTreeMap<String, serde_json::Value> = match serde_json::from_str(&raw) {
            Ok(values) => values,
            Err(e) => {
                warn!("note reminder map is malformed, listing no note reminders: {e}");
                return BTreeMap::new();
            }
        };
        let mut records = BTreeMap::new();
        for (id, value) in values {
            match serde_json::from_value::<NoteRecord>(value) {
                Ok(record) => {
                    records.insert(id, record);
                }
                Err(e) => warn!("skipping malformed reminder for note '{id}': {e}"),
            }
        }
        records
    }

    fn save_notes(&self, records: &BTreeMap<String, NoteRecord>) -> Result<(), StoreError> {
        let json = serde_json::to_string(records).map_err(|source| StoreError::Encode {
            key: NOTES_KEY.to_string(),
            source,
        })?;
        self.store.set(NOTES_KEY, &json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    fn note(id: &str, repeat: Repeat) -> Reminder {
        Reminder {
            id: id.to_string(),
            enabled: true,
            time: TimeOfDay {
                hour: 18,
                minute: 30,
            },
            repeat,
            created_on: NaiveDate::from_ymd_opt(2024, 1, 1),
            payload: Payload {
                title: "Revisit this entry".into(),
                body: String::new(),
            },
        }
    }

    #[test]
    fn empty_store_lists_three_disabled_categories() {
        let store = MemoryStore::new();
        let registry = ReminderRegistry::new(&store);
        let listed = registry.list();
        assert_eq!(listed.len(), 3);
        assert!(listed.iter().all(|r| !r.enabled));
        assert_eq!(listed[0].id, "quiet_time");
        assert_eq!(listed[0].time, TimeOfDay { hour: 8, minute: 0 });
        assert_eq!(listed[1].id, "prayer");
        assert_eq!(listed[2].id, "gratitude");
        assert!(listed.iter().all(|r| r.repeat == Repeat::Daily));
    }

    #[test]
    fn category_mutations_preserve_each_other() {
        let store = MemoryStore::new();
        let registry = ReminderRegistry::new(&store);
        registry
            .set_category_time(Category::QuietTime, TimeOfDay { hour: 6, minute: 45 })
            .unwrap();
        registry
            .set_category_enabled(Category::QuietTime, true)
            .unwrap();

        let r = registry.category(Category::QuietTime);
        assert!(r.enabled);
        assert_eq!(r.time, TimeOfDay { hour: 6, minute: 45 });
    }

    #[test]
    fn enabling_unconfigured_category_keeps_default_time() {
        let store = MemoryStore::new();
        let registry = ReminderRegistry::new(&store);
        registry
            .set_category_enabled(Category::Gratitude, true)
            .unwrap();
        let r = registry.category(Category::Gratitude);
        assert!(r.enabled);
        assert_eq!(r.time, TimeOfDay { hour: 21, minute: 0 });
    }

    #[test]
    fn note_reminder_upsert_list_remove() {
        let store = MemoryStore::new();
        let registry = ReminderRegistry::new(&store);
        registry.upsert_note_reminder(&note("n1", Repeat::Once)).unwrap();
        registry.upsert_note_reminder(&note("n2", Repeat::Daily)).unwrap();

        assert_eq!(registry.list().len(), 5);
        let notes = registry.note_reminders();
        assert_eq!(notes.len(), 2);
        assert_eq!(notes[0].id, "n1");
        assert_eq!(notes[0].repeat, Repeat::Once);

        assert!(registry.remove_note_reminder("n1").unwrap());
        assert!(!registry.remove_note_reminder("n1").unwrap());
        assert_eq!(registry.note_reminders().len(), 1);
    }

    #[test]
    fn disable_resolves_note_ids_then_category_slugs() {
        let store = MemoryStore::new();
        let registry = ReminderRegistry::new(&store);
        registry.upsert_note_reminder(&note("n1", Repeat::Once)).unwrap();
        registry.set_category_enabled(Category::Prayer, true).unwrap();

        registry.disable("n1").unwrap();
        assert!(!registry.note_reminders()[0].enabled);

        registry.disable("prayer").unwrap();
        assert!(!registry.category(Category::Prayer).enabled);

        // Unknown ids are a quiet no-op.
        registry.disable("gone").unwrap();
    }

    #[test]
    fn missing_recurrence_field_decodes_as_daily() {
        let store = MemoryStore::new();
        store
            .set(
                NOTES_KEY,
                r#"{"n1":{"enabled":true,"hour":7,"minute":15,"title":"Morning read"}}"#,
            )
            .unwrap();
        let registry = ReminderRegistry::new(&store);
        let notes = registry.note_reminders();
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].repeat, Repeat::Daily);
        assert!(notes[0].enabled);
    }

    #[test]
    fn missing_enabled_field_decodes_as_disabled() {
        let store = MemoryStore::new();
        store
            .set(NOTES_KEY, r#"{"n1":{"hour":7,"minute":15}}"#)
            .unwrap();
        let registry = ReminderRegistry::new(&store);
        assert!(!registry.note_reminders()[0].enabled);
    }

    #[test]
    fn one_bad_note_entry_does_not_drop_the_rest() {
        let store = MemoryStore::new();
        store
            .set(
                NOTES_KEY,
                r#"{"bad":42,"good":{"enabled":true,"hour":9,"minute":0}}"#,
            )
            .unwrap();
        let registry = ReminderRegistry::new(&store);
        let notes = registry.note_reminders();
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].id, "good");
    }

    #[test]
    fn unreadable_note_map_still_lists_categories() {
        let store = MemoryStore::new();
        store.set(NOTES_KEY, "definitely not json").unwrap();
        let registry = ReminderRegistry::new(&store);
        assert_eq!(registry.list().len(), 3);
    }

    #[test]
    fn malformed_category_record_degrades_to_disabled_default() {
        let store = MemoryStore::new();
        store
            .set("reminders/category/quiet_time", "[1,2,3]")
            .unwrap();
        let registry = ReminderRegistry::new(&store);
        let r = registry.category(Category::QuietTime);
        assert!(!r.enabled);
        assert_eq!(r.time, TimeOfDay { hour: 8, minute: 0 });
    }
}
