use crate::data::app_settings::AppSettings;
use crate::data::calendar::{CalendarCollection, CalendarId, CalendarPatch, CalendarRecord};
use crate::data::persistence::{get_file_path, Persistable};
use anyhow::Result;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum StoreError {
    #[error("calendar {0} not found")]
    NotFound(CalendarId),
}

/// Authoritative owner of the calendar collection for a session. Every
/// mutation is mirrored to calendars.json immediately (write-through); a
/// failed write is a warning, not an error; the in-memory state wins.
pub struct Store {
    collection: CalendarCollection,
    /// Session state only, never serialized.
    active: Option<CalendarId>,
    /// Explicit data directory; `None` uses the global one set by main().
    dir: Option<PathBuf>,
}

impl Store {
    /// Read calendars.json from the global data directory. A missing or
    /// unparseable file falls back to the seed collection, never an error.
    pub fn load() -> Self {
        let collection = match get_file_path(CalendarCollection::filename()) {
            Ok(path) if !path.exists() => Self::seed_collection(),
            _ => match CalendarCollection::load() {
                Ok(c) => c,
                Err(e) => {
                    eprintln!("warning: {e:#}; starting from the seed calendar");
                    Self::seed_collection()
                }
            },
        };
        Self::from_collection(collection, None)
    }

    /// Same as `load`, against an explicit directory.
    pub fn load_from(dir: &Path) -> Self {
        let path = dir.join(CalendarCollection::filename());
        let collection = if !path.exists() {
            Self::seed_collection()
        } else {
            match CalendarCollection::load_from(dir) {
                Ok(c) => c,
                Err(e) => {
                    eprintln!("warning: {e:#}; starting from the seed calendar");
                    Self::seed_collection()
                }
            }
        };
        Self::from_collection(collection, Some(dir.to_path_buf()))
    }

    fn from_collection(collection: CalendarCollection, dir: Option<PathBuf>) -> Self {
        let active = collection.first_id();
        Store {
            collection,
            active,
            dir,
        }
    }

    /// One unlocked default calendar, matching what a first launch shows.
    pub fn seed_collection() -> CalendarCollection {
        CalendarCollection {
            calendars: vec![CalendarRecord::new(1, "Default", "📅", "#4CAF50")],
        }
    }

    pub fn calendars(&self) -> &[CalendarRecord] {
        &self.collection.calendars
    }

    pub fn get(&self, id: CalendarId) -> Option<&CalendarRecord> {
        self.collection.get(id)
    }

    pub fn active_id(&self) -> Option<CalendarId> {
        self.active
    }

    pub fn active(&self) -> Option<&CalendarRecord> {
        self.active.and_then(|id| self.collection.get(id))
    }

    pub fn set_active(&mut self, id: CalendarId) -> Result<(), StoreError> {
        if self.collection.get(id).is_none() {
            return Err(StoreError::NotFound(id));
        }
        self.active = Some(id);
        Ok(())
    }

    /// Appends a calendar built from the settings' default field values,
    /// makes it active, and returns its id.
    pub fn add(&mut self, settings: &AppSettings) -> CalendarId {
        let id = self.collection.next_id();
        self.collection.calendars.push(CalendarRecord::new(
            id,
            &settings.default_name,
            &settings.default_emoji,
            &settings.default_color,
        ));
        self.active = Some(id);
        self.write_through();
        id
    }

    pub fn update(&mut self, id: CalendarId, patch: CalendarPatch) -> Result<(), StoreError> {
        let record = self
            .collection
            .get_mut(id)
            .ok_or(StoreError::NotFound(id))?;
        record.apply(patch);
        self.write_through();
        Ok(())
    }

    /// Removing the active calendar re-activates the first remaining one in
    /// collection order, or none when the collection is now empty.
    pub fn remove(&mut self, id: CalendarId) -> Result<(), StoreError> {
        if self.collection.get(id).is_none() {
            return Err(StoreError::NotFound(id));
        }
        self.collection.calendars.retain(|c| c.id != id);
        if self.active == Some(id) {
            self.active = self.collection.first_id();
        }
        self.write_through();
        Ok(())
    }

    /// Serializes the whole collection to calendars.json.
    pub fn persist(&self) -> Result<()> {
        match &self.dir {
            Some(dir) => self.collection.save_to(dir),
            None => self.collection.save(),
        }
    }

    fn write_through(&self) {
        if let Err(e) = self.persist() {
            eprintln!("warning: failed to persist calendars: {e:#}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::collections::BTreeMap;
    use tempfile::TempDir;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_load_from_missing_file_seeds_default() {
        let tmp = TempDir::new().unwrap();
        let store = Store::load_from(tmp.path());
        assert_eq!(store.calendars().len(), 1);
        let seed = &store.calendars()[0];
        assert_eq!(seed.id, 1);
        assert_eq!(seed.name, "Default");
        assert!(!seed.locked);
        assert!(seed.selected_days.is_empty());
        assert_eq!(store.active_id(), Some(1));
    }

    #[test]
    fn test_load_from_corrupt_file_seeds_default() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(tmp.path().join("calendars.json"), "not json at all").unwrap();
        let store = Store::load_from(tmp.path());
        assert_eq!(store.calendars().len(), 1);
        assert_eq!(store.calendars()[0].name, "Default");
    }

    #[test]
    fn test_load_from_preserves_persisted_empty_collection() {
        // An explicitly persisted empty collection is not the same as a
        // missing file: it stays empty, with no active calendar.
        let tmp = TempDir::new().unwrap();
        std::fs::write(tmp.path().join("calendars.json"), r#"{"calendars":[]}"#).unwrap();
        let store = Store::load_from(tmp.path());
        assert!(store.calendars().is_empty());
        assert!(store.active_id().is_none());
    }

    #[test]
    fn test_add_yields_distinct_ids_and_grows_collection() {
        let tmp = TempDir::new().unwrap();
        let mut store = Store::load_from(tmp.path());
        let settings = AppSettings::default();
        let before = store.calendars().len();
        let mut ids = vec![store.calendars()[0].id];
        for _ in 0..5 {
            ids.push(store.add(&settings));
        }
        assert_eq!(store.calendars().len(), before + 5);
        let mut deduped = ids.clone();
        deduped.sort_unstable();
        deduped.dedup();
        assert_eq!(deduped.len(), ids.len());
    }

    #[test]
    fn test_add_uses_settings_defaults_and_activates() {
        let tmp = TempDir::new().unwrap();
        let mut store = Store::load_from(tmp.path());
        let settings = AppSettings {
            default_name: "Habit".to_string(),
            default_emoji: "🏃".to_string(),
            default_color: "#2196F3".to_string(),
            ..Default::default()
        };
        let id = store.add(&settings);
        assert_eq!(store.active_id(), Some(id));
        let added = store.get(id).unwrap();
        assert_eq!(added.name, "Habit");
        assert_eq!(added.emoji, "🏃");
        assert_eq!(added.color, "#2196F3");
    }

    #[test]
    fn test_update_unknown_id_reports_not_found() {
        let tmp = TempDir::new().unwrap();
        let mut store = Store::load_from(tmp.path());
        let result = store.update(99, CalendarPatch::default());
        assert_eq!(result, Err(StoreError::NotFound(99)));
    }

    #[test]
    fn test_update_merges_fields() {
        let tmp = TempDir::new().unwrap();
        let mut store = Store::load_from(tmp.path());
        store
            .update(
                1,
                CalendarPatch {
                    name: Some("Runs".to_string()),
                    locked: Some(true),
                    ..Default::default()
                },
            )
            .unwrap();
        let c = store.get(1).unwrap();
        assert_eq!(c.name, "Runs");
        assert!(c.locked);
        assert_eq!(c.emoji, "📅");
    }

    #[test]
    fn test_remove_unknown_id_reports_not_found() {
        let tmp = TempDir::new().unwrap();
        let mut store = Store::load_from(tmp.path());
        assert_eq!(store.remove(42), Err(StoreError::NotFound(42)));
        assert_eq!(store.calendars().len(), 1);
    }

    #[test]
    fn test_remove_active_reactivates_first_remaining() {
        let tmp = TempDir::new().unwrap();
        let mut store = Store::load_from(tmp.path());
        let settings = AppSettings::default();
        let second = store.add(&settings);
        assert_eq!(store.active_id(), Some(second));
        store.remove(second).unwrap();
        assert_eq!(store.active_id(), Some(1));
    }

    #[test]
    fn test_remove_inactive_keeps_active() {
        let tmp = TempDir::new().unwrap();
        let mut store = Store::load_from(tmp.path());
        let settings = AppSettings::default();
        let second = store.add(&settings);
        store.remove(1).unwrap();
        assert_eq!(store.active_id(), Some(second));
    }

    #[test]
    fn test_remove_last_leaves_no_active() {
        let tmp = TempDir::new().unwrap();
        let mut store = Store::load_from(tmp.path());
        store.remove(1).unwrap();
        assert!(store.calendars().is_empty());
        assert!(store.active_id().is_none());
    }

    #[test]
    fn test_set_active_unknown_id() {
        let tmp = TempDir::new().unwrap();
        let mut store = Store::load_from(tmp.path());
        assert_eq!(store.set_active(5), Err(StoreError::NotFound(5)));
        assert_eq!(store.active_id(), Some(1));
    }

    #[test]
    fn test_persist_then_load_roundtrips_collection() {
        let tmp = TempDir::new().unwrap();
        let mut store = Store::load_from(tmp.path());
        let mut notes = BTreeMap::new();
        notes.insert("2024-03-15".to_string(), "📅".to_string());
        store
            .update(
                1,
                CalendarPatch {
                    selected_days: Some(vec![d(2024, 3, 15), d(2024, 3, 17)]),
                    notes: Some(notes),
                    ..Default::default()
                },
            )
            .unwrap();
        store.persist().unwrap();
        let reloaded = Store::load_from(tmp.path());
        assert_eq!(reloaded.calendars(), store.calendars());
    }

    #[test]
    fn test_mutations_write_through_to_disk() {
        let tmp = TempDir::new().unwrap();
        let mut store = Store::load_from(tmp.path());
        store.add(&AppSettings::default());
        // A fresh store sees the mutation without an explicit persist()
        let reloaded = Store::load_from(tmp.path());
        assert_eq!(reloaded.calendars().len(), 2);
    }

    #[test]
    fn test_id_not_reused_while_higher_id_exists() {
        let tmp = TempDir::new().unwrap();
        let mut store = Store::load_from(tmp.path());
        let settings = AppSettings::default();
        let a = store.add(&settings); // 2
        let b = store.add(&settings); // 3
        store.remove(a).unwrap();
        let c = store.add(&settings);
        assert!(c > b);
        assert_ne!(c, a);
    }
}
