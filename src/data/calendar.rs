use crate::data::persistence::Persistable;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub type CalendarId = u64;

/// Canonical per-day key used for the notes map and all display output.
pub fn date_key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// One user-defined calendar: a name, a color, an emoji marker, a lock flag,
/// and the set of days the user has marked. `notes` maps a date key to the
/// emoji the calendar carried when that day was marked; it is not re-derived
/// when `emoji` later changes.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct CalendarRecord {
    pub id: CalendarId,
    pub name: String,
    pub emoji: String,
    pub color: String,
    #[serde(default)]
    pub locked: bool,
    #[serde(default)]
    pub selected_days: Vec<NaiveDate>,
    #[serde(default)]
    pub notes: BTreeMap<String, String>,
}

impl CalendarRecord {
    pub fn new(id: CalendarId, name: &str, emoji: &str, color: &str) -> Self {
        CalendarRecord {
            id,
            name: name.to_string(),
            emoji: emoji.to_string(),
            color: color.to_string(),
            locked: false,
            selected_days: Vec::new(),
            notes: BTreeMap::new(),
        }
    }

    pub fn has_day(&self, date: NaiveDate) -> bool {
        self.selected_days.iter().any(|d| *d == date)
    }

    /// Shallow merge: each `Some` field replaces the record's field wholesale.
    /// `selected_days` and `notes` are not deep-merged: callers pass the
    /// complete desired value.
    pub fn apply(&mut self, patch: CalendarPatch) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(emoji) = patch.emoji {
            self.emoji = emoji;
        }
        if let Some(color) = patch.color {
            self.color = color;
        }
        if let Some(locked) = patch.locked {
            self.locked = locked;
        }
        if let Some(selected_days) = patch.selected_days {
            self.selected_days = selected_days;
        }
        if let Some(notes) = patch.notes {
            self.notes = notes;
        }
    }
}

/// Partial update for a `CalendarRecord`. `id` is immutable and has no slot.
#[derive(Default, Debug, Clone)]
pub struct CalendarPatch {
    pub name: Option<String>,
    pub emoji: Option<String>,
    pub color: Option<String>,
    pub locked: Option<bool>,
    pub selected_days: Option<Vec<NaiveDate>>,
    pub notes: Option<BTreeMap<String, String>>,
}

#[derive(Serialize, Deserialize, Default, Debug, Clone, PartialEq)]
pub struct CalendarCollection {
    pub calendars: Vec<CalendarRecord>,
}

impl Persistable for CalendarCollection {
    fn filename() -> &'static str {
        "calendars.json"
    }
    fn is_json() -> bool {
        true
    }
}

impl CalendarCollection {
    pub fn get(&self, id: CalendarId) -> Option<&CalendarRecord> {
        self.calendars.iter().find(|c| c.id == id)
    }

    pub fn get_mut(&mut self, id: CalendarId) -> Option<&mut CalendarRecord> {
        self.calendars.iter_mut().find(|c| c.id == id)
    }

    pub fn first_id(&self) -> Option<CalendarId> {
        self.calendars.first().map(|c| c.id)
    }

    /// Next free id: one past the highest id in use. Monotonic within a
    /// session and collision-free regardless of call timing.
    pub fn next_id(&self) -> CalendarId {
        self.calendars.iter().map(|c| c.id).max().map_or(1, |m| m + 1)
    }
}
