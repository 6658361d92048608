use crate::data::persistence::Persistable;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// What happens to a day's note when that day is deselected.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum NotePolicy {
    /// Remove the note along with the selection (default).
    #[default]
    Delete,
    /// Leave the note in place; it is overwritten on the next re-mark.
    Keep,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct AppSettings {
    /// Field values applied to calendars created via `add`.
    pub default_name: String,
    pub default_emoji: String,
    pub default_color: String,
    #[serde(default)]
    pub note_policy: NotePolicy,
}

impl Default for AppSettings {
    fn default() -> Self {
        AppSettings {
            default_name: "New Calendar".to_string(),
            default_emoji: "📅".to_string(),
            default_color: "#4CAF50".to_string(),
            note_policy: NotePolicy::Delete,
        }
    }
}

/// Wrapper that reads the `settings` key from config.yaml, so the file stays
/// extensible without breaking older readers (serde ignores unknown fields).
#[derive(Serialize, Deserialize, Default, Debug)]
struct SettingsWrapper {
    #[serde(default)]
    settings: AppSettings,
}

impl Persistable for SettingsWrapper {
    fn filename() -> &'static str {
        "config.yaml"
    }
    fn is_json() -> bool {
        false
    }
}

impl AppSettings {
    pub fn load() -> Result<Self> {
        Ok(SettingsWrapper::load()?.settings)
    }

    pub fn load_from(dir: &Path) -> Result<Self> {
        Ok(SettingsWrapper::load_from(dir)?.settings)
    }

    pub fn save_to(&self, dir: &Path) -> Result<()> {
        let wrapper = SettingsWrapper {
            settings: self.clone(),
        };
        wrapper.save_to(dir)
    }
}
