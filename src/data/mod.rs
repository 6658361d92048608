pub mod app_settings;
pub mod calendar;
pub mod persistence;
pub mod store;

pub use app_settings::{AppSettings, NotePolicy};
pub use calendar::{date_key, CalendarCollection, CalendarId, CalendarPatch, CalendarRecord};
pub use persistence::Persistable;
pub use store::{Store, StoreError};
