use crate::calc::toggle_day;
use crate::data::{AppSettings, CalendarId, CalendarPatch, Store};
use anyhow::{bail, Context, Result};
use chrono::NaiveDate;

pub fn run(calendar: CalendarId, date: &str) -> Result<()> {
    let date = NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .with_context(|| format!("invalid date '{}' (expected YYYY-MM-DD)", date))?;

    let mut store = Store::load();
    let settings = AppSettings::load()?;

    let record = match store.get(calendar) {
        Some(c) => c,
        None => bail!("Calendar id '{}' not found. Run 'daymark calendars' to list ids.", calendar),
    };
    if record.locked {
        println!("Calendar '{}' is locked - nothing to do.", record.name);
        return Ok(());
    }

    let name = record.name.clone();
    let updated = toggle_day(record, date, settings.note_policy);
    let marked = updated.has_day(date);
    store.update(
        calendar,
        CalendarPatch {
            selected_days: Some(updated.selected_days),
            notes: Some(updated.notes),
            ..Default::default()
        },
    )?;

    if marked {
        println!("Marked {} on '{}'.", date.format("%Y-%m-%d"), name);
    } else {
        println!("Unmarked {} on '{}'.", date.format("%Y-%m-%d"), name);
    }
    Ok(())
}
