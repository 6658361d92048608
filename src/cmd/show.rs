use crate::calc::{is_selected, month_name, visible_days};
use crate::data::{CalendarId, CalendarRecord, Store};
use anyhow::{bail, Result};
use chrono::{Datelike, Local, NaiveDate};

pub fn run(calendar: CalendarId, month: Option<&str>) -> Result<()> {
    let store = Store::load();
    let record = match store.get(calendar) {
        Some(c) => c,
        None => bail!("Calendar id '{}' not found. Run 'daymark calendars' to list ids.", calendar),
    };
    let reference = match month {
        Some(m) => parse_month(m)?,
        None => Local::now().date_naive(),
    };
    write_month(record, reference, &mut std::io::stdout())
}

/// Accepts YYYY-MM and resolves to the first of that month.
pub(crate) fn parse_month(raw: &str) -> Result<NaiveDate> {
    match NaiveDate::parse_from_str(&format!("{raw}-01"), "%Y-%m-%d") {
        Ok(d) => Ok(d),
        Err(_) => bail!("Invalid month '{}' (expected YYYY-MM).", raw),
    }
}

pub(crate) fn write_month<W: std::io::Write>(
    record: &CalendarRecord,
    reference: NaiveDate,
    out: &mut W,
) -> Result<()> {
    writeln!(
        out,
        "{} {} - {} {}{}",
        month_name(reference.month()),
        reference.year(),
        record.emoji,
        record.name,
        if record.locked { " (locked)" } else { "" }
    )?;
    writeln!(out, " Su  Mo  Tu  We  Th  Fr  Sa")?;

    let days = visible_days(reference);
    for week in days.chunks(7) {
        let mut line = String::new();
        for grid_day in week {
            let day = grid_day.date.day();
            let cell = if is_selected(grid_day.date, &record.selected_days) {
                format!("[{day:>2}]")
            } else if !grid_day.in_month {
                format!("({day:>2})")
            } else {
                format!(" {day:>2} ")
            };
            line.push_str(&cell);
        }
        writeln!(out, "{}", line.trim_end())?;
    }

    writeln!(out, "Total days selected: {}", record.selected_days.len())?;
    Ok(())
}
