use crate::data::{CalendarRecord, Store};
use anyhow::Result;

pub fn run() -> Result<()> {
    let store = Store::load();
    write_calendars(store.calendars(), &mut std::io::stdout())
}

pub(crate) fn write_calendars<W: std::io::Write>(
    calendars: &[CalendarRecord],
    out: &mut W,
) -> Result<()> {
    writeln!(out, "Calendars")?;
    writeln!(out, "---")?;
    writeln!(out, "  {:<6} {:<3} {:<20} {:<8} {}", "Id", "", "Name", "Locked", "Days marked")?;
    for c in calendars {
        writeln!(
            out,
            "  {:<6} {:<3} {:<20} {:<8} {}",
            c.id,
            c.emoji,
            c.name,
            if c.locked { "yes" } else { "-" },
            c.selected_days.len()
        )?;
    }
    writeln!(out, "---")?;
    writeln!(out, "Total: {} calendar(s)", calendars.len())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn cal(id: u64, name: &str) -> CalendarRecord {
        CalendarRecord::new(id, name, "📅", "#4CAF50")
    }

    #[test]
    fn test_write_calendars_empty() {
        let mut buf = Vec::new();
        write_calendars(&[], &mut buf).unwrap();
        let out = String::from_utf8(buf).unwrap();
        assert!(out.contains("Total: 0 calendar(s)"));
    }

    #[test]
    fn test_write_calendars_lists_each_record() {
        let mut gym = cal(2, "Gym");
        gym.locked = true;
        gym.selected_days
            .push(NaiveDate::from_ymd_opt(2024, 3, 15).unwrap());
        let mut buf = Vec::new();
        write_calendars(&[cal(1, "Default"), gym], &mut buf).unwrap();
        let out = String::from_utf8(buf).unwrap();
        assert!(out.contains("Default"));
        assert!(out.contains("Gym"));
        assert!(out.contains("yes"));
        assert!(out.contains("Total: 2 calendar(s)"));
    }
}
