use crate::data::calendar::{date_key, CalendarRecord};
use crate::data::NotePolicy;
use chrono::{Datelike, Duration, NaiveDate};

/// One cell of the month grid. `in_month` is false for the leading/trailing
/// days pulled in from adjacent months to fill whole week rows.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GridDay {
    pub date: NaiveDate,
    pub in_month: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Backward,
}

/// The ordered day sequence for the month containing `reference`: from the
/// Sunday on or before the 1st through the Saturday on or after the last day.
/// Always a whole number of 7-day weeks (28–42 entries). Recomputed on every
/// call; nothing caches it.
pub fn visible_days(reference: NaiveDate) -> Vec<GridDay> {
    let year = reference.year();
    let month = reference.month();
    let first = NaiveDate::from_ymd_opt(year, month, 1).unwrap();
    let last = first + Duration::days(days_in_month(year, month) as i64 - 1);

    let start = first - Duration::days(first.weekday().num_days_from_sunday() as i64);
    let end = last + Duration::days(6 - last.weekday().num_days_from_sunday() as i64);

    let mut days = Vec::new();
    let mut current = start;
    while current <= end {
        days.push(GridDay {
            date: current,
            in_month: current.year() == year && current.month() == month,
        });
        current = current.succ_opt().unwrap_or(current);
    }
    days
}

/// Day-granularity membership test. A linear scan; selection sets stay small.
pub fn is_selected(date: NaiveDate, selected_days: &[NaiveDate]) -> bool {
    selected_days.iter().any(|d| *d == date)
}

/// Returns a new record with `date` toggled in the selection set; the input
/// is never mutated. Marking a day captures the calendar's emoji at toggle
/// time under the day's date key; later emoji edits leave old notes alone.
/// Unmarking removes the note under `NotePolicy::Delete` and leaves it under
/// `NotePolicy::Keep`. A locked record comes back unchanged.
pub fn toggle_day(record: &CalendarRecord, date: NaiveDate, policy: NotePolicy) -> CalendarRecord {
    if record.locked {
        return record.clone();
    }
    let mut updated = record.clone();
    let key = date_key(date);
    if is_selected(date, &record.selected_days) {
        updated.selected_days.retain(|d| *d != date);
        if policy == NotePolicy::Delete {
            updated.notes.remove(&key);
        }
    } else {
        updated.selected_days.push(date);
        updated.notes.insert(key, record.emoji.clone());
    }
    updated
}

/// Shifts `reference` by exactly one calendar month, clamping the day of
/// month to the target month's length (Mar 31 backward lands on the last day
/// of February).
pub fn navigate(reference: NaiveDate, direction: Direction) -> NaiveDate {
    match direction {
        Direction::Forward => add_months(reference, 1),
        Direction::Backward => add_months(reference, -1),
    }
}

pub fn month_name(month: u32) -> &'static str {
    match month {
        1 => "January",
        2 => "February",
        3 => "March",
        4 => "April",
        5 => "May",
        6 => "June",
        7 => "July",
        8 => "August",
        9 => "September",
        10 => "October",
        11 => "November",
        12 => "December",
        _ => "Unknown",
    }
}

pub fn days_in_month(year: i32, month: u32) -> u32 {
    let next_month = if month == 12 { 1 } else { month + 1 };
    let next_year = if month == 12 { year + 1 } else { year };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .unwrap()
        .signed_duration_since(NaiveDate::from_ymd_opt(year, month, 1).unwrap())
        .num_days() as u32
}

pub fn add_months(date: NaiveDate, months: i32) -> NaiveDate {
    let year = date.year();
    let month = date.month() as i32;
    let new_total = month - 1 + months;
    let new_month = ((new_total % 12 + 12) % 12 + 1) as u32;
    let year_delta = new_total.div_euclid(12);
    let new_year = year + year_delta;
    let max_day = days_in_month(new_year, new_month);
    let new_day = date.day().min(max_day);
    NaiveDate::from_ymd_opt(new_year, new_month, new_day).unwrap_or(date)
}
