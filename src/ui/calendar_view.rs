use crate::calc::{is_selected, month_name, navigate, toggle_day, visible_days, Direction};
use crate::data::{date_key, AppSettings, CalendarPatch, Store};
use anyhow::Result;
use chrono::{Datelike, Duration, NaiveDate};
use crossterm::event::{self, Event as CEvent, KeyCode, KeyModifiers};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction as LayoutDirection, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Tabs},
    Frame, Terminal,
};
use std::io::Stdout;
use std::time::Duration as StdDuration;

/// Fallback accent when a calendar carries an unparseable color string.
const FALLBACK_ACCENT: Color = Color::Rgb(76, 175, 80); // #4CAF50

#[derive(PartialEq)]
enum Mode {
    Normal,
    Rename,
    Emoji,
    EditColor,
    ConfirmDelete,
}

pub struct App<'a> {
    store: &'a mut Store,
    pub settings: AppSettings,
    /// Month currently shown. Follows the cursor when it leaves the month.
    reference_date: NaiveDate,
    /// Day cursor inside the grid.
    selected_date: NaiveDate,
    today: NaiveDate,
    mode: Mode,
    input_buffer: String,
    /// Transient feedback line. Cleared on the next keypress.
    status: Option<String>,
}

impl<'a> App<'a> {
    pub fn new(store: &'a mut Store, settings: AppSettings, today: NaiveDate) -> Self {
        App {
            store,
            settings,
            reference_date: today,
            selected_date: today,
            today,
            mode: Mode::Normal,
            input_buffer: String::new(),
            status: None,
        }
    }

    fn move_cursor(&mut self, days: i64) {
        if let Some(d) = self.selected_date.checked_add_signed(Duration::days(days)) {
            self.selected_date = d;
        }
        // Keep the shown month in sync when the cursor walks out of it
        if self.selected_date.month() != self.reference_date.month()
            || self.selected_date.year() != self.reference_date.year()
        {
            self.reference_date = self.selected_date;
        }
    }

    fn navigate_month(&mut self, direction: Direction) {
        self.selected_date = navigate(self.selected_date, direction);
        self.reference_date = self.selected_date;
    }

    fn toggle_selected_day(&mut self) {
        let record = match self.store.active() {
            Some(c) => c,
            None => {
                self.status = Some("No calendar - press 'a' to add one".to_string());
                return;
            }
        };
        if record.locked {
            self.status = Some(format!("'{}' is locked", record.name));
            return;
        }
        let id = record.id;
        let updated = toggle_day(record, self.selected_date, self.settings.note_policy);
        let marked = updated.has_day(self.selected_date);
        let patch = CalendarPatch {
            selected_days: Some(updated.selected_days),
            notes: Some(updated.notes),
            ..Default::default()
        };
        if self.store.update(id, patch).is_ok() {
            let verb = if marked { "Marked" } else { "Unmarked" };
            self.status = Some(format!("{} {}", verb, date_key(self.selected_date)));
        }
    }

    fn cycle_calendar(&mut self) {
        let ids: Vec<u64> = self.store.calendars().iter().map(|c| c.id).collect();
        if ids.is_empty() {
            return;
        }
        let next = match self.store.active_id().and_then(|id| ids.iter().position(|i| *i == id)) {
            Some(pos) => ids[(pos + 1) % ids.len()],
            None => ids[0],
        };
        let _ = self.store.set_active(next);
    }

    fn add_calendar(&mut self) {
        let id = self.store.add(&self.settings);
        self.status = Some(format!("Added calendar {}", id));
    }

    fn delete_active(&mut self) {
        if let Some(id) = self.store.active_id() {
            if self.store.remove(id).is_ok() {
                self.status = Some("Calendar deleted".to_string());
            }
        }
    }

    fn toggle_lock(&mut self) {
        if let Some(record) = self.store.active() {
            let id = record.id;
            let locked = !record.locked;
            let patch = CalendarPatch {
                locked: Some(locked),
                ..Default::default()
            };
            if self.store.update(id, patch).is_ok() {
                self.status = Some(if locked {
                    "Locked".to_string()
                } else {
                    "Unlocked".to_string()
                });
            }
        }
    }

    /// Commits the input buffer to the field the current edit mode targets.
    fn commit_edit(&mut self) {
        let value = self.input_buffer.clone();
        if let Some(id) = self.store.active_id() {
            let patch = match self.mode {
                Mode::Rename => CalendarPatch {
                    name: Some(value),
                    ..Default::default()
                },
                Mode::Emoji => CalendarPatch {
                    emoji: Some(value),
                    ..Default::default()
                },
                Mode::EditColor => CalendarPatch {
                    color: Some(value),
                    ..Default::default()
                },
                _ => return,
            };
            if self.store.update(id, patch).is_ok() {
                self.status = Some("Saved".to_string());
            }
        }
        self.input_buffer.clear();
        self.mode = Mode::Normal;
    }

    fn enter_edit(&mut self, mode: Mode) {
        let record = match self.store.active() {
            Some(c) => c,
            None => return,
        };
        self.input_buffer = match mode {
            Mode::Rename => record.name.clone(),
            Mode::Emoji => record.emoji.clone(),
            Mode::EditColor => record.color.clone(),
            _ => String::new(),
        };
        self.mode = mode;
    }

    /// Returns true if the app should quit.
    pub fn handle_key(&mut self, code: KeyCode, modifiers: KeyModifiers) -> bool {
        match self.mode {
            Mode::Rename | Mode::Emoji | Mode::EditColor => {
                match code {
                    KeyCode::Enter => self.commit_edit(),
                    KeyCode::Esc => {
                        self.input_buffer.clear();
                        self.mode = Mode::Normal;
                    }
                    KeyCode::Backspace => {
                        self.input_buffer.pop();
                    }
                    KeyCode::Char(c) => {
                        self.input_buffer.push(c);
                    }
                    _ => {}
                }
                false
            }

            Mode::ConfirmDelete => {
                match code {
                    KeyCode::Enter | KeyCode::Char('y') => {
                        self.delete_active();
                        self.mode = Mode::Normal;
                    }
                    KeyCode::Esc | KeyCode::Char('n') => {
                        self.mode = Mode::Normal;
                    }
                    _ => {}
                }
                false
            }

            Mode::Normal => {
                // Feedback from the previous action is gone on the next press
                self.status = None;

                match code {
                    KeyCode::Left => self.move_cursor(-1),
                    KeyCode::Right => self.move_cursor(1),
                    KeyCode::Up => self.move_cursor(-7),
                    KeyCode::Down => self.move_cursor(7),
                    KeyCode::Char(' ') => self.toggle_selected_day(),
                    KeyCode::Char('n') => self.navigate_month(Direction::Forward),
                    KeyCode::Char('p') => self.navigate_month(Direction::Backward),
                    KeyCode::Tab | KeyCode::Char('t') => self.cycle_calendar(),
                    KeyCode::Char('a') => self.add_calendar(),
                    KeyCode::Char('D') => {
                        if self.store.active_id().is_some() {
                            self.mode = Mode::ConfirmDelete;
                        }
                    }
                    KeyCode::Char('r') => self.enter_edit(Mode::Rename),
                    KeyCode::Char('e') => self.enter_edit(Mode::Emoji),
                    KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
                        return true;
                    }
                    KeyCode::Char('c') => self.enter_edit(Mode::EditColor),
                    KeyCode::Char('l') => self.toggle_lock(),
                    KeyCode::Char('q') => return true,
                    _ => {}
                }
                false
            }
        }
    }

    pub fn render(&mut self, f: &mut Frame) {
        let size = f.area();
        let chunks = Layout::default()
            .direction(LayoutDirection::Vertical)
            .constraints([
                Constraint::Length(1),  // calendar tabs
                Constraint::Length(10), // month grid
                Constraint::Length(4),  // totals / note / status / input
                Constraint::Min(1),     // help
            ])
            .split(size);

        self.render_tabs(f, chunks[0]);
        self.render_grid(f, chunks[1]);
        self.render_info(f, chunks[2]);
        self.render_help(f, chunks[3]);
    }

    fn render_tabs(&self, f: &mut Frame, area: ratatui::layout::Rect) {
        let calendars = self.store.calendars();
        if calendars.is_empty() {
            let p = Paragraph::new("No calendars. Press 'a' to add one.");
            f.render_widget(p, area);
            return;
        }
        let titles: Vec<Line> = calendars
            .iter()
            .map(|c| {
                let lock = if c.locked { " ×" } else { "" };
                Line::from(format!("{} {}{}", c.emoji, c.name, lock))
            })
            .collect();
        let selected = self
            .store
            .active_id()
            .and_then(|id| calendars.iter().position(|c| c.id == id))
            .unwrap_or(0);
        let tabs = Tabs::new(titles)
            .select(selected)
            .highlight_style(
                Style::default()
                    .fg(Color::Black)
                    .bg(self.accent())
                    .add_modifier(Modifier::BOLD),
            );
        f.render_widget(tabs, area);
    }

    fn accent(&self) -> Color {
        self.store
            .active()
            .and_then(|c| parse_hex_color(&c.color))
            .unwrap_or(FALLBACK_ACCENT)
    }

    fn render_grid(&self, f: &mut Frame, area: ratatui::layout::Rect) {
        let accent = self.accent();
        let selected_days: Vec<NaiveDate> = self
            .store
            .active()
            .map(|c| c.selected_days.clone())
            .unwrap_or_default();

        let title = format!(
            "{} {}",
            month_name(self.reference_date.month()),
            self.reference_date.year()
        );
        let mut lines: Vec<Line> = vec![
            Line::from(Span::styled(
                format!("{:^21}", title),
                Style::default().add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
            )),
            Line::from("Su Mo Tu We Th Fr Sa"),
        ];

        for week in visible_days(self.reference_date).chunks(7) {
            let mut spans = Vec::new();
            for grid_day in week {
                let style = day_style(
                    grid_day.date == self.selected_date,
                    is_selected(grid_day.date, &selected_days),
                    grid_day.in_month,
                    grid_day.date == self.today,
                    accent,
                );
                spans.push(Span::styled(format!("{:2}", grid_day.date.day()), style));
                spans.push(Span::raw(" "));
            }
            lines.push(Line::from(spans));
        }

        let widget = Paragraph::new(lines).block(Block::default().borders(Borders::NONE));
        f.render_widget(widget, area);
    }

    fn render_info(&self, f: &mut Frame, area: ratatui::layout::Rect) {
        let mut lines: Vec<Line> = Vec::new();

        if let Some(record) = self.store.active() {
            lines.push(Line::from(format!(
                "Total days selected: {}",
                record.selected_days.len()
            )));
            if let Some(note) = record.notes.get(&date_key(self.selected_date)) {
                lines.push(Line::from(format!(
                    "{}  {}",
                    date_key(self.selected_date),
                    note
                )));
            }
        }

        match self.mode {
            Mode::Rename => lines.push(Line::from(format!("New name: {}_", self.input_buffer))),
            Mode::Emoji => lines.push(Line::from(format!("New emoji: {}_", self.input_buffer))),
            Mode::EditColor => {
                lines.push(Line::from(format!("New color: {}_", self.input_buffer)))
            }
            Mode::ConfirmDelete => {
                let name = self.store.active().map(|c| c.name.as_str()).unwrap_or("?");
                lines.push(Line::from(Span::styled(
                    format!("Delete calendar '{}'? Enter/y = yes, Esc = no", name),
                    Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
                )));
            }
            Mode::Normal => {
                if let Some(status) = &self.status {
                    lines.push(Line::from(Span::styled(
                        status.clone(),
                        Style::default().fg(Color::Yellow),
                    )));
                }
            }
        }

        f.render_widget(Paragraph::new(lines), area);
    }

    fn render_help(&self, f: &mut Frame, area: ratatui::layout::Rect) {
        let help = Paragraph::new(Line::from(Span::styled(
            "arrows=move  space=toggle  n/p=month  t=calendar  a=add  D=delete  r=rename  e=emoji  c=color  l=lock  q=quit",
            Style::default().fg(Color::DarkGray),
        )));
        f.render_widget(help, area);
    }
}

// ── App event loop ────────────────────────────────────────────────────────────

pub fn run_app(terminal: &mut Terminal<CrosstermBackend<Stdout>>, app: &mut App) -> Result<()> {
    loop {
        terminal.draw(|f| app.render(f))?;
        if event::poll(StdDuration::from_millis(16))? {
            if let CEvent::Key(key) = event::read()? {
                if app.handle_key(key.code, key.modifiers) {
                    break;
                }
            }
        }
    }
    Ok(())
}

// ── Style helpers ─────────────────────────────────────────────────────────────

/// Determines the style for one day cell of the month grid.
pub(crate) fn day_style(
    is_cursor: bool,
    is_marked: bool,
    in_month: bool,
    is_today: bool,
    accent: Color,
) -> Style {
    if is_cursor {
        let bg = if is_marked { accent } else { Color::White };
        Style::default()
            .fg(Color::Black)
            .bg(bg)
            .add_modifier(Modifier::BOLD)
    } else if is_marked {
        let mut s = Style::default()
            .fg(accent)
            .add_modifier(Modifier::BOLD | Modifier::UNDERLINED);
        if is_today {
            s = s.add_modifier(Modifier::REVERSED);
        }
        s
    } else if is_today {
        Style::default().add_modifier(Modifier::REVERSED | Modifier::BOLD)
    } else if !in_month {
        Style::default().add_modifier(Modifier::DIM)
    } else {
        Style::default()
    }
}

/// Parses "#RRGGBB" into an RGB color. Anything else is None.
pub(crate) fn parse_hex_color(hex: &str) -> Option<Color> {
    let hex = hex.strip_prefix('#')?;
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }
    let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
    Some(Color::Rgb(r, g, b))
}
