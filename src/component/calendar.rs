use chrono::{Datelike, Days, Months, NaiveDate};
use color_eyre::Result;
use crossterm::event::KeyCode;
use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph},
};
use serde::Deserialize;
use tracing::debug;

use crate::{
    actions::{Action, ActionSender, CompAction},
    libs::temporal::first_of_month,
    page::WidgetExt,
    tui::Event,
    utils::help_msg::{HelpEntry, HelpMsg},
};

/// Inner width of the grid: seven 3-column cells.
pub(crate) const GRID_WIDTH: u16 = 21;
/// Outer size including the border and weekday header.
pub(crate) const CALENDAR_SIZE: (u16, u16) = (GRID_WIDTH + 2, 6 + 3);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
pub struct CalendarBounds {
    /// First navigable month
    pub start_month: NaiveDate,
    /// Last navigable month
    pub end_month: NaiveDate,
    /// Days after this one cannot be picked
    pub disabled_after: NaiveDate,
}

impl Default for CalendarBounds {
    fn default() -> Self {
        Self {
            start_month: NaiveDate::from_ymd_opt(1925, 1, 1).unwrap_or(NaiveDate::MIN),
            end_month: NaiveDate::from_ymd_opt(2050, 12, 1).unwrap_or(NaiveDate::MAX),
            disabled_after: NaiveDate::from_ymd_opt(2052, 12, 31).unwrap_or(NaiveDate::MAX),
        }
    }
}

#[derive(Clone, Debug)]
pub(crate) enum CalendarAction {
    MoveCursor(i64),
    ShiftMonth(i32),
    Pick,
    Clear,

    /// the visible month changed, for the owner
    MonthChanged(NaiveDate),
    /// a day (or "no date") was chosen, for the owner
    Selected(Option<NaiveDate>),
    /// the owner should close the calendar
    Dismissed,
}

/// What the calendar reports to its owner.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum CalendarOutput {
    MonthChanged(NaiveDate),
    Selected(Option<NaiveDate>),
    Dismissed,
}

/// Month grid with a day cursor.
///
/// The owner decides which month is shown and which day is selected through
/// [`CalendarComp::set_view`]; the calendar only reports what the user did.
#[derive(Clone, Debug)]
pub(crate) struct CalendarComp {
    id: u64,
    month: NaiveDate,
    cursor: NaiveDate,
    selected: Option<NaiveDate>,
    today: NaiveDate,
    bounds: CalendarBounds,
    tx: ActionSender,
}

impl CalendarComp {
    pub fn new(id: u64, bounds: CalendarBounds, today: NaiveDate, tx: ActionSender) -> Self {
        let month = first_of_month(today);
        Self {
            id,
            month,
            cursor: today,
            selected: None,
            today,
            bounds,
            tx,
        }
    }

    pub fn set_today(&mut self, today: NaiveDate) {
        self.today = today;
    }

    pub fn month(&self) -> NaiveDate {
        self.month
    }

    pub fn cursor(&self) -> NaiveDate {
        self.cursor
    }

    pub fn set_view(&mut self, month: Option<NaiveDate>, selected: Option<NaiveDate>) {
        self.selected = selected;
        self.month = self.clamp_month(
            month
                .or(selected)
                .map(first_of_month)
                .unwrap_or_else(|| first_of_month(self.today)),
        );
        self.cursor = [selected, Some(self.today)]
            .into_iter()
            .flatten()
            .find(|day| first_of_month(*day) == self.month)
            .unwrap_or(self.month);
    }

    pub fn parse_output(&self, action: &Action) -> Option<CalendarOutput> {
        match self.unwrap_action(action)? {
            CalendarAction::MonthChanged(month) => Some(CalendarOutput::MonthChanged(month)),
            CalendarAction::Selected(day) => Some(CalendarOutput::Selected(day)),
            CalendarAction::Dismissed => Some(CalendarOutput::Dismissed),
            _ => None,
        }
    }

    pub fn get_help_msg() -> HelpMsg {
        vec![
            HelpEntry::new_plain("hjkl/arrows", "Move day"),
            HelpEntry::new_plain("</>", "Change month"),
            HelpEntry::new(KeyCode::Enter, "Pick day"),
            HelpEntry::new('x', "No date"),
            HelpEntry::new(KeyCode::Esc, "Close calendar"),
        ]
        .into()
    }

    fn get_action(&self, action: CalendarAction) -> Action {
        Action::Comp((CompAction::Calendar(action), self.id))
    }

    fn unwrap_action(&self, action: &Action) -> Option<CalendarAction> {
        match action {
            Action::Comp((CompAction::Calendar(action), id)) if *id == self.id => {
                Some(action.clone())
            }
            _ => None,
        }
    }

    fn last_day(&self) -> NaiveDate {
        self.bounds
            .end_month
            .checked_add_months(Months::new(1))
            .and_then(|next| next.pred_opt())
            .unwrap_or(NaiveDate::MAX)
    }

    fn clamp_month(&self, month: NaiveDate) -> NaiveDate {
        month.clamp(
            first_of_month(self.bounds.start_month),
            first_of_month(self.bounds.end_month),
        )
    }

    fn is_disabled(&self, day: NaiveDate) -> bool {
        day > self.bounds.disabled_after
    }

    fn move_to(&mut self, day: NaiveDate) {
        let day = day.clamp(first_of_month(self.bounds.start_month), self.last_day());
        self.cursor = day;
        let month = first_of_month(day);
        if month != self.month {
            self.month = month;
            self.tx
                .send(self.get_action(CalendarAction::MonthChanged(month)));
        }
    }

    /// The visible month as weeks starting on Sunday.
    pub fn weeks(&self) -> Vec<[Option<NaiveDate>; 7]> {
        let lead = self.month.weekday().num_days_from_sunday() as usize;
        let mut weeks = vec![];
        let mut week = [None; 7];
        let mut slot = lead;
        for day in self.month.iter_days().take_while(|d| d.month() == self.month.month()) {
            week[slot] = Some(day);
            slot += 1;
            if slot == 7 {
                weeks.push(week);
                week = [None; 7];
                slot = 0;
            }
        }
        if slot != 0 {
            weeks.push(week);
        }
        weeks
    }

    fn day_style(&self, day: NaiveDate) -> Style {
        let mut style = Style::default();
        if self.is_disabled(day) {
            style = style.fg(Color::DarkGray);
        } else if day == self.today {
            style = style.fg(Color::Cyan);
        }
        if Some(day) == self.selected {
            style = style.add_modifier(Modifier::REVERSED | Modifier::BOLD);
        }
        if day == self.cursor {
            style = style.bg(Color::Yellow).fg(Color::Black);
        }
        style
    }
}

impl super::Component for CalendarComp {
    fn handle_events(&self, event: &Event) -> Result<()> {
        let Event::Key(key) = event else {
            return Ok(());
        };
        let action = match key.code {
            KeyCode::Left | KeyCode::Char('h') => CalendarAction::MoveCursor(-1),
            KeyCode::Right | KeyCode::Char('l') => CalendarAction::MoveCursor(1),
            KeyCode::Up | KeyCode::Char('k') => CalendarAction::MoveCursor(-7),
            KeyCode::Down | KeyCode::Char('j') => CalendarAction::MoveCursor(7),
            KeyCode::PageUp | KeyCode::Char('<') => CalendarAction::ShiftMonth(-1),
            KeyCode::PageDown | KeyCode::Char('>') => CalendarAction::ShiftMonth(1),
            KeyCode::Enter => CalendarAction::Pick,
            KeyCode::Char('x') | KeyCode::Backspace | KeyCode::Delete => CalendarAction::Clear,
            KeyCode::Esc => CalendarAction::Dismissed,
            _ => return Ok(()),
        };
        self.tx.send(self.get_action(action));
        Ok(())
    }

    fn update(&mut self, action: &Action) -> Result<()> {
        let Some(action) = self.unwrap_action(action) else {
            return Ok(());
        };
        match action {
            CalendarAction::MoveCursor(days) => {
                let moved = if days >= 0 {
                    self.cursor.checked_add_days(Days::new(days.unsigned_abs()))
                } else {
                    self.cursor.checked_sub_days(Days::new(days.unsigned_abs()))
                };
                if let Some(day) = moved {
                    self.move_to(day);
                }
            }
            CalendarAction::ShiftMonth(months) => {
                let delta = Months::new(months.unsigned_abs());
                let shifted = if months >= 0 {
                    self.cursor.checked_add_months(delta)
                } else {
                    self.cursor.checked_sub_months(delta)
                };
                if let Some(day) = shifted {
                    self.move_to(day);
                }
            }
            CalendarAction::Pick => {
                if self.is_disabled(self.cursor) {
                    debug!(day = %self.cursor, "picked a disabled day");
                } else {
                    self.tx
                        .send(self.get_action(CalendarAction::Selected(Some(self.cursor))));
                }
            }
            CalendarAction::Clear => {
                self.tx.send(self.get_action(CalendarAction::Selected(None)));
            }
            CalendarAction::MonthChanged(_)
            | CalendarAction::Selected(_)
            | CalendarAction::Dismissed => {}
        }
        Ok(())
    }
}

impl WidgetExt for CalendarComp {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let mut lines = vec![Line::styled(
            " Su Mo Tu We Th Fr Sa",
            Style::default().add_modifier(Modifier::BOLD),
        )];
        for week in self.weeks() {
            let spans = week
                .iter()
                .map(|day| match day {
                    Some(day) => Span::styled(format!("{:>3}", day.day()), self.day_style(*day)),
                    None => Span::raw("   "),
                })
                .collect::<Vec<_>>();
            lines.push(Line::from(spans));
        }

        let title = self.month.format("‹ %B %Y ›").to_string();
        let widget = Paragraph::new(lines).block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(Style::default().fg(Color::Yellow))
                .title(Line::from(title).centered()),
        );
        frame.render_widget(widget, area);
    }
}

#[cfg(test)]
mod tests {
    use ratatui::{Terminal, backend::TestBackend};
    use tokio::sync::mpsc::UnboundedReceiver;

    use crate::{component::Component, utils::key_events::test_utils::get_key_evt};

    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn calendar() -> (CalendarComp, UnboundedReceiver<Action>) {
        let (tx, rx) = tokio::sync::mpsc::unbounded_channel();
        let calendar = CalendarComp::new(7, CalendarBounds::default(), date(2024, 1, 10), tx.into());
        (calendar, rx)
    }

    /// Feed one event and return what the calendar reported to its owner.
    fn press(
        calendar: &mut CalendarComp,
        rx: &mut UnboundedReceiver<Action>,
        event: Event,
    ) -> Vec<CalendarOutput> {
        calendar.handle_events(&event).unwrap();
        let mut outputs = vec![];
        while let Ok(action) = rx.try_recv() {
            if let Some(output) = calendar.parse_output(&action) {
                outputs.push(output);
            }
            calendar.update(&action).unwrap();
        }
        outputs
    }

    #[test]
    fn january_2024_grid() {
        let (calendar, _rx) = calendar();
        let weeks = calendar.weeks();
        assert_eq!(weeks.len(), 5);
        // 2024-01-01 is a Monday
        assert_eq!(weeks[0][0], None);
        assert_eq!(weeks[0][1], Some(date(2024, 1, 1)));
        assert_eq!(weeks[4][3], Some(date(2024, 1, 31)));
        assert_eq!(weeks[4][4], None);
    }

    #[test]
    fn cursor_crosses_months() {
        let (mut calendar, mut rx) = calendar();
        calendar.set_view(None, Some(date(2024, 1, 30)));
        assert_eq!(calendar.cursor(), date(2024, 1, 30));

        let out = press(&mut calendar, &mut rx, get_key_evt(KeyCode::Down));
        assert_eq!(out, vec![CalendarOutput::MonthChanged(date(2024, 2, 1))]);
        assert_eq!(calendar.cursor(), date(2024, 2, 6));

        let out = press(&mut calendar, &mut rx, get_key_evt(KeyCode::Left));
        assert!(out.is_empty());

        let out = press(&mut calendar, &mut rx, get_key_evt(KeyCode::Char('<')));
        assert_eq!(out, vec![CalendarOutput::MonthChanged(date(2024, 1, 1))]);
        assert_eq!(calendar.cursor(), date(2024, 1, 5));
    }

    #[test]
    fn month_shift_clamps_day() {
        let (mut calendar, mut rx) = calendar();
        calendar.set_view(None, Some(date(2024, 1, 31)));
        press(&mut calendar, &mut rx, get_key_evt(KeyCode::PageDown));
        assert_eq!(calendar.cursor(), date(2024, 2, 29));
    }

    #[test]
    fn navigation_stops_at_end_month() {
        let (mut calendar, mut rx) = calendar();
        calendar.set_view(Some(date(2050, 12, 1)), Some(date(2050, 12, 20)));
        let out = press(&mut calendar, &mut rx, get_key_evt(KeyCode::Char('>')));
        assert!(out.is_empty());
        assert_eq!(calendar.month(), date(2050, 12, 1));
        assert_eq!(calendar.cursor(), date(2050, 12, 31));
    }

    #[test]
    fn disabled_days_cannot_be_picked() {
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
        let bounds = CalendarBounds {
            disabled_after: date(2024, 1, 15),
            ..Default::default()
        };
        let mut calendar = CalendarComp::new(7, bounds, date(2024, 1, 10), tx.into());
        calendar.set_view(None, Some(date(2024, 1, 16)));

        let out = press(&mut calendar, &mut rx, get_key_evt(KeyCode::Enter));
        assert!(out.is_empty());

        press(&mut calendar, &mut rx, get_key_evt(KeyCode::Left));
        let out = press(&mut calendar, &mut rx, get_key_evt(KeyCode::Enter));
        assert_eq!(out, vec![CalendarOutput::Selected(Some(date(2024, 1, 15)))]);
    }

    #[test]
    fn clear_and_dismiss() {
        let (mut calendar, mut rx) = calendar();
        let out = press(&mut calendar, &mut rx, get_key_evt(KeyCode::Char('x')));
        assert_eq!(out, vec![CalendarOutput::Selected(None)]);
        let out = press(&mut calendar, &mut rx, get_key_evt(KeyCode::Esc));
        assert_eq!(out, vec![CalendarOutput::Dismissed]);
    }

    #[test]
    fn set_view_prefers_owner_month() {
        let (mut calendar, _rx) = calendar();
        calendar.set_view(Some(date(2024, 6, 1)), Some(date(2024, 1, 11)));
        assert_eq!(calendar.month(), date(2024, 6, 1));
        assert_eq!(calendar.cursor(), date(2024, 6, 1));

        calendar.set_view(None, None);
        assert_eq!(calendar.month(), date(2024, 1, 1));
        assert_eq!(calendar.cursor(), date(2024, 1, 10));
    }

    #[test]
    fn render_grid() {
        let (mut calendar, _rx) = calendar();
        let (width, height) = CALENDAR_SIZE;
        let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
        terminal.draw(|f| calendar.render(f, f.area())).unwrap();

        let buffer = terminal.backend().buffer();
        let rows = (0..height)
            .map(|y| {
                (0..width)
                    .map(|x| buffer[(x, y)].symbol().to_string())
                    .collect::<String>()
                    .trim_end()
                    .to_string()
            })
            .collect::<Vec<_>>();
        assert!(rows[0].contains("January 2024"));
        assert_eq!(rows[1], "│ Su Mo Tu We Th Fr Sa│");
        assert_eq!(rows[2], "│     1  2  3  4  5  6│");
        assert_eq!(rows[6], "│ 28 29 30 31         │");
    }
}
