//! The natural-language date field.
//!
//! [`DateInputComp`] glues a [`TemporalInputState`] to the terminal: an
//! auto-submitting [`InputComp`] for the free text, a [`Debouncer`] that
//! delays resolution until typing pauses, and a popover holding a
//! [`CalendarComp`] and (with time display on) a time-of-day editor.
//!
//! The owner learns about changes from [`DateInputComp::parse_change_action`]
//! and pushes its value back with [`DateInputComp::sync_external`].

use std::time::Duration;

use chrono::{DateTime, FixedOffset};
use color_eyre::Result;
use crossterm::event::KeyCode;
use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph},
};
use tracing::debug;
use tui_input::{Input, backend::crossterm::EventHandler};

use crate::{
    actions::{Action, ActionSender, CompAction},
    config::FieldConfig,
    libs::{
        debounce::Debouncer,
        temporal::{
            ExternalValue, SyncOutcome, TemporalInputState, TemporalSettings, ValueChange,
        },
    },
    page::WidgetExt,
    tui::Event,
    utils::{
        help_msg::{HelpEntry, HelpMsg},
        key_events::KeyEvent,
    },
};

use super::{
    Component,
    calendar::{CALENDAR_SIZE, CalendarBounds, CalendarComp, CalendarOutput},
    input::{InputComp, InputMode},
    new_comp_id,
};

pub(crate) const DEFAULT_PLACEHOLDER: &str = "Tomorrow or next week";

/// Rows taken by the field itself: the text box and the caption.
pub(crate) const FIELD_HEIGHT: u16 = 4;

const TIME_EDITOR_HEIGHT: u16 = 3;

#[derive(Clone, Debug)]
pub(crate) struct DateInputOptions {
    pub placeholder: String,
    pub debounce: Duration,
    pub settings: TemporalSettings,
    pub bounds: CalendarBounds,
    /// Only marks the label
    pub required: bool,
    pub disabled: bool,
}

impl Default for DateInputOptions {
    fn default() -> Self {
        Self {
            placeholder: DEFAULT_PLACEHOLDER.to_string(),
            debounce: Duration::from_millis(200),
            settings: TemporalSettings::default(),
            bounds: CalendarBounds::default(),
            required: false,
            disabled: false,
        }
    }
}

impl From<&FieldConfig> for DateInputOptions {
    fn from(config: &FieldConfig) -> Self {
        Self {
            placeholder: config.placeholder.clone(),
            debounce: Duration::from_millis(config.debounce_ms),
            settings: TemporalSettings {
                show_time: config.show_time,
                canonical: config.canonical,
                ..Default::default()
            },
            bounds: CalendarBounds {
                start_month: config.start_month,
                end_month: config.end_month,
                disabled_after: config.disabled_after,
            },
            ..Default::default()
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) enum Popover {
    #[default]
    Closed,
    Calendar,
    Time,
}

#[derive(Clone, Debug)]
pub(crate) enum DateInputAction {
    Focus(bool),
    /// A debounce timer elapsed
    Resolve(u64),
    OpenCalendar,
    OpenTime,
    ClosePopover,
    TimeKey(KeyEvent),
    ApplyTime,

    /// the value changed, for the owner
    Changed(Option<String>),
}

#[derive(Debug)]
pub(crate) struct DateInputComp {
    id: u64,
    label: String,
    disabled: bool,
    focused: bool,
    popover: Popover,
    /// Where the field was drawn last, the popover hangs below it
    area: Rect,

    state: TemporalInputState,
    debouncer: Debouncer,

    text: InputComp,
    calendar: CalendarComp,
    time: Input,

    tx: ActionSender,
}

impl DateInputComp {
    pub fn new<T: Into<String>>(
        id: u64,
        label: T,
        options: DateInputOptions,
        tx: ActionSender,
    ) -> Self {
        let text_id = new_comp_id(&[id]);
        let calendar_id = new_comp_id(&[id, text_id]);
        let state = TemporalInputState::new(options.settings);
        let label = label.into();
        let title = if options.required {
            format!("{label} *")
        } else {
            label.clone()
        };

        Self {
            id,
            label,
            disabled: options.disabled,
            focused: false,
            popover: Popover::Closed,
            area: Rect::default(),
            debouncer: Debouncer::new(options.debounce),
            text: InputComp::new(text_id, None::<String>, title, Default::default(), tx.clone())
                .set_auto_submit(true)
                .set_placeholder(options.placeholder),
            calendar: CalendarComp::new(
                calendar_id,
                options.bounds,
                state.now().date_naive(),
                tx.clone(),
            ),
            time: Input::default(),
            state,
            tx,
        }
    }

    /// Pin "now", for reproducible parsing.
    pub fn with_reference(mut self, reference: DateTime<FixedOffset>) -> Self {
        self.state = self.state.with_reference(reference);
        self.calendar.set_today(reference.date_naive());
        self
    }

    /// Seed the field with the owner's current value.
    pub fn with_value(mut self, value: Option<ExternalValue>) -> Self {
        self.state = self.state.with_external(value);
        self.text.set_value(self.state.raw_text());
        self
    }

    pub fn get_focus_action(&self, focused: bool) -> Action {
        self.get_action(DateInputAction::Focus(focused))
    }

    /// The canonical value reported by a [`DateInputAction::Changed`] of this
    /// field. `Some(None)` means the value was cleared.
    pub fn parse_change_action(&self, action: &Action) -> Option<Option<String>> {
        match self.unwrap_action(action)? {
            DateInputAction::Changed(value) => Some(value),
            _ => None,
        }
    }

    /// The owner's value changed. An outside value overrides whatever the
    /// user is in the middle of typing.
    pub fn sync_external(&mut self, value: Option<ExternalValue>) -> SyncOutcome {
        let outcome = self.state.sync_external(value);
        match outcome {
            SyncOutcome::Applied => {
                self.debouncer.cancel();
                self.text.set_value(self.state.raw_text());
            }
            SyncOutcome::SelfEcho => {
                debug!(field = %self.label, "own change echoed back");
            }
            SyncOutcome::Unchanged => {}
        }
        outcome
    }

    pub fn reset(&mut self) {
        self.debouncer.cancel();
        self.state.reset();
        self.text.set_value("");
        self.close_popover();
    }

    pub fn value(&self) -> Option<String> {
        self.state.canonical()
    }

    pub fn raw_text(&self) -> &str {
        self.text.value()
    }

    pub fn display_text(&self) -> Option<String> {
        self.state.display_text()
    }

    pub fn state(&self) -> &TemporalInputState {
        &self.state
    }

    pub fn popover(&self) -> Popover {
        self.popover
    }

    pub fn is_typing(&self) -> bool {
        self.text.is_typing()
    }

    pub fn get_help_msg(&self) -> HelpMsg {
        match self.popover {
            Popover::Calendar => CalendarComp::get_help_msg(),
            Popover::Time => vec![
                HelpEntry::new(KeyCode::Enter, "Apply time"),
                HelpEntry::new(KeyCode::Esc, "Back"),
            ]
            .into(),
            Popover::Closed => {
                let mut msg = self.text.get_help_msg();
                if self.focused && !self.disabled {
                    msg.push(HelpEntry::new(KeyCode::Down, "Open calendar"));
                    if !self.is_typing() {
                        msg.push(HelpEntry::new('c', "Open calendar"));
                        if self.state.settings().show_time {
                            msg.push(HelpEntry::new('t', "Edit time"));
                        }
                    }
                }
                msg
            }
        }
    }

    fn get_action(&self, action: DateInputAction) -> Action {
        Action::Comp((CompAction::DateInput(action), self.id))
    }

    fn unwrap_action(&self, action: &Action) -> Option<DateInputAction> {
        match action {
            Action::Comp((CompAction::DateInput(action), id)) if *id == self.id => {
                Some(action.clone())
            }
            _ => None,
        }
    }

    fn report(&self, change: ValueChange) {
        debug!(field = %self.label, value = ?change.0, "date value changed");
        self.tx.send(self.get_action(DateInputAction::Changed(change.0)));
    }

    fn on_text(&mut self, text: String) {
        if text == self.state.raw_text() {
            return;
        }
        self.state.edit_text(text);
        let id = self.id;
        self.debouncer.schedule(&self.tx, |generation| {
            Action::Comp((
                CompAction::DateInput(DateInputAction::Resolve(generation)),
                id,
            ))
        });
    }

    fn on_calendar(&mut self, output: CalendarOutput) {
        match output {
            CalendarOutput::MonthChanged(month) => self.state.set_display_month(month),
            CalendarOutput::Selected(day) => {
                self.debouncer.cancel();
                if let Some(change) = self.state.select_date(day) {
                    self.text.set_value(self.state.raw_text());
                    self.report(change);
                }
                self.close_popover();
            }
            CalendarOutput::Dismissed => self.close_popover(),
        }
    }

    fn open_popover(&mut self, popover: Popover) {
        if self.popover == Popover::Closed {
            self.tx.send(self.text.get_switch_mode_action(InputMode::Idle));
            self.tx.send(Action::SwitchInputMode(true));
        }
        self.popover = popover;
    }

    fn close_popover(&mut self) {
        if self.popover == Popover::Closed {
            return;
        }
        self.popover = Popover::Closed;
        self.tx.send(Action::SwitchInputMode(false));
        if self.focused {
            self.tx
                .send(self.text.get_switch_mode_action(InputMode::Focused));
        }
    }

    fn popover_area(&self, frame_area: Rect) -> Rect {
        let (width, mut height) = CALENDAR_SIZE;
        if self.state.settings().show_time {
            height += TIME_EDITOR_HEIGHT;
        }
        let below = self.area.y.saturating_add(3);
        let y = if below.saturating_add(height) <= frame_area.bottom() {
            below
        } else {
            self.area.y.saturating_sub(height).max(frame_area.y)
        };
        Rect {
            x: self.area.x,
            y,
            width,
            height,
        }
        .intersection(frame_area)
    }

    /// Draw the open popover above everything else. Call after the rest of
    /// the page is rendered.
    pub fn render_popover(&mut self, frame: &mut Frame) {
        if self.popover == Popover::Closed {
            return;
        }
        let area = self.popover_area(frame.area());
        frame.render_widget(Clear, area);

        let [calendar_area, time_area] = Layout::vertical([
            Constraint::Length(CALENDAR_SIZE.1),
            Constraint::Fill(1),
        ])
        .areas(area);
        self.calendar.render(frame, calendar_area);

        if self.state.settings().show_time && !time_area.is_empty() {
            let editing = self.popover == Popover::Time;
            let style = if editing {
                Style::default().fg(Color::Yellow)
            } else {
                Style::default()
            };
            let value = if editing {
                self.time.value().to_string()
            } else {
                self.state.time_text()
            };
            let editor = Paragraph::new(value).block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_type(BorderType::Rounded)
                    .border_style(style)
                    .title("Time"),
            );
            frame.render_widget(editor, time_area);
            if editing {
                let x = self.time.visual_cursor() as u16 + 1;
                frame.set_cursor_position((time_area.x + x, time_area.y + 1));
            }
        }
    }
}

impl Component for DateInputComp {
    fn handle_events(&self, event: &Event) -> Result<()> {
        if self.disabled {
            return Ok(());
        }
        match self.popover {
            Popover::Calendar => self.calendar.handle_events(event),
            Popover::Time => {
                if let Event::Key(key) = event {
                    let action = match key.code {
                        KeyCode::Enter => DateInputAction::ApplyTime,
                        KeyCode::Esc => DateInputAction::ClosePopover,
                        _ => DateInputAction::TimeKey((*key).into()),
                    };
                    self.tx.send(self.get_action(action));
                }
                Ok(())
            }
            Popover::Closed => {
                if !self.focused {
                    return Ok(());
                }
                if let Event::Key(key) = event {
                    let typing = self.is_typing();
                    let action = match key.code {
                        KeyCode::Down => Some(DateInputAction::OpenCalendar),
                        KeyCode::Char('c') if !typing => Some(DateInputAction::OpenCalendar),
                        KeyCode::Char('t') if !typing && self.state.settings().show_time => {
                            Some(DateInputAction::OpenTime)
                        }
                        _ => None,
                    };
                    if let Some(action) = action {
                        self.tx.send(self.get_action(action));
                        return Ok(());
                    }
                }
                self.text.handle_events(event)
            }
        }
    }

    fn update(&mut self, action: &Action) -> Result<()> {
        self.text.update(action)?;
        self.calendar.update(action)?;

        if let Some(text) = self.text.parse_submit_action(action) {
            self.on_text(text);
        }
        if let Some(output) = self.calendar.parse_output(action) {
            self.on_calendar(output);
        }

        let Some(action) = self.unwrap_action(action) else {
            return Ok(());
        };
        match action {
            DateInputAction::Focus(focused) => {
                self.focused = focused;
                if !focused {
                    self.close_popover();
                }
                self.tx.send(self.text.get_switch_mode_action(if focused {
                    InputMode::Focused
                } else {
                    InputMode::Idle
                }));
            }
            DateInputAction::Resolve(generation) => {
                if !self.debouncer.accept(generation) {
                    return Ok(());
                }
                if let Some(change) = self.state.resolve_pending() {
                    self.report(change);
                }
            }
            DateInputAction::OpenCalendar => {
                self.calendar.set_view(
                    self.state.display_month(),
                    self.state.resolved().map(|dt| dt.date()),
                );
                self.open_popover(Popover::Calendar);
            }
            DateInputAction::OpenTime => {
                self.time = Input::from(self.state.time_text());
                self.calendar.set_view(
                    self.state.display_month(),
                    self.state.resolved().map(|dt| dt.date()),
                );
                self.open_popover(Popover::Time);
            }
            DateInputAction::ClosePopover => self.close_popover(),
            DateInputAction::TimeKey(key) => {
                self.time
                    .handle_event(&crossterm::event::Event::Key(key.into()));
            }
            DateInputAction::ApplyTime => {
                match self.state.set_time_of_day(self.time.value()) {
                    Some(change) => {
                        self.debouncer.cancel();
                        self.text.set_value(self.state.raw_text());
                        self.report(change);
                    }
                    None => debug!(time = %self.time.value(), "time not applied"),
                }
                self.close_popover();
            }
            DateInputAction::Changed(_) => {}
        }
        Ok(())
    }
}

impl WidgetExt for DateInputComp {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        self.area = area;
        let [text_area, caption_area] =
            Layout::vertical([Constraint::Length(3), Constraint::Length(1)]).areas(area);

        self.text.render(frame, text_area);
        if self.disabled {
            frame
                .buffer_mut()
                .set_style(text_area, Style::default().add_modifier(Modifier::DIM));
        }

        if let Some(display) = self.state.display_text() {
            let caption = Line::from(vec![
                Span::styled(" Selected date: ", Style::default().fg(Color::DarkGray)),
                Span::styled(display, Style::default().add_modifier(Modifier::BOLD)),
            ]);
            frame.render_widget(caption, caption_area);
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, TimeZone};
    use ratatui::{Terminal, backend::TestBackend};
    use tokio::sync::mpsc::UnboundedReceiver;

    use crate::utils::key_events::test_utils::{get_char_evt, get_key_evt};

    use super::*;

    const WINDOW: Duration = Duration::from_millis(200);

    /// Plays the owning form: collects every reported change and, when
    /// `echo` is on, feeds it straight back like a controlled form field.
    struct Harness {
        field: DateInputComp,
        rx: UnboundedReceiver<Action>,
        changes: Vec<Option<String>>,
        echo: bool,
    }

    impl Harness {
        fn new(show_time: bool, value: Option<&str>) -> Self {
            let (tx, rx) = tokio::sync::mpsc::unbounded_channel();
            let utc = FixedOffset::east_opt(0).unwrap();
            let options = DateInputOptions {
                settings: TemporalSettings {
                    show_time,
                    zone: utc,
                    ..Default::default()
                },
                debounce: WINDOW,
                ..Default::default()
            };
            let field = DateInputComp::new(1, "Date", options, tx.into())
                .with_reference(utc.with_ymd_and_hms(2024, 1, 10, 9, 15, 30).unwrap())
                .with_value(value.map(ExternalValue::from));
            let mut harness = Self {
                field,
                rx,
                changes: vec![],
                echo: false,
            };
            let focus = harness.field.get_focus_action(true);
            harness.field.update(&focus).unwrap();
            harness.pump();
            harness
        }

        fn pump(&mut self) {
            while let Ok(action) = self.rx.try_recv() {
                if let Some(value) = self.field.parse_change_action(&action) {
                    self.changes.push(value.clone());
                    if self.echo {
                        self.field.sync_external(value.map(ExternalValue::Text));
                    }
                }
                self.field.update(&action).unwrap();
            }
        }

        fn feed(&mut self, events: &[Event]) {
            for event in events {
                self.field.handle_events(event).unwrap();
                self.pump();
            }
        }

        fn type_text(&mut self, text: &str) {
            for c in text.chars() {
                self.feed(&[get_char_evt(c)]);
            }
        }

        async fn wait(&mut self, duration: Duration) {
            tokio::time::sleep(duration).await;
            self.pump();
        }
    }

    #[tokio::test(start_paused = true)]
    async fn typing_resolves_once_after_pause() {
        let mut h = Harness::new(false, None);
        h.feed(&[get_key_evt(KeyCode::Enter)]);
        assert!(h.field.is_typing());

        for c in "tomorrow".chars() {
            h.feed(&[get_char_evt(c)]);
            h.wait(Duration::from_millis(50)).await;
        }
        assert!(h.changes.is_empty());

        h.wait(Duration::from_millis(100)).await;
        assert!(h.changes.is_empty());

        h.wait(Duration::from_millis(100)).await;
        assert_eq!(h.changes, vec![Some("2024-01-11T00:00:00.000Z".to_string())]);
        assert_eq!(h.field.raw_text(), "tomorrow");
        assert_eq!(h.field.display_text().as_deref(), Some("January 11, 2024"));
        assert_eq!(
            h.field.state().display_month(),
            NaiveDate::from_ymd_opt(2024, 1, 1)
        );

        h.wait(WINDOW * 3).await;
        assert_eq!(h.changes.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn unparseable_text_is_silent() {
        let mut h = Harness::new(false, Some("2024-03-05"));
        h.feed(&[get_key_evt(KeyCode::Enter)]);
        h.type_text(" blorp");
        h.wait(WINDOW * 2).await;

        assert!(h.changes.is_empty());
        assert_eq!(h.field.value().as_deref(), Some("2024-03-05T00:00:00.000Z"));
        assert_eq!(h.field.raw_text(), "March 5, 2024 blorp");
    }

    #[tokio::test(start_paused = true)]
    async fn cleared_text_reports_absent() {
        let mut h = Harness::new(false, None);
        h.feed(&[get_key_evt(KeyCode::Enter)]);
        h.type_text("x");
        h.feed(&[get_key_evt(KeyCode::Backspace)]);
        h.wait(WINDOW * 2).await;

        assert_eq!(h.changes, vec![None]);
        assert_eq!(h.field.value(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn echoed_value_keeps_typed_text() {
        let mut h = Harness::new(false, None);
        h.echo = true;
        h.feed(&[get_key_evt(KeyCode::Enter)]);
        h.type_text("tomorrow");
        h.wait(WINDOW * 2).await;

        assert_eq!(h.changes.len(), 1);
        assert_eq!(h.field.raw_text(), "tomorrow");
        assert_eq!(h.field.display_text().as_deref(), Some("January 11, 2024"));

        // an unrelated value from the owner is applied and formatted
        let outcome = h
            .field
            .sync_external(Some("2024-03-05T00:00:00.000Z".into()));
        assert_eq!(outcome, SyncOutcome::Applied);
        assert_eq!(h.field.raw_text(), "March 5, 2024");
    }

    #[tokio::test(start_paused = true)]
    async fn external_value_cancels_pending_resolution() {
        let mut h = Harness::new(false, None);
        h.feed(&[get_key_evt(KeyCode::Enter)]);
        h.type_text("tomorrow");
        h.wait(Duration::from_millis(100)).await;

        let outcome = h.field.sync_external(Some(ExternalValue::Timestamp(
            1_709_596_800_000, // 2024-03-05T00:00:00Z
        )));
        assert_eq!(outcome, SyncOutcome::Applied);
        h.wait(WINDOW * 2).await;

        assert!(h.changes.is_empty());
        assert_eq!(h.field.raw_text(), "March 5, 2024");
        assert_eq!(h.field.value().as_deref(), Some("2024-03-05T00:00:00.000Z"));
    }

    #[tokio::test(start_paused = true)]
    async fn calendar_pick_keeps_time_of_day() {
        let mut h = Harness::new(true, Some("2024-01-11T14:30:15.000Z"));
        h.feed(&[get_char_evt('c')]);
        assert_eq!(h.field.popover(), Popover::Calendar);

        h.feed(&[get_key_evt(KeyCode::Right), get_key_evt(KeyCode::Enter)]);
        assert_eq!(h.changes, vec![Some("2024-01-12T14:30:15.000Z".to_string())]);
        assert_eq!(h.field.popover(), Popover::Closed);
        assert_eq!(h.field.raw_text(), "January 12, 2024 at 02:30 PM");
    }

    #[tokio::test(start_paused = true)]
    async fn calendar_pick_zeroes_time_without_time_display() {
        let mut h = Harness::new(false, Some("2024-01-11T14:30:00.000Z"));
        h.feed(&[get_key_evt(KeyCode::Down), get_key_evt(KeyCode::Enter)]);
        assert_eq!(h.changes, vec![Some("2024-01-11T00:00:00.000Z".to_string())]);
        assert_eq!(h.field.raw_text(), "January 11, 2024");
    }

    #[tokio::test(start_paused = true)]
    async fn calendar_clear_and_dismiss() {
        let mut h = Harness::new(false, Some("2024-01-11"));
        h.feed(&[get_char_evt('c'), get_key_evt(KeyCode::Esc)]);
        assert_eq!(h.field.popover(), Popover::Closed);
        assert!(h.changes.is_empty());

        h.feed(&[get_char_evt('c'), get_char_evt('x')]);
        assert_eq!(h.changes, vec![None]);
        assert_eq!(h.field.raw_text(), "");
        assert_eq!(h.field.display_text(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn time_editor_sets_time_of_day() {
        let mut h = Harness::new(true, Some("2024-01-11T00:00:00.000Z"));
        h.feed(&[get_char_evt('t')]);
        assert_eq!(h.field.popover(), Popover::Time);

        for _ in 0.."00:00:00".len() {
            h.feed(&[get_key_evt(KeyCode::Backspace)]);
        }
        h.type_text("14:30:00");
        assert!(h.changes.is_empty());

        h.feed(&[get_key_evt(KeyCode::Enter)]);
        assert_eq!(h.changes, vec![Some("2024-01-11T14:30:00.000Z".to_string())]);
        assert_eq!(h.field.popover(), Popover::Closed);
        assert_eq!(
            h.field.display_text().as_deref(),
            Some("January 11, 2024 at 02:30 PM")
        );
    }

    #[tokio::test(start_paused = true)]
    async fn reset_forgets_pending_text() {
        let mut h = Harness::new(false, Some("2024-01-11"));
        h.feed(&[get_key_evt(KeyCode::Enter)]);
        h.type_text(" next week");
        h.field.reset();
        h.wait(WINDOW * 2).await;

        assert!(h.changes.is_empty());
        assert_eq!(h.field.raw_text(), "");
        assert_eq!(h.field.value(), None);
    }

    #[test]
    fn disabled_field_ignores_keys() {
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
        let options = DateInputOptions {
            disabled: true,
            required: true,
            ..Default::default()
        };
        let mut field = DateInputComp::new(1, "Date", options, tx.into());
        let focus = field.get_focus_action(true);
        field.update(&focus).unwrap();
        while rx.try_recv().is_ok() {}

        for event in [
            get_char_evt('c'),
            get_key_evt(KeyCode::Down),
            get_key_evt(KeyCode::Enter),
        ] {
            field.handle_events(&event).unwrap();
        }
        assert!(rx.try_recv().is_err());
        assert_eq!(field.popover(), Popover::Closed);
    }

    #[test]
    fn render_caption() {
        let mut h = Harness::new(false, Some("2024-01-11"));
        let mut terminal = Terminal::new(TestBackend::new(40, FIELD_HEIGHT)).unwrap();
        terminal.draw(|f| h.field.render(f, f.area())).unwrap();

        let buffer = terminal.backend().buffer();
        let caption = (0..40)
            .map(|x| buffer[(x, 3)].symbol().to_string())
            .collect::<String>();
        assert!(caption.contains("Selected date: January 11, 2024"));
        let text = (0..40)
            .map(|x| buffer[(x, 1)].symbol().to_string())
            .collect::<String>();
        assert!(text.contains("January 11, 2024"));
    }
}
