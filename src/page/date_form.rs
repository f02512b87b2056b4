//! The demo forms that own a date field: a name, a date, submit and clear.
//!
//! Validation only starts once the user has tried to submit. From then on
//! every change revalidates, so errors disappear as soon as they are fixed.

use crossterm::event::{KeyCode, KeyModifiers};
use ratatui::{
    Frame,
    layout::{Constraint, Flex, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph, Wrap},
};
use tracing::info;

use crate::{
    actions::{Action, ActionSender, LayerManageAction},
    app::layer_manager::EventHandlingStatus,
    component::{
        Component,
        date_input::{DateInputComp, DateInputOptions, FIELD_HEIGHT, Popover},
        input::{InputComp, InputMode},
        new_comp_id,
    },
    config::FieldConfig,
    libs::{
        natural_date::parse_iso,
        temporal::{ExternalValue, format_display},
        validation::{FieldError, FormErrors, validate_form},
    },
    tui::Event,
    utils::help_msg::{HelpEntry, HelpMsg},
};

use super::{EventLoopParticipant, Layer, WidgetExt};

/// How long the submission toast stays up, in ticks.
const TOAST_TICKS: u16 = 12;

const CARD_WIDTH: u16 = 64;

#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display, strum::EnumIter)]
pub enum FormVariant {
    #[strum(to_string = "Date Input Form")]
    DateOnly,
    #[strum(to_string = "Date Time Input Form")]
    DateTime,
}

impl FormVariant {
    pub fn description(&self) -> &'static str {
        "Enter your name and birth date to submit the form."
    }

    pub fn show_time(&self) -> bool {
        matches!(self, FormVariant::DateTime)
    }

    fn placeholder(&self) -> Option<&'static str> {
        match self {
            FormVariant::DateOnly => None,
            FormVariant::DateTime => Some("YYYY-MM-DD HH:MM"),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FormField {
    #[default]
    Name,
    Date,
}

impl FormField {
    fn next(&self) -> Self {
        match self {
            FormField::Name => FormField::Date,
            FormField::Date => FormField::Name,
        }
    }
    fn prev(&self) -> Self {
        // two fields, both directions meet
        self.next()
    }
}

#[derive(Clone, Debug)]
pub enum DateFormAction {
    Focus(FormField),
    Submit,
    Reset,
}

impl From<DateFormAction> for Action {
    fn from(value: DateFormAction) -> Self {
        Action::DateForm(value)
    }
}

#[derive(Clone, Debug)]
struct Toast {
    title: String,
    description: String,
    ticks_left: u16,
}

pub(crate) struct DateForm {
    variant: FormVariant,
    focus: FormField,

    name_input: InputComp,
    date_input: DateInputComp,

    /// The form's own copy of the field values
    name: String,
    date: Option<String>,

    errors: FormErrors,
    submitted_once: bool,
    toast: Option<Toast>,
    input_mode: bool,

    tx: ActionSender,
}

impl DateForm {
    pub fn new(variant: FormVariant, field: &FieldConfig, tx: ActionSender) -> Self {
        let name_id = new_comp_id(&[]);
        let date_id = new_comp_id(&[name_id]);

        let mut options = DateInputOptions::from(field);
        options.settings.show_time |= variant.show_time();
        if let Some(placeholder) = variant.placeholder() {
            options.placeholder = placeholder.to_string();
        }

        Self {
            variant,
            focus: FormField::default(),
            name_input: InputComp::new(
                name_id,
                None::<String>,
                "Name",
                Default::default(),
                tx.clone(),
            )
            .set_auto_submit(true)
            .set_placeholder("m@example.com"),
            date_input: DateInputComp::new(date_id, "Date", options, tx.clone()),
            name: String::new(),
            date: None,
            errors: FormErrors::default(),
            submitted_once: false,
            toast: None,
            input_mode: false,
            tx,
        }
    }

    #[cfg(test)]
    pub fn with_reference(mut self, reference: chrono::DateTime<chrono::FixedOffset>) -> Self {
        self.date_input = self.date_input.with_reference(reference);
        self
    }

    fn focus_actions(&self, focus: FormField) -> [Action; 2] {
        [
            self.name_input.get_switch_mode_action(if focus == FormField::Name {
                InputMode::Focused
            } else {
                InputMode::Idle
            }),
            self.date_input.get_focus_action(focus == FormField::Date),
        ]
    }

    fn revalidate(&mut self) {
        if self.submitted_once {
            self.errors = validate_form(&self.name, self.date.as_deref());
        }
    }

    fn submit(&mut self) {
        self.submitted_once = true;
        self.errors = validate_form(&self.name, self.date.as_deref());
        if !self.errors.is_valid() {
            info!(errors = ?self.errors, "form submission rejected");
            return;
        }

        let zone = self.date_input.state().settings().zone;
        let date = self
            .date
            .as_deref()
            .and_then(|value| parse_iso(value, &zone))
            .map(|dt| format_display(dt, true))
            .unwrap_or_else(|| "None".to_string());
        info!(name = %self.name, date = ?self.date, "form submitted");
        self.toast = Some(Toast {
            title: "User submitted successfully!".to_string(),
            description: format!("Name: {}, Date: {}", self.name, date),
            ticks_left: TOAST_TICKS,
        });
        self.reset();
    }

    fn reset(&mut self) {
        self.name.clear();
        self.name_input.set_value("");
        self.date = None;
        self.date_input.reset();
        self.date_input.sync_external(None);
        self.errors = FormErrors::default();
        self.submitted_once = false;
        self.tx.send(DateFormAction::Focus(FormField::Name));
    }

    fn is_busy(&self) -> bool {
        self.input_mode || self.date_input.popover() != Popover::Closed
    }

    fn render_toast(&self, frame: &mut Frame, area: Rect) {
        let Some(toast) = &self.toast else {
            return;
        };
        let width = area.width.min(48);
        let [toast_area] = Layout::horizontal([Constraint::Length(width)])
            .flex(Flex::End)
            .areas(Rect {
                height: area.height.min(5),
                ..area
            });
        frame.render_widget(Clear, toast_area);
        let paragraph = Paragraph::new(toast.description.as_str())
            .wrap(Wrap { trim: true })
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_type(BorderType::Rounded)
                    .border_style(Style::default().fg(Color::Green))
                    .title(toast.title.as_str()),
            );
        frame.render_widget(paragraph, toast_area);
    }
}

fn error_line(error: &Option<FieldError>) -> Line<'static> {
    match error {
        Some(error) => Line::styled(format!(" {error}"), Style::default().fg(Color::Red)),
        None => Line::default(),
    }
}

impl EventLoopParticipant for DateForm {
    fn handle_events(&self, event: &Event) -> color_eyre::Result<EventHandlingStatus> {
        if self.is_busy() {
            match self.focus {
                FormField::Name => self.name_input.handle_events(event)?,
                FormField::Date => self.date_input.handle_events(event)?,
            }
            return Ok(EventHandlingStatus::Consumed);
        }

        let Event::Key(key) = event else {
            return Ok(EventHandlingStatus::ShouldPropagate);
        };
        match (key.modifiers, key.code) {
            (_, KeyCode::Tab) | (KeyModifiers::NONE, KeyCode::Char('j')) => {
                self.tx.send(DateFormAction::Focus(self.focus.next()));
            }
            (_, KeyCode::BackTab) | (KeyModifiers::NONE, KeyCode::Char('k')) => {
                self.tx.send(DateFormAction::Focus(self.focus.prev()));
            }
            (KeyModifiers::NONE, KeyCode::Char('s')) => self.tx.send(DateFormAction::Submit),
            (KeyModifiers::NONE, KeyCode::Char('r')) => self.tx.send(DateFormAction::Reset),
            (_, KeyCode::Esc) => self.tx.send(LayerManageAction::Pop),
            (_, KeyCode::Char('q' | '?')) => return Ok(EventHandlingStatus::ShouldPropagate),
            _ => match self.focus {
                FormField::Name => self.name_input.handle_events(event)?,
                FormField::Date => self.date_input.handle_events(event)?,
            },
        }
        Ok(EventHandlingStatus::Consumed)
    }

    fn update(&mut self, action: &Action) -> color_eyre::Result<()> {
        if let Action::SwitchInputMode(mode) = action {
            self.input_mode = *mode;
        }
        if let Some(name) = self.name_input.parse_submit_action(action) {
            self.name = name;
            self.revalidate();
        }
        if let Some(value) = self.date_input.parse_change_action(action) {
            self.date = value.clone();
            self.date_input.sync_external(value.map(ExternalValue::Text));
            self.revalidate();
        }

        self.name_input.update(action)?;
        self.date_input.update(action)?;

        match action {
            Action::Tick => {
                if let Some(toast) = &mut self.toast {
                    toast.ticks_left = toast.ticks_left.saturating_sub(1);
                    if toast.ticks_left == 0 {
                        self.toast = None;
                    }
                }
            }
            Action::DateForm(form_action) => match form_action {
                DateFormAction::Focus(field) => {
                    self.focus = *field;
                    for action in self.focus_actions(*field) {
                        self.tx.send(action);
                    }
                }
                DateFormAction::Submit => self.submit(),
                DateFormAction::Reset => {
                    info!("form reset");
                    self.reset();
                }
            },
            _ => {}
        }
        Ok(())
    }
}

impl Layer for DateForm {
    fn init(&mut self) {
        self.tx.send(DateFormAction::Focus(FormField::Name));
    }

    fn get_help_msg(&self) -> HelpMsg {
        if self.date_input.popover() != Popover::Closed {
            return self.date_input.get_help_msg();
        }
        let mut msg = match self.focus {
            FormField::Name => self.name_input.get_help_msg(),
            FormField::Date => self.date_input.get_help_msg(),
        };
        if !self.input_mode {
            msg.extend(&HelpMsg::from(vec![
                HelpEntry::new_plain("tab/j/k", "Next field"),
                HelpEntry::new('s', "Submit"),
                HelpEntry::new('r', "Clear"),
                HelpEntry::new(KeyCode::Esc, "Back"),
                HelpEntry::new('?', "Help"),
            ]));
        }
        msg
    }
}

impl WidgetExt for DateForm {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let [main_area, help_area] =
            Layout::vertical([Constraint::Fill(1), Constraint::Length(3)]).areas(area);
        let [card_area] = Layout::horizontal([Constraint::Length(CARD_WIDTH.min(main_area.width))])
            .flex(Flex::Center)
            .areas(main_area);

        let card = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .title(Line::from(self.variant.to_string()).centered());
        let inner = card.inner(card_area).inner(ratatui::layout::Margin::new(1, 0));
        frame.render_widget(card, card_area);

        let [
            desc_area,
            _,
            name_area,
            name_err_area,
            date_area,
            date_err_area,
            buttons_area,
        ] = Layout::vertical([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(3),
            Constraint::Length(1),
            Constraint::Length(FIELD_HEIGHT),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .areas(inner);

        frame.render_widget(
            Line::styled(self.variant.description(), Style::default().fg(Color::DarkGray)),
            desc_area,
        );
        self.name_input.render(frame, name_area);
        frame.render_widget(error_line(&self.errors.name), name_err_area);
        self.date_input.render(frame, date_area);
        frame.render_widget(error_line(&self.errors.date), date_err_area);

        let buttons = Line::from(vec![
            Span::styled(" Submit (s) ", Style::default().add_modifier(Modifier::REVERSED)),
            Span::raw("  "),
            Span::styled(" Clear (r) ", Style::default().add_modifier(Modifier::BOLD)),
        ]);
        frame.render_widget(buttons, buttons_area);

        self.get_help_msg().render(frame, help_area);
        self.render_toast(frame, main_area);
        self.date_input.render_popover(frame);
    }
}

#[cfg(test)]
mod tests {
    use chrono::{FixedOffset, TimeZone};
    use ratatui::{Terminal, backend::TestBackend};
    use std::time::Duration;
    use tokio::sync::mpsc::UnboundedReceiver;

    use crate::utils::key_events::test_utils::{get_char_evt, get_key_evt};

    use super::*;

    fn get_test_objs(variant: FormVariant) -> (UnboundedReceiver<Action>, DateForm) {
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
        let utc = FixedOffset::east_opt(0).unwrap();
        let mut page = DateForm::new(variant, &FieldConfig::default(), tx.into())
            .with_reference(utc.with_ymd_and_hms(2024, 1, 10, 9, 15, 30).unwrap());
        page.init();
        page.drain_actions(&mut rx);
        (rx, page)
    }

    fn feed(page: &mut DateForm, rx: &mut UnboundedReceiver<Action>, events: &[Event]) {
        for event in events {
            page.event_loop_once(rx, event.clone());
        }
    }

    fn type_text(page: &mut DateForm, rx: &mut UnboundedReceiver<Action>, text: &str) {
        for c in text.chars() {
            page.event_loop_once(rx, get_char_evt(c));
        }
    }

    fn screen(page: &mut DateForm) -> Vec<String> {
        let mut terminal = Terminal::new(TestBackend::new(80, 25)).unwrap();
        terminal.draw(|f| page.render(f, f.area())).unwrap();
        let buffer = terminal.backend().buffer();
        (0..buffer.area.height)
            .map(|y| {
                (0..buffer.area.width)
                    .map(|x| buffer[(x, y)].symbol().to_string())
                    .collect()
            })
            .collect()
    }

    #[test]
    fn test_focus_cycle() {
        let (mut rx, mut page) = get_test_objs(FormVariant::DateOnly);
        assert_eq!(page.focus, FormField::Name);
        assert_eq!(page.name_input.mode(), &InputMode::Focused);

        page.event_loop_once(&mut rx, get_key_evt(KeyCode::Tab));
        assert_eq!(page.focus, FormField::Date);
        assert_eq!(page.name_input.mode(), &InputMode::Idle);

        page.event_loop_once(&mut rx, 'k'.into());
        assert_eq!(page.focus, FormField::Name);
        page.event_loop_once(&mut rx, 'j'.into());
        assert_eq!(page.focus, FormField::Date);
    }

    #[test]
    fn test_quit_and_help_propagate() {
        let (_rx, page) = get_test_objs(FormVariant::DateOnly);
        assert_eq!(
            page.handle_events(&'q'.into()).unwrap(),
            EventHandlingStatus::ShouldPropagate
        );
        assert_eq!(
            page.handle_events(&'?'.into()).unwrap(),
            EventHandlingStatus::ShouldPropagate
        );
    }

    #[test]
    fn test_typing_claims_every_key() {
        let (mut rx, mut page) = get_test_objs(FormVariant::DateOnly);
        feed(&mut page, &mut rx, &[get_key_evt(KeyCode::Enter)]);
        assert!(page.input_mode);
        type_text(&mut page, &mut rx, "quinn");
        assert_eq!(page.name, "quinn");
        assert_eq!(page.focus, FormField::Name);

        feed(&mut page, &mut rx, &[get_key_evt(KeyCode::Esc)]);
        assert!(!page.input_mode);
        assert_eq!(page.name_input.value(), "quinn");
    }

    #[test]
    fn test_validation_after_first_submit() {
        let (mut rx, mut page) = get_test_objs(FormVariant::DateOnly);
        assert!(page.errors.is_valid());

        page.event_loop_once(&mut rx, 's'.into());
        assert_eq!(page.errors.name, Some(FieldError::NameRequired));
        assert!(page.toast.is_none());
        assert!(
            screen(&mut page)
                .iter()
                .any(|line| line.contains("Name is required"))
        );

        // revalidates on every change from now on
        feed(&mut page, &mut rx, &[get_key_evt(KeyCode::Enter)]);
        type_text(&mut page, &mut rx, "a");
        assert!(page.errors.is_valid());
        type_text(&mut page, &mut rx, &"b".repeat(50));
        assert_eq!(
            page.errors.name,
            Some(FieldError::NameTooLong { max: 50 })
        );
    }

    #[test]
    fn test_reset_clears_everything() {
        let (mut rx, mut page) = get_test_objs(FormVariant::DateOnly);
        page.event_loop_once(&mut rx, 's'.into());
        feed(&mut page, &mut rx, &[get_key_evt(KeyCode::Enter)]);
        type_text(&mut page, &mut rx, "quinn");
        feed(&mut page, &mut rx, &[get_key_evt(KeyCode::Esc)]);

        page.event_loop_once(&mut rx, 'r'.into());
        assert_eq!(page.name, "");
        assert_eq!(page.name_input.value(), "");
        assert!(!page.submitted_once);
        assert!(page.errors.is_valid());
        assert_eq!(page.focus, FormField::Name);
    }

    #[tokio::test(start_paused = true)]
    async fn test_submit_with_resolved_date() {
        let (mut rx, mut page) = get_test_objs(FormVariant::DateTime);
        feed(&mut page, &mut rx, &[get_key_evt(KeyCode::Enter)]);
        type_text(&mut page, &mut rx, "quinn");
        feed(
            &mut page,
            &mut rx,
            &[get_key_evt(KeyCode::Esc), get_key_evt(KeyCode::Tab), get_key_evt(KeyCode::Enter)],
        );
        type_text(&mut page, &mut rx, "tomorrow at 3pm");
        assert_eq!(page.date, None);

        tokio::time::sleep(Duration::from_millis(250)).await;
        page.drain_actions(&mut rx);
        assert_eq!(page.date.as_deref(), Some("2024-01-11T15:00:00.000Z"));
        // the echo did not rewrite what was typed
        assert_eq!(page.date_input.raw_text(), "tomorrow at 3pm");

        feed(&mut page, &mut rx, &[get_key_evt(KeyCode::Enter)]);
        page.event_loop_once(&mut rx, 's'.into());
        let toast = page.toast.clone().unwrap();
        assert_eq!(toast.title, "User submitted successfully!");
        assert_eq!(
            toast.description,
            "Name: quinn, Date: January 11, 2024 at 03:00 PM"
        );
        assert_eq!(page.name, "");
        assert_eq!(page.date, None);
        assert_eq!(page.date_input.raw_text(), "");
        assert_eq!(page.focus, FormField::Name);

        for _ in 0..TOAST_TICKS {
            page.event_loop_once_with_action(&mut rx, Action::Tick);
        }
        assert!(page.toast.is_none());
    }

    #[test]
    fn test_submit_without_date() {
        let (mut rx, mut page) = get_test_objs(FormVariant::DateOnly);
        feed(&mut page, &mut rx, &[get_key_evt(KeyCode::Enter)]);
        type_text(&mut page, &mut rx, "quinn");
        feed(&mut page, &mut rx, &[get_key_evt(KeyCode::Esc)]);
        page.event_loop_once(&mut rx, 's'.into());
        assert_eq!(
            page.toast.as_ref().map(|t| t.description.as_str()),
            Some("Name: quinn, Date: None")
        );
    }

    #[test]
    fn test_render_variant() {
        let (_rx, mut page) = get_test_objs(FormVariant::DateTime);
        let lines = screen(&mut page);
        assert!(lines[0].contains("Date Time Input Form"));
        assert!(lines[1].contains("Enter your name and birth date to submit the form."));
        assert!(lines.iter().any(|line| line.contains("m@example.com")));
        assert!(lines.iter().any(|line| line.contains("YYYY-MM-DD HH:MM")));
        assert!(lines.iter().any(|line| line.contains("Submit (s)")));
    }
}
