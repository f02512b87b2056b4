use crossterm::event::KeyCode;
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Text},
    widgets::{Block, BorderType, Borders, HighlightSpacing, List, ListItem, ListState, Paragraph},
};
use strum::IntoEnumIterator;

use crate::{
    actions::{Action, ActionSender, LayerManageAction, Layers, TargetLayer},
    app::layer_manager::EventHandlingStatus,
    tui::Event,
    utils::help_msg::{HelpEntry, HelpMsg},
};

use super::{EventLoopParticipant, Layer, WidgetExt, date_form::FormVariant};

/// The gallery index, one entry per demo form.
pub struct Home {
    forms: Vec<FormVariant>,
    list_state: ListState,
    tx: ActionSender,
}

#[derive(Clone, Debug)]
pub enum HomeAction {
    Up,
    Down,
}

impl From<HomeAction> for Action {
    fn from(value: HomeAction) -> Self {
        Action::Home(value)
    }
}

impl Home {
    pub fn new(tx: ActionSender) -> Self {
        Self {
            forms: FormVariant::iter().collect(),
            list_state: ListState::default().with_selected(Some(0)),
            tx,
        }
    }

    fn selected(&self) -> Option<FormVariant> {
        self.list_state
            .selected()
            .and_then(|i| self.forms.get(i).copied())
    }
}

impl EventLoopParticipant for Home {
    fn handle_events(&self, event: &Event) -> color_eyre::Result<EventHandlingStatus> {
        let Event::Key(key) = event else {
            return Ok(EventHandlingStatus::ShouldPropagate);
        };
        match key.code {
            KeyCode::Char('j') | KeyCode::Down => self.tx.send(HomeAction::Down),
            KeyCode::Char('k') | KeyCode::Up => self.tx.send(HomeAction::Up),
            KeyCode::Enter => {
                if let Some(variant) = self.selected() {
                    self.tx.send(LayerManageAction::Push(TargetLayer {
                        layer: Layers::DateForm(variant),
                        render_self: false,
                    }));
                }
            }
            _ => return Ok(EventHandlingStatus::ShouldPropagate),
        }
        Ok(EventHandlingStatus::Consumed)
    }

    fn update(&mut self, action: &Action) -> color_eyre::Result<()> {
        if let Action::Home(action) = action {
            match action {
                HomeAction::Up => self.list_state.select_previous(),
                HomeAction::Down => {
                    // select_next runs past the end until the next render clamps it
                    let last = self.forms.len().saturating_sub(1);
                    let next = self.list_state.selected().map_or(0, |i| (i + 1).min(last));
                    self.list_state.select(Some(next));
                }
            }
        }
        Ok(())
    }
}

impl Layer for Home {
    fn get_help_msg(&self) -> HelpMsg {
        vec![
            HelpEntry::new_plain("j/k", "Move"),
            HelpEntry::new(KeyCode::Enter, "Open form"),
            HelpEntry::new('?', "Help"),
            HelpEntry::new('q', "Quit"),
        ]
        .into()
    }
}

impl WidgetExt for Home {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let [title_area, list_area, help_area] = Layout::vertical([
            Constraint::Length(4),
            Constraint::Fill(1),
            Constraint::Length(3),
        ])
        .areas(area);

        frame.render_widget(
            Paragraph::new(Text::from(vec![
                Line::from("Natural-language date input"),
                Line::styled(
                    "Type dates like \"tomorrow\" or \"next friday at 3pm\"",
                    Style::default().fg(Color::DarkGray),
                ),
            ]))
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::BOTTOM)),
            title_area,
        );

        let items: Vec<ListItem> = self
            .forms
            .iter()
            .map(|form| ListItem::from(format!("  {form}")))
            .collect();
        let list = List::new(items)
            .block(
                Block::default()
                    .title("Forms")
                    .borders(Borders::ALL)
                    .border_type(BorderType::Rounded),
            )
            .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
            .highlight_spacing(HighlightSpacing::Always);
        frame.render_stateful_widget(list, list_area, &mut self.list_state);

        self.get_help_msg().render(frame, help_area);
    }
}

#[cfg(test)]
mod tests {
    use ratatui::{Terminal, backend::TestBackend};

    use crate::utils::key_events::test_utils::get_key_evt;

    use super::*;

    #[test]
    fn test_navigation() {
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
        let mut home = Home::new(tx.into());
        assert_eq!(home.selected(), Some(FormVariant::DateOnly));

        home.event_loop_once(&mut rx, 'j'.into());
        assert_eq!(home.selected(), Some(FormVariant::DateTime));
        home.event_loop_once(&mut rx, 'j'.into());
        assert_eq!(home.selected(), Some(FormVariant::DateTime));
        home.event_loop_once(&mut rx, 'k'.into());
        assert_eq!(home.selected(), Some(FormVariant::DateOnly));
    }

    #[test]
    fn test_enter_opens_form() {
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
        let mut home = Home::new(tx.into());
        home.event_loop_once(&mut rx, get_key_evt(KeyCode::Down));
        home.handle_event_with_status_check(&get_key_evt(KeyCode::Enter));
        match rx.try_recv() {
            Ok(Action::Layer(LayerManageAction::Push(target))) => {
                assert!(matches!(
                    target.layer,
                    Layers::DateForm(FormVariant::DateTime)
                ));
                assert!(!target.render_self);
            }
            other => panic!("expected a push, got {other:?}"),
        }
    }

    #[test]
    fn test_unhandled_keys_propagate() {
        let (tx, _rx) = tokio::sync::mpsc::unbounded_channel();
        let home = Home::new(tx.into());
        assert_eq!(
            home.handle_events(&'q'.into()).unwrap(),
            EventHandlingStatus::ShouldPropagate
        );
    }

    #[test]
    fn test_render() {
        let (tx, _rx) = tokio::sync::mpsc::unbounded_channel();
        let mut home = Home::new(tx.into());
        let mut terminal = Terminal::new(TestBackend::new(60, 12)).unwrap();
        terminal.draw(|f| home.render(f, f.area())).unwrap();
        let buffer = terminal.backend().buffer();
        let row = |y: u16| {
            (0..60)
                .map(|x| buffer[(x, y)].symbol().to_string())
                .collect::<String>()
        };
        assert!(row(0).contains("Natural-language date input"));
        assert!(row(5).contains("Date Input Form"));
        assert!(row(6).contains("Date Time Input Form"));
        assert!(row(10).contains("Open form: enter"));
    }
}
