use color_eyre::Result;
use crossterm::event::KeyCode;
use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Modifier, Style},
    widgets::{Block, BorderType, Borders, Paragraph},
};
use tui_input::{Input, backend::crossterm::EventHandler};

use crate::{
    actions::{Action, ActionSender, CompAction},
    page::WidgetExt,
    tui::Event,
    utils::help_msg::{HelpEntry, HelpMsg},
    utils::key_events::KeyEvent,
};

#[derive(Clone, Debug)]
/// A input Component
///
/// Set the focus state: send a [`InputComp::get_switch_mode_action()`] Action
///
/// Get value: parse an action with [`InputComp::parse_submit_action`]
pub(crate) struct InputComp {
    id: u64,
    input: Input,
    mode: InputMode,
    /// Mirror of the app-wide input mode, kept in sync from
    /// [`Action::SwitchInputMode`]
    input_mode: bool,

    title: String,
    placeholder: Option<String>,

    auto_submit: bool,
    control_keys: InputCompCtrlKeys,

    tx: ActionSender,
}

#[derive(Default, Clone, Debug, PartialEq, Eq)]
pub(crate) enum InputMode {
    #[default]
    Idle,
    Focused,
}

#[derive(Clone, Debug)]
pub(crate) struct InputCompCtrlKeys {
    enter_keys: Vec<KeyEvent>,
    submit_keys: Vec<KeyEvent>,
    exit_keys: Vec<KeyEvent>,
}

impl Default for InputCompCtrlKeys {
    fn default() -> Self {
        Self {
            enter_keys: vec![KeyCode::Enter.into()],
            submit_keys: vec![KeyCode::Enter.into()],
            exit_keys: vec![KeyCode::Esc.into()],
        }
    }
}

#[derive(Clone, Debug)]
pub(crate) enum InputAction {
    SwitchMode(InputMode),
    HandleKey(KeyEvent),
    HandlePaste(String),
    Exit(),
    DirectExit(),
    SubmitExit(String),

    /// the event owner should pay attention to
    Submit(String),
}

impl InputComp {
    pub fn new<T: Into<String>, K: Into<String>>(
        id: u64,
        from: Option<T>,
        title: K,
        ctrl_keys: InputCompCtrlKeys,
        tx: ActionSender,
    ) -> Self {
        Self {
            id,
            input: if let Some(from) = from {
                Input::from(from.into())
            } else {
                Input::default()
            },
            mode: InputMode::default(),
            input_mode: false,
            title: title.into(),
            placeholder: None,
            auto_submit: false,
            control_keys: ctrl_keys,
            tx,
        }
    }

    pub fn get_switch_mode_action(&self, mode: InputMode) -> Action {
        self.get_action(InputAction::SwitchMode(mode))
    }

    pub fn parse_submit_action(&self, action: &Action) -> Option<String> {
        if let Some(input_action) = self.unwrap_action(action) {
            match input_action {
                InputAction::Submit(s) => Some(s),
                _ => None,
            }
        } else {
            None
        }
    }

    fn get_action(&self, action: InputAction) -> Action {
        Action::Comp((CompAction::Input(action), self.id))
    }

    fn unwrap_action(&self, action: &Action) -> Option<InputAction> {
        if let Action::Comp((comp_action, id)) = action {
            if *id != self.id {
                return None;
            };
            if let CompAction::Input(action) = comp_action {
                Some(action.clone())
            } else {
                None
            }
        } else {
            None
        }
    }

    pub fn set_auto_submit(self, b: bool) -> Self {
        Self {
            auto_submit: b,
            ..self
        }
    }

    pub fn set_placeholder<T: Into<String>>(self, placeholder: T) -> Self {
        Self {
            placeholder: Some(placeholder.into()),
            ..self
        }
    }

    /// Replace the text without reporting a submit.
    pub fn set_value<T: Into<String>>(&mut self, value: T) {
        let value = value.into();
        if value != self.input.value() {
            self.input = Input::from(value);
        }
    }

    pub fn value(&self) -> &str {
        self.input.value()
    }

    pub fn mode(&self) -> &InputMode {
        &self.mode
    }

    pub fn is_typing(&self) -> bool {
        self.mode == InputMode::Focused && self.input_mode
    }

    pub fn get_help_msg(&self) -> HelpMsg {
        let mut msg = HelpMsg::default();
        if matches!(self.mode, InputMode::Focused) {
            if self.input_mode {
                if self.auto_submit {
                    msg.push(HelpEntry::new(
                        self.control_keys.submit_keys[0].clone(),
                        "quit input",
                    ));
                } else {
                    msg.push(HelpEntry::new(
                        self.control_keys.exit_keys[0].clone(),
                        "quit input",
                    ));
                    msg.push(HelpEntry::new(
                        self.control_keys.submit_keys[0].clone(),
                        "submit input",
                    ));
                }
            } else {
                msg.push(HelpEntry::new(
                    self.control_keys.enter_keys[0].clone(),
                    "Start input",
                ));
            }
        }
        msg
    }
}

impl super::Component for InputComp {
    fn handle_events(&self, event: &Event) -> Result<()> {
        match self.mode {
            InputMode::Idle => (),
            InputMode::Focused => {
                if self.input_mode {
                    match event {
                        Event::Key(key) => {
                            if self.control_keys.submit_keys.contains(&(*key).into()) {
                                self.tx.send(self.get_action(InputAction::SubmitExit(
                                    self.input.value().to_string(),
                                )))
                            } else if self.control_keys.exit_keys.contains(&(*key).into()) {
                                self.tx.send(self.get_action(InputAction::DirectExit()))
                            } else {
                                self.tx
                                    .send(self.get_action(InputAction::HandleKey((*key).into())))
                            }
                        }
                        Event::Paste(s) => self
                            .tx
                            .send(self.get_action(InputAction::HandlePaste(s.clone()))),
                        _ => (),
                    }
                } else if let Event::Key(key) = event {
                    if self.control_keys.enter_keys.contains(&(*key).into()) {
                        self.tx.send(Action::SwitchInputMode(true))
                    }
                }
            }
        };
        Ok(())
    }

    fn update(&mut self, action: &Action) -> Result<()> {
        if let Action::SwitchInputMode(mode) = action {
            self.input_mode = *mode;
            return Ok(());
        }
        let Some(action) = self.unwrap_action(action) else {
            return Ok(());
        };

        match action {
            InputAction::SwitchMode(input_mode) => {
                self.mode = input_mode;
                Ok(())
            }
            InputAction::HandleKey(key_event) => {
                self.input
                    .handle_event(&crossterm::event::Event::Key(key_event.into()));
                if self.auto_submit {
                    self.tx
                        .send(self.get_action(InputAction::Submit(self.input.value().to_string())))
                }
                Ok(())
            }
            InputAction::HandlePaste(string) => {
                string.chars().for_each(|c| {
                    self.input.handle(tui_input::InputRequest::InsertChar(c));
                });
                if self.auto_submit {
                    self.tx
                        .send(self.get_action(InputAction::Submit(self.input.value().to_string())))
                }
                Ok(())
            }
            InputAction::SubmitExit(string) => {
                self.tx.send(self.get_action(InputAction::Submit(string)));
                self.tx.send(self.get_action(InputAction::Exit()));
                Ok(())
            }
            InputAction::DirectExit() => {
                // with auto submit, the owner already has every keystroke
                if !self.auto_submit {
                    self.input.reset();
                }
                self.tx.send(self.get_action(InputAction::Exit()));
                Ok(())
            }
            InputAction::Exit() => {
                self.tx.send(Action::SwitchInputMode(false));
                Ok(())
            }
            InputAction::Submit(_) => Ok(()),
        }
    }
}

impl WidgetExt for InputComp {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let width = area.width.max(3) - 3;
        let scroll = self.input.visual_scroll(width as usize);
        let style = match self.mode {
            InputMode::Focused => {
                if self.input_mode {
                    Color::Yellow.into()
                } else {
                    Color::Cyan.into()
                }
            }
            InputMode::Idle => Style::default(),
        };

        let paragraph = match &self.placeholder {
            Some(placeholder) if self.input.value().is_empty() && !self.is_typing() => {
                Paragraph::new(placeholder.as_str())
                    .style(style.add_modifier(Modifier::DIM | Modifier::ITALIC))
            }
            _ => Paragraph::new(self.input.value())
                .style(style)
                .scroll((0, scroll as u16)),
        };
        let input_widget = paragraph.block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(style)
                .title(self.title.as_str()),
        );
        frame.render_widget(input_widget, area);

        if self.is_typing() {
            // Ratatui hides the cursor unless it's explicitly set. Position the  cursor past the
            // end of the input text and one line down from the border to the input line
            let x = self.input.visual_cursor().max(scroll) - scroll + 1;
            frame.set_cursor_position((area.x + x as u16, area.y + 1))
        }
    }
}
