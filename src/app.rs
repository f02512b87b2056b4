use crate::actions::{LayerManageAction, Layers, TargetLayer};
use crate::app::layer_manager::{EventHandlingStatus, LayerManager};
use crate::config::Config;
use crate::page::{Layer, home::Home};
use crate::{actions::Action, tui};
use color_eyre::eyre::{Context, Result};
use crossterm::event::{KeyCode, KeyModifiers};
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};
use tracing::{debug, info};

pub(crate) mod layer_manager;

pub struct RootState {
    pub should_quit: bool,
    pub action_tx: UnboundedSender<Action>,
    pub action_rx: UnboundedReceiver<Action>,
    /// Set while a text input or a popover owns the keyboard
    pub input_mode: bool,

    pub config: Config,
}

impl RootState {
    pub fn new(config: Config) -> Self {
        let (action_tx, action_rx) = tokio::sync::mpsc::unbounded_channel();
        Self {
            should_quit: false,
            action_tx,
            action_rx,
            input_mode: false,
            config,
        }
    }

    pub fn send_action<T: Into<Action>>(&self, action: T) {
        if self.action_tx.send(action.into()).is_err() {
            tracing::warn!("action channel closed, action dropped");
        }
    }

    pub fn try_recv(&mut self) -> Result<Action, tokio::sync::mpsc::error::TryRecvError> {
        self.action_rx.try_recv()
    }
}

pub struct App {
    layers: LayerManager,
    pub state: RootState,
    pub tui: tui::TuiEnum,
}

impl App {
    pub fn new(state: RootState, tui: tui::TuiEnum) -> Self {
        let mut home = Box::new(Home::new(state.action_tx.clone().into()));
        home.init();
        Self {
            layers: LayerManager::new(home),
            state,
            tui,
        }
    }

    /// Terminal events and actions are awaited together, so actions sent
    /// from background tasks (debounce timers) are handled right away.
    pub async fn run(&mut self) -> Result<()> {
        self.tui.enter()?;

        loop {
            tokio::select! {
                event = self.tui.next() => {
                    let event = event?;
                    self.handle_event(&event).context("Error handling event")?;
                }
                Some(action) = self.state.action_rx.recv() => {
                    self.perform_action(action)?;
                }
            }

            while let Ok(action) = self.state.try_recv() {
                self.perform_action(action)?;
            }

            if self.state.should_quit {
                break;
            }
        }

        self.tui.exit()?;
        Ok(())
    }

    /// Turn a [`tui::Event`] into actions.
    ///
    /// App-wide events (ticks, renders, `ctrl-c`) are handled here. Everything
    /// else goes to the top layer first; keys it leaves alone can quit the app
    /// (`q`) or open the help popup (`?`), unless some input owns the keyboard.
    fn handle_event(&mut self, event: &tui::Event) -> Result<()> {
        match event {
            tui::Event::Tick => self.state.send_action(Action::Tick),
            tui::Event::Render | tui::Event::Resize(_, _) => {
                self.state.send_action(Action::Render)
            }
            tui::Event::Key(key)
                if key.modifiers == KeyModifiers::CONTROL && key.code == KeyCode::Char('c') =>
            {
                self.state.send_action(Action::Quit)
            }
            tui::Event::Init | tui::Event::FocusGained | tui::Event::FocusLost => {}
            tui::Event::Error => debug!("terminal reported an error event"),
            _ => {
                let status = self.layers.handle_event(event)?;
                if status == EventHandlingStatus::ShouldPropagate && !self.state.input_mode {
                    if let tui::Event::Key(key) = event {
                        match key.code {
                            KeyCode::Char('q') => self.state.send_action(Action::Quit),
                            KeyCode::Char('?') => {
                                self.state.send_action(LayerManageAction::Push(TargetLayer {
                                    layer: Layers::Help(self.layers.top_help_msg()),
                                    render_self: true,
                                }))
                            }
                            _ => {}
                        }
                    }
                }
            }
        }
        Ok(())
    }

    /// The only place where app-wide state changes. Layer-specific actions
    /// are handed to the layers.
    fn perform_action(&mut self, action: Action) -> Result<()> {
        match action {
            Action::Quit => {
                info!("quitting");
                self.state.should_quit = true;
            }
            Action::Render => {
                let layers = &mut self.layers;
                self.tui.draw(|f| layers.render(f))?;
            }
            Action::Layer(layer_action) => {
                self.layers.handle_layer_action(&layer_action, &self.state)?;
            }
            Action::SwitchInputMode(mode) => {
                self.state.input_mode = mode;
                self.layers.handle_action(&action)?;
            }
            _ => self.layers.handle_action(&action)?,
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use chrono::Local;

    use crate::{
        page::{date_form::DateForm, help_popup::HelpPopup},
        tui::{Event, TestTui},
        utils::key_events::test_utils::{get_char_evt, get_key_evt},
    };

    use super::*;

    fn get_app() -> App {
        App::new(RootState::new(Config::default()), TestTui::new().into())
    }

    fn feed(app: &mut App, events: &[Event]) {
        for event in events {
            app.handle_event(event).unwrap();
            while let Ok(action) = app.state.try_recv() {
                app.perform_action(action).unwrap();
            }
        }
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            feed(app, &[get_char_evt(c)]);
        }
    }

    fn screen(app: &mut App) -> String {
        feed(app, &[Event::Render]);
        let buffer = app.tui.backend().buffer();
        (0..buffer.area.height)
            .map(|y| {
                (0..buffer.area.width)
                    .map(|x| buffer[(x, y)].symbol().to_string())
                    .collect::<String>()
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn test_open_form_and_back() {
        let mut app = get_app();
        assert_eq!(app.layers.len(), 1);
        feed(&mut app, &[get_key_evt(KeyCode::Enter)]);
        assert_eq!(app.layers.len(), 2);
        assert!(app.layers.last().unwrap().is::<DateForm>());
        assert!(screen(&mut app).contains("Date Input Form"));

        feed(&mut app, &[get_key_evt(KeyCode::Esc)]);
        assert_eq!(app.layers.len(), 1);
        assert!(app.layers.last().unwrap().is::<Home>());
    }

    #[test]
    fn test_help_popup() {
        let mut app = get_app();
        feed(&mut app, &[get_char_evt('?')]);
        assert_eq!(app.layers.len(), 2);
        assert!(app.layers.last().unwrap().is::<HelpPopup>());
        assert!(screen(&mut app).contains("Open form: enter"));

        // the help popup swallows everything but its own keys
        feed(&mut app, &[get_key_evt(KeyCode::Enter)]);
        assert_eq!(app.layers.len(), 2);
        feed(&mut app, &[get_char_evt('?')]);
        assert_eq!(app.layers.len(), 1);
    }

    #[test]
    fn test_quit() {
        let mut app = get_app();
        feed(&mut app, &[get_char_evt('q')]);
        assert!(app.state.should_quit);

        let mut app = get_app();
        feed(
            &mut app,
            &[Event::Key(crossterm::event::KeyEvent::new(
                KeyCode::Char('c'),
                KeyModifiers::CONTROL,
            ))],
        );
        assert!(app.state.should_quit);
    }

    #[test]
    fn test_q_while_typing_is_text() {
        let mut app = get_app();
        feed(&mut app, &[get_key_evt(KeyCode::Enter), get_key_evt(KeyCode::Enter)]);
        assert!(app.state.input_mode);
        type_text(&mut app, "q?");
        assert!(!app.state.should_quit);
        assert_eq!(app.layers.len(), 2);

        feed(&mut app, &[get_key_evt(KeyCode::Esc)]);
        assert!(!app.state.input_mode);
        feed(&mut app, &[get_char_evt('q')]);
        assert!(app.state.should_quit);
    }

    #[tokio::test(start_paused = true)]
    async fn test_typed_date_resolves_in_run_loop_order() {
        let mut app = get_app();
        feed(
            &mut app,
            &[
                get_key_evt(KeyCode::Enter),
                get_key_evt(KeyCode::Tab),
                get_key_evt(KeyCode::Enter),
            ],
        );
        type_text(&mut app, "tomorrow");

        // the timer fires while the help popup covers the form
        feed(&mut app, &[get_key_evt(KeyCode::Esc), get_char_evt('?')]);
        assert_eq!(app.layers.len(), 3);
        tokio::time::sleep(Duration::from_millis(250)).await;
        while let Ok(action) = app.state.try_recv() {
            app.perform_action(action).unwrap();
        }
        feed(&mut app, &[get_key_evt(KeyCode::Esc)]);

        let tomorrow = Local::now().date_naive().succ_opt().unwrap();
        let expected = format!("Selected date: {}", tomorrow.format("%B %-d, %Y"));
        assert!(screen(&mut app).contains(&expected));
    }
}
