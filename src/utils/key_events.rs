//! Keys as the help bar spells them: `enter`, `shift-tab`, `ctrl-c`.

use std::{borrow::Cow, ops::Deref};

use crossterm::event::{KeyCode, KeyEvent as CrosstermKeyEvent, KeyModifiers};

fn key_code_name(code: KeyCode) -> Cow<'static, str> {
    let name = match code {
        KeyCode::Char(' ') => "space",
        KeyCode::Char(c) => return Cow::Owned(c.to_string()),
        KeyCode::F(n) => return Cow::Owned(format!("f{n}")),
        KeyCode::Backspace => "backspace",
        KeyCode::Enter => "enter",
        KeyCode::Left => "left",
        KeyCode::Right => "right",
        KeyCode::Up => "up",
        KeyCode::Down => "down",
        KeyCode::Home => "home",
        KeyCode::End => "end",
        KeyCode::PageUp => "pageup",
        KeyCode::PageDown => "pagedown",
        KeyCode::Tab => "tab",
        KeyCode::BackTab => "backtab",
        KeyCode::Delete => "delete",
        KeyCode::Insert => "insert",
        KeyCode::Esc => "esc",
        _ => "",
    };
    Cow::Borrowed(name)
}

pub fn key_event_to_string(key_event: &CrosstermKeyEvent) -> String {
    const PREFIXES: [(KeyModifiers, &str); 3] = [
        (KeyModifiers::CONTROL, "ctrl-"),
        (KeyModifiers::SHIFT, "shift-"),
        (KeyModifiers::ALT, "alt-"),
    ];
    let mut key: String = PREFIXES
        .iter()
        .filter(|(modifier, _)| key_event.modifiers.intersects(*modifier))
        .map(|(_, prefix)| *prefix)
        .collect();
    key.push_str(&key_code_name(key_event.code));
    key
}

/// A crossterm key event that displays itself the way key hints are written.
#[derive(Clone, Debug, PartialEq)]
pub struct KeyEvent(pub CrosstermKeyEvent);

impl From<CrosstermKeyEvent> for KeyEvent {
    fn from(key_event: CrosstermKeyEvent) -> Self {
        Self(key_event)
    }
}
impl From<KeyCode> for KeyEvent {
    fn from(key_code: KeyCode) -> Self {
        Self(CrosstermKeyEvent::new(key_code, KeyModifiers::NONE))
    }
}
impl From<char> for KeyEvent {
    fn from(c: char) -> Self {
        KeyCode::Char(c).into()
    }
}
impl From<KeyEvent> for CrosstermKeyEvent {
    fn from(val: KeyEvent) -> Self {
        val.0
    }
}
impl Deref for KeyEvent {
    type Target = CrosstermKeyEvent;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}
impl std::fmt::Display for KeyEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&key_event_to_string(self))
    }
}
