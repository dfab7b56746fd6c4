use crate::services::quote_service::Alert;
use ratatui::crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// What the event loop should do after a key press.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    None,
    Submit(String),
    Quit,
}

pub struct TuiApp {
    pub input: String,
    pub alert: Option<Alert>,
    pub color: bool,
}

impl TuiApp {
    pub fn new(initial: &str, color: bool) -> Self {
        Self {
            input: initial.to_uppercase(),
            alert: None,
            color,
        }
    }

    pub fn on_key(&mut self, key: KeyEvent) -> Action {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return Action::Quit;
        }

        // An open alert swallows the key that dismisses it.
        if self.alert.take().is_some() {
            return Action::None;
        }

        match key.code {
            KeyCode::Esc => Action::Quit,
            KeyCode::Enter => Action::Submit(self.input.clone()),
            KeyCode::Backspace => {
                self.input.pop();
                Action::None
            }
            KeyCode::Char(c) => {
                self.input.extend(c.to_uppercase());
                Action::None
            }
            _ => Action::None,
        }
    }
}
