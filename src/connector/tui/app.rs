use std::collections::VecDeque;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::application::Notification;

/// What the window is currently showing on top of the transcript.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Overlay {
    None,
    History(String),
    ConfirmQuit,
    ConfirmPrintHistory,
}

/// Requests from the key handler to the event loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    None,
    Submit(String),
    ShowHistory,
    Reset,
    Quit { print_history: bool },
}

/// Input line, popups and scroll position. Holds no conversation state.
#[derive(Debug)]
pub struct App {
    model: String,
    input: String,
    overlay: Overlay,
    errors: VecDeque<Notification>,
    /// Rows scrolled up from the bottom of the transcript.
    scroll_back: u16,
}

impl App {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            input: String::new(),
            overlay: Overlay::None,
            errors: VecDeque::new(),
            scroll_back: 0,
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn overlay(&self) -> &Overlay {
        &self.overlay
    }

    /// The error popup currently shown, if any. Errors queue up and are
    /// dismissed one at a time.
    pub fn current_error(&self) -> Option<&Notification> {
        self.errors.front()
    }

    pub fn scroll_back(&self) -> u16 {
        self.scroll_back
    }

    pub fn push_error(&mut self, notification: Notification) {
        self.errors.push_back(notification);
    }

    pub fn show_history(&mut self, text: String) {
        self.overlay = Overlay::History(text);
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Action {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

        // Error popups are modal and sit above everything else.
        if self.current_error().is_some() {
            if matches!(key.code, KeyCode::Enter | KeyCode::Esc) {
                self.errors.pop_front();
            }
            return Action::None;
        }

        match self.overlay {
            Overlay::History(_) => {
                if matches!(key.code, KeyCode::Enter | KeyCode::Esc | KeyCode::Char('q')) {
                    self.overlay = Overlay::None;
                }
                Action::None
            }
            Overlay::ConfirmQuit => match key.code {
                KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
                    self.overlay = Overlay::ConfirmPrintHistory;
                    Action::None
                }
                KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                    self.overlay = Overlay::None;
                    Action::None
                }
                _ => Action::None,
            },
            Overlay::ConfirmPrintHistory => match key.code {
                KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
                    Action::Quit { print_history: true }
                }
                KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                    Action::Quit {
                        print_history: false,
                    }
                }
                _ => Action::None,
            },
            Overlay::None => self.handle_input_key(key, ctrl),
        }
    }

    fn handle_input_key(&mut self, key: KeyEvent, ctrl: bool) -> Action {
        match key.code {
            KeyCode::Char('c') if ctrl => {
                self.overlay = Overlay::ConfirmQuit;
                Action::None
            }
            KeyCode::Char('l') if ctrl => {
                self.scroll_back = 0;
                Action::Reset
            }
            KeyCode::Esc => {
                self.overlay = Overlay::ConfirmQuit;
                Action::None
            }
            KeyCode::F(2) => Action::ShowHistory,
            KeyCode::Enter => {
                self.scroll_back = 0;
                Action::Submit(std::mem::take(&mut self.input))
            }
            KeyCode::Backspace => {
                self.input.pop();
                Action::None
            }
            KeyCode::Up => {
                self.scroll_back = self.scroll_back.saturating_add(1);
                Action::None
            }
            KeyCode::Down => {
                self.scroll_back = self.scroll_back.saturating_sub(1);
                Action::None
            }
            KeyCode::PageUp => {
                self.scroll_back = self.scroll_back.saturating_add(10);
                Action::None
            }
            KeyCode::PageDown => {
                self.scroll_back = self.scroll_back.saturating_sub(10);
                Action::None
            }
            KeyCode::Char(c) if !ctrl => {
                self.input.push(c);
                Action::None
            }
            _ => Action::None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            app.handle_key(key(KeyCode::Char(c)));
        }
    }

    #[test]
    fn enter_submits_and_clears_input() {
        let mut app = App::new("m");
        type_text(&mut app, "Hello");

        assert_eq!(app.handle_key(key(KeyCode::Enter)), Action::Submit("Hello".into()));
        assert_eq!(app.input(), "");
    }

    #[test]
    fn error_popup_blocks_input_until_dismissed() {
        let mut app = App::new("m");
        app.push_error(Notification::dispatch_failed("upstream down"));
        app.push_error(Notification::dispatch_failed("again"));

        type_text(&mut app, "x");
        assert_eq!(app.input(), "");

        app.handle_key(key(KeyCode::Enter));
        assert!(app.current_error().unwrap().message().contains("again"));
        app.handle_key(key(KeyCode::Esc));
        assert!(app.current_error().is_none());
    }

    #[test]
    fn quit_asks_twice() {
        let mut app = App::new("m");

        assert_eq!(app.handle_key(key(KeyCode::Esc)), Action::None);
        assert_eq!(app.overlay(), &Overlay::ConfirmQuit);
        assert_eq!(app.handle_key(key(KeyCode::Char('y'))), Action::None);
        assert_eq!(
            app.handle_key(key(KeyCode::Char('n'))),
            Action::Quit {
                print_history: false
            }
        );
    }

    #[test]
    fn declining_quit_returns_to_input() {
        let mut app = App::new("m");
        app.handle_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        app.handle_key(key(KeyCode::Char('n')));
        assert_eq!(app.overlay(), &Overlay::None);
    }

    #[test]
    fn shortcuts_map_to_actions() {
        let mut app = App::new("m");
        assert_eq!(app.handle_key(key(KeyCode::F(2))), Action::ShowHistory);
        assert_eq!(
            app.handle_key(KeyEvent::new(KeyCode::Char('l'), KeyModifiers::CONTROL)),
            Action::Reset
        );
        assert_eq!(app.input(), "");
    }
}
