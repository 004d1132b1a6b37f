//! Full-screen chat window built with ratatui.
//!
//! The event loop is the single consumer of the turn relay: key presses submit
//! turns, and a fixed ticker drains finished replies without ever blocking on
//! the network.

pub mod app;
pub mod ui;

use std::io;
use std::time::Duration;

use anyhow::Result;
use crossterm::event::{Event, EventStream, KeyEventKind};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use futures_util::StreamExt;
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use tokio::time::MissedTickBehavior;
use tracing::{debug, warn};

use crate::application::{Conversation, Notification};
use crate::domain::HistoryEntry;

pub use app::{Action, App, Overlay};

type Term = Terminal<CrosstermBackend<io::Stdout>>;

pub fn init_terminal() -> Result<Term> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let terminal = Terminal::new(CrosstermBackend::new(stdout))?;
    Ok(terminal)
}

pub fn restore_terminal(mut terminal: Term) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

/// Run the window until the user quits. Returns the provider history when the
/// user asked for it to be printed after leaving the screen.
pub async fn run(
    conversation: &mut Conversation,
    poll_interval: Duration,
) -> Result<Option<Vec<HistoryEntry>>> {
    let mut terminal = init_terminal()?;
    let result = event_loop(&mut terminal, conversation, poll_interval).await;
    restore_terminal(terminal)?;
    result
}

async fn event_loop(
    terminal: &mut Term,
    conversation: &mut Conversation,
    poll_interval: Duration,
) -> Result<Option<Vec<HistoryEntry>>> {
    let mut app = App::new(conversation.model());
    let mut events = EventStream::new();
    let mut ticker = tokio::time::interval(poll_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        terminal.draw(|frame| ui::draw(frame, &app, conversation.log(), conversation.pending()))?;

        tokio::select! {
            _ = ticker.tick() => {
                let applied = conversation.tick();
                if !applied.is_empty() {
                    debug!("Applied {} deliveries", applied.len());
                }
                for notification in conversation.take_notifications() {
                    app.push_error(notification);
                }
            }
            event = events.next() => {
                match event {
                    Some(Ok(Event::Key(key))) if key.kind == KeyEventKind::Press => {
                        match app.handle_key(key) {
                            Action::None => {}
                            Action::Submit(text) => {
                                conversation.submit(&text);
                            }
                            Action::ShowHistory => match conversation.history().await {
                                Ok(entries) => app.show_history(popup_text(&entries)),
                                Err(error) => {
                                    app.push_error(Notification::history_failed(&error.reason()))
                                }
                            },
                            Action::Reset => conversation.reset(),
                            Action::Quit { print_history } => {
                                if !print_history {
                                    return Ok(None);
                                }
                                return match conversation.history().await {
                                    Ok(entries) => Ok(Some(entries)),
                                    Err(error) => {
                                        warn!(%error, "could not fetch history on exit");
                                        Ok(None)
                                    }
                                };
                            }
                        }
                    }
                    Some(Ok(_)) => {}
                    Some(Err(error)) => return Err(error.into()),
                    None => return Ok(None),
                }
            }
        }
    }
}

fn popup_text(entries: &[HistoryEntry]) -> String {
    if entries.is_empty() {
        return "(no messages yet)".to_string();
    }
    entries
        .iter()
        .map(HistoryEntry::display_line)
        .collect::<Vec<_>>()
        .join("\n\n")
}
