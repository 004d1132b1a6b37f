use anyhow::Result;

use crate::connector::tui;
use crate::domain::format_history;

use super::super::Container;

pub struct TuiController<'a> {
    container: &'a Container,
}

impl<'a> TuiController<'a> {
    pub fn new(container: &'a Container) -> Self {
        Self { container }
    }

    /// Returns the history to print once the screen is restored, if the user
    /// asked for it.
    pub async fn run(&self) -> Result<String> {
        let mut conversation = self.container.conversation().await?;
        let history = tui::run(&mut conversation, self.container.poll_interval()).await?;

        Ok(history
            .map(|entries| format_history(&entries))
            .unwrap_or_default())
    }
}
