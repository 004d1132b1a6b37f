use anyhow::Result;

use crate::Commands;

use super::container::Container;
use super::controller::{AskController, ChatController, ServeController, TuiController};

pub struct Router<'a> {
    ask_controller: AskController<'a>,
    chat_controller: ChatController<'a>,
    serve_controller: ServeController<'a>,
    tui_controller: TuiController<'a>,
}

impl<'a> Router<'a> {
    pub fn new(container: &'a Container) -> Self {
        Self {
            ask_controller: AskController::new(container),
            chat_controller: ChatController::new(container),
            serve_controller: ServeController::new(container),
            tui_controller: TuiController::new(container),
        }
    }

    /// Runs `command` and returns text to print once it finishes.
    pub async fn route(&self, command: Commands) -> Result<String> {
        match command {
            Commands::Tui => self.tui_controller.run().await,
            Commands::Chat => self.chat_controller.chat().await,
            Commands::Ask { prompt } => self.ask_controller.ask(prompt).await,
            Commands::Serve { port, public } => self.serve_controller.serve(port, public).await,
        }
    }
}
