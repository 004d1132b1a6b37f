mod ask_controller;
mod chat_controller;
mod serve_controller;
mod tui_controller;

pub use ask_controller::AskController;
pub use chat_controller::{run_repl, ChatController};
pub use serve_controller::ServeController;
pub use tui_controller::TuiController;
