mod conversation_log;
mod history;
mod outcome;
mod session;
mod turn;

pub use conversation_log::*;
pub use history::*;
pub use outcome::*;
pub use session::*;
pub use turn::*;
