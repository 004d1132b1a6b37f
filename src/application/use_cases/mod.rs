mod conversation;
mod single_prompt;
mod turn_relay;

pub use conversation::*;
pub use single_prompt::*;
pub use turn_relay::*;
