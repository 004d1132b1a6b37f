pub mod handlers;
pub mod markdown;
pub mod server;
pub mod session_store;

pub use handlers::{WebState, SESSION_HEADER};
pub use server::{router, serve};
pub use session_store::SessionStore;
