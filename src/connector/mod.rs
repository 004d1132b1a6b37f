//! # Connector Layer
//!
//! External integrations implementing application interfaces:
//! - Chat clients (Gemini REST, offline mock)
//! - Presentation surfaces (terminal window, line REPL, web backend)
//! - Command routing and dependency wiring

pub mod adapter;
pub mod api;
pub mod tui;
pub mod web;

pub use adapter::*;
pub use api::*;
