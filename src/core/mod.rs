//! Configuration, domain types and per-chat state

pub mod config;
pub mod models;
pub mod session;

pub use session::SessionStore;
