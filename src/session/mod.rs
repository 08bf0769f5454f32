//! Session — the logged-in user, persisted in the key-value store.

pub mod manager;
pub mod model;

pub use manager::{SESSION_KEY, SessionManager};
pub use model::{Role, Session};
