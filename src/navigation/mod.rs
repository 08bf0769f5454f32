//! Navigation — URL paths to views, gated by the session.
//!
//! The route table is static and ordered; resolution is first-match-wins and
//! total. Each entry carries an explicit [`Access`] guard so gating is a
//! lookup, never an ad-hoc role check in a view.

pub mod controller;
pub mod pattern;
pub mod table;
pub mod view;

pub use controller::NavigationController;
pub use pattern::{RouteParams, RoutePattern};
pub use table::{Access, LOGIN_PATH, RouteEntry, RouteTable, ViewSelection};
pub use view::{Layout, View};
