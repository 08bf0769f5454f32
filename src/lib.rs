//! Pawprint — client core for a pet-adoption community app.

pub mod app;
pub mod backend;
pub mod cli;
pub mod config;
pub mod error;
pub mod navigation;
pub mod session;
pub mod store;
pub mod wizard;
