//! Orchestrator library - exposes modules for testing.

pub mod client;
pub mod config;
pub mod fanout;
pub mod health;
pub mod registry;
pub mod routes;
pub mod server;
pub mod state;
