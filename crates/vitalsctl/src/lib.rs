//! Vitals Control - CLI client for the orchestrator

pub mod cli;
pub mod client;
pub mod commands;
pub mod errors;
pub mod output;
