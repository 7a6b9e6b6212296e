//! Core domain concepts shared across all subdomains.
//!
//! - [`agent::AgentId`] / [`agent::AgentPanel`] - who runs, and how many times
//! - [`error::DomainError`] - configuration errors raised before any round
//! - [`output_format::OutputFormat`] - how a finished run is printed
//! - [`text`] - small text helpers used when rendering prompts

pub mod agent;
pub mod error;
pub mod output_format;
pub mod text;

/// Current time in milliseconds since the Unix epoch
pub fn current_timestamp() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};

    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}
