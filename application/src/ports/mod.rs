//! Port definitions (interfaces for external adapters)
//!
//! Ports define the contracts that infrastructure adapters must implement.

pub mod agent_gateway;
pub mod interaction_log;
pub mod progress;
