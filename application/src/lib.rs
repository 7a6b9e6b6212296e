//! Application layer for llm-consortium
//!
//! This crate contains the iteration controller, the concurrent agent pool,
//! and the port definitions that infrastructure adapters implement.
//! It depends only on the domain layer.

pub mod ports;
pub mod use_cases;

// Re-export commonly used types
pub use ports::{
    agent_gateway::{AgentGateway, GatewayError},
    interaction_log::{InteractionLogError, InteractionLogger, InteractionRecord, NoInteractionLog},
    progress::{NoProgress, Phase, ProgressNotifier},
};
pub use use_cases::agent_pool::AgentPool;
pub use use_cases::run_consortium::{RunConsortiumError, RunConsortiumUseCase};
