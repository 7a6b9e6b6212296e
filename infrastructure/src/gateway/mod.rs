//! Agent gateway adapters
//!
//! Implementations of the [`AgentGateway`](consortium_application::AgentGateway) port.

mod command;

pub use command::CommandAgentGateway;
