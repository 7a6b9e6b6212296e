//! Agent gateway port
//!
//! Defines the interface for invoking an external agent.

use async_trait::async_trait;
use consortium_domain::{AgentId, FailureKind, InvocationFailure};
use thiserror::Error;

/// Errors that can occur during an agent invocation
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GatewayError {
    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("Timeout")]
    Timeout,

    #[error("Agent not available: {0}")]
    AgentNotAvailable(String),

    #[error("Other error: {0}")]
    Other(String),
}

impl From<GatewayError> for InvocationFailure {
    fn from(error: GatewayError) -> Self {
        match error {
            GatewayError::Timeout => InvocationFailure {
                kind: FailureKind::Timeout,
                message: "gateway timed out".to_string(),
            },
            other => InvocationFailure::transport(other.to_string()),
        }
    }
}

/// Gateway for agent invocation
///
/// This port defines how the application layer reaches agents. The same
/// gateway serves panel agents and the arbiter, and must accept any number of
/// concurrent calls. Implementations (adapters) live in the infrastructure
/// layer.
#[async_trait]
pub trait AgentGateway: Send + Sync {
    /// Send `prompt` to `agent` and return its raw text reply
    async fn invoke(
        &self,
        agent: &AgentId,
        prompt: &str,
        system: Option<&str>,
    ) -> Result<String, GatewayError>;
}
