//! Agent response value objects.
//!
//! - [`RawResponse`] - what one agent instance returned (or why it failed)
//! - [`ParsedResponse`] - the raw response plus extracted confidence and answer

use crate::core::agent::AgentId;
use serde::{Deserialize, Serialize};

/// Why an agent invocation did not produce text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// The instance exceeded its time budget
    Timeout,
    /// The gateway reported an error (network, provider, process)
    Transport,
    /// The task running the invocation was aborted or panicked
    Aborted,
}

/// Error carried by a failed [`RawResponse`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvocationFailure {
    pub kind: FailureKind,
    pub message: String,
}

impl InvocationFailure {
    pub fn timeout(after_ms: u64) -> Self {
        Self {
            kind: FailureKind::Timeout,
            message: format!("timed out after {} ms", after_ms),
        }
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self {
            kind: FailureKind::Transport,
            message: message.into(),
        }
    }

    pub fn aborted(message: impl Into<String>) -> Self {
        Self {
            kind: FailureKind::Aborted,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for InvocationFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.kind {
            FailureKind::Timeout => write!(f, "timeout: {}", self.message),
            FailureKind::Transport => write!(f, "transport error: {}", self.message),
            FailureKind::Aborted => write!(f, "aborted: {}", self.message),
        }
    }
}

/// Output of one agent instance for one round. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawResponse {
    /// The agent that was invoked
    pub agent: AgentId,
    /// Instance index within the agent's count (0-based)
    pub instance: usize,
    /// Raw response text (empty on failure)
    pub text: String,
    /// Failure, if the invocation did not complete
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<InvocationFailure>,
    /// Wall-clock time spent on the invocation
    #[serde(default)]
    pub latency_ms: u64,
}

impl RawResponse {
    pub fn success(agent: AgentId, instance: usize, text: impl Into<String>) -> Self {
        Self {
            agent,
            instance,
            text: text.into(),
            error: None,
            latency_ms: 0,
        }
    }

    pub fn failure(agent: AgentId, instance: usize, error: InvocationFailure) -> Self {
        Self {
            agent,
            instance,
            text: String::new(),
            error: Some(error),
            latency_ms: 0,
        }
    }

    pub fn with_latency(mut self, latency_ms: u64) -> Self {
        self.latency_ms = latency_ms;
        self
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }

    /// `agent#instance` label used in prompts and logs
    pub fn label(&self) -> String {
        format!("{}#{}", self.agent, self.instance)
    }
}

/// A [`RawResponse`] with its extracted fields
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedResponse {
    #[serde(flatten)]
    pub raw: RawResponse,
    /// Self-reported confidence, always in [0, 1]
    pub confidence: f64,
    /// Extracted answer text
    pub answer: String,
    /// Optional reasoning section
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reasoning: Option<String>,
}

impl ParsedResponse {
    /// Confidence assigned to failed invocations
    pub const FAILED_CONFIDENCE: f64 = 0.0;

    pub fn new(
        raw: RawResponse,
        confidence: f64,
        answer: impl Into<String>,
        reasoning: Option<String>,
    ) -> Self {
        let confidence = if confidence.is_finite() {
            confidence.clamp(0.0, 1.0)
        } else {
            0.5
        };
        Self {
            raw,
            confidence,
            answer: answer.into(),
            reasoning,
        }
    }

    /// Degraded response for an invocation that failed
    pub fn failed(raw: RawResponse) -> Self {
        Self {
            raw,
            confidence: Self::FAILED_CONFIDENCE,
            answer: String::new(),
            reasoning: None,
        }
    }

    pub fn agent(&self) -> &AgentId {
        &self.raw.agent
    }

    pub fn instance(&self) -> usize {
        self.raw.instance
    }

    pub fn is_success(&self) -> bool {
        self.raw.is_success()
    }

    pub fn label(&self) -> String {
        self.raw.label()
    }
}
