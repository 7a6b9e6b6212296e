//! What a round does when no response survives filtering

use crate::core::error::DomainError;
use serde::{Deserialize, Serialize};

/// Behaviour for a round whose filtered response set is empty
///
/// This happens when every instance failed, or when the strategy filtered
/// every response out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmptyRoundPolicy {
    /// Stop the run with a "no usable responses" result (default)
    #[default]
    ShortCircuit,
    /// Call the arbiter anyway, with an empty response list
    InvokeArbiter,
}

impl EmptyRoundPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            EmptyRoundPolicy::ShortCircuit => "short_circuit",
            EmptyRoundPolicy::InvokeArbiter => "invoke_arbiter",
        }
    }
}

impl std::fmt::Display for EmptyRoundPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for EmptyRoundPolicy {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "short_circuit" | "stop" => Ok(EmptyRoundPolicy::ShortCircuit),
            "invoke_arbiter" | "arbiter" => Ok(EmptyRoundPolicy::InvokeArbiter),
            _ => Err(DomainError::UnknownEmptyRoundPolicy(s.to_string())),
        }
    }
}
