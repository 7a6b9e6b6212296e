//! Domain error types
//!
//! Every variant here is a configuration-time problem: these are raised
//! before any round starts and are the only failures that cross the
//! orchestration boundary. Per-round problems (agent failures, unparseable
//! arbiter output) are represented as data instead.

use thiserror::Error;

/// Domain-level configuration errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    #[error("Invalid confidence threshold {0}: must lie in [0, 1] (or 0-100 as a percentage)")]
    InvalidThreshold(f64),

    #[error("Invalid iteration bounds: minimum {min}, maximum {max}")]
    InvalidIterationBounds { min: usize, max: usize },

    #[error("No usable agents configured")]
    EmptyPanel,

    #[error("No arbiter configured")]
    MissingArbiter,

    #[error("Invalid agent specifier: {0}")]
    InvalidAgentSpec(String),

    #[error("Unknown strategy '{name}'. Available: {available}")]
    UnknownStrategy { name: String, available: String },

    #[error("Invalid parameter '{param}' for strategy '{strategy}': {reason}")]
    InvalidStrategyParam {
        strategy: String,
        param: String,
        reason: String,
    },

    #[error("Unknown judging method '{0}'. Valid: synthesis, pick-one, rank")]
    UnknownJudgingMethod(String),

    #[error("Unknown empty-round policy '{0}'. Valid: short_circuit, invoke_arbiter")]
    UnknownEmptyRoundPolicy(String),
}

impl DomainError {
    /// Check if this error stems from strategy selection or its parameters
    pub fn is_strategy_error(&self) -> bool {
        matches!(
            self,
            DomainError::UnknownStrategy { .. } | DomainError::InvalidStrategyParam { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_strategy_display() {
        let error = DomainError::UnknownStrategy {
            name: "tournament".to_string(),
            available: "default, top_k".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Unknown strategy 'tournament'. Available: default, top_k"
        );
    }

    #[test]
    fn test_is_strategy_error() {
        assert!(
            DomainError::InvalidStrategyParam {
                strategy: "top_k".to_string(),
                param: "k".to_string(),
                reason: "expected integer".to_string(),
            }
            .is_strategy_error()
        );
        assert!(!DomainError::EmptyPanel.is_strategy_error());
        assert!(!DomainError::InvalidThreshold(2.0).is_strategy_error());
    }
}
