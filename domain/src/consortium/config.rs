//! Run configuration for one consortium orchestration

use crate::consortium::judging::JudgingMethod;
use crate::consortium::policy::EmptyRoundPolicy;
use crate::core::agent::{AgentId, AgentPanel};
use crate::core::error::DomainError;
use crate::strategy::StrategyParams;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Everything the iteration loop needs to know before the first round
///
/// Built with the `with_*` methods and checked by [`validate`](Self::validate),
/// which is the only place configuration errors are raised.
///
/// # Example
///
/// ```
/// use consortium_domain::{AgentPanel, ConsortiumConfig};
///
/// let config = ConsortiumConfig::new(AgentPanel::parse_specs(["gpt-4o:2", "claude"], 1))
///     .with_arbiter("claude")
///     .with_confidence_threshold(90.0)
///     .with_iteration_bounds(1, 4);
///
/// assert_eq!(config.confidence_threshold, 0.9);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsortiumConfig {
    /// Agents and instance counts, in submission order
    pub agents: AgentPanel,
    /// Agent that synthesizes each round
    pub arbiter: AgentId,
    /// Acceptance threshold in [0, 1]
    pub confidence_threshold: f64,
    pub min_iterations: usize,
    pub max_iterations: usize,
    /// Registered strategy name
    pub strategy: String,
    #[serde(default)]
    pub strategy_params: StrategyParams,
    pub judging_method: JudgingMethod,
    /// Extra system instructions passed with every agent call
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_prompt: Option<String>,
    /// Number of recent rounds rendered in full in later prompts
    pub history_window: usize,
    /// Per-field character cap when rendering history
    pub history_max_chars: usize,
    pub empty_round_policy: EmptyRoundPolicy,
    /// Adopt a single response that already meets the threshold
    pub fast_path: bool,
    /// Time budget for each agent instance
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_timeout: Option<Duration>,
}

impl ConsortiumConfig {
    pub const DEFAULT_CONFIDENCE_THRESHOLD: f64 = 0.8;
    pub const DEFAULT_MIN_ITERATIONS: usize = 1;
    pub const DEFAULT_MAX_ITERATIONS: usize = 3;
    pub const DEFAULT_STRATEGY: &'static str = "default";
    pub const DEFAULT_HISTORY_WINDOW: usize = 3;
    pub const DEFAULT_HISTORY_MAX_CHARS: usize = 2000;

    pub fn new(agents: AgentPanel) -> Self {
        Self {
            agents,
            ..Self::default()
        }
    }

    pub fn with_agents(mut self, agents: AgentPanel) -> Self {
        self.agents = agents;
        self
    }

    pub fn with_arbiter(mut self, arbiter: impl Into<AgentId>) -> Self {
        self.arbiter = arbiter.into();
        self
    }

    /// Set the acceptance threshold; values above 1 are percentages
    pub fn with_confidence_threshold(mut self, threshold: f64) -> Self {
        self.confidence_threshold = normalize_threshold(threshold);
        self
    }

    pub fn with_iteration_bounds(mut self, min: usize, max: usize) -> Self {
        self.min_iterations = min;
        self.max_iterations = max;
        self
    }

    pub fn with_strategy(mut self, name: impl Into<String>, params: StrategyParams) -> Self {
        self.strategy = name.into();
        self.strategy_params = params;
        self
    }

    pub fn with_judging_method(mut self, method: JudgingMethod) -> Self {
        self.judging_method = method;
        self
    }

    pub fn with_system_prompt(mut self, system: impl Into<String>) -> Self {
        self.system_prompt = Some(system.into());
        self
    }

    pub fn with_history_window(mut self, window: usize, max_chars: usize) -> Self {
        self.history_window = window;
        self.history_max_chars = max_chars;
        self
    }

    pub fn with_empty_round_policy(mut self, policy: EmptyRoundPolicy) -> Self {
        self.empty_round_policy = policy;
        self
    }

    pub fn with_fast_path(mut self, enabled: bool) -> Self {
        self.fast_path = enabled;
        self
    }

    pub fn with_agent_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.agent_timeout = timeout;
        self
    }

    /// Check every configuration-time invariant.
    ///
    /// Strategy names are checked separately by the registry.
    pub fn validate(&self) -> Result<(), DomainError> {
        let threshold = self.confidence_threshold;
        if !threshold.is_finite() || !(0.0..=1.0).contains(&threshold) {
            return Err(DomainError::InvalidThreshold(threshold));
        }
        if self.max_iterations == 0 || self.min_iterations > self.max_iterations {
            return Err(DomainError::InvalidIterationBounds {
                min: self.min_iterations,
                max: self.max_iterations,
            });
        }
        self.agents.check_bounds()?;
        if self.agents.is_empty() {
            return Err(DomainError::EmptyPanel);
        }
        if self.arbiter.is_empty() {
            return Err(DomainError::MissingArbiter);
        }
        Ok(())
    }

    /// Whether a round's synthesis should be accepted
    pub fn accepts(&self, confidence: f64, iteration: usize) -> bool {
        confidence >= self.confidence_threshold && iteration >= self.min_iterations
    }
}

impl Default for ConsortiumConfig {
    fn default() -> Self {
        Self {
            agents: AgentPanel::new(),
            arbiter: AgentId::new(""),
            confidence_threshold: Self::DEFAULT_CONFIDENCE_THRESHOLD,
            min_iterations: Self::DEFAULT_MIN_ITERATIONS,
            max_iterations: Self::DEFAULT_MAX_ITERATIONS,
            strategy: Self::DEFAULT_STRATEGY.to_string(),
            strategy_params: StrategyParams::default(),
            judging_method: JudgingMethod::default(),
            system_prompt: None,
            history_window: Self::DEFAULT_HISTORY_WINDOW,
            history_max_chars: Self::DEFAULT_HISTORY_MAX_CHARS,
            empty_round_policy: EmptyRoundPolicy::default(),
            fast_path: true,
            agent_timeout: None,
        }
    }
}

/// Interpret thresholds above 1 as percentages.
///
/// Out-of-range results are left for [`ConsortiumConfig::validate`] to reject.
pub fn normalize_threshold(threshold: f64) -> f64 {
    if threshold > 1.0 {
        threshold / 100.0
    } else {
        threshold
    }
}
