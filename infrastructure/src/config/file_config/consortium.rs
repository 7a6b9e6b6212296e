//! Consortium configuration from TOML (`[consortium]` section)
//!
//! Example configuration:
//!
//! ```toml
//! [consortium]
//! agents = ["gpt-4o:2", "claude-3-5-sonnet"]
//! arbiter = "claude-3-5-sonnet"
//! confidence_threshold = 0.85
//! max_iterations = 4
//! strategy = "top_k"
//! judging_method = "pick-one"
//! on_empty = "short_circuit"
//!
//! [consortium.strategy_params]
//! k = 2
//! ```

use super::ConfigValidationError;
use consortium_domain::{
    AgentPanel, ConsortiumConfig, DomainError, EmptyRoundPolicy, JudgingMethod, StrategyParams,
};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Raw consortium configuration from TOML
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConsortiumConfig {
    /// Agent specifiers: `name` or `name:count`
    pub agents: Vec<String>,
    /// Instance count for specifiers without one
    pub instances: usize,
    /// Arbiter agent; the first panel agent when unset
    pub arbiter: Option<String>,
    /// Acceptance threshold; values above 1 are percentages
    pub confidence_threshold: f64,
    pub min_iterations: usize,
    pub max_iterations: usize,
    pub strategy: String,
    pub strategy_params: StrategyParams,
    pub judging_method: JudgingMethod,
    pub system_prompt: Option<String>,
    pub history_window: usize,
    pub history_max_chars: usize,
    /// What to do when a round has no usable responses
    pub on_empty: EmptyRoundPolicy,
    pub fast_path: bool,
    /// Per-agent time budget in seconds
    pub timeout_seconds: Option<u64>,
}

impl Default for FileConsortiumConfig {
    fn default() -> Self {
        Self {
            agents: Vec::new(),
            instances: 1,
            arbiter: None,
            confidence_threshold: ConsortiumConfig::DEFAULT_CONFIDENCE_THRESHOLD,
            min_iterations: ConsortiumConfig::DEFAULT_MIN_ITERATIONS,
            max_iterations: ConsortiumConfig::DEFAULT_MAX_ITERATIONS,
            strategy: ConsortiumConfig::DEFAULT_STRATEGY.to_string(),
            strategy_params: StrategyParams::default(),
            judging_method: JudgingMethod::default(),
            system_prompt: None,
            history_window: ConsortiumConfig::DEFAULT_HISTORY_WINDOW,
            history_max_chars: ConsortiumConfig::DEFAULT_HISTORY_MAX_CHARS,
            on_empty: EmptyRoundPolicy::default(),
            fast_path: true,
            timeout_seconds: None,
        }
    }
}

impl FileConsortiumConfig {
    /// Parse the agent specifiers strictly
    pub fn parse_agents(&self) -> Result<AgentPanel, DomainError> {
        AgentPanel::try_parse_specs(&self.agents, self.instances)
    }

    /// Build the domain configuration
    ///
    /// Only agent specifiers and the timeout are checked here; everything
    /// else is left to [`ConsortiumConfig::validate`].
    pub fn to_consortium_config(&self) -> Result<ConsortiumConfig, ConfigValidationError> {
        if self.timeout_seconds == Some(0) {
            return Err(ConfigValidationError::InvalidTimeout);
        }
        let agents = self.parse_agents()?;
        let arbiter = match self.arbiter.as_deref().map(str::trim) {
            Some(arbiter) if !arbiter.is_empty() => arbiter.to_string(),
            _ => agents
                .agents()
                .next()
                .map(|agent| agent.to_string())
                .unwrap_or_default(),
        };

        let mut config = ConsortiumConfig::new(agents)
            .with_arbiter(arbiter)
            .with_confidence_threshold(self.confidence_threshold)
            .with_iteration_bounds(self.min_iterations, self.max_iterations)
            .with_strategy(self.strategy.clone(), self.strategy_params.clone())
            .with_judging_method(self.judging_method)
            .with_history_window(self.history_window, self.history_max_chars)
            .with_empty_round_policy(self.on_empty)
            .with_fast_path(self.fast_path)
            .with_agent_timeout(self.timeout_seconds.map(Duration::from_secs));
        if let Some(system) = self.system_prompt.as_deref().filter(|s| !s.trim().is_empty()) {
            config = config.with_system_prompt(system);
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use consortium_domain::AgentId;

    #[test]
    fn test_consortium_config_default() {
        let config = FileConsortiumConfig::default();
        assert!(config.agents.is_empty());
        assert_eq!(config.confidence_threshold, 0.8);
        assert_eq!(config.max_iterations, 3);
        assert_eq!(config.strategy, "default");
        assert!(config.fast_path);
    }

    #[test]
    fn test_consortium_config_deserialize() {
        let toml_str = r#"
[consortium]
agents = ["gpt-4o:2", "claude"]
arbiter = "claude"
confidence_threshold = 85
max_iterations = 4
strategy = "top_k"
judging_method = "pick-one"
on_empty = "invoke_arbiter"
timeout_seconds = 30

[consortium.strategy_params]
k = 2
min_confidence = 0.4
"#;
        let file: super::super::FileConfig = toml::from_str(toml_str).unwrap();
        let config = file.consortium.to_consortium_config().unwrap();

        assert_eq!(config.agents.total_instances(), 3);
        assert_eq!(config.arbiter, AgentId::from("claude"));
        assert_eq!(config.confidence_threshold, 0.85);
        assert_eq!(config.max_iterations, 4);
        assert_eq!(config.judging_method, JudgingMethod::PickOne);
        assert_eq!(config.empty_round_policy, EmptyRoundPolicy::InvokeArbiter);
        assert_eq!(config.agent_timeout, Some(Duration::from_secs(30)));
        assert_eq!(config.strategy_params.usize_or("top_k", "k", 3).unwrap(), 2);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_arbiter_defaults_to_first_agent() {
        let file = FileConsortiumConfig {
            agents: vec!["b:2".to_string(), "a".to_string()],
            ..Default::default()
        };
        let config = file.to_consortium_config().unwrap();
        assert_eq!(config.arbiter, AgentId::from("b"));
    }

    #[test]
    fn test_invalid_agent_spec() {
        let file = FileConsortiumConfig {
            agents: vec!["gpt:two".to_string()],
            ..Default::default()
        };
        assert!(matches!(
            file.to_consortium_config(),
            Err(ConfigValidationError::Domain(DomainError::InvalidAgentSpec(_)))
        ));
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let file = FileConsortiumConfig {
            agents: vec!["a".to_string()],
            timeout_seconds: Some(0),
            ..Default::default()
        };
        assert!(matches!(
            file.to_consortium_config(),
            Err(ConfigValidationError::InvalidTimeout)
        ));
    }

    #[test]
    fn test_empty_panel_left_to_validation() {
        let config = FileConsortiumConfig::default().to_consortium_config().unwrap();
        assert!(matches!(config.validate(), Err(DomainError::EmptyPanel)));
    }
}
