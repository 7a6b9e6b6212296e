//! Rotating sub-panel

use super::{SelectionStrategy, StrategyParams, invalid};
use crate::consortium::history::IterationRecord;
use crate::consortium::response::ParsedResponse;
use crate::core::agent::{AgentId, AgentPanel};
use crate::core::error::DomainError;

/// Runs a window of `panel_size` agents that slides by one each round
///
/// Round 1 runs agents `[0, panel_size)`, round 2 `[1, panel_size + 1)`,
/// wrapping around the panel. Each selected agent keeps its instance count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RotationStrategy {
    panel_size: usize,
}

impl RotationStrategy {
    pub const NAME: &'static str = "rotation";
    pub const DEFAULT_PANEL_SIZE: usize = 2;

    pub fn new(panel_size: usize) -> Result<Self, DomainError> {
        if panel_size == 0 {
            return Err(invalid(Self::NAME, "panel_size", "must be at least 1"));
        }
        Ok(Self { panel_size })
    }

    pub fn from_params(params: &StrategyParams) -> Result<Self, DomainError> {
        Self::new(params.usize_or(Self::NAME, "panel_size", Self::DEFAULT_PANEL_SIZE)?)
    }
}

impl SelectionStrategy for RotationStrategy {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn initialize_state(&mut self) {}

    fn select_models(&mut self, available: &AgentPanel, _prompt: &str, iteration: usize) -> AgentPanel {
        let agents: Vec<&AgentId> = available.agents().collect();
        if agents.len() <= self.panel_size {
            return available.clone();
        }

        let start = iteration.saturating_sub(1) % agents.len();
        let window: Vec<&AgentId> = (0..self.panel_size)
            .map(|offset| agents[(start + offset) % agents.len()])
            .collect();

        available
            .entries()
            .iter()
            .filter(|e| window.contains(&&e.agent))
            .map(|e| (e.agent.clone(), e.instances))
            .collect()
    }

    fn process_responses(
        &mut self,
        successful: Vec<ParsedResponse>,
        _iteration: usize,
    ) -> Vec<ParsedResponse> {
        successful
    }

    fn update_state(&mut self, _record: &IterationRecord) {}
}
