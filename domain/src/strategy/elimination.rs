//! Elimination tournament

use super::{SelectionStrategy, StrategyParams, invalid};
use crate::consortium::history::IterationRecord;
use crate::consortium::response::ParsedResponse;
use crate::core::agent::{AgentId, AgentPanel};
use crate::core::error::DomainError;
use std::collections::HashMap;

/// Drops the agent with the lowest running mean confidence each round
///
/// Scores accumulate over every response an agent produced in the run,
/// failures counting as 0. Elimination starts at round 2 and stops once
/// `min_agents` agents remain. Agents with no score yet are never dropped.
#[derive(Debug, Clone, PartialEq)]
pub struct EliminationStrategy {
    min_agents: usize,
    scores: HashMap<AgentId, (f64, usize)>,
    eliminated: Vec<AgentId>,
}

impl EliminationStrategy {
    pub const NAME: &'static str = "elimination";

    pub fn new(min_agents: usize) -> Result<Self, DomainError> {
        if min_agents == 0 {
            return Err(invalid(Self::NAME, "min_agents", "must be at least 1"));
        }
        Ok(Self {
            min_agents,
            scores: HashMap::new(),
            eliminated: Vec::new(),
        })
    }

    pub fn from_params(params: &StrategyParams) -> Result<Self, DomainError> {
        Self::new(params.usize_or(Self::NAME, "min_agents", 1)?)
    }

    /// Running mean confidence of an agent, if it has responded yet
    pub fn score(&self, agent: &AgentId) -> Option<f64> {
        self.scores
            .get(agent)
            .filter(|(_, count)| *count > 0)
            .map(|(sum, count)| sum / *count as f64)
    }

    pub fn eliminated(&self) -> &[AgentId] {
        &self.eliminated
    }

    /// Lowest-scoring active agent; the earliest in panel order wins ties
    fn worst<'a>(&self, active: &[&'a AgentId]) -> Option<&'a AgentId> {
        let mut worst: Option<(&'a AgentId, f64)> = None;
        for &agent in active {
            let Some(score) = self.score(agent) else {
                continue;
            };
            if worst.is_none_or(|(_, lowest)| score < lowest) {
                worst = Some((agent, score));
            }
        }
        worst.map(|(agent, _)| agent)
    }
}

impl SelectionStrategy for EliminationStrategy {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn initialize_state(&mut self) {
        self.scores.clear();
        self.eliminated.clear();
    }

    fn select_models(&mut self, available: &AgentPanel, _prompt: &str, iteration: usize) -> AgentPanel {
        let active: Vec<&AgentId> = available
            .agents()
            .filter(|agent| !self.eliminated.contains(agent))
            .collect();

        if iteration >= 2 && active.len() > self.min_agents {
            if let Some(worst) = self.worst(&active) {
                self.eliminated.push(worst.clone());
            }
        }

        available
            .entries()
            .iter()
            .filter(|e| !self.eliminated.contains(&e.agent))
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

    fn update_state(&mut self, record: &IterationRecord) {
        for response in &record.responses {
            let entry = self.scores.entry(response.agent().clone()).or_insert((0.0, 0));
            entry.0 += response.confidence;
            entry.1 += 1;
        }
    }
}
