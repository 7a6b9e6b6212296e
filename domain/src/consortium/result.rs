//! Final output of an orchestration run

use crate::consortium::history::IterationHistory;
use crate::consortium::judging::JudgingMethod;
use crate::consortium::response::ParsedResponse;
use crate::consortium::synthesis::SynthesisResult;
use crate::core::agent::AgentId;
use serde::{Deserialize, Serialize};

/// How a run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrchestrationOutcome {
    /// A round met the threshold after the minimum number of rounds
    Converged,
    /// The last allowed round was accepted without meeting the threshold
    MaxIterationsReached,
    /// A round had nothing to arbitrate and the run stopped early
    NoUsableResponses,
}

impl OrchestrationOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrchestrationOutcome::Converged => "converged",
            OrchestrationOutcome::MaxIterationsReached => "max_iterations_reached",
            OrchestrationOutcome::NoUsableResponses => "no_usable_responses",
        }
    }
}

impl std::fmt::Display for OrchestrationOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrchestrationMetadata {
    /// Unique id of this run, shared by every record it produces
    pub consortium_id: String,
    /// Panel labels (`name` or `name:count`)
    pub agents_used: Vec<String>,
    pub arbiter: AgentId,
    pub iteration_count: usize,
    /// Completion time (ms since the Unix epoch)
    pub timestamp: u64,
    pub outcome: OrchestrationOutcome,
    pub strategy: String,
    pub judging_method: JudgingMethod,
    /// Wall-clock duration of the whole run
    pub total_latency_ms: u64,
}

/// Exactly one of these is produced per `orchestrate` call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrchestrationResult {
    pub original_prompt: String,
    /// The accepted (or force-accepted) synthesis
    pub synthesis: SynthesisResult,
    /// Responses of the last round, in submission order
    pub responses: Vec<ParsedResponse>,
    /// Every completed round
    pub history: IterationHistory,
    pub metadata: OrchestrationMetadata,
}

impl OrchestrationResult {
    pub fn is_converged(&self) -> bool {
        self.metadata.outcome == OrchestrationOutcome::Converged
    }

    pub fn confidence(&self) -> f64 {
        self.synthesis.confidence
    }
}
