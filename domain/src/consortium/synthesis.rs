//! Per-round synthesis result.

use crate::core::agent::AgentId;
use serde::{Deserialize, Serialize};

/// Analysis text attached to a synthesis whose arbiter output could not be parsed
pub const PARSE_FAILED_ANALYSIS: &str = "Parsing failed - see raw response";

/// Synthesis text used when a round had no usable responses
pub const NO_USABLE_RESPONSES: &str = "No usable responses: every agent instance failed or was filtered out";

/// One round's combined answer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SynthesisResult {
    /// The synthesized answer
    pub synthesis: String,
    /// Confidence in [0, 1]
    pub confidence: f64,
    /// Arbiter's analysis of the responses
    #[serde(default)]
    pub analysis: String,
    /// Notable dissenting views
    #[serde(default)]
    pub dissent: String,
    /// Whether the arbiter asked for another round
    #[serde(default)]
    pub needs_iteration: bool,
    /// What the next round should improve, in arbiter order
    #[serde(default)]
    pub refinement_areas: Vec<String>,
}

impl SynthesisResult {
    pub fn new(synthesis: impl Into<String>, confidence: f64) -> Self {
        Self {
            synthesis: synthesis.into(),
            confidence: clamp_confidence(confidence),
            analysis: String::new(),
            dissent: String::new(),
            needs_iteration: false,
            refinement_areas: Vec::new(),
        }
    }

    pub fn with_analysis(mut self, analysis: impl Into<String>) -> Self {
        self.analysis = analysis.into();
        self
    }

    pub fn with_dissent(mut self, dissent: impl Into<String>) -> Self {
        self.dissent = dissent.into();
        self
    }

    pub fn with_needs_iteration(mut self, needs_iteration: bool) -> Self {
        self.needs_iteration = needs_iteration;
        self
    }

    pub fn with_refinement_areas(mut self, areas: Vec<String>) -> Self {
        self.refinement_areas = areas;
        self
    }

    /// Degraded result for arbiter output that could not be parsed.
    ///
    /// The raw text is kept as the synthesis so nothing is lost.
    pub fn parse_failed(raw: impl Into<String>) -> Self {
        Self::new(raw, 0.5).with_analysis(PARSE_FAILED_ANALYSIS)
    }

    /// Terminal result for a round where nothing reached arbitration
    pub fn no_usable_responses() -> Self {
        Self::new(NO_USABLE_RESPONSES, 0.0).with_analysis(NO_USABLE_RESPONSES)
    }

    /// Degraded result for an arbiter call that did not return text
    pub fn arbiter_failed(arbiter: &AgentId, error: impl std::fmt::Display) -> Self {
        Self::new(String::new(), 0.0)
            .with_analysis(format!("Arbiter {} failed: {}", arbiter, error))
            .with_needs_iteration(true)
    }

    pub fn is_parse_failure(&self) -> bool {
        self.analysis == PARSE_FAILED_ANALYSIS
    }
}

/// Where a round's synthesis came from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SynthesisSource {
    /// The arbiter was invoked
    Arbiter { arbiter: AgentId },
    /// A single agent response met the threshold; the arbiter was skipped
    FastPath { agent: AgentId, instance: usize },
    /// No responses were usable and the round short-circuited
    NoUsableResponses,
}

impl SynthesisSource {
    pub fn arbiter_invoked(&self) -> bool {
        matches!(self, SynthesisSource::Arbiter { .. })
    }
}

pub(crate) fn clamp_confidence(value: f64) -> f64 {
    if value.is_finite() {
        value.clamp(0.0, 1.0)
    } else {
        0.5
    }
}
