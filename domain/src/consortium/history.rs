//! Append-only record of completed rounds

use crate::consortium::response::ParsedResponse;
use crate::consortium::synthesis::{SynthesisResult, SynthesisSource};
use crate::core::text::{clip, one_line};
use serde::{Deserialize, Serialize};

/// Summary line length for rounds outside the render window
const SUMMARY_CHARS: usize = 160;

/// One completed round. Immutable once appended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IterationRecord {
    /// 1-based round number
    pub iteration: usize,
    /// Completion time (ms since the Unix epoch)
    pub timestamp: u64,
    /// Every instance's response, in submission order
    pub responses: Vec<ParsedResponse>,
    pub synthesis: SynthesisResult,
    /// Areas fed into the next round's prompt
    pub refinement_areas: Vec<String>,
    pub source: SynthesisSource,
}

impl IterationRecord {
    pub fn new(
        iteration: usize,
        timestamp: u64,
        responses: Vec<ParsedResponse>,
        synthesis: SynthesisResult,
        source: SynthesisSource,
    ) -> Self {
        let refinement_areas = synthesis.refinement_areas.clone();
        Self {
            iteration,
            timestamp,
            responses,
            synthesis,
            refinement_areas,
            source,
        }
    }

    pub fn metrics(&self) -> RoundMetrics {
        RoundMetrics::from_responses(&self.responses)
    }
}

/// Confidence statistics over a round's successful responses
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RoundMetrics {
    pub successful: usize,
    pub failed: usize,
    pub mean_confidence: f64,
    pub min_confidence: f64,
    pub max_confidence: f64,
}

impl RoundMetrics {
    pub fn from_responses(responses: &[ParsedResponse]) -> Self {
        let confidences: Vec<f64> = responses
            .iter()
            .filter(|r| r.is_success())
            .map(|r| r.confidence)
            .collect();
        let failed = responses.len() - confidences.len();
        if confidences.is_empty() {
            return Self {
                failed,
                ..Self::default()
            };
        }

        let sum: f64 = confidences.iter().sum();
        Self {
            successful: confidences.len(),
            failed,
            mean_confidence: sum / confidences.len() as f64,
            min_confidence: confidences.iter().copied().fold(f64::INFINITY, f64::min),
            max_confidence: confidences.iter().copied().fold(0.0, f64::max),
        }
    }
}

/// Ordered log of completed rounds
///
/// Only the iteration controller appends; strategies and prompt builders
/// read it through shared references.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IterationHistory {
    records: Vec<IterationRecord>,
}

impl IterationHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, record: IterationRecord) {
        self.records.push(record);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[IterationRecord] {
        &self.records
    }

    /// Render the history for inclusion in a prompt.
    ///
    /// The latest `window` rounds are shown in full, older ones as a single
    /// summary line. Text fields are clipped to `max_chars` characters.
    pub fn render(&self, window: usize, max_chars: usize) -> String {
        let split = self.records.len().saturating_sub(window);
        let (older, recent) = self.records.split_at(split);

        let mut out = String::new();
        for record in older {
            out.push_str(&format!(
                "Round {} (confidence {:.2}): {}\n",
                record.iteration,
                record.synthesis.confidence,
                clip(&one_line(&record.synthesis.synthesis), SUMMARY_CHARS)
            ));
        }
        if !older.is_empty() && !recent.is_empty() {
            out.push('\n');
        }

        for record in recent {
            out.push_str(&render_record(record, max_chars));
            out.push('\n');
        }
        out.trim_end().to_string()
    }
}

fn render_record(record: &IterationRecord, max_chars: usize) -> String {
    let source = match &record.source {
        SynthesisSource::Arbiter { arbiter } => format!("arbiter {}", arbiter),
        SynthesisSource::FastPath { agent, instance } => {
            format!("adopted from {}#{}", agent, instance)
        }
        SynthesisSource::NoUsableResponses => "no usable responses".to_string(),
    };

    let mut out = format!(
        "Round {} ({}, confidence {:.2})\nSynthesis:\n{}\n",
        record.iteration,
        source,
        record.synthesis.confidence,
        clip(record.synthesis.synthesis.trim(), max_chars)
    );

    if !record.refinement_areas.is_empty() {
        out.push_str("Refinement areas:\n");
        for area in &record.refinement_areas {
            out.push_str(&format!("- {}\n", clip(area, max_chars)));
        }
    }

    let scores: Vec<String> = record
        .responses
        .iter()
        .map(|r| {
            if r.is_success() {
                format!("{} {:.2}", r.label(), r.confidence)
            } else {
                format!("{} failed", r.label())
            }
        })
        .collect();
    if !scores.is_empty() {
        let metrics = record.metrics();
        out.push_str(&format!(
            "Agent confidence: {} (mean {:.2})\n",
            scores.join(", "),
            metrics.mean_confidence
        ));
    }
    out
}
