//! How the arbiter turns a round's responses into one answer

use crate::consortium::parsing::{ResponseParser, parse_list};
use crate::consortium::response::ParsedResponse;
use crate::consortium::synthesis::SynthesisResult;
use crate::core::error::DomainError;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

static RANK_ENTRY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)<rank\b[^>]*?position\s*=\s*["']?(\d+)["']?[^>]*>\s*(\d+)\s*</rank\s*>"#)
        .expect("valid regex")
});

static ID_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+").expect("valid regex"));

/// Arbitration style
///
/// - `Synthesis`: merge all responses into a new answer (default)
/// - `PickOne`: choose the single best response verbatim
/// - `Rank`: order the responses; the top-ranked one is adopted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum JudgingMethod {
    #[default]
    Synthesis,
    PickOne,
    Rank,
}

impl JudgingMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            JudgingMethod::Synthesis => "synthesis",
            JudgingMethod::PickOne => "pick-one",
            JudgingMethod::Rank => "rank",
        }
    }

    /// Interpret the arbiter's output for this method.
    ///
    /// `candidates` are the responses shown to the arbiter, numbered from 1
    /// in the prompt. Never fails: an unusable verdict degrades to
    /// [`SynthesisResult::parse_failed`].
    pub fn parse_verdict(&self, text: &str, candidates: &[ParsedResponse]) -> SynthesisResult {
        let chosen = match self {
            JudgingMethod::Synthesis => return ResponseParser::parse_synthesis(text),
            JudgingMethod::PickOne => pick_one_choice(text),
            JudgingMethod::Rank => rank_choice(text),
        };

        let Some(response) = chosen
            .and_then(|id| id.checked_sub(1))
            .and_then(|index| candidates.get(index))
        else {
            return SynthesisResult::parse_failed(text);
        };

        let confidence = ResponseParser::parse_confidence(text, response.confidence);
        let analysis = ResponseParser::extract_tag(text, "analysis")
            .filter(|a| !a.is_empty())
            .unwrap_or_else(|| {
                format!(
                    "Selected response from {} by {}",
                    response.label(),
                    self.as_str()
                )
            });

        SynthesisResult::new(response.answer.clone(), confidence)
            .with_analysis(analysis)
            .with_dissent(ResponseParser::extract_tag(text, "dissent").unwrap_or_default())
            .with_needs_iteration(
                ResponseParser::extract_tag(text, "needs_iteration")
                    .is_some_and(|v| matches!(v.to_lowercase().as_str(), "true" | "yes" | "1")),
            )
            .with_refinement_areas(
                ResponseParser::extract_tag(text, "refinement_areas")
                    .map(|areas| parse_list(&areas))
                    .unwrap_or_default(),
            )
    }
}

/// `<winner><response_id>N</response_id></winner>`, or a bare `<response_id>`
fn pick_one_choice(text: &str) -> Option<usize> {
    let scope = ResponseParser::extract_tag(text, "winner").unwrap_or_else(|| text.to_string());
    let id = ResponseParser::extract_tag(&scope, "response_id")?;
    ID_NUMBER.find(&id)?.as_str().parse().ok()
}

/// The response at the lowest `<rank position="P">N</rank>`
fn rank_choice(text: &str) -> Option<usize> {
    RANK_ENTRY
        .captures_iter(text)
        .filter_map(|caps| {
            let position: usize = caps.get(1)?.as_str().parse().ok()?;
            let id: usize = caps.get(2)?.as_str().parse().ok()?;
            Some((position, id))
        })
        .min_by_key(|(position, _)| *position)
        .map(|(_, id)| id)
}

impl std::fmt::Display for JudgingMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for JudgingMethod {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "synthesis" | "synthesize" => Ok(JudgingMethod::Synthesis),
            "pick-one" | "pick_one" | "pickone" | "pick" => Ok(JudgingMethod::PickOne),
            "rank" | "ranking" => Ok(JudgingMethod::Rank),
            _ => Err(DomainError::UnknownJudgingMethod(s.to_string())),
        }
    }
}
