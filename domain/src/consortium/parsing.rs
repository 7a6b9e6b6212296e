//! Free-text response parsing.
//!
//! Agents and the arbiter answer in plain text with named sections such as
//! `<confidence>0.8</confidence>`. This module is the only place that knows
//! how those sections are found; everything else works with the extracted
//! values.
//!
//! The contract tolerates surrounding prose, reordered sections, missing
//! sections, fractional (`0.85`) and percentage (`85%`, `85`) confidence
//! notations, and repeated tags (the first occurrence wins).
//!
//! | Function | Input | Failure mode |
//! |----------|-------|--------------|
//! | [`ResponseParser::parse_confidence`] | any text | caller-supplied default |
//! | [`ResponseParser::parse_structured`] | arbiter output | [`ParseError`] |
//! | [`ResponseParser::parse_synthesis`] | arbiter output | degraded [`SynthesisResult`] |
//! | [`ResponseParser::parse_agent_response`] | agent output | full text as answer |

use crate::consortium::response::{ParsedResponse, RawResponse};
use crate::consortium::synthesis::{SynthesisResult, clamp_confidence};
use regex::Regex;
use std::sync::LazyLock;
use thiserror::Error;

static CONFIDENCE_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<confidence(?:\s[^>]*)?>(.*?)</confidence\s*>").expect("valid regex")
});

static NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+(?:\.\d+)?|\.\d+)\s*(%)?").expect("valid regex"));

static BARE_VALUE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*(\d+(?:\.\d+)?|\.\d+)\s*(%)?\s*$").expect("valid regex"));

static NESTED_ITEM: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<([a-z][a-z0-9_-]*)(?:\s[^>]*)?>(.*?)</([a-z][a-z0-9_-]*)\s*>")
        .expect("valid regex")
});

static BULLET: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:[-*•+]|\d+[.)])\s+").expect("valid regex"));

const CONFIDENCE_KEYWORD: &str = "confidence";

/// Section names of the arbiter's synthesis contract
pub const SYNTHESIS_FIELDS: [&str; 6] = [
    "synthesis",
    "confidence",
    "analysis",
    "dissent",
    "needs_iteration",
    "refinement_areas",
];

/// Why structured extraction gave up
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("section <{0}> is opened but never closed")]
    Unterminated(String),

    #[error("no recognised sections in response")]
    NoSections,

    #[error("invalid section name '{0}'")]
    InvalidField(String),
}

/// Sections extracted from a response, in the order they were requested
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Sections {
    values: Vec<(String, Option<String>)>,
}

impl Sections {
    /// Trimmed content of a section, if it was present
    pub fn get(&self, field: &str) -> Option<&str> {
        self.values
            .iter()
            .find(|(name, _)| name == field)
            .and_then(|(_, value)| value.as_deref())
    }

    pub fn found(&self) -> usize {
        self.values.iter().filter(|(_, v)| v.is_some()).count()
    }
}

/// Extraction entry points for the textual agent contract
pub struct ResponseParser;

impl ResponseParser {
    /// Confidence used when none can be extracted
    pub const DEFAULT_CONFIDENCE: f64 = 0.5;

    /// Extract a confidence score in [0, 1].
    ///
    /// Order of precedence:
    /// 1. the first `<confidence>` tag
    /// 2. the first number on a line mentioning "confidence"
    /// 3. a text that is nothing but a number (`"0.8"`, `"75%"`)
    ///
    /// Values above 1 (or with a `%` sign) are percentages. Returns
    /// `default` (clamped) when nothing is found.
    ///
    /// ```
    /// use consortium_domain::ResponseParser;
    ///
    /// assert_eq!(ResponseParser::parse_confidence("<confidence>0.92</confidence>", 0.5), 0.92);
    /// assert_eq!(ResponseParser::parse_confidence("Confidence: 75%", 0.5), 0.75);
    /// assert_eq!(ResponseParser::parse_confidence("no idea", 0.4), 0.4);
    /// ```
    pub fn parse_confidence(text: &str, default: f64) -> f64 {
        Self::tagged_confidence(text)
            .or_else(|| Self::keyword_confidence(text))
            .or_else(|| Self::bare_confidence(text))
            .unwrap_or_else(|| clamp_confidence(default))
    }

    fn tagged_confidence(text: &str) -> Option<f64> {
        let content = CONFIDENCE_TAG.captures(text)?.get(1)?.as_str();
        first_number(content)
    }

    fn keyword_confidence(text: &str) -> Option<f64> {
        text.lines().find_map(|line| {
            let lower = line.to_lowercase();
            let pos = lower.find(CONFIDENCE_KEYWORD)?;
            // Prefer a number after the keyword ("Confidence: 80%"), then any on the line
            line.get(pos..)
                .and_then(first_number)
                .or_else(|| first_number(line))
        })
    }

    fn bare_confidence(text: &str) -> Option<f64> {
        let caps = BARE_VALUE.captures(text)?;
        to_confidence(caps.get(1)?.as_str(), caps.get(2).is_some())
    }

    /// Content of the first terminated `<tag>…</tag>` span, trimmed.
    ///
    /// Lenient: an unterminated tag yields `None`.
    pub fn extract_tag(text: &str, tag: &str) -> Option<String> {
        find_section(text, tag).ok().flatten()
    }

    /// Extract the named sections from `text`.
    ///
    /// Each section is optional. Fails when a requested section is opened but
    /// never closed (truncated output), or when none of the sections exist.
    pub fn extract_sections(text: &str, fields: &[&str]) -> Result<Sections, ParseError> {
        let mut values = Vec::with_capacity(fields.len());
        for field in fields {
            let value = find_section(text, field)?;
            values.push((field.to_string(), value));
        }
        let sections = Sections { values };
        if sections.found() == 0 {
            return Err(ParseError::NoSections);
        }
        Ok(sections)
    }

    /// Parse the arbiter's synthesis contract into a [`SynthesisResult`].
    ///
    /// Missing sections take type-correct defaults (empty text, 0.5, false,
    /// empty list); unparseable values inside a present section fall back to
    /// that field's default.
    pub fn parse_structured(text: &str) -> Result<SynthesisResult, ParseError> {
        let sections = Self::extract_sections(text, &SYNTHESIS_FIELDS)?;

        let confidence = sections
            .get("confidence")
            .map(|c| Self::parse_confidence(c, Self::DEFAULT_CONFIDENCE))
            .unwrap_or(Self::DEFAULT_CONFIDENCE);

        Ok(SynthesisResult::new(
            sections.get("synthesis").unwrap_or_default(),
            confidence,
        )
        .with_analysis(sections.get("analysis").unwrap_or_default())
        .with_dissent(sections.get("dissent").unwrap_or_default())
        .with_needs_iteration(
            sections
                .get("needs_iteration")
                .and_then(parse_bool)
                .unwrap_or(false),
        )
        .with_refinement_areas(
            sections
                .get("refinement_areas")
                .map(parse_list)
                .unwrap_or_default(),
        ))
    }

    /// Like [`parse_structured`](Self::parse_structured), but never fails:
    /// unparseable output becomes [`SynthesisResult::parse_failed`] carrying
    /// the raw text.
    pub fn parse_synthesis(text: &str) -> SynthesisResult {
        Self::parse_structured(text).unwrap_or_else(|_| SynthesisResult::parse_failed(text))
    }

    /// Turn one agent's raw output into a [`ParsedResponse`].
    ///
    /// The answer is the `<answer>` (or `<response>`) section when present,
    /// otherwise the whole trimmed text. Failed invocations keep their error
    /// and get confidence 0.
    pub fn parse_agent_response(raw: RawResponse) -> ParsedResponse {
        if !raw.is_success() {
            return ParsedResponse::failed(raw);
        }

        let confidence = Self::parse_confidence(&raw.text, Self::DEFAULT_CONFIDENCE);
        let answer = Self::extract_tag(&raw.text, "answer")
            .or_else(|| Self::extract_tag(&raw.text, "response"))
            .unwrap_or_else(|| raw.text.trim().to_string());
        let reasoning = Self::extract_tag(&raw.text, "reasoning").filter(|r| !r.is_empty());

        ParsedResponse::new(raw, confidence, answer, reasoning)
    }
}

/// Locate the first `<field>` and the first `</field>` after it.
fn find_section(text: &str, field: &str) -> Result<Option<String>, ParseError> {
    if field.is_empty() || !field.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-') {
        return Err(ParseError::InvalidField(field.to_string()));
    }
    let name = regex::escape(field);
    let open = Regex::new(&format!(r"(?i)<{}(?:\s[^>]*)?>", name))
        .map_err(|_| ParseError::InvalidField(field.to_string()))?;
    let close = Regex::new(&format!(r"(?i)</{}\s*>", name))
        .map_err(|_| ParseError::InvalidField(field.to_string()))?;

    let Some(start) = open.find(text) else {
        return Ok(None);
    };
    let rest = &text[start.end()..];
    match close.find(rest) {
        Some(end) => Ok(Some(rest[..end.start()].trim().to_string())),
        None => Err(ParseError::Unterminated(field.to_string())),
    }
}

fn first_number(text: &str) -> Option<f64> {
    let caps = NUMBER.captures(text)?;
    to_confidence(caps.get(1)?.as_str(), caps.get(2).is_some())
}

fn to_confidence(number: &str, percent: bool) -> Option<f64> {
    let value: f64 = number.parse().ok()?;
    if !value.is_finite() {
        return None;
    }
    let value = if percent || value > 1.0 {
        value / 100.0
    } else {
        value
    };
    Some(value.clamp(0.0, 1.0))
}

fn parse_bool(text: &str) -> Option<bool> {
    match text.trim().to_lowercase().as_str() {
        "true" | "yes" | "1" => Some(true),
        "false" | "no" | "0" => Some(false),
        _ => None,
    }
}

/// Split a list section on nested tags or, failing that, on newlines.
pub(crate) fn parse_list(text: &str) -> Vec<String> {
    let items = nested_items(text).unwrap_or_else(|| text.lines().map(str::to_string).collect());

    items
        .iter()
        .map(|item| BULLET.replace(item.trim(), "").trim().to_string())
        .filter(|item| !item.is_empty())
        .collect()
}

/// Contents of a section made of nothing but `<item>..</item>` elements.
///
/// Returns `None` as soon as prose sits between elements or a close tag
/// does not match its open tag, so inline markup inside a line-based list
/// is left alone.
fn nested_items(text: &str) -> Option<Vec<String>> {
    let mut items = Vec::new();
    let mut last = 0;
    for caps in NESTED_ITEM.captures_iter(text) {
        let whole = caps.get(0)?;
        let matched = caps[1].eq_ignore_ascii_case(&caps[3]);
        if !matched || !text[last..whole.start()].trim().is_empty() {
            return None;
        }
        items.push(caps[2].to_string());
        last = whole.end();
    }
    if items.is_empty() || !text[last..].trim().is_empty() {
        return None;
    }
    Some(items)
}
