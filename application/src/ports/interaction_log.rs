//! Port for persisting completed runs.
//!
//! Defines the [`InteractionLogger`] trait for recording one summary record
//! per orchestration run (prompt, panel, arbiter, final answer) to an
//! append-only log.
//!
//! This is separate from `tracing`-based operation logs: tracing handles
//! human-readable diagnostic messages, while this port captures run
//! outcomes in a machine-readable format (JSONL).

use consortium_domain::OrchestrationResult;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised by an interaction log
///
/// The controller logs these and carries on; they never abort a run.
#[derive(Error, Debug)]
pub enum InteractionLogError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Log unavailable: {0}")]
    Unavailable(String),
}

/// Summary of one orchestration run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InteractionRecord {
    /// Id of the run this record belongs to
    pub consortium_id: String,
    /// Completion time, RFC 3339 (UTC)
    pub timestamp: String,
    pub prompt: String,
    /// Panel labels (`name` or `name:count`)
    pub agents: Vec<String>,
    pub arbiter: String,
    pub iteration_count: usize,
    pub final_response: String,
    pub confidence: f64,
    pub outcome: String,
    pub strategy: String,
    pub latency_ms: u64,
}

impl InteractionRecord {
    pub fn from_result(result: &OrchestrationResult) -> Self {
        let metadata = &result.metadata;
        let timestamp = chrono::DateTime::from_timestamp_millis(metadata.timestamp as i64)
            .unwrap_or_else(chrono::Utc::now)
            .to_rfc3339_opts(chrono::SecondsFormat::Millis, true);

        Self {
            consortium_id: metadata.consortium_id.clone(),
            timestamp,
            prompt: result.original_prompt.clone(),
            agents: metadata.agents_used.clone(),
            arbiter: metadata.arbiter.to_string(),
            iteration_count: metadata.iteration_count,
            final_response: result.synthesis.synthesis.clone(),
            confidence: result.synthesis.confidence,
            outcome: metadata.outcome.to_string(),
            strategy: metadata.strategy.clone(),
            latency_ms: metadata.total_latency_ms,
        }
    }
}

/// Port for appending run records to a persistent log.
///
/// Implementations must tolerate concurrent callers (append-only).
pub trait InteractionLogger: Send + Sync {
    /// Append one record.
    fn record(&self, record: &InteractionRecord) -> Result<(), InteractionLogError>;
}

/// No-op implementation for tests and when persistence is disabled.
pub struct NoInteractionLog;

impl InteractionLogger for NoInteractionLog {
    fn record(&self, _record: &InteractionRecord) -> Result<(), InteractionLogError> {
        Ok(())
    }
}
