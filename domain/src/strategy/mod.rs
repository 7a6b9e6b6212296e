//! Selection strategies
//!
//! A [`SelectionStrategy`] decides which agents run in a round and which of
//! their successful responses reach the arbiter. Strategies are the
//! extension point for alternate consensus policies: the iteration loop only
//! talks to this trait.
//!
//! Built-ins, all reachable by name through [`StrategyRegistry`]:
//!
//! | Name | Selection | Filtering |
//! |------|-----------|-----------|
//! | `default` | whole panel | none |
//! | `top_k` | whole panel | best `k` above `min_confidence` |
//! | `elimination` | drops the worst-scoring agent each round | none |
//! | `rotation` | sliding window of `panel_size` agents | none |

pub mod default;
pub mod elimination;
pub mod registry;
pub mod rotation;
pub mod top_k;

pub use default::DefaultStrategy;
pub use elimination::EliminationStrategy;
pub use registry::{StrategyConstructor, StrategyRegistry};
pub use rotation::RotationStrategy;
pub use top_k::TopKStrategy;

use crate::consortium::history::IterationRecord;
use crate::consortium::response::ParsedResponse;
use crate::core::agent::AgentPanel;
use crate::core::error::DomainError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Pluggable per-run selection policy
///
/// One instance serves exactly one orchestration run. The controller calls
/// [`initialize_state`](Self::initialize_state) before the first round, then
/// per round: `select_models`, `process_responses`, and `update_state` once
/// the round is recorded.
pub trait SelectionStrategy: Send + Sync {
    /// Registered name of this strategy
    fn name(&self) -> &str;

    /// Reset all per-run state
    fn initialize_state(&mut self);

    /// Pick this round's panel.
    ///
    /// The controller restricts the answer to `available`, so extra agents or
    /// inflated counts are ignored. An empty panel skips the agent phase.
    fn select_models(&mut self, available: &AgentPanel, prompt: &str, iteration: usize)
    -> AgentPanel;

    /// Filter or reorder the successful responses before arbitration
    fn process_responses(
        &mut self,
        successful: Vec<ParsedResponse>,
        iteration: usize,
    ) -> Vec<ParsedResponse>;

    /// Observe a completed round
    fn update_state(&mut self, record: &IterationRecord);
}

/// Strategy parameters as a JSON object
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StrategyParams(Map<String, Value>);

impl StrategyParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: Value) {
        self.0.insert(key.into(), value);
    }

    /// Insert a value given as text: JSON when it parses, a string otherwise
    pub fn insert_raw(&mut self, key: impl Into<String>, raw: &str) {
        let value = serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()));
        self.0.insert(key.into(), value);
    }

    /// Merge `other` on top of `self`
    pub fn merge(&mut self, other: StrategyParams) {
        self.0.extend(other.0);
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    /// Read a number parameter, or `default` when absent
    pub fn f64_or(&self, strategy: &str, key: &str, default: f64) -> Result<f64, DomainError> {
        match self.0.get(key) {
            None => Ok(default),
            Some(value) => value
                .as_f64()
                .ok_or_else(|| invalid(strategy, key, format!("expected a number, got {}", value))),
        }
    }

    /// Read a non-negative integer parameter, or `default` when absent
    pub fn usize_or(&self, strategy: &str, key: &str, default: usize) -> Result<usize, DomainError> {
        match self.0.get(key) {
            None => Ok(default),
            Some(value) => value
                .as_u64()
                .and_then(|n| usize::try_from(n).ok())
                .ok_or_else(|| {
                    invalid(
                        strategy,
                        key,
                        format!("expected a non-negative integer, got {}", value),
                    )
                }),
        }
    }
}

pub(crate) fn invalid(strategy: &str, key: &str, reason: impl Into<String>) -> DomainError {
    DomainError::InvalidStrategyParam {
        strategy: strategy.to_string(),
        param: key.to_string(),
        reason: reason.into(),
    }
}
