//! Confidence-ranked filtering

use super::{SelectionStrategy, StrategyParams, invalid};
use crate::consortium::history::IterationRecord;
use crate::consortium::response::ParsedResponse;
use crate::core::agent::AgentPanel;
use crate::core::error::DomainError;

/// Forwards only the `k` most confident responses above `min_confidence`
///
/// Ties keep submission order. The whole panel runs every round.
#[derive(Debug, Clone, PartialEq)]
pub struct TopKStrategy {
    k: usize,
    min_confidence: f64,
}

impl TopKStrategy {
    pub const NAME: &'static str = "top_k";
    pub const DEFAULT_K: usize = 3;

    pub fn new(k: usize, min_confidence: f64) -> Result<Self, DomainError> {
        if k == 0 {
            return Err(invalid(Self::NAME, "k", "must be at least 1"));
        }
        if !(0.0..=1.0).contains(&min_confidence) {
            return Err(invalid(
                Self::NAME,
                "min_confidence",
                format!("{} is outside [0, 1]", min_confidence),
            ));
        }
        Ok(Self { k, min_confidence })
    }

    pub fn from_params(params: &StrategyParams) -> Result<Self, DomainError> {
        Self::new(
            params.usize_or(Self::NAME, "k", Self::DEFAULT_K)?,
            params.f64_or(Self::NAME, "min_confidence", 0.0)?,
        )
    }
}

impl SelectionStrategy for TopKStrategy {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn initialize_state(&mut self) {}

    fn select_models(&mut self, available: &AgentPanel, _prompt: &str, _iteration: usize) -> AgentPanel {
        available.clone()
    }

    fn process_responses(
        &mut self,
        successful: Vec<ParsedResponse>,
        _iteration: usize,
    ) -> Vec<ParsedResponse> {
        let mut kept: Vec<ParsedResponse> = successful
            .into_iter()
            .filter(|r| r.confidence >= self.min_confidence)
            .collect();
        // sort_by is stable, so equal confidences stay in submission order
        kept.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
        kept.truncate(self.k);
        kept
    }

    fn update_state(&mut self, _record: &IterationRecord) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategy::test_support::response;

    #[test]
    fn test_keeps_best_k() {
        let mut strategy = TopKStrategy::new(2, 0.0).unwrap();
        let kept = strategy.process_responses(
            vec![
                response("a", 0, 0.4),
                response("b", 0, 0.9),
                response("c", 0, 0.7),
            ],
            1,
        );
        let labels: Vec<String> = kept.iter().map(|r| r.label()).collect();
        assert_eq!(labels, vec!["b#0", "c#0"]);
    }

    #[test]
    fn test_ties_keep_submission_order() {
        let mut strategy = TopKStrategy::new(2, 0.0).unwrap();
        let kept = strategy.process_responses(
            vec![
                response("a", 0, 0.5),
                response("a", 1, 0.8),
                response("b", 0, 0.8),
            ],
            1,
        );
        let labels: Vec<String> = kept.iter().map(|r| r.label()).collect();
        assert_eq!(labels, vec!["a#1", "b#0"]);
    }

    #[test]
    fn test_min_confidence_can_empty_the_set() {
        let mut strategy = TopKStrategy::new(3, 0.95).unwrap();
        let kept = strategy.process_responses(vec![response("a", 0, 0.5)], 1);
        assert!(kept.is_empty());
    }

    #[test]
    fn test_from_params() {
        let params = StrategyParams::new().with("k", 1).with("min_confidence", 0.2);
        assert_eq!(
            TopKStrategy::from_params(&params).unwrap(),
            TopKStrategy::new(1, 0.2).unwrap()
        );
        assert!(TopKStrategy::from_params(&StrategyParams::new().with("k", 0)).is_err());
        assert!(
            TopKStrategy::from_params(&StrategyParams::new().with("min_confidence", 2.0)).is_err()
        );
    }
}
