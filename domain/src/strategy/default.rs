//! Pass-through strategy

use super::SelectionStrategy;
use crate::consortium::history::IterationRecord;
use crate::consortium::response::ParsedResponse;
use crate::core::agent::AgentPanel;

/// Runs the whole panel every round and forwards every successful response
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultStrategy;

impl DefaultStrategy {
    pub const NAME: &'static str = "default";
}

impl SelectionStrategy for DefaultStrategy {
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
        successful
    }

    fn update_state(&mut self, _record: &IterationRecord) {}
}
