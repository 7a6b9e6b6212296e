//! Progress notification port
//!
//! Defines the interface for reporting progress during a consortium run.

use consortium_domain::{AgentId, IterationRecord};

/// Phase of a round
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Concurrent fan-out to the panel
    Agents,
    /// Single arbiter call
    Arbitration,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Agents => "Agents",
            Phase::Arbitration => "Arbitration",
        }
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Callback for progress updates during a run
///
/// Implementations live in the presentation layer and can display
/// progress in various ways (console, log, etc.)
pub trait ProgressNotifier: Send + Sync {
    /// Called when a round starts
    fn on_round_start(&self, _iteration: usize, _max_iterations: usize) {}

    /// Called when a phase starts
    fn on_phase_start(&self, phase: Phase, total_tasks: usize);

    /// Called when a task completes within a phase
    fn on_task_complete(&self, phase: Phase, agent: &AgentId, success: bool);

    /// Called when a phase completes
    fn on_phase_complete(&self, phase: Phase);

    /// Called once a round has been appended to the history
    fn on_round_complete(&self, _record: &IterationRecord) {}
}

/// No-op progress notifier for when progress reporting is not needed
pub struct NoProgress;

impl ProgressNotifier for NoProgress {
    fn on_phase_start(&self, _phase: Phase, _total_tasks: usize) {}
    fn on_task_complete(&self, _phase: Phase, _agent: &AgentId, _success: bool) {}
    fn on_phase_complete(&self, _phase: Phase) {}
}
