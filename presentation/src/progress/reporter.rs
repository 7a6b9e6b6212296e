//! Progress reporting for consortium runs
//!
//! Everything here writes to stderr so stdout carries only the result.

use colored::Colorize;
use consortium_application::ports::progress::{Phase, ProgressNotifier};
use consortium_domain::{AgentId, IterationRecord, SynthesisSource};
use indicatif::{MultiProgress, ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::sync::Mutex;

/// Reports progress with one bar per phase
pub struct ProgressReporter {
    multi: MultiProgress,
    phase_bar: Mutex<Option<ProgressBar>>,
}

impl ProgressReporter {
    pub fn new() -> Self {
        Self {
            multi: MultiProgress::with_draw_target(ProgressDrawTarget::stderr()),
            phase_bar: Mutex::new(None),
        }
    }

    fn phase_style() -> ProgressStyle {
        ProgressStyle::default_bar()
            .template("{spinner:.green} {prefix:.bold.cyan} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=>-")
    }

    fn phase_display_name(phase: Phase) -> &'static str {
        match phase {
            Phase::Agents => "Agents",
            Phase::Arbitration => "Arbiter",
        }
    }

    /// One-line summary of a finished round
    fn round_summary(record: &IterationRecord) -> String {
        let metrics = record.metrics();
        let source = match &record.source {
            SynthesisSource::Arbiter { arbiter } => format!("arbiter {}", arbiter),
            SynthesisSource::FastPath { agent, instance } => {
                format!("fast path {}#{}", agent, instance)
            }
            SynthesisSource::NoUsableResponses => "no usable responses".to_string(),
        };
        format!(
            "Round {}: {}/{} ok, confidence {:.2} via {}",
            record.iteration,
            metrics.successful,
            metrics.successful + metrics.failed,
            record.synthesis.confidence,
            source
        )
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressNotifier for ProgressReporter {
    fn on_round_start(&self, iteration: usize, max_iterations: usize) {
        let _ = self.multi.println(format!(
            "{} {}",
            "->".cyan(),
            format!("Round {}/{}", iteration, max_iterations).bold()
        ));
    }

    fn on_phase_start(&self, phase: Phase, total_tasks: usize) {
        let pb = self.multi.add(ProgressBar::new(total_tasks as u64));
        pb.set_style(Self::phase_style());
        pb.set_prefix(Self::phase_display_name(phase));
        pb.set_message("Starting...");

        if let Ok(mut bar) = self.phase_bar.lock() {
            *bar = Some(pb);
        }
    }

    fn on_task_complete(&self, _phase: Phase, agent: &AgentId, success: bool) {
        if let Ok(bar) = self.phase_bar.lock()
            && let Some(pb) = bar.as_ref()
        {
            let status = if success {
                format!("{} {}", "v".green(), agent)
            } else {
                format!("{} {}", "x".red(), agent)
            };
            pb.set_message(status);
            pb.inc(1);
        }
    }

    fn on_phase_complete(&self, phase: Phase) {
        if let Ok(mut bar) = self.phase_bar.lock()
            && let Some(pb) = bar.take()
        {
            pb.finish_with_message(format!(
                "{} complete!",
                Self::phase_display_name(phase).green()
            ));
        }
    }

    fn on_round_complete(&self, record: &IterationRecord) {
        let _ = self
            .multi
            .println(format!("   {}", Self::round_summary(record).dimmed()));
    }
}

/// Simple text-based progress (no fancy UI), for non-terminal stderr
pub struct SimpleProgress;

impl ProgressNotifier for SimpleProgress {
    fn on_round_start(&self, iteration: usize, max_iterations: usize) {
        eprintln!("{} Round {}/{}", "->".cyan(), iteration, max_iterations);
    }

    fn on_phase_start(&self, phase: Phase, total_tasks: usize) {
        eprintln!(
            "  {} ({} tasks)",
            ProgressReporter::phase_display_name(phase).bold(),
            total_tasks
        );
    }

    fn on_task_complete(&self, _phase: Phase, agent: &AgentId, success: bool) {
        if success {
            eprintln!("    {} {}", "v".green(), agent);
        } else {
            eprintln!("    {} {} (failed)", "x".red(), agent);
        }
    }

    fn on_phase_complete(&self, _phase: Phase) {}

    fn on_round_complete(&self, record: &IterationRecord) {
        eprintln!("  {}", ProgressReporter::round_summary(record));
    }
}
