//! Output formatter trait

use consortium_domain::{OrchestrationResult, OutputFormat};

/// Trait for formatting orchestration results
pub trait OutputFormatter {
    /// Format every round of the result
    fn format(&self, result: &OrchestrationResult) -> String;

    /// Format as JSON
    fn format_json(&self, result: &OrchestrationResult) -> String;

    /// Format synthesis only (concise output)
    fn format_synthesis_only(&self, result: &OrchestrationResult) -> String;

    /// Format in the requested style
    fn render(&self, result: &OrchestrationResult, format: OutputFormat) -> String {
        match format {
            OutputFormat::Synthesis => self.format_synthesis_only(result),
            OutputFormat::Full => self.format(result),
            OutputFormat::Json => self.format_json(result),
        }
    }
}
