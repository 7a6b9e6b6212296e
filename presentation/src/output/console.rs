//! Console output formatter for consortium results

use crate::output::formatter::OutputFormatter;
use colored::Colorize;
use consortium_domain::{
    IterationRecord, OrchestrationOutcome, OrchestrationResult, ParsedResponse, SynthesisSource,
};

/// Formats orchestration results for console display
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    /// Format every round of the result
    pub fn format(result: &OrchestrationResult) -> String {
        let mut output = String::new();
        let metadata = &result.metadata;

        output.push_str(&Self::header("LLM Consortium Results"));
        output.push('\n');

        output.push_str(&format!(
            "{} {}\n\n",
            "Prompt:".cyan().bold(),
            result.original_prompt
        ));
        output.push_str(&format!(
            "{} {}\n",
            "Agents:".cyan().bold(),
            metadata.agents_used.join(", ")
        ));
        output.push_str(&format!(
            "{} {} ({})\n",
            "Arbiter:".cyan().bold(),
            metadata.arbiter,
            metadata.judging_method
        ));
        output.push_str(&format!(
            "{} {}\n",
            "Strategy:".cyan().bold(),
            metadata.strategy
        ));
        output.push_str(&format!(
            "{} {}\n",
            "Run:".cyan().bold(),
            metadata.consortium_id
        ));

        for record in result.history.records() {
            output.push_str(&Self::round(record));
        }

        output.push_str(&Self::section_header("Final Synthesis"));
        output.push_str(&format!("{}\n", Self::status_line(result)));
        output.push_str(&format!("\n{}\n", result.synthesis.synthesis));

        if !result.synthesis.dissent.is_empty() {
            output.push_str(&format!("\n{}\n", "Dissent:".yellow().bold()));
            output.push_str(&Self::indent(&result.synthesis.dissent, "  "));
            output.push('\n');
        }

        output.push_str(&Self::footer());
        output
    }

    /// Format as JSON
    pub fn format_json(result: &OrchestrationResult) -> String {
        serde_json::to_string_pretty(result).unwrap_or_else(|_| "{}".to_string())
    }

    /// Format synthesis only (concise output)
    pub fn format_synthesis_only(result: &OrchestrationResult) -> String {
        let mut output = String::new();

        output.push_str(&format!(
            "{}\n\n",
            "=== Consortium Synthesis ===".cyan().bold()
        ));
        output.push_str(&format!("{}\n", Self::status_line(result)));
        output.push_str(&format!(
            "{} {}\n\n",
            "Agents consulted:".dimmed(),
            result.metadata.agents_used.join(", ")
        ));

        output.push_str(&result.synthesis.synthesis);
        output.push('\n');

        output
    }

    fn status_line(result: &OrchestrationResult) -> String {
        let rounds = result.metadata.iteration_count;
        let outcome = match result.metadata.outcome {
            OrchestrationOutcome::Converged => "converged".green(),
            OrchestrationOutcome::MaxIterationsReached => "max iterations reached".yellow(),
            OrchestrationOutcome::NoUsableResponses => "no usable responses".red(),
        };
        format!(
            "{} {:.2} | {} after {} round{}",
            "Confidence:".bold(),
            result.synthesis.confidence,
            outcome,
            rounds,
            if rounds == 1 { "" } else { "s" }
        )
    }

    fn round(record: &IterationRecord) -> String {
        let metrics = record.metrics();
        let mut output = Self::section_header(&format!(
            "Round {} ({} ok, {} failed)",
            record.iteration, metrics.successful, metrics.failed
        ));

        for response in &record.responses {
            output.push_str(&Self::response(response));
        }

        let source = match &record.source {
            SynthesisSource::Arbiter { arbiter } => format!("Arbiter {}", arbiter),
            SynthesisSource::FastPath { agent, instance } => {
                format!("Adopted from {}#{}", agent, instance)
            }
            SynthesisSource::NoUsableResponses => "No usable responses".to_string(),
        };
        output.push_str(&format!(
            "\n{}\n{}\n",
            format!(
                "» {} (confidence {:.2})",
                source, record.synthesis.confidence
            )
            .green()
            .bold(),
            record.synthesis.synthesis
        ));

        if !record.synthesis.analysis.is_empty() {
            output.push_str(&format!(
                "{}\n",
                Self::indent(&record.synthesis.analysis, "  ").dimmed()
            ));
        }

        if !record.refinement_areas.is_empty() {
            output.push_str(&format!("{}\n", "Refinement areas:".yellow()));
            for area in &record.refinement_areas {
                output.push_str(&format!("  * {}\n", area));
            }
        }
        output
    }

    fn response(response: &ParsedResponse) -> String {
        match &response.raw.error {
            None => format!(
                "\n{}\n{}\n",
                format!(
                    "── {} (confidence {:.2}, {} ms) ──",
                    response.label(),
                    response.confidence,
                    response.raw.latency_ms
                )
                .yellow()
                .bold(),
                response.answer
            ),
            Some(error) => format!(
                "\n{}\nError: {}\n",
                format!("── {} ──", response.label()).red().bold(),
                error
            ),
        }
    }

    fn header(title: &str) -> String {
        let line = "=".repeat(60);
        format!("{}\n{:^60}\n{}", line.cyan(), title.bold(), line.cyan())
    }

    fn section_header(title: &str) -> String {
        format!("\n{}\n{}\n", title.cyan().bold(), "-".repeat(40))
    }

    fn footer() -> String {
        format!("\n{}\n", "=".repeat(60).cyan())
    }

    /// Indent a multi-line string
    pub fn indent(text: &str, prefix: &str) -> String {
        text.lines()
            .map(|line| format!("{}{}", prefix, line))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl OutputFormatter for ConsoleFormatter {
    fn format(&self, result: &OrchestrationResult) -> String {
        Self::format(result)
    }

    fn format_json(&self, result: &OrchestrationResult) -> String {
        Self::format_json(result)
    }

    fn format_synthesis_only(&self, result: &OrchestrationResult) -> String {
        Self::format_synthesis_only(result)
    }
}
