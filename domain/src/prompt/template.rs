//! Prompt templates for the consortium rounds

use crate::consortium::judging::JudgingMethod;
use crate::consortium::response::ParsedResponse;
use crate::consortium::synthesis::SynthesisResult;
use crate::core::text::clip;

/// Templates for agent and arbiter prompts
pub struct PromptTemplate;

impl PromptTemplate {
    /// Format instructions appended to every agent prompt
    pub fn agent_format() -> &'static str {
        r#"Structure your reply as follows:
<reasoning>
Your reasoning, briefly.
</reasoning>
<answer>
Your complete answer.
</answer>
<confidence>
A number between 0 and 1 stating how confident you are in your answer.
</confidence>"#
    }

    /// System instructions sent with every agent call
    pub fn agent_system(extra: Option<&str>) -> String {
        let base = "You are one member of a panel of independent experts answering the same task. \
Answer on your own merits, be precise, and report your confidence honestly.";
        match extra.map(str::trim).filter(|s| !s.is_empty()) {
            Some(extra) => format!("{}\n\n{}", extra, base),
            None => base.to_string(),
        }
    }

    /// Earlier conversation turns or a reference document, shown ahead of the task
    fn context_block(context: Option<&str>) -> String {
        match context.map(str::trim).filter(|c| !c.is_empty()) {
            Some(context) => format!("Context:\n{}\n\n", context),
            None => String::new(),
        }
    }

    /// First-round agent prompt
    pub fn initial_prompt(original: &str, context: Option<&str>) -> String {
        format!(
            "{}{}\n\n{}",
            Self::context_block(context),
            original.trim(),
            Self::agent_format()
        )
    }

    /// Agent prompt for a follow-up round
    pub fn iteration_prompt(
        original: &str,
        context: Option<&str>,
        previous: &SynthesisResult,
        refinement_areas: &[String],
        history: &str,
        max_chars: usize,
    ) -> String {
        let mut prompt = format!(
            "{}Original task:\n{}\n\nPrevious rounds:\n{}\n\n\
The current best synthesis (confidence {:.2}) is:\n{}\n",
            Self::context_block(context),
            original.trim(),
            if history.is_empty() { "(none)" } else { history },
            previous.confidence,
            clip(previous.synthesis.trim(), max_chars)
        );

        if !refinement_areas.is_empty() {
            prompt.push_str("\nFocus on improving these areas:\n");
            for area in refinement_areas {
                prompt.push_str(&format!("- {}\n", area));
            }
        }

        prompt.push_str(
            "\nProvide an improved, complete answer to the original task. \
You may agree with the synthesis, correct it, or replace it.\n\n",
        );
        prompt.push_str(Self::agent_format());
        prompt
    }

    /// System instructions for the arbiter
    pub fn arbiter_system(method: JudgingMethod) -> &'static str {
        match method {
            JudgingMethod::Synthesis => {
                "You are the arbiter of a panel of experts. Combine their answers into one \
answer that keeps what is correct, resolves disagreements, and drops what is wrong."
            }
            JudgingMethod::PickOne => {
                "You are the arbiter of a panel of experts. Choose the single best answer \
among those submitted. Do not write a new answer."
            }
            JudgingMethod::Rank => {
                "You are the arbiter of a panel of experts. Rank the submitted answers from \
best to worst. Do not write a new answer."
            }
        }
    }

    /// Arbiter prompt for one round
    ///
    /// Responses are numbered from 1 in the given order; pick-one and rank
    /// verdicts refer to these numbers.
    pub fn arbiter_prompt(
        method: JudgingMethod,
        original: &str,
        history: &str,
        responses: &[ParsedResponse],
        iteration: usize,
        max_iterations: usize,
        max_chars: usize,
    ) -> String {
        let mut prompt = format!(
            "Original task:\n{}\n\nRound {} of at most {}.\n",
            original.trim(),
            iteration,
            max_iterations
        );

        if !history.is_empty() {
            prompt.push_str(&format!("\nPrevious rounds:\n{}\n", history));
        }

        prompt.push_str("\nResponses:\n");
        if responses.is_empty() {
            prompt.push_str("(no usable responses this round)\n");
        }
        for (index, response) in responses.iter().enumerate() {
            prompt.push_str(&format!(
                "\n<response id=\"{}\" agent=\"{}\" confidence=\"{:.2}\">\n{}\n</response>\n",
                index + 1,
                response.label(),
                response.confidence,
                clip(response.answer.trim(), max_chars)
            ));
        }

        prompt.push('\n');
        prompt.push_str(Self::arbiter_format(method));

        if iteration >= max_iterations {
            prompt.push_str(
                "\n\nThis is the final round: no further iteration is possible, \
so set needs_iteration to false.",
            );
        }
        prompt
    }

    fn arbiter_format(method: JudgingMethod) -> &'static str {
        match method {
            JudgingMethod::Synthesis => {
                r#"Reply in exactly this format:
<synthesis_output>
<synthesis>The combined answer.</synthesis>
<confidence>A number between 0 and 1.</confidence>
<analysis>How the responses compare and why you combined them this way.</analysis>
<dissent>Notable disagreements, if any.</dissent>
<needs_iteration>true or false</needs_iteration>
<refinement_areas>
One area to improve per line, if another round is needed.
</refinement_areas>
</synthesis_output>"#
            }
            JudgingMethod::PickOne => {
                r#"Reply in exactly this format:
<winner><response_id>The id of the best response.</response_id></winner>
<confidence>A number between 0 and 1.</confidence>
<analysis>Why this response is the best.</analysis>
<needs_iteration>true or false</needs_iteration>
<refinement_areas>
One area to improve per line, if another round is needed.
</refinement_areas>"#
            }
            JudgingMethod::Rank => {
                r#"Reply in exactly this format:
<ranking>
<rank position="1">id of the best response</rank>
<rank position="2">id of the next best response</rank>
</ranking>
<confidence>A number between 0 and 1.</confidence>
<analysis>Why the responses are ranked this way.</analysis>
<needs_iteration>true or false</needs_iteration>
<refinement_areas>
One area to improve per line, if another round is needed.
</refinement_areas>"#
            }
        }
    }
}
