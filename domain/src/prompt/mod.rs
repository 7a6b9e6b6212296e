//! Prompt domain
//!
//! Templates for the agent and arbiter prompts of each round.

mod template;

pub use template::PromptTemplate;
