//! Domain layer for llm-consortium
//!
//! This crate contains the core logic, entities, and value objects of an
//! iterative consensus run. It has no dependencies on infrastructure or
//! presentation concerns and performs no I/O.
//!
//! # Core Concepts
//!
//! ## Consortium
//!
//! A panel of agents answers the same task concurrently, an arbiter combines
//! their answers into one synthesis, and rounds repeat until the synthesis is
//! confident enough or the iteration budget runs out.
//!
//! - **ResponseParser**: extracts confidence and named sections from free text
//! - **SelectionStrategy**: decides which agents run and which answers count
//! - **IterationHistory**: the record of completed rounds fed into later prompts

pub mod consortium;
pub mod core;
pub mod prompt;
pub mod strategy;

// Re-export commonly used types
pub use consortium::{
    ConsortiumConfig, EmptyRoundPolicy, FailureKind, InvocationFailure, IterationHistory,
    IterationRecord, JudgingMethod, OrchestrationMetadata, OrchestrationOutcome,
    OrchestrationResult, ParseError, ParsedResponse, RawResponse, ResponseParser, RoundMetrics,
    Sections, SynthesisResult, SynthesisSource, normalize_threshold,
};
pub use core::{
    agent::{AgentId, AgentPanel, PanelEntry},
    current_timestamp,
    error::DomainError,
    output_format::OutputFormat,
};
pub use prompt::PromptTemplate;
pub use strategy::{
    DefaultStrategy, EliminationStrategy, RotationStrategy, SelectionStrategy,
    StrategyConstructor, StrategyParams, StrategyRegistry, TopKStrategy,
};
