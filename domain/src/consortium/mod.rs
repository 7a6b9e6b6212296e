//! Consortium domain
//!
//! Value objects and pure logic for one iterative consensus run:
//! responses, the textual contract parser, syntheses, round history, and
//! the run configuration.

pub mod config;
pub mod history;
pub mod judging;
pub mod parsing;
pub mod policy;
pub mod response;
pub mod result;
pub mod synthesis;

pub use config::{ConsortiumConfig, normalize_threshold};
pub use history::{IterationHistory, IterationRecord, RoundMetrics};
pub use judging::JudgingMethod;
pub use parsing::{ParseError, ResponseParser, Sections};
pub use policy::EmptyRoundPolicy;
pub use response::{FailureKind, InvocationFailure, ParsedResponse, RawResponse};
pub use result::{OrchestrationMetadata, OrchestrationOutcome, OrchestrationResult};
pub use synthesis::{SynthesisResult, SynthesisSource};
