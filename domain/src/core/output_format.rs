//! How a finished run is printed

use serde::{Deserialize, Serialize};

/// Output format for orchestration results
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Final synthesis with confidence and outcome (default)
    #[default]
    Synthesis,
    /// Every round: responses, arbiter verdicts, refinement areas
    Full,
    /// The complete result as JSON
    Json,
}

impl OutputFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Synthesis => "synthesis",
            OutputFormat::Full => "full",
            OutputFormat::Json => "json",
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
