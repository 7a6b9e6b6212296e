//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! They are deserialized directly and use domain types where appropriate.

mod consortium;
mod gateway;
mod logging;
mod output;

pub use consortium::FileConsortiumConfig;
pub use gateway::FileGatewayConfig;
pub use logging::FileLoggingConfig;
pub use output::{FileOutputConfig, FileOutputFormat};

use consortium_domain::DomainError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration validation errors
#[derive(Debug, Error)]
pub enum ConfigValidationError {
    #[error("timeout_seconds cannot be 0")]
    InvalidTimeout,

    #[error(transparent)]
    Domain(#[from] DomainError),
}

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Panel, arbiter and loop settings
    pub consortium: FileConsortiumConfig,
    /// How agents are invoked
    pub gateway: FileGatewayConfig,
    /// Run persistence
    pub logging: FileLoggingConfig,
    /// Output settings
    pub output: FileOutputConfig,
}
