//! Infrastructure layer for llm-consortium
//!
//! This crate contains adapters that implement the ports defined
//! in the application layer, including configuration file loading.

pub mod config;
pub mod gateway;
pub mod logging;

// Re-export commonly used types
pub use config::{
    ConfigLoader, ConfigValidationError, FileConfig, FileConsortiumConfig, FileGatewayConfig,
    FileLoggingConfig, FileOutputConfig, FileOutputFormat,
};
pub use gateway::CommandAgentGateway;
pub use logging::JsonlInteractionLogger;
