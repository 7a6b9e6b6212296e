//! Configuration file loading for llm-consortium
//!
//! This module handles file I/O and merging of configuration from multiple sources.
//! The priority order (highest to lowest):
//!
//! 1. `LLM_CONSORTIUM_*` environment variables
//! 2. `--config <path>` specified file
//! 3. Project root: `./consortium.toml` or `./.consortium.toml`
//! 4. XDG config: `$XDG_CONFIG_HOME/llm-consortium/config.toml`
//! 5. Default values

mod file_config;
mod loader;

pub use file_config::{
    ConfigValidationError, FileConfig, FileConsortiumConfig, FileGatewayConfig,
    FileLoggingConfig, FileOutputConfig, FileOutputFormat,
};
pub use loader::ConfigLoader;
