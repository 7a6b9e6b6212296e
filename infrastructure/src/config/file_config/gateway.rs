//! Agent gateway configuration from TOML (`[gateway]` section)
//!
//! ```toml
//! [gateway]
//! command = "llm"
//! args = ["-m", "{agent}"]
//! system_args = ["-s", "{system}"]
//! ```

use serde::{Deserialize, Serialize};

/// Raw gateway configuration from TOML
///
/// `{agent}` and `{system}` placeholders are substituted per call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileGatewayConfig {
    /// Executable invoked once per agent call
    pub command: String,
    /// Arguments for every call
    pub args: Vec<String>,
    /// Extra arguments appended when system instructions are present
    pub system_args: Vec<String>,
}

impl Default for FileGatewayConfig {
    fn default() -> Self {
        Self {
            command: "llm".to_string(),
            args: vec!["-m".to_string(), "{agent}".to_string()],
            system_args: vec!["-s".to_string(), "{system}".to_string()],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gateway_config_partial_override() {
        let toml_str = r#"
[gateway]
command = "ollama-wrapper"
"#;
        let config: super::super::FileConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.gateway.command, "ollama-wrapper");
        assert_eq!(config.gateway.args, vec!["-m", "{agent}"]);
    }
}
