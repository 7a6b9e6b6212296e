//! Agent gateway that shells out to a command-line LLM client
//!
//! One process per invocation: the prompt is written to stdin and stdout is
//! the reply. The default invocation is `llm -m {agent} [-s {system}]`.

use crate::config::FileGatewayConfig;
use async_trait::async_trait;
use consortium_application::ports::agent_gateway::{AgentGateway, GatewayError};
use consortium_domain::AgentId;
use std::path::PathBuf;
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::debug;

const AGENT_PLACEHOLDER: &str = "{agent}";
const SYSTEM_PLACEHOLDER: &str = "{system}";

/// Longest stderr excerpt carried into an error message
const STDERR_EXCERPT_CHARS: usize = 500;

/// Gateway that invokes an external command per agent call
#[derive(Debug, Clone)]
pub struct CommandAgentGateway {
    program: PathBuf,
    args: Vec<String>,
    system_args: Vec<String>,
}

impl CommandAgentGateway {
    /// Resolve `command` on `PATH`; fails if it cannot be found
    pub fn new(
        command: &str,
        args: Vec<String>,
        system_args: Vec<String>,
    ) -> Result<Self, GatewayError> {
        let program = which::which(command).map_err(|e| {
            GatewayError::ConnectionError(format!("command '{}' not found: {}", command, e))
        })?;
        debug!("Agent command resolved to {}", program.display());

        Ok(Self {
            program,
            args,
            system_args,
        })
    }

    pub fn from_config(config: &FileGatewayConfig) -> Result<Self, GatewayError> {
        Self::new(
            &config.command,
            config.args.clone(),
            config.system_args.clone(),
        )
    }

    /// Arguments for one call, placeholders substituted
    fn build_args(&self, agent: &AgentId, system: Option<&str>) -> Vec<String> {
        let substitute = |arg: &String| {
            let arg = arg.replace(AGENT_PLACEHOLDER, agent.as_str());
            match system {
                Some(system) => arg.replace(SYSTEM_PLACEHOLDER, system),
                None => arg,
            }
        };

        let mut args: Vec<String> = self.args.iter().map(substitute).collect();
        if system.is_some() {
            args.extend(self.system_args.iter().map(substitute));
        }
        args
    }
}

#[async_trait]
impl AgentGateway for CommandAgentGateway {
    async fn invoke(
        &self,
        agent: &AgentId,
        prompt: &str,
        system: Option<&str>,
    ) -> Result<String, GatewayError> {
        let mut cmd = Command::new(&self.program);
        cmd.args(self.build_args(agent, system))
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            // Dropping the invocation (e.g. on timeout) kills the child
            .kill_on_drop(true);

        // Linux: the child also dies with this process
        #[cfg(target_os = "linux")]
        unsafe {
            cmd.pre_exec(|| {
                libc::prctl(libc::PR_SET_PDEATHSIG, libc::SIGTERM);
                Ok(())
            });
        }

        let mut child = cmd.spawn().map_err(|e| {
            GatewayError::ConnectionError(format!(
                "failed to spawn {}: {}",
                self.program.display(),
                e
            ))
        })?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| GatewayError::Other("child stdin not captured".to_string()))?;

        let write = async move {
            let result = stdin.write_all(prompt.as_bytes()).await;
            // Closing stdin signals end of prompt
            drop(stdin);
            result
        };
        let (written, output) = tokio::join!(write, child.wait_with_output());

        let output = output.map_err(|e| {
            GatewayError::RequestFailed(format!("failed to wait for {}: {}", agent, e))
        })?;
        if let Err(e) = written {
            // The child may exit without reading its input; its status decides
            debug!("Writing prompt for {} failed: {}", agent, e);
        }

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let excerpt: String = stderr.trim().chars().take(STDERR_EXCERPT_CHARS).collect();
            return Err(GatewayError::RequestFailed(format!(
                "{} exited with {}: {}",
                agent, output.status, excerpt
            )));
        }

        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}
