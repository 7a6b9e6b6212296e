//! Concurrent fan-out of one round's agent instances

use crate::ports::agent_gateway::AgentGateway;
use crate::ports::progress::{Phase, ProgressNotifier};
use consortium_domain::{AgentId, AgentPanel, InvocationFailure, RawResponse};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;
use tokio::time::Instant;
use tracing::{debug, warn};

/// Invokes every instance of a panel concurrently
///
/// Every instance runs as its own task. [`invoke_all`](Self::invoke_all)
/// returns only once all of them have settled, and returns one
/// [`RawResponse`] per instance in submission order. Failures (including
/// timeouts and panicked tasks) are returned as data, never as errors.
pub struct AgentPool<G: AgentGateway + 'static> {
    gateway: Arc<G>,
    timeout: Option<Duration>,
}

impl<G: AgentGateway + 'static> AgentPool<G> {
    pub fn new(gateway: Arc<G>) -> Self {
        Self {
            gateway,
            timeout: None,
        }
    }

    /// Per-instance time budget; a slow instance does not delay its siblings' results
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub async fn invoke_all(
        &self,
        panel: &AgentPanel,
        prompt: &str,
        system: Option<&str>,
        progress: &dyn ProgressNotifier,
    ) -> Vec<RawResponse> {
        let slots = panel.slots();
        debug!("Invoking {} agent instances", slots.len());
        progress.on_phase_start(Phase::Agents, slots.len());

        let prompt: Arc<str> = Arc::from(prompt);
        let system: Option<Arc<str>> = system.map(Arc::from);
        let mut join_set = JoinSet::new();

        for (index, (agent, instance)) in slots.iter().cloned().enumerate() {
            let gateway = Arc::clone(&self.gateway);
            let prompt = Arc::clone(&prompt);
            let system = system.clone();
            let timeout = self.timeout;

            join_set.spawn(async move {
                let started = Instant::now();
                let result =
                    invoke_with_timeout(&*gateway, &agent, &prompt, system.as_deref(), timeout)
                        .await;
                let latency_ms = started.elapsed().as_millis() as u64;

                let response = match result {
                    Ok(text) => RawResponse::success(agent, instance, text),
                    Err(failure) => RawResponse::failure(agent, instance, failure),
                };
                (index, response.with_latency(latency_ms))
            });
        }

        let mut settled: Vec<Option<RawResponse>> = vec![None; slots.len()];

        while let Some(joined) = join_set.join_next().await {
            match joined {
                Ok((index, response)) => {
                    match &response.error {
                        None => debug!("{} responded in {} ms", response.label(), response.latency_ms),
                        Some(error) => warn!("{} failed: {}", response.label(), error),
                    }
                    progress.on_task_complete(Phase::Agents, &response.agent, response.is_success());
                    settled[index] = Some(response);
                }
                Err(e) => {
                    warn!("Agent task join error: {}", e);
                }
            }
        }

        progress.on_phase_complete(Phase::Agents);

        // A task that panicked or was cancelled never reported its slot
        settled
            .into_iter()
            .zip(slots)
            .map(|(response, (agent, instance))| {
                response.unwrap_or_else(|| {
                    RawResponse::failure(
                        agent,
                        instance,
                        InvocationFailure::aborted("task ended without a result"),
                    )
                })
            })
            .collect()
    }
}

/// One gateway call under an optional time budget
pub(crate) async fn invoke_with_timeout<G: AgentGateway + ?Sized>(
    gateway: &G,
    agent: &AgentId,
    prompt: &str,
    system: Option<&str>,
    timeout: Option<Duration>,
) -> Result<String, InvocationFailure> {
    let call = gateway.invoke(agent, prompt, system);
    let result = match timeout {
        Some(limit) => match tokio::time::timeout(limit, call).await {
            Ok(result) => result,
            Err(_) => return Err(InvocationFailure::timeout(limit.as_millis() as u64)),
        },
        None => call.await,
    };
    result.map_err(InvocationFailure::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::agent_gateway::GatewayError;
    use crate::ports::progress::NoProgress;
    use async_trait::async_trait;
    use consortium_domain::FailureKind;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// Replies per agent: optional delay, then text or error
    struct DelayedGateway {
        replies: HashMap<String, (u64, Result<String, GatewayError>)>,
        calls: Mutex<Vec<(String, Option<String>)>>,
    }

    impl DelayedGateway {
        fn new() -> Self {
            Self {
                replies: HashMap::new(),
                calls: Mutex::new(Vec::new()),
            }
        }

        fn reply(mut self, agent: &str, delay_ms: u64, text: &str) -> Self {
            self.replies
                .insert(agent.to_string(), (delay_ms, Ok(text.to_string())));
            self
        }

        fn fail(mut self, agent: &str, error: GatewayError) -> Self {
            self.replies.insert(agent.to_string(), (0, Err(error)));
            self
        }
    }

    #[async_trait]
    impl AgentGateway for DelayedGateway {
        async fn invoke(
            &self,
            agent: &AgentId,
            _prompt: &str,
            system: Option<&str>,
        ) -> Result<String, GatewayError> {
            self.calls
                .lock()
                .unwrap()
                .push((agent.to_string(), system.map(str::to_string)));
            let (delay, reply) = self
                .replies
                .get(agent.as_str())
                .cloned()
                .unwrap_or((0, Err(GatewayError::AgentNotAvailable(agent.to_string()))));
            if delay > 0 {
                tokio::time::sleep(Duration::from_millis(delay)).await;
            }
            reply
        }
    }

    struct PanickingGateway;

    #[async_trait]
    impl AgentGateway for PanickingGateway {
        async fn invoke(&self, agent: &AgentId, _: &str, _: Option<&str>) -> Result<String, GatewayError> {
            if agent.as_str() == "boom" {
                panic!("agent crashed");
            }
            Ok("fine".to_string())
        }
    }

    #[derive(Default)]
    struct RecordingProgress {
        events: Mutex<Vec<String>>,
    }

    impl ProgressNotifier for RecordingProgress {
        fn on_phase_start(&self, phase: Phase, total_tasks: usize) {
            self.events
                .lock()
                .unwrap()
                .push(format!("start {} {}", phase, total_tasks));
        }
        fn on_task_complete(&self, _phase: Phase, agent: &AgentId, success: bool) {
            self.events
                .lock()
                .unwrap()
                .push(format!("done {} {}", agent, success));
        }
        fn on_phase_complete(&self, phase: Phase) {
            self.events.lock().unwrap().push(format!("end {}", phase));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_results_follow_submission_order() {
        let gateway = DelayedGateway::new()
            .reply("slow", 300, "slow answer")
            .reply("fast", 10, "fast answer");
        let pool = AgentPool::new(Arc::new(gateway));
        let panel = AgentPanel::new().with("slow", 2).with("fast", 1);

        let responses = pool.invoke_all(&panel, "q", None, &NoProgress).await;

        let labels: Vec<String> = responses.iter().map(|r| r.label()).collect();
        assert_eq!(labels, vec!["slow#0", "slow#1", "fast#0"]);
        assert!(responses.iter().all(|r| r.is_success()));
        assert!(responses[0].latency_ms >= 300);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_is_isolated() {
        let gateway = DelayedGateway::new()
            .reply("stuck", 10_000, "never")
            .reply("ok", 5, "answer");
        let pool = AgentPool::new(Arc::new(gateway)).with_timeout(Some(Duration::from_millis(100)));
        let panel = AgentPanel::new().with("stuck", 1).with("ok", 1);

        let responses = pool.invoke_all(&panel, "q", None, &NoProgress).await;

        assert_eq!(responses.len(), 2);
        let error = responses[0].error.as_ref().unwrap();
        assert_eq!(error.kind, FailureKind::Timeout);
        assert_eq!(error.message, "timed out after 100 ms");
        assert_eq!(responses[1].text, "answer");
    }

    #[tokio::test]
    async fn test_transport_failure_becomes_data() {
        let gateway = DelayedGateway::new()
            .fail("down", GatewayError::ConnectionError("refused".to_string()))
            .reply("up", 0, "hi");
        let pool = AgentPool::new(Arc::new(gateway));
        let panel = AgentPanel::new().with("down", 1).with("up", 1);

        let responses = pool.invoke_all(&panel, "q", None, &NoProgress).await;

        assert!(!responses[0].is_success());
        assert_eq!(
            responses[0].error.as_ref().unwrap().kind,
            FailureKind::Transport
        );
        assert!(responses[1].is_success());
    }

    #[tokio::test]
    async fn test_panicked_task_keeps_its_slot() {
        let pool = AgentPool::new(Arc::new(PanickingGateway));
        let panel = AgentPanel::new().with("boom", 1).with("calm", 1);

        let responses = pool.invoke_all(&panel, "q", None, &NoProgress).await;

        assert_eq!(responses.len(), 2);
        assert_eq!(responses[0].agent.as_str(), "boom");
        assert_eq!(
            responses[0].error.as_ref().unwrap().kind,
            FailureKind::Aborted
        );
        assert_eq!(responses[1].text, "fine");
    }

    #[tokio::test]
    async fn test_system_prompt_and_progress() {
        let gateway = Arc::new(DelayedGateway::new().reply("a", 0, "x"));
        let pool = AgentPool::new(Arc::clone(&gateway));
        let progress = RecordingProgress::default();

        pool.invoke_all(&AgentPanel::new().with("a", 2), "q", Some("be brief"), &progress)
            .await;

        let calls = gateway.calls.lock().unwrap();
        assert_eq!(calls.len(), 2);
        assert!(calls.iter().all(|(_, s)| s.as_deref() == Some("be brief")));

        let events = progress.events.lock().unwrap();
        assert_eq!(events.first().unwrap(), "start Agents 2");
        assert_eq!(events.iter().filter(|e| e.starts_with("done a true")).count(), 2);
        assert_eq!(events.last().unwrap(), "end Agents");
    }

    #[tokio::test]
    async fn test_empty_panel() {
        let pool = AgentPool::new(Arc::new(DelayedGateway::new()));
        let responses = pool
            .invoke_all(&AgentPanel::new(), "q", None, &NoProgress)
            .await;
        assert!(responses.is_empty());
    }
}
