//! Run Consortium use case
//!
//! Drives the iterative consensus loop:
//!
//! ```text
//! START ─▶ AGENT_PHASE ─▶ ARBITRATION_PHASE ─▶ DECIDE ─┬─▶ STOP
//!              ▲           (or fast path /             │
//!              │            short circuit)             │
//!              └────────── next prompt ◀───────────────┘
//! ```
//!
//! Per-round failures (agents, arbiter, unparseable output) are absorbed
//! and recorded as data. Only configuration problems are returned as errors,
//! and only before the first round starts.

use crate::ports::agent_gateway::AgentGateway;
use crate::ports::interaction_log::{InteractionLogger, InteractionRecord, NoInteractionLog};
use crate::ports::progress::{NoProgress, Phase, ProgressNotifier};
use crate::use_cases::agent_pool::{AgentPool, invoke_with_timeout};
use consortium_domain::{
    ConsortiumConfig, DomainError, EmptyRoundPolicy, IterationHistory, IterationRecord,
    OrchestrationMetadata, OrchestrationOutcome, OrchestrationResult, ParsedResponse,
    PromptTemplate, ResponseParser, StrategyRegistry, SynthesisResult, SynthesisSource,
    current_timestamp,
};
use std::sync::Arc;
use thiserror::Error;
use tokio::time::Instant;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Errors that can occur when setting up or running a consortium
///
/// Everything else that can go wrong during a run is reported inside the
/// [`OrchestrationResult`].
#[derive(Error, Debug)]
pub enum RunConsortiumError {
    #[error("Configuration error: {0}")]
    Configuration(#[from] DomainError),
}

/// Use case for running an iterative consortium
pub struct RunConsortiumUseCase<G: AgentGateway + 'static> {
    gateway: Arc<G>,
    config: ConsortiumConfig,
    registry: StrategyRegistry,
    logger: Arc<dyn InteractionLogger>,
}

impl<G: AgentGateway + 'static> RunConsortiumUseCase<G> {
    /// Validate `config` against the built-in strategies
    pub fn new(gateway: Arc<G>, config: ConsortiumConfig) -> Result<Self, RunConsortiumError> {
        Self::with_registry(gateway, config, StrategyRegistry::builtin())
    }

    /// Validate `config` against a custom strategy registry
    pub fn with_registry(
        gateway: Arc<G>,
        config: ConsortiumConfig,
        registry: StrategyRegistry,
    ) -> Result<Self, RunConsortiumError> {
        config.validate()?;
        registry.validate(&config.strategy, &config.strategy_params)?;

        Ok(Self {
            gateway,
            config,
            registry,
            logger: Arc::new(NoInteractionLog),
        })
    }

    /// Persist one record per run
    pub fn with_logger(mut self, logger: Arc<dyn InteractionLogger>) -> Self {
        self.logger = logger;
        self
    }

    pub fn config(&self) -> &ConsortiumConfig {
        &self.config
    }

    /// Run with default (no-op) progress
    pub async fn orchestrate(&self, prompt: &str) -> Result<OrchestrationResult, RunConsortiumError> {
        self.orchestrate_with_progress(prompt, &NoProgress).await
    }

    /// Run with progress callbacks
    pub async fn orchestrate_with_progress(
        &self,
        prompt: &str,
        progress: &dyn ProgressNotifier,
    ) -> Result<OrchestrationResult, RunConsortiumError> {
        self.orchestrate_with_context(prompt, None, progress).await
    }

    /// Run with earlier conversation turns (or a reference document) shown
    /// to the agents ahead of the task in every round
    pub async fn orchestrate_with_context(
        &self,
        prompt: &str,
        context: Option<&str>,
        progress: &dyn ProgressNotifier,
    ) -> Result<OrchestrationResult, RunConsortiumError> {
        let config = &self.config;
        let started = Instant::now();
        let consortium_id = Uuid::new_v4().to_string();

        // Strategy state is private to this run
        let mut strategy = self
            .registry
            .create(&config.strategy, &config.strategy_params)?;
        strategy.initialize_state();

        info!(
            "Starting consortium {} with {} agent instances, arbiter {}, strategy {}",
            consortium_id,
            config.agents.total_instances(),
            config.arbiter,
            strategy.name()
        );

        let pool = AgentPool::new(Arc::clone(&self.gateway)).with_timeout(config.agent_timeout);
        let system = PromptTemplate::agent_system(config.system_prompt.as_deref());
        let mut history = IterationHistory::new();
        let mut current_prompt = PromptTemplate::initial_prompt(prompt, context);
        let mut iteration = 0;

        loop {
            iteration += 1;
            info!("Round {}/{}", iteration, config.max_iterations);
            progress.on_round_start(iteration, config.max_iterations);

            // AGENT_PHASE
            let selection = strategy.select_models(&config.agents, &current_prompt, iteration);
            let panel = config.agents.restrict(&selection);
            let responses: Vec<ParsedResponse> = if panel.is_empty() {
                debug!("Strategy selected no agents for round {}", iteration);
                Vec::new()
            } else {
                pool.invoke_all(&panel, &current_prompt, Some(&system), progress)
                    .await
                    .into_iter()
                    .map(ResponseParser::parse_agent_response)
                    .collect()
            };

            let successful: Vec<ParsedResponse> =
                responses.iter().filter(|r| r.is_success()).cloned().collect();
            info!(
                "Round {}: {}/{} responses succeeded",
                iteration,
                successful.len(),
                responses.len()
            );
            let candidates = strategy.process_responses(successful, iteration);

            // ARBITRATION_PHASE
            let (mut synthesis, source) = if candidates.is_empty()
                && config.empty_round_policy == EmptyRoundPolicy::ShortCircuit
            {
                warn!("Round {}: no usable responses, stopping", iteration);
                (
                    SynthesisResult::no_usable_responses(),
                    SynthesisSource::NoUsableResponses,
                )
            } else if let Some(adopted) = self.fast_path(&candidates) {
                info!(
                    "Round {}: {} met the threshold with confidence {:.2}, skipping arbiter",
                    iteration,
                    adopted.label(),
                    adopted.confidence
                );
                self.adopt(adopted)
            } else {
                self.arbitrate(prompt, &history, &candidates, iteration, progress)
                    .await
            };

            // DECIDE
            let outcome = if source == SynthesisSource::NoUsableResponses {
                Some(OrchestrationOutcome::NoUsableResponses)
            } else if config.accepts(synthesis.confidence, iteration) {
                Some(OrchestrationOutcome::Converged)
            } else if iteration >= config.max_iterations {
                synthesis.needs_iteration = false;
                Some(OrchestrationOutcome::MaxIterationsReached)
            } else {
                None
            };
            info!(
                "Round {}: confidence {:.2} (threshold {:.2}) -> {}",
                iteration,
                synthesis.confidence,
                config.confidence_threshold,
                outcome.map(|o| o.as_str()).unwrap_or("continue")
            );

            let record = IterationRecord::new(
                iteration,
                current_timestamp(),
                responses,
                synthesis,
                source,
            );
            strategy.update_state(&record);
            progress.on_round_complete(&record);

            if let Some(outcome) = outcome {
                let synthesis = record.synthesis.clone();
                let responses = record.responses.clone();
                history.append(record);

                let result = OrchestrationResult {
                    original_prompt: prompt.to_string(),
                    synthesis,
                    responses,
                    metadata: OrchestrationMetadata {
                        consortium_id,
                        agents_used: config.agents.labels(),
                        arbiter: config.arbiter.clone(),
                        iteration_count: iteration,
                        timestamp: current_timestamp(),
                        outcome,
                        strategy: strategy.name().to_string(),
                        judging_method: config.judging_method,
                        total_latency_ms: started.elapsed().as_millis() as u64,
                    },
                    history,
                };
                self.persist(&result);
                return Ok(result);
            }

            let previous = record.synthesis.clone();
            let refinement_areas = record.refinement_areas.clone();
            history.append(record);
            current_prompt = PromptTemplate::iteration_prompt(
                prompt,
                context,
                &previous,
                &refinement_areas,
                &history.render(config.history_window, config.history_max_chars),
                config.history_max_chars,
            );
        }
    }

    /// Highest-confidence candidate at or above the threshold; earliest wins ties
    fn fast_path<'a>(&self, candidates: &'a [ParsedResponse]) -> Option<&'a ParsedResponse> {
        if !self.config.fast_path {
            return None;
        }
        candidates
            .iter()
            .filter(|r| r.confidence >= self.config.confidence_threshold)
            .fold(None, |best: Option<&'a ParsedResponse>, r| match best {
                Some(b) if b.confidence >= r.confidence => Some(b),
                _ => Some(r),
            })
    }

    fn adopt(&self, response: &ParsedResponse) -> (SynthesisResult, SynthesisSource) {
        let synthesis = SynthesisResult::new(response.answer.clone(), response.confidence)
            .with_analysis(format!(
                "Adopted {} directly: confidence {:.2} met the threshold {:.2}",
                response.label(),
                response.confidence,
                self.config.confidence_threshold
            ));
        let source = SynthesisSource::FastPath {
            agent: response.agent().clone(),
            instance: response.instance(),
        };
        (synthesis, source)
    }

    async fn arbitrate(
        &self,
        original: &str,
        history: &IterationHistory,
        candidates: &[ParsedResponse],
        iteration: usize,
        progress: &dyn ProgressNotifier,
    ) -> (SynthesisResult, SynthesisSource) {
        let config = &self.config;
        let arbiter = &config.arbiter;
        progress.on_phase_start(Phase::Arbitration, 1);

        let prompt = PromptTemplate::arbiter_prompt(
            config.judging_method,
            original,
            &history.render(config.history_window, config.history_max_chars),
            candidates,
            iteration,
            config.max_iterations,
            config.history_max_chars,
        );
        debug!(
            "Arbiter {} judging {} responses ({})",
            arbiter,
            candidates.len(),
            config.judging_method
        );

        let reply = invoke_with_timeout(
            &*self.gateway,
            arbiter,
            &prompt,
            Some(PromptTemplate::arbiter_system(config.judging_method)),
            config.agent_timeout,
        )
        .await;

        let synthesis = match reply {
            Ok(text) => {
                progress.on_task_complete(Phase::Arbitration, arbiter, true);
                let synthesis = config.judging_method.parse_verdict(&text, candidates);
                if synthesis.is_parse_failure() {
                    warn!("Arbiter {} output could not be parsed", arbiter);
                }
                synthesis
            }
            Err(failure) => {
                warn!("Arbiter {} failed: {}", arbiter, failure);
                progress.on_task_complete(Phase::Arbitration, arbiter, false);
                SynthesisResult::arbiter_failed(arbiter, failure)
            }
        };

        progress.on_phase_complete(Phase::Arbitration);
        (
            synthesis,
            SynthesisSource::Arbiter {
                arbiter: arbiter.clone(),
            },
        )
    }

    fn persist(&self, result: &OrchestrationResult) {
        if let Err(e) = self.logger.record(&InteractionRecord::from_result(result)) {
            warn!("Failed to persist interaction: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::agent_gateway::GatewayError;
    use crate::ports::interaction_log::InteractionLogError;
    use async_trait::async_trait;
    use consortium_domain::{
        AgentId, AgentPanel, FailureKind, JudgingMethod, StrategyParams,
    };
    use std::collections::{HashMap, VecDeque};
    use std::sync::Mutex;
    use std::time::Duration;

    const ARBITER: &str = "judge";

    #[derive(Clone)]
    enum Reply {
        Text(String),
        Fail(GatewayError),
        Slow(u64, String),
    }

    /// Fixed replies per panel agent, scripted replies for the arbiter
    struct MockGateway {
        agents: HashMap<String, Reply>,
        arbiter: Mutex<VecDeque<Reply>>,
        calls: Mutex<Vec<(String, String)>>,
    }

    impl MockGateway {
        fn new() -> Self {
            Self {
                agents: HashMap::new(),
                arbiter: Mutex::new(VecDeque::new()),
                calls: Mutex::new(Vec::new()),
            }
        }

        fn agent(mut self, name: &str, reply: Reply) -> Self {
            self.agents.insert(name.to_string(), reply);
            self
        }

        fn answers(self, name: &str, answer: &str, confidence: f64) -> Self {
            self.agent(
                name,
                Reply::Text(format!(
                    "<answer>{}</answer><confidence>{}</confidence>",
                    answer, confidence
                )),
            )
        }

        fn arbiter_says(self, reply: Reply) -> Self {
            self.arbiter.lock().unwrap().push_back(reply);
            self
        }

        fn arbiter_calls(&self) -> Vec<String> {
            self.calls
                .lock()
                .unwrap()
                .iter()
                .filter(|(agent, _)| agent == ARBITER)
                .map(|(_, prompt)| prompt.clone())
                .collect()
        }

        fn agent_calls(&self, name: &str) -> Vec<String> {
            self.calls
                .lock()
                .unwrap()
                .iter()
                .filter(|(agent, _)| agent == name)
                .map(|(_, prompt)| prompt.clone())
                .collect()
        }
    }

    #[async_trait]
    impl AgentGateway for MockGateway {
        async fn invoke(
            &self,
            agent: &AgentId,
            prompt: &str,
            _system: Option<&str>,
        ) -> Result<String, GatewayError> {
            self.calls
                .lock()
                .unwrap()
                .push((agent.to_string(), prompt.to_string()));

            let reply = if agent.as_str() == ARBITER {
                let mut queue = self.arbiter.lock().unwrap();
                // The last scripted reply repeats
                if queue.len() > 1 {
                    queue.pop_front()
                } else {
                    queue.front().cloned()
                }
            } else {
                self.agents.get(agent.as_str()).cloned()
            };

            match reply {
                Some(Reply::Text(text)) => Ok(text),
                Some(Reply::Fail(error)) => Err(error),
                Some(Reply::Slow(delay, text)) => {
                    tokio::time::sleep(Duration::from_millis(delay)).await;
                    Ok(text)
                }
                None => Err(GatewayError::AgentNotAvailable(agent.to_string())),
            }
        }
    }

    fn verdict(synthesis: &str, confidence: f64, needs_iteration: bool, areas: &[&str]) -> Reply {
        Reply::Text(format!(
            "<synthesis_output><synthesis>{}</synthesis><confidence>{}</confidence>\
             <analysis>compared</analysis><dissent></dissent>\
             <needs_iteration>{}</needs_iteration>\
             <refinement_areas>{}</refinement_areas></synthesis_output>",
            synthesis,
            confidence,
            needs_iteration,
            areas.join("\n")
        ))
    }

    fn config(panel: AgentPanel) -> ConsortiumConfig {
        ConsortiumConfig::new(panel)
            .with_arbiter(ARBITER)
            .with_confidence_threshold(0.9)
            .with_iteration_bounds(1, 3)
    }

    struct RecordingLogger {
        records: Mutex<Vec<InteractionRecord>>,
    }

    impl InteractionLogger for RecordingLogger {
        fn record(&self, record: &InteractionRecord) -> Result<(), InteractionLogError> {
            self.records.lock().unwrap().push(record.clone());
            Ok(())
        }
    }

    struct BrokenLogger;

    impl InteractionLogger for BrokenLogger {
        fn record(&self, _record: &InteractionRecord) -> Result<(), InteractionLogError> {
            Err(InteractionLogError::Unavailable("disk full".to_string()))
        }
    }

    #[tokio::test]
    async fn test_fast_path_skips_arbiter() {
        let gateway = Arc::new(
            MockGateway::new()
                .answers("a", "six", 0.6)
                .answers("b", "forty-two", 0.95)
                .answers("c", "seven", 0.7),
        );
        let panel = AgentPanel::parse_specs(["a", "b", "c"], 1);
        let use_case = RunConsortiumUseCase::new(Arc::clone(&gateway), config(panel)).unwrap();

        let result = use_case.orchestrate("meaning of life?").await.unwrap();

        assert_eq!(result.synthesis.synthesis, "forty-two");
        assert_eq!(result.synthesis.confidence, 0.95);
        assert!(gateway.arbiter_calls().is_empty());
        assert_eq!(result.metadata.outcome, OrchestrationOutcome::Converged);
        assert_eq!(result.metadata.iteration_count, 1);
        assert_eq!(
            result.history.records()[0].source,
            SynthesisSource::FastPath {
                agent: "b".into(),
                instance: 0
            }
        );
    }

    #[tokio::test]
    async fn test_fast_path_tie_goes_to_submission_order() {
        let gateway = Arc::new(
            MockGateway::new()
                .answers("a", "first", 0.92)
                .answers("b", "second", 0.92),
        );
        let use_case =
            RunConsortiumUseCase::new(gateway, config(AgentPanel::parse_specs(["a", "b"], 1)))
                .unwrap();

        let result = use_case.orchestrate("q").await.unwrap();
        assert_eq!(result.synthesis.synthesis, "first");
    }

    #[tokio::test]
    async fn test_fast_path_disabled_uses_arbiter() {
        let gateway = Arc::new(
            MockGateway::new()
                .answers("a", "x", 0.99)
                .arbiter_says(verdict("merged", 0.95, false, &[])),
        );
        let use_case = RunConsortiumUseCase::new(
            Arc::clone(&gateway),
            config(AgentPanel::new().with("a", 1)).with_fast_path(false),
        )
        .unwrap();

        let result = use_case.orchestrate("q").await.unwrap();
        assert_eq!(result.synthesis.synthesis, "merged");
        assert_eq!(gateway.arbiter_calls().len(), 1);
    }

    #[tokio::test]
    async fn test_forced_acceptance_at_max_iterations() {
        let gateway = Arc::new(
            MockGateway::new()
                .answers("a", "maybe", 0.4)
                .arbiter_says(verdict("unsure", 0.5, true, &["dig deeper"])),
        );
        let use_case = RunConsortiumUseCase::new(
            Arc::clone(&gateway),
            config(AgentPanel::new().with("a", 2)).with_iteration_bounds(1, 2),
        )
        .unwrap();

        let result = use_case.orchestrate("q").await.unwrap();

        assert_eq!(result.metadata.iteration_count, 2);
        assert_eq!(result.history.len(), 2);
        assert_eq!(
            result.metadata.outcome,
            OrchestrationOutcome::MaxIterationsReached
        );
        assert!(!result.synthesis.needs_iteration);
        assert!(!result.history.records()[1].synthesis.needs_iteration);
        // Round 1 keeps what the arbiter said
        assert!(result.history.records()[0].synthesis.needs_iteration);
        assert_eq!(gateway.arbiter_calls().len(), 2);
    }

    #[tokio::test]
    async fn test_rounds_never_exceed_max_iterations() {
        for max in 1..=4 {
            let gateway = Arc::new(
                MockGateway::new()
                    .answers("a", "x", 0.1)
                    .arbiter_says(verdict("low", 0.2, true, &[])),
            );
            let use_case = RunConsortiumUseCase::new(
                Arc::clone(&gateway),
                config(AgentPanel::new().with("a", 1)).with_iteration_bounds(1, max),
            )
            .unwrap();

            let result = use_case.orchestrate("q").await.unwrap();
            assert_eq!(result.history.len(), max);
            assert_eq!(result.metadata.iteration_count, max);
            assert_eq!(gateway.arbiter_calls().len(), max);
        }
    }

    #[tokio::test]
    async fn test_min_iterations_delays_acceptance() {
        let gateway = Arc::new(
            MockGateway::new()
                .answers("a", "x", 0.5)
                .arbiter_says(verdict("solid", 0.95, false, &[])),
        );
        let use_case = RunConsortiumUseCase::new(
            Arc::clone(&gateway),
            config(AgentPanel::new().with("a", 1)).with_iteration_bounds(2, 5),
        )
        .unwrap();

        let result = use_case.orchestrate("q").await.unwrap();
        assert_eq!(result.metadata.iteration_count, 2);
        assert_eq!(result.metadata.outcome, OrchestrationOutcome::Converged);
    }

    #[tokio::test]
    async fn test_refinement_areas_reach_next_round() {
        let gateway = Arc::new(
            MockGateway::new()
                .answers("a", "draft", 0.5)
                .arbiter_says(verdict("draft", 0.5, true, &["add examples", "cite sources"]))
                .arbiter_says(verdict("final", 0.95, false, &[])),
        );
        let use_case =
            RunConsortiumUseCase::new(Arc::clone(&gateway), config(AgentPanel::new().with("a", 1)))
                .unwrap();

        let result = use_case.orchestrate("explain monads").await.unwrap();

        assert_eq!(result.synthesis.synthesis, "final");
        let prompts = gateway.agent_calls("a");
        assert_eq!(prompts.len(), 2);
        assert!(prompts[0].starts_with("explain monads"));
        assert!(prompts[1].contains("- add examples\n- cite sources"));
        assert!(prompts[1].contains("Round 1 (arbiter judge, confidence 0.50)"));
        // The second arbiter call sees round 1
        assert!(gateway.arbiter_calls()[1].contains("Previous rounds:\nRound 1"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_does_not_sink_the_round() {
        let gateway = Arc::new(
            MockGateway::new()
                .agent("slow", Reply::Slow(60_000, "late".to_string()))
                .answers("quick", "on time", 0.6)
                .arbiter_says(verdict("on time", 0.92, false, &[])),
        );
        let use_case = RunConsortiumUseCase::new(
            Arc::clone(&gateway),
            config(AgentPanel::parse_specs(["slow", "quick"], 1))
                .with_agent_timeout(Some(Duration::from_millis(500))),
        )
        .unwrap();

        let result = use_case.orchestrate("q").await.unwrap();

        assert_eq!(result.responses.len(), 2);
        assert_eq!(
            result.responses[0].raw.error.as_ref().unwrap().kind,
            FailureKind::Timeout
        );
        assert_eq!(result.responses[0].confidence, 0.0);
        assert!(result.responses[1].is_success());
        let arbiter_prompt = &gateway.arbiter_calls()[0];
        assert!(arbiter_prompt.contains("agent=\"quick#0\""));
        assert!(!arbiter_prompt.contains("slow#0"));
        assert_eq!(result.metadata.outcome, OrchestrationOutcome::Converged);
    }

    #[tokio::test(start_paused = true)]
    async fn test_responses_in_submission_order() {
        let gateway = Arc::new(
            MockGateway::new()
                .agent("tortoise", Reply::Slow(200, "<confidence>0.3</confidence>".to_string()))
                .agent("hare", Reply::Slow(1, "<confidence>0.4</confidence>".to_string()))
                .arbiter_says(verdict("done", 0.95, false, &[])),
        );
        let use_case = RunConsortiumUseCase::new(
            gateway,
            config(AgentPanel::parse_specs(["tortoise:2", "hare"], 1)),
        )
        .unwrap();

        let result = use_case.orchestrate("q").await.unwrap();
        let labels: Vec<String> = result.responses.iter().map(|r| r.label()).collect();
        assert_eq!(labels, vec!["tortoise#0", "tortoise#1", "hare#0"]);
    }

    #[tokio::test]
    async fn test_all_failed_short_circuits() {
        let gateway = Arc::new(
            MockGateway::new()
                .agent("a", Reply::Fail(GatewayError::ConnectionError("down".to_string())))
                .arbiter_says(verdict("should not run", 0.99, false, &[])),
        );
        let use_case =
            RunConsortiumUseCase::new(Arc::clone(&gateway), config(AgentPanel::new().with("a", 2)))
                .unwrap();

        let result = use_case.orchestrate("q").await.unwrap();

        assert_eq!(
            result.metadata.outcome,
            OrchestrationOutcome::NoUsableResponses
        );
        assert!(result.synthesis.synthesis.starts_with("No usable responses"));
        assert_eq!(result.synthesis.confidence, 0.0);
        assert_eq!(result.history.len(), 1);
        assert_eq!(result.responses.len(), 2);
        assert!(gateway.arbiter_calls().is_empty());
    }

    #[tokio::test]
    async fn test_all_failed_can_still_invoke_arbiter() {
        let gateway = Arc::new(
            MockGateway::new()
                .agent("a", Reply::Fail(GatewayError::Timeout))
                .arbiter_says(verdict("from nothing", 0.3, false, &[])),
        );
        let use_case = RunConsortiumUseCase::new(
            Arc::clone(&gateway),
            config(AgentPanel::new().with("a", 1))
                .with_empty_round_policy(EmptyRoundPolicy::InvokeArbiter)
                .with_iteration_bounds(1, 1),
        )
        .unwrap();

        let result = use_case.orchestrate("q").await.unwrap();

        assert_eq!(result.synthesis.synthesis, "from nothing");
        assert!(gateway.arbiter_calls()[0].contains("(no usable responses this round)"));
        assert_eq!(
            result.metadata.outcome,
            OrchestrationOutcome::MaxIterationsReached
        );
    }

    #[tokio::test]
    async fn test_strategy_filtering_everything_short_circuits() {
        let gateway = Arc::new(MockGateway::new().answers("a", "x", 0.3));
        let use_case = RunConsortiumUseCase::new(
            Arc::clone(&gateway),
            config(AgentPanel::new().with("a", 1))
                .with_strategy("top_k", StrategyParams::new().with("min_confidence", 0.5)),
        )
        .unwrap();

        let result = use_case.orchestrate("q").await.unwrap();
        assert_eq!(
            result.metadata.outcome,
            OrchestrationOutcome::NoUsableResponses
        );
        assert_eq!(result.metadata.strategy, "top_k");
    }

    #[tokio::test]
    async fn test_unparseable_arbiter_output_degrades() {
        let raw = "I could not decide, sorry.";
        let gateway = Arc::new(
            MockGateway::new()
                .answers("a", "x", 0.4)
                .arbiter_says(Reply::Text(raw.to_string())),
        );
        let use_case = RunConsortiumUseCase::new(
            gateway,
            config(AgentPanel::new().with("a", 1)).with_iteration_bounds(1, 2),
        )
        .unwrap();

        let result = use_case.orchestrate("q").await.unwrap();

        assert_eq!(result.synthesis.synthesis, raw);
        assert_eq!(result.synthesis.confidence, 0.5);
        assert!(result.synthesis.is_parse_failure());
        assert_eq!(result.metadata.iteration_count, 2);
    }

    #[tokio::test]
    async fn test_arbiter_failure_is_absorbed() {
        let gateway = Arc::new(
            MockGateway::new()
                .answers("a", "x", 0.4)
                .arbiter_says(Reply::Fail(GatewayError::RequestFailed("500".to_string())))
                .arbiter_says(verdict("recovered", 0.93, false, &[])),
        );
        let use_case =
            RunConsortiumUseCase::new(gateway, config(AgentPanel::new().with("a", 1))).unwrap();

        let result = use_case.orchestrate("q").await.unwrap();

        assert_eq!(result.synthesis.synthesis, "recovered");
        assert_eq!(result.history.len(), 2);
        assert!(
            result.history.records()[0]
                .synthesis
                .analysis
                .contains("Arbiter judge failed")
        );
    }

    #[tokio::test]
    async fn test_pick_one_judging() {
        let gateway = Arc::new(
            MockGateway::new()
                .answers("a", "alpha", 0.5)
                .answers("b", "beta", 0.6)
                .arbiter_says(Reply::Text(
                    "<winner><response_id>2</response_id></winner><confidence>0.91</confidence>"
                        .to_string(),
                )),
        );
        let use_case = RunConsortiumUseCase::new(
            gateway,
            config(AgentPanel::parse_specs(["a", "b"], 1))
                .with_judging_method(JudgingMethod::PickOne),
        )
        .unwrap();

        let result = use_case.orchestrate("q").await.unwrap();
        assert_eq!(result.synthesis.synthesis, "beta");
        assert_eq!(result.metadata.judging_method, JudgingMethod::PickOne);
    }

    #[tokio::test]
    async fn test_strategy_state_resets_between_runs() {
        let gateway = Arc::new(
            MockGateway::new()
                .answers("a", "x", 0.2)
                .answers("b", "y", 0.6)
                .arbiter_says(verdict("meh", 0.5, true, &[])),
        );
        let use_case = RunConsortiumUseCase::new(
            Arc::clone(&gateway),
            config(AgentPanel::parse_specs(["a", "b"], 1))
                .with_iteration_bounds(1, 2)
                .with_strategy("elimination", StrategyParams::new()),
        )
        .unwrap();

        use_case.orchestrate("q").await.unwrap();
        // a is eliminated in round 2
        assert_eq!(gateway.agent_calls("a").len(), 1);
        assert_eq!(gateway.agent_calls("b").len(), 2);

        use_case.orchestrate("q").await.unwrap();
        assert_eq!(gateway.agent_calls("a").len(), 2);
    }

    #[tokio::test]
    async fn test_logger_gets_one_record() {
        let gateway = Arc::new(
            MockGateway::new()
                .answers("a", "x", 0.4)
                .arbiter_says(verdict("answer", 0.5, true, &[])),
        );
        let logger = Arc::new(RecordingLogger {
            records: Mutex::new(Vec::new()),
        });
        let use_case =
            RunConsortiumUseCase::new(gateway, config(AgentPanel::new().with("a", 1)))
                .unwrap()
                .with_logger(logger.clone());

        let result = use_case.orchestrate("persist me").await.unwrap();

        let records = logger.records.lock().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].prompt, "persist me");
        assert_eq!(records[0].consortium_id, result.metadata.consortium_id);
        assert_eq!(records[0].iteration_count, 3);
        assert_eq!(records[0].arbiter, ARBITER);
        assert_eq!(records[0].outcome, "max_iterations_reached");
    }

    #[tokio::test]
    async fn test_context_reaches_every_round() {
        let gateway = Arc::new(
            MockGateway::new()
                .answers("a", "x", 0.3)
                .arbiter_says(verdict("draft", 0.4, true, &["be specific"])),
        );
        let use_case = RunConsortiumUseCase::new(
            Arc::clone(&gateway),
            config(AgentPanel::new().with("a", 1)).with_iteration_bounds(1, 2),
        )
        .unwrap();

        use_case
            .orchestrate_with_context(
                "And in winter?",
                Some("user: Weather in Oslo?"),
                &NoProgress,
            )
            .await
            .unwrap();

        let calls = gateway.agent_calls("a");
        assert_eq!(calls.len(), 2);
        assert!(calls.iter().all(|p| p.starts_with("Context:\nuser: Weather in Oslo?")));
        assert!(calls[1].contains("- be specific"));
        assert!(
            gateway
                .arbiter_calls()
                .iter()
                .all(|p| !p.contains("Weather in Oslo"))
        );
    }

    #[tokio::test]
    async fn test_each_run_gets_its_own_id() {
        let gateway = Arc::new(MockGateway::new().answers("a", "x", 0.99));
        let use_case =
            RunConsortiumUseCase::new(gateway, config(AgentPanel::new().with("a", 1))).unwrap();

        let first = use_case.orchestrate("q").await.unwrap();
        let second = use_case.orchestrate("q").await.unwrap();

        assert_eq!(first.metadata.consortium_id.len(), 36);
        assert_ne!(first.metadata.consortium_id, second.metadata.consortium_id);
    }

    #[tokio::test]
    async fn test_logger_failure_does_not_abort() {
        let gateway = Arc::new(MockGateway::new().answers("a", "x", 0.99));
        let use_case =
            RunConsortiumUseCase::new(gateway, config(AgentPanel::new().with("a", 1)))
                .unwrap()
                .with_logger(Arc::new(BrokenLogger));

        assert!(use_case.orchestrate("q").await.is_ok());
    }

    #[test]
    fn test_configuration_errors_before_any_round() {
        let gateway = Arc::new(MockGateway::new());

        let empty = RunConsortiumUseCase::new(
            Arc::clone(&gateway),
            config(AgentPanel::new().with("a", 0)),
        );
        assert!(matches!(
            empty,
            Err(RunConsortiumError::Configuration(DomainError::EmptyPanel))
        ));

        let unknown = RunConsortiumUseCase::new(
            Arc::clone(&gateway),
            config(AgentPanel::new().with("a", 1)).with_strategy("tournament", StrategyParams::new()),
        );
        assert!(matches!(
            unknown,
            Err(RunConsortiumError::Configuration(DomainError::UnknownStrategy { .. }))
        ));

        let bounds = RunConsortiumUseCase::new(
            Arc::clone(&gateway),
            config(AgentPanel::new().with("a", 1)).with_iteration_bounds(4, 2),
        );
        assert!(matches!(
            bounds,
            Err(RunConsortiumError::Configuration(
                DomainError::InvalidIterationBounds { .. }
            ))
        ));

        assert!(gateway.calls.lock().unwrap().is_empty());
    }
}
