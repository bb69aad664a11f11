// ABOUTME: Orchestrator: the two-state loop between model completions and tool dispatch.
// ABOUTME: Enforces the step budget, folds tool failures into history, and aborts on model failure.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::agent::message::{AssistantReply, Message, ToolInvocationRequest};
use crate::agent::provider::ModelAdapter;
use crate::agent::state::RunState;
use crate::config::Config;
use crate::error::{ModelError, ProtocolViolation, RunError};
use crate::tools::{ToolDefinition, ToolRegistry, ToolResult};

/// Reply when the step budget runs out before the model produces an answer.
pub const BUDGET_EXHAUSTED_REPLY: &str =
    "抱歉，我无法在允许的步骤内完成该请求。请尝试把问题描述得更具体一些。";

/// Reply when the model adapter fails or times out.
pub const MODEL_FAILURE_REPLY: &str = "抱歉，审计助手暂时无法生成回答，请稍后再试。";

/// Reply when the caller cancels the run.
pub const CANCELLED_REPLY: &str = "请求已取消。";

/// Limits applied to every run.
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    /// Maximum model calls per run.
    pub max_steps: u32,
    pub model_timeout: Duration,
    pub tool_timeout: Duration,
    /// Dispatch the tool calls of one turn concurrently.
    pub parallel_tool_calls: bool,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            max_steps: 10,
            model_timeout: Duration::from_secs(60),
            tool_timeout: Duration::from_secs(30),
            parallel_tool_calls: false,
        }
    }
}

impl OrchestratorConfig {
    pub fn from_config(config: &Config) -> Self {
        Self {
            max_steps: config.agent.max_steps,
            model_timeout: Duration::from_secs(config.llm.timeout_seconds),
            tool_timeout: config.agent.tool_timeout(),
            parallel_tool_calls: config.agent.parallel_tool_calls,
        }
    }
}

/// Why a run ended without a model answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AbortReason {
    BudgetExhausted,
    ModelFailure,
    Cancelled,
}

impl AbortReason {
    pub fn reply(self) -> &'static str {
        match self {
            AbortReason::BudgetExhausted => BUDGET_EXHAUSTED_REPLY,
            AbortReason::ModelFailure => MODEL_FAILURE_REPLY,
            AbortReason::Cancelled => CANCELLED_REPLY,
        }
    }
}

/// Terminal outcome of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "reason", rename_all = "snake_case")]
pub enum RunStatus {
    Completed,
    Aborted(AbortReason),
}

/// The caller-facing reply of a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunReply {
    pub response: String,
}

/// One entry of a run trace, as shown next to a chat reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepRecord {
    pub node: String,
    pub status: String,
    pub detail: String,
}

/// Everything a finished run produced.
#[derive(Debug, Clone, Serialize)]
pub struct RunOutcome {
    pub status: RunStatus,
    pub response: String,
    pub history: Vec<Message>,
    pub steps: u32,
    pub model_calls: u32,
}

impl RunOutcome {
    fn from_state(state: RunState, status: RunStatus, response: String) -> Self {
        let steps = state.steps();
        let model_calls = state.model_calls();
        Self {
            status,
            response,
            history: state.into_messages(),
            steps,
            model_calls,
        }
    }

    pub fn is_completed(&self) -> bool {
        self.status == RunStatus::Completed
    }

    /// Per-node trace derived from the history.
    pub fn trace(&self) -> Vec<StepRecord> {
        let mut records = Vec::new();
        for message in &self.history {
            match message {
                Message::Assistant { tool_calls, .. } if !tool_calls.is_empty() => {
                    let names: Vec<&str> =
                        tool_calls.iter().map(|c| c.tool_name.as_str()).collect();
                    records.push(StepRecord {
                        node: "agent".to_string(),
                        status: "completed".to_string(),
                        detail: format!("requested tools: {}", names.join(", ")),
                    });
                }
                Message::Assistant { .. } => records.push(StepRecord {
                    node: "agent".to_string(),
                    status: "completed".to_string(),
                    detail: "produced final answer".to_string(),
                }),
                Message::Tool { tool_call_id, .. } => records.push(StepRecord {
                    node: "tools".to_string(),
                    status: "completed".to_string(),
                    detail: format!("returned result for {}", tool_call_id),
                }),
                _ => {}
            }
        }
        if let RunStatus::Aborted(reason) = self.status {
            records.push(StepRecord {
                node: "agent".to_string(),
                status: "aborted".to_string(),
                detail: format!("{:?}", reason),
            });
        }
        records
    }
}

impl From<RunOutcome> for RunReply {
    fn from(outcome: RunOutcome) -> Self {
        RunReply {
            response: outcome.response,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    AwaitingModel,
    DispatchingTools,
}

/// Drives runs. Holds no per-run state, so one instance serves concurrent runs.
pub struct Orchestrator {
    model: Arc<dyn ModelAdapter>,
    registry: Arc<ToolRegistry>,
    system_prompt: String,
    config: OrchestratorConfig,
}

impl Orchestrator {
    pub fn new(
        model: Arc<dyn ModelAdapter>,
        registry: ToolRegistry,
        system_prompt: impl Into<String>,
        config: OrchestratorConfig,
    ) -> Self {
        Self {
            model,
            registry: Arc::new(registry),
            system_prompt: system_prompt.into(),
            config,
        }
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    /// Answer one user message.
    pub async fn run(&self, user_message: &str) -> Result<RunReply, RunError> {
        self.execute(user_message).await.map(RunReply::from)
    }

    /// Answer one user message, returning the full outcome and history.
    pub async fn execute(&self, user_message: &str) -> Result<RunOutcome, RunError> {
        self.execute_with_cancel(user_message, &CancellationToken::new())
            .await
    }

    /// One model call bounded by the model timeout.
    async fn complete(
        &self,
        state: &RunState,
        definitions: &[ToolDefinition],
    ) -> Result<AssistantReply, ModelError> {
        tokio::time::timeout(
            self.config.model_timeout,
            self.model.complete(state.messages(), definitions),
        )
        .await
        .unwrap_or(Err(ModelError::Timeout(self.config.model_timeout)))
    }

    /// Like `execute`, but stops at the next cycle boundary once `cancel` fires.
    pub async fn execute_with_cancel(
        &self,
        user_message: &str,
        cancel: &CancellationToken,
    ) -> Result<RunOutcome, RunError> {
        let mut state = RunState::seeded(self.config.max_steps, &self.system_prompt, user_message);
        let definitions = self.registry.definitions();
        let mut phase = Phase::AwaitingModel;

        loop {
            if cancel.is_cancelled() {
                return Ok(self.abort(state, AbortReason::Cancelled));
            }

            match phase {
                Phase::AwaitingModel => {
                    if state.budget_exhausted() {
                        return Ok(self.abort(state, AbortReason::BudgetExhausted));
                    }

                    state.record_model_call();
                    debug!(
                        call = state.model_calls(),
                        history = state.messages().len(),
                        "calling model"
                    );
                    let reply = match self.complete(&state, &definitions).await {
                        Ok(reply) => reply,
                        Err(e) => {
                            warn!(error = %e, "model call failed");
                            return Ok(self.abort(state, AbortReason::ModelFailure));
                        }
                    };

                    if reply.tool_calls.is_empty() {
                        let response = reply.content.clone();
                        state.push(reply.into_message())?;
                        info!(
                            model_calls = state.model_calls(),
                            steps = state.steps(),
                            "run completed"
                        );
                        return Ok(RunOutcome::from_state(state, RunStatus::Completed, response));
                    }

                    let unknown = reply
                        .tool_calls
                        .iter()
                        .find(|c| !self.registry.contains(&c.tool_name))
                        .map(|c| c.tool_name.clone());
                    state.push(reply.into_message())?;
                    if let Some(name) = unknown {
                        warn!(tool = %name, "model requested an unregistered tool");
                        return Err(ProtocolViolation::UnknownTool(name).into());
                    }

                    debug!("transition: awaiting model -> dispatching tools");
                    phase = Phase::DispatchingTools;
                }
                Phase::DispatchingTools => {
                    let calls = state
                        .last()
                        .map(|m| m.tool_calls().to_vec())
                        .unwrap_or_default();
                    let results = self.dispatch_all(&calls).await;
                    for (call, result) in calls.iter().zip(results) {
                        state.push(Message::tool_result(&call.id, result.content))?;
                    }
                    state.complete_step();

                    debug!(step = state.steps(), "transition: dispatching tools -> awaiting model");
                    phase = Phase::AwaitingModel;
                }
            }
        }
    }

    /// Execute one turn's calls. Results come back in emission order.
    async fn dispatch_all(&self, calls: &[ToolInvocationRequest]) -> Vec<ToolResult> {
        let timeout = self.config.tool_timeout;
        if self.config.parallel_tool_calls {
            let pending = calls.iter().map(|call| {
                debug!(tool = %call.tool_name, id = %call.id, "dispatching tool call");
                self.registry
                    .dispatch(&call.tool_name, call.arguments.clone(), timeout)
            });
            return futures::future::join_all(pending).await;
        }

        let mut results = Vec::with_capacity(calls.len());
        for call in calls {
            debug!(tool = %call.tool_name, id = %call.id, "dispatching tool call");
            results.push(
                self.registry
                    .dispatch(&call.tool_name, call.arguments.clone(), timeout)
                    .await,
            );
        }
        results
    }

    fn abort(&self, state: RunState, reason: AbortReason) -> RunOutcome {
        warn!(
            ?reason,
            model_calls = state.model_calls(),
            steps = state.steps(),
            "run aborted"
        );
        RunOutcome::from_state(state, RunStatus::Aborted(reason), reason.reply().to_string())
    }

    /// End the orchestrator's lifecycle.
    pub fn shutdown(self) {
        info!(tools = self.registry.count(), "orchestrator shut down");
    }
}
