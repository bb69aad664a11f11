// ABOUTME: Agent module: conversation state, model adapters, and the orchestration loop.
// ABOUTME: The loop alternates model completions and tool dispatch until an answer or abort.

pub mod r#loop;
pub mod message;
pub mod openai;
pub mod provider;
pub mod state;

pub use r#loop::{
    AbortReason, Orchestrator, OrchestratorConfig, RunOutcome, RunReply, RunStatus, StepRecord,
};
pub use message::*;
pub use provider::*;
pub use state::RunState;
