// ABOUTME: Tool abstraction: the Tool trait, tool results, and model-facing declarations.
// ABOUTME: The registry dispatches calls; query_graph is the one concrete tool.

pub mod query_graph;
pub mod registry;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::agent::message::ToolArguments;
use crate::approval::GateOutcome;

pub use query_graph::{QUERY_GRAPH_TOOL_NAME, QueryGraphTool};
pub use registry::ToolRegistry;

/// The declaration sent to the model so it knows how to call a tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    /// JSON schema of the arguments object.
    pub parameters: Value,
}

/// Text handed back to the model as a tool-result message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolResult {
    pub content: String,
    pub is_error: bool,
}

impl ToolResult {
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            is_error: false,
        }
    }

    pub fn error(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            is_error: true,
        }
    }
}

/// A capability the model may request by name.
#[async_trait]
pub trait Tool: Send + Sync {
    fn name(&self) -> &str;

    /// Informs the model only; not enforced.
    fn description(&self) -> &str;

    fn schema(&self) -> Value;

    /// Pre-execution safety gate, evaluated by the registry before `execute`.
    fn check(&self, _params: &ToolArguments) -> GateOutcome {
        GateOutcome::Allow
    }

    async fn execute(&self, params: ToolArguments) -> anyhow::Result<ToolResult>;

    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: self.name().to_string(),
            description: self.description().to_string(),
            parameters: self.schema(),
        }
    }
}
