// ABOUTME: Tool registry: fixed name-to-tool map built at startup, read-only afterwards.
// ABOUTME: Dispatch runs the tool's safety gate, bounds execution by a timeout, and never fails.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use crate::agent::message::ToolArguments;
use crate::approval::GateOutcome;
use crate::tools::{Tool, ToolDefinition, ToolResult};

/// Name-keyed collection of tools. Declarations come out in name order.
#[derive(Clone, Default)]
pub struct ToolRegistry {
    tools: BTreeMap<String, Arc<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a tool, replacing any earlier tool with the same name.
    pub fn register(mut self, tool: impl Tool + 'static) -> Self {
        let name = tool.name().to_string();
        if self.tools.insert(name.clone(), Arc::new(tool)).is_some() {
            warn!(tool = %name, "tool registered twice; keeping the later one");
        }
        self
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    pub fn count(&self) -> usize {
        self.tools.len()
    }

    pub fn names(&self) -> Vec<String> {
        self.tools.keys().cloned().collect()
    }

    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.tools.values().map(|t| t.definition()).collect()
    }

    /// Run one tool call to a result. Refusals, failures, and timeouts all
    /// come back as result text so the model can react to them.
    pub async fn dispatch(
        &self,
        name: &str,
        params: ToolArguments,
        timeout: Duration,
    ) -> ToolResult {
        let Some(tool) = self.get(name) else {
            return ToolResult::error(format!("Tool '{}' not found in registry", name));
        };

        if let GateOutcome::Deny { reason } = tool.check(&params) {
            debug!(tool = name, %reason, "tool call refused by gate");
            return ToolResult::error(reason);
        }

        match tokio::time::timeout(timeout, tool.execute(params)).await {
            Ok(Ok(result)) => result,
            Ok(Err(e)) => {
                warn!(tool = name, error = %e, "tool execution failed");
                ToolResult::error(format!("Tool execution error: {}", e))
            }
            Err(_) => {
                warn!(
                    tool = name,
                    timeout_secs = timeout.as_secs_f64(),
                    "tool execution timed out"
                );
                ToolResult::error(format!(
                    "Tool execution error: '{}' timed out after {:?}",
                    name, timeout
                ))
            }
        }
    }
}

impl std::fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolRegistry")
            .field("tools", &self.names())
            .finish()
    }
}
