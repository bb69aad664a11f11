// ABOUTME: query_graph tool: runs read-only Cypher against the audit knowledge graph.
// ABOUTME: Mutating queries are refused before reaching the store; store errors become result text.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Value, json};
use tracing::debug;

use crate::agent::message::ToolArguments;
use crate::approval::{GateOutcome, analyze_query};
use crate::graph::{AUDIT_SCHEMA, GraphSchema, GraphStore, Params};
use crate::tools::{Tool, ToolResult};

/// The tool name declared to the model.
pub const QUERY_GRAPH_TOOL_NAME: &str = "query_graph";

/// Result text for a query that contains a mutation keyword.
pub const READ_ONLY_REFUSAL: &str = "错误: 仅允许只读查询 (MATCH/RETURN)。";

/// Prefix of the result text when the store fails to run a query.
pub const QUERY_ERROR_PREFIX: &str = "查询错误: ";

const EXAMPLES: &str = "\
- \"查找所有高风险\": MATCH (r:Risk) WHERE r.severity = 'High' RETURN r.title
- \"哪些控制措施缓解了风险 R-001?\":
  MATCH (c:Control)-[:MITIGATES]->(r:Risk {id: 'R-001'}) RETURN c.label";

/// Read-only graph query tool backed by a shared graph store.
pub struct QueryGraphTool {
    store: Arc<dyn GraphStore>,
    description: String,
}

impl QueryGraphTool {
    pub fn new(store: Arc<dyn GraphStore>) -> Self {
        Self {
            store,
            description: Self::describe(&AUDIT_SCHEMA),
        }
    }

    /// Model-facing description: purpose, schema overview, sample queries.
    pub fn describe(schema: &GraphSchema) -> String {
        format!(
            "在审计知识图谱上执行只读 Cypher 查询。\n\
             使用此工具查找风险、控制、文档及其关系。\n\n\
             Schema 概览:\n{}\n\n示例:\n{}",
            schema.overview(),
            EXAMPLES
        )
    }
}

fn query_arg(params: &ToolArguments) -> Option<&str> {
    params.get("query").and_then(Value::as_str)
}

#[async_trait]
impl Tool for QueryGraphTool {
    fn name(&self) -> &str {
        QUERY_GRAPH_TOOL_NAME
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "A read-only Cypher query (MATCH ... RETURN ...)"
                }
            },
            "required": ["query"]
        })
    }

    fn check(&self, params: &ToolArguments) -> GateOutcome {
        let Some(query) = query_arg(params) else {
            return GateOutcome::Allow;
        };
        let analysis = analyze_query(query);
        if analysis.read_only {
            GateOutcome::Allow
        } else {
            debug!(mutations = ?analysis.mutations, "refusing mutating graph query");
            GateOutcome::deny(READ_ONLY_REFUSAL)
        }
    }

    async fn execute(&self, params: ToolArguments) -> anyhow::Result<ToolResult> {
        let Some(query) = query_arg(&params) else {
            anyhow::bail!("missing required string argument 'query'");
        };
        if let GateOutcome::Deny { reason } = self.check(&params) {
            return Ok(ToolResult::error(reason));
        }

        match self.store.execute(query, &Params::new()).await {
            Ok(rows) => Ok(ToolResult::text(serde_json::to_string(&rows)?)),
            Err(e) => Ok(ToolResult::error(format!("{}{}", QUERY_ERROR_PREFIX, e))),
        }
    }
}
