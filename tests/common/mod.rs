// ABOUTME: Test doubles shared by the integration tests.
// ABOUTME: A scripted model adapter and an in-memory graph store that records queries.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{Value, json};
use tokio_util::sync::CancellationToken;

use auditgraph::agent::{
    AssistantReply, Message, ModelAdapter, ToolArguments, ToolInvocationRequest,
};
use auditgraph::error::{GraphError, ModelError};
use auditgraph::graph::{GraphStore, Params, Row};
use auditgraph::tools::ToolDefinition;

/// One scripted model step.
pub enum Step {
    Reply(AssistantReply),
    Fail(ModelError),
    Hang,
}

/// Plays back a script of replies and records every history it was shown.
pub struct ScriptedModel {
    script: Mutex<VecDeque<Step>>,
    pub seen: Mutex<Vec<Vec<Message>>>,
    pub tools_seen: Mutex<Vec<Vec<ToolDefinition>>>,
}

impl ScriptedModel {
    pub fn new(script: Vec<Step>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            seen: Mutex::new(Vec::new()),
            tools_seen: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.seen.lock().unwrap().len()
    }
}

#[async_trait]
impl ModelAdapter for ScriptedModel {
    async fn complete(
        &self,
        messages: &[Message],
        tools: &[ToolDefinition],
    ) -> Result<AssistantReply, ModelError> {
        self.seen.lock().unwrap().push(messages.to_vec());
        self.tools_seen.lock().unwrap().push(tools.to_vec());
        let step = self.script.lock().unwrap().pop_front();
        match step {
            Some(Step::Reply(reply)) => Ok(reply),
            Some(Step::Fail(e)) => Err(e),
            Some(Step::Hang) => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Err(ModelError::Transport("unreachable".into()))
            }
            None => Err(ModelError::Transport("script exhausted".into())),
        }
    }
}

/// A model that requests one graph query on every call, forever.
pub struct RelentlessModel {
    pub calls: Mutex<u32>,
}

impl RelentlessModel {
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(0),
        }
    }
}

#[async_trait]
impl ModelAdapter for RelentlessModel {
    async fn complete(
        &self,
        _messages: &[Message],
        _tools: &[ToolDefinition],
    ) -> Result<AssistantReply, ModelError> {
        let mut calls = self.calls.lock().unwrap();
        *calls += 1;
        Ok(AssistantReply::with_tool_calls(vec![query_call(
            &format!("call-{}", *calls),
            "MATCH (r:Risk) RETURN count(r)",
        )]))
    }
}

/// Requests a graph query and fires its token during the same call,
/// as a user pressing Ctrl-C while the model is thinking.
pub struct CancellingModel {
    pub token: CancellationToken,
    pub calls: Mutex<u32>,
}

impl CancellingModel {
    pub fn new(token: CancellationToken) -> Self {
        Self {
            token,
            calls: Mutex::new(0),
        }
    }
}

#[async_trait]
impl ModelAdapter for CancellingModel {
    async fn complete(
        &self,
        _messages: &[Message],
        _tools: &[ToolDefinition],
    ) -> Result<AssistantReply, ModelError> {
        *self.calls.lock().unwrap() += 1;
        self.token.cancel();
        Ok(AssistantReply::with_tool_calls(vec![query_call(
            "call-1",
            "MATCH (r:Risk) RETURN r.title",
        )]))
    }
}

/// Graph store returning fixed rows and recording every query it receives.
#[derive(Default)]
pub struct FakeStore {
    pub rows: Vec<Row>,
    pub fail_with: Option<String>,
    pub delay: Option<Duration>,
    pub queries: Mutex<Vec<String>>,
}

impl FakeStore {
    pub fn with_titles(titles: &[&str]) -> Self {
        let rows = titles
            .iter()
            .map(|t| {
                let mut row = Row::new();
                row.insert("r.title".into(), json!(t));
                row
            })
            .collect();
        Self {
            rows,
            ..Default::default()
        }
    }

    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl GraphStore for FakeStore {
    async fn execute(&self, query: &str, _params: &Params) -> Result<Vec<Row>, GraphError> {
        self.queries.lock().unwrap().push(query.to_string());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if let Some(msg) = &self.fail_with {
            return Err(GraphError::Connection(msg.clone()));
        }
        Ok(self.rows.clone())
    }
}

pub fn query_call(id: &str, query: &str) -> ToolInvocationRequest {
    let mut args = ToolArguments::new();
    args.insert("query".into(), Value::String(query.to_string()));
    ToolInvocationRequest::new(id, "query_graph", args)
}

pub fn tool_calls(calls: Vec<ToolInvocationRequest>) -> Step {
    Step::Reply(AssistantReply::with_tool_calls(calls))
}

pub fn answer(text: &str) -> Step {
    Step::Reply(AssistantReply::text(text))
}
