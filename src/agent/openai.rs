// ABOUTME: OpenAI-compatible chat-completions adapter over reqwest.
// ABOUTME: Maps history and tool declarations to the wire format and decodes tool calls.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::agent::message::{AssistantReply, Message, ToolArguments, ToolInvocationRequest};
use crate::agent::provider::ModelAdapter;
use crate::config::LlmConfig;
use crate::error::ModelError;
use crate::tools::ToolDefinition;

/// Client for any endpoint speaking the `/chat/completions` protocol.
#[derive(Debug, Clone)]
pub struct OpenAiCompatClient {
    http: reqwest::Client,
    url: String,
    api_key: String,
    model: String,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    temperature: f32,
    messages: Vec<WireMessage>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<WireTool<'a>>,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
struct WireMessage {
    role: String,
    #[serde(default)]
    content: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    tool_calls: Vec<WireToolCall>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    tool_call_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
struct WireToolCall {
    id: String,
    #[serde(rename = "type", default = "function_type")]
    kind: String,
    function: WireFunctionCall,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
struct WireFunctionCall {
    name: String,
    /// JSON-encoded arguments object.
    #[serde(default)]
    arguments: String,
}

#[derive(Debug, Serialize)]
struct WireTool<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    function: WireFunction<'a>,
}

#[derive(Debug, Serialize)]
struct WireFunction<'a> {
    name: &'a str,
    description: &'a str,
    parameters: &'a Value,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: WireMessage,
}

fn function_type() -> String {
    "function".to_string()
}

fn to_wire(message: &Message) -> WireMessage {
    match message {
        Message::System { content } | Message::User { content } => WireMessage {
            role: message.role().to_string(),
            content: Some(content.clone()),
            tool_calls: Vec::new(),
            tool_call_id: None,
        },
        Message::Assistant { content, tool_calls } => WireMessage {
            role: "assistant".to_string(),
            content: if content.is_empty() && !tool_calls.is_empty() {
                None
            } else {
                Some(content.clone())
            },
            tool_calls: tool_calls
                .iter()
                .map(|call| WireToolCall {
                    id: call.id.clone(),
                    kind: function_type(),
                    function: WireFunctionCall {
                        name: call.tool_name.clone(),
                        arguments: Value::Object(call.arguments.clone()).to_string(),
                    },
                })
                .collect(),
            tool_call_id: None,
        },
        Message::Tool {
            tool_call_id,
            content,
        } => WireMessage {
            role: "tool".to_string(),
            content: Some(content.clone()),
            tool_calls: Vec::new(),
            tool_call_id: Some(tool_call_id.clone()),
        },
    }
}

/// Decode a tool call's JSON arguments string. Empty means no arguments.
fn parse_arguments(call: &WireToolCall) -> Result<ToolArguments, ModelError> {
    let raw = call.function.arguments.trim();
    if raw.is_empty() {
        return Ok(ToolArguments::new());
    }
    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(ModelError::Malformed(format!(
            "arguments for tool call '{}' are not an object: {}",
            call.id, other
        ))),
        Err(e) => Err(ModelError::Malformed(format!(
            "arguments for tool call '{}' are not valid JSON: {}",
            call.id, e
        ))),
    }
}

fn from_response(response: ChatResponse) -> Result<AssistantReply, ModelError> {
    let Some(choice) = response.choices.into_iter().next() else {
        return Err(ModelError::Malformed("response has no choices".to_string()));
    };
    let message = choice.message;
    let tool_calls = message
        .tool_calls
        .iter()
        .map(|call| -> Result<ToolInvocationRequest, ModelError> {
            Ok(ToolInvocationRequest::new(
                call.id.clone(),
                call.function.name.clone(),
                parse_arguments(call)?,
            ))
        })
        .collect::<Result<Vec<_>, _>>()?;
    let content = message.content.unwrap_or_default();
    if tool_calls.is_empty() && content.trim().is_empty() {
        return Err(ModelError::Malformed(
            "response has neither content nor tool calls".to_string(),
        ));
    }
    Ok(AssistantReply { content, tool_calls })
}

impl OpenAiCompatClient {
    pub fn new(config: &LlmConfig, api_key: String) -> Result<Self, ModelError> {
        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| ModelError::Transport(e.to_string()))?;
        Ok(Self {
            http,
            url: format!("{}/chat/completions", config.base_url.trim_end_matches('/')),
            api_key,
            model: config.model.clone(),
            temperature: config.temperature,
        })
    }

    fn build_request<'a>(
        &'a self,
        messages: &[Message],
        tools: &'a [ToolDefinition],
    ) -> ChatRequest<'a> {
        ChatRequest {
            model: &self.model,
            temperature: self.temperature,
            messages: messages.iter().map(to_wire).collect(),
            tools: tools
                .iter()
                .map(|t| WireTool {
                    kind: "function",
                    function: WireFunction {
                        name: &t.name,
                        description: &t.description,
                        parameters: &t.parameters,
                    },
                })
                .collect(),
        }
    }

    async fn send(&self, request: &ChatRequest<'_>) -> Result<AssistantReply, ModelError> {
        let response = self
            .http
            .post(&self.url)
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), "model API returned an error status");
            return Err(ModelError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: ChatResponse = response.json().await?;
        from_response(parsed)
    }
}

#[async_trait]
impl ModelAdapter for OpenAiCompatClient {
    async fn complete(
        &self,
        messages: &[Message],
        tools: &[ToolDefinition],
    ) -> Result<AssistantReply, ModelError> {
        let request = self.build_request(messages, tools);
        debug!(
            model = %self.model,
            messages = messages.len(),
            tools = tools.len(),
            "requesting completion"
        );
        self.send(&request).await
    }
}
