// ABOUTME: Model adapter boundary: the completion capability the orchestrator drives.
// ABOUTME: create_client builds the OpenAI-compatible HTTP adapter from config.

use std::sync::Arc;

use async_trait::async_trait;

use crate::agent::message::{AssistantReply, Message};
use crate::agent::openai::OpenAiCompatClient;
use crate::config::LlmConfig;
use crate::error::ModelError;
use crate::tools::ToolDefinition;

/// One completion: full ordered history in, one assistant reply out.
///
/// The model keeps no memory between calls, so implementations must send
/// every message they are given, in order.
#[async_trait]
pub trait ModelAdapter: Send + Sync {
    async fn complete(
        &self,
        messages: &[Message],
        tools: &[ToolDefinition],
    ) -> Result<AssistantReply, ModelError>;
}

/// Create the model adapter described by config.
pub fn create_client(config: &LlmConfig) -> Result<Arc<dyn ModelAdapter>, ModelError> {
    let api_key = resolve_api_key(&config.api_key_env, |key| std::env::var(key).ok())
        .ok_or_else(|| ModelError::MissingApiKey(config.api_key_env.join(", ")))?;
    let client = OpenAiCompatClient::new(config, api_key)?;
    Ok(Arc::new(client))
}

/// First non-empty value among the named environment variables.
fn resolve_api_key(names: &[String], lookup: impl Fn(&str) -> Option<String>) -> Option<String> {
    names
        .iter()
        .filter_map(|name| lookup(name))
        .find(|value| !value.trim().is_empty())
}
