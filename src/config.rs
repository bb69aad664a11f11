// ABOUTME: Configuration loading for auditgraph.
// ABOUTME: Reads ~/.auditgraph/config.toml (or an explicit path) and NEO4J_* env overrides.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

/// Top-level configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub llm: LlmConfig,
    pub graph: GraphConfig,
    pub agent: AgentConfig,
    pub session: SessionConfig,
}

/// OpenAI-compatible completion endpoint.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub base_url: String,
    pub model: String,
    pub temperature: f32,
    /// Environment variables checked in order for the API key.
    pub api_key_env: Vec<String>,
    pub timeout_seconds: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: "https://ark.cn-beijing.volces.com/api/v3".to_string(),
            model: "doubao-pro-32k".to_string(),
            temperature: 0.0,
            api_key_env: vec![
                "ARK_API_KEY".to_string(),
                "DOUBAO_API_KEY".to_string(),
                "OPENAI_API_KEY".to_string(),
            ],
            timeout_seconds: 60,
        }
    }
}

/// Neo4j HTTP endpoint.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GraphConfig {
    pub uri: String,
    pub database: String,
    pub username: String,
    pub password: String,
    pub timeout_seconds: u64,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            uri: "http://localhost:7474".to_string(),
            database: "neo4j".to_string(),
            username: "neo4j".to_string(),
            password: "password".to_string(),
            timeout_seconds: 30,
        }
    }
}

/// Orchestrator limits.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    /// Maximum model calls per run.
    pub max_steps: u32,
    pub tool_timeout_seconds: u64,
    /// Dispatch the tool calls of one turn concurrently.
    pub parallel_tool_calls: bool,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            max_steps: 10,
            tool_timeout_seconds: 30,
            parallel_tool_calls: false,
        }
    }
}

impl AgentConfig {
    pub fn tool_timeout(&self) -> Duration {
        Duration::from_secs(self.tool_timeout_seconds)
    }
}

/// Run transcript settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub transcripts: bool,
    pub dir: Option<PathBuf>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            transcripts: true,
            dir: None,
        }
    }
}

impl Config {
    /// Load config from ~/.auditgraph/config.toml, falling back to defaults,
    /// then apply environment overrides.
    pub fn load() -> anyhow::Result<Self> {
        Self::load_from(&Self::config_path())
    }

    /// Load config from an explicit path. A missing file yields defaults.
    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        let mut config = if path.exists() {
            let content = std::fs::read_to_string(path)?;
            toml::from_str(&content)?
        } else {
            Self::default()
        };
        config.apply_env_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Override graph connection settings from NEO4J_URI, NEO4J_USERNAME, NEO4J_PASSWORD.
    pub fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let set = |key: &str, slot: &mut String| {
            if let Some(value) = lookup(key).filter(|v| !v.is_empty()) {
                *slot = value;
            }
        };
        set("NEO4J_URI", &mut self.graph.uri);
        set("NEO4J_USERNAME", &mut self.graph.username);
        set("NEO4J_PASSWORD", &mut self.graph.password);
    }

    /// Base directory for user-level files.
    pub fn base_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".auditgraph")
    }

    /// Path to the config file.
    pub fn config_path() -> PathBuf {
        Self::base_dir().join("config.toml")
    }

    /// Path to the user-level secrets file loaded with dotenvy.
    pub fn secrets_env_path() -> PathBuf {
        Self::base_dir().join(".env")
    }

    /// Directory for run transcripts.
    pub fn transcripts_dir(&self) -> PathBuf {
        if let Some(dir) = &self.session.dir {
            return dir.clone();
        }
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("auditgraph")
            .join("runs")
    }
}
