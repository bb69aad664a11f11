// ABOUTME: App wiring: builds the graph store, tool registry, model adapter, and orchestrator.
// ABOUTME: Also hosts the CLI commands: one-shot `ask` and `tools` listing.

use std::sync::Arc;

use tracing::{info, warn};

use crate::agent::{self, Orchestrator, OrchestratorConfig, RunOutcome};
use crate::config::Config;
use crate::graph::{GraphStore, Neo4jHttpStore};
use crate::prompt::SystemPromptBuilder;
use crate::session::write_transcript;
use crate::tools::{QueryGraphTool, ToolDefinition, ToolRegistry};

/// Top-level application that owns configuration and builds subsystems.
pub struct App {
    config: Config,
}

impl App {
    /// Create a new app with the given configuration.
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Build the registry with every tool the assistant may call.
    pub fn build_registry(store: Arc<dyn GraphStore>) -> ToolRegistry {
        ToolRegistry::new().register(QueryGraphTool::new(store))
    }

    /// Wire an orchestrator against the configured Neo4j and model endpoints.
    pub fn build_orchestrator(&self) -> anyhow::Result<Orchestrator> {
        let store: Arc<dyn GraphStore> = Arc::new(Neo4jHttpStore::new(&self.config.graph)?);
        let model = agent::create_client(&self.config.llm)?;
        let system_prompt = SystemPromptBuilder::new()
            .load_overrides()
            .load_local()
            .build();

        let orchestrator = Orchestrator::new(
            model,
            Self::build_registry(store),
            system_prompt,
            OrchestratorConfig::from_config(&self.config),
        );
        info!(
            model = %self.config.llm.model,
            max_steps = orchestrator.config().max_steps,
            tools = ?orchestrator.registry().names(),
            "orchestrator ready"
        );
        Ok(orchestrator)
    }

    /// Run one conversation and record its transcript.
    pub async fn ask(&self, message: &str) -> anyhow::Result<RunOutcome> {
        let orchestrator = self.build_orchestrator()?;

        let cancel = tokio_util::sync::CancellationToken::new();
        let ctrl_c = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                ctrl_c.cancel();
            }
        });

        let outcome = orchestrator.execute_with_cancel(message, &cancel).await?;
        orchestrator.shutdown();

        if self.config.session.transcripts {
            match write_transcript(&self.config.transcripts_dir(), &outcome) {
                Ok(path) => info!(path = %path.display(), "wrote run transcript"),
                Err(e) => warn!(error = %e, "failed to write run transcript"),
            }
        }
        Ok(outcome)
    }

    /// Declarations of the registered tools, without connecting anywhere.
    pub fn tool_definitions(&self) -> anyhow::Result<Vec<ToolDefinition>> {
        let store: Arc<dyn GraphStore> = Arc::new(Neo4jHttpStore::new(&self.config.graph)?);
        Ok(Self::build_registry(store).definitions())
    }
}
