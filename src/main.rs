// ABOUTME: Entry point for auditgraph: the audit knowledge-graph assistant.
// ABOUTME: Parses CLI args, loads config and secrets, sets up logging, and runs a command.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use auditgraph::app::App;
use auditgraph::config::Config;

#[derive(Parser)]
#[command(name = "auditgraph", version, about = "Audit knowledge-graph assistant")]
struct Cli {
    /// Path to the config file (default: ~/.auditgraph/config.toml).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Ask the assistant one question.
    Ask {
        message: String,

        /// Override the maximum number of model calls.
        #[arg(long)]
        max_steps: Option<u32>,

        /// Print the full run outcome as JSON instead of the reply text.
        #[arg(long)]
        json: bool,
    },
    /// Print the tool declarations sent to the model.
    Tools,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    let _ = dotenvy::from_path(Config::secrets_env_path());

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("auditgraph=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };

    match cli.command {
        Command::Ask {
            message,
            max_steps,
            json,
        } => {
            if let Some(max_steps) = max_steps {
                config.agent.max_steps = max_steps;
            }
            let outcome = App::new(config).ask(&message).await?;
            if json {
                let report = serde_json::json!({
                    "response": outcome.response,
                    "status": outcome.status,
                    "steps": outcome.trace(),
                    "model_calls": outcome.model_calls,
                    "history": outcome.history,
                });
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!("{}", outcome.response);
            }
        }
        Command::Tools => {
            let defs = App::new(config).tool_definitions()?;
            println!("{}", serde_json::to_string_pretty(&defs)?);
        }
    }

    Ok(())
}
