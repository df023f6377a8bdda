use std::path::PathBuf;

use anyhow::Context as _;
use bridge_core::BridgeConfig;
use clap::{Parser, Subcommand};

use crate::commands;
use crate::output::OutputFormat;

/// Tone Bridge CLI - mediate between a technical producer and an end user
#[derive(Parser, Debug)]
#[command(name = "bridgectl")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Configuration file (YAML)
    #[arg(long, short = 'c', global = true, env = "BRIDGE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(long, short = 'o', global = true, value_enum, default_value = "json")]
    pub output: OutputFormat,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Turn an end-user request into a task specification
    Request {
        /// Request text
        text: String,

        /// Continue an existing session
        #[arg(long, short)]
        session: Option<String>,
    },

    /// Translate a producer payload into a consumer-safe message
    Respond {
        /// Payload as JSON or plain text ("-" reads stdin)
        payload: String,

        /// Session the response belongs to
        #[arg(long, short, default_value = "cli")]
        session: String,

        /// Request that led to this response, for time estimates
        #[arg(long, short)]
        request: Option<String>,
    },

    /// Score a payload for technical content
    Assess {
        /// Payload as JSON or plain text ("-" reads stdin)
        payload: String,

        /// Also show the sanitized payload and every change made
        #[arg(long)]
        sanitize: bool,
    },

    /// Classify request text (intent, complexity, tone)
    Classify {
        /// Request text
        text: String,
    },

    /// Interactive mediation over JSON lines on stdin/stdout
    Session,

    /// Show health counters and the effective configuration
    Health,

    /// Generate shell completions
    Completion {
        /// Shell to generate completion for
        #[arg(value_enum)]
        shell: commands::completion::Shell,
    },
}

impl Cli {
    pub async fn execute(self) -> anyhow::Result<()> {
        let config = load_config(self.config.as_deref())?;
        let output = self.output;

        match self.command {
            Commands::Request { text, session } => {
                commands::request::execute(config, &text, session.as_deref(), output).await
            }
            Commands::Respond {
                payload,
                session,
                request,
            } => {
                commands::respond::execute(config, &payload, &session, request.as_deref(), output)
                    .await
            }
            Commands::Assess { payload, sanitize } => {
                commands::assess::execute(&payload, sanitize, output)
            }
            Commands::Classify { text } => commands::classify::execute(&text, output),
            Commands::Session => commands::session::execute(config).await,
            Commands::Health => commands::health::execute(config, output).await,
            Commands::Completion { shell } => commands::completion::execute(shell),
        }
    }
}

fn load_config(path: Option<&std::path::Path>) -> anyhow::Result<BridgeConfig> {
    match path {
        Some(path) => BridgeConfig::from_yaml_file(path)
            .with_context(|| format!("Failed to load config from {}", path.display())),
        None => Ok(BridgeConfig::default()),
    }
}
