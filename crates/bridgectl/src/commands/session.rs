//! Interactive mediation over JSON lines
//!
//! One command per stdin line, one JSON result per stdout line:
//!
//! ```text
//! {"type": "request", "text": "Skapa en enkel app"}
//! {"type": "response", "sessionId": "…", "payload": {"message": "Klart"}}
//! {"type": "session", "sessionId": "…"}
//! {"type": "health"}
//! {"type": "cleanup"}
//! {"type": "reset_stats"}
//! ```
//!
//! Malformed lines produce an `{"error": …}` line; the loop keeps going
//! until stdin closes.

use anyhow::Result;
use bridge_core::{BridgeConfig, Payload};
use bridge_runtime::Mediator;
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{info, warn};

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum SessionCommand {
    Request {
        text: String,
        #[serde(default, rename = "sessionId")]
        session_id: Option<String>,
    },
    Response {
        payload: Value,
        #[serde(rename = "sessionId")]
        session_id: String,
    },
    Session {
        #[serde(rename = "sessionId")]
        session_id: String,
    },
    Health,
    Cleanup,
    ResetStats,
}

pub async fn execute(config: BridgeConfig) -> Result<()> {
    let mediator = Mediator::from_config(config)?;
    mediator.spawn_sweeper();
    info!("Interactive session started, reading JSON lines from stdin");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        let reply = match serde_json::from_str::<SessionCommand>(&line) {
            Ok(command) => dispatch(&mediator, command).await?,
            Err(e) => {
                warn!("Ignoring malformed command: {}", e);
                json!({"error": format!("Invalid command: {}", e)})
            }
        };
        stdout
            .write_all(format!("{}\n", serde_json::to_string(&reply)?).as_bytes())
            .await?;
        stdout.flush().await?;
    }

    mediator.shutdown().await;
    Ok(())
}

async fn dispatch(mediator: &Mediator, command: SessionCommand) -> Result<Value> {
    let reply = match command {
        SessionCommand::Request { text, session_id } => {
            serde_json::to_value(mediator.handle_user_request(&text, session_id.as_deref()).await)?
        }
        SessionCommand::Response {
            payload,
            session_id,
        } => serde_json::to_value(
            mediator
                .handle_producer_response(Payload::from(payload), &session_id)
                .await,
        )?,
        SessionCommand::Session { session_id } => match mediator.session(&session_id).await {
            Some(snapshot) => serde_json::to_value(snapshot)?,
            None => json!({"error": format!("Unknown session: {}", session_id)}),
        },
        SessionCommand::Health => serde_json::to_value(mediator.health())?,
        SessionCommand::Cleanup => serde_json::to_value(mediator.cleanup())?,
        SessionCommand::ResetStats => {
            mediator.reset_stats();
            json!({"reset": true})
        }
    };
    Ok(reply)
}
