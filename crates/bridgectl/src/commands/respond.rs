use anyhow::Result;
use bridge_core::BridgeConfig;
use bridge_runtime::Mediator;

use crate::output::{self, OutputFormat};

/// Translate one producer payload.
///
/// With `--request`, the request is handled first in the same session so the
/// message can carry a time estimate.
pub async fn execute(
    config: BridgeConfig,
    payload: &str,
    session: &str,
    request: Option<&str>,
    format: OutputFormat,
) -> Result<()> {
    let payload = output::read_payload(payload)?;
    let mediator = Mediator::from_config(config)?;

    if let Some(text) = request {
        mediator.handle_user_request(text, Some(session)).await;
    }
    let message = mediator.handle_producer_response(payload, session).await;
    output::print(&message, format)
}
