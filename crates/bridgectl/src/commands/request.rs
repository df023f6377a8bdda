use anyhow::Result;
use bridge_core::BridgeConfig;
use bridge_runtime::Mediator;

use crate::output::{self, OutputFormat};

/// Classify a request and print the resulting task
pub async fn execute(
    config: BridgeConfig,
    text: &str,
    session: Option<&str>,
    format: OutputFormat,
) -> Result<()> {
    let mediator = Mediator::from_config(config)?;
    let outcome = mediator.handle_user_request(text, session).await;
    output::print(&outcome, format)
}
