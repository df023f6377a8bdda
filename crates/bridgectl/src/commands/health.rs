use anyhow::Result;
use bridge_core::BridgeConfig;
use bridge_runtime::Mediator;
use serde_json::json;

use crate::output::{self, OutputFormat};

/// Validate the configuration and print a fresh mediator's health report
pub async fn execute(config: BridgeConfig, format: OutputFormat) -> Result<()> {
    let mediator = Mediator::from_config(config)?;
    let report = json!({
        "health": mediator.health(),
        "config": mediator.config(),
        "version": bridge_core::VERSION,
    });
    output::print(&report, format)
}
