use anyhow::Result;
use bridge_safety::SafetyFilter;
use serde_json::json;

use crate::output::{self, OutputFormat};

/// Print the risk assessment of a payload, optionally with its sanitized form
pub fn execute(payload: &str, sanitize: bool, format: OutputFormat) -> Result<()> {
    let payload = output::read_payload(payload)?;
    let filter = SafetyFilter::new();

    if sanitize {
        let sanitized = filter.sanitize(&payload);
        let report = json!({
            "assessment": sanitized.assessment,
            "sanitized": sanitized.payload,
            "residualRiskLevel": sanitized.residual,
            "warnings": sanitized.warnings,
        });
        output::print(&report, format)
    } else {
        output::print(&filter.assess(&payload), format)
    }
}
