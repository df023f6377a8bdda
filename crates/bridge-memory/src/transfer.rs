//! Context transfer between roles
//!
//! Only transfers addressed to the consumer are filtered. Every field removal
//! or wording change is reported as a warning, and a payload that is still
//! high or critical after filtering is replaced outright.

use bridge_core::{EntryKind, Payload, Priority, Role};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::store::{ContextStore, PutOptions};

/// Sent to the consumer in place of a payload that cannot be made safe
pub const NEUTRAL_TRANSFER_MESSAGE: &str = "Arbetet pågår. Mer information kommer snart.";

/// Outcome of [`ContextStore::transfer`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferResult {
    pub success: bool,
    pub payload: Value,
    #[serde(default)]
    pub warnings: Vec<String>,
    /// Id of the `state` entry recording this transfer
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entry_id: Option<String>,
}

impl TransferResult {
    pub fn filtered(&self) -> bool {
        !self.warnings.is_empty()
    }
}

impl ContextStore {
    /// Move a payload from one role to another, filtering on the way to the consumer
    pub fn transfer(
        &self,
        from: Role,
        to: Role,
        payload: &Payload,
        preserve_structure: bool,
    ) -> TransferResult {
        if payload.is_empty() {
            warn!(%from, %to, "Nothing to transfer");
            return TransferResult {
                success: false,
                payload: Value::Null,
                warnings: vec!["Empty payload, nothing transferred".to_string()],
                entry_id: None,
            };
        }

        let (data, warnings) = if to.is_consumer() {
            let sanitized = self.filter().sanitize(payload);
            let mut warnings = sanitized.warnings;
            if sanitized.residual.requires_approval() {
                warnings.push(format!(
                    "Replaced payload with a neutral message (residual risk {})",
                    sanitized.residual
                ));
                (Value::String(NEUTRAL_TRANSFER_MESSAGE.to_string()), warnings)
            } else {
                (sanitized.payload, warnings)
            }
        } else {
            (payload.to_value(), Vec::new())
        };

        let filtered = !warnings.is_empty();
        let result_payload = if preserve_structure {
            json!({
                "data": data,
                "provenance": {
                    "from": from,
                    "to": to,
                    "transferred_at": self.clock().now(),
                    "filtered": filtered,
                }
            })
        } else {
            data
        };

        let entry_id = self.put(
            Role::Bridge,
            EntryKind::State,
            result_payload.clone(),
            PutOptions::new()
                .priority(Priority::Low)
                .safe_for_consumer(to.is_consumer())
                .tag("transfer"),
        );

        debug!(%from, %to, filtered, warnings = warnings.len(), "Transferred context");
        TransferResult {
            success: true,
            payload: result_payload,
            warnings,
            entry_id: Some(entry_id),
        }
    }
}
