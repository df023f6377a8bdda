//! Safety Filter - Combines risk classification and redaction for a payload
//!
//! The filter is the single entry point the store and translator use:
//! - `assess` scores a payload without changing it
//! - `sanitize` strips technical fields, softens wording, re-scores what is
//!   left, and explains every change as a human-readable warning

use bridge_core::{Payload, RiskAssessment, RiskLevel};
use serde_json::Value;
use tracing::debug;

use crate::classifier::RiskClassifier;
use crate::redactor::{Redaction, Redactor};

/// Result of sanitizing a payload
#[derive(Debug, Clone)]
pub struct SanitizedPayload {
    /// Assessment of the original payload
    pub assessment: RiskAssessment,
    /// Payload after stripping and redaction
    pub payload: Value,
    /// Risk level of the sanitized payload
    pub residual: RiskLevel,
    /// One entry per removal or change
    pub warnings: Vec<String>,
}

impl SanitizedPayload {
    pub fn changed(&self) -> bool {
        !self.warnings.is_empty()
    }
}

/// Classifier plus redactor
#[derive(Default)]
pub struct SafetyFilter {
    classifier: RiskClassifier,
    redactor: Redactor,
}

impl SafetyFilter {
    /// Create a filter with the built-in vocabulary
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a filter around a custom classifier
    pub fn with_classifier(classifier: RiskClassifier) -> Self {
        Self {
            classifier,
            redactor: Redactor::new(),
        }
    }

    pub fn classifier(&self) -> &RiskClassifier {
        &self.classifier
    }

    pub fn redactor(&self) -> &Redactor {
        &self.redactor
    }

    /// Score a payload without changing it
    pub fn assess(&self, payload: &Payload) -> RiskAssessment {
        self.classifier.assess(payload)
    }

    /// Soften technical wording in free text
    pub fn redact_text(&self, text: &str) -> Redaction {
        self.redactor.redact_text(text)
    }

    /// Strip technical fields, soften wording, and re-score
    pub fn sanitize(&self, payload: &Payload) -> SanitizedPayload {
        let assessment = self.classifier.assess(payload);
        let mut warnings = Vec::new();

        let sanitized = match payload {
            Payload::Text(text) => {
                let redaction = self.redactor.redact_text(text);
                if redaction.changed() {
                    warnings.push(format!(
                        "Softened technical wording: {}",
                        redaction.replaced.join(", ")
                    ));
                }
                Value::String(redaction.text)
            }
            Payload::Structured(value) => {
                let stripped = self.redactor.strip_fields(value);
                for field in &stripped.removed_fields {
                    warnings.push(format!("Removed technical field '{}'", field));
                }
                for field in &stripped.softened_fields {
                    warnings.push(format!("Softened technical wording in '{}'", field));
                }
                stripped.value
            }
        };

        let residual = self
            .classifier
            .assess(&Payload::from(sanitized.clone()))
            .risk_level;

        debug!(
            original = %assessment.risk_level,
            residual = %residual,
            changes = warnings.len(),
            "Sanitized payload"
        );

        SanitizedPayload {
            assessment,
            payload: sanitized,
            residual,
            warnings,
        }
    }
}
