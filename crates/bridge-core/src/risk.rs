//! Risk model - how much technical or sensitive content a payload carries

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt::Debug;

/// Coarse ordinal risk classification.
///
/// Ordering matters: `None < Low < Medium < High < Critical`. The level of an
/// assessment is the highest level of any matched category.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    #[default]
    None,
    Low,
    Medium,
    High,
    Critical,
}

impl RiskLevel {
    /// High and critical payloads must never be echoed to the consumer
    pub fn requires_approval(&self) -> bool {
        matches!(self, Self::High | Self::Critical)
    }

    /// Anything above `None` counts as detected risk
    pub fn is_detected(&self) -> bool {
        !matches!(self, Self::None)
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::None => write!(f, "none"),
            Self::Low => write!(f, "low"),
            Self::Medium => write!(f, "medium"),
            Self::High => write!(f, "high"),
            Self::Critical => write!(f, "critical"),
        }
    }
}

impl std::str::FromStr for RiskLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "none" => Ok(Self::None),
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            "critical" => Ok(Self::Critical),
            _ => Err(format!("Unknown risk level: {}", s)),
        }
    }
}

/// Result of scanning one payload
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskAssessment {
    pub risk_level: RiskLevel,

    /// Categories with at least one hit
    #[serde(default)]
    pub matched_categories: BTreeSet<String>,

    /// Dot-joined paths of structured fields that carry technical detail
    #[serde(default)]
    pub redacted_fields: Vec<String>,

    /// Distinct lower-cased vocabulary hits, in scan order
    #[serde(default)]
    pub matched_terms: Vec<String>,
}

impl RiskAssessment {
    pub fn needs_approval(&self) -> bool {
        self.risk_level.requires_approval()
    }
}

/// A payload crossing the trust boundary.
///
/// Producer output is either free text or arbitrary JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Payload {
    Text(String),
    Structured(serde_json::Value),
}

impl Payload {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    /// Build a payload from any serializable value.
    ///
    /// Values that fail to serialize are coerced to their `Debug` text so a
    /// payload can always be assessed.
    pub fn from_serializable<T: Serialize + Debug>(value: &T) -> Self {
        match serde_json::to_value(value) {
            Ok(v) => Self::from(v),
            Err(e) => {
                tracing::debug!("Payload serialization failed, using string coercion: {}", e);
                Self::Text(format!("{:?}", value))
            }
        }
    }

    /// Flattened text used for vocabulary scanning (keys and nested values included)
    pub fn scan_text(&self) -> String {
        match self {
            Self::Text(t) => t.clone(),
            Self::Structured(v) => serde_json::to_string(v).unwrap_or_else(|_| v.to_string()),
        }
    }

    /// JSON view of the payload
    pub fn to_value(&self) -> serde_json::Value {
        match self {
            Self::Text(t) => serde_json::Value::String(t.clone()),
            Self::Structured(v) => v.clone(),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Self::Text(t) => t.trim().is_empty(),
            Self::Structured(v) => v.is_null(),
        }
    }
}

impl From<serde_json::Value> for Payload {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::String(s) => Self::Text(s),
            other => Self::Structured(other),
        }
    }
}

impl From<&str> for Payload {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<String> for Payload {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}
