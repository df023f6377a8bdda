//! Consumer-facing messages

use serde::{Deserialize, Serialize};

/// Tone of a message shown to the end user
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageTone {
    #[default]
    Encouraging,
    Informative,
    Celebratory,
    Supportive,
}

impl MessageTone {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Encouraging => "encouraging",
            Self::Informative => "informative",
            Self::Celebratory => "celebratory",
            Self::Supportive => "supportive",
        }
    }
}

impl std::fmt::Display for MessageTone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Text that is allowed to reach the consumer, plus structured metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslatedMessage {
    pub message: String,
    pub tone: MessageTone,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub next_steps: Vec<String>,
    /// True iff the source payload was assessed high or critical
    pub needs_approval: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_time: Option<String>,
    pub confidence: f32,
    /// Set only when the message is the generic fallback
    #[serde(default)]
    pub warning: bool,
}

impl TranslatedMessage {
    pub fn has_next_steps(&self) -> bool {
        !self.next_steps.is_empty()
    }
}
