//! End-user requests and the task specifications derived from them

use serde::{Deserialize, Serialize};

/// What the end user is asking for.
///
/// `Unknown` is the default when no intent pattern matches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    CreateApp,
    CreateWebsite,
    CreateGame,
    FixProblem,
    ImproveDesign,
    AddFeature,
    Explain,
    Deploy,
    CreateGeneric,
    Help,
    #[default]
    Unknown,
}

impl Intent {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CreateApp => "create_app",
            Self::CreateWebsite => "create_website",
            Self::CreateGame => "create_game",
            Self::FixProblem => "fix_problem",
            Self::ImproveDesign => "improve_design",
            Self::AddFeature => "add_feature",
            Self::Explain => "explain",
            Self::Deploy => "deploy",
            Self::CreateGeneric => "create_generic",
            Self::Help => "help",
            Self::Unknown => "unknown",
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, Self::Unknown)
    }
}

impl std::fmt::Display for Intent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Intent {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "create_app" => Ok(Self::CreateApp),
            "create_website" => Ok(Self::CreateWebsite),
            "create_game" => Ok(Self::CreateGame),
            "fix_problem" => Ok(Self::FixProblem),
            "improve_design" => Ok(Self::ImproveDesign),
            "add_feature" => Ok(Self::AddFeature),
            "explain" => Ok(Self::Explain),
            "deploy" => Ok(Self::Deploy),
            "create_generic" => Ok(Self::CreateGeneric),
            "help" => Ok(Self::Help),
            "unknown" => Ok(Self::Unknown),
            _ => Err(format!("Unknown intent: {}", s)),
        }
    }
}

/// Estimated task complexity; ordered so the highest match can win
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Complexity {
    #[default]
    Low,
    Medium,
    High,
}

impl Complexity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl std::fmt::Display for Complexity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Emotional tone detected in the user's wording
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmotionalTone {
    #[default]
    Neutral,
    Excited,
    Concerned,
    Frustrated,
}

impl EmotionalTone {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Neutral => "neutral",
            Self::Excited => "excited",
            Self::Concerned => "concerned",
            Self::Frustrated => "frustrated",
        }
    }
}

impl std::fmt::Display for EmotionalTone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An end-user request after classification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassifiedRequest {
    pub original_text: String,
    #[serde(default)]
    pub intent: Intent,
    #[serde(default)]
    pub complexity: Complexity,
    #[serde(default)]
    pub emotional_tone: EmotionalTone,
    /// Context entry this request follows up on, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prior_context_id: Option<String>,
}

impl ClassifiedRequest {
    /// A request with every classification at its default
    pub fn unclassified(text: impl Into<String>) -> Self {
        Self {
            original_text: text.into(),
            intent: Intent::Unknown,
            complexity: Complexity::Low,
            emotional_tone: EmotionalTone::Neutral,
            prior_context_id: None,
        }
    }
}

/// Internal task handed to the producer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskSpecification {
    pub title: String,
    pub description: String,
    pub requirements: Vec<String>,
    pub estimated_minutes: u32,
    /// Human-readable duration, e.g. "cirka 2 timmar"
    pub estimated_duration: String,
    pub confidence: f32,
    pub intent: Intent,
    pub complexity: Complexity,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_never_null() {
        let req = ClassifiedRequest::unclassified("");
        assert_eq!(req.intent, Intent::Unknown);
        assert_eq!(req.complexity, Complexity::Low);
        assert_eq!(req.emotional_tone, EmotionalTone::Neutral);
    }

    #[test]
    fn test_intent_roundtrip_names() {
        for intent in [Intent::CreateApp, Intent::FixProblem, Intent::Unknown] {
            let parsed: Intent = intent.as_str().parse().unwrap();
            assert_eq!(parsed, intent);
        }
        assert!("make_coffee".parse::<Intent>().is_err());
    }

    #[test]
    fn test_intent_serializes_as_tag() {
        let json = serde_json::to_string(&Intent::CreateApp).unwrap();
        assert_eq!(json, "\"create_app\"");
    }

    #[test]
    fn test_complexity_ordering() {
        assert!(Complexity::High > Complexity::Medium);
        assert!(Complexity::Medium > Complexity::Low);
    }
}
