//! Risk Classification - Score payloads by the technical content they carry
//!
//! Scans text (or the serialized form of structured payloads) against an
//! ordered table of vocabulary categories:
//! - credentials: secrets and keys (critical)
//! - stack_trace / internal_error: crash output (high)
//! - infrastructure / protocol / configuration: system jargon (medium)
//! - process: soft progress vocabulary (low)
//!
//! Every category is checked. The assessment level is the highest level of
//! any matched category, so one credential hit outweighs any number of
//! low-level hits.

use std::collections::BTreeSet;

use bridge_core::{Payload, RiskAssessment, RiskLevel};
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::redactor::technical_field_paths;

/// Vocabulary category, in scan order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskCategory {
    Credentials,
    StackTrace,
    InternalError,
    Infrastructure,
    Protocol,
    Configuration,
    Process,
}

impl RiskCategory {
    /// All categories in table order
    pub const ALL: [RiskCategory; 7] = [
        Self::Credentials,
        Self::StackTrace,
        Self::InternalError,
        Self::Infrastructure,
        Self::Protocol,
        Self::Configuration,
        Self::Process,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Credentials => "credentials",
            Self::StackTrace => "stack_trace",
            Self::InternalError => "internal_error",
            Self::Infrastructure => "infrastructure",
            Self::Protocol => "protocol",
            Self::Configuration => "configuration",
            Self::Process => "process",
        }
    }

    /// Risk level implied by a hit in this category
    pub fn level(&self) -> RiskLevel {
        match self {
            Self::Credentials => RiskLevel::Critical,
            Self::StackTrace | Self::InternalError => RiskLevel::High,
            Self::Infrastructure | Self::Protocol | Self::Configuration => RiskLevel::Medium,
            Self::Process => RiskLevel::Low,
        }
    }
}

impl std::fmt::Display for RiskCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for RiskCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .find(|c| c.as_str() == s.to_lowercase())
            .copied()
            .ok_or_else(|| format!("Unknown risk category: {}", s))
    }
}

/// Pattern lists per category (regex syntax, matched case-insensitively)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskPatterns {
    #[serde(default)]
    pub credentials: Vec<String>,
    #[serde(default)]
    pub stack_trace: Vec<String>,
    #[serde(default)]
    pub internal_error: Vec<String>,
    #[serde(default)]
    pub infrastructure: Vec<String>,
    #[serde(default)]
    pub protocol: Vec<String>,
    #[serde(default)]
    pub configuration: Vec<String>,
    #[serde(default)]
    pub process: Vec<String>,
}

impl RiskPatterns {
    fn for_category(&self, category: RiskCategory) -> &[String] {
        match category {
            RiskCategory::Credentials => &self.credentials,
            RiskCategory::StackTrace => &self.stack_trace,
            RiskCategory::InternalError => &self.internal_error,
            RiskCategory::Infrastructure => &self.infrastructure,
            RiskCategory::Protocol => &self.protocol,
            RiskCategory::Configuration => &self.configuration,
            RiskCategory::Process => &self.process,
        }
    }
}

fn patterns(list: &[&str]) -> Vec<String> {
    list.iter().map(|p| p.to_string()).collect()
}

impl Default for RiskPatterns {
    fn default() -> Self {
        Self {
            credentials: patterns(&[
                r"\bpass(?:word|wd)s?\b",
                r"\bsecrets?\b",
                r"\bapi[_\- ]?keys?\b",
                r"\b(?:access|refresh|auth|bearer)?[_\-]?tokens?\b",
                r"\bbearer\b",
                r"\bprivate[_\- ]?keys?\b",
                r"\bcredentials?\b",
                r"\bauthorization\b",
                r"\bsk-[a-z0-9_\-]{8,}",
            ]),
            stack_trace: patterns(&[
                r"\bstack[_\- ]?traces?\b",
                r"\btraceback\b",
                r"\bat\s+[\w$.<>]+\s*\([^)\s]*:\d+(?::\d+)?\)",
                r"\bpanicked at\b",
                r"[\w/\\.\-]+\.(?:rs|js|ts|py|java|go|rb):\d+",
            ]),
            internal_error: patterns(&[
                r"\b\w*(?:error|exception)s?\b",
                r"\bfatal\b",
                r"\bcrash(?:ed|es)?\b",
                r"\bsegfault\b",
                r"\bundefined\b",
                r"\bnull ?pointer\b",
            ]),
            infrastructure: patterns(&[
                r"\bserver[ns]?\b",
                r"\bdatabas(?:e|es|en|er)?\b",
                r"\bdb\b",
                r"\b(?:my|postgre|no)?sql\b",
                r"\blocalhost\b",
                r"\b\d{1,3}(?:\.\d{1,3}){3}\b",
                r"\bports?\b",
                r"\bdocker\b",
                r"\b(?:kubernetes|k8s)\b",
                r"\bconnections?\b",
                r"\bendpoints?\b",
                r"\bapi\b",
                r"\bhost(?:name)?s?\b",
            ]),
            protocol: patterns(&[
                r"\bhttps?\b",
                r"\bstatus ?codes?\b",
                r"\b(?:http|status|code)\s*[45]\d{2}\b",
                r"\b[45]\d{2}\s+(?:not found|bad request|unauthorized|forbidden|bad gateway|service unavailable)\b",
                r"\btime[ _\-]?outs?\b",
                r"\btimed out\b",
                r"\beconn(?:refused|reset)\b",
                r"\bwebsockets?\b",
                r"\bjson\b",
            ]),
            configuration: patterns(&[
                r"\bconfig(?:uration)?s?\b",
                r"(?:^|[^\w])\.env\b",
                r"\benv(?:ironment)?[_ ]?var(?:iable)?s?\b",
                r"\bya?ml\b",
                r"\bsettings\.(?:json|ya?ml|toml)\b",
            ]),
            process: patterns(&[
                r"\bslow(?:er|ly)?\b",
                r"\bretr(?:y|ying|ies|ied)\b",
                r"\bwaiting\b",
                r"\bqueued?\b",
                r"\bloading\b",
                r"\bfail(?:ed|ure|ing)\b",
                r"\blångsam(?:t|ma)?\b",
                r"\bförsöker igen\b",
            ]),
        }
    }
}

struct CompiledRule {
    category: RiskCategory,
    patterns: Vec<Regex>,
}

/// Risk classifier that scores payloads for technical content
pub struct RiskClassifier {
    /// Rules in table order
    rules: Vec<CompiledRule>,
}

impl RiskClassifier {
    /// Create a classifier with the built-in vocabulary
    pub fn new() -> Self {
        Self::with_patterns(RiskPatterns::default())
    }

    /// Create a classifier with custom vocabulary
    pub fn with_patterns(patterns: RiskPatterns) -> Self {
        let rules = RiskCategory::ALL
            .iter()
            .map(|category| CompiledRule {
                category: *category,
                patterns: Self::compile_patterns(*category, patterns.for_category(*category)),
            })
            .collect();
        Self { rules }
    }

    /// Load vocabulary from YAML (missing categories are empty)
    pub fn from_yaml_str(yaml: &str) -> Result<Self, serde_yaml::Error> {
        let patterns: RiskPatterns = serde_yaml::from_str(yaml)?;
        Ok(Self::with_patterns(patterns))
    }

    /// Assess any payload. Never fails.
    pub fn assess(&self, payload: &Payload) -> RiskAssessment {
        let mut assessment = self.assess_text(&payload.scan_text());
        if let Payload::Structured(value) = payload {
            assessment.redacted_fields = technical_field_paths(value);
        }

        debug!(
            level = %assessment.risk_level,
            categories = ?assessment.matched_categories,
            "Assessed payload"
        );
        assessment
    }

    /// Assess raw text
    pub fn assess_text(&self, text: &str) -> RiskAssessment {
        let mut risk_level = RiskLevel::None;
        let mut matched_categories = BTreeSet::new();
        let mut matched_terms: Vec<String> = Vec::new();

        for rule in &self.rules {
            for pattern in &rule.patterns {
                for m in pattern.find_iter(text) {
                    matched_categories.insert(rule.category.as_str().to_string());
                    risk_level = risk_level.max(rule.category.level());

                    let term = m
                        .as_str()
                        .trim_matches(|c: char| !c.is_alphanumeric())
                        .to_lowercase();
                    if !term.is_empty() && !matched_terms.contains(&term) {
                        matched_terms.push(term);
                    }
                }
            }
        }

        RiskAssessment {
            risk_level,
            matched_categories,
            redacted_fields: Vec::new(),
            matched_terms,
        }
    }

    /// Compile regex patterns case-insensitively, skipping invalid ones
    fn compile_patterns(category: RiskCategory, patterns: &[String]) -> Vec<Regex> {
        patterns
            .iter()
            .filter_map(|p| match Regex::new(&format!("(?i){}", p)) {
                Ok(re) => Some(re),
                Err(e) => {
                    warn!("Skipping invalid {} pattern '{}': {}", category, p, e);
                    None
                }
            })
            .collect()
    }
}

impl Default for RiskClassifier {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn level_of(text: &str) -> RiskLevel {
        RiskClassifier::new().assess_text(text).risk_level
    }

    #[test]
    fn test_no_match_is_none() {
        let result = RiskClassifier::new().assess_text("Din sida har fått en ny färg");
        assert_eq!(result.risk_level, RiskLevel::None);
        assert!(result.matched_categories.is_empty());
        assert!(result.matched_terms.is_empty());
    }

    #[test]
    fn test_levels_by_category() {
        assert_eq!(level_of("the password is hunter2"), RiskLevel::Critical);
        assert_eq!(level_of("Traceback (most recent call last)"), RiskLevel::High);
        assert_eq!(level_of("TypeError: x is not a function"), RiskLevel::High);
        assert_eq!(level_of("restarting the server"), RiskLevel::Medium);
        assert_eq!(level_of("request timed out"), RiskLevel::Medium);
        assert_eq!(level_of("reading settings.yaml"), RiskLevel::Medium);
        assert_eq!(level_of("it is a bit slow today"), RiskLevel::Low);
    }

    #[test]
    fn test_priority_beats_count() {
        // Many medium/low hits, one credential hit
        let text = "server database port slow retry waiting api_key";
        let result = RiskClassifier::new().assess_text(text);
        assert_eq!(result.risk_level, RiskLevel::Critical);
        assert!(result.matched_categories.contains("infrastructure"));
        assert!(result.matched_categories.contains("process"));
        assert!(result.matched_categories.contains("credentials"));
    }

    #[test]
    fn test_structured_payload_scans_nested_values() {
        let payload = Payload::from(json!({
            "result": {"details": {"note": "connection to localhost refused"}}
        }));
        let result = RiskClassifier::new().assess(&payload);
        assert_eq!(result.risk_level, RiskLevel::Medium);
        assert!(result.matched_terms.contains(&"localhost".to_string()));
    }

    #[test]
    fn test_redacted_fields_lists_technical_keys() {
        let payload = Payload::from(json!({
            "error": "DB connection failed",
            "stackTrace": "at main (app.js:10:5)",
            "meta": {"debug": {"x": 1}}
        }));
        let result = RiskClassifier::new().assess(&payload);
        assert!(result.risk_level >= RiskLevel::High);
        assert_eq!(result.redacted_fields, vec!["meta.debug", "stackTrace"]);
    }

    #[test]
    fn test_deterministic() {
        let classifier = RiskClassifier::new();
        let payload = Payload::from(json!({"msg": "retry http 503 on server", "token": "abc"}));
        assert_eq!(classifier.assess(&payload), classifier.assess(&payload));
    }

    #[test]
    fn test_json_literals_are_not_vocabulary() {
        let payload = Payload::from(json!({"done": true, "extra": null, "count": 3}));
        assert_eq!(RiskClassifier::new().assess(&payload).risk_level, RiskLevel::None);
    }

    #[test]
    fn test_custom_patterns_from_yaml() {
        let classifier = RiskClassifier::from_yaml_str("process:\n  - \\bhmm\\b\n").unwrap();
        assert_eq!(classifier.assess_text("hmm").risk_level, RiskLevel::Low);
        assert_eq!(classifier.assess_text("password").risk_level, RiskLevel::None);
    }

    #[test]
    fn test_invalid_pattern_is_skipped() {
        let mut patterns = RiskPatterns::default();
        patterns.process.push("(unclosed".to_string());
        let classifier = RiskClassifier::with_patterns(patterns);
        assert_eq!(classifier.assess_text("slow").risk_level, RiskLevel::Low);
    }

    #[test]
    fn test_category_parse() {
        assert_eq!("stack_trace".parse::<RiskCategory>().unwrap(), RiskCategory::StackTrace);
        assert!("weather".parse::<RiskCategory>().is_err());
    }
}
