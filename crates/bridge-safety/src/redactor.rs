//! Redaction - Soften technical text and strip technical fields
//!
//! Text redaction swaps technical vocabulary for soft, consumer-friendly
//! synonyms and masks credential-like values. Structured redaction removes
//! fields whose key is known to carry technical detail (stack traces, debug
//! blobs, secrets) and redacts every string that remains.

use regex::Regex;
use serde_json::{Map, Value};
use tracing::warn;

/// Object keys that always carry technical detail.
///
/// Compared after lower-casing and dropping `_` and `-`.
const TECHNICAL_KEYS: &[&str] = &[
    "stack",
    "stacktrace",
    "trace",
    "traceback",
    "debug",
    "debuginfo",
    "internal",
    "headers",
    "env",
    "environment",
    "config",
    "password",
    "secret",
    "token",
    "apikey",
    "credentials",
    "query",
    "sql",
];

/// Mask used for credential-like values
pub const MASK: &str = "[dolt]";

/// Whether an object key names a technical field
pub fn is_technical_key(key: &str) -> bool {
    let normalized: String = key
        .chars()
        .filter(|c| *c != '_' && *c != '-')
        .collect::<String>()
        .to_lowercase();
    TECHNICAL_KEYS.contains(&normalized.as_str())
}

/// Sorted dot-joined paths of every technical field in `value`.
///
/// Technical fields are not descended into.
pub fn technical_field_paths(value: &Value) -> Vec<String> {
    let mut paths = Vec::new();
    collect_technical_paths(value, "", &mut paths);
    paths.sort();
    paths
}

fn collect_technical_paths(value: &Value, prefix: &str, out: &mut Vec<String>) {
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                let path = join_path(prefix, key);
                if is_technical_key(key) {
                    out.push(path);
                } else {
                    collect_technical_paths(child, &path, out);
                }
            }
        }
        Value::Array(items) => {
            for (i, child) in items.iter().enumerate() {
                collect_technical_paths(child, &format!("{}[{}]", prefix, i), out);
            }
        }
        _ => {}
    }
}

fn join_path(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{}.{}", prefix, key)
    }
}

/// Output of a text redaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Redaction {
    pub text: String,
    /// Distinct lower-cased terms that were replaced, in replacement order
    pub replaced: Vec<String>,
}

impl Redaction {
    pub fn changed(&self) -> bool {
        !self.replaced.is_empty()
    }
}

/// Output of a structured redaction
#[derive(Debug, Clone, PartialEq)]
pub struct StrippedValue {
    pub value: Value,
    /// Paths of removed fields
    pub removed_fields: Vec<String>,
    /// Paths of string values whose text was softened
    pub softened_fields: Vec<String>,
    /// Distinct replaced terms across all strings
    pub replaced_terms: Vec<String>,
}

impl StrippedValue {
    pub fn changed(&self) -> bool {
        !self.removed_fields.is_empty() || !self.softened_fields.is_empty()
    }
}

/// Replacement table, applied in order (credentials first)
fn default_synonyms() -> Vec<(&'static str, &'static str)> {
    vec![
        // Credential values, then bare credential words
        (r"\b(?:pass(?:word|wd)|secret|api[_\- ]?key|token|authorization)\s*[:=]\s*\S+", MASK),
        (r"\bbearer\s+\S+", MASK),
        (r"\bsk-[a-z0-9_\-]{8,}", MASK),
        (r"\b(?:pass(?:word|wd)s?|secrets?|api[_\- ]?keys?|(?:access|refresh|auth|bearer)?[_\-]?tokens?|private[_\- ]?keys?|credentials?|authorization|bearer)\b", MASK),
        // Crash output
        (r"\bat\s+[\w$.<>]+\s*\([^)\s]*:\d+(?::\d+)?\)", ""),
        (r"[\w/\\.\-]+\.(?:rs|js|ts|py|java|go|rb):\d+(?::\d+)?", ""),
        (r"\bstack[_\- ]?traces?\b", "tekniska detaljer"),
        (r"\btraceback\b", "tekniska detaljer"),
        (r"\bpanicked at\b", "stannade vid"),
        (r"\b\w*(?:error|exception)s?\b", "ett litet hinder"),
        (r"\bfatal\b", "oväntat"),
        (r"\bcrash(?:ed|es)?\b", "stannade"),
        (r"\bsegfault\b", "stopp"),
        (r"\bundefined\b", "saknas"),
        (r"\bnull ?pointer\b", "saknad uppgift"),
        // Infrastructure
        (r"\bdatabas(?:e|es|en|er)?\b", "lagringen"),
        (r"\bdb\b", "lagringen"),
        (r"\b(?:my|postgre|no)?sql\b", "lagringen"),
        (r"\blocalhost\b", "den egna datorn"),
        (r"\b\d{1,3}(?:\.\d{1,3}){3}\b", "[adress]"),
        (r"\bserver[ns]?\b", "systemet"),
        (r"\bports?\b", "kopplingen"),
        (r"\b(?:docker|kubernetes|k8s)\b", "driftmiljön"),
        (r"\bconnections?\b", "kopplingen"),
        (r"\bendpoints?\b", "tjänsten"),
        (r"\bapi\b", "tjänsten"),
        (r"\bhost(?:name)?s?\b", "systemet"),
        // Protocol
        (r"https?://\S+", "[länk]"),
        (r"\b[45]\d{2}\s+(?:not found|bad request|unauthorized|forbidden|bad gateway|service unavailable)\b", "ett oväntat svar"),
        (r"\b(?:http|status|code)\s*[45]\d{2}\b", "ett svar"),
        (r"\bstatus ?codes?\b", "svaret"),
        (r"\bhttps?\b", "webben"),
        (r"\btime[ _\-]?outs?\b", "väntetiden"),
        (r"\btimed out\b", "tog för lång tid"),
        (r"\beconn(?:refused|reset)\b", "ingen kontakt"),
        (r"\bwebsockets?\b", "kopplingen"),
        (r"\bsettings\.(?:json|ya?ml|toml)\b", "inställningarna"),
        (r"\bjson\b", "data"),
        // Configuration
        (r"\benv(?:ironment)?[_ ]?var(?:iable)?s?\b", "inställningarna"),
        (r"\bconfig(?:uration)?s?\b", "inställningarna"),
        (r"\.env\b", "inställningarna"),
        (r"\bya?ml\b", "inställningarna"),
        // Process
        (r"\bslow(?:er|ly)?\b", "lite trögt"),
        (r"\blångsam(?:t|ma)?\b", "trögt"),
        (r"\bretr(?:y|ying|ies|ied)\b", "gör ett nytt försök"),
        (r"\bförsöker igen\b", "gör ett nytt försök"),
        (r"\bwaiting\b", "väntar"),
        (r"\bqueued?\b", "i kö"),
        (r"\bloading\b", "laddar"),
        (r"\bfail(?:ed|ure|ing)\b", "blev inte klart"),
    ]
}

/// Text and structure redactor
pub struct Redactor {
    rules: Vec<(Regex, &'static str)>,
    whitespace: Option<Regex>,
}

impl Redactor {
    pub fn new() -> Self {
        let rules = default_synonyms()
            .into_iter()
            .filter_map(|(pattern, replacement)| {
                match Regex::new(&format!("(?i){}", pattern)) {
                    Ok(re) => Some((re, replacement)),
                    Err(e) => {
                        warn!("Skipping invalid redaction pattern '{}': {}", pattern, e);
                        None
                    }
                }
            })
            .collect();

        Self {
            rules,
            whitespace: Regex::new(r"[ \t]{2,}").ok(),
        }
    }

    /// Replace technical vocabulary in free text
    pub fn redact_text(&self, text: &str) -> Redaction {
        let mut current = text.to_string();
        let mut replaced: Vec<String> = Vec::new();

        for (pattern, replacement) in &self.rules {
            if !pattern.is_match(&current) {
                continue;
            }
            for m in pattern.find_iter(&current) {
                let term = m.as_str().trim().to_lowercase();
                if !term.is_empty() && !replaced.contains(&term) {
                    replaced.push(term);
                }
            }
            current = pattern.replace_all(&current, *replacement).into_owned();
        }

        if let Some(ws) = &self.whitespace {
            current = ws.replace_all(&current, " ").into_owned();
        }

        Redaction {
            text: current.trim().to_string(),
            replaced,
        }
    }

    /// Remove technical fields and redact every remaining string
    pub fn strip_fields(&self, value: &Value) -> StrippedValue {
        let mut result = StrippedValue {
            value: Value::Null,
            removed_fields: Vec::new(),
            softened_fields: Vec::new(),
            replaced_terms: Vec::new(),
        };
        result.value = self.strip_inner(value, "", &mut result);
        result
    }

    fn strip_inner(&self, value: &Value, path: &str, acc: &mut StrippedValue) -> Value {
        match value {
            Value::Object(map) => {
                let mut out = Map::new();
                for (key, child) in map {
                    let child_path = join_path(path, key);
                    if is_technical_key(key) {
                        acc.removed_fields.push(child_path);
                        continue;
                    }
                    let stripped = self.strip_inner(child, &child_path, acc);
                    out.insert(key.clone(), stripped);
                }
                Value::Object(out)
            }
            Value::Array(items) => Value::Array(
                items
                    .iter()
                    .enumerate()
                    .map(|(i, child)| self.strip_inner(child, &format!("{}[{}]", path, i), acc))
                    .collect(),
            ),
            Value::String(text) => {
                let redaction = self.redact_text(text);
                if redaction.changed() {
                    acc.softened_fields.push(if path.is_empty() {
                        "$".to_string()
                    } else {
                        path.to_string()
                    });
                    for term in redaction.replaced {
                        if !acc.replaced_terms.contains(&term) {
                            acc.replaced_terms.push(term);
                        }
                    }
                }
                Value::String(redaction.text)
            }
            other => other.clone(),
        }
    }
}

impl Default for Redactor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{RiskCategory, RiskClassifier, RiskPatterns};
    use bridge_core::RiskLevel;
    use serde_json::json;

    #[test]
    fn test_soft_synonyms() {
        let redactor = Redactor::new();
        let out = redactor.redact_text("The database server is slow");
        assert_eq!(out.text, "The lagringen systemet is lite trögt");
        assert_eq!(out.replaced, vec!["database", "server", "slow"]);
    }

    #[test]
    fn test_credential_values_are_masked() {
        let redactor = Redactor::new();
        let out = redactor.redact_text("login with password=hunter2 and sk-abcdef123456");
        assert!(!out.text.contains("hunter2"));
        assert!(!out.text.contains("sk-abcdef"));
        assert!(out.text.contains(MASK));
    }

    #[test]
    fn test_redaction_lowers_risk() {
        let redactor = Redactor::new();
        let classifier = RiskClassifier::new();
        let text = "TypeError at handler (src/app.js:10:5) while calling the API on port 8080";
        assert!(classifier.assess_text(text).risk_level >= RiskLevel::High);

        let out = redactor.redact_text(text);
        assert_eq!(classifier.assess_text(&out.text).risk_level, RiskLevel::None);
    }

    /// One sample per default classifier pattern, in table order
    fn samples_per_pattern(category: RiskCategory) -> &'static [&'static str] {
        match category {
            RiskCategory::Credentials => &[
                "the password is wrong",
                "keep the secrets safe",
                "set the api key",
                "rotate the bearer_token",
                "send the bearer header",
                "lost the private key",
                "check your credentials",
                "missing authorization",
                "used sk-abcdef123456",
            ],
            RiskCategory::StackTrace => &[
                "see the stack trace",
                "Traceback follows",
                "Oops at main (app.js:10:5)",
                "thread panicked at here",
                "look in src/lib.rs:42",
            ],
            RiskCategory::InternalError => &[
                "got a TypeError",
                "fatal problem",
                "it crashed",
                "segfault today",
                "value is undefined",
                "a null pointer",
            ],
            RiskCategory::Infrastructure => &[
                "the server is down",
                "the database is full",
                "the db is full",
                "postgresql stopped",
                "running on localhost",
                "reachable at 10.0.0.1",
                "port is busy",
                "docker image",
                "kubernetes pod",
                "connection dropped",
                "endpoint moved",
                "the api is down",
                "hostname changed",
            ],
            RiskCategory::Protocol => &[
                "use https now",
                "the status code was odd",
                "got http 503",
                "Upload gave 404 not found",
                "a timeout happened",
                "request timed out",
                "ECONNREFUSED here",
                "websocket closed",
                "bad json payload",
            ],
            RiskCategory::Configuration => &[
                "check the config",
                "edit .env please",
                "set an env var",
                "edit the yaml",
                "open settings.toml",
            ],
            RiskCategory::Process => &[
                "it is slow",
                "will retry",
                "waiting here",
                "job queued",
                "still loading",
                "upload failed",
                "det går långsamt",
                "den försöker igen",
            ],
        }
    }

    fn default_patterns(category: RiskCategory) -> Vec<String> {
        let patterns = RiskPatterns::default();
        match category {
            RiskCategory::Credentials => patterns.credentials,
            RiskCategory::StackTrace => patterns.stack_trace,
            RiskCategory::InternalError => patterns.internal_error,
            RiskCategory::Infrastructure => patterns.infrastructure,
            RiskCategory::Protocol => patterns.protocol,
            RiskCategory::Configuration => patterns.configuration,
            RiskCategory::Process => patterns.process,
        }
    }

    #[test]
    fn test_every_classifier_pattern_is_redacted() {
        let redactor = Redactor::new();
        let classifier = RiskClassifier::new();

        for category in RiskCategory::ALL {
            let patterns = default_patterns(category);
            let samples = samples_per_pattern(category);
            assert_eq!(
                patterns.len(),
                samples.len(),
                "sample table out of date for {}",
                category
            );

            for (pattern, sample) in patterns.iter().zip(samples) {
                let re = Regex::new(&format!("(?i){}", pattern)).unwrap();
                assert!(re.is_match(sample), "'{}' does not hit {}", sample, pattern);

                let out = redactor.redact_text(sample);
                let residual = classifier.assess_text(&out.text);
                assert!(
                    residual.matched_terms.is_empty(),
                    "'{}' redacted to '{}' still matches {:?}",
                    sample,
                    out.text,
                    residual.matched_terms
                );
                assert_eq!(residual.risk_level, RiskLevel::None);
            }
        }
    }

    #[test]
    fn test_status_code_is_removed_with_reason() {
        let out = Redactor::new().redact_text("Upload gave 404 not found");
        assert_eq!(out.text, "Upload gave ett oväntat svar");

        let out = Redactor::new().redact_text("got http 503");
        assert!(!out.text.contains("503"));
    }

    #[test]
    fn test_plain_text_is_untouched() {
        let out = Redactor::new().redact_text("Knappen är nu blå");
        assert_eq!(out.text, "Knappen är nu blå");
        assert!(!out.changed());
    }

    #[test]
    fn test_strip_fields_removes_technical_keys() {
        let redactor = Redactor::new();
        let value = json!({
            "message": "Saved to database",
            "stackTrace": "at main (app.js:1:1)",
            "items": [{"debug_info": "x", "name": "logo"}]
        });

        let out = redactor.strip_fields(&value);
        assert_eq!(out.removed_fields, vec!["items[0].debug_info", "stackTrace"]);
        assert_eq!(out.softened_fields, vec!["message"]);
        assert_eq!(
            out.value,
            json!({"message": "Saved to lagringen", "items": [{"name": "logo"}]})
        );
        assert!(out.changed());
    }

    #[test]
    fn test_technical_key_normalization() {
        assert!(is_technical_key("stack_trace"));
        assert!(is_technical_key("API-Key"));
        assert!(is_technical_key("debugInfo"));
        assert!(!is_technical_key("message"));
    }
}
