// Tone Bridge Core - Context entries and thought traces
//
// Context entries are the audit/continuity records written on every mediation
// call. They are owned by the context store, replaced rather than edited, and
// gated per caller role through the `safe_for_consumer` flag.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Which side of the trust boundary a caller or record belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Technical backend; may see everything
    Producer,
    /// End-user surface; only sees safe records
    Consumer,
    /// The mediation layer itself
    Bridge,
}

impl Role {
    pub fn is_consumer(&self) -> bool {
        matches!(self, Self::Consumer)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Producer => write!(f, "producer"),
            Self::Consumer => write!(f, "consumer"),
            Self::Bridge => write!(f, "bridge"),
        }
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "producer" => Ok(Self::Producer),
            "consumer" => Ok(Self::Consumer),
            "bridge" => Ok(Self::Bridge),
            _ => Err(format!("Unknown role: {}", s)),
        }
    }
}

/// What a context entry records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    Thought,
    Memory,
    Decision,
    State,
    Error,
}

/// Retention priority; lower priorities are evicted first
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
    Critical,
}

/// One stored context record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContextEntry {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub owner_role: Role,
    pub kind: EntryKind,
    pub payload: serde_json::Value,
    pub priority: Priority,
    pub safe_for_consumer: bool,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub tags: BTreeSet<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
    /// Insertion order, breaks ties between identical timestamps
    #[serde(default)]
    pub sequence: u64,
}

impl ContextEntry {
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.map(|exp| exp <= now).unwrap_or(false)
    }

    /// Whether a caller with `role` may read this entry
    pub fn visible_to(&self, role: Role) -> bool {
        !role.is_consumer() || self.safe_for_consumer
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.contains(tag)
    }
}

/// One step of a multi-step reasoning trace
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThoughtStep {
    pub actor_role: Role,
    pub action: String,
    pub input: serde_json::Value,
    pub output: serde_json::Value,
    pub rationale: String,
    /// Always within [0, 1]
    pub confidence: f32,
    pub safe_for_consumer: bool,
    pub recorded_at: DateTime<Utc>,
}

impl ThoughtStep {
    pub fn new(actor_role: Role, action: impl Into<String>) -> Self {
        Self {
            actor_role,
            action: action.into(),
            input: serde_json::Value::Null,
            output: serde_json::Value::Null,
            rationale: String::new(),
            confidence: 1.0,
            safe_for_consumer: true,
            recorded_at: Utc::now(),
        }
    }

    pub fn with_input(mut self, input: serde_json::Value) -> Self {
        self.input = input;
        self
    }

    pub fn with_output(mut self, output: serde_json::Value) -> Self {
        self.output = output;
        self
    }

    pub fn with_rationale(mut self, rationale: impl Into<String>) -> Self {
        self.rationale = rationale.into();
        self
    }

    /// Clamped into [0, 1]; NaN becomes 0
    pub fn with_confidence(mut self, confidence: f32) -> Self {
        self.confidence = if confidence.is_nan() {
            0.0
        } else {
            confidence.clamp(0.0, 1.0)
        };
        self
    }

    pub fn safe_for_consumer(mut self, safe: bool) -> Self {
        self.safe_for_consumer = safe;
        self
    }
}

/// An ordered, append-only reasoning trace
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThoughtProcess {
    pub id: String,
    pub initiator_role: Role,
    pub purpose: String,
    pub input: serde_json::Value,
    pub started_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<serde_json::Value>,
    #[serde(default)]
    pub steps: Vec<ThoughtStep>,
}

impl ThoughtProcess {
    pub fn new(
        id: impl Into<String>,
        initiator_role: Role,
        input: serde_json::Value,
        purpose: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            initiator_role,
            purpose: purpose.into(),
            input,
            started_at: Utc::now(),
            completed_at: None,
            output: None,
            steps: Vec::new(),
        }
    }

    /// Append a step, stamping it with the capture time `at`
    pub fn push_step(&mut self, mut step: ThoughtStep, at: DateTime<Utc>) {
        step.recorded_at = at;
        self.steps.push(step);
    }

    pub fn is_complete(&self) -> bool {
        self.completed_at.is_some()
    }

    /// Completed traces older than `ttl` may be dropped by the sweep
    pub fn is_stale(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        self.completed_at.map(|done| done + ttl <= now).unwrap_or(false)
    }

    /// Copy of the trace with unsafe steps removed
    pub fn consumer_view(&self) -> Self {
        let mut view = self.clone();
        view.steps.retain(|s| s.safe_for_consumer);
        view
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn entry(safe: bool, expires_at: Option<DateTime<Utc>>) -> ContextEntry {
        ContextEntry {
            id: "ctx-1".to_string(),
            created_at: Utc::now(),
            owner_role: Role::Producer,
            kind: EntryKind::State,
            payload: json!({"status": "ok"}),
            priority: Priority::Medium,
            safe_for_consumer: safe,
            tags: BTreeSet::new(),
            session_id: None,
            expires_at,
            sequence: 0,
        }
    }

    #[test]
    fn test_visibility_by_role() {
        let unsafe_entry = entry(false, None);
        assert!(unsafe_entry.visible_to(Role::Producer));
        assert!(unsafe_entry.visible_to(Role::Bridge));
        assert!(!unsafe_entry.visible_to(Role::Consumer));
        assert!(entry(true, None).visible_to(Role::Consumer));
    }

    #[test]
    fn test_expiry() {
        let now = Utc::now();
        assert!(!entry(true, None).is_expired_at(now));
        assert!(entry(true, Some(now - Duration::seconds(1))).is_expired_at(now));
        assert!(!entry(true, Some(now + Duration::minutes(5))).is_expired_at(now));
    }

    #[test]
    fn test_priority_ordering() {
        let mut priorities = vec![Priority::High, Priority::Low, Priority::Critical, Priority::Medium];
        priorities.sort();
        assert_eq!(
            priorities,
            vec![Priority::Low, Priority::Medium, Priority::High, Priority::Critical]
        );
    }

    #[test]
    fn test_step_confidence_is_clamped() {
        assert_eq!(ThoughtStep::new(Role::Bridge, "a").with_confidence(1.7).confidence, 1.0);
        assert_eq!(ThoughtStep::new(Role::Bridge, "a").with_confidence(-0.2).confidence, 0.0);
        assert_eq!(ThoughtStep::new(Role::Bridge, "a").with_confidence(f32::NAN).confidence, 0.0);
    }

    #[test]
    fn test_consumer_view_hides_unsafe_steps() {
        let mut thought = ThoughtProcess::new("t-1", Role::Bridge, json!("input"), "test");
        let now = Utc::now();
        thought.push_step(ThoughtStep::new(Role::Producer, "raw").safe_for_consumer(false), now);
        thought.push_step(ThoughtStep::new(Role::Bridge, "summary"), now);

        let view = thought.consumer_view();
        assert_eq!(view.steps.len(), 1);
        assert_eq!(view.steps[0].action, "summary");
        assert_eq!(thought.steps.len(), 2);
    }

    #[test]
    fn test_role_parse() {
        assert_eq!("Consumer".parse::<Role>().unwrap(), Role::Consumer);
        assert!("admin".parse::<Role>().is_err());
    }
}
