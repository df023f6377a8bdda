//! Session lifecycle
//!
//! `New → Active → Idle → Expired`, driven by inactivity:
//! - a session with no recorded call is `New`
//! - `Idle` after `idle_timeout` without a call, re-activated by the next call
//! - `Expired` after `session_ttl` without a call; terminal, the next call
//!   under the same id starts a fresh session
//!
//! Inactivity is measured on the tokio clock so it can be paused in tests.

use std::time::Duration;

use bridge_core::{ClassifiedRequest, Intent, SessionConfig};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionState {
    New,
    Active,
    Idle,
    Expired,
}

impl SessionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::New => "new",
            Self::Active => "active",
            Self::Idle => "idle",
            Self::Expired => "expired",
        }
    }
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Inactivity thresholds on the tokio clock
#[derive(Debug, Clone, Copy)]
pub(crate) struct SessionTimeouts {
    idle: Duration,
    ttl: Duration,
}

impl From<&SessionConfig> for SessionTimeouts {
    fn from(config: &SessionConfig) -> Self {
        Self {
            idle: Duration::from_secs(config.idle_timeout_minutes.saturating_mul(60)),
            ttl: Duration::from_secs(config.session_ttl_minutes.saturating_mul(60)),
        }
    }
}

#[derive(Debug)]
pub(crate) struct Session {
    pub id: String,
    pub state: SessionState,
    pub thought_id: String,
    pub created_at: DateTime<Utc>,
    pub last_activity: DateTime<Utc>,
    last_seen: Instant,
    pub last_request: Option<ClassifiedRequest>,
    pub last_entry_id: Option<String>,
    pub request_count: u64,
    pub response_count: u64,
}

impl Session {
    pub fn new(id: impl Into<String>, thought_id: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            state: SessionState::New,
            thought_id: thought_id.into(),
            created_at: now,
            last_activity: now,
            last_seen: Instant::now(),
            last_request: None,
            last_entry_id: None,
            request_count: 0,
            response_count: 0,
        }
    }

    /// State implied by inactivity, without changing anything
    pub fn state_at(&self, now: Instant, timeouts: SessionTimeouts) -> SessionState {
        if self.state == SessionState::Expired {
            return SessionState::Expired;
        }
        let inactive = now.saturating_duration_since(self.last_seen);
        if inactive >= timeouts.ttl {
            SessionState::Expired
        } else if inactive >= timeouts.idle {
            SessionState::Idle
        } else if self.request_count + self.response_count == 0 {
            SessionState::New
        } else {
            SessionState::Active
        }
    }

    pub fn refresh(&mut self, now: Instant, timeouts: SessionTimeouts) -> SessionState {
        self.state = self.state_at(now, timeouts);
        self.state
    }

    fn touch(&mut self, entry_id: String) {
        self.state = SessionState::Active;
        self.last_seen = Instant::now();
        self.last_activity = Utc::now();
        self.last_entry_id = Some(entry_id);
    }

    pub fn record_request(&mut self, request: ClassifiedRequest, entry_id: String) {
        self.request_count += 1;
        self.last_request = Some(request);
        self.touch(entry_id);
    }

    pub fn record_response(&mut self, entry_id: String) {
        self.response_count += 1;
        self.touch(entry_id);
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            id: self.id.clone(),
            state: self.state,
            thought_id: self.thought_id.clone(),
            created_at: self.created_at,
            last_activity: self.last_activity,
            request_count: self.request_count,
            response_count: self.response_count,
            last_intent: self.last_request.as_ref().map(|r| r.intent),
        }
    }
}

/// Read-only view of a session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub id: String,
    pub state: SessionState,
    pub thought_id: String,
    pub created_at: DateTime<Utc>,
    pub last_activity: DateTime<Utc>,
    pub request_count: u64,
    pub response_count: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_intent: Option<Intent>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn timeouts() -> SessionTimeouts {
        SessionTimeouts::from(&SessionConfig {
            idle_timeout_minutes: 15,
            session_ttl_minutes: 120,
        })
    }

    #[tokio::test(start_paused = true)]
    async fn test_lifecycle_transitions() {
        let mut session = Session::new("s1", "thought-1");
        assert_eq!(session.refresh(Instant::now(), timeouts()), SessionState::New);

        session.record_response("ctx-1".to_string());
        assert_eq!(session.refresh(Instant::now(), timeouts()), SessionState::Active);

        tokio::time::advance(Duration::from_secs(16 * 60)).await;
        assert_eq!(session.refresh(Instant::now(), timeouts()), SessionState::Idle);

        tokio::time::advance(Duration::from_secs(105 * 60)).await;
        assert_eq!(session.refresh(Instant::now(), timeouts()), SessionState::Expired);
    }

    #[tokio::test(start_paused = true)]
    async fn test_expired_is_terminal() {
        let mut session = Session::new("s1", "thought-1");
        tokio::time::advance(Duration::from_secs(121 * 60)).await;
        assert_eq!(session.refresh(Instant::now(), timeouts()), SessionState::Expired);

        // Stays expired even once the inactivity window no longer applies
        session.last_seen = Instant::now();
        assert_eq!(session.state_at(Instant::now(), timeouts()), SessionState::Expired);
    }

    #[test]
    fn test_snapshot_carries_last_intent() {
        let mut session = Session::new("s1", "thought-1");
        let mut request = ClassifiedRequest::unclassified("hej");
        request.intent = Intent::Help;
        session.record_request(request, "ctx-1".to_string());

        let snapshot = session.snapshot();
        assert_eq!(snapshot.last_intent, Some(Intent::Help));
        assert_eq!(snapshot.request_count, 1);
        assert_eq!(snapshot.state, SessionState::Active);
    }
}
