// Session registry - per-session locks plus the cleanup pass
//
// Each session sits behind its own async mutex. The map only guards
// membership; a call holds the session lock for its whole duration so calls
// under one id are serialized. Cleanup skips sessions that are locked.

use std::sync::Arc;

use bridge_core::Role;
use bridge_memory::{ContextStore, Sweep};
use dashmap::DashMap;
use serde_json::json;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tokio::time::Instant;
use tracing::{debug, info};

use crate::mediator::CleanupReport;
use crate::session::{Session, SessionSnapshot, SessionState, SessionTimeouts};

type SessionHandle = Arc<Mutex<Session>>;

pub(crate) struct SessionRegistry {
    sessions: DashMap<String, SessionHandle>,
    store: Arc<ContextStore>,
    timeouts: SessionTimeouts,
}

/// Non-expired and active session counts
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct SessionCounts {
    pub live: usize,
    pub active: usize,
}

impl SessionRegistry {
    pub fn new(store: Arc<ContextStore>, timeouts: SessionTimeouts) -> Self {
        Self {
            sessions: DashMap::new(),
            store,
            timeouts,
        }
    }

    /// Lock the session registered under `session_id`, creating it if needed
    pub async fn lock(&self, session_id: &str) -> OwnedMutexGuard<Session> {
        loop {
            let handle = {
                let entry = self
                    .sessions
                    .entry(session_id.to_string())
                    .or_insert_with(|| Arc::new(Mutex::new(self.new_session(session_id))));
                Arc::clone(entry.value())
            };
            let guard = Arc::clone(&handle).lock_owned().await;

            // Cleanup may have dropped the session while we waited
            let still_registered = self
                .sessions
                .get(session_id)
                .map(|e| Arc::ptr_eq(e.value(), &handle))
                .unwrap_or(false);
            if still_registered {
                return guard;
            }
        }
    }

    fn new_session(&self, session_id: &str) -> Session {
        let thought_id = self.store.start_thought(
            Role::Bridge,
            json!({"sessionId": session_id}),
            "mediation",
        );
        debug!(%session_id, %thought_id, "Started session");
        Session::new(session_id, thought_id)
    }

    /// Apply inactivity transitions before a call
    pub fn prepare(&self, session: &mut Session) {
        match session.refresh(Instant::now(), self.timeouts) {
            SessionState::Expired => {
                info!(session_id = %session.id, "Session expired, starting a fresh one under the same id");
                self.store
                    .complete_thought(&session.thought_id, json!({"reason": "session_expired"}));
                *session = self.new_session(&session.id);
            }
            SessionState::Idle => {
                debug!(session_id = %session.id, "Reactivating idle session");
            }
            SessionState::New | SessionState::Active => {}
        }
    }

    pub fn counts(&self) -> SessionCounts {
        let now = Instant::now();
        let mut counts = SessionCounts::default();
        for entry in self.sessions.iter() {
            let state = match entry.value().try_lock() {
                Ok(session) => session.state_at(now, self.timeouts),
                // Locked means a call is in flight
                Err(_) => SessionState::Active,
            };
            if state != SessionState::Expired {
                counts.live += 1;
            }
            if state == SessionState::Active {
                counts.active += 1;
            }
        }
        counts
    }

    pub async fn snapshot(&self, session_id: &str) -> Option<SessionSnapshot> {
        let handle = self.sessions.get(session_id).map(|e| Arc::clone(e.value()))?;
        let session = handle.lock().await;
        let mut snapshot = session.snapshot();
        snapshot.state = session.state_at(Instant::now(), self.timeouts);
        Some(snapshot)
    }

    /// Sweep the store, then complete and drop every expired session
    pub fn cleanup(&self) -> CleanupReport {
        let sweep = self.store.sweep();
        let sessions_expired = self.expire_sessions();

        if sessions_expired > 0 || !sweep.is_empty() {
            info!(
                expired_entries = sweep.expired,
                evicted_entries = sweep.evicted,
                thoughts_expired = sweep.thoughts_expired,
                sessions_expired,
                sessions = self.sessions.len(),
                "Cleanup completed"
            );
        } else {
            debug!("Cleanup found nothing to remove");
        }
        CleanupReport {
            sweep,
            sessions_expired,
        }
    }

    fn expire_sessions(&self) -> usize {
        let now = Instant::now();
        let ids: Vec<String> = self.sessions.iter().map(|e| e.key().clone()).collect();
        let mut expired = 0;
        for id in ids {
            let Some(handle) = self.sessions.get(&id).map(|e| Arc::clone(e.value())) else {
                continue;
            };
            let Ok(mut session) = handle.try_lock() else {
                continue;
            };
            if session.refresh(now, self.timeouts) == SessionState::Expired {
                self.store
                    .complete_thought(&session.thought_id, json!({"reason": "session_expired"}));
                self.sessions
                    .remove_if(&id, |_, current| Arc::ptr_eq(current, &handle));
                expired += 1;
            }
        }
        expired
    }
}

impl Sweep for SessionRegistry {
    fn sweep_tick(&self) {
        self.cleanup();
    }
}
