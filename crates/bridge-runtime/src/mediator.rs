//! Mediator - The public entry point of the mediation layer
//!
//! Wires the classifier, translator, safety filter, and context store
//! together for every call:
//! - user requests become task specifications
//! - producer responses become consumer-safe messages
//!
//! Every call records one context entry and one thought step under the
//! session's lock, so calls for one session are handled in arrival order
//! while different sessions proceed independently. Nothing raised while
//! handling producer content crosses this API: failures turn into the
//! fallback message.
//!
//! The background sweeper drives [`Mediator::cleanup`]: store entries,
//! completed thoughts, and expired sessions are all reclaimed on every tick.

use std::sync::Arc;
use std::time::Instant;

use bridge_core::{
    BridgeConfig, BridgeResult, EntryKind, Intent, Payload, Priority, Role, TaskSpecification,
    ThoughtStep, TranslatedMessage,
};
use bridge_memory::{ContextStore, PutOptions, StoreStats, SweepReport, SweeperHandle};
use bridge_safety::SafetyFilter;
use bridge_translate::{IntentClassifier, MessageTranslator};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::registry::SessionRegistry;
use crate::session::{SessionSnapshot, SessionTimeouts};
use crate::stats::{SessionStats, StatsRecorder};

/// Result of [`Mediator::handle_user_request`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRequestOutcome {
    pub task: TaskSpecification,
    pub session_id: String,
    pub detected_intent: Intent,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthReport {
    pub session_count: usize,
    pub active_sessions: usize,
    /// Percentage (0–100) of producer responses that carried risk
    pub risk_filter_hit_rate: f64,
    pub avg_latency_ms: f64,
    pub calls_processed: u64,
    pub store: StoreStats,
}

/// Result of [`Mediator::cleanup`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CleanupReport {
    pub sweep: SweepReport,
    pub sessions_expired: usize,
}

pub struct Mediator {
    config: BridgeConfig,
    classifier: IntentClassifier,
    translator: MessageTranslator,
    filter: Arc<SafetyFilter>,
    store: Arc<ContextStore>,
    sessions: Arc<SessionRegistry>,
    stats: StatsRecorder,
    sweeper: Mutex<Option<SweeperHandle>>,
}

impl Mediator {
    /// Create a mediator with the built-in vocabulary
    pub fn new(config: BridgeConfig) -> Self {
        Self::with_filter(config, Arc::new(SafetyFilter::new()))
    }

    /// Create a mediator around a custom safety filter
    pub fn with_filter(config: BridgeConfig, filter: Arc<SafetyFilter>) -> Self {
        let store = Arc::new(ContextStore::with_filter(
            config.store.clone(),
            Arc::clone(&filter),
        ));
        let sessions = Arc::new(SessionRegistry::new(
            Arc::clone(&store),
            SessionTimeouts::from(&config.sessions),
        ));
        Self {
            classifier: IntentClassifier::new(),
            translator: MessageTranslator::new(Arc::clone(&filter)),
            filter,
            store,
            sessions,
            stats: StatsRecorder::default(),
            sweeper: Mutex::new(None),
            config,
        }
    }

    /// Validate `config` first, then create
    pub fn from_config(config: BridgeConfig) -> BridgeResult<Self> {
        config.validate()?;
        Ok(Self::new(config))
    }

    /// Run [`Mediator::cleanup`] every `store.cleanup_interval_secs` until
    /// [`Mediator::shutdown`]. Must be called inside a tokio runtime; a second
    /// call while the sweeper runs is a no-op.
    pub fn spawn_sweeper(&self) {
        let interval = self.config.store.cleanup_interval();
        if interval.is_zero() {
            warn!("Refusing to start mediator sweeper with a zero interval");
            return;
        }
        let mut slot = self.sweeper.lock();
        if slot.is_some() {
            debug!("Mediator sweeper already running");
            return;
        }
        *slot = Some(SweeperHandle::spawn(Arc::downgrade(&self.sessions), interval));
    }

    pub fn sweeper_running(&self) -> bool {
        self.sweeper.lock().is_some()
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    pub fn store(&self) -> &Arc<ContextStore> {
        &self.store
    }

    /// Classify a request and turn it into a task specification
    pub async fn handle_user_request(
        &self,
        text: &str,
        session_id: Option<&str>,
    ) -> UserRequestOutcome {
        let started = Instant::now();
        let session_id = session_id
            .map(str::to_string)
            .unwrap_or_else(|| Uuid::new_v4().to_string());

        let mut session = self.sessions.lock(&session_id).await;
        self.sessions.prepare(&mut session);

        let request = self
            .classifier
            .classify(text, session.last_entry_id.as_deref());
        let task = self.translator.to_task(&request);

        let entry_id = self.store.put(
            Role::Consumer,
            EntryKind::Memory,
            json!({
                "text": text,
                "intent": request.intent,
                "complexity": request.complexity,
                "emotionalTone": request.emotional_tone,
            }),
            PutOptions::new()
                .safe_for_consumer(true)
                .session(&session_id)
                .tag("user_request"),
        );

        self.store.add_step(
            &session.thought_id,
            ThoughtStep::new(Role::Consumer, "classify_request")
                .with_input(json!(text))
                .with_output(json!({
                    "intent": request.intent,
                    "complexity": request.complexity,
                    "title": task.title,
                }))
                .with_rationale(format!(
                    "{} request, {} complexity",
                    request.intent, request.complexity
                ))
                .with_confidence(task.confidence)
                .safe_for_consumer(true),
        );

        let detected_intent = request.intent;
        session.record_request(request, entry_id);
        drop(session);

        self.stats.record_request(started.elapsed());
        info!(%session_id, intent = %detected_intent, "Handled user request");

        UserRequestOutcome {
            task,
            session_id,
            detected_intent,
        }
    }

    /// Turn a producer payload into a consumer-safe message
    pub async fn handle_producer_response(
        &self,
        payload: impl Into<Payload>,
        session_id: &str,
    ) -> TranslatedMessage {
        let started = Instant::now();
        let payload = payload.into();

        let mut session = self.sessions.lock(session_id).await;
        self.sessions.prepare(&mut session);

        let assessment = self.filter.assess(&payload);
        let risk_hit = assessment.risk_level.is_detected();
        if risk_hit {
            warn!(
                %session_id,
                level = %assessment.risk_level,
                categories = ?assessment.matched_categories,
                "Technical content detected in producer response"
            );
        }

        let message = match self
            .translator
            .translate(&payload, &assessment, session.last_request.as_ref())
        {
            Ok(message) => message,
            Err(e) => {
                warn!(%session_id, "Translation failed, sending fallback message: {}", e);
                MessageTranslator::fallback(&assessment)
            }
        };

        let priority = if assessment.needs_approval() {
            Priority::High
        } else {
            Priority::Medium
        };
        let entry_id = self.store.put(
            Role::Producer,
            EntryKind::State,
            payload,
            PutOptions::new()
                .priority(priority)
                .safe_for_consumer(!risk_hit)
                .session(session_id)
                .tag("producer_response"),
        );

        self.store.add_step(
            &session.thought_id,
            ThoughtStep::new(Role::Bridge, "translate_response")
                .with_input(json!({
                    "entryId": entry_id,
                    "riskLevel": assessment.risk_level,
                }))
                .with_output(json!(message.message))
                .with_rationale(format!("{} tone", message.tone))
                .with_confidence(message.confidence)
                .safe_for_consumer(true),
        );

        session.record_response(entry_id);
        drop(session);

        self.stats.record_response(started.elapsed(), risk_hit);
        debug!(%session_id, tone = %message.tone, warning = message.warning, "Handled producer response");
        message
    }

    pub fn health(&self) -> HealthReport {
        let stats = self.stats.snapshot();
        let counts = self.sessions.counts();

        HealthReport {
            session_count: counts.live,
            active_sessions: counts.active,
            risk_filter_hit_rate: stats.risk_filter_hit_rate(),
            avg_latency_ms: stats.avg_latency_ms(),
            calls_processed: stats.calls_processed,
            store: self.store.stats(),
        }
    }

    pub fn stats(&self) -> SessionStats {
        self.stats.snapshot()
    }

    /// Sweep the store, refresh session states, and drop expired sessions
    pub fn cleanup(&self) -> CleanupReport {
        self.sessions.cleanup()
    }

    /// Zero all counters
    pub fn reset_stats(&self) {
        self.stats.reset();
        info!("Mediation statistics reset");
    }

    pub async fn session(&self, session_id: &str) -> Option<SessionSnapshot> {
        self.sessions.snapshot(session_id).await
    }

    /// Stop background work and wait for it. Idempotent.
    pub async fn shutdown(&self) {
        let handle = self.sweeper.lock().take();
        if let Some(handle) = handle {
            handle.stop().await;
        }
        self.store.shutdown().await;
        info!("Mediator shut down");
    }
}

impl Drop for Mediator {
    fn drop(&mut self) {
        if let Some(handle) = self.sweeper.get_mut().take() {
            handle.abort();
        }
    }
}
