//! Context Store - Role-gated, TTL-bounded records of every mediation call
//!
//! Entries live in one map behind a single write lock shared by `put` and the
//! sweep, so an insertion and a cleanup pass never interleave. Capacity is
//! enforced on every put:
//! 1. expired entries are purged
//! 2. while over capacity, the entry with the lowest
//!    `(priority, created_at, sequence)` is evicted
//!
//! Producer entries are safety-filtered on the way in when safety mode is on.
//!
//! Entry and thought timestamps come from the store clock: wall time at
//! construction, advanced by the tokio clock. Expiry therefore tracks
//! `tokio::time` like session inactivity does, and a paused test runtime
//! controls both.

use std::collections::{BTreeSet, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use bridge_core::{
    minutes, ContextEntry, EntryKind, Payload, Priority, Role, StoreConfig, ThoughtProcess,
    ThoughtStep,
};
use bridge_safety::SafetyFilter;
use chrono::{DateTime, Utc};
use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::clock::StoreClock;
use crate::sweeper::{Sweep, SweeperHandle};
use crate::thought::ThoughtRegistry;

/// Options for [`ContextStore::put`]
#[derive(Debug, Clone, Default)]
pub struct PutOptions {
    pub priority: Priority,
    /// Requested visibility. Producer entries with detected risk are forced unsafe.
    pub safe_for_consumer: bool,
    pub tags: BTreeSet<String>,
    /// Minutes until expiry; the store default when unset
    pub ttl_minutes: Option<u64>,
    pub session_id: Option<String>,
}

impl PutOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    pub fn safe_for_consumer(mut self, safe: bool) -> Self {
        self.safe_for_consumer = safe;
        self
    }

    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.insert(tag.into());
        self
    }

    pub fn ttl_minutes(mut self, minutes: u64) -> Self {
        self.ttl_minutes = Some(minutes);
        self
    }

    pub fn session(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = Some(session_id.into());
        self
    }
}

/// Filter for [`ContextStore::search`]. Unset fields match everything.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContextQuery {
    #[serde(default)]
    pub owner_role: Option<Role>,
    #[serde(default)]
    pub kind: Option<EntryKind>,
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub tag: Option<String>,
    #[serde(default)]
    pub min_priority: Option<Priority>,
    #[serde(default)]
    pub limit: Option<usize>,
}

impl ContextQuery {
    pub fn for_session(session_id: impl Into<String>) -> Self {
        Self {
            session_id: Some(session_id.into()),
            ..Self::default()
        }
    }

    pub fn matches(&self, entry: &ContextEntry) -> bool {
        if let Some(role) = self.owner_role {
            if entry.owner_role != role {
                return false;
            }
        }
        if let Some(kind) = self.kind {
            if entry.kind != kind {
                return false;
            }
        }
        if let Some(ref session_id) = self.session_id {
            if entry.session_id.as_deref() != Some(session_id.as_str()) {
                return false;
            }
        }
        if let Some(ref tag) = self.tag {
            if !entry.has_tag(tag) {
                return false;
            }
        }
        if let Some(min) = self.min_priority {
            if entry.priority < min {
                return false;
            }
        }
        true
    }
}

/// Counts from one cleanup pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SweepReport {
    pub expired: usize,
    pub evicted: usize,
    pub thoughts_expired: usize,
}

impl SweepReport {
    pub fn is_empty(&self) -> bool {
        self.expired == 0 && self.evicted == 0 && self.thoughts_expired == 0
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreStats {
    pub entries: usize,
    pub thoughts: usize,
    pub evicted_total: u64,
    pub expired_total: u64,
    pub sweep_runs: u64,
}

/// The context store
pub struct ContextStore {
    config: StoreConfig,
    filter: Arc<SafetyFilter>,
    entries: RwLock<HashMap<String, ContextEntry>>,
    thoughts: ThoughtRegistry,
    sequence: AtomicU64,
    evicted_total: AtomicU64,
    expired_total: AtomicU64,
    sweep_runs: AtomicU64,
    sweeper: Mutex<Option<SweeperHandle>>,
    clock: StoreClock,
}

impl ContextStore {
    pub fn new(config: StoreConfig) -> Self {
        Self::with_filter(config, Arc::new(SafetyFilter::new()))
    }

    /// Create a store sharing an existing safety filter
    pub fn with_filter(config: StoreConfig, filter: Arc<SafetyFilter>) -> Self {
        let clock = StoreClock::new();
        Self {
            config,
            filter,
            entries: RwLock::new(HashMap::new()),
            thoughts: ThoughtRegistry::with_clock(clock),
            sequence: AtomicU64::new(0),
            evicted_total: AtomicU64::new(0),
            expired_total: AtomicU64::new(0),
            sweep_runs: AtomicU64::new(0),
            sweeper: Mutex::new(None),
            clock,
        }
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    pub fn filter(&self) -> &Arc<SafetyFilter> {
        &self.filter
    }

    pub(crate) fn clock(&self) -> &StoreClock {
        &self.clock
    }

    /// Store a record and return its id
    pub fn put(
        &self,
        owner_role: Role,
        kind: EntryKind,
        payload: impl Into<Payload>,
        options: PutOptions,
    ) -> String {
        let payload = payload.into();
        let mut safe_for_consumer = options.safe_for_consumer;
        let mut value = payload.to_value();

        if owner_role == Role::Producer && self.config.safety_mode {
            let sanitized = self.filter.sanitize(&payload);
            if sanitized.assessment.risk_level.is_detected() {
                info!(
                    level = %sanitized.assessment.risk_level,
                    changes = sanitized.warnings.len(),
                    "Producer entry filtered and hidden from consumer"
                );
                safe_for_consumer = false;
                value = sanitized.payload;
            }
        }

        let now = self.clock.now();
        let ttl = options
            .ttl_minutes
            .unwrap_or(self.config.default_ttl_minutes);
        let id = format!("ctx-{}", Uuid::new_v4());
        let entry = ContextEntry {
            id: id.clone(),
            created_at: now,
            owner_role,
            kind,
            payload: value,
            priority: options.priority,
            safe_for_consumer,
            tags: options.tags,
            session_id: options.session_id,
            expires_at: Some(now + minutes(ttl)),
            sequence: self.sequence.fetch_add(1, Ordering::SeqCst),
        };

        let mut entries = self.entries.write();
        let expired = self.purge_expired(&mut entries, now);
        entries.insert(id.clone(), entry);
        let evicted = self.enforce_capacity(&mut entries);
        drop(entries);

        debug!(
            entry_id = %id,
            %owner_role,
            safe_for_consumer,
            expired,
            evicted,
            "Stored context entry"
        );
        id
    }

    /// Fetch a record. Absent, expired, and hidden entries all read as `None`.
    pub fn get(&self, id: &str, requesting_role: Role) -> Option<ContextEntry> {
        let now = self.clock.now();
        let entries = self.entries.read();
        entries
            .get(id)
            .filter(|entry| !entry.is_expired_at(now) && entry.visible_to(requesting_role))
            .cloned()
    }

    /// Visible, unexpired entries matching `query`, newest first
    pub fn search(&self, query: &ContextQuery, requesting_role: Role) -> Vec<ContextEntry> {
        let now = self.clock.now();
        let mut results: Vec<ContextEntry> = {
            let entries = self.entries.read();
            entries
                .values()
                .filter(|entry| !entry.is_expired_at(now))
                .filter(|entry| entry.visible_to(requesting_role))
                .filter(|entry| query.matches(entry))
                .cloned()
                .collect()
        };

        results.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then(b.sequence.cmp(&a.sequence))
        });
        if let Some(limit) = query.limit {
            results.truncate(limit);
        }
        results
    }

    pub fn start_thought(
        &self,
        initiator: Role,
        input: serde_json::Value,
        purpose: &str,
    ) -> String {
        self.thoughts.start(initiator, input, purpose)
    }

    /// Append a step. False when the thought is unknown.
    pub fn add_step(&self, thought_id: &str, step: ThoughtStep) -> bool {
        self.thoughts.add_step(thought_id, step)
    }

    pub fn complete_thought(&self, thought_id: &str, output: serde_json::Value) -> bool {
        self.thoughts.complete(thought_id, output)
    }

    pub fn get_thought(&self, thought_id: &str, requesting_role: Role) -> Option<ThoughtProcess> {
        self.thoughts.get(thought_id, requesting_role)
    }

    /// One cleanup pass
    pub fn sweep(&self) -> SweepReport {
        let now = self.clock.now();
        let (expired, evicted) = {
            let mut entries = self.entries.write();
            let expired = self.purge_expired(&mut entries, now);
            let evicted = self.enforce_capacity(&mut entries);
            (expired, evicted)
        };
        let thoughts_expired = self.thoughts.sweep_stale(now, self.config.default_ttl());
        self.sweep_runs.fetch_add(1, Ordering::Relaxed);

        let report = SweepReport {
            expired,
            evicted,
            thoughts_expired,
        };
        if report.is_empty() {
            debug!("Context sweep found nothing to remove");
        } else {
            info!(
                expired = report.expired,
                evicted = report.evicted,
                thoughts_expired = report.thoughts_expired,
                "Context sweep completed"
            );
        }
        report
    }

    /// Run [`ContextStore::sweep`] every `interval` until [`ContextStore::shutdown`].
    ///
    /// A second call while a sweeper is running is a no-op.
    pub fn start_sweeper(self: &Arc<Self>, interval: std::time::Duration) {
        if interval.is_zero() {
            warn!("Refusing to start context sweeper with a zero interval");
            return;
        }
        let mut slot = self.sweeper.lock();
        if slot.is_some() {
            debug!("Context sweeper already running");
            return;
        }
        *slot = Some(SweeperHandle::spawn(Arc::downgrade(self), interval));
    }

    pub fn sweeper_running(&self) -> bool {
        self.sweeper.lock().is_some()
    }

    /// Stop the sweeper and wait for it. No sweep runs after this returns.
    pub async fn shutdown(&self) {
        let handle = self.sweeper.lock().take();
        if let Some(handle) = handle {
            handle.stop().await;
        }
    }

    pub fn stats(&self) -> StoreStats {
        StoreStats {
            entries: self.len(),
            thoughts: self.thoughts.len(),
            evicted_total: self.evicted_total.load(Ordering::Relaxed),
            expired_total: self.expired_total.load(Ordering::Relaxed),
            sweep_runs: self.sweep_runs.load(Ordering::Relaxed),
        }
    }

    /// Number of stored entries, expired ones included until the next purge
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    fn purge_expired(&self, entries: &mut HashMap<String, ContextEntry>, now: DateTime<Utc>) -> usize {
        let before = entries.len();
        entries.retain(|_, entry| !entry.is_expired_at(now));
        let removed = before - entries.len();
        self.expired_total.fetch_add(removed as u64, Ordering::Relaxed);
        removed
    }

    fn enforce_capacity(&self, entries: &mut HashMap<String, ContextEntry>) -> usize {
        let capacity = self.config.max_entries;
        if entries.len() <= capacity {
            return 0;
        }

        let mut order: Vec<(Priority, DateTime<Utc>, u64, String)> = entries
            .values()
            .map(|e| (e.priority, e.created_at, e.sequence, e.id.clone()))
            .collect();
        order.sort();

        let to_remove = entries.len() - capacity;
        for (priority, _, _, id) in order.into_iter().take(to_remove) {
            debug!(entry_id = %id, ?priority, "Evicting context entry");
            entries.remove(&id);
        }
        self.evicted_total.fetch_add(to_remove as u64, Ordering::Relaxed);
        to_remove
    }
}

impl Sweep for ContextStore {
    fn sweep_tick(&self) {
        self.sweep();
    }
}

impl Drop for ContextStore {
    fn drop(&mut self) {
        // The sweeper only holds a Weak, but its task should not outlive the store
        if let Some(handle) = self.sweeper.get_mut().take() {
            handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn store(max_entries: usize) -> ContextStore {
        ContextStore::new(StoreConfig {
            max_entries,
            ..StoreConfig::default()
        })
    }

    #[test]
    fn test_put_and_get() {
        let store = store(10);
        let id = store.put(
            Role::Consumer,
            EntryKind::Memory,
            json!({"text": "hej"}),
            PutOptions::new().safe_for_consumer(true),
        );
        let entry = store.get(&id, Role::Consumer).unwrap();
        assert_eq!(entry.payload, json!({"text": "hej"}));
        assert!(entry.expires_at.is_some());
    }

    #[test]
    fn test_default_options_hide_from_consumer() {
        let store = store(10);
        let id = store.put(Role::Bridge, EntryKind::Decision, "ok", PutOptions::new());
        assert!(store.get(&id, Role::Consumer).is_none());
        assert!(store.get(&id, Role::Bridge).is_some());
    }

    #[test]
    fn test_zero_ttl_expires_immediately() {
        let store = store(10);
        let id = store.put(
            Role::Bridge,
            EntryKind::State,
            "tmp",
            PutOptions::new().ttl_minutes(0),
        );
        assert!(store.get(&id, Role::Producer).is_none());
        assert_eq!(store.sweep().expired, 1);
        assert!(store.is_empty());
    }

    #[test]
    fn test_safety_mode_off_keeps_producer_payload() {
        let store = ContextStore::new(StoreConfig {
            safety_mode: false,
            ..StoreConfig::default()
        });
        let id = store.put(
            Role::Producer,
            EntryKind::State,
            "server crashed",
            PutOptions::new().safe_for_consumer(true),
        );
        let entry = store.get(&id, Role::Consumer).unwrap();
        assert_eq!(entry.payload, json!("server crashed"));
    }

    #[test]
    fn test_query_matching() {
        let store = store(10);
        store.put(
            Role::Consumer,
            EntryKind::Memory,
            "a",
            PutOptions::new().session("s1").tag("request").priority(Priority::High),
        );
        store.put(Role::Bridge, EntryKind::State, "b", PutOptions::new().session("s2"));

        let query = ContextQuery {
            tag: Some("request".to_string()),
            min_priority: Some(Priority::High),
            ..ContextQuery::default()
        };
        assert_eq!(store.search(&query, Role::Producer).len(), 1);
        assert_eq!(store.search(&ContextQuery::for_session("s2"), Role::Producer).len(), 1);
        assert!(store.search(&ContextQuery::default(), Role::Consumer).is_empty());
    }
}
