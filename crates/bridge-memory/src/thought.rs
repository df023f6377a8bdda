// Thought traces - append-only reasoning steps, one lock per trace
//
// The registry map only guards membership. Appends to one trace take that
// trace's own mutex, so steps land in arrival order without blocking other
// traces.

use std::sync::Arc;

use bridge_core::{Role, ThoughtProcess, ThoughtStep};
use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use parking_lot::Mutex;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::clock::StoreClock;

#[derive(Default)]
pub struct ThoughtRegistry {
    thoughts: DashMap<String, Arc<Mutex<ThoughtProcess>>>,
    clock: StoreClock,
}

impl ThoughtRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_clock(clock: StoreClock) -> Self {
        Self {
            thoughts: DashMap::new(),
            clock,
        }
    }

    pub fn start(&self, initiator: Role, input: serde_json::Value, purpose: &str) -> String {
        let id = format!("thought-{}", Uuid::new_v4());
        let mut process = ThoughtProcess::new(id.clone(), initiator, input, purpose);
        process.started_at = self.clock.now();
        self.thoughts.insert(id.clone(), Arc::new(Mutex::new(process)));
        debug!(thought_id = %id, %initiator, "Started thought process");
        id
    }

    fn handle(&self, id: &str) -> Option<Arc<Mutex<ThoughtProcess>>> {
        // Clone the Arc so the shard lock is released before the trace lock is taken
        self.thoughts.get(id).map(|entry| Arc::clone(entry.value()))
    }

    pub fn add_step(&self, id: &str, step: ThoughtStep) -> bool {
        match self.handle(id) {
            Some(process) => {
                let mut process = process.lock();
                let at = self.clock.now();
                process.push_step(step, at);
                true
            }
            None => {
                warn!(thought_id = %id, "Dropping step for unknown thought process");
                false
            }
        }
    }

    /// Mark a trace finished. Returns false for unknown or already completed traces.
    pub fn complete(&self, id: &str, output: serde_json::Value) -> bool {
        let Some(process) = self.handle(id) else {
            warn!(thought_id = %id, "Cannot complete unknown thought process");
            return false;
        };

        let mut process = process.lock();
        if process.is_complete() {
            return false;
        }
        process.completed_at = Some(self.clock.now());
        process.output = Some(output);
        true
    }

    /// Snapshot of a trace; consumers only see safe steps
    pub fn get(&self, id: &str, role: Role) -> Option<ThoughtProcess> {
        let process = self.handle(id)?;
        let process = process.lock();
        Some(if role.is_consumer() {
            process.consumer_view()
        } else {
            process.clone()
        })
    }

    /// Drop completed traces older than `ttl`. Returns the number removed.
    pub fn sweep_stale(&self, now: DateTime<Utc>, ttl: Duration) -> usize {
        let before = self.thoughts.len();
        self.thoughts.retain(|_, process| !process.lock().is_stale(now, ttl));
        before.saturating_sub(self.thoughts.len())
    }

    pub fn len(&self) -> usize {
        self.thoughts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.thoughts.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_unknown_thought_is_rejected() {
        let registry = ThoughtRegistry::new();
        assert!(!registry.add_step("missing", ThoughtStep::new(Role::Bridge, "noop")));
        assert!(!registry.complete("missing", json!(null)));
        assert!(registry.get("missing", Role::Producer).is_none());
    }

    #[test]
    fn test_consumer_sees_only_safe_steps() {
        let registry = ThoughtRegistry::new();
        let id = registry.start(Role::Bridge, json!("hej"), "mediation");
        registry.add_step(&id, ThoughtStep::new(Role::Bridge, "classify"));
        registry.add_step(
            &id,
            ThoughtStep::new(Role::Producer, "debug").safe_for_consumer(false),
        );

        assert_eq!(registry.get(&id, Role::Producer).unwrap().steps.len(), 2);
        let view = registry.get(&id, Role::Consumer).unwrap();
        assert_eq!(view.steps.len(), 1);
        assert_eq!(view.steps[0].action, "classify");
    }

    #[test]
    fn test_complete_once() {
        let registry = ThoughtRegistry::new();
        let id = registry.start(Role::Consumer, json!({}), "test");
        assert!(registry.complete(&id, json!({"done": true})));
        assert!(!registry.complete(&id, json!({"done": false})));
        assert_eq!(
            registry.get(&id, Role::Producer).unwrap().output,
            Some(json!({"done": true}))
        );
    }

    #[test]
    fn test_sweep_only_drops_stale_completed() {
        let registry = ThoughtRegistry::new();
        let open = registry.start(Role::Bridge, json!(1), "open");
        let done = registry.start(Role::Bridge, json!(2), "done");
        registry.complete(&done, json!(null));

        let later = Utc::now() + Duration::minutes(61);
        assert_eq!(registry.sweep_stale(later, Duration::minutes(60)), 1);
        assert!(registry.get(&open, Role::Producer).is_some());
        assert!(registry.get(&done, Role::Producer).is_none());
    }

    #[test]
    fn test_concurrent_appends_keep_all_steps() {
        let registry = Arc::new(ThoughtRegistry::new());
        let id = registry.start(Role::Bridge, json!(null), "parallel");

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let registry = Arc::clone(&registry);
                let id = id.clone();
                std::thread::spawn(move || {
                    for j in 0..25 {
                        registry.add_step(&id, ThoughtStep::new(Role::Bridge, format!("{}-{}", i, j)));
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let steps = registry.get(&id, Role::Producer).unwrap().steps;
        assert_eq!(steps.len(), 200);
        assert!(steps.windows(2).all(|w| w[0].recorded_at <= w[1].recorded_at));
    }
}
