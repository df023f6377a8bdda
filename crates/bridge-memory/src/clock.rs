// Store clock - wall-clock timestamps driven by the tokio clock
//
// Timestamps are anchored to `Utc::now()` once, then advanced by the elapsed
// tokio time. Entry expiry and thought staleness therefore follow the same
// clock as session inactivity, including when the runtime clock is paused.
// Outside a runtime tokio falls back to the system monotonic clock.

use chrono::{DateTime, Duration, Utc};
use tokio::time::Instant;

#[derive(Debug, Clone, Copy)]
pub struct StoreClock {
    origin_utc: DateTime<Utc>,
    origin: Instant,
}

impl StoreClock {
    pub fn new() -> Self {
        Self {
            origin_utc: Utc::now(),
            origin: Instant::now(),
        }
    }

    pub fn now(&self) -> DateTime<Utc> {
        let elapsed = Duration::from_std(self.origin.elapsed()).unwrap_or_else(|_| Duration::zero());
        self.origin_utc + elapsed
    }
}

impl Default for StoreClock {
    fn default() -> Self {
        Self::new()
    }
}
