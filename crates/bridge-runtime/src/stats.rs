// Running mediation counters. Reset only through `Mediator::reset_stats`.

use std::time::Duration;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionStats {
    pub calls_processed: u64,
    pub user_requests: u64,
    pub producer_responses: u64,
    /// Producer responses assessed above `none`
    pub risk_hits: u64,
    pub total_latency_ms: f64,
}

impl SessionStats {
    pub fn avg_latency_ms(&self) -> f64 {
        if self.calls_processed == 0 {
            0.0
        } else {
            self.total_latency_ms / self.calls_processed as f64
        }
    }

    /// Percentage (0–100) of producer responses that carried risk
    pub fn risk_filter_hit_rate(&self) -> f64 {
        if self.producer_responses == 0 {
            0.0
        } else {
            self.risk_hits as f64 / self.producer_responses as f64 * 100.0
        }
    }
}

#[derive(Default)]
pub(crate) struct StatsRecorder {
    inner: Mutex<SessionStats>,
}

impl StatsRecorder {
    pub fn record_request(&self, latency: Duration) {
        let mut stats = self.inner.lock();
        stats.calls_processed += 1;
        stats.user_requests += 1;
        stats.total_latency_ms += latency.as_secs_f64() * 1000.0;
    }

    pub fn record_response(&self, latency: Duration, risk_hit: bool) {
        let mut stats = self.inner.lock();
        stats.calls_processed += 1;
        stats.producer_responses += 1;
        if risk_hit {
            stats.risk_hits += 1;
        }
        stats.total_latency_ms += latency.as_secs_f64() * 1000.0;
    }

    pub fn snapshot(&self) -> SessionStats {
        *self.inner.lock()
    }

    pub fn reset(&self) {
        *self.inner.lock() = SessionStats::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_stats_have_zero_rates() {
        let stats = SessionStats::default();
        assert_eq!(stats.avg_latency_ms(), 0.0);
        assert_eq!(stats.risk_filter_hit_rate(), 0.0);
    }

    #[test]
    fn test_hit_rate_counts_responses_only() {
        let recorder = StatsRecorder::default();
        recorder.record_request(Duration::from_millis(2));
        recorder.record_response(Duration::from_millis(4), true);
        recorder.record_response(Duration::from_millis(6), false);

        let stats = recorder.snapshot();
        assert_eq!(stats.calls_processed, 3);
        assert!((stats.risk_filter_hit_rate() - 50.0).abs() < 1e-9);
        assert!((stats.avg_latency_ms() - 4.0).abs() < 1e-6);

        recorder.reset();
        assert_eq!(recorder.snapshot(), SessionStats::default());
    }
}
