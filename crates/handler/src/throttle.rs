//! Sliding deduplication window keyed by kind and message

use chrono::{DateTime, Duration, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use kdiag_config::ThrottleConfig;
use kdiag_types::ErrorReport;
use tracing::debug;

/// Remembers when each `(kind, message)` pair was last seen.
///
/// An occurrence is suppressed when the previous one with the same key is
/// less than `window` old. Every occurrence, suppressed or not, moves the
/// key's timestamp to now. Once more than `max_entries` keys are held,
/// keys older than the window are dropped, then the oldest ones until the
/// map fits.
#[derive(Debug)]
pub struct Throttle {
    window: Duration,
    max_entries: usize,
    last_seen: DashMap<String, DateTime<Utc>>,
}

impl Throttle {
    #[must_use]
    pub fn new(window: Duration, max_entries: usize) -> Self {
        Self {
            window,
            max_entries: max_entries.max(1),
            last_seen: DashMap::new(),
        }
    }

    #[must_use]
    pub fn from_config(config: &ThrottleConfig) -> Self {
        let window = i64::try_from(config.window_ms)
            .map(Duration::milliseconds)
            .unwrap_or(Duration::MAX);
        Self::new(window, config.max_entries)
    }

    #[must_use]
    pub fn key(report: &ErrorReport) -> String {
        format!("{}:{}", report.kind(), report.message())
    }

    /// Record an occurrence of `key` at `now`. Returns `true` when it falls
    /// inside the window of the previous one and should not be shown.
    pub fn check(&self, key: &str, now: DateTime<Utc>) -> bool {
        let suppressed = match self.last_seen.entry(key.to_string()) {
            Entry::Occupied(mut seen) => {
                let within = now.signed_duration_since(*seen.get()) < self.window;
                seen.insert(now);
                within
            }
            Entry::Vacant(slot) => {
                slot.insert(now);
                false
            }
        };

        if !suppressed && self.last_seen.len() > self.max_entries {
            self.sweep(now);
        }
        suppressed
    }

    fn sweep(&self, now: DateTime<Utc>) {
        let before = self.last_seen.len();
        self.last_seen
            .retain(|_, seen| now.signed_duration_since(*seen) < self.window);

        let excess = self.last_seen.len().saturating_sub(self.max_entries);
        if excess > 0 {
            let mut by_age: Vec<(String, DateTime<Utc>)> = self
                .last_seen
                .iter()
                .map(|entry| (entry.key().clone(), *entry.value()))
                .collect();
            by_age.sort_by_key(|(_, seen)| *seen);
            for (key, _) in by_age.into_iter().take(excess) {
                self.last_seen.remove(&key);
            }
        }
        debug!(
            before,
            after = self.last_seen.len(),
            "swept throttle entries"
        );
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.last_seen.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.last_seen.is_empty()
    }
}
