#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Per-kind error counters
//!
//! Counters only ever go up; [`ErrorMetrics::reset`] is the one way to clear
//! them.

use dashmap::DashMap;
use kdiag_types::ErrorKind;
use std::collections::BTreeMap;
use tracing::trace;

#[derive(Debug, Default)]
pub struct ErrorMetrics {
    counts: DashMap<ErrorKind, u64>,
}

impl ErrorMetrics {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, kind: ErrorKind) {
        let mut count = self.counts.entry(kind).or_insert(0);
        *count += 1;
        trace!(kind = kind.as_str(), count = *count, "error recorded");
    }

    #[must_use]
    pub fn count(&self, kind: ErrorKind) -> u64 {
        self.counts.get(&kind).map_or(0, |count| *count)
    }

    #[must_use]
    pub fn total(&self) -> u64 {
        self.counts.iter().map(|entry| *entry.value()).sum()
    }

    /// Snapshot of every kind recorded so far, ordered by kind.
    #[must_use]
    pub fn summary(&self) -> BTreeMap<ErrorKind, u64> {
        self.counts
            .iter()
            .map(|entry| (*entry.key(), *entry.value()))
            .collect()
    }

    pub fn reset(&self) {
        self.counts.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unrecorded_kind_is_zero() {
        let metrics = ErrorMetrics::new();
        assert_eq!(metrics.count(ErrorKind::Timeout), 0);
        assert_eq!(metrics.total(), 0);
        assert!(metrics.summary().is_empty());
    }

    #[test]
    fn test_record_and_total() {
        let metrics = ErrorMetrics::new();
        metrics.record(ErrorKind::Timeout);
        metrics.record(ErrorKind::Timeout);
        metrics.record(ErrorKind::Permission);

        assert_eq!(metrics.count(ErrorKind::Timeout), 2);
        assert_eq!(metrics.count(ErrorKind::Permission), 1);
        assert_eq!(metrics.total(), 3);
    }

    #[test]
    fn test_reset_clears_everything() {
        let metrics = ErrorMetrics::new();
        for kind in ErrorKind::ALL {
            metrics.record(kind);
        }
        assert_eq!(metrics.total(), 7);

        metrics.reset();
        assert_eq!(metrics.total(), 0);
        assert_eq!(metrics.count(ErrorKind::Api), 0);
    }
}
