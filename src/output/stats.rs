//! Live pipeline counters
//!
//! Counters are plain atomics so the driver can read a snapshot at any time
//! without blocking the enrichment workers that bump them.

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

/// Monotonic counters shared by the scheduler, the workers and the sink
#[derive(Debug, Default)]
pub struct PipelineStats {
    with_email: AtomicU64,
    without_email: AtomicU64,
    api_calls: AtomicU64,
}

/// A point-in-time copy of [`PipelineStats`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatsSnapshot {
    pub with_email: u64,
    pub without_email: u64,
    pub api_calls: u64,
    pub places_processed: u64,
}

impl PipelineStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Counts one written record
    pub fn record_written(&self, has_email: bool) {
        if has_email {
            self.with_email.fetch_add(1, Ordering::SeqCst);
        } else {
            self.without_email.fetch_add(1, Ordering::SeqCst);
        }
    }

    /// Counts one provider search page request, whatever its outcome
    pub fn record_api_call(&self) {
        self.api_calls.fetch_add(1, Ordering::SeqCst);
    }

    pub fn with_email(&self) -> u64 {
        self.with_email.load(Ordering::SeqCst)
    }

    /// Processed places are derived from the two partitions so a snapshot can
    /// never show them out of step.
    pub fn snapshot(&self) -> StatsSnapshot {
        let with_email = self.with_email.load(Ordering::SeqCst);
        let without_email = self.without_email.load(Ordering::SeqCst);
        StatsSnapshot {
            with_email,
            without_email,
            api_calls: self.api_calls.load(Ordering::SeqCst),
            places_processed: with_email + without_email,
        }
    }
}

impl std::fmt::Display for StatsSnapshot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} processed ({} with email, {} without), {} API calls",
            self.places_processed, self.with_email, self.without_email, self.api_calls
        )
    }
}
