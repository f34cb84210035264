use crate::output::PipelineStats;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Cooperative stop condition shared by every loop of a run
///
/// A run stops once [`RunControl::stop`] has been called or once the number of
/// email-bearing records reaches the target.
#[derive(Debug)]
pub struct RunControl {
    stop_requested: AtomicBool,
    target_results: u64,
    stats: Arc<PipelineStats>,
}

impl RunControl {
    pub fn new(target_results: u64, stats: Arc<PipelineStats>) -> Self {
        Self {
            stop_requested: AtomicBool::new(false),
            target_results,
            stats,
        }
    }

    pub fn stop(&self) {
        self.stop_requested.store(true, Ordering::SeqCst);
    }

    pub fn stop_requested(&self) -> bool {
        self.stop_requested.load(Ordering::SeqCst)
    }

    pub fn target_reached(&self) -> bool {
        self.stats.with_email() >= self.target_results
    }

    pub fn should_stop(&self) -> bool {
        self.stop_requested() || self.target_reached()
    }
}
