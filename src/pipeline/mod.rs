//! Pipeline module: search scheduling, deduplication, enrichment and orchestration
//!
//! - `ScrapingManager`: regions × keywords, run state, stop and stats
//! - `AdaptiveSearchScheduler`: FIFO cell queue with density-driven subdivision
//! - `EnrichmentPool`: bounded workers fetching details and crawling websites
//! - `Deduplicator`: at-most-once claim per place id
//! - `RunControl`: the shared stop condition

mod control;
mod dedup;
mod enrichment;
mod manager;
mod scheduler;

pub use control::RunControl;
pub use dedup::Deduplicator;
pub use enrichment::{EnrichmentPool, EnrichmentWorker, SearchOrigin};
pub use manager::ScrapingManager;
pub use scheduler::{AdaptiveSearchScheduler, PassReport, SearchTask, TaskOutcome};
