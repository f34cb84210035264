//! Output module for enriched place records
//!
//! This module handles:
//! - The fixed 50-column row schema and value flattening
//! - Writing rows into the email / no-email CSV partitions
//! - Live run statistics

mod record;
mod sink;
pub mod stats;

pub use record::{columns, decode_list_cell, flatten_value, PlaceRecord, DERIVED_COLUMNS};
pub use sink::{session_id, OutputPaths, ResultSink, SinkError};
pub use stats::{PipelineStats, StatsSnapshot};
