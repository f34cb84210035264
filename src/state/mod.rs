//! State module for tracking run progress
//!
//! # Components
//!
//! - `RunState`: The orchestrator lifecycle (idle, running, then completed, stopped or failed)

mod run_state;

pub use run_state::RunState;
