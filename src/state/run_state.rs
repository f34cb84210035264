/// Run state definitions for the scraping orchestrator
///
/// A run moves `Idle → Running` once and then ends in exactly one terminal state.
use std::fmt;

/// Represents the lifecycle state of a scraping run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunState {
    /// Constructed but not yet started
    Idle,

    /// Iterating regions and keywords
    Running,

    // ===== Terminal States =====
    /// All regions and keywords exhausted, or the email target was reached
    Completed,

    /// Cancelled through `stop()`
    Stopped,

    /// An orchestration error ended the run
    Failed(String),
}

impl RunState {
    /// Returns true if the run can no longer change state
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Stopped | Self::Failed(_))
    }

    /// Returns true if `next` is a legal successor of this state
    pub fn can_transition_to(&self, next: &RunState) -> bool {
        match self {
            Self::Idle => matches!(next, Self::Running),
            Self::Running => next.is_terminal(),
            _ => false,
        }
    }

    /// Short lowercase label used in logs
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Stopped => "stopped",
            Self::Failed(_) => "failed",
        }
    }
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Failed(message) => write!(f, "failed: {}", message),
            other => f.write_str(other.as_str()),
        }
    }
}
