//! Task catalog types — the immutable work definitions each track executes.
//!
//! RULE: Catalogs are loaded once and never mutated. The engine only ever
//! sees tasks that have already passed through the duration scaler.

use crate::types::Millis;
use serde::{Deserialize, Serialize};

/// Every kind of work item a track can execute.
/// Closed set — extending it forces a decision in the time classifiers below.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskCategory {
    Work,
    Ceremony,
    Review,
    Wait,
    Handoff,
    Validation,
    Scenario,
}

impl TaskCategory {
    /// Whether time spent in this category is booked as wait time.
    /// Exhaustive on purpose: a new category must be classified here
    /// before the crate compiles again.
    pub fn counts_as_wait(self) -> bool {
        match self {
            Self::Wait | Self::Handoff | Self::Ceremony => true,
            Self::Work | Self::Review | Self::Validation | Self::Scenario => false,
        }
    }

    /// Whether a track sitting in this category reports itself as waiting.
    /// Ceremonies book wait time, but the team is in the room, so the track
    /// is not "waiting" in the blocked sense.
    pub fn is_blocking_wait(self) -> bool {
        matches!(self, Self::Wait | Self::Handoff)
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Work       => "work",
            Self::Ceremony   => "ceremony",
            Self::Review     => "review",
            Self::Wait       => "wait",
            Self::Handoff    => "handoff",
            Self::Validation => "validation",
            Self::Scenario   => "scenario",
        }
    }
}

/// One timed work item in a track's ordered catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id:          String,
    pub name:        String,
    pub description: String,
    /// Always > 0. Raw catalog values carry relative weight only; the
    /// duration scaler rewrites them before the engine runs.
    pub duration_ms: Millis,
    pub team:        String,
    pub category:    TaskCategory,
    pub icon:        String,
}
