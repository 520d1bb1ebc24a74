//! Per-track execution log — append-only history plus pure display helpers.
//!
//! RULE: Entries are append-only and timestamps never decrease within one
//! track's log. Everything in this module is read-only over the entries;
//! only the track state machine appends.

use crate::types::Millis;
use serde::{Deserialize, Serialize};

/// Every kind of entry a track can log.
/// Variants are rendered by the accessors below — never removed or reordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogEntryKind {
    TaskStart,
    TaskComplete,
    WaitStart,
    WaitEnd,
    Handoff,
    Milestone,
}

/// One entry in a track's execution log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    /// Sequential within one track, starting at 1.
    pub id:           u64,
    /// Track-local virtual time at which the entry was recorded.
    pub timestamp_ms: Millis,
    pub kind:         LogEntryKind,
    pub message:      String,
    pub details:      Option<String>,
    pub team:         Option<String>,
    /// Only set on `TaskComplete`: the completed task's full scaled duration.
    pub duration_ms:  Option<Millis>,
}

/// Display prefix for an entry kind.
pub fn kind_prefix(kind: LogEntryKind) -> &'static str {
    match kind {
        LogEntryKind::TaskStart    => "▶",
        LogEntryKind::TaskComplete => "✓",
        LogEntryKind::WaitStart    => "⏳",
        LogEntryKind::WaitEnd      => "⌛",
        LogEntryKind::Handoff      => "⇄",
        LogEntryKind::Milestone    => "★",
    }
}

/// Style class a UI host attaches to an entry kind.
pub fn kind_style_class(kind: LogEntryKind) -> &'static str {
    match kind {
        LogEntryKind::TaskStart    => "log-start",
        LogEntryKind::TaskComplete => "log-complete",
        LogEntryKind::WaitStart    => "log-wait",
        LogEntryKind::WaitEnd      => "log-wait",
        LogEntryKind::Handoff      => "log-handoff",
        LogEntryKind::Milestone    => "log-milestone",
    }
}

/// Format a virtual timestamp as MM:SS for the clock display.
/// Minutes run past 59 rather than rolling into hours.
pub fn format_clock(ms: Millis) -> String {
    let total_secs = (ms / 1000.0).floor().max(0.0) as u64;
    format!("{:02}:{:02}", total_secs / 60, total_secs % 60)
}

/// Short human form for a duration: "850ms", "12.5s", "2m 05s".
pub fn format_duration(ms: Millis) -> String {
    if ms < 1000.0 {
        format!("{}ms", ms.round() as i64)
    } else if ms < 60_000.0 {
        format!("{:.1}s", ms / 1000.0)
    } else {
        let total_secs = (ms / 1000.0).round() as u64;
        format!("{}m {:02}s", total_secs / 60, total_secs % 60)
    }
}

/// The most recent `n` entries, oldest first. A view into the log, not a copy.
pub fn recent_entries(log: &[LogEntry], n: usize) -> &[LogEntry] {
    let start = log.len().saturating_sub(n);
    &log[start..]
}
