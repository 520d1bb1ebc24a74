//! Track state machine — advances one methodology track through its task
//! sequence and keeps the work/wait time ledger.
//!
//! RULES:
//!   - advance() is pure. Same inputs, same output, no side effects.
//!   - work_time_ms + wait_time_ms == total_elapsed_ms after every step.
//!   - Log timestamps never decrease.
//!   - A tick larger than the current task rolls its overflow into the
//!     following tasks within the same call. The rollover is an explicit
//!     bounded loop, never recursion, so a catalog of many very short
//!     tasks cannot blow the stack.

use crate::{
    execution_log::{LogEntry, LogEntryKind},
    task::{Task, TaskCategory},
    types::{Millis, TrackId},
};
use serde::{Deserialize, Serialize};

/// The full mutable state of one track. Created at simulation init and
/// replaced wholesale on every advance; a reset recreates it from scratch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackState {
    pub track_id:          TrackId,
    /// Index into the scaled catalog. Equals the catalog length once the
    /// track has finished.
    pub task_index:        usize,
    pub current_task:      Option<Task>,
    /// Progress through the current task. Transiently exceeds 100 inside
    /// a single advance; never observed above 100 between ticks.
    pub task_progress_pct: f64,
    pub is_waiting:        bool,
    pub wait_reason:       Option<String>,
    /// Time spent in the current blocking wait. Resets when a
    /// non-blocking task becomes current.
    pub wait_elapsed_ms:   Millis,
    pub total_elapsed_ms:  Millis,
    pub work_time_ms:      Millis,
    pub wait_time_ms:      Millis,
    pub is_complete:       bool,
    pub log:               Vec<LogEntry>,
}

impl TrackState {
    /// Fresh state for a track at simulation init. An empty catalog is
    /// valid and yields an immediately complete track.
    pub fn init(track_id: TrackId, tasks: &[Task]) -> Self {
        let mut state = Self {
            track_id,
            task_index: 0,
            current_task: None,
            task_progress_pct: 0.0,
            is_waiting: false,
            wait_reason: None,
            wait_elapsed_ms: 0.0,
            total_elapsed_ms: 0.0,
            work_time_ms: 0.0,
            wait_time_ms: 0.0,
            is_complete: false,
            log: Vec::new(),
        };
        match tasks.first() {
            Some(first) => state.begin_task(first),
            None => state.finish(),
        }
        state
    }

    /// Overall completion in percent, exactly 100.0 only once the track
    /// is complete.
    pub fn completion_pct(&self, total_task_count: usize) -> f64 {
        if self.is_complete {
            return 100.0;
        }
        if total_task_count == 0 {
            return 0.0;
        }
        let done = self.task_index.min(total_task_count) as f64;
        (done + self.task_progress_pct / 100.0) / total_task_count as f64 * 100.0
    }

    /// Append one entry, stamped at the track's current elapsed time.
    fn push(
        &mut self,
        kind: LogEntryKind,
        message: String,
        details: Option<String>,
        team: Option<String>,
        duration_ms: Option<Millis>,
    ) {
        self.log.push(LogEntry {
            id: self.log.len() as u64 + 1,
            timestamp_ms: self.total_elapsed_ms,
            kind,
            message,
            details,
            team,
            duration_ms,
        });
    }

    /// Make `task` the current task: log its start and set the waiting
    /// flags for its category. No time is booked here.
    fn begin_task(&mut self, task: &Task) {
        self.current_task = Some(task.clone());
        self.task_progress_pct = 0.0;
        self.push(
            LogEntryKind::TaskStart,
            format!("Started: {}", task.name),
            Some(task.description.clone()),
            Some(task.team.clone()),
            None,
        );
        match task.category {
            TaskCategory::Wait => self.push(
                LogEntryKind::WaitStart,
                format!("Waiting: {}", task.name),
                None,
                Some(task.team.clone()),
                None,
            ),
            TaskCategory::Handoff => self.push(
                LogEntryKind::Handoff,
                format!("Handoff: {}", task.name),
                None,
                Some(task.team.clone()),
                None,
            ),
            _ => {}
        }
        if task.category.is_blocking_wait() {
            self.is_waiting = true;
            self.wait_reason = Some(task.name.clone());
        } else {
            self.is_waiting = false;
            self.wait_reason = None;
        }
        self.wait_elapsed_ms = 0.0;
    }

    /// Log completion of `task`. The caller has already booked its time.
    fn complete_task(&mut self, task: &Task) {
        self.push(
            LogEntryKind::TaskComplete,
            format!("Completed: {}", task.name),
            None,
            Some(task.team.clone()),
            Some(task.duration_ms),
        );
        if task.category == TaskCategory::Wait {
            self.push(
                LogEntryKind::WaitEnd,
                format!("Wait over: {}", task.name),
                None,
                Some(task.team.clone()),
                None,
            );
        }
    }

    /// Terminal transition. Only RESET undoes this.
    fn finish(&mut self) {
        self.is_complete = true;
        self.current_task = None;
        self.is_waiting = false;
        self.wait_reason = None;
        self.push(
            LogEntryKind::Milestone,
            "All tasks complete".to_string(),
            None,
            None,
            None,
        );
    }

    /// Book `delta_ms` into the work or wait bucket for `category`.
    fn book_time(&mut self, category: TaskCategory, delta_ms: Millis) {
        if category.counts_as_wait() {
            self.wait_time_ms += delta_ms;
        } else {
            self.work_time_ms += delta_ms;
        }
    }

    /// Refresh the waiting flags for time spent inside the current task.
    fn book_wait_flags(&mut self, task: &Task, delta_ms: Millis) {
        if task.category.is_blocking_wait() {
            self.is_waiting = true;
            self.wait_reason = Some(task.name.clone());
            self.wait_elapsed_ms += delta_ms;
        } else {
            self.is_waiting = false;
            self.wait_reason = None;
            self.wait_elapsed_ms = 0.0;
        }
    }

    fn debug_check_ledger(&self) {
        debug_assert!(
            (self.work_time_ms + self.wait_time_ms - self.total_elapsed_ms).abs() < 1e-6,
            "time ledger out of balance on '{}': work={} wait={} total={}",
            self.track_id,
            self.work_time_ms,
            self.wait_time_ms,
            self.total_elapsed_ms,
        );
    }
}

/// Advance `track` by `delta_ms` against its scaled catalog.
///
/// A delta that exactly exhausts the current task completes it with zero
/// overflow: one `TaskComplete`, one `TaskStart`, and the next task left at
/// zero progress. A larger delta keeps rolling the surplus across task
/// boundaries until it is consumed or the track finishes.
pub fn advance(track: &TrackState, delta_ms: Millis, tasks: &[Task]) -> TrackState {
    let mut next = track.clone();
    if next.is_complete || delta_ms <= 0.0 {
        return next;
    }

    let mut remaining = delta_ms;
    // Every pass either consumes the remaining delta inside the current
    // task or crosses exactly one task boundary, so the pass count is
    // bounded by the tasks left plus one final partial step. The guard
    // keeps a misconfigured catalog from looping, not correct ones.
    let mut passes_left = tasks.len().saturating_sub(next.task_index) + 1;

    while passes_left > 0 {
        passes_left -= 1;

        let Some(task) = tasks.get(next.task_index) else {
            next.finish();
            break;
        };
        debug_assert!(
            task.duration_ms > 0.0,
            "task '{}' reached the state machine with non-positive duration",
            task.id,
        );

        let increment = remaining / task.duration_ms * 100.0;
        let new_progress = next.task_progress_pct + increment;

        if new_progress < 100.0 {
            // Delta fits inside the current task.
            next.book_time(task.category, remaining);
            next.total_elapsed_ms += remaining;
            next.book_wait_flags(task, remaining);
            next.task_progress_pct = new_progress;
            break;
        }

        // Task boundary: credit exactly what the task still needed and
        // stamp the completion at the moment the work ran out.
        let overflow_ms = (new_progress - 100.0) / 100.0 * task.duration_ms;
        let consumed = remaining - overflow_ms;
        next.book_time(task.category, consumed);
        next.total_elapsed_ms += consumed;
        next.complete_task(task);

        next.task_index += 1;
        match tasks.get(next.task_index) {
            Some(next_task) => next.begin_task(next_task),
            None => {
                next.finish();
                break;
            }
        }

        if overflow_ms <= 0.0 {
            break;
        }
        remaining = overflow_ms;
    }

    next.debug_check_ledger();
    next
}
