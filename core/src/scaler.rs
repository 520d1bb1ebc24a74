//! Duration scaler — compresses each track's raw task durations so the
//! track lands on its configured share of the target runtime.
//!
//! Raw catalog durations carry relative weight only. Scaling preserves the
//! proportions between tasks up to the per-task floor, and guarantees every
//! scaled duration is strictly positive before the state machine divides
//! by it.

use crate::{
    error::{SimError, SimResult},
    task::Task,
    types::{Millis, TrackId},
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Minimum scaled task duration: one host tick at the default 50 ms
/// interval. Anything shorter would complete inside a single tick anyway.
pub const MIN_TASK_DURATION_MS: Millis = 50.0;

/// External compression settings, consumed once at engine build.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeCompressionConfig {
    /// Baseline runtime the ratios are expressed against.
    pub target_duration_ms: Millis,
    /// Interval the host timer is expected to tick at.
    pub tick_interval_ms: Millis,
    /// Per-track share of the baseline, e.g. 1.0 for the slowest track
    /// and 0.25 for a track meant to finish in a quarter of the time.
    pub completion_ratios: BTreeMap<TrackId, f64>,
}

/// Rescale `tasks` so their total approximates `ratio * target_duration_ms`.
///
/// The output list has the same length and ordering as the input. An empty
/// catalog is valid and scales to an empty list; the owning track then
/// completes immediately.
pub fn scale_track(
    track_id: &str,
    tasks: &[Task],
    ratio: f64,
    target_duration_ms: Millis,
) -> SimResult<Vec<Task>> {
    if tasks.is_empty() {
        return Ok(Vec::new());
    }
    if !ratio.is_finite() || ratio <= 0.0 {
        return Err(SimError::InvalidRatio {
            track_id: track_id.into(),
            ratio,
        });
    }

    let raw_total: Millis = tasks.iter().map(|t| t.duration_ms).sum();
    if !(raw_total > 0.0) {
        return Err(SimError::ZeroDurationCatalog {
            track_id: track_id.into(),
        });
    }

    let scale_factor = ratio * target_duration_ms / raw_total;

    let mut scaled = Vec::with_capacity(tasks.len());
    for task in tasks {
        let duration_ms = (task.duration_ms * scale_factor)
            .round()
            .max(MIN_TASK_DURATION_MS);
        // The floor makes this unreachable for sane inputs; kept as the
        // load-time guarantee the state machine's division relies on.
        if !(duration_ms > 0.0) {
            return Err(SimError::NonPositiveDuration {
                track_id: track_id.into(),
                task_id: task.id.clone(),
            });
        }
        scaled.push(Task {
            duration_ms,
            ..task.clone()
        });
    }
    Ok(scaled)
}
