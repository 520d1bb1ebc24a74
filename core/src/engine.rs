//! The simulation engine — phase state machine and per-tick fan-out.
//!
//! RULES:
//!   - reduce() is pure: (state, command) -> state'. The host owns the
//!     single mutable state reference (SimEngine::state).
//!   - Within one tick every track advances from the same pre-tick state;
//!     tracks share nothing, so their order cannot matter.
//!   - Commands that are invalid for the current phase are absorbed as
//!     no-ops. Timer jitter or a double-clicked pause button must never
//!     corrupt state.
//!   - All configuration errors surface in build(), before the first
//!     command is accepted.

use crate::{
    command::SimCommand,
    config::SimConfig,
    error::{SimError, SimResult},
    scaler::scale_track,
    task::Task,
    track::{self, TrackState},
    types::{Millis, TrackId},
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Coarse phase of the whole simulation, distinct from any single track's
/// completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SimPhase {
    Idle,
    Running,
    Paused,
    Complete,
}

/// The complete observable state of a run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationState {
    pub phase: SimPhase,
    /// Host clock reading at the first PLAY. Bookkeeping only; virtual
    /// time lives in `elapsed_ms`.
    pub start_time: Option<Millis>,
    pub paused_at: Option<Millis>,
    pub total_paused_ms: Millis,
    /// Virtual time advanced so far, the sum of all applied tick deltas.
    pub elapsed_ms: Millis,
    pub tracks: BTreeMap<TrackId, TrackState>,
}

impl SimulationState {
    /// The state every run starts from. RESET returns exactly this.
    pub fn initial(catalogs: &BTreeMap<TrackId, Vec<Task>>) -> Self {
        let tracks = catalogs
            .iter()
            .map(|(id, tasks)| (id.clone(), TrackState::init(id.clone(), tasks)))
            .collect();
        Self {
            phase: SimPhase::Idle,
            start_time: None,
            paused_at: None,
            total_paused_ms: 0.0,
            elapsed_ms: 0.0,
            tracks,
        }
    }

    pub fn all_tracks_complete(&self) -> bool {
        self.tracks.values().all(|t| t.is_complete)
    }
}

/// Pure reducer over the simulation state machine.
///
/// `now_ms` is a host-supplied monotonic clock reading, used only for the
/// start/pause bookkeeping. The engine itself never reads a timer.
pub fn reduce(
    state: &SimulationState,
    catalogs: &BTreeMap<TrackId, Vec<Task>>,
    command: &SimCommand,
    now_ms: Millis,
) -> SimulationState {
    match command {
        SimCommand::Play => play(state, now_ms),
        SimCommand::Pause => pause(state, now_ms),
        SimCommand::Reset => SimulationState::initial(catalogs),
        SimCommand::Tick { delta_ms } => tick(state, catalogs, *delta_ms),
    }
}

fn play(state: &SimulationState, now_ms: Millis) -> SimulationState {
    let mut next = state.clone();
    match state.phase {
        SimPhase::Idle => {
            next.phase = SimPhase::Running;
            next.start_time = Some(now_ms);
            log::info!("run started");
        }
        SimPhase::Paused => {
            if let Some(paused_at) = next.paused_at.take() {
                next.total_paused_ms += (now_ms - paused_at).max(0.0);
            }
            next.phase = SimPhase::Running;
            log::info!("run resumed after {:.0}ms paused", next.total_paused_ms);
        }
        SimPhase::Running | SimPhase::Complete => {
            log::debug!("ignoring play in phase {:?}", state.phase);
        }
    }
    next
}

fn pause(state: &SimulationState, now_ms: Millis) -> SimulationState {
    let mut next = state.clone();
    if state.phase == SimPhase::Running {
        next.phase = SimPhase::Paused;
        next.paused_at = Some(now_ms);
        log::info!("run paused");
    } else {
        log::debug!("ignoring pause in phase {:?}", state.phase);
    }
    next
}

fn tick(
    state: &SimulationState,
    catalogs: &BTreeMap<TrackId, Vec<Task>>,
    delta_ms: Millis,
) -> SimulationState {
    if state.phase != SimPhase::Running {
        log::debug!("ignoring tick of {delta_ms}ms in phase {:?}", state.phase);
        return state.clone();
    }

    let mut next = state.clone();
    for (track_id, track_state) in &state.tracks {
        let tasks = catalogs.get(track_id).map(Vec::as_slice).unwrap_or(&[]);
        next.tracks
            .insert(track_id.clone(), track::advance(track_state, delta_ms, tasks));
    }
    next.elapsed_ms += delta_ms;

    if next.all_tracks_complete() {
        next.phase = SimPhase::Complete;
        log::info!("all tracks complete at {:.0}ms", next.elapsed_ms);
    }
    next
}

/// Owns the scaled catalogs and the single mutable state reference.
/// Thin shell over the pure reducer; hosts that want full control can call
/// `reduce` themselves.
pub struct SimEngine {
    scaled: BTreeMap<TrackId, Vec<Task>>,
    pub tick_interval_ms: Millis,
    pub state: SimulationState,
}

impl SimEngine {
    /// Build a fully validated engine from external configuration. Every
    /// configuration error fails here, before any tick is accepted.
    pub fn build(config: &SimConfig) -> SimResult<Self> {
        let mut scaled = BTreeMap::new();
        for track in &config.catalog {
            let ratio = config
                .compression
                .completion_ratios
                .get(&track.track_id)
                .copied()
                .ok_or_else(|| SimError::MissingRatio {
                    track_id: track.track_id.clone(),
                })?;
            let tasks = scale_track(
                &track.track_id,
                &track.tasks,
                ratio,
                config.compression.target_duration_ms,
            )?;
            log::debug!(
                "track '{}': {} tasks scaled to {:.0}ms total",
                track.track_id,
                tasks.len(),
                tasks.iter().map(|t| t.duration_ms).sum::<Millis>(),
            );
            scaled.insert(track.track_id.clone(), tasks);
        }
        let state = SimulationState::initial(&scaled);
        Ok(Self {
            scaled,
            tick_interval_ms: config.compression.tick_interval_ms,
            state,
        })
    }

    /// Engine over the bundled demo catalog. Used by tests and demos
    /// instead of build() + a data directory.
    pub fn build_test() -> SimResult<Self> {
        let config = SimConfig::default_test()?;
        Self::build(&config)
    }

    /// Apply one command to the host-owned state.
    pub fn apply(&mut self, command: &SimCommand, now_ms: Millis) {
        self.state = reduce(&self.state, &self.scaled, command, now_ms);
    }

    /// The scaled catalog for one track. Empty for unknown ids.
    pub fn scaled_tasks(&self, track_id: &str) -> &[Task] {
        self.scaled
            .get(track_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Completion percentage for one track against its scaled catalog.
    pub fn track_completion_pct(&self, track_id: &str) -> f64 {
        match self.state.tracks.get(track_id) {
            Some(track) => track.completion_pct(self.scaled_tasks(track_id).len()),
            None => 0.0,
        }
    }
}
