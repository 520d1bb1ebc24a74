//! Time ledger properties over full engine runs.
//!
//! The one invariant everything else leans on: for every track, at every
//! observed state, work_time_ms + wait_time_ms == total_elapsed_ms.

use devrace_core::{
    command::SimCommand,
    engine::{SimEngine, SimPhase},
};

const NOW: f64 = 1_000.0;

fn ledger_balanced(engine: &SimEngine) -> bool {
    engine.state.tracks.values().all(|t| {
        (t.work_time_ms + t.wait_time_ms - t.total_elapsed_ms).abs() < 1e-6
    })
}

/// Conservation holds after every tick, for every track, across an uneven
/// tick pattern that forces plenty of boundary crossings.
#[test]
fn work_plus_wait_equals_total_after_every_tick() {
    let mut engine = SimEngine::build_test().unwrap();
    engine.apply(&SimCommand::Play, NOW);

    let deltas = [50.0, 130.0, 999.0, 50.0, 2_000.0, 75.0, 333.0];
    let mut i = 0usize;
    while engine.state.phase == SimPhase::Running && i < 10_000 {
        let delta = deltas[i % deltas.len()];
        engine.apply(&SimCommand::Tick { delta_ms: delta }, NOW);
        assert!(
            ledger_balanced(&engine),
            "ledger out of balance after tick {i}"
        );
        i += 1;
    }
    assert_eq!(engine.state.phase, SimPhase::Complete, "run should finish");
}

/// Per-track elapsed time never decreases while running.
#[test]
fn track_elapsed_is_monotonic() {
    let mut engine = SimEngine::build_test().unwrap();
    engine.apply(&SimCommand::Play, NOW);

    let mut last: Vec<(String, f64)> = engine
        .state
        .tracks
        .values()
        .map(|t| (t.track_id.clone(), t.total_elapsed_ms))
        .collect();

    for i in 0..3_000 {
        engine.apply(&SimCommand::Tick { delta_ms: 50.0 }, NOW);
        let current: Vec<(String, f64)> = engine
            .state
            .tracks
            .values()
            .map(|t| (t.track_id.clone(), t.total_elapsed_ms))
            .collect();
        for ((id, before), (_, after)) in last.iter().zip(current.iter()) {
            assert!(
                after >= before,
                "track '{id}' went backwards at tick {i}: {before} -> {after}"
            );
        }
        last = current;
        if engine.state.phase == SimPhase::Complete {
            break;
        }
    }
}

/// Global elapsed time is exactly the sum of the deltas applied while
/// running; ticks in other phases contribute nothing.
#[test]
fn elapsed_is_sum_of_running_ticks() {
    let mut engine = SimEngine::build_test().unwrap();

    // Ignored: not running yet.
    engine.apply(&SimCommand::Tick { delta_ms: 500.0 }, NOW);
    assert_eq!(engine.state.elapsed_ms, 0.0);

    engine.apply(&SimCommand::Play, NOW);
    for _ in 0..10 {
        engine.apply(&SimCommand::Tick { delta_ms: 50.0 }, NOW);
    }
    assert!((engine.state.elapsed_ms - 500.0).abs() < 1e-9);

    engine.apply(&SimCommand::Pause, NOW + 5_000.0);
    engine.apply(&SimCommand::Tick { delta_ms: 500.0 }, NOW + 5_000.0);
    assert!((engine.state.elapsed_ms - 500.0).abs() < 1e-9, "paused ticks are ignored");
}

/// Completion percentage stays inside [0, 100) while a track is live and
/// is exactly 100 once it completes.
#[test]
fn completion_pct_reaches_exactly_one_hundred() {
    let mut engine = SimEngine::build_test().unwrap();
    engine.apply(&SimCommand::Play, NOW);

    for _ in 0..10_000 {
        engine.apply(&SimCommand::Tick { delta_ms: 50.0 }, NOW);
        for track in engine.state.tracks.values() {
            let pct = engine.track_completion_pct(&track.track_id);
            if track.is_complete {
                assert_eq!(pct, 100.0, "complete track '{}' must read 100", track.track_id);
            } else {
                assert!(
                    (0.0..100.0).contains(&pct),
                    "live track '{}' read {pct}",
                    track.track_id
                );
            }
        }
        if engine.state.phase == SimPhase::Complete {
            break;
        }
    }
    assert_eq!(engine.state.phase, SimPhase::Complete);
}
