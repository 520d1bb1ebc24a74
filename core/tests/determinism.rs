//! Determinism tests.
//!
//! Two engines, same catalog, same command script. They must hold
//! byte-identical state after every command. The engine has no randomness
//! anywhere; any divergence here is a reducer bug.

use devrace_core::{
    command::SimCommand,
    engine::{reduce, SimEngine, SimPhase},
};

fn snapshot(engine: &SimEngine) -> String {
    serde_json::to_string(&engine.state).unwrap()
}

#[test]
fn same_script_produces_identical_states() {
    let mut engine_a = SimEngine::build_test().unwrap();
    let mut engine_b = SimEngine::build_test().unwrap();

    let script: Vec<(SimCommand, f64)> = vec![
        (SimCommand::Play, 1_000.0),
        (SimCommand::Tick { delta_ms: 50.0 }, 1_050.0),
        (SimCommand::Tick { delta_ms: 130.0 }, 1_180.0),
        (SimCommand::Pause, 2_000.0),
        (SimCommand::Tick { delta_ms: 50.0 }, 2_050.0), // ignored while paused
        (SimCommand::Play, 4_000.0),
        (SimCommand::Tick { delta_ms: 999.0 }, 5_000.0),
        (SimCommand::Tick { delta_ms: 2_500.0 }, 7_500.0),
        (SimCommand::Reset, 8_000.0),
        (SimCommand::Play, 9_000.0),
        (SimCommand::Tick { delta_ms: 750.0 }, 9_750.0),
    ];

    for (i, (command, now_ms)) in script.iter().enumerate() {
        engine_a.apply(command, *now_ms);
        engine_b.apply(command, *now_ms);
        assert_eq!(
            snapshot(&engine_a),
            snapshot(&engine_b),
            "states diverged at script step {i}: {command:?}"
        );
    }
}

#[test]
fn identical_runs_reach_identical_completion() {
    let mut engine_a = SimEngine::build_test().unwrap();
    let mut engine_b = SimEngine::build_test().unwrap();

    for engine in [&mut engine_a, &mut engine_b] {
        engine.apply(&SimCommand::Play, 0.0);
        for _ in 0..10_000 {
            engine.apply(&SimCommand::Tick { delta_ms: 50.0 }, 0.0);
            if engine.state.phase == SimPhase::Complete {
                break;
            }
        }
    }

    assert_eq!(engine_a.state.phase, SimPhase::Complete);
    assert_eq!(snapshot(&engine_a), snapshot(&engine_b));
}

/// The reducer itself is pure: applying the same command to the same state
/// twice yields the same result and leaves the input untouched.
#[test]
fn reducer_does_not_mutate_its_input() {
    let engine = {
        let mut e = SimEngine::build_test().unwrap();
        e.apply(&SimCommand::Play, 1_000.0);
        e.apply(&SimCommand::Tick { delta_ms: 275.0 }, 1_275.0);
        e
    };

    let catalogs = engine
        .state
        .tracks
        .keys()
        .map(|id| (id.clone(), engine.scaled_tasks(id).to_vec()))
        .collect();

    let before = serde_json::to_string(&engine.state).unwrap();
    let command = SimCommand::Tick { delta_ms: 425.0 };

    let out_1 = reduce(&engine.state, &catalogs, &command, 2_000.0);
    let out_2 = reduce(&engine.state, &catalogs, &command, 2_000.0);

    assert_eq!(serde_json::to_string(&engine.state).unwrap(), before, "input state mutated");
    assert_eq!(
        serde_json::to_string(&out_1).unwrap(),
        serde_json::to_string(&out_2).unwrap(),
        "same input, different output"
    );
}
