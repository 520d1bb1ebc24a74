//! sim-runner: headless host for the DevRace simulation engine.
//!
//! Owns the real timer loop the engine itself refuses to know about.
//!
//! Usage:
//!   sim-runner --data-dir ./data --max-ticks 20000
//!   sim-runner --tick-ms 50 --realtime
//!   sim-runner --ipc-mode

use anyhow::Result;
use devrace_core::{
    command::SimCommand,
    config::SimConfig,
    engine::{SimEngine, SimPhase},
    execution_log,
    types::Millis,
};
use std::env;
use std::io::{self, BufRead, Write};

#[derive(serde::Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum IpcCommand {
    Play,
    Pause,
    Reset,
    Tick { count: u64 },
    GetState,
    Quit,
}

#[derive(serde::Serialize)]
struct UiState {
    phase: SimPhase,
    clock: String,
    elapsed_ms: Millis,
    tracks: Vec<TrackView>,
}

#[derive(serde::Serialize)]
struct TrackView {
    track_id: String,
    completion_pct: f64,
    current_task: Option<String>,
    current_category: Option<&'static str>,
    is_waiting: bool,
    wait_reason: Option<String>,
    work_time_ms: Millis,
    wait_time_ms: Millis,
    total_elapsed_ms: Millis,
    recent_log: Vec<RenderedEntry>,
}

#[derive(serde::Serialize)]
struct RenderedEntry {
    clock: String,
    prefix: &'static str,
    style_class: &'static str,
    message: String,
}

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let data_dir = args
        .windows(2)
        .find(|w| w[0] == "--data-dir")
        .map(|w| w[1].as_str())
        .unwrap_or("./data");
    let max_ticks = parse_arg(&args, "--max-ticks", 20_000u64);
    let ipc_mode = args.iter().any(|a| a == "--ipc-mode");
    let realtime = args.iter().any(|a| a == "--realtime");

    let config = SimConfig::load(data_dir)?;
    let tick_ms = parse_arg(&args, "--tick-ms", config.compression.tick_interval_ms);
    let mut engine = SimEngine::build(&config)?;

    if !ipc_mode {
        println!("DevRace — sim-runner");
        println!("  data_dir:  {data_dir}");
        println!("  tick_ms:   {tick_ms}");
        println!("  max_ticks: {max_ticks}");
        println!();
    }

    if ipc_mode {
        run_ipc_loop(&mut engine)?;
    } else {
        let ticks = run_to_completion(&mut engine, tick_ms, max_ticks, realtime);
        print_summary(&engine, ticks);
    }

    Ok(())
}

fn run_to_completion(engine: &mut SimEngine, tick_ms: Millis, max_ticks: u64, realtime: bool) -> u64 {
    engine.apply(&SimCommand::Play, wall_ms());

    let mut ticks = 0u64;
    while engine.state.phase == SimPhase::Running && ticks < max_ticks {
        engine.apply(&SimCommand::Tick { delta_ms: tick_ms }, wall_ms());
        ticks += 1;

        if realtime {
            std::thread::sleep(std::time::Duration::from_millis(tick_ms as u64));
        }
        if ticks.is_multiple_of(400) {
            log::debug!(
                "tick={ticks} clock={}",
                execution_log::format_clock(engine.state.elapsed_ms)
            );
        }
    }
    ticks
}

fn run_ipc_loop(engine: &mut SimEngine) -> Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut handle = stdin.lock();
    let mut buffer = String::new();
    let tick_ms = engine.tick_interval_ms;

    loop {
        buffer.clear();
        let bytes_read = handle.read_line(&mut buffer)?;
        if bytes_read == 0 {
            break; // EOF
        }

        let cmd: IpcCommand = match serde_json::from_str(&buffer) {
            Ok(c) => c,
            Err(e) => {
                let err_json = serde_json::json!({ "error": e.to_string() });
                writeln!(stdout, "{}", err_json)?;
                stdout.flush()?;
                continue;
            }
        };

        match cmd {
            IpcCommand::Quit => break,
            IpcCommand::Play => engine.apply(&SimCommand::Play, wall_ms()),
            IpcCommand::Pause => engine.apply(&SimCommand::Pause, wall_ms()),
            IpcCommand::Reset => engine.apply(&SimCommand::Reset, wall_ms()),
            IpcCommand::Tick { count } => {
                for _ in 0..count {
                    engine.apply(&SimCommand::Tick { delta_ms: tick_ms }, wall_ms());
                }
            }
            IpcCommand::GetState => {}
        }

        writeln!(stdout, "{}", serde_json::to_string(&build_ui_state(engine))?)?;
        stdout.flush()?;
    }
    Ok(())
}

fn build_ui_state(engine: &SimEngine) -> UiState {
    let tracks = engine
        .state
        .tracks
        .values()
        .map(|track| {
            let recent = execution_log::recent_entries(&track.log, 8)
                .iter()
                .map(|entry| RenderedEntry {
                    clock: execution_log::format_clock(entry.timestamp_ms),
                    prefix: execution_log::kind_prefix(entry.kind),
                    style_class: execution_log::kind_style_class(entry.kind),
                    message: entry.message.clone(),
                })
                .collect();
            TrackView {
                track_id: track.track_id.clone(),
                completion_pct: engine.track_completion_pct(&track.track_id),
                current_task: track.current_task.as_ref().map(|t| t.name.clone()),
                current_category: track.current_task.as_ref().map(|t| t.category.label()),
                is_waiting: track.is_waiting,
                wait_reason: track.wait_reason.clone(),
                work_time_ms: track.work_time_ms,
                wait_time_ms: track.wait_time_ms,
                total_elapsed_ms: track.total_elapsed_ms,
                recent_log: recent,
            }
        })
        .collect();

    UiState {
        phase: engine.state.phase,
        clock: execution_log::format_clock(engine.state.elapsed_ms),
        elapsed_ms: engine.state.elapsed_ms,
        tracks,
    }
}

fn print_summary(engine: &SimEngine, ticks: u64) {
    println!("=== RUN SUMMARY ===");
    println!("  phase:      {:?}", engine.state.phase);
    println!("  ticks run:  {ticks}");
    println!(
        "  clock:      {}",
        execution_log::format_clock(engine.state.elapsed_ms)
    );
    println!();

    for track in engine.state.tracks.values() {
        let efficiency = if track.total_elapsed_ms > 0.0 {
            track.work_time_ms / track.total_elapsed_ms * 100.0
        } else {
            0.0
        };
        println!("--- {} ---", track.track_id);
        println!(
            "  completion: {:.1}%",
            engine.track_completion_pct(&track.track_id)
        );
        println!(
            "  work:       {}",
            execution_log::format_duration(track.work_time_ms)
        );
        println!(
            "  wait:       {}",
            execution_log::format_duration(track.wait_time_ms)
        );
        println!(
            "  total:      {}",
            execution_log::format_duration(track.total_elapsed_ms)
        );
        println!("  efficiency: {efficiency:.1}%");
        for entry in execution_log::recent_entries(&track.log, 5) {
            println!(
                "  {} {} {}",
                execution_log::format_clock(entry.timestamp_ms),
                execution_log::kind_prefix(entry.kind),
                entry.message
            );
        }
        println!();
    }
}

fn parse_arg<T: std::str::FromStr + Copy>(args: &[String], flag: &str, default: T) -> T {
    args.windows(2)
        .find(|w| w[0] == flag)
        .and_then(|w| w[1].parse().ok())
        .unwrap_or(default)
}

fn wall_ms() -> Millis {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as Millis)
        .unwrap_or(0.0)
}
