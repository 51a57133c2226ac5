//! refugio-runner: headless driver for the Refugio simulation.
//!
//! Usage:
//!   refugio-runner --seed 12345 --ticks 600 --config ./data/config.json
//!   refugio-runner --seed 12345 --ipc-mode

use anyhow::{Context, Result};
use refugio_core::{
    command::PlayerCommand,
    config::SimConfig,
    engine::{SessionStatus, SimEngine},
    error::SimResult,
    event::SimEvent,
    snapshot::WorldSnapshot,
};
use std::env;
use std::io::{self, BufRead, Write};

#[derive(serde::Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum IpcCommand {
    GetState,
    /// Advance `count` ticks, each preceded by one tick's worth of frame time.
    Tick {
        count: u64,
    },
    Frame {
        ms: f64,
    },
    Command {
        command: PlayerCommand,
    },
    Quit,
}

#[derive(serde::Serialize)]
struct IpcReply<'a> {
    events: &'a [SimEvent],
    state:  WorldSnapshot,
}

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let seed = parse_arg(&args, "--seed", 42u64);
    let ticks = parse_arg(&args, "--ticks", 600u64);
    let ipc_mode = args.iter().any(|a| a == "--ipc-mode");
    let config_path = args
        .windows(2)
        .find(|w| w[0] == "--config")
        .map(|w| w[1].as_str())
        .unwrap_or("./data/config.json");

    let config = SimConfig::load(config_path)
        .with_context(|| format!("loading ruleset from {config_path}"))?;
    let session_id = uuid::Uuid::new_v4().to_string();

    if !ipc_mode {
        println!("Refugio - refugio-runner");
        println!("  session:   {session_id}");
        println!("  seed:      {seed}");
        println!("  ticks:     {ticks}");
        println!("  config:    {config_path}");
        println!();
    }

    log::info!("session {session_id} starting with seed {seed}");
    let mut engine = SimEngine::build(session_id, config, seed);

    if ipc_mode {
        run_ipc_loop(&mut engine)?;
    } else {
        advance_many(&mut engine, ticks)?;
        print_summary(&engine);
    }

    Ok(())
}

/// One tick of wall time: a frame of `tick_ms`, then the tick itself.
fn advance(engine: &mut SimEngine) -> SimResult<Vec<SimEvent>> {
    let mut events = engine.frame(engine.config.tick_ms)?;
    events.extend(engine.tick()?);
    Ok(events)
}

fn advance_many(engine: &mut SimEngine, count: u64) -> SimResult<Vec<SimEvent>> {
    let mut events = Vec::new();
    for _ in 0..count {
        events.extend(advance(engine)?);
        if engine.is_over() {
            break;
        }
    }
    Ok(events)
}

fn run_ipc_loop(engine: &mut SimEngine) -> Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut handle = stdin.lock();
    let mut buffer = String::new();

    loop {
        buffer.clear();
        let bytes_read = handle.read_line(&mut buffer)?;
        if bytes_read == 0 {
            break; // EOF
        }

        let cmd: IpcCommand = match serde_json::from_str(&buffer) {
            Ok(c) => c,
            Err(e) => {
                log::warn!("Unknown IPC command {:?}: {e}", buffer.trim_end());
                write_error(&mut stdout, &e.to_string())?;
                continue;
            }
        };

        let result = match cmd {
            IpcCommand::Quit => break,
            IpcCommand::GetState => Ok(Vec::new()),
            IpcCommand::Tick { count } => advance_many(engine, count),
            IpcCommand::Frame { ms } => engine.frame(ms),
            IpcCommand::Command { command } => engine.handle_command(command),
        };

        match result {
            Ok(events) => {
                let reply = IpcReply { events: &events, state: engine.snapshot() };
                writeln!(stdout, "{}", serde_json::to_string(&reply)?)?;
            }
            Err(e) => {
                log::warn!("IPC command failed: {e}");
                write_error(&mut stdout, &e.to_string())?
            }
        }
        stdout.flush()?;
    }
    Ok(())
}

fn write_error(stdout: &mut io::Stdout, message: &str) -> Result<()> {
    let err_json = serde_json::json!({ "error": message });
    writeln!(stdout, "{err_json}")?;
    stdout.flush()?;
    Ok(())
}

fn print_summary(engine: &SimEngine) {
    let snap = engine.snapshot();
    let s = &snap.subject;

    println!("=== SESSION SUMMARY ===");
    println!("  session:        {}", snap.session_id);
    println!("  final tick:     {}", snap.clock.total_ticks);
    println!("  final turn:     {} ({})", snap.clock.turn, snap.clock.label);
    match snap.status {
        SessionStatus::Running => println!("  status:         alive"),
        SessionStatus::Terminated { cause, turn } => {
            println!("  status:         died on turn {turn} ({})", cause.tag())
        }
    }

    println!("  steps taken:    {}", snap.counters.steps_taken);
    println!("  turns closed:   {}", snap.counters.turns_processed);

    println!();
    println!("=== {} ({:?}, {:?}) ===", s.name, s.emotional_state, s.mood);
    println!("  hunger:         {:.0}", s.stats.hunger);
    println!("  happiness:      {:.0}", s.stats.happiness);
    println!("  energy:         {:.0}", s.stats.energy);
    println!("  trust:          {:.0}", s.stats.trust);
    println!("  mental health:  {:.0}", s.stats.mental_health);
    println!("  physical:       {:.0}", s.stats.physical_health);
    println!("  depression:     {:.0}", s.stats.depression);
    println!("  anxiety:        {:.0}", s.anxiety);
    println!("  bond:           {:.0}", s.bond);

    if let Some(visitor) = &snap.visitor {
        println!();
        println!("=== CRIS ===");
        println!("  visit days:     {:?}", visitor.visit_days);
        println!("  on map:         {}", visitor.on_map);
    }

    println!();
    println!("=== LAST EVENTS ===");
    let recent: Vec<_> = snap.log.iter().rev().take(10).collect();
    if recent.is_empty() {
        println!("  (nothing happened)");
    }
    for entry in recent.iter().rev() {
        println!("  [turn {:>3}] {:?}: {}", entry.turn, entry.severity, entry.message);
    }
}

fn parse_arg<T: std::str::FromStr + Copy>(args: &[String], flag: &str, default: T) -> T {
    args.windows(2)
        .find(|w| w[0] == flag)
        .and_then(|w| w[1].parse().ok())
        .unwrap_or(default)
}
