#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs a headless Idle Defence battle.

mod save_code;

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{ensure, Context, Result};
use clap::Parser;
use idle_defence_core::{BattleOutcome, SaveRecord};
use idle_defence_system_session::{Session, SessionConfig};

/// Runs a battle at a fixed timestep and reports how far the tower got.
#[derive(Debug, Parser)]
#[command(name = "idle-defence", version)]
struct Args {
    /// TOML file with `seed`, `[arena]`, `[battle]`, `[tower]` and `[[waves]]`.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Seed overriding the one from the config file.
    #[arg(long)]
    seed: Option<u64>,
    /// Simulated seconds to run before stopping.
    #[arg(long, default_value_t = 120.0)]
    seconds: f32,
    /// Fixed frames per second of the simulation.
    #[arg(long, default_value_t = 60)]
    fps: u32,
    /// Resumes from a JSON save record written by `--save`.
    #[arg(long, conflicts_with = "resume_code")]
    load: Option<PathBuf>,
    /// Resumes from a save code printed by `--save-code`.
    #[arg(long, value_name = "CODE")]
    resume_code: Option<String>,
    /// Writes the final save record as JSON to this path.
    #[arg(long)]
    save: Option<PathBuf>,
    /// Prints a single-line save code after the run.
    #[arg(long)]
    save_code: bool,
    /// Decodes a save code, prints its record as JSON and exits.
    #[arg(long, value_name = "CODE")]
    inspect_code: Option<String>,
    /// Enables debug logging.
    #[arg(long)]
    verbose: bool,
}

/// Entry point for the Idle Defence command-line interface.
fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    if let Some(code) = &args.inspect_code {
        let record = save_code::decode(code).context("failed to decode save code")?;
        let json =
            serde_json::to_string_pretty(&record).context("failed to serialise save record")?;
        println!("{json}");
        return Ok(());
    }

    ensure!(args.fps > 0, "--fps must be at least 1");
    ensure!(args.seconds >= 0.0, "--seconds must not be negative");

    let mut config = match &args.config {
        Some(path) => load_config(path)?,
        None => SessionConfig::default(),
    };
    if let Some(seed) = args.seed {
        config.seed = seed;
    }

    let mut session = match load_record(&args)? {
        Some(record) => {
            Session::from_record(config, &record).context("failed to resume session")?
        }
        None => Session::new(config).context("failed to start session")?,
    };
    run(&mut session, args.seconds, args.fps)?;
    print_summary(&session);

    let record = session.save_record();
    if let Some(path) = &args.save {
        let json =
            serde_json::to_string_pretty(&record).context("failed to serialise save record")?;
        fs::write(path, json)
            .with_context(|| format!("failed to write save record to {}", path.display()))?;
        log::info!("save record written to {}", path.display());
    }
    if args.save_code {
        println!("{}", save_code::encode(&record).context("failed to encode save code")?);
    }

    Ok(())
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();
}

fn load_config(path: &Path) -> Result<SessionConfig> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read config file {}", path.display()))?;
    toml::from_str(&contents)
        .with_context(|| format!("failed to parse config file {}", path.display()))
}

fn load_record(args: &Args) -> Result<Option<SaveRecord>> {
    if let Some(code) = &args.resume_code {
        let record = save_code::decode(code).context("failed to decode save code")?;
        return Ok(Some(record));
    }
    let Some(path) = &args.load else {
        return Ok(None);
    };
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read save record {}", path.display()))?;
    let record = serde_json::from_str(&contents)
        .with_context(|| format!("failed to parse save record {}", path.display()))?;
    Ok(Some(record))
}

fn run(session: &mut Session, seconds: f32, fps: u32) -> Result<()> {
    let frame = 1.0 / fps as f32;
    let frames = (f64::from(seconds) * f64::from(fps)).round() as u64;

    for _ in 0..frames {
        let report = session.advance(frame).context("simulation step failed")?;
        if report.wave_cleared {
            log::info!(
                "wave {} cleared at {:.1}s",
                report.wave,
                session.elapsed()
            );
        }
        if report.outcome == BattleOutcome::TowerDestroyed {
            log::info!("tower destroyed at {:.1}s", session.elapsed());
            break;
        }
    }
    Ok(())
}

fn print_summary(session: &Session) {
    let progress = session.progress();
    let tower = session.tower();
    let outcome = if session.is_over() {
        "tower destroyed"
    } else {
        "tower standing"
    };

    println!("simulated {:.1}s over {} frames", session.elapsed(), session.frames());
    println!("waves cleared: {}", progress.current_wave.saturating_sub(1));
    println!("enemies defeated: {}", progress.enemies_defeated);
    println!("coins: {}  score: {}", progress.coins, progress.score);
    println!(
        "tower level {} at {:.0}/{:.0} health",
        tower.level(),
        tower.health(),
        tower.max_health()
    );
    println!("outcome: {outcome}");
}
