#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that plays a headless Crop Rivals match.

mod profile;

use std::{path::PathBuf, time::Duration};

use anyhow::{Context, Result};
use clap::Parser;
use crop_rivals_core::{Event, MatchReport, SideTally, Winner};
use crop_rivals_simulation::{Config, Simulation};
use crop_rivals_world::{level, query};
use glam::Vec2;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use crate::profile::Profile;

#[derive(Parser, Debug)]
#[command(name = "crop-rivals", about = "Plays a headless Crop Rivals match against the AI")]
struct Args {
    /// TOML file overriding the default match tuning.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Level to play, overriding the config file.
    #[arg(long)]
    level: Option<u32>,

    /// Level layout file. Defaults to `level{N}.txt` in the working directory.
    #[arg(long)]
    layout: Option<PathBuf>,

    /// Seed of the request generator, overriding the config file.
    #[arg(long)]
    seed: Option<u64>,

    /// Profile save file updated with the player's score.
    #[arg(long)]
    profile: Option<PathBuf>,

    /// Player name used when the profile does not exist yet.
    #[arg(long, default_value = "Default")]
    name: String,

    /// Simulation step in milliseconds.
    #[arg(long, default_value_t = 50)]
    step_ms: u64,
}

/// Entry point for the Crop Rivals command-line interface.
fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => Config::load(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => Config::default(),
    };
    if let Some(level) = args.level {
        config.level = level;
    }
    if let Some(seed) = args.seed {
        config.seed = seed;
    }

    let layout_path = args
        .layout
        .clone()
        .unwrap_or_else(|| PathBuf::from(level::file_name(config.level())));
    let layout = level::load(&layout_path, config.grid_size());

    let profile = match &args.profile {
        Some(path) => Profile::open(path, &args.name)
            .with_context(|| format!("opening profile {}", path.display()))?,
        None => Profile::new(&args.name),
    };

    let mut simulation = Simulation::new(&config, layout, profile);
    println!("{}", query::welcome_banner(simulation.world()));
    info!(
        level = config.level().get(),
        seed = config.seed,
        layout = %layout_path.display(),
        "match started"
    );

    let step = Duration::from_millis(args.step_ms.max(1));
    while !simulation.is_over() {
        simulation.update(step, Vec2::ZERO);
        for event in simulation.drain_events() {
            log_event(&event);
        }
    }

    let report = query::report(simulation.world());
    print_report(&report);

    let profile = simulation.into_sink();
    if let Some(path) = &args.profile {
        profile
            .save(path)
            .with_context(|| format!("saving profile {}", path.display()))?;
        info!(
            player = profile.name(),
            level = report.level.get(),
            score = profile.score(report.level.get()).unwrap_or_default(),
            "profile updated"
        );
    }

    Ok(())
}

fn log_event(event: &Event) {
    match event {
        Event::TimeAdvanced { .. } | Event::AgentMoved { .. } | Event::WanderReversed => {}
        other => debug!(event = ?other, "world event"),
    }
}

fn print_report(report: &MatchReport) {
    println!("Level {} finished", report.level.get());
    print_side("Player", &report.player);
    print_side("AI", &report.ai);
    match report.winner {
        Winner::Player => println!("Player wins"),
        Winner::Ai => println!("AI wins"),
        Winner::Tie => println!("It's a tie"),
    }
}

fn print_side(label: &str, tally: &SideTally) {
    println!(
        "{label:>6}: {} points, {} requests, {} deliveries",
        tally.score, tally.completed_requests, tally.correct_deliveries
    );
}
