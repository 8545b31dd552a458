#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Match orchestration: the per-tick ordering of player input, AI planning and
//! world time, plus configuration and score reporting.

pub mod config;

use std::time::Duration;

use crop_rivals_core::{
    Command, Event, Interaction, LevelLayout, MatchReport, OrderSpec, Side,
};
use crop_rivals_system_ai_planner::AiPlanner;
use crop_rivals_world::{self as world, query, requests, World};
use glam::Vec2;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::info;

pub use config::{Config, ConfigError};

/// Receives the final report of a match for persistence.
pub trait ScoreSink {
    /// Records the outcome of a finished match.
    fn record(&mut self, report: &MatchReport);
}

/// Sink discarding every report.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullSink;

impl ScoreSink for NullSink {
    fn record(&mut self, _report: &MatchReport) {}
}

/// Drives one match of the world, the AI planner and the score sink.
#[derive(Debug)]
pub struct Simulation<S> {
    world: World,
    planner: AiPlanner,
    sink: S,
    pending: Vec<Event>,
    log: Vec<Event>,
    recorded: bool,
}

impl<S: ScoreSink> Simulation<S> {
    /// Starts a match on `layout` with requests drawn from the configured seed.
    pub fn new(config: &Config, layout: LevelLayout, sink: S) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
        let orders = requests::generate_orders(config.level(), &mut rng);
        Self::with_orders(config, layout, orders, sink)
    }

    /// Starts a match on `layout` with an explicit request queue.
    pub fn with_orders(
        config: &Config,
        layout: LevelLayout,
        orders: Vec<OrderSpec>,
        sink: S,
    ) -> Self {
        let mut simulation = Self {
            world: World::new(),
            planner: AiPlanner::new(config.planner()),
            sink,
            pending: Vec::new(),
            log: Vec::new(),
            recorded: false,
        };
        simulation.submit(Command::ConfigureMatch {
            setup: Box::new(config.match_setup(layout, orders)),
        });
        simulation
    }

    /// Advances the match by one frame.
    ///
    /// The human movement is applied first, then the AI plans against the
    /// events produced since its previous turn, then time advances.
    pub fn update(&mut self, dt: Duration, movement: Vec2) {
        if movement != Vec2::ZERO {
            self.submit(Command::MoveAgent {
                side: Side::Player,
                direction: movement,
                dt,
            });
        }

        let events = std::mem::take(&mut self.pending);
        let mut commands = Vec::new();
        self.planner.handle(&events, &self.world, dt, &mut commands);
        for command in commands {
            self.submit(command);
        }

        self.submit(Command::Tick { dt });
    }

    /// Performs a take or drop for the human agent.
    pub fn interact(&mut self, interaction: Interaction) {
        self.submit(Command::Interact {
            side: Side::Player,
            interaction,
        });
    }

    /// Pauses or resumes the match.
    pub fn set_paused(&mut self, paused: bool) {
        self.submit(Command::SetPaused { paused });
    }

    /// Returns the events produced since the previous drain.
    pub fn drain_events(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.log)
    }

    /// Read-only view of the world.
    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Read-only view of the AI planner.
    #[must_use]
    pub fn planner(&self) -> &AiPlanner {
        &self.planner
    }

    /// Read-only view of the score sink.
    #[must_use]
    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Consumes the simulation and returns its sink.
    #[must_use]
    pub fn into_sink(self) -> S {
        self.sink
    }

    /// Reports whether the countdown has run out.
    #[must_use]
    pub fn is_over(&self) -> bool {
        query::is_over(&self.world)
    }

    fn submit(&mut self, command: Command) {
        let mut events = Vec::new();
        world::apply(&mut self.world, command, &mut events);

        for event in &events {
            if let Event::MatchEnded { report } = event {
                if !self.recorded {
                    self.recorded = true;
                    info!(winner = ?report.winner, "reporting match result");
                    self.sink.record(report);
                }
            }
        }

        self.pending.extend(events.iter().cloned());
        self.log.extend(events);
    }
}
