#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Crop Rivals.

pub mod level;
pub mod motion;
pub mod requests;
pub mod scoring;
pub mod tiles;

use std::time::Duration;

use crop_rivals_core::{
    Command, CropType, Event, GridSize, Interaction, Level, LevelLayout, MatchReport, MatchSetup,
    OrderSpec, Side, TileIndex, WELCOME_BANNER,
};
use glam::Vec2;
use tracing::{debug, info};

use crate::{
    motion::{Agent, Arena, Heading},
    requests::{Delivery, RequestLedger},
    scoring::Scoreboard,
    tiles::{Outcome, TileGrid},
};

/// Default number of tile columns.
pub const DEFAULT_GRID_COLUMNS: u32 = 20;
/// Default number of tile rows.
pub const DEFAULT_GRID_ROWS: u32 = 12;
/// Default side length of a tile in world units.
pub const DEFAULT_TILE_LENGTH: f32 = 60.0;
/// Default width of the partition band.
pub const DEFAULT_PARTITION_WIDTH: f32 = 4.0;
/// Default radius of both agents.
pub const DEFAULT_AGENT_RADIUS: f32 = 18.0;
/// Default movement speed of the human agent.
pub const DEFAULT_PLAYER_SPEED: f32 = 200.0;
/// Default path-following speed of the AI agent.
pub const DEFAULT_AI_SPEED: f32 = 160.0;
/// Default ratio between the idle bounce speed and the player speed.
pub const DEFAULT_WANDER_RATIO: f32 = 0.4;
/// Default time a plot needs to grow.
pub const DEFAULT_GROWTH_DURATION: Duration = Duration::from_secs(3);
/// Default length of a match.
pub const DEFAULT_MATCH_DURATION: Duration = Duration::from_secs(60);

/// Builds a match setup populated with the default tuning and the provided layout and orders.
#[must_use]
pub fn default_setup(level: Level, layout: LevelLayout, orders: Vec<OrderSpec>) -> MatchSetup {
    MatchSetup {
        level,
        layout,
        tile_length: DEFAULT_TILE_LENGTH,
        partition_width: DEFAULT_PARTITION_WIDTH,
        agent_radius: DEFAULT_AGENT_RADIUS,
        player_speed: DEFAULT_PLAYER_SPEED,
        ai_speed: DEFAULT_AI_SPEED,
        wander_speed: DEFAULT_PLAYER_SPEED * DEFAULT_WANDER_RATIO,
        growth_duration: DEFAULT_GROWTH_DURATION,
        match_duration: DEFAULT_MATCH_DURATION,
        orders,
    }
}

/// Represents the authoritative Crop Rivals world state.
#[derive(Clone, Debug)]
pub struct World {
    banner: &'static str,
    level: Level,
    grid: TileGrid,
    arena: Arena,
    agents: [Agent; 2],
    heading: Heading,
    wander_speed: f32,
    ledger: RequestLedger,
    scores: Scoreboard,
    growth_duration: Duration,
    remaining: Duration,
    paused: bool,
    ended: bool,
}

impl World {
    /// Creates a world holding an empty default-sized field and no orders.
    #[must_use]
    pub fn new() -> Self {
        let layout = LevelLayout::empty(GridSize::new(DEFAULT_GRID_COLUMNS, DEFAULT_GRID_ROWS));
        Self::from_setup(&default_setup(Level::new(1), layout, Vec::new()))
    }

    fn from_setup(setup: &MatchSetup) -> Self {
        let grid = TileGrid::from_layout(&setup.layout, setup.tile_length);
        let area = grid.play_area();
        let arena = Arena::new(area, setup.partition_width, setup.agent_radius);
        let middle = area.min().y + area.height() * 0.5;
        let player = Vec2::new(area.min().x + area.width() * 0.25, middle);
        let ai = Vec2::new(area.min().x + area.width() * 0.75, middle);

        Self {
            banner: WELCOME_BANNER,
            level: setup.level,
            grid,
            arena,
            agents: [
                Agent::new(player, setup.player_speed),
                Agent::new(ai, setup.ai_speed),
            ],
            heading: Heading::default(),
            wander_speed: setup.wander_speed,
            ledger: RequestLedger::new(&setup.orders),
            scores: Scoreboard::default(),
            growth_duration: setup.growth_duration,
            remaining: setup.match_duration,
            paused: false,
            ended: false,
        }
    }

    fn agent_mut(&mut self, side: Side) -> &mut Agent {
        &mut self.agents[side.index()]
    }

    fn report(&self) -> MatchReport {
        MatchReport {
            level: self.level,
            player: self.scores.tally(Side::Player),
            ai: self.scores.tally(Side::Ai),
            winner: self.scores.winner(),
        }
    }

    fn relocate(&mut self, side: Side, to: Vec2, out_events: &mut Vec<Event>) {
        let agent = self.agent_mut(side);
        let from = agent.position();
        agent.place(to);
        out_events.push(Event::AgentMoved { side, from, to });
    }

    fn interact(
        &mut self,
        side: Side,
        interaction: Interaction,
        out_events: &mut Vec<Event>,
    ) {
        let agent = self.agents[side.index()];
        let Some(index) = self.grid.tile_index_at(agent.position()) else {
            return;
        };
        let Some(tile) = self.grid.tile_mut(index) else {
            return;
        };

        let (next, hands, outcome) = tiles::interact(*tile, agent.carried(), interaction);
        *tile = next;
        self.agent_mut(side).hold(hands);

        if outcome != Outcome::Nothing {
            debug!(?side, ?interaction, tile = index.get(), ?outcome, "interaction");
        }

        match outcome {
            Outcome::Nothing => {}
            Outcome::Took(item) => out_events.push(Event::ItemTaken {
                side,
                tile: index,
                item,
            }),
            Outcome::Planted(crop) => out_events.push(Event::SeedPlanted {
                side,
                tile: index,
                crop,
            }),
            Outcome::Applied(state) => out_events.push(Event::ResourceApplied {
                side,
                tile: index,
                state,
            }),
            Outcome::Harvested(crop) => out_events.push(Event::CropHarvested {
                side,
                tile: index,
                crop,
            }),
            Outcome::Discarded(item) => out_events.push(Event::ItemDiscarded { side, item }),
            Outcome::Delivered(crop) => self.resolve_delivery(side, index, crop, out_events),
        }
    }

    fn resolve_delivery(
        &mut self,
        side: Side,
        tile: TileIndex,
        crop: CropType,
        out_events: &mut Vec<Event>,
    ) {
        match self.ledger.deliver(side, crop) {
            Delivery::Rejected => {
                debug!(?side, crop = crop.name(), "delivery rejected");
                out_events.push(Event::ProduceRejected { side, tile, crop });
            }
            Delivery::Accepted { request } => {
                self.scores.record_delivery(side);
                out_events.push(Event::ProduceSold {
                    side,
                    tile,
                    crop,
                    request,
                });

                if let Some(completion) = self.ledger.try_complete() {
                    self.scores.record_completion(completion.award);
                    info!(
                        request = completion.request,
                        player_points = completion.award.player_points,
                        ai_points = completion.award.ai_points,
                        "request completed"
                    );
                    out_events.push(Event::RequestCompleted {
                        request: completion.request,
                        award: completion.award,
                    });
                    if completion.exhausted {
                        info!("all requests completed");
                        out_events.push(Event::AllRequestsCompleted);
                    }
                }
            }
        }
    }

    fn tick(&mut self, dt: Duration, out_events: &mut Vec<Event>) {
        let mut grown = Vec::new();
        self.grid
            .advance_growth(dt, self.growth_duration, &mut grown);
        for (tile, crop) in grown {
            out_events.push(Event::CropGrown { tile, crop });
        }

        self.remaining = self.remaining.saturating_sub(dt);
        out_events.push(Event::TimeAdvanced {
            dt,
            remaining: self.remaining,
        });

        if self.remaining.is_zero() {
            self.ended = true;
            let report = self.report();
            info!(
                player = report.player.score,
                ai = report.ai.score,
                winner = ?report.winner,
                "match ended"
            );
            out_events.push(Event::MatchEnded { report });
        }
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

/// Applies the provided command to the world, mutating state deterministically.
///
/// Once the match has ended every command except [`Command::ConfigureMatch`]
/// is ignored. While paused only pause changes and reconfiguration apply.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    if let Command::ConfigureMatch { setup } = command {
        *world = World::from_setup(&setup);
        out_events.push(Event::MatchConfigured {
            level: world.level,
            request_count: world.ledger.requests().len(),
        });
        return;
    }

    if world.ended {
        return;
    }

    match command {
        Command::ConfigureMatch { .. } => {}
        Command::SetPaused { paused } => {
            if world.paused != paused {
                world.paused = paused;
                out_events.push(Event::PauseChanged { paused });
            }
        }
        _ if world.paused => {}
        Command::MoveAgent {
            side,
            direction,
            dt,
        } => {
            let agent = world.agents[side.index()];
            let candidate = motion::step(agent.position(), direction, agent.speed(), dt);
            if candidate != agent.position() && world.arena.admits(side, candidate) {
                world.relocate(side, candidate, out_events);
            }
        }
        Command::Wander { dt } => {
            let position = world.agents[Side::Ai.index()].position();
            let candidate = motion::step(position, world.heading.vector(), world.wander_speed, dt);
            if world.arena.admits(Side::Ai, candidate) {
                if candidate != position {
                    world.relocate(Side::Ai, candidate, out_events);
                }
            } else {
                world.heading = world.heading.reversed();
                out_events.push(Event::WanderReversed);
            }
        }
        Command::Interact { side, interaction } => world.interact(side, interaction, out_events),
        Command::Tick { dt } => world.tick(dt, out_events),
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use std::time::Duration;

    use crop_rivals_core::{Level, MatchReport, Side, SideTally};
    use glam::Vec2;

    use super::World;
    use crate::{
        motion::{Agent, Arena},
        requests::RequestLedger,
        tiles::TileGrid,
    };

    /// Retrieves the welcome banner that adapters may display to players.
    #[must_use]
    pub fn welcome_banner(world: &World) -> &'static str {
        world.banner
    }

    /// Level being played.
    #[must_use]
    pub fn level(world: &World) -> Level {
        world.level
    }

    /// Provides read-only access to the world's tile grid.
    #[must_use]
    pub fn tile_grid(world: &World) -> &TileGrid {
        &world.grid
    }

    /// Geometry constraining agent movement.
    #[must_use]
    pub fn arena(world: &World) -> &Arena {
        &world.arena
    }

    /// Provides read-only access to the requested agent.
    #[must_use]
    pub fn agent(world: &World, side: Side) -> &Agent {
        &world.agents[side.index()]
    }

    /// Reports whether the agent of the provided side may stand at the position.
    #[must_use]
    pub fn can_occupy(world: &World, side: Side, position: Vec2) -> bool {
        world.arena.admits(side, position)
    }

    /// Provides read-only access to the order queue.
    #[must_use]
    pub fn ledger(world: &World) -> &RequestLedger {
        &world.ledger
    }

    /// Statistics accumulated by the provided side.
    #[must_use]
    pub fn tally(world: &World, side: Side) -> SideTally {
        world.scores.tally(side)
    }

    /// Countdown remaining in the match.
    #[must_use]
    pub fn remaining_time(world: &World) -> Duration {
        world.remaining
    }

    /// Reports whether the simulation is paused.
    #[must_use]
    pub fn is_paused(world: &World) -> bool {
        world.paused
    }

    /// Reports whether the countdown expired.
    #[must_use]
    pub fn is_over(world: &World) -> bool {
        world.ended
    }

    /// Current statistics and the winner they would produce.
    #[must_use]
    pub fn report(world: &World) -> MatchReport {
        world.report()
    }
}
