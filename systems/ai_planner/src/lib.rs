#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Goal-directed planner that drives the AI farmer.
//!
//! The planner reads the world through its query surface and emits the same
//! commands the human adapter does: `MoveAgent`, `Interact`, and the idle
//! `Wander`. It runs once per simulation tick and advances at most one state
//! transition per call.
//!
//! The idle bounce is owned by the planner: `Wander` is issued only while the
//! planner sits in [`PlannerState::Idle`], so the bounce never fights a route
//! being followed or a plot being waited on.

use std::time::Duration;

use crop_rivals_core::{Carried, Command, CropType, Event, GroundType, Interaction, Side, TileIndex};
use crop_rivals_system_pathfinding::{admissible_for, find_path};
use crop_rivals_world::{motion, query, tiles::Tile, World};
use glam::Vec2;
use tracing::debug;

/// Default distance below which a waypoint counts as reached.
pub const DEFAULT_ARRIVE_THRESHOLD: f32 = 4.0;

/// Default time spent idling before goals are re-evaluated.
pub const DEFAULT_IDLE_DELAY: Duration = Duration::from_millis(200);

/// Tuning knobs of the planner.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlannerConfig {
    /// Distance below which a waypoint counts as reached.
    pub arrive_threshold: f32,
    /// Time spent idling before goals are re-evaluated.
    pub idle_delay: Duration,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            arrive_threshold: DEFAULT_ARRIVE_THRESHOLD,
            idle_delay: DEFAULT_IDLE_DELAY,
        }
    }
}

/// Ordered tiles the AI walks through, with a cursor on the next waypoint.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Route {
    tiles: Vec<TileIndex>,
    cursor: usize,
}

impl Route {
    fn new(tiles: Vec<TileIndex>) -> Option<Self> {
        if tiles.is_empty() {
            None
        } else {
            Some(Self { tiles, cursor: 0 })
        }
    }

    /// Position of the waypoint currently steered toward.
    #[must_use]
    pub const fn cursor(&self) -> usize {
        self.cursor
    }

    /// Final tile of the route.
    #[must_use]
    pub fn goal(&self) -> Option<TileIndex> {
        self.tiles.last().copied()
    }
}

/// State of the AI farmer's action cycle.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PlannerState {
    /// Choosing the next crop to work on.
    SelectGoal,
    /// Walking to a seed box dispensing the crop.
    GoToSeeds {
        /// Crop being pursued.
        crop: CropType,
        /// Route to the seed box, cleared when movement is refused.
        route: Option<Route>,
    },
    /// Walking to an empty plot carrying a seed.
    GoToPlant {
        /// Crop being pursued.
        crop: CropType,
        /// Route to the plot.
        route: Option<Route>,
    },
    /// Standing still until a plot of the crop is grown.
    WaitForGrowth {
        /// Crop being pursued.
        crop: CropType,
    },
    /// Walking to a grown plot of the crop.
    Harvest {
        /// Crop being pursued.
        crop: CropType,
        /// Route to the grown plot.
        route: Option<Route>,
    },
    /// Walking to the market carrying produce.
    GoToMarket {
        /// Crop being carried.
        crop: CropType,
        /// Route to the market.
        route: Option<Route>,
    },
    /// Bouncing in place before re-evaluating goals.
    Idle {
        /// Time spent idling so far.
        elapsed: Duration,
    },
}

impl PlannerState {
    /// Short label used in diagnostics.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::SelectGoal => "select-goal",
            Self::GoToSeeds { .. } => "go-to-seeds",
            Self::GoToPlant { .. } => "go-to-plant",
            Self::WaitForGrowth { .. } => "wait-for-growth",
            Self::Harvest { .. } => "harvest",
            Self::GoToMarket { .. } => "go-to-market",
            Self::Idle { .. } => "idle",
        }
    }

    const fn idle() -> Self {
        Self::Idle {
            elapsed: Duration::ZERO,
        }
    }
}

/// Semantic category of a planner destination.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GoalKind {
    /// A seed box dispensing the crop.
    SeedBox(CropType),
    /// A soil plot with nothing planted.
    EmptySoil,
    /// A soil plot holding the grown crop.
    GrownSoil(CropType),
    /// Any market tile.
    Market,
}

impl GoalKind {
    /// Reports whether the tile belongs to this category.
    #[must_use]
    pub fn matches(self, tile: &Tile) -> bool {
        match self {
            Self::SeedBox(crop) => tile.dispenses(crop),
            Self::EmptySoil => tile.is_empty_soil(),
            Self::GrownSoil(crop) => tile.grown_crop() == Some(crop),
            Self::Market => tile.ground() == GroundType::Market,
        }
    }
}

/// System that turns world state into AI commands.
#[derive(Debug)]
pub struct AiPlanner {
    state: PlannerState,
    config: PlannerConfig,
}

impl AiPlanner {
    /// Creates a planner that starts by selecting a goal.
    #[must_use]
    pub fn new(config: PlannerConfig) -> Self {
        Self {
            state: PlannerState::SelectGoal,
            config,
        }
    }

    /// Current state of the action cycle.
    #[must_use]
    pub fn state(&self) -> &PlannerState {
        &self.state
    }

    /// Consumes world events and the world view to emit one tick of AI commands.
    pub fn handle(&mut self, events: &[Event], world: &World, dt: Duration, out: &mut Vec<Command>) {
        for event in events {
            if matches!(
                event,
                Event::RequestCompleted { .. } | Event::MatchConfigured { .. }
            ) {
                self.transition(PlannerState::SelectGoal);
            }
        }

        if query::is_over(world) || query::is_paused(world) {
            return;
        }

        let context = Context {
            world,
            dt,
            config: self.config,
        };
        let next = context.advance(self.state.clone(), out);
        self.transition(next);
    }

    fn transition(&mut self, next: PlannerState) {
        if self.state.name() != next.name() {
            debug!(from = self.state.name(), to = next.name(), "ai planner transition");
        }
        self.state = next;
    }
}

impl Default for AiPlanner {
    fn default() -> Self {
        Self::new(PlannerConfig::default())
    }
}

/// Outcome of steering along a route for one tick.
enum Progress {
    Moving,
    Arrived(TileIndex),
    Blocked,
}

struct Context<'a> {
    world: &'a World,
    dt: Duration,
    config: PlannerConfig,
}

impl Context<'_> {
    fn advance(&self, state: PlannerState, out: &mut Vec<Command>) -> PlannerState {
        match state {
            PlannerState::SelectGoal => self.select_goal(),
            PlannerState::GoToSeeds { crop, route } => self.go_to_seeds(crop, route, out),
            PlannerState::GoToPlant { crop, route } => self.go_to_plant(crop, route, out),
            PlannerState::WaitForGrowth { crop } => self.wait_for_growth(crop),
            PlannerState::Harvest { crop, route } => self.harvest(crop, route, out),
            PlannerState::GoToMarket { crop, route } => self.go_to_market(crop, route, out),
            PlannerState::Idle { elapsed } => {
                out.push(Command::Wander { dt: self.dt });
                let elapsed = elapsed.saturating_add(self.dt);
                if elapsed >= self.config.idle_delay {
                    PlannerState::SelectGoal
                } else {
                    PlannerState::Idle { elapsed }
                }
            }
        }
    }

    fn select_goal(&self) -> PlannerState {
        match self.carried() {
            Carried::Seed(crop) => {
                return match self.plan(GoalKind::EmptySoil) {
                    Some(route) => PlannerState::GoToPlant {
                        crop,
                        route: Some(route),
                    },
                    None => PlannerState::idle(),
                };
            }
            Carried::Product(crop) => {
                return match self.plan(GoalKind::Market) {
                    Some(route) => PlannerState::GoToMarket {
                        crop,
                        route: Some(route),
                    },
                    None => PlannerState::idle(),
                };
            }
            Carried::Nothing | Carried::Water | Carried::Sun => {}
        }

        let Some(crop) = self.target_crop() else {
            return PlannerState::idle();
        };
        match self.plan(GoalKind::SeedBox(crop)) {
            Some(route) => PlannerState::GoToSeeds {
                crop,
                route: Some(route),
            },
            None => PlannerState::idle(),
        }
    }

    fn go_to_seeds(
        &self,
        crop: CropType,
        route: Option<Route>,
        out: &mut Vec<Command>,
    ) -> PlannerState {
        let Some(mut route) = route.or_else(|| self.plan(GoalKind::SeedBox(crop))) else {
            return PlannerState::SelectGoal;
        };

        match self.follow(&mut route, out) {
            Progress::Moving => PlannerState::GoToSeeds {
                crop,
                route: Some(route),
            },
            Progress::Blocked => PlannerState::GoToSeeds { crop, route: None },
            Progress::Arrived(tile) => {
                if !self.carried().is_nothing() || !self.tile_is(tile, GoalKind::SeedBox(crop)) {
                    return PlannerState::SelectGoal;
                }
                out.push(Command::Interact {
                    side: Side::Ai,
                    interaction: Interaction::Take,
                });
                match self.plan(GoalKind::EmptySoil) {
                    Some(route) => PlannerState::GoToPlant {
                        crop,
                        route: Some(route),
                    },
                    None => PlannerState::idle(),
                }
            }
        }
    }

    fn go_to_plant(
        &self,
        crop: CropType,
        route: Option<Route>,
        out: &mut Vec<Command>,
    ) -> PlannerState {
        let Some(mut route) = route else {
            return PlannerState::SelectGoal;
        };

        match self.follow(&mut route, out) {
            Progress::Moving => PlannerState::GoToPlant {
                crop,
                route: Some(route),
            },
            Progress::Blocked => PlannerState::GoToPlant { crop, route: None },
            Progress::Arrived(tile) => {
                if self.carried() != Carried::Seed(crop) || !self.tile_is(tile, GoalKind::EmptySoil)
                {
                    return PlannerState::SelectGoal;
                }
                out.push(Command::Interact {
                    side: Side::Ai,
                    interaction: Interaction::Drop,
                });
                PlannerState::WaitForGrowth { crop }
            }
        }
    }

    fn wait_for_growth(&self, crop: CropType) -> PlannerState {
        match self.plan(GoalKind::GrownSoil(crop)) {
            Some(route) => PlannerState::Harvest {
                crop,
                route: Some(route),
            },
            None => PlannerState::WaitForGrowth { crop },
        }
    }

    fn harvest(&self, crop: CropType, route: Option<Route>, out: &mut Vec<Command>) -> PlannerState {
        let Some(mut route) = route else {
            return PlannerState::WaitForGrowth { crop };
        };

        match self.follow(&mut route, out) {
            Progress::Moving => PlannerState::Harvest {
                crop,
                route: Some(route),
            },
            Progress::Blocked => PlannerState::Harvest { crop, route: None },
            Progress::Arrived(tile) => {
                if !self.carried().is_nothing() || !self.tile_is(tile, GoalKind::GrownSoil(crop)) {
                    return PlannerState::WaitForGrowth { crop };
                }
                out.push(Command::Interact {
                    side: Side::Ai,
                    interaction: Interaction::Take,
                });
                match self.plan(GoalKind::Market) {
                    Some(route) => PlannerState::GoToMarket {
                        crop,
                        route: Some(route),
                    },
                    None => PlannerState::SelectGoal,
                }
            }
        }
    }

    fn go_to_market(
        &self,
        crop: CropType,
        route: Option<Route>,
        out: &mut Vec<Command>,
    ) -> PlannerState {
        let Some(mut route) = route else {
            return PlannerState::SelectGoal;
        };

        match self.follow(&mut route, out) {
            Progress::Moving => PlannerState::GoToMarket {
                crop,
                route: Some(route),
            },
            Progress::Blocked => PlannerState::GoToMarket { crop, route: None },
            Progress::Arrived(tile) => {
                if self.carried().product().is_some() && self.tile_is(tile, GoalKind::Market) {
                    out.push(Command::Interact {
                        side: Side::Ai,
                        interaction: Interaction::Drop,
                    });
                }
                PlannerState::SelectGoal
            }
        }
    }

    fn carried(&self) -> Carried {
        query::agent(self.world, Side::Ai).carried()
    }

    fn position(&self) -> Vec2 {
        query::agent(self.world, Side::Ai).position()
    }

    fn tile_is(&self, index: TileIndex, kind: GoalKind) -> bool {
        let grid = query::tile_grid(self.world);
        grid.tile_index_at(self.position()) == Some(index)
            && grid.tile(index).is_some_and(|tile| kind.matches(tile))
    }

    /// Crop the current request needs most, or the first crop any seed box offers.
    fn target_crop(&self) -> Option<CropType> {
        let needed = query::ledger(self.world)
            .current()
            .and_then(|request| request.most_needed())
            .map(|item| item.crop());
        needed.or_else(|| {
            query::tile_grid(self.world)
                .iter()
                .find(|(_, tile)| tile.ground() == GroundType::SeedBox && tile.crop().is_some())
                .and_then(|(_, tile)| tile.crop())
        })
    }

    /// Nearest tile of the category by Euclidean distance from the AI.
    fn nearest(&self, kind: GoalKind, admissible_only: bool) -> Option<TileIndex> {
        let grid = query::tile_grid(self.world);
        let admissible = admissible_for(grid, query::arena(self.world), Side::Ai);
        let origin = self.position();

        grid.iter()
            .filter(|(index, tile)| kind.matches(tile) && (!admissible_only || admissible(*index)))
            .filter_map(|(index, _)| {
                grid.tile_center(index)
                    .map(|center| (index, center.distance_squared(origin)))
            })
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(index, _)| index)
    }

    /// Routes to the nearest tile of the category, falling back to the nearest
    /// one on the AI's own half when the first choice is unreachable.
    fn plan(&self, kind: GoalKind) -> Option<Route> {
        let grid = query::tile_grid(self.world);
        let start = grid.tile_index_at(self.position())?;
        let goal = self.nearest(kind, false)?;
        let route_to = |goal: TileIndex| {
            find_path(
                grid.size(),
                start,
                goal,
                admissible_for(grid, query::arena(self.world), Side::Ai),
            )
        };

        if let Some(route) = Route::new(route_to(goal)) {
            return Some(route);
        }

        let substitute = self.nearest(kind, true)?;
        if substitute == goal {
            return None;
        }
        debug!(?kind, tile = substitute.get(), "ai planner falling back to substitute goal");
        Route::new(route_to(substitute))
    }

    /// Steers toward the route's current waypoint for one tick.
    fn follow(&self, route: &mut Route, out: &mut Vec<Command>) -> Progress {
        let grid = query::tile_grid(self.world);
        let agent = query::agent(self.world, Side::Ai);
        let Some(&waypoint) = route.tiles.get(route.cursor) else {
            return Progress::Blocked;
        };
        let Some(center) = grid.tile_center(waypoint) else {
            return Progress::Blocked;
        };

        let offset = center - agent.position();
        let distance = offset.length();
        if distance <= self.config.arrive_threshold {
            if route.cursor + 1 >= route.tiles.len() {
                return Progress::Arrived(waypoint);
            }
            route.cursor += 1;
            return Progress::Moving;
        }

        let reach = agent.speed() * self.dt.as_secs_f32();
        if reach <= 0.0 {
            return Progress::Moving;
        }
        let direction = if distance > reach {
            offset / distance
        } else {
            offset / reach
        };

        let candidate = motion::step(agent.position(), direction, agent.speed(), self.dt);
        if !query::can_occupy(self.world, Side::Ai, candidate) {
            return Progress::Blocked;
        }

        out.push(Command::MoveAgent {
            side: Side::Ai,
            direction,
            dt: self.dt,
        });
        Progress::Moving
    }
}
