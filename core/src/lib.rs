#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Crop Rivals engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters and systems submit
//! [`Command`] values describing desired mutations, the world executes those
//! commands via its `apply` entry point, and then broadcasts [`Event`] values
//! that systems react to deterministically on the next tick.

use std::time::Duration;

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Canonical banner emitted when the experience boots.
pub const WELCOME_BANNER: &str = "Welcome to Crop Rivals.";

/// Points awarded for every unit that satisfies the current request.
pub const DELIVERY_POINTS: u32 = 5;

/// Completion bonus multiplier applied to the total quantity of a request.
pub const COMPLETION_POINTS_PER_UNIT: u32 = 3;

/// Identifies one of the two competing agents.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Side {
    /// The human-controlled farmer working the left half of the map.
    Player,
    /// The scripted farmer working the right half of the map.
    Ai,
}

impl Side {
    /// Both sides in their canonical order.
    pub const BOTH: [Side; 2] = [Side::Player, Side::Ai];

    /// Dense index used to address per-side storage.
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::Player => 0,
            Self::Ai => 1,
        }
    }
}

/// Crops that can be grown, harvested, and requested.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CropType {
    /// Dispensed by seed boxes marked `1`.
    Tomato,
    /// Dispensed by seed boxes marked `2`.
    Corn,
    /// Dispensed by seed boxes marked `4`.
    Carrot,
    /// Dispensed by seed boxes marked `3`.
    Potato,
    /// Dispensed by seed boxes marked `5`.
    Lettuce,
}

impl CropType {
    /// Every crop in declaration order.
    pub const ALL: [CropType; 5] = [
        CropType::Tomato,
        CropType::Corn,
        CropType::Carrot,
        CropType::Potato,
        CropType::Lettuce,
    ];

    /// Human readable name of the crop.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Tomato => "Tomato",
            Self::Corn => "Corn",
            Self::Carrot => "Carrot",
            Self::Potato => "Potato",
            Self::Lettuce => "Lettuce",
        }
    }
}

/// Fixed category of a tile, assigned once when a level loads.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum GroundType {
    /// Plain walkable floor without any interaction.
    #[default]
    Empty,
    /// Plot where seeds can be planted and crops grow.
    Soil,
    /// Delivery point where harvested produce is sold.
    Market,
    /// Station dispensing seeds of a single crop.
    SeedBox,
    /// Station dispensing water.
    WaterSource,
    /// Station dispensing sunlight.
    SunSource,
    /// Bin that discards whatever an agent carries.
    Trash,
}

/// Growth lifecycle stage of a soil tile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum GrowthState {
    /// Nothing is planted.
    #[default]
    Empty,
    /// A seed was planted and awaits care.
    Seeded,
    /// The seed was watered.
    Watered,
    /// The seed received sunlight.
    Sunned,
    /// The crop is ready for harvest.
    Grown,
}

impl GrowthState {
    /// Reports whether the growth timer advances in this state.
    #[must_use]
    pub const fn is_growing(self) -> bool {
        !matches!(self, Self::Empty | Self::Grown)
    }
}

/// Item held by an agent. At most one item is carried at a time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Carried {
    /// Empty hands.
    #[default]
    Nothing,
    /// A seed of the given crop taken from a seed box.
    Seed(CropType),
    /// A portion of water.
    Water,
    /// A portion of sunlight.
    Sun,
    /// Harvested produce of the given crop.
    Product(CropType),
}

impl Carried {
    /// Reports whether the agent has empty hands.
    #[must_use]
    pub const fn is_nothing(self) -> bool {
        matches!(self, Self::Nothing)
    }

    /// Crop of the carried produce, if produce is held.
    #[must_use]
    pub const fn product(self) -> Option<CropType> {
        match self {
            Self::Product(crop) => Some(crop),
            _ => None,
        }
    }
}

/// The two interaction verbs exposed to the input layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Interaction {
    /// Take a seed, water, or sun from a station, or harvest a grown crop.
    Take,
    /// Plant, water, or sun a plot, sell at the market, or discard at the trash.
    Drop,
}

/// Location of a single tile expressed as column and row coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TileCoord {
    column: u32,
    row: u32,
}

impl TileCoord {
    /// Creates a new tile coordinate.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the tile.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index of the tile.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }

    /// Computes the Manhattan distance between two tile coordinates.
    #[must_use]
    pub fn manhattan_distance(self, other: TileCoord) -> u32 {
        self.column().abs_diff(other.column()) + self.row().abs_diff(other.row())
    }
}

/// Row-major index of a tile within the grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TileIndex(u32);

impl TileIndex {
    /// Creates a new tile index wrapper.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the underlying row-major index.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }

    /// Index usable for slice addressing.
    #[must_use]
    pub fn slot(self) -> usize {
        usize::try_from(self.0).unwrap_or(usize::MAX)
    }
}

/// Dimensions of the tile grid measured in whole tiles.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridSize {
    columns: u32,
    rows: u32,
}

impl GridSize {
    /// Creates a new grid size descriptor.
    #[must_use]
    pub const fn new(columns: u32, rows: u32) -> Self {
        Self { columns, rows }
    }

    /// Number of columns in the grid.
    #[must_use]
    pub const fn columns(&self) -> u32 {
        self.columns
    }

    /// Number of rows in the grid.
    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.rows
    }

    /// Total number of tiles.
    #[must_use]
    pub fn tile_count(&self) -> usize {
        let count = u64::from(self.columns) * u64::from(self.rows);
        usize::try_from(count).unwrap_or(0)
    }

    /// Reports whether the index addresses a tile inside the grid.
    #[must_use]
    pub fn contains(&self, index: TileIndex) -> bool {
        index.slot() < self.tile_count()
    }

    /// Converts a coordinate into a row-major index, if it lies inside the grid.
    #[must_use]
    pub fn index_of(&self, coord: TileCoord) -> Option<TileIndex> {
        if coord.column() >= self.columns || coord.row() >= self.rows {
            return None;
        }
        let index = coord.row().checked_mul(self.columns)?.checked_add(coord.column())?;
        Some(TileIndex::new(index))
    }

    /// Converts a row-major index back into a coordinate.
    #[must_use]
    pub fn coord_of(&self, index: TileIndex) -> Option<TileCoord> {
        if self.columns == 0 || !self.contains(index) {
            return None;
        }
        Some(TileCoord::new(
            index.get() % self.columns,
            index.get() / self.columns,
        ))
    }
}

/// Static content of a single tile as described by a level layout.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct GroundCell {
    /// Fixed ground category.
    pub ground: GroundType,
    /// Crop dispensed by a seed box; `None` for every other ground type.
    pub crop: Option<CropType>,
}

impl GroundCell {
    /// Walkable floor without any station.
    pub const EMPTY: GroundCell = GroundCell {
        ground: GroundType::Empty,
        crop: None,
    };

    /// Creates a cell of the provided ground type without a crop.
    #[must_use]
    pub const fn plain(ground: GroundType) -> Self {
        Self { ground, crop: None }
    }

    /// Creates a seed box dispensing the provided crop.
    #[must_use]
    pub const fn seed_box(crop: CropType) -> Self {
        Self {
            ground: GroundType::SeedBox,
            crop: Some(crop),
        }
    }
}

/// Ground layout of a level in row-major order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelLayout {
    size: GridSize,
    cells: Vec<GroundCell>,
}

impl LevelLayout {
    /// Creates a layout of the provided size where every tile is empty floor.
    #[must_use]
    pub fn empty(size: GridSize) -> Self {
        Self {
            size,
            cells: vec![GroundCell::EMPTY; size.tile_count()],
        }
    }

    /// Dimensions of the layout.
    #[must_use]
    pub const fn size(&self) -> GridSize {
        self.size
    }

    /// Cell stored at the provided index, or empty floor when out of range.
    #[must_use]
    pub fn cell(&self, index: TileIndex) -> GroundCell {
        self.cells
            .get(index.slot())
            .copied()
            .unwrap_or(GroundCell::EMPTY)
    }

    /// Overwrites the cell at the provided coordinate. Returns `false` when the
    /// coordinate lies outside the layout.
    pub fn set(&mut self, coord: TileCoord, cell: GroundCell) -> bool {
        let Some(index) = self.size.index_of(coord) else {
            return false;
        };
        match self.cells.get_mut(index.slot()) {
            Some(slot) => {
                *slot = cell;
                true
            }
            None => false,
        }
    }

    /// Iterator over all cells in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = &GroundCell> {
        self.cells.iter()
    }
}

/// Difficulty level of a match, starting at one.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Level(u32);

impl Level {
    /// Creates a level identifier. Zero is promoted to the first level.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        if value == 0 {
            Self(1)
        } else {
            Self(value)
        }
    }

    /// Retrieves the one-based level number.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// One crop and the quantity demanded for it in an order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OrderLine {
    /// Requested crop.
    pub crop: CropType,
    /// Number of units demanded.
    pub quantity: u32,
}

/// Immutable description of an order used to seed the request ledger.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct OrderSpec {
    lines: Vec<OrderLine>,
}

impl OrderSpec {
    /// Creates an order from the provided lines.
    #[must_use]
    pub fn new(lines: Vec<OrderLine>) -> Self {
        Self { lines }
    }

    /// Lines composing the order.
    #[must_use]
    pub fn lines(&self) -> &[OrderLine] {
        &self.lines
    }

    /// Sum of every line's quantity.
    #[must_use]
    pub fn total_quantity(&self) -> u32 {
        self.lines.iter().map(|line| line.quantity).sum()
    }
}

/// Axis-aligned rectangle agents must stay within.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlayArea {
    min: Vec2,
    max: Vec2,
}

impl PlayArea {
    /// Creates a play area from its minimum and maximum corners.
    #[must_use]
    pub const fn new(min: Vec2, max: Vec2) -> Self {
        Self { min, max }
    }

    /// Upper-left corner.
    #[must_use]
    pub const fn min(&self) -> Vec2 {
        self.min
    }

    /// Horizontal extent.
    #[must_use]
    pub fn width(&self) -> f32 {
        self.max.x - self.min.x
    }

    /// Vertical extent.
    #[must_use]
    pub fn height(&self) -> f32 {
        self.max.y - self.min.y
    }

    /// Reports whether a circle lies entirely inside the area.
    #[must_use]
    pub fn contains_circle(&self, center: Vec2, radius: f32) -> bool {
        center.x - radius >= self.min.x
            && center.y - radius >= self.min.y
            && center.x + radius <= self.max.x
            && center.y + radius <= self.max.y
    }
}

/// Vertical band separating the player's half from the AI's half.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Partition {
    left: f32,
    right: f32,
}

impl Partition {
    /// Creates a band of the provided width centred horizontally in the area.
    #[must_use]
    pub fn centered_in(area: &PlayArea, width: f32) -> Self {
        let center = area.min().x + area.width() * 0.5;
        let half = width.max(0.0) * 0.5;
        Self {
            left: center - half,
            right: center + half,
        }
    }

    /// Left edge of the band.
    #[must_use]
    pub const fn left(&self) -> f32 {
        self.left
    }

    /// Right edge of the band.
    #[must_use]
    pub const fn right(&self) -> f32 {
        self.right
    }

    /// Reports whether a circle stays on the provided side of the band.
    #[must_use]
    pub fn admits(&self, side: Side, center: Vec2, radius: f32) -> bool {
        match side {
            Side::Player => center.x + radius <= self.left,
            Side::Ai => center.x - radius >= self.right,
        }
    }
}

/// Everything the world needs to start a match.
#[derive(Clone, Debug, PartialEq)]
pub struct MatchSetup {
    /// Difficulty level being played.
    pub level: Level,
    /// Ground layout of the level.
    pub layout: LevelLayout,
    /// Side length of a square tile in world units.
    pub tile_length: f32,
    /// Width of the partition band separating both halves.
    pub partition_width: f32,
    /// Radius of both agents' bounding circles.
    pub agent_radius: f32,
    /// Movement speed of the human agent in world units per second.
    pub player_speed: f32,
    /// Path-following speed of the AI agent in world units per second.
    pub ai_speed: f32,
    /// Speed of the AI's idle bounce in world units per second.
    pub wander_speed: f32,
    /// Time a planted plot needs before the crop is grown.
    pub growth_duration: Duration,
    /// Length of the match countdown.
    pub match_duration: Duration,
    /// Orders to queue, in the order they must be fulfilled.
    pub orders: Vec<OrderSpec>,
}

/// Points and credits granted when a request completes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct CompletionAward {
    /// Bonus points for the player.
    pub player_points: u32,
    /// Bonus points for the AI.
    pub ai_points: u32,
    /// Whether the player's completed-request counter increments.
    pub player_credited: bool,
    /// Whether the AI's completed-request counter increments.
    pub ai_credited: bool,
}

impl CompletionAward {
    /// Bonus points granted to the provided side.
    #[must_use]
    pub const fn points_for(&self, side: Side) -> u32 {
        match side {
            Side::Player => self.player_points,
            Side::Ai => self.ai_points,
        }
    }

    /// Whether the provided side receives a completed-request credit.
    #[must_use]
    pub const fn credits(&self, side: Side) -> bool {
        match side {
            Side::Player => self.player_credited,
            Side::Ai => self.ai_credited,
        }
    }
}

/// Cumulative scoring statistics of one side.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct SideTally {
    /// Total points earned.
    pub score: u32,
    /// Requests this side was credited with completing.
    pub completed_requests: u32,
    /// Units delivered that matched the current request.
    pub correct_deliveries: u32,
}

/// Outcome of a finished match.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Winner {
    /// The human agent won.
    Player,
    /// The AI agent won.
    Ai,
    /// Every tie-breaker was level.
    Tie,
}

/// Final statistics handed to the persistence collaborator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MatchReport {
    /// Level that was played.
    pub level: Level,
    /// Statistics of the human agent.
    pub player: SideTally,
    /// Statistics of the AI agent.
    pub ai: SideTally,
    /// Decided winner.
    pub winner: Winner,
}

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Resets the world and starts a new match with the provided setup.
    ConfigureMatch {
        /// Complete description of the match to start.
        setup: Box<MatchSetup>,
    },
    /// Pauses or resumes the simulation.
    SetPaused {
        /// Whether the simulation should be paused.
        paused: bool,
    },
    /// Moves an agent along the provided direction for one time step.
    MoveAgent {
        /// Agent being moved.
        side: Side,
        /// Direction of travel; vectors longer than one are normalised.
        direction: Vec2,
        /// Duration of the time step.
        dt: Duration,
    },
    /// Advances the AI's idle bounce along the horizontal axis.
    Wander {
        /// Duration of the time step.
        dt: Duration,
    },
    /// Performs an interaction on the tile under the agent.
    Interact {
        /// Acting agent.
        side: Side,
        /// Verb to perform.
        interaction: Interaction,
    },
    /// Advances crop growth and the match countdown.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Announces that a new match started.
    MatchConfigured {
        /// Level being played.
        level: Level,
        /// Number of queued requests.
        request_count: usize,
    },
    /// Announces that the pause state changed.
    PauseChanged {
        /// Whether the simulation is now paused.
        paused: bool,
    },
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
        /// Countdown remaining after the tick.
        remaining: Duration,
    },
    /// Confirms that an agent moved.
    AgentMoved {
        /// Agent that moved.
        side: Side,
        /// Position before the move.
        from: Vec2,
        /// Position after the move.
        to: Vec2,
    },
    /// Reports that the AI's idle bounce hit a boundary and reversed.
    WanderReversed,
    /// Confirms that an agent picked up an item from a station.
    ItemTaken {
        /// Acting agent.
        side: Side,
        /// Station tile.
        tile: TileIndex,
        /// Item now carried.
        item: Carried,
    },
    /// Confirms that a seed was planted.
    SeedPlanted {
        /// Acting agent.
        side: Side,
        /// Soil tile.
        tile: TileIndex,
        /// Crop that was planted.
        crop: CropType,
    },
    /// Confirms that water or sun was applied to a seeded plot.
    ResourceApplied {
        /// Acting agent.
        side: Side,
        /// Soil tile.
        tile: TileIndex,
        /// Growth state entered by the plot.
        state: GrowthState,
    },
    /// Reports that a plot finished growing.
    CropGrown {
        /// Soil tile.
        tile: TileIndex,
        /// Crop that is ready.
        crop: CropType,
    },
    /// Confirms that a grown crop was harvested.
    CropHarvested {
        /// Acting agent.
        side: Side,
        /// Soil tile.
        tile: TileIndex,
        /// Harvested crop.
        crop: CropType,
    },
    /// Confirms a delivery that satisfied the current request.
    ProduceSold {
        /// Acting agent.
        side: Side,
        /// Market tile, used as a delivery hint by presentation layers.
        tile: TileIndex,
        /// Delivered crop.
        crop: CropType,
        /// Zero-based position of the request in the queue.
        request: usize,
    },
    /// Reports a delivery the current request did not need.
    ProduceRejected {
        /// Acting agent.
        side: Side,
        /// Market tile.
        tile: TileIndex,
        /// Rejected crop.
        crop: CropType,
    },
    /// Confirms that an item was thrown away.
    ItemDiscarded {
        /// Acting agent.
        side: Side,
        /// Discarded item.
        item: Carried,
    },
    /// Announces that a request was fulfilled and the queue advanced.
    RequestCompleted {
        /// Zero-based position of the completed request.
        request: usize,
        /// Bonus granted for the completion.
        award: CompletionAward,
    },
    /// Announces that the final queued request was fulfilled.
    AllRequestsCompleted,
    /// Announces that the countdown expired.
    MatchEnded {
        /// Final statistics of the match.
        report: MatchReport,
    },
}
