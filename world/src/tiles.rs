//! Tile grid ownership and the crop lifecycle state machine.

use std::time::Duration;

use crop_rivals_core::{
    Carried, CropType, GridSize, GroundCell, GroundType, GrowthState, Interaction, LevelLayout,
    PlayArea, TileCoord, TileIndex,
};
use glam::Vec2;

/// One cell of the simulation grid.
///
/// The ground type is fixed for the lifetime of a level. Only soil tiles
/// mutate their crop, growth state, and timer.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Tile {
    ground: GroundType,
    crop: Option<CropType>,
    growth: GrowthState,
    growth_timer: Duration,
    walkable: bool,
}

impl Tile {
    fn from_cell(cell: GroundCell) -> Self {
        let crop = match cell.ground {
            GroundType::SeedBox => cell.crop,
            _ => None,
        };
        Self {
            ground: cell.ground,
            crop,
            growth: GrowthState::Empty,
            growth_timer: Duration::ZERO,
            walkable: true,
        }
    }

    /// Fixed ground category of the tile.
    #[must_use]
    pub const fn ground(&self) -> GroundType {
        self.ground
    }

    /// Crop growing on a soil tile or dispensed by a seed box.
    #[must_use]
    pub const fn crop(&self) -> Option<CropType> {
        self.crop
    }

    /// Growth stage; always [`GrowthState::Empty`] for non-soil tiles.
    #[must_use]
    pub const fn growth(&self) -> GrowthState {
        self.growth
    }

    /// Time accumulated since the last growth transition.
    #[must_use]
    pub const fn growth_timer(&self) -> Duration {
        self.growth_timer
    }

    /// Reports whether agents may path across the tile.
    #[must_use]
    pub const fn is_walkable(&self) -> bool {
        self.walkable
    }

    /// Reports whether this is a soil tile with nothing planted.
    #[must_use]
    pub fn is_empty_soil(&self) -> bool {
        self.ground == GroundType::Soil && self.growth == GrowthState::Empty
    }

    /// Crop ready to harvest on this tile, if any.
    #[must_use]
    pub fn grown_crop(&self) -> Option<CropType> {
        if self.ground == GroundType::Soil && self.growth == GrowthState::Grown {
            self.crop
        } else {
            None
        }
    }

    /// Reports whether this tile is a seed box dispensing the provided crop.
    #[must_use]
    pub fn dispenses(&self, crop: CropType) -> bool {
        self.ground == GroundType::SeedBox && self.crop == Some(crop)
    }

    fn enter(&mut self, growth: GrowthState) {
        self.growth = growth;
        self.growth_timer = Duration::ZERO;
    }

    /// Advances the growth timer, returning the crop when the plot becomes grown.
    fn advance_growth(&mut self, dt: Duration, threshold: Duration) -> Option<CropType> {
        if self.ground != GroundType::Soil || !self.growth.is_growing() {
            return None;
        }

        self.growth_timer = self.growth_timer.saturating_add(dt);
        if self.growth_timer > threshold {
            self.enter(GrowthState::Grown);
            return self.crop;
        }
        None
    }
}

/// Result of applying an interaction verb to a tile.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// Preconditions did not hold; nothing changed.
    Nothing,
    /// The agent picked up the item from a station.
    Took(Carried),
    /// The agent planted a seed of the crop.
    Planted(CropType),
    /// The agent applied water or sun, moving the plot to the given state.
    Applied(GrowthState),
    /// The agent harvested the crop.
    Harvested(CropType),
    /// The agent handed produce over at the market; the ledger decides whether it counts.
    Delivered(CropType),
    /// The agent threw the item away.
    Discarded(Carried),
}

/// Applies one interaction to a tile and the acting agent's hands.
///
/// This is the single rule table shared by both agents. It never fails: when
/// preconditions do not hold, the inputs are returned untouched together with
/// [`Outcome::Nothing`].
#[must_use]
pub fn interact(tile: Tile, carried: Carried, interaction: Interaction) -> (Tile, Carried, Outcome) {
    let mut next = tile;
    let outcome = match (interaction, tile.ground, carried) {
        (Interaction::Take, GroundType::SeedBox, Carried::Nothing) => match tile.crop {
            Some(crop) => Outcome::Took(Carried::Seed(crop)),
            None => Outcome::Nothing,
        },
        (Interaction::Take, GroundType::WaterSource, Carried::Nothing) => {
            Outcome::Took(Carried::Water)
        }
        (Interaction::Take, GroundType::SunSource, Carried::Nothing) => Outcome::Took(Carried::Sun),
        (Interaction::Take, GroundType::Soil, Carried::Nothing) => match tile.grown_crop() {
            Some(crop) => {
                next.enter(GrowthState::Empty);
                next.crop = None;
                Outcome::Harvested(crop)
            }
            None => Outcome::Nothing,
        },
        (Interaction::Drop, GroundType::Soil, Carried::Seed(crop))
            if tile.growth == GrowthState::Empty =>
        {
            next.enter(GrowthState::Seeded);
            next.crop = Some(crop);
            Outcome::Planted(crop)
        }
        (Interaction::Drop, GroundType::Soil, Carried::Water)
            if tile.growth == GrowthState::Seeded =>
        {
            next.enter(GrowthState::Watered);
            Outcome::Applied(GrowthState::Watered)
        }
        (Interaction::Drop, GroundType::Soil, Carried::Sun) if tile.growth == GrowthState::Seeded => {
            next.enter(GrowthState::Sunned);
            Outcome::Applied(GrowthState::Sunned)
        }
        (Interaction::Drop, GroundType::Market, Carried::Product(crop)) => {
            Outcome::Delivered(crop)
        }
        (Interaction::Drop, GroundType::Trash, item) if !item.is_nothing() => {
            Outcome::Discarded(item)
        }
        _ => Outcome::Nothing,
    };

    let hands = match outcome {
        Outcome::Nothing => carried,
        Outcome::Took(item) => item,
        Outcome::Harvested(crop) => Carried::Product(crop),
        Outcome::Planted(_)
        | Outcome::Applied(_)
        | Outcome::Delivered(_)
        | Outcome::Discarded(_) => Carried::Nothing,
    };

    (next, hands, outcome)
}

/// Rectangular array of tiles plus the geometry mapping them into world space.
#[derive(Clone, Debug)]
pub struct TileGrid {
    size: GridSize,
    tile_length: f32,
    origin: Vec2,
    tiles: Vec<Tile>,
}

impl TileGrid {
    /// Builds a grid from a level layout with its upper-left corner at the origin.
    #[must_use]
    pub fn from_layout(layout: &LevelLayout, tile_length: f32) -> Self {
        Self {
            size: layout.size(),
            tile_length,
            origin: Vec2::ZERO,
            tiles: layout.iter().copied().map(Tile::from_cell).collect(),
        }
    }

    /// Dimensions of the grid in tiles.
    #[must_use]
    pub const fn size(&self) -> GridSize {
        self.size
    }

    /// Rectangle covered by the grid in world units.
    #[must_use]
    pub fn play_area(&self) -> PlayArea {
        let extent = Vec2::new(
            self.size.columns() as f32 * self.tile_length,
            self.size.rows() as f32 * self.tile_length,
        );
        PlayArea::new(self.origin, self.origin + extent)
    }

    /// Tile stored at the provided index.
    #[must_use]
    pub fn tile(&self, index: TileIndex) -> Option<&Tile> {
        self.tiles.get(index.slot())
    }

    /// Tile stored at the provided row and column.
    #[must_use]
    pub fn tile_at(&self, coord: TileCoord) -> Option<&Tile> {
        self.size.index_of(coord).and_then(|index| self.tile(index))
    }

    pub(crate) fn tile_mut(&mut self, index: TileIndex) -> Option<&mut Tile> {
        self.tiles.get_mut(index.slot())
    }

    /// Index of the tile whose bounds contain the world position.
    #[must_use]
    pub fn tile_index_at(&self, position: Vec2) -> Option<TileIndex> {
        if self.tile_length <= 0.0 {
            return None;
        }
        let relative = position - self.origin;
        if relative.x < 0.0 || relative.y < 0.0 {
            return None;
        }

        let column = (relative.x / self.tile_length).floor();
        let row = (relative.y / self.tile_length).floor();
        if column >= self.size.columns() as f32 || row >= self.size.rows() as f32 {
            return None;
        }
        self.size.index_of(TileCoord::new(column as u32, row as u32))
    }

    /// Center of the tile in world units.
    #[must_use]
    pub fn tile_center(&self, index: TileIndex) -> Option<Vec2> {
        let coord = self.size.coord_of(index)?;
        Some(
            self.origin
                + Vec2::new(
                    (coord.column() as f32 + 0.5) * self.tile_length,
                    (coord.row() as f32 + 0.5) * self.tile_length,
                ),
        )
    }

    /// Reports whether the tile exists and can be walked across.
    #[must_use]
    pub fn is_walkable(&self, index: TileIndex) -> bool {
        self.tile(index).is_some_and(Tile::is_walkable)
    }

    /// Iterator over every tile paired with its index, in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (TileIndex, &Tile)> {
        self.tiles
            .iter()
            .enumerate()
            .map(|(slot, tile)| (TileIndex::new(slot as u32), tile))
    }

    /// Advances every growing plot, reporting plots that became grown.
    pub(crate) fn advance_growth(
        &mut self,
        dt: Duration,
        threshold: Duration,
        grown: &mut Vec<(TileIndex, CropType)>,
    ) {
        for (slot, tile) in self.tiles.iter_mut().enumerate() {
            if let Some(crop) = tile.advance_growth(dt, threshold) {
                grown.push((TileIndex::new(slot as u32), crop));
            }
        }
    }
}
