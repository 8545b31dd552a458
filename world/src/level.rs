//! Text level layouts and the per-level request tables.

use std::{fs, io, path::Path};

use crop_rivals_core::{
    CropType, GridSize, GroundCell, GroundType, Level, LevelLayout, TileCoord,
};
use thiserror::Error;
use tracing::warn;

/// Errors that can occur while reading a level layout from disk.
#[derive(Debug, Error)]
pub enum LayoutError {
    /// The level file could not be read.
    #[error("could not read level layout '{path}': {source}")]
    Read {
        /// Path that failed to load.
        path: String,
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },
}

/// Recoverable irregularity found while parsing a level layout.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LayoutWarning {
    /// A row supplied fewer characters than the grid width.
    ShortRow {
        /// Zero-based row index.
        row: u32,
        /// Number of characters the row supplied.
        length: u32,
    },
    /// The text supplied fewer rows than the grid height.
    MissingRows {
        /// Number of rows the text supplied.
        found: u32,
    },
}

/// Maps a layout character onto the ground it describes.
#[must_use]
pub fn cell_for(symbol: char) -> GroundCell {
    match symbol {
        'T' => GroundCell::plain(GroundType::Soil),
        '1' => GroundCell::seed_box(CropType::Tomato),
        '2' => GroundCell::seed_box(CropType::Corn),
        '3' => GroundCell::seed_box(CropType::Potato),
        '4' => GroundCell::seed_box(CropType::Carrot),
        '5' => GroundCell::seed_box(CropType::Lettuce),
        'G' => GroundCell::plain(GroundType::SeedBox),
        'E' => GroundCell::plain(GroundType::WaterSource),
        'S' => GroundCell::plain(GroundType::SunSource),
        'M' => GroundCell::plain(GroundType::Market),
        'P' => GroundCell::plain(GroundType::Trash),
        _ => GroundCell::EMPTY,
    }
}

/// Parses a level layout of the provided size.
///
/// Characters past the grid width and rows past the grid height are ignored.
/// Missing cells stay empty floor and are reported as warnings.
#[must_use]
pub fn parse(text: &str, size: GridSize) -> (LevelLayout, Vec<LayoutWarning>) {
    let mut layout = LevelLayout::empty(size);
    let mut warnings = Vec::new();
    let mut found = 0;

    for (row, line) in text.lines().take(size.rows() as usize).enumerate() {
        let row = row as u32;
        found += 1;

        let line = line.trim_end_matches('\r');
        let mut length = 0;
        for (column, symbol) in line.chars().take(size.columns() as usize).enumerate() {
            length += 1;
            let _ = layout.set(TileCoord::new(column as u32, row), cell_for(symbol));
        }

        if length < size.columns() {
            warnings.push(LayoutWarning::ShortRow { row, length });
        }
    }

    if found < size.rows() {
        warnings.push(LayoutWarning::MissingRows { found });
    }

    (layout, warnings)
}

/// Reads and parses a level layout, logging every shortfall.
pub fn read(path: &Path, size: GridSize) -> Result<LevelLayout, LayoutError> {
    let text = fs::read_to_string(path).map_err(|source| LayoutError::Read {
        path: path.display().to_string(),
        source,
    })?;

    let (layout, warnings) = parse(&text, size);
    for warning in warnings {
        match warning {
            LayoutWarning::ShortRow { row, length } => warn!(
                path = %path.display(),
                row,
                length,
                expected = size.columns(),
                "level row is shorter than the grid width; padding with empty floor"
            ),
            LayoutWarning::MissingRows { found } => warn!(
                path = %path.display(),
                found,
                expected = size.rows(),
                "level file has too few rows; padding with empty floor"
            ),
        }
    }
    Ok(layout)
}

/// Loads a level layout, falling back to an all-empty grid when the file cannot be read.
#[must_use]
pub fn load(path: &Path, size: GridSize) -> LevelLayout {
    match read(path, size) {
        Ok(layout) => layout,
        Err(error) => {
            warn!(%error, "falling back to an empty level layout");
            LevelLayout::empty(size)
        }
    }
}

/// Conventional file name of the layout for the provided level.
#[must_use]
pub fn file_name(level: Level) -> String {
    format!("level{}.txt", level.get())
}

/// Crops that requests may ask for at the provided level.
#[must_use]
pub fn allowed_crops(level: Level) -> &'static [CropType] {
    match level.get() {
        1 => &[CropType::Tomato, CropType::Potato, CropType::Carrot],
        2 => &[
            CropType::Tomato,
            CropType::Potato,
            CropType::Carrot,
            CropType::Lettuce,
        ],
        _ => &[
            CropType::Tomato,
            CropType::Potato,
            CropType::Carrot,
            CropType::Lettuce,
            CropType::Corn,
        ],
    }
}

/// Largest quantity a single request line may demand at the provided level.
#[must_use]
pub const fn max_quantity(level: Level) -> u32 {
    match level.get() {
        1 | 2 => 3,
        3 => 4,
        _ => 5,
    }
}

/// Number of requests queued for a match at the provided level.
#[must_use]
pub const fn request_count(level: Level) -> usize {
    match level.get() {
        1 => 5,
        2 => 7,
        3 => 9,
        4 => 12,
        _ => 5,
    }
}
