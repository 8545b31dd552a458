//! Tunable match parameters loaded from TOML.

use std::{fs, io, path::Path, path::PathBuf, time::Duration};

use crop_rivals_core::{GridSize, Level, LevelLayout, MatchSetup, OrderSpec};
use crop_rivals_system_ai_planner::PlannerConfig;
use crop_rivals_world as world;
use serde::Deserialize;
use thiserror::Error;

/// Errors raised while loading a configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("failed to read config {path}")]
    Io {
        /// Location that was read.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },
    /// The contents are not valid TOML for [`Config`].
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
    /// Tiles are too small for an agent to stand on their centers.
    #[error("tile_length {tile_length} must be at least twice agent_radius {agent_radius}")]
    TooSmallTiles {
        /// Configured tile side length.
        tile_length: f32,
        /// Configured agent radius.
        agent_radius: f32,
    },
}

/// Match tuning. Every field falls back to its default when omitted.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Number of tile columns.
    pub columns: u32,
    /// Number of tile rows.
    pub rows: u32,
    /// Side length of a tile in world units.
    pub tile_length: f32,
    /// Width of the partition band.
    pub partition_width: f32,
    /// Radius of both agents.
    pub agent_radius: f32,
    /// Movement speed of the human agent.
    pub player_speed: f32,
    /// Path-following speed of the AI agent.
    pub ai_path_speed: f32,
    /// Idle bounce speed as a fraction of the player speed.
    pub wander_speed_ratio: f32,
    /// Distance below which a waypoint counts as reached.
    pub arrive_threshold: f32,
    /// Seconds a planted plot needs to grow.
    pub growth_seconds: f64,
    /// Seconds the AI idles before re-evaluating goals.
    pub idle_seconds: f64,
    /// Length of the match countdown in seconds.
    pub match_seconds: f64,
    /// Seed of the request generator.
    pub seed: u64,
    /// Difficulty level, 1-indexed.
    pub level: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            columns: world::DEFAULT_GRID_COLUMNS,
            rows: world::DEFAULT_GRID_ROWS,
            tile_length: world::DEFAULT_TILE_LENGTH,
            partition_width: world::DEFAULT_PARTITION_WIDTH,
            agent_radius: world::DEFAULT_AGENT_RADIUS,
            player_speed: world::DEFAULT_PLAYER_SPEED,
            ai_path_speed: world::DEFAULT_AI_SPEED,
            wander_speed_ratio: world::DEFAULT_WANDER_RATIO,
            arrive_threshold: crop_rivals_system_ai_planner::DEFAULT_ARRIVE_THRESHOLD,
            growth_seconds: world::DEFAULT_GROWTH_DURATION.as_secs_f64(),
            idle_seconds: crop_rivals_system_ai_planner::DEFAULT_IDLE_DELAY.as_secs_f64(),
            match_seconds: world::DEFAULT_MATCH_DURATION.as_secs_f64(),
            seed: 0,
            level: 1,
        }
    }
}

impl Config {
    /// Parses a configuration from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects geometry on which agents could not reach tile centers.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tile_length >= 2.0 * self.agent_radius {
            Ok(())
        } else {
            Err(ConfigError::TooSmallTiles {
                tile_length: self.tile_length,
                agent_radius: self.agent_radius,
            })
        }
    }

    /// Reads and parses a configuration file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Level being played.
    #[must_use]
    pub fn level(&self) -> Level {
        Level::new(self.level)
    }

    /// Dimensions of the tile grid.
    #[must_use]
    pub fn grid_size(&self) -> GridSize {
        GridSize::new(self.columns, self.rows)
    }

    /// Planner tuning derived from this configuration.
    #[must_use]
    pub fn planner(&self) -> PlannerConfig {
        PlannerConfig {
            arrive_threshold: self.arrive_threshold,
            idle_delay: seconds(self.idle_seconds),
        }
    }

    /// Builds the world setup for a match on the provided layout.
    #[must_use]
    pub fn match_setup(&self, layout: LevelLayout, orders: Vec<OrderSpec>) -> MatchSetup {
        MatchSetup {
            level: self.level(),
            layout,
            tile_length: self.tile_length,
            partition_width: self.partition_width,
            agent_radius: self.agent_radius,
            player_speed: self.player_speed,
            ai_speed: self.ai_path_speed,
            wander_speed: self.player_speed * self.wander_speed_ratio,
            growth_duration: seconds(self.growth_seconds),
            match_duration: seconds(self.match_seconds),
            orders,
        }
    }
}

fn seconds(value: f64) -> Duration {
    Duration::try_from_secs_f64(value).unwrap_or_default()
}
