//! Agent kinematics constrained by the play area and the partition.

use std::time::Duration;

use crop_rivals_core::{Carried, Partition, PlayArea, Side};
use glam::Vec2;

/// Position and hands of one farmer.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Agent {
    position: Vec2,
    carried: Carried,
    speed: f32,
}

impl Agent {
    /// Creates an agent at rest with empty hands.
    #[must_use]
    pub const fn new(position: Vec2, speed: f32) -> Self {
        Self {
            position,
            carried: Carried::Nothing,
            speed,
        }
    }

    /// Center of the agent's bounding circle.
    #[must_use]
    pub const fn position(&self) -> Vec2 {
        self.position
    }

    /// Item currently held.
    #[must_use]
    pub const fn carried(&self) -> Carried {
        self.carried
    }

    /// Movement speed in world units per second.
    #[must_use]
    pub const fn speed(&self) -> f32 {
        self.speed
    }

    pub(crate) fn place(&mut self, position: Vec2) {
        self.position = position;
    }

    pub(crate) fn hold(&mut self, carried: Carried) {
        self.carried = carried;
    }
}

/// Geometry every movement candidate is validated against.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Arena {
    area: PlayArea,
    partition: Partition,
    radius: f32,
}

impl Arena {
    /// Creates an arena with a partition band centred in the play area.
    #[must_use]
    pub fn new(area: PlayArea, partition_width: f32, radius: f32) -> Self {
        Self {
            area,
            partition: Partition::centered_in(&area, partition_width),
            radius,
        }
    }

    /// Band separating both halves.
    #[must_use]
    pub const fn partition(&self) -> Partition {
        self.partition
    }

    /// Radius of the agents' bounding circles.
    #[must_use]
    pub const fn radius(&self) -> f32 {
        self.radius
    }

    /// Reports whether an agent of the provided side may stand at the position.
    #[must_use]
    pub fn admits(&self, side: Side, position: Vec2) -> bool {
        self.area.contains_circle(position, self.radius)
            && self.partition.admits(side, position, self.radius)
    }
}

/// Computes the candidate position after travelling along `direction` for `dt`.
///
/// Directions longer than one are normalised so diagonal input is not faster
/// than axis-aligned input. Shorter directions scale the step down.
#[must_use]
pub fn step(position: Vec2, direction: Vec2, speed: f32, dt: Duration) -> Vec2 {
    let direction = if direction.length_squared() > 1.0 {
        direction.normalize_or_zero()
    } else {
        direction
    };
    position + direction * speed * dt.as_secs_f32()
}

/// Horizontal heading of the AI's idle bounce.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Heading {
    /// Travelling toward larger x coordinates.
    #[default]
    East,
    /// Travelling toward smaller x coordinates.
    West,
}

impl Heading {
    /// Unit vector of the heading.
    #[must_use]
    pub fn vector(self) -> Vec2 {
        match self {
            Self::East => Vec2::X,
            Self::West => Vec2::NEG_X,
        }
    }

    /// Opposite heading.
    #[must_use]
    pub const fn reversed(self) -> Self {
        match self {
            Self::East => Self::West,
            Self::West => Self::East,
        }
    }
}
