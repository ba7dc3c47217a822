//! Collision detection between the bird and the world
//!
//! All checks are pure predicates. The bird is treated as an axis-aligned
//! box of half-size `radius`, which is what the pillar art lines up with.

use serde::{Deserialize, Serialize};

use super::actor::Actor;
use super::obstacle::{Obstacle, ObstacleField};

/// What the bird hit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Collision {
    /// Fell through the bottom of the field
    Ground,
    /// Clipped the top or bottom half of a pillar
    Obstacle,
}

/// Check the lower bound of the field (there is no ceiling)
pub fn check_bounds(actor: &Actor, field_height: f32) -> Option<Collision> {
    (actor.bottom() > field_height).then_some(Collision::Ground)
}

/// Whether the bird's column overlaps the pillar's column
#[inline]
pub fn overlaps_horizontally(actor: &Actor, obstacle: &Obstacle, width: f32) -> bool {
    actor.x() + actor.radius > obstacle.x && actor.x() - actor.radius < obstacle.right(width)
}

/// Check one pillar
pub fn check_obstacle(actor: &Actor, obstacle: &Obstacle, width: f32) -> Option<Collision> {
    if !overlaps_horizontally(actor, obstacle, width) {
        return None;
    }
    (actor.top() < obstacle.gap_top || actor.bottom() > obstacle.gap_bottom)
        .then_some(Collision::Obstacle)
}

/// Check every live pillar, then the ground
///
/// Pillar hits take precedence when both apply in the same tick.
pub fn resolve(
    actor: &Actor,
    field: &ObstacleField,
    width: f32,
    field_height: f32,
) -> Option<Collision> {
    field
        .iter()
        .find_map(|obstacle| check_obstacle(actor, obstacle, width))
        .or_else(|| check_bounds(actor, field_height))
}
