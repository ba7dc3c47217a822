//! Scoring: one point per pillar cleared

use serde::{Deserialize, Serialize};

use super::actor::Actor;
use super::obstacle::Obstacle;

/// Round score, capped at `max`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreTracker {
    value: u32,
    max: u32,
}

impl ScoreTracker {
    pub fn new(max: u32) -> Self {
        Self { value: 0, max }
    }

    pub fn value(&self) -> u32 {
        self.value
    }

    pub fn max(&self) -> u32 {
        self.max
    }

    /// Award a point if the bird has fully cleared this pillar
    ///
    /// Returns true only the first time a pillar is cleared.
    pub fn maybe_score(&mut self, obstacle: &mut Obstacle, actor: &Actor, width: f32) -> bool {
        if obstacle.passed || obstacle.right(width) >= actor.x() {
            return false;
        }
        obstacle.passed = true;
        self.value = (self.value + 1).min(self.max);
        true
    }
}
