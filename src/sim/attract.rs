//! Attract mode: the self-flying scene behind the main menu
//!
//! Reuses the pillar field but never collides or scores; the bird simply
//! bobs on a sine wave.

use super::actor::Actor;
use super::obstacle::ObstacleField;
use super::state::FieldSize;
use crate::tuning::Tuning;

/// Bob amplitude in pixels
const BOB_AMPLITUDE: f32 = 50.0;

#[derive(Debug, Clone)]
pub struct AttractScene {
    pub field: FieldSize,
    pub actor: Actor,
    pub obstacles: ObstacleField,
}

impl AttractScene {
    pub fn new(tuning: &Tuning, field: FieldSize, seed: u64) -> Self {
        let actor = Actor::centered(
            field.width,
            field.height,
            tuning.bird_x_fraction,
            tuning.bird_radius,
        );
        let mut obstacles = ObstacleField::new(tuning.pillar_gap, tuning.gap_margin, seed);
        obstacles.spawn(field.width, field.height);
        Self {
            field,
            actor,
            obstacles,
        }
    }

    /// Advance one frame; `time_secs` drives the bob
    pub fn step(&mut self, tuning: &Tuning, time_secs: f64) {
        self.actor.pos.y = self.field.height / 2.0 + (time_secs.sin() as f32) * BOB_AMPLITUDE;

        self.obstacles.advance(tuning.scroll_speed);
        self.obstacles.retire_offscreen(tuning.pillar_width);
        self.obstacles
            .maybe_spawn_next(self.field.width, tuning.pillar_spacing, self.field.height);
    }
}
