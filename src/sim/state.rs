//! Game phase and per-round state

use serde::{Deserialize, Serialize};

use super::actor::Actor;
use super::collision::Collision;
use super::obstacle::ObstacleField;
use super::score::ScoreTracker;
use crate::tuning::Tuning;

/// What happens when a countdown reaches zero
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AfterCountdown {
    /// Build a fresh round and start it
    NewRound,
    /// Continue the paused round as it was
    Resume,
}

/// Current phase of the game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Main menu, no round exists
    Menu,
    /// Non-interactive wait before play, one decrement per second
    Countdown { remaining: u32, then: AfterCountdown },
    /// Active gameplay, one tick per frame
    Playing,
    /// Round frozen, waiting for resume/restart/menu
    Paused,
    /// Round ended by a collision
    GameOver { final_score: u32, cause: Collision },
}

impl GamePhase {
    pub fn is_playing(&self) -> bool {
        matches!(self, GamePhase::Playing)
    }
}

/// Playfield size in pixels
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FieldSize {
    pub width: f32,
    pub height: f32,
}

impl FieldSize {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

/// Everything owned by one round; thrown away on restart
#[derive(Debug, Clone)]
pub struct Round {
    pub field: FieldSize,
    pub actor: Actor,
    pub obstacles: ObstacleField,
    pub score: ScoreTracker,
    /// Ticks simulated so far
    pub time_ticks: u64,
}

impl Round {
    /// Bird centred and at rest, exactly one pillar at the right edge, score 0
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
            score: ScoreTracker::new(tuning.max_score),
            time_ticks: 0,
        }
    }
}
