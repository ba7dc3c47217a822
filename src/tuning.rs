//! Data-driven game balance
//!
//! Every number the simulation uses lives here so a round can be replayed
//! (or made harder) without touching code.

use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Errors from loading or validating a tuning record
#[derive(Debug, thiserror::Error)]
pub enum TuningError {
    #[error("invalid tuning JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("{field} must be positive (got {value})")]
    NotPositive { field: &'static str, value: f32 },

    #[error("jump impulse must point upward (negative), got {0}")]
    JumpNotUpward(f32),

    #[error("bird x fraction must be within (0, 1), got {0}")]
    BirdOutOfField(f32),
}

/// Simulation constants for one session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Tuning {
    pub gravity: f32,
    pub jump_impulse: f32,
    pub scroll_speed: f32,
    pub pillar_width: f32,
    pub pillar_gap: f32,
    pub pillar_spacing: f32,
    pub gap_margin: f32,
    pub bird_radius: f32,
    pub bird_x_fraction: f32,
    pub max_score: u32,
    pub countdown_seconds: u32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            gravity: GRAVITY,
            jump_impulse: JUMP_IMPULSE,
            scroll_speed: SCROLL_SPEED,
            pillar_width: PILLAR_WIDTH,
            pillar_gap: PILLAR_GAP,
            pillar_spacing: PILLAR_SPACING,
            gap_margin: GAP_MARGIN,
            bird_radius: BIRD_RADIUS,
            bird_x_fraction: BIRD_X_FRACTION,
            max_score: MAX_SCORE,
            countdown_seconds: COUNTDOWN_SECONDS,
        }
    }
}

impl Tuning {
    /// Parse a (possibly partial) tuning record; missing fields keep defaults
    pub fn from_json(json: &str) -> Result<Self, TuningError> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Reject values that would break the simulation's invariants
    pub fn validate(&self) -> Result<(), TuningError> {
        let positive = [
            ("gravity", self.gravity),
            ("scrollSpeed", self.scroll_speed),
            ("pillarWidth", self.pillar_width),
            ("pillarGap", self.pillar_gap),
            ("pillarSpacing", self.pillar_spacing),
            ("birdRadius", self.bird_radius),
        ];
        for (field, value) in positive {
            if !(value > 0.0) {
                return Err(TuningError::NotPositive { field, value });
            }
        }
        if self.gap_margin < 0.0 {
            return Err(TuningError::NotPositive {
                field: "gapMargin",
                value: self.gap_margin,
            });
        }
        if !(self.jump_impulse < 0.0) {
            return Err(TuningError::JumpNotUpward(self.jump_impulse));
        }
        if !(self.bird_x_fraction > 0.0 && self.bird_x_fraction < 1.0) {
            return Err(TuningError::BirdOutOfField(self.bird_x_fraction));
        }
        Ok(())
    }
}
