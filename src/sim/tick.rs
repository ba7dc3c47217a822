//! Fixed step simulation tick
//!
//! One call per animation frame. Deltas are constant per tick, so the game
//! runs faster on high refresh displays; elapsed time is not consulted.

use super::collision::{Collision, resolve};
use super::state::Round;
use crate::tuning::Tuning;

/// Result of a single tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickOutcome {
    /// Set when the bird hit something; the round is over
    pub collision: Option<Collision>,
    /// Pillars cleared this tick
    pub passed: u32,
}

/// Advance the round by one fixed step
///
/// Order: bird physics, pillar scroll/retire/spawn, collisions, scoring.
/// Scoring is skipped on the tick that collides.
pub fn tick(round: &mut Round, tuning: &Tuning) -> TickOutcome {
    let field = round.field;
    round.time_ticks += 1;

    round.actor.apply_gravity(tuning.gravity);

    round.obstacles.advance(tuning.scroll_speed);
    round.obstacles.retire_offscreen(tuning.pillar_width);
    round
        .obstacles
        .maybe_spawn_next(field.width, tuning.pillar_spacing, field.height);

    let collision = resolve(
        &round.actor,
        &round.obstacles,
        tuning.pillar_width,
        field.height,
    );
    if collision.is_some() {
        return TickOutcome {
            collision,
            passed: 0,
        };
    }

    let mut passed = 0;
    for obstacle in round.obstacles.iter_mut() {
        if round
            .score
            .maybe_score(obstacle, &round.actor, tuning.pillar_width)
        {
            passed += 1;
        }
    }

    TickOutcome {
        collision: None,
        passed,
    }
}
