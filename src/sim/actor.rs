//! The player's bird
//!
//! Only vertical motion is simulated; the bird holds a fixed column while
//! the pillars scroll past it.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Player-controlled bird
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Actor {
    /// Centre position (x is fixed for the whole round)
    pub pos: Vec2,
    /// Vertical velocity in pixels per tick (positive is down)
    pub vel: f32,
    pub radius: f32,
    /// Set by the first flap; gravity only applies once this is true
    pub controlled: bool,
}

impl Actor {
    pub fn new(x: f32, y: f32, radius: f32) -> Self {
        Self {
            pos: Vec2::new(x, y),
            vel: 0.0,
            radius,
            controlled: false,
        }
    }

    /// Bird at rest in the vertical centre of the field
    pub fn centered(field_width: f32, field_height: f32, x_fraction: f32, radius: f32) -> Self {
        Self::new(field_width * x_fraction, field_height / 2.0, radius)
    }

    /// Advance one tick of constant gravity
    ///
    /// Before the first flap the bird flies straight and nothing changes.
    pub fn apply_gravity(&mut self, gravity: f32) {
        if !self.controlled {
            return;
        }
        self.vel += gravity;
        self.pos.y += self.vel;
    }

    /// Replace the current velocity with an upward impulse
    pub fn flap(&mut self, impulse: f32) {
        self.controlled = true;
        self.vel = impulse;
    }

    #[inline]
    pub fn x(&self) -> f32 {
        self.pos.x
    }

    #[inline]
    pub fn y(&self) -> f32 {
        self.pos.y
    }

    /// Topmost extent of the body
    #[inline]
    pub fn top(&self) -> f32 {
        self.pos.y - self.radius
    }

    /// Lowest extent of the body
    #[inline]
    pub fn bottom(&self) -> f32 {
        self.pos.y + self.radius
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uncontrolled_flies_straight() {
        let mut actor = Actor::new(160.0, 240.0, 20.0);
        for _ in 0..100 {
            actor.apply_gravity(0.3);
        }
        assert_eq!(actor.y(), 240.0);
        assert_eq!(actor.vel, 0.0);
        assert!(!actor.controlled);
    }

    #[test]
    fn test_flap_then_gravity() {
        let mut actor = Actor::new(160.0, 240.0, 20.0);

        actor.flap(-7.0);
        assert!(actor.controlled);
        assert_eq!(actor.vel, -7.0);
        assert_eq!(actor.y(), 240.0);

        actor.apply_gravity(0.3);
        assert!((actor.vel - (-6.7)).abs() < 1e-5);
        assert!((actor.y() - 233.3).abs() < 1e-4);
    }

    #[test]
    fn test_flap_overwrites_fall_speed() {
        let mut actor = Actor::new(160.0, 240.0, 20.0);
        actor.flap(-7.0);
        for _ in 0..60 {
            actor.apply_gravity(0.3);
        }
        assert!(actor.vel > 0.0);

        actor.flap(-7.0);
        assert_eq!(actor.vel, -7.0);
    }

    #[test]
    fn test_centered() {
        let actor = Actor::centered(640.0, 480.0, 0.25, 20.0);
        assert_eq!(actor.pos, Vec2::new(160.0, 240.0));
        assert_eq!(actor.top(), 220.0);
        assert_eq!(actor.bottom(), 260.0);
    }
}
