//! Purely visual state: clouds, wing flaps, eye size
//!
//! None of this feeds back into the simulation.

use std::f32::consts::FRAC_PI_4;

use crate::settings::EyeSize;

/// Cloud drift per frame
pub const CLOUD_SPEED: f32 = 0.5;

/// Pupil radius for each eye size setting
pub fn eye_radius(size: EyeSize) -> f32 {
    match size {
        EyeSize::Small => 3.0,
        EyeSize::Medium => 5.0,
        EyeSize::Large => 7.0,
    }
}

/// Wing angle oscillating between +/- 45 degrees
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WingFlap {
    pub angle: f32,
    direction: f32,
}

impl Default for WingFlap {
    fn default() -> Self {
        Self {
            angle: 0.0,
            direction: 1.0,
        }
    }
}

impl WingFlap {
    /// Flap faster while rising
    pub fn update(&mut self, vertical_velocity: f32) {
        let speed = if vertical_velocity < 0.0 { 0.2 } else { 0.05 };
        self.angle = (self.angle + speed * self.direction).clamp(-FRAC_PI_4, FRAC_PI_4);
        if self.angle.abs() >= FRAC_PI_4 {
            self.direction = -self.direction;
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cloud {
    pub x: f32,
    pub y: f32,
    pub size: f32,
}

/// Background clouds that wrap around the field
#[derive(Debug, Clone)]
pub struct CloudLayer {
    pub clouds: Vec<Cloud>,
}

impl Default for CloudLayer {
    fn default() -> Self {
        let clouds = [
            (100.0, 100.0, 50.0),
            (300.0, 150.0, 70.0),
            (500.0, 80.0, 60.0),
            (700.0, 120.0, 50.0),
        ]
        .into_iter()
        .map(|(x, y, size)| Cloud { x, y, size })
        .collect();
        Self { clouds }
    }
}

impl CloudLayer {
    pub fn drift(&mut self, field_width: f32) {
        for cloud in &mut self.clouds {
            cloud.x -= CLOUD_SPEED;
            if cloud.x + cloud.size < 0.0 {
                cloud.x = field_width + cloud.size;
            }
        }
    }
}
