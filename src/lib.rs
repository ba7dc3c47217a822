//! Flappy Pillars - a Flappy Bird style arcade game
//!
//! Core modules:
//! - `sim`: Simulation (actor physics, pillars, collisions, scoring)
//! - `session`: Round state machine driven by host callbacks
//! - `host`: Collaborator traits the session talks to (scheduler, renderer, audio)
//! - `renderer`: Cosmetics and the Canvas 2D renderer
//! - `audio`: Sound cues, music and volume mixing
//! - `persistence`: Key-value storage (LocalStorage on web)
//! - `settings`: Player preferences
//! - `tuning`: Data-driven game balance

pub mod audio;
pub mod host;
pub mod persistence;
pub mod renderer;
pub mod session;
pub mod settings;
pub mod sim;
pub mod tuning;

pub use host::{FrameHandle, FrameView, Host, Renderer, Scheduler, TimerHandle};
pub use session::GameSession;
pub use settings::{EyeSize, Settings};
pub use tuning::Tuning;

/// Game configuration constants
pub mod consts {
    /// Downward acceleration per tick once the bird is under control
    pub const GRAVITY: f32 = 0.3;
    /// Vertical velocity set by a flap (negative is up)
    pub const JUMP_IMPULSE: f32 = -7.0;
    /// Horizontal pillar movement per tick
    pub const SCROLL_SPEED: f32 = 2.0;

    /// Pillar defaults
    pub const PILLAR_WIDTH: f32 = 80.0;
    pub const PILLAR_GAP: f32 = 250.0;
    pub const PILLAR_SPACING: f32 = 300.0;
    /// Minimum distance between a gap and the top/bottom of the field
    pub const GAP_MARGIN: f32 = 100.0;

    /// Bird body radius (40px sprite)
    pub const BIRD_RADIUS: f32 = 20.0;
    /// Bird sits at this fraction of the field width
    pub const BIRD_X_FRACTION: f32 = 0.25;

    pub const MAX_SCORE: u32 = 999;
    pub const COUNTDOWN_SECONDS: u32 = 3;

    /// Playfield aspect ratio (canvas is letterboxed to this)
    pub const ASPECT_RATIO: f32 = 16.0 / 9.0;
}

/// Largest size with the playfield aspect ratio that fits the viewport
#[inline]
pub fn fit_aspect(viewport_w: f32, viewport_h: f32) -> (f32, f32) {
    if viewport_h <= 0.0 {
        return (0.0, 0.0);
    }
    if viewport_w / viewport_h > consts::ASPECT_RATIO {
        (viewport_h * consts::ASPECT_RATIO, viewport_h)
    } else {
        (viewport_w, viewport_w / consts::ASPECT_RATIO)
    }
}
