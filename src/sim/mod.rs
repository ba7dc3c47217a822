//! Simulation module
//!
//! All gameplay logic lives here. This module must stay pure:
//! - Fixed per-tick deltas only
//! - Seeded RNG only
//! - Pillars kept in creation order
//! - No rendering, audio or platform dependencies

pub mod actor;
pub mod attract;
pub mod collision;
pub mod obstacle;
pub mod score;
pub mod state;
pub mod tick;

pub use actor::Actor;
pub use attract::AttractScene;
pub use collision::{Collision, check_bounds, check_obstacle, resolve};
pub use obstacle::{Obstacle, ObstacleField};
pub use score::ScoreTracker;
pub use state::{AfterCountdown, FieldSize, GamePhase, Round};
pub use tick::{TickOutcome, tick};
