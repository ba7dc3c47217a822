//! Rendering
//!
//! Cosmetic state is platform independent; the Canvas 2D renderer is web only.

pub mod cosmetics;

#[cfg(target_arch = "wasm32")]
pub mod canvas;

#[cfg(target_arch = "wasm32")]
pub use canvas::CanvasRenderer;
pub use cosmetics::{CloudLayer, WingFlap, eye_radius};
