//! Canvas 2D renderer
//!
//! Draws stone pillars, the bird, drifting clouds and the score. The sky is
//! the canvas CSS background, so every frame starts from a clear.

use std::f64::consts::TAU;

use wasm_bindgen::{JsCast, JsValue};
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

use super::cosmetics::{CloudLayer, WingFlap, eye_radius};
use crate::host::{FrameView, Renderer};
use crate::settings::Settings;
use crate::sim::{Actor, AttractScene, FieldSize, ObstacleField};

const STONE: &str = "#8B4513";
const STONE_TRIM: &str = "#A0522D";
const STONE_GROOVE: &str = "#CD853F";
const TRIM_OVERHANG: f64 = 10.0;
const TRIM_HEIGHT: f64 = 20.0;
const GROOVE_SPACING: f64 = 20.0;

pub struct CanvasRenderer {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
    clouds: CloudLayer,
    wings: WingFlap,
    body_color: String,
    eye_radius: f32,
}

impl CanvasRenderer {
    pub fn new(canvas: HtmlCanvasElement, settings: &Settings) -> Result<Self, JsValue> {
        let ctx = canvas
            .get_context("2d")?
            .ok_or_else(|| JsValue::from_str("2d context unavailable"))?
            .dyn_into::<CanvasRenderingContext2d>()?;
        Ok(Self {
            canvas,
            ctx,
            clouds: CloudLayer::default(),
            wings: WingFlap::default(),
            body_color: settings.bird_color.clone(),
            eye_radius: eye_radius(settings.eye_size),
        })
    }

    /// Pick up colour/eye changes from the settings panel
    pub fn set_preferences(&mut self, settings: &Settings) {
        self.body_color = settings.bird_color.clone();
        self.eye_radius = eye_radius(settings.eye_size);
    }

    pub fn canvas(&self) -> &HtmlCanvasElement {
        &self.canvas
    }

    /// Menu background frame
    pub fn draw_attract(&mut self, scene: &AttractScene, pillar_width: f32) {
        self.begin(scene.field);
        self.draw_pillars(&scene.obstacles, scene.field, pillar_width);
        self.draw_bird(&scene.actor);
    }

    fn begin(&mut self, field: FieldSize) {
        self.ctx
            .clear_rect(0.0, 0.0, field.width as f64, field.height as f64);
        self.clouds.drift(field.width);
        self.draw_clouds();
    }

    fn draw_clouds(&self) {
        let ctx = &self.ctx;
        ctx.set_fill_style_str("#FFF");
        for cloud in &self.clouds.clouds {
            let (x, y, s) = (cloud.x as f64, cloud.y as f64, cloud.size as f64);
            ctx.begin_path();
            ctx.arc(x, y, s, 0.0, TAU).ok();
            ctx.arc(x + s / 2.0, y - s / 3.0, s / 2.0, 0.0, TAU).ok();
            ctx.arc(x - s / 2.0, y - s / 3.0, s / 2.0, 0.0, TAU).ok();
            ctx.fill();
        }
    }

    fn draw_pillars(&self, obstacles: &ObstacleField, field: FieldSize, width: f32) {
        let width = width as f64;
        let field_h = field.height as f64;
        let ctx = &self.ctx;

        for obstacle in obstacles.iter() {
            let x = obstacle.x as f64;
            let top = obstacle.gap_top as f64;
            let bottom_y = obstacle.gap_bottom as f64;

            ctx.set_fill_style_str(STONE);
            ctx.fill_rect(x, 0.0, width, top);
            ctx.fill_rect(x, bottom_y, width, field_h - bottom_y);

            // Capital above the gap, base below it
            ctx.set_fill_style_str(STONE_TRIM);
            let trim_w = width + TRIM_OVERHANG * 2.0;
            ctx.fill_rect(x - TRIM_OVERHANG, top - TRIM_HEIGHT, trim_w, TRIM_HEIGHT);
            ctx.fill_rect(x - TRIM_OVERHANG, bottom_y, trim_w, TRIM_HEIGHT);

            ctx.set_stroke_style_str(STONE_GROOVE);
            ctx.set_line_width(2.0);
            let mut y = GROOVE_SPACING / 2.0;
            while y < top - TRIM_HEIGHT - GROOVE_SPACING / 2.0 {
                self.groove(x, y, width);
                y += GROOVE_SPACING;
            }
            let mut y = bottom_y + TRIM_HEIGHT;
            while y < field_h - TRIM_HEIGHT {
                self.groove(x, y, width);
                y += GROOVE_SPACING;
            }
        }
    }

    fn groove(&self, x: f64, y: f64, width: f64) {
        self.ctx.begin_path();
        self.ctx.move_to(x, y);
        self.ctx.line_to(x + width, y);
        self.ctx.stroke();
    }

    fn draw_bird(&mut self, actor: &Actor) {
        self.wings.update(actor.vel);
        let ctx = &self.ctx;
        let (x, y) = (actor.x() as f64, actor.y() as f64);
        let r = actor.radius as f64;

        ctx.set_fill_style_str(&self.body_color);
        ctx.begin_path();
        ctx.arc(x, y, r, 0.0, TAU).ok();
        ctx.fill();

        ctx.set_fill_style_str("#000");
        ctx.begin_path();
        ctx.arc(x + r / 2.0, y - r / 2.0, self.eye_radius as f64, 0.0, TAU)
            .ok();
        ctx.fill();

        let lift = self.wings.angle as f64 * 20.0;
        ctx.set_stroke_style_str("#000");
        ctx.set_line_width(3.0);
        ctx.begin_path();
        ctx.move_to(x - r * 0.75, y);
        ctx.line_to(x - r * 1.25, y + lift);
        ctx.move_to(x + r * 0.75, y);
        ctx.line_to(x + r * 1.25, y - lift);
        ctx.stroke();
    }

    fn draw_score(&self, score: u32) {
        self.ctx.set_fill_style_str("#000");
        self.ctx.set_font("30px Arial");
        self.ctx
            .fill_text(&format!("Score: {}", score), 10.0, 30.0)
            .ok();
    }
}

impl Renderer for CanvasRenderer {
    fn draw_frame(&mut self, frame: &FrameView<'_>) {
        self.begin(frame.field);
        self.draw_pillars(frame.obstacles, frame.field, frame.pillar_width);
        self.draw_bird(frame.actor);
        self.draw_score(frame.score);
    }
}
