//! Pillars and the scrolling field that owns them
//!
//! Pillars are created at the right edge and retired off the left edge, so
//! the field is a FIFO: the front is always the oldest and leftmost pillar.

use std::collections::VecDeque;

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

/// A pillar pair with a passable gap between its top and bottom halves
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Obstacle {
    /// Left edge
    pub x: f32,
    /// Bottom edge of the top half
    pub gap_top: f32,
    /// Top edge of the bottom half (always `gap_top + gap`)
    pub gap_bottom: f32,
    /// Set once the bird has fully cleared this pillar
    pub passed: bool,
}

impl Obstacle {
    pub fn new(x: f32, gap_top: f32, gap: f32) -> Self {
        Self {
            x,
            gap_top,
            gap_bottom: gap_top + gap,
            passed: false,
        }
    }

    /// Right edge for a pillar of the given width
    #[inline]
    pub fn right(&self, width: f32) -> f32 {
        self.x + width
    }

    /// Height of the bottom half as drawn from the floor
    #[inline]
    pub fn bottom_height(&self, field_height: f32) -> f32 {
        field_height - self.gap_bottom
    }

    #[inline]
    pub fn gap_height(&self) -> f32 {
        self.gap_bottom - self.gap_top
    }
}

/// Ordered sequence of live pillars plus the RNG that places their gaps
#[derive(Debug, Clone)]
pub struct ObstacleField {
    obstacles: VecDeque<Obstacle>,
    gap: f32,
    margin: f32,
    rng: Pcg32,
}

impl ObstacleField {
    /// Empty field; `gap` and `margin` apply to every pillar it spawns
    pub fn new(gap: f32, margin: f32, seed: u64) -> Self {
        Self {
            obstacles: VecDeque::new(),
            gap,
            margin,
            rng: Pcg32::seed_from_u64(seed),
        }
    }

    /// Append a pillar at the right edge with a random gap position
    pub fn spawn(&mut self, field_width: f32, field_height: f32) {
        let gap_top = self.random_gap_top(field_height);
        log::debug!("Pillar spawned at x={} gap_top={:.1}", field_width, gap_top);
        self.obstacles
            .push_back(Obstacle::new(field_width, gap_top, self.gap));
    }

    /// Gap top drawn uniformly between `margin` and `height - gap - margin`
    ///
    /// On fields too short for both margins the bounds swap, so the gap stays
    /// random but may eat into the margins. Never above the top edge.
    fn random_gap_top(&mut self, field_height: f32) -> f32 {
        let a = self.margin;
        let b = field_height - self.gap - self.margin;
        let (lo, hi) = (a.min(b), a.max(b));
        let gap_top = if hi > lo {
            self.rng.random_range(lo..hi)
        } else {
            lo
        };
        gap_top.max(0.0)
    }

    /// Scroll every pillar left by `speed`
    pub fn advance(&mut self, speed: f32) {
        for obstacle in &mut self.obstacles {
            obstacle.x -= speed;
        }
    }

    /// Drop the oldest pillar once its right edge has left the screen
    pub fn retire_offscreen(&mut self, width: f32) -> Option<Obstacle> {
        let front = self.obstacles.front()?;
        if front.right(width) < 0.0 {
            log::debug!("Pillar retired at x={}", front.x);
            self.obstacles.pop_front()
        } else {
            None
        }
    }

    /// Spawn the next pillar once the newest has scrolled `spacing` in
    pub fn maybe_spawn_next(&mut self, field_width: f32, spacing: f32, field_height: f32) -> bool {
        let due = match self.obstacles.back() {
            Some(newest) => newest.x < field_width - spacing,
            None => true,
        };
        if due {
            self.spawn(field_width, field_height);
        }
        due
    }

    /// Insert a pillar directly (test fixtures, replays)
    ///
    /// Pillars must be pushed in left-to-right order.
    pub fn push(&mut self, obstacle: Obstacle) {
        debug_assert!(
            self.obstacles.back().is_none_or(|b| b.x <= obstacle.x),
            "pillars must be pushed left to right"
        );
        self.obstacles.push_back(obstacle);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Obstacle> {
        self.obstacles.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Obstacle> {
        self.obstacles.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.obstacles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.obstacles.is_empty()
    }

    pub fn front(&self) -> Option<&Obstacle> {
        self.obstacles.front()
    }

    pub fn back(&self) -> Option<&Obstacle> {
        self.obstacles.back()
    }

    pub fn gap(&self) -> f32 {
        self.gap
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const W: f32 = 640.0;
    const H: f32 = 480.0;

    fn field() -> ObstacleField {
        ObstacleField::new(250.0, 100.0, 7)
    }

    #[test]
    fn test_spawn_at_right_edge() {
        let mut f = ObstacleField::new(200.0, 100.0, 1);
        f.spawn(W, 600.0);
        let o = f.front().unwrap();
        assert_eq!(o.x, W);
        assert!(!o.passed);
        assert!(o.gap_top >= 100.0 && o.gap_top < 600.0 - 200.0 - 100.0);
        assert_eq!(o.gap_height(), 200.0);
    }

    #[test]
    fn test_gap_height_invariant() {
        let mut f = ObstacleField::new(250.0, 100.0, 42);
        for _ in 0..200 {
            f.spawn(W, 720.0);
        }
        for o in f.iter() {
            assert!((o.gap_height() - 250.0).abs() < 1e-3);
            assert!(o.gap_top >= 100.0);
            assert!(o.gap_top < 720.0 - 250.0 - 100.0);
        }
    }

    #[test]
    fn test_short_field_keeps_random_gap() {
        // 480 - 250 - 200 leaves only 30px of range, still valid
        let mut f = field();
        f.spawn(W, H);
        assert!(f.front().unwrap().gap_top >= 100.0);

        // 400 - 250 - 100 = 50: drawn from [50, 100) instead
        let mut f = ObstacleField::new(250.0, 100.0, 12345);
        for _ in 0..50 {
            f.spawn(W, 400.0);
        }
        for o in f.iter() {
            assert!(o.gap_top >= 50.0 && o.gap_top < 100.0);
            assert!((o.gap_height() - 250.0).abs() < 1e-3);
        }
        let first = f.front().unwrap().gap_top;
        assert!(f.iter().any(|o| o.gap_top != first));
    }

    #[test]
    fn test_tiny_field_gap_never_above_top() {
        // 300 - 250 - 100 = -50: lower bound clamps to the top edge
        let mut f = ObstacleField::new(250.0, 100.0, 3);
        for _ in 0..50 {
            f.spawn(W, 300.0);
        }
        assert!(f.iter().all(|o| o.gap_top >= 0.0 && o.gap_top < 100.0));
    }

    #[test]
    fn test_exact_fit_field_uses_margin() {
        // 450 - 250 - 100 = 100 = margin: no range left
        let mut f = field();
        f.spawn(W, 450.0);
        assert_eq!(f.front().unwrap().gap_top, 100.0);
    }

    #[test]
    fn test_bottom_height() {
        let o = Obstacle::new(0.0, 100.0, 250.0);
        assert_eq!(o.bottom_height(480.0), 130.0);
    }

    #[test]
    fn test_retire_offscreen() {
        let mut f = field();
        f.push(Obstacle::new(-81.0, 100.0, 250.0));
        assert!(f.retire_offscreen(80.0).is_some());
        assert!(f.is_empty());

        let mut f = field();
        f.push(Obstacle::new(-79.0, 100.0, 250.0));
        assert!(f.retire_offscreen(80.0).is_none());
        assert_eq!(f.len(), 1);
    }

    #[test]
    fn test_retire_only_checks_front() {
        let mut f = field();
        f.push(Obstacle::new(-200.0, 100.0, 250.0));
        f.push(Obstacle::new(-150.0, 100.0, 250.0));
        assert!(f.retire_offscreen(80.0).is_some());
        assert_eq!(f.len(), 1);
        assert!(f.retire_offscreen(80.0).is_some());
        assert!(f.is_empty());
        assert!(f.retire_offscreen(80.0).is_none());
    }

    #[test]
    fn test_spacing_threshold() {
        let mut f = field();
        f.spawn(W, H);

        // Scrolled exactly `spacing`: not yet past the threshold
        f.advance(300.0);
        assert!(!f.maybe_spawn_next(W, 300.0, H));
        assert_eq!(f.len(), 1);

        f.advance(2.0);
        assert!(f.maybe_spawn_next(W, 300.0, H));
        assert_eq!(f.len(), 2);
        assert_eq!(f.back().unwrap().x, W);
    }

    #[test]
    fn test_empty_field_respawns() {
        let mut f = field();
        assert!(f.maybe_spawn_next(W, 300.0, H));
        assert_eq!(f.len(), 1);
    }

    #[test]
    fn test_scroll_keeps_creation_order() {
        let mut f = field();
        f.spawn(W, H);
        for _ in 0..2000 {
            f.advance(2.0);
            f.retire_offscreen(80.0);
            f.maybe_spawn_next(W, 300.0, H);

            let xs: Vec<f32> = f.iter().map(|o| o.x).collect();
            assert!(xs.windows(2).all(|w| w[0] <= w[1]));
        }
        // 640px wide at 300px spacing never holds more than a handful
        assert!(f.len() <= 4);
    }

    #[test]
    fn test_same_seed_same_gaps() {
        let mut a = ObstacleField::new(250.0, 100.0, 99);
        let mut b = ObstacleField::new(250.0, 100.0, 99);
        for _ in 0..10 {
            a.spawn(W, 720.0);
            b.spawn(W, 720.0);
        }
        let ga: Vec<f32> = a.iter().map(|o| o.gap_top).collect();
        let gb: Vec<f32> = b.iter().map(|o| o.gap_top).collect();
        assert_eq!(ga, gb);
    }
}
