//! Host collaborators
//!
//! The session never touches the browser directly. It asks a `Scheduler`
//! for animation frames and the countdown timer, hands a `FrameView` to the
//! `Renderer` once per tick, and fires cues at the `AudioSink`.
//!
//! Every scheduled callback carries the handle it was requested with. The
//! session only honours the handle it most recently issued, so a callback
//! that was already in flight when ticking stopped does nothing.

use crate::audio::{AudioSink, MusicTrack, SoundCue};
use crate::sim::{Actor, FieldSize, ObstacleField, Round};
use crate::tuning::Tuning;

/// Identifies one requested animation frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameHandle(pub u64);

/// Identifies one run of the once-per-second countdown timer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerHandle(pub u64);

/// Host-side scheduling (requestAnimationFrame / setInterval on the web)
pub trait Scheduler {
    /// Call `GameSession::on_frame(handle, ..)` on the next display refresh
    fn request_frame(&mut self, handle: FrameHandle);
    /// Drop a pending frame request
    fn cancel_frame(&mut self, handle: FrameHandle);
    /// Call `GameSession::on_countdown_tick(handle, ..)` once per second until stopped
    fn start_countdown(&mut self, handle: TimerHandle);
    fn stop_countdown(&mut self, handle: TimerHandle);
}

/// Read-only snapshot handed to the renderer after a tick
#[derive(Debug, Clone, Copy)]
pub struct FrameView<'a> {
    pub field: FieldSize,
    pub actor: &'a Actor,
    pub obstacles: &'a ObstacleField,
    pub pillar_width: f32,
    pub score: u32,
}

impl<'a> FrameView<'a> {
    pub fn of_round(round: &'a Round, tuning: &Tuning) -> Self {
        Self {
            field: round.field,
            actor: &round.actor,
            obstacles: &round.obstacles,
            pillar_width: tuning.pillar_width,
            score: round.score.value(),
        }
    }
}

/// Draws a frame; called synchronously at the end of every tick
pub trait Renderer {
    fn draw_frame(&mut self, frame: &FrameView<'_>);
}

/// Everything a session needs from its environment
pub trait Host: Scheduler + Renderer + AudioSink {}

impl<T: Scheduler + Renderer + AudioSink> Host for T {}

/// In-memory host for headless runs and tests
///
/// Frame and timer requests are parked until the driver collects them.
#[derive(Debug, Default)]
pub struct HeadlessHost {
    pub pending_frame: Option<FrameHandle>,
    pub countdown: Option<TimerHandle>,
    pub cancelled_frames: Vec<FrameHandle>,
    pub cues: Vec<SoundCue>,
    pub music: Option<MusicTrack>,
    pub frames_drawn: u64,
    pub last_drawn_score: u32,
}

impl HeadlessHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take the pending frame request, if any
    pub fn take_frame(&mut self) -> Option<FrameHandle> {
        self.pending_frame.take()
    }
}

impl Scheduler for HeadlessHost {
    fn request_frame(&mut self, handle: FrameHandle) {
        self.pending_frame = Some(handle);
    }

    fn cancel_frame(&mut self, handle: FrameHandle) {
        if self.pending_frame == Some(handle) {
            self.pending_frame = None;
        }
        self.cancelled_frames.push(handle);
    }

    fn start_countdown(&mut self, handle: TimerHandle) {
        self.countdown = Some(handle);
    }

    fn stop_countdown(&mut self, handle: TimerHandle) {
        if self.countdown == Some(handle) {
            self.countdown = None;
        }
    }
}

impl Renderer for HeadlessHost {
    fn draw_frame(&mut self, frame: &FrameView<'_>) {
        self.frames_drawn += 1;
        self.last_drawn_score = frame.score;
    }
}

impl AudioSink for HeadlessHost {
    fn play(&mut self, cue: SoundCue) {
        self.cues.push(cue);
    }

    fn set_music(&mut self, track: MusicTrack) {
        self.music = Some(track);
    }
}
