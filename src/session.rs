//! Game session: the round state machine
//!
//! ```text
//! Menu --start--> Countdown --0--> Playing --pause--> Paused
//!                     ^               |                 |
//!                     |           collision          resume
//!                     |               v                 |
//!                     +--restart-- GameOver    Countdown (resume)
//! GameOver/Paused --menu--> Menu
//! ```
//!
//! The session owns at most one `Round`. Ticks only run in `Playing`, one
//! per host frame callback; leaving `Playing` cancels the outstanding frame
//! before anything else changes.

use rand::{RngCore, SeedableRng};
use rand_pcg::Pcg32;

use crate::audio::{MusicTrack, SoundCue};
use crate::host::{FrameHandle, FrameView, Host, TimerHandle};
use crate::sim::{AfterCountdown, FieldSize, GamePhase, Round, TickOutcome, tick};
use crate::tuning::Tuning;

pub struct GameSession {
    tuning: Tuning,
    field: FieldSize,
    phase: GamePhase,
    round: Option<Round>,
    /// Seeds each new round's pillar RNG
    rng: Pcg32,
    next_handle: u64,
    /// The only frame callback that will be honoured
    frame: Option<FrameHandle>,
    /// The only countdown timer that will be honoured
    countdown: Option<TimerHandle>,
}

impl GameSession {
    pub fn new(tuning: Tuning, field: FieldSize, seed: u64) -> Self {
        Self {
            tuning,
            field,
            phase: GamePhase::Menu,
            round: None,
            rng: Pcg32::seed_from_u64(seed),
            next_handle: 1,
            frame: None,
            countdown: None,
        }
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn round(&self) -> Option<&Round> {
        self.round.as_ref()
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    pub fn field(&self) -> FieldSize {
        self.field
    }

    /// Current round score (0 outside a round)
    pub fn score(&self) -> u32 {
        match self.phase {
            GamePhase::GameOver { final_score, .. } => final_score,
            _ => self.round.as_ref().map_or(0, |r| r.score.value()),
        }
    }

    /// Seconds left on the countdown, if one is running
    pub fn countdown_remaining(&self) -> Option<u32> {
        match self.phase {
            GamePhase::Countdown { remaining, .. } => Some(remaining),
            _ => None,
        }
    }

    /// Whether a frame callback is outstanding
    pub fn is_ticking(&self) -> bool {
        self.frame.is_some()
    }

    /// New playfield size; takes effect at the next fresh round
    pub fn set_field_size(&mut self, width: f32, height: f32) {
        self.field = FieldSize::new(width, height);
        log::debug!("Field resized to {}x{}", width, height);
    }

    // === Commands ===

    /// Menu -> Countdown -> fresh round
    pub fn start_round<H: Host>(&mut self, host: &mut H) {
        if self.phase != GamePhase::Menu {
            log::debug!("start ignored in {:?}", self.phase);
            return;
        }
        host.set_music(MusicTrack::Game);
        self.begin_countdown(AfterCountdown::NewRound, host);
    }

    /// GameOver/Paused -> Countdown -> fresh round
    pub fn restart_round<H: Host>(&mut self, host: &mut H) {
        if !matches!(self.phase, GamePhase::GameOver { .. } | GamePhase::Paused) {
            log::debug!("restart ignored in {:?}", self.phase);
            return;
        }
        self.stop_ticking(host);
        self.round = None;
        self.begin_countdown(AfterCountdown::NewRound, host);
    }

    /// Paused -> Countdown -> same round
    pub fn resume_round<H: Host>(&mut self, host: &mut H) {
        if self.phase != GamePhase::Paused {
            log::debug!("resume ignored in {:?}", self.phase);
            return;
        }
        self.begin_countdown(AfterCountdown::Resume, host);
    }

    /// Playing -> Paused, round kept as is
    pub fn pause<H: Host>(&mut self, host: &mut H) {
        if !self.phase.is_playing() {
            log::debug!("pause ignored in {:?}", self.phase);
            return;
        }
        self.stop_ticking(host);
        self.phase = GamePhase::Paused;
        log::info!("Paused at score {}", self.score());
    }

    /// GameOver/Paused -> Menu, round discarded
    pub fn return_to_menu<H: Host>(&mut self, host: &mut H) {
        if !matches!(self.phase, GamePhase::GameOver { .. } | GamePhase::Paused) {
            log::debug!("return to menu ignored in {:?}", self.phase);
            return;
        }
        self.stop_ticking(host);
        self.round = None;
        self.phase = GamePhase::Menu;
        host.set_music(MusicTrack::Menu);
        log::info!("Returned to menu");
    }

    /// Player input; only acts while playing
    pub fn flap<H: Host>(&mut self, host: &mut H) {
        if !self.phase.is_playing() {
            return;
        }
        if let Some(round) = self.round.as_mut() {
            round.actor.flap(self.tuning.jump_impulse);
            host.play(SoundCue::Flap);
        }
    }

    // === Host callbacks ===

    /// Once-per-second countdown timer fired
    pub fn on_countdown_tick<H: Host>(&mut self, handle: TimerHandle, host: &mut H) {
        if self.countdown != Some(handle) {
            log::debug!("stale countdown tick {:?}", handle);
            return;
        }
        let GamePhase::Countdown { remaining, then } = self.phase else {
            log::warn!("countdown tick outside countdown ({:?})", self.phase);
            self.stop_countdown(host);
            return;
        };

        let remaining = remaining.saturating_sub(1);
        if remaining > 0 {
            self.phase = GamePhase::Countdown { remaining, then };
            return;
        }
        self.stop_countdown(host);
        self.enter_playing(then, host);
    }

    /// Animation frame fired: run one tick, draw, and schedule the next
    pub fn on_frame<H: Host>(&mut self, handle: FrameHandle, host: &mut H) -> Option<TickOutcome> {
        if self.frame != Some(handle) {
            log::debug!("stale frame {:?}", handle);
            return None;
        }
        self.frame = None;
        if !self.phase.is_playing() {
            return None;
        }
        let Some(round) = self.round.as_mut() else {
            log::warn!("playing without a round");
            return None;
        };

        let outcome = tick(round, &self.tuning);
        for _ in 0..outcome.passed {
            host.play(SoundCue::Pass);
        }
        if let Some(cause) = outcome.collision {
            let final_score = round.score.value();
            self.phase = GamePhase::GameOver { final_score, cause };
            host.play(SoundCue::Hit);
            log::info!("Game over ({:?}) with score {}", cause, final_score);
        }
        host.draw_frame(&FrameView::of_round(round, &self.tuning));

        if self.phase.is_playing() {
            self.schedule_frame(host);
        }
        Some(outcome)
    }

    // === Internals ===

    fn begin_countdown<H: Host>(&mut self, then: AfterCountdown, host: &mut H) {
        self.stop_countdown(host);
        let seconds = self.tuning.countdown_seconds;
        if seconds == 0 {
            self.enter_playing(then, host);
            return;
        }
        let handle = TimerHandle(self.allocate_handle());
        self.countdown = Some(handle);
        self.phase = GamePhase::Countdown {
            remaining: seconds,
            then,
        };
        host.start_countdown(handle);
        log::info!("Countdown from {} ({:?})", seconds, then);
    }

    fn enter_playing<H: Host>(&mut self, then: AfterCountdown, host: &mut H) {
        if then == AfterCountdown::NewRound || self.round.is_none() {
            let seed = self.rng.next_u64();
            self.round = Some(Round::new(&self.tuning, self.field, seed));
            log::info!(
                "Round started on {}x{} field",
                self.field.width,
                self.field.height
            );
        } else {
            log::info!("Round resumed");
        }
        self.phase = GamePhase::Playing;
        self.schedule_frame(host);
    }

    fn schedule_frame<H: Host>(&mut self, host: &mut H) {
        let handle = FrameHandle(self.allocate_handle());
        self.frame = Some(handle);
        host.request_frame(handle);
    }

    fn stop_ticking<H: Host>(&mut self, host: &mut H) {
        if let Some(handle) = self.frame.take() {
            host.cancel_frame(handle);
        }
    }

    fn stop_countdown<H: Host>(&mut self, host: &mut H) {
        if let Some(handle) = self.countdown.take() {
            host.stop_countdown(handle);
        }
    }

    fn allocate_handle(&mut self) -> u64 {
        let id = self.next_handle;
        self.next_handle += 1;
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::HeadlessHost;
    use crate::sim::Collision;

    fn session() -> GameSession {
        GameSession::new(Tuning::default(), FieldSize::new(640.0, 480.0), 1234)
    }

    /// Fire countdown ticks until the timer stops
    fn finish_countdown(session: &mut GameSession, host: &mut HeadlessHost) -> u32 {
        let mut ticks = 0;
        while let Some(timer) = host.countdown {
            session.on_countdown_tick(timer, host);
            ticks += 1;
        }
        ticks
    }

    fn playing() -> (GameSession, HeadlessHost) {
        let mut s = session();
        let mut host = HeadlessHost::new();
        s.start_round(&mut host);
        finish_countdown(&mut s, &mut host);
        assert_eq!(s.phase(), GamePhase::Playing);
        (s, host)
    }

    fn run_frame(s: &mut GameSession, host: &mut HeadlessHost) -> Option<TickOutcome> {
        let frame = host.take_frame()?;
        s.on_frame(frame, host)
    }

    #[test]
    fn test_start_counts_down_before_playing() {
        let mut s = session();
        let mut host = HeadlessHost::new();

        s.start_round(&mut host);
        assert_eq!(s.countdown_remaining(), Some(3));
        assert!(s.round().is_none());
        assert!(host.pending_frame.is_none());
        assert_eq!(host.music, Some(MusicTrack::Game));

        let timer = host.countdown.unwrap();
        s.on_countdown_tick(timer, &mut host);
        assert_eq!(s.countdown_remaining(), Some(2));
        s.on_countdown_tick(timer, &mut host);
        assert_eq!(s.countdown_remaining(), Some(1));
        assert!(host.pending_frame.is_none());

        s.on_countdown_tick(timer, &mut host);
        assert_eq!(s.phase(), GamePhase::Playing);
        assert!(host.countdown.is_none());
        assert!(host.pending_frame.is_some());

        let round = s.round().unwrap();
        assert_eq!(round.actor.y(), 240.0);
        assert_eq!(round.actor.vel, 0.0);
        assert_eq!(round.obstacles.len(), 1);
        assert_eq!(round.score.value(), 0);
    }

    #[test]
    fn test_frames_tick_and_draw() {
        let (mut s, mut host) = playing();
        for _ in 0..10 {
            assert!(run_frame(&mut s, &mut host).is_some());
        }
        assert_eq!(host.frames_drawn, 10);
        assert_eq!(s.round().unwrap().time_ticks, 10);
    }

    #[test]
    fn test_flap_only_while_playing() {
        let mut s = session();
        let mut host = HeadlessHost::new();
        s.flap(&mut host);
        assert!(host.cues.is_empty());

        s.start_round(&mut host);
        s.flap(&mut host);
        assert!(host.cues.is_empty());

        finish_countdown(&mut s, &mut host);
        s.flap(&mut host);
        assert_eq!(host.cues, vec![SoundCue::Flap]);
        let actor = &s.round().unwrap().actor;
        assert!(actor.controlled);
        assert_eq!(actor.vel, -7.0);
        assert_eq!(actor.y(), 240.0);
    }

    #[test]
    fn test_pause_cancels_pending_frame() {
        let (mut s, mut host) = playing();
        run_frame(&mut s, &mut host);
        let pending = host.pending_frame.unwrap();

        s.pause(&mut host);
        assert_eq!(s.phase(), GamePhase::Paused);
        assert!(host.pending_frame.is_none());
        assert_eq!(host.cancelled_frames, vec![pending]);

        // A callback that was already in flight does nothing
        let before = s.round().unwrap().time_ticks;
        assert!(s.on_frame(pending, &mut host).is_none());
        assert_eq!(s.round().unwrap().time_ticks, before);
        assert_eq!(host.frames_drawn, 1);
    }

    #[test]
    fn test_resume_keeps_round() {
        let (mut s, mut host) = playing();
        s.flap(&mut host);
        for _ in 0..5 {
            run_frame(&mut s, &mut host);
        }
        let snapshot = s.round().unwrap().actor.clone();
        let ticks = s.round().unwrap().time_ticks;

        s.pause(&mut host);
        s.resume_round(&mut host);
        assert_eq!(s.countdown_remaining(), Some(3));
        assert!(host.pending_frame.is_none());

        finish_countdown(&mut s, &mut host);
        assert_eq!(s.phase(), GamePhase::Playing);
        assert_eq!(s.round().unwrap().actor, snapshot);
        assert_eq!(s.round().unwrap().time_ticks, ticks);
    }

    #[test]
    fn test_crash_into_ground_ends_round() {
        let (mut s, mut host) = playing();
        s.flap(&mut host);

        let mut last = None;
        for _ in 0..1000 {
            match run_frame(&mut s, &mut host) {
                Some(outcome) => last = Some(outcome),
                None => break,
            }
        }
        let outcome = last.unwrap();
        assert!(outcome.collision.is_some());
        assert!(matches!(s.phase(), GamePhase::GameOver { .. }));
        assert!(host.pending_frame.is_none());
        assert_eq!(host.cues.last(), Some(&SoundCue::Hit));
    }

    #[test]
    fn test_game_over_reports_final_score() {
        let (mut s, mut host) = playing();
        // Drop the bird straight into the floor
        s.flap(&mut host);
        s.round.as_mut().unwrap().actor.pos.y = 470.0;
        s.round.as_mut().unwrap().actor.vel = 5.0;
        s.round.as_mut().unwrap().score = {
            let mut score = crate::sim::ScoreTracker::new(999);
            let actor = crate::sim::Actor::new(160.0, 0.0, 20.0);
            for _ in 0..7 {
                let mut o = crate::sim::Obstacle::new(0.0, 0.0, 250.0);
                score.maybe_score(&mut o, &actor, 80.0);
            }
            score
        };

        run_frame(&mut s, &mut host);
        assert_eq!(
            s.phase(),
            GamePhase::GameOver {
                final_score: 7,
                cause: Collision::Ground
            }
        );
        assert_eq!(s.score(), 7);
        assert_eq!(host.last_drawn_score, 7);
    }

    #[test]
    fn test_restart_gives_fresh_round() {
        let (mut s, mut host) = playing();
        s.flap(&mut host);
        for _ in 0..20 {
            run_frame(&mut s, &mut host);
        }
        s.pause(&mut host);
        s.restart_round(&mut host);
        assert!(s.round().is_none());

        finish_countdown(&mut s, &mut host);
        let round = s.round().unwrap();
        assert_eq!(round.actor.y(), 240.0);
        assert_eq!(round.actor.vel, 0.0);
        assert!(!round.actor.controlled);
        assert_eq!(round.obstacles.len(), 1);
        assert_eq!(round.score.value(), 0);
        assert_eq!(round.time_ticks, 0);
    }

    #[test]
    fn test_return_to_menu_discards_round() {
        let (mut s, mut host) = playing();
        s.pause(&mut host);
        s.return_to_menu(&mut host);
        assert_eq!(s.phase(), GamePhase::Menu);
        assert!(s.round().is_none());
        assert_eq!(host.music, Some(MusicTrack::Menu));
    }

    #[test]
    fn test_commands_ignored_in_wrong_phase() {
        let mut s = session();
        let mut host = HeadlessHost::new();

        s.pause(&mut host);
        s.resume_round(&mut host);
        s.restart_round(&mut host);
        s.return_to_menu(&mut host);
        assert_eq!(s.phase(), GamePhase::Menu);
        assert!(host.countdown.is_none());

        let (mut s, mut host) = playing();
        s.start_round(&mut host);
        s.resume_round(&mut host);
        s.return_to_menu(&mut host);
        assert_eq!(s.phase(), GamePhase::Playing);
    }

    #[test]
    fn test_stale_countdown_handle_ignored() {
        let (mut s, mut host) = playing();
        s.pause(&mut host);
        s.resume_round(&mut host);
        let first = host.countdown.unwrap();

        s.on_countdown_tick(TimerHandle(first.0 + 100), &mut host);
        assert_eq!(s.countdown_remaining(), Some(3));

        s.on_countdown_tick(first, &mut host);
        assert_eq!(s.countdown_remaining(), Some(2));
    }

    #[test]
    fn test_resize_applies_to_next_round() {
        let (mut s, mut host) = playing();
        s.set_field_size(1280.0, 720.0);
        assert_eq!(s.round().unwrap().field, FieldSize::new(640.0, 480.0));

        s.pause(&mut host);
        s.restart_round(&mut host);
        finish_countdown(&mut s, &mut host);
        let round = s.round().unwrap();
        assert_eq!(round.field, FieldSize::new(1280.0, 720.0));
        assert_eq!(round.actor.x(), 320.0);
        assert_eq!(round.actor.y(), 360.0);
    }

    #[test]
    fn test_zero_second_countdown_starts_immediately() {
        let tuning = Tuning {
            countdown_seconds: 0,
            ..Tuning::default()
        };
        let mut s = GameSession::new(tuning, FieldSize::new(640.0, 480.0), 1);
        let mut host = HeadlessHost::new();
        s.start_round(&mut host);
        assert_eq!(s.phase(), GamePhase::Playing);
        assert!(host.countdown.is_none());
        assert!(host.pending_frame.is_some());
    }

    #[test]
    fn test_countdown_tick_count() {
        let mut s = session();
        let mut host = HeadlessHost::new();
        s.start_round(&mut host);
        assert_eq!(finish_countdown(&mut s, &mut host), 3);
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use crate::host::HeadlessHost;
    use proptest::prelude::*;

    #[derive(Debug, Clone, Copy)]
    enum Input {
        Start,
        Restart,
        Resume,
        Pause,
        Menu,
        Flap,
        Countdown,
        Frames(u8),
    }

    fn input() -> impl Strategy<Value = Input> {
        prop_oneof![
            Just(Input::Start),
            Just(Input::Restart),
            Just(Input::Resume),
            Just(Input::Pause),
            Just(Input::Menu),
            Just(Input::Flap),
            Just(Input::Countdown),
            any::<u8>().prop_map(Input::Frames),
        ]
    }

    proptest! {
        #[test]
        fn test_phase_invariants(seed in any::<u64>(), inputs in prop::collection::vec(input(), 1..80)) {
            let mut s = GameSession::new(Tuning::default(), FieldSize::new(1280.0, 720.0), seed);
            let mut host = HeadlessHost::new();

            for input in inputs {
                match input {
                    Input::Start => s.start_round(&mut host),
                    Input::Restart => s.restart_round(&mut host),
                    Input::Resume => s.resume_round(&mut host),
                    Input::Pause => s.pause(&mut host),
                    Input::Menu => s.return_to_menu(&mut host),
                    Input::Flap => s.flap(&mut host),
                    Input::Countdown => {
                        if let Some(timer) = host.countdown {
                            let was_new_round = matches!(
                                s.phase(),
                                GamePhase::Countdown { remaining: 1, then: AfterCountdown::NewRound }
                            );
                            s.on_countdown_tick(timer, &mut host);
                            if was_new_round {
                                // Every fresh round starts from the same layout
                                let round = s.round().unwrap();
                                prop_assert_eq!(round.time_ticks, 0);
                                prop_assert_eq!(round.score.value(), 0);
                                prop_assert_eq!(round.actor.vel, 0.0);
                                prop_assert!(!round.actor.controlled);
                                prop_assert_eq!(round.actor.x(), 320.0);
                                prop_assert_eq!(round.actor.y(), 360.0);
                                prop_assert_eq!(round.obstacles.len(), 1);
                                prop_assert_eq!(round.obstacles.front().unwrap().x, 1280.0);
                            }
                        }
                    }
                    Input::Frames(n) => {
                        for _ in 0..n {
                            let Some(frame) = host.take_frame() else { break };
                            let before = s.score();
                            let outcome = s.on_frame(frame, &mut host);
                            if let Some(outcome) = outcome {
                                prop_assert!(s.score() >= before);
                                if let Some(cause) = outcome.collision {
                                    prop_assert_eq!(
                                        s.phase(),
                                        GamePhase::GameOver { final_score: before, cause }
                                    );
                                }
                            }
                        }
                    }
                }

                prop_assert_eq!(s.is_ticking(), s.phase().is_playing());
                prop_assert_eq!(host.pending_frame.is_some(), s.phase().is_playing());
                prop_assert_eq!(
                    host.countdown.is_some(),
                    matches!(s.phase(), GamePhase::Countdown { .. })
                );
                prop_assert!(s.score() <= s.tuning().max_score);
                prop_assert_eq!(s.round().is_none(), matches!(
                    s.phase(),
                    GamePhase::Menu | GamePhase::Countdown { then: AfterCountdown::NewRound, .. }
                ));
            }
        }
    }
}
