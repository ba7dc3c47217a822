//! Audio: sound cues, music and volume mixing
//!
//! Cues are procedurally generated with the Web Audio API (no sample files);
//! the two music loops are `<audio>` elements in the page.

use crate::settings::Settings;

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundCue {
    /// Bird flapped
    Flap,
    /// Pillar cleared
    Pass,
    /// Bird hit a pillar or the ground
    Hit,
}

/// Background music loops
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MusicTrack {
    Menu,
    Game,
}

impl MusicTrack {
    /// Id of the page's `<audio>` element for this track
    pub fn element_id(&self) -> &'static str {
        match self {
            MusicTrack::Menu => "menu-music",
            MusicTrack::Game => "game-music",
        }
    }
}

/// Receives cues from the session
pub trait AudioSink {
    fn play(&mut self, cue: SoundCue);

    /// Switch the music loop
    fn set_music(&mut self, _track: MusicTrack) {}
}

/// Effective volumes derived from preferences
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Mix {
    pub effects: f32,
    pub music: f32,
}

impl Default for Mix {
    fn default() -> Self {
        Self::from_settings(&Settings::default())
    }
}

impl Mix {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            effects: settings.effective_effects_volume(),
            music: settings.effective_music_volume(),
        }
    }

    pub fn effects_audible(&self) -> bool {
        self.effects > 0.0
    }
}

#[cfg(target_arch = "wasm32")]
pub use web::WebAudio;

#[cfg(target_arch = "wasm32")]
mod web {
    use wasm_bindgen::JsCast;
    use web_sys::{AudioContext, GainNode, HtmlAudioElement, OscillatorNode, OscillatorType};

    use super::{AudioSink, Mix, MusicTrack, SoundCue};
    use crate::settings::Settings;

    /// Web Audio cues plus `<audio>` element music
    pub struct WebAudio {
        ctx: Option<AudioContext>,
        mix: Mix,
        menu_music: Option<HtmlAudioElement>,
        game_music: Option<HtmlAudioElement>,
        track: Option<MusicTrack>,
    }

    fn music_element(track: MusicTrack) -> Option<HtmlAudioElement> {
        web_sys::window()?
            .document()?
            .get_element_by_id(track.element_id())?
            .dyn_into::<HtmlAudioElement>()
            .ok()
    }

    impl WebAudio {
        pub fn new(settings: &Settings) -> Self {
            // May fail outside a secure context
            let ctx = AudioContext::new().ok();
            if ctx.is_none() {
                log::warn!("Failed to create AudioContext - sound effects disabled");
            }
            let mut audio = Self {
                ctx,
                mix: Mix::from_settings(settings),
                menu_music: music_element(MusicTrack::Menu),
                game_music: music_element(MusicTrack::Game),
                track: None,
            };
            audio.apply_settings(settings);
            audio
        }

        /// Re-read volumes after the settings panel changed something
        pub fn apply_settings(&mut self, settings: &Settings) {
            self.mix = Mix::from_settings(settings);
            for el in [&self.menu_music, &self.game_music].into_iter().flatten() {
                el.set_volume(self.mix.music as f64);
            }
        }

        fn element(&self, track: MusicTrack) -> Option<&HtmlAudioElement> {
            match track {
                MusicTrack::Menu => self.menu_music.as_ref(),
                MusicTrack::Game => self.game_music.as_ref(),
            }
        }

        fn create_osc(
            &self,
            ctx: &AudioContext,
            freq: f32,
            osc_type: OscillatorType,
        ) -> Option<(OscillatorNode, GainNode)> {
            let osc = ctx.create_oscillator().ok()?;
            let gain = ctx.create_gain().ok()?;

            osc.set_type(osc_type);
            osc.frequency().set_value(freq);
            osc.connect_with_audio_node(&gain).ok()?;
            gain.connect_with_audio_node(&ctx.destination()).ok()?;

            Some((osc, gain))
        }

        /// Flap - quick upward chirp
        fn play_flap(&self, ctx: &AudioContext, vol: f32) {
            let Some((osc, gain)) = self.create_osc(ctx, 300.0, OscillatorType::Triangle) else {
                return;
            };
            let t = ctx.current_time();

            gain.gain().set_value_at_time(vol * 0.25, t).ok();
            gain.gain()
                .exponential_ramp_to_value_at_time(0.01, t + 0.1)
                .ok();
            osc.frequency().set_value_at_time(300.0, t).ok();
            osc.frequency()
                .exponential_ramp_to_value_at_time(700.0, t + 0.08)
                .ok();

            osc.start().ok();
            osc.stop_with_when(t + 0.12).ok();
        }

        /// Pass - two note ding
        fn play_pass(&self, ctx: &AudioContext, vol: f32) {
            for (i, freq) in [880.0, 1320.0].iter().enumerate() {
                let delay = i as f64 * 0.07;
                if let Some((osc, gain)) = self.create_osc(ctx, *freq, OscillatorType::Sine) {
                    let t = ctx.current_time() + delay;
                    gain.gain().set_value_at_time(vol * 0.3, t).ok();
                    gain.gain()
                        .exponential_ramp_to_value_at_time(0.01, t + 0.15)
                        .ok();
                    osc.start_with_when(t).ok();
                    osc.stop_with_when(t + 0.2).ok();
                }
            }
        }

        /// Hit - falling sawtooth thud
        fn play_hit(&self, ctx: &AudioContext, vol: f32) {
            let Some((osc, gain)) = self.create_osc(ctx, 400.0, OscillatorType::Sawtooth) else {
                return;
            };
            let t = ctx.current_time();

            gain.gain().set_value_at_time(vol * 0.3, t).ok();
            gain.gain()
                .exponential_ramp_to_value_at_time(0.01, t + 0.5)
                .ok();
            osc.frequency().set_value_at_time(400.0, t).ok();
            osc.frequency()
                .exponential_ramp_to_value_at_time(80.0, t + 0.4)
                .ok();

            osc.start().ok();
            osc.stop_with_when(t + 0.5).ok();
        }
    }

    impl AudioSink for WebAudio {
        fn play(&mut self, cue: SoundCue) {
            if !self.mix.effects_audible() {
                return;
            }
            let vol = self.mix.effects;
            let Some(ctx) = &self.ctx else { return };

            // Browsers keep the context suspended until a user gesture
            if ctx.state() == web_sys::AudioContextState::Suspended {
                let _ = ctx.resume();
            }

            match cue {
                SoundCue::Flap => self.play_flap(ctx, vol),
                SoundCue::Pass => self.play_pass(ctx, vol),
                SoundCue::Hit => self.play_hit(ctx, vol),
            }
        }

        fn set_music(&mut self, track: MusicTrack) {
            if self.track == Some(track) {
                return;
            }
            if let Some(el) = self.track.and_then(|t| self.element(t)) {
                let _ = el.pause();
            }
            if let Some(el) = self.element(track) {
                el.set_volume(self.mix.music as f64);
                // Autoplay may be refused before the first gesture
                let _ = el.play();
            }
            self.track = Some(track);
        }
    }
}
