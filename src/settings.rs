//! Player preferences
//!
//! Persisted as one flat JSON record in LocalStorage. Field names match the
//! blob older builds wrote, so existing saves keep loading.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Bird eye size
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum EyeSize {
    Small,
    #[default]
    Medium,
    Large,
}

impl EyeSize {
    pub fn as_str(&self) -> &'static str {
        match self {
            EyeSize::Small => "small",
            EyeSize::Medium => "medium",
            EyeSize::Large => "large",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "small" => Some(EyeSize::Small),
            "medium" => Some(EyeSize::Medium),
            "large" => Some(EyeSize::Large),
            _ => None,
        }
    }
}

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Bird body colour as `#rrggbb`
    #[serde(rename = "birdColor")]
    pub bird_color: String,
    #[serde(rename = "eyeSize")]
    pub eye_size: EyeSize,

    // === Audio ===
    /// Sound effects volume (0.0 - 1.0)
    #[serde(rename = "gameVolume")]
    pub effects_volume: f32,
    /// Music volume (0.0 - 1.0)
    #[serde(rename = "musicVolume")]
    pub music_volume: f32,
    #[serde(rename = "mute")]
    pub muted: bool,
}

pub const DEFAULT_BIRD_COLOR: &str = "#00FF00";

impl Default for Settings {
    fn default() -> Self {
        Self {
            bird_color: DEFAULT_BIRD_COLOR.to_string(),
            eye_size: EyeSize::Medium,
            effects_volume: 1.0,
            music_volume: 1.0,
            muted: false,
        }
    }
}

impl Settings {
    /// LocalStorage key
    pub const STORAGE_KEY: &'static str = "flappySettings";

    /// Parse a stored blob
    ///
    /// A blob that is not a JSON object gives the defaults. Otherwise each
    /// field is read on its own, so one bad value only resets that field.
    pub fn from_json(json: &str) -> Self {
        let fields = match serde_json::from_str::<Value>(json) {
            Ok(Value::Object(fields)) => fields,
            Ok(other) => {
                log::warn!("Ignoring settings that are not an object ({}), using defaults", other);
                return Self::default();
            }
            Err(e) => {
                log::warn!("Ignoring malformed settings ({}), using defaults", e);
                return Self::default();
            }
        };

        let mut settings = Self::default();
        read_field(&fields, "birdColor", &mut settings.bird_color);
        read_field(&fields, "eyeSize", &mut settings.eye_size);
        read_field(&fields, "gameVolume", &mut settings.effects_volume);
        read_field(&fields, "musicVolume", &mut settings.music_volume);
        read_field(&fields, "mute", &mut settings.muted);
        settings.sanitized()
    }

    pub fn to_json(&self) -> String {
        // Plain strings, floats and bools always serialize
        serde_json::to_string(self).unwrap_or_default()
    }

    /// Clamp volumes and replace an unusable colour
    pub fn sanitized(mut self) -> Self {
        if !is_hex_color(&self.bird_color) {
            log::warn!("Invalid bird colour {:?}, using default", self.bird_color);
            self.bird_color = DEFAULT_BIRD_COLOR.to_string();
        }
        self.effects_volume = clamp_volume(self.effects_volume);
        self.music_volume = clamp_volume(self.music_volume);
        self
    }

    pub fn set_bird_color(&mut self, color: &str) -> bool {
        if is_hex_color(color) {
            self.bird_color = color.to_string();
            true
        } else {
            false
        }
    }

    pub fn set_effects_volume(&mut self, vol: f32) {
        self.effects_volume = clamp_volume(vol);
    }

    pub fn set_music_volume(&mut self, vol: f32) {
        self.music_volume = clamp_volume(vol);
    }

    /// Effects volume after mute
    pub fn effective_effects_volume(&self) -> f32 {
        if self.muted { 0.0 } else { self.effects_volume }
    }

    /// Music volume after mute
    pub fn effective_music_volume(&self) -> f32 {
        if self.muted { 0.0 } else { self.music_volume }
    }
}

/// Overwrite `slot` with `fields[key]` when present and well typed
fn read_field<T: DeserializeOwned>(fields: &Map<String, Value>, key: &str, slot: &mut T) {
    let Some(value) = fields.get(key) else { return };
    match T::deserialize(value) {
        Ok(parsed) => *slot = parsed,
        Err(e) => log::warn!("Ignoring settings field {} ({}), using default", key, e),
    }
}

fn clamp_volume(vol: f32) -> f32 {
    if vol.is_nan() { 1.0 } else { vol.clamp(0.0, 1.0) }
}

/// `#rrggbb`, the format colour pickers produce
fn is_hex_color(s: &str) -> bool {
    s.len() == 7 && s.starts_with('#') && s[1..].chars().all(|c| c.is_ascii_hexdigit())
}
