//! Game settings and balance
//!
//! Loaded from JSON; any field left out falls back to `consts`.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::SettingsError;
use crate::sprite::SpriteManifest;

/// Difficulty preset levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum DifficultyPreset {
    Easy,
    #[default]
    Normal,
    Hard,
}

impl DifficultyPreset {
    pub fn as_str(&self) -> &'static str {
        match self {
            DifficultyPreset::Easy => "Easy",
            DifficultyPreset::Normal => "Normal",
            DifficultyPreset::Hard => "Hard",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "easy" => Some(DifficultyPreset::Easy),
            "normal" | "norm" => Some(DifficultyPreset::Normal),
            "hard" => Some(DifficultyPreset::Hard),
            _ => None,
        }
    }

    /// Speed at session start
    pub fn base_speed(&self) -> u32 {
        match self {
            DifficultyPreset::Easy => 50,
            DifficultyPreset::Normal => DEFAULT_SPEED,
            DifficultyPreset::Hard => 75,
        }
    }

    /// Speed at which growth stops
    pub fn max_speed(&self) -> u32 {
        match self {
            DifficultyPreset::Easy => 120,
            DifficultyPreset::Normal => MAX_GAME_SPEED,
            DifficultyPreset::Hard => 200,
        }
    }
}

/// Fixed viewport geometry for a session
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
    /// Fraction of the height above the ground line
    pub ground_fraction: f32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: SCREEN_WIDTH,
            height: SCREEN_HEIGHT,
            ground_fraction: SIZE_SKY,
        }
    }
}

impl Viewport {
    /// Screen y of the ground line
    #[inline]
    pub fn ground_y(&self) -> f32 {
        (self.height * self.ground_fraction).floor()
    }
}

/// Game settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub preset: DifficultyPreset,
    pub viewport: Viewport,

    // === Difficulty clock ===
    pub base_speed: u32,
    pub max_speed: u32,
    pub sprite_change_offset: u32,

    // === Player ===
    pub player_x: f32,
    pub jump_speed: f32,
    pub jump_height: f32,
    pub fall_speed: f32,
    pub duck_height_ratio: f32,

    // === Obstacles ===
    pub broken_speed: f32,
    pub cactus_speed: f32,
    pub bird_speed: f32,
    pub tornado_speed: f32,
    pub bird_score_start: u32,
    pub tornado_score_start: u32,
    pub max_obstacle_distance: f32,
    pub min_gap_player_widths: f32,

    // === Power-up ===
    /// Seconds
    pub ultimate_duration: f32,
    pub ultimate_boost: u32,
    /// Seconds
    pub powerup_min_interval: f32,
    pub powerup_chance: u32,
    pub powerup_nudge: f32,

    // === Decorations ===
    pub decoration_chance: u32,

    pub sprites: SpriteManifest,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            preset: DifficultyPreset::Normal,
            viewport: Viewport::default(),

            base_speed: DEFAULT_SPEED,
            max_speed: MAX_GAME_SPEED,
            sprite_change_offset: SPRITE_CHANGE_OFFSET,

            player_x: PLAYER_X,
            jump_speed: JUMP_SPEED,
            jump_height: JUMP_HEIGHT,
            fall_speed: FALL_SPEED,
            duck_height_ratio: DUCK_HEIGHT_RATIO,

            broken_speed: BROKEN_SPEED,
            cactus_speed: SPEED_CACTUS,
            bird_speed: SPEED_BIRD,
            tornado_speed: SPEED_TORNADO,
            bird_score_start: BIRD_SCORE_START,
            tornado_score_start: TORNADO_SCORE_START,
            max_obstacle_distance: DISTANCE_BETWEEN_ENEMY_MAX,
            min_gap_player_widths: MIN_GAP_PLAYER_WIDTHS,

            ultimate_duration: ULTIMATE_DURATION,
            ultimate_boost: ULTIMATE_BOOST,
            powerup_min_interval: POWERUP_MIN_INTERVAL,
            powerup_chance: POWERUP_CHANCE,
            powerup_nudge: POWERUP_NUDGE,

            decoration_chance: DECORATION_CHANCE,

            sprites: SpriteManifest::default(),
        }
    }
}

impl Settings {
    /// Create settings from a difficulty preset
    pub fn from_preset(preset: DifficultyPreset) -> Self {
        let mut settings = Self::default();
        settings.apply_preset(preset);
        settings
    }

    /// Apply a difficulty preset (updates the speed range)
    pub fn apply_preset(&mut self, preset: DifficultyPreset) {
        self.preset = preset;
        self.base_speed = preset.base_speed();
        self.max_speed = preset.max_speed();
    }

    /// Parse and validate settings from JSON
    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        let settings: Settings = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let settings = Self::from_json(&json)?;
        log::info!("Loaded settings from {} ({})", path.display(), settings.preset.as_str());
        Ok(settings)
    }

    /// Reject values the simulation cannot honour
    pub fn validate(&self) -> Result<(), SettingsError> {
        fn invalid(field: &'static str, reason: &'static str) -> Result<(), SettingsError> {
            Err(SettingsError::Invalid { field, reason })
        }

        let vp = &self.viewport;
        if !(vp.width > 0.0 && vp.height > 0.0) {
            return invalid("viewport", "width and height must be positive");
        }
        if !(vp.ground_fraction > 0.0 && vp.ground_fraction <= 1.0) {
            return invalid("viewport.ground_fraction", "must be in (0, 1]");
        }
        if self.base_speed == 0 {
            return invalid("base_speed", "must be at least 1");
        }
        if self.sprite_change_offset == 0 {
            return invalid("sprite_change_offset", "must be at least 1");
        }
        if self.ultimate_boost == 0 {
            return invalid("ultimate_boost", "must be at least 1");
        }
        if !(self.jump_height > 0.0) {
            return invalid("jump_height", "must be positive");
        }
        // A step at least the arc height would skip the apex
        if !(self.jump_speed > 0.0 && self.jump_speed < self.jump_height) {
            return invalid("jump_speed", "must be positive and below jump_height");
        }
        if !(self.fall_speed >= 1.0) {
            return invalid("fall_speed", "must be at least 1");
        }
        if !(self.duck_height_ratio > 0.0 && self.duck_height_ratio <= 1.0) {
            return invalid("duck_height_ratio", "must be in (0, 1]");
        }
        if self.powerup_chance == 0 || self.decoration_chance == 0 {
            return invalid("chance", "one-in-N chances must be at least 1");
        }
        if self.sprites.cacti.is_empty() {
            return invalid("sprites.cacti", "at least one cactus sprite is required");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(Settings::default().validate().is_ok());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let settings = Settings::from_json(r#"{ "base_speed": 40, "ultimate_boost": 3 }"#).unwrap();
        assert_eq!(settings.base_speed, 40);
        assert_eq!(settings.ultimate_boost, 3);
        assert_eq!(settings.max_speed, MAX_GAME_SPEED);
        assert_eq!(settings.viewport, Viewport::default());
    }

    #[test]
    fn test_zero_boost_rejected() {
        let err = Settings::from_json(r#"{ "ultimate_boost": 0 }"#).unwrap_err();
        assert!(matches!(
            err,
            SettingsError::Invalid {
                field: "ultimate_boost",
                ..
            }
        ));
    }

    #[test]
    fn test_jump_speed_bounded_by_height() {
        let ok = Settings::from_json(r#"{ "jump_height": 160.0, "jump_speed": 120.0 }"#);
        assert!(ok.is_ok());

        let err = Settings::from_json(r#"{ "jump_height": 40.0, "jump_speed": 50.0 }"#).unwrap_err();
        assert!(matches!(
            err,
            SettingsError::Invalid {
                field: "jump_speed",
                ..
            }
        ));
    }

    #[test]
    fn test_bad_json_is_parse_error() {
        let err = Settings::from_json("{ not json").unwrap_err();
        assert!(matches!(err, SettingsError::Parse(_)));
    }

    #[test]
    fn test_preset_round_trip() {
        for preset in [DifficultyPreset::Easy, DifficultyPreset::Normal, DifficultyPreset::Hard] {
            assert_eq!(DifficultyPreset::from_str(preset.as_str()), Some(preset));
        }
        let hard = Settings::from_preset(DifficultyPreset::Hard);
        assert_eq!(hard.base_speed, 75);
        assert_eq!(hard.max_speed, 200);
    }

    #[test]
    fn test_ground_line() {
        let vp = Viewport::default();
        assert_eq!(vp.ground_y(), 350.0);
    }
}
