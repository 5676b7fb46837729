//! Fox Run - a side-scrolling obstacle-dodging runner
//!
//! Core modules:
//! - `sim`: Deterministic simulation (physics, spawning, collisions, session state)
//! - `sprite`: Decoded images, sprite sheets and the loader seam
//! - `settings`: Data-driven game balance
//! - `game`: The facade a window/input/render layer drives once per frame

pub mod error;
pub mod game;
pub mod settings;
pub mod sim;
pub mod sprite;

pub use error::{AssetError, GameError, GeometryError, SettingsError};
pub use game::{Game, Layer, RenderItem, RenderList};
pub use settings::{DifficultyPreset, Settings, Viewport};
pub use image::RgbaImage;
pub use sprite::{ImageLoader, SpriteCatalog};

/// Game configuration constants
pub mod consts {
    /// Viewport dimensions (pixels)
    pub const SCREEN_WIDTH: f32 = 900.0;
    pub const SCREEN_HEIGHT: f32 = 500.0;
    /// Fraction of the screen height above the ground line
    pub const SIZE_SKY: f32 = 0.7;

    /// Starting game speed (also frames per second)
    pub const DEFAULT_SPEED: u32 = 60;
    /// Speed stops growing once it reaches this
    pub const MAX_GAME_SPEED: u32 = 150;
    /// Frames each animation pose is held at speed 0
    pub const SPRITE_CHANGE_OFFSET: u32 = 11;

    /// Player horizontal position
    pub const PLAYER_X: f32 = 20.0;
    /// Jump impulse (pixels per frame at full arc progress)
    pub const JUMP_SPEED: f32 = 20.0;
    /// Arc height used to normalise jump progress
    pub const JUMP_HEIGHT: f32 = 100.0;
    /// Fall speed (pixels per frame)
    pub const FALL_SPEED: f32 = 8.0;
    /// Fraction of the run sprite kept while ducking
    pub const DUCK_HEIGHT_RATIO: f32 = 0.6;

    /// Scale applied to the break velocity of a broken obstacle
    pub const BROKEN_SPEED: f32 = 8.0;

    /// Horizontal drift per frame for each obstacle kind
    pub const SPEED_CACTUS: f32 = 8.0;
    pub const SPEED_BIRD: f32 = 10.0;
    pub const SPEED_TORNADO: f32 = 4.0;

    /// Score gates for the special obstacle kinds
    pub const BIRD_SCORE_START: u32 = 10;
    pub const TORNADO_SCORE_START: u32 = 25;

    /// Upper bound of the gap between obstacles
    pub const DISTANCE_BETWEEN_ENEMY_MAX: f32 = 600.0;
    /// Lower bound of the gap, in player widths
    pub const MIN_GAP_PLAYER_WIDTHS: f32 = 4.0;

    /// Power-up duration (seconds)
    pub const ULTIMATE_DURATION: f32 = 5.0;
    /// Integer speed multiplier while the power-up is active
    pub const ULTIMATE_BOOST: u32 = 2;
    /// Minimum time between power-up spawns (seconds)
    pub const POWERUP_MIN_INTERVAL: f32 = 20.0;
    /// One-in-N per-frame chance of a power-up spawn once the interval passed
    pub const POWERUP_CHANCE: u32 = 300;
    /// Horizontal nudge, in pickup widths, when a pickup lands on an obstacle
    pub const POWERUP_NUDGE: f32 = 2.0;

    /// One-in-N per-frame chance of a decoration roll
    pub const DECORATION_CHANCE: u32 = 50;
}
