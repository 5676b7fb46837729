//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Time only advances through `Session::tick`
//! - Seeded RNG only
//! - Stable iteration order (spawn order)
//! - No rendering or platform dependencies

pub mod clock;
pub mod collision;
pub mod entity;
pub mod mask;
pub mod obstacle;
pub mod player;
pub mod session;
pub mod spawn;

pub use clock::{DifficultyClock, sprite_change_offset};
pub use collision::{CollisionReport, collide_mask};
pub use entity::{Body, Entity, Rect};
pub use mask::Mask;
pub use obstacle::{BreakDirection, Decoration, Obstacle, ObstacleKind, Pickup};
pub use player::{MotionPhase, Player, Ultimate};
pub use session::Session;
pub use spawn::{SpawnClass, select_kind, spawn_gate};
