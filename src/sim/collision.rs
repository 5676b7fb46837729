//! Collision resolution
//!
//! Pixel-accurate overlap tests translated straight into state changes,
//! within the same frame.

use super::entity::Rect;
use super::mask::Mask;
use super::obstacle::{BreakDirection, Obstacle, Pickup};
use super::player::Player;
use crate::settings::Viewport;

/// Bounding-box reject, then mask test
pub fn collide_mask(a_rect: &Rect, a_mask: &Mask, b_rect: &Rect, b_mask: &Mask) -> bool {
    if !a_rect.intersects(b_rect) {
        return false;
    }
    a_mask.overlap(b_mask, a_rect.offset_to(b_rect))
}

/// What happened during one resolution pass
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CollisionReport {
    /// Obstacles the player smashed through while powered up
    pub broken_by_player: Vec<u32>,
    /// Obstacles the hazard broke
    pub broken_by_hazard: Vec<u32>,
    /// Pickups collected
    pub pickups: Vec<u32>,
    /// Power-up newly started (not a refresh)
    pub ultimate_started: bool,
    /// Player hit an obstacle without the power-up
    pub game_over: bool,
}

/// Player against every live pickup
///
/// Collected pickups are parked off-screen at once, so a pickup can only fire
/// once even if the pass ran twice in a frame.
pub fn collect_pickups(
    player: &mut Player,
    pickups: &mut [Pickup],
    now: f32,
    duration: f32,
    vp: &Viewport,
    report: &mut CollisionReport,
) {
    for pickup in pickups.iter_mut().filter(|p| !p.consumed) {
        if collide_mask(&player.hitbox(), player.mask(), &pickup.body.rect, pickup.mask()) {
            pickup.consume(vp);
            report.pickups.push(pickup.id);
            if player.activate_ultimate(now, duration) {
                report.ultimate_started = true;
            }
        }
    }
}

/// Player against every unbroken obstacle
pub fn player_vs_obstacles(player: &Player, obstacles: &mut [Obstacle], report: &mut CollisionReport) {
    let hitbox = player.hitbox();
    for obstacle in obstacles.iter_mut().filter(|o| !o.broken) {
        if !collide_mask(&hitbox, player.mask(), &obstacle.body.rect, obstacle.mask()) {
            continue;
        }
        if player.is_ultimate() {
            obstacle.break_apart(BreakDirection::Right);
            report.broken_by_player.push(obstacle.id);
        } else {
            report.game_over = true;
            return;
        }
    }
}

/// Active hazard against every obstacle it may target
pub fn hazard_vs_obstacles(obstacles: &mut [Obstacle], hazard_id: u32, report: &mut CollisionReport) {
    let Some(hazard) = obstacles
        .iter()
        .find(|o| o.id == hazard_id && !o.broken)
        .cloned()
    else {
        return;
    };

    for target in obstacles
        .iter_mut()
        .filter(|o| o.hazard_target && !o.broken)
    {
        if collide_mask(&hazard.body.rect, hazard.mask(), &target.body.rect, target.mask()) {
            let direction = hazard.throw_direction(target);
            target.break_apart(direction);
            report.broken_by_hazard.push(target.id);
        }
    }
}
