//! Procedural spawning of obstacles, decorations and power-ups

use std::ops::RangeInclusive;

use glam::Vec2;
use rand::Rng;

use super::entity::{Entity, Rect};
use super::obstacle::{Decoration, Obstacle, ObstacleKind, Pickup};
use super::session::Session;
use crate::settings::Settings;
use crate::sprite;

/// Kind selector draws are uniform over this range
pub const KIND_DRAWS: RangeInclusive<u32> = 1..=10;
/// Draws that ask for the hazard
pub const HAZARD_DRAWS: RangeInclusive<u32> = 1..=1;
/// Draws that ask for a flying obstacle
pub const FLYING_DRAWS: RangeInclusive<u32> = 2..=3;

/// Birds fly this far (min..=max) above the player's head
const BIRD_LIFT: RangeInclusive<i32> = 10..=30;
/// Decorations start this far past the right edge
const DECORATION_LEAD: RangeInclusive<i32> = 15..=30;
const DECORATION_GAP: RangeInclusive<i32> = 5..=20;
const DECORATION_STACK: RangeInclusive<i32> = 3..=5;
/// Pickups float up to this far above the ground
const PICKUP_LIFT: RangeInclusive<i32> = 0..=60;

/// Broad obstacle class picked by the kind selector
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpawnClass {
    Hazard,
    Flying,
    Ground,
}

/// May a new obstacle be emitted this frame?
///
/// `last_far` is how far the most recent obstacle has moved in from the right
/// edge, `None` when there is no obstacle at all.
#[inline]
pub fn spawn_gate(last_far: Option<f32>, threshold: f32) -> bool {
    last_far.is_none_or(|far| far >= threshold)
}

/// Map a kind draw to a class, applying the score and exclusivity gates
///
/// A draw whose gate fails falls back to the generic ground kind.
pub fn select_kind(draw: u32, score: u32, hazard_active: bool, settings: &Settings) -> SpawnClass {
    if HAZARD_DRAWS.contains(&draw) {
        if score >= settings.tornado_score_start && !hazard_active {
            return SpawnClass::Hazard;
        }
    } else if FLYING_DRAWS.contains(&draw) && score >= settings.bird_score_start {
        return SpawnClass::Flying;
    }
    SpawnClass::Ground
}

/// Bounds for the gap before the next obstacle
pub fn distance_bounds(player_width: f32, settings: &Settings) -> (f32, f32) {
    let min = (settings.min_gap_player_widths * player_width).round();
    let max = settings.max_obstacle_distance.round().max(min);
    (min, max)
}

/// Roll the gap before the next obstacle
pub fn roll_next_distance<R: Rng + ?Sized>(rng: &mut R, player_width: f32, settings: &Settings) -> f32 {
    let (min, max) = distance_bounds(player_width, settings);
    rng.random_range(min as i32..=max as i32) as f32
}

/// Emit an obstacle if the spawn gate is open. Returns the new obstacle's id.
pub fn spawn_obstacles(session: &mut Session) -> Option<u32> {
    let vp = session.settings.viewport;
    let last_far = session
        .obstacles
        .last()
        .map(|o| o.body().distance_from_right(&vp));
    if !spawn_gate(last_far, session.next_obstacle_distance) {
        return None;
    }

    let draw = session.rng.random_range(KIND_DRAWS);
    let id = spawn_obstacle_with_draw(session, draw);
    session.next_obstacle_distance =
        roll_next_distance(&mut session.rng, session.player.width(), &session.settings);
    log::debug!("Next obstacle gap: {}", session.next_obstacle_distance);
    Some(id)
}

/// One spawn decision with a given kind draw
///
/// Always scores one point, whatever kind comes out.
pub fn spawn_obstacle_with_draw(session: &mut Session, draw: u32) -> u32 {
    session.score += 1;

    let settings = session.settings.clone();
    let catalog = session.catalog.clone();
    let vp = settings.viewport;
    let ground = vp.ground_y();

    let class = select_kind(draw, session.score, session.hazard.is_some(), &settings);
    let (kind, sheet, speed) = match class {
        SpawnClass::Hazard => (ObstacleKind::Tornado, &catalog.tornado, settings.tornado_speed),
        SpawnClass::Flying => (ObstacleKind::Bird, &catalog.bird, settings.bird_speed),
        SpawnClass::Ground => {
            let variant = session.rng.random_range(0..catalog.cacti.len());
            (
                ObstacleKind::Cactus { variant },
                &catalog.cacti[variant],
                settings.cactus_speed,
            )
        }
    };

    let size = sheet.size();
    let pos = match class {
        // Arrives after a delay proportional to its speed
        SpawnClass::Hazard => Vec2::new(
            vp.width + settings.tornado_speed * settings.base_speed as f32,
            ground - size.y,
        ),
        SpawnClass::Flying => {
            let lift = session.rng.random_range(BIRD_LIFT) as f32;
            Vec2::new(vp.width, ground - session.player.height() - lift)
        }
        SpawnClass::Ground => Vec2::new(vp.width, ground - size.y),
    };

    let id = session.next_entity_id();
    let obstacle = Obstacle::new(id, kind, sheet.clone(), pos, speed, &mut session.rng);
    session.obstacles.push(obstacle);

    if kind.is_hazard() {
        session.hazard = Some(id);
        log::info!("Tornado #{} spawned at score {}", id, session.score);
    } else {
        log::debug!("Spawned {} #{} (score {})", kind.name(), id, session.score);
    }
    id
}

/// Low-probability cosmetic spawn, placed just off the right edge
pub fn spawn_decoration(session: &mut Session) -> bool {
    let chance = session.settings.decoration_chance;
    if session.rng.random_range(1..=chance) != 1 || !session.rng.random_bool(0.5) {
        return false;
    }

    let catalog = session.catalog.clone();
    let vp = session.settings.viewport;
    let sheet = &catalog.decorations[session.rng.random_range(0..catalog.decorations.len())];
    let size = sheet.size();

    let x = vp.width + session.rng.random_range(DECORATION_LEAD) as f32;
    let gap = session.rng.random_range(DECORATION_GAP) as f32;
    let stack = session.rng.random_range(DECORATION_STACK) as f32;
    let y = vp.ground_y() - (size.y + gap) * stack;

    session.decorations.push(Decoration::new(
        sheet.frame(0),
        Vec2::new(x, y),
        session.settings.cactus_speed,
    ));
    true
}

/// Time-gated power-up spawn. Returns the pickup id if one was placed.
pub fn spawn_power_up(session: &mut Session) -> Option<u32> {
    let settings = session.settings.clone();
    if session.elapsed - session.last_powerup_spawn < settings.powerup_min_interval {
        return None;
    }
    if session.rng.random_range(0..settings.powerup_chance) != 0 {
        return None;
    }

    let frame = session.catalog.power_up.frame(0).clone();
    let size = sprite::image_size(&frame.image);
    let vp = settings.viewport;
    let lead = session.rng.random_range(DECORATION_LEAD) as f32;
    let lift = session.rng.random_range(PICKUP_LIFT) as f32;
    let mut rect = Rect::new(vp.width + lead, vp.ground_y() - size.y - lift, size.x, size.y);

    // Don't hide it inside an obstacle
    if session.obstacles.iter().any(|o| o.body.rect.intersects(&rect)) {
        let direction = if session.rng.random_bool(0.5) { 1.0 } else { -1.0 };
        rect.pos.x += direction * settings.powerup_nudge * size.x;
        log::debug!("Power-up nudged {}", if direction > 0.0 { "right" } else { "left" });
    }

    let id = session.next_entity_id();
    session
        .pickups
        .push(Pickup::new(id, frame, rect.pos, settings.cactus_speed));
    session.last_powerup_spawn = session.elapsed;
    log::debug!("Power-up #{} spawned at {:.1}s", id, session.elapsed);
    Some(id)
}
