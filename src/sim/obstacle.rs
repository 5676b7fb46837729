//! Obstacles, decorations and power-up pickups
//!
//! Obstacle variants share one struct; per-kind behaviour dispatches on
//! [`ObstacleKind`].

use std::sync::Arc;

use glam::Vec2;
use image::RgbaImage;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::entity::{Body, Entity, Rect};
use super::mask::Mask;
use crate::settings::Viewport;
use crate::sprite::{self, Sheet, SpriteFrame};

/// Obstacle kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ObstacleKind {
    /// Static ground obstacle, one of the cactus sprite variants
    Cactus { variant: usize },
    /// Animated obstacle flying at head height
    Bird,
    /// Animated hazard that breaks other obstacles (at most one alive)
    Tornado,
}

impl ObstacleKind {
    #[inline]
    pub fn is_hazard(&self) -> bool {
        matches!(self, ObstacleKind::Tornado)
    }

    #[inline]
    pub fn is_animated(&self) -> bool {
        !matches!(self, ObstacleKind::Cactus { .. })
    }

    pub fn name(&self) -> &'static str {
        match self {
            ObstacleKind::Cactus { .. } => "cactus",
            ObstacleKind::Bird => "bird",
            ObstacleKind::Tornado => "tornado",
        }
    }
}

/// Which way a broken obstacle is thrown
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BreakDirection {
    /// Back along the track and down
    Left,
    /// Ahead of the player and up
    Right,
}

impl BreakDirection {
    /// Multiplier applied to the break velocity
    #[inline]
    pub fn sign(self) -> f32 {
        match self {
            BreakDirection::Left => 1.0,
            BreakDirection::Right => -1.0,
        }
    }
}

/// A colliding obstacle
#[derive(Debug, Clone)]
pub struct Obstacle {
    pub id: u32,
    pub kind: ObstacleKind,
    pub body: Body,
    pub broken: bool,
    pub break_direction: Option<BreakDirection>,
    /// Ballistic velocity used once broken (x leftward, y downward)
    pub break_velocity: Vec2,
    /// Per-frame rotation step in degrees, shrinking by one each frame
    pub rotate_angle: f32,
    /// Accumulated rotation of the visual, degrees
    pub rotation: f32,
    /// Can the hazard break this obstacle?
    pub hazard_target: bool,
    /// Hazard only: has it reached the viewport yet
    pub triggered: bool,
    frame_cursor: u32,
    pose: usize,
    sheet: Sheet,
    visual: Arc<RgbaImage>,
}

impl Obstacle {
    pub fn new<R: Rng + ?Sized>(
        id: u32,
        kind: ObstacleKind,
        sheet: Sheet,
        pos: Vec2,
        speed: f32,
        rng: &mut R,
    ) -> Self {
        let size = sheet.size();
        let visual = sheet.frame(0).image.clone();
        let break_velocity = Vec2::new(
            -0.1 * rng.random_range(5..=10) as f32,
            0.1 * rng.random_range(5..=10) as f32,
        );
        Self {
            id,
            kind,
            body: Body::new(Rect::new(pos.x, pos.y, size.x, size.y), speed),
            broken: false,
            break_direction: None,
            break_velocity,
            rotate_angle: rng.random_range(0..=60) as f32,
            rotation: 0.0,
            hazard_target: !kind.is_hazard(),
            triggered: false,
            frame_cursor: 0,
            pose: 0,
            sheet,
            visual,
        }
    }

    #[inline]
    pub fn is_hazard(&self) -> bool {
        self.kind.is_hazard()
    }

    #[inline]
    pub fn pose(&self) -> usize {
        self.pose
    }

    pub fn frame(&self) -> &SpriteFrame {
        self.sheet.frame(self.pose)
    }

    pub fn mask(&self) -> &Mask {
        &self.frame().mask
    }

    /// What to draw this frame (rotated once broken)
    pub fn visual(&self) -> &Arc<RgbaImage> {
        &self.visual
    }

    /// Switch to broken motion. Returns false if it was already broken.
    pub fn break_apart(&mut self, direction: BreakDirection) -> bool {
        if self.broken {
            return false;
        }
        self.broken = true;
        self.break_direction = Some(direction);
        log::debug!("{} #{} broken ({:?})", self.kind.name(), self.id, direction);
        true
    }

    /// Direction this hazard throws `target`: away from its own centre
    pub fn throw_direction(&self, target: &Obstacle) -> BreakDirection {
        if target.body.rect.center().x < self.body.rect.center().x {
            BreakDirection::Left
        } else {
            BreakDirection::Right
        }
    }

    /// Hazard warning: unbroken and its leading edge has reached the viewport
    pub fn warning(&self, vp: &Viewport) -> bool {
        self.is_hazard() && !self.broken && self.body.rect.left() <= vp.width
    }

    /// Advance one frame
    pub fn update(&mut self, offset: u32, broken_speed: f32, vp: &Viewport) {
        if self.kind.is_animated() {
            let offset = offset.max(1);
            let cycle = self.sheet.len() as u32 * offset;
            self.frame_cursor = (self.frame_cursor + 1) % cycle;
            self.pose = (self.frame_cursor / offset) as usize;
            if !self.broken {
                self.visual = self.frame().image.clone();
            }
        }

        if self.broken {
            let sign = self.break_direction.map_or(1.0, BreakDirection::sign);
            self.body
                .rect
                .translate(self.break_velocity * broken_speed * sign);
            self.rotation += self.rotate_angle * -sign;
            self.rotate_angle -= 1.0;
            match sprite::rotate_center(&self.frame().image, self.rotation) {
                Ok(image) => self.visual = Arc::new(image),
                // Keep last frame's picture; motion already applied
                Err(err) => log::trace!("{} #{}: rotation skipped: {err}", self.kind.name(), self.id),
            }
        } else {
            self.body.drift();
        }

        self.body.track_entry(vp);

        if self.warning(vp) && !self.triggered {
            self.triggered = true;
            log::info!("Tornado #{} incoming", self.id);
        }
    }
}

impl Entity for Obstacle {
    fn body(&self) -> &Body {
        &self.body
    }

    fn body_mut(&mut self) -> &mut Body {
        &mut self.body
    }
}

/// Purely cosmetic background object
#[derive(Debug, Clone)]
pub struct Decoration {
    pub body: Body,
    image: Arc<RgbaImage>,
}

impl Decoration {
    pub fn new(frame: &SpriteFrame, pos: Vec2, speed: f32) -> Self {
        let size = sprite::image_size(&frame.image);
        Self {
            body: Body::new(Rect::new(pos.x, pos.y, size.x, size.y), speed),
            image: frame.image.clone(),
        }
    }

    pub fn image(&self) -> &Arc<RgbaImage> {
        &self.image
    }

    pub fn update(&mut self, vp: &Viewport) {
        self.body.drift();
        self.body.track_entry(vp);
    }
}

impl Entity for Decoration {
    fn body(&self) -> &Body {
        &self.body
    }

    fn body_mut(&mut self) -> &mut Body {
        &mut self.body
    }
}

/// Power-up pickup
#[derive(Debug, Clone)]
pub struct Pickup {
    pub id: u32,
    pub body: Body,
    pub consumed: bool,
    frame: SpriteFrame,
}

impl Pickup {
    pub fn new(id: u32, frame: SpriteFrame, pos: Vec2, speed: f32) -> Self {
        let size = sprite::image_size(&frame.image);
        Self {
            id,
            body: Body::new(Rect::new(pos.x, pos.y, size.x, size.y), speed),
            consumed: false,
            frame,
        }
    }

    pub fn image(&self) -> &Arc<RgbaImage> {
        &self.frame.image
    }

    pub fn mask(&self) -> &Mask {
        &self.frame.mask
    }

    pub fn update(&mut self, vp: &Viewport) {
        if !self.consumed {
            self.body.drift();
            self.body.track_entry(vp);
        }
    }

    /// Mark as taken and park it off-screen so it cannot trigger again
    pub fn consume(&mut self, vp: &Viewport) {
        self.consumed = true;
        self.body.entered = true;
        self.body.rect.pos.x = -(vp.width + self.body.rect.size.x);
    }
}

impl Entity for Pickup {
    fn body(&self) -> &Body {
        &self.body
    }

    fn body_mut(&mut self) -> &mut Body {
        &mut self.body
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn obstacle(kind: ObstacleKind, x: f32) -> Obstacle {
        let mut rng = Pcg32::seed_from_u64(7);
        Obstacle::new(
            1,
            kind,
            Sheet::placeholder(20, 40, 4, [255; 4]),
            Vec2::new(x, 310.0),
            8.0,
            &mut rng,
        )
    }

    #[test]
    fn test_break_roll_ranges() {
        let mut rng = Pcg32::seed_from_u64(99);
        for id in 0..50 {
            let o = Obstacle::new(
                id,
                ObstacleKind::Bird,
                Sheet::placeholder(10, 10, 1, [255; 4]),
                Vec2::ZERO,
                8.0,
                &mut rng,
            );
            assert!((-1.0..=-0.5).contains(&o.break_velocity.x));
            assert!((0.5..=1.0).contains(&o.break_velocity.y));
            assert!((0.0..=60.0).contains(&o.rotate_angle));
        }
    }

    #[test]
    fn test_unbroken_drifts_left() {
        let vp = Viewport::default();
        let mut o = obstacle(ObstacleKind::Cactus { variant: 0 }, 500.0);
        o.update(6, 8.0, &vp);
        assert_eq!(o.body.rect.pos, Vec2::new(492.0, 310.0));
        assert!(o.body.entered);
    }

    #[test]
    fn test_cactus_does_not_animate() {
        let vp = Viewport::default();
        let mut o = obstacle(ObstacleKind::Cactus { variant: 0 }, 500.0);
        for _ in 0..5 {
            o.update(1, 8.0, &vp);
        }
        assert_eq!(o.pose(), 0);

        let mut bird = obstacle(ObstacleKind::Bird, 500.0);
        for _ in 0..5 {
            bird.update(1, 8.0, &vp);
        }
        assert_eq!(bird.pose(), 1);
    }

    #[test]
    fn test_broken_follows_ballistic_offset() {
        let vp = Viewport::default();
        let mut o = obstacle(ObstacleKind::Cactus { variant: 0 }, 500.0);
        let start = o.body.rect.pos;
        let angle = o.rotate_angle;
        assert!(o.break_apart(BreakDirection::Right));
        assert!(!o.break_apart(BreakDirection::Left));
        o.update(6, 8.0, &vp);
        let expected = start + o.break_velocity * 8.0 * -1.0;
        assert!((o.body.rect.pos - expected).length() < 1e-4);
        // Thrown right and up
        assert!(o.body.rect.pos.x > start.x);
        assert!(o.body.rect.pos.y < start.y);
        assert_eq!(o.rotate_angle, angle - 1.0);
        assert_eq!(o.rotation, angle);
    }

    #[test]
    fn test_degenerate_rotation_keeps_visual() {
        let vp = Viewport::default();
        let mut o = obstacle(ObstacleKind::Cactus { variant: 0 }, 500.0);
        o.break_apart(BreakDirection::Left);
        o.update(6, 8.0, &vp);
        let before = o.visual().clone();
        let pos = o.body.rect.pos;
        o.rotation = f32::NAN;
        o.update(6, 8.0, &vp);
        assert!(Arc::ptr_eq(&before, o.visual()));
        assert_ne!(o.body.rect.pos, pos);
    }

    #[test]
    fn test_hazard_throws_away_from_centre() {
        let tornado = obstacle(ObstacleKind::Tornado, 400.0);
        let ahead = obstacle(ObstacleKind::Cactus { variant: 0 }, 390.0);
        let behind = obstacle(ObstacleKind::Cactus { variant: 0 }, 410.0);
        assert_eq!(tornado.throw_direction(&ahead), BreakDirection::Left);
        assert_eq!(tornado.throw_direction(&behind), BreakDirection::Right);
        assert!(!tornado.hazard_target);
        assert!(ahead.hazard_target);
    }

    #[test]
    fn test_hazard_warning_and_trigger() {
        let vp = Viewport::default();
        let mut tornado = obstacle(ObstacleKind::Tornado, vp.width + 4.0);
        assert!(!tornado.warning(&vp));
        tornado.update(1, 8.0, &vp);
        assert!(tornado.warning(&vp));
        assert!(tornado.triggered);
        tornado.break_apart(BreakDirection::Left);
        assert!(!tornado.warning(&vp));
    }

    #[test]
    fn test_consumed_pickup_is_hidden() {
        let vp = Viewport::default();
        let mut pickup = Pickup::new(
            3,
            SpriteFrame::new(sprite::solid(24, 24, [255; 4])),
            Vec2::new(400.0, 200.0),
            8.0,
        );
        pickup.update(&vp);
        assert!(!pickup.is_hidden(&vp));
        pickup.consume(&vp);
        assert!(pickup.is_hidden(&vp));
        let x = pickup.body.rect.pos.x;
        pickup.update(&vp);
        assert_eq!(pickup.body.rect.pos.x, x);
    }
}
