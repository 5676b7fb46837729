//! Player controller: jump/fall state machine, run cycle, power-up timer

use std::sync::Arc;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::entity::{Body, Entity, Rect};
use super::mask::Mask;
use crate::settings::Settings;
use crate::sprite::{Sheet, SpriteFrame};

/// Progress at or below which a jump turns into a fall
pub const JUMP_APEX_PROGRESS: f32 = 0.1;
/// Progress from which the fall runs at full speed
pub const FALL_FULL_SPEED_PROGRESS: f32 = 0.9;

/// Vertical motion phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MotionPhase {
    Grounded,
    Jumping,
    Falling,
}

/// An active power-up window
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Ultimate {
    /// Session time of the (latest) activation, seconds
    pub activated_at: f32,
    pub duration: f32,
}

impl Ultimate {
    #[inline]
    pub fn expired(&self, now: f32) -> bool {
        now - self.activated_at > self.duration
    }
}

/// The user-controlled runner
#[derive(Debug, Clone)]
pub struct Player {
    pub body: Body,
    pub phase: MotionPhase,
    pub ducking: bool,
    pub ultimate: Option<Ultimate>,
    rest_y: f32,
    frame_cursor: u32,
    pose: usize,
    sheet: Sheet,
    duck_masks: Vec<Arc<Mask>>,
    duck_height: f32,
    jump_speed: f32,
    jump_height: f32,
    fall_speed: f32,
    base_speed: u32,
}

impl Player {
    pub fn new(settings: &Settings, sheet: Sheet) -> Self {
        let size = sheet.size();
        let rest_y = settings.viewport.ground_y() - size.y;
        let duck_height = (size.y * settings.duck_height_ratio).round().max(1.0);
        let duck_masks = (0..sheet.len())
            .map(|i| Arc::new(sheet.frame(i).mask.crop_bottom(duck_height as u32)))
            .collect();

        Self {
            body: Body::new(Rect::new(settings.player_x, rest_y, size.x, size.y), 0.0),
            phase: MotionPhase::Grounded,
            ducking: false,
            ultimate: None,
            rest_y,
            frame_cursor: 0,
            pose: 0,
            sheet,
            duck_masks,
            duck_height,
            jump_speed: settings.jump_speed,
            jump_height: settings.jump_height,
            fall_speed: settings.fall_speed,
            base_speed: settings.base_speed,
        }
    }

    /// Resting (ground) y of the top edge
    #[inline]
    pub fn rest_y(&self) -> f32 {
        self.rest_y
    }

    #[inline]
    pub fn y(&self) -> f32 {
        self.body.rect.pos.y
    }

    #[inline]
    pub fn width(&self) -> f32 {
        self.body.rect.size.x
    }

    #[inline]
    pub fn height(&self) -> f32 {
        self.body.rect.size.y
    }

    /// Current animation pose index
    #[inline]
    pub fn pose(&self) -> usize {
        self.pose
    }

    #[inline]
    pub fn is_ultimate(&self) -> bool {
        self.ultimate.is_some()
    }

    /// Crouching on the ground (airborne ducks do nothing)
    #[inline]
    pub fn is_ducking(&self) -> bool {
        self.ducking && self.phase == MotionPhase::Grounded
    }

    pub fn frame(&self) -> &SpriteFrame {
        self.sheet.frame(self.pose)
    }

    /// Collision rectangle (shorter while ducking)
    pub fn hitbox(&self) -> Rect {
        let rect = self.body.rect;
        if self.is_ducking() {
            let cut = rect.size.y - self.duck_height;
            Rect {
                pos: rect.pos + Vec2::new(0.0, cut),
                size: Vec2::new(rect.size.x, self.duck_height),
            }
        } else {
            rect
        }
    }

    /// Collision mask matching `hitbox`
    pub fn mask(&self) -> &Mask {
        if self.is_ducking() {
            &self.duck_masks[self.pose % self.duck_masks.len()]
        } else {
            &self.frame().mask
        }
    }

    /// Start a jump. Ignored while falling; always resets the pose.
    pub fn jump(&mut self) {
        self.frame_cursor = 0;
        self.pose = 0;
        if self.phase != MotionPhase::Falling {
            self.phase = MotionPhase::Jumping;
        }
    }

    pub fn duck(&mut self, pressed: bool) {
        self.ducking = pressed;
    }

    /// Normalised arc progress: 1 on the ground, falling toward 0 at the top
    #[inline]
    fn progress(&self) -> f32 {
        (self.y() - self.rest_y + self.jump_height) / self.jump_height
    }

    /// Advance one frame
    ///
    /// `speed` scales the jump step so an arc takes about the same wall time
    /// at any difficulty; `offset` is the clock's sprite change offset.
    pub fn update(&mut self, speed: u32, offset: u32) {
        match self.phase {
            MotionPhase::Jumping => {
                let scale = self.base_speed as f32 / speed.max(1) as f32;
                let dy = (self.jump_speed * self.progress() * scale).ceil();
                self.body.rect.pos.y -= dy;
                if self.progress() <= JUMP_APEX_PROGRESS {
                    self.phase = MotionPhase::Falling;
                }
            }
            MotionPhase::Falling => {
                if self.rest_y - self.y() < self.fall_speed {
                    self.body.rect.pos.y = self.rest_y;
                    self.phase = MotionPhase::Grounded;
                } else {
                    let c = self.progress();
                    let taper = if c < FALL_FULL_SPEED_PROGRESS {
                        c.max(JUMP_APEX_PROGRESS)
                    } else {
                        1.0
                    };
                    let dy = (self.fall_speed * taper).ceil();
                    self.body.rect.pos.y = (self.y() + dy).min(self.rest_y);
                }
            }
            MotionPhase::Grounded => {
                let offset = offset.max(1);
                let cycle = self.sheet.len() as u32 * offset;
                self.frame_cursor = (self.frame_cursor + 1) % cycle;
                self.pose = (self.frame_cursor / offset) as usize;
            }
        }
    }

    /// Start (or refresh) the power-up. Returns true when newly activated.
    pub fn activate_ultimate(&mut self, now: f32, duration: f32) -> bool {
        match &mut self.ultimate {
            Some(active) => {
                active.activated_at = now;
                false
            }
            None => {
                self.ultimate = Some(Ultimate {
                    activated_at: now,
                    duration,
                });
                true
            }
        }
    }

    /// End the power-up once its window has passed. Returns true exactly once per window.
    pub fn update_ultimate(&mut self, now: f32) -> bool {
        match self.ultimate {
            Some(active) if active.expired(now) => {
                self.ultimate = None;
                true
            }
            _ => false,
        }
    }
}

impl Entity for Player {
    fn body(&self) -> &Body {
        &self.body
    }

    fn body_mut(&mut self) -> &mut Body {
        &mut self.body
    }
}
