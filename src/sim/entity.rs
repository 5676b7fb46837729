//! Shared position/velocity/visibility contract for everything that moves

use glam::{IVec2, Vec2};
use serde::{Deserialize, Serialize};

use crate::settings::Viewport;

/// Axis-aligned rectangle in screen space (y grows downward)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    /// Top-left corner
    pub pos: Vec2,
    pub size: Vec2,
}

impl Rect {
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self {
            pos: Vec2::new(x, y),
            size: Vec2::new(w, h),
        }
    }

    #[inline]
    pub fn left(&self) -> f32 {
        self.pos.x
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.pos.x + self.size.x
    }

    #[inline]
    pub fn top(&self) -> f32 {
        self.pos.y
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.pos.y + self.size.y
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        self.pos + self.size / 2.0
    }

    #[inline]
    pub fn translate(&mut self, delta: Vec2) {
        self.pos += delta;
    }

    /// Strict overlap (touching edges do not count)
    pub fn intersects(&self, other: &Rect) -> bool {
        self.left() < other.right()
            && other.left() < self.right()
            && self.top() < other.bottom()
            && other.top() < self.bottom()
    }

    /// Fully outside the viewport on any side
    pub fn is_outside(&self, vp: &Viewport) -> bool {
        self.right() <= 0.0 || self.left() >= vp.width || self.bottom() <= 0.0 || self.top() >= vp.height
    }

    /// Whole-pixel offset of `other`'s corner relative to ours
    #[inline]
    pub fn offset_to(&self, other: &Rect) -> IVec2 {
        (other.pos - self.pos).round().as_ivec2()
    }
}

/// Position, drift and viewport bookkeeping shared by all entities
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Body {
    pub rect: Rect,
    /// Horizontal drift per frame (negative = leftward)
    pub step: f32,
    /// Set once the rect first intersects the viewport
    pub entered: bool,
}

impl Body {
    /// Body drifting left at `speed` pixels per frame
    pub fn new(rect: Rect, speed: f32) -> Self {
        Self {
            rect,
            step: -speed,
            entered: false,
        }
    }

    pub fn drift(&mut self) {
        self.rect.pos.x += self.step;
    }

    pub fn track_entry(&mut self, vp: &Viewport) {
        if !self.entered && !self.rect.is_outside(vp) {
            self.entered = true;
        }
    }

    /// Should this body be reaped?
    ///
    /// Once it has been on screen: fully outside on any of the four edges.
    /// Before that it is still waiting on the right, so only the other three
    /// edges count.
    pub fn is_hidden(&self, vp: &Viewport) -> bool {
        if self.entered {
            self.rect.is_outside(vp)
        } else {
            self.rect.right() <= 0.0 || self.rect.bottom() <= 0.0 || self.rect.top() >= vp.height
        }
    }

    /// How far the left edge has travelled in from the right edge
    #[inline]
    pub fn distance_from_right(&self, vp: &Viewport) -> f32 {
        vp.width - self.rect.left()
    }
}

/// Anything the session moves, draws and reaps
pub trait Entity {
    fn body(&self) -> &Body;
    fn body_mut(&mut self) -> &mut Body;

    #[inline]
    fn rect(&self) -> Rect {
        self.body().rect
    }

    fn is_hidden(&self, vp: &Viewport) -> bool {
        self.body().is_hidden(vp)
    }
}
