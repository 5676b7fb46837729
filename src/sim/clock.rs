//! Difficulty clock
//!
//! Game speed doubles as the frame rate: the host ticks `speed` times per
//! second, so everything that moves per frame speeds up with it.

use serde::{Deserialize, Serialize};

use crate::settings::Settings;

/// Frames each animation pose is held at the given speed (never below 1)
#[inline]
pub fn sprite_change_offset(base_offset: u32, speed: u32) -> u32 {
    let base_offset = base_offset.max(1);
    base_offset.saturating_sub(speed / base_offset).max(1)
}

/// Derives the current game speed from elapsed time and the power-up boost
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DifficultyClock {
    base_speed: u32,
    max_speed: u32,
    boost_factor: u32,
    base_offset: u32,
    speed: u32,
    boosted: bool,
}

impl DifficultyClock {
    pub fn new(settings: &Settings) -> Self {
        Self {
            base_speed: settings.base_speed,
            max_speed: settings.max_speed,
            boost_factor: settings.ultimate_boost.max(1),
            base_offset: settings.sprite_change_offset,
            speed: settings.base_speed,
            boosted: false,
        }
    }

    #[inline]
    pub fn speed(&self) -> u32 {
        self.speed
    }

    #[inline]
    pub fn base_speed(&self) -> u32 {
        self.base_speed
    }

    #[inline]
    pub fn is_boosted(&self) -> bool {
        self.boosted
    }

    /// Speed for `elapsed` seconds into the session
    ///
    /// Grows linearly (floored) while below the maximum and no power-up is
    /// active; holds otherwise.
    pub fn compute_speed(&self, elapsed: f32, ultimate_active: bool) -> u32 {
        if self.speed < self.max_speed && !ultimate_active && !self.boosted {
            let grown = (self.base_speed as f32 + elapsed.max(0.0)).floor() as u32;
            grown.min(self.max_speed).max(self.speed)
        } else {
            self.speed
        }
    }

    pub fn update(&mut self, elapsed: f32, ultimate_active: bool) {
        self.speed = self.compute_speed(elapsed, ultimate_active);
    }

    /// Multiply the speed by the boost factor. Returns false if already boosted.
    pub fn apply_boost(&mut self) -> bool {
        if self.boosted {
            return false;
        }
        self.speed *= self.boost_factor;
        self.boosted = true;
        true
    }

    /// Divide the boost back out. Returns false if not boosted.
    pub fn release_boost(&mut self) -> bool {
        if !self.boosted {
            return false;
        }
        debug_assert_eq!(self.speed % self.boost_factor, 0);
        self.speed /= self.boost_factor;
        self.boosted = false;
        true
    }

    /// Frame rate the host should pace at
    #[inline]
    pub fn ticks_per_second(&self) -> u32 {
        self.speed
    }

    /// Seconds per frame at the current speed
    #[inline]
    pub fn frame_dt(&self) -> f32 {
        1.0 / self.speed.max(1) as f32
    }

    #[inline]
    pub fn sprite_change_offset(&self) -> u32 {
        sprite_change_offset(self.base_offset, self.speed)
    }
}
