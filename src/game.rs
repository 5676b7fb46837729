//! Host-facing facade
//!
//! The host owns the window, input polling and frame pacing. Each frame it
//! forwards input through the `on_*` hooks, calls [`Game::advance_frame`] and
//! draws the returned [`RenderList`].

use std::sync::Arc;

use glam::Vec2;
use image::RgbaImage;
use serde::{Deserialize, Serialize};

use crate::error::GameError;
use crate::settings::Settings;
use crate::sim::{Entity, Session};
use crate::sprite::SpriteCatalog;

/// Draw order, back to front
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Layer {
    Decoration,
    Pickup,
    Obstacle,
    Player,
}

/// One sprite to blit
#[derive(Debug, Clone)]
pub struct RenderItem {
    pub layer: Layer,
    /// Top-left corner in screen space
    pub pos: Vec2,
    pub image: Arc<RgbaImage>,
}

/// Everything the host needs to present a frame
#[derive(Debug, Clone, Default)]
pub struct RenderList {
    /// Visible sprites in draw order
    pub items: Vec<RenderItem>,
    pub score: u32,
    pub score_text: String,
    /// Show the incoming-tornado indicator
    pub hazard_warning: bool,
    pub ultimate_active: bool,
    pub player_ducking: bool,
    pub speed: u32,
    pub alive: bool,
}

/// A running game: the current session plus what survives restarts
#[derive(Debug, Clone)]
pub struct Game {
    session: Session,
    /// Best score since launch (not persisted)
    best_score: u32,
    sessions_played: u32,
}

impl Game {
    /// Start the first session. Settings and sprite groups are checked up
    /// front so that no later frame can fail.
    pub fn new(settings: Settings, catalog: SpriteCatalog, seed: u64) -> Result<Self, GameError> {
        settings.validate()?;
        catalog.validate()?;
        let session = Session::new(Arc::new(settings), Arc::new(catalog), seed);
        Ok(Self {
            session,
            best_score: 0,
            sessions_played: 1,
        })
    }

    /// Simulate one frame and describe what to draw
    ///
    /// After game over the world is frozen; the list still describes the
    /// final frame.
    pub fn advance_frame(&mut self, dt: f32) -> RenderList {
        self.session.tick(dt);
        self.best_score = self.best_score.max(self.session.score);
        self.render_list()
    }

    pub fn on_jump(&mut self) {
        if self.session.alive {
            self.session.player.jump();
        }
    }

    pub fn on_duck(&mut self, pressed: bool) {
        if self.session.alive {
            self.session.player.duck(pressed);
        }
    }

    /// Throw the current session away and start a fresh one
    pub fn on_restart(&mut self) {
        self.session = self.session.restarted();
        self.sessions_played += 1;
        log::info!("Restart #{} (best score {})", self.sessions_played - 1, self.best_score);
    }

    #[inline]
    pub fn is_session_alive(&self) -> bool {
        self.session.alive
    }

    #[inline]
    pub fn current_score(&self) -> u32 {
        self.session.score
    }

    #[inline]
    pub fn best_score(&self) -> u32 {
        self.best_score
    }

    #[inline]
    pub fn sessions_played(&self) -> u32 {
        self.sessions_played
    }

    /// Current game speed
    #[inline]
    pub fn speed(&self) -> u32 {
        self.session.clock.speed()
    }

    /// Frame rate the host should pace at
    #[inline]
    pub fn ticks_per_second(&self) -> u32 {
        self.session.clock.ticks_per_second()
    }

    #[inline]
    pub fn frame_dt(&self) -> f32 {
        self.session.clock.frame_dt()
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Describe the current state without advancing it
    pub fn render_list(&self) -> RenderList {
        let s = &self.session;
        let vp = &s.settings.viewport;
        let on_screen = |e: &dyn Entity| !e.rect().is_outside(vp);

        let mut items = Vec::with_capacity(s.decorations.len() + s.obstacles.len() + s.pickups.len() + 1);
        items.extend(s.decorations.iter().filter(|d| on_screen(*d)).map(|d| RenderItem {
            layer: Layer::Decoration,
            pos: d.body.rect.pos,
            image: d.image().clone(),
        }));
        items.extend(
            s.pickups
                .iter()
                .filter(|p| !p.consumed && on_screen(*p))
                .map(|p| RenderItem {
                    layer: Layer::Pickup,
                    pos: p.body.rect.pos,
                    image: p.image().clone(),
                }),
        );
        items.extend(s.obstacles.iter().filter(|o| on_screen(*o)).map(|o| RenderItem {
            layer: Layer::Obstacle,
            pos: o.body.rect.pos,
            image: o.visual().clone(),
        }));
        items.push(RenderItem {
            layer: Layer::Player,
            pos: s.player.body.rect.pos,
            image: s.player.frame().image.clone(),
        });

        RenderList {
            items,
            score: s.score,
            score_text: format!("Score: {}", s.score),
            hazard_warning: s.hazard_warning(),
            ultimate_active: s.player.is_ultimate(),
            player_ducking: s.player.is_ducking(),
            speed: s.clock.speed(),
            alive: s.alive,
        }
    }
}
