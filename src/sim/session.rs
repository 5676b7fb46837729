//! Session state and the per-frame tick
//!
//! A session is one run from start to game over. Restarting builds a fresh
//! one rather than resetting fields in place.

use std::sync::Arc;

use rand::{RngCore, SeedableRng};
use rand_pcg::Pcg32;

use super::clock::DifficultyClock;
use super::collision::{self, CollisionReport};
use super::entity::Entity;
use super::obstacle::{Decoration, Obstacle, Pickup};
use super::player::Player;
use super::spawn;
use crate::settings::Settings;
use crate::sprite::SpriteCatalog;

/// Complete state of one run
#[derive(Debug, Clone)]
pub struct Session {
    /// Seed this run was started with
    pub seed: u64,
    pub settings: Arc<Settings>,
    pub catalog: Arc<SpriteCatalog>,
    pub rng: Pcg32,
    pub clock: DifficultyClock,
    pub player: Player,
    /// Obstacles in spawn order
    pub obstacles: Vec<Obstacle>,
    pub decorations: Vec<Decoration>,
    pub pickups: Vec<Pickup>,
    /// One point per spawn decision
    pub score: u32,
    /// Gap the newest obstacle must open before the next spawn
    pub next_obstacle_distance: f32,
    /// Session time of the last power-up spawn, seconds
    pub last_powerup_spawn: f32,
    /// The live hazard, if any
    pub hazard: Option<u32>,
    pub alive: bool,
    /// Simulated seconds since the session started
    pub elapsed: f32,
    /// Frames simulated
    pub frames: u64,
    next_id: u32,
}

impl Session {
    pub fn new(settings: Arc<Settings>, catalog: Arc<SpriteCatalog>, seed: u64) -> Self {
        let mut rng = Pcg32::seed_from_u64(seed);
        let player = Player::new(&settings, catalog.player.clone());
        let next_obstacle_distance = spawn::roll_next_distance(&mut rng, player.width(), &settings);

        log::info!(
            "Session started (seed {}, preset {}, speed {})",
            seed,
            settings.preset.as_str(),
            settings.base_speed
        );

        Self {
            seed,
            clock: DifficultyClock::new(&settings),
            settings,
            catalog,
            rng,
            player,
            obstacles: Vec::new(),
            decorations: Vec::new(),
            pickups: Vec::new(),
            score: 0,
            next_obstacle_distance,
            last_powerup_spawn: 0.0,
            hazard: None,
            alive: true,
            elapsed: 0.0,
            frames: 0,
            next_id: 1,
        }
    }

    /// A fresh session with the same settings and sprites, seeded from this one
    pub fn restarted(&mut self) -> Session {
        let seed = self.rng.next_u64();
        Session::new(self.settings.clone(), self.catalog.clone(), seed)
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Is the hazard on screen and unbroken?
    pub fn hazard_warning(&self) -> bool {
        let vp = &self.settings.viewport;
        self.hazard
            .and_then(|id| self.obstacles.iter().find(|o| o.id == id))
            .is_some_and(|o| o.warning(vp))
    }

    /// Advance one frame of `dt` seconds
    ///
    /// Clock, spawning, entity updates, collisions, then reaping. Does nothing
    /// once the session has ended.
    pub fn tick(&mut self, dt: f32) -> CollisionReport {
        let mut report = CollisionReport::default();
        if !self.alive {
            return report;
        }

        self.elapsed += dt.max(0.0);
        self.frames += 1;

        self.clock.update(self.elapsed, self.player.is_ultimate());

        spawn::spawn_obstacles(self);
        spawn::spawn_decoration(self);
        spawn::spawn_power_up(self);

        let vp = self.settings.viewport;
        let speed = self.clock.speed();
        let offset = self.clock.sprite_change_offset();
        let broken_speed = self.settings.broken_speed;

        self.player.update(speed, offset);
        if self.player.update_ultimate(self.elapsed) {
            self.clock.release_boost();
            log::info!("Power-up expired, speed back to {}", self.clock.speed());
        }
        for obstacle in &mut self.obstacles {
            obstacle.update(offset, broken_speed, &vp);
        }
        for decoration in &mut self.decorations {
            decoration.update(&vp);
        }
        for pickup in &mut self.pickups {
            pickup.update(&vp);
        }

        self.resolve_collisions(&mut report);
        self.reap();

        report
    }

    fn resolve_collisions(&mut self, report: &mut CollisionReport) {
        let vp = self.settings.viewport;
        let duration = self.settings.ultimate_duration;

        collision::collect_pickups(
            &mut self.player,
            &mut self.pickups,
            self.elapsed,
            duration,
            &vp,
            report,
        );
        if report.ultimate_started {
            self.clock.apply_boost();
            log::info!("Power-up! speed boosted to {}", self.clock.speed());
        }

        collision::player_vs_obstacles(&self.player, &mut self.obstacles, report);
        if report.game_over {
            self.alive = false;
            log::info!(
                "Game over: score {} after {:.1}s (speed {})",
                self.score,
                self.elapsed,
                self.clock.speed()
            );
        }

        if let Some(hazard_id) = self.hazard {
            collision::hazard_vs_obstacles(&mut self.obstacles, hazard_id, report);
        }
    }

    /// Drop everything that has left the viewport
    fn reap(&mut self) {
        let vp = self.settings.viewport;

        if let Some(id) = self.hazard {
            let gone = self
                .obstacles
                .iter()
                .find(|o| o.id == id)
                .is_none_or(|o| o.is_hidden(&vp));
            if gone {
                self.hazard = None;
                log::debug!("Tornado #{} cleared", id);
            }
        }

        self.obstacles.retain(|o| !o.is_hidden(&vp));
        self.decorations.retain(|d| !d.is_hidden(&vp));
        self.pickups.retain(|p| !p.is_hidden(&vp));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::obstacle::BreakDirection;
    use crate::sim::player::MotionPhase;

    fn session(seed: u64) -> Session {
        Session::new(
            Arc::new(Settings::default()),
            Arc::new(SpriteCatalog::placeholder()),
            seed,
        )
    }

    fn dt(session: &Session) -> f32 {
        session.clock.frame_dt()
    }

    #[test]
    fn test_first_tick_spawns_and_scores() {
        let mut s = session(1);
        let dt = dt(&s);
        s.tick(dt);
        assert_eq!(s.obstacles.len(), 1);
        assert_eq!(s.score, 1);
        assert!(s.alive);
    }

    #[test]
    fn test_determinism() {
        let mut a = session(777);
        let mut b = session(777);
        for frame in 0..600 {
            if frame % 45 == 0 {
                a.player.jump();
                b.player.jump();
            }
            let dt = a.clock.frame_dt();
            a.tick(dt);
            b.tick(dt);
        }
        assert_eq!(a.score, b.score);
        assert_eq!(a.alive, b.alive);
        assert_eq!(a.obstacles.len(), b.obstacles.len());
        assert_eq!(a.player.y(), b.player.y());
    }

    #[test]
    fn test_collision_ends_session_once() {
        let mut s = session(3);
        let dt = dt(&s);
        s.tick(dt);
        let x = s.player.body.rect.left();
        s.obstacles[0].body.rect.pos.x = x;
        s.tick(dt);
        assert!(!s.alive);

        // Later frames change nothing
        let score = s.score;
        let frames = s.frames;
        s.player.jump();
        s.tick(dt);
        assert!(!s.alive);
        assert_eq!(s.score, score);
        assert_eq!(s.frames, frames);
    }

    #[test]
    fn test_ultimate_breaks_instead_of_ending() {
        let mut s = session(4);
        let dt = dt(&s);
        s.tick(dt);
        s.player.activate_ultimate(s.elapsed, 5.0);
        s.clock.apply_boost();
        let x = s.player.body.rect.left();
        s.obstacles[0].body.rect.pos.x = x;
        let report = s.tick(dt);
        assert!(s.alive);
        assert_eq!(report.broken_by_player.len(), 1);
    }

    #[test]
    fn test_boost_released_exactly_on_expiry() {
        let mut settings = Settings::default();
        // Hold the clock so only the boost moves the speed
        settings.max_speed = settings.base_speed;
        settings.powerup_chance = u32::MAX;
        let mut s = Session::new(Arc::new(settings), Arc::new(SpriteCatalog::placeholder()), 5);
        let dt = 1.0 / 60.0;
        s.tick(dt);
        assert_eq!(s.clock.speed(), 60);

        // Drop a stationary pickup onto the player
        let id = s.next_entity_id();
        let frame = s.catalog.power_up.frame(0).clone();
        let pos = s.player.body.rect.pos;
        s.pickups.push(Pickup::new(id, frame, pos, 0.0));

        let report = s.tick(dt);
        assert!(report.ultimate_started);
        assert_eq!(s.clock.speed(), 120);

        let mut frames = 0;
        while s.player.is_ultimate() {
            s.tick(dt);
            frames += 1;
            assert!(frames < 10_000);
        }
        assert_eq!(s.clock.speed(), 60);
        assert!(!s.clock.is_boosted());
    }

    #[test]
    fn test_hazard_cleared_when_reaped() {
        let mut s = session(6);
        s.score = s.settings.tornado_score_start;
        let id = spawn::spawn_obstacle_with_draw(&mut s, 1);
        assert_eq!(s.hazard, Some(id));

        let hazard = s.obstacles.iter_mut().find(|o| o.id == id).unwrap();
        hazard.body.entered = true;
        hazard.break_apart(BreakDirection::Right);
        hazard.body.rect.pos.y = -1000.0;
        s.reap();
        assert_eq!(s.hazard, None);
        assert!(s.obstacles.iter().all(|o| o.id != id));
    }

    #[test]
    fn test_restart_is_fresh() {
        let mut s = session(8);
        for _ in 0..300 {
            let dt = s.clock.frame_dt();
            s.tick(dt);
            if !s.alive {
                break;
            }
        }
        assert!(s.score > 0);
        let fresh = s.restarted();
        assert_eq!(fresh.score, 0);
        assert!(fresh.obstacles.is_empty());
        assert!(fresh.decorations.is_empty());
        assert!(fresh.pickups.is_empty());
        assert_eq!(fresh.hazard, None);
        assert!(fresh.alive);
        assert_eq!(fresh.clock.speed(), fresh.settings.base_speed);
        assert_eq!(fresh.player.phase, MotionPhase::Grounded);
        assert_eq!(fresh.player.y(), fresh.player.rest_y());
        assert!(!fresh.player.is_ultimate());
    }
}
