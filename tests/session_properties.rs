//! Property tests over whole sessions driven by random input

use std::collections::HashSet;
use std::sync::Arc;

use proptest::prelude::*;

use fox_run::sim::{ObstacleKind, Pickup, Session};
use fox_run::{Game, Settings, SpriteCatalog};

#[derive(Debug, Clone, Copy)]
enum Input {
    Idle,
    Jump,
    DuckOn,
    DuckOff,
}

fn input() -> impl Strategy<Value = Input> {
    prop_oneof![
        6 => Just(Input::Idle),
        2 => Just(Input::Jump),
        1 => Just(Input::DuckOn),
        1 => Just(Input::DuckOff),
    ]
}

fn apply(session: &mut Session, input: Input) {
    match input {
        Input::Idle => {}
        Input::Jump => session.player.jump(),
        Input::DuckOn => session.player.duck(true),
        Input::DuckOff => session.player.duck(false),
    }
}

fn apply_to_game(game: &mut Game, input: Input) {
    match input {
        Input::Idle => {}
        Input::Jump => game.on_jump(),
        Input::DuckOn => game.on_duck(true),
        Input::DuckOff => game.on_duck(false),
    }
}

/// Birds and tornadoes from the first spawn, power-ups every half second
fn busy_settings() -> Settings {
    Settings {
        bird_score_start: 1,
        tornado_score_start: 1,
        powerup_min_interval: 0.5,
        powerup_chance: 1,
        ..Settings::default()
    }
}

fn session(settings: Settings, seed: u64) -> Session {
    settings.validate().unwrap();
    Session::new(Arc::new(settings), Arc::new(SpriteCatalog::placeholder()), seed)
}

/// Session whose player has collected a power-up that never runs out
fn invincible_session(seed: u64) -> Session {
    let mut s = session(
        Settings {
            ultimate_duration: 1.0e6,
            ..busy_settings()
        },
        seed,
    );
    let dt = s.clock.frame_dt();
    s.tick(dt);

    let id = s.next_entity_id();
    let frame = s.catalog.power_up.frame(0).clone();
    let pos = s.player.body.rect.pos;
    s.pickups.push(Pickup::new(id, frame, pos, 0.0));
    let report = s.tick(dt);
    assert!(report.ultimate_started);
    assert!(s.player.is_ultimate());
    s
}

/// What the invariant check saw during one frame
#[derive(Debug, Default, Clone, Copy)]
struct Seen {
    hazard: bool,
    ultimate: bool,
    bird: bool,
    pickups: usize,
}

/// Advance one frame and check every per-frame invariant
fn step(s: &mut Session, known: &mut HashSet<u32>) -> Result<Seen, TestCaseError> {
    let before = s.score;
    let dt = s.clock.frame_dt();
    let report = s.tick(dt);
    prop_assert_eq!(report.game_over, !s.alive);

    // Every point is one spawn decision, and every spawn is a new obstacle
    let fresh: Vec<u32> = s
        .obstacles
        .iter()
        .map(|o| o.id)
        .filter(|id| !known.contains(id))
        .collect();
    prop_assert!(s.score == before || s.score == before + 1);
    prop_assert_eq!(fresh.len() as u32, s.score - before);
    known.extend(fresh);

    let tornadoes: Vec<u32> = s
        .obstacles
        .iter()
        .filter(|o| matches!(o.kind, ObstacleKind::Tornado))
        .map(|o| o.id)
        .collect();
    prop_assert!(tornadoes.len() <= 1);
    if let Some(&id) = tornadoes.first() {
        prop_assert_eq!(s.hazard, Some(id));
    }
    match s.hazard {
        Some(id) => prop_assert!(s.obstacles.iter().any(|o| o.id == id)),
        None => prop_assert!(!s.hazard_warning()),
    }

    let settings = &s.settings;
    prop_assert!(s.player.y() <= s.player.rest_y());
    prop_assert!(s.clock.speed() >= settings.base_speed);
    prop_assert!(s.clock.speed() <= settings.max_speed * settings.ultimate_boost);
    prop_assert_eq!(s.clock.is_boosted(), s.player.is_ultimate());

    Ok(Seen {
        hazard: s.hazard.is_some(),
        ultimate: s.player.is_ultimate(),
        bird: s.obstacles.iter().any(|o| matches!(o.kind, ObstacleKind::Bird)),
        pickups: report.pickups.len(),
    })
}

fn game(seed: u64) -> Game {
    Game::new(Settings::default(), SpriteCatalog::placeholder(), seed).unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn session_invariants_hold(seed in any::<u64>(), inputs in prop::collection::vec(input(), 1..600)) {
        let mut s = session(busy_settings(), seed);
        let mut known = HashSet::new();
        for input in inputs {
            apply(&mut s, input);
            step(&mut s, &mut known)?;
            if !s.alive {
                break;
            }
        }
    }

    #[test]
    fn invincible_runs_keep_invariants(seed in any::<u64>(), inputs in prop::collection::vec(input(), 600..2000)) {
        let mut s = invincible_session(seed);
        let mut known: HashSet<u32> = s.obstacles.iter().map(|o| o.id).collect();
        for input in inputs {
            apply(&mut s, input);
            step(&mut s, &mut known)?;
            prop_assert!(s.alive);
        }
    }

    #[test]
    fn same_seed_same_run(seed in any::<u64>(), inputs in prop::collection::vec(input(), 1..300)) {
        let mut a = game(seed);
        let mut b = game(seed);
        for input in inputs {
            apply_to_game(&mut a, input);
            apply_to_game(&mut b, input);
            let dt = a.frame_dt();
            a.advance_frame(dt);
            b.advance_frame(dt);
        }
        prop_assert_eq!(a.current_score(), b.current_score());
        prop_assert_eq!(a.is_session_alive(), b.is_session_alive());
        prop_assert_eq!(a.session().obstacles.len(), b.session().obstacles.len());
        prop_assert_eq!(a.session().player.y(), b.session().player.y());
    }

    #[test]
    fn restart_always_starts_clean(seed in any::<u64>(), frames in 1usize..400) {
        let mut game = game(seed);
        for _ in 0..frames {
            let dt = game.frame_dt();
            game.advance_frame(dt);
        }
        let best = game.best_score().max(game.current_score());
        game.on_restart();

        let s = game.session();
        prop_assert!(s.alive);
        prop_assert_eq!(s.score, 0);
        prop_assert!(s.obstacles.is_empty());
        prop_assert_eq!(s.hazard, None);
        prop_assert_eq!(s.clock.speed(), s.settings.base_speed);
        prop_assert!(!s.player.is_ultimate());
        prop_assert_eq!(game.best_score(), best);
    }
}

#[test]
fn invincible_runs_cycle_hazards_and_pickups() {
    let mut hazards = 0;
    let mut bird_frames = 0;
    let mut pickups = 0;
    for seed in 0..8 {
        let mut s = invincible_session(seed);
        let mut known: HashSet<u32> = s.obstacles.iter().map(|o| o.id).collect();
        let mut last_hazard = None;
        for _ in 0..5_000 {
            let seen = step(&mut s, &mut known).unwrap();
            assert!(s.alive);
            assert!(seen.ultimate);
            pickups += seen.pickups;
            if seen.bird {
                bird_frames += 1;
            }
            if seen.hazard && s.hazard != last_hazard {
                hazards += 1;
            }
            last_hazard = s.hazard;
        }
    }
    assert!(hazards >= 2, "only {hazards} tornadoes spawned");
    assert!(bird_frames > 0);
    // Spawned power-ups refresh the window instead of stacking the boost
    assert!(pickups > 0);
}
