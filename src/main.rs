//! Fox Run headless runner
//!
//! Drives the simulation without a window, on placeholder art or sprites
//! decoded from a directory, either idle or with a simple autopilot, and
//! prints a JSON summary.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use serde::Serialize;

use fox_run::sim::{Entity, ObstacleKind, Session};
use fox_run::{AssetError, DifficultyPreset, Game, ImageLoader, RgbaImage, Settings, SpriteCatalog};

#[derive(Parser, Debug)]
#[command(name = "fox-run")]
#[command(about = "Run Fox Run sessions headless and report the outcome")]
struct Cli {
    /// RNG seed for the first session
    #[arg(long, default_value_t = 1)]
    seed: u64,
    /// Frame cap per session
    #[arg(long, default_value_t = 18_000)]
    frames: u64,
    /// Sessions to play back to back (restarting after each game over)
    #[arg(long, default_value_t = 1)]
    runs: u32,
    /// JSON settings file
    #[arg(long)]
    settings: Option<PathBuf>,
    /// Sprite directory (placeholder art when omitted)
    #[arg(long)]
    assets: Option<PathBuf>,
    /// Difficulty preset, applied over the settings file
    #[arg(long, value_enum)]
    preset: Option<CliPreset>,
    /// Jump and duck automatically
    #[arg(long, default_value_t = false)]
    autopilot: bool,
    /// Pretty-print the summary
    #[arg(long, default_value_t = false)]
    pretty: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum CliPreset {
    Easy,
    Normal,
    Hard,
}

impl From<CliPreset> for DifficultyPreset {
    fn from(value: CliPreset) -> Self {
        match value {
            CliPreset::Easy => DifficultyPreset::Easy,
            CliPreset::Normal => DifficultyPreset::Normal,
            CliPreset::Hard => DifficultyPreset::Hard,
        }
    }
}

/// Decodes sprites from files under a root directory
struct DirLoader {
    root: PathBuf,
}

impl ImageLoader for DirLoader {
    fn load(&mut self, path: &str) -> Result<RgbaImage, AssetError> {
        let image = image::open(self.root.join(path)).map_err(|source| AssetError::Decode {
            path: path.to_string(),
            source,
        })?;
        Ok(image.to_rgba8())
    }
}

#[derive(Debug, Serialize)]
struct RunSummary {
    seed: u64,
    frames: u64,
    elapsed_secs: f32,
    score: u32,
    final_speed: u32,
    game_over: bool,
}

#[derive(Debug, Serialize)]
struct Summary {
    preset: &'static str,
    autopilot: bool,
    best_score: u32,
    runs: Vec<RunSummary>,
}

/// Horizontal look-ahead in player widths, scaled by speed
const LOOKAHEAD_WIDTHS: f32 = 1.5;

/// What the autopilot wants this frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    None,
    Jump,
    Duck,
}

fn autopilot(session: &Session) -> Action {
    let player = &session.player;
    let hitbox = player.hitbox();
    let speed_scale = session.clock.speed() as f32 / session.clock.base_speed().max(1) as f32;
    let reach = hitbox.right() + player.width() * LOOKAHEAD_WIDTHS * speed_scale;

    let crouch_top = player.rest_y() + player.height() * (1.0 - session.settings.duck_height_ratio);

    let threat = session
        .obstacles
        .iter()
        .filter(|o| !o.broken && o.rect().right() >= hitbox.left() && o.rect().left() <= reach)
        .min_by(|a, b| a.rect().left().total_cmp(&b.rect().left()));

    match threat {
        None => Action::None,
        Some(o) if matches!(o.kind, ObstacleKind::Bird) && o.rect().bottom() <= crouch_top => Action::Duck,
        Some(_) => Action::Jump,
    }
}

fn play(game: &mut Game, max_frames: u64, use_autopilot: bool) -> RunSummary {
    let seed = game.session().seed;
    while game.is_session_alive() && game.session().frames < max_frames {
        if use_autopilot {
            let action = autopilot(game.session());
            game.on_duck(action == Action::Duck);
            if action == Action::Jump {
                game.on_jump();
            }
        }
        let dt = game.frame_dt();
        game.advance_frame(dt);
    }

    let session = game.session();
    log::debug!(
        "Run seed {} finished: score {} in {} frames",
        seed,
        session.score,
        session.frames
    );
    RunSummary {
        seed,
        frames: session.frames,
        elapsed_secs: session.elapsed,
        score: session.score,
        final_speed: session.clock.speed(),
        game_over: !session.alive,
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let mut settings = match &cli.settings {
        Some(path) => Settings::load(path).with_context(|| format!("loading settings from {}", path.display()))?,
        None => Settings::default(),
    };
    if let Some(preset) = cli.preset {
        settings.apply_preset(preset.into());
    }
    let preset = settings.preset.as_str();

    log::info!("Fox Run (headless) starting, preset {}", preset);

    let catalog = match &cli.assets {
        Some(root) => {
            let mut loader = DirLoader { root: root.clone() };
            SpriteCatalog::load(&mut loader, &settings.sprites)
                .with_context(|| format!("loading sprites from {}", root.display()))?
        }
        None => SpriteCatalog::placeholder(),
    };

    let mut game = Game::new(settings, catalog, cli.seed).context("invalid game setup")?;

    let mut runs = Vec::with_capacity(cli.runs as usize);
    for run in 0..cli.runs.max(1) {
        if run > 0 {
            game.on_restart();
        }
        runs.push(play(&mut game, cli.frames, cli.autopilot));
    }

    let summary = Summary {
        preset,
        autopilot: cli.autopilot,
        best_score: game.best_score(),
        runs,
    };
    let json = if cli.pretty {
        serde_json::to_string_pretty(&summary)
    } else {
        serde_json::to_string(&summary)
    }
    .context("serializing summary")?;
    println!("{json}");

    Ok(())
}
