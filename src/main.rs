//! Bonus Runner entry point
//!
//! Natively this runs a headless autopilot session against the real save
//! backend and logs what happened. Browser builds drive `World` from the
//! host page through the library instead.

#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use std::path::PathBuf;

    use anyhow::{Context, Result};
    use clap::Parser;

    use bonus_runner::persistence::{BlobStore, FileStore, MemoryStore};
    use bonus_runner::platform;
    use bonus_runner::sim::{GameEvent, GameState, GameStatus, TickInput, World, tick};
    use bonus_runner::{ShopItem, Tuning};

    #[derive(Parser, Debug)]
    #[command(name = "bonus-runner")]
    #[command(about = "Headless autopilot session for the Bonus Runner simulation core")]
    struct Cli {
        /// RNG seed for the spawn engine (random when omitted)
        #[arg(long)]
        seed: Option<u64>,
        /// Simulated seconds to play
        #[arg(long, default_value_t = 120.0)]
        seconds: f32,
        /// Simulation rate (ticks per second)
        #[arg(long, default_value_t = 60)]
        fps: u32,
        /// Directory holding the save blob (platform default when omitted)
        #[arg(long)]
        save_dir: Option<PathBuf>,
        /// Keep the save in memory only
        #[arg(long)]
        no_save: bool,
        /// JSON balance overrides
        #[arg(long)]
        tuning: Option<PathBuf>,
        /// Restart at the reached level after a game over
        #[arg(long)]
        keep_going: bool,
    }

    #[derive(Debug, Default)]
    struct Summary {
        runs: u32,
        hits: u32,
        shops: u32,
        best_level: u32,
    }

    pub fn run() -> Result<()> {
        platform::init_logging();
        let cli = Cli::parse();

        let tuning = match &cli.tuning {
            Some(path) => Tuning::load(path)
                .with_context(|| format!("loading tuning from {}", path.display()))?,
            None => Tuning::default(),
        };
        let store: Box<dyn BlobStore> = if cli.no_save {
            Box::new(MemoryStore::new())
        } else {
            match &cli.save_dir {
                Some(dir) => Box::new(FileStore::new(dir.clone())),
                None => platform::default_store(),
            }
        };

        let seed = cli.seed.unwrap_or_else(rand::random);
        log::info!("Bonus Runner (native) starting with seed {seed}");

        let mut state = GameState::with_store(store, tuning);
        if state.check_attendance(&platform::today_key()) {
            log::info!("Daily attendance reward granted");
            state.hide_attendance_toast();
        }
        let mut world = World::with_state(state, seed);

        let mut summary = Summary::default();
        if !start_run(&mut world, &mut summary) {
            anyhow::bail!("cannot start a run: out of energy (watch an ad or go premium)");
        }

        let fps = cli.fps.max(1);
        let dt = 1.0 / fps as f32;
        let total_ticks = (cli.seconds.max(0.0) * fps as f32) as u64;
        let input = TickInput {
            idle_mode: true,
            ..Default::default()
        };

        for _ in 0..total_ticks {
            for event in tick(&mut world, &input, dt) {
                match event {
                    GameEvent::DamageTaken { lives_left, .. } => {
                        summary.hits += 1;
                        log::info!("Hit! {lives_left} lives left");
                    }
                    GameEvent::LevelUp { level, lane_count } => {
                        summary.best_level = summary.best_level.max(level);
                        log::info!("Level {level} with {lane_count} lanes");
                    }
                    _ => {}
                }
            }

            match world.status() {
                GameStatus::Shop => {
                    summary.shops += 1;
                    visit_shop(&mut world.state);
                }
                GameStatus::GameOver if cli.keep_going => {
                    if !world.state.restart_game() {
                        log::warn!("Out of energy, stopping");
                        break;
                    }
                    summary.runs += 1;
                }
                GameStatus::GameOver | GameStatus::Victory => break,
                _ => {}
            }
        }

        let state = &world.state;
        log::info!(
            "Finished: status {:?}, level {}, score {}, high score {}, distance {:.0}",
            state.status,
            state.level,
            state.score,
            state.high_score,
            state.distance
        );
        log::info!(
            "{} run(s), {} hit(s), {} shop visit(s), best level {}, {} gems",
            summary.runs,
            summary.hits,
            summary.shops,
            summary.best_level.max(state.level),
            state.gems_collected
        );
        Ok(())
    }

    fn start_run(world: &mut World, summary: &mut Summary) -> bool {
        if !world.state.can_start_run() {
            world.state.watch_ad();
        }
        let started = world.state.start_game();
        if started {
            summary.runs += 1;
        }
        started
    }

    /// Spend credits the way a cautious player would, then leave
    fn visit_shop(state: &mut GameState) {
        for item in [ShopItem::Heal, ShopItem::DoubleJump, ShopItem::MaxLife] {
            let wanted = match item {
                ShopItem::Heal => state.lives < state.max_lives,
                ShopItem::DoubleJump => !state.has_double_jump,
                _ => true,
            };
            if wanted && state.buy_item(item, item.price()) {
                log::info!("Bought {item}");
            }
        }
        state.close_shop();
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() -> anyhow::Result<()> {
    headless::run()
}

#[cfg(target_arch = "wasm32")]
fn main() {
    bonus_runner::platform::init_logging();
}
