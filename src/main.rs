//! Headless demo runner
//!
//! Drives the simulation at the fixed timestep with a scripted input
//! pattern, then reports the outcome and records the best score. Useful
//! for profiling and for eyeballing generation/balance changes without a
//! renderer attached.
//!
//! Usage: ridgerun [mode] [seed] [seconds]
//!   mode: ascent | meadow | caverns (default meadow)

use ridgerun::sim::{tick, GameMode, GamePhase, GameState, TickInput};
use ridgerun::{bestscore, consts, Settings};

fn parse_mode(s: &str) -> Option<GameMode> {
    match s.to_lowercase().as_str() {
        "ascent" => Some(GameMode::Ascent),
        "meadow" => Some(GameMode::Meadow),
        "caverns" => Some(GameMode::Caverns),
        _ => None,
    }
}

/// A simple motion script: keep running forward, hop periodically with an
/// occasional longer hold to vary jump timing
fn scripted_input(frame: u64) -> TickInput {
    let hop = (frame / 30) % 3 != 2;
    TickInput {
        right: true,
        left: false,
        jump_held: hop && frame % 30 < 12,
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut args = std::env::args().skip(1);
    let mode = args
        .next()
        .and_then(|s| parse_mode(&s))
        .unwrap_or(GameMode::Meadow);
    let seed = args
        .next()
        .and_then(|s| s.parse().ok())
        .unwrap_or_else(|| {
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .map(|d| d.as_secs())
                .unwrap_or(0)
        });
    let seconds: f32 = args.next().and_then(|s| s.parse().ok()).unwrap_or(60.0);

    let settings = Settings::load();
    let mut state = GameState::new(seed, mode, settings.to_run_config());
    state.start();

    log::info!("Demo run: mode={mode:?} seed={seed} for {seconds}s");

    let total_frames = (seconds / consts::SIM_DT) as u64;
    for frame in 0..total_frames {
        tick(&mut state, scripted_input(frame), consts::SIM_DT);
        match state.phase {
            GamePhase::LevelWon => state.advance_level(),
            GamePhase::RunOver => break,
            _ => {}
        }
    }

    println!(
        "mode={:?} seed={} phase={:?} level={} lives={} time={:.1}s score={}",
        state.mode,
        state.seed,
        state.phase,
        state.level_index,
        state.lives,
        state.time,
        state.score
    );

    let best = bestscore::update(state.score);
    println!("best={best}");
}
