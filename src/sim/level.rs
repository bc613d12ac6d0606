//! Level construction, segment extension and platform recycling
//!
//! Horizontal modes build a handcrafted prefix and then append generated
//! segments until the target length is reached, placing the goal flag just
//! beyond. The vertical mode seeds a rolling window of platforms that
//! [`recycle_platforms`] relocates above the climb as they scroll out.
//!
//! All pattern tables must keep every horizontal gap under
//! `consts::max_jump_reach()` and every vertical step under
//! `consts::max_jump_height()`; this is a table invariant checked by the
//! property tests below, not corrected at tick time.

use glam::Vec2;
use rand::Rng;

use super::state::{
    AmbushPhase, Brain, Collectible, Enemy, GameMode, GameState, Platform, PlatformKind, Player,
    PowerUp, PowerUpKind, StatusEffects,
};
use crate::consts::*;

/// Ground-top band for horizontal generation
const BASELINE_MIN: f32 = 280.0;
const BASELINE_MAX: f32 = 470.0;
/// Baseline perturbation per segment
const BASELINE_STEP: f32 = 48.0;
/// Gap between segments (well under the jump reach)
const INTER_SEGMENT_GAP: std::ops::Range<f32> = 40.0..90.0;
/// Per-segment chance of an extra ground enemy (scaled by config)
const EXTRA_ENEMY_CHANCE: f64 = 0.25;
/// Per-segment chance of one power-up (scaled by config)
const POWERUP_CHANCE: f64 = 0.15;
/// Chance of a coin attached above a recycled platform (scaled by config)
const ATTACHED_COIN_CHANCE: f64 = 0.3;
/// Rolling platform window size for the vertical mode
const ASCENT_WINDOW: usize = 26;
/// Max horizontal drift between consecutive rungs, chosen so a rung one
/// full vertical gap up is still reachable mid-jump
const RUNG_DRIFT: f32 = 140.0;
/// Margin below the camera window before a platform is recycled
const RECYCLE_MARGIN: f32 = 60.0;

/// Generated segment layouts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pattern {
    FlatRun,
    Stairs,
    GapJump,
    LowTunnel,
}

/// (Re)build the world for the state's current mode and level index.
/// Clears all entity collections; the avatar respawns at the new spawn.
pub(crate) fn build_level(state: &mut GameState) {
    state.platforms.clear();
    state.enemies.clear();
    state.collectibles.clear();
    state.powerups.clear();
    state.particles.clear();
    state.effects = StatusEffects::default();
    state.time = 0.0;
    state.combo = 0;
    state.combo_clock = 0.0;

    match state.mode {
        GameMode::Ascent => build_ascent(state),
        GameMode::Meadow | GameMode::Caverns => build_horizontal(state),
    }

    state.player = Player::new(state.spawn);
    log::info!(
        "Built level {} ({:?}): {} platforms, {} enemies, {} coins, {} power-ups",
        state.level_index,
        state.mode,
        state.platforms.len(),
        state.enemies.len(),
        state.collectibles.len(),
        state.powerups.len(),
    );
}

fn build_horizontal(state: &mut GameState) {
    let difficulty = state.difficulty();
    let target_len = 3200.0 + 800.0 * state.level_index as f32;

    let (mut cursor, mut baseline) = handcrafted_prefix(state);

    while cursor < target_len {
        let pattern = pick_pattern(state, difficulty);
        // Perturb the baseline, clamped to the safe band
        baseline =
            (baseline + state.rng.random_range(-BASELINE_STEP..=BASELINE_STEP))
                .clamp(BASELINE_MIN, BASELINE_MAX);
        cursor = emit_segment(state, pattern, cursor, baseline, difficulty);
    }

    let goal = cursor + 160.0;
    state.goal_x = Some(goal);
    // A landing strip under the flag
    state
        .platforms
        .push(Platform::solid(goal, BASELINE_MAX + 10.0, 200.0, 10.0));

    state.bounds_x = (0.0, goal + 400.0);
    state.kill_y = BASELINE_MAX + 400.0;
    state.camera = Vec2::ZERO;
    state.best_height_y = state.spawn.y;
}

/// Hand-built opening stretch; returns (cursor x, baseline top)
fn handcrafted_prefix(state: &mut GameState) -> (f32, f32) {
    let baseline = 440.0;
    state.spawn = Vec2::new(80.0, baseline - PLAYER_HALF_H);

    match state.mode {
        GameMode::Meadow => {
            // A long safe meadow: ground, a coin arc, one floating ledge
            state
                .platforms
                .push(Platform::solid(320.0, baseline + 10.0, 320.0, 10.0));
            state
                .platforms
                .push(Platform::solid(480.0, baseline - 120.0, 70.0, 10.0));
            for i in 0..4 {
                state
                    .collectibles
                    .push(Collectible::new(260.0 + i as f32 * 40.0, baseline - 60.0));
            }
            let mut walker = Enemy::new(Vec2::new(520.0, baseline - 14.0), 60.0, Brain::Patrol);
            walker.facing = -1.0;
            state.enemies.push(walker);
            (640.0, baseline)
        }
        GameMode::Caverns => {
            // A cramped entry tunnel; a raised crumbling ledge shortcuts
            // over it, but the ground route below survives the ledge
            state
                .platforms
                .push(Platform::solid(280.0, baseline + 10.0, 280.0, 10.0));
            state.platforms.push(Platform {
                pos: Vec2::new(400.0, baseline - 96.0),
                half: Vec2::new(140.0, 10.0),
                kind: PlatformKind::Solid,
            });
            state
                .platforms
                .push(Platform::solid(630.0, baseline + 10.0, 70.0, 10.0));
            state.platforms.push(Platform {
                pos: Vec2::new(620.0, baseline - 110.0),
                half: Vec2::new(60.0, 10.0),
                kind: PlatformKind::Crumbling { uses: 2 },
            });
            state
                .collectibles
                .push(Collectible::new(400.0, baseline - 40.0));
            state
                .collectibles
                .push(Collectible::new(620.0, baseline - 150.0));
            let mut walker = Enemy::new(Vec2::new(440.0, baseline - 14.0), 60.0, Brain::Patrol);
            walker.facing = -1.0;
            state.enemies.push(walker);
            (700.0, baseline)
        }
        GameMode::Ascent => unreachable!("vertical mode has its own builder"),
    }
}

/// Pattern availability widens with the difficulty index
fn pick_pattern(state: &mut GameState, difficulty: u32) -> Pattern {
    let mut available = vec![Pattern::FlatRun, Pattern::Stairs];
    if difficulty >= 1 {
        available.push(Pattern::GapJump);
    }
    let tunnels_open = match state.mode {
        GameMode::Caverns => true,
        _ => difficulty >= 2,
    };
    if tunnels_open {
        available.push(Pattern::LowTunnel);
    }
    let idx = state.rng.random_range(0..available.len());
    available[idx]
}

/// Emit one segment at `cursor`; returns the x where the segment ends
fn emit_segment(
    state: &mut GameState,
    pattern: Pattern,
    cursor: f32,
    baseline: f32,
    difficulty: u32,
) -> f32 {
    // Every pattern leads with its own entry gap so the total distance from
    // the previous platform stays under the jump reach; GapJump's wide gap
    // replaces the small one rather than adding to it
    let cursor = if pattern == Pattern::GapJump {
        cursor
    } else {
        cursor + state.rng.random_range(INTER_SEGMENT_GAP)
    };
    match pattern {
        Pattern::FlatRun => {
            let half_w = 160.0;
            let center = cursor + half_w;
            state
                .platforms
                .push(Platform::solid(center, baseline + 10.0, half_w, 10.0));
            spawn_segment_enemy(state, center, baseline, difficulty);
            maybe_extra_enemy(state, center - 80.0, baseline, difficulty);
            for i in 0..3 {
                state
                    .collectibles
                    .push(Collectible::new(center - 60.0 + i as f32 * 60.0, baseline - 50.0));
            }
            maybe_powerup(state, center, baseline - 70.0);
            cursor + half_w * 2.0
        }
        Pattern::Stairs => {
            // Three rising steps; each rise stays under the jump apex
            let step_w = 60.0;
            let rise = 64.0;
            let dx = 110.0;
            let mut x = cursor + step_w;
            let mut top = baseline;
            for step in 0..3 {
                state
                    .platforms
                    .push(Platform::solid(x, top + 10.0, step_w, 10.0));
                if step == 2 {
                    state.collectibles.push(Collectible::new(x, top - 40.0));
                    spawn_segment_enemy(state, x, top, difficulty);
                }
                x += dx;
                top -= rise;
            }
            maybe_extra_enemy(state, cursor + step_w, baseline, difficulty);
            maybe_powerup(state, cursor + step_w, baseline - 70.0);
            x - dx + step_w
        }
        Pattern::GapJump => {
            let gap = state.rng.random_range(120.0..180.0);
            let half_w = 120.0;
            let center = cursor + gap + half_w;
            state
                .platforms
                .push(Platform::solid(center, baseline + 10.0, half_w, 10.0));
            // A coin over the gap rewards the committed jump
            state
                .collectibles
                .push(Collectible::new(cursor + gap / 2.0, baseline - 90.0));
            spawn_segment_enemy(state, center + 40.0, baseline, difficulty);
            maybe_extra_enemy(state, center - 40.0, baseline, difficulty);
            maybe_powerup(state, center + 60.0, baseline - 70.0);
            cursor + gap + half_w * 2.0
        }
        Pattern::LowTunnel => {
            let half_w = 160.0;
            let center = cursor + half_w;
            let clearance = 86.0;
            state
                .platforms
                .push(Platform::solid(center, baseline + 10.0, half_w, 10.0));
            state
                .platforms
                .push(Platform::solid(center, baseline - clearance - 10.0, half_w, 10.0));
            // Something nasty waits inside in the caverns
            if state.mode == GameMode::Caverns {
                let brain = Brain::Ambusher {
                    phase: AmbushPhase::Dormant {
                        pause_left: state.rng.random_range(0.5..1.5),
                    },
                };
                state
                    .enemies
                    .push(Enemy::new(Vec2::new(center + 60.0, baseline - 14.0), 60.0, brain));
            } else {
                spawn_segment_enemy(state, center + 60.0, baseline, difficulty);
            }
            maybe_extra_enemy(state, center - 80.0, baseline, difficulty);
            maybe_powerup(state, center - 80.0, baseline - 45.0);
            state
                .collectibles
                .push(Collectible::new(center, baseline - 40.0));
            cursor + half_w * 2.0
        }
    }
}

/// Weighted enemy roll skewing harder with difficulty
fn weighted_brain(state: &mut GameState, difficulty: u32) -> (Brain, f32) {
    let d = difficulty;
    let caverns = state.mode == GameMode::Caverns;

    let w_patrol = 60u32;
    let w_chaser = 10 + d * 10;
    let w_leaper = if d >= 1 { 8 + d * 6 } else { 0 };
    let w_ambush = if d >= 2 || caverns {
        6 + d * 6
    } else {
        0
    };
    let total = w_patrol + w_chaser + w_leaper + w_ambush;
    let mut roll = state.rng.random_range(0..total);

    if roll < w_patrol {
        return (Brain::Patrol, 60.0);
    }
    roll -= w_patrol;
    if roll < w_chaser {
        return (
            Brain::Chaser {
                detect_radius: 260.0,
            },
            70.0,
        );
    }
    roll -= w_chaser;
    if roll < w_leaper {
        let timer = state.rng.random_range(0.6..1.8);
        return (
            Brain::Leaper {
                jump_timer: timer,
                detect_radius: 360.0,
            },
            50.0,
        );
    }
    let pause = state.rng.random_range(0.8..2.0);
    (
        Brain::Ambusher {
            phase: AmbushPhase::Dormant { pause_left: pause },
        },
        60.0,
    )
}

fn spawn_segment_enemy(state: &mut GameState, x: f32, ground_top: f32, difficulty: u32) {
    let (brain, speed) = weighted_brain(state, difficulty);
    state
        .enemies
        .push(Enemy::new(Vec2::new(x, ground_top - 14.0), speed, brain));
}

fn maybe_extra_enemy(state: &mut GameState, x: f32, ground_top: f32, difficulty: u32) {
    let p = (EXTRA_ENEMY_CHANCE * state.config.enemy_multiplier as f64).clamp(0.0, 1.0);
    if state.rng.random_bool(p) {
        spawn_segment_enemy(state, x, ground_top, difficulty);
    }
}

fn maybe_powerup(state: &mut GameState, x: f32, y: f32) {
    let p = (POWERUP_CHANCE * state.config.powerup_frequency as f64).clamp(0.0, 1.0);
    if !state.rng.random_bool(p) {
        return;
    }
    let kind = match state.rng.random_range(0..10) {
        0..2 => PowerUpKind::Invincibility,
        2..5 => PowerUpKind::SpeedBoost,
        5..8 => PowerUpKind::ExtraJump,
        _ => PowerUpKind::LifeUp,
    };
    state.powerups.push(PowerUp::new(x, y, kind));
}

fn build_ascent(state: &mut GameState) {
    let floor_top = 500.0;
    state.spawn = Vec2::new(VIEW_W / 2.0, floor_top - PLAYER_HALF_H);
    state.goal_x = None;
    state.bounds_x = (0.0, VIEW_W);
    state.best_height_y = state.spawn.y;

    place_ascent_window(state, floor_top);

    state.camera = Vec2::new(0.0, state.spawn.y - VIEW_H * 0.8);
    state.kill_y = state.camera.y + VIEW_H + 80.0;
}

/// Rebuild the rolling window under the spawn. Used on a non-final death:
/// by then recycling has carried every low rung far above the spawn, so
/// the respawned avatar needs fresh terrain beneath it.
pub(crate) fn reset_ascent_window(state: &mut GameState) {
    state.platforms.clear();
    let floor_top = state.spawn.y + PLAYER_HALF_H;
    place_ascent_window(state, floor_top);
}

/// Starting floor plus the rolling rung window climbing out of view.
/// Each rung's x stays within [`RUNG_DRIFT`] of the rung below so every
/// step of the climb is within jump range both vertically and
/// horizontally.
fn place_ascent_window(state: &mut GameState, floor_top: f32) {
    state
        .platforms
        .push(Platform::solid(VIEW_W / 2.0, floor_top + 10.0, 200.0, 10.0));

    let mut top = floor_top - 80.0;
    let mut prev_x = VIEW_W / 2.0;
    for _ in 0..ASCENT_WINDOW {
        let x = next_rung_x(&mut state.rng, prev_x);
        state.platforms.push(Platform::solid(x, top + 8.0, 40.0, 8.0));
        prev_x = x;
        top -= state.rng.random_range(70.0..110.0);
    }
}

/// Draw the next rung's x near the previous one, clamped to the band
fn next_rung_x(rng: &mut rand_pcg::Pcg32, prev_x: f32) -> f32 {
    let lo = (prev_x - RUNG_DRIFT).max(60.0);
    let hi = (prev_x + RUNG_DRIFT).min(VIEW_W - 60.0);
    rng.random_range(lo..hi)
}

/// Vertical-mode recycling: any platform scrolled below the camera window
/// is relocated above the current highest platform with a height-hardened
/// gap and a freshly rolled variant.
pub(crate) fn recycle_platforms(state: &mut GameState) {
    let floor_cut = state.camera.y + VIEW_H + RECYCLE_MARGIN;
    let mut highest_top = f32::MAX;
    let mut highest_x = VIEW_W / 2.0;
    for plat in state.platforms.iter().filter(|p| p.in_play()) {
        if plat.top() < highest_top {
            highest_top = plat.top();
            highest_x = plat.pos.x;
        }
    }
    if highest_top == f32::MAX {
        return;
    }
    let climbed = state.climbed_height();

    for idx in 0..state.platforms.len() {
        let needs_move = {
            let plat = &state.platforms[idx];
            plat.top() > floor_cut
        };
        if !needs_move {
            continue;
        }

        let gap = ascent_gap(&mut state.rng, climbed);
        let half = Vec2::new(40.0, 8.0);
        let x = next_rung_x(&mut state.rng, highest_x);
        let new_top = highest_top - gap;
        let kind = ascent_kind(state, climbed, x);

        let plat = &mut state.platforms[idx];
        plat.half = half;
        plat.pos = Vec2::new(x, new_top + half.y);
        plat.kind = kind;
        highest_top = new_top;
        highest_x = x;

        // Occasionally hang a coin just above the fresh platform
        let p = (ATTACHED_COIN_CHANCE * state.config.powerup_frequency as f64).clamp(0.0, 1.0);
        if state.rng.random_bool(p) {
            attach_coin(state, x, new_top - 28.0);
        }
    }
}

/// Gap range narrows toward its hard end as the climb progresses; the
/// ceiling stays safely under the jump apex (~136 px)
fn ascent_gap(rng: &mut rand_pcg::Pcg32, climbed: f32) -> f32 {
    let lo = 70.0 + (climbed / 400.0).min(25.0);
    let hi = 100.0 + (climbed / 300.0).min(20.0);
    rng.random_range(lo..hi)
}

/// Variant distribution shifts toward harder kinds with height
fn ascent_kind(state: &mut GameState, climbed: f32, x: f32) -> PlatformKind {
    let hardness = (climbed / 2500.0).min(1.0);
    let roll: f32 = state.rng.random_range(0.0..1.0);
    let p_osc = 0.25 * hardness;
    let p_break = 0.15 * hardness;
    let p_crumble = 0.10 * hardness;

    if roll < p_osc {
        let amplitude = state.rng.random_range(40.0..90.0);
        PlatformKind::Oscillating {
            origin_x: x,
            amplitude,
            speed: state.rng.random_range(50.0..110.0),
            dir: if state.rng.random_bool(0.5) { 1.0 } else { -1.0 },
        }
    } else if roll < p_osc + p_break {
        PlatformKind::Breakable { fuse: None }
    } else if roll < p_osc + p_break + p_crumble {
        PlatformKind::Crumbling { uses: 1 }
    } else {
        PlatformKind::Solid
    }
}

/// Reuse a spent coin slot if one exists, otherwise grow the list
fn attach_coin(state: &mut GameState, x: f32, y: f32) {
    if let Some(coin) = state.collectibles.iter_mut().find(|c| c.taken) {
        coin.pos = Vec2::new(x, y);
        coin.taken = false;
    } else {
        state.collectibles.push(Collectible::new(x, y));
    }
}
