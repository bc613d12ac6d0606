//! Fixed-step frame advance
//!
//! [`tick`] is the only mutation entry point during play. The per-frame
//! order is fixed: input, avatar integration, platform motion, terrain
//! resolution, enemies, contacts, pickups, timers, camera, mode upkeep.
//! Reordering these stages changes observable outcomes (a stomp is judged
//! against the avatar's post-resolution velocity, for example), so the
//! sequence below is part of the engine's contract.

use glam::Vec2;

use super::enemy::update_enemies;
use super::level::{recycle_platforms, reset_ascent_window};
use super::physics::{integrate_player, resolve_player_terrain, update_platforms};
use super::state::{GamePhase, GameState, PlatformKind, PowerUpKind};
use crate::consts::*;
use crate::{aabb_overlap, approach};

/// Camera anchor: fraction of the view kept ahead of the avatar
const CAMERA_LEAD: f32 = 0.4;
/// Vertical camera anchor in the climbing mode
const CAMERA_ANCHOR_Y: f32 = 0.8;
/// Camera smoothing rate (1/s)
const CAMERA_RATE: f32 = 6.0;
/// Extra margin below the view before a fall is lethal (vertical mode)
const KILL_MARGIN: f32 = 80.0;
/// Seconds under which finishing a level still pays a time bonus
const TIME_BONUS_WINDOW: f32 = 180.0;

const BURST_STOMP: u32 = 0xffd24d;
const BURST_COIN: u32 = 0xf5c542;
const BURST_PICKUP: u32 = 0x6ee7ff;
const BURST_HURT: u32 = 0xff5050;
const BURST_BREAK: u32 = 0x9a8f7a;

/// Player intent for one frame, sampled by the embedder
#[derive(Debug, Clone, Copy, Default)]
pub struct TickInput {
    pub left: bool,
    pub right: bool,
    /// Raw held state; the engine edge-detects the actual jump
    pub jump_held: bool,
}

impl TickInput {
    fn move_dir(&self) -> f32 {
        match (self.left, self.right) {
            (true, false) => -1.0,
            (false, true) => 1.0,
            _ => 0.0,
        }
    }
}

/// Advance the simulation by `dt` seconds (clamped to [`MAX_DT`])
pub fn tick(state: &mut GameState, input: TickInput, dt: f32) {
    let dt = dt.clamp(0.0, MAX_DT);
    if state.phase != GamePhase::Playing || dt == 0.0 {
        state.jump_was_held = input.jump_held;
        return;
    }

    let jump_pressed = input.jump_held && !state.jump_was_held;
    state.jump_was_held = input.jump_held;

    integrate_player(
        &mut state.player,
        input.move_dir(),
        jump_pressed,
        &state.effects,
        dt,
    );
    // Fragile platforms in play before resolution, to burst on break
    let fragile: Vec<(usize, Vec2)> = state
        .platforms
        .iter()
        .enumerate()
        .filter(|(_, p)| {
            p.in_play()
                && matches!(
                    p.kind,
                    PlatformKind::Breakable { .. } | PlatformKind::Crumbling { .. }
                )
        })
        .map(|(i, p)| (i, p.pos))
        .collect();

    update_platforms(&mut state.platforms, dt);
    resolve_player_terrain(&mut state.player, &mut state.platforms, dt);
    clamp_to_bounds(state);

    for (idx, pos) in fragile {
        if !state.platforms[idx].in_play() {
            state.spawn_burst(pos, BURST_BREAK, 10);
        }
    }

    state.combo_clock += dt;
    if state.combo_clock > COMBO_WINDOW {
        state.combo = 0;
    }

    let player_pos = state.player.pos;
    update_enemies(
        &mut state.enemies,
        &state.platforms,
        player_pos,
        state.bounds_x,
        state.kill_y,
        state.config.difficulty_scale,
        &mut state.rng,
        dt,
    );

    let took_damage = resolve_enemy_contacts(state);
    collect_coins(state);
    collect_powerups(state);

    state.effects.advance(dt);
    state.time += dt;

    update_camera(state, dt);

    if state.mode.is_vertical() {
        state.kill_y = state.camera.y + VIEW_H + KILL_MARGIN;
        recycle_platforms(state);
        award_height_score(state);
    }

    let fell = state.player.top() > state.kill_y;
    if took_damage || fell {
        apply_damage(state, fell);
    }

    check_goal(state);
    update_particles(state, dt);
}

fn clamp_to_bounds(state: &mut GameState) {
    let p = &mut state.player;
    if p.pos.x - p.half.x < state.bounds_x.0 {
        p.pos.x = state.bounds_x.0 + p.half.x;
        p.vel.x = p.vel.x.max(0.0);
    } else if p.pos.x + p.half.x > state.bounds_x.1 {
        p.pos.x = state.bounds_x.1 - p.half.x;
        p.vel.x = p.vel.x.min(0.0);
    }
}

/// Stomps, invincibility kills and damaging touches. Returns whether the
/// avatar was hurt this frame.
fn resolve_enemy_contacts(state: &mut GameState) -> bool {
    let mut defeats: Vec<Vec2> = Vec::new();
    let mut hurt = false;

    for enemy in state.enemies.iter_mut() {
        if !enemy.alive {
            continue;
        }
        if !aabb_overlap(
            state.player.pos,
            state.player.half,
            enemy.pos,
            enemy.half,
        ) {
            continue;
        }

        if state.effects.invincible() {
            // Invincibility beats everything, spikes included
            enemy.alive = false;
            defeats.push(enemy.pos);
            continue;
        }

        let descending = state.player.vel.y > STOMP_MIN_FALL;
        let from_above = state.player.bottom() - enemy.top() < STOMP_MARGIN;
        if descending && from_above && !enemy.stomp_immune() {
            enemy.alive = false;
            defeats.push(enemy.pos);
            state.player.vel.y = -JUMP_SPEED * STOMP_BOUNCE_FACTOR;
        } else {
            hurt = true;
            break;
        }
    }

    for pos in defeats {
        state.combo += 1;
        state.combo_clock = 0.0;
        let bonus = COMBO_BONUS * (state.combo.saturating_sub(1)) as u64;
        state.score += STOMP_SCORE + bonus;
        state.spawn_burst(pos, BURST_STOMP, 12);
    }

    hurt
}

fn collect_coins(state: &mut GameState) {
    let mut bursts: Vec<Vec2> = Vec::new();
    for coin in state.collectibles.iter_mut() {
        if coin.taken {
            continue;
        }
        let reach = coin.radius + state.player.half.x;
        if (coin.pos - state.player.pos).length_squared() < reach * reach {
            coin.taken = true;
            state.score += COIN_SCORE;
            bursts.push(coin.pos);
        }
    }
    for pos in bursts {
        state.spawn_burst(pos, BURST_COIN, 6);
    }
}

fn collect_powerups(state: &mut GameState) {
    let mut bursts: Vec<Vec2> = Vec::new();
    for item in state.powerups.iter_mut() {
        if item.taken {
            continue;
        }
        let reach = item.radius + state.player.half.x;
        if (item.pos - state.player.pos).length_squared() >= reach * reach {
            continue;
        }
        item.taken = true;
        state.score += POWERUP_SCORE;
        bursts.push(item.pos);
        match item.kind {
            PowerUpKind::Invincibility => {
                state.effects.invincible_left = INVINCIBILITY_DURATION;
            }
            PowerUpKind::SpeedBoost => {
                state.effects.speed_boost_left = SPEED_BOOST_DURATION;
            }
            PowerUpKind::ExtraJump => {
                state.effects.extra_jump_left = EXTRA_JUMP_DURATION;
                // Usable immediately even when picked up mid-air
                state.player.air_jumps_left = state.player.air_jumps_left.max(1);
            }
            PowerUpKind::LifeUp => {
                state.lives += 1;
            }
        }
    }
    for pos in bursts {
        state.spawn_burst(pos, BURST_PICKUP, 10);
    }
}

/// One unified damage path for enemy touches and lethal falls
fn apply_damage(state: &mut GameState, fatal_fall: bool) {
    state.combo = 0;
    state.combo_clock = 0.0;
    state.effects.clear();
    let pos = state.player.pos;
    state.spawn_burst(pos, BURST_HURT, 16);

    if state.lives <= 1 {
        state.lives = 0;
        state.phase = GamePhase::RunOver;
        log::info!(
            "Run over at level {} with score {} (fall: {fatal_fall})",
            state.level_index,
            state.score
        );
        return;
    }

    state.lives -= 1;
    let spawn = state.spawn;
    state.player.respawn(spawn);
    if state.mode.is_vertical() {
        // Respawning below the scroll would be instantly lethal again, and
        // recycling has long since carried the low rungs out from under
        // the spawn; reset the scroll and rebuild the window
        state.camera.y = spawn.y - VIEW_H * CAMERA_ANCHOR_Y;
        state.kill_y = state.camera.y + VIEW_H + KILL_MARGIN;
        state.best_height_y = spawn.y;
        reset_ascent_window(state);
    }
    log::debug!("Damage taken, {} lives left", state.lives);
}

fn update_camera(state: &mut GameState, dt: f32) {
    if state.mode.is_vertical() {
        // Scroll only upward, smoothly chasing the avatar
        let target = state.player.pos.y - VIEW_H * CAMERA_ANCHOR_Y;
        if target < state.camera.y {
            state.camera.y = approach(state.camera.y, target, CAMERA_RATE, dt);
        }
    } else {
        // Forward-trailing: the camera never backs up
        let target = state.player.pos.x - VIEW_W * CAMERA_LEAD;
        if target > state.camera.x {
            state.camera.x = approach(state.camera.x, target, CAMERA_RATE, dt).max(state.camera.x);
        }
        state.camera.x = state
            .camera
            .x
            .clamp(state.bounds_x.0, (state.bounds_x.1 - VIEW_W).max(state.bounds_x.0));
    }
}

/// One point per 10 px of new best height
fn award_height_score(state: &mut GameState) {
    let units = ((state.best_height_y - state.player.pos.y) / 10.0).floor();
    if units >= 1.0 {
        state.score += units as u64;
        state.best_height_y -= units * 10.0;
    }
}

fn check_goal(state: &mut GameState) {
    if state.phase != GamePhase::Playing {
        return;
    }
    let Some(goal) = state.goal_x else {
        return;
    };
    if state.player.pos.x >= goal {
        let time_bonus = (TIME_BONUS_WINDOW - state.time).max(0.0) as u64;
        state.score += LEVEL_CLEAR_SCORE + time_bonus;
        state.phase = GamePhase::LevelWon;
        log::info!(
            "Level {} cleared in {:.1}s, score {}",
            state.level_index,
            state.time,
            state.score
        );
    }
}

fn update_particles(state: &mut GameState, dt: f32) {
    for p in state.particles.iter_mut() {
        p.vel.y += GRAVITY * 0.5 * dt;
        p.pos += p.vel * dt;
        p.life -= dt;
    }
    state.particles.retain(|p| p.life > 0.0);
}
