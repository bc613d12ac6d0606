//! Enemy behavior state machines
//!
//! One closed set of behavior profiles, each a tagged variant carrying its
//! own transient fields (see [`Brain`]). Every profile shares the same
//! gravity and landing resolution as the avatar; only the horizontal
//! steering differs.

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;

use super::physics::{resolve_vertical, supporting_platform};
use super::state::{AmbushPhase, Brain, Enemy, Platform};
use crate::consts::*;

/// Detection radius for the ambusher's trigger
const AMBUSH_RADIUS: f32 = 220.0;
/// Dormant pause after a charge, randomized in this range
const AMBUSH_PAUSE_RANGE: std::ops::Range<f32> = 0.8..2.0;
/// Horizontal drift factor while a leaper is airborne
const LEAP_DRIFT: f32 = 0.8;
/// Lookahead past the feet when testing for a platform edge
const EDGE_LOOKAHEAD: f32 = 4.0;

/// Advance every living enemy by one tick
pub(crate) fn update_enemies(
    enemies: &mut [Enemy],
    platforms: &[Platform],
    player_pos: Vec2,
    bounds_x: (f32, f32),
    kill_y: f32,
    difficulty_scale: f32,
    rng: &mut Pcg32,
    dt: f32,
) {
    for enemy in enemies.iter_mut() {
        if !enemy.alive {
            continue;
        }

        steer(enemy, player_pos, difficulty_scale, rng, dt);

        enemy.vel.y = (enemy.vel.y + GRAVITY * dt).min(MAX_FALL_SPEED);
        enemy.pos += enemy.vel * dt;
        let grounded = resolve_vertical(
            &mut enemy.pos,
            &mut enemy.vel,
            enemy.half,
            platforms,
            dt,
        );

        if grounded && matches!(enemy.brain, Brain::Patrol) {
            turn_at_platform_edge(enemy, platforms);
        }

        // World bound reversal
        if enemy.pos.x - enemy.half.x < bounds_x.0 {
            enemy.pos.x = bounds_x.0 + enemy.half.x;
            enemy.facing = 1.0;
        } else if enemy.pos.x + enemy.half.x > bounds_x.1 {
            enemy.pos.x = bounds_x.1 - enemy.half.x;
            enemy.facing = -1.0;
        }

        if enemy.top() > kill_y {
            enemy.alive = false;
        }
    }
}

/// Apply the behavior profile to the horizontal velocity (and, for the
/// leaper, the vertical impulse)
fn steer(enemy: &mut Enemy, player_pos: Vec2, difficulty_scale: f32, rng: &mut Pcg32, dt: f32) {
    let speed = enemy.base_speed * difficulty_scale;
    let to_player = player_pos - enemy.pos;

    match &mut enemy.brain {
        Brain::Patrol => {
            enemy.vel.x = enemy.facing * speed;
        }
        Brain::Chaser { detect_radius } => {
            if to_player.length_squared() < *detect_radius * *detect_radius {
                if to_player.x != 0.0 {
                    enemy.facing = to_player.x.signum();
                }
                enemy.vel.x = enemy.facing * speed * CHASE_MULT;
            } else {
                enemy.vel.x = enemy.facing * speed;
            }
        }
        Brain::Leaper {
            jump_timer,
            detect_radius,
        } => {
            if enemy.vel.y == 0.0 {
                // At rest: sit still until the timer fires
                enemy.vel.x = 0.0;
                *jump_timer -= dt;
                if *jump_timer <= 0.0 {
                    if to_player.length_squared() < *detect_radius * *detect_radius
                        && to_player.x != 0.0
                    {
                        enemy.facing = to_player.x.signum();
                    }
                    enemy.vel.y = -LEAP_IMPULSE;
                    *jump_timer = LEAP_PERIOD_BASE + rng.random_range(0.0..LEAP_PERIOD_JITTER);
                }
            } else {
                // Airborne drift keeps steering toward a nearby avatar
                if to_player.length_squared() < *detect_radius * *detect_radius
                    && to_player.x != 0.0
                {
                    enemy.facing = to_player.x.signum();
                }
                enemy.vel.x = enemy.facing * speed * LEAP_DRIFT;
            }
        }
        Brain::Ambusher { phase } => match phase {
            AmbushPhase::Dormant { pause_left } => {
                enemy.vel.x = 0.0;
                *pause_left = (*pause_left - dt).max(0.0);
                if *pause_left == 0.0
                    && to_player.length_squared() < AMBUSH_RADIUS * AMBUSH_RADIUS
                {
                    if to_player.x != 0.0 {
                        enemy.facing = to_player.x.signum();
                    }
                    *phase = AmbushPhase::Charging {
                        charge_left: CHARGE_DURATION,
                    };
                }
            }
            AmbushPhase::Charging { charge_left } => {
                enemy.vel.x = enemy.facing * speed * CHARGE_MULT;
                *charge_left -= dt;
                if *charge_left <= 0.0 {
                    *phase = AmbushPhase::Dormant {
                        pause_left: rng.random_range(AMBUSH_PAUSE_RANGE),
                    };
                }
            }
        },
    }
}

/// Reverse facing when the next patrol step would walk past the
/// supporting platform's edge
fn turn_at_platform_edge(enemy: &mut Enemy, platforms: &[Platform]) {
    let Some(idx) = supporting_platform(enemy.pos, enemy.half, platforms) else {
        return;
    };
    let plat = &platforms[idx];
    let ahead = enemy.pos.x + enemy.facing * (enemy.half.x + EDGE_LOOKAHEAD);
    if ahead > plat.right() || ahead < plat.left() {
        enemy.facing = -enemy.facing;
        enemy.vel.x = -enemy.vel.x;
    }
}
