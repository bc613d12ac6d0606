//! Avatar integration and terrain collision resolution
//!
//! Resolution order per platform candidate is deliberate: a top landing is
//! classified first (previous-frame bottom edge at or above the platform
//! top), then a ceiling bump, then a horizontal side clamp. Checking the
//! vertical-from-above case first keeps corner clips from stealing a
//! legitimate landing.

use glam::Vec2;

use super::state::{Platform, PlatformKind, Player, StatusEffects};
use crate::consts::*;
use crate::{aabb_overlap, approach};

/// Apply input intent and gravity, then move the avatar
pub(crate) fn integrate_player(
    p: &mut Player,
    move_dir: f32,
    jump_pressed: bool,
    effects: &StatusEffects,
    dt: f32,
) {
    let top_speed = if effects.speed_boosted() {
        RUN_SPEED * SPEED_BOOST_MULT
    } else {
        RUN_SPEED
    };
    p.vel.x = approach(p.vel.x, move_dir * top_speed, ACCEL_RATE, dt);
    if move_dir != 0.0 {
        p.facing = move_dir.signum();
    }

    if jump_pressed {
        if p.on_ground {
            p.vel.y = -JUMP_SPEED;
            p.on_ground = false;
        } else if effects.extra_jump() && p.air_jumps_left > 0 {
            p.vel.y = -AIR_JUMP_SPEED;
            p.air_jumps_left -= 1;
        }
    }

    p.vel.y = (p.vel.y + GRAVITY * dt).min(MAX_FALL_SPEED);
    p.pos += p.vel * dt;
}

/// Resolve avatar interpenetration against every in-play platform
pub(crate) fn resolve_player_terrain(p: &mut Player, platforms: &mut [Platform], dt: f32) {
    let was_airborne = !p.on_ground;
    p.on_ground = false;

    for plat in platforms.iter_mut() {
        if !plat.in_play() {
            continue;
        }
        if !aabb_overlap(p.pos, p.half, plat.pos, plat.half) {
            continue;
        }

        let prev_bottom = p.bottom() - p.vel.y * dt;
        let prev_top = p.top() - p.vel.y * dt;

        if p.vel.y >= 0.0 && prev_bottom <= plat.top() + LAND_TOLERANCE {
            // Top landing
            p.pos.y = plat.top() - p.half.y;
            p.vel.y = 0.0;
            p.on_ground = true;
            p.air_jumps_left = 1;
            if was_airborne {
                register_landing(plat);
            }
        } else if prev_top >= plat.bottom() - LAND_TOLERANCE {
            // Ceiling bump
            p.pos.y = plat.bottom() + p.half.y;
            p.vel.y = CEILING_BUMP_SPEED;
        } else {
            // Side collision: clamp to the near edge
            if p.pos.x < plat.pos.x {
                p.pos.x = plat.left() - p.half.x;
            } else {
                p.pos.x = plat.right() + p.half.x;
            }
            p.vel.x = 0.0;
        }
    }
}

/// A fresh landing from the air arms breakables and spends crumbling uses
fn register_landing(plat: &mut Platform) {
    match &mut plat.kind {
        PlatformKind::Breakable { fuse } => {
            if fuse.is_none() {
                *fuse = Some(BREAKABLE_FUSE);
            }
        }
        PlatformKind::Crumbling { uses } => {
            *uses = uses.saturating_sub(1);
            if *uses == 0 {
                plat.pos.y = PARKED_Y;
            }
        }
        _ => {}
    }
}

/// Advance platform variants: oscillating sweep, breakable fuses
pub(crate) fn update_platforms(platforms: &mut [Platform], dt: f32) {
    for plat in platforms.iter_mut() {
        if !plat.in_play() {
            continue;
        }
        let Platform { pos, kind, .. } = plat;
        match kind {
            PlatformKind::Oscillating {
                origin_x,
                amplitude,
                speed,
                dir,
            } => {
                pos.x += *dir * *speed * dt;
                if pos.x >= *origin_x + *amplitude {
                    pos.x = *origin_x + *amplitude;
                    *dir = -1.0;
                } else if pos.x <= *origin_x - *amplitude {
                    pos.x = *origin_x - *amplitude;
                    *dir = 1.0;
                }
            }
            PlatformKind::Breakable { fuse: Some(left) } => {
                *left -= dt;
                if *left <= 0.0 {
                    pos.y = PARKED_Y;
                }
            }
            _ => {}
        }
    }
}

/// Enemy-grade vertical resolution: landings only, same previous-bottom
/// rule as the avatar. Returns whether the body ended up grounded.
pub(crate) fn resolve_vertical(
    pos: &mut Vec2,
    vel: &mut Vec2,
    half: Vec2,
    platforms: &[Platform],
    dt: f32,
) -> bool {
    let mut grounded = false;
    for plat in platforms {
        if !plat.in_play() {
            continue;
        }
        if !aabb_overlap(*pos, half, plat.pos, plat.half) {
            continue;
        }
        let prev_bottom = (pos.y + half.y) - vel.y * dt;
        if vel.y >= 0.0 && prev_bottom <= plat.top() + LAND_TOLERANCE {
            pos.y = plat.top() - half.y;
            vel.y = 0.0;
            grounded = true;
        }
    }
    grounded
}

/// Index of the platform a grounded body is standing on, if any
pub(crate) fn supporting_platform(pos: Vec2, half: Vec2, platforms: &[Platform]) -> Option<usize> {
    let bottom = pos.y + half.y;
    platforms.iter().position(|plat| {
        plat.in_play()
            && (bottom - plat.top()).abs() <= LAND_TOLERANCE
            && pos.x + half.x > plat.left()
            && pos.x - half.x < plat.right()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn floor() -> Platform {
        // Top edge at y = 400
        Platform::solid(480.0, 410.0, 480.0, 10.0)
    }

    fn falling_player(x: f32, y: f32, vy: f32) -> Player {
        let mut p = Player::new(Vec2::new(x, y));
        p.vel.y = vy;
        p
    }

    #[test]
    fn test_landing_clamps_exactly_to_top() {
        let mut platforms = vec![floor()];
        let mut p = falling_player(100.0, 300.0, 0.0);
        for _ in 0..200 {
            integrate_player(&mut p, 0.0, false, &StatusEffects::default(), SIM_DT);
            resolve_player_terrain(&mut p, &mut platforms, SIM_DT);
            if p.on_ground {
                break;
            }
        }
        assert!(p.on_ground);
        assert_eq!(p.vel.y, 0.0);
        assert_eq!(p.bottom(), platforms[0].top());
    }

    #[test]
    fn test_landing_refills_air_jump() {
        let mut platforms = vec![floor()];
        let mut p = falling_player(100.0, 300.0, 200.0);
        p.air_jumps_left = 0;
        for _ in 0..200 {
            integrate_player(&mut p, 0.0, false, &StatusEffects::default(), SIM_DT);
            resolve_player_terrain(&mut p, &mut platforms, SIM_DT);
            if p.on_ground {
                break;
            }
        }
        assert_eq!(p.air_jumps_left, 1);
    }

    #[test]
    fn test_ceiling_bump_pushes_down() {
        // Slab overhead, player moving up into it
        let mut platforms = vec![Platform::solid(100.0, 100.0, 60.0, 10.0)];
        let mut p = falling_player(100.0, 160.0, -400.0);
        for _ in 0..20 {
            integrate_player(&mut p, 0.0, false, &StatusEffects::default(), SIM_DT);
            resolve_player_terrain(&mut p, &mut platforms, SIM_DT);
            if p.vel.y == CEILING_BUMP_SPEED {
                break;
            }
        }
        assert_eq!(p.vel.y, CEILING_BUMP_SPEED);
        assert_eq!(p.top(), platforms[0].bottom());
    }

    #[test]
    fn test_side_collision_zeroes_vx() {
        // Wall to the right at the player's height
        let mut platforms = vec![floor(), Platform::solid(300.0, 360.0, 20.0, 50.0)];
        let mut p = Player::new(Vec2::new(200.0, 400.0 - PLAYER_HALF_H));
        p.on_ground = true;
        for _ in 0..120 {
            integrate_player(&mut p, 1.0, false, &StatusEffects::default(), SIM_DT);
            resolve_player_terrain(&mut p, &mut platforms, SIM_DT);
        }
        assert!(p.pos.x + p.half.x <= 280.0 + 0.01, "x = {}", p.pos.x);
        assert_eq!(p.vel.x, 0.0);
    }

    #[test]
    fn test_corner_tiebreak_prefers_landing() {
        // Falling fast onto the corner of a ledge: the from-above rule
        // must classify it as a landing, not a side clamp
        let mut platforms = vec![Platform::solid(300.0, 410.0, 50.0, 10.0)];
        let mut p = falling_player(260.0, 360.0, 500.0);
        integrate_player(&mut p, 1.0, false, &StatusEffects::default(), MAX_DT);
        resolve_player_terrain(&mut p, &mut platforms, MAX_DT);
        if aabb_overlap(p.pos, p.half, platforms[0].pos, platforms[0].half) || p.on_ground {
            assert!(p.on_ground);
            assert_eq!(p.bottom(), platforms[0].top());
        }
    }

    #[test]
    fn test_speed_boost_raises_top_speed() {
        let mut plain = Player::new(Vec2::ZERO);
        let mut boosted = Player::new(Vec2::ZERO);
        let boost = StatusEffects {
            speed_boost_left: 10.0,
            ..Default::default()
        };
        for _ in 0..600 {
            integrate_player(&mut plain, 1.0, false, &StatusEffects::default(), SIM_DT);
            integrate_player(&mut boosted, 1.0, false, &boost, SIM_DT);
        }
        assert!((plain.vel.x - RUN_SPEED).abs() < 2.0);
        assert!((boosted.vel.x - RUN_SPEED * SPEED_BOOST_MULT).abs() < 2.0);
    }

    #[test]
    fn test_air_jump_requires_effect_and_count() {
        let mut p = Player::new(Vec2::ZERO);
        p.air_jumps_left = 1;
        p.vel.y = 100.0;
        // No effect: the press does nothing mid-air
        integrate_player(&mut p, 0.0, true, &StatusEffects::default(), SIM_DT);
        assert_eq!(p.air_jumps_left, 1);
        assert!(p.vel.y > 0.0);
        // With the effect armed, the press consumes the jump
        let fx = StatusEffects {
            extra_jump_left: 5.0,
            ..Default::default()
        };
        integrate_player(&mut p, 0.0, true, &fx, SIM_DT);
        assert_eq!(p.air_jumps_left, 0);
        assert!(p.vel.y < 0.0);
    }

    #[test]
    fn test_breakable_fuse_arms_then_parks() {
        let mut platforms = vec![Platform {
            pos: Vec2::new(100.0, 410.0),
            half: Vec2::new(60.0, 10.0),
            kind: PlatformKind::Breakable { fuse: None },
        }];
        let mut p = falling_player(100.0, 300.0, 0.0);
        for _ in 0..200 {
            integrate_player(&mut p, 0.0, false, &StatusEffects::default(), SIM_DT);
            resolve_player_terrain(&mut p, &mut platforms, SIM_DT);
            if p.on_ground {
                break;
            }
        }
        assert!(matches!(
            platforms[0].kind,
            PlatformKind::Breakable { fuse: Some(_) }
        ));
        // Fuse elapses, platform parks out of play but stays in storage
        for _ in 0..((BREAKABLE_FUSE / SIM_DT) as usize + 2) {
            update_platforms(&mut platforms, SIM_DT);
        }
        assert_eq!(platforms.len(), 1);
        assert!(!platforms[0].in_play());
    }

    #[test]
    fn test_crumbling_spends_one_use_per_landing() {
        let mut platforms = vec![Platform {
            pos: Vec2::new(100.0, 410.0),
            half: Vec2::new(60.0, 10.0),
            kind: PlatformKind::Crumbling { uses: 2 },
        }];
        let mut p = falling_player(100.0, 300.0, 0.0);
        // Land and rest for many ticks: only the first contact spends a use
        for _ in 0..100 {
            integrate_player(&mut p, 0.0, false, &StatusEffects::default(), SIM_DT);
            resolve_player_terrain(&mut p, &mut platforms, SIM_DT);
        }
        assert!(matches!(
            platforms[0].kind,
            PlatformKind::Crumbling { uses: 1 }
        ));
    }

    #[test]
    fn test_oscillating_reverses_at_travel_ends() {
        let mut platforms = vec![Platform {
            pos: Vec2::new(200.0, 300.0),
            half: Vec2::new(40.0, 8.0),
            kind: PlatformKind::Oscillating {
                origin_x: 200.0,
                amplitude: 60.0,
                speed: 80.0,
                dir: 1.0,
            },
        }];
        let mut max_x: f32 = 0.0;
        let mut min_x: f32 = f32::MAX;
        for _ in 0..2000 {
            update_platforms(&mut platforms, SIM_DT);
            max_x = max_x.max(platforms[0].pos.x);
            min_x = min_x.min(platforms[0].pos.x);
        }
        assert!(max_x <= 260.0 + 0.01);
        assert!(min_x >= 140.0 - 0.01);
        // It actually reached both ends
        assert!(max_x > 255.0 && min_x < 145.0);
    }

    proptest! {
        // At the clamped maximum dt and any in-bounds fall speed, a tick
        // never carries the avatar fully through a platform it started
        // wholly above.
        #[test]
        fn prop_no_tunneling_at_max_dt(vy in 0.0f32..MAX_FALL_SPEED, start_gap in 1.0f32..80.0) {
            let mut platforms = vec![Platform::solid(100.0, 410.0, 80.0, 10.0)];
            let top = platforms[0].top();
            let mut p = Player::new(Vec2::new(100.0, top - start_gap - PLAYER_HALF_H));
            p.vel.y = vy;
            integrate_player(&mut p, 0.0, false, &StatusEffects::default(), MAX_DT);
            resolve_player_terrain(&mut p, &mut platforms, MAX_DT);
            prop_assert!(
                p.bottom() <= platforms[0].bottom() + 0.01,
                "avatar passed through: bottom={} platform bottom={}",
                p.bottom(),
                platforms[0].bottom()
            );
        }

        // Landing invariant: any falling tick that ends overlapped from
        // above finishes grounded with vy == 0 on the platform top.
        #[test]
        fn prop_landing_invariant(vy in 50.0f32..MAX_FALL_SPEED, x in 40.0f32..160.0) {
            let mut platforms = vec![Platform::solid(100.0, 410.0, 80.0, 10.0)];
            let top = platforms[0].top();
            let mut p = Player::new(Vec2::new(x, top - 30.0 - PLAYER_HALF_H));
            p.vel.y = vy;
            integrate_player(&mut p, 0.0, false, &StatusEffects::default(), MAX_DT);
            resolve_player_terrain(&mut p, &mut platforms, MAX_DT);
            if p.on_ground {
                prop_assert_eq!(p.vel.y, 0.0);
                prop_assert_eq!(p.bottom(), top);
            }
        }
    }
}
