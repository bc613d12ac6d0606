//! Ridgerun - a 2D platformer simulation engine
//!
//! Core modules:
//! - `sim`: Deterministic simulation (physics, enemy AI, level generation, game state)
//! - `settings`: User preferences and run configuration
//! - `bestscore`: Single best-score persistence
//!
//! Rendering, input wiring and UI are external collaborators: they feed a
//! [`sim::TickInput`] into [`sim::tick`] once per frame and read the
//! resulting [`sim::GameState`] to draw.

pub mod bestscore;
pub mod settings;
pub mod sim;

pub use settings::Settings;

use glam::Vec2;

/// Game tuning constants
pub mod consts {
    /// Fixed simulation timestep (120 Hz)
    pub const SIM_DT: f32 = 1.0 / 120.0;
    /// Maximum delta-time per tick; longer frame hitches are clamped so a
    /// stalled frame cannot step an entity through terrain
    pub const MAX_DT: f32 = 0.05;

    /// Viewport dimensions (world units = pixels)
    pub const VIEW_W: f32 = 960.0;
    pub const VIEW_H: f32 = 540.0;

    /// Avatar half extents
    pub const PLAYER_HALF_W: f32 = 14.0;
    pub const PLAYER_HALF_H: f32 = 18.0;

    /// Gravity (px/s^2, y grows downward)
    pub const GRAVITY: f32 = 1800.0;
    /// Grounded jump launch speed (upward)
    pub const JUMP_SPEED: f32 = 700.0;
    /// Mid-air extra jump launch speed (upward, weaker than grounded)
    pub const AIR_JUMP_SPEED: f32 = 560.0;
    /// Terminal fall speed; bounds one tick's displacement so a clamped
    /// max-dt step cannot cross a platform's full vertical span
    pub const MAX_FALL_SPEED: f32 = 900.0;
    /// Target run speed
    pub const RUN_SPEED: f32 = 260.0;
    /// Speed-boost effect multiplier on the target run speed
    pub const SPEED_BOOST_MULT: f32 = 1.6;
    /// Exponential approach rate toward the target horizontal speed (1/s)
    pub const ACCEL_RATE: f32 = 10.0;
    /// Downward speed applied on a ceiling bump
    pub const CEILING_BUMP_SPEED: f32 = 60.0;
    /// Tolerance when testing the previous-frame bottom edge against a
    /// platform top for landing classification
    pub const LAND_TOLERANCE: f32 = 4.0;

    /// Seconds a breakable platform survives after the first landing
    pub const BREAKABLE_FUSE: f32 = 0.6;
    /// Parking y for exhausted platforms (kept in storage, out of play)
    pub const PARKED_Y: f32 = 1.0e6;

    /// Minimum downward speed for a contact to count as a stomp
    pub const STOMP_MIN_FALL: f32 = 120.0;
    /// Max distance between avatar bottom and enemy top for a stomp
    pub const STOMP_MARGIN: f32 = 26.0;
    /// Stomp bounce as a fraction of JUMP_SPEED
    pub const STOMP_BOUNCE_FACTOR: f32 = 0.6;

    /// Combo window after a stomp (seconds)
    pub const COMBO_WINDOW: f32 = 2.0;
    /// Base score for a stomp
    pub const STOMP_SCORE: u64 = 100;
    /// Extra score per combo step beyond the first
    pub const COMBO_BONUS: u64 = 50;
    /// Score for a coin
    pub const COIN_SCORE: u64 = 10;
    /// Score for any power-up pickup
    pub const POWERUP_SCORE: u64 = 25;
    /// Flat bonus for crossing the goal flag
    pub const LEVEL_CLEAR_SCORE: u64 = 500;

    /// Status effect durations (seconds); pickup re-arms, never stacks
    pub const INVINCIBILITY_DURATION: f32 = 6.0;
    pub const SPEED_BOOST_DURATION: f32 = 5.0;
    pub const EXTRA_JUMP_DURATION: f32 = 8.0;

    /// Enemy tuning
    pub const CHASE_MULT: f32 = 1.8;
    pub const CHARGE_MULT: f32 = 3.0;
    pub const CHARGE_DURATION: f32 = 0.7;
    pub const LEAP_IMPULSE: f32 = 520.0;
    pub const LEAP_PERIOD_BASE: f32 = 1.4;
    pub const LEAP_PERIOD_JITTER: f32 = 1.2;

    /// Render-only particle cap
    pub const MAX_PARTICLES: usize = 256;

    /// Time an avatar spends airborne after a grounded jump (up and down)
    pub fn jump_air_time() -> f32 {
        2.0 * JUMP_SPEED / GRAVITY
    }

    /// Maximum horizontal distance coverable during one grounded jump.
    /// Generation tables must keep every gap under this reach.
    pub fn max_jump_reach() -> f32 {
        RUN_SPEED * jump_air_time()
    }

    /// Apex height of a grounded jump
    pub fn max_jump_height() -> f32 {
        JUMP_SPEED * JUMP_SPEED / (2.0 * GRAVITY)
    }
}

/// Axis-aligned overlap test between two center/half-extent boxes
#[inline]
pub fn aabb_overlap(pos_a: Vec2, half_a: Vec2, pos_b: Vec2, half_b: Vec2) -> bool {
    (pos_a.x - pos_b.x).abs() < half_a.x + half_b.x
        && (pos_a.y - pos_b.y).abs() < half_a.y + half_b.y
}

/// Exponential-decay approach of `current` toward `target`.
/// Frame-rate independent: two half-steps land where one full step does.
#[inline]
pub fn approach(current: f32, target: f32, rate: f32, dt: f32) -> f32 {
    current + (target - current) * (1.0 - (-rate * dt).exp())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aabb_overlap() {
        let half = Vec2::new(10.0, 10.0);
        assert!(aabb_overlap(
            Vec2::new(0.0, 0.0),
            half,
            Vec2::new(15.0, 0.0),
            half
        ));
        assert!(!aabb_overlap(
            Vec2::new(0.0, 0.0),
            half,
            Vec2::new(25.0, 0.0),
            half
        ));
        // Touching edges do not overlap
        assert!(!aabb_overlap(
            Vec2::new(0.0, 0.0),
            half,
            Vec2::new(20.0, 0.0),
            half
        ));
    }

    #[test]
    fn test_approach_converges() {
        let mut v = 0.0;
        for _ in 0..200 {
            v = approach(v, 100.0, consts::ACCEL_RATE, consts::SIM_DT);
        }
        assert!((v - 100.0).abs() < 1.0);
    }

    #[test]
    fn test_approach_framerate_independent() {
        // One big step vs two half steps reach the same point
        let one = approach(0.0, 100.0, 4.0, 0.02);
        let half = approach(0.0, 100.0, 4.0, 0.01);
        let two = approach(half, 100.0, 4.0, 0.01);
        assert!((one - two).abs() < 0.001);
    }

    #[test]
    fn test_jump_reach_is_positive_and_bounded() {
        let reach = consts::max_jump_reach();
        assert!(reach > 100.0 && reach < 400.0, "reach = {reach}");
        let height = consts::max_jump_height();
        assert!(height > 60.0 && height < 250.0, "height = {height}");
    }
}
