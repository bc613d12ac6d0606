//! Game state and core simulation types
//!
//! Everything the renderer reads and the tick mutates lives here. The state
//! is fully serializable (render-only particles excepted) and owns its RNG,
//! so a fixed seed plus a fixed input sequence reproduces a run exactly.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Current phase of gameplay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Waiting on the menu, no simulation
    Menu,
    /// Active gameplay
    Playing,
    /// Goal flag crossed; caller may advance to the next level
    LevelWon,
    /// Run ended, score frozen
    RunOver,
}

/// The three game variants sharing this engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameMode {
    /// Vertical jumper: infinite upward scroll, recycled platforms
    Ascent,
    /// Horizontal platformer, open terrain, softer enemy mix
    Meadow,
    /// Horizontal platformer, tunnels and a harder enemy mix
    Caverns,
}

impl GameMode {
    pub fn is_vertical(&self) -> bool {
        matches!(self, GameMode::Ascent)
    }
}

/// The controllable avatar
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub pos: Vec2,
    pub vel: Vec2,
    pub half: Vec2,
    pub on_ground: bool,
    /// Mid-air jumps left since last ground contact (granted by the
    /// extra-jump effect)
    pub air_jumps_left: u8,
    /// -1 left, +1 right; last nonzero movement direction
    pub facing: f32,
}

impl Player {
    pub fn new(spawn: Vec2) -> Self {
        Self {
            pos: spawn,
            vel: Vec2::ZERO,
            half: Vec2::new(PLAYER_HALF_W, PLAYER_HALF_H),
            on_ground: false,
            air_jumps_left: 0,
            facing: 1.0,
        }
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.pos.y + self.half.y
    }

    #[inline]
    pub fn top(&self) -> f32 {
        self.pos.y - self.half.y
    }

    /// Reset to a spawn point with zero velocity
    pub fn respawn(&mut self, spawn: Vec2) {
        self.pos = spawn;
        self.vel = Vec2::ZERO;
        self.on_ground = false;
        self.air_jumps_left = 0;
    }
}

/// Platform variants
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PlatformKind {
    Solid,
    /// Sweeps horizontally around `origin_x`, reversing at the travel ends
    Oscillating {
        origin_x: f32,
        amplitude: f32,
        speed: f32,
        dir: f32,
    },
    /// Starts a destruction countdown on the first landing from above;
    /// `fuse` is `None` until touched
    Breakable { fuse: Option<f32> },
    /// Survives a fixed number of distinct landings
    Crumbling { uses: u8 },
}

/// A terrain segment (axis-aligned rectangle, center + half extents)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Platform {
    pub pos: Vec2,
    pub half: Vec2,
    pub kind: PlatformKind,
}

impl Platform {
    pub fn solid(x: f32, y: f32, half_w: f32, half_h: f32) -> Self {
        Self {
            pos: Vec2::new(x, y),
            half: Vec2::new(half_w, half_h),
            kind: PlatformKind::Solid,
        }
    }

    #[inline]
    pub fn top(&self) -> f32 {
        self.pos.y - self.half.y
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.pos.y + self.half.y
    }

    #[inline]
    pub fn left(&self) -> f32 {
        self.pos.x - self.half.x
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.pos.x + self.half.x
    }

    /// Exhausted platforms are parked far out of play instead of removed,
    /// keeping storage indices stable
    #[inline]
    pub fn in_play(&self) -> bool {
        self.pos.y < PARKED_Y
    }
}

/// Ambusher phase: dormant until the avatar comes close and the pause
/// elapses, then a short high-speed charge
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum AmbushPhase {
    Dormant { pause_left: f32 },
    Charging { charge_left: f32 },
}

/// Behavior profile, one tagged variant per enemy kind with its
/// profile-specific payload
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Brain {
    /// Constant-speed walk, reversing at platform edges and world bounds
    Patrol,
    /// Speeds up and steers toward the avatar inside the detection radius
    Chaser { detect_radius: f32 },
    /// Hops on a jittered timer while grounded, drifts while airborne
    Leaper {
        jump_timer: f32,
        detect_radius: f32,
    },
    /// Spiked two-phase ambusher; immune to stomps
    Ambusher { phase: AmbushPhase },
}

/// A hostile entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Enemy {
    pub pos: Vec2,
    pub vel: Vec2,
    pub half: Vec2,
    /// -1 or +1
    pub facing: f32,
    /// Dead enemies stay in storage but are skipped by AI and collisions
    pub alive: bool,
    pub base_speed: f32,
    pub brain: Brain,
}

impl Enemy {
    pub fn new(pos: Vec2, base_speed: f32, brain: Brain) -> Self {
        Self {
            pos,
            vel: Vec2::ZERO,
            half: Vec2::new(15.0, 14.0),
            facing: 1.0,
            alive: true,
            base_speed,
            brain,
        }
    }

    #[inline]
    pub fn top(&self) -> f32 {
        self.pos.y - self.half.y
    }

    /// Ambushers carry spikes; a descending stomp does not defeat them
    pub fn stomp_immune(&self) -> bool {
        matches!(self.brain, Brain::Ambusher { .. })
    }
}

/// A coin
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Collectible {
    pub pos: Vec2,
    pub radius: f32,
    /// Irreversible once set
    pub taken: bool,
}

impl Collectible {
    pub fn new(x: f32, y: f32) -> Self {
        Self {
            pos: Vec2::new(x, y),
            radius: 10.0,
            taken: false,
        }
    }
}

/// Power-up kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PowerUpKind {
    Invincibility,
    SpeedBoost,
    ExtraJump,
    LifeUp,
}

/// A power-up item
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PowerUp {
    pub pos: Vec2,
    pub radius: f32,
    pub kind: PowerUpKind,
    pub taken: bool,
}

impl PowerUp {
    pub fn new(x: f32, y: f32, kind: PowerUpKind) -> Self {
        Self {
            pos: Vec2::new(x, y),
            radius: 12.0,
            kind,
            taken: false,
        }
    }
}

/// Per-run status effect countdowns (seconds). Pickup re-arms a timer to
/// its full duration; reapplication resets rather than adds.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StatusEffects {
    pub invincible_left: f32,
    pub speed_boost_left: f32,
    pub extra_jump_left: f32,
}

impl StatusEffects {
    pub fn advance(&mut self, dt: f32) {
        self.invincible_left = (self.invincible_left - dt).max(0.0);
        self.speed_boost_left = (self.speed_boost_left - dt).max(0.0);
        self.extra_jump_left = (self.extra_jump_left - dt).max(0.0);
    }

    #[inline]
    pub fn invincible(&self) -> bool {
        self.invincible_left > 0.0
    }

    #[inline]
    pub fn speed_boosted(&self) -> bool {
        self.speed_boost_left > 0.0
    }

    #[inline]
    pub fn extra_jump(&self) -> bool {
        self.extra_jump_left > 0.0
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

/// A render-only particle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    pub color: u32,
    pub life: f32,
    pub size: f32,
}

/// Configuration scalars consumed from the settings layer at run start
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    /// Multiplies enemy base speeds
    pub difficulty_scale: f32,
    /// Multiplies per-segment enemy spawn chances
    pub enemy_multiplier: f32,
    /// Multiplies power-up / attached-coin spawn chances
    pub powerup_frequency: f32,
    /// Gates render-only particle spawns
    pub particles: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            difficulty_scale: 1.0,
            enemy_multiplier: 1.0,
            powerup_frequency: 1.0,
            particles: true,
        }
    }
}

/// Complete simulation state for one run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    /// Owned RNG; all procedural decisions draw from it
    pub rng: Pcg32,
    pub mode: GameMode,
    pub config: RunConfig,
    pub phase: GamePhase,
    /// 0-based level counter; feeds the difficulty index
    pub level_index: u32,
    pub lives: u32,
    pub score: u64,
    /// Current stomp chain length; zeroed on damage
    pub combo: u32,
    /// Seconds since the last stomp
    pub combo_clock: f32,
    /// Simulation time within the current level attempt
    pub time: f32,
    pub player: Player,
    pub effects: StatusEffects,
    pub platforms: Vec<Platform>,
    pub enemies: Vec<Enemy>,
    pub collectibles: Vec<Collectible>,
    pub powerups: Vec<PowerUp>,
    /// Level spawn point; deaths reset the avatar here
    pub spawn: Vec2,
    /// Goal flag x; `None` in the infinite vertical mode
    pub goal_x: Option<f32>,
    /// Falling past this y is lethal
    pub kill_y: f32,
    /// Playable horizontal band
    pub bounds_x: (f32, f32),
    /// Camera/scroll offset (top-left of the viewport)
    pub camera: Vec2,
    /// Highest avatar y reached (Ascent scoring), smaller is higher
    pub best_height_y: f32,
    /// Visual particles (not gameplay-affecting)
    #[serde(skip)]
    pub particles: Vec<Particle>,
    /// Previous tick's jump-held latch, for edge-triggered jumps
    pub(crate) jump_was_held: bool,
}

impl GameState {
    /// Create a new run in the given mode and build its first level
    pub fn new(seed: u64, mode: GameMode, config: RunConfig) -> Self {
        let mut state = Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            mode,
            config,
            phase: GamePhase::Menu,
            level_index: 0,
            lives: 3,
            score: 0,
            combo: 0,
            combo_clock: 0.0,
            time: 0.0,
            player: Player::new(Vec2::ZERO),
            effects: StatusEffects::default(),
            platforms: Vec::new(),
            enemies: Vec::new(),
            collectibles: Vec::new(),
            powerups: Vec::new(),
            spawn: Vec2::ZERO,
            goal_x: None,
            kill_y: 0.0,
            bounds_x: (0.0, VIEW_W),
            camera: Vec2::ZERO,
            best_height_y: 0.0,
            particles: Vec::new(),
            jump_was_held: false,
        };
        super::level::build_level(&mut state);
        state
    }

    /// Leave the menu and start simulating
    pub fn start(&mut self) {
        if self.phase == GamePhase::Menu {
            self.phase = GamePhase::Playing;
            log::info!("Run started: mode={:?} seed={}", self.mode, self.seed);
        }
    }

    /// Move to the next level after a win. Lives, score and the RNG carry
    /// over; the world is rebuilt at a higher difficulty index.
    pub fn advance_level(&mut self) {
        if self.phase != GamePhase::LevelWon {
            return;
        }
        self.level_index += 1;
        super::level::build_level(self);
        self.phase = GamePhase::Playing;
        log::info!("Advanced to level {}", self.level_index);
    }

    /// Difficulty index driving generation tables and enemy weighting
    pub fn difficulty(&self) -> u32 {
        let mode_bias = match self.mode {
            GameMode::Caverns => 1,
            _ => 0,
        };
        self.level_index + mode_bias
    }

    /// Climbed height in px (Ascent)
    pub fn climbed_height(&self) -> f32 {
        (self.spawn.y - self.best_height_y).max(0.0)
    }

    /// Spawn a small particle burst, respecting the toggle and the cap
    pub fn spawn_burst(&mut self, pos: Vec2, color: u32, count: usize) {
        if !self.config.particles {
            return;
        }
        use rand::Rng;
        for _ in 0..count {
            if self.particles.len() >= MAX_PARTICLES {
                self.particles.remove(0);
            }
            let angle = self.rng.random_range(0.0..std::f32::consts::TAU);
            let speed = self.rng.random_range(60.0..220.0);
            self.particles.push(Particle {
                pos,
                vel: Vec2::new(angle.cos(), angle.sin()) * speed,
                color,
                life: self.rng.random_range(0.3..0.8),
                size: self.rng.random_range(2.0..5.0),
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_state_builds_level() {
        let state = GameState::new(7, GameMode::Meadow, RunConfig::default());
        assert_eq!(state.phase, GamePhase::Menu);
        assert!(!state.platforms.is_empty());
        assert!(state.goal_x.is_some());
        assert_eq!(state.lives, 3);
    }

    #[test]
    fn test_ascent_has_no_goal() {
        let state = GameState::new(7, GameMode::Ascent, RunConfig::default());
        assert!(state.goal_x.is_none());
        assert!(!state.platforms.is_empty());
    }

    #[test]
    fn test_status_effects_rearm_not_stack() {
        let mut fx = StatusEffects::default();
        fx.invincible_left = crate::consts::INVINCIBILITY_DURATION;
        fx.advance(2.0);
        let partial = fx.invincible_left;
        assert!(partial < crate::consts::INVINCIBILITY_DURATION);
        // Re-arm resets to the full duration, not partial + full
        fx.invincible_left = crate::consts::INVINCIBILITY_DURATION;
        assert_eq!(fx.invincible_left, crate::consts::INVINCIBILITY_DURATION);
    }

    #[test]
    fn test_status_effects_floor_at_zero() {
        let mut fx = StatusEffects {
            invincible_left: 0.1,
            speed_boost_left: 0.0,
            extra_jump_left: 0.05,
        };
        fx.advance(1.0);
        assert_eq!(fx.invincible_left, 0.0);
        assert_eq!(fx.extra_jump_left, 0.0);
        assert!(!fx.invincible());
    }

    #[test]
    fn test_particle_toggle() {
        let mut state = GameState::new(7, GameMode::Meadow, RunConfig::default());
        state.config.particles = false;
        state.spawn_burst(Vec2::ZERO, 1, 10);
        assert!(state.particles.is_empty());
        state.config.particles = true;
        state.spawn_burst(Vec2::ZERO, 1, 10);
        assert_eq!(state.particles.len(), 10);
    }

    #[test]
    fn test_stomp_immunity_is_ambusher_only() {
        let spiked = Enemy::new(
            Vec2::ZERO,
            60.0,
            Brain::Ambusher {
                phase: AmbushPhase::Dormant { pause_left: 1.0 },
            },
        );
        let walker = Enemy::new(Vec2::ZERO, 60.0, Brain::Patrol);
        assert!(spiked.stomp_immune());
        assert!(!walker.stomp_immune());
    }

    #[test]
    fn test_state_serializes() {
        let state = GameState::new(42, GameMode::Caverns, RunConfig::default());
        let json = serde_json::to_string(&state).unwrap();
        let back: GameState = serde_json::from_str(&json).unwrap();
        assert_eq!(back.seed, 42);
        assert_eq!(back.platforms.len(), state.platforms.len());
    }
}
