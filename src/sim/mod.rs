//! Deterministic platformer simulation
//!
//! The engine is a pure fixed-step state machine: the embedder constructs a
//! [`GameState`] with a seed, mode and [`RunConfig`], then calls [`tick`]
//! with a [`TickInput`] once per frame. Identical seeds and input sequences
//! produce identical runs.

pub mod enemy;
pub mod level;
pub mod physics;
pub mod state;
pub mod tick;

pub use state::{
    AmbushPhase, Brain, Collectible, Enemy, GameMode, GamePhase, GameState, Particle, Platform,
    PlatformKind, Player, PowerUp, PowerUpKind, RunConfig, StatusEffects,
};
pub use tick::{tick, TickInput};
