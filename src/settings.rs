//! Game settings and preferences
//!
//! Persisted as JSON next to the executable's working directory, separately
//! from the best score. A missing or malformed file falls back to defaults;
//! settings are never a reason to fail startup.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::sim::RunConfig;

/// Difficulty presets mapping to simulation scalars
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum DifficultyPreset {
    Relaxed,
    #[default]
    Normal,
    Brutal,
}

impl DifficultyPreset {
    pub fn as_str(&self) -> &'static str {
        match self {
            DifficultyPreset::Relaxed => "Relaxed",
            DifficultyPreset::Normal => "Normal",
            DifficultyPreset::Brutal => "Brutal",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "relaxed" | "easy" => Some(DifficultyPreset::Relaxed),
            "normal" => Some(DifficultyPreset::Normal),
            "brutal" | "hard" => Some(DifficultyPreset::Brutal),
            _ => None,
        }
    }

    /// Multiplier on enemy base speeds
    pub fn difficulty_scale(&self) -> f32 {
        match self {
            DifficultyPreset::Relaxed => 0.8,
            DifficultyPreset::Normal => 1.0,
            DifficultyPreset::Brutal => 1.3,
        }
    }

    /// Multiplier on per-segment enemy spawn chances
    pub fn enemy_multiplier(&self) -> f32 {
        match self {
            DifficultyPreset::Relaxed => 0.6,
            DifficultyPreset::Normal => 1.0,
            DifficultyPreset::Brutal => 1.5,
        }
    }

    /// Multiplier on power-up and bonus-coin spawn chances
    pub fn powerup_frequency(&self) -> f32 {
        match self {
            DifficultyPreset::Relaxed => 1.4,
            DifficultyPreset::Normal => 1.0,
            DifficultyPreset::Brutal => 0.7,
        }
    }
}

/// Game settings/preferences
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Difficulty preset
    pub difficulty: DifficultyPreset,

    // === Visual Effects ===
    /// Particle effects (stomps, pickups, hits)
    pub particles: bool,
    /// Screen shake on hits
    pub screen_shake: bool,

    // === HUD ===
    /// Show FPS counter
    pub show_fps: bool,

    // === Accessibility ===
    /// Reduced motion (minimize shake, flashes)
    pub reduced_motion: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            difficulty: DifficultyPreset::Normal,
            particles: true,
            screen_shake: true,
            show_fps: false,
            reduced_motion: false,
        }
    }
}

impl Settings {
    /// Settings file name in the working directory
    pub const FILE_NAME: &'static str = "ridgerun_settings.json";

    /// Build the simulation-facing configuration scalars
    pub fn to_run_config(&self) -> RunConfig {
        RunConfig {
            difficulty_scale: self.difficulty.difficulty_scale(),
            enemy_multiplier: self.difficulty.enemy_multiplier(),
            powerup_frequency: self.difficulty.powerup_frequency(),
            particles: self.particles && !self.reduced_motion,
        }
    }

    /// Effective screen shake (respects reduced_motion)
    pub fn effective_screen_shake(&self) -> bool {
        self.screen_shake && !self.reduced_motion
    }

    /// Load settings from the default file, falling back to defaults
    pub fn load() -> Self {
        Self::load_from(Path::new(Self::FILE_NAME))
    }

    pub fn load_from(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(json) => match serde_json::from_str(&json) {
                Ok(settings) => {
                    log::info!("Loaded settings from {}", path.display());
                    settings
                }
                Err(err) => {
                    log::warn!("Malformed settings file {}: {err}", path.display());
                    Self::default()
                }
            },
            Err(_) => {
                log::info!("Using default settings");
                Self::default()
            }
        }
    }

    /// Save settings to the default file
    pub fn save(&self) {
        self.save_to(Path::new(Self::FILE_NAME));
    }

    pub fn save_to(&self, path: &Path) {
        match serde_json::to_string_pretty(self) {
            Ok(json) => {
                if let Err(err) = fs::write(path, json) {
                    log::warn!("Could not save settings to {}: {err}", path.display());
                } else {
                    log::info!("Settings saved");
                }
            }
            Err(err) => log::warn!("Could not serialize settings: {err}"),
        }
    }
}
