//! Session settings
//!
//! Loaded from a JSON file at startup. Missing fields take their defaults, and
//! an unreadable or malformed file falls back to defaults entirely.

use std::path::Path;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::sim::{Bounds, GravityWorld, Scene};

/// Environment variable naming the settings file
pub const SETTINGS_ENV: &str = "MUSICAL_DROPS_SETTINGS";

/// Engine settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Tempo when the scene starts
    pub bpm: u32,

    // === Play area ===
    pub scene_width: f32,
    pub scene_height: f32,

    // === Physics ===
    /// Downward acceleration (points/s²)
    pub gravity: f32,
    /// Bounce energy kept on line contact (0.0 - 1.0)
    pub restitution: f32,
    pub ball_radius: f32,

    // === Loop ===
    /// Frames per second of the simulation loop
    pub frame_rate: u32,

    // === Audio ===
    /// Master volume (0.0 - 1.0)
    pub master_volume: f32,
    /// Sound effects volume (0.0 - 1.0)
    pub sfx_volume: f32,
    pub muted: bool,

    // === Demo session ===
    pub demo_seed: u64,
    /// Seconds the demo runs
    pub demo_seconds: f32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            bpm: DEFAULT_BPM,

            scene_width: SCENE_WIDTH,
            scene_height: SCENE_HEIGHT,

            gravity: GRAVITY,
            restitution: RESTITUTION,
            ball_radius: BALL_RADIUS,

            frame_rate: 30,

            master_volume: 0.8,
            sfx_volume: 1.0,
            muted: false,

            demo_seed: 12345,
            demo_seconds: 16.0,
        }
    }
}

impl Settings {
    /// Fixed step of the simulation loop in seconds
    pub fn frame_dt(&self) -> f32 {
        if self.frame_rate == 0 {
            FRAME_DT
        } else {
            1.0 / self.frame_rate as f32
        }
    }

    pub fn bounds(&self) -> Bounds {
        Bounds::new(Vec2::ZERO, Vec2::new(self.scene_width, self.scene_height))
    }

    /// Fresh scene using these settings
    pub fn build_scene(&self) -> Scene {
        Scene::new(self.bpm, self.bounds()).with_ball_radius(self.ball_radius)
    }

    /// Reference physics world using these settings
    pub fn build_world(&self) -> GravityWorld {
        GravityWorld::new(self.gravity, self.restitution)
    }

    /// Parse settings from JSON text
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Load settings from a JSON file, falling back to defaults
    pub fn load(path: &Path) -> Self {
        let json = match std::fs::read_to_string(path) {
            Ok(json) => json,
            Err(e) => {
                log::warn!("Could not read settings {}: {}", path.display(), e);
                return Self::default();
            }
        };
        match Self::from_json(&json) {
            Ok(settings) => {
                log::info!("Loaded settings from {}", path.display());
                settings
            }
            Err(e) => {
                log::warn!("Invalid settings in {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Load from the path in `MUSICAL_DROPS_SETTINGS`, or use defaults
    pub fn from_env() -> Self {
        match std::env::var_os(SETTINGS_ENV) {
            Some(path) => Self::load(Path::new(&path)),
            None => {
                log::info!("Using default settings");
                Self::default()
            }
        }
    }

    /// Save settings as pretty JSON
    pub fn save(&self, path: &Path) -> std::io::Result<()> {
        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        std::fs::write(path, json)?;
        log::info!("Settings saved to {}", path.display());
        Ok(())
    }
}
