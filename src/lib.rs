//! Musical Drops - a rhythm toy simulation engine
//!
//! Core modules:
//! - `sim`: Scene state, beat clock, collision dispatch and interaction modes
//! - `audio`: Sound-key playback boundary
//! - `settings`: Session configuration loaded from JSON

pub mod audio;
pub mod settings;
pub mod sim;

pub use audio::{SoundBank, SoundTrigger};
pub use settings::Settings;

use glam::Vec2;

/// Engine configuration constants
pub mod consts {
    /// Frame step of the render/simulation loop (30 Hz)
    pub const FRAME_DT: f32 = 1.0 / 30.0;
    /// Longest stretch of time one clock advance accounts for (seconds)
    pub const MAX_FRAME_DT: f32 = 1.0;
    /// Maximum beat ticks fired by one clock advance
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Tempo used when a scene is constructed
    pub const DEFAULT_BPM: u32 = 120;
    /// Beat slots in one bar
    pub const BEATS_PER_BAR: usize = 4;

    /// Play area (scene frame, origin at bottom-left, y up)
    pub const SCENE_WIDTH: f32 = 1280.0;
    pub const SCENE_HEIGHT: f32 = 720.0;

    /// Ball defaults
    pub const BALL_RADIUS: f32 = 10.0;
    /// Distance below the dropper anchor where balls appear
    pub const BALL_SPAWN_OFFSET: f32 = 5.0;

    /// Dropper body, relative to its anchor
    pub const DROPPER_HALF_WIDTH: f32 = 25.0;
    pub const DROPPER_BOTTOM: f32 = -10.0;
    pub const DROPPER_TOP: f32 = 5.0;

    /// How far from a line a tap may land and still hit it
    pub const LINE_HIT_TOLERANCE: f32 = 8.0;

    /// Downward acceleration (points/s²)
    pub const GRAVITY: f32 = 980.0;
    /// Bounce energy kept on line contact
    pub const RESTITUTION: f32 = 0.2;
}

/// Closest point to `p` on the segment `a`-`b`
#[inline]
pub fn closest_point_on_segment(p: Vec2, a: Vec2, b: Vec2) -> Vec2 {
    let seg = b - a;
    let len_sq = seg.length_squared();
    if len_sq < 0.0001 {
        return a; // Degenerate segment
    }
    let t = ((p - a).dot(seg) / len_sq).clamp(0.0, 1.0);
    a + seg * t
}

/// Distance from `p` to the segment `a`-`b`
#[inline]
pub fn distance_to_segment(p: Vec2, a: Vec2, b: Vec2) -> f32 {
    (p - closest_point_on_segment(p, a, b)).length()
}
