//! Scene simulation module
//!
//! All engine logic lives here. Nothing in this module renders or plays audio:
//! - Beat timing comes from one shared clock
//! - Contacts come from a pluggable physics world
//! - Sounds leave through the `SoundTrigger` boundary
//! - Stable iteration order (by entity ID)

pub mod beat;
pub mod collision;
pub mod input;
pub mod physics;
pub mod state;
pub mod tick;

pub use beat::BeatClock;
pub use collision::{BodyRef, Contact, on_contact, sound_key};
pub use input::{Command, Mode};
pub use physics::{GravityWorld, PhysicsWorld};
pub use state::{
    Ball, BallId, Bounds, DrumType, Dropper, DropperId, Instrument, Line, LineId, MusicNote,
    Pattern, Scene, SceneEvent, Selection, SelectionSnapshot,
};
pub use tick::{FrameReport, cull_balls, tick};
