//! Contact dispatch
//!
//! Turns raw body contacts from the physics world into sound triggers. Only
//! (ball, line) pairs play, and each pair plays once per ball lifetime no
//! matter how many times the physics world reports it.

use serde::{Deserialize, Serialize};

use super::state::{BallId, DropperId, Instrument, Line, LineId, Scene, SceneEvent};
use crate::audio::SoundTrigger;

/// Handle to a physics body taking part in a contact
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BodyRef {
    Ball(BallId),
    Line(LineId),
    Dropper(DropperId),
    /// Anything the engine does not own (walls, floor)
    Static,
}

/// An unordered pair of touching bodies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    pub a: BodyRef,
    pub b: BodyRef,
}

impl Contact {
    pub fn new(a: BodyRef, b: BodyRef) -> Self {
        Self { a, b }
    }

    /// The (ball, line) pair, in either order
    pub fn ball_line(&self) -> Option<(BallId, LineId)> {
        match (self.a, self.b) {
            (BodyRef::Ball(ball), BodyRef::Line(line)) => Some((ball, line)),
            (BodyRef::Line(line), BodyRef::Ball(ball)) => Some((ball, line)),
            _ => None,
        }
    }
}

/// Playback key for a line's current configuration
///
/// Drums play their drum type (`"Snare"`); pitched instruments play the note
/// followed by the instrument (`"EPiano"`).
pub fn sound_key(line: &Line) -> String {
    match line.instrument {
        Instrument::Drum => line.drum_type.as_str().to_string(),
        Instrument::Piano | Instrument::Guitar => {
            format!("{}{}", line.note.as_str(), line.instrument.as_str())
        }
    }
}

/// Handle one contact. Returns the key that was triggered, if any.
///
/// Ignored: pairs that are not exactly one ball and one line, pairs already
/// played, and stale contacts referring to removed entities.
pub fn on_contact(
    scene: &mut Scene,
    a: BodyRef,
    b: BodyRef,
    audio: &mut dyn SoundTrigger,
) -> Option<String> {
    let (ball_id, line_id) = Contact::new(a, b).ball_line()?;

    let key = sound_key(scene.line(line_id)?);
    let ball = scene.ball_mut(ball_id)?;
    if !ball.touch_line(line_id) {
        return None;
    }

    log::debug!("Ball {} hit line {}: {}", ball_id.0, line_id.0, key);
    audio.trigger(&key);
    scene.events.push(SceneEvent::SoundTriggered {
        ball: ball_id,
        line: line_id,
        key: key.clone(),
    });
    Some(key)
}
