//! Interaction modes
//!
//! Taps mean different things depending on the current mode: drawing a line
//! takes two taps, placing a dropper takes one, editing selects, deleting
//! removes. UI controls reach the scene through `Command`.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::state::{DrumType, DropperId, Instrument, LineId, MusicNote, Pattern, Scene, Selection};

/// Current interaction mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Mode {
    /// Two taps draw a line
    #[default]
    Draw,
    /// Each tap places a dropper
    CreateDropper,
    /// A tap selects the line or dropper under it
    Edit,
    /// A tap deletes the line (or, failing that, the dropper) under it
    Delete,
}

impl Mode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Draw => "Draw",
            Mode::CreateDropper => "Create Dropper",
            Mode::Edit => "Edit",
            Mode::Delete => "Delete",
        }
    }
}

/// Everything the UI layer can ask of the scene
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Command {
    Tap(Vec2),
    SetMode(Mode),
    SetBpm(i32),
    ConfigureLine {
        line: LineId,
        instrument: Instrument,
        note: Option<MusicNote>,
        drum_type: Option<DrumType>,
    },
    ConfigureDropper {
        dropper: DropperId,
        pattern: Pattern,
    },
}

impl Scene {
    /// Apply a UI command. Returns false when the command was ignored.
    pub fn apply(&mut self, command: Command) -> bool {
        match command {
            Command::Tap(point) => {
                self.on_tap(point);
                true
            }
            Command::SetMode(mode) => {
                self.set_mode(mode);
                true
            }
            Command::SetBpm(bpm) => self.set_bpm(bpm),
            Command::ConfigureLine {
                line,
                instrument,
                note,
                drum_type,
            } => self.configure_line(line, instrument, note, drum_type),
            Command::ConfigureDropper { dropper, pattern } => {
                self.configure_dropper(dropper, pattern)
            }
        }
    }

    /// Switch mode. Any half-drawn line is discarded; the selection is kept
    /// only when entering Edit.
    pub fn set_mode(&mut self, mode: Mode) {
        let before = self.snapshot();
        if mode != Mode::Edit {
            self.selection = Selection::None;
        }
        self.pending_point = None;
        self.mode = mode;
        log::debug!("Mode: {}", mode.as_str());
        self.publish_if_changed(before);
    }

    /// Handle a tap at `point` according to the current mode
    pub fn on_tap(&mut self, point: Vec2) {
        let before = self.snapshot();
        match self.mode {
            Mode::Draw => self.tap_draw(point),
            Mode::CreateDropper => {
                self.add_dropper(point);
            }
            Mode::Edit => self.tap_edit(point),
            Mode::Delete => self.tap_delete(point),
        }
        self.publish_if_changed(before);
    }

    fn tap_draw(&mut self, point: Vec2) {
        match self.pending_point.take() {
            Some(start) => {
                let id = self.add_line(start, point);
                self.selection = Selection::Line(id);
            }
            None => {
                // Starting a new line drops the previous line's selection
                if self.selection.line().is_some() {
                    self.selection = Selection::None;
                }
                self.pending_point = Some(point);
            }
        }
    }

    fn tap_edit(&mut self, point: Vec2) {
        self.selection = if let Some(line) = self.line_at(point) {
            Selection::Line(line)
        } else if let Some(dropper) = self.dropper_at(point) {
            Selection::Dropper(dropper)
        } else {
            Selection::None
        };
    }

    fn tap_delete(&mut self, point: Vec2) {
        // Lines take priority to avoid deleting a dropper by accident
        if let Some(line) = self.line_at(point) {
            self.remove_line(line);
        } else if let Some(dropper) = self.dropper_at(point) {
            self.remove_dropper(dropper);
        }
    }

    /// Change the selected line's sound. Ignored unless `line` is selected.
    ///
    /// `note` and `drum_type` are only written when given, so switching
    /// instrument keeps the previous pitch and drum choice.
    pub fn configure_line(
        &mut self,
        line: LineId,
        instrument: Instrument,
        note: Option<MusicNote>,
        drum_type: Option<DrumType>,
    ) -> bool {
        if self.selection != Selection::Line(line) {
            log::debug!("Ignoring configure for unselected line {}", line.0);
            return false;
        }
        let Some(target) = self.line_mut(line) else {
            return false;
        };
        target.instrument = instrument;
        if let Some(note) = note {
            target.note = note;
        }
        if let Some(drum_type) = drum_type {
            target.drum_type = drum_type;
        }
        true
    }

    /// Replace the selected dropper's firing pattern. Ignored unless selected.
    pub fn configure_dropper(&mut self, dropper: DropperId, pattern: Pattern) -> bool {
        if self.selection != Selection::Dropper(dropper) {
            log::debug!("Ignoring configure for unselected dropper {}", dropper.0);
            return false;
        }
        let Some(target) = self.dropper_mut(dropper) else {
            return false;
        };
        target.pattern = pattern;
        true
    }
}
