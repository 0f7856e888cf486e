//! Scene state and core entity types
//!
//! The scene is the single context object for a session: it owns every line,
//! dropper and ball, the beat clock, the interaction mode and the selection.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::beat::BeatClock;
use super::input::Mode;
use crate::consts::*;
use crate::distance_to_segment;

/// Instrument a line plays
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Instrument {
    #[default]
    Drum,
    Piano,
    Guitar,
}

impl Instrument {
    pub const ALL: [Instrument; 3] = [Instrument::Drum, Instrument::Piano, Instrument::Guitar];

    pub fn as_str(&self) -> &'static str {
        match self {
            Instrument::Drum => "Drum",
            Instrument::Piano => "Piano",
            Instrument::Guitar => "Guitar",
        }
    }
}

/// Drum voice, used when the instrument is `Drum`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum DrumType {
    #[default]
    Kick,
    Snare,
    Hat,
}

impl DrumType {
    pub const ALL: [DrumType; 3] = [DrumType::Kick, DrumType::Snare, DrumType::Hat];

    pub fn as_str(&self) -> &'static str {
        match self {
            DrumType::Kick => "Kick",
            DrumType::Snare => "Snare",
            DrumType::Hat => "Hat",
        }
    }
}

/// Pitch, used when the instrument is `Piano` or `Guitar`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum MusicNote {
    A,
    B,
    #[default]
    C,
    D,
    E,
    F,
    G,
}

impl MusicNote {
    pub const ALL: [MusicNote; 7] = [
        MusicNote::A,
        MusicNote::B,
        MusicNote::C,
        MusicNote::D,
        MusicNote::E,
        MusicNote::F,
        MusicNote::G,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MusicNote::A => "A",
            MusicNote::B => "B",
            MusicNote::C => "C",
            MusicNote::D => "D",
            MusicNote::E => "E",
            MusicNote::F => "F",
            MusicNote::G => "G",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LineId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DropperId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BallId(pub u32);

/// A drawn two-point segment that plays a sound when a ball first touches it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Line {
    pub id: LineId,
    pub start: Vec2,
    pub end: Vec2,
    pub instrument: Instrument,
    /// Active only when `instrument` is `Drum`
    pub drum_type: DrumType,
    /// Active only when `instrument` is `Piano` or `Guitar`
    pub note: MusicNote,
}

impl Line {
    pub fn new(id: LineId, start: Vec2, end: Vec2) -> Self {
        Self {
            id,
            start,
            end,
            instrument: Instrument::default(),
            drum_type: DrumType::default(),
            note: MusicNote::default(),
        }
    }

    /// Whether a tap at `point` lands on this line
    pub fn contains_point(&self, point: Vec2) -> bool {
        distance_to_segment(point, self.start, self.end) <= LINE_HIT_TOLERANCE
    }
}

/// Firing pattern, one flag per beat slot
pub type Pattern = [bool; BEATS_PER_BAR];

/// Pattern given to new droppers: fire on the first beat of the bar only
pub const DEFAULT_PATTERN: Pattern = [true, false, false, false];

/// A stationary ball emitter
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dropper {
    pub id: DropperId,
    /// Anchor position
    pub pos: Vec2,
    pub pattern: Pattern,
}

impl Dropper {
    pub fn new(id: DropperId, pos: Vec2) -> Self {
        Self {
            id,
            pos,
            pattern: DEFAULT_PATTERN,
        }
    }

    /// Whether this dropper releases a ball on the given beat slot
    pub fn fires_on(&self, slot: u8) -> bool {
        self.pattern.get(slot as usize).copied().unwrap_or(false)
    }

    /// Where spawned balls appear
    pub fn spawn_point(&self) -> Vec2 {
        Vec2::new(self.pos.x, self.pos.y - BALL_SPAWN_OFFSET)
    }

    /// Whether a tap at `point` lands on the dropper body
    pub fn contains_point(&self, point: Vec2) -> bool {
        let local = point - self.pos;
        local.x.abs() <= DROPPER_HALF_WIDTH && local.y >= DROPPER_BOTTOM && local.y <= DROPPER_TOP
    }
}

/// A falling ball
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ball {
    pub id: BallId,
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    /// Colour tag for renderers; does not affect the sound
    pub note: MusicNote,
    /// Dropper that released this ball (may no longer exist)
    pub origin: Option<DropperId>,
    /// Lines already played by this ball
    #[serde(default)]
    pub touched_lines: Vec<LineId>,
}

impl Ball {
    pub fn new(id: BallId, pos: Vec2, radius: f32) -> Self {
        Self {
            id,
            pos,
            vel: Vec2::ZERO,
            radius,
            note: MusicNote::C,
            origin: None,
            touched_lines: Vec::new(),
        }
    }

    pub fn has_touched_line(&self, line: LineId) -> bool {
        self.touched_lines.contains(&line)
    }

    /// Record a touch; returns false if the line was already touched
    pub fn touch_line(&mut self, line: LineId) -> bool {
        if self.has_touched_line(line) {
            return false;
        }
        self.touched_lines.push(line);
        true
    }
}

/// Axis-aligned play area
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min: Vec2,
    pub max: Vec2,
}

impl Default for Bounds {
    fn default() -> Self {
        Self {
            min: Vec2::ZERO,
            max: Vec2::new(SCENE_WIDTH, SCENE_HEIGHT),
        }
    }
}

impl Bounds {
    pub fn new(min: Vec2, max: Vec2) -> Self {
        Self {
            min: min.min(max),
            max: min.max(max),
        }
    }

    /// Whether a circle's bounding box overlaps the area
    pub fn intersects_circle(&self, center: Vec2, radius: f32) -> bool {
        center.x + radius >= self.min.x
            && center.x - radius <= self.max.x
            && center.y + radius >= self.min.y
            && center.y - radius <= self.max.y
    }
}

/// What the user currently has selected. At most one entity, never both kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Selection {
    #[default]
    None,
    Line(LineId),
    Dropper(DropperId),
}

impl Selection {
    pub fn line(&self) -> Option<LineId> {
        match self {
            Selection::Line(id) => Some(*id),
            _ => None,
        }
    }

    pub fn dropper(&self) -> Option<DropperId> {
        match self {
            Selection::Dropper(id) => Some(*id),
            _ => None,
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Selection::None)
    }
}

/// Read-only view for UI observers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionSnapshot {
    pub mode: Mode,
    pub selection: Selection,
}

impl SelectionSnapshot {
    pub fn selected_line(&self) -> Option<LineId> {
        self.selection.line()
    }

    pub fn selected_dropper(&self) -> Option<DropperId> {
        self.selection.dropper()
    }
}

/// Notifications for collaborators (UI, renderer, analytics), drained once per frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SceneEvent {
    /// Mode or selection changed
    SelectionChanged(SelectionSnapshot),
    LineCreated(LineId),
    LineDeleted(LineId),
    DropperCreated(DropperId),
    DropperDeleted(DropperId),
    BallSpawned { ball: BallId, dropper: DropperId },
    /// Ball left the play area
    BallDestroyed(BallId),
    SoundTriggered { ball: BallId, line: LineId, key: String },
    TempoChanged { bpm: u32 },
}

/// Complete session state
#[derive(Debug, Clone)]
pub struct Scene {
    pub(crate) mode: Mode,
    /// First endpoint of a line being drawn
    pub(crate) pending_point: Option<Vec2>,
    pub(crate) selection: Selection,
    pub(crate) clock: BeatClock,
    /// Sorted by id (creation order)
    pub(crate) lines: Vec<Line>,
    pub(crate) droppers: Vec<Dropper>,
    pub(crate) balls: Vec<Ball>,
    pub(crate) bounds: Bounds,
    pub(crate) ball_radius: f32,
    pub(crate) events: Vec<SceneEvent>,
    next_id: u32,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new(DEFAULT_BPM, Bounds::default())
    }
}

impl Scene {
    /// Create an empty scene
    pub fn new(bpm: u32, bounds: Bounds) -> Self {
        Self {
            mode: Mode::default(),
            pending_point: None,
            selection: Selection::None,
            clock: BeatClock::new(bpm),
            lines: Vec::new(),
            droppers: Vec::new(),
            balls: Vec::new(),
            bounds,
            ball_radius: BALL_RADIUS,
            events: Vec::new(),
            next_id: 1,
        }
    }

    /// Override the radius of balls spawned from now on
    pub fn with_ball_radius(mut self, radius: f32) -> Self {
        if radius > 0.0 {
            self.ball_radius = radius;
        }
        self
    }

    /// Allocate a new entity ID
    fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn selection(&self) -> Selection {
        self.selection
    }

    pub fn pending_point(&self) -> Option<Vec2> {
        self.pending_point
    }

    pub fn clock(&self) -> &BeatClock {
        &self.clock
    }

    pub fn bpm(&self) -> u32 {
        self.clock.bpm()
    }

    pub fn beat_slot(&self) -> u8 {
        self.clock.slot()
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    pub fn lines(&self) -> &[Line] {
        &self.lines
    }

    pub fn droppers(&self) -> &[Dropper] {
        &self.droppers
    }

    pub fn balls(&self) -> &[Ball] {
        &self.balls
    }

    pub fn line(&self, id: LineId) -> Option<&Line> {
        self.lines.iter().find(|l| l.id == id)
    }

    pub fn dropper(&self, id: DropperId) -> Option<&Dropper> {
        self.droppers.iter().find(|d| d.id == id)
    }

    pub fn ball(&self, id: BallId) -> Option<&Ball> {
        self.balls.iter().find(|b| b.id == id)
    }

    pub(crate) fn line_mut(&mut self, id: LineId) -> Option<&mut Line> {
        self.lines.iter_mut().find(|l| l.id == id)
    }

    pub(crate) fn dropper_mut(&mut self, id: DropperId) -> Option<&mut Dropper> {
        self.droppers.iter_mut().find(|d| d.id == id)
    }

    pub(crate) fn ball_mut(&mut self, id: BallId) -> Option<&mut Ball> {
        self.balls.iter_mut().find(|b| b.id == id)
    }

    /// Current mode and selection
    pub fn snapshot(&self) -> SelectionSnapshot {
        SelectionSnapshot {
            mode: self.mode,
            selection: self.selection,
        }
    }

    /// Take all events queued since the last drain
    pub fn drain_events(&mut self) -> Vec<SceneEvent> {
        std::mem::take(&mut self.events)
    }

    /// Queue a snapshot event if mode or selection differ from `before`
    pub(crate) fn publish_if_changed(&mut self, before: SelectionSnapshot) {
        let now = self.snapshot();
        if now != before {
            self.events.push(SceneEvent::SelectionChanged(now));
        }
    }

    /// Topmost line under `point` (most recently drawn wins)
    pub fn line_at(&self, point: Vec2) -> Option<LineId> {
        self.lines
            .iter()
            .rev()
            .find(|l| l.contains_point(point))
            .map(|l| l.id)
    }

    /// Topmost dropper under `point` (most recently placed wins)
    pub fn dropper_at(&self, point: Vec2) -> Option<DropperId> {
        self.droppers
            .iter()
            .rev()
            .find(|d| d.contains_point(point))
            .map(|d| d.id)
    }

    /// Add a line with default sound settings
    pub(crate) fn add_line(&mut self, start: Vec2, end: Vec2) -> LineId {
        let id = LineId(self.next_entity_id());
        self.lines.push(Line::new(id, start, end));
        self.events.push(SceneEvent::LineCreated(id));
        log::debug!("Line {} created ({} -> {})", id.0, start, end);
        id
    }

    /// Add a dropper and register it with the beat clock
    pub(crate) fn add_dropper(&mut self, pos: Vec2) -> DropperId {
        let id = DropperId(self.next_entity_id());
        self.droppers.push(Dropper::new(id, pos));
        self.clock.register(id);
        self.events.push(SceneEvent::DropperCreated(id));
        log::debug!("Dropper {} created at {}", id.0, pos);
        id
    }

    /// Remove a line. Balls keep their touch records; they refer to a dead id.
    pub(crate) fn remove_line(&mut self, id: LineId) -> bool {
        let Some(index) = self.lines.iter().position(|l| l.id == id) else {
            return false;
        };
        self.lines.remove(index);
        if self.selection == Selection::Line(id) {
            self.selection = Selection::None;
        }
        self.events.push(SceneEvent::LineDeleted(id));
        log::debug!("Line {} deleted", id.0);
        true
    }

    /// Deregister a dropper from the clock and remove it. Its balls stay live.
    pub(crate) fn remove_dropper(&mut self, id: DropperId) -> bool {
        let Some(index) = self.droppers.iter().position(|d| d.id == id) else {
            return false;
        };
        self.clock.deregister(id);
        self.droppers.remove(index);
        if self.selection == Selection::Dropper(id) {
            self.selection = Selection::None;
        }
        self.events.push(SceneEvent::DropperDeleted(id));
        log::debug!("Dropper {} deleted", id.0);
        true
    }

    /// Release a ball just below a dropper
    pub(crate) fn spawn_ball(&mut self, dropper: DropperId) -> Option<BallId> {
        let pos = self.dropper(dropper)?.spawn_point();
        let id = BallId(self.next_entity_id());
        let mut ball = Ball::new(id, pos, self.ball_radius);
        ball.origin = Some(dropper);
        self.balls.push(ball);
        self.events.push(SceneEvent::BallSpawned { ball: id, dropper });
        Some(id)
    }

    /// Remove every entity, queuing a removal event for each. Tempo and beat
    /// phase are kept.
    pub fn clear(&mut self) {
        let before = self.snapshot();
        for dropper in &self.droppers {
            self.clock.deregister(dropper.id);
        }
        self.events
            .extend(self.balls.drain(..).map(|b| SceneEvent::BallDestroyed(b.id)));
        self.events
            .extend(self.lines.drain(..).map(|l| SceneEvent::LineDeleted(l.id)));
        self.events.extend(
            self.droppers
                .drain(..)
                .map(|d| SceneEvent::DropperDeleted(d.id)),
        );
        self.pending_point = None;
        self.selection = Selection::None;
        self.publish_if_changed(before);
        log::info!("Scene cleared");
    }
}
