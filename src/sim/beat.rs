//! Beat clock
//!
//! One clock drives every dropper. It counts beat slots 0..=3 and fires once
//! per period (`60 / bpm` seconds). Droppers register by id, so removing a
//! dropper from the scene and from the clock happens in a single call.

use super::state::{BallId, DropperId, Scene, SceneEvent};
use crate::consts::{BEATS_PER_BAR, DEFAULT_BPM, MAX_FRAME_DT, MAX_SUBSTEPS};

/// Fixed-period beat scheduler
#[derive(Debug, Clone)]
pub struct BeatClock {
    bpm: u32,
    /// Seconds between ticks
    period: f32,
    /// Slot that fires on the next tick
    slot: u8,
    /// Time accumulated towards the next tick
    elapsed: f32,
    /// Registered droppers, in registration order
    droppers: Vec<DropperId>,
}

impl Default for BeatClock {
    fn default() -> Self {
        Self::new(DEFAULT_BPM)
    }
}

/// Seconds per beat at the given tempo
#[inline]
pub fn period_for(bpm: u32) -> f32 {
    60.0 / bpm as f32
}

impl BeatClock {
    pub fn new(bpm: u32) -> Self {
        let bpm = if bpm == 0 {
            log::warn!("Clock created with 0 BPM, using {}", DEFAULT_BPM);
            DEFAULT_BPM
        } else {
            bpm
        };
        Self {
            bpm,
            period: period_for(bpm),
            slot: 0,
            elapsed: 0.0,
            droppers: Vec::new(),
        }
    }

    pub fn bpm(&self) -> u32 {
        self.bpm
    }

    pub fn period(&self) -> f32 {
        self.period
    }

    pub fn slot(&self) -> u8 {
        self.slot
    }

    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    pub fn registered(&self) -> &[DropperId] {
        &self.droppers
    }

    /// Change tempo. The beat slot is kept; the timer restarts with the new period.
    ///
    /// Returns false (and keeps the old tempo) for non-positive values.
    pub fn set_bpm(&mut self, bpm: i32) -> bool {
        if bpm <= 0 {
            log::warn!("Rejected BPM {} (keeping {})", bpm, self.bpm);
            return false;
        }
        let bpm = bpm as u32;
        if bpm == self.bpm {
            return true;
        }
        self.bpm = bpm;
        self.period = period_for(bpm);
        self.restart();
        log::info!("Tempo set to {} BPM (period {:.3}s)", bpm, self.period);
        true
    }

    /// Restart the timer without touching the beat slot
    pub fn restart(&mut self) {
        self.elapsed = 0.0;
    }

    pub fn register(&mut self, id: DropperId) {
        if !self.droppers.contains(&id) {
            self.droppers.push(id);
        }
    }

    pub fn deregister(&mut self, id: DropperId) -> bool {
        let before = self.droppers.len();
        self.droppers.retain(|d| *d != id);
        self.droppers.len() != before
    }

    /// Accumulate time; returns how many ticks are now due.
    ///
    /// `dt` is clamped to `MAX_FRAME_DT` and at most `MAX_SUBSTEPS` ticks are
    /// returned. Backlog past the cap is dropped, keeping only the phase.
    pub fn advance(&mut self, dt: f32) -> u32 {
        if dt.is_nan() || dt <= 0.0 {
            return 0;
        }
        self.elapsed += dt.min(MAX_FRAME_DT);
        let mut due = 0;
        while self.elapsed >= self.period && due < MAX_SUBSTEPS {
            self.elapsed -= self.period;
            due += 1;
        }
        if self.elapsed >= self.period {
            log::debug!("Dropping beat backlog of {:.3}s", self.elapsed);
            self.elapsed %= self.period;
        }
        due
    }

    /// Move to the next slot, wrapping after the last beat of the bar
    pub(crate) fn step_slot(&mut self) {
        self.slot = ((self.slot as usize + 1) % BEATS_PER_BAR) as u8;
    }
}

impl Scene {
    /// Change tempo; non-positive values are ignored
    pub fn set_bpm(&mut self, bpm: i32) -> bool {
        let previous = self.clock.bpm();
        if !self.clock.set_bpm(bpm) {
            return false;
        }
        if self.clock.bpm() != previous {
            self.events.push(SceneEvent::TempoChanged {
                bpm: self.clock.bpm(),
            });
        }
        true
    }

    /// Fire one tick: every registered dropper whose pattern is set on the
    /// current slot releases a ball, then the slot advances.
    pub fn beat(&mut self) -> Vec<BallId> {
        let slot = self.clock.slot();
        let firing: Vec<DropperId> = self
            .clock
            .registered()
            .iter()
            .copied()
            .filter(|id| self.dropper(*id).is_some_and(|d| d.fires_on(slot)))
            .collect();

        let spawned: Vec<BallId> = firing
            .into_iter()
            .filter_map(|id| self.spawn_ball(id))
            .collect();

        self.clock.step_slot();
        spawned
    }

    /// Advance the clock by `dt`, firing every tick that falls due
    pub fn advance_clock(&mut self, dt: f32) -> Vec<BallId> {
        let due = self.clock.advance(dt);
        let mut spawned = Vec::new();
        for _ in 0..due {
            spawned.extend(self.beat());
        }
        spawned
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;

    #[test]
    fn test_period_matches_bpm() {
        let clock = BeatClock::new(120);
        assert_eq!(clock.period(), 0.5);

        let mut clock = BeatClock::new(60);
        assert_eq!(clock.period(), 1.0);
        assert!(clock.set_bpm(90));
        assert_eq!(clock.period(), 60.0 / 90.0);
    }

    #[test]
    fn test_rejects_non_positive_bpm() {
        let mut clock = BeatClock::new(100);
        assert!(!clock.set_bpm(0));
        assert!(!clock.set_bpm(-40));
        assert_eq!(clock.bpm(), 100);
        assert_eq!(clock.period(), 0.6);
    }

    #[test]
    fn test_zero_bpm_at_construction_falls_back() {
        let clock = BeatClock::new(0);
        assert_eq!(clock.bpm(), DEFAULT_BPM);
    }

    #[test]
    fn test_slot_cycles() {
        let mut scene = Scene::default();
        let mut seen = Vec::new();
        for _ in 0..9 {
            seen.push(scene.beat_slot());
            scene.beat();
        }
        assert_eq!(seen, vec![0, 1, 2, 3, 0, 1, 2, 3, 0]);
    }

    #[test]
    fn test_tempo_change_keeps_slot() {
        let mut scene = Scene::default();
        scene.beat();
        scene.beat();
        scene.advance_clock(0.3);
        assert_eq!(scene.beat_slot(), 2);

        assert!(scene.set_bpm(200));
        assert_eq!(scene.beat_slot(), 2);
        // Timer restarted: a full new period before the next tick
        assert_eq!(scene.clock().elapsed(), 0.0);
        assert!(scene.advance_clock(0.25).is_empty());
        assert_eq!(scene.beat_slot(), 2);
        scene.advance_clock(0.06);
        assert_eq!(scene.beat_slot(), 3);
    }

    #[test]
    fn test_default_pattern_fires_once_per_bar() {
        let mut scene = Scene::default();
        scene.add_dropper(Vec2::new(200.0, 600.0));

        let spawned: usize = (0..8).map(|_| scene.beat().len()).sum();
        assert_eq!(spawned, 2);
    }

    #[test]
    fn test_advance_fires_multiple_due_ticks() {
        let mut scene = Scene::default();
        let id = scene.add_dropper(Vec2::new(200.0, 600.0));
        scene.dropper_mut(id).unwrap().pattern = [true; 4];
        assert!(scene.set_bpm(240));

        // 240 BPM -> 0.25s period; 0.8s covers three ticks
        let spawned = scene.advance_clock(0.8);
        assert_eq!(spawned.len(), 3);
        assert_eq!(scene.beat_slot(), 3);
        assert!((scene.clock().elapsed() - 0.05).abs() < 0.0001);
    }

    #[test]
    fn test_long_frame_is_clamped() {
        let mut scene = Scene::default();
        let id = scene.add_dropper(Vec2::new(200.0, 600.0));
        scene.dropper_mut(id).unwrap().pattern = [true; 4];

        // A host stall of ten minutes counts as one clamped frame
        let spawned = scene.advance_clock(600.0);
        assert_eq!(spawned.len(), (MAX_FRAME_DT / 0.5) as usize);
        assert_eq!(scene.balls().len(), spawned.len());
        assert!(scene.clock().elapsed() < scene.clock().period());
    }

    #[test]
    fn test_due_ticks_are_capped() {
        let mut clock = BeatClock::new(6000);
        // 0.01s period: a full second would be 100 ticks
        assert_eq!(clock.advance(1.0), MAX_SUBSTEPS);
        assert!(clock.elapsed() < clock.period());
        assert!(clock.elapsed() >= 0.0);
    }

    #[test]
    fn test_extreme_bpm_returns() {
        let mut scene = Scene::default();
        let id = scene.add_dropper(Vec2::new(200.0, 600.0));
        scene.dropper_mut(id).unwrap().pattern = [true; 4];
        assert!(scene.set_bpm(i32::MAX));

        let spawned = scene.advance_clock(1.0);
        assert_eq!(spawned.len(), MAX_SUBSTEPS as usize);
        assert!(scene.clock().elapsed() < scene.clock().period());
        // Still bounded on the next frame
        assert_eq!(scene.advance_clock(1.0).len(), MAX_SUBSTEPS as usize);
    }

    #[test]
    fn test_non_finite_dt_is_ignored() {
        let mut clock = BeatClock::default();
        assert_eq!(clock.advance(f32::NAN), 0);
        assert_eq!(clock.advance(-1.0), 0);
        assert_eq!(clock.elapsed(), 0.0);
    }

    #[test]
    fn test_deleted_dropper_stops_spawning() {
        let mut scene = Scene::default();
        let id = scene.add_dropper(Vec2::new(200.0, 600.0));
        assert_eq!(scene.beat().len(), 1);

        assert!(scene.remove_dropper(id));
        let spawned: usize = (0..8).map(|_| scene.beat().len()).sum();
        assert_eq!(spawned, 0);
        // The ball from before the delete is still live
        assert_eq!(scene.balls().len(), 1);
    }

    #[test]
    fn test_register_is_idempotent() {
        let mut clock = BeatClock::default();
        clock.register(DropperId(3));
        clock.register(DropperId(3));
        assert_eq!(clock.registered(), &[DropperId(3)]);
        assert!(clock.deregister(DropperId(3)));
        assert!(!clock.deregister(DropperId(3)));
    }
}
