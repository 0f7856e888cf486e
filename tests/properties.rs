//! Property tests for timing, dedup and selection rules

use glam::Vec2;
use proptest::prelude::*;

use musical_drops::SoundTrigger;
use musical_drops::sim::{BodyRef, Command, Mode, Scene, on_contact};

#[derive(Default)]
struct Recorder {
    keys: Vec<String>,
}

impl SoundTrigger for Recorder {
    fn trigger(&mut self, key: &str) {
        self.keys.push(key.to_string());
    }
}

fn mode_strategy() -> impl Strategy<Value = Mode> {
    prop_oneof![
        Just(Mode::Draw),
        Just(Mode::CreateDropper),
        Just(Mode::Edit),
        Just(Mode::Delete),
    ]
}

fn point_strategy() -> impl Strategy<Value = Vec2> {
    // Coarse grid so taps often land on existing entities
    (0u32..16, 0u32..9).prop_map(|(x, y)| Vec2::new(x as f32 * 80.0, y as f32 * 80.0))
}

proptest! {
    #[test]
    fn period_is_sixty_over_bpm(bpm in 1i32..=600) {
        let mut scene = Scene::default();
        prop_assert!(scene.set_bpm(bpm));
        prop_assert_eq!(scene.clock().period(), 60.0 / bpm as f32);
    }

    #[test]
    fn tempo_change_preserves_slot(beats in 0usize..20, bpm in 1i32..=600) {
        let mut scene = Scene::default();
        for _ in 0..beats {
            scene.beat();
        }
        let slot = scene.beat_slot();
        scene.set_bpm(bpm);
        prop_assert_eq!(scene.beat_slot(), slot);
        prop_assert_eq!(slot as usize, beats % 4);
    }

    #[test]
    fn non_positive_bpm_is_rejected(bpm in i32::MIN..=0) {
        let mut scene = Scene::default();
        prop_assert!(!scene.set_bpm(bpm));
        prop_assert_eq!(scene.bpm(), 120);
    }

    #[test]
    fn default_pattern_fires_once_per_bar(ticks in 0usize..64) {
        let mut scene = Scene::default();
        scene.apply(Command::SetMode(Mode::CreateDropper));
        scene.apply(Command::Tap(Vec2::new(600.0, 650.0)));

        let spawned: usize = (0..ticks).map(|_| scene.beat().len()).sum();
        prop_assert_eq!(spawned, ticks.div_ceil(4));
    }

    #[test]
    fn repeated_contacts_trigger_once(repeats in 1usize..50, swap in any::<bool>()) {
        let mut scene = Scene::default();
        scene.apply(Command::SetMode(Mode::CreateDropper));
        scene.apply(Command::Tap(Vec2::new(100.0, 500.0)));
        scene.apply(Command::SetMode(Mode::Draw));
        scene.apply(Command::Tap(Vec2::new(0.0, 300.0)));
        scene.apply(Command::Tap(Vec2::new(300.0, 300.0)));
        let line = scene.lines()[0].id;
        let ball = scene.beat()[0];

        let mut audio = Recorder::default();
        for i in 0..repeats {
            let (a, b) = if swap ^ (i % 2 == 0) {
                (BodyRef::Ball(ball), BodyRef::Line(line))
            } else {
                (BodyRef::Line(line), BodyRef::Ball(ball))
            };
            on_contact(&mut scene, a, b, &mut audio);
        }
        prop_assert_eq!(audio.keys.len(), 1);
    }

    #[test]
    fn selection_never_holds_both(
        steps in prop::collection::vec((mode_strategy(), point_strategy()), 1..60)
    ) {
        let mut scene = Scene::default();
        for (mode, point) in steps {
            if scene.mode() != mode {
                scene.apply(Command::SetMode(mode));
            }
            scene.apply(Command::Tap(point));

            let snapshot = scene.snapshot();
            prop_assert!(
                snapshot.selected_line().is_none() || snapshot.selected_dropper().is_none()
            );
            if let Some(line) = snapshot.selected_line() {
                prop_assert!(scene.line(line).is_some());
            }
            if let Some(dropper) = snapshot.selected_dropper() {
                prop_assert!(scene.dropper(dropper).is_some());
            }
            prop_assert_eq!(scene.clock().registered().len(), scene.droppers().len());
        }
    }
}
