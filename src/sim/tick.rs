//! Frame tick
//!
//! One frame of the session: beats fire, the physics world moves balls and
//! reports contacts, contacts become sounds, and balls that left the play
//! area are dropped.

use super::collision::on_contact;
use super::physics::PhysicsWorld;
use super::state::{Scene, SceneEvent};
use crate::audio::SoundTrigger;

/// What happened during one frame
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrameReport {
    pub balls_spawned: usize,
    pub contacts: usize,
    pub sounds: usize,
    pub balls_culled: usize,
}

/// Advance the scene by one frame of `dt` seconds
pub fn tick(
    scene: &mut Scene,
    physics: &mut dyn PhysicsWorld,
    audio: &mut dyn SoundTrigger,
    dt: f32,
) -> FrameReport {
    let mut report = FrameReport {
        balls_spawned: scene.advance_clock(dt).len(),
        ..Default::default()
    };

    let contacts = physics.step(&mut scene.balls, &scene.lines, dt);
    report.contacts = contacts.len();
    for contact in contacts {
        if on_contact(scene, contact.a, contact.b, audio).is_some() {
            report.sounds += 1;
        }
    }

    report.balls_culled = cull_balls(scene);
    report
}

/// Remove every ball that no longer intersects the play bounds
pub fn cull_balls(scene: &mut Scene) -> usize {
    let bounds = scene.bounds;
    let mut culled = Vec::new();
    scene.balls.retain(|ball| {
        let keep = bounds.intersects_circle(ball.pos, ball.radius);
        if !keep {
            culled.push(ball.id);
        }
        keep
    });

    let count = culled.len();
    scene
        .events
        .extend(culled.into_iter().map(SceneEvent::BallDestroyed));
    count
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::FRAME_DT;
    use crate::sim::input::Mode;
    use crate::sim::physics::GravityWorld;
    use crate::sim::state::{Instrument, MusicNote};
    use glam::Vec2;

    #[derive(Default)]
    struct Recorder {
        keys: Vec<String>,
    }

    impl SoundTrigger for Recorder {
        fn trigger(&mut self, key: &str) {
            self.keys.push(key.to_string());
        }
    }

    #[test]
    fn test_cull_out_of_bounds() {
        let mut scene = Scene::default();
        let dropper = scene.add_dropper(Vec2::new(200.0, 600.0));
        let kept = scene.spawn_ball(dropper).unwrap();
        let lost = scene.spawn_ball(dropper).unwrap();
        scene.ball_mut(lost).unwrap().pos = Vec2::new(200.0, -50.0);
        scene.drain_events();

        assert_eq!(cull_balls(&mut scene), 1);
        assert!(scene.ball(kept).is_some());
        assert!(scene.ball(lost).is_none());
        assert_eq!(scene.drain_events(), vec![SceneEvent::BallDestroyed(lost)]);
    }

    #[test]
    fn test_ball_plays_line_once() {
        let mut scene = Scene::default();
        scene.set_mode(Mode::CreateDropper);
        scene.on_tap(Vec2::new(300.0, 330.0));

        // Sloped line just under the dropper so the ball rolls off the end
        scene.set_mode(Mode::Draw);
        scene.on_tap(Vec2::new(250.0, 300.0));
        scene.on_tap(Vec2::new(400.0, 250.0));
        let line = scene.lines()[0].id;
        scene.configure_line(line, Instrument::Piano, Some(MusicNote::E), None);

        let mut world = GravityWorld::default();
        let mut audio = Recorder::default();
        let mut contacts = 0;

        // First beat fires as soon as one period has elapsed (0.5s at 120 BPM)
        for _ in 0..60 {
            contacts += tick(&mut scene, &mut world, &mut audio, FRAME_DT).contacts;
        }

        assert!(contacts > 1, "ball should touch the line over several steps");
        assert_eq!(audio.keys, vec!["EPiano".to_string()]);
    }

    #[test]
    fn test_ball_survives_dropper_delete() {
        let mut scene = Scene::default();
        scene.set_mode(Mode::CreateDropper);
        scene.on_tap(Vec2::new(300.0, 700.0));
        scene.beat();
        assert_eq!(scene.balls().len(), 1);

        scene.set_mode(Mode::Delete);
        scene.on_tap(Vec2::new(300.0, 700.0));
        assert!(scene.droppers().is_empty());

        let mut world = GravityWorld::default();
        let mut audio = Recorder::default();
        let report = tick(&mut scene, &mut world, &mut audio, FRAME_DT);
        assert_eq!(report.balls_spawned, 0);
        assert_eq!(scene.balls().len(), 1);
    }
}
