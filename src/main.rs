//! Musical Drops headless session
//!
//! Lays out a seeded random scene through the same commands a UI would send,
//! runs the fixed-step loop with the reference physics world, and reports
//! which sounds played.

use std::path::Path;

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use musical_drops::sim::{
    Command, DrumType, Instrument, Mode, MusicNote, Scene, SceneEvent, tick,
};
use musical_drops::{Settings, SoundBank};

const DROPPER_COUNT: usize = 3;
const LINE_COUNT: usize = 8;

fn main() {
    env_logger::init();
    log::info!("Musical Drops (headless) starting...");

    let settings = match std::env::args().nth(1) {
        Some(path) => Settings::load(Path::new(&path)),
        None => Settings::from_env(),
    };

    let mut scene = settings.build_scene();
    let mut rng = Pcg32::seed_from_u64(settings.demo_seed);
    build_scene(&mut scene, &mut rng, &settings);
    log::info!(
        "Scene ready: {} droppers, {} lines at {} BPM",
        scene.droppers().len(),
        scene.lines().len(),
        scene.bpm()
    );

    let mut world = settings.build_world();
    let mut audio = SoundBank::new();
    audio.set_master_volume(settings.master_volume);
    audio.set_sfx_volume(settings.sfx_volume);
    audio.set_muted(settings.muted);

    let dt = settings.frame_dt();
    let frames = (settings.demo_seconds / dt).round() as u32;
    let tempo_change_frame = frames / 2;
    let mut spawned = 0;
    let mut culled = 0;

    for frame in 0..frames {
        if frame == tempo_change_frame {
            // Speed up halfway through; the bar position carries over
            let faster = scene.bpm() as i32 + 30;
            scene.apply(Command::SetBpm(faster));
        }

        let report = tick(&mut scene, &mut world, &mut audio, dt);
        spawned += report.balls_spawned;
        culled += report.balls_culled;

        for event in scene.drain_events() {
            if let SceneEvent::SoundTriggered { ball, line, key } = event {
                log::debug!("frame {}: ball {} played {} on line {}", frame, ball.0, key, line.0);
            }
        }
    }

    println!(
        "Ran {:.1}s: {} balls spawned, {} left the scene, {} still falling",
        settings.demo_seconds,
        spawned,
        culled,
        scene.balls().len()
    );
    println!("Sounds played: {}", audio.total_plays());
    for (key, count) in audio.plays() {
        println!("  {key:<8} {count}");
    }
}

/// Place droppers along the top and lines below them, configuring each as a user would
fn build_scene(scene: &mut Scene, rng: &mut Pcg32, settings: &Settings) {
    let width = settings.scene_width;
    let height = settings.scene_height;

    scene.apply(Command::SetMode(Mode::CreateDropper));
    for i in 0..DROPPER_COUNT {
        let slot_width = width / DROPPER_COUNT as f32;
        let x = slot_width * (i as f32 + rng.random_range(0.3..0.7));
        let y = height * rng.random_range(0.8..0.95);
        scene.apply(Command::Tap(Vec2::new(x, y)));
    }

    scene.apply(Command::SetMode(Mode::Draw));
    for _ in 0..LINE_COUNT {
        let start = Vec2::new(
            rng.random_range(0.0..width),
            height * rng.random_range(0.1..0.7),
        );
        let end = start
            + Vec2::new(
                rng.random_range(80.0..260.0) * if rng.random_bool(0.5) { 1.0 } else { -1.0 },
                rng.random_range(-60.0..60.0),
            );
        scene.apply(Command::Tap(start));
        scene.apply(Command::Tap(end));

        let Some(line) = scene.selection().line() else {
            continue;
        };
        let instrument = Instrument::ALL[rng.random_range(0..Instrument::ALL.len())];
        let note = MusicNote::ALL[rng.random_range(0..MusicNote::ALL.len())];
        let drum_type = DrumType::ALL[rng.random_range(0..DrumType::ALL.len())];
        scene.apply(Command::ConfigureLine {
            line,
            instrument,
            note: Some(note),
            drum_type: Some(drum_type),
        });
    }

    // Give each dropper its own rhythm
    scene.apply(Command::SetMode(Mode::Edit));
    let anchors: Vec<Vec2> = scene.droppers().iter().map(|d| d.pos).collect();
    for anchor in anchors {
        scene.apply(Command::Tap(anchor));
        let Some(dropper) = scene.selection().dropper() else {
            continue;
        };
        let mut pattern = [false; 4];
        for beat in pattern.iter_mut() {
            *beat = rng.random_bool(0.4);
        }
        pattern[rng.random_range(0..pattern.len())] = true;
        scene.apply(Command::ConfigureDropper { dropper, pattern });
    }

    scene.apply(Command::SetMode(Mode::Draw));
    scene.drain_events();
}
