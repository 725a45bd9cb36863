//! Spawning, loading, sound and teardown of a whole sandbox.

mod common;

use common::{MockAssets, TestSandbox, item, rocks};
use relax_core::{
    InputEvent, ItemSize, ItemWeight, Sandbox, SandboxConfig, SandboxError, SandboxStatus, Vec2,
    Viewport,
};

#[test]
fn test_empty_collection_spawns_nothing_until_items_arrive() {
    let mut t = TestSandbox::new();
    t.sandbox.set_items(Vec::new());
    assert_eq!(t.sandbox.status(), SandboxStatus::Loading);

    let reports = t.frames(10);
    assert_eq!(t.dynamic_count(), 0);
    assert!(reports.iter().all(|r| r.sprites_drawn == 0));
    assert!(t.canvas.sprites.is_empty());
    assert!(t.assets().pending_images.is_empty());

    t.sandbox.set_items(vec![item("only", ItemSize::Small, ItemWeight::Mid)]);
    assert_eq!(t.dynamic_count(), 1);
    assert_eq!(t.assets().pending_images.len(), 1);
    assert_eq!(t.sandbox.status(), SandboxStatus::Ready { bodies: 1 });

    // Later updates do not repopulate.
    t.sandbox.set_items(rocks(5));
    assert_eq!(t.dynamic_count(), 1);
}

#[test]
fn test_initial_population_is_bounded() {
    let mut t = TestSandbox::new();
    t.sandbox.set_items(rocks(30));
    assert_eq!(t.dynamic_count(), 12);

    let mut few = TestSandbox::new();
    few.sandbox.set_items(rocks(4));
    assert_eq!(few.dynamic_count(), 4);
}

#[test]
fn test_initial_drops_are_staggered_inside_band() {
    let mut t = TestSandbox::new();
    t.sandbox.set_items(rocks(5));

    let circles = t.circles();
    assert_eq!(circles.len(), 5);
    assert_eq!(circles[0].0.y, 100.0);
    let (_, _, ground_y) = t.sandbox.world().layout().interior();
    for (center, radius) in circles {
        assert!((240.0..=560.0).contains(&center.x), "x {}", center.x);
        assert!(center.y + radius <= ground_y);
    }
}

fn assert_spawned_apart(viewport: Viewport, seed: u64) {
    let config = SandboxConfig {
        seed,
        ..SandboxConfig::default()
    };
    let mut t = TestSandbox::with_viewport(config, viewport, MockAssets::default());
    t.sandbox.set_items(rocks(12));

    let circles = t.circles();
    assert_eq!(circles.len(), 12);
    let (min_x, max_x, ground_y) = t.sandbox.world().layout().interior();
    for (i, (a, ra)) in circles.iter().enumerate() {
        assert!(a.x - ra >= min_x && a.x + ra <= max_x, "seed {seed}: x {a}");
        assert!(a.y + ra <= ground_y, "seed {seed}: {a} starts in the ground");
        for (b, rb) in &circles[i + 1..] {
            assert!(
                a.distance(*b) >= ra + rb - 1e-3,
                "seed {seed}: {a} r={ra} overlaps {b} r={rb}"
            );
        }
    }
}

#[test]
fn test_initial_population_does_not_overlap() {
    for seed in [12345, 1, 2, 3, 42] {
        assert_spawned_apart(Viewport::new(800.0, 800.0), seed);
    }
}

#[test]
fn test_initial_population_fits_short_viewport() {
    for seed in [12345, 1, 2, 3, 42] {
        assert_spawned_apart(Viewport::new(800.0, 400.0), seed);
    }
}

#[test]
fn test_cues_come_from_pool() {
    let mut t = TestSandbox::new();
    t.sandbox.set_items(rocks(12));

    let pool = &t.sandbox.config().feedback.audio_pool;
    let cues = &t.assets().cues;
    assert_eq!(cues.len(), 12);
    let mut used: Vec<String> = cues.iter().map(|cue| cue.borrow().locator.clone()).collect();
    assert!(used.iter().all(|locator| pool.contains(locator)));
    used.sort();
    used.dedup();
    assert!(used.len() > 1, "every body got {used:?}");
}

#[test]
fn test_spawn_maps_size_and_weight() {
    let mut t = TestSandbox::new();
    let large = t
        .sandbox
        .spawn(&item("big", ItemSize::Large, ItemWeight::Heavy), Vec2::new(400.0, 200.0))
        .unwrap();
    let small = t
        .sandbox
        .spawn(&item("tiny", ItemSize::Small, ItemWeight::Light), Vec2::new(200.0, 200.0))
        .unwrap();

    let world = t.sandbox.world();
    assert_eq!(world.body(large).unwrap().radius(), Some(75.0));
    assert_eq!(world.body(small).unwrap().radius(), Some(30.0));
    assert!((world.body(large).unwrap().density() - 0.0075).abs() < 1e-7);
    assert!((world.body(small).unwrap().density() - 0.0006).abs() < 1e-7);

    let attachment = t.sandbox.presentation().get(large).unwrap();
    assert_eq!(attachment.item_id, "big");
    assert!(attachment.cue.is_some());
}

#[test]
fn test_sprites_drawn_only_after_load() {
    let mut t = TestSandbox::new();
    t.sandbox.set_items(rocks(3));

    let report = t.frame();
    assert_eq!(report.sprites_drawn, 0);
    assert_eq!(t.canvas.fills.len(), 3);

    assert_eq!(t.complete_images(), 3);
    let report = t.frame();
    assert_eq!(report.sprites_drawn, 3);
    assert_eq!(t.canvas.sprites.len(), 3);
    for sprite in &t.canvas.sprites {
        assert!([60.0, 100.0, 150.0].contains(&sprite.diameter));
        assert!(sprite.image.starts_with("/images/rock-"));
    }
    let mut bodies = Vec::new();
    t.sandbox.world().for_each_dynamic(|body| bodies.push(body.pose()));
    for (sprite, pose) in t.canvas.sprites.iter().zip(&bodies) {
        assert_eq!(sprite.center, pose.position);
        assert_eq!(sprite.angle, pose.angle);
    }
    assert!(t.canvas.fills.iter().all(|(_, _, fill)| fill == "rgba(139, 92, 69, 0.3)"));
}

#[test]
fn test_sprite_follows_rolling_body() {
    let mut t = TestSandbox::new();
    let (_, _, ground_y) = t.sandbox.world().layout().interior();
    let id = t
        .sandbox
        .spawn(&item("roller", ItemSize::Medium, ItemWeight::Mid), Vec2::new(200.0, ground_y - 50.0))
        .unwrap();
    t.complete_images();
    t.sandbox.world_mut().set_velocity(id, Vec2::new(8.0, 0.0));
    t.frames(30);

    let body = t.sandbox.world().body(id).unwrap();
    assert!(body.angle.abs() > 0.01, "body did not roll: angle {}", body.angle);
    assert_eq!(t.canvas.sprites.len(), 1);
    let sprite = &t.canvas.sprites[0];
    assert_eq!(sprite.center, body.position);
    assert_eq!(sprite.angle, body.angle);
    assert_eq!(sprite.diameter, 100.0);
}

#[test]
fn test_failed_image_is_skipped_but_simulated() {
    let mut t = TestSandbox::new();
    t.sandbox.set_items(vec![item("broken", ItemSize::Medium, ItemWeight::Mid)]);

    let (url, ticket) = t.sandbox.assets_mut().pending_images.remove(0);
    assert!(t.sandbox.sprite_loaded(ticket, Err(SandboxError::image_load(url, "404"))));

    let start = t.sandbox.world().pose(ticket.body).unwrap().position;
    let reports = t.frames(30);
    assert!(reports.iter().all(|r| r.sprites_drawn == 0));
    assert!(t.sandbox.world().pose(ticket.body).unwrap().position.y > start.y);
}

#[test]
fn test_hard_impacts_play_sounds_at_capped_volume() {
    let mut t = TestSandbox::new();
    t.sandbox.set_items(rocks(3));
    t.frames(240);

    assert!(t.assets().total_plays() > 0);
    for cue in &t.assets().cues {
        for volume in &cue.borrow().volumes {
            assert!(*volume > 0.1 && *volume <= 0.5, "volume {volume}");
        }
    }
}

#[test]
fn test_resting_bodies_are_silent() {
    let mut t = TestSandbox::new();
    t.sandbox.set_items(rocks(2));
    t.frames(900);

    let plays = t.assets().total_plays();
    let reports = t.frames(120);
    assert!(reports.iter().all(|r| r.cues_played == 0));
    assert_eq!(t.assets().total_plays(), plays);
}

#[test]
fn test_rejected_playback_is_swallowed() {
    let assets = MockAssets {
        reject_playback: true,
        ..MockAssets::default()
    };
    let mut t = TestSandbox::with_assets(SandboxConfig::default(), assets);
    t.sandbox.set_items(rocks(3));

    let reports = t.frames(240);
    assert!(reports.iter().all(|r| r.steps == 1 && r.cues_played == 0));
    assert!(reports.iter().any(|r| r.collisions > 0));
    assert_eq!(t.assets().playing_count(), 0);
}

#[test]
fn test_missing_audio_still_spawns() {
    let assets = MockAssets {
        fail_audio: true,
        ..MockAssets::default()
    };
    let mut t = TestSandbox::with_assets(SandboxConfig::default(), assets);
    t.sandbox.set_items(rocks(2));

    assert_eq!(t.dynamic_count(), 2);
    t.sandbox.world().for_each_dynamic(|body| {
        assert!(t.sandbox.presentation().get(body.id()).unwrap().cue.is_none());
    });
    t.frames(120);
}

#[test]
fn test_double_click_spawns_only_on_empty_space() {
    let mut t = TestSandbox::new();
    t.sandbox.set_items(vec![item("only", ItemSize::Large, ItemWeight::Mid)]);
    t.frame();
    assert_eq!(t.dynamic_count(), 1);

    let occupied = t
        .sandbox
        .world()
        .bodies()
        .iter()
        .find(|b| b.is_dynamic())
        .unwrap()
        .position;
    t.push(InputEvent::DoubleClick { position: occupied });
    t.frame();
    assert_eq!(t.dynamic_count(), 1);

    t.push(InputEvent::DoubleClick {
        position: Vec2::new(100.0, 100.0),
    });
    t.frame();
    assert_eq!(t.dynamic_count(), 2);
}

#[test]
fn test_double_click_without_items_does_nothing() {
    let mut t = TestSandbox::new();
    t.push(InputEvent::DoubleClick {
        position: Vec2::new(100.0, 100.0),
    });
    t.frame();
    assert_eq!(t.dynamic_count(), 0);
}

#[test]
fn test_resize_event_moves_boundaries() {
    let mut t = TestSandbox::new();
    t.sandbox.set_items(rocks(3));
    t.push(InputEvent::Resize {
        width: 500.0,
        height: 600.0,
    });
    t.frame();

    let world = t.sandbox.world();
    assert_eq!(world.viewport(), Viewport::new(500.0, 600.0));
    let (_, max_x, ground_y) = world.layout().interior();
    assert_eq!((max_x, ground_y), (480.0, 580.0));
    world.for_each_dynamic(|body| assert!(body.position.x <= max_x));
}

#[test]
fn test_teardown_stops_audio_and_removes_bodies() {
    let mut t = TestSandbox::new();
    t.sandbox.set_items(rocks(12));
    t.complete_images();
    t.frames(240);
    assert!(t.assets().playing_count() > 0);

    t.sandbox.teardown();

    assert_eq!(t.assets().playing_count(), 0);
    assert!(t.assets().cues.iter().all(|cue| cue.borrow().stopped));
    assert!(t.sandbox.world().bodies().is_empty());
    assert!(t.sandbox.presentation().is_empty());
    assert_eq!(t.sandbox.status(), SandboxStatus::Disposed);

    // Safe to repeat, and the loop is inert afterwards.
    t.sandbox.teardown();
    let report = t.frame();
    assert_eq!(report, Default::default());
    assert!(t.sandbox.spawn_random_at(Vec2::new(100.0, 100.0)).is_none());
    assert!(matches!(
        t.sandbox.spawn(&item("late", ItemSize::Small, ItemWeight::Mid), Vec2::ZERO),
        Err(SandboxError::Disposed)
    ));
}

#[test]
fn test_image_loads_after_teardown_are_discarded() {
    let mut t = TestSandbox::new();
    t.sandbox.set_items(rocks(4));
    let pending = std::mem::take(&mut t.sandbox.assets_mut().pending_images);

    t.sandbox.teardown();

    for (url, ticket) in pending {
        assert!(!t.sandbox.sprite_loaded(ticket, Ok(url)));
    }
    assert!(t.sandbox.presentation().is_empty());
}

#[test]
fn test_image_loads_from_other_session_are_discarded() {
    let mut old = TestSandbox::new();
    old.sandbox.set_items(rocks(1));
    let (url, ticket) = old.sandbox.assets_mut().pending_images.remove(0);
    drop(old);

    let mut t = TestSandbox::new();
    t.sandbox.set_items(rocks(1));
    assert!(!t.sandbox.sprite_loaded(ticket, Ok(url)));
    assert_eq!(t.complete_images(), 1);
}

#[test]
fn test_dropping_sandbox_tears_down() {
    let assets = MockAssets::default();
    let mut sandbox =
        Sandbox::new(SandboxConfig::default(), Viewport::new(800.0, 800.0), assets).unwrap();
    sandbox.set_items(rocks(3));
    let cues = sandbox.assets().cues.clone();
    for cue in &cues {
        cue.borrow_mut().playing = true;
    }

    drop(sandbox);
    assert!(cues.iter().all(|cue| !cue.borrow().playing));
}

#[test]
fn test_invalid_config_rejected_at_construction() {
    let mut config = SandboxConfig::default();
    config.physics.step_ms = -1.0;
    let result = Sandbox::new(config, Viewport::new(800.0, 800.0), MockAssets::default());
    assert!(matches!(result, Err(SandboxError::InvalidConfig(_))));
}

#[test]
fn test_despawn_releases_pair() {
    let mut t = TestSandbox::new();
    let id = t
        .sandbox
        .spawn(&item("rock", ItemSize::Small, ItemWeight::Mid), Vec2::new(300.0, 300.0))
        .unwrap();
    assert!(t.sandbox.despawn(id));
    assert!(t.sandbox.world().body(id).is_none());
    assert!(t.sandbox.presentation().get(id).is_none());
    assert!(t.assets().cues[0].borrow().stopped);
    assert!(!t.sandbox.despawn(id));
}
