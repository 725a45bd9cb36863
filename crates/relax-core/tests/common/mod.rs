//! Mock backends and a sandbox wrapper for integration tests.

#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;

use relax_core::{
    AssetLoader, AudioCue, Canvas, FrameReport, InputEvent, Item, ItemSize, ItemWeight, LoadTicket,
    PHYSICS_DT_MS, Sandbox, SandboxConfig, SandboxError, Vec2, Viewport,
};

/// Observable state of one mock cue, shared with [`MockAssets`].
#[derive(Debug, Default)]
pub struct CueState {
    pub locator: String,
    pub playing: bool,
    pub stopped: bool,
    pub volumes: Vec<f32>,
}

#[derive(Debug)]
pub struct MockCue {
    state: Rc<RefCell<CueState>>,
    reject: bool,
}

impl AudioCue for MockCue {
    fn play_from_start(&mut self, volume: f32) -> Result<(), SandboxError> {
        if self.reject {
            return Err(SandboxError::PlaybackRejected("no user gesture".to_string()));
        }
        let mut state = self.state.borrow_mut();
        state.playing = true;
        state.volumes.push(volume);
        Ok(())
    }

    fn stop(&mut self) {
        let mut state = self.state.borrow_mut();
        state.playing = false;
        state.stopped = true;
    }

    fn is_playing(&self) -> bool {
        self.state.borrow().playing
    }
}

/// Asset loader that records requests; images complete only when a test
/// says so.
#[derive(Debug, Default)]
pub struct MockAssets {
    pub pending_images: Vec<(String, LoadTicket)>,
    pub cues: Vec<Rc<RefCell<CueState>>>,
    pub reject_playback: bool,
    pub fail_audio: bool,
}

impl AssetLoader for MockAssets {
    type Image = String;
    type Audio = MockCue;

    fn load_audio(&mut self, locator: &str) -> Result<MockCue, SandboxError> {
        if self.fail_audio {
            return Err(SandboxError::audio_load(locator, "unsupported format"));
        }
        let state = Rc::new(RefCell::new(CueState {
            locator: locator.to_string(),
            ..CueState::default()
        }));
        self.cues.push(Rc::clone(&state));
        Ok(MockCue {
            state,
            reject: self.reject_playback,
        })
    }

    fn request_image(&mut self, url: &str, ticket: LoadTicket) {
        self.pending_images.push((url.to_string(), ticket));
    }
}

impl MockAssets {
    pub fn playing_count(&self) -> usize {
        self.cues.iter().filter(|cue| cue.borrow().playing).count()
    }

    pub fn total_plays(&self) -> usize {
        self.cues.iter().map(|cue| cue.borrow().volumes.len()).sum()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DrawnSprite {
    pub image: String,
    pub center: Vec2,
    pub angle: f32,
    pub diameter: f32,
}

/// Canvas that records the calls of the last frame.
#[derive(Debug, Default)]
pub struct RecordingCanvas {
    pub clears: usize,
    pub fills: Vec<(Vec2, Vec2, String)>,
    pub sprites: Vec<DrawnSprite>,
}

impl Canvas for RecordingCanvas {
    type Image = String;

    fn clear(&mut self, _viewport: Viewport) {
        self.clears += 1;
        self.fills.clear();
        self.sprites.clear();
    }

    fn fill_rect(&mut self, center: Vec2, half_extents: Vec2, fill: &str) {
        self.fills.push((center, half_extents, fill.to_string()));
    }

    fn draw_sprite(&mut self, image: &String, center: Vec2, angle: f32, diameter: f32) {
        self.sprites.push(DrawnSprite {
            image: image.clone(),
            center,
            angle,
            diameter,
        });
    }
}

pub fn item(id: &str, size: ItemSize, weight: ItemWeight) -> Item {
    Item::new(id, format!("/images/{id}.png"), size, weight)
}

pub fn rocks(n: usize) -> Vec<Item> {
    (0..n)
        .map(|i| {
            let size = ItemSize::ALL[i % 3];
            let weight = ItemWeight::ALL[(i / 3) % 3];
            item(&format!("rock-{i}"), size, weight)
        })
        .collect()
}

/// A sandbox on an 800x800 viewport with mock backends.
pub struct TestSandbox {
    pub sandbox: Sandbox<MockAssets>,
    pub canvas: RecordingCanvas,
}

impl TestSandbox {
    pub fn new() -> Self {
        Self::with_config(SandboxConfig::default())
    }

    pub fn with_seed(seed: u64) -> Self {
        Self::with_config(SandboxConfig {
            seed,
            ..SandboxConfig::default()
        })
    }

    pub fn with_config(config: SandboxConfig) -> Self {
        Self::with_assets(config, MockAssets::default())
    }

    pub fn with_assets(config: SandboxConfig, assets: MockAssets) -> Self {
        Self::with_viewport(config, Viewport::new(800.0, 800.0), assets)
    }

    pub fn with_viewport(config: SandboxConfig, viewport: Viewport, assets: MockAssets) -> Self {
        let sandbox =
            Sandbox::new(config, viewport, assets).expect("default test config is valid");
        Self {
            sandbox,
            canvas: RecordingCanvas::default(),
        }
    }

    /// Runs one frame lasting exactly one sub-step.
    pub fn frame(&mut self) -> FrameReport {
        self.sandbox.frame(PHYSICS_DT_MS, &mut self.canvas)
    }

    pub fn frames(&mut self, n: usize) -> Vec<FrameReport> {
        (0..n).map(|_| self.frame()).collect()
    }

    pub fn push(&self, event: InputEvent) {
        self.sandbox.input().push(event);
    }

    /// Completes every pending image load successfully. Returns how many
    /// results the sandbox kept.
    pub fn complete_images(&mut self) -> usize {
        let pending = std::mem::take(&mut self.sandbox.assets_mut().pending_images);
        pending
            .into_iter()
            .filter(|(url, ticket)| self.sandbox.sprite_loaded(*ticket, Ok(url.clone())))
            .count()
    }

    pub fn assets(&self) -> &MockAssets {
        self.sandbox.assets()
    }

    /// Dynamic body positions and radii in id order.
    pub fn circles(&self) -> Vec<(Vec2, f32)> {
        let mut circles = Vec::new();
        self.sandbox.world().for_each_dynamic(|body| {
            circles.push((body.position, body.radius().unwrap_or(0.0)));
        });
        circles
    }

    pub fn dynamic_count(&self) -> usize {
        self.sandbox.world().bodies().dynamic_count()
    }
}
