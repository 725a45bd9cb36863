//! Per-body sprite and audio state, and the backend traits that provide them.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::body::BodyId;
use crate::boundary::Viewport;
use crate::error::SandboxError;
use crate::math::Vec2;

/// A playable sound clip owned by one body.
pub trait AudioCue {
    /// Rewinds and plays at `volume` in `[0, 1]`.
    fn play_from_start(&mut self, volume: f32) -> Result<(), SandboxError>;

    /// Stops playback and releases the clip.
    fn stop(&mut self);

    fn is_playing(&self) -> bool;
}

/// Loads sprite images and audio cues.
pub trait AssetLoader {
    type Image;
    type Audio: AudioCue;

    /// Creates an audio cue for `locator`. Playback may start later, once
    /// the clip has buffered.
    fn load_audio(&mut self, locator: &str) -> Result<Self::Audio, SandboxError>;

    /// Starts loading an image. The result is handed back to
    /// [`crate::Sandbox::sprite_loaded`] together with `ticket`.
    fn request_image(&mut self, url: &str, ticket: LoadTicket);
}

/// Drawing surface.
pub trait Canvas {
    type Image;

    fn clear(&mut self, viewport: Viewport);

    /// Fills an axis-aligned box with a CSS color.
    fn fill_rect(&mut self, center: Vec2, half_extents: Vec2, fill: &str);

    /// Draws `image` centered on `center`, rotated by `angle` radians and
    /// scaled to a square of side `diameter`.
    fn draw_sprite(&mut self, image: &Self::Image, center: Vec2, angle: f32, diameter: f32);
}

static NEXT_SESSION: AtomicU64 = AtomicU64::new(1);

/// Identity of one sandbox instance. Deferred completions carry it so that
/// results from a torn-down sandbox can be recognised and dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(u64);

impl SessionId {
    pub fn next() -> Self {
        Self(NEXT_SESSION.fetch_add(1, Ordering::Relaxed))
    }
}

/// Tag attached to an asynchronous image load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LoadTicket {
    pub session: SessionId,
    pub body: BodyId,
}

/// Loading state of a sprite image.
#[derive(Debug)]
pub enum SpriteState<I> {
    Pending,
    Loaded(I),
    Failed,
}

impl<I> SpriteState<I> {
    pub fn image(&self) -> Option<&I> {
        match self {
            Self::Loaded(image) => Some(image),
            Self::Pending | Self::Failed => None,
        }
    }
}

/// Sprite and audio attached to one dynamic body.
#[derive(Debug)]
pub struct Attachment<I, C> {
    pub item_id: String,
    pub image_url: String,
    pub sprite: SpriteState<I>,
    pub cue: Option<C>,
}

/// Arena of attachments keyed by body id.
///
/// Iteration is in ascending id order, matching the body store.
#[derive(Debug)]
pub struct Presentation<I, C> {
    attachments: BTreeMap<BodyId, Attachment<I, C>>,
}

impl<I, C> Default for Presentation<I, C> {
    fn default() -> Self {
        Self {
            attachments: BTreeMap::new(),
        }
    }
}

impl<I, C: AudioCue> Presentation<I, C> {
    /// Empty arena.
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn attach(&mut self, body: BodyId, attachment: Attachment<I, C>) {
        self.attachments.insert(body, attachment);
    }

    /// Stores a finished image load. Returns false if the body is gone.
    pub(crate) fn set_sprite(&mut self, body: BodyId, sprite: SpriteState<I>) -> bool {
        match self.attachments.get_mut(&body) {
            Some(attachment) => {
                attachment.sprite = sprite;
                true
            }
            None => false,
        }
    }

    /// Attachment of a body.
    pub fn get(&self, body: BodyId) -> Option<&Attachment<I, C>> {
        self.attachments.get(&body)
    }

    pub(crate) fn cue_mut(&mut self, body: BodyId) -> Option<&mut C> {
        self.attachments.get_mut(&body)?.cue.as_mut()
    }

    /// Loaded image of a body, if any.
    pub fn sprite(&self, body: BodyId) -> Option<&I> {
        self.attachments.get(&body)?.sprite.image()
    }

    /// Stops the cue and drops the attachment.
    pub(crate) fn remove(&mut self, body: BodyId) -> Option<Attachment<I, C>> {
        let mut attachment = self.attachments.remove(&body)?;
        if let Some(cue) = attachment.cue.as_mut() {
            cue.stop();
        }
        Some(attachment)
    }

    /// Stops every cue and drops every attachment.
    pub(crate) fn release_all(&mut self) -> usize {
        let count = self.attachments.len();
        for attachment in self.attachments.values_mut() {
            if let Some(cue) = attachment.cue.as_mut() {
                cue.stop();
            }
        }
        self.attachments.clear();
        count
    }

    /// Attachments in id order.
    pub fn iter(&self) -> impl Iterator<Item = (BodyId, &Attachment<I, C>)> {
        self.attachments.iter().map(|(id, attachment)| (*id, attachment))
    }

    /// Number of attachments.
    pub fn len(&self) -> usize {
        self.attachments.len()
    }

    /// True when nothing is attached.
    pub fn is_empty(&self) -> bool {
        self.attachments.is_empty()
    }

    /// Cues currently playing.
    pub fn playing_count(&self) -> usize {
        self.attachments
            .values()
            .filter(|attachment| attachment.cue.as_ref().is_some_and(AudioCue::is_playing))
            .count()
    }

    /// Sprites that finished loading.
    pub fn loaded_count(&self) -> usize {
        self.attachments
            .values()
            .filter(|attachment| attachment.sprite.image().is_some())
            .count()
    }
}
