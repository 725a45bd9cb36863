//! The sandbox: items become bodies with sprites and sounds, driven by one
//! cooperative frame loop.

use rand::prelude::*;
use rand_chacha::ChaCha8Rng;

use crate::body::{BodyDesc, BodyId, Material};
use crate::boundary::Viewport;
use crate::config::SandboxConfig;
use crate::error::SandboxError;
use crate::feedback;
use crate::input::{InputEvent, InputQueue};
use crate::item::Item;
use crate::math::Vec2;
use crate::physics::PhysicsWorld;
use crate::presentation::{AssetLoader, Attachment, Canvas, LoadTicket, Presentation, SessionId, SpriteState};

/// What the host should show around the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SandboxStatus {
    /// No items have arrived yet.
    Loading,
    Ready { bodies: usize },
    Disposed,
}

/// Summary of one rendered frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameReport {
    pub steps: u32,
    pub collisions: usize,
    pub cues_played: usize,
    pub sprites_drawn: usize,
}

/// One relax-mode session.
///
/// Dropping the sandbox tears it down.
pub struct Sandbox<A: AssetLoader> {
    config: SandboxConfig,
    session: SessionId,
    world: PhysicsWorld,
    presentation: Presentation<A::Image, A::Audio>,
    assets: A,
    rng: ChaCha8Rng,
    items: Vec<Item>,
    populated: bool,
    input: InputQueue,
    disposed: bool,
}

impl<A: AssetLoader> Sandbox<A> {
    pub fn new(config: SandboxConfig, viewport: Viewport, assets: A) -> Result<Self, SandboxError> {
        config.validate()?;
        let world = PhysicsWorld::new(config.physics.clone(), &config.boundary, viewport)?;
        let session = SessionId::next();
        tracing::info!(?session, seed = config.seed, "[sandbox] created");

        Ok(Self {
            rng: ChaCha8Rng::seed_from_u64(config.seed),
            config,
            session,
            world,
            presentation: Presentation::new(),
            assets,
            items: Vec::new(),
            populated: false,
            input: InputQueue::new(),
            disposed: false,
        })
    }

    /// Handle for event listeners to push input into.
    pub fn input(&self) -> InputQueue {
        self.input.clone()
    }

    pub fn session(&self) -> SessionId {
        self.session
    }

    /// Replaces the item collection. The first non-empty collection triggers
    /// the initial population; later updates only change what double-click
    /// picks from.
    pub fn set_items(&mut self, items: Vec<Item>) {
        if self.disposed {
            return;
        }
        self.items = items;
        if self.populated || self.items.is_empty() {
            if self.items.is_empty() {
                tracing::debug!("[sandbox] no items yet, waiting");
            }
            return;
        }
        self.populate();
    }

    fn populate(&mut self) {
        self.populated = true;

        let count = self.config.spawn.initial_count.min(self.items.len());
        let picks = rand::seq::index::sample(&mut self.rng, self.items.len(), count).into_vec();

        let mut placed: Vec<(Vec2, f32)> = Vec::with_capacity(count);
        for (i, index) in picks.into_iter().enumerate() {
            let item = self.items[index].clone();
            let radius = self.config.spawn.radius_for(item.size);
            let position = self.drop_position(i, radius, &placed);
            match self.spawn(&item, position) {
                Ok(_) => placed.push((position, radius)),
                Err(e) => tracing::warn!(item = %item.id, "[sandbox] initial spawn failed: {e}"),
            }
        }
        tracing::info!(
            spawned = placed.len(),
            available = self.items.len(),
            "[sandbox] initial population"
        );
    }

    /// Start position for the `index`-th initial drop.
    ///
    /// Heights are staggered by `stagger` from `first_drop_height` and never
    /// reach below the ground. A body that would overlap one already placed
    /// is moved to another x in the band, then lifted a row, possibly above
    /// the viewport, until it is clear.
    fn drop_position(&mut self, index: usize, radius: f32, placed: &[(Vec2, f32)]) -> Vec2 {
        const ATTEMPTS_PER_ROW: usize = 8;
        const MAX_ROWS: usize = 256;

        let spawn = &self.config.spawn;
        let (min_x, max_x, ground_y) = self.world.layout().interior();
        let width = self.world.viewport().width;

        let (lo, hi) = if max_x - min_x >= 2.0 * radius {
            let lo = (width * spawn.band.0).max(min_x + radius);
            let hi = (width * spawn.band.1).min(max_x - radius);
            if lo <= hi { (lo, hi) } else { (min_x + radius, max_x - radius) }
        } else {
            let mid = (min_x + max_x) * 0.5;
            (mid, mid)
        };
        let row_step = spawn.stagger.max(radius);
        let mut y = (spawn.first_drop_height + spawn.stagger * index as f32).min(ground_y - radius);

        let clear = |candidate: Vec2| {
            placed
                .iter()
                .all(|(center, r)| center.distance(candidate) >= r + radius)
        };

        for _ in 0..MAX_ROWS {
            for _ in 0..ATTEMPTS_PER_ROW {
                let x = if hi > lo { self.rng.random_range(lo..=hi) } else { lo };
                if clear(Vec2::new(x, y)) {
                    return Vec2::new(x, y);
                }
            }
            y -= row_step;
        }

        let highest = placed
            .iter()
            .map(|(center, r)| center.y - r)
            .fold(y, f32::min);
        Vec2::new((lo + hi) * 0.5, highest - radius)
    }

    /// Creates a body for `item` at `position` with its sprite and sound.
    pub fn spawn(&mut self, item: &Item, position: Vec2) -> Result<BodyId, SandboxError> {
        if self.disposed {
            return Err(SandboxError::Disposed);
        }

        let spawn = &self.config.spawn;
        let physics = &self.config.physics;
        let desc = BodyDesc::dynamic_circle(spawn.radius_for(item.size))
            .position(position)
            .density(spawn.density_for(item.size, item.weight))
            .material(Material {
                restitution: physics.restitution,
                friction: physics.friction,
                air_friction: physics.air_friction,
            });
        let id = self.world.create_body(desc)?;

        let cue = match self.config.feedback.audio_pool.choose(&mut self.rng) {
            Some(locator) => match self.assets.load_audio(locator) {
                Ok(cue) => Some(cue),
                Err(e) => {
                    tracing::warn!(%id, "[sandbox] audio unavailable: {e}");
                    None
                }
            },
            None => None,
        };

        self.presentation.attach(
            id,
            Attachment {
                item_id: item.id.clone(),
                image_url: item.image_url.clone(),
                sprite: SpriteState::Pending,
                cue,
            },
        );
        self.assets.request_image(
            &item.image_url,
            LoadTicket {
                session: self.session,
                body: id,
            },
        );

        tracing::debug!(%id, item = %item.id, size = %item.size, weight = %item.weight, "[sandbox] spawned");
        Ok(id)
    }

    /// Spawns a random item at `position`. Returns `None` when there is
    /// nothing to spawn.
    pub fn spawn_random_at(&mut self, position: Vec2) -> Option<BodyId> {
        if self.disposed {
            return None;
        }
        let Some(item) = self.items.choose(&mut self.rng).cloned() else {
            tracing::debug!("[sandbox] double-click ignored, no items");
            return None;
        };
        match self.spawn(&item, position) {
            Ok(id) => Some(id),
            Err(e) => {
                tracing::warn!(item = %item.id, "[sandbox] spawn failed: {e}");
                None
            }
        }
    }

    /// Removes one body together with its sprite and sound.
    pub fn despawn(&mut self, id: BodyId) -> bool {
        let removed = self.world.remove_body(id).is_some();
        self.presentation.remove(id);
        removed
    }

    /// Completes an image load started by [`AssetLoader::request_image`].
    ///
    /// Results for another session, a torn-down sandbox or a removed body
    /// are discarded. Returns whether the result was kept.
    pub fn sprite_loaded(&mut self, ticket: LoadTicket, result: Result<A::Image, SandboxError>) -> bool {
        if self.disposed || ticket.session != self.session {
            tracing::debug!(body = %ticket.body, "[sandbox] discarding stale image load");
            return false;
        }
        let sprite = match result {
            Ok(image) => SpriteState::Loaded(image),
            Err(e) => {
                tracing::warn!(body = %ticket.body, "[sandbox] {e}");
                SpriteState::Failed
            }
        };
        self.presentation.set_sprite(ticket.body, sprite)
    }

    /// Applies one input event.
    pub fn handle_input(&mut self, event: InputEvent) {
        if self.disposed {
            return;
        }
        match event {
            InputEvent::PointerDown { position } => {
                self.world.pointer_down(position);
            }
            InputEvent::PointerMove { position } => self.world.pointer_move(position),
            InputEvent::PointerUp { position } => {
                self.world.pointer_up(position);
            }
            InputEvent::DoubleClick { position } => {
                if self.world.pick(position).is_none() {
                    self.spawn_random_at(position);
                }
            }
            InputEvent::Resize { width, height } => self.world.resize(Viewport::new(width, height)),
        }
    }

    /// Runs one frame: drain input, catch the simulation up to wall-clock
    /// time, play collision sounds, draw.
    pub fn frame<K>(&mut self, elapsed_ms: f32, canvas: &mut K) -> FrameReport
    where
        K: Canvas<Image = A::Image>,
    {
        if self.disposed {
            return FrameReport::default();
        }

        for event in self.input.drain() {
            self.handle_input(event);
        }

        let steps = self.world.advance(elapsed_ms);
        let events = self.world.drain_events();
        let cues_played =
            feedback::play_collision_cues(&events, &mut self.presentation, &self.config.feedback);
        let sprites_drawn = feedback::render(
            canvas,
            &self.world,
            &self.presentation,
            &self.config.boundary.fill,
        );

        FrameReport {
            steps,
            collisions: events.len(),
            cues_played,
            sprites_drawn,
        }
    }

    /// Stops every sound and removes every body. Safe to call more than once.
    pub fn teardown(&mut self) {
        if self.disposed {
            return;
        }
        self.disposed = true;

        let released = self.presentation.release_all();
        self.world.clear();
        self.input.clear();
        self.items.clear();
        tracing::info!(session = ?self.session, released, "[sandbox] torn down");
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    pub fn status(&self) -> SandboxStatus {
        if self.disposed {
            SandboxStatus::Disposed
        } else if self.items.is_empty() && !self.populated {
            SandboxStatus::Loading
        } else {
            SandboxStatus::Ready {
                bodies: self.world.bodies().dynamic_count(),
            }
        }
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn config(&self) -> &SandboxConfig {
        &self.config
    }

    pub fn world(&self) -> &PhysicsWorld {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut PhysicsWorld {
        &mut self.world
    }

    pub fn presentation(&self) -> &Presentation<A::Image, A::Audio> {
        &self.presentation
    }

    pub fn assets(&self) -> &A {
        &self.assets
    }

    pub fn assets_mut(&mut self) -> &mut A {
        &mut self.assets
    }
}

impl<A: AssetLoader> Drop for Sandbox<A> {
    fn drop(&mut self) {
        self.teardown();
    }
}
