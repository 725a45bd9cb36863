//! Per-frame drawing and collision sounds.

use std::collections::BTreeMap;

use crate::body::BodyId;
use crate::config::FeedbackConfig;
use crate::events::CollisionEvent;
use crate::physics::PhysicsWorld;
use crate::presentation::{AudioCue, Canvas, Presentation};

/// Playback volume for an impact, or `None` if it should stay silent.
///
/// Volume grows linearly with speed and is capped at `max_volume`.
pub fn impact_volume(speed: f32, config: &FeedbackConfig) -> Option<f32> {
    if !speed.is_finite() || speed <= config.min_impact_speed {
        return None;
    }
    Some((speed / config.volume_divisor).min(config.max_volume))
}

/// Restarts the cue of every body hit hard enough this frame.
///
/// A body hit several times in one frame plays once, at the loudest impact.
/// Returns how many cues were started.
pub fn play_collision_cues<I, C: AudioCue>(
    events: &[CollisionEvent],
    presentation: &mut Presentation<I, C>,
    config: &FeedbackConfig,
) -> usize {
    let mut loudest: BTreeMap<BodyId, f32> = BTreeMap::new();
    for event in events {
        let Some(volume) = impact_volume(event.relative_speed, config) else {
            continue;
        };
        for body in [event.body_a, event.body_b] {
            if presentation.get(body).is_none() {
                continue;
            }
            let entry = loudest.entry(body).or_insert(volume);
            *entry = entry.max(volume);
        }
    }

    let mut played = 0;
    for (body, volume) in loudest {
        let Some(cue) = presentation.cue_mut(body) else {
            continue;
        };
        match cue.play_from_start(volume) {
            Ok(()) => played += 1,
            Err(e) => tracing::debug!(%body, volume, "[feedback] playback swallowed: {e}"),
        }
    }
    played
}

/// Draws the boundaries, then every loaded sprite in id order. Returns the
/// number of sprites drawn.
pub fn render<I, C, K>(
    canvas: &mut K,
    world: &PhysicsWorld,
    presentation: &Presentation<I, C>,
    boundary_fill: &str,
) -> usize
where
    C: AudioCue,
    K: Canvas<Image = I>,
{
    canvas.clear(world.viewport());

    for id in world.boundary_ids() {
        if let Some(body) = world.body(id) {
            canvas.fill_rect(body.position, body.shape().half_size(), boundary_fill);
        }
    }

    let mut drawn = 0;
    world.for_each_dynamic(|body| {
        let (Some(image), Some(radius)) = (presentation.sprite(body.id()), body.radius()) else {
            return;
        };
        canvas.draw_sprite(image, body.position, body.angle, radius * 2.0);
        drawn += 1;
    });
    drawn
}
