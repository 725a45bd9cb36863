//! Tuning values for the sandbox.
//!
//! Every section deserializes with defaults, so a partial JSON document only
//! needs to name the values it overrides.

use serde::{Deserialize, Serialize};

use crate::error::SandboxError;
use crate::item::{ItemSize, ItemWeight};
use crate::math::{CombineRule, Vec2};

/// Fixed sub-step length in milliseconds.
pub const PHYSICS_DT_MS: f32 = 1000.0 / 60.0;

/// Top-level sandbox configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SandboxConfig {
    pub physics: PhysicsConfig,
    pub boundary: BoundaryConfig,
    pub spawn: SpawnConfig,
    pub feedback: FeedbackConfig,
    /// Seed for item, position and audio cue selection.
    pub seed: u64,
}

impl Default for SandboxConfig {
    fn default() -> Self {
        Self {
            physics: PhysicsConfig::default(),
            boundary: BoundaryConfig::default(),
            spawn: SpawnConfig::default(),
            feedback: FeedbackConfig::default(),
            seed: 12345,
        }
    }
}

impl SandboxConfig {
    /// Parses and validates a JSON document.
    pub fn from_json(json: &str) -> Result<Self, SandboxError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects values the solver cannot work with.
    pub fn validate(&self) -> Result<(), SandboxError> {
        let p = &self.physics;
        positive("physics.step_ms", p.step_ms)?;
        finite_vec("physics.gravity", p.gravity)?;
        non_negative("physics.gravity_scale", p.gravity_scale)?;
        unit_interval("physics.air_friction", p.air_friction)?;
        non_negative("physics.restitution", p.restitution)?;
        non_negative("physics.friction", p.friction)?;
        if p.velocity_iterations == 0 {
            return Err(invalid("physics.velocity_iterations must be at least 1"));
        }
        unit_interval("physics.position_correction", p.position_correction)?;
        non_negative("physics.position_slop", p.position_slop)?;
        non_negative("physics.resting_speed", p.resting_speed)?;
        positive("physics.max_speed", p.max_speed)?;
        if !(p.grab_stiffness > 0.0 && p.grab_stiffness <= 1.0) {
            return Err(invalid(format!(
                "physics.grab_stiffness must be in (0, 1], got {}",
                p.grab_stiffness
            )));
        }
        positive("physics.max_frame_ms", p.max_frame_ms)?;

        let b = &self.boundary;
        positive("boundary.thickness", b.thickness)?;
        non_negative("boundary.restitution", b.restitution)?;
        non_negative("boundary.friction", b.friction)?;

        let s = &self.spawn;
        for size in ItemSize::ALL {
            positive(&format!("spawn.radius.{size}"), s.radius.get(size))?;
            positive(&format!("spawn.size_multiplier.{size}"), s.size_multiplier.get(size))?;
        }
        for weight in ItemWeight::ALL {
            positive(&format!("spawn.density.{weight}"), s.density.get(weight))?;
        }
        non_negative("spawn.first_drop_height", s.first_drop_height)?;
        non_negative("spawn.stagger", s.stagger)?;
        let (lo, hi) = s.band;
        if !(0.0..=1.0).contains(&lo) || !(0.0..=1.0).contains(&hi) || lo > hi {
            return Err(invalid(format!(
                "spawn.band must be an ordered range within [0, 1], got ({lo}, {hi})"
            )));
        }

        let f = &self.feedback;
        non_negative("feedback.min_impact_speed", f.min_impact_speed)?;
        positive("feedback.volume_divisor", f.volume_divisor)?;
        unit_interval("feedback.max_volume", f.max_volume)?;
        Ok(())
    }
}

/// Solver settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    pub step_ms: f32,
    pub gravity: Vec2,
    pub gravity_scale: f32,
    pub air_friction: f32,
    pub restitution: f32,
    pub friction: f32,
    pub restitution_rule: CombineRule,
    pub friction_rule: CombineRule,
    pub velocity_iterations: u32,
    /// Fraction of the remaining overlap removed per sub-step.
    pub position_correction: f32,
    /// Overlap tolerated without correction.
    pub position_slop: f32,
    /// Approach speeds below this resolve without bounce.
    pub resting_speed: f32,
    /// Speed cap in px per sub-step; keeps bodies from tunnelling through walls.
    pub max_speed: f32,
    pub grab_stiffness: f32,
    /// Longest wall-clock gap a single frame will catch up on.
    pub max_frame_ms: f32,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            step_ms: PHYSICS_DT_MS,
            gravity: Vec2::new(0.0, 1.0),
            gravity_scale: 0.001,
            air_friction: 0.01,
            restitution: 0.6,
            friction: 0.3,
            restitution_rule: CombineRule::Max,
            friction_rule: CombineRule::Min,
            velocity_iterations: 4,
            position_correction: 0.8,
            position_slop: 0.01,
            resting_speed: 0.5,
            max_speed: 30.0,
            grab_stiffness: 0.2,
            max_frame_ms: 100.0,
        }
    }
}

impl PhysicsConfig {
    /// Velocity change applied by gravity in one sub-step.
    pub fn gravity_delta(&self) -> Vec2 {
        self.gravity * self.gravity_scale * self.step_ms * self.step_ms
    }
}

/// Ground and side walls.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoundaryConfig {
    pub thickness: f32,
    pub restitution: f32,
    pub friction: f32,
    /// CSS color used to draw the boundaries.
    pub fill: String,
}

impl Default for BoundaryConfig {
    fn default() -> Self {
        Self {
            thickness: 20.0,
            restitution: 0.0,
            friction: 0.1,
            fill: "rgba(139, 92, 69, 0.3)".to_string(),
        }
    }
}

/// One value per item size.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PerSize {
    pub small: f32,
    pub medium: f32,
    pub large: f32,
}

impl PerSize {
    pub fn get(&self, size: ItemSize) -> f32 {
        match size {
            ItemSize::Small => self.small,
            ItemSize::Medium => self.medium,
            ItemSize::Large => self.large,
        }
    }
}

/// One value per item weight.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PerWeight {
    pub light: f32,
    pub mid: f32,
    pub heavy: f32,
}

impl PerWeight {
    pub fn get(&self, weight: ItemWeight) -> f32 {
        match weight {
            ItemWeight::Light => self.light,
            ItemWeight::Mid => self.mid,
            ItemWeight::Heavy => self.heavy,
        }
    }
}

/// How items become bodies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnConfig {
    pub radius: PerSize,
    pub density: PerWeight,
    pub size_multiplier: PerSize,
    /// Bodies created when the item collection first becomes available.
    pub initial_count: usize,
    /// Center height of the first initial drop, clamped above the ground.
    pub first_drop_height: f32,
    /// Vertical distance between consecutive initial drops.
    pub stagger: f32,
    /// Horizontal spawn range as fractions of the viewport width.
    pub band: (f32, f32),
}

impl Default for SpawnConfig {
    fn default() -> Self {
        Self {
            radius: PerSize {
                small: 30.0,
                medium: 50.0,
                large: 75.0,
            },
            density: PerWeight {
                light: 0.0006,
                mid: 0.001,
                heavy: 0.0015,
            },
            size_multiplier: PerSize {
                small: 1.0,
                medium: 3.0,
                large: 5.0,
            },
            initial_count: 12,
            first_drop_height: 100.0,
            stagger: 50.0,
            band: (0.3, 0.7),
        }
    }
}

impl SpawnConfig {
    /// Circle radius for an item size.
    pub fn radius_for(&self, size: ItemSize) -> f32 {
        self.radius.get(size)
    }

    /// Density for an item, scaled by its size multiplier.
    pub fn density_for(&self, size: ItemSize, weight: ItemWeight) -> f32 {
        self.density.get(weight) * self.size_multiplier.get(size)
    }
}

/// Collision sound tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedbackConfig {
    /// Impacts at or below this speed are silent.
    pub min_impact_speed: f32,
    pub volume_divisor: f32,
    pub max_volume: f32,
    pub audio_pool: Vec<String>,
}

impl Default for FeedbackConfig {
    fn default() -> Self {
        Self {
            min_impact_speed: 2.0,
            volume_divisor: 20.0,
            max_volume: 0.5,
            audio_pool: vec![
                "/sounds/chime-high.mp3".to_string(),
                "/sounds/chime-mid.mp3".to_string(),
                "/sounds/chime-low.mp3".to_string(),
            ],
        }
    }
}

fn invalid(message: impl Into<String>) -> SandboxError {
    SandboxError::InvalidConfig(message.into())
}

fn positive(name: &str, value: f32) -> Result<(), SandboxError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(invalid(format!("{name} must be positive and finite, got {value}")))
    }
}

fn non_negative(name: &str, value: f32) -> Result<(), SandboxError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(invalid(format!("{name} must be non-negative and finite, got {value}")))
    }
}

fn unit_interval(name: &str, value: f32) -> Result<(), SandboxError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(invalid(format!("{name} must be within [0, 1], got {value}")))
    }
}

fn finite_vec(name: &str, value: Vec2) -> Result<(), SandboxError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(invalid(format!("{name} must be finite, got {value}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        SandboxConfig::default().validate().unwrap();
    }

    #[test]
    fn test_mid_weight_densities_match_size_classes() {
        let spawn = SpawnConfig::default();
        assert!((spawn.density_for(ItemSize::Small, ItemWeight::Mid) - 0.001).abs() < 1e-9);
        assert!((spawn.density_for(ItemSize::Medium, ItemWeight::Mid) - 0.003).abs() < 1e-9);
        assert!((spawn.density_for(ItemSize::Large, ItemWeight::Mid) - 0.005).abs() < 1e-9);
    }

    #[test]
    fn test_gravity_delta_per_step() {
        let physics = PhysicsConfig::default();
        let expected = 0.001 * PHYSICS_DT_MS * PHYSICS_DT_MS;
        assert!((physics.gravity_delta().y - expected).abs() < 1e-6);
        assert_eq!(physics.gravity_delta().x, 0.0);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = SandboxConfig::from_json(r#"{ "seed": 7, "feedback": { "max_volume": 0.4 } }"#).unwrap();
        assert_eq!(config.seed, 7);
        assert_eq!(config.feedback.max_volume, 0.4);
        assert_eq!(config.feedback.volume_divisor, 20.0);
        assert_eq!(config.spawn.initial_count, 12);
    }

    #[test]
    fn test_rejects_non_positive_radius() {
        let mut config = SandboxConfig::default();
        config.spawn.radius.medium = 0.0;
        assert!(matches!(config.validate(), Err(SandboxError::InvalidConfig(_))));
    }

    #[test]
    fn test_rejects_zero_step() {
        let result = SandboxConfig::from_json(r#"{ "physics": { "step_ms": 0.0 } }"#);
        assert!(matches!(result, Err(SandboxError::InvalidConfig(_))));
    }

    #[test]
    fn test_malformed_json() {
        let result = SandboxConfig::from_json("{ physics: ");
        assert!(matches!(result, Err(SandboxError::ConfigParse(_))));
    }
}
