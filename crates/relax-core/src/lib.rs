//! Relax-Mode Core Library
//!
//! A small fixed-step 2D physics sandbox: collected items fall in as circles,
//! can be grabbed and thrown with the pointer, and chime when they hit each
//! other or the walls.
//!
//! The crate is platform independent. Drawing, image loading and audio are
//! reached through the [`Canvas`], [`AssetLoader`] and [`AudioCue`] traits so
//! the browser client and the tests can plug in their own backends.

#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::cast_precision_loss)]

pub mod body;
pub mod boundary;
pub mod clock;
mod collision;
pub mod config;
pub mod error;
pub mod events;
pub mod feedback;
pub mod input;
pub mod item;
pub mod math;
pub mod physics;
pub mod pointer;
pub mod presentation;
pub mod sandbox;
pub mod store;

pub use body::{Body, BodyDesc, BodyId, BodyKind, Material, Pose, Shape};
pub use boundary::{BoundaryLayout, Viewport};
pub use clock::FrameClock;
pub use config::{
    BoundaryConfig, FeedbackConfig, PHYSICS_DT_MS, PerSize, PerWeight, PhysicsConfig, SandboxConfig,
    SpawnConfig,
};
pub use error::{ResourceKind, SandboxError};
pub use events::CollisionEvent;
pub use input::{InputEvent, InputQueue};
pub use item::{Item, ItemSize, ItemWeight};
pub use math::{CombineRule, Vec2};
pub use physics::PhysicsWorld;
pub use pointer::{PointerGrab, PointerState};
pub use presentation::{AssetLoader, AudioCue, Canvas, LoadTicket, Presentation, SessionId, SpriteState};
pub use sandbox::{FrameReport, Sandbox, SandboxStatus};
pub use store::BodyStore;
