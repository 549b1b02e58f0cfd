//! Scene state and frame machinery for the fish tank simulation.

pub mod asset;
pub mod entity;
pub mod readiness;
pub mod scheduler;
pub mod system;
pub mod tank;

// Re-export key types for convenience
pub use asset::{AssetError, AssetLoader, LoadCompletion, ModelAsset, ModelFormat};
pub use entity::Entity;
pub use glam::Vec3;
pub use readiness::{FailurePolicy, LatchEvent, LoadState, ReadinessLatch};
pub use scheduler::{FrameTiming, Scheduler};
pub use system::System;
pub use tank::{Actor, Container, Particle, Tank};
