//! Fish swimming and particle drift inside the tank.

pub mod app;
pub mod motion;
pub mod orientation;
pub mod particles;
pub mod spawn;
pub mod systems;

pub use app::{FrameReport, SceneParams, TankApp};
pub use motion::{swim_step, SwimParams};
pub use orientation::{smooth_orientation, target_orientation};
pub use particles::{drift, particle_step, ParticleParams};
pub use spawn::{initial_velocity, on_model_loaded, seeded_rng, spawn_actors, spawn_particles};
pub use systems::{ParticleSystem, SwimSystem};
