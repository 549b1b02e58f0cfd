use crate::asset::ModelAsset;
use crate::readiness::{FailurePolicy, LatchEvent, LoadState, ReadinessLatch};
use crate::Entity;
use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Axis-aligned box centered at the origin. Both actors and particles are
/// kept inside it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Container {
    pub width: f32,
    pub height: f32,
    pub depth: f32,
}

impl Container {
    pub fn new(width: f32, height: f32, depth: f32) -> Self {
        Self { width, height, depth }
    }

    /// Extents as (width, height, depth)
    pub fn extents(&self) -> Vec3 {
        Vec3::new(self.width, self.height, self.depth)
    }

    pub fn half_extents(&self) -> Vec3 {
        self.extents() / 2.0
    }

    /// Inclusive bounds shrunk by `margin` on every side.
    pub fn inset_bounds(&self, margin: f32) -> (Vec3, Vec3) {
        let half = self.half_extents();
        (-half + Vec3::splat(margin), half - Vec3::splat(margin))
    }

    pub fn smallest_extent(&self) -> f32 {
        self.width.min(self.height).min(self.depth)
    }

    pub fn contains(&self, point: Vec3) -> bool {
        let half = self.half_extents();
        point.cmpge(-half).all() && point.cmple(half).all()
    }
}

impl Default for Container {
    fn default() -> Self {
        Self::new(28.0, 15.0, 15.0)
    }
}

/// A swimming fish.
///
/// `orientation` holds XYZ Euler angles in radians. The actor only moves
/// once its model is attached.
#[derive(Debug, Clone)]
pub struct Actor {
    pub id: Entity,
    pub position: Vec3,
    pub velocity: Vec3,
    pub orientation: Vec3,
    pub model: Option<ModelAsset>,
}

impl Actor {
    pub fn new(id: Entity, position: Vec3) -> Self {
        Self {
            id,
            position,
            velocity: Vec3::ZERO,
            orientation: Vec3::ZERO,
            model: None,
        }
    }
}

/// Ambient particle; only its vertical velocity evolves.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Particle {
    pub position: Vec3,
    pub vertical_velocity: f32,
}

impl Particle {
    pub fn at_rest(position: Vec3) -> Self {
        Self { position, vertical_velocity: 0.0 }
    }
}

/// All mutable scene state, owned by the frame loop and handed to each
/// system by reference.
#[derive(Debug, Clone)]
pub struct Tank {
    pub container: Container,
    pub actors: Vec<Actor>,
    pub particles: Vec<Particle>,
    pub latch: ReadinessLatch,
    frame: u64,
    swim_frames: u64,
}

impl Tank {
    pub fn new(
        container: Container,
        actors: Vec<Actor>,
        particles: Vec<Particle>,
        policy: FailurePolicy,
    ) -> Self {
        let latch = ReadinessLatch::new(actors.len(), policy);
        Self {
            container,
            actors,
            particles,
            latch,
            frame: 0,
            swim_frames: 0,
        }
    }

    pub fn actor(&self, id: Entity) -> Option<&Actor> {
        self.actors.get(id.index())
    }

    pub fn actor_mut(&mut self, id: Entity) -> Option<&mut Actor> {
        self.actors.get_mut(id.index())
    }

    pub fn actor_state(&self, id: Entity) -> LoadState {
        self.latch.state(id).unwrap_or(LoadState::Pending)
    }

    /// Whether the motion simulator may run
    pub fn is_ready(&self) -> bool {
        self.latch.is_open()
    }

    /// Records a finished load in the readiness latch.
    pub fn record_load(&mut self, id: Entity, succeeded: bool) -> Option<LatchEvent> {
        self.latch.record(id, succeeded)
    }

    /// Index of the frame currently being simulated
    pub fn frame(&self) -> u64 {
        self.frame
    }

    pub fn advance_frame(&mut self) {
        self.frame += 1;
    }

    /// Number of frames on which actors were moved
    pub fn swim_frames(&self) -> u64 {
        self.swim_frames
    }

    pub fn count_swim_frame(&mut self) {
        self.swim_frames += 1;
    }
}
