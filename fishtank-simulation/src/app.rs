//! Frame loop driver: owns the tank, the scheduler and the model loader.

use crate::motion::SwimParams;
use crate::particles::ParticleParams;
use crate::spawn::{on_model_loaded, seeded_rng, spawn_actors, spawn_particles};
use crate::systems::{ParticleSystem, SwimSystem};
use fishtank_core::{AssetLoader, Container, FailurePolicy, FrameTiming, LatchEvent, Scheduler, Tank};
use std::time::{Duration, Instant};
use log::info;
use rand::rngs::StdRng;
use std::path::PathBuf;

// Independent RNG streams derived from the scene seed
const SPAWN_STREAM: u64 = 1;
const LOAD_STREAM: u64 = 2;
const PARTICLE_STREAM: u64 = 3;

/// Everything needed to build a scene
#[derive(Debug, Clone)]
pub struct SceneParams {
    pub container: Container,
    pub actor_count: u32,
    pub particle_count: u32,
    pub model_path: PathBuf,
    pub model_scale: f32,
    pub failure_policy: FailurePolicy,
    pub swim: SwimParams,
    pub particles: ParticleParams,
    pub seed: Option<u64>,
    /// Frame pacing; `None` runs frames back to back
    pub framerate: Option<u32>,
}

impl Default for SceneParams {
    fn default() -> Self {
        Self {
            container: Container::default(),
            actor_count: 22,
            particle_count: 75,
            model_path: PathBuf::from("./fish.gltf"),
            model_scale: 0.005,
            failure_policy: FailurePolicy::default(),
            swim: SwimParams::default(),
            particles: ParticleParams::default(),
            seed: None,
            framerate: None,
        }
    }
}

/// What happened on one frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameReport {
    /// Frame index after the step; matches the snapshot published for it
    pub frame: u64,
    /// Loads applied at the start of this frame
    pub completions: usize,
    pub opened: Option<LatchEvent>,
    /// Time spent in systems
    pub systems: Duration,
}

/// The main simulation application
pub struct TankApp {
    tank: Tank,
    scheduler: Scheduler,
    loader: Box<dyn AssetLoader>,
    load_rng: StdRng,
    model_path: PathBuf,
    model_scale: f32,
}

impl TankApp {
    /// Spawns the scene and registers the particle and swim systems, in that order.
    pub fn new(params: SceneParams, loader: Box<dyn AssetLoader>) -> Self {
        let mut spawn_rng = seeded_rng(params.seed, SPAWN_STREAM);
        let actors = spawn_actors(params.actor_count, &params.container, &mut spawn_rng);
        let particles = spawn_particles(params.particle_count, &params.container, &mut spawn_rng);
        let tank = Tank::new(params.container, actors, particles, params.failure_policy);

        let mut scheduler = Scheduler::new();
        if let Some(framerate) = params.framerate {
            scheduler.with_framerate(framerate);
        }
        scheduler.add_system(ParticleSystem::new(
            params.particles,
            seeded_rng(params.seed, PARTICLE_STREAM),
        ));
        scheduler.add_system(SwimSystem::new(params.swim));

        Self {
            tank,
            scheduler,
            loader,
            load_rng: seeded_rng(params.seed, LOAD_STREAM),
            model_path: params.model_path,
            model_scale: params.model_scale,
        }
    }

    /// Issues one model load per actor.
    pub fn start_loading(&mut self) {
        info!(
            "Requesting {} model loads from {}",
            self.tank.actors.len(),
            self.model_path.display()
        );
        for actor in &self.tank.actors {
            self.loader.request(actor.id, &self.model_path);
        }
    }

    /// Applies finished loads, then runs one frame of systems.
    pub fn step(&mut self) -> FrameReport {
        let completions = self.loader.poll();
        let applied = completions.len();

        let mut opened = None;
        for completion in completions {
            if let Some(event) =
                on_model_loaded(&mut self.tank, completion, self.model_scale, &mut self.load_rng)
            {
                opened = Some(event);
            }
        }

        let systems = self.scheduler.execute_once(&mut self.tank);
        FrameReport { frame: self.tank.frame(), completions: applied, opened, systems }
    }

    /// Waits out the rest of the frame that began at `frame_start`.
    pub fn pace(&self, frame_start: Instant) -> FrameTiming {
        self.scheduler.pace(self.tank.frame(), frame_start)
    }

    pub fn tank(&self) -> &Tank {
        &self.tank
    }

    pub fn loads_in_flight(&self) -> usize {
        self.loader.in_flight()
    }

    pub fn system_names(&self) -> Vec<&str> {
        self.scheduler.system_names()
    }
}
