use crate::motion::{swim_step, SwimParams};
use crate::particles::{particle_step, ParticleParams};
use fishtank_core::{LoadState, System, Tank};
use log::trace;
use rand::rngs::StdRng;
use rayon::prelude::*;

// --- Systems ---

/// Moves every ready actor, but only once the readiness latch is open.
pub struct SwimSystem {
    params: SwimParams,
}

impl SwimSystem {
    pub fn new(params: SwimParams) -> Self {
        Self { params }
    }
}

impl System for SwimSystem {
    fn run(&mut self, tank: &mut Tank) {
        if !tank.is_ready() {
            return;
        }

        let container = tank.container;
        let params = self.params;
        let states = tank.latch.states();

        // Each actor's step reads and writes only that actor
        let bounces: usize = tank
            .actors
            .par_iter_mut()
            .zip(states.par_iter())
            .filter(|(_, state)| **state == LoadState::Ready)
            .map(|(actor, _)| swim_step(actor, &container, &params).any() as usize)
            .sum();

        tank.count_swim_frame();
        trace!("Frame {}: {} actors bounced", tank.frame(), bounces);
    }

    fn name(&self) -> &str {
        "swim"
    }
}

/// Jitters the ambient particles. Runs every frame, loaded or not.
pub struct ParticleSystem {
    params: ParticleParams,
    rng: StdRng,
}

impl ParticleSystem {
    pub fn new(params: ParticleParams, rng: StdRng) -> Self {
        Self { params, rng }
    }
}

impl System for ParticleSystem {
    fn run(&mut self, tank: &mut Tank) {
        let container = tank.container;
        particle_step(&mut tank.particles, &container, &self.params, &mut self.rng);
    }

    fn name(&self) -> &str {
        "particles"
    }
}
