//! Ambient particle drift: a damped random walk on the vertical axis.

use fishtank_core::{Container, Particle};
use glam::Vec3;
use rand::Rng;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParticleParams {
    /// Scale of the random increment added to vertical velocity
    pub speed: f32,
    /// Scale applied to vertical velocity when displacing the particle
    pub amplitude: f32,
    /// Multiplicative decay of vertical velocity, in (0, 1)
    pub damping: f32,
}

impl Default for ParticleParams {
    fn default() -> Self {
        Self {
            speed: 0.01,
            amplitude: 0.5,
            damping: 0.98,
        }
    }
}

/// Advances every particle by one frame, each with its own jitter drawn from
/// U(-0.5, 0.5).
pub fn particle_step<R: Rng>(
    particles: &mut [Particle],
    container: &Container,
    params: &ParticleParams,
    rng: &mut R,
) {
    let half = container.half_extents();
    for particle in particles.iter_mut() {
        let jitter = rng.gen_range(-0.5..0.5);
        drift(particle, half, params, jitter);
    }
}

/// One particle, one frame, with a given jitter.
///
/// The wall is a hard clamp: velocity is left alone, so a particle pinned
/// against it keeps its momentum until the sign turns.
pub fn drift(particle: &mut Particle, half_extents: Vec3, params: &ParticleParams, jitter: f32) {
    particle.vertical_velocity += params.speed * jitter;
    particle.position.y += particle.vertical_velocity * params.amplitude;

    particle.position = particle.position.clamp(-half_extents, half_extents);

    particle.vertical_velocity *= params.damping;
}
