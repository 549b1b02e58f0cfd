//! Scene setup and the actor load-completion hook.

use fishtank_core::{Actor, Container, Entity, LatchEvent, LoadCompletion, LoadState, Particle, Tank};
use glam::Vec3;
use log::{debug, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Size of an actor's body along each axis, used to keep spawn points inside
/// the container
pub const ACTOR_BODY_SIZE: f32 = 0.005;

/// RNG for one independent stream of the scene.
///
/// With a seed every stream is reproducible and distinct; without one the
/// stream comes from OS entropy.
pub fn seeded_rng(seed: Option<u64>, stream: u64) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed ^ stream.wrapping_mul(0x9E37_79B9_7F4A_7C15)),
        None => StdRng::from_entropy(),
    }
}

/// Actors at random spawn points, without models and at rest.
pub fn spawn_actors<R: Rng>(count: u32, container: &Container, rng: &mut R) -> Vec<Actor> {
    let extents = container.extents();
    (0..count)
        .map(|id| {
            let position = Vec3::new(
                spawn_coordinate(extents.x, rng),
                spawn_coordinate(extents.y, rng),
                spawn_coordinate(extents.z, rng),
            );
            Actor::new(Entity::new(id), position)
        })
        .collect()
}

fn spawn_coordinate<R: Rng>(extent: f32, rng: &mut R) -> f32 {
    rng.gen::<f32>() * (extent - ACTOR_BODY_SIZE) - extent / 2.0 + ACTOR_BODY_SIZE / 2.0
}

/// Particles uniformly spread through the container with no vertical velocity.
pub fn spawn_particles<R: Rng>(count: u32, container: &Container, rng: &mut R) -> Vec<Particle> {
    let extents = container.extents();
    (0..count)
        .map(|_| {
            Particle::at_rest(Vec3::new(
                rng.gen::<f32>() * extents.x - extents.x / 2.0,
                rng.gen::<f32>() * extents.y - extents.y / 2.0,
                rng.gen::<f32>() * extents.z - extents.z / 2.0,
            ))
        })
        .collect()
}

/// Velocity given to an actor when its model arrives: each component
/// uniform in [-0.5, 0.5).
pub fn initial_velocity<R: Rng>(rng: &mut R) -> Vec3 {
    Vec3::new(rng.gen::<f32>() - 0.5, rng.gen::<f32>() - 0.5, rng.gen::<f32>() - 0.5)
}

/// Applies one finished model load to the tank.
///
/// On success the model is attached at `model_scale`, the actor gets its
/// initial velocity and is marked ready. On failure the actor is marked
/// failed. Either way the readiness latch is updated, and its opening event is
/// returned.
pub fn on_model_loaded<R: Rng>(
    tank: &mut Tank,
    completion: LoadCompletion,
    model_scale: f32,
    rng: &mut R,
) -> Option<LatchEvent> {
    let LoadCompletion { actor: id, result } = completion;

    if tank.actor(id).is_none() {
        warn!("Load completed for {} which is not in the tank", id);
        return None;
    }
    if tank.actor_state(id) != LoadState::Pending {
        warn!("Ignoring repeated load completion for {}", id);
        return None;
    }

    match result {
        Ok(model) => {
            debug!("{} loaded {} ({} bytes)", id, model.path.display(), model.byte_len);
            let velocity = initial_velocity(rng);
            if let Some(actor) = tank.actor_mut(id) {
                actor.model = Some(model.with_scale(model_scale));
                actor.velocity = velocity;
            }
            tank.record_load(id, true)
        }
        Err(err) => {
            warn!("{} failed to load its model: {}", id, err);
            tank.record_load(id, false)
        }
    }
}
