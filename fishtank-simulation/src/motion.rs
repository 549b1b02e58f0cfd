//! Swim step: move an actor, turn it toward its heading, bounce it off the walls.

use crate::orientation::{smooth_orientation, target_orientation};
use fishtank_core::{Actor, Container};
use glam::BVec3;

/// Per-frame swim parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SwimParams {
    /// Displacement per frame per unit of velocity
    pub swim_speed: f32,
    /// Fraction of the remaining turn taken each frame, in (0, 1]
    pub rotation_smoothing: f32,
    /// Inset from each container wall; keeps the model's body inside the box
    pub clipping_margin: f32,
}

impl Default for SwimParams {
    fn default() -> Self {
        Self {
            swim_speed: 0.02,
            rotation_smoothing: 0.1,
            clipping_margin: 1.1,
        }
    }
}

/// Advances one actor by one frame.
///
/// The candidate position is `position + velocity * swim_speed`. If it lies
/// outside the inset bounds on any axis, the position is clamped into the
/// bounds and the velocity component of every violating axis is negated;
/// otherwise the actor moves to the candidate and keeps its velocity. The
/// velocity is never renormalized, so repeated bounces leave its magnitude
/// as it was at spawn.
///
/// Returns the axes whose velocity was reflected.
pub fn swim_step(actor: &mut Actor, container: &Container, params: &SwimParams) -> BVec3 {
    let candidate = actor.position + actor.velocity * params.swim_speed;

    let target = target_orientation(actor.velocity);
    actor.orientation = smooth_orientation(actor.orientation, target, params.rotation_smoothing);

    let (min, max) = container.inset_bounds(params.clipping_margin);
    let violated = candidate.cmplt(min) | candidate.cmpgt(max);

    if violated.any() {
        actor.position = candidate.clamp(min, max);

        // Reverse the velocity component that hit the boundary
        if violated.x {
            actor.velocity.x *= -1.0;
        }
        if violated.y {
            actor.velocity.y *= -1.0;
        }
        if violated.z {
            actor.velocity.z *= -1.0;
        }
    } else {
        actor.position = candidate;
    }

    violated
}

#[cfg(test)]
mod tests {
    use super::*;
    use fishtank_core::{Entity, Vec3};
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn actor_at(position: Vec3, velocity: Vec3) -> Actor {
        let mut actor = Actor::new(Entity::new(0), position);
        actor.velocity = velocity;
        actor
    }

    fn tank_box() -> Container {
        Container::new(28.0, 15.0, 15.0)
    }

    #[test]
    fn in_bounds_step_moves_to_candidate() {
        let params = SwimParams::default();
        let velocity = Vec3::new(0.3, -0.2, 0.4);
        let start = Vec3::new(1.0, 2.0, -3.0);
        let mut actor = actor_at(start, velocity);

        let reflected = swim_step(&mut actor, &tank_box(), &params);

        assert!(!reflected.any());
        assert_eq!(actor.position, start + velocity * params.swim_speed);
        assert_eq!(actor.velocity, velocity);
    }

    #[test]
    fn wall_hit_clamps_and_reflects_one_axis() {
        let params = SwimParams { swim_speed: 0.02, rotation_smoothing: 0.1, clipping_margin: 1.1 };
        let container = tank_box();
        let mut actor = actor_at(Vec3::new(13.95, 0.0, 0.0), Vec3::new(1.0, 0.0, 0.0));

        let reflected = swim_step(&mut actor, &container, &params);

        let (_, max) = container.inset_bounds(1.1);
        assert_eq!(reflected, BVec3::new(true, false, false));
        assert_eq!(actor.position.x, max.x);
        assert!((actor.position.x - 12.9).abs() < 1e-5);
        assert_eq!(actor.velocity, Vec3::new(-1.0, 0.0, 0.0));
    }

    #[test]
    fn single_axis_violation_keeps_other_components_bit_identical() {
        let params = SwimParams::default();
        let container = tank_box();
        let velocity = Vec3::new(0.123_456_7, -0.5, 0.333_333_3);
        // Just under the floor; y will cross min on this step
        let (min, _) = container.inset_bounds(params.clipping_margin);
        let mut actor = actor_at(Vec3::new(0.0, min.y + 0.001, 0.0), velocity);

        swim_step(&mut actor, &container, &params);

        assert_eq!(actor.velocity.x.to_bits(), velocity.x.to_bits());
        assert_eq!(actor.velocity.y, 0.5);
        assert_eq!(actor.velocity.z.to_bits(), velocity.z.to_bits());
        assert_eq!(actor.position.y, min.y);
    }

    #[test]
    fn corner_hit_reflects_every_violating_axis() {
        let params = SwimParams::default();
        let container = tank_box();
        let (_, max) = container.inset_bounds(params.clipping_margin);
        let mut actor = actor_at(max, Vec3::new(0.5, 0.5, -0.5));

        let reflected = swim_step(&mut actor, &container, &params);

        assert_eq!(reflected, BVec3::new(true, true, false));
        assert_eq!(actor.velocity, Vec3::new(-0.5, -0.5, -0.5));
        // z was in bounds, so the clamp leaves the candidate's z alone
        assert_eq!(actor.position.z, max.z - 0.5 * params.swim_speed);
    }

    #[test]
    fn reflection_does_not_renormalize_velocity() {
        let params = SwimParams::default();
        let velocity = Vec3::new(-0.4, 0.1, 0.2);
        let mut actor = actor_at(Vec3::new(-13.9, 0.0, 0.0), velocity);

        swim_step(&mut actor, &tank_box(), &params);

        assert_eq!(actor.velocity.length(), velocity.length());
    }

    #[test]
    fn orientation_turns_toward_heading_every_step() {
        let params = SwimParams::default();
        let mut actor = actor_at(Vec3::ZERO, Vec3::Z);

        swim_step(&mut actor, &tank_box(), &params);
        let first = actor.orientation.z;
        swim_step(&mut actor, &tank_box(), &params);

        assert!((first - std::f32::consts::FRAC_PI_2 * 0.1).abs() < 1e-5);
        assert!(actor.orientation.z > first);
    }

    #[test]
    fn positions_stay_inside_container() {
        let params = SwimParams::default();
        let container = tank_box();
        let half = container.half_extents();
        let mut rng = StdRng::seed_from_u64(42);

        let mut actors: Vec<Actor> = (0..22)
            .map(|i| {
                let position = Vec3::new(
                    rng.gen_range(-half.x..half.x),
                    rng.gen_range(-half.y..half.y),
                    rng.gen_range(-half.z..half.z),
                );
                let velocity = Vec3::new(
                    rng.gen::<f32>() - 0.5,
                    rng.gen::<f32>() - 0.5,
                    rng.gen::<f32>() - 0.5,
                );
                let mut actor = actor_at(position, velocity);
                actor.id = Entity::new(i);
                actor
            })
            .collect();

        for _ in 0..5_000 {
            for actor in &mut actors {
                swim_step(actor, &container, &params);
                assert!(container.contains(actor.position), "{} escaped to {:?}", actor.id, actor.position);
            }
        }
    }
}
