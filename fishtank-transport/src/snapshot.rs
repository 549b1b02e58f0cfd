use fishtank_core::{LoadState, Tank};
use serde::Serialize;

/// Transform of one actor as the renderer sees it
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct ActorState {
    pub id: u32,
    pub state: LoadState,
    pub position: [f32; 3],
    /// XYZ Euler angles in radians
    pub orientation: [f32; 3],
}

/// Per-frame transforms of every actor and particle
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct FrameSnapshot {
    pub frame: u64,
    /// Whether actors have started swimming
    pub ready: bool,
    pub actors: Vec<ActorState>,
    pub particles: Vec<[f32; 3]>,
}

impl FrameSnapshot {
    pub fn capture(tank: &Tank) -> Self {
        let actors = tank
            .actors
            .iter()
            .map(|actor| ActorState {
                id: actor.id.id(),
                state: tank.actor_state(actor.id),
                position: actor.position.to_array(),
                orientation: actor.orientation.to_array(),
            })
            .collect();

        let particles = tank.particles.iter().map(|p| p.position.to_array()).collect();

        FrameSnapshot {
            frame: tank.frame(),
            ready: tank.is_ready(),
            actors,
            particles,
        }
    }
}
