use crate::system::System;
use crate::Tank;
use log::{trace, warn};
use std::time::{Duration, Instant};

/// Timing of one executed frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameTiming {
    /// Time from frame start until pacing began
    pub work: Duration,
    /// True if the work did not fit in the fixed timestep
    pub overran: bool,
}

/// Runs systems in registration order, once per frame, with optional frame pacing.
///
/// The step itself is frame-rate dependent: systems see no delta time, so a
/// frame is one simulation step whatever its wall-clock length.
pub struct Scheduler {
    systems: Vec<Box<dyn System>>,
    fixed_timestep: Option<Duration>, // Optional frame budget to pace against
}

impl Scheduler {
    pub fn new() -> Self {
        Self {
            systems: Vec::new(),
            fixed_timestep: None,
        }
    }

    /// Add a system to the scheduler
    pub fn add_system<T: System + 'static>(&mut self, system: T) {
        self.systems.push(Box::new(system));
    }

    /// Pace frames to the given rate; see [`Scheduler::pace`]
    pub fn with_framerate(&mut self, framerate: u32) -> &mut Self {
        self.fixed_timestep = Some(Duration::from_secs_f64(1.0 / framerate.max(1) as f64));
        self
    }

    pub fn fixed_timestep(&self) -> Option<Duration> {
        self.fixed_timestep
    }

    pub fn system_names(&self) -> Vec<&str> {
        self.systems.iter().map(|s| s.name()).collect()
    }

    /// Execute all systems once and advance the frame counter. Returns the
    /// time spent in systems.
    pub fn execute_once(&mut self, tank: &mut Tank) -> Duration {
        let start = Instant::now();

        for system in &mut self.systems {
            let system_start = Instant::now();
            system.run(tank);
            trace!("{} took {:?}", system.name(), system_start.elapsed());
        }
        tank.advance_frame();

        start.elapsed()
    }

    /// Sleeps out whatever is left of the frame budget, measured from
    /// `frame_start`. Everything done since then, systems or not, counts
    /// against the budget.
    pub fn pace(&self, frame: u64, frame_start: Instant) -> FrameTiming {
        let work = frame_start.elapsed();
        let mut overran = false;

        if let Some(target) = self.fixed_timestep {
            if work < target {
                spin_sleep::sleep(target - work);
            } else {
                overran = true;
                warn!("Frame {} exceeded budget: {:?} > {:?}", frame, work, target);
            }
        }

        FrameTiming { work, overran }
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}
