//! One-way readiness latch gating the motion simulation on asset loading.

use crate::Entity;
use log::{info, warn};
use serde::{Deserialize, Serialize};

/// Load state of a single actor's model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoadState {
    /// Load requested, no completion seen yet
    Pending,
    /// Asset attached and velocity initialized
    Ready,
    /// Load completed with an error; terminal
    Failed,
}

impl LoadState {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, LoadState::Pending)
    }
}

/// What the latch does with an actor whose model failed to load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailurePolicy {
    /// The failed actor is left out of the simulation and does not hold back the others.
    Exclude,
    /// The failed actor keeps the latch closed forever.
    Block,
}

impl Default for FailurePolicy {
    fn default() -> Self {
        FailurePolicy::Exclude
    }
}

/// Emitted by [`ReadinessLatch::record`] the one time the latch opens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LatchEvent {
    Opened { ready: usize, failed: usize },
}

/// Tracks per-actor load states and flips from Loading to Ready exactly once.
///
/// Readiness is kept as running counters so each completion costs O(1)
/// instead of a scan over every actor.
#[derive(Debug, Clone)]
pub struct ReadinessLatch {
    states: Vec<LoadState>,
    ready: usize,
    failed: usize,
    policy: FailurePolicy,
    open: bool,
}

impl ReadinessLatch {
    /// Creates a latch for `total` actors, all pending. A latch with no actors
    /// starts open.
    pub fn new(total: usize, policy: FailurePolicy) -> Self {
        Self {
            states: vec![LoadState::Pending; total],
            ready: 0,
            failed: 0,
            policy,
            open: total == 0,
        }
    }

    /// Records the completion of one actor's load.
    ///
    /// Returns `Some(LatchEvent::Opened)` only on the completion that opens the
    /// latch. Completions for unknown actors, or for actors that already
    /// completed, are ignored.
    pub fn record(&mut self, actor: Entity, succeeded: bool) -> Option<LatchEvent> {
        let Some(state) = self.states.get_mut(actor.index()) else {
            warn!("Ignoring load completion for unknown {}", actor);
            return None;
        };
        if state.is_terminal() {
            warn!("Ignoring duplicate load completion for {} (already {:?})", actor, state);
            return None;
        }

        if succeeded {
            *state = LoadState::Ready;
            self.ready += 1;
        } else {
            *state = LoadState::Failed;
            self.failed += 1;
        }

        if self.open || !self.should_open() {
            return None;
        }

        self.open = true;
        info!(
            "All actors loaded: {} ready, {} failed, motion simulation enabled",
            self.ready, self.failed
        );
        Some(LatchEvent::Opened { ready: self.ready, failed: self.failed })
    }

    fn should_open(&self) -> bool {
        match self.policy {
            FailurePolicy::Exclude => self.ready + self.failed == self.states.len(),
            FailurePolicy::Block => self.ready == self.states.len(),
        }
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn state(&self, actor: Entity) -> Option<LoadState> {
        self.states.get(actor.index()).copied()
    }

    pub fn states(&self) -> &[LoadState] {
        &self.states
    }

    pub fn ready_count(&self) -> usize {
        self.ready
    }

    pub fn failed_count(&self) -> usize {
        self.failed
    }

    pub fn pending_count(&self) -> usize {
        self.states.len() - self.ready - self.failed
    }

    pub fn policy(&self) -> FailurePolicy {
        self.policy
    }
}
