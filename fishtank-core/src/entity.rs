use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of an actor in the tank.
///
/// Actors are created once at scene start and never destroyed, so the id is
/// simply the actor's index in the tank and needs no generation counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Entity {
    id: u32,
}

impl Entity {
    pub fn new(id: u32) -> Self {
        Entity { id }
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    /// Index into the tank's actor array
    pub fn index(&self) -> usize {
        self.id as usize
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "actor#{}", self.id)
    }
}
