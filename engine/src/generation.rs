//! Poll generations.
//!
//! Every status request is tagged with a generation. Only the answer to the
//! latest issued generation may touch the store; anything older lost a race
//! against a newer poll and is dropped.

use serde::{Deserialize, Serialize};

/// A monotonically increasing poll tag.
///
/// Generation zero is never issued: it is the "before any request" value,
/// so a record added before the first poll is still eligible for its answer.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Generation(u64);

impl Generation {
    /// The value before any request has been issued.
    pub const ZERO: Generation = Generation(0);

    /// Create a generation with a specific value.
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    /// Advance to the next generation and return it.
    pub fn tick(&mut self) -> Generation {
        self.0 = self.0.saturating_add(1);
        *self
    }

    /// Raw counter value.
    pub fn value(&self) -> u64 {
        self.0
    }

    /// Check if this generation was issued strictly before another.
    pub fn precedes(&self, other: &Generation) -> bool {
        self.0 < other.0
    }
}

impl std::fmt::Display for Generation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
