//! Entity identifiers, kinds, and the capability traits the core calls.
//!
//! - [`EntityId`]: Unique identifier shared by every object in a world
//! - [`EntityKind`]: What an identifier refers to
//! - [`Combatant`]: Anything a harvester can strike
//! - [`ResourceSource`]: Anything a harvester can mine
//!
//! Harvesters never hold references to other objects. They hold
//! [`EntityId`]s and resolve them through the [`World`](crate::world::World)
//! every tick, so a target destroyed elsewhere simply stops resolving.

pub mod components;

use glam::Vec2;
use serde::{Deserialize, Serialize};
use std::fmt;

pub use components::{
    Deposit, HealthBand, Hostile, HostileState, Landmark, LandmarkKind, Transform, UnitFlags,
};

/// Unique identifier for an entity.
///
/// Identifiers are allocated monotonically by the world and never reused,
/// so a stale id can only fail to resolve; it can never alias a newer
/// object.
///
/// # Example
///
/// ```
/// use quarry_core::entity::EntityId;
///
/// let id1 = EntityId::new(1);
/// let id2 = EntityId::new(2);
///
/// assert!(id1 < id2);
/// assert_eq!(id1.as_u64(), 1);
/// ```
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntityId(u64);

impl EntityId {
    /// Creates a new `EntityId` from a raw `u64` value.
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw `u64` value of this identifier.
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Debug for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EntityId({})", self.0)
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for EntityId {
    fn from(id: u64) -> Self {
        Self::new(id)
    }
}

/// What an [`EntityId`] refers to.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    /// A worker unit driven by the behavior state machine.
    Harvester,
    /// An enemy unit.
    Hostile,
    /// A resource deposit.
    Deposit,
    /// A loose cargo item lying in the world.
    Cargo,
    /// A stockpile or decontamination facility.
    Landmark,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Harvester => write!(f, "Harvester"),
            Self::Hostile => write!(f, "Hostile"),
            Self::Deposit => write!(f, "Deposit"),
            Self::Cargo => write!(f, "Cargo"),
            Self::Landmark => write!(f, "Landmark"),
        }
    }
}

/// Something that can be struck in combat.
///
/// Only the operations the harvester actually performs on its target.
pub trait Combatant {
    /// Current health; `0` means dead.
    fn health(&self) -> u32;

    /// Ground-plane position.
    fn position(&self) -> Vec2;

    /// Unit vector the combatant faces.
    fn forward(&self) -> Vec2;

    /// Subtracts `amount` from health, stopping at zero.
    fn take_damage(&mut self, amount: u32);

    /// Returns `true` while health is above zero.
    fn is_alive(&self) -> bool {
        self.health() > 0
    }
}

/// A finite, optionally tainted resource source.
pub trait ResourceSource {
    /// Units left to extract.
    fn count(&self) -> u32;

    /// Whether extracted cargo must be purified before delivery.
    fn is_tainted(&self) -> bool;

    /// Removes one unit. Returns `false` (and changes nothing) when empty.
    fn extract_one(&mut self) -> bool;

    /// Returns `true` while units remain.
    fn has_supply(&self) -> bool {
        self.count() > 0
    }
}
