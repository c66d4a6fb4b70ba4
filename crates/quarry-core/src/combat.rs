//! Combat resolver: directional damage.
//!
//! A blow that lands on a defender's back deals double damage. "Back" is
//! judged from the defender's facing: if the direction from the defender to
//! the attacker points against the defender's forward vector, the attacker
//! is behind it.
//!
//! # Example
//!
//! ```
//! use quarry_core::combat::CombatResolver;
//! use glam::Vec2;
//!
//! // Defender at the origin facing +X.
//! let front = CombatResolver::strike_damage(4, Vec2::new(3.0, 0.0), Vec2::ZERO, Vec2::X);
//! let back = CombatResolver::strike_damage(4, Vec2::new(-3.0, 0.0), Vec2::ZERO, Vec2::X);
//! assert_eq!(front, 4);
//! assert_eq!(back, 8);
//! ```

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::entity::Combatant;

/// Outcome of one resolved blow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Strike {
    /// Damage applied.
    pub damage: u32,
    /// Whether the blow came from behind.
    pub from_behind: bool,
    /// Whether the defender died from it.
    pub lethal: bool,
}

/// Stateless damage rules.
#[derive(Debug, Clone, Copy, Default)]
pub struct CombatResolver;

impl CombatResolver {
    /// Returns `true` if an attacker at `attacker` stands behind a defender
    /// at `defender` facing `defender_forward`.
    ///
    /// A perpendicular approach (dot product exactly zero) counts as front.
    #[must_use]
    pub fn is_from_behind(attacker: Vec2, defender: Vec2, defender_forward: Vec2) -> bool {
        let displacement = (attacker - defender).normalize_or_zero();
        displacement.dot(defender_forward) < 0.0
    }

    /// Damage a blow of `strength` deals.
    #[must_use]
    pub fn strike_damage(
        strength: u32,
        attacker: Vec2,
        defender: Vec2,
        defender_forward: Vec2,
    ) -> u32 {
        if Self::is_from_behind(attacker, defender, defender_forward) {
            strength.saturating_mul(2)
        } else {
            strength
        }
    }

    /// Resolves a blow from `attacker` against `defender` and applies it.
    ///
    /// Health stops at zero.
    pub fn strike<T: Combatant + ?Sized>(
        strength: u32,
        attacker: Vec2,
        defender: &mut T,
    ) -> Strike {
        let (position, forward) = (defender.position(), defender.forward());
        let from_behind = Self::is_from_behind(attacker, position, forward);
        let damage = Self::strike_damage(strength, attacker, position, forward);
        defender.take_damage(damage);
        Strike {
            damage,
            from_behind,
            lethal: !defender.is_alive(),
        }
    }
}
