//! Special ability: area taunt.
//!
//! The cooldown counts *up* toward its maximum; the ability is usable once
//! it gets there. Casting with nobody in range costs nothing.

use glam::Vec2;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::entity::EntityId;
use crate::feedback::{colors, NoticeContext};
use crate::world::World;

/// Recharge state of a unit's special ability.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SkillCooldown {
    current: f32,
    max: f32,
}

impl SkillCooldown {
    /// Creates a cooldown at `current` out of `max`, clamped into range.
    #[must_use]
    pub fn new(current: f32, max: f32) -> Self {
        let max = max.max(0.0);
        Self {
            current: current.clamp(0.0, max),
            max,
        }
    }

    /// Recharges by `dt`, stopping at the maximum.
    pub fn advance(&mut self, dt: f32) {
        self.current = (self.current + dt).min(self.max);
    }

    /// Returns `true` once fully recharged.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.current >= self.max
    }

    /// Empties the cooldown after a cast.
    pub fn reset(&mut self) {
        self.current = 0.0;
    }

    /// Current recharge.
    #[must_use]
    pub const fn current(&self) -> f32 {
        self.current
    }

    /// Recharge needed to cast.
    #[must_use]
    pub const fn max(&self) -> f32 {
        self.max
    }
}

/// Taunts every living hostile within `radius` of `center`.
///
/// Each hostile hit is retargeted onto `caster`, flagged as taunted and sent
/// into battle toward `center`. Returns the ids taunted, in id order. An
/// empty result means nothing was touched.
pub fn area_taunt(world: &mut World, caster: EntityId, center: Vec2, radius: f32) -> Vec<EntityId> {
    let victims = world.hostiles_within(center, radius);
    if victims.is_empty() {
        return victims;
    }

    for &id in &victims {
        if let Some(hostile) = world.hostile_mut(id) {
            hostile.taunt(caster, center);
        }
        world
            .feedback_mut()
            .say(id, colors::MAGENTA, Some("Taunted!"), NoticeContext::Taunt);
    }
    world
        .feedback_mut()
        .say(caster, colors::MAGENTA, Some("Come at me!"), NoticeContext::Taunt);

    debug!(unit = %caster, taunted = victims.len(), "area taunt");
    victims
}
