//! Harvester side of combat.
//!
//! Attacks are two-phase. [`Harvester::attack`] only starts the swing (a
//! presentation cue); damage lands when the presentation layer reports the
//! effect frame through [`Harvester::on_hit`].

use tracing::{debug, info};

use super::{Harvester, HarvesterState};
use crate::cargo::drop_ring;
use crate::combat::{CombatResolver, Strike};
use crate::entity::{EntityId, HealthBand, UnitFlags};
use crate::error::CoreError;
use crate::feedback::{colors, Cue, NoticeContext};
use crate::locomotion::Locomotion;
use crate::timers::Activity;
use crate::world::World;

impl<L: Locomotion + 'static> Harvester<L> {
    /// Swings at the remembered enemy, or stands down if it is dead.
    ///
    /// A dead harvester does nothing. A dead (or vanished) enemy is forgotten
    /// and the unit goes Idle where it stands. Otherwise a swing starts when
    /// the attack cooldown has elapsed and the unit is not moving.
    ///
    /// # Errors
    ///
    /// Propagates [`change_state`](Self::change_state) failures.
    pub fn attack(&mut self, world: &mut World) -> Result<(), CoreError> {
        if self.core.stats.health == 0 {
            return Ok(());
        }

        let enemy_alive = self
            .core
            .enemy
            .and_then(|id| world.hostile(id))
            .is_some_and(|hostile| hostile.health > 0);

        if !enemy_alive {
            debug!(unit = %self.core.id, "enemy down");
            self.core.enemy = None;
            self.core.look_target = None;
            self.core.flags.insert(UnitFlags::PREEMPT_READY);
            world.feedback_mut().cue(self.core.id, Cue::Idle);
            let here = self.core.locomotion.position();
            self.core.locomotion.set_destination(here);
            self.change_state(HarvesterState::Idle, world)?;
        } else if self.core.timers.is_ready(Activity::Attack) && self.core.locomotion.is_stationary()
        {
            self.core.timers.reset(Activity::Attack);
            world.feedback_mut().cue(self.core.id, Cue::AttackTrigger);
        }
        Ok(())
    }

    /// Effect frame of a swing: damages the remembered enemy.
    ///
    /// Blows from behind the enemy deal double strength. Returns `None` if
    /// there is no enemy to hit.
    pub fn on_hit(&mut self, world: &mut World) -> Option<Strike> {
        let enemy = self.core.enemy?;
        let attacker = self.core.locomotion.position();
        let hostile = world.hostile_mut(enemy)?;

        let strike = CombatResolver::strike(self.core.stats.strength, attacker, hostile);
        world
            .feedback_mut()
            .say(enemy, colors::MAGENTA, None, NoticeContext::Combat);
        debug!(
            unit = %self.core.id,
            enemy = %enemy,
            damage = strike.damage,
            from_behind = strike.from_behind,
            "hit landed"
        );
        Some(strike)
    }

    /// Takes a blow of `amount`.
    ///
    /// `attacker`, if given, is adopted as the enemy when none is remembered.
    /// The first blow taken while an enemy is remembered pulls the unit into
    /// Battle unless it already is there.
    ///
    /// # Errors
    ///
    /// Propagates [`change_state`](Self::change_state) failures.
    pub fn take_damage(
        &mut self,
        amount: u32,
        attacker: Option<EntityId>,
        world: &mut World,
    ) -> Result<(), CoreError> {
        if let Some(attacker) = attacker {
            self.auto_target(attacker, world);
        }

        let id = self.core.id;
        let stats = &mut self.core.stats;
        stats.health = stats.health.saturating_sub(amount);

        let band = HealthBand::classify(stats.health, stats.max_health);
        if band != self.core.health_band {
            self.core.health_band = band;
            world.feedback_mut().cue(id, Cue::HealthBand(band));
        }

        if self.core.stats.health == 0 && !self.core.flags.contains(UnitFlags::DEAD) {
            self.core.flags.insert(UnitFlags::DEAD);
            world.feedback_mut().cue(id, Cue::Death);
            info!(unit = %id, "harvester died");
        }

        if self.core.enemy.is_some()
            && self.core.flags.contains(UnitFlags::PREEMPT_READY)
            && self.state() != HarvesterState::Battle
        {
            self.core.flags.remove(UnitFlags::PREEMPT_READY);
            debug!(unit = %id, "struck first, fighting back");
            self.change_state(HarvesterState::Battle, world)?;
        }
        Ok(())
    }

    /// Scatters every attached item on a ring around the unit.
    ///
    /// Item `i` of `n` lands at angle `i * 2π / n`, `drop_radius` away. The
    /// carried count goes to zero; the delivered count is kept.
    pub(super) fn drop_items(&mut self, world: &mut World) {
        let items = self.core.ledger.detach_all();
        if items.is_empty() {
            return;
        }

        let count = items.len();
        let spots = drop_ring(
            self.core.locomotion.position(),
            self.core.config.drop_radius,
            count,
        );
        for (item, spot) in items.into_iter().zip(spots) {
            world.place_cargo(item, spot);
        }
        debug!(unit = %self.core.id, dropped = count, "cargo dropped");
    }
}
