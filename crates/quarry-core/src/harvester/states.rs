//! Per-tick behavior of each harvester state.

use tracing::debug;

use super::{Harvester, HarvesterState};
use crate::cargo::CargoKind;
use crate::entity::{EntityId, LandmarkKind, ResourceSource, UnitFlags};
use crate::error::CoreError;
use crate::feedback::{colors, Cue, NoticeContext};
use crate::locomotion::Locomotion;
use crate::timers::Activity;
use crate::world::World;

impl<L: Locomotion + 'static> Harvester<L> {
    /// Forgets an enemy that wandered off or vanished.
    pub(super) fn idle_tick(&mut self, world: &World) {
        let Some(enemy) = self.core.enemy else {
            return;
        };
        let here = self.core.locomotion.position();
        let escaped = world.hostile(enemy).map_or(true, |hostile| {
            here.distance(hostile.transform.position) > hostile.aggression_radius
        });
        if escaped {
            debug!(unit = %self.core.id, enemy = %enemy, "enemy out of reach");
            self.core.enemy = None;
            self.core.flags.insert(UnitFlags::PREEMPT_READY);
        }
    }

    /// Closes on the enemy and swings once in range.
    pub(super) fn battle_tick(&mut self, world: &mut World) -> Result<(), CoreError> {
        let target = self
            .core
            .enemy
            .and_then(|id| world.hostile(id).map(|h| (id, h.transform.position)));
        let Some((enemy, point)) = target else {
            debug!(unit = %self.core.id, "battle target gone");
            self.core.enemy = None;
            self.core.flags.insert(UnitFlags::PREEMPT_READY);
            self.change_state(HarvesterState::Idle, world)?;
            return Ok(());
        };

        self.core.look_target = Some(enemy);
        self.core.locomotion.set_destination(point);
        if self.core.locomotion.is_within(self.core.stats.attack_range) {
            self.core.locomotion.set_auto_rotate(false);
            self.attack(world)?;
        }
        Ok(())
    }

    /// Mines while the deposit has supply and nothing is carried.
    pub(super) fn harvest_tick(&mut self, world: &mut World) -> Result<(), CoreError> {
        let supply = self
            .core
            .deposit
            .and_then(|id| world.deposit(id))
            .map(ResourceSource::count);

        match supply {
            Some(count) if count > 0 => {
                if self.core.ledger.is_empty() && self.core.locomotion.has_arrived() {
                    self.harvest(world)?;
                }
            }
            _ => {
                if supply.is_none() {
                    self.core.deposit = None;
                }
                if self.core.ledger.is_empty() {
                    debug!(
                        unit = %self.core.id,
                        carried = self.core.ledger.carried(),
                        "deposit unavailable"
                    );
                    self.change_state(HarvesterState::Idle, world)?;
                }
            }
        }
        Ok(())
    }

    /// One harvest step: extract a unit and ship the load once full.
    ///
    /// The landmark a full load heads for is looked up before anything is
    /// extracted. Without it the unit holds in Harvest and the deposit is
    /// left untouched.
    fn harvest(&mut self, world: &mut World) -> Result<(), CoreError> {
        if !self.core.timers.is_ready(Activity::Harvest) || !self.core.locomotion.is_stationary() {
            return Ok(());
        }
        let Some(tainted) = self
            .core
            .deposit
            .and_then(|id| world.deposit(id))
            .filter(|d| d.has_supply())
            .map(ResourceSource::is_tainted)
        else {
            return Ok(());
        };

        let ledger = &self.core.ledger;
        let fills = ledger.carried().saturating_add(1) >= ledger.capacity();
        let shipping = if fills {
            let kind = if tainted {
                LandmarkKind::DecontaminationFacility
            } else {
                LandmarkKind::Stockpile
            };
            match self.core.destination_of(kind, world) {
                Some(point) => Some(point),
                None => return Ok(()),
            }
        } else {
            None
        };

        let Some(deposit) = self.core.deposit.and_then(|id| world.deposit_mut(id)) else {
            return Ok(());
        };
        if !deposit.extract_one() {
            return Ok(());
        }
        let unit = self.core.id;

        world
            .feedback_mut()
            .say(unit, colors::WHITE, None, NoticeContext::Mining);
        self.core.timers.reset(Activity::Harvest);
        let full = self.core.ledger.add_unit();
        let Some(point) = shipping.filter(|_| full) else {
            world.feedback_mut().cue(unit, Cue::Interact);
            return Ok(());
        };

        let here = self.core.locomotion.position();
        if tainted {
            let item = world.create_cargo(CargoKind::Tainted, here);
            self.core.ledger.attach(item);
            debug!(unit = %unit, "tainted load full");
            self.change_state(HarvesterState::Decontaminate, world)?;
        } else {
            let item = world.create_cargo(CargoKind::Clean, here);
            self.core.ledger.attach(item);
            self.core.ledger.reset_carried();
            debug!(unit = %unit, "clean load full");
            self.change_state(HarvesterState::Stock, world)?;
        }
        self.core.locomotion.set_destination(point);
        Ok(())
    }

    /// Hands clean cargo to the stockpile, one unit per interval.
    pub(super) fn stock_tick(&mut self, dt: f32, world: &mut World) -> Result<(), CoreError> {
        if !self.core.ledger.has(CargoKind::Clean) {
            return Ok(());
        }
        if self.core.ledger.carried() == 0 {
            return self.finish_stack(world);
        }

        self.core.timers.accrue(Activity::Delivery, dt);
        if !self.core.locomotion.has_arrived() || !self.core.timers.is_ready(Activity::Delivery) {
            return Ok(());
        }

        let left = self.core.ledger.record_delivery();
        self.core.timers.reset(Activity::Delivery);
        world.counters_mut().mineral_delivered();
        world.feedback_mut().say(
            self.core.id,
            colors::RED,
            Some("+1 Mineral Stocked"),
            NoticeContext::Delivery,
        );
        debug!(
            unit = %self.core.id,
            left,
            minerals = world.counters().minerals(),
            "unit delivered"
        );

        if left == 0 {
            self.finish_stack(world)?;
        }
        Ok(())
    }

    /// Clears a fully delivered stack and picks the next job.
    fn finish_stack(&mut self, world: &mut World) -> Result<(), CoreError> {
        self.core.ledger.destroy_all(CargoKind::Clean);
        self.core.ledger.reset_delivered();
        self.core.ledger.reset_carried();

        let resume = self
            .core
            .recent_deposit
            .and_then(|id| world.deposit(id).filter(|d| d.has_supply()).map(|d| (id, d.position)));

        match resume {
            Some((deposit, point)) => {
                self.core.deposit = Some(deposit);
                self.core.look_at(deposit, world);
                self.core.locomotion.set_destination(point);
                self.change_state(HarvesterState::Harvest, world)?;
            }
            None => {
                self.change_state(HarvesterState::Idle, world)?;
            }
        }
        Ok(())
    }

    /// Purifies tainted cargo once at the facility.
    pub(super) fn decontaminate_tick(&mut self, world: &mut World) -> Result<(), CoreError> {
        if self.core.ledger.has(CargoKind::Tainted) && self.core.locomotion.has_arrived() {
            self.decontaminate(world)?;
        }
        Ok(())
    }

    /// One purify step. The last one turns every tainted load into a clean
    /// one and heads for the stockpile.
    ///
    /// The last step waits, spending nothing, until a stockpile exists.
    fn decontaminate(&mut self, world: &mut World) -> Result<(), CoreError> {
        if !self.core.timers.is_ready(Activity::Purify) {
            return Ok(());
        }
        let finishing = self.core.ledger.carried() <= 1;
        let point = if finishing {
            match self.core.destination_of(LandmarkKind::Stockpile, world) {
                Some(point) => Some(point),
                None => return Ok(()),
            }
        } else {
            None
        };
        let unit = self.core.id;

        world
            .feedback_mut()
            .say(unit, colors::WHITE, None, NoticeContext::Decontamination);
        self.core.ledger.spend_unit();
        self.core.timers.reset(Activity::Purify);
        let Some(point) = point else {
            return Ok(());
        };

        self.core.ledger.reset_delivered();
        let purified = self.core.ledger.destroy_all(CargoKind::Tainted);
        let here = self.core.locomotion.position();
        for i in 0..purified {
            let mut item = world.create_cargo(CargoKind::Clean, here);
            // Extra loads ride hidden under the first.
            item.active = i == 0;
            self.core.ledger.attach(item);
        }
        debug!(unit = %unit, loads = purified, "cargo purified");

        self.change_state(HarvesterState::Stock, world)?;
        self.core.locomotion.set_destination(point);
        Ok(())
    }

    /// Collects the pending item on arrival, then always goes Idle.
    pub(super) fn pickup_tick(&mut self, world: &mut World) -> Result<(), CoreError> {
        if !self.core.locomotion.has_arrived() {
            return Ok(());
        }
        if let Some(item) = self.core.pickup.take() {
            self.collect(item, world);
        }
        world.feedback_mut().cue(self.core.id, Cue::Idle);
        self.change_state(HarvesterState::Idle, world)?;
        Ok(())
    }

    /// Attaches a loose item if it can join what is already carried.
    ///
    /// An empty-handed unit takes anything. Otherwise the item must match
    /// the single kind carried and rides hidden under the existing load.
    /// Tainted cargo always leaves a full load pending purification.
    fn collect(&mut self, id: EntityId, world: &mut World) {
        let Some(kind) = world.loose_cargo(id).map(|item| item.kind) else {
            debug!(unit = %self.core.id, item = %id, "pickup vanished");
            return;
        };

        let clean = self.core.ledger.has(CargoKind::Clean);
        let tainted = self.core.ledger.has(CargoKind::Tainted);
        let active = match (clean, tainted, kind) {
            (false, false, _) => true,
            (true, false, CargoKind::Clean) | (false, true, CargoKind::Tainted) => false,
            _ => {
                debug!(unit = %self.core.id, item = %id, "pickup refused, cargo kinds differ");
                return;
            }
        };

        let Some(mut item) = world.take_cargo(id) else {
            return;
        };
        item.active = active;
        item.position = self.core.locomotion.position();
        self.core.ledger.attach(item);
        if kind == CargoKind::Tainted {
            self.core.ledger.fill();
        }

        world
            .feedback_mut()
            .say(self.core.id, colors::WHITE, None, NoticeContext::PickUp);
        debug!(unit = %self.core.id, item = %id, ?kind, "picked up");
    }
}
