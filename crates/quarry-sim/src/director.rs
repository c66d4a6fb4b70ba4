//! Outer-loop stand-ins for the systems around the harvester core.
//!
//! The core never moves hostiles, plays animations or picks jobs for idle
//! units. The director does the minimum of each so a headless run has
//! something to show: hostiles chase and hit the nearest harvester, attack
//! cues fire their effect frame, the dead are removed, and idle harvesters
//! are handed new work.

use glam::Vec2;
use quarry_core::entity::{EntityId, HostileState, ResourceSource};
use quarry_core::feedback::Cue;
use quarry_core::{HarvesterState, Simulation};
use tracing::{debug, info};

/// Distance at which a hostile can land a blow.
const HOSTILE_REACH: f32 = 1.5;

/// Hostile movement speed in world units per time unit.
const HOSTILE_SPEED: f32 = 2.0;

/// Idle harvesters only walk to loose cargo this close.
const SCAVENGE_RADIUS: f32 = 12.0;

/// Drives everything outside the harvester core.
#[derive(Debug)]
pub struct Director {
    /// Ticks between hostile blows.
    strike_interval: u64,
}

impl Director {
    pub fn new(strike_interval: u64) -> Self {
        Self {
            strike_interval: strike_interval.max(1),
        }
    }

    /// Runs once after every simulation step.
    pub fn tick(&mut self, sim: &mut Simulation) -> anyhow::Result<()> {
        self.move_hostiles(sim);
        if sim.tick() % self.strike_interval == 0 {
            self.hostile_strikes(sim)?;
        }
        self.resolve_cues(sim)?;
        self.bury_dead(sim)?;
        self.assign_idle(sim)?;

        for notice in sim.world_mut().feedback_mut().drain_notices() {
            debug!(anchor = %notice.anchor, text = notice.caption().unwrap_or(""), "notice");
        }
        Ok(())
    }

    fn move_hostiles(&mut self, sim: &mut Simulation) {
        let dt = sim.config().dt;
        let units: Vec<(EntityId, Vec2)> = sim
            .harvesters()
            .filter(|h| h.is_alive())
            .map(|h| (h.id(), h.position()))
            .collect();
        let ids: Vec<EntityId> = sim.world().hostiles().map(|h| h.id).collect();

        for id in ids {
            let Some(hostile) = sim.world_mut().hostile_mut(id) else {
                continue;
            };
            if hostile.health == 0 {
                continue;
            }
            let here = hostile.transform.position;
            let radius = hostile.aggression_radius;

            let tracked = hostile
                .target
                .and_then(|t| units.iter().find(|(u, _)| *u == t))
                .filter(|(_, p)| p.distance(here) <= radius)
                .copied();
            let target = tracked.or_else(|| {
                units
                    .iter()
                    .filter(|(_, p)| p.distance(here) <= radius)
                    .min_by(|a, b| a.1.distance(here).total_cmp(&b.1.distance(here)))
                    .copied()
            });

            match target {
                Some((unit, position)) => {
                    hostile.target = Some(unit);
                    hostile.state = HostileState::Battle;
                    hostile.destination = Some(position);
                }
                None => {
                    hostile.target = None;
                    hostile.state = HostileState::Idle;
                }
            }

            let Some(dest) = hostile.destination else {
                continue;
            };
            let offset = dest - here;
            let travel = offset.length() - HOSTILE_REACH;
            if travel > 0.0 {
                let dir = offset / offset.length();
                hostile.transform.position += dir * travel.min(HOSTILE_SPEED * dt);
                hostile.transform.heading = dir.y.atan2(dir.x);
            } else if hostile.target.is_none() {
                hostile.destination = None;
            }
        }
    }

    fn hostile_strikes(&mut self, sim: &mut Simulation) -> anyhow::Result<()> {
        let blows: Vec<(EntityId, EntityId)> = sim
            .world()
            .hostiles()
            .filter(|h| h.health > 0)
            .filter_map(|h| {
                let target = h.target?;
                let unit = sim.harvester(target).filter(|u| u.is_alive())?;
                let close = unit.position().distance(h.transform.position)
                    <= HOSTILE_REACH + 1e-3;
                close.then_some((h.id, target))
            })
            .collect();

        for (hostile, unit) in blows {
            sim.hostile_strike(hostile, unit)?;
        }
        Ok(())
    }

    fn resolve_cues(&mut self, sim: &mut Simulation) -> anyhow::Result<()> {
        let cues = sim.world_mut().feedback_mut().drain_cues();
        for (id, cue) in cues {
            match cue {
                Cue::AttackTrigger if sim.harvester(id).is_some() => {
                    if let Some(strike) = sim.harvester_hit(id)? {
                        debug!(unit = %id, damage = strike.damage, lethal = strike.lethal, "swing landed");
                    }
                }
                Cue::Death => info!(unit = %id, "harvester down"),
                _ => {}
            }
        }
        Ok(())
    }

    fn bury_dead(&mut self, sim: &mut Simulation) -> anyhow::Result<()> {
        let fallen: Vec<EntityId> = sim
            .harvesters()
            .filter(|h| !h.is_alive())
            .map(|h| h.id())
            .collect();
        for id in fallen {
            sim.on_death(id)?;
        }

        let slain: Vec<EntityId> = sim
            .world()
            .hostiles()
            .filter(|h| h.health == 0)
            .map(|h| h.id)
            .collect();
        for id in slain {
            sim.world_mut().remove_hostile(id);
            info!(hostile = %id, "hostile slain");
        }

        let swept = sim.world_mut().sweep_depleted();
        if swept > 0 {
            debug!(swept, "depleted deposits removed");
        }
        Ok(())
    }

    fn assign_idle(&mut self, sim: &mut Simulation) -> anyhow::Result<()> {
        let idle: Vec<(EntityId, Vec2, bool)> = sim
            .harvesters()
            .filter(|h| h.is_alive() && h.state() == HarvesterState::Idle && h.enemy().is_none())
            .map(|h| (h.id(), h.position(), h.ledger().is_empty()))
            .collect();

        for (id, here, empty_handed) in idle {
            if !empty_handed {
                sim.command(id, |h, w| h.recall(w))?;
                continue;
            }

            let world = sim.world();
            let loose = world
                .loose_cargo_items()
                .filter(|c| c.position.distance(here) <= SCAVENGE_RADIUS)
                .min_by(|a, b| a.position.distance(here).total_cmp(&b.position.distance(here)))
                .map(|c| c.id);
            if let Some(item) = loose {
                sim.command(id, |h, w| h.go_to_pickup(item, w))?;
                continue;
            }

            let deposit = world
                .deposits()
                .filter(|d| d.has_supply())
                .min_by(|a, b| a.position.distance(here).total_cmp(&b.position.distance(here)))
                .map(|d| d.id);
            if let Some(deposit) = deposit {
                sim.command(id, |h, w| h.set_target_resource(deposit, w))?;
            }
        }
        Ok(())
    }
}
