//! Simulation driver.
//!
//! `Simulation` owns the [`World`] and every [`Harvester`], and advances
//! them with a fixed tick:
//!
//! 1. **MOVE**: every harvester's locomotion advances by `dt`
//! 2. **BEHAVE**: every harvester runs its state handler
//! 3. **ADVANCE**: the tick counter increments
//!
//! # Determinism
//!
//! Harvesters are stored in a `BTreeMap` and visited in id order, and the
//! world iterates the same way, so a run is fully determined by its
//! configuration and the commands issued.
//!
//! # Example
//!
//! ```
//! use quarry_core::config::SimulationConfig;
//! use quarry_core::simulation::Simulation;
//! use glam::Vec2;
//!
//! let mut sim = Simulation::new(SimulationConfig::default())?;
//! let unit = sim.spawn_at(Vec2::ZERO)?;
//! assert_eq!(sim.world().counters().miners(), 1);
//!
//! for _ in 0..10 {
//!     sim.step()?;
//! }
//! assert_eq!(sim.tick(), 10);
//!
//! sim.on_death(unit)?;
//! assert_eq!(sim.world().counters().miners(), 0);
//! # Ok::<(), quarry_core::CoreError>(())
//! ```

use std::collections::BTreeMap;

use glam::Vec2;
use tracing::{info, warn};

use crate::combat::Strike;
use crate::config::{HarvesterConfig, SimulationConfig};
use crate::entity::EntityId;
use crate::error::CoreError;
use crate::feedback::FeedbackLog;
use crate::harvester::Harvester;
use crate::locomotion::{DirectMover, Locomotion};
use crate::world::World;

// =============================================================================
// Simulation
// =============================================================================

/// Fixed-tick driver for a world of harvesters.
#[derive(Debug)]
pub struct Simulation<L = DirectMover> {
    config: SimulationConfig,
    world: World,
    harvesters: BTreeMap<EntityId, Harvester<L>>,
    tick: u64,
}

impl<L: Locomotion + 'static> Simulation<L> {
    /// Creates an empty simulation.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Config`] if `config` fails validation.
    pub fn new(config: SimulationConfig) -> Result<Self, CoreError> {
        config.validate()?;
        Ok(Self {
            world: World::with_feedback(FeedbackLog::with_capacities(
                config.notice_capacity,
                config.cue_capacity,
            )),
            harvesters: BTreeMap::new(),
            tick: 0,
            config,
        })
    }

    /// Spawns a harvester using the simulation-wide harvester config.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Fsm`] if the state machine cannot be built.
    pub fn spawn_harvester(&mut self, locomotion: L) -> Result<EntityId, CoreError> {
        let config = self.config.harvester.clone();
        self.spawn_harvester_with(config, locomotion)
    }

    /// Spawns a harvester with its own tuning.
    ///
    /// The unit is started (Init to Idle) and counted as a miner.
    ///
    /// # Errors
    ///
    /// [`CoreError::Config`] if `config` is invalid, [`CoreError::Fsm`] if
    /// the state machine cannot be built.
    pub fn spawn_harvester_with(
        &mut self,
        config: HarvesterConfig,
        locomotion: L,
    ) -> Result<EntityId, CoreError> {
        config.validate()?;
        let id = self.world.allocate_id();
        let mut unit = Harvester::new(id, config, locomotion)?;
        unit.start();

        info!(unit = %id, position = %unit.position(), "harvester spawned");
        self.harvesters.insert(id, unit);
        self.world.counters_mut().miner_spawned();
        Ok(id)
    }

    /// Removes a harvester. Its cargo is destroyed with it.
    pub fn despawn(&mut self, id: EntityId) -> Option<Harvester<L>> {
        let unit = self.harvesters.remove(&id)?;
        self.world.counters_mut().miner_despawned();
        info!(unit = %id, "harvester despawned");
        Some(unit)
    }

    /// Death-animation callback: removes the harvester.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::UnknownHarvester`] if `id` is not alive here.
    pub fn on_death(&mut self, id: EntityId) -> Result<(), CoreError> {
        self.despawn(id)
            .map(|_| ())
            .ok_or(CoreError::UnknownHarvester(id))
    }

    /// Advances the simulation by one tick.
    ///
    /// The tick always runs to completion: every harvester moves and then
    /// behaves, and the counter advances, even if some unit fails.
    ///
    /// # Errors
    ///
    /// Returns the first harvester failure in id order once the tick is
    /// complete. Later failures in the same tick are logged and dropped.
    pub fn step(&mut self) -> Result<(), CoreError> {
        let dt = self.config.dt;

        // MOVE
        for unit in self.harvesters.values_mut() {
            unit.advance_locomotion(dt);
        }

        // BEHAVE
        let mut first_error = None;
        for unit in self.harvesters.values_mut() {
            if let Err(err) = unit.update(dt, &mut self.world) {
                warn!(unit = %unit.id(), tick = self.tick, %err, "harvester update failed");
                first_error.get_or_insert(err);
            }
        }

        // ADVANCE
        self.tick += 1;
        first_error.map_or(Ok(()), Err)
    }

    /// Runs `f` against one harvester and the world.
    ///
    /// # Errors
    ///
    /// [`CoreError::UnknownHarvester`] if `id` is not alive, otherwise
    /// whatever `f` returns.
    pub fn command<T, F>(&mut self, id: EntityId, f: F) -> Result<T, CoreError>
    where
        F: FnOnce(&mut Harvester<L>, &mut World) -> Result<T, CoreError>,
    {
        let unit = self
            .harvesters
            .get_mut(&id)
            .ok_or(CoreError::UnknownHarvester(id))?;
        f(unit, &mut self.world)
    }

    /// A hostile lands a blow on a harvester.
    ///
    /// The harvester adopts the hostile as its enemy if it has none, then
    /// takes the hostile's strength as damage.
    ///
    /// # Errors
    ///
    /// [`CoreError::UnknownHostile`] or [`CoreError::UnknownHarvester`] for
    /// bad ids; otherwise as [`Harvester::take_damage`].
    pub fn hostile_strike(&mut self, hostile: EntityId, harvester: EntityId) -> Result<(), CoreError> {
        let strength = self
            .world
            .hostile(hostile)
            .map(|h| h.strength)
            .ok_or(CoreError::UnknownHostile(hostile))?;
        self.command(harvester, |unit, world| {
            unit.take_damage(strength, Some(hostile), world)
        })
    }

    /// Attack effect frame of a harvester's swing.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::UnknownHarvester`] if `id` is not alive.
    pub fn harvester_hit(&mut self, id: EntityId) -> Result<Option<Strike>, CoreError> {
        self.command(id, |unit, world| Ok(unit.on_hit(world)))
    }

    // -------------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------------

    /// Returns a harvester by id.
    #[must_use]
    pub fn harvester(&self, id: EntityId) -> Option<&Harvester<L>> {
        self.harvesters.get(&id)
    }

    /// Returns a mutable harvester by id.
    #[must_use]
    pub fn harvester_mut(&mut self, id: EntityId) -> Option<&mut Harvester<L>> {
        self.harvesters.get_mut(&id)
    }

    /// Harvesters in id order.
    pub fn harvesters(&self) -> impl Iterator<Item = &Harvester<L>> + '_ {
        self.harvesters.values()
    }

    /// Number of live harvesters.
    #[must_use]
    pub fn harvester_count(&self) -> usize {
        self.harvesters.len()
    }

    /// The world.
    #[must_use]
    pub const fn world(&self) -> &World {
        &self.world
    }

    /// Mutable access to the world.
    #[must_use]
    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    /// Ticks run so far.
    #[must_use]
    pub const fn tick(&self) -> u64 {
        self.tick
    }

    /// Configuration in use.
    #[must_use]
    pub const fn config(&self) -> &SimulationConfig {
        &self.config
    }
}

impl Simulation<DirectMover> {
    /// Spawns a straight-line harvester at `position`.
    ///
    /// # Errors
    ///
    /// As [`spawn_harvester`](Self::spawn_harvester).
    pub fn spawn_at(&mut self, position: Vec2) -> Result<EntityId, CoreError> {
        let mover = DirectMover::new(position, self.config.harvester.stats.speed);
        self.spawn_harvester(mover)
    }
}

// =============================================================================
// Tests
// =============================================================================
