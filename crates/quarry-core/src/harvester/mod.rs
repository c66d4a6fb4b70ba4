//! The harvester unit.
//!
//! A harvester mines deposits, carries loads to the stockpile (through the
//! decontamination facility when the deposit is tainted), fights when it has
//! to, and picks dropped cargo back up. A [`StateMachine`] arbitrates between
//! these jobs; this module wires it up and exposes the commands outside
//! callers issue.
//!
//! # Layout
//!
//! [`Harvester`] is split in two: the state machine, and a [`UnitCore`] that
//! holds everything else. Entry handlers receive the core as their context,
//! so feeding an event borrows the two halves independently.
//!
//! - `mod.rs`: state names, construction, transitions, commands
//! - `states.rs`: per-tick behavior of each state
//! - `combat.rs`: attacking, being hit, dropping cargo
//!
//! # Example
//!
//! ```
//! use quarry_core::config::HarvesterConfig;
//! use quarry_core::harvester::{Harvester, HarvesterState};
//! use quarry_core::locomotion::DirectMover;
//! use quarry_core::world::World;
//! use glam::Vec2;
//!
//! let mut world = World::new(16);
//! let deposit = world.spawn_deposit(Vec2::new(1.0, 0.0), 20, false);
//!
//! let id = world.allocate_id();
//! let mover = DirectMover::new(Vec2::ZERO, 3.0);
//! let mut unit = Harvester::new(id, HarvesterConfig::default(), mover)?;
//! unit.start();
//! assert_eq!(unit.state(), HarvesterState::Idle);
//!
//! unit.set_target_resource(deposit, &mut world)?;
//! assert_eq!(unit.state(), HarvesterState::Harvest);
//! # Ok::<(), quarry_core::CoreError>(())
//! ```

mod combat;
mod states;

use std::fmt;

use glam::Vec2;
use quarry_fsm::{FsmError, StateMachine};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::ability::{self, SkillCooldown};
use crate::cargo::{CargoKind, CargoLedger};
use crate::config::{HarvesterConfig, UnitStats};
use crate::entity::{EntityId, HealthBand, LandmarkKind, Transform, UnitFlags};
use crate::error::CoreError;
use crate::feedback::Cue;
use crate::locomotion::{DirectMover, Locomotion};
use crate::timers::ActivityTimers;
use crate::world::World;

/// Event that takes a fresh harvester out of [`HarvesterState::Init`].
pub const STARTUP_EVENT: &str = "auto";

// =============================================================================
// State names
// =============================================================================

/// States of the harvester behavior machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum HarvesterState {
    /// Before the startup event. Has no entry behavior.
    Init,
    /// Waiting for orders.
    Idle,
    /// Fighting the remembered enemy.
    Battle,
    /// Mining a deposit.
    Harvest,
    /// Delivering clean cargo to the stockpile.
    Stock,
    /// Purifying tainted cargo at the facility.
    Decontaminate,
    /// Collecting a loose cargo item.
    PickUp,
}

impl HarvesterState {
    /// Every state reachable after startup. Each pair is connected both ways.
    pub const ACTIVE: [Self; 6] = [
        Self::Idle,
        Self::Battle,
        Self::Harvest,
        Self::Stock,
        Self::Decontaminate,
        Self::PickUp,
    ];

    /// The state's name as used in transition events.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Init => "Init",
            Self::Idle => "Idle",
            Self::Battle => "Battle",
            Self::Harvest => "Harvest",
            Self::Stock => "Stock",
            Self::Decontaminate => "Decontaminate",
            Self::PickUp => "PickUp",
        }
    }
}

impl fmt::Display for HarvesterState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Event name for the edge `from -> to`, e.g. `"HarvestToStock"`.
#[must_use]
pub fn transition_event(from: HarvesterState, to: HarvesterState) -> String {
    format!("{from}To{to}")
}

// =============================================================================
// Unit core
// =============================================================================

/// Everything a harvester owns apart from its state machine.
///
/// This is the context entry handlers run against.
#[derive(Debug)]
pub struct UnitCore<L> {
    id: EntityId,
    config: HarvesterConfig,
    stats: UnitStats,
    skill: SkillCooldown,
    heading: f32,
    locomotion: L,
    ledger: CargoLedger,
    timers: ActivityTimers,
    flags: UnitFlags,
    enemy: Option<EntityId>,
    deposit: Option<EntityId>,
    recent_deposit: Option<EntityId>,
    pickup: Option<EntityId>,
    look_target: Option<EntityId>,
    walking: bool,
    health_band: HealthBand,
}

impl<L: Locomotion> UnitCore<L> {
    fn new(id: EntityId, config: HarvesterConfig, mut locomotion: L) -> Self {
        let mut stats = config.stats.clone();
        stats.health = stats.health.min(stats.max_health);
        locomotion.set_auto_rotate(true);

        Self {
            id,
            skill: SkillCooldown::new(stats.skill_cooldown, stats.max_skill_cooldown),
            heading: 0.0,
            ledger: CargoLedger::new(config.capacity),
            timers: ActivityTimers::new(config.activity_interval, stats.attack_cooldown),
            flags: UnitFlags::PREEMPT_READY,
            enemy: None,
            deposit: None,
            recent_deposit: None,
            pickup: None,
            look_target: None,
            walking: false,
            health_band: HealthBand::classify(stats.health, stats.max_health),
            stats,
            locomotion,
            config,
        }
    }

    /// Entry handler of every state but Stock.
    fn reset_stopping_distance(&mut self, tolerance: f32) {
        self.locomotion.set_stopping_distance(tolerance);
    }

    /// Entry handler of Stock: rebuilds the carried count from the attached
    /// clean stacks.
    fn tally_cargo(&mut self, tolerance: f32) {
        self.locomotion.set_stopping_distance(tolerance);
        let carried = self.ledger.retally();
        trace!(unit = %self.id, carried, delivered = self.ledger.delivered(), "cargo tallied");
    }

    fn transform(&self) -> Transform {
        Transform::new(self.locomotion.position(), self.heading)
    }

    /// Tracks `target` with the look-at controller. A close target takes
    /// facing away from the locomotion provider.
    fn look_at(&mut self, target: EntityId, world: &World) {
        self.look_target = Some(target);
        if let Some(point) = world.position_of(target) {
            if self.locomotion.position().distance(point) <= self.config.look_engage_distance {
                self.locomotion.set_auto_rotate(false);
            }
        }
    }

    fn update_facing(&mut self, dt: f32, world: &World) {
        if self.locomotion.auto_rotate() {
            let velocity = self.locomotion.velocity();
            if velocity.length_squared() > 0.0 {
                self.heading = velocity.y.atan2(velocity.x);
            }
            return;
        }

        let Some(point) = self.look_target.and_then(|id| world.position_of(id)) else {
            return;
        };
        let mut transform = self.transform();
        transform.turn_towards(point, dt * self.config.turn_rate);
        self.heading = transform.heading;
    }

    /// Where a load bound for `kind` is delivered, or `None` (logged) when
    /// the world has no such landmark.
    fn destination_of(&self, kind: LandmarkKind, world: &World) -> Option<Vec2> {
        match world.landmark(kind) {
            Ok(landmark) => Some(match kind {
                LandmarkKind::Stockpile => landmark.standoff_point(self.config.stockpile_standoff),
                LandmarkKind::DecontaminationFacility => landmark.entrance(),
            }),
            Err(err) => {
                debug!(unit = %self.id, %err, "load held");
                None
            }
        }
    }

    fn report_walking(&mut self, world: &mut World) {
        let walking = self.locomotion.velocity().length_squared() > 0.0;
        if walking != self.walking {
            self.walking = walking;
            world.feedback_mut().cue(self.id, Cue::Walking(walking));
        }
    }
}

// =============================================================================
// Harvester
// =============================================================================

/// A worker unit driven by the behavior state machine.
///
/// `L` is the locomotion provider; [`DirectMover`] unless a navigation layer
/// supplies its own.
#[derive(Debug)]
pub struct Harvester<L = DirectMover> {
    fsm: StateMachine<HarvesterState, UnitCore<L>>,
    core: UnitCore<L>,
}

impl<L: Locomotion + 'static> Harvester<L> {
    /// Builds a harvester in [`HarvesterState::Init`].
    ///
    /// Call [`start`](Self::start) to bring it to Idle.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Fsm`] if the transition table cannot be built.
    pub fn new(id: EntityId, config: HarvesterConfig, locomotion: L) -> Result<Self, CoreError> {
        Ok(Self {
            fsm: Self::build_machine()?,
            core: UnitCore::new(id, config, locomotion),
        })
    }

    fn build_machine() -> Result<StateMachine<HarvesterState, UnitCore<L>>, FsmError<HarvesterState>>
    {
        let mut fsm = StateMachine::new(HarvesterState::Init);
        for state in HarvesterState::ACTIVE {
            if state == HarvesterState::Stock {
                fsm.create_state(state, UnitCore::<L>::tally_cargo)?;
            } else {
                fsm.create_state(state, UnitCore::<L>::reset_stopping_distance)?;
            }
        }

        fsm.add_transition(HarvesterState::Init, HarvesterState::Idle, STARTUP_EVENT)?;
        for from in HarvesterState::ACTIVE {
            for to in HarvesterState::ACTIVE {
                if from != to {
                    fsm.add_transition(from, to, transition_event(from, to))?;
                }
            }
        }
        Ok(fsm)
    }

    /// Fires the startup event, moving Init to Idle.
    ///
    /// Does nothing once started.
    pub fn start(&mut self) {
        let tolerance = self.core.config.tolerances.idle;
        self.fsm.feed(&mut self.core, STARTUP_EVENT, tolerance);
    }

    /// Asks the machine to move to `destination`.
    ///
    /// Applies the side effects tied to entering the destination, then feeds
    /// `"{current}To{destination}"`. If no such edge exists (including
    /// `destination == current`) nothing at all happens and `Ok(None)` is
    /// returned.
    ///
    /// - Battle: cargo is dropped and logistics timers are abandoned
    /// - Idle: facing goes back to the locomotion provider
    /// - Stock / Decontaminate: the matching landmark becomes the look target
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::MissingLandmark`] when entering Stock or
    /// Decontaminate in a world without the matching landmark.
    pub fn change_state(
        &mut self,
        destination: HarvesterState,
        world: &mut World,
    ) -> Result<Option<HarvesterState>, CoreError> {
        let current = self.fsm.current_state();
        let event = transition_event(current, destination);
        if self.fsm.target_of(current, &event).is_none() {
            trace!(unit = %self.core.id, state = %current, event = %event, "no edge");
            return Ok(None);
        }

        let tolerances = &self.core.config.tolerances;
        let param = match destination {
            HarvesterState::Init => return Ok(None),
            HarvesterState::Idle => {
                let tolerance = tolerances.idle;
                self.core.locomotion.set_auto_rotate(true);
                tolerance
            }
            HarvesterState::Battle => {
                self.drop_items(world);
                self.core.timers.abandon_logistics();
                self.core.stats.attack_range
            }
            HarvesterState::Harvest => tolerances.harvest,
            HarvesterState::Stock => {
                let tolerance = tolerances.stock;
                let silo = world.landmark(LandmarkKind::Stockpile)?.id;
                self.core.look_at(silo, world);
                tolerance
            }
            HarvesterState::Decontaminate => {
                let tolerance = tolerances.decontaminate;
                let plant = world.landmark(LandmarkKind::DecontaminationFacility)?.id;
                self.core.look_at(plant, world);
                tolerance
            }
            HarvesterState::PickUp => tolerances.pickup,
        };

        let entered = self.fsm.feed(&mut self.core, &event, param);
        if let Some(state) = entered {
            debug!(unit = %self.core.id, from = %current, to = %state, "state change");
        }
        Ok(entered)
    }

    /// Runs one tick of behavior.
    ///
    /// Recharges the ability, advances the activity timers, turns toward the
    /// look target, then runs the current state's handler. Locomotion is
    /// advanced separately by the driver. A dead harvester does nothing.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::MissingLandmark`] if a state change needs a
    /// landmark the world does not have.
    pub fn update(&mut self, dt: f32, world: &mut World) -> Result<(), CoreError> {
        if self.core.flags.contains(UnitFlags::DEAD) {
            return Ok(());
        }

        self.core.skill.advance(dt);
        self.core.timers.advance(dt);
        self.core.update_facing(dt, world);

        match self.state() {
            HarvesterState::Init => {}
            HarvesterState::Idle => self.idle_tick(world),
            HarvesterState::Battle => self.battle_tick(world)?,
            HarvesterState::Harvest => self.harvest_tick(world)?,
            HarvesterState::Stock => self.stock_tick(dt, world)?,
            HarvesterState::Decontaminate => self.decontaminate_tick(world)?,
            HarvesterState::PickUp => self.pickup_tick(world)?,
        }

        self.core.report_walking(world);
        Ok(())
    }

    /// Moves the locomotion provider forward by `dt`.
    pub fn advance_locomotion(&mut self, dt: f32) {
        self.core.locomotion.advance(dt);
    }

    // -------------------------------------------------------------------------
    // Commands
    // -------------------------------------------------------------------------

    /// Attacks `enemy`: remembers it, heads for it and enters Battle.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::UnknownHostile`] if `enemy` is not in the world.
    pub fn set_target(&mut self, enemy: EntityId, world: &mut World) -> Result<(), CoreError> {
        let point = world
            .hostile(enemy)
            .map(|h| h.transform.position)
            .ok_or(CoreError::UnknownHostile(enemy))?;

        self.core.enemy = Some(enemy);
        self.core.look_at(enemy, world);
        self.core.locomotion.set_destination(point);
        self.change_state(HarvesterState::Battle, world)?;
        Ok(())
    }

    /// Remembers `enemy` if no enemy is remembered yet. The state does not
    /// change.
    ///
    /// Returns `true` if the enemy was adopted.
    pub fn auto_target(&mut self, enemy: EntityId, world: &World) -> bool {
        if self.core.enemy.is_some() || world.hostile(enemy).is_none() {
            return false;
        }
        self.core.enemy = Some(enemy);
        if self.core.flags.contains(UnitFlags::PREEMPT_READY) {
            self.core.look_at(enemy, world);
        }
        true
    }

    /// Mines `deposit`: remembers it, heads for it and enters Harvest.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::UnknownDeposit`] if `deposit` is not in the world.
    pub fn set_target_resource(
        &mut self,
        deposit: EntityId,
        world: &mut World,
    ) -> Result<(), CoreError> {
        let point = world
            .deposit(deposit)
            .map(|d| d.position)
            .ok_or(CoreError::UnknownDeposit(deposit))?;

        self.core.look_at(deposit, world);
        self.core.deposit = Some(deposit);
        self.core.recent_deposit = Some(deposit);
        self.core.locomotion.set_destination(point);
        self.change_state(HarvesterState::Harvest, world)?;
        Ok(())
    }

    /// Collects a loose cargo item: heads for it and enters PickUp.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::UnknownCargo`] if `item` is not lying in the
    /// world.
    pub fn go_to_pickup(&mut self, item: EntityId, world: &mut World) -> Result<(), CoreError> {
        let point = world
            .loose_cargo(item)
            .map(|c| c.position)
            .ok_or(CoreError::UnknownCargo(item))?;

        self.core.pickup = Some(item);
        self.core.look_at(item, world);
        self.core.locomotion.set_destination(point);
        self.change_state(HarvesterState::PickUp, world)?;
        Ok(())
    }

    /// Heads home with whatever is carried.
    ///
    /// Clean cargo goes to the stockpile (Stock), tainted cargo to the
    /// facility door (Decontaminate). Empty-handed units walk to the
    /// stockpile and go Idle.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::MissingLandmark`] if the needed landmark is
    /// missing.
    pub fn recall(&mut self, world: &mut World) -> Result<(), CoreError> {
        let standoff = self.core.config.stockpile_standoff;
        let (destination, point) = if self.core.ledger.has(CargoKind::Clean) {
            let silo = world.landmark(LandmarkKind::Stockpile)?;
            (HarvesterState::Stock, silo.standoff_point(standoff))
        } else if self.core.ledger.has(CargoKind::Tainted) {
            let plant = world.landmark(LandmarkKind::DecontaminationFacility)?;
            (HarvesterState::Decontaminate, plant.entrance())
        } else {
            let silo = world.landmark(LandmarkKind::Stockpile)?;
            (HarvesterState::Idle, silo.standoff_point(standoff))
        };

        self.change_state(destination, world)?;
        self.core.locomotion.set_destination(point);
        Ok(())
    }

    /// Stops where the unit stands and goes Idle.
    ///
    /// # Errors
    ///
    /// Entering Idle needs no landmark, so this only fails if
    /// [`change_state`](Self::change_state) does.
    pub fn cancel_action(&mut self, world: &mut World) -> Result<(), CoreError> {
        let here = self.core.locomotion.position();
        self.core.locomotion.set_destination(here);
        self.change_state(HarvesterState::Idle, world)?;
        Ok(())
    }

    /// Casts the area taunt if it is recharged.
    ///
    /// Returns `true` if at least one hostile was taunted. With nobody in
    /// range the cooldown is kept.
    pub fn special_ability(&mut self, world: &mut World) -> bool {
        if !self.core.skill.is_ready() {
            return false;
        }
        let center = self.core.locomotion.position();
        let taunted = ability::area_taunt(world, self.core.id, center, self.core.config.taunt_radius);
        if taunted.is_empty() {
            return false;
        }
        self.core.skill.reset();
        true
    }

    // -------------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------------

    /// Identifier.
    #[must_use]
    pub fn id(&self) -> EntityId {
        self.core.id
    }

    /// Current behavior state.
    #[must_use]
    pub fn state(&self) -> HarvesterState {
        self.fsm.current_state()
    }

    /// The behavior state machine.
    #[must_use]
    pub fn machine(&self) -> &StateMachine<HarvesterState, UnitCore<L>> {
        &self.fsm
    }

    /// Tuning this unit was built with.
    #[must_use]
    pub fn config(&self) -> &HarvesterConfig {
        &self.core.config
    }

    /// Live stats; `health` is current.
    #[must_use]
    pub fn stats(&self) -> &UnitStats {
        &self.core.stats
    }

    /// Current health.
    #[must_use]
    pub fn health(&self) -> u32 {
        self.core.stats.health
    }

    /// Ability recharge.
    #[must_use]
    pub fn skill(&self) -> &SkillCooldown {
        &self.core.skill
    }

    /// Cargo carried.
    #[must_use]
    pub fn ledger(&self) -> &CargoLedger {
        &self.core.ledger
    }

    /// Activity timers.
    #[must_use]
    pub fn timers(&self) -> &ActivityTimers {
        &self.core.timers
    }

    /// Status flags.
    #[must_use]
    pub fn flags(&self) -> UnitFlags {
        self.core.flags
    }

    /// Remembered enemy.
    #[must_use]
    pub fn enemy(&self) -> Option<EntityId> {
        self.core.enemy
    }

    /// Deposit being mined.
    #[must_use]
    pub fn deposit(&self) -> Option<EntityId> {
        self.core.deposit
    }

    /// Deposit to return to after a delivery.
    #[must_use]
    pub fn recent_deposit(&self) -> Option<EntityId> {
        self.core.recent_deposit
    }

    /// Item being collected.
    #[must_use]
    pub fn pickup(&self) -> Option<EntityId> {
        self.core.pickup
    }

    /// Object the look-at controller tracks.
    #[must_use]
    pub fn look_target(&self) -> Option<EntityId> {
        self.core.look_target
    }

    /// Ground position.
    #[must_use]
    pub fn position(&self) -> Vec2 {
        self.core.locomotion.position()
    }

    /// Facing angle in radians.
    #[must_use]
    pub fn heading(&self) -> f32 {
        self.core.heading
    }

    /// Unit vector the harvester faces.
    #[must_use]
    pub fn forward(&self) -> Vec2 {
        self.core.transform().forward()
    }

    /// The locomotion provider.
    #[must_use]
    pub fn locomotion(&self) -> &L {
        &self.core.locomotion
    }

    /// Mutable access to the locomotion provider.
    #[must_use]
    pub fn locomotion_mut(&mut self) -> &mut L {
        &mut self.core.locomotion
    }

    /// Returns `true` while health is above zero.
    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.core.stats.health > 0
    }
}
