//! World registry for everything a harvester points at.
//!
//! The world owns deposits, hostiles, loose cargo and landmarks, plus the
//! process-wide counters and the feedback log. Harvesters are owned by the
//! [`Simulation`](crate::simulation::Simulation) but draw their ids from the
//! same allocator, so every id in a run is unique.
//!
//! # Determinism
//!
//! Storage is `BTreeMap` keyed by [`EntityId`]. Ids are allocated
//! monotonically and never reused, so iteration order is stable and a stale
//! id resolves to `None` instead of to a newer object.
//!
//! # Example
//!
//! ```
//! use quarry_core::world::World;
//! use quarry_core::entity::{LandmarkKind, Transform};
//! use glam::Vec2;
//!
//! let mut world = World::new(16);
//! let deposit = world.spawn_deposit(Vec2::new(4.0, 0.0), 10, false);
//! let raider = world.spawn_hostile(Transform::new(Vec2::new(1.0, 1.0), 0.0));
//! world.spawn_landmark(LandmarkKind::Stockpile, Vec2::ZERO, Vec2::Y, None);
//!
//! assert_eq!(world.position_of(deposit), Some(Vec2::new(4.0, 0.0)));
//! assert_eq!(world.hostiles_within(Vec2::ZERO, 2.0), vec![raider]);
//! assert!(world.landmark(LandmarkKind::Stockpile).is_ok());
//! assert!(world.landmark(LandmarkKind::DecontaminationFacility).is_err());
//! ```

use std::collections::BTreeMap;

use glam::Vec2;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::cargo::{CargoItem, CargoKind};
use crate::entity::{Deposit, EntityId, EntityKind, Hostile, Landmark, LandmarkKind, Transform};
use crate::error::CoreError;
use crate::feedback::FeedbackLog;

// =============================================================================
// Global Counters
// =============================================================================

/// Counters shared by every harvester in a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlobalCounters {
    miners: u32,
    minerals: u64,
}

impl GlobalCounters {
    /// Harvesters currently alive.
    #[must_use]
    pub const fn miners(&self) -> u32 {
        self.miners
    }

    /// Cargo units delivered to any stockpile since the run began.
    #[must_use]
    pub const fn minerals(&self) -> u64 {
        self.minerals
    }

    /// Counts a spawned harvester.
    pub fn miner_spawned(&mut self) {
        self.miners += 1;
    }

    /// Counts a removed harvester, stopping at zero.
    pub fn miner_despawned(&mut self) {
        self.miners = self.miners.saturating_sub(1);
    }

    /// Counts one delivered cargo unit.
    pub fn mineral_delivered(&mut self) {
        self.minerals += 1;
    }
}

// =============================================================================
// World
// =============================================================================

/// Registry of deposits, hostiles, loose cargo and landmarks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct World {
    /// Next id to hand out.
    next_id: u64,
    deposits: BTreeMap<EntityId, Deposit>,
    hostiles: BTreeMap<EntityId, Hostile>,
    /// Detached cargo lying on the ground.
    cargo: BTreeMap<EntityId, CargoItem>,
    landmarks: BTreeMap<EntityId, Landmark>,
    counters: GlobalCounters,
    feedback: FeedbackLog,
}

impl World {
    /// Creates an empty world whose feedback log keeps at most
    /// `notice_capacity` notices and the default number of cues.
    #[must_use]
    pub fn new(notice_capacity: usize) -> Self {
        Self::with_feedback(FeedbackLog::new(notice_capacity))
    }

    /// Creates an empty world writing into `feedback`.
    #[must_use]
    pub fn with_feedback(feedback: FeedbackLog) -> Self {
        Self {
            next_id: 1,
            deposits: BTreeMap::new(),
            hostiles: BTreeMap::new(),
            cargo: BTreeMap::new(),
            landmarks: BTreeMap::new(),
            counters: GlobalCounters::default(),
            feedback,
        }
    }

    /// Hands out a fresh id.
    pub fn allocate_id(&mut self) -> EntityId {
        let id = EntityId::new(self.next_id);
        self.next_id += 1;
        id
    }

    // -------------------------------------------------------------------------
    // Spawning
    // -------------------------------------------------------------------------

    /// Adds a deposit holding `count` units.
    pub fn spawn_deposit(&mut self, position: Vec2, count: u32, tainted: bool) -> EntityId {
        let id = self.allocate_id();
        self.deposits
            .insert(id, Deposit::new(id, position, count, tainted));
        id
    }

    /// Adds an idle hostile.
    pub fn spawn_hostile(&mut self, transform: Transform) -> EntityId {
        let id = self.allocate_id();
        self.hostiles.insert(id, Hostile::new(id, transform));
        id
    }

    /// Adds a landmark.
    pub fn spawn_landmark(
        &mut self,
        kind: LandmarkKind,
        position: Vec2,
        forward: Vec2,
        door: Option<Vec2>,
    ) -> EntityId {
        let id = self.allocate_id();
        self.landmarks.insert(
            id,
            Landmark {
                id,
                kind,
                position,
                forward: forward.normalize_or_zero(),
                door,
            },
        );
        id
    }

    /// Creates a new cargo item that is not yet owned by anyone.
    ///
    /// The caller decides whether it lands in a ledger or on the ground.
    pub fn create_cargo(&mut self, kind: CargoKind, position: Vec2) -> CargoItem {
        let id = self.allocate_id();
        CargoItem::new(id, kind, position)
    }

    /// Adds a pickable item lying at `position`.
    pub fn spawn_loose_cargo(&mut self, kind: CargoKind, position: Vec2) -> EntityId {
        let item = self.create_cargo(kind, position);
        let id = item.id;
        self.cargo.insert(id, item);
        id
    }

    /// Puts a detached item on the ground, visible and pickable.
    pub fn place_cargo(&mut self, mut item: CargoItem, position: Vec2) {
        item.position = position;
        item.active = true;
        self.cargo.insert(item.id, item);
    }

    /// Removes a loose item so it can be attached to a harvester.
    pub fn take_cargo(&mut self, id: EntityId) -> Option<CargoItem> {
        self.cargo.remove(&id)
    }

    /// Removes a deposit, e.g. once its visuals have played out.
    pub fn remove_deposit(&mut self, id: EntityId) -> Option<Deposit> {
        self.deposits.remove(&id)
    }

    /// Removes a hostile.
    pub fn remove_hostile(&mut self, id: EntityId) -> Option<Hostile> {
        self.hostiles.remove(&id)
    }

    // -------------------------------------------------------------------------
    // Lookups
    // -------------------------------------------------------------------------

    /// Returns a deposit by id.
    #[must_use]
    pub fn deposit(&self, id: EntityId) -> Option<&Deposit> {
        self.deposits.get(&id)
    }

    /// Returns a mutable deposit by id.
    #[must_use]
    pub fn deposit_mut(&mut self, id: EntityId) -> Option<&mut Deposit> {
        self.deposits.get_mut(&id)
    }

    /// Returns a hostile by id.
    #[must_use]
    pub fn hostile(&self, id: EntityId) -> Option<&Hostile> {
        self.hostiles.get(&id)
    }

    /// Returns a mutable hostile by id.
    #[must_use]
    pub fn hostile_mut(&mut self, id: EntityId) -> Option<&mut Hostile> {
        self.hostiles.get_mut(&id)
    }

    /// Returns a loose cargo item by id.
    #[must_use]
    pub fn loose_cargo(&self, id: EntityId) -> Option<&CargoItem> {
        self.cargo.get(&id)
    }

    /// The first landmark of `kind`, by id order.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::MissingLandmark`] if the world has none.
    pub fn landmark(&self, kind: LandmarkKind) -> Result<&Landmark, CoreError> {
        self.landmarks
            .values()
            .find(|landmark| landmark.kind == kind)
            .ok_or(CoreError::MissingLandmark(kind))
    }

    /// What `id` refers to, if it is registered here.
    #[must_use]
    pub fn kind_of(&self, id: EntityId) -> Option<EntityKind> {
        if self.deposits.contains_key(&id) {
            Some(EntityKind::Deposit)
        } else if self.hostiles.contains_key(&id) {
            Some(EntityKind::Hostile)
        } else if self.cargo.contains_key(&id) {
            Some(EntityKind::Cargo)
        } else if self.landmarks.contains_key(&id) {
            Some(EntityKind::Landmark)
        } else {
            None
        }
    }

    /// Position of any registered object.
    #[must_use]
    pub fn position_of(&self, id: EntityId) -> Option<Vec2> {
        self.deposits
            .get(&id)
            .map(|d| d.position)
            .or_else(|| self.hostiles.get(&id).map(|h| h.transform.position))
            .or_else(|| self.cargo.get(&id).map(|c| c.position))
            .or_else(|| self.landmarks.get(&id).map(|l| l.position))
    }

    /// Hostiles within `radius` of `center`, sorted by id.
    ///
    /// Dead hostiles are skipped.
    #[must_use]
    pub fn hostiles_within(&self, center: Vec2, radius: f32) -> Vec<EntityId> {
        let radius_sq = radius * radius;
        // BTreeMap order is already id order.
        self.hostiles
            .values()
            .filter(|h| h.health > 0)
            .filter(|h| center.distance_squared(h.transform.position) <= radius_sq)
            .map(|h| h.id)
            .collect()
    }

    // -------------------------------------------------------------------------
    // Iteration
    // -------------------------------------------------------------------------

    /// Deposits in id order.
    pub fn deposits(&self) -> impl Iterator<Item = &Deposit> + '_ {
        self.deposits.values()
    }

    /// Hostiles in id order.
    pub fn hostiles(&self) -> impl Iterator<Item = &Hostile> + '_ {
        self.hostiles.values()
    }

    /// Loose cargo in id order.
    pub fn loose_cargo_items(&self) -> impl Iterator<Item = &CargoItem> + '_ {
        self.cargo.values()
    }

    /// Landmarks in id order.
    pub fn landmarks(&self) -> impl Iterator<Item = &Landmark> + '_ {
        self.landmarks.values()
    }

    // -------------------------------------------------------------------------
    // Shared state
    // -------------------------------------------------------------------------

    /// The global counters.
    #[must_use]
    pub const fn counters(&self) -> &GlobalCounters {
        &self.counters
    }

    /// Mutable access to the global counters.
    #[must_use]
    pub fn counters_mut(&mut self) -> &mut GlobalCounters {
        &mut self.counters
    }

    /// The feedback log.
    #[must_use]
    pub const fn feedback(&self) -> &FeedbackLog {
        &self.feedback
    }

    /// Mutable access to the feedback log.
    #[must_use]
    pub fn feedback_mut(&mut self) -> &mut FeedbackLog {
        &mut self.feedback
    }

    /// Removes deposits with nothing left. Returns how many went.
    ///
    /// Harvesters holding an id of a removed deposit see it as gone on their
    /// next tick.
    pub fn sweep_depleted(&mut self) -> usize {
        let before = self.deposits.len();
        self.deposits.retain(|_, d| d.count > 0);
        let removed = before - self.deposits.len();
        if removed > 0 {
            debug!(removed, "swept depleted deposits");
        }
        removed
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new(32)
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    mod id_tests {
        use super::*;

        #[test]
        fn ids_are_unique_across_kinds() {
            let mut world = World::new(4);
            let a = world.spawn_deposit(Vec2::ZERO, 1, false);
            let b = world.spawn_hostile(Transform::default());
            let c = world.allocate_id();
            let d = world.spawn_loose_cargo(CargoKind::Clean, Vec2::ZERO);
            assert!(a < b && b < c && c < d);
        }

        #[test]
        fn kind_of_resolves() {
            let mut world = World::new(4);
            let deposit = world.spawn_deposit(Vec2::ZERO, 1, false);
            let hostile = world.spawn_hostile(Transform::default());
            let item = world.spawn_loose_cargo(CargoKind::Tainted, Vec2::ZERO);
            let silo = world.spawn_landmark(LandmarkKind::Stockpile, Vec2::ZERO, Vec2::Y, None);

            assert_eq!(world.kind_of(deposit), Some(EntityKind::Deposit));
            assert_eq!(world.kind_of(hostile), Some(EntityKind::Hostile));
            assert_eq!(world.kind_of(item), Some(EntityKind::Cargo));
            assert_eq!(world.kind_of(silo), Some(EntityKind::Landmark));
            assert_eq!(world.kind_of(EntityId::new(999)), None);
        }
    }

    mod cargo_tests {
        use super::*;

        #[test]
        fn take_then_place_moves_item() {
            let mut world = World::new(4);
            let id = world.spawn_loose_cargo(CargoKind::Clean, Vec2::ZERO);

            let mut item = world.take_cargo(id).unwrap();
            assert!(world.loose_cargo(id).is_none());

            item.active = false;
            world.place_cargo(item, Vec2::new(2.0, 3.0));
            let placed = world.loose_cargo(id).unwrap();
            assert_eq!(placed.position, Vec2::new(2.0, 3.0));
            assert!(placed.active);
        }

        #[test]
        fn take_missing_is_none() {
            let mut world = World::new(4);
            assert!(world.take_cargo(EntityId::new(5)).is_none());
        }
    }

    mod query_tests {
        use super::*;

        #[test]
        fn hostiles_within_is_sorted_and_bounded() {
            let mut world = World::new(4);
            let near_b = world.spawn_hostile(Transform::new(Vec2::new(0.0, 4.0), 0.0));
            let far = world.spawn_hostile(Transform::new(Vec2::new(9.0, 0.0), 0.0));
            let near_a = world.spawn_hostile(Transform::new(Vec2::new(5.0, 0.0), 0.0));

            let found = world.hostiles_within(Vec2::ZERO, 5.0);
            assert_eq!(found, vec![near_b, near_a]);
            assert!(!found.contains(&far));
        }

        #[test]
        fn dead_hostiles_are_skipped() {
            let mut world = World::new(4);
            let id = world.spawn_hostile(Transform::default());
            world.hostile_mut(id).unwrap().health = 0;
            assert!(world.hostiles_within(Vec2::ZERO, 5.0).is_empty());
        }

        #[test]
        fn landmark_lookup_by_kind() {
            let mut world = World::new(4);
            let plant = world.spawn_landmark(
                LandmarkKind::DecontaminationFacility,
                Vec2::new(3.0, 3.0),
                Vec2::new(0.0, 2.0),
                Some(Vec2::new(3.0, 4.0)),
            );

            let found = world.landmark(LandmarkKind::DecontaminationFacility).unwrap();
            assert_eq!(found.id, plant);
            assert_eq!(found.forward, Vec2::Y);
            assert_eq!(found.entrance(), Vec2::new(3.0, 4.0));

            let err = world.landmark(LandmarkKind::Stockpile).unwrap_err();
            assert!(matches!(err, CoreError::MissingLandmark(LandmarkKind::Stockpile)));
        }

        #[test]
        fn sweep_removes_empty_deposits() {
            let mut world = World::new(4);
            let empty = world.spawn_deposit(Vec2::ZERO, 0, false);
            let full = world.spawn_deposit(Vec2::ZERO, 3, false);

            assert_eq!(world.sweep_depleted(), 1);
            assert!(world.deposit(empty).is_none());
            assert!(world.deposit(full).is_some());
        }
    }

    #[test]
    fn counters_clamp_miners_at_zero() {
        let mut counters = GlobalCounters::default();
        counters.miner_spawned();
        counters.miner_despawned();
        counters.miner_despawned();
        assert_eq!(counters.miners(), 0);

        counters.mineral_delivered();
        counters.mineral_delivered();
        assert_eq!(counters.minerals(), 2);
    }
}
