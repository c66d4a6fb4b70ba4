//! Cargo items and the per-harvester cargo ledger.
//!
//! A [`CargoItem`] always has exactly one owner: either the [`CargoLedger`]
//! of the harvester carrying it, or the world's loose-cargo table. Moving an
//! item between the two is a move of the value, so an item can never be
//! attached to two units or be both carried and lying on the ground.
//!
//! # Counters
//!
//! The ledger keeps two numbers next to the attached items:
//!
//! - `carried`: cargo units still to be processed. While harvesting it counts
//!   units mined toward the next load; with tainted cargo it counts pending
//!   purification steps; in Stock it counts units left to deliver.
//! - `delivered`: units of the current clean stack already handed to the
//!   stockpile. It survives interruptions so that
//!   [`retally`](CargoLedger::retally) can reconstruct `carried` after a unit
//!   returns to Stock.

use std::f32::consts::TAU;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::entity::EntityId;

/// Whether a cargo item can be delivered as is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CargoKind {
    /// Deliverable cargo.
    Clean,
    /// Cargo that must be purified first.
    Tainted,
}

/// A physical token for one load of cargo.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CargoItem {
    /// Identifier.
    pub id: EntityId,
    /// Clean or tainted.
    pub kind: CargoKind,
    /// Where the item lies when loose. Meaningless while attached.
    pub position: Vec2,
    /// Visible stacks are active; extra loads stacked under them are not.
    pub active: bool,
}

impl CargoItem {
    /// Creates an active item.
    #[must_use]
    pub const fn new(id: EntityId, kind: CargoKind, position: Vec2) -> Self {
        Self {
            id,
            kind,
            position,
            active: true,
        }
    }
}

/// Cargo carried by one harvester.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CargoLedger {
    capacity: u32,
    carried: u32,
    delivered: u32,
    items: Vec<CargoItem>,
}

impl CargoLedger {
    /// Creates an empty ledger for loads of `capacity` units.
    #[must_use]
    pub const fn new(capacity: u32) -> Self {
        Self {
            capacity,
            carried: 0,
            delivered: 0,
            items: Vec::new(),
        }
    }

    /// Units in one full load.
    #[must_use]
    pub const fn capacity(&self) -> u32 {
        self.capacity
    }

    /// Units still to be processed.
    #[must_use]
    pub const fn carried(&self) -> u32 {
        self.carried
    }

    /// Units of the current stack already delivered.
    #[must_use]
    pub const fn delivered(&self) -> u32 {
        self.delivered
    }

    /// Attached items, oldest first.
    #[must_use]
    pub fn items(&self) -> &[CargoItem] {
        &self.items
    }

    /// Returns `true` if no item is attached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Number of attached items of `kind`.
    #[must_use]
    pub fn count_of(&self, kind: CargoKind) -> usize {
        self.items.iter().filter(|item| item.kind == kind).count()
    }

    /// Returns `true` if at least one item of `kind` is attached.
    #[must_use]
    pub fn has(&self, kind: CargoKind) -> bool {
        self.items.iter().any(|item| item.kind == kind)
    }

    /// Counts one mined unit. Returns `true` once a full load is reached.
    pub fn add_unit(&mut self) -> bool {
        self.carried = (self.carried + 1).min(self.capacity);
        self.carried >= self.capacity
    }

    /// Spends one unit, stopping at zero. Returns the units left.
    pub fn spend_unit(&mut self) -> u32 {
        self.carried = self.carried.saturating_sub(1);
        self.carried
    }

    /// Hands one unit to the stockpile. Returns the units left.
    pub fn record_delivery(&mut self) -> u32 {
        self.delivered += 1;
        self.spend_unit()
    }

    /// Forgets the delivered count once a stack is finished.
    pub fn reset_delivered(&mut self) {
        self.delivered = 0;
    }

    /// Clears the carried count.
    pub fn reset_carried(&mut self) {
        self.carried = 0;
    }

    /// Sets the carried count to one full load.
    pub fn fill(&mut self) {
        self.carried = self.capacity;
    }

    /// Reconstructs the carried count from the attached clean stacks.
    ///
    /// Each clean item is worth one full load; units already delivered from
    /// the current stack are subtracted. Tainted items do not count.
    pub fn retally(&mut self) -> u32 {
        let stacks = u32::try_from(self.count_of(CargoKind::Clean)).unwrap_or(u32::MAX);
        self.carried = self
            .capacity
            .saturating_mul(stacks)
            .saturating_sub(self.delivered);
        self.carried
    }

    /// Attaches an item.
    pub fn attach(&mut self, item: CargoItem) {
        self.items.push(item);
    }

    /// Destroys every attached item of `kind`. Returns how many went.
    pub fn destroy_all(&mut self, kind: CargoKind) -> usize {
        let before = self.items.len();
        self.items.retain(|item| item.kind != kind);
        before - self.items.len()
    }

    /// Detaches every item and clears the carried count.
    ///
    /// The delivered count is kept: a partly delivered stack that is dropped
    /// and picked up again resumes where it left off.
    pub fn detach_all(&mut self) -> Vec<CargoItem> {
        self.carried = 0;
        std::mem::take(&mut self.items)
    }
}

/// Evenly spaced points on a circle of `radius` around `center`.
///
/// Point `i` of `count` sits at angle `i * 2π / count`, starting on +X.
pub fn drop_ring(center: Vec2, radius: f32, count: usize) -> impl Iterator<Item = Vec2> {
    #[allow(clippy::cast_precision_loss)]
    let step = if count == 0 { 0.0 } else { TAU / count as f32 };
    (0..count).map(move |i| {
        #[allow(clippy::cast_precision_loss)]
        let angle = i as f32 * step;
        center + Vec2::from_angle(angle) * radius
    })
}
