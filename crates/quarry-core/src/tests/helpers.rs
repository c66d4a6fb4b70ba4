//! Test fixtures.
//!
//! The compact layout puts the harvester at the origin with everything it
//! needs within arrival tolerance:
//!
//! - stockpile at `(0, -1)` facing `+Y`, so its standoff point is `(0, 1)`
//! - decontamination facility at `(-1, 0)` with its door at `(-0.5, 0)`
//! - deposits spawned at `(1, 0)`
//!
//! The tick length is exactly one time unit, so every activity fires once
//! per tick with no float accumulation.

use glam::Vec2;

use crate::cargo::CargoKind;
use crate::config::SimulationConfig;
use crate::entity::{EntityId, LandmarkKind, Transform};
use crate::simulation::Simulation;

/// Where the test harvester stands.
pub const HOME: Vec2 = Vec2::ZERO;

/// Where test deposits are placed.
pub const DEPOSIT_SPOT: Vec2 = Vec2::new(1.0, 0.0);

/// Standoff point of the test stockpile.
pub const STOCK_SPOT: Vec2 = Vec2::new(0.0, 1.0);

/// Door of the test facility.
pub const DOOR_SPOT: Vec2 = Vec2::new(-0.5, 0.0);

/// A simulation with one-unit ticks and both landmarks placed.
pub fn compact_sim() -> Simulation {
    let mut sim = bare_sim();
    place_stockpile(&mut sim);
    place_facility(&mut sim);
    sim
}

/// A simulation with one-unit ticks and no landmarks.
pub fn bare_sim() -> Simulation {
    let config = SimulationConfig {
        dt: 1.0,
        ..SimulationConfig::default()
    };
    Simulation::new(config).expect("default config is valid")
}

/// Places the stockpile whose standoff point is [`STOCK_SPOT`].
pub fn place_stockpile(sim: &mut Simulation) -> EntityId {
    sim.world_mut()
        .spawn_landmark(LandmarkKind::Stockpile, Vec2::new(0.0, -1.0), Vec2::Y, None)
}

/// Places the facility whose door is [`DOOR_SPOT`].
pub fn place_facility(sim: &mut Simulation) -> EntityId {
    sim.world_mut().spawn_landmark(
        LandmarkKind::DecontaminationFacility,
        Vec2::new(-1.0, 0.0),
        Vec2::X,
        Some(DOOR_SPOT),
    )
}

/// Spawns a harvester at [`HOME`].
pub fn spawn_unit(sim: &mut Simulation) -> EntityId {
    sim.spawn_at(HOME).expect("spawn succeeds")
}

/// Spawns a deposit at [`DEPOSIT_SPOT`].
pub fn spawn_deposit(sim: &mut Simulation, count: u32, tainted: bool) -> EntityId {
    sim.world_mut().spawn_deposit(DEPOSIT_SPOT, count, tainted)
}

/// Spawns a hostile at `position` facing `heading`.
pub fn spawn_hostile(sim: &mut Simulation, position: Vec2, heading: f32) -> EntityId {
    sim.world_mut()
        .spawn_hostile(Transform::new(position, heading))
}

/// Drops a loose item at `position`.
pub fn spawn_item(sim: &mut Simulation, kind: CargoKind, position: Vec2) -> EntityId {
    sim.world_mut().spawn_loose_cargo(kind, position)
}

/// Sends `unit` to mine `deposit`.
pub fn mine(sim: &mut Simulation, unit: EntityId, deposit: EntityId) {
    sim.command(unit, |h, world| h.set_target_resource(deposit, world))
        .expect("deposit exists");
}

/// Runs `n` ticks.
pub fn run(sim: &mut Simulation, n: usize) {
    for _ in 0..n {
        sim.step().expect("tick succeeds");
    }
}
