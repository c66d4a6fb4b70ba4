//! Seeded demo layout.

use std::f32::consts::TAU;

use glam::Vec2;
use quarry_core::entity::{EntityId, LandmarkKind, Transform};
use quarry_core::Simulation;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::debug;

/// What to place in the demo world.
#[derive(Debug, Clone)]
pub struct Layout {
    pub seed: u64,
    pub harvesters: usize,
    pub deposits: usize,
    pub hostiles: usize,
    /// Chance that a deposit yields tainted cargo.
    pub tainted_ratio: f64,
    /// Half-width of the square everything is scattered over.
    pub extent: f32,
}

/// Places landmarks, deposits, hostiles and harvesters, then sends every
/// harvester to a deposit. Returns the harvester ids.
pub fn populate(sim: &mut Simulation, layout: &Layout) -> anyhow::Result<Vec<EntityId>> {
    let mut rng = ChaCha8Rng::seed_from_u64(layout.seed);
    let extent = layout.extent;

    let world = sim.world_mut();
    world.spawn_landmark(
        LandmarkKind::Stockpile,
        Vec2::new(0.0, -extent * 0.5),
        Vec2::Y,
        None,
    );
    let facility = Vec2::new(-extent * 0.5, 0.0);
    world.spawn_landmark(
        LandmarkKind::DecontaminationFacility,
        facility,
        Vec2::X,
        Some(facility + Vec2::X * 2.0),
    );

    let mut deposits = Vec::with_capacity(layout.deposits);
    for _ in 0..layout.deposits {
        let position = scatter(&mut rng, extent);
        let count = rng.gen_range(10..=40);
        let tainted = rng.gen_bool(layout.tainted_ratio);
        let id = world.spawn_deposit(position, count, tainted);
        debug!(deposit = %id, %position, count, tainted, "deposit placed");
        deposits.push(id);
    }

    for _ in 0..layout.hostiles {
        // Hostiles start on the rim and drift inwards.
        let angle = rng.gen_range(0.0..TAU);
        let position = Vec2::from_angle(angle) * extent;
        let id = world.spawn_hostile(Transform::new(position, angle + TAU / 2.0));
        debug!(hostile = %id, %position, "hostile placed");
    }

    let mut units = Vec::with_capacity(layout.harvesters);
    for i in 0..layout.harvesters {
        let position = scatter(&mut rng, extent * 0.25);
        let unit = sim.spawn_at(position)?;
        if !deposits.is_empty() {
            let deposit = deposits[i % deposits.len()];
            sim.command(unit, |h, w| h.set_target_resource(deposit, w))?;
        }
        units.push(unit);
    }
    Ok(units)
}

fn scatter(rng: &mut ChaCha8Rng, extent: f32) -> Vec2 {
    Vec2::new(rng.gen_range(-extent..extent), rng.gen_range(-extent..extent))
}
