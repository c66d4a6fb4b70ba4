//! # Quarry Core
//!
//! Behavior core for worker units ("harvesters") in the Quarry RTS
//! simulation.
//!
//! A harvester mines finite deposits, purifies tainted cargo, delivers loads
//! to a stockpile, defends itself, and resumes its work afterwards. A
//! per-unit state machine arbitrates between those jobs while keeping the
//! cargo counters consistent across interruptions.
//!
//! ## Architecture
//!
//! - **State machine**: [`quarry_fsm`], bound per unit in [`harvester`]
//! - **Combat resolver**: directional damage in [`combat`]
//! - **Activity timers**: pacing of mining, purifying, delivering and
//!   attacking in [`timers`]
//! - **Cargo ledger**: carried and delivered counts plus attached items in
//!   [`cargo`]
//! - **World**: everything a unit points at, resolved by id, in [`world`]
//!
//! Path planning, animation and on-screen text stay outside. The core talks
//! to them through the [`locomotion::Locomotion`] trait and the write-only
//! [`feedback::FeedbackLog`].
//!
//! ## Usage
//!
//! ```
//! use quarry_core::config::SimulationConfig;
//! use quarry_core::entity::LandmarkKind;
//! use quarry_core::harvester::HarvesterState;
//! use quarry_core::simulation::Simulation;
//! use glam::Vec2;
//!
//! let mut sim = Simulation::new(SimulationConfig::default())?;
//! sim.world_mut()
//!     .spawn_landmark(LandmarkKind::Stockpile, Vec2::new(0.0, -8.0), Vec2::Y, None);
//! let deposit = sim.world_mut().spawn_deposit(Vec2::new(6.0, 0.0), 50, false);
//!
//! let unit = sim.spawn_at(Vec2::ZERO)?;
//! sim.command(unit, |h, world| h.set_target_resource(deposit, world))?;
//!
//! for _ in 0..600 {
//!     sim.step()?;
//! }
//! assert_ne!(sim.harvester(unit).map(|h| h.state()), Some(HarvesterState::Idle));
//! # Ok::<(), quarry_core::CoreError>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod ability;
pub mod cargo;
pub mod combat;
pub mod config;
pub mod entity;
pub mod error;
pub mod feedback;
pub mod harvester;
pub mod locomotion;
pub mod simulation;
pub mod timers;
pub mod world;

#[cfg(test)]
mod tests;

pub use error::CoreError;
pub use harvester::{Harvester, HarvesterState};
pub use simulation::Simulation;
pub use world::World;
