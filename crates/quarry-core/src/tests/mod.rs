//! Scenario tests for the harvester behavior machine.
//!
//! - `helpers.rs`: a compact layout where every destination is already
//!   within arrival tolerance, so tests count ticks without waiting on travel
//! - `scenarios.rs`: harvest, purify, deliver, fight and recover end to end
//! - `determinism.rs`: identical inputs give identical runs

mod helpers;

pub use helpers::*;
