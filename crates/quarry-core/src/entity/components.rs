//! State structs for the objects a harvester interacts with.
//!
//! Hostile behavior itself is out of scope; [`Hostile`] only carries what a
//! harvester reads (position, facing, health, aggression radius) and what the
//! taunt ability writes (target, state, destination, taunted flag).

use std::f32::consts::{PI, TAU};

use bitflags::bitflags;
use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::{Combatant, EntityId, ResourceSource};

/// Ground-plane position and facing.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Transform {
    /// World position.
    pub position: Vec2,
    /// Facing angle in radians, counter-clockwise from +X.
    pub heading: f32,
}

impl Transform {
    /// Creates a transform at `position` facing `heading`.
    #[must_use]
    pub const fn new(position: Vec2, heading: f32) -> Self {
        Self { position, heading }
    }

    /// Unit vector along the heading.
    #[must_use]
    pub fn forward(&self) -> Vec2 {
        Vec2::from_angle(self.heading)
    }

    /// Turns toward `target` by fraction `t` of the remaining angle.
    ///
    /// `t` is clamped to `[0, 1]`; `1` snaps straight onto the target. A
    /// target at the current position leaves the heading unchanged.
    pub fn turn_towards(&mut self, target: Vec2, t: f32) {
        let dir = target - self.position;
        if dir.length_squared() <= f32::EPSILON {
            return;
        }
        let desired = dir.y.atan2(dir.x);
        let delta = wrap_angle(desired - self.heading);
        self.heading = wrap_angle(self.heading + delta * t.clamp(0.0, 1.0));
    }
}

/// Wraps an angle into `(-PI, PI]`.
fn wrap_angle(angle: f32) -> f32 {
    let wrapped = (angle + PI).rem_euclid(TAU) - PI;
    if wrapped <= -PI {
        wrapped + TAU
    } else {
        wrapped
    }
}

bitflags! {
    /// Status flags carried by units.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct UnitFlags: u8 {
        /// Health reached zero; waiting for the death callback.
        const DEAD = 1 << 0;
        /// The next hit taken will pull the unit into Battle.
        const PREEMPT_READY = 1 << 1;
        /// Aggression was redirected by a taunt.
        const TAUNTED = 1 << 2;
    }
}

/// Coarse health indicator shown by the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HealthBand {
    /// Above half health.
    Healthy,
    /// At or below half health.
    Wounded,
    /// At or below a quarter of health.
    Critical,
}

impl HealthBand {
    /// Classifies `health` against `max_health`.
    #[must_use]
    pub const fn classify(health: u32, max_health: u32) -> Self {
        if health <= max_health / 4 {
            Self::Critical
        } else if health <= max_health / 2 {
            Self::Wounded
        } else {
            Self::Healthy
        }
    }
}

/// A finite resource source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Deposit {
    /// Identifier.
    pub id: EntityId,
    /// World position.
    pub position: Vec2,
    /// Units remaining.
    pub count: u32,
    /// Whether harvested cargo needs purification.
    pub tainted: bool,
}

impl Deposit {
    /// Creates a deposit.
    #[must_use]
    pub const fn new(id: EntityId, position: Vec2, count: u32, tainted: bool) -> Self {
        Self {
            id,
            position,
            count,
            tainted,
        }
    }
}

impl ResourceSource for Deposit {
    fn count(&self) -> u32 {
        self.count
    }

    fn is_tainted(&self) -> bool {
        self.tainted
    }

    fn extract_one(&mut self) -> bool {
        match self.count.checked_sub(1) {
            Some(left) => {
                self.count = left;
                true
            }
            None => false,
        }
    }
}

/// Behavior state of a hostile, as far as the core needs to set it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum HostileState {
    /// Not engaged.
    #[default]
    Idle,
    /// Engaging its current target.
    Battle,
}

/// An enemy unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hostile {
    /// Identifier.
    pub id: EntityId,
    /// Position and facing.
    pub transform: Transform,
    /// Current health.
    pub health: u32,
    /// Maximum health.
    pub max_health: u32,
    /// Damage dealt per blow.
    pub strength: u32,
    /// Beyond this distance the hostile loses interest in a unit.
    pub aggression_radius: f32,
    /// Behavior state.
    pub state: HostileState,
    /// Unit the hostile is currently after.
    pub target: Option<EntityId>,
    /// Where the hostile is heading.
    pub destination: Option<Vec2>,
    /// Status flags.
    pub flags: UnitFlags,
}

impl Hostile {
    /// Creates an idle hostile with 100 health, strength 4 and a 10-unit
    /// aggression radius.
    #[must_use]
    pub fn new(id: EntityId, transform: Transform) -> Self {
        Self {
            id,
            transform,
            health: 100,
            max_health: 100,
            strength: 4,
            aggression_radius: 10.0,
            state: HostileState::Idle,
            target: None,
            destination: None,
            flags: UnitFlags::empty(),
        }
    }

    /// Redirects aggression onto `caster` standing at `caster_position`.
    pub fn taunt(&mut self, caster: EntityId, caster_position: Vec2) {
        self.target = Some(caster);
        self.flags.insert(UnitFlags::TAUNTED);
        self.state = HostileState::Battle;
        self.destination = Some(caster_position);
    }
}

impl Combatant for Hostile {
    fn health(&self) -> u32 {
        self.health
    }

    fn position(&self) -> Vec2 {
        self.transform.position
    }

    fn forward(&self) -> Vec2 {
        self.transform.forward()
    }

    fn take_damage(&mut self, amount: u32) {
        self.health = self.health.saturating_sub(amount);
        if self.health == 0 {
            self.flags.insert(UnitFlags::DEAD);
        }
    }
}

/// Landmark roles resolved by kind when a destination is needed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum LandmarkKind {
    /// Where clean cargo is delivered.
    Stockpile,
    /// Where tainted cargo is purified.
    DecontaminationFacility,
}

impl std::fmt::Display for LandmarkKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Stockpile => write!(f, "stockpile"),
            Self::DecontaminationFacility => write!(f, "decontamination facility"),
        }
    }
}

/// A fixed building.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Landmark {
    /// Identifier.
    pub id: EntityId,
    /// Role.
    pub kind: LandmarkKind,
    /// World position.
    pub position: Vec2,
    /// Unit vector out of the front face.
    pub forward: Vec2,
    /// Entrance marker, if the building has one.
    pub door: Option<Vec2>,
}

impl Landmark {
    /// Point in front of the building at `standoff` units from its center.
    #[must_use]
    pub fn standoff_point(&self, standoff: f32) -> Vec2 {
        self.position + self.forward * standoff
    }

    /// The door marker, falling back to the building center.
    #[must_use]
    pub fn entrance(&self) -> Vec2 {
        self.door.unwrap_or(self.position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod transform_tests {
        use super::*;

        #[test]
        fn forward_follows_heading() {
            let t = Transform::new(Vec2::ZERO, 0.0);
            assert!((t.forward() - Vec2::X).length() < 1e-6);

            let t = Transform::new(Vec2::ZERO, PI / 2.0);
            assert!((t.forward() - Vec2::Y).length() < 1e-6);
        }

        #[test]
        fn full_turn_snaps_to_target() {
            let mut t = Transform::new(Vec2::ZERO, 0.0);
            t.turn_towards(Vec2::new(0.0, 5.0), 1.0);
            assert!((t.heading - PI / 2.0).abs() < 1e-5);
        }

        #[test]
        fn partial_turn_moves_fraction_of_angle() {
            let mut t = Transform::new(Vec2::ZERO, 0.0);
            t.turn_towards(Vec2::new(0.0, 5.0), 0.5);
            assert!((t.heading - PI / 4.0).abs() < 1e-5);
        }

        #[test]
        fn turn_takes_short_way_round() {
            let mut t = Transform::new(Vec2::ZERO, 0.9 * PI);
            t.turn_towards(Vec2::new(-1.0, -0.1), 1.0);
            // Crossing the +-PI seam, not sweeping through zero.
            assert!(t.heading.abs() > 0.9 * PI);
        }

        #[test]
        fn target_on_top_is_ignored() {
            let mut t = Transform::new(Vec2::new(3.0, 3.0), 1.0);
            t.turn_towards(Vec2::new(3.0, 3.0), 1.0);
            assert!((t.heading - 1.0).abs() < f32::EPSILON);
        }
    }

    #[test]
    fn health_band_thresholds() {
        assert_eq!(HealthBand::classify(100, 100), HealthBand::Healthy);
        assert_eq!(HealthBand::classify(51, 100), HealthBand::Healthy);
        assert_eq!(HealthBand::classify(50, 100), HealthBand::Wounded);
        assert_eq!(HealthBand::classify(26, 100), HealthBand::Wounded);
        assert_eq!(HealthBand::classify(25, 100), HealthBand::Critical);
        assert_eq!(HealthBand::classify(0, 100), HealthBand::Critical);
    }

    mod deposit_tests {
        use super::*;

        #[test]
        fn extract_decrements() {
            let mut d = Deposit::new(EntityId::new(1), Vec2::ZERO, 2, false);
            assert!(d.extract_one());
            assert_eq!(d.count(), 1);
            assert!(d.has_supply());
        }

        #[test]
        fn extract_from_empty_clamps() {
            let mut d = Deposit::new(EntityId::new(1), Vec2::ZERO, 0, true);
            assert!(!d.extract_one());
            assert_eq!(d.count(), 0);
            assert!(!d.has_supply());
            assert!(d.is_tainted());
        }
    }

    mod hostile_tests {
        use super::*;

        #[test]
        fn damage_clamps_at_zero_and_marks_dead() {
            let mut h = Hostile::new(EntityId::new(1), Transform::default());
            h.take_damage(30);
            assert_eq!(h.health(), 70);
            assert!(h.is_alive());

            h.take_damage(500);
            assert_eq!(h.health(), 0);
            assert!(!h.is_alive());
            assert!(h.flags.contains(UnitFlags::DEAD));
        }

        #[test]
        fn taunt_redirects() {
            let mut h = Hostile::new(EntityId::new(1), Transform::default());
            h.taunt(EntityId::new(9), Vec2::new(4.0, 0.0));
            assert_eq!(h.target, Some(EntityId::new(9)));
            assert_eq!(h.state, HostileState::Battle);
            assert_eq!(h.destination, Some(Vec2::new(4.0, 0.0)));
            assert!(h.flags.contains(UnitFlags::TAUNTED));
        }
    }

    #[test]
    fn landmark_points() {
        let silo = Landmark {
            id: EntityId::new(1),
            kind: LandmarkKind::Stockpile,
            position: Vec2::new(10.0, 0.0),
            forward: Vec2::Y,
            door: None,
        };
        assert_eq!(silo.standoff_point(2.0), Vec2::new(10.0, 2.0));
        assert_eq!(silo.entrance(), Vec2::new(10.0, 0.0));
    }

    #[test]
    fn flags_serialize_as_bits() {
        let flags = UnitFlags::DEAD | UnitFlags::TAUNTED;
        let json = serde_json::to_string(&flags).unwrap();
        let back: UnitFlags = serde_json::from_str(&json).unwrap();
        assert_eq!(flags, back);
    }
}
