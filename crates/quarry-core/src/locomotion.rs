//! Locomotion provider interface.
//!
//! Path planning and steering are not part of the core. A harvester asks its
//! provider to go somewhere, reads back how far it still has to go and how
//! fast it is moving, and tunes the stopping distance per state. Any
//! navigation layer can implement [`Locomotion`].
//!
//! [`DirectMover`] is a straight-line implementation with no obstacles,
//! used by tests, benches and the headless runner.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Slack added to arrival checks so a unit parked exactly on its stopping
/// ring still counts as arrived after float rounding.
pub const ARRIVAL_SLACK: f32 = 1e-3;

/// Movement services a harvester relies on.
pub trait Locomotion {
    /// Current ground position.
    fn position(&self) -> Vec2;

    /// Requests movement toward `point`.
    fn set_destination(&mut self, point: Vec2);

    /// Distance left to the destination; `0` with no destination.
    fn remaining_distance(&self) -> f32;

    /// `true` while a route is still being computed.
    fn path_pending(&self) -> bool;

    /// Current velocity.
    fn velocity(&self) -> Vec2;

    /// Distance from the destination at which movement stops.
    fn stopping_distance(&self) -> f32;

    /// Sets the stopping distance.
    fn set_stopping_distance(&mut self, distance: f32);

    /// Whether the provider turns the unit to face its motion.
    fn auto_rotate(&self) -> bool;

    /// Enables or disables facing the direction of motion.
    fn set_auto_rotate(&mut self, enabled: bool);

    /// Moves the provider forward by `dt` time units.
    fn advance(&mut self, dt: f32);

    /// `true` when no route is pending and at most `distance` is left.
    fn is_within(&self, distance: f32) -> bool {
        !self.path_pending() && self.remaining_distance() <= distance + ARRIVAL_SLACK
    }

    /// `true` once the unit is within stopping distance and no route is
    /// pending.
    fn has_arrived(&self) -> bool {
        self.is_within(self.stopping_distance())
    }

    /// `true` while the unit is not moving.
    fn is_stationary(&self) -> bool {
        self.velocity() == Vec2::ZERO
    }
}

/// Straight-line mover.
///
/// Travels at constant `speed` toward the destination and halts once within
/// the stopping distance. Routes are never pending.
///
/// # Example
///
/// ```
/// use quarry_core::locomotion::{DirectMover, Locomotion};
/// use glam::Vec2;
///
/// let mut mover = DirectMover::new(Vec2::ZERO, 2.0);
/// mover.set_stopping_distance(1.0);
/// mover.set_destination(Vec2::new(5.0, 0.0));
///
/// mover.advance(1.0);
/// assert_eq!(mover.position(), Vec2::new(2.0, 0.0));
/// mover.advance(10.0);
/// assert_eq!(mover.position(), Vec2::new(4.0, 0.0));
/// assert!(mover.has_arrived());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DirectMover {
    position: Vec2,
    destination: Option<Vec2>,
    velocity: Vec2,
    speed: f32,
    stopping_distance: f32,
    auto_rotate: bool,
}

impl DirectMover {
    /// Creates a stationary mover at `position`.
    #[must_use]
    pub const fn new(position: Vec2, speed: f32) -> Self {
        Self {
            position,
            destination: None,
            velocity: Vec2::ZERO,
            speed,
            stopping_distance: 0.0,
            auto_rotate: true,
        }
    }

    /// The requested destination, if any.
    #[must_use]
    pub const fn destination(&self) -> Option<Vec2> {
        self.destination
    }

    /// Moves instantly to `position` and stops.
    pub fn teleport(&mut self, position: Vec2) {
        self.position = position;
        self.velocity = Vec2::ZERO;
    }

    /// Forces the reported velocity, e.g. to simulate being shoved.
    pub fn set_velocity(&mut self, velocity: Vec2) {
        self.velocity = velocity;
    }
}

impl Locomotion for DirectMover {
    fn position(&self) -> Vec2 {
        self.position
    }

    fn set_destination(&mut self, point: Vec2) {
        self.destination = Some(point);
    }

    fn remaining_distance(&self) -> f32 {
        self.destination
            .map_or(0.0, |dest| self.position.distance(dest))
    }

    fn path_pending(&self) -> bool {
        false
    }

    fn velocity(&self) -> Vec2 {
        self.velocity
    }

    fn stopping_distance(&self) -> f32 {
        self.stopping_distance
    }

    fn set_stopping_distance(&mut self, distance: f32) {
        self.stopping_distance = distance;
    }

    fn auto_rotate(&self) -> bool {
        self.auto_rotate
    }

    fn set_auto_rotate(&mut self, enabled: bool) {
        self.auto_rotate = enabled;
    }

    fn advance(&mut self, dt: f32) {
        let Some(dest) = self.destination else {
            self.velocity = Vec2::ZERO;
            return;
        };

        let offset = dest - self.position;
        let travel = offset.length() - self.stopping_distance;
        if travel <= 0.0 || dt <= 0.0 {
            self.velocity = Vec2::ZERO;
            return;
        }

        let dir = offset.normalize_or_zero();
        let step = (self.speed * dt).min(travel);
        self.position += dir * step;
        self.velocity = if step < travel {
            dir * self.speed
        } else {
            // Reached the stopping ring this tick.
            Vec2::ZERO
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_destination_means_arrived() {
        let mover = DirectMover::new(Vec2::ZERO, 3.0);
        assert_eq!(mover.remaining_distance(), 0.0);
        assert!(mover.has_arrived());
        assert!(mover.is_stationary());
    }

    #[test]
    fn moves_at_speed_until_stopping_ring() {
        let mut mover = DirectMover::new(Vec2::ZERO, 3.0);
        mover.set_stopping_distance(1.0);
        mover.set_destination(Vec2::new(0.0, 10.0));

        mover.advance(1.0);
        assert_eq!(mover.position(), Vec2::new(0.0, 3.0));
        assert_eq!(mover.velocity(), Vec2::new(0.0, 3.0));
        assert!(!mover.has_arrived());

        for _ in 0..5 {
            mover.advance(1.0);
        }
        assert_eq!(mover.position(), Vec2::new(0.0, 9.0));
        assert!(mover.is_stationary());
        assert!(mover.has_arrived());
    }

    #[test]
    fn inside_stopping_ring_does_not_move() {
        let mut mover = DirectMover::new(Vec2::ZERO, 3.0);
        mover.set_stopping_distance(1.5);
        mover.set_destination(Vec2::new(1.0, 0.0));
        mover.advance(1.0);
        assert_eq!(mover.position(), Vec2::ZERO);
        assert!(mover.has_arrived());
    }

    #[test]
    fn teleport_stops() {
        let mut mover = DirectMover::new(Vec2::ZERO, 3.0);
        mover.set_velocity(Vec2::X);
        mover.teleport(Vec2::new(4.0, 4.0));
        assert_eq!(mover.position(), Vec2::new(4.0, 4.0));
        assert!(mover.is_stationary());
    }

    #[test]
    fn auto_rotate_defaults_on() {
        let mut mover = DirectMover::new(Vec2::ZERO, 3.0);
        assert!(mover.auto_rotate());
        mover.set_auto_rotate(false);
        assert!(!mover.auto_rotate());
    }
}
