//! Per-activity timers.
//!
//! Harvesting, purifying and delivering each advance one cargo unit per
//! `interval` time units; attacks wait `attack_cooldown`. A timer saturates
//! at its threshold, so a unit that idles for a long time is ready exactly
//! once rather than accumulating a backlog.

use serde::{Deserialize, Serialize};

/// The activities a harvester paces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Activity {
    /// Mining one unit from a deposit.
    Harvest,
    /// Purifying one tainted unit.
    Purify,
    /// Handing one unit to the stockpile.
    Delivery,
    /// Swinging at the current enemy.
    Attack,
}

/// Elapsed time per activity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityTimers {
    interval: f32,
    attack_cooldown: f32,
    harvest: f32,
    purify: f32,
    delivery: f32,
    attack: f32,
}

impl ActivityTimers {
    /// Creates timers with harvest, purify and attack ready to fire and
    /// delivery starting from zero.
    #[must_use]
    pub const fn new(interval: f32, attack_cooldown: f32) -> Self {
        Self {
            interval,
            attack_cooldown,
            harvest: interval,
            purify: interval,
            delivery: 0.0,
            attack: attack_cooldown,
        }
    }

    /// Advances the timers that run every tick regardless of state.
    ///
    /// Delivery only runs while a unit is unloading; see
    /// [`accrue`](Self::accrue).
    pub fn advance(&mut self, dt: f32) {
        for activity in [Activity::Harvest, Activity::Purify, Activity::Attack] {
            self.accrue(activity, dt);
        }
    }

    /// Adds `dt` to one activity's timer.
    pub fn accrue(&mut self, activity: Activity, dt: f32) {
        let threshold = self.threshold(activity);
        let slot = self.slot_mut(activity);
        *slot = (*slot + dt).min(threshold);
    }

    /// Returns `true` once the activity's threshold has elapsed.
    #[must_use]
    pub fn is_ready(&self, activity: Activity) -> bool {
        self.elapsed(activity) >= self.threshold(activity)
    }

    /// Restarts one activity's timer.
    pub fn reset(&mut self, activity: Activity) {
        *self.slot_mut(activity) = 0.0;
    }

    /// Drops any progress toward the next harvest, purify or delivery step.
    ///
    /// Called when an interruption cancels the current logistics job.
    pub fn abandon_logistics(&mut self) {
        for activity in [Activity::Harvest, Activity::Purify, Activity::Delivery] {
            self.reset(activity);
        }
    }

    /// Time accumulated toward the activity's next step.
    #[must_use]
    pub const fn elapsed(&self, activity: Activity) -> f32 {
        match activity {
            Activity::Harvest => self.harvest,
            Activity::Purify => self.purify,
            Activity::Delivery => self.delivery,
            Activity::Attack => self.attack,
        }
    }

    /// Time required between steps of the activity.
    #[must_use]
    pub const fn threshold(&self, activity: Activity) -> f32 {
        match activity {
            Activity::Attack => self.attack_cooldown,
            Activity::Harvest | Activity::Purify | Activity::Delivery => self.interval,
        }
    }

    fn slot_mut(&mut self, activity: Activity) -> &mut f32 {
        match activity {
            Activity::Harvest => &mut self.harvest,
            Activity::Purify => &mut self.purify,
            Activity::Delivery => &mut self.delivery,
            Activity::Attack => &mut self.attack,
        }
    }
}
