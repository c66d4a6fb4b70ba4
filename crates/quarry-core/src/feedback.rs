//! Presentation cues and transient notices.
//!
//! The core only ever writes here. Animation selection, combat text and the
//! like live outside the simulation; they drain [`FeedbackLog`] at their own
//! pace. Nothing in the core waits on, or reads back, what it wrote.

use std::collections::VecDeque;

use glam::Vec4;
use serde::{Deserialize, Serialize};

use crate::entity::{EntityId, HealthBand};

/// A discrete cue for the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Cue {
    /// Return to the idle pose.
    Idle,
    /// Start an attack swing; its effect frame calls back into the core.
    AttackTrigger,
    /// Play the work gesture at a deposit.
    Interact,
    /// Start dying; the end of the animation calls back into the core.
    Death,
    /// Walking started (`true`) or stopped (`false`).
    Walking(bool),
    /// Health crossed into a different band.
    HealthBand(HealthBand),
}

/// Why a notice was raised.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NoticeContext {
    /// A hit landed.
    Combat,
    /// A unit was mined.
    Mining,
    /// A unit was purified.
    Decontamination,
    /// A unit was delivered.
    Delivery,
    /// An item was picked up.
    PickUp,
    /// A taunt landed or was shouted.
    Taunt,
}

impl NoticeContext {
    /// Caption used when a notice carries no text of its own.
    #[must_use]
    pub const fn default_caption(self) -> Option<&'static str> {
        match self {
            Self::Mining => Some("Mining.."),
            Self::Decontamination => Some("Decontaminating..."),
            Self::PickUp => Some("Picked up.."),
            Self::Combat | Self::Delivery | Self::Taunt => None,
        }
    }
}

/// Transient text anchored to an entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notice {
    /// Entity the text floats above.
    pub anchor: EntityId,
    /// RGBA color.
    pub color: Vec4,
    /// Explicit text; `None` means the context's default caption.
    pub text: Option<String>,
    /// What happened.
    pub context: NoticeContext,
}

impl Notice {
    /// Text to display, resolving the default caption.
    #[must_use]
    pub fn caption(&self) -> Option<&str> {
        self.text
            .as_deref()
            .or_else(|| self.context.default_caption())
    }
}

/// Notice colors.
pub mod colors {
    use glam::Vec4;

    /// Work progress.
    pub const WHITE: Vec4 = Vec4::new(1.0, 1.0, 1.0, 1.0);
    /// Deliveries.
    pub const RED: Vec4 = Vec4::new(1.0, 0.0, 0.0, 1.0);
    /// Combat and taunts.
    pub const MAGENTA: Vec4 = Vec4::new(1.0, 0.0, 0.7, 0.75);
}

/// Cues kept by [`FeedbackLog::new`] before the oldest is dropped.
pub const DEFAULT_CUE_CAPACITY: usize = 1024;

/// Write-only sink for cues and notices.
///
/// Both streams are bounded queues that drop their oldest entry when full,
/// so a consumer that never drains cannot make the log grow without limit.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeedbackLog {
    cues: VecDeque<(EntityId, Cue)>,
    cue_capacity: usize,
    dropped_cues: usize,
    notices: VecDeque<Notice>,
    notice_capacity: usize,
    dropped_notices: usize,
}

impl FeedbackLog {
    /// Creates a log keeping at most `notice_capacity` notices and
    /// [`DEFAULT_CUE_CAPACITY`] cues.
    #[must_use]
    pub fn new(notice_capacity: usize) -> Self {
        Self::with_capacities(notice_capacity, DEFAULT_CUE_CAPACITY)
    }

    /// Creates a log with explicit bounds for both queues.
    #[must_use]
    pub fn with_capacities(notice_capacity: usize, cue_capacity: usize) -> Self {
        Self {
            cues: VecDeque::with_capacity(cue_capacity.min(DEFAULT_CUE_CAPACITY)),
            cue_capacity,
            dropped_cues: 0,
            notices: VecDeque::with_capacity(notice_capacity),
            notice_capacity,
            dropped_notices: 0,
        }
    }

    /// Records a cue for `entity`, evicting the oldest if the queue is full.
    pub fn cue(&mut self, entity: EntityId, cue: Cue) {
        if self.cue_capacity == 0 {
            self.dropped_cues += 1;
            return;
        }
        if self.cues.len() >= self.cue_capacity {
            self.cues.pop_front();
            self.dropped_cues += 1;
        }
        self.cues.push_back((entity, cue));
    }

    /// Queues a notice, evicting the oldest if the queue is full.
    pub fn notify(&mut self, notice: Notice) {
        if self.notice_capacity == 0 {
            self.dropped_notices += 1;
            return;
        }
        if self.notices.len() >= self.notice_capacity {
            self.notices.pop_front();
            self.dropped_notices += 1;
        }
        self.notices.push_back(notice);
    }

    /// Shorthand for [`notify`](Self::notify).
    pub fn say(
        &mut self,
        anchor: EntityId,
        color: Vec4,
        text: Option<&str>,
        context: NoticeContext,
    ) {
        self.notify(Notice {
            anchor,
            color,
            text: text.map(str::to_owned),
            context,
        });
    }

    /// Retained cues, oldest first.
    pub fn cues(&self) -> impl Iterator<Item = &(EntityId, Cue)> + '_ {
        self.cues.iter()
    }

    /// Cues recorded for one entity.
    pub fn cues_for(&self, entity: EntityId) -> impl Iterator<Item = Cue> + '_ {
        self.cues
            .iter()
            .filter(move |(id, _)| *id == entity)
            .map(|(_, cue)| *cue)
    }

    /// Queued notices, oldest first.
    pub fn notices(&self) -> impl Iterator<Item = &Notice> + '_ {
        self.notices.iter()
    }

    /// Takes every queued notice.
    pub fn drain_notices(&mut self) -> Vec<Notice> {
        self.notices.drain(..).collect()
    }

    /// Takes every retained cue.
    pub fn drain_cues(&mut self) -> Vec<(EntityId, Cue)> {
        self.cues.drain(..).collect()
    }

    /// Cues evicted or refused because the queue was full.
    #[must_use]
    pub const fn dropped_cues(&self) -> usize {
        self.dropped_cues
    }

    /// Notices evicted or refused because the queue was full.
    #[must_use]
    pub const fn dropped_notices(&self) -> usize {
        self.dropped_notices
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn notice(n: u64) -> Notice {
        Notice {
            anchor: EntityId::new(n),
            color: colors::WHITE,
            text: None,
            context: NoticeContext::Mining,
        }
    }

    #[test]
    fn default_captions() {
        assert_eq!(notice(1).caption(), Some("Mining.."));

        let mut n = notice(1);
        n.context = NoticeContext::Combat;
        assert_eq!(n.caption(), None);

        n.text = Some("+1 Mineral Stocked".to_string());
        assert_eq!(n.caption(), Some("+1 Mineral Stocked"));
    }

    #[test]
    fn full_queue_drops_oldest() {
        let mut log = FeedbackLog::new(2);
        log.notify(notice(1));
        log.notify(notice(2));
        log.notify(notice(3));

        let anchors: Vec<_> = log.notices().map(|n| n.anchor.as_u64()).collect();
        assert_eq!(anchors, vec![2, 3]);
        assert_eq!(log.dropped_notices(), 1);
    }

    #[test]
    fn zero_capacity_refuses_everything() {
        let mut log = FeedbackLog::new(0);
        log.notify(notice(1));
        assert_eq!(log.notices().count(), 0);
        assert_eq!(log.dropped_notices(), 1);
    }

    #[test]
    fn cues_filter_by_entity() {
        let mut log = FeedbackLog::new(4);
        log.cue(EntityId::new(1), Cue::Idle);
        log.cue(EntityId::new(2), Cue::Death);
        log.cue(EntityId::new(1), Cue::Interact);

        let cues: Vec<_> = log.cues_for(EntityId::new(1)).collect();
        assert_eq!(cues, vec![Cue::Idle, Cue::Interact]);
    }

    #[test]
    fn drain_empties() {
        let mut log = FeedbackLog::new(4);
        log.say(EntityId::new(1), colors::RED, Some("hi"), NoticeContext::Delivery);
        log.cue(EntityId::new(1), Cue::Idle);

        assert_eq!(log.drain_notices().len(), 1);
        assert_eq!(log.drain_cues().len(), 1);
        assert_eq!(log.notices().count(), 0);
        assert_eq!(log.cues().count(), 0);
    }

    #[test]
    fn full_cue_queue_drops_oldest() {
        let mut log = FeedbackLog::with_capacities(4, 2);
        log.cue(EntityId::new(1), Cue::Idle);
        log.cue(EntityId::new(2), Cue::Death);
        log.cue(EntityId::new(3), Cue::Interact);

        let ids: Vec<_> = log.cues().map(|(id, _)| id.as_u64()).collect();
        assert_eq!(ids, vec![2, 3]);
        assert_eq!(log.dropped_cues(), 1);
    }

    #[test]
    fn zero_cue_capacity_refuses_everything() {
        let mut log = FeedbackLog::with_capacities(4, 0);
        log.cue(EntityId::new(1), Cue::Idle);
        assert_eq!(log.cues().count(), 0);
        assert_eq!(log.dropped_cues(), 1);
    }
}
