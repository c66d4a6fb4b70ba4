//! # Quarry FSM
//!
//! A small, generic finite state machine driven synchronously by its owner.
//!
//! The machine is generic over:
//! - `S`: the state-name type (usually a fieldless enum)
//! - `C`: the context handed to entry handlers when a state is entered
//!
//! Entry handlers are bound per machine instance, so two units of the same
//! type can react differently to entering the same state without subclassing
//! anything. Handlers receive the owner's context plus a single numeric
//! parameter chosen by whoever fed the event.
//!
//! ## Semantics
//!
//! - Registration is strict: duplicate states, duplicate `(from, event)` keys
//!   and edges to unknown states are rejected with [`FsmError`].
//! - [`StateMachine::feed`] is lenient: an event with no edge from the
//!   current state is silently ignored, with no handler call and no state
//!   change.
//! - A successful feed calls exactly one entry handler (the destination's,
//!   if it has one) and then commits the new current state.
//!
//! ## Example
//!
//! ```
//! use quarry_fsm::StateMachine;
//!
//! #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
//! enum Door { Closed, Open }
//!
//! impl std::fmt::Display for Door {
//!     fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
//!         write!(f, "{self:?}")
//!     }
//! }
//!
//! let mut fsm: StateMachine<Door, u32> = StateMachine::new(Door::Closed);
//! fsm.create_state(Door::Open, |swings: &mut u32, _param: f32| *swings += 1)?;
//! fsm.add_transition(Door::Closed, Door::Open, "push")?;
//!
//! let mut swings = 0;
//! assert_eq!(fsm.feed(&mut swings, "pull", 0.0), None);
//! assert_eq!(fsm.feed(&mut swings, "push", 0.0), Some(Door::Open));
//! assert_eq!(fsm.current_state(), Door::Open);
//! assert_eq!(swings, 1);
//! # Ok::<(), quarry_fsm::FsmError<Door>>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

mod error;

pub use error::FsmError;

use std::collections::BTreeMap;
use std::fmt;

use tracing::trace;

/// Bounds required of a state-name type.
///
/// `Ord` keeps the transition table in a deterministic order; `Display` is
/// used in error messages and log fields.
pub trait StateName: Copy + Ord + fmt::Debug + fmt::Display {}

impl<T> StateName for T where T: Copy + Ord + fmt::Debug + fmt::Display {}

/// Behavior run when the machine enters a state.
///
/// Any `Fn(&mut C, f32)` closure implements this trait, which is the usual
/// way to bind a handler.
pub trait OnEnter<C>: Send + Sync {
    /// Enters the state with the parameter supplied to
    /// [`StateMachine::feed`].
    fn enter(&self, ctx: &mut C, param: f32);
}

impl<C, F> OnEnter<C> for F
where
    F: Fn(&mut C, f32) + Send + Sync,
{
    fn enter(&self, ctx: &mut C, param: f32) {
        self(ctx, param);
    }
}

/// A registered state and its optional entry handler.
struct StateSlot<C> {
    entry: Option<Box<dyn OnEnter<C>>>,
}

/// Generic finite state machine with named transitions.
///
/// See the [crate docs](crate) for the contract.
pub struct StateMachine<S: StateName, C> {
    /// Registered states keyed by name.
    states: BTreeMap<S, StateSlot<C>>,
    /// Outgoing edges: `from -> (event -> to)`.
    transitions: BTreeMap<S, BTreeMap<String, S>>,
    /// The state the machine is currently in.
    current: S,
}

impl<S: StateName, C> fmt::Debug for StateMachine<S, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateMachine")
            .field("current", &self.current)
            .field("states", &self.states.keys().collect::<Vec<_>>())
            .field("transitions", &self.transition_count())
            .finish()
    }
}

impl<S: StateName, C> StateMachine<S, C> {
    /// Creates a machine whose current state is `initial`.
    ///
    /// The initial state is registered without an entry handler; it is
    /// never "entered", the machine simply starts there.
    #[must_use]
    pub fn new(initial: S) -> Self {
        let mut states = BTreeMap::new();
        states.insert(initial, StateSlot { entry: None });
        Self {
            states,
            transitions: BTreeMap::new(),
            current: initial,
        }
    }

    /// Registers a state with an entry handler.
    ///
    /// # Errors
    ///
    /// Returns [`FsmError::DuplicateState`] if `name` is already registered.
    pub fn create_state<H>(&mut self, name: S, handler: H) -> Result<(), FsmError<S>>
    where
        H: OnEnter<C> + 'static,
    {
        self.insert_state(name, Some(Box::new(handler)))
    }

    /// Registers a state that does nothing when entered.
    ///
    /// # Errors
    ///
    /// Returns [`FsmError::DuplicateState`] if `name` is already registered.
    pub fn create_passive_state(&mut self, name: S) -> Result<(), FsmError<S>> {
        self.insert_state(name, None)
    }

    fn insert_state(
        &mut self,
        name: S,
        entry: Option<Box<dyn OnEnter<C>>>,
    ) -> Result<(), FsmError<S>> {
        if self.states.contains_key(&name) {
            return Err(FsmError::DuplicateState(name));
        }
        self.states.insert(name, StateSlot { entry });
        Ok(())
    }

    /// Adds a directed edge `from -> to` taken when `event` is fed in `from`.
    ///
    /// # Errors
    ///
    /// - [`FsmError::UnknownState`] if either state is unregistered
    /// - [`FsmError::DuplicateTransition`] if `(from, event)` already has an edge
    pub fn add_transition(
        &mut self,
        from: S,
        to: S,
        event: impl Into<String>,
    ) -> Result<(), FsmError<S>> {
        for state in [from, to] {
            if !self.states.contains_key(&state) {
                return Err(FsmError::UnknownState(state));
            }
        }

        let event = event.into();
        let edges = self.transitions.entry(from).or_default();
        if edges.contains_key(&event) {
            return Err(FsmError::DuplicateTransition { from, event });
        }
        edges.insert(event, to);
        Ok(())
    }

    /// Feeds an event into the machine.
    ///
    /// Looks up `(current, event)`. If there is no such edge nothing happens
    /// and `None` is returned. Otherwise the destination's entry handler is
    /// invoked with `param`, the destination becomes current, and it is
    /// returned.
    pub fn feed(&mut self, ctx: &mut C, event: &str, param: f32) -> Option<S> {
        let Some(to) = self.target_of(self.current, event) else {
            trace!(state = %self.current, event, "event ignored");
            return None;
        };

        if let Some(handler) = self.states.get(&to).and_then(|slot| slot.entry.as_ref()) {
            handler.enter(ctx, param);
        }

        trace!(from = %self.current, to = %to, event, param, "transition");
        self.current = to;
        Some(to)
    }

    /// Returns the state the machine is currently in.
    #[must_use]
    pub fn current_state(&self) -> S {
        self.current
    }

    /// Returns the destination of `(from, event)`, if such an edge exists.
    #[must_use]
    pub fn target_of(&self, from: S, event: &str) -> Option<S> {
        self.transitions
            .get(&from)
            .and_then(|edges| edges.get(event))
            .copied()
    }

    /// Returns `true` if `name` has been registered.
    #[must_use]
    pub fn has_state(&self, name: S) -> bool {
        self.states.contains_key(&name)
    }

    /// Returns the registered state names in order.
    pub fn states(&self) -> impl Iterator<Item = S> + '_ {
        self.states.keys().copied()
    }

    /// Returns every edge as `(from, event, to)` in deterministic order.
    pub fn transitions(&self) -> impl Iterator<Item = (S, &str, S)> + '_ {
        self.transitions.iter().flat_map(|(from, edges)| {
            edges
                .iter()
                .map(move |(event, to)| (*from, event.as_str(), *to))
        })
    }

    /// Returns the number of registered states, including the initial one.
    #[must_use]
    pub fn state_count(&self) -> usize {
        self.states.len()
    }

    /// Returns the number of registered edges.
    #[must_use]
    pub fn transition_count(&self) -> usize {
        self.transitions.values().map(BTreeMap::len).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
    enum Light {
        Off,
        Red,
        Green,
    }

    impl fmt::Display for Light {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "{self:?}")
        }
    }

    /// Records every `(state, param)` entry.
    type Log = Vec<(Light, f32)>;

    fn traffic_light() -> StateMachine<Light, Log> {
        let mut fsm = StateMachine::new(Light::Off);
        fsm.create_state(Light::Red, |log: &mut Log, p: f32| log.push((Light::Red, p)))
            .unwrap();
        fsm.create_state(Light::Green, |log: &mut Log, p: f32| {
            log.push((Light::Green, p));
        })
        .unwrap();
        fsm.add_transition(Light::Off, Light::Red, "power").unwrap();
        fsm.add_transition(Light::Red, Light::Green, "go").unwrap();
        fsm.add_transition(Light::Green, Light::Red, "stop").unwrap();
        fsm
    }

    mod registration_tests {
        use super::*;

        #[test]
        fn new_starts_in_initial_state() {
            let fsm: StateMachine<Light, Log> = StateMachine::new(Light::Off);
            assert_eq!(fsm.current_state(), Light::Off);
            assert!(fsm.has_state(Light::Off));
            assert_eq!(fsm.state_count(), 1);
            assert_eq!(fsm.transition_count(), 0);
        }

        #[test]
        fn duplicate_state_rejected() {
            let mut fsm = traffic_light();
            let err = fsm.create_passive_state(Light::Red).unwrap_err();
            assert_eq!(err, FsmError::DuplicateState(Light::Red));
        }

        #[test]
        fn initial_state_counts_as_registered() {
            let mut fsm: StateMachine<Light, Log> = StateMachine::new(Light::Off);
            let err = fsm.create_passive_state(Light::Off).unwrap_err();
            assert_eq!(err, FsmError::DuplicateState(Light::Off));
        }

        #[test]
        fn transition_to_unknown_state_rejected() {
            let mut fsm: StateMachine<Light, Log> = StateMachine::new(Light::Off);
            let err = fsm.add_transition(Light::Off, Light::Green, "go").unwrap_err();
            assert_eq!(err, FsmError::UnknownState(Light::Green));
        }

        #[test]
        fn transition_from_unknown_state_rejected() {
            let mut fsm: StateMachine<Light, Log> = StateMachine::new(Light::Off);
            let err = fsm.add_transition(Light::Red, Light::Off, "x").unwrap_err();
            assert_eq!(err, FsmError::UnknownState(Light::Red));
        }

        #[test]
        fn duplicate_transition_key_rejected() {
            let mut fsm = traffic_light();
            let err = fsm.add_transition(Light::Red, Light::Off, "go").unwrap_err();
            assert_eq!(
                err,
                FsmError::DuplicateTransition {
                    from: Light::Red,
                    event: "go".to_string(),
                }
            );
            // The original edge is untouched.
            assert_eq!(fsm.target_of(Light::Red, "go"), Some(Light::Green));
        }

        #[test]
        fn same_event_name_allowed_from_different_states() {
            let mut fsm = traffic_light();
            fsm.add_transition(Light::Green, Light::Off, "power").unwrap();
            assert_eq!(fsm.target_of(Light::Off, "power"), Some(Light::Red));
            assert_eq!(fsm.target_of(Light::Green, "power"), Some(Light::Off));
        }

        #[test]
        fn transitions_listed_in_order() {
            let fsm = traffic_light();
            let edges: Vec<_> = fsm.transitions().collect();
            assert_eq!(
                edges,
                vec![
                    (Light::Off, "power", Light::Red),
                    (Light::Red, "go", Light::Green),
                    (Light::Green, "stop", Light::Red),
                ]
            );
        }
    }

    mod feed_tests {
        use super::*;

        #[test]
        fn feed_calls_destination_handler_once() {
            let mut fsm = traffic_light();
            let mut log = Log::new();

            assert_eq!(fsm.feed(&mut log, "power", 0.5), Some(Light::Red));
            assert_eq!(fsm.current_state(), Light::Red);
            assert_eq!(log, vec![(Light::Red, 0.5)]);
        }

        #[test]
        fn unmatched_event_is_noop() {
            let mut fsm = traffic_light();
            let mut log = Log::new();

            assert_eq!(fsm.feed(&mut log, "go", 1.0), None);
            assert_eq!(fsm.current_state(), Light::Off);
            assert!(log.is_empty());
        }

        #[test]
        fn event_valid_elsewhere_ignored_in_current_state() {
            let mut fsm = traffic_light();
            let mut log = Log::new();
            fsm.feed(&mut log, "power", 0.0);

            // "power" only leaves Off
            assert_eq!(fsm.feed(&mut log, "power", 0.0), None);
            assert_eq!(fsm.current_state(), Light::Red);
            assert_eq!(log.len(), 1);
        }

        #[test]
        fn passive_state_entered_without_handler() {
            let mut fsm = traffic_light();
            fsm.add_transition(Light::Red, Light::Off, "cut").unwrap();
            let mut log = Log::new();

            fsm.feed(&mut log, "power", 0.0);
            assert_eq!(fsm.feed(&mut log, "cut", 9.0), Some(Light::Off));
            assert_eq!(log, vec![(Light::Red, 0.0)]);
        }

        #[test]
        fn cycle_round_trip() {
            let mut fsm = traffic_light();
            let mut log = Log::new();

            fsm.feed(&mut log, "power", 1.0);
            fsm.feed(&mut log, "go", 2.0);
            fsm.feed(&mut log, "stop", 3.0);

            assert_eq!(fsm.current_state(), Light::Red);
            assert_eq!(
                log,
                vec![(Light::Red, 1.0), (Light::Green, 2.0), (Light::Red, 3.0)]
            );
        }
    }

    #[test]
    fn debug_lists_states() {
        let fsm = traffic_light();
        let out = format!("{fsm:?}");
        assert!(out.contains("current: Off"));
        assert!(out.contains("transitions: 3"));
    }
}
