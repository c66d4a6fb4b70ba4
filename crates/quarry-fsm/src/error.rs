//! Setup errors raised while building a state machine.

use std::fmt;

/// Errors raised while registering states and transitions.
///
/// The transition table is fixed at initialization, so every variant is a
/// configuration mistake by the owner of the machine. Feeding an event that
/// has no matching edge is *not* an error; see
/// [`StateMachine::feed`](crate::StateMachine::feed).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FsmError<S: fmt::Debug + fmt::Display> {
    /// A state with this name was already registered.
    #[error("state `{0}` is already registered")]
    DuplicateState(S),

    /// A transition referenced a state that was never registered.
    #[error("state `{0}` is not registered")]
    UnknownState(S),

    /// The `(from, event)` key already has an outgoing edge.
    #[error("state `{from}` already has a transition for event `{event}`")]
    DuplicateTransition {
        /// Source state of the rejected edge.
        from: S,
        /// Event name of the rejected edge.
        event: String,
    },
}
