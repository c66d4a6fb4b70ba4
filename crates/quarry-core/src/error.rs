//! Error type for the simulation core.
//!
//! Only setup failures and broken caller preconditions surface here. Targets
//! that vanish mid-run, empty deposits and unmatched state machine events
//! are ordinary runtime conditions and never produce an error.

use quarry_fsm::FsmError;

use crate::config::ConfigError;
use crate::entity::{EntityId, LandmarkKind};
use crate::harvester::HarvesterState;

/// Errors raised by the simulation core.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// The harvester state machine could not be built.
    #[error("harvester state machine setup failed: {0}")]
    Fsm(#[from] FsmError<HarvesterState>),

    /// A destination needed a landmark the world does not have.
    #[error("no {0} in the world")]
    MissingLandmark(LandmarkKind),

    /// A command named a deposit that does not exist.
    #[error("unknown deposit {0}")]
    UnknownDeposit(EntityId),

    /// A command named a cargo item that is not lying in the world.
    #[error("unknown loose cargo item {0}")]
    UnknownCargo(EntityId),

    /// A command named a hostile that does not exist.
    #[error("unknown hostile {0}")]
    UnknownHostile(EntityId),

    /// A command named a harvester that does not exist.
    #[error("unknown harvester {0}")]
    UnknownHarvester(EntityId),

    /// The configuration was rejected.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_culprit() {
        assert_eq!(
            CoreError::MissingLandmark(LandmarkKind::Stockpile).to_string(),
            "no stockpile in the world"
        );
        assert_eq!(
            CoreError::UnknownDeposit(EntityId::new(7)).to_string(),
            "unknown deposit 7"
        );
    }

    #[test]
    fn fsm_errors_convert() {
        let err: CoreError = FsmError::DuplicateState(HarvesterState::Idle).into();
        assert!(matches!(err, CoreError::Fsm(_)));
        assert!(err.to_string().contains("Idle"));
    }
}
