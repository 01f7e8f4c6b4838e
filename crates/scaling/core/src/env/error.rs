//! Oracle access errors.
//!
//! Errors related to host facade availability and data access.

use crate::error::{CoreError, ErrorSeverity};
use crate::ids::{ActorId, SessionId};

/// Errors that occur when querying the host through its oracles.
///
/// A missing oracle is a wiring bug; a missing record is the ordinary case of
/// an object that despawned between two callbacks.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum OracleError {
    /// InstanceOracle is not available in the environment.
    #[error("InstanceOracle not available")]
    InstancesNotAvailable,

    /// ParticipantOracle is not available in the environment.
    #[error("ParticipantOracle not available")]
    ParticipantsNotAvailable,

    /// ActorOracle is not available in the environment.
    #[error("ActorOracle not available")]
    ActorsNotAvailable,

    /// StatTableOracle is not available in the environment.
    #[error("StatTableOracle not available")]
    TablesNotAvailable,

    /// The host has no record of this instance.
    #[error("instance for {0} not found")]
    InstanceNotFound(SessionId),

    /// The host has no record of this actor.
    #[error("{0} not found")]
    ActorNotFound(ActorId),
}

impl CoreError for OracleError {
    fn severity(&self) -> ErrorSeverity {
        use OracleError::*;
        match self {
            // Missing oracles are wiring bugs
            InstancesNotAvailable
            | ParticipantsNotAvailable
            | ActorsNotAvailable
            | TablesNotAvailable => ErrorSeverity::Fatal,

            // Objects come and go between callbacks
            InstanceNotFound(_) | ActorNotFound(_) => ErrorSeverity::Recoverable,
        }
    }

    fn error_code(&self) -> &'static str {
        use OracleError::*;
        match self {
            InstancesNotAvailable => "ORACLE_INSTANCES_NOT_AVAILABLE",
            ParticipantsNotAvailable => "ORACLE_PARTICIPANTS_NOT_AVAILABLE",
            ActorsNotAvailable => "ORACLE_ACTORS_NOT_AVAILABLE",
            TablesNotAvailable => "ORACLE_TABLES_NOT_AVAILABLE",
            InstanceNotFound(_) => "ORACLE_INSTANCE_NOT_FOUND",
            ActorNotFound(_) => "ORACLE_ACTOR_NOT_FOUND",
        }
    }
}
