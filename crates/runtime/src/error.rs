//! Errors surfaced by the engine API.
//!
//! Only session creation can fail from the host's point of view; every other
//! entry point degrades to a neutral answer and logs instead.
use thiserror::Error;

use scaling_core::{CoreError, ErrorSeverity, ScaleError, SessionId};

pub type Result<T> = std::result::Result<T, RuntimeError>;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("{0} is already registered")]
    SessionExists(SessionId),

    #[error("failed to create {session}")]
    SessionCreate {
        session: SessionId,
        #[source]
        source: ScaleError,
    },
}

impl RuntimeError {
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            RuntimeError::SessionExists(_) => ErrorSeverity::Validation,
            RuntimeError::SessionCreate { source, .. } => source.severity(),
        }
    }
}
