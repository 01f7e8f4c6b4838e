//! Common error infrastructure for scaling-core.
//!
//! Errors never cross a component boundary as failures the host has to handle:
//! the component that detects a problem logs it and falls back to a best-effort
//! result. These types exist so that the internal plumbing can still use `?`
//! and so that log lines carry a stable code and severity.
//!
//! # Design Principles
//!
//! - **Local recovery**: callers turn an `Err` into "leave the actor untouched"
//! - **Rich Context**: errors include session, actor, and epoch for debugging
//! - **Severity Classification**: errors are categorized for log levels

use crate::env::OracleError;
use crate::epoch::Epoch;
use crate::ids::{ActorId, SessionId};

/// Severity level of an error, used for categorization and log levels.
///
/// - **Recoverable**: Temporary conditions; the next tick may succeed
/// - **Validation**: Invalid input or configuration that was clamped or ignored
/// - **Internal**: Unexpected state inconsistencies that require investigation
/// - **Fatal**: Data-integrity problems owned by the host (missing tables)
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ErrorSeverity {
    /// Recoverable error - the computation is skipped for now.
    ///
    /// Examples: actor despawned between events, participant already gone
    Recoverable,

    /// Validation error - input was rejected or clamped.
    ///
    /// Examples: minimum population above capacity, ceiling below floor
    Validation,

    /// Internal error - unexpected state inconsistency.
    ///
    /// Examples: spawn confirmation without a level-selection request
    Internal,

    /// Fatal error - host data the core relies on is missing.
    ///
    /// Examples: no base-stat row for a level
    Fatal,
}

impl ErrorSeverity {
    /// Returns a human-readable description of this severity level.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Recoverable => "recoverable",
            Self::Validation => "validation",
            Self::Internal => "internal",
            Self::Fatal => "fatal",
        }
    }

    /// Returns true if this error is potentially recoverable.
    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::Recoverable)
    }

    /// Returns true if this error indicates a bug or corrupted host data.
    pub const fn is_internal(&self) -> bool {
        matches!(self, Self::Internal | Self::Fatal)
    }
}

/// Contextual information attached to errors for debugging and diagnostics.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ErrorContext {
    /// Session the error belongs to (if applicable).
    pub session: Option<SessionId>,

    /// Actor that triggered the error (if applicable).
    pub actor: Option<ActorId>,

    /// Session epoch at the time of error.
    pub epoch: Epoch,

    /// Optional static message providing additional context.
    pub message: Option<&'static str>,
}

impl ErrorContext {
    /// Creates a new error context for the given session.
    #[must_use]
    pub const fn new(session: SessionId, epoch: Epoch) -> Self {
        Self {
            session: Some(session),
            actor: None,
            epoch,
            message: None,
        }
    }

    /// Attaches an actor to this context (builder pattern).
    #[must_use]
    pub const fn with_actor(mut self, actor: ActorId) -> Self {
        self.actor = Some(actor);
        self
    }

    /// Attaches a static message to this context (builder pattern).
    #[must_use]
    pub const fn with_message(mut self, message: &'static str) -> Self {
        self.message = Some(message);
        self
    }
}

/// Common trait for all scaling-core errors.
///
/// # Implementation Guidelines
///
/// - Use `#[derive(thiserror::Error)]` for Display/Error impl
/// - Include `ErrorContext` in variants that need debugging info
/// - Classify severity based on recoverability, not impact
pub trait CoreError: core::fmt::Display + core::fmt::Debug {
    /// Returns the severity level of this error.
    fn severity(&self) -> ErrorSeverity;

    /// Returns the context information for this error, if available.
    fn context(&self) -> Option<&ErrorContext> {
        None
    }

    /// Returns a static string identifier for this error variant.
    fn error_code(&self) -> &'static str {
        core::any::type_name::<Self>()
    }
}

/// Errors raised while deriving scaled values.
///
/// Every variant is caught inside the session that produced it; see
/// [`crate::Session`] for how each one degrades.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum ScaleError {
    /// Host query facade could not answer.
    #[error(transparent)]
    Oracle(#[from] OracleError),

    /// No base-stat row for a level the recalculator needed.
    #[error("no base stats for level {level}")]
    MissingBaseStats { level: u8, ctx: ErrorContext },

    /// Spawn confirmation arrived without a preceding level-selection request.
    #[error("spawn confirmed out of order for {actor}")]
    OutOfOrderSpawn { actor: ActorId, ctx: ErrorContext },

    /// The actor is not tracked by the session.
    #[error("{actor} is not tracked by this session")]
    UntrackedActor { actor: ActorId, ctx: ErrorContext },
}

impl CoreError for ScaleError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::Oracle(err) => err.severity(),
            Self::MissingBaseStats { .. } => ErrorSeverity::Fatal,
            Self::OutOfOrderSpawn { .. } => ErrorSeverity::Internal,
            Self::UntrackedActor { .. } => ErrorSeverity::Recoverable,
        }
    }

    fn context(&self) -> Option<&ErrorContext> {
        match self {
            Self::Oracle(_) => None,
            Self::MissingBaseStats { ctx, .. }
            | Self::OutOfOrderSpawn { ctx, .. }
            | Self::UntrackedActor { ctx, .. } => Some(ctx),
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::Oracle(err) => err.error_code(),
            Self::MissingBaseStats { .. } => "SCALE_MISSING_BASE_STATS",
            Self::OutOfOrderSpawn { .. } => "SCALE_OUT_OF_ORDER_SPAWN",
            Self::UntrackedActor { .. } => "SCALE_UNTRACKED_ACTOR",
        }
    }
}
