//! Population-driven difficulty scaling for instanced content.
//!
//! `scaling-core` decides how hard the hostile actors of one dungeon or raid
//! instance should be, given who is inside. It is a pure, synchronous library:
//! the host calls into a [`Session`] from its own callbacks, reads facts
//! through the [`env`] oracles, and applies the returned [`StatUpdate`]s and
//! interception multipliers itself. The only shared structure is the
//! immutable [`ConfigurationSnapshot`], swapped as a whole on reload.
pub mod config;
pub mod curve;
pub mod env;
pub mod epoch;
pub mod error;
pub mod hooks;
pub mod ids;
pub mod intercept;
pub mod level;
pub mod lineage;
pub mod recalc;
pub mod relevance;
pub mod report;
pub mod session;
pub mod state;

pub use config::{
    BracketId, BracketSettings, ConfigWarning, ConfigurationSnapshot, ContentRule, ContentRules,
    CurveParams, Difficulty, InstanceOverride, LevelScalingMethod, SizeTier, StatModifierSet,
};
pub use curve::{Curve, resolve_curve, resolve_stat_modifiers};
pub use env::{
    ActorOracle, ActorProfile, BaseStatRow, BaseStats, Env, HostEnv, HostSnapshot,
    InstanceOracle, InstanceProfile, OracleError, ParticipantOracle, ParticipantProfile,
    StatTableOracle, UnitClass,
};
pub use epoch::{Epoch, EpochClock, ManualClock, SystemClock};
pub use error::{CoreError, ErrorContext, ErrorSeverity, ScaleError};
pub use hooks::{HookRegistry, ScalingHook};
pub use ids::{ActorId, MapId, ModelId, ParticipantId, SessionId, TemplateId};
pub use intercept::{Combatant, CrowdControlEvent, DamageEvent, DamageKind};
pub use lineage::Lineage;
pub use recalc::{RecalcInput, StatUpdate, recalculate};
pub use relevance::RelevanceClassifier;
pub use report::{ActorReport, SessionReport};
pub use session::{ScaleContext, Session, SessionNotice, adjust_population};
pub use state::{ActorFlags, ActorMultipliers, ActorState, CombatLock, SessionState};
