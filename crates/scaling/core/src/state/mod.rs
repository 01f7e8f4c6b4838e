//! Side tables owned by the core, keyed by opaque host handles.
mod actor;
mod session;

pub use actor::{ActorFlags, ActorMultipliers, ActorState, RewardMultipliers};
pub use session::{CombatLock, LevelBracket, MonsterLevels, SessionState, WorldMultipliers};
