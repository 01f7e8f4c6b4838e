//! Actor profiles and oracle interface.
//!
//! An [`ActorProfile`] is the host's read-only view of one actor at the moment
//! of a callback. The core keeps none of it beyond the current call except the
//! original level, which it records in its own side table.

use crate::env::tables::UnitClass;
use crate::ids::{ActorId, ModelId, ParticipantId, SessionId, TemplateId};

/// Provides actor lookups and hostility checks.
pub trait ActorOracle: Send + Sync {
    /// Returns the current profile of an actor, if it still exists.
    fn actor(&self, id: ActorId) -> Option<ActorProfile>;

    /// Returns the actors currently placed in the instance.
    fn actors(&self, session: SessionId) -> Vec<ActorId>;

    /// True when the actor and the participant would fight each other
    /// (hostility in either direction).
    fn is_hostile(&self, actor: ActorId, participant: ParticipantId) -> bool;
}

/// Broad creature category used by relevance rules and the lineage heuristic.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, strum::IntoStaticStr)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[strum(serialize_all = "snake_case")]
pub enum CreatureCategory {
    Beast,
    Dragonkin,
    Demon,
    Elemental,
    Giant,
    Undead,
    #[default]
    Humanoid,
    Critter,
    Mechanical,
    Totem,
    Other,
}

/// Content rank as flagged by the host.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ActorRank {
    #[default]
    Normal,
    Elite,
    DungeonBoss,
    WorldBoss,
}

impl ActorRank {
    pub const fn is_boss(self) -> bool {
        matches!(self, Self::DungeonBoss | Self::WorldBoss)
    }
}

/// Who currently steers the actor.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ActorControl {
    /// Runs its own AI.
    #[default]
    Autonomous,
    /// Pet, guardian, totem, or charmed actor directly controlled by a participant.
    Participant(ParticipantId),
}

/// Whoever created a summoned actor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Summoner {
    Participant(ParticipantId),
    Actor(ActorId),
}

/// Summon metadata for actors created by another entity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SummonInfo {
    pub summoner: Summoner,
    /// Despawns on its own after a while.
    pub temporary: bool,
}

/// Unscaled values taken from the actor's template.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BaseStats {
    pub max_health: u32,
    pub max_resource: u32,
    pub armor: u32,
}

/// Live values at the moment of the callback.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CurrentStats {
    pub max_health: u32,
    pub health: u32,
    pub max_resource: u32,
    pub resource: u32,
}

/// The host's view of one actor.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ActorProfile {
    pub id: ActorId,
    pub template: TemplateId,
    pub name: String,
    pub category: CreatureCategory,
    pub model: ModelId,
    /// Level before any scaling.
    pub level: u8,
    pub class: UnitClass,
    pub rank: ActorRank,
    /// Summoned by a dungeon boss; uses boss parameters.
    pub is_boss_summon: bool,
    /// Invisible helper actor used by encounter scripts.
    pub is_trigger: bool,
    /// Content flag that forbids level changes.
    pub never_level_scale: bool,
    pub control: ActorControl,
    pub summon: Option<SummonInfo>,
    /// Instance the actor is placed in, if any.
    pub session: Option<SessionId>,
    pub base: BaseStats,
    pub current: CurrentStats,
}

impl ActorProfile {
    /// Creates an autonomous, full-health humanoid with the given base pools.
    pub fn new(id: ActorId, template: TemplateId, level: u8, base: BaseStats) -> Self {
        Self {
            id,
            template,
            name: String::new(),
            category: CreatureCategory::default(),
            model: ModelId::default(),
            level,
            class: UnitClass::default(),
            rank: ActorRank::default(),
            is_boss_summon: false,
            is_trigger: false,
            never_level_scale: false,
            control: ActorControl::default(),
            summon: None,
            session: None,
            base,
            current: CurrentStats {
                max_health: base.max_health,
                health: base.max_health,
                max_resource: base.max_resource,
                resource: base.max_resource,
            },
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn in_session(mut self, session: SessionId) -> Self {
        self.session = Some(session);
        self
    }

    pub fn with_category(mut self, category: CreatureCategory) -> Self {
        self.category = category;
        self
    }

    pub fn with_model(mut self, model: ModelId) -> Self {
        self.model = model;
        self
    }

    pub fn with_class(mut self, class: UnitClass) -> Self {
        self.class = class;
        self
    }

    pub fn with_rank(mut self, rank: ActorRank) -> Self {
        self.rank = rank;
        self
    }

    pub fn with_control(mut self, control: ActorControl) -> Self {
        self.control = control;
        self
    }

    pub fn summoned_by(mut self, summoner: Summoner, temporary: bool) -> Self {
        self.summon = Some(SummonInfo {
            summoner,
            temporary,
        });
        self
    }

    pub fn boss_summon(mut self) -> Self {
        self.is_boss_summon = true;
        self
    }

    pub fn trigger(mut self) -> Self {
        self.is_trigger = true;
        self
    }

    pub fn never_level_scale(mut self) -> Self {
        self.never_level_scale = true;
        self
    }

    pub fn with_current(mut self, current: CurrentStats) -> Self {
        self.current = current;
        self
    }

    /// Boss curve and boss stat modifiers apply to bosses and their summons.
    pub fn uses_boss_parameters(&self) -> bool {
        self.rank.is_boss() || self.is_boss_summon
    }
}
