//! Diagnostic views of a session and its actors.

use crate::config::{BracketId, Difficulty};
use crate::epoch::Epoch;
use crate::error::{ErrorContext, ScaleError};
use crate::ids::{ActorId, MapId, SessionId};
use crate::session::Session;
use crate::state::{
    ActorFlags, ActorMultipliers, ActorState, LevelBracket, MonsterLevels, RewardMultipliers,
    WorldMultipliers,
};

/// Per-session snapshot for diagnostic display.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SessionReport {
    pub session: SessionId,
    pub map: MapId,
    pub capacity: u32,
    pub difficulty: Difficulty,
    pub bracket_id: String,
    pub enabled: bool,
    pub participants: usize,
    pub raw_population: u32,
    pub adjusted_population: u32,
    pub admin_override: Option<u32>,
    pub level_bracket: Option<LevelBracket>,
    pub monsters: MonsterLevels,
    pub monster_target: Option<u8>,
    pub level_scaling_active: bool,
    pub combat_locked: bool,
    pub lock_floor: Option<u32>,
    pub world: WorldMultipliers,
    pub epoch: Epoch,
    pub config_generation: u64,
    pub config_fingerprint: Option<[u8; 32]>,
    pub tracked_actors: usize,
}

/// Per-actor values for diagnostic display.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ActorReport {
    pub actor: ActorId,
    pub original_level: u8,
    pub selected_level: u8,
    pub relevant: Option<bool>,
    pub counted: bool,
    pub pending_spawn: bool,
    pub fresh: bool,
    pub is_clone: bool,
    pub multipliers: ActorMultipliers,
    pub rewards: RewardMultipliers,
    pub epoch: Epoch,
}

impl ActorReport {
    fn of(state: &ActorState, session_epoch: Epoch) -> Self {
        Self {
            actor: state.id,
            original_level: state.original_level,
            selected_level: state.selected_level,
            relevant: state.relevance,
            counted: state.is_counted(),
            pending_spawn: state.flags.contains(ActorFlags::FRESH),
            fresh: state.is_fresh(session_epoch),
            is_clone: state.is_clone(),
            multipliers: state.multipliers,
            rewards: state.rewards,
            epoch: state.epoch,
        }
    }
}

impl Session {
    pub fn report(&self) -> SessionReport {
        let state = self.state();
        let config = self.config();
        SessionReport {
            session: state.id,
            map: state.map,
            capacity: state.capacity,
            difficulty: state.difficulty,
            bracket_id: BracketId::for_instance(state.capacity, state.difficulty).to_string(),
            enabled: state.enabled,
            participants: state.participants.len(),
            raw_population: state.raw_population,
            adjusted_population: state.adjusted_population,
            admin_override: state.admin_override,
            level_bracket: state.bracket,
            monsters: state.monsters,
            monster_target: state.monster_target,
            level_scaling_active: state.level_scaling_active,
            combat_locked: state.combat.is_locked(),
            lock_floor: state.combat.floor(),
            world: state.world,
            epoch: state.epoch,
            config_generation: config.generation,
            config_fingerprint: config.fingerprint,
            tracked_actors: self.actors().count(),
        }
    }

    /// Report for one tracked actor.
    ///
    /// # Errors
    ///
    /// Returns [`ScaleError::UntrackedActor`] when the session does not know `id`.
    pub fn actor_report(&self, id: ActorId) -> Result<ActorReport, ScaleError> {
        let epoch = self.state().epoch;
        self.actor(id)
            .map(|state| ActorReport::of(state, epoch))
            .ok_or_else(|| ScaleError::UntrackedActor {
                actor: id,
                ctx: ErrorContext::new(self.id(), epoch).with_actor(id),
            })
    }

    pub fn actor_reports(&self) -> Vec<ActorReport> {
        let epoch = self.state().epoch;
        self.actors()
            .map(|state| ActorReport::of(state, epoch))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::testing::Fixture;

    #[test]
    fn report_reflects_session() {
        let mut fx = Fixture::new(10);
        fx.join(1, 70);
        fx.join(2, 72);
        let ogre = fx.spawn(10, 70);
        let mut session = fx.session();
        session.select_level(&fx.ctx(), ogre);
        session.confirm_spawn(&fx.ctx(), ogre);

        let report = session.report();
        assert_eq!(report.bracket_id, "raid10");
        assert!(report.enabled);
        assert_eq!(report.raw_population, 2);
        assert_eq!(
            report.level_bracket,
            Some(LevelBracket {
                lowest: 70,
                highest: 72
            })
        );
        assert_eq!(report.tracked_actors, 1);
        assert_eq!(report.monsters.counted, 1);

        let actor = session.actor_report(ogre).expect("tracked");
        assert!(actor.fresh);
        assert!(actor.counted);
        assert_eq!(session.actor_reports().len(), 1);
    }

    #[test]
    fn unknown_actor_report_is_an_error() {
        let fx = Fixture::new(5);
        let session = fx.session();
        let err = session.actor_report(ActorId(99)).unwrap_err();
        assert!(matches!(err, ScaleError::UntrackedActor { .. }));
    }
}
