//! Relevance classifier: does an actor take part in scaling at all?
//!
//! The decision is made once per actor per session and cached as
//! `Option<bool>` on its [`ActorState`]; later calls return the cached answer
//! without looking at the host again, until the state is reset.
//!
//! Decision order, first match wins:
//!
//! 1. not placed in this session: irrelevant
//! 2. an `Ignore` content rule matches: irrelevant
//! 3. directly controlled by a participant (pet, guardian, totem, charm): irrelevant
//! 4. temporary summon of a participant that is hostile to no valid participant: irrelevant
//! 5. trivial level and trivial health pool: irrelevant
//! 6. otherwise relevant

use tracing::{debug, warn};

use crate::config::{ContentRules, RelevanceSettings};
use crate::env::{ActorControl, ActorProfile, HostEnv, OracleError, Summoner};
use crate::error::CoreError;
use crate::ids::{MapId, SessionId};
use crate::state::ActorState;

/// Classifier bound to one session's context.
#[derive(Clone, Copy)]
pub struct RelevanceClassifier<'a> {
    pub session: SessionId,
    pub map: MapId,
    pub settings: &'a RelevanceSettings,
    pub rules: &'a ContentRules,
}

impl<'a> RelevanceClassifier<'a> {
    pub fn new(
        session: SessionId,
        map: MapId,
        settings: &'a RelevanceSettings,
        rules: &'a ContentRules,
    ) -> Self {
        Self {
            session,
            map,
            settings,
            rules,
        }
    }

    /// Cached classification.
    ///
    /// A missing actor yields `false` and leaves the cache untouched. So does
    /// an oracle failure, which is logged.
    pub fn is_relevant(
        &self,
        state: &mut ActorState,
        actor: Option<&ActorProfile>,
        env: &HostEnv<'_>,
    ) -> bool {
        if let Some(cached) = state.relevance {
            return cached;
        }
        let Some(actor) = actor else {
            return false;
        };
        match self.classify(actor, env) {
            Ok(relevant) => {
                debug!(
                    target: "scaling::relevance",
                    session = %self.session,
                    actor = %actor.id,
                    relevant,
                    "classified actor"
                );
                state.relevance = Some(relevant);
                relevant
            }
            Err(err) => {
                warn!(
                    target: "scaling::relevance",
                    session = %self.session,
                    actor = %actor.id,
                    code = err.error_code(),
                    error = %err,
                    "relevance check skipped"
                );
                false
            }
        }
    }

    /// Uncached classification.
    ///
    /// # Errors
    ///
    /// Returns an [`OracleError`] when a summon's hostility has to be checked
    /// and the participant or actor oracle is missing.
    pub fn classify(&self, actor: &ActorProfile, env: &HostEnv<'_>) -> Result<bool, OracleError> {
        if actor.session != Some(self.session) {
            return Ok(false);
        }
        if self.rules.effects(actor, self.map).ignore {
            return Ok(false);
        }
        if let ActorControl::Participant(_) = actor.control {
            return Ok(false);
        }
        if let Some(summon) = actor.summon
            && summon.temporary
            && matches!(summon.summoner, Summoner::Participant(_))
            && !self.hostile_to_any_participant(actor, env)?
        {
            return Ok(false);
        }
        if self.is_trivial(actor) {
            return Ok(false);
        }
        Ok(true)
    }

    fn is_trivial(&self, actor: &ActorProfile) -> bool {
        actor.level <= self.settings.trivial_max_level
            && actor.base.max_health <= self.settings.trivial_max_health
    }

    fn hostile_to_any_participant(
        &self,
        actor: &ActorProfile,
        env: &HostEnv<'_>,
    ) -> Result<bool, OracleError> {
        let participants = env.participants()?;
        let actors = env.actors()?;
        Ok(participants
            .participants(self.session)
            .iter()
            .filter(|participant| participant.is_valid_target())
            .any(|participant| actors.is_hostile(actor.id, participant.id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ContentRule, RuleAction, RulePredicate};
    use crate::env::{BaseStats, Env, HostSnapshot, ParticipantProfile};
    use crate::ids::{ActorId, ParticipantId, TemplateId};

    const SESSION: SessionId = SessionId(1);

    fn ogre(id: u64) -> ActorProfile {
        ActorProfile::new(
            ActorId(id),
            TemplateId(10),
            60,
            BaseStats {
                max_health: 8_000,
                max_resource: 0,
                armor: 300,
            },
        )
        .in_session(SESSION)
    }

    fn host() -> HostSnapshot {
        let mut host = HostSnapshot::new();
        host.insert_participant(SESSION, ParticipantProfile::new(ParticipantId(1), 60));
        host
    }

    fn classify(actor: &ActorProfile, host: &HostSnapshot) -> bool {
        let settings = RelevanceSettings::default();
        let rules = ContentRules::default();
        RelevanceClassifier::new(SESSION, MapId(1), &settings, &rules)
            .classify(actor, &host.env())
            .unwrap()
    }

    #[test]
    fn plain_hostile_is_relevant() {
        assert!(classify(&ogre(1), &host()));
    }

    #[test]
    fn actor_outside_session_is_irrelevant() {
        let mut actor = ogre(1);
        actor.session = Some(SessionId(2));
        assert!(!classify(&actor, &host()));
        actor.session = None;
        assert!(!classify(&actor, &host()));
    }

    #[test]
    fn participant_controlled_actor_is_irrelevant() {
        let pet = ogre(1).with_control(ActorControl::Participant(ParticipantId(1)));
        assert!(!classify(&pet, &host()));
    }

    #[test]
    fn peaceful_temporary_summon_is_irrelevant_hostile_one_is_not() {
        let summon = ogre(1).summoned_by(Summoner::Participant(ParticipantId(1)), true);
        let mut host = host();
        assert!(classify(&summon, &host));

        host.set_hostile(ActorId(1), ParticipantId(1), false);
        assert!(!classify(&summon, &host));
    }

    #[test]
    fn trivial_flavor_actor_is_irrelevant() {
        let bunny = ActorProfile::new(ActorId(3), TemplateId(1), 1, BaseStats {
            max_health: 1,
            ..BaseStats::default()
        })
        .in_session(SESSION);
        assert!(!classify(&bunny, &host()));
    }

    #[test]
    fn ignore_rule_wins() {
        let settings = RelevanceSettings::default();
        let rules = ContentRules::new(vec![ContentRule {
            predicate: RulePredicate::Template(TemplateId(10)),
            action: RuleAction::Ignore,
        }]);
        let host = host();
        let classifier = RelevanceClassifier::new(SESSION, MapId(1), &settings, &rules);
        assert!(!classifier.classify(&ogre(1), &host.env()).unwrap());
    }

    #[test]
    fn cached_answer_is_not_reevaluated() {
        let settings = RelevanceSettings::default();
        let rules = ContentRules::default();
        let classifier = RelevanceClassifier::new(SESSION, MapId(1), &settings, &rules);
        let host = host();
        let mut state = ActorState::new(ActorId(1), 60);

        let pet = ogre(1).with_control(ActorControl::Participant(ParticipantId(1)));
        assert!(!classifier.is_relevant(&mut state, Some(&pet), &host.env()));

        // The pet was released and would now classify as relevant.
        let released = ogre(1);
        assert!(classifier.classify(&released, &host.env()).unwrap());
        assert!(!classifier.is_relevant(&mut state, Some(&released), &host.env()));
    }

    #[test]
    fn missing_actor_is_not_cached() {
        let settings = RelevanceSettings::default();
        let rules = ContentRules::default();
        let classifier = RelevanceClassifier::new(SESSION, MapId(1), &settings, &rules);
        let host = host();
        let mut state = ActorState::new(ActorId(1), 60);

        assert!(!classifier.is_relevant(&mut state, None, &host.env()));
        assert_eq!(state.relevance, None);
    }

    #[test]
    fn summon_check_without_oracles_is_not_cached() {
        let settings = RelevanceSettings::default();
        let rules = ContentRules::default();
        let classifier = RelevanceClassifier::new(SESSION, MapId(1), &settings, &rules);
        let mut state = ActorState::new(ActorId(1), 60);
        let summon = ogre(1).summoned_by(Summoner::Participant(ParticipantId(1)), true);

        let empty: HostEnv<'_> = Env::empty();
        assert!(!classifier.is_relevant(&mut state, Some(&summon), &empty));
        assert_eq!(state.relevance, None);
    }
}
