//! Actor lifecycle: two-phase spawn, add/remove, periodic ticks.
//!
//! Aggregate bookkeeping (monster-level counting, sync) always finishes
//! before an actor is derived, and derivation never touches aggregates.

use tracing::{debug, error};

use super::{ScaleContext, Session};
use crate::env::{ActorProfile, Summoner};
use crate::error::{CoreError, ErrorContext, ScaleError};
use crate::ids::ActorId;
use crate::level;
use crate::lineage::Lineage;
use crate::recalc::{self, RecalcInput, StatUpdate};
use crate::relevance::RelevanceClassifier;
use crate::state::{ActorFlags, ActorState};

impl Session {
    /// Phase one of a spawn: the level the host should create the actor at.
    ///
    /// Returns `None` when the actor is unknown to the host.
    pub fn select_level(&mut self, ctx: &ScaleContext<'_>, id: ActorId) -> Option<u8> {
        self.sync_if_stale(ctx, false);
        let profile = self.fetch_actor(ctx, id)?;
        if self.actors.contains_key(&id) {
            self.forget_actor(ctx, id);
        }

        let mut state = ActorState::new(id, profile.level);
        state.flags = ActorFlags::ACTIVE | ActorFlags::FRESH;
        state.lineage = self.assess_lineage(ctx, &profile);
        self.classifier().is_relevant(&mut state, Some(&profile), &ctx.env);

        let input = self.recalc_input(ctx, &profile, &state);
        let level = input.select_level(&state);
        state.selected_level = level;
        self.actors.insert(id, state);
        Some(level)
    }

    /// Phase two of a spawn: the actor now exists in the world.
    ///
    /// A confirmation without a pending level selection is logged and
    /// leaves the actor unscaled.
    pub fn confirm_spawn(&mut self, ctx: &ScaleContext<'_>, id: ActorId) -> Option<StatUpdate> {
        let pending = self
            .actors
            .get(&id)
            .is_some_and(|state| state.flags.contains(ActorFlags::FRESH));
        if !pending {
            let err = ScaleError::OutOfOrderSpawn {
                actor: id,
                ctx: ErrorContext::new(self.state.id, self.state.epoch).with_actor(id),
            };
            error!(
                target: "scaling::session",
                session = %self.state.id,
                actor = %id,
                code = err.error_code(),
                severity = err.severity().as_str(),
                error = %err,
                "spawn confirmation rejected"
            );
            return None;
        }
        let profile = self.fetch_actor(ctx, id)?;
        if let Some(state) = self.actors.get_mut(&id) {
            state.flags.remove(ActorFlags::FRESH);
        }
        self.count_actor(ctx, &profile);
        self.sync_if_stale(ctx, false);
        self.derive(ctx, &profile)
    }

    /// The host placed an actor in the world outside the spawn flow.
    pub fn on_actor_added(&mut self, ctx: &ScaleContext<'_>, id: ActorId) -> Option<StatUpdate> {
        let profile = self.fetch_actor(ctx, id)?;
        match self.actors.get_mut(&id) {
            Some(state) => {
                state.flags.insert(ActorFlags::ACTIVE);
                state.flags.remove(ActorFlags::FRESH);
            }
            None => {
                let mut state = ActorState::new(id, profile.level);
                state.flags = ActorFlags::ACTIVE;
                state.lineage = self.assess_lineage(ctx, &profile);
                self.classifier().is_relevant(&mut state, Some(&profile), &ctx.env);
                self.actors.insert(id, state);
            }
        }
        self.count_actor(ctx, &profile);
        self.sync_if_stale(ctx, false);
        self.derive(ctx, &profile)
    }

    /// The actor left the world; its side-table entry is dropped.
    pub fn on_actor_removed(&mut self, ctx: &ScaleContext<'_>, id: ActorId) {
        self.forget_actor(ctx, id);
    }

    /// Periodic update: recomputes the actor only when it went stale.
    pub fn on_actor_tick(&mut self, ctx: &ScaleContext<'_>, id: ActorId) -> Option<StatUpdate> {
        self.sync_if_stale(ctx, false);
        let Some(state) = self.actors.get_mut(&id) else {
            return self.on_actor_added(ctx, id);
        };
        if state.flags.contains(ActorFlags::FRESH) || state.is_fresh(self.state.epoch) {
            return None;
        }
        state.reset();
        let profile = self.fetch_actor(ctx, id)?;
        self.derive(ctx, &profile)
    }

    /// Recomputes every stale, spawned actor.
    pub fn refresh_all(&mut self, ctx: &ScaleContext<'_>) -> Vec<(ActorId, StatUpdate)> {
        self.sync_if_stale(ctx, false);
        let epoch = self.state.epoch;
        let stale: Vec<ActorId> = self
            .actors
            .values()
            .filter(|state| !state.flags.contains(ActorFlags::FRESH) && !state.is_fresh(epoch))
            .map(|state| state.id)
            .collect();

        let mut updates = Vec::with_capacity(stale.len());
        for id in stale {
            if let Some(state) = self.actors.get_mut(&id) {
                state.reset();
            }
            let Some(profile) = self.fetch_actor(ctx, id) else {
                continue;
            };
            if let Some(update) = self.derive(ctx, &profile) {
                updates.push((id, update));
            }
        }
        updates
    }

    /// Derivation pass for one actor. Reads the session snapshot only.
    fn derive(&mut self, ctx: &ScaleContext<'_>, profile: &ActorProfile) -> Option<StatUpdate> {
        let lineage = self.actors.get(&profile.id)?.lineage;
        let lineage = match lineage {
            Some(lineage) => Some(lineage),
            None => self.assess_lineage(ctx, profile),
        };
        let inherited_level = lineage
            .filter(|lineage| lineage.is_clone)
            .and_then(|lineage| self.actors.get(&lineage.summoner))
            .filter(|summoner| !summoner.flags.contains(ActorFlags::FRESH))
            .map(|summoner| summoner.selected_level);

        {
            let Self {
                state: session,
                actors,
                config,
                ..
            } = self;
            let state = actors.get_mut(&profile.id)?;
            state.lineage = lineage;
            RelevanceClassifier::new(session.id, session.map, &config.relevance, &config.rules)
                .is_relevant(state, Some(profile), &ctx.env);
        }
        let lost_relevance = self
            .actors
            .get(&profile.id)
            .is_some_and(|state| state.relevance == Some(false) && state.is_counted());
        if lost_relevance {
            self.uncount_actor(ctx, profile.id);
        }

        let Self {
            state: session,
            actors,
            config,
            ..
        } = self;
        let session = &*session;
        let config = &**config;
        let state = actors.get_mut(&profile.id)?;
        let input = RecalcInput {
            config,
            session,
            actor: profile,
            rules: config.rules.effects(profile, session.map),
            tables: ctx.env.tables().ok(),
            hooks: ctx.hooks,
            inherited_level,
        };
        recalc::recalculate(&input, state)
    }

    fn recalc_input<'a>(
        &'a self,
        ctx: &'a ScaleContext<'_>,
        profile: &'a ActorProfile,
        state: &ActorState,
    ) -> RecalcInput<'a> {
        let inherited_level = state
            .lineage
            .filter(|lineage| lineage.is_clone)
            .and_then(|lineage| self.actors.get(&lineage.summoner))
            .map(|summoner| summoner.selected_level);
        RecalcInput {
            config: &self.config,
            session: &self.state,
            actor: profile,
            rules: self.config.rules.effects(profile, self.state.map),
            tables: ctx.env.tables().ok(),
            hooks: ctx.hooks,
            inherited_level,
        }
    }

    fn classifier(&self) -> RelevanceClassifier<'_> {
        RelevanceClassifier::new(
            self.state.id,
            self.state.map,
            &self.config.relevance,
            &self.config.rules,
        )
    }

    fn fetch_actor(&self, ctx: &ScaleContext<'_>, id: ActorId) -> Option<ActorProfile> {
        let profile = ctx.env.actors().ok().and_then(|oracle| oracle.actor(id));
        if profile.is_none() {
            debug!(
                target: "scaling::session",
                session = %self.state.id,
                actor = %id,
                "actor unknown to host, skipped"
            );
        }
        profile
    }

    /// Lineage for summons created by another host actor.
    fn assess_lineage(&self, ctx: &ScaleContext<'_>, profile: &ActorProfile) -> Option<Lineage> {
        let Summoner::Actor(summoner) = profile.summon?.summoner else {
            return None;
        };
        let summoner = ctx.env.actors().ok()?.actor(summoner)?;
        Some(Lineage::assess(profile, &summoner))
    }

    /// Adds the actor to the monster-level aggregates if it qualifies.
    fn count_actor(&mut self, ctx: &ScaleContext<'_>, profile: &ActorProfile) {
        let window = self.state.window_levels();
        let Some(state) = self.actors.get_mut(&profile.id) else {
            return;
        };
        let in_window = window.is_none_or(|range| {
            level::in_window(state.original_level, range, &self.config.level_scaling)
        });
        if state.is_counted() || !state.is_relevant() || profile.summon.is_some() || !in_window {
            return;
        }
        state.flags.insert(ActorFlags::COUNTED);
        let before = self.state.monsters.signature();
        self.state.monsters.add(state.original_level);
        if self.state.monsters.signature() != before {
            self.invalidate(ctx, "monster levels");
        }
    }

    /// Drops the actor, uncounting it first.
    fn forget_actor(&mut self, ctx: &ScaleContext<'_>, id: ActorId) {
        self.uncount_actor(ctx, id);
        self.actors.remove(&id);
    }

    /// Takes a counted actor out of the monster-level aggregates.
    fn uncount_actor(&mut self, ctx: &ScaleContext<'_>, id: ActorId) {
        let Some(state) = self.actors.get_mut(&id) else {
            return;
        };
        if !state.is_counted() {
            return;
        }
        state.flags.remove(ActorFlags::COUNTED);
        let level = state.original_level;
        let before = self.state.monsters.signature();
        let remaining = self
            .actors
            .values()
            .filter(|state| state.is_counted())
            .map(|state| state.original_level);
        self.state.monsters.remove(level, remaining);
        if self.state.monsters.signature() != before {
            self.invalidate(ctx, "monster levels");
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::config::Difficulty;
    use crate::env::{ActorControl, InstanceProfile, SummonInfo, Summoner};
    use crate::ids::{ActorId, MapId};
    use crate::session::Session;
    use crate::session::testing::{Fixture, SESSION};
    use crate::state::ActorFlags;

    fn spawn(fx: &Fixture, session: &mut Session, id: ActorId) -> Option<u8> {
        let level = session.select_level(&fx.ctx(), id);
        session.confirm_spawn(&fx.ctx(), id);
        level
    }

    #[test]
    fn confirmed_spawn_is_scaled_for_population() {
        let mut fx = Fixture::new(5);
        fx.join(1, 80);
        let ogre = fx.spawn(10, 80);
        let mut session = fx.session();

        assert_eq!(session.select_level(&fx.ctx(), ogre), Some(80));
        let update = session.confirm_spawn(&fx.ctx(), ogre).expect("scaled");

        assert!(update.max_health < 10_000);
        assert_eq!(update.health, update.max_health);
        let state = session.actor(ogre).expect("tracked");
        assert!(state.multipliers.health < 1.0);
        assert!(state.is_counted());
        assert_eq!(session.state().monsters.counted, 1);
    }

    #[test]
    fn out_of_order_confirmation_leaves_actor_unscaled() {
        let mut fx = Fixture::new(5);
        fx.join(1, 80);
        let ogre = fx.spawn(10, 80);
        let mut session = fx.session();

        assert_eq!(session.confirm_spawn(&fx.ctx(), ogre), None);
        assert!(session.actor(ogre).is_none());

        spawn(&fx, &mut session, ogre);
        assert_eq!(session.confirm_spawn(&fx.ctx(), ogre), None);
    }

    #[test]
    fn tick_recomputes_only_after_invalidation() {
        let mut fx = Fixture::new(5);
        fx.join(1, 80);
        let ogre = fx.spawn(10, 80);
        let mut session = fx.session();
        spawn(&fx, &mut session, ogre);
        let before = session.actor(ogre).expect("tracked").multipliers;

        assert_eq!(session.on_actor_tick(&fx.ctx(), ogre), None);

        let p2 = fx.join(2, 80);
        session.on_participant_enter(&fx.ctx(), p2);
        let update = session.on_actor_tick(&fx.ctx(), ogre).expect("stale");

        let state = session.actor(ogre).expect("tracked");
        assert!(state.multipliers.health > before.health);
        assert!(update.max_health > 1);
        // Reset kept identity and membership.
        assert_eq!(state.original_level, 80);
        assert!(state.flags.contains(ActorFlags::ACTIVE | ActorFlags::COUNTED));
        assert_eq!(session.on_actor_tick(&fx.ctx(), ogre), None);
    }

    #[test]
    fn removal_uncounts_and_rescans_extremes() {
        let mut fx = Fixture::new(5);
        fx.join(1, 80);
        let low = fx.spawn(10, 78);
        let high = fx.spawn(11, 82);
        let mut session = fx.session();
        spawn(&fx, &mut session, low);
        spawn(&fx, &mut session, high);
        assert_eq!(session.state().monsters.highest, 82);

        session.on_actor_removed(&fx.ctx(), high);
        assert_eq!(session.state().monsters.counted, 1);
        assert_eq!(session.state().monsters.highest, 78);
        assert!(session.actor(high).is_none());
        assert!(session.state().resync_pending);
    }

    #[test]
    fn dynamic_level_keeps_relative_spread() {
        let mut fx = Fixture::new(5);
        fx.host.insert_instance(
            SESSION,
            InstanceProfile::new(MapId(1), 5, Difficulty::Normal).with_level_range(55, 80),
        );
        fx.join(1, 80);
        let weak = fx.spawn(10, 60);
        let strong = fx.spawn(11, 65);
        let mut session = fx.session();

        spawn(&fx, &mut session, weak);
        spawn(&fx, &mut session, strong);
        assert_eq!(session.actor(strong).map(|state| state.selected_level), Some(83));

        session.on_actor_tick(&fx.ctx(), weak).expect("stale after second count");
        assert_eq!(session.actor(weak).map(|state| state.selected_level), Some(78));
    }

    #[test]
    fn clone_inherits_summoner_level() {
        let mut fx = Fixture::new(5);
        fx.host.insert_instance(
            SESSION,
            InstanceProfile::new(MapId(1), 5, Difficulty::Normal).with_level_range(55, 80),
        );
        fx.join(1, 80);
        let weak = fx.spawn(10, 60);
        let strong = fx.spawn(11, 65);
        let mirror = fx.spawn(12, 60);
        if let Some(profile) = fx.host.actor_mut(mirror) {
            profile.summon = Some(SummonInfo {
                summoner: Summoner::Actor(weak),
                temporary: true,
            });
        }
        let mut session = fx.session();
        spawn(&fx, &mut session, weak);
        spawn(&fx, &mut session, strong);
        session.on_actor_tick(&fx.ctx(), weak);

        assert_eq!(session.select_level(&fx.ctx(), mirror), Some(78));
        let state = session.actor(mirror).expect("tracked");
        assert!(state.lineage.is_some_and(|lineage| lineage.is_clone));

        session.confirm_spawn(&fx.ctx(), mirror);
        assert!(!session.actor(mirror).expect("tracked").is_counted());
        assert_eq!(session.state().monsters.counted, 2);
    }

    #[test]
    fn pets_are_never_counted_or_scaled() {
        let mut fx = Fixture::new(5);
        let owner = fx.join(1, 80);
        let pet = fx.spawn(10, 80);
        if let Some(profile) = fx.host.actor_mut(pet) {
            profile.control = ActorControl::Participant(owner);
        }
        let mut session = fx.session();

        spawn(&fx, &mut session, pet);
        let state = session.actor(pet).expect("tracked");
        assert_eq!(state.relevance, Some(false));
        assert!(!state.is_counted());
        assert_eq!(session.state().monsters.counted, 0);
    }

    #[test]
    fn charmed_actor_leaves_monster_levels() {
        let mut fx = Fixture::new(5);
        let owner = fx.join(1, 80);
        let low = fx.spawn(10, 78);
        let high = fx.spawn(11, 82);
        let mut session = fx.session();
        spawn(&fx, &mut session, low);
        spawn(&fx, &mut session, high);
        assert_eq!(session.state().monsters.counted, 2);

        if let Some(profile) = fx.host.actor_mut(high) {
            profile.control = ActorControl::Participant(owner);
        }
        fx.bump_global();
        session.refresh_all(&fx.ctx());

        let state = session.actor(high).expect("still tracked");
        assert_eq!(state.relevance, Some(false));
        assert!(!state.is_counted());
        assert!(state.flags.contains(ActorFlags::ACTIVE));
        assert_eq!(session.state().monsters.counted, 1);
        assert_eq!(session.state().monsters.highest, 78);
    }

    #[test]
    fn refresh_all_recomputes_stale_actors() {
        let mut fx = Fixture::new(5);
        fx.join(1, 80);
        let a = fx.spawn(10, 80);
        let b = fx.spawn(11, 80);
        let mut session = fx.session();
        spawn(&fx, &mut session, a);
        spawn(&fx, &mut session, b);

        fx.bump_global();
        let updates = session.refresh_all(&fx.ctx());
        let ids: Vec<ActorId> = updates.iter().map(|(id, _)| *id).collect();
        assert_eq!(ids, vec![a, b]);
        assert!(session.refresh_all(&fx.ctx()).is_empty());
    }
}
