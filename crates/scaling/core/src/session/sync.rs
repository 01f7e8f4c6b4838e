//! Session synchronization.
//!
//! A sync rebuilds every aggregate a derivation pass reads: the enabled flag,
//! the resolved bracket settings, the roster, adjusted population, monster
//! target, and world multipliers. It runs only when the session is stale.

use std::sync::Arc;

use tracing::{debug, warn};

use super::{ScaleContext, Session, SessionNotice};
use crate::curve::{resolve_curve, resolve_stat_modifiers};
use crate::env::{HostEnv, UnitClass};
use crate::epoch::Epoch;
use crate::error::CoreError;
use crate::level;
use crate::state::{CombatLock, LevelBracket, WorldMultipliers};

impl Session {
    /// Whether a sync is owed against `global`.
    pub fn is_stale(&self, global: Epoch) -> bool {
        self.state.resync_pending
            || self.state.synced_global.is_older_than(global)
            || self.state.epoch.is_older_than(global)
    }

    /// Resynchronizes the session when it is stale or `force` is set.
    ///
    /// Returns whether anything was recomputed.
    pub fn sync_if_stale(&mut self, ctx: &ScaleContext<'_>, force: bool) -> bool {
        if !force && !self.is_stale(ctx.global_epoch) {
            return false;
        }
        let first = self.state.synced_global == Epoch::ZERO;
        let global_advanced = self.state.synced_global.is_older_than(ctx.global_epoch);

        let swapped = !Arc::ptr_eq(&self.config, ctx.config);
        if swapped {
            debug!(
                target: "scaling::session",
                session = %self.state.id,
                from = self.config.generation,
                to = ctx.config.generation,
                "configuration snapshot swapped"
            );
            self.config = Arc::clone(ctx.config);
        }

        let transitioned = self.refresh_enabled();
        self.reload_settings(first || swapped);
        if global_advanced {
            self.reenumerate_participants(&ctx.env);
        }
        self.state.bracket = LevelBracket::of(self.state.participants.values());
        self.recompute_adjusted_population(ctx);
        self.refresh_monster_target();
        self.state.world = self.world_multipliers(&ctx.env);

        let now = ctx.clock.now();
        self.state.epoch = now;
        self.state.synced_global = now.max(ctx.global_epoch);
        self.state.resync_pending = transitioned && !first;
        self.notices.push(SessionNotice::Resynced { epoch: now });
        debug!(
            target: "scaling::session",
            session = %self.state.id,
            epoch = %now,
            enabled = self.state.enabled,
            adjusted = self.state.adjusted_population,
            monster_target = ?self.state.monster_target,
            "session resynced"
        );
        true
    }

    /// Returns whether the enabled decision flipped.
    fn refresh_enabled(&mut self) -> bool {
        let enabled =
            self.config
                .is_enabled_for(self.state.map, self.state.capacity, self.state.difficulty);
        if enabled == self.state.enabled {
            return false;
        }
        self.state.enabled = enabled;
        if !enabled && self.state.combat.is_locked() {
            self.state.combat = CombatLock::Unlocked;
            self.notices.push(SessionNotice::CombatLockChanged {
                locked: false,
                floor: None,
            });
        }
        debug!(
            target: "scaling::session",
            session = %self.state.id,
            enabled,
            "scaling toggled for session"
        );
        true
    }

    /// Resolves bracket settings; anomalies are warned about only when
    /// `announce` is set, once per snapshot.
    fn reload_settings(&mut self, announce: bool) {
        let state = &mut self.state;
        let mut settings = self
            .config
            .resolve_instance(state.map, state.capacity, state.difficulty);
        let capacity = state.capacity.max(1);
        if settings.min_population > capacity {
            if announce {
                warn!(
                    target: "scaling::session",
                    session = %state.id,
                    min_population = settings.min_population,
                    capacity,
                    "minimum population exceeds capacity, clamped"
                );
            } else {
                debug!(
                    target: "scaling::session",
                    session = %state.id,
                    min_population = settings.min_population,
                    capacity,
                    "minimum population clamped"
                );
            }
            settings.min_population = capacity;
        }
        state.settings = settings;
    }

    /// Replaces the roster with what the host currently reports.
    ///
    /// Keeps the previous roster when the participant oracle is missing.
    fn reenumerate_participants(&mut self, env: &HostEnv<'_>) {
        match env.participants() {
            Ok(oracle) => {
                self.state.participants = oracle
                    .participants(self.state.id)
                    .into_iter()
                    .map(|participant| (participant.id, participant))
                    .collect();
            }
            Err(err) => warn!(
                target: "scaling::session",
                session = %self.state.id,
                code = err.error_code(),
                "participant roster kept"
            ),
        }
    }

    fn refresh_monster_target(&mut self) {
        let state = &mut self.state;
        let average = state.monsters.average_level();
        let highest = state.bracket.map(|bracket| bracket.highest);
        let (target, active) = match (average, highest) {
            (Some(average), Some(highest)) => {
                let skip = !self.config.level_scaling.enabled
                    || level::inside_skip_band(average, highest, &state.settings.level_range);
                if skip {
                    (Some(average), false)
                } else {
                    (Some(average.min(highest)), true)
                }
            }
            (Some(average), None) => (Some(average), false),
            (None, _) => (None, false),
        };
        state.monster_target = target;
        state.level_scaling_active = active;
    }

    fn world_multipliers(&self, env: &HostEnv<'_>) -> WorldMultipliers {
        let state = &self.state;
        if !state.enabled {
            return WorldMultipliers::default();
        }
        let curve = resolve_curve(&state.settings, state.capacity, false)
            .multiplier(f64::from(state.adjusted_population));
        let mods = resolve_stat_modifiers(&self.config, &state.settings, None, false);
        let limits = &self.config.limits;
        let base = curve * mods.global;
        let damage_healing = (base * mods.damage).max(limits.min_damage);
        let destructible_health = (base * mods.health).max(limits.min_health);

        let (health_ratio, damage_ratio) = match (state.monsters.average_level(), state.monster_target) {
            (Some(from), Some(to)) if state.level_scaling_active && from != to => {
                self.world_level_ratios(env, from, to)
            }
            _ => (1.0, 1.0),
        };
        WorldMultipliers {
            damage_healing,
            scaled_damage_healing: damage_healing * damage_ratio,
            destructible_health,
            scaled_destructible_health: destructible_health * health_ratio,
        }
    }

    /// Health and damage table ratios between two levels for the default class.
    fn world_level_ratios(&self, env: &HostEnv<'_>, from: u8, to: u8) -> (f64, f64) {
        let settings = &self.config.level_scaling;
        let rows = env.tables().ok().and_then(|tables| {
            Some((
                tables.base_stats(from, UnitClass::Warrior)?,
                tables.base_stats(to, UnitClass::Warrior)?,
            ))
        });
        let Some((old, new)) = rows else {
            debug!(
                target: "scaling::session",
                session = %self.state.id,
                from,
                to,
                "no base stats for world level ratio"
            );
            return (1.0, 1.0);
        };
        let ratio = |new: Option<f64>, old: Option<f64>| match (new, old) {
            (Some(new), Some(old)) if old > 0.0 => new / old,
            _ => 1.0,
        };
        (
            ratio(
                level::blended_health(&new, to, settings),
                level::blended_health(&old, from, settings),
            ),
            ratio(
                level::blended_damage(&new, to, settings),
                level::blended_damage(&old, from, settings),
            ),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{
        BracketId, BracketSettings, ConfigurationSnapshot, Difficulty, SizeTier,
    };
    use std::sync::atomic::{AtomicUsize, Ordering};

    use tracing::{Event, Level, Subscriber};
    use tracing_subscriber::layer::{Context, Layer, SubscriberExt};

    use crate::ids::MapId;
    use crate::session::testing::Fixture;

    /// Counts warnings emitted under the session target.
    struct SessionWarnings(Arc<AtomicUsize>);

    impl<S: Subscriber> Layer<S> for SessionWarnings {
        fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
            let meta = event.metadata();
            if *meta.level() == Level::WARN && meta.target() == "scaling::session" {
                self.0.fetch_add(1, Ordering::Relaxed);
            }
        }
    }

    #[test]
    fn create_runs_first_sync() {
        let mut fx = Fixture::new(5);
        fx.join(1, 80);
        fx.join(2, 80);
        let mut session = fx.session();

        assert!(session.state().enabled);
        assert_eq!(session.state().raw_population, 2);
        assert!(!session.is_stale(fx.global));
        assert!(!session.sync_if_stale(&fx.ctx(), false));
        assert!(matches!(
            session.drain_notices().last(),
            Some(SessionNotice::Resynced { .. })
        ));
    }

    #[test]
    fn global_bump_reenumerates_roster() {
        let mut fx = Fixture::new(5);
        fx.join(1, 80);
        let mut session = fx.session();

        // Host roster changed without a callback reaching the session.
        fx.join(2, 80);
        fx.join(3, 80);
        assert!(!session.sync_if_stale(&fx.ctx(), false));
        assert_eq!(session.state().raw_population, 1);

        fx.bump_global();
        assert!(session.sync_if_stale(&fx.ctx(), false));
        assert_eq!(session.state().raw_population, 3);
        assert_eq!(session.state().adjusted_population, 3);
    }

    #[test]
    fn reload_swaps_snapshot_and_disables() {
        let mut fx = Fixture::new(5);
        fx.join(1, 80);
        let mut session = fx.session();
        assert!(session.state().enabled);

        let mut next = ConfigurationSnapshot::new().with_generation(2);
        next.disabled_maps.insert(MapId(1));
        fx.config = Arc::new(next);
        fx.bump_global();

        assert!(session.sync_if_stale(&fx.ctx(), false));
        assert_eq!(session.config().generation, 2);
        assert!(!session.state().enabled);
        assert_eq!(session.state().world, WorldMultipliers::default());
        // The flip owes one more full sync.
        assert!(session.state().resync_pending);
        assert!(session.sync_if_stale(&fx.ctx(), false));
        assert!(!session.state().resync_pending);
    }

    #[test]
    fn minimum_population_is_clamped_to_capacity() {
        let bracket = BracketSettings {
            min_population: 12,
            ..BracketSettings::default()
        };
        let config = ConfigurationSnapshot::new()
            .with_bracket(BracketId::new(SizeTier::Party5, Difficulty::Normal), bracket);
        let mut fx = Fixture::with_config(5, config);
        fx.join(1, 80);
        let session = fx.session();

        assert_eq!(session.state().settings.min_population, 5);
        assert_eq!(session.state().adjusted_population, 5);
    }

    #[test]
    fn clamped_minimum_warns_once_per_snapshot() {
        let bracket = BracketSettings {
            min_population: 12,
            ..BracketSettings::default()
        };
        let config = ConfigurationSnapshot::new()
            .with_bracket(BracketId::new(SizeTier::Party5, Difficulty::Normal), bracket);
        let mut fx = Fixture::with_config(5, config.clone());
        fx.join(1, 80);

        let warnings = Arc::new(AtomicUsize::new(0));
        let subscriber =
            tracing_subscriber::registry().with(SessionWarnings(Arc::clone(&warnings)));
        tracing::subscriber::with_default(subscriber, || {
            let mut session = fx.session();
            for id in 2..=4 {
                let participant = fx.join(id, 80);
                session.on_participant_enter(&fx.ctx(), participant);
                session.sync_if_stale(&fx.ctx(), true);
            }
            assert_eq!(warnings.load(Ordering::Relaxed), 1);

            fx.config = Arc::new(config.with_generation(2));
            fx.bump_global();
            assert!(session.sync_if_stale(&fx.ctx(), false));
            session.sync_if_stale(&fx.ctx(), true);
            assert_eq!(warnings.load(Ordering::Relaxed), 2);
        });
    }

    #[test]
    fn monster_target_respects_skip_band() {
        let mut fx = Fixture::new(5);
        fx.join(1, 80);
        let mut session = fx.session();

        for level in [78, 79, 78] {
            session.state.monsters.add(level);
        }
        session.sync_if_stale(&fx.ctx(), true);
        assert_eq!(session.state().monster_target, Some(78));
        assert!(!session.state().level_scaling_active);

        session.state.monsters = Default::default();
        for level in [60, 62] {
            session.state.monsters.add(level);
        }
        session.sync_if_stale(&fx.ctx(), true);
        assert_eq!(session.state().monster_target, Some(61));
        assert!(session.state().level_scaling_active);
    }

    #[test]
    fn world_multipliers_follow_population() {
        let mut fx = Fixture::new(5);
        fx.join(1, 80);
        let mut session = fx.session();
        let alone = session.state().world.damage_healing;
        assert!(alone < 1.0);

        for id in 2..=5 {
            let participant = fx.join(id, 80);
            session.on_participant_enter(&fx.ctx(), participant);
        }
        session.sync_if_stale(&fx.ctx(), false);
        let full = session.state().world.damage_healing;
        assert!((full - 1.0).abs() < 1e-9);
        assert!(session.state().world.destructible_health > alone);
    }
}
