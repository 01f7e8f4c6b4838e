//! Attribute recalculator.
//!
//! Turns curve output and the level-scaling target into concrete multipliers
//! and absolute stat values for one actor. It reads the session snapshot and
//! writes only the actor's own side-table entry; the host applies the
//! returned [`StatUpdate`].
mod rewards;

pub use rewards::reward_multipliers;

use tracing::{debug, warn};

use crate::config::{ConfigurationSnapshot, RuleEffects};
use crate::curve::{resolve_curve, resolve_stat_modifiers};
use crate::env::{ActorProfile, StatTableOracle};
use crate::error::{CoreError, ErrorContext, ScaleError};
use crate::hooks::HookRegistry;
use crate::level;
use crate::state::{ActorMultipliers, ActorState, RewardMultipliers, SessionState};

/// Absolute values the host should apply to an actor.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StatUpdate {
    pub level: u8,
    pub max_health: u32,
    pub health: u32,
    pub max_resource: u32,
    pub resource: u32,
    pub armor: u32,
}

impl StatUpdate {
    /// Scales the actor's unscaled pools.
    ///
    /// Current values keep their percentage of the maximum; a clone keeps its
    /// absolute current values, clamped to the new maximum.
    pub fn scaled(actor: &ActorProfile, level: u8, multipliers: &ActorMultipliers, clone: bool) -> Self {
        let max_health = scale(actor.base.max_health, multipliers.scaled_health).max(1);
        let max_resource = scale(actor.base.max_resource, multipliers.scaled_resource);
        let current = &actor.current;
        let carry = |value: u32, old_max: u32, new_max: u32| {
            if clone {
                value.min(new_max)
            } else {
                keep_percentage(value, old_max, new_max)
            }
        };
        Self {
            level,
            max_health,
            health: carry(current.health, current.max_health, max_health),
            max_resource,
            resource: carry(current.resource, current.max_resource, max_resource),
            armor: scale(actor.base.armor, multipliers.scaled_armor),
        }
    }

    /// Puts the actor back on its unscaled values.
    pub fn restore(actor: &ActorProfile, level: u8) -> Self {
        Self::scaled(actor, level, &ActorMultipliers::NEUTRAL, false)
    }
}

fn scale(base: u32, multiplier: f64) -> u32 {
    to_u32((f64::from(base) * multiplier).round())
}

fn keep_percentage(value: u32, old_max: u32, new_max: u32) -> u32 {
    if old_max == 0 {
        return new_max;
    }
    let ratio = f64::from(value.min(old_max)) / f64::from(old_max);
    to_u32((ratio * f64::from(new_max)).round()).min(new_max)
}

fn to_u32(value: f64) -> u32 {
    if value.is_nan() || value <= 0.0 {
        0
    } else if value >= f64::from(u32::MAX) {
        u32::MAX
    } else {
        value as u32
    }
}

/// Everything the recalculator reads.
pub struct RecalcInput<'a> {
    pub config: &'a ConfigurationSnapshot,
    pub session: &'a SessionState,
    pub actor: &'a ActorProfile,
    pub rules: RuleEffects,
    pub tables: Option<&'a dyn StatTableOracle>,
    pub hooks: &'a HookRegistry,
    /// Selected level of the summoner, for clones tracked in the same session.
    pub inherited_level: Option<u8>,
}

impl RecalcInput<'_> {
    fn is_boss(&self) -> bool {
        self.actor.uses_boss_parameters() || self.rules.treat_as_boss
    }

    /// Session enabled, actor relevant, and level inside the window.
    pub fn is_eligible(&self, state: &ActorState) -> bool {
        if !self.session.enabled || !state.is_relevant() {
            return false;
        }
        match self.session.window_levels() {
            Some(range) => {
                level::in_window(state.original_level, range, &self.config.level_scaling)
                    || level::bypasses_window(self.actor, &self.config.relevance)
            }
            None => true,
        }
    }

    /// Level the actor should spawn at.
    pub fn select_level(&self, state: &ActorState) -> u8 {
        let original = state.original_level;
        if !self.is_eligible(state) {
            return original;
        }
        if let Some(level) = self.inherited_level {
            return level;
        }
        let (Some(bracket), true) = (self.session.bracket, self.session.level_scaling_active) else {
            return original;
        };
        if self.actor.never_level_scale || self.rules.never_level_scale {
            return original;
        }
        level::target_level(
            self.config.level_scaling.method,
            original,
            bracket.highest,
            self.session.monsters.highest,
            &self.session.settings.level_range,
        )
    }

    fn error_context(&self) -> ErrorContext {
        ErrorContext::new(self.session.id, self.session.epoch).with_actor(self.actor.id)
    }
}

/// Base-table ratios between the new and the original level.
#[derive(Clone, Copy, Debug, PartialEq)]
struct LevelRatios {
    health: f64,
    resource: f64,
    armor: f64,
    damage: f64,
}

impl LevelRatios {
    const NONE: Self = Self {
        health: 1.0,
        resource: 1.0,
        armor: 1.0,
        damage: 1.0,
    };

    fn between(input: &RecalcInput<'_>, from: u8, to: u8) -> Result<Self, ScaleError> {
        let tables = input.tables.ok_or(crate::env::OracleError::TablesNotAvailable)?;
        let class = input.actor.class;
        let missing = |level| ScaleError::MissingBaseStats {
            level,
            ctx: input.error_context(),
        };
        let old = tables.base_stats(from, class).ok_or_else(|| missing(from))?;
        let new = tables.base_stats(to, class).ok_or_else(|| missing(to))?;
        let settings = &input.config.level_scaling;

        let health = ratio(
            level::blended_health(&new, to, settings),
            level::blended_health(&old, from, settings),
        );
        let damage = ratio(
            level::blended_damage(&new, to, settings),
            level::blended_damage(&old, from, settings),
        );
        Ok(Self {
            health,
            resource: ratio(Some(f64::from(new.resource)), Some(f64::from(old.resource))),
            armor: ratio(Some(f64::from(new.armor)), Some(f64::from(old.armor))),
            damage,
        })
    }
}

fn ratio(new: Option<f64>, old: Option<f64>) -> f64 {
    match (new, old) {
        (Some(new), Some(old)) if old > 0.0 => new / old,
        _ => 1.0,
    }
}

/// Recomputes one actor and stamps it fresh for the session epoch.
///
/// Returns the values the host should apply, or `None` when the actor is to
/// be left as it is.
pub fn recalculate(input: &RecalcInput<'_>, state: &mut ActorState) -> Option<StatUpdate> {
    state.epoch = input.session.epoch;
    let actor = input.actor;
    let original = state.original_level;

    if !input.is_eligible(state) {
        state.selected_level = original;
        state.multipliers = ActorMultipliers::NEUTRAL;
        state.rewards = RewardMultipliers::default();
        return restore_if_scaled(actor, original);
    }

    let mut population = input
        .rules
        .forced_population
        .unwrap_or(input.session.adjusted_population);
    if !input.hooks.before_modify_attributes(actor, &mut population) {
        return leave_untouched(state);
    }

    let boss = input.is_boss();
    let curve = resolve_curve(&input.session.settings, input.session.capacity, boss);
    let mut multiplier = curve.multiplier(f64::from(population));
    if !input.hooks.after_default_multiplier(actor, &mut multiplier) {
        return leave_untouched(state);
    }

    let mut selected = input.select_level(state);
    let ratios = if selected == original {
        LevelRatios::NONE
    } else {
        match LevelRatios::between(input, original, selected) {
            Ok(ratios) => ratios,
            Err(err) => {
                warn!(
                    target: "scaling::recalc",
                    session = %input.session.id,
                    actor = %actor.id,
                    code = err.error_code(),
                    severity = err.severity().as_str(),
                    error = %err,
                    "level scaling skipped"
                );
                selected = original;
                LevelRatios::NONE
            }
        }
    };

    let mods = resolve_stat_modifiers(input.config, &input.session.settings, Some(actor), boss);
    let limits = &input.config.limits;
    let base = multiplier * mods.global;
    let health = (base * mods.health).max(limits.min_health);
    let resource = (base * mods.resource).max(limits.min_resource);
    let armor = base * mods.armor;
    let damage = (base * mods.damage).max(limits.min_damage);
    let cc_duration = mods.cc_duration.map_or(1.0, |cc| {
        (multiplier * cc).clamp(limits.min_cc_duration, limits.max_cc_duration)
    });

    let mut multipliers = ActorMultipliers {
        health,
        resource,
        armor,
        damage,
        cc_duration,
        scaled_health: health * ratios.health,
        scaled_resource: resource * ratios.resource,
        scaled_armor: armor * ratios.armor,
        scaled_damage: damage * ratios.damage,
    };

    let mut update = StatUpdate::scaled(actor, selected, &multipliers, state.is_clone());
    let mut damage_multiplier = multipliers.scaled_damage;
    if !input
        .hooks
        .before_update_stats(actor, &mut update, &mut damage_multiplier)
    {
        return leave_untouched(state);
    }
    multipliers.scaled_damage = damage_multiplier;

    state.selected_level = update.level;
    state.multipliers = multipliers;
    state.rewards = reward_multipliers(
        &input.config.rewards,
        input.session.adjusted_population,
        input.session.capacity,
    );

    debug!(
        target: "scaling::recalc",
        session = %input.session.id,
        actor = %actor.id,
        population,
        curve = multiplier,
        level = update.level,
        max_health = update.max_health,
        "actor recalculated"
    );
    Some(update)
}

fn leave_untouched(state: &mut ActorState) -> Option<StatUpdate> {
    state.selected_level = state.original_level;
    state.multipliers = ActorMultipliers::NEUTRAL;
    state.rewards = RewardMultipliers::default();
    None
}

/// Restores unscaled values if the host still carries scaled ones.
fn restore_if_scaled(actor: &ActorProfile, original: u8) -> Option<StatUpdate> {
    let current = &actor.current;
    let scaled = current.max_health != actor.base.max_health.max(1)
        || current.max_resource != actor.base.max_resource;
    scaled.then(|| StatUpdate::restore(actor, original))
}
