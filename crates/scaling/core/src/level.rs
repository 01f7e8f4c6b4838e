//! Level window, skip band, and target-level selection.

use crate::config::{
    LevelRangeParams, LevelScalingMethod, LevelScalingSettings, RelevanceSettings, TierPosition,
};
use crate::env::{ActorProfile, BaseStatRow, CreatureCategory};

/// True when `level` lies within `[low × lowest, high × highest]`.
pub fn in_window(level: u8, (lowest, highest): (u8, u8), settings: &LevelScalingSettings) -> bool {
    let level = f64::from(level);
    level >= settings.window_low * f64::from(lowest)
        && level <= settings.window_high * f64::from(highest)
}

/// Actors scaled regardless of the level window.
pub fn bypasses_window(actor: &ActorProfile, relevance: &RelevanceSettings) -> bool {
    actor.is_trigger
        || (actor.category == CreatureCategory::Critter
            && actor.base.max_health > relevance.substantial_critter_health)
}

/// Whether the average monster level is close enough to the highest
/// participant that no level scaling is wanted.
pub fn inside_skip_band(average_monster: u8, highest_participant: u8, params: &LevelRangeParams) -> bool {
    let difference = i32::from(average_monster) - i32::from(highest_participant);
    match difference {
        0 => true,
        d if d > 0 => params.skip_higher > 0 && d <= i32::from(params.skip_higher),
        d => params.skip_lower > 0 && -d <= i32::from(params.skip_lower),
    }
}

/// Target level for one actor once level scaling applies.
pub fn target_level(
    method: LevelScalingMethod,
    original: u8,
    highest_participant: u8,
    highest_monster: u8,
    params: &LevelRangeParams,
) -> u8 {
    let top = i32::from(highest_participant);
    let target = match method {
        LevelScalingMethod::Fixed => top,
        LevelScalingMethod::Dynamic => {
            let ceiling = top + i32::from(params.dynamic_ceiling);
            let floor = top - i32::from(params.dynamic_floor);
            let spread = i32::from(highest_monster) - i32::from(original);
            (ceiling - spread).clamp(floor.min(ceiling), ceiling)
        }
    };
    target.clamp(1, i32::from(u8::MAX)) as u8
}

/// Health for `level`, blended across tiers inside a transition band.
pub fn blended_health(row: &BaseStatRow, level: u8, settings: &LevelScalingSettings) -> Option<f64> {
    blended(settings.tier_position(level), |tier| row.health_at(tier))
}

/// Damage for `level`, blended across tiers inside a transition band.
pub fn blended_damage(row: &BaseStatRow, level: u8, settings: &LevelScalingSettings) -> Option<f64> {
    blended(settings.tier_position(level), |tier| row.damage_at(tier))
}

fn blended(position: TierPosition, value_at: impl Fn(usize) -> Option<f64>) -> Option<f64> {
    match position {
        TierPosition::Exact(tier) => value_at(tier),
        TierPosition::Blend {
            lower,
            lower_weight,
        } => {
            let low = value_at(lower)?;
            let high = value_at(lower + 1)?;
            Some(low * lower_weight + high * (1.0 - lower_weight))
        }
    }
}
