//! Per-instance override layers.

use super::bracket::{BracketSettings, CurveParams, LevelRangeParams};
use super::modifiers::StatModifierSet;

/// Curve fields an instance may replace individually.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct CurveOverride {
    pub inflection_factor: Option<f64>,
    pub floor: Option<f64>,
    pub ceiling: Option<f64>,
    pub boss_factor: Option<f64>,
}

impl CurveOverride {
    pub fn apply(&self, base: CurveParams) -> CurveParams {
        CurveParams {
            inflection_factor: self.inflection_factor.unwrap_or(base.inflection_factor),
            floor: self.floor.unwrap_or(base.floor),
            ceiling: self.ceiling.unwrap_or(base.ceiling),
            boss_factor: self.boss_factor.unwrap_or(base.boss_factor),
        }
    }
}

/// Level-range fields an instance may replace individually.
///
/// Every field falls back to the same field of the bracket.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct LevelRangeOverride {
    pub skip_higher: Option<u8>,
    pub skip_lower: Option<u8>,
    pub dynamic_ceiling: Option<u8>,
    pub dynamic_floor: Option<u8>,
}

impl LevelRangeOverride {
    pub fn apply(&self, base: LevelRangeParams) -> LevelRangeParams {
        LevelRangeParams {
            skip_higher: self.skip_higher.unwrap_or(base.skip_higher),
            skip_lower: self.skip_lower.unwrap_or(base.skip_lower),
            dynamic_ceiling: self.dynamic_ceiling.unwrap_or(base.dynamic_ceiling),
            dynamic_floor: self.dynamic_floor.unwrap_or(base.dynamic_floor),
        }
    }
}

/// Everything that can be overridden for one instance map.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct InstanceOverride {
    pub curve: CurveOverride,
    pub stats: StatModifierSet,
    pub boss_stats: StatModifierSet,
    pub level_range: LevelRangeOverride,
    pub min_population: Option<u32>,
}

impl InstanceOverride {
    /// Bracket settings with this override laid on top.
    pub fn apply(&self, bracket: &BracketSettings) -> BracketSettings {
        BracketSettings {
            enabled: bracket.enabled,
            curve: self.curve.apply(bracket.curve),
            stats: self.stats.or(&bracket.stats),
            boss_stats: self.boss_stats.or(&bracket.boss_stats),
            level_range: self.level_range.apply(bracket.level_range),
            min_population: self.min_population.unwrap_or(bracket.min_population),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_range_fields_fall_back_independently() {
        let base = LevelRangeParams {
            skip_higher: 3,
            skip_lower: 5,
            dynamic_ceiling: 4,
            dynamic_floor: 6,
        };
        let partial = LevelRangeOverride {
            dynamic_ceiling: Some(2),
            ..LevelRangeOverride::default()
        };

        let resolved = partial.apply(base);
        assert_eq!(resolved.dynamic_ceiling, 2);
        assert_eq!(resolved.dynamic_floor, 6);
        assert_eq!(resolved.skip_higher, 3);
        assert_eq!(resolved.skip_lower, 5);
    }

    #[test]
    fn instance_override_replaces_only_set_fields() {
        let bracket = BracketSettings::default();
        let over = InstanceOverride {
            curve: CurveOverride {
                ceiling: Some(2.0),
                ..CurveOverride::default()
            },
            min_population: Some(3),
            ..InstanceOverride::default()
        };

        let merged = over.apply(&bracket);
        assert_eq!(merged.curve.ceiling, 2.0);
        assert_eq!(merged.curve.floor, bracket.curve.floor);
        assert_eq!(merged.curve.inflection_factor, bracket.curve.inflection_factor);
        assert_eq!(merged.min_population, 3);
        assert_eq!(merged.stats, bracket.stats);
    }
}
