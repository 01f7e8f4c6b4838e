//! Snapshot validation.
//!
//! Anomalies are clamped in place and reported; nothing here rejects a
//! configuration outright.

use std::fmt;

use super::bracket::{BracketId, BracketSettings, SizeTier};
use super::ConfigurationSnapshot;
use crate::ids::MapId;

/// Where in the configuration a warning was raised.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WarningScope {
    Bracket(BracketId),
    Instance(MapId),
    Fallback,
    Global,
}

impl fmt::Display for WarningScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bracket(id) => write!(f, "bracket {id}"),
            Self::Instance(map) => write!(f, "instance {map}"),
            Self::Fallback => f.write_str("fallback bracket"),
            Self::Global => f.write_str("global settings"),
        }
    }
}

/// A configuration anomaly that was clamped.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum ConfigWarning {
    #[error("{scope}: curve ceiling {ceiling} is below floor {floor}; clamped to floor")]
    CeilingBelowFloor {
        scope: WarningScope,
        floor: f64,
        ceiling: f64,
    },

    #[error("{scope}: inflection factor {factor} is not positive; reset to {reset}")]
    NonPositiveInflection {
        scope: WarningScope,
        factor: f64,
        reset: f64,
    },

    #[error("{scope}: minimum population {min} exceeds capacity {capacity}; clamped")]
    MinPopulationAboveCapacity {
        scope: WarningScope,
        min: u32,
        capacity: u32,
    },

    #[error("crowd-control limits inverted (min {min} > max {max}); min clamped to max")]
    CrowdControlLimitsInverted { min: f64, max: f64 },

    #[error("level window inverted (low {low} > high {high}); swapped")]
    LevelWindowInverted { low: f64, high: f64 },
}

impl ConfigurationSnapshot {
    /// Clamps anomalies in place and returns what was changed.
    pub fn validate(&mut self) -> Vec<ConfigWarning> {
        let mut warnings = Vec::new();

        for (id, bracket) in &mut self.brackets {
            validate_bracket(WarningScope::Bracket(*id), bracket, tier_capacity(id.tier), &mut warnings);
        }
        validate_bracket(WarningScope::Fallback, &mut self.fallback, None, &mut warnings);

        for (map, over) in &mut self.instance_overrides {
            let scope = WarningScope::Instance(*map);
            if let (Some(floor), Some(ceiling)) = (over.curve.floor, over.curve.ceiling)
                && ceiling < floor
            {
                warnings.push(ConfigWarning::CeilingBelowFloor {
                    scope,
                    floor,
                    ceiling,
                });
                over.curve.ceiling = Some(floor);
            }
            if let Some(factor) = over.curve.inflection_factor
                && factor <= 0.0
            {
                warnings.push(ConfigWarning::NonPositiveInflection {
                    scope,
                    factor,
                    reset: 0.5,
                });
                over.curve.inflection_factor = None;
            }
        }

        let limits = &mut self.limits;
        if limits.min_cc_duration > limits.max_cc_duration {
            warnings.push(ConfigWarning::CrowdControlLimitsInverted {
                min: limits.min_cc_duration,
                max: limits.max_cc_duration,
            });
            limits.min_cc_duration = limits.max_cc_duration;
        }

        let window = &mut self.level_scaling;
        if window.window_low > window.window_high {
            warnings.push(ConfigWarning::LevelWindowInverted {
                low: window.window_low,
                high: window.window_high,
            });
            std::mem::swap(&mut window.window_low, &mut window.window_high);
        }

        warnings
    }
}

/// Largest capacity a sized tier admits.
fn tier_capacity(tier: SizeTier) -> Option<u32> {
    match tier {
        SizeTier::Party5 => Some(5),
        SizeTier::Raid10 => Some(10),
        SizeTier::Raid15 => Some(15),
        SizeTier::Raid20 => Some(20),
        SizeTier::Raid25 => Some(25),
        SizeTier::Raid40 => Some(40),
        SizeTier::Other => None,
    }
}

fn validate_bracket(
    scope: WarningScope,
    bracket: &mut BracketSettings,
    capacity: Option<u32>,
    warnings: &mut Vec<ConfigWarning>,
) {
    let curve = &mut bracket.curve;
    if curve.ceiling < curve.floor {
        warnings.push(ConfigWarning::CeilingBelowFloor {
            scope,
            floor: curve.floor,
            ceiling: curve.ceiling,
        });
        curve.ceiling = curve.floor;
    }
    if curve.inflection_factor <= 0.0 {
        let reset = super::CurveParams::default().inflection_factor;
        warnings.push(ConfigWarning::NonPositiveInflection {
            scope,
            factor: curve.inflection_factor,
            reset,
        });
        curve.inflection_factor = reset;
    }
    if let Some(capacity) = capacity
        && bracket.min_population > capacity
    {
        warnings.push(ConfigWarning::MinPopulationAboveCapacity {
            scope,
            min: bracket.min_population,
            capacity,
        });
        bracket.min_population = capacity;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CurveOverride, Difficulty, InstanceOverride};

    #[test]
    fn inverted_curve_and_oversized_minimum_are_clamped() {
        let mut bracket = BracketSettings {
            min_population: 12,
            ..BracketSettings::default()
        };
        bracket.curve.floor = 0.8;
        bracket.curve.ceiling = 0.5;
        let id = BracketId::new(SizeTier::Raid10, Difficulty::Normal);
        let mut config = ConfigurationSnapshot::new().with_bracket(id, bracket);

        let warnings = config.validate();

        assert_eq!(warnings.len(), 2);
        let fixed = &config.brackets[&id];
        assert_eq!(fixed.curve.ceiling, 0.8);
        assert_eq!(fixed.min_population, 10);
    }

    #[test]
    fn override_ceiling_below_floor_is_clamped() {
        let mut config = ConfigurationSnapshot::new().with_instance_override(
            MapId(1),
            InstanceOverride {
                curve: CurveOverride {
                    floor: Some(0.4),
                    ceiling: Some(0.2),
                    ..CurveOverride::default()
                },
                ..InstanceOverride::default()
            },
        );

        let warnings = config.validate();
        assert!(matches!(
            warnings.as_slice(),
            [ConfigWarning::CeilingBelowFloor { scope: WarningScope::Instance(MapId(1)), .. }]
        ));
        assert_eq!(config.instance_overrides[&MapId(1)].curve.ceiling, Some(0.4));
    }

    #[test]
    fn clean_snapshot_has_no_warnings() {
        let mut config = ConfigurationSnapshot::new();
        assert!(config.validate().is_empty());
    }
}
