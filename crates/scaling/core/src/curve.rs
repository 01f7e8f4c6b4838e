//! Population curve and stat-modifier resolution.
//!
//! The curve is a tanh ramp centered at the inflection value. It is
//! renormalized so that evaluating it at full capacity lands on the configured
//! ceiling:
//!
//! ```text
//! spread     = (cap / 5) * 1.5
//! ceilingAdj = c / ( ((tanh((cap - v) / spread) + 1) / 2) * (c - f) + f )
//! m(p)       = ((tanh((p - v) / spread) + 1) / 2) * (c * ceilingAdj - f) + f
//! ```

use crate::config::{BracketSettings, ConfigurationSnapshot, CurveParams, StatModifiers};
use crate::env::ActorProfile;

/// Denominators smaller than this are treated as zero.
const DEGENERATE: f64 = 1e-9;

/// Curve parameters resolved for one session and one actor kind.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Curve {
    /// Population at which the ramp is centered.
    pub inflection: f64,
    pub floor: f64,
    pub ceiling: f64,
    pub capacity: u32,
}

impl Curve {
    /// Resolves `params` (already layered with any instance override) for an
    /// instance of `capacity`.
    pub fn resolve(params: &CurveParams, capacity: u32, boss: bool) -> Self {
        let mut inflection = params.inflection_factor * f64::from(capacity);
        if boss {
            inflection *= params.boss_factor;
        }
        Self {
            inflection,
            floor: params.floor,
            ceiling: params.ceiling.max(params.floor),
            capacity,
        }
    }

    fn spread(&self) -> f64 {
        (f64::from(self.capacity) / 5.0) * 1.5
    }

    fn ramp(&self, population: f64, spread: f64) -> f64 {
        (((population - self.inflection) / spread).tanh() + 1.0) / 2.0
    }

    /// Factor that makes `multiplier(capacity)` equal the ceiling.
    fn ceiling_adjustment(&self, spread: f64) -> f64 {
        let at_capacity = self.ramp(f64::from(self.capacity), spread);
        let denominator = at_capacity * (self.ceiling - self.floor) + self.floor;
        if denominator.abs() < DEGENERATE {
            1.0
        } else {
            self.ceiling / denominator
        }
    }

    /// Curve output for an adjusted population.
    ///
    /// Non-decreasing in `population`. Capacity 0 has no curve and yields 1.0.
    pub fn multiplier(&self, population: f64) -> f64 {
        if self.capacity == 0 {
            return 1.0;
        }
        let spread = self.spread();
        let adjustment = self.ceiling_adjustment(spread);
        self.ramp(population, spread) * (self.ceiling * adjustment - self.floor) + self.floor
    }
}

/// Curve for a session's resolved bracket settings.
pub fn resolve_curve(settings: &BracketSettings, capacity: u32, boss: bool) -> Curve {
    Curve::resolve(&settings.curve, capacity, boss)
}

/// Stat modifiers with per-field precedence: per-actor override, then the
/// session's (boss or non-boss) layer, which already carries the instance
/// override on top of the bracket default.
pub fn resolve_stat_modifiers(
    config: &ConfigurationSnapshot,
    settings: &BracketSettings,
    actor: Option<&ActorProfile>,
    boss: bool,
) -> StatModifiers {
    let session_layer = if boss {
        &settings.boss_stats
    } else {
        &settings.stats
    };
    let merged = match actor.and_then(|actor| config.actor_override(actor.template)) {
        Some(actor_layer) => actor_layer.or(session_layer),
        None => *session_layer,
    };
    StatModifiers::from_set(&merged)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{InstanceOverride, StatModifierSet};
    use crate::env::BaseStats;
    use crate::ids::{ActorId, MapId, TemplateId};

    const EPS: f64 = 1e-3;

    fn approx(actual: f64, expected: f64) -> bool {
        (actual - expected).abs() < EPS
    }

    fn party_curve() -> Curve {
        Curve::resolve(&CurveParams::default(), 5, false)
    }

    #[test]
    fn five_player_reference_values() {
        let curve = party_curve();
        assert!(approx(curve.inflection, 2.5));
        assert!(approx(curve.multiplier(3.0), 0.684), "{}", curve.multiplier(3.0));
        assert!(approx(curve.multiplier(5.0), 1.0), "{}", curve.multiplier(5.0));
    }

    #[test]
    fn multiplier_is_monotonic() {
        for capacity in [5, 10, 25, 40] {
            let curve = Curve::resolve(&CurveParams::default(), capacity, false);
            let mut previous = curve.multiplier(0.0);
            for population in 1..=capacity * 2 {
                let next = curve.multiplier(f64::from(population));
                assert!(next >= previous, "capacity {capacity} dropped at {population}");
                previous = next;
            }
        }
    }

    #[test]
    fn full_capacity_converges_on_ceiling() {
        let params = CurveParams {
            inflection_factor: 0.6,
            floor: 0.0,
            ceiling: 1.4,
            boss_factor: 1.0,
        };
        for capacity in [5, 10, 20, 25, 40] {
            let curve = Curve::resolve(&params, capacity, false);
            assert!(approx(curve.multiplier(f64::from(capacity)), 1.4));
        }
    }

    #[test]
    fn boss_factor_moves_the_inflection() {
        let params = CurveParams {
            boss_factor: 1.2,
            ..CurveParams::default()
        };
        let normal = Curve::resolve(&params, 10, false);
        let boss = Curve::resolve(&params, 10, true);
        assert!(approx(normal.inflection, 5.0));
        assert!(approx(boss.inflection, 6.0));
        assert!(boss.multiplier(5.0) < normal.multiplier(5.0));
    }

    #[test]
    fn zero_ceiling_and_floor_do_not_divide_by_zero() {
        let params = CurveParams {
            floor: 0.0,
            ceiling: 0.0,
            ..CurveParams::default()
        };
        let value = Curve::resolve(&params, 5, false).multiplier(3.0);
        assert!(value.is_finite());
        assert_eq!(Curve::resolve(&params, 0, false).multiplier(3.0), 1.0);
    }

    #[test]
    fn stat_modifier_precedence_is_per_field() {
        let config = ConfigurationSnapshot::new()
            .with_instance_override(
                MapId(1),
                InstanceOverride {
                    stats: StatModifierSet {
                        health: Some(2.0),
                        damage: Some(3.0),
                        ..StatModifierSet::UNSET
                    },
                    ..InstanceOverride::default()
                },
            )
            .with_actor_override(
                TemplateId(5),
                StatModifierSet {
                    health: Some(4.0),
                    ..StatModifierSet::UNSET
                },
            );
        let settings = config.resolve_instance(MapId(1), 5, Default::default());
        let actor = ActorProfile::new(ActorId(1), TemplateId(5), 10, BaseStats::default());

        let resolved = resolve_stat_modifiers(&config, &settings, Some(&actor), false);
        assert_eq!(resolved.health, 4.0);
        assert_eq!(resolved.damage, 3.0);
        assert_eq!(resolved.armor, 1.0);
        assert_eq!(resolved.cc_duration, None);

        let boss = resolve_stat_modifiers(&config, &settings, None, true);
        assert_eq!(boss.health, 1.0);
    }
}
