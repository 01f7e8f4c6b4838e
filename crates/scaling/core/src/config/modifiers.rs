//! Stat-modifier sets and the clamps applied to computed multipliers.

/// A stat-modifier layer where every field may be unset.
///
/// Unset (`None`) means "fall through to the next layer". The layers, highest
/// precedence first, are: per-actor override, per-instance override, bracket
/// default.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct StatModifierSet {
    pub global: Option<f64>,
    pub health: Option<f64>,
    pub resource: Option<f64>,
    pub armor: Option<f64>,
    pub damage: Option<f64>,
    pub cc_duration: Option<f64>,
}

impl StatModifierSet {
    pub const UNSET: Self = Self {
        global: None,
        health: None,
        resource: None,
        armor: None,
        damage: None,
        cc_duration: None,
    };

    /// Bracket defaults: neutral multipliers, CC duration untouched.
    pub const fn bracket_default() -> Self {
        Self {
            global: Some(1.0),
            health: Some(1.0),
            resource: Some(1.0),
            armor: Some(1.0),
            damage: Some(1.0),
            cc_duration: None,
        }
    }

    /// Field-wise: keeps set fields of `self`, fills the rest from `fallback`.
    #[must_use]
    pub fn or(self, fallback: &Self) -> Self {
        Self {
            global: self.global.or(fallback.global),
            health: self.health.or(fallback.health),
            resource: self.resource.or(fallback.resource),
            armor: self.armor.or(fallback.armor),
            damage: self.damage.or(fallback.damage),
            cc_duration: self.cc_duration.or(fallback.cc_duration),
        }
    }

    pub fn is_unset(&self) -> bool {
        *self == Self::UNSET
    }
}

/// Fully resolved stat modifiers.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StatModifiers {
    pub global: f64,
    pub health: f64,
    pub resource: f64,
    pub armor: f64,
    pub damage: f64,
    /// `None` leaves crowd-control durations unchanged.
    pub cc_duration: Option<f64>,
}

impl StatModifiers {
    pub const NEUTRAL: Self = Self {
        global: 1.0,
        health: 1.0,
        resource: 1.0,
        armor: 1.0,
        damage: 1.0,
        cc_duration: None,
    };

    /// Resolves a layered set; anything still unset becomes neutral.
    pub fn from_set(set: &StatModifierSet) -> Self {
        Self {
            global: set.global.unwrap_or(1.0),
            health: set.health.unwrap_or(1.0),
            resource: set.resource.unwrap_or(1.0),
            armor: set.armor.unwrap_or(1.0),
            damage: set.damage.unwrap_or(1.0),
            cc_duration: set.cc_duration,
        }
    }
}

impl Default for StatModifiers {
    fn default() -> Self {
        Self::NEUTRAL
    }
}

/// Bounds on computed multipliers.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ModifierLimits {
    pub min_health: f64,
    pub min_resource: f64,
    pub min_damage: f64,
    pub min_cc_duration: f64,
    pub max_cc_duration: f64,
}

impl Default for ModifierLimits {
    fn default() -> Self {
        Self {
            min_health: 0.1,
            min_resource: 0.01,
            min_damage: 0.01,
            min_cc_duration: 0.25,
            max_cc_duration: 1.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn or_fills_only_unset_fields() {
        let actor = StatModifierSet {
            health: Some(2.0),
            ..StatModifierSet::UNSET
        };
        let instance = StatModifierSet {
            health: Some(3.0),
            damage: Some(0.5),
            ..StatModifierSet::UNSET
        };
        let merged = actor
            .or(&instance)
            .or(&StatModifierSet::bracket_default());

        assert_eq!(merged.health, Some(2.0));
        assert_eq!(merged.damage, Some(0.5));
        assert_eq!(merged.armor, Some(1.0));
        assert_eq!(merged.cc_duration, None);
    }

    #[test]
    fn unset_cc_stays_unset_after_resolution() {
        let resolved = StatModifiers::from_set(&StatModifierSet::UNSET);
        assert_eq!(resolved, StatModifiers::NEUTRAL);
        assert!(resolved.cc_duration.is_none());
    }
}
