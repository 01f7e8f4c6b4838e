//! Global (bracket-independent) settings.

/// How a target level is chosen once level scaling applies.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, strum::EnumString, strum::IntoStaticStr)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[strum(serialize_all = "snake_case")]
pub enum LevelScalingMethod {
    /// Every actor is moved to the highest participant level.
    Fixed,
    /// Actors keep their level spread relative to the strongest actor.
    #[default]
    Dynamic,
}

/// A band of levels over which two content tiers are blended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TierTransition {
    pub from_level: u8,
    pub to_level: u8,
}

/// Where a level sits among the content tiers.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TierPosition {
    Exact(usize),
    /// Strictly inside a transition band: `lower` and `lower + 1` are blended,
    /// with `lower_weight` going to `lower`.
    Blend { lower: usize, lower_weight: f64 },
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct LevelScalingSettings {
    pub enabled: bool,
    pub method: LevelScalingMethod,
    /// Actors below `window_low × lowest bracket level` are left alone.
    pub window_low: f64,
    /// Actors above `window_high × highest bracket level` are left alone.
    pub window_high: f64,
    /// Sorted, non-overlapping tier bands.
    pub tier_transitions: Vec<TierTransition>,
}

impl Default for LevelScalingSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            method: LevelScalingMethod::Dynamic,
            window_low: 0.85,
            window_high: 1.15,
            tier_transitions: vec![
                TierTransition {
                    from_level: 60,
                    to_level: 63,
                },
                TierTransition {
                    from_level: 70,
                    to_level: 73,
                },
            ],
        }
    }
}

impl LevelScalingSettings {
    /// Content tier for `level`.
    ///
    /// A level at or below a band's `from_level` belongs to the lower tier, at
    /// or above `to_level` to the upper one.
    pub fn tier_position(&self, level: u8) -> TierPosition {
        let mut tier = 0;
        for band in &self.tier_transitions {
            if level <= band.from_level {
                return TierPosition::Exact(tier);
            }
            if level < band.to_level {
                let span = f64::from(band.to_level - band.from_level);
                let lower_weight = f64::from(band.to_level - level) / span;
                return TierPosition::Blend {
                    lower: tier,
                    lower_weight,
                };
            }
            tier += 1;
        }
        TierPosition::Exact(tier)
    }
}

/// Thresholds for the relevance classifier and level window.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct RelevanceSettings {
    /// Actors at or below this level with a trivial pool are flavor.
    pub trivial_max_level: u8,
    pub trivial_max_health: u32,
    /// Critters above this base health are scaled even outside the level window.
    pub substantial_critter_health: u32,
}

impl Default for RelevanceSettings {
    fn default() -> Self {
        Self {
            trivial_max_level: 1,
            trivial_max_health: 1,
            substantial_critter_health: 100,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, strum::EnumString, strum::IntoStaticStr)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[strum(serialize_all = "snake_case")]
pub enum RewardMethod {
    #[default]
    Fixed,
    /// Scales with adjusted population over capacity.
    Dynamic,
}

#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct RewardSettings {
    pub method: RewardMethod,
    pub xp_enabled: bool,
    pub xp_modifier: f64,
    pub money_enabled: bool,
    pub money_modifier: f64,
}

impl Default for RewardSettings {
    fn default() -> Self {
        Self {
            method: RewardMethod::Fixed,
            xp_enabled: true,
            xp_modifier: 1.0,
            money_enabled: true,
            money_modifier: 1.0,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct PopulationSettings {
    /// Added to every adjusted population unless an admin override is set.
    pub difficulty_offset: i32,
    /// Publish a notice when a session's adjusted population changes.
    pub notify_changes: bool,
}

impl Default for PopulationSettings {
    fn default() -> Self {
        Self {
            difficulty_offset: 0,
            notify_changes: true,
        }
    }
}
