//! Instance-size brackets and the settings grouped under them.

use std::fmt;
use std::str::FromStr;

use super::modifiers::StatModifierSet;

/// Capacity tier of an instance.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    strum::EnumIter,
    strum::EnumString,
    strum::IntoStaticStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum SizeTier {
    #[strum(serialize = "party5")]
    Party5,
    #[strum(serialize = "raid10")]
    Raid10,
    #[strum(serialize = "raid15")]
    Raid15,
    #[strum(serialize = "raid20")]
    Raid20,
    #[strum(serialize = "raid25")]
    Raid25,
    #[strum(serialize = "raid40")]
    Raid40,
    /// Overflow bracket for anything that matches no sized tier.
    #[strum(serialize = "other")]
    Other,
}

impl SizeTier {
    /// Maps an instance capacity onto its tier.
    pub const fn for_capacity(capacity: u32) -> Self {
        match capacity {
            1..=5 => Self::Party5,
            6..=10 => Self::Raid10,
            11..=15 => Self::Raid15,
            16..=20 => Self::Raid20,
            21..=25 => Self::Raid25,
            26..=40 => Self::Raid40,
            _ => Self::Other,
        }
    }

    pub fn as_str(self) -> &'static str {
        self.into()
    }
}

/// Normal or heroic variant of the same content.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    strum::EnumString,
    strum::IntoStaticStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[strum(serialize_all = "snake_case")]
pub enum Difficulty {
    #[default]
    Normal,
    Heroic,
}

/// Key of a configuration bracket: size tier × difficulty.
///
/// Text form is the tier name with a `-heroic` suffix for heroic brackets,
/// e.g. `raid25` or `party5-heroic`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BracketId {
    pub tier: SizeTier,
    pub difficulty: Difficulty,
}

impl BracketId {
    pub const OTHER: Self = Self::new(SizeTier::Other, Difficulty::Normal);

    pub const fn new(tier: SizeTier, difficulty: Difficulty) -> Self {
        Self { tier, difficulty }
    }

    pub const fn for_instance(capacity: u32, difficulty: Difficulty) -> Self {
        Self::new(SizeTier::for_capacity(capacity), difficulty)
    }
}

impl fmt::Display for BracketId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.difficulty {
            Difficulty::Normal => f.write_str(self.tier.as_str()),
            Difficulty::Heroic => write!(f, "{}-heroic", self.tier.as_str()),
        }
    }
}

/// Error returned when a bracket key cannot be parsed.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("unknown bracket '{0}'")]
pub struct ParseBracketError(pub String);

impl FromStr for BracketId {
    type Err = ParseBracketError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (tier, difficulty) = match s.strip_suffix("-heroic") {
            Some(tier) => (tier, Difficulty::Heroic),
            None => (s, Difficulty::Normal),
        };
        let tier = SizeTier::from_str(tier).map_err(|_| ParseBracketError(s.to_owned()))?;
        Ok(Self::new(tier, difficulty))
    }
}

/// Parameters of the population curve for one bracket.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct CurveParams {
    /// Fraction of capacity at which the curve is centered.
    pub inflection_factor: f64,
    pub floor: f64,
    pub ceiling: f64,
    /// Extra factor on the inflection value for bosses.
    pub boss_factor: f64,
}

impl Default for CurveParams {
    fn default() -> Self {
        Self {
            inflection_factor: 0.5,
            floor: 0.0,
            ceiling: 1.0,
            boss_factor: 1.0,
        }
    }
}

/// Level-scaling band parameters, in levels.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct LevelRangeParams {
    /// Instances at most this many levels above the highest participant are
    /// left alone (0 disables the band on that side).
    pub skip_higher: u8,
    /// Instances at most this many levels below the highest participant are
    /// left alone (0 disables the band on that side).
    pub skip_lower: u8,
    /// Highest level above the top participant a dynamically scaled actor may reach.
    pub dynamic_ceiling: u8,
    /// Lowest level below the top participant a dynamically scaled actor may reach.
    pub dynamic_floor: u8,
}

impl Default for LevelRangeParams {
    fn default() -> Self {
        Self {
            skip_higher: 3,
            skip_lower: 5,
            dynamic_ceiling: 3,
            dynamic_floor: 5,
        }
    }
}

/// Everything configured for one bracket.
#[derive(Clone, Debug, PartialEq)]
pub struct BracketSettings {
    pub enabled: bool,
    pub curve: CurveParams,
    pub stats: StatModifierSet,
    pub boss_stats: StatModifierSet,
    pub level_range: LevelRangeParams,
    /// Adjusted population never drops below this.
    pub min_population: u32,
}

impl Default for BracketSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            curve: CurveParams::default(),
            stats: StatModifierSet::bracket_default(),
            boss_stats: StatModifierSet::bracket_default(),
            level_range: LevelRangeParams::default(),
            min_population: 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capacity_maps_to_tiers() {
        assert_eq!(SizeTier::for_capacity(5), SizeTier::Party5);
        assert_eq!(SizeTier::for_capacity(10), SizeTier::Raid10);
        assert_eq!(SizeTier::for_capacity(25), SizeTier::Raid25);
        assert_eq!(SizeTier::for_capacity(40), SizeTier::Raid40);
        assert_eq!(SizeTier::for_capacity(0), SizeTier::Other);
        assert_eq!(SizeTier::for_capacity(80), SizeTier::Other);
    }

    #[test]
    fn bracket_ids_parse_and_display() {
        let heroic: BracketId = "raid25-heroic".parse().unwrap();
        assert_eq!(heroic, BracketId::new(SizeTier::Raid25, Difficulty::Heroic));
        assert_eq!(heroic.to_string(), "raid25-heroic");

        let normal: BracketId = "party5".parse().unwrap();
        assert_eq!(normal.to_string(), "party5");

        assert!("raid7".parse::<BracketId>().is_err());
    }
}
