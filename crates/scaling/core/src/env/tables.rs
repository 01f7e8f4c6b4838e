use arrayvec::ArrayVec;

/// Oracle providing per-level base stats.
///
/// Rows are indexed by level and broad unit class. Health and damage carry
/// one value per content tier so that the recalculator can smooth the jump
/// between tiers; resource and armor carry a single value.
pub trait StatTableOracle: Send + Sync {
    fn base_stats(&self, level: u8, class: UnitClass) -> Option<BaseStatRow>;
}

/// Broad actor class selecting a base-stat column.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, strum::EnumIter,
    strum::IntoStaticStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[strum(serialize_all = "snake_case")]
pub enum UnitClass {
    #[default]
    Warrior,
    Paladin,
    Rogue,
    Mage,
}

/// One level's worth of base stats.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BaseStatRow {
    pub health: ArrayVec<u32, { BaseStatRow::MAX_TIERS }>,
    pub damage: ArrayVec<f64, { BaseStatRow::MAX_TIERS }>,
    pub resource: u32,
    pub armor: u32,
}

impl BaseStatRow {
    /// Maximum number of content tiers a row can describe.
    pub const MAX_TIERS: usize = 4;

    /// Health for `tier`, falling back to the highest tier present.
    pub fn health_at(&self, tier: usize) -> Option<f64> {
        Self::tier_value(&self.health, tier).map(|value| f64::from(*value))
    }

    /// Damage for `tier`, falling back to the highest tier present.
    pub fn damage_at(&self, tier: usize) -> Option<f64> {
        Self::tier_value(&self.damage, tier).copied()
    }

    fn tier_value<T>(values: &[T], tier: usize) -> Option<&T> {
        values.get(tier).or_else(|| values.last())
    }
}
