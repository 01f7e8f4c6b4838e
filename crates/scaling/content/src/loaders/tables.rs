//! Base-stat table loader.
//!
//! File format: a list of rows, one per level and unit class.
//!
//! ```ron
//! [
//!     (level: 60, class: warrior, health: [4200, 5400], damage: [90.0, 110.0], resource: 1800, armor: 1200),
//!     (level: 60, class: mage, health: [3100], damage: [70.0], resource: 3300, armor: 600),
//! ]
//! ```
//!
//! `health` and `damage` list one value per content tier, oldest first.

use std::collections::BTreeMap;
use std::path::Path;

use arrayvec::ArrayVec;
use serde::Deserialize;

use scaling_core::env::{BaseStatRow, StatTableOracle, UnitClass};

use crate::loaders::{LoadResult, read_file};

#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RowSpec {
    level: u8,
    #[serde(default)]
    class: UnitClass,
    health: Vec<u32>,
    damage: Vec<f64>,
    resource: u32,
    armor: u32,
}

/// In-memory base-stat tables indexed by level and class.
///
/// A class without its own row for a level falls back to the warrior row.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StatTables {
    rows: BTreeMap<(u8, UnitClass), BaseStatRow>,
}

impl StatTables {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, level: u8, class: UnitClass, row: BaseStatRow) {
        self.rows.insert((level, class), row);
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Highest level with at least one row.
    pub fn max_level(&self) -> Option<u8> {
        self.rows.keys().map(|(level, _)| *level).max()
    }
}

impl StatTableOracle for StatTables {
    fn base_stats(&self, level: u8, class: UnitClass) -> Option<BaseStatRow> {
        self.rows
            .get(&(level, class))
            .or_else(|| self.rows.get(&(level, UnitClass::Warrior)))
            .cloned()
    }
}

/// Loader for base-stat tables from RON files.
pub struct TablesLoader;

impl TablesLoader {
    pub fn load(path: &Path) -> LoadResult<StatTables> {
        let content = read_file(path)?;
        Self::parse(&content)
            .map_err(|e| anyhow::anyhow!("Failed to load tables {}: {:#}", path.display(), e))
    }

    pub fn parse(source: &str) -> LoadResult<StatTables> {
        let specs: Vec<RowSpec> = ron::from_str(source)
            .map_err(|e| anyhow::anyhow!("Failed to parse base stats RON: {}", e))?;

        let mut tables = StatTables::new();
        for spec in specs {
            let row = BaseStatRow {
                health: tiers(spec.health, spec.level, "health")?,
                damage: tiers(spec.damage, spec.level, "damage")?,
                resource: spec.resource,
                armor: spec.armor,
            };
            if tables.rows.insert((spec.level, spec.class), row).is_some() {
                let class: &'static str = spec.class.into();
                anyhow::bail!("Duplicate base stats for level {} {}", spec.level, class);
            }
        }
        Ok(tables)
    }
}

fn tiers<T>(
    values: Vec<T>,
    level: u8,
    column: &str,
) -> LoadResult<ArrayVec<T, { BaseStatRow::MAX_TIERS }>> {
    if values.is_empty() {
        anyhow::bail!("Level {level} has no {column} values");
    }
    let mut tiers = ArrayVec::new();
    for value in values {
        tiers.try_push(value).map_err(|_| {
            anyhow::anyhow!(
                "Level {level} lists more than {} {column} tiers",
                BaseStatRow::MAX_TIERS
            )
        })?;
    }
    Ok(tiers)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rows_are_indexed_by_level_and_class() {
        let tables = TablesLoader::parse(
            r#"[
                (level: 60, health: [4200, 5400], damage: [90.0, 110.0], resource: 1800, armor: 1200),
                (level: 60, class: mage, health: [3100], damage: [70.0], resource: 3300, armor: 600),
            ]"#,
        )
        .unwrap();

        assert_eq!(tables.len(), 2);
        assert_eq!(tables.max_level(), Some(60));
        let mage = tables.base_stats(60, UnitClass::Mage).expect("mage row");
        assert_eq!(mage.resource, 3300);
        // No rogue row: warrior column.
        let rogue = tables.base_stats(60, UnitClass::Rogue).expect("fallback row");
        assert_eq!(rogue.health_at(1), Some(5400.0));
        assert!(tables.base_stats(61, UnitClass::Warrior).is_none());
    }

    #[test]
    fn too_many_tiers_is_an_error() {
        let err = TablesLoader::parse(
            "[(level: 1, health: [1, 2, 3, 4, 5], damage: [1.0], resource: 0, armor: 0)]",
        )
        .unwrap_err();
        assert!(err.to_string().contains("health"));
    }

    #[test]
    fn duplicate_rows_are_rejected() {
        let err = TablesLoader::parse(
            "[(level: 1, health: [1], damage: [1.0], resource: 0, armor: 0),
              (level: 1, class: warrior, health: [2], damage: [1.0], resource: 0, armor: 0)]",
        )
        .unwrap_err();
        assert!(err.to_string().contains("Duplicate"));
    }
}
