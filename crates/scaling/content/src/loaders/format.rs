//! On-disk schema of `scaling.toml`.
//!
//! Example:
//!
//! ```toml
//! enabled = true
//!
//! [level_scaling]
//! method = "dynamic"
//!
//! [brackets.raid25]
//! curve = { inflection_factor = 0.5, floor = 0.1, ceiling = 1.0 }
//! stats = { damage = 0.9 }
//!
//! [brackets.raid25-heroic]
//! min_population = 10
//!
//! [[instance_overrides]]
//! map = 533
//! curve = { ceiling = 1.2 }
//! level_range = { skip_lower = 0 }
//!
//! [[actor_overrides]]
//! template = 15_550
//! health = 0.5
//!
//! [[rules]]
//! predicate = { template_in_map = { template = 15_550, map = 532 } }
//! action = "treat_as_boss"
//! ```
//!
//! Every section is optional; omitted values take the built-in defaults.

use std::collections::{BTreeMap, BTreeSet};
use std::str::FromStr;

use anyhow::Context;
use serde::Deserialize;

use scaling_core::config::{
    BracketId, BracketSettings, ConfigurationSnapshot, ContentRule, ContentRules, CurveOverride,
    CurveParams, InstanceOverride, LevelRangeOverride, LevelRangeParams, LevelScalingSettings,
    ModifierLimits, PopulationSettings, RelevanceSettings, RewardSettings, StatModifierSet,
};
use scaling_core::ids::{MapId, TemplateId};

use crate::loaders::LoadResult;

/// Root of the scaling settings file.
#[derive(Clone, Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScalingFile {
    pub enabled: bool,
    pub disabled_maps: Vec<MapId>,
    pub limits: ModifierLimits,
    pub level_scaling: LevelScalingSettings,
    pub relevance: RelevanceSettings,
    pub rewards: RewardSettings,
    pub population: PopulationSettings,
    /// Settings for capacities no bracket covers.
    pub fallback: BracketSpec,
    /// Keyed by bracket name, e.g. `party5`, `raid25-heroic`, `other`.
    pub brackets: BTreeMap<String, BracketSpec>,
    pub instance_overrides: Vec<InstanceOverrideSpec>,
    pub actor_overrides: Vec<ActorOverrideSpec>,
    pub rules: Vec<ContentRule>,
}

impl Default for ScalingFile {
    fn default() -> Self {
        Self {
            enabled: true,
            disabled_maps: Vec::new(),
            limits: ModifierLimits::default(),
            level_scaling: LevelScalingSettings::default(),
            relevance: RelevanceSettings::default(),
            rewards: RewardSettings::default(),
            population: PopulationSettings::default(),
            fallback: BracketSpec::default(),
            brackets: BTreeMap::new(),
            instance_overrides: Vec::new(),
            actor_overrides: Vec::new(),
            rules: Vec::new(),
        }
    }
}

/// One bracket's settings. Unset stat modifiers resolve to `1.0`, except the
/// crowd-control duration, which stays unset.
#[derive(Clone, Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BracketSpec {
    pub enabled: bool,
    pub curve: CurveParams,
    pub stats: StatModifierSet,
    pub boss_stats: StatModifierSet,
    pub level_range: LevelRangeParams,
    pub min_population: u32,
}

impl Default for BracketSpec {
    fn default() -> Self {
        let settings = BracketSettings::default();
        Self {
            enabled: settings.enabled,
            curve: settings.curve,
            stats: StatModifierSet::UNSET,
            boss_stats: StatModifierSet::UNSET,
            level_range: settings.level_range,
            min_population: settings.min_population,
        }
    }
}

impl BracketSpec {
    pub fn to_settings(&self) -> BracketSettings {
        let defaults = StatModifierSet::bracket_default();
        BracketSettings {
            enabled: self.enabled,
            curve: self.curve,
            stats: self.stats.or(&defaults),
            boss_stats: self.boss_stats.or(&defaults),
            level_range: self.level_range,
            min_population: self.min_population,
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InstanceOverrideSpec {
    pub map: MapId,
    /// Turns scaling off for this map entirely.
    #[serde(default)]
    pub disabled: bool,
    #[serde(default)]
    pub curve: CurveOverride,
    #[serde(default)]
    pub stats: StatModifierSet,
    #[serde(default)]
    pub boss_stats: StatModifierSet,
    #[serde(default)]
    pub level_range: LevelRangeOverride,
    #[serde(default)]
    pub min_population: Option<u32>,
}

impl InstanceOverrideSpec {
    pub fn to_override(&self) -> InstanceOverride {
        InstanceOverride {
            curve: self.curve,
            stats: self.stats,
            boss_stats: self.boss_stats,
            level_range: self.level_range,
            min_population: self.min_population,
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct ActorOverrideSpec {
    pub template: TemplateId,
    #[serde(flatten)]
    pub modifiers: StatModifierSet,
}

impl ScalingFile {
    /// Converts the file into an unvalidated snapshot.
    ///
    /// # Errors
    ///
    /// Fails on an unknown bracket name or a map overridden twice.
    pub fn into_snapshot(self) -> LoadResult<ConfigurationSnapshot> {
        let mut brackets = BTreeMap::new();
        for (name, spec) in &self.brackets {
            let id = BracketId::from_str(name)
                .with_context(|| format!("Invalid [brackets.{name}] section"))?;
            brackets.insert(id, spec.to_settings());
        }

        let mut disabled_maps: BTreeSet<MapId> = self.disabled_maps.iter().copied().collect();
        let mut instance_overrides = BTreeMap::new();
        for spec in &self.instance_overrides {
            if spec.disabled {
                disabled_maps.insert(spec.map);
            }
            if instance_overrides.insert(spec.map, spec.to_override()).is_some() {
                anyhow::bail!("Duplicate instance override for {}", spec.map);
            }
        }

        let actor_overrides = self
            .actor_overrides
            .iter()
            .map(|spec| (spec.template, spec.modifiers))
            .collect();

        Ok(ConfigurationSnapshot {
            enabled: self.enabled,
            brackets,
            fallback: self.fallback.to_settings(),
            disabled_maps,
            instance_overrides,
            actor_overrides,
            limits: self.limits,
            level_scaling: self.level_scaling,
            relevance: self.relevance,
            rewards: self.rewards,
            population: self.population,
            rules: ContentRules::new(self.rules),
            ..ConfigurationSnapshot::new()
        })
    }
}
