//! Immutable configuration snapshot.
//!
//! A [`ConfigurationSnapshot`] bundles every tunable the core reads. It is
//! built once per reload (see the `scaling-content` loader), validated, wrapped
//! in an `Arc`, and never mutated afterwards. Sessions hold the `Arc` they last
//! synced against and detect reloads through the global epoch.
mod bracket;
mod modifiers;
mod overrides;
mod rules;
mod settings;
mod validate;

use std::collections::{BTreeMap, BTreeSet};

pub use bracket::{
    BracketId, BracketSettings, CurveParams, Difficulty, LevelRangeParams, ParseBracketError,
    SizeTier,
};
pub use modifiers::{ModifierLimits, StatModifierSet, StatModifiers};
pub use overrides::{CurveOverride, InstanceOverride, LevelRangeOverride};
pub use rules::{ContentRule, ContentRules, RuleAction, RuleEffects, RulePredicate};
pub use settings::{
    LevelScalingMethod, LevelScalingSettings, PopulationSettings, RelevanceSettings,
    RewardMethod, RewardSettings, TierPosition, TierTransition,
};
pub use validate::{ConfigWarning, WarningScope};

use crate::ids::{MapId, TemplateId};

/// Every tunable of the scaling engine, resolved and typed.
#[derive(Clone, Debug, PartialEq)]
pub struct ConfigurationSnapshot {
    /// Bumped by whoever publishes a new snapshot; shown in diagnostics.
    pub generation: u64,
    /// SHA-256 of the source text, when the snapshot came from a file.
    pub fingerprint: Option<[u8; 32]>,
    /// Master switch.
    pub enabled: bool,
    pub brackets: BTreeMap<BracketId, BracketSettings>,
    /// Used when neither the exact bracket nor an `other` bracket is configured.
    pub fallback: BracketSettings,
    pub disabled_maps: BTreeSet<MapId>,
    pub instance_overrides: BTreeMap<MapId, InstanceOverride>,
    pub actor_overrides: BTreeMap<TemplateId, StatModifierSet>,
    pub limits: ModifierLimits,
    pub level_scaling: LevelScalingSettings,
    pub relevance: RelevanceSettings,
    pub rewards: RewardSettings,
    pub population: PopulationSettings,
    pub rules: ContentRules,
}

impl Default for ConfigurationSnapshot {
    fn default() -> Self {
        Self {
            generation: 0,
            fingerprint: None,
            enabled: true,
            brackets: BTreeMap::new(),
            fallback: BracketSettings::default(),
            disabled_maps: BTreeSet::new(),
            instance_overrides: BTreeMap::new(),
            actor_overrides: BTreeMap::new(),
            limits: ModifierLimits::default(),
            level_scaling: LevelScalingSettings::default(),
            relevance: RelevanceSettings::default(),
            rewards: RewardSettings::default(),
            population: PopulationSettings::default(),
            rules: ContentRules::default(),
        }
    }
}

impl ConfigurationSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_bracket(mut self, id: BracketId, settings: BracketSettings) -> Self {
        self.brackets.insert(id, settings);
        self
    }

    pub fn with_instance_override(mut self, map: MapId, over: InstanceOverride) -> Self {
        self.instance_overrides.insert(map, over);
        self
    }

    pub fn with_actor_override(mut self, template: TemplateId, set: StatModifierSet) -> Self {
        self.actor_overrides.insert(template, set);
        self
    }

    pub fn with_rules(mut self, rules: ContentRules) -> Self {
        self.rules = rules;
        self
    }

    pub fn with_generation(mut self, generation: u64) -> Self {
        self.generation = generation;
        self
    }

    /// Bracket for an instance of `capacity` and `difficulty`.
    ///
    /// Lookup order: exact bracket, `other` of the same difficulty, `other`
    /// normal, then [`Self::fallback`].
    pub fn bracket(&self, capacity: u32, difficulty: Difficulty) -> &BracketSettings {
        let exact = BracketId::for_instance(capacity, difficulty);
        let other = BracketId::new(SizeTier::Other, difficulty);
        self.brackets
            .get(&exact)
            .or_else(|| self.brackets.get(&other))
            .or_else(|| self.brackets.get(&BracketId::OTHER))
            .unwrap_or(&self.fallback)
    }

    pub fn instance_override(&self, map: MapId) -> Option<&InstanceOverride> {
        self.instance_overrides.get(&map)
    }

    pub fn actor_override(&self, template: TemplateId) -> Option<&StatModifierSet> {
        self.actor_overrides.get(&template)
    }

    /// Bracket settings for one instance with its override applied.
    pub fn resolve_instance(
        &self,
        map: MapId,
        capacity: u32,
        difficulty: Difficulty,
    ) -> BracketSettings {
        let bracket = self.bracket(capacity, difficulty);
        match self.instance_override(map) {
            Some(over) => over.apply(bracket),
            None => bracket.clone(),
        }
    }

    /// Whether sessions on `map` scale at all.
    pub fn is_enabled_for(&self, map: MapId, capacity: u32, difficulty: Difficulty) -> bool {
        self.enabled
            && capacity > 0
            && !self.disabled_maps.contains(&map)
            && self.bracket(capacity, difficulty).enabled
    }
}
