//! Ordered content rules evaluated before generic scaling.
//!
//! Rules replace per-encounter special cases: each one pairs a predicate on
//! the actor with an action. All matching rules contribute; for
//! [`RuleAction::ForcePopulation`] the first match wins.

use crate::env::ActorProfile;
use crate::ids::{MapId, TemplateId};

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum RulePredicate {
    Template(TemplateId),
    TemplateInMap { template: TemplateId, map: MapId },
    NameContains(String),
}

impl RulePredicate {
    pub fn matches(&self, actor: &ActorProfile, map: MapId) -> bool {
        match self {
            Self::Template(template) => actor.template == *template,
            Self::TemplateInMap {
                template,
                map: rule_map,
            } => actor.template == *template && map == *rule_map,
            Self::NameContains(fragment) => !fragment.is_empty() && actor.name.contains(fragment),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum RuleAction {
    /// Never scale this actor.
    Ignore,
    NeverLevelScale,
    /// Use boss curve and boss modifiers.
    TreatAsBoss,
    /// Evaluate this actor's curve at a fixed population.
    ForcePopulation(u32),
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ContentRule {
    pub predicate: RulePredicate,
    pub action: RuleAction,
}

/// Combined effect of every rule matching one actor.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RuleEffects {
    pub ignore: bool,
    pub never_level_scale: bool,
    pub treat_as_boss: bool,
    pub forced_population: Option<u32>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ContentRules {
    rules: Vec<ContentRule>,
}

impl ContentRules {
    pub fn new(rules: Vec<ContentRule>) -> Self {
        Self { rules }
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ContentRule> {
        self.rules.iter()
    }

    pub fn effects(&self, actor: &ActorProfile, map: MapId) -> RuleEffects {
        let mut effects = RuleEffects::default();
        for rule in self.rules.iter().filter(|rule| rule.predicate.matches(actor, map)) {
            match rule.action {
                RuleAction::Ignore => effects.ignore = true,
                RuleAction::NeverLevelScale => effects.never_level_scale = true,
                RuleAction::TreatAsBoss => effects.treat_as_boss = true,
                RuleAction::ForcePopulation(population) => {
                    effects.forced_population.get_or_insert(population);
                }
            }
        }
        effects
    }
}

impl FromIterator<ContentRule> for ContentRules {
    fn from_iter<I: IntoIterator<Item = ContentRule>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
