//! Customization hooks around the attribute recalculation.
//!
//! A hook can veto scaling for an actor or reshape the values at three points
//! of [`crate::recalc`]:
//!
//! 1. before anything is computed, with the population the curve will use;
//! 2. right after the curve produced its default multiplier;
//! 3. right before the final stat update is handed back to the host.
//!
//! Returning `false` from any point leaves the actor untouched. Hooks run in
//! priority order (lower first); the first veto stops the chain.

use std::sync::Arc;

use tracing::debug;

use crate::env::ActorProfile;
use crate::recalc::StatUpdate;

/// Extension point consulted during every recalculation.
///
/// All methods default to "continue unchanged".
pub trait ScalingHook: Send + Sync {
    /// Human-readable name used in logs.
    fn name(&self) -> &'static str;

    /// Lower values run first.
    fn priority(&self) -> i32 {
        0
    }

    /// May change the population used for this actor, or skip scaling.
    fn before_modify_attributes(&self, _actor: &ActorProfile, _population: &mut u32) -> bool {
        true
    }

    /// May reshape the curve output.
    fn after_default_multiplier(&self, _actor: &ActorProfile, _multiplier: &mut f64) -> bool {
        true
    }

    /// May adjust final values before they are applied.
    fn before_update_stats(
        &self,
        _actor: &ActorProfile,
        _update: &mut StatUpdate,
        _damage_multiplier: &mut f64,
    ) -> bool {
        true
    }
}

/// Priority-ordered set of [`ScalingHook`]s.
#[derive(Clone, Default)]
pub struct HookRegistry {
    hooks: Arc<[Arc<dyn ScalingHook>]>,
}

impl HookRegistry {
    /// Creates a registry; hooks are sorted by priority (lower first, stable).
    pub fn new(mut hooks: Vec<Arc<dyn ScalingHook>>) -> Self {
        hooks.sort_by_key(|hook| hook.priority());
        Self {
            hooks: hooks.into(),
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.hooks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }

    /// Hook names and priorities in execution order (for debugging).
    pub fn hooks(&self) -> impl Iterator<Item = (&'static str, i32)> + '_ {
        self.hooks.iter().map(|hook| (hook.name(), hook.priority()))
    }

    pub(crate) fn before_modify_attributes(&self, actor: &ActorProfile, population: &mut u32) -> bool {
        self.run(actor, "before_modify_attributes", |hook| {
            hook.before_modify_attributes(actor, population)
        })
    }

    pub(crate) fn after_default_multiplier(&self, actor: &ActorProfile, multiplier: &mut f64) -> bool {
        self.run(actor, "after_default_multiplier", |hook| {
            hook.after_default_multiplier(actor, multiplier)
        })
    }

    pub(crate) fn before_update_stats(
        &self,
        actor: &ActorProfile,
        update: &mut StatUpdate,
        damage_multiplier: &mut f64,
    ) -> bool {
        self.run(actor, "before_update_stats", |hook| {
            hook.before_update_stats(actor, update, damage_multiplier)
        })
    }

    fn run(
        &self,
        actor: &ActorProfile,
        point: &'static str,
        mut call: impl FnMut(&dyn ScalingHook) -> bool,
    ) -> bool {
        for hook in self.hooks.iter() {
            if !call(hook.as_ref()) {
                debug!(
                    target: "scaling::hooks",
                    hook = hook.name(),
                    point,
                    actor = %actor.id,
                    "hook vetoed scaling"
                );
                return false;
            }
        }
        true
    }
}

impl std::fmt::Debug for HookRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.hooks()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::BaseStats;
    use crate::ids::{ActorId, TemplateId};

    struct AddOne(i32);

    impl ScalingHook for AddOne {
        fn name(&self) -> &'static str {
            "add_one"
        }

        fn priority(&self) -> i32 {
            self.0
        }

        fn before_modify_attributes(&self, _actor: &ActorProfile, population: &mut u32) -> bool {
            *population += 1;
            true
        }
    }

    struct Veto;

    impl ScalingHook for Veto {
        fn name(&self) -> &'static str {
            "veto"
        }

        fn priority(&self) -> i32 {
            5
        }

        fn before_modify_attributes(&self, _actor: &ActorProfile, _population: &mut u32) -> bool {
            false
        }
    }

    fn actor() -> ActorProfile {
        ActorProfile::new(ActorId(1), TemplateId(1), 10, BaseStats::default())
    }

    #[test]
    fn hooks_run_in_priority_order_until_veto() {
        let registry = HookRegistry::new(vec![
            Arc::new(AddOne(10)) as Arc<dyn ScalingHook>,
            Arc::new(Veto) as Arc<dyn ScalingHook>,
            Arc::new(AddOne(-1)) as Arc<dyn ScalingHook>,
        ]);
        let names: Vec<_> = registry.hooks().map(|(name, _)| name).collect();
        assert_eq!(names, ["add_one", "veto", "add_one"]);

        let mut population = 3;
        assert!(!registry.before_modify_attributes(&actor(), &mut population));
        // Only the hook before the veto ran.
        assert_eq!(population, 4);
    }

    #[test]
    fn empty_registry_never_vetoes() {
        let registry = HookRegistry::empty();
        let mut multiplier = 0.5;
        assert!(registry.after_default_multiplier(&actor(), &mut multiplier));
        assert_eq!(multiplier, 0.5);
    }
}
