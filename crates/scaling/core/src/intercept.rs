//! Damage, heal, and crowd-control interception.
//!
//! The host asks these synchronously from its combat code. Every answer is a
//! plain number; nothing here mutates session or actor state.

use tracing::trace;

use crate::ids::{ActorId, ParticipantId};
use crate::session::Session;
use crate::state::ActorState;

/// Who caused or received an effect.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Combatant {
    Actor(ActorId),
    Participant(ParticipantId),
    /// Environment, traps, or anything without a scalable caster.
    World,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum DamageKind {
    #[default]
    Damage,
    Heal,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DamageEvent {
    pub source: Combatant,
    pub target: Combatant,
    pub amount: u32,
    pub kind: DamageKind,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CrowdControlEvent {
    pub source: Combatant,
    pub target: Combatant,
    pub duration_ms: u32,
}

impl Session {
    /// Multiplier for a damage or heal event.
    pub fn damage_multiplier(&self, event: &DamageEvent) -> f64 {
        match event.source {
            Combatant::Participant(_) => 1.0,
            Combatant::Actor(id) => {
                let onto_participant = matches!(event.target, Combatant::Participant(_));
                if event.kind == DamageKind::Damage && !onto_participant {
                    return 1.0;
                }
                self.scaling_actor(id)
                    .map_or(1.0, |state| state.multipliers.scaled_damage)
            }
            Combatant::World => {
                let state = self.state();
                if !state.enabled {
                    1.0
                } else if state.level_scaling_active {
                    state.world.scaled_damage_healing
                } else {
                    state.world.damage_healing
                }
            }
        }
    }

    /// Scaled amount of a damage or heal event.
    pub fn scale_damage(&self, event: &DamageEvent) -> u32 {
        let multiplier = self.damage_multiplier(event);
        let scaled = round_amount(f64::from(event.amount) * multiplier);
        trace!(
            target: "scaling::intercept",
            session = %self.id(),
            amount = event.amount,
            multiplier,
            scaled,
            "damage scaled"
        );
        scaled
    }

    /// Scaled duration of a crowd-control effect.
    ///
    /// Only effects from a relevant actor onto a participant change.
    pub fn scale_crowd_control(&self, event: &CrowdControlEvent) -> u32 {
        let (Combatant::Actor(id), Combatant::Participant(_)) = (event.source, event.target)
        else {
            return event.duration_ms;
        };
        match self.scaling_actor(id) {
            Some(state) => round_amount(f64::from(event.duration_ms) * state.multipliers.cc_duration),
            None => event.duration_ms,
        }
    }

    /// Damage a participant deals to a destructible object, rescaled so the
    /// object's effective health follows the population.
    pub fn scale_destructible_damage(&self, source: Combatant, amount: u32) -> u32 {
        let state = self.state();
        if !matches!(source, Combatant::Participant(_)) || !state.enabled {
            return amount;
        }
        let health = if state.level_scaling_active {
            state.world.scaled_destructible_health
        } else {
            state.world.destructible_health
        };
        if health.abs() < f64::EPSILON {
            return amount;
        }
        round_amount(f64::from(amount) / health)
    }

    /// The actor's state if its multipliers may be used right now.
    fn scaling_actor(&self, id: ActorId) -> Option<&ActorState> {
        self.actor(id)
            .filter(|state| state.is_relevant() && state.is_fresh(self.state().epoch))
    }
}

fn round_amount(value: f64) -> u32 {
    if value.is_nan() || value <= 0.0 {
        0
    } else if value >= f64::from(u32::MAX) {
        u32::MAX
    } else {
        value.round() as u32
    }
}
