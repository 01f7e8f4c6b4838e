//! Population and combat-lock controller.
//!
//! Adjusted population:
//!
//! - raw population is the number of non-GM participants, at least 1;
//! - while locked, a raw population above both the previous raw population
//!   and the floor raises the floor; the adjusted value is the floor;
//! - unlocked, the adjusted value is the raw population;
//! - the result is raised to the configured minimum, then replaced by an
//!   admin override or shifted by the global difficulty offset.
//!
//! The lock engages when a tracked non-GM participant enters combat in an
//! enabled session and releases when a scan finds nobody left in combat.

use tracing::{debug, warn};

use super::{ScaleContext, Session, SessionNotice};
use crate::error::CoreError;
use crate::ids::ParticipantId;
use crate::state::{CombatLock, LevelBracket};

/// Computes the adjusted population and updates the lock floor.
pub fn adjust_population(
    lock: &mut CombatLock,
    previous_raw: u32,
    raw: u32,
    min_population: u32,
    admin_override: Option<u32>,
    offset: i32,
) -> u32 {
    let base = match lock {
        CombatLock::Locked { floor, exercised } => {
            if raw != previous_raw {
                *exercised = true;
            }
            if raw > previous_raw && raw > *floor {
                *floor = raw;
            }
            *floor
        }
        CombatLock::Unlocked => raw,
    };
    let clamped = base.max(min_population);
    match admin_override {
        Some(population) => population.max(1),
        None => {
            let shifted = i64::from(clamped) + i64::from(offset);
            u32::try_from(shifted.max(1)).unwrap_or(u32::MAX)
        }
    }
}

impl Session {
    /// A participant joined the instance.
    pub fn on_participant_enter(&mut self, ctx: &ScaleContext<'_>, id: ParticipantId) {
        let profile = match ctx.env.participants() {
            Ok(oracle) => oracle.participant(id),
            Err(err) => {
                warn!(
                    target: "scaling::population",
                    session = %self.state.id,
                    code = err.error_code(),
                    "participant enter ignored"
                );
                return;
            }
        };
        let Some(profile) = profile else {
            debug!(
                target: "scaling::population",
                session = %self.state.id,
                participant = %id,
                "participant vanished before enter was handled"
            );
            return;
        };
        self.state.participants.insert(id, profile);
        self.refresh_population(ctx);
    }

    /// A participant left the instance.
    pub fn on_participant_exit(&mut self, ctx: &ScaleContext<'_>, id: ParticipantId) {
        if self.state.participants.remove(&id).is_none() {
            return;
        }
        self.refresh_population(ctx);
        if self.state.combat.is_locked() && !self.state.any_in_combat() {
            self.release_lock(ctx);
        }
    }

    /// A participant entered combat.
    pub fn on_combat_enter(&mut self, _ctx: &ScaleContext<'_>, id: ParticipantId) {
        let Some(participant) = self.state.participants.get_mut(&id) else {
            debug!(
                target: "scaling::population",
                session = %self.state.id,
                participant = %id,
                "combat enter from untracked participant ignored"
            );
            return;
        };
        participant.in_combat = true;
        if participant.is_gm || !self.state.enabled || self.state.combat.is_locked() {
            return;
        }
        let floor = self.state.raw_population;
        self.state.combat = CombatLock::Locked {
            floor,
            exercised: false,
        };
        debug!(
            target: "scaling::population",
            session = %self.state.id,
            floor,
            "combat lock engaged"
        );
        self.notices.push(SessionNotice::CombatLockChanged {
            locked: true,
            floor: Some(floor),
        });
    }

    /// A participant left combat; releases the lock once nobody is fighting.
    pub fn on_combat_exit(&mut self, ctx: &ScaleContext<'_>, id: ParticipantId) {
        if let Some(participant) = self.state.participants.get_mut(&id) {
            participant.in_combat = false;
        }
        self.rescan_combat(ctx);
        if self.state.combat.is_locked() && !self.state.any_in_combat() {
            self.release_lock(ctx);
        }
    }

    /// Replaces (or clears) the population with an explicit admin value and
    /// resynchronizes immediately.
    pub fn set_population_override(&mut self, ctx: &ScaleContext<'_>, population: Option<u32>) {
        self.state.admin_override = population.map(|value| value.max(1));
        self.recompute_adjusted_population(ctx);
        self.sync_if_stale(ctx, true);
    }

    /// Recomputes the adjusted population; invalidates on change.
    ///
    /// Returns whether the value changed.
    pub fn recompute_adjusted_population(&mut self, ctx: &ScaleContext<'_>) -> bool {
        let raw = self.state.count_raw_population();
        let previous_raw = self.state.raw_population;
        let adjusted = adjust_population(
            &mut self.state.combat,
            previous_raw,
            raw,
            self.state.settings.min_population,
            self.state.admin_override,
            self.config.population.difficulty_offset,
        );
        self.state.raw_population = raw;

        if adjusted == self.state.adjusted_population {
            return false;
        }
        debug!(
            target: "scaling::population",
            session = %self.state.id,
            raw,
            from = self.state.adjusted_population,
            to = adjusted,
            "adjusted population changed"
        );
        self.state.adjusted_population = adjusted;
        self.notices
            .push(SessionNotice::PopulationChanged { raw, adjusted });
        self.invalidate(ctx, "population");
        true
    }

    /// Refreshes bracket and population after a roster change.
    fn refresh_population(&mut self, ctx: &ScaleContext<'_>) {
        let bracket = LevelBracket::of(self.state.participants.values());
        if bracket != self.state.bracket {
            self.state.bracket = bracket;
            self.invalidate(ctx, "participant levels");
        }
        self.recompute_adjusted_population(ctx);
    }

    /// Pulls current combat flags for every tracked participant.
    fn rescan_combat(&mut self, ctx: &ScaleContext<'_>) {
        let Ok(oracle) = ctx.env.participants() else {
            return;
        };
        for (id, participant) in self.state.participants.iter_mut() {
            if let Some(current) = oracle.participant(*id) {
                participant.in_combat = current.in_combat;
            }
        }
    }

    fn release_lock(&mut self, ctx: &ScaleContext<'_>) {
        let CombatLock::Locked { floor, exercised } = self.state.combat else {
            return;
        };
        self.state.combat = CombatLock::Unlocked;
        debug!(
            target: "scaling::population",
            session = %self.state.id,
            floor,
            exercised,
            "combat lock released"
        );
        self.notices.push(SessionNotice::CombatLockChanged {
            locked: false,
            floor: None,
        });
        if exercised {
            self.state.resync_pending = true;
        }
        self.recompute_adjusted_population(ctx);
    }
}
