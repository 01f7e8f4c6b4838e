//! In-memory host facade.
//!
//! [`HostSnapshot`] implements every oracle over plain maps. It stands in for
//! the real host in tests, scripted simulations, and offline tooling.

use std::collections::{BTreeMap, BTreeSet};

use super::{
    ActorOracle, ActorProfile, BaseStatRow, Env, HostEnv, InstanceOracle, InstanceProfile,
    ParticipantOracle, ParticipantProfile, StatTableOracle, UnitClass,
};
use crate::ids::{ActorId, ParticipantId, SessionId};

/// Snapshot of host data backing all oracles.
#[derive(Clone, Debug, Default)]
pub struct HostSnapshot {
    instances: BTreeMap<SessionId, InstanceProfile>,
    participants: BTreeMap<ParticipantId, (SessionId, ParticipantProfile)>,
    actors: BTreeMap<ActorId, ActorProfile>,
    /// (actor, participant) pairs that are NOT hostile; everything else is.
    peaceful: BTreeSet<(ActorId, ParticipantId)>,
    tables: BTreeMap<(u8, UnitClass), BaseStatRow>,
}

impl HostSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Synthetic base-stat tables for levels `1..=max_level` and every class.
    ///
    /// Each tier is strictly larger than the previous one so that tier
    /// interpolation is observable.
    pub fn with_linear_tables(max_level: u8) -> Self {
        let mut snapshot = Self::new();
        for level in 1..=max_level {
            let l = u32::from(level);
            let row = BaseStatRow {
                health: [l * 40, l * 60, l * 90].into_iter().collect(),
                damage: [f64::from(l) * 1.5, f64::from(l) * 2.0, f64::from(l) * 3.0]
                    .into_iter()
                    .collect(),
                resource: l * 30,
                armor: l * 20,
            };
            for class in <UnitClass as strum::IntoEnumIterator>::iter() {
                snapshot.tables.insert((level, class), row.clone());
            }
        }
        snapshot
    }

    pub fn insert_instance(&mut self, session: SessionId, profile: InstanceProfile) {
        self.instances.insert(session, profile);
    }

    pub fn remove_instance(&mut self, session: SessionId) {
        self.instances.remove(&session);
        self.participants.retain(|_, (owner, _)| *owner != session);
        self.actors
            .retain(|_, actor| actor.session != Some(session));
    }

    pub fn insert_participant(&mut self, session: SessionId, profile: ParticipantProfile) {
        self.participants.insert(profile.id, (session, profile));
    }

    pub fn remove_participant(&mut self, id: ParticipantId) -> Option<ParticipantProfile> {
        self.participants.remove(&id).map(|(_, profile)| profile)
    }

    pub fn set_in_combat(&mut self, id: ParticipantId, in_combat: bool) {
        if let Some((_, profile)) = self.participants.get_mut(&id) {
            profile.in_combat = in_combat;
        }
    }

    pub fn insert_actor(&mut self, profile: ActorProfile) {
        self.actors.insert(profile.id, profile);
    }

    pub fn remove_actor(&mut self, id: ActorId) -> Option<ActorProfile> {
        self.actors.remove(&id)
    }

    pub fn actor_mut(&mut self, id: ActorId) -> Option<&mut ActorProfile> {
        self.actors.get_mut(&id)
    }

    pub fn set_hostile(&mut self, actor: ActorId, participant: ParticipantId, hostile: bool) {
        if hostile {
            self.peaceful.remove(&(actor, participant));
        } else {
            self.peaceful.insert((actor, participant));
        }
    }

    pub fn insert_base_stats(&mut self, level: u8, class: UnitClass, row: BaseStatRow) {
        self.tables.insert((level, class), row);
    }

    pub fn remove_base_stats(&mut self, level: u8) {
        self.tables.retain(|(row_level, _), _| *row_level != level);
    }

    /// Borrows this snapshot as a complete host environment.
    pub fn env(&self) -> HostEnv<'_> {
        Env::with_all(self, self, self, self).as_host_env()
    }
}

impl InstanceOracle for HostSnapshot {
    fn instance(&self, session: SessionId) -> Option<InstanceProfile> {
        self.instances.get(&session).copied()
    }
}

impl ParticipantOracle for HostSnapshot {
    fn participants(&self, session: SessionId) -> Vec<ParticipantProfile> {
        self.participants
            .values()
            .filter(|(owner, _)| *owner == session)
            .map(|(_, profile)| *profile)
            .collect()
    }

    fn participant(&self, id: ParticipantId) -> Option<ParticipantProfile> {
        self.participants.get(&id).map(|(_, profile)| *profile)
    }
}

impl ActorOracle for HostSnapshot {
    fn actor(&self, id: ActorId) -> Option<ActorProfile> {
        self.actors.get(&id).cloned()
    }

    fn actors(&self, session: SessionId) -> Vec<ActorId> {
        self.actors
            .values()
            .filter(|actor| actor.session == Some(session))
            .map(|actor| actor.id)
            .collect()
    }

    fn is_hostile(&self, actor: ActorId, participant: ParticipantId) -> bool {
        !self.peaceful.contains(&(actor, participant))
    }
}

impl StatTableOracle for HostSnapshot {
    fn base_stats(&self, level: u8, class: UnitClass) -> Option<BaseStatRow> {
        self.tables.get(&(level, class)).cloned()
    }
}
