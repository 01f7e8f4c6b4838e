//! Events published by the scaling engine.

use serde::{Deserialize, Serialize};

use scaling_core::{Epoch, SessionId, SessionNotice};

use super::Topic;

/// Something hosts may want to surface to participants or logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScalingEvent {
    /// The adjusted population of a session changed.
    ///
    /// Only published while the snapshot's `population.notify_changes` is on.
    DifficultyChanged {
        session: SessionId,
        raw: u32,
        adjusted: u32,
    },

    /// A session recomputed its derived values.
    SessionResynced { session: SessionId, epoch: Epoch },

    /// The combat lock of a session was engaged or released.
    CombatLockChanged {
        session: SessionId,
        locked: bool,
        floor: Option<u32>,
    },

    /// A new configuration snapshot was published.
    ConfigReloaded { generation: u64 },
}

impl ScalingEvent {
    pub fn topic(&self) -> Topic {
        match self {
            ScalingEvent::DifficultyChanged { .. }
            | ScalingEvent::SessionResynced { .. }
            | ScalingEvent::CombatLockChanged { .. } => Topic::Session,
            ScalingEvent::ConfigReloaded { .. } => Topic::Config,
        }
    }

    /// Translates a session notice; `None` when it should stay silent.
    pub fn from_notice(session: SessionId, notice: SessionNotice, notify_changes: bool) -> Option<Self> {
        match notice {
            SessionNotice::PopulationChanged { raw, adjusted } => {
                notify_changes.then_some(ScalingEvent::DifficultyChanged {
                    session,
                    raw,
                    adjusted,
                })
            }
            SessionNotice::Resynced { epoch } => {
                Some(ScalingEvent::SessionResynced { session, epoch })
            }
            SessionNotice::CombatLockChanged { locked, floor } => {
                Some(ScalingEvent::CombatLockChanged {
                    session,
                    locked,
                    floor,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn population_notices_respect_notify_flag() {
        let notice = SessionNotice::PopulationChanged { raw: 3, adjusted: 5 };
        assert_eq!(ScalingEvent::from_notice(SessionId(7), notice, false), None);
        assert_eq!(
            ScalingEvent::from_notice(SessionId(7), notice, true),
            Some(ScalingEvent::DifficultyChanged {
                session: SessionId(7),
                raw: 3,
                adjusted: 5,
            })
        );
    }

    #[test]
    fn lock_notices_always_pass() {
        let notice = SessionNotice::CombatLockChanged {
            locked: true,
            floor: Some(4),
        };
        let event = ScalingEvent::from_notice(SessionId(1), notice, false).expect("event");
        assert_eq!(event.topic(), Topic::Session);
    }
}
