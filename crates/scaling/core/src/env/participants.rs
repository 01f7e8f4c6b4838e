//! Participant oracle: the roster of human-controlled entities in an instance.

use crate::ids::{ParticipantId, SessionId};

/// Provides the current participant roster.
pub trait ParticipantOracle: Send + Sync {
    /// Returns every participant currently inside the instance.
    fn participants(&self, session: SessionId) -> Vec<ParticipantProfile>;

    /// Returns a single participant, if present in any instance.
    fn participant(&self, id: ParticipantId) -> Option<ParticipantProfile>;
}

/// Per-participant facts the scaling engine cares about.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ParticipantProfile {
    pub id: ParticipantId,
    pub level: u8,
    /// Game masters are observers: they never count toward population.
    pub is_gm: bool,
    pub in_combat: bool,
    pub alive: bool,
    /// Under the control of something else (mind control etc.).
    pub charmed: bool,
}

impl ParticipantProfile {
    pub const fn new(id: ParticipantId, level: u8) -> Self {
        Self {
            id,
            level,
            is_gm: false,
            in_combat: false,
            alive: true,
            charmed: false,
        }
    }

    pub const fn gm(mut self) -> Self {
        self.is_gm = true;
        self
    }

    pub const fn in_combat(mut self, in_combat: bool) -> Self {
        self.in_combat = in_combat;
        self
    }

    /// True when this participant can be the target of hostility checks.
    pub const fn is_valid_target(&self) -> bool {
        !self.is_gm && !self.charmed && self.alive
    }
}
