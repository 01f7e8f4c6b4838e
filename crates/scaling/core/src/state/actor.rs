//! Per-actor side table entry.

use bitflags::bitflags;

use crate::epoch::Epoch;
use crate::ids::ActorId;
use crate::lineage::Lineage;

bitflags! {
    /// Membership flags of a tracked actor.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct ActorFlags: u8 {
        /// Placed in the world and tracked by its session.
        const ACTIVE = 1 << 0;
        /// Contributes to the session's monster-level aggregates.
        const COUNTED = 1 << 1;
        /// Level selected but spawn not confirmed yet.
        const FRESH = 1 << 2;
    }
}

impl ActorFlags {
    /// Flags that survive a reset.
    pub const PRESERVED: Self = Self::ACTIVE.union(Self::COUNTED);
}

/// Multipliers currently applied to an actor.
///
/// The plain fields come from the population curve and stat modifiers; the
/// `scaled_*` fields additionally fold in the level change.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ActorMultipliers {
    pub health: f64,
    pub resource: f64,
    pub armor: f64,
    pub damage: f64,
    pub cc_duration: f64,
    pub scaled_health: f64,
    pub scaled_resource: f64,
    pub scaled_armor: f64,
    pub scaled_damage: f64,
}

impl ActorMultipliers {
    pub const NEUTRAL: Self = Self {
        health: 1.0,
        resource: 1.0,
        armor: 1.0,
        damage: 1.0,
        cc_duration: 1.0,
        scaled_health: 1.0,
        scaled_resource: 1.0,
        scaled_armor: 1.0,
        scaled_damage: 1.0,
    };
}

impl Default for ActorMultipliers {
    fn default() -> Self {
        Self::NEUTRAL
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RewardMultipliers {
    pub xp: f64,
    pub money: f64,
}

impl Default for RewardMultipliers {
    fn default() -> Self {
        Self { xp: 1.0, money: 1.0 }
    }
}

/// What the core remembers about one actor.
#[derive(Clone, Debug, PartialEq)]
pub struct ActorState {
    pub id: ActorId,
    /// Level the actor had before the core ever touched it.
    pub original_level: u8,
    pub selected_level: u8,
    pub multipliers: ActorMultipliers,
    pub rewards: RewardMultipliers,
    /// `None` until classified; see [`crate::relevance`].
    pub relevance: Option<bool>,
    pub flags: ActorFlags,
    /// Session epoch these values were derived against; `ZERO` means never.
    pub epoch: Epoch,
    pub lineage: Option<Lineage>,
}

impl ActorState {
    pub fn new(id: ActorId, original_level: u8) -> Self {
        Self {
            id,
            original_level,
            selected_level: original_level,
            multipliers: ActorMultipliers::NEUTRAL,
            rewards: RewardMultipliers::default(),
            relevance: None,
            flags: ActorFlags::empty(),
            epoch: Epoch::ZERO,
            lineage: None,
        }
    }

    /// Discards derived values, keeping identity and membership.
    pub fn reset(&mut self) {
        let flags = self.flags & ActorFlags::PRESERVED;
        *self = Self {
            flags,
            ..Self::new(self.id, self.original_level)
        };
    }

    /// True when the values were derived against `session_epoch` or later.
    pub fn is_fresh(&self, session_epoch: Epoch) -> bool {
        self.epoch != Epoch::ZERO && !self.epoch.is_older_than(session_epoch)
    }

    pub fn is_relevant(&self) -> bool {
        self.relevance == Some(true)
    }

    pub fn is_counted(&self) -> bool {
        self.flags.contains(ActorFlags::COUNTED)
    }

    pub fn is_clone(&self) -> bool {
        self.lineage.is_some_and(|lineage| lineage.is_clone)
    }

    pub fn level_changed(&self) -> bool {
        self.selected_level != self.original_level
    }
}
