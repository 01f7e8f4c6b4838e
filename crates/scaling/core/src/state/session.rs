//! Per-instance aggregate state.

use std::collections::BTreeMap;

use crate::config::{BracketSettings, Difficulty};
use crate::env::{InstanceProfile, ParticipantProfile};
use crate::epoch::Epoch;
use crate::ids::{MapId, ParticipantId, SessionId};

/// Lowest and highest participant level.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LevelBracket {
    pub lowest: u8,
    pub highest: u8,
}

impl LevelBracket {
    pub fn of<'a>(participants: impl IntoIterator<Item = &'a ParticipantProfile>) -> Option<Self> {
        participants
            .into_iter()
            .filter(|participant| !participant.is_gm)
            .map(|participant| participant.level)
            .fold(None, |bracket: Option<Self>, level| {
                Some(match bracket {
                    None => Self {
                        lowest: level,
                        highest: level,
                    },
                    Some(bracket) => Self {
                        lowest: bracket.lowest.min(level),
                        highest: bracket.highest.max(level),
                    },
                })
            })
    }
}

/// Aggregates over counted actors' original levels.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MonsterLevels {
    pub lowest: u8,
    pub highest: u8,
    pub average: f64,
    pub counted: u32,
}

impl MonsterLevels {
    pub fn is_empty(&self) -> bool {
        self.counted == 0
    }

    /// Rounded running average, or `None` when nothing is counted.
    pub fn average_level(&self) -> Option<u8> {
        (!self.is_empty()).then(|| self.average.round().clamp(0.0, f64::from(u8::MAX)) as u8)
    }

    /// Values whose change invalidates derived multipliers.
    pub fn signature(&self) -> (Option<u8>, u8, u8) {
        (self.average_level(), self.lowest, self.highest)
    }

    pub fn add(&mut self, level: u8) {
        if self.counted == 0 {
            self.lowest = level;
            self.highest = level;
        } else {
            self.lowest = self.lowest.min(level);
            self.highest = self.highest.max(level);
        }
        self.counted += 1;
        self.average += (f64::from(level) - self.average) / f64::from(self.counted);
    }

    /// Removes one level; `remaining` are the levels still counted afterwards
    /// and are rescanned for the extremes.
    pub fn remove(&mut self, level: u8, remaining: impl IntoIterator<Item = u8>) {
        if self.counted <= 1 {
            *self = Self::default();
            return;
        }
        let before = f64::from(self.counted);
        self.counted -= 1;
        self.average = (self.average * before - f64::from(level)) / f64::from(self.counted);

        let mut lowest = u8::MAX;
        let mut highest = u8::MIN;
        for level in remaining {
            lowest = lowest.min(level);
            highest = highest.max(level);
        }
        self.lowest = lowest;
        self.highest = highest;
    }
}

/// Combat-lock state machine.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CombatLock {
    #[default]
    Unlocked,
    Locked {
        /// Adjusted population never drops below this while locked.
        floor: u32,
        /// Raw population changed while locked.
        exercised: bool,
    },
}

impl CombatLock {
    pub fn is_locked(&self) -> bool {
        matches!(self, Self::Locked { .. })
    }

    pub fn floor(&self) -> Option<u32> {
        match self {
            Self::Locked { floor, .. } => Some(*floor),
            Self::Unlocked => None,
        }
    }
}

/// Ambient multipliers for damage or healing without a scalable caster and
/// for destructible objects.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WorldMultipliers {
    pub damage_healing: f64,
    pub scaled_damage_healing: f64,
    pub destructible_health: f64,
    pub scaled_destructible_health: f64,
}

impl Default for WorldMultipliers {
    fn default() -> Self {
        Self {
            damage_healing: 1.0,
            scaled_damage_healing: 1.0,
            destructible_health: 1.0,
            scaled_destructible_health: 1.0,
        }
    }
}

/// Everything the core derives for one live instance.
#[derive(Clone, Debug, PartialEq)]
pub struct SessionState {
    pub id: SessionId,
    pub map: MapId,
    pub capacity: u32,
    pub difficulty: Difficulty,
    /// Advertised level range from the host, if any.
    pub level_range: Option<(u8, u8)>,
    pub enabled: bool,
    /// Bracket settings with this instance's override applied.
    pub settings: BracketSettings,
    /// Current roster, GMs included.
    pub participants: BTreeMap<ParticipantId, ParticipantProfile>,
    pub raw_population: u32,
    pub adjusted_population: u32,
    pub admin_override: Option<u32>,
    pub bracket: Option<LevelBracket>,
    pub monsters: MonsterLevels,
    /// Level the instance's monsters are scaled toward.
    pub monster_target: Option<u8>,
    /// Outside the skip band and level scaling enabled.
    pub level_scaling_active: bool,
    pub combat: CombatLock,
    pub world: WorldMultipliers,
    /// Global epoch this session last synchronized to.
    pub synced_global: Epoch,
    /// Last time derived values were recomputed or invalidated.
    pub epoch: Epoch,
    /// A full resync is owed at the next opportunity.
    pub resync_pending: bool,
}

impl SessionState {
    pub fn new(id: SessionId, instance: &InstanceProfile) -> Self {
        Self {
            id,
            map: instance.map,
            capacity: instance.capacity,
            difficulty: instance.difficulty,
            level_range: instance.level_range,
            enabled: false,
            settings: BracketSettings::default(),
            participants: BTreeMap::new(),
            raw_population: 1,
            adjusted_population: 1,
            admin_override: None,
            bracket: None,
            monsters: MonsterLevels::default(),
            monster_target: None,
            level_scaling_active: false,
            combat: CombatLock::Unlocked,
            world: WorldMultipliers::default(),
            synced_global: Epoch::ZERO,
            epoch: Epoch::ZERO,
            resync_pending: true,
        }
    }

    /// Non-GM participants, at least 1.
    pub fn count_raw_population(&self) -> u32 {
        let counted = self
            .participants
            .values()
            .filter(|participant| !participant.is_gm)
            .count();
        u32::try_from(counted).unwrap_or(u32::MAX).max(1)
    }

    pub fn any_in_combat(&self) -> bool {
        self.participants
            .values()
            .any(|participant| !participant.is_gm && participant.in_combat)
    }

    /// Level window bounds: the advertised range, else the participant bracket.
    pub fn window_levels(&self) -> Option<(u8, u8)> {
        self.level_range
            .or_else(|| self.bracket.map(|bracket| (bracket.lowest, bracket.highest)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn monster_levels_track_running_average_and_extremes() {
        let mut monsters = MonsterLevels::default();
        for level in [60, 62, 70] {
            monsters.add(level);
        }
        assert_eq!(monsters.counted, 3);
        assert_eq!((monsters.lowest, monsters.highest), (60, 70));
        assert!((monsters.average - 64.0).abs() < 1e-9);

        monsters.remove(70, [60, 62]);
        assert_eq!(monsters.counted, 2);
        assert_eq!(monsters.highest, 62);
        assert!((monsters.average - 61.0).abs() < 1e-9);
        assert_eq!(monsters.average_level(), Some(61));

        monsters.remove(60, [62]);
        monsters.remove(62, []);
        assert!(monsters.is_empty());
        assert_eq!(monsters.average_level(), None);
    }

    #[test]
    fn level_bracket_ignores_game_masters() {
        let roster = [
            ParticipantProfile::new(ParticipantId(1), 70),
            ParticipantProfile::new(ParticipantId(2), 80).gm(),
            ParticipantProfile::new(ParticipantId(3), 75),
        ];
        assert_eq!(
            LevelBracket::of(&roster),
            Some(LevelBracket {
                lowest: 70,
                highest: 75
            })
        );
        assert_eq!(LevelBracket::of(&[] as &[ParticipantProfile]), None);
    }
}
