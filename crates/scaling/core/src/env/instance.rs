//! Instance oracle: what the host knows about a live dungeon/raid instance.

use crate::config::Difficulty;
use crate::ids::{MapId, SessionId};

/// Provides static facts about live instances.
pub trait InstanceOracle: Send + Sync {
    /// Returns the profile of the instance backing `session`, if it exists.
    fn instance(&self, session: SessionId) -> Option<InstanceProfile>;
}

/// Static facts about an instance, fixed for its lifetime.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct InstanceProfile {
    pub map: MapId,
    /// Maximum number of participants the instance admits.
    pub capacity: u32,
    pub difficulty: Difficulty,
    /// Advertised (lowest, highest) participant level; `None` when the host
    /// has no level range for this content.
    pub level_range: Option<(u8, u8)>,
}

impl InstanceProfile {
    pub const fn new(map: MapId, capacity: u32, difficulty: Difficulty) -> Self {
        Self {
            map,
            capacity,
            difficulty,
            level_range: None,
        }
    }

    pub const fn with_level_range(mut self, lowest: u8, highest: u8) -> Self {
        self.level_range = Some((lowest, highest));
        self
    }
}
