//! Summon lineage heuristic.
//!
//! The host has no "visual variant of its summoner" flag, so the core scores
//! how much a summon looks like its summoner. Clones keep their absolute
//! current pools instead of being rescaled as fresh ones.

use crate::env::ActorProfile;
use crate::ids::ActorId;

/// Score at or above which a summon is treated as a clone.
pub const CLONE_THRESHOLD: u8 = 5;

const SAME_TEMPLATE: u8 = 2;
const SAME_MAX_HEALTH: u8 = 3;
const SAME_CATEGORY: u8 = 1;
const SAME_NAME: u8 = 2;
const SIMILAR_NAME: u8 = 1;
const SAME_MODEL: u8 = 1;

/// Recorded relation between a summon and the actor that created it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Lineage {
    pub summoner: ActorId,
    pub summoner_level: u8,
    pub score: u8,
    pub is_clone: bool,
}

impl Lineage {
    pub fn assess(summon: &ActorProfile, summoner: &ActorProfile) -> Self {
        let score = clone_score(summon, summoner);
        Self {
            summoner: summoner.id,
            summoner_level: summoner.level,
            score,
            is_clone: score >= CLONE_THRESHOLD,
        }
    }
}

/// Resemblance score of `summon` to `summoner`.
pub fn clone_score(summon: &ActorProfile, summoner: &ActorProfile) -> u8 {
    let mut score = 0;
    if summon.template == summoner.template {
        score += SAME_TEMPLATE;
    }
    if summon.current.max_health == summoner.current.max_health {
        score += SAME_MAX_HEALTH;
    }
    if summon.category == summoner.category {
        score += SAME_CATEGORY;
    }
    score += name_score(&summon.name, &summoner.name);
    if summon.model == summoner.model {
        score += SAME_MODEL;
    }
    score
}

fn name_score(summon: &str, summoner: &str) -> u8 {
    if summon.is_empty() || summoner.is_empty() {
        0
    } else if summon == summoner {
        SAME_NAME
    } else if summon.contains(summoner) || summoner.contains(summon) {
        SIMILAR_NAME
    } else {
        0
    }
}
