use crate::config::{RewardMethod, RewardSettings};
use crate::state::RewardMultipliers;

/// Xp and money multipliers for one actor.
///
/// Fixed mode hands out the configured modifier; dynamic mode scales it by
/// how full the instance is.
pub fn reward_multipliers(settings: &RewardSettings, adjusted: u32, capacity: u32) -> RewardMultipliers {
    let fill = if capacity == 0 {
        1.0
    } else {
        f64::from(adjusted) / f64::from(capacity)
    };
    let scale = |enabled: bool, modifier: f64| match (enabled, settings.method) {
        (false, _) => 1.0,
        (true, RewardMethod::Fixed) => modifier,
        (true, RewardMethod::Dynamic) => fill * modifier,
    };
    RewardMultipliers {
        xp: scale(settings.xp_enabled, settings.xp_modifier),
        money: scale(settings.money_enabled, settings.money_modifier),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dynamic_rewards_follow_fill_ratio() {
        let settings = RewardSettings {
            method: RewardMethod::Dynamic,
            xp_modifier: 2.0,
            ..RewardSettings::default()
        };
        let rewards = reward_multipliers(&settings, 2, 5);
        assert!((rewards.xp - 0.8).abs() < 1e-12);
        assert!((rewards.money - 0.4).abs() < 1e-12);
    }

    #[test]
    fn disabled_rewards_stay_neutral() {
        let settings = RewardSettings {
            xp_enabled: false,
            xp_modifier: 3.0,
            money_modifier: 0.5,
            ..RewardSettings::default()
        };
        let rewards = reward_multipliers(&settings, 2, 5);
        assert_eq!(rewards.xp, 1.0);
        assert_eq!(rewards.money, 0.5);
    }
}
