//! Scaling configuration loader.

use std::path::Path;

use sha2::{Digest, Sha256};
use tracing::{debug, warn};

use scaling_core::config::{ConfigWarning, ConfigurationSnapshot};

use crate::loaders::format::ScalingFile;
use crate::loaders::{LoadResult, read_file};

/// A validated snapshot plus everything validation had to correct.
#[derive(Clone, Debug)]
pub struct LoadedConfig {
    pub snapshot: ConfigurationSnapshot,
    pub warnings: Vec<ConfigWarning>,
}

impl LoadedConfig {
    /// Hex-encoded SHA-256 of the source text.
    pub fn fingerprint_hex(&self) -> Option<String> {
        self.snapshot.fingerprint.map(hex::encode)
    }
}

/// Loader for scaling configuration from TOML files.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load, validate, and fingerprint a TOML settings file.
    ///
    /// Validation anomalies are clamped and logged, never fatal.
    pub fn load(path: &Path) -> LoadResult<LoadedConfig> {
        let content = read_file(path)?;
        let loaded = Self::parse(&content)
            .map_err(|e| anyhow::anyhow!("Failed to load {}: {:#}", path.display(), e))?;
        debug!(
            target: "content::config",
            path = %path.display(),
            fingerprint = loaded.fingerprint_hex().as_deref().unwrap_or("-"),
            warnings = loaded.warnings.len(),
            "scaling configuration loaded"
        );
        Ok(loaded)
    }

    /// Same as [`ConfigLoader::load`] for in-memory TOML.
    pub fn parse(source: &str) -> LoadResult<LoadedConfig> {
        let file: ScalingFile = toml::from_str(source)
            .map_err(|e| anyhow::anyhow!("Failed to parse scaling TOML: {}", e))?;
        let mut snapshot = file.into_snapshot()?;
        snapshot.fingerprint = Some(Sha256::digest(source.as_bytes()).into());

        let warnings = snapshot.validate();
        for warning in &warnings {
            warn!(target: "content::config", %warning, "configuration corrected");
        }
        Ok(LoadedConfig { snapshot, warnings })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scaling_core::config::{
        BracketId, Difficulty, LevelScalingMethod, RuleAction, RulePredicate, SizeTier,
    };
    use scaling_core::ids::{MapId, TemplateId};

    const EPS: f64 = 1e-12;

    #[test]
    fn empty_file_yields_defaults() {
        let loaded = ConfigLoader::parse("").unwrap();
        assert!(loaded.warnings.is_empty());
        assert!(loaded.snapshot.enabled);
        assert!(loaded.snapshot.brackets.is_empty());
        assert!(loaded.snapshot.fingerprint.is_some());
    }

    #[test]
    fn brackets_and_overrides_are_read() {
        let loaded = ConfigLoader::parse(
            r#"
            disabled_maps = [30]

            [level_scaling]
            method = "fixed"

            [brackets.raid25]
            curve = { inflection_factor = 0.4, floor = 0.2, ceiling = 1.0 }
            stats = { damage = 0.9 }

            [brackets.raid25-heroic]
            min_population = 10

            [[instance_overrides]]
            map = 533
            curve = { ceiling = 1.2 }
            level_range = { skip_lower = 0 }

            [[instance_overrides]]
            map = 44
            disabled = true

            [[actor_overrides]]
            template = 15550
            health = 0.5

            [[rules]]
            predicate = { template = 16028 }
            action = "ignore"
            "#,
        )
        .unwrap();
        let snapshot = &loaded.snapshot;

        let raid25 = &snapshot.brackets[&BracketId::new(SizeTier::Raid25, Difficulty::Normal)];
        assert!((raid25.curve.inflection_factor - 0.4).abs() < EPS);
        assert_eq!(raid25.stats.damage, Some(0.9));
        // Unset bracket modifiers resolve to neutral.
        assert_eq!(raid25.stats.health, Some(1.0));
        assert_eq!(raid25.stats.cc_duration, None);

        let heroic = &snapshot.brackets[&BracketId::new(SizeTier::Raid25, Difficulty::Heroic)];
        assert_eq!(heroic.min_population, 10);

        assert_eq!(snapshot.level_scaling.method, LevelScalingMethod::Fixed);
        assert!(snapshot.disabled_maps.contains(&MapId(30)));
        assert!(snapshot.disabled_maps.contains(&MapId(44)));
        assert_eq!(
            snapshot.instance_override(MapId(533)).and_then(|o| o.curve.ceiling),
            Some(1.2)
        );
        assert_eq!(
            snapshot.actor_override(TemplateId(15550)).and_then(|o| o.health),
            Some(0.5)
        );
        let rule = snapshot.rules.iter().next().expect("one rule");
        assert_eq!(rule.predicate, RulePredicate::Template(TemplateId(16028)));
        assert_eq!(rule.action, RuleAction::Ignore);
    }

    #[test]
    fn anomalies_are_clamped_with_warnings() {
        let loaded = ConfigLoader::parse(
            r#"
            [brackets.party5]
            curve = { floor = 0.8, ceiling = 0.5 }
            "#,
        )
        .unwrap();
        assert_eq!(loaded.warnings.len(), 1);
        let party = &loaded.snapshot.brackets[&BracketId::new(SizeTier::Party5, Difficulty::Normal)];
        assert!((party.curve.ceiling - 0.8).abs() < EPS);
    }

    #[test]
    fn unknown_bracket_is_rejected() {
        let err = ConfigLoader::parse("[brackets.raid12]\n").unwrap_err();
        assert!(format!("{err:#}").contains("raid12"));
    }

    #[test]
    fn fingerprint_tracks_source_text() {
        let a = ConfigLoader::parse("enabled = true").unwrap();
        let b = ConfigLoader::parse("enabled = true\n").unwrap();
        assert_ne!(a.fingerprint_hex(), b.fingerprint_hex());
        assert_eq!(a.fingerprint_hex().map(|hex| hex.len()), Some(64));
    }
}
