//! Validate a scaling settings file
//!
//! Loads the file the way the engine would, prints every anomaly validation
//! corrected, and the fingerprint sessions will report for it.

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use console::style;

use crate::utils;

/// Validate a scaling settings file
#[derive(Parser)]
pub struct CheckConfig {
    /// Scaling settings file (defaults to $SCALING_CONFIG, then the bundled file)
    #[arg(short, long, value_name = "TOML")]
    config: Option<PathBuf>,

    /// Base-stat tables to check alongside (RON)
    #[arg(short, long, value_name = "RON")]
    tables: Option<PathBuf>,

    /// Exit with an error when validation had to correct anything
    #[arg(long)]
    strict: bool,
}

impl CheckConfig {
    pub fn execute(self) -> Result<()> {
        let (path, loaded) = utils::load_config(self.config)?;
        let snapshot = &loaded.snapshot;

        println!("{} {}", style("Config:").bold().cyan(), path.display());
        println!(
            "{} {}",
            style("Fingerprint:").bold().cyan(),
            loaded.fingerprint_hex().unwrap_or_else(|| "-".into())
        );
        println!(
            "{} {}",
            style("Enabled:").bold().cyan(),
            snapshot.enabled
        );
        println!();

        println!("{}", style("Brackets:").bold().yellow());
        if snapshot.brackets.is_empty() {
            println!("  (none; every instance uses the fallback)");
        }
        for (id, settings) in &snapshot.brackets {
            println!(
                "  {:<16} inflection {:.2}  floor {:.3}  ceiling {:.3}  min {}{}",
                id.to_string(),
                settings.curve.inflection_factor,
                settings.curve.floor,
                settings.curve.ceiling,
                settings.min_population,
                if settings.enabled { "" } else { "  (disabled)" }
            );
        }
        println!(
            "  {} disabled maps, {} instance overrides, {} actor overrides, {} rules",
            snapshot.disabled_maps.len(),
            snapshot.instance_overrides.len(),
            snapshot.actor_overrides.len(),
            snapshot.rules.len()
        );
        println!();

        if let Some(tables) = self.tables {
            let display = tables.display().to_string();
            let tables = utils::load_tables(Some(tables))?;
            println!(
                "{} {} ({} rows, max level {})",
                style("Tables:").bold().cyan(),
                display,
                tables.len(),
                tables
                    .max_level()
                    .map_or_else(|| "-".to_string(), |level| level.to_string())
            );
            println!();
        }

        if loaded.warnings.is_empty() {
            println!("{}", style("✓ No anomalies").green());
            return Ok(());
        }

        println!(
            "{}",
            style(format!("{} anomalies corrected:", loaded.warnings.len()))
                .bold()
                .yellow()
        );
        for warning in &loaded.warnings {
            println!("  {} {}", style("•").yellow(), warning);
        }
        if self.strict {
            anyhow::bail!("{} validation anomalies", loaded.warnings.len());
        }
        Ok(())
    }
}
