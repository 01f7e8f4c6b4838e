//! Print the population curve of one instance
//!
//! Resolves the bracket (with any instance override) the same way a live
//! session would and tabulates the multiplier for every population.

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use console::style;

use scaling_core::{BracketId, Difficulty, MapId, resolve_curve, resolve_stat_modifiers};

use crate::utils;

const BAR_WIDTH: f64 = 40.0;

/// Print the population curve of one instance
#[derive(Parser)]
pub struct Curve {
    /// Scaling settings file (defaults to $SCALING_CONFIG, then the bundled file)
    #[arg(short, long, value_name = "TOML")]
    config: Option<PathBuf>,

    /// Instance capacity
    #[arg(long, value_name = "N")]
    capacity: u32,

    /// Use the heroic variant of the bracket
    #[arg(long)]
    heroic: bool,

    /// Use boss curve parameters and boss stat modifiers
    #[arg(long)]
    boss: bool,

    /// Map whose instance override applies
    #[arg(long, value_name = "ID", default_value_t = 0)]
    map: u32,
}

impl Curve {
    pub fn execute(self) -> Result<()> {
        if self.capacity == 0 {
            anyhow::bail!("Capacity must be at least 1");
        }
        let (path, loaded) = utils::load_config(self.config)?;
        let snapshot = &loaded.snapshot;

        let difficulty = if self.heroic {
            Difficulty::Heroic
        } else {
            Difficulty::Normal
        };
        let map = MapId(self.map);
        let settings = snapshot.resolve_instance(map, self.capacity, difficulty);
        let curve = resolve_curve(&settings, self.capacity, self.boss);
        let modifiers = resolve_stat_modifiers(snapshot, &settings, None, self.boss);

        println!("{} {}", style("Config:").bold().cyan(), path.display());
        println!(
            "{} {} ({}, {})",
            style("Bracket:").bold().cyan(),
            BracketId::for_instance(self.capacity, difficulty),
            map,
            if snapshot.is_enabled_for(map, self.capacity, difficulty) {
                style("enabled").green()
            } else {
                style("disabled").red()
            }
        );
        println!(
            "{} inflection {:.2}, floor {:.3}, ceiling {:.3}{}",
            style("Curve:").bold().cyan(),
            curve.inflection,
            curve.floor,
            curve.ceiling,
            if self.boss { " (boss)" } else { "" }
        );
        println!(
            "{} minimum population {}",
            style("Population:").bold().cyan(),
            settings.min_population
        );
        println!();

        println!(
            "{}",
            style(format!(
                "{:>5}  {:>8}  {:>8}  {:>8}",
                "pop", "curve", "health", "damage"
            ))
            .bold()
            .yellow()
        );
        for population in 1..=self.capacity {
            let multiplier = curve.multiplier(f64::from(population));
            let health = multiplier * modifiers.global * modifiers.health;
            let damage = multiplier * modifiers.global * modifiers.damage;
            let bar = "█".repeat((multiplier.clamp(0.0, 1.5) * BAR_WIDTH).round() as usize);
            let marker = if population < settings.min_population {
                style("*").dim()
            } else {
                style(" ")
            };
            println!(
                "{:>5}{} {:>8.4}  {:>8.4}  {:>8.4}  {}",
                population,
                marker,
                multiplier,
                health,
                damage,
                style(bar).green()
            );
        }
        if settings.min_population > 1 {
            println!();
            println!(
                "{}",
                style("* below the minimum population; sessions scale as if it were reached").dim()
            );
        }
        Ok(())
    }
}
