//! Drive a scripted population scenario against an in-memory host
//!
//! The script is a comma-separated list of steps:
//!
//! - `N`: grow or shrink the roster to `N` participants
//! - `+combat` / `-combat`: every participant enters or leaves combat
//! - `override=N` / `override=off`: set or clear the admin population
//! - `resync`: force a global resync
//!
//! After every step all stale monsters are recomputed and the session report
//! is printed.

use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use console::style;

use runtime::{ScalingEngine, SharedConfig, Topic};
use scaling_content::StatTables;
use scaling_core::{
    ActorId, ActorProfile, BaseStats, Difficulty, Env, HostEnv, HostSnapshot, InstanceProfile,
    ManualClock, MapId, ParticipantId, ParticipantProfile, SessionId, SessionReport, TemplateId,
};

use crate::utils;

const SESSION: SessionId = SessionId(1);

/// Drive a scripted population scenario against an in-memory host
#[derive(Parser)]
pub struct Simulate {
    /// Scaling settings file (defaults to $SCALING_CONFIG, then the bundled file)
    #[arg(short, long, value_name = "TOML")]
    config: Option<PathBuf>,

    /// Base-stat tables (defaults to the bundled file)
    #[arg(short, long, value_name = "RON")]
    tables: Option<PathBuf>,

    /// Instance capacity
    #[arg(long, value_name = "N")]
    capacity: u32,

    /// Heroic difficulty
    #[arg(long)]
    heroic: bool,

    /// Map of the instance
    #[arg(long, value_name = "ID", default_value_t = 0)]
    map: u32,

    /// Participant and monster level
    #[arg(long, default_value_t = 80)]
    level: u8,

    /// Monsters spawned before the script runs
    #[arg(long, default_value_t = 3)]
    monsters: u64,

    /// Comma-separated steps
    #[arg(short, long, default_value = "3,+combat,2,4,-combat")]
    script: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "summary")]
    format: OutputFormat,
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum OutputFormat {
    /// One line per step
    Summary,
    /// Full session report per step as JSON
    Json,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Step {
    Population(u32),
    Combat(bool),
    Override(Option<u32>),
    Resync,
}

impl FromStr for Step {
    type Err = anyhow::Error;

    fn from_str(raw: &str) -> Result<Self> {
        let step = raw.trim();
        match step {
            "+combat" => return Ok(Step::Combat(true)),
            "-combat" => return Ok(Step::Combat(false)),
            "resync" => return Ok(Step::Resync),
            "override=off" => return Ok(Step::Override(None)),
            _ => {}
        }
        if let Some(value) = step.strip_prefix("override=") {
            let population = value
                .parse()
                .with_context(|| format!("Invalid override step '{step}'"))?;
            return Ok(Step::Override(Some(population)));
        }
        step.parse()
            .map(Step::Population)
            .with_context(|| format!("Unknown step '{step}'"))
    }
}

fn parse_script(script: &str) -> Result<Vec<Step>> {
    script
        .split(',')
        .filter(|step| !step.trim().is_empty())
        .map(str::parse)
        .collect()
}

/// Host facade over the simulated world and the loaded tables.
fn env<'a>(host: &'a HostSnapshot, tables: &'a StatTables) -> HostEnv<'a> {
    Env::with_all(host, host, host, tables).as_host_env()
}

/// Simulated world state the script mutates.
struct Scenario {
    host: HostSnapshot,
    tables: StatTables,
    engine: ScalingEngine,
    roster: Vec<ParticipantId>,
    next_participant: u64,
    fighting: bool,
    level: u8,
}

impl Scenario {
    fn apply(&mut self, step: Step) {
        match step {
            Step::Population(target) => self.resize(target as usize),
            Step::Combat(fighting) => {
                self.fighting = fighting;
                for &id in &self.roster {
                    self.host.set_in_combat(id, fighting);
                    let env = env(&self.host, &self.tables);
                    if fighting {
                        self.engine.on_combat_enter(env, SESSION, id);
                    } else {
                        self.engine.on_combat_exit(env, SESSION, id);
                    }
                }
            }
            Step::Override(population) => {
                self.engine
                    .set_population_override(env(&self.host, &self.tables), SESSION, population);
            }
            Step::Resync => {
                self.engine.force_global_resync();
            }
        }
    }

    fn resize(&mut self, target: usize) {
        while self.roster.len() < target {
            self.next_participant += 1;
            let id = ParticipantId(self.next_participant);
            self.host.insert_participant(
                SESSION,
                ParticipantProfile::new(id, self.level).in_combat(self.fighting),
            );
            self.roster.push(id);
            let env = env(&self.host, &self.tables);
            self.engine.on_participant_enter(env, SESSION, id);
            if self.fighting {
                self.engine.on_combat_enter(env, SESSION, id);
            }
        }
        while self.roster.len() > target {
            let Some(id) = self.roster.pop() else {
                break;
            };
            self.host.remove_participant(id);
            self.engine
                .on_participant_exit(env(&self.host, &self.tables), SESSION, id);
        }
    }

    fn spawn_monsters(&mut self, count: u64) {
        for index in 0..count {
            let id = ActorId(1_000 + index);
            self.host.insert_actor(
                ActorProfile::new(
                    id,
                    TemplateId(1_000),
                    self.level,
                    BaseStats {
                        max_health: 50_000,
                        max_resource: 10_000,
                        armor: 5_000,
                    },
                )
                .named(format!("Monster {index}"))
                .in_session(SESSION),
            );
            let env = env(&self.host, &self.tables);
            self.engine.select_level(env, SESSION, id);
            self.engine.confirm_spawn(env, SESSION, id);
        }
    }

    /// Recomputes stale monsters; returns how many changed.
    fn refresh(&mut self) -> usize {
        self.engine
            .refresh_session(env(&self.host, &self.tables), SESSION)
            .len()
    }

    /// Average max-health multiplier across tracked monsters.
    fn monster_health(&self) -> Option<f64> {
        let reports = self.engine.actor_reports(SESSION);
        if reports.is_empty() {
            return None;
        }
        let total: f64 = reports
            .iter()
            .map(|report| report.multipliers.scaled_health)
            .sum();
        Some(total / reports.len() as f64)
    }
}

impl Simulate {
    pub fn execute(self) -> Result<()> {
        if self.capacity == 0 {
            anyhow::bail!("Capacity must be at least 1");
        }
        let steps = parse_script(&self.script)?;
        let (_, loaded) = utils::load_config(self.config)?;
        let tables = utils::load_tables(self.tables)?;

        let difficulty = if self.heroic {
            Difficulty::Heroic
        } else {
            Difficulty::Normal
        };
        let mut host = HostSnapshot::new();
        host.insert_instance(
            SESSION,
            InstanceProfile::new(MapId(self.map), self.capacity, difficulty),
        );

        let shared = SharedConfig::with_clock(loaded.snapshot, Arc::new(ManualClock::default()));
        let engine = ScalingEngine::builder().shared_config(shared).build();
        let mut events = engine
            .subscribe(Topic::Session)
            .context("Engine has no session topic")?;

        let mut scenario = Scenario {
            host,
            tables,
            engine,
            roster: Vec::new(),
            next_participant: 0,
            fighting: false,
            level: self.level,
        };
        scenario
            .engine
            .create_session(env(&scenario.host, &scenario.tables), SESSION)?;
        scenario.spawn_monsters(self.monsters);

        for (index, step) in steps.iter().enumerate() {
            scenario.apply(*step);
            let updated = scenario.refresh();
            let report = scenario
                .engine
                .session_report(SESSION)
                .context("Session disappeared")?;

            match self.format {
                OutputFormat::Summary => {
                    print_step(index, *step, &report, updated, scenario.monster_health());
                    while let Ok(event) = events.try_recv() {
                        println!("      {} {:?}", style("event").dim(), event);
                    }
                }
                OutputFormat::Json => {
                    println!("{}", serde_json::to_string(&report)?);
                }
            }
        }
        Ok(())
    }
}

fn print_step(
    index: usize,
    step: Step,
    report: &SessionReport,
    updated: usize,
    health: Option<f64>,
) {
    let lock = if report.combat_locked {
        style(format!("locked@{}", report.lock_floor.unwrap_or_default())).red()
    } else {
        style("unlocked".to_string()).green()
    };
    println!(
        "{:>3} {:<14} raw {:>3}  adjusted {:>3}  {}  monsters x{}  recomputed {}",
        style(index + 1).bold(),
        format!("{step:?}"),
        report.raw_population,
        report.adjusted_population,
        lock,
        health.map_or_else(|| "-".to_string(), |value| format!("{value:.3}")),
        updated
    );
}
