//! Seed command: populate a database or write a SQL script.

use crate::config::SeedConfig;
use crate::progress::row_progress_bar;
use crate::seeder::{seeded_rng, Phase, SeedReport, Seeder};
use crate::store::{create_schema, DuckDbStore, ScriptStore, Store};
use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;
use std::path::PathBuf;
use std::time::Instant;

#[derive(Args, Debug, Default)]
#[command(after_help = "Examples:
  cinema-seeder seed --create-schema
  cinema-seeder seed -c seed.yaml --progress
  cinema-seeder seed --layout normalized --transactions 50000 -d warehouse.duckdb
  cinema-seeder seed --host db.local --user etl -d cinema --password secret
  cinema-seeder seed --create-schema -o seed.sql.gz --seed 42")]
pub struct SeedArgs {
    /// YAML config file
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Database name (DuckDB file path, or :memory:)
    #[arg(short, long, value_name = "NAME")]
    pub database: Option<String>,

    /// PostgreSQL host; attaches through DuckDB's postgres extension
    #[arg(long)]
    pub host: Option<String>,

    /// PostgreSQL port
    #[arg(long)]
    pub port: Option<u16>,

    /// PostgreSQL user
    #[arg(short, long)]
    pub user: Option<String>,

    /// PostgreSQL password
    #[arg(long)]
    pub password: Option<String>,

    /// Schema layout: classic, normalized, lean
    #[arg(short, long)]
    pub layout: Option<String>,

    /// Write a PostgreSQL script instead of connecting (.gz compresses)
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Create the tables before seeding
    #[arg(long)]
    pub create_schema: bool,

    /// Random seed for reproducible data
    #[arg(long)]
    pub seed: Option<u64>,

    /// Number of fact rows to generate
    #[arg(short, long)]
    pub transactions: Option<u64>,

    /// Fact rows per INSERT statement
    #[arg(long)]
    pub batch_size: Option<usize>,

    /// Fact rows between commits
    #[arg(long)]
    pub commit_every: Option<u64>,

    /// Show progress while generating facts
    #[arg(short, long)]
    pub progress: bool,

    /// Print the run report as JSON
    #[arg(long)]
    pub json: bool,
}

impl SeedArgs {
    /// Load the config file, if any, and apply command-line overrides
    pub fn to_config(&self) -> Result<SeedConfig> {
        let mut config = match self.config {
            Some(ref path) => SeedConfig::load(path)?,
            None => SeedConfig::default(),
        };

        if let Some(ref name) = self.database {
            config.database.name = name.clone();
        }
        if let Some(ref host) = self.host {
            config.database.host = Some(host.clone());
        }
        if let Some(port) = self.port {
            config.database.port = port;
        }
        if let Some(ref user) = self.user {
            config.database.username = Some(user.clone());
        }
        if let Some(ref password) = self.password {
            config.database.password = Some(password.clone());
        }
        if let Some(ref layout) = self.layout {
            config.layout = layout.parse().map_err(|e: String| anyhow::anyhow!(e))?;
        }
        if let Some(seed) = self.seed {
            config.seed = Some(seed);
        }
        if let Some(n) = self.transactions {
            config.counts.transactions = n;
        }
        if let Some(n) = self.batch_size {
            config.batch.size = n;
        }
        if let Some(n) = self.commit_every {
            config.batch.commit_every = n;
        }

        config.validate()?;
        Ok(config)
    }
}

/// JSON output for a seeding run
#[derive(Serialize)]
struct SeedJsonOutput {
    target: String,
    layout: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    seed: Option<u64>,
    total_rows: u64,
    elapsed_secs: f64,
    phases: Vec<crate::seeder::PhaseReport>,
}

pub fn run(args: SeedArgs) -> Result<()> {
    let config = args.to_config()?;
    let start = Instant::now();

    let (target, report) = match args.output {
        Some(ref path) => {
            let mut store = ScriptStore::create(path)?;
            let report = seed_into(&mut store, &config, &args)?;
            store.finish()?;
            (path.display().to_string(), report)
        }
        None => {
            let mut store = DuckDbStore::open(&config.database)?;
            let report = seed_into(&mut store, &config, &args)?;
            let target = match config.database.host {
                Some(ref host) => format!("{}@{}:{}", config.database.name, host, config.database.port),
                None => config.database.name.clone(),
            };
            (target, report)
        }
    };

    if args.json {
        let output = SeedJsonOutput {
            target,
            layout: config.layout.to_string(),
            seed: config.seed,
            total_rows: report.total_rows(),
            elapsed_secs: start.elapsed().as_secs_f64(),
            phases: report.phases,
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        println!("Seeded {}: {}", target, report);
    }

    Ok(())
}

fn seed_into<S: Store + ?Sized>(
    store: &mut S,
    config: &SeedConfig,
    args: &SeedArgs,
) -> Result<SeedReport> {
    if args.create_schema {
        create_schema(store, &config.layout).context("Failed to create schema")?;
    }

    let progress_bar = if args.progress {
        Some(row_progress_bar(config.counts.transactions))
    } else {
        None
    };
    let rows_bar = progress_bar.clone();
    let phase_bar = progress_bar.clone();
    let quiet = args.json;

    let rng = seeded_rng(config.seed);
    let mut seeder = Seeder::new(store, config.clone(), rng)
        .on_rows(move |rows| {
            if let Some(ref pb) = rows_bar {
                pb.set_position(rows);
            }
        })
        .on_phase(move |phase| match phase_bar {
            Some(ref pb) => {
                if !quiet {
                    pb.suspend(|| println!("{}", phase));
                }
                if phase.phase == Phase::Transactions {
                    pb.finish_and_clear();
                }
            }
            None if !quiet => println!("{}", phase),
            None => {}
        });

    let result = seeder.run();

    if let Some(pb) = progress_bar {
        pb.finish_and_clear();
    }

    Ok(result?)
}
