//! Population phases for the star schema.
//!
//! The [`Seeder`] fills each table in dependency order. Every phase returns
//! a typed key set that later phases take as input, so the order below is
//! also the data flow:
//!
//! ```text
//! dates ─────────────────────────────────────────┐
//! directors ─┬─ movies ─ movie_stars (junction)  │
//! stars ─────┘     │                             │
//! cinemas, promotions, online transactions,      ├─ transactions
//! customers ─────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```ignore
//! use cinema_seeder::config::SeedConfig;
//! use cinema_seeder::seeder::{seeded_rng, Seeder};
//! use cinema_seeder::store::{create_schema, DuckDbStore};
//!
//! let config = SeedConfig::default();
//! let mut store = DuckDbStore::open_in_memory()?;
//! create_schema(&mut store, &config.layout)?;
//! let report = Seeder::new(&mut store, config, seeded_rng(Some(42))).run()?;
//! println!("{}", report);
//! ```

mod dates;
mod dimensions;
mod facts;
mod keys;
mod movies;

pub use dates::{date_rows, DateEntry};
pub use dimensions::NamedTable;
pub use facts::{generate_fact, Channel, FactRefs, TransactionFact};
pub use keys::*;
pub use movies::{draft_movie, MovieDraft, MovieKeys};

use crate::config::SeedConfig;
use crate::fake::FakeData;
use crate::schema::{self, CastLayout};
use anyhow::Result;
use chrono::NaiveDate;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use std::fmt;
use std::time::Instant;

/// One population phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Dates,
    Directors,
    Stars,
    Movies,
    MovieStars,
    Cinemas,
    Promotions,
    OnlineTransactions,
    Customers,
    Transactions,
}

impl Phase {
    /// Table written by this phase
    pub fn table(&self) -> &'static str {
        match self {
            Phase::Dates => schema::DATE_DIM,
            Phase::Directors => schema::DIRECTOR_DIM,
            Phase::Stars => schema::STAR_DIM,
            Phase::Movies => schema::MOVIE_DIM,
            Phase::MovieStars => schema::MOVIE_STAR,
            Phase::Cinemas => schema::CINEMA_DIM,
            Phase::Promotions => schema::PROMOTION_DIM,
            Phase::OnlineTransactions => schema::ONLINE_TRANSACTION_DIM,
            Phase::Customers => schema::CUSTOMER_DIM,
            Phase::Transactions => schema::TRANSACTION_FACT,
        }
    }

    /// Human-readable table description
    pub fn label(&self) -> &'static str {
        match self {
            Phase::Dates => "Date dimension",
            Phase::Directors => "Director dimension",
            Phase::Stars => "Star dimension",
            Phase::Movies => "Movie dimension",
            Phase::MovieStars => "Movie-star junction",
            Phase::Cinemas => "Cinema dimension",
            Phase::Promotions => "Promotion dimension",
            Phase::OnlineTransactions => "Online transaction dimension",
            Phase::Customers => "Customer dimension",
            Phase::Transactions => "Transaction fact",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Outcome of a completed phase
#[derive(Debug, Clone, Serialize)]
pub struct PhaseReport {
    pub phase: Phase,
    pub table: &'static str,
    pub rows: u64,
    pub elapsed_secs: f64,
}

impl fmt::Display for PhaseReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} table populated successfully! ({} rows in {:.2}s)",
            self.phase, self.rows, self.elapsed_secs
        )
    }
}

/// Outcome of a full seeding run
#[derive(Debug, Clone, Default, Serialize)]
pub struct SeedReport {
    pub phases: Vec<PhaseReport>,
}

impl SeedReport {
    pub fn total_rows(&self) -> u64 {
        self.phases.iter().map(|p| p.rows).sum()
    }

    pub fn elapsed_secs(&self) -> f64 {
        self.phases.iter().map(|p| p.elapsed_secs).sum()
    }

    /// Rows written by `phase`, if it completed
    pub fn rows(&self, phase: Phase) -> Option<u64> {
        self.phases.iter().find(|p| p.phase == phase).map(|p| p.rows)
    }
}

impl fmt::Display for SeedReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} phases, {} rows seeded in {:.2}s",
            self.phases.len(),
            self.total_rows(),
            self.elapsed_secs()
        )
    }
}

/// A phase failed; earlier phases stay committed
#[derive(Debug)]
pub struct SeedError {
    pub phase: Phase,
    pub completed: Vec<PhaseReport>,
    /// Rows of the failed phase committed at checkpoints before the failure
    pub committed_rows: u64,
    pub source: anyhow::Error,
}

impl fmt::Display for SeedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} phase failed after {} completed phase(s)",
            self.phase,
            self.completed.len()
        )?;
        if self.committed_rows > 0 {
            write!(
                f,
                "; {} row(s) of {} were already committed",
                self.committed_rows,
                self.phase.table()
            )?;
        }
        Ok(())
    }
}

impl std::error::Error for SeedError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(self.source.as_ref())
    }
}

/// RNG for a run: reproducible with a seed, from OS entropy otherwise
pub fn seeded_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_os_rng(),
    }
}

type PhaseCallback<'s> = Box<dyn FnMut(&PhaseReport) + 's>;
type RowsCallback<'s> = Box<dyn FnMut(u64) + 's>;

/// Runs the population phases against a store
pub struct Seeder<'s, S: crate::store::Store + ?Sized, R: Rng> {
    store: &'s mut S,
    fake: FakeData<R>,
    config: SeedConfig,
    today: NaiveDate,
    on_phase: Option<PhaseCallback<'s>>,
    on_rows: Option<RowsCallback<'s>>,
    /// Rows of the running phase committed at checkpoints so far
    checkpointed: u64,
}

impl<'s, S: crate::store::Store + ?Sized, R: Rng> Seeder<'s, S, R> {
    pub fn new(store: &'s mut S, config: SeedConfig, rng: R) -> Self {
        let today = config
            .reference_date
            .unwrap_or_else(|| chrono::Local::now().date_naive());
        Self {
            store,
            fake: FakeData::new(rng),
            config,
            today,
            on_phase: None,
            on_rows: None,
            checkpointed: 0,
        }
    }

    /// Called after each phase completes
    pub fn on_phase<F>(mut self, callback: F) -> Self
    where
        F: FnMut(&PhaseReport) + 's,
    {
        self.on_phase = Some(Box::new(callback));
        self
    }

    /// Called with the running fact-row total after each batch
    pub fn on_rows<F>(mut self, callback: F) -> Self
    where
        F: FnMut(u64) + 's,
    {
        self.on_rows = Some(Box::new(callback));
        self
    }

    pub fn config(&self) -> &SeedConfig {
        &self.config
    }

    /// Run every phase in dependency order
    pub fn run(&mut self) -> std::result::Result<SeedReport, SeedError> {
        let mut report = SeedReport::default();
        let counts = self.config.counts.clone();
        let window = self.config.dates.clone();
        let layout = self.config.layout;

        let dates = self.phase(&mut report, Phase::Dates, |s| {
            let keys = s.populate_dates(window.start, window.days)?;
            Ok((keys.len() as u64, keys))
        })?;

        let directors = self.phase(&mut report, Phase::Directors, |s| {
            let keys = s.populate_named::<Director, _>(
                NamedTable::DIRECTORS,
                counts.directors,
                |f| f.person_name(),
            )?;
            Ok((keys.len() as u64, keys))
        })?;

        let stars = self.phase(&mut report, Phase::Stars, |s| {
            let keys =
                s.populate_named::<Star, _>(NamedTable::STARS, counts.stars, |f| f.person_name())?;
            Ok((keys.len() as u64, keys))
        })?;

        let movies = self.phase(&mut report, Phase::Movies, |s| {
            let movies = s.populate_movies(counts.movies, &directors, &stars)?;
            Ok((movies.keys.len() as u64, movies))
        })?;

        if layout.cast == CastLayout::Junction {
            self.phase(&mut report, Phase::MovieStars, |s| {
                let links = s.populate_movie_stars(&movies)?;
                Ok((links, ()))
            })?;
        }

        let cinemas = self.phase(&mut report, Phase::Cinemas, |s| {
            let keys = s.populate_cinemas(counts.cinemas)?;
            Ok((keys.len() as u64, keys))
        })?;

        let promotions = self.phase(&mut report, Phase::Promotions, |s| {
            let keys = s.populate_promotions(counts.promotions)?;
            Ok((keys.len() as u64, keys))
        })?;

        let online = self.phase(&mut report, Phase::OnlineTransactions, |s| {
            let keys = s.populate_online_transactions(counts.online_transactions)?;
            Ok((keys.len() as u64, keys))
        })?;

        let customers = self.phase(&mut report, Phase::Customers, |s| {
            let keys = s.populate_customers(counts.customers)?;
            Ok((keys.len() as u64, keys))
        })?;

        let refs = FactRefs {
            customers: &customers,
            movies: &movies.keys,
            cinemas: &cinemas,
            dates: &dates,
            promotions: Some(&promotions),
            online_transactions: Some(&online),
        };
        self.phase(&mut report, Phase::Transactions, |s| {
            let rows = s.populate_transactions(counts.transactions, &refs)?;
            Ok((rows, ()))
        })?;

        Ok(report)
    }

    /// Time a phase, record its report, and tag any failure with the phase
    fn phase<T, F>(
        &mut self,
        report: &mut SeedReport,
        phase: Phase,
        body: F,
    ) -> std::result::Result<T, SeedError>
    where
        F: FnOnce(&mut Self) -> Result<(u64, T)>,
    {
        let start = Instant::now();
        self.checkpointed = 0;
        match body(self) {
            Ok((rows, value)) => {
                let entry = PhaseReport {
                    phase,
                    table: phase.table(),
                    rows,
                    elapsed_secs: start.elapsed().as_secs_f64(),
                };
                if let Some(ref mut callback) = self.on_phase {
                    callback(&entry);
                }
                report.phases.push(entry);
                Ok(value)
            }
            Err(source) => Err(SeedError {
                phase,
                completed: report.phases.clone(),
                committed_rows: self.checkpointed,
                source,
            }),
        }
    }
}
