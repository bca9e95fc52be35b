//! Star-schema table definitions for the movie-ticketing warehouse.
//!
//! This module provides:
//! - `SchemaLayout`, the knobs that distinguish the supported schema shapes
//! - Table and column definitions derived from a layout
//! - DDL rendering for DuckDB and PostgreSQL

mod ddl;

pub use ddl::*;

use serde::{Deserialize, Serialize};
use std::fmt;

pub const DATE_DIM: &str = "date_dim";
pub const DIRECTOR_DIM: &str = "director_dim";
pub const STAR_DIM: &str = "star_dim";
pub const MOVIE_DIM: &str = "movie_dim";
pub const MOVIE_STAR: &str = "movie_star";
pub const CINEMA_DIM: &str = "cinema_dim";
pub const PROMOTION_DIM: &str = "promotion_dim";
pub const ONLINE_TRANSACTION_DIM: &str = "online_transaction_dim";
pub const CUSTOMER_DIM: &str = "customer_dim";
pub const TRANSACTION_FACT: &str = "transaction_fact";

/// Maximum number of stars recorded per movie
pub const MAX_CAST: usize = 5;

/// Maximum stored length of text columns such as movie titles
pub const MAX_TEXT_LEN: usize = 100;

/// How a movie's cast is stored
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CastLayout {
    /// `star1_name` .. `star5_name` columns on `movie_dim`
    #[default]
    Embedded,
    /// A `movie_star` junction table
    Junction,
}

/// How a movie's director is stored
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DirectorLayout {
    /// Snapshot of the director's name in `movie_dim.director_name`
    #[default]
    Name,
    /// `movie_dim.director_id` referencing `director_dim`
    ForeignKey,
}

/// Schema shape used for a seeding run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchemaLayout {
    pub cast: CastLayout,
    pub director: DirectorLayout,
    /// `transaction_fact.promotion_id` exists
    pub promotion: bool,
    /// `transaction_fact` records online/offline channel
    pub channel: bool,
}

impl Default for SchemaLayout {
    fn default() -> Self {
        Self::classic()
    }
}

impl SchemaLayout {
    /// Embedded director and cast names, promotion and channel on the fact table
    pub fn classic() -> Self {
        Self {
            cast: CastLayout::Embedded,
            director: DirectorLayout::Name,
            promotion: true,
            channel: true,
        }
    }

    /// Junction table for the cast, director foreign key, promotion and channel
    pub fn normalized() -> Self {
        Self {
            cast: CastLayout::Junction,
            director: DirectorLayout::ForeignKey,
            promotion: true,
            channel: true,
        }
    }

    /// Embedded cast and director foreign key, no promotion or channel columns
    pub fn lean() -> Self {
        Self {
            cast: CastLayout::Embedded,
            director: DirectorLayout::ForeignKey,
            promotion: false,
            channel: false,
        }
    }

    /// Columns written to `movie_dim`, excluding the generated key
    pub fn movie_columns(&self) -> Vec<&'static str> {
        let mut cols = vec!["title", "genre"];
        match self.director {
            DirectorLayout::Name => cols.push("director_name"),
            DirectorLayout::ForeignKey => cols.push("director_id"),
        }
        if self.cast == CastLayout::Embedded {
            cols.extend(STAR_NAME_COLUMNS);
        }
        cols
    }

    /// Columns written to `transaction_fact`, excluding the generated key
    pub fn fact_columns(&self) -> Vec<&'static str> {
        let mut cols = vec!["customer_id", "movie_id", "cinema_id", "date_id"];
        if self.promotion {
            cols.push("promotion_id");
        }
        cols.push("totalprice");
        cols.push("ticket_count");
        if self.channel {
            cols.push("online_transaction_id");
            cols.push("offline_transaction_id");
        }
        cols.push("showtime");
        cols
    }

    /// All tables of this layout in dependency order
    pub fn tables(&self) -> Vec<TableDef> {
        let mut tables = vec![
            TableDef::new(DATE_DIM, None)
                .column(ColumnDef::new("date_id", ColumnKind::Int).primary_key())
                .column(ColumnDef::new("date", ColumnKind::Date))
                .column(ColumnDef::new("year", ColumnKind::Int))
                .column(ColumnDef::new("month", ColumnKind::Int))
                .column(ColumnDef::new("weekday", ColumnKind::Text(16))),
            TableDef::new(DIRECTOR_DIM, Some("director_id"))
                .column(ColumnDef::new("name", ColumnKind::Text(MAX_TEXT_LEN))),
            TableDef::new(STAR_DIM, Some("star_id"))
                .column(ColumnDef::new("star_name", ColumnKind::Text(MAX_TEXT_LEN))),
        ];

        let mut movie = TableDef::new(MOVIE_DIM, Some("movie_id"))
            .column(ColumnDef::new("title", ColumnKind::Text(MAX_TEXT_LEN)))
            .column(ColumnDef::new("genre", ColumnKind::Text(16)));
        movie = match self.director {
            DirectorLayout::Name => {
                movie.column(ColumnDef::new("director_name", ColumnKind::Text(MAX_TEXT_LEN)))
            }
            DirectorLayout::ForeignKey => movie.column(
                ColumnDef::new("director_id", ColumnKind::Int)
                    .references(DIRECTOR_DIM, "director_id"),
            ),
        };
        if self.cast == CastLayout::Embedded {
            for name in STAR_NAME_COLUMNS {
                movie = movie.column(ColumnDef::new(name, ColumnKind::Text(MAX_TEXT_LEN)).nullable());
            }
        }
        tables.push(movie);

        if self.cast == CastLayout::Junction {
            tables.push(
                TableDef::new(MOVIE_STAR, None)
                    .column(
                        ColumnDef::new("movie_id", ColumnKind::Int).references(MOVIE_DIM, "movie_id"),
                    )
                    .column(ColumnDef::new("star_id", ColumnKind::Int).references(STAR_DIM, "star_id"))
                    .composite_key(&["movie_id", "star_id"]),
            );
        }

        tables.push(
            TableDef::new(CINEMA_DIM, Some("cinema_id"))
                .column(ColumnDef::new("name", ColumnKind::Text(MAX_TEXT_LEN)))
                .column(ColumnDef::new("city", ColumnKind::Text(MAX_TEXT_LEN)))
                .column(ColumnDef::new("state", ColumnKind::Text(MAX_TEXT_LEN)))
                .column(ColumnDef::new("hall_size", ColumnKind::Int)),
        );
        tables.push(
            TableDef::new(PROMOTION_DIM, Some("promotion_id"))
                .column(ColumnDef::new("description", ColumnKind::Text(255))),
        );
        tables.push(
            TableDef::new(ONLINE_TRANSACTION_DIM, Some("online_transaction_id"))
                .column(ColumnDef::new("browser", ColumnKind::Text(255))),
        );
        tables.push(
            TableDef::new(CUSTOMER_DIM, Some("customer_id"))
                .column(ColumnDef::new("name", ColumnKind::Text(MAX_TEXT_LEN)))
                .column(ColumnDef::new("gender", ColumnKind::Text(1)))
                .column(ColumnDef::new("dob", ColumnKind::Date)),
        );

        let mut fact = TableDef::new(TRANSACTION_FACT, Some("transaction_id"))
            .column(ColumnDef::new("customer_id", ColumnKind::Int).references(CUSTOMER_DIM, "customer_id"))
            .column(ColumnDef::new("movie_id", ColumnKind::Int).references(MOVIE_DIM, "movie_id"))
            .column(ColumnDef::new("cinema_id", ColumnKind::Int).references(CINEMA_DIM, "cinema_id"))
            .column(ColumnDef::new("date_id", ColumnKind::Int).references(DATE_DIM, "date_id"));
        if self.promotion {
            fact = fact.column(
                ColumnDef::new("promotion_id", ColumnKind::Int)
                    .references(PROMOTION_DIM, "promotion_id"),
            );
        }
        fact = fact
            .column(ColumnDef::new("totalprice", ColumnKind::Decimal))
            .column(ColumnDef::new("ticket_count", ColumnKind::Int));
        if self.channel {
            fact = fact
                .column(
                    ColumnDef::new("online_transaction_id", ColumnKind::Int)
                        .nullable()
                        .references(ONLINE_TRANSACTION_DIM, "online_transaction_id"),
                )
                .column(ColumnDef::new("offline_transaction_id", ColumnKind::Int).nullable());
        }
        fact = fact.column(ColumnDef::new("showtime", ColumnKind::Time));
        tables.push(fact);

        tables
    }
}

const STAR_NAME_COLUMNS: [&str; MAX_CAST] = [
    "star1_name",
    "star2_name",
    "star3_name",
    "star4_name",
    "star5_name",
];

impl std::str::FromStr for SchemaLayout {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "classic" => Ok(SchemaLayout::classic()),
            "normalized" | "normalised" => Ok(SchemaLayout::normalized()),
            "lean" => Ok(SchemaLayout::lean()),
            _ => Err(format!(
                "Unknown layout: {}. Valid options: classic, normalized, lean",
                s
            )),
        }
    }
}

impl fmt::Display for SchemaLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if *self == SchemaLayout::classic() {
            write!(f, "classic")
        } else if *self == SchemaLayout::normalized() {
            write!(f, "normalized")
        } else if *self == SchemaLayout::lean() {
            write!(f, "lean")
        } else {
            write!(
                f,
                "custom(cast={:?}, director={:?}, promotion={}, channel={})",
                self.cast, self.director, self.promotion, self.channel
            )
        }
    }
}

/// Storage class of a column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Int,
    /// VARCHAR with a maximum length
    Text(usize),
    /// DECIMAL(10,2)
    Decimal,
    Date,
    Time,
}

/// Column definition within a table
#[derive(Debug, Clone)]
pub struct ColumnDef {
    pub name: &'static str,
    pub kind: ColumnKind,
    pub nullable: bool,
    pub primary_key: bool,
    /// Referenced (table, column)
    pub references: Option<(&'static str, &'static str)>,
}

impl ColumnDef {
    pub fn new(name: &'static str, kind: ColumnKind) -> Self {
        Self {
            name,
            kind,
            nullable: false,
            primary_key: false,
            references: None,
        }
    }

    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self
    }

    pub fn references(mut self, table: &'static str, column: &'static str) -> Self {
        self.references = Some((table, column));
        self
    }
}

/// Table definition
#[derive(Debug, Clone)]
pub struct TableDef {
    pub name: &'static str,
    /// Storage-generated integer key, if any
    pub generated_key: Option<&'static str>,
    pub columns: Vec<ColumnDef>,
    /// Multi-column primary key (junction tables)
    pub composite_key: Vec<&'static str>,
}

impl TableDef {
    pub fn new(name: &'static str, generated_key: Option<&'static str>) -> Self {
        Self {
            name,
            generated_key,
            columns: Vec::new(),
            composite_key: Vec::new(),
        }
    }

    pub fn column(mut self, column: ColumnDef) -> Self {
        self.columns.push(column);
        self
    }

    pub fn composite_key(mut self, columns: &[&'static str]) -> Self {
        self.composite_key = columns.to_vec();
        self
    }

    /// Names of the columns a seeder writes, in order
    pub fn column_names(&self) -> Vec<&'static str> {
        self.columns.iter().map(|c| c.name).collect()
    }
}
