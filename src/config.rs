//! YAML configuration for a seeding run.
//!
//! Every field has a default, so an empty file (or no file at all) seeds
//! the classic schema with the standard row counts.

use crate::schema::SchemaLayout;
use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use std::fs;
use std::path::Path;

/// Connection settings for the target database
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Database name; for a local DuckDB target this is the file path
    pub name: String,
    pub username: Option<String>,
    #[serde(skip_serializing)]
    pub password: Option<String>,
    /// Remote PostgreSQL host; when unset the target is a local DuckDB file
    pub host: Option<String>,
    pub port: u16,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            name: "cinema.duckdb".to_string(),
            username: None,
            password: None,
            host: None,
            port: 5432,
        }
    }
}

impl DatabaseConfig {
    /// libpq keyword/value connection string
    pub fn conninfo(&self) -> String {
        let mut parts = vec![format!("dbname={}", conninfo_value(&self.name))];
        if let Some(ref user) = self.username {
            parts.push(format!("user={}", conninfo_value(user)));
        }
        if let Some(ref password) = self.password {
            parts.push(format!("password={}", conninfo_value(password)));
        }
        if let Some(ref host) = self.host {
            parts.push(format!("host={}", conninfo_value(host)));
        }
        parts.push(format!("port={}", self.port));
        parts.join(" ")
    }
}

/// Quote a conninfo value when it is empty or contains spaces or quotes
fn conninfo_value(value: &str) -> String {
    if !value.is_empty() && !value.contains([' ', '\'', '\\']) {
        return value.to_string();
    }
    let escaped = value.replace('\\', "\\\\").replace('\'', "\\'");
    format!("'{}'", escaped)
}

/// Rows to generate per table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Counts {
    pub directors: usize,
    pub stars: usize,
    pub movies: usize,
    pub cinemas: usize,
    pub promotions: usize,
    pub online_transactions: usize,
    pub customers: usize,
    pub transactions: u64,
}

impl Default for Counts {
    fn default() -> Self {
        Self {
            directors: 200,
            stars: 200,
            movies: 500,
            cinemas: 50,
            promotions: 10,
            online_transactions: 100,
            customers: 1000,
            transactions: 1_000_000,
        }
    }
}

/// Calendar window covered by the date dimension
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DateWindow {
    pub start: NaiveDate,
    pub days: u32,
}

impl Default for DateWindow {
    fn default() -> Self {
        Self {
            start: NaiveDate::from_ymd_opt(2014, 1, 1).unwrap_or_default(),
            days: 3650,
        }
    }
}

/// Batching of fact-table inserts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    /// Rows per INSERT statement
    pub size: usize,
    /// Rows between commit checkpoints
    pub commit_every: u64,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            size: 10_000,
            commit_every: 100_000,
        }
    }
}

/// Browsers recorded for online transactions unless configured otherwise
pub const DEFAULT_BROWSERS: [&str; 4] = ["Chrome", "Firefox", "Safari", "Edge"];

/// Fixed value lists that replace generated values when present.
///
/// `browsers` defaults to [`DEFAULT_BROWSERS`]; set it to `null` to
/// generate user-agent strings instead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValueLists {
    pub cities: Option<Vec<String>>,
    pub promotions: Option<Vec<String>>,
    pub browsers: Option<Vec<String>>,
}

impl Default for ValueLists {
    fn default() -> Self {
        Self {
            cities: None,
            promotions: None,
            browsers: Some(DEFAULT_BROWSERS.iter().map(|b| b.to_string()).collect()),
        }
    }
}

/// Complete configuration for a seeding run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeedConfig {
    pub database: DatabaseConfig,
    #[serde(deserialize_with = "deserialize_layout")]
    pub layout: SchemaLayout,
    pub counts: Counts,
    pub dates: DateWindow,
    pub batch: BatchConfig,
    pub values: ValueLists,
    /// RNG seed for reproducible runs
    pub seed: Option<u64>,
    /// "Today" for date-of-birth bounds; defaults to the local date
    pub reference_date: Option<NaiveDate>,
}

impl SeedConfig {
    /// Load configuration from a YAML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::from_yaml(&content)
            .with_context(|| format!("Invalid config file: {}", path.display()))
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: SeedConfig = serde_yaml_ng::from_str(content)?;
        Ok(config)
    }

    /// Reject settings the seeder cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.dates.days == 0 {
            bail!("dates.days must be at least 1");
        }
        if self.batch.size == 0 {
            bail!("batch.size must be at least 1");
        }
        if self.batch.commit_every == 0 {
            bail!("batch.commit_every must be at least 1");
        }
        for (name, list) in [
            ("values.cities", &self.values.cities),
            ("values.promotions", &self.values.promotions),
            ("values.browsers", &self.values.browsers),
        ] {
            if list.as_ref().is_some_and(|l| l.is_empty()) {
                bail!("{} must not be empty when set", name);
            }
        }
        Ok(())
    }
}

/// Accept either a preset name or an explicit layout table
fn deserialize_layout<'de, D>(deserializer: D) -> std::result::Result<SchemaLayout, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum LayoutRepr {
        Preset(String),
        Custom(SchemaLayout),
    }

    match LayoutRepr::deserialize(deserializer)? {
        LayoutRepr::Preset(name) => name.parse().map_err(serde::de::Error::custom),
        LayoutRepr::Custom(layout) => Ok(layout),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conninfo_quotes_when_needed() {
        let db = DatabaseConfig {
            name: "cinema".to_string(),
            username: Some("seed".to_string()),
            password: Some("it's secret".to_string()),
            host: Some("localhost".to_string()),
            port: 5433,
        };
        assert_eq!(
            db.conninfo(),
            "dbname=cinema user=seed password='it\\'s secret' host=localhost port=5433"
        );
    }

    #[test]
    fn test_conninfo_minimal() {
        let db = DatabaseConfig::default();
        assert_eq!(db.conninfo(), "dbname=cinema.duckdb port=5432");
    }

    #[test]
    fn test_browsers_default_and_opt_out() {
        let config = SeedConfig::from_yaml("values:\n  cities: [Oslo]\n").unwrap();
        assert_eq!(
            config.values.browsers,
            Some(vec![
                "Chrome".to_string(),
                "Firefox".to_string(),
                "Safari".to_string(),
                "Edge".to_string()
            ])
        );

        let config = SeedConfig::from_yaml("values:\n  browsers: null\n").unwrap();
        assert_eq!(config.values.browsers, None);
    }

    #[test]
    fn test_empty_yaml_is_default() {
        assert_eq!(SeedConfig::from_yaml("").unwrap(), SeedConfig::default());
    }
}
