//! Configuration loading and schema creation for every layout.

use cinema_seeder::config::SeedConfig;
use cinema_seeder::schema::{
    create_statements, CastLayout, Dialect, DirectorLayout, SchemaLayout, MOVIE_STAR,
};
use cinema_seeder::store::{create_schema, DuckDbStore};
use std::fs;
use tempfile::TempDir;

fn write_config(content: &str) -> (TempDir, std::path::PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("seed.yaml");
    fs::write(&path, content).unwrap();
    (temp_dir, path)
}

// =============================================================================
// YAML config
// =============================================================================

#[test]
fn test_load_full_config() {
    let (_dir, path) = write_config(
        r#"
database:
  name: warehouse
  username: etl
  password: hunter2
  host: db.internal
  port: 6543
layout: normalized
counts:
  movies: 50
  transactions: 1000
dates:
  start: 2020-01-01
  days: 366
batch:
  size: 250
  commit_every: 500
values:
  cities: [Lisbon, Porto]
  promotions: ["Half price Tuesday"]
seed: 99
reference_date: 2024-03-01
"#,
    );

    let config = SeedConfig::load(&path).unwrap();
    config.validate().unwrap();

    assert_eq!(config.database.name, "warehouse");
    assert_eq!(config.database.username.as_deref(), Some("etl"));
    assert_eq!(config.database.password.as_deref(), Some("hunter2"));
    assert_eq!(config.database.host.as_deref(), Some("db.internal"));
    assert_eq!(config.database.port, 6543);
    assert_eq!(config.layout, SchemaLayout::normalized());
    assert_eq!(config.counts.movies, 50);
    assert_eq!(config.counts.transactions, 1000);
    // untouched counts keep their defaults
    assert_eq!(config.counts.directors, 200);
    assert_eq!(config.counts.customers, 1000);
    assert_eq!(config.dates.days, 366);
    assert_eq!(config.batch.size, 250);
    assert_eq!(config.batch.commit_every, 500);
    assert_eq!(
        config.values.cities,
        Some(vec!["Lisbon".to_string(), "Porto".to_string()])
    );
    assert_eq!(
        config.values.browsers.as_deref().map(|b| b.len()),
        Some(cinema_seeder::config::DEFAULT_BROWSERS.len())
    );
    assert_eq!(config.seed, Some(99));
    assert_eq!(
        config.reference_date,
        chrono::NaiveDate::from_ymd_opt(2024, 3, 1)
    );
}

#[test]
fn test_layout_as_table() {
    let (_dir, path) = write_config(
        r#"
layout:
  cast: junction
  director: name
  promotion: false
"#,
    );

    let config = SeedConfig::load(&path).unwrap();
    assert_eq!(config.layout.cast, CastLayout::Junction);
    assert_eq!(config.layout.director, DirectorLayout::Name);
    assert!(!config.layout.promotion);
    assert!(config.layout.channel);
}

#[test]
fn test_defaults_without_file_content() {
    let (_dir, path) = write_config("\n");
    let config = SeedConfig::load(&path).unwrap();
    assert_eq!(config, SeedConfig::default());
    assert_eq!(config.database.name, "cinema.duckdb");
    assert_eq!(config.layout, SchemaLayout::classic());
    assert_eq!(config.counts.transactions, 1_000_000);
    assert_eq!(config.batch.size, 10_000);
    assert_eq!(config.batch.commit_every, 100_000);
    assert_eq!(config.dates.days, 3650);
}

#[test]
fn test_invalid_configs_rejected() {
    let (_dir, path) = write_config("layout: snowflake\n");
    let err = SeedConfig::load(&path).unwrap_err();
    assert!(format!("{:#}", err).contains("Unknown layout"));

    let (_dir, path) = write_config("counts:\n  movies: lots\n");
    assert!(SeedConfig::load(&path).is_err());

    let config = SeedConfig::from_yaml("batch:\n  size: 0\n").unwrap();
    assert!(config.validate().is_err());

    let config = SeedConfig::from_yaml("values:\n  browsers: []\n").unwrap();
    assert!(config.validate().is_err());

    let config = SeedConfig::from_yaml("dates:\n  days: 0\n").unwrap();
    assert!(config.validate().is_err());
}

#[test]
fn test_missing_file() {
    let temp_dir = TempDir::new().unwrap();
    let err = SeedConfig::load(&temp_dir.path().join("absent.yaml")).unwrap_err();
    assert!(err.to_string().contains("Failed to read config file"));
}

#[test]
fn test_password_not_serialized() {
    let mut config = SeedConfig::default();
    config.database.password = Some("secret".to_string());
    let yaml = serde_yaml_ng::to_string(&config).unwrap();
    assert!(!yaml.contains("secret"));
}

// =============================================================================
// Schema creation
// =============================================================================

#[test]
fn test_schema_creates_on_duckdb_for_every_layout() {
    for layout in [
        SchemaLayout::classic(),
        SchemaLayout::normalized(),
        SchemaLayout::lean(),
    ] {
        let mut store = DuckDbStore::open_in_memory().unwrap();
        create_schema(&mut store, &layout).unwrap();
        // idempotent
        create_schema(&mut store, &layout).unwrap();

        for table in layout.tables() {
            assert_eq!(store.count_rows(table.name).unwrap(), 0, "{}", table.name);
        }
        let has_junction = store.count_rows(MOVIE_STAR).is_ok();
        assert_eq!(has_junction, layout.cast == CastLayout::Junction);
    }
}

#[test]
fn test_file_database_persists() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("cinema.duckdb");
    let db = cinema_seeder::config::DatabaseConfig {
        name: path.to_string_lossy().into_owned(),
        ..Default::default()
    };

    {
        let mut store = DuckDbStore::open(&db).unwrap();
        create_schema(&mut store, &SchemaLayout::lean()).unwrap();
    }

    let store = DuckDbStore::open(&db).unwrap();
    assert_eq!(store.count_rows("transaction_fact").unwrap(), 0);
}

#[test]
fn test_postgres_ddl_orders_dependencies() {
    let stmts = create_statements(&SchemaLayout::normalized(), Dialect::Postgres);
    let position = |table: &str| {
        stmts
            .iter()
            .position(|s| s.starts_with(&format!("CREATE TABLE IF NOT EXISTS \"{}\"", table)))
            .unwrap()
    };
    assert!(position("director_dim") < position("movie_dim"));
    assert!(position("movie_dim") < position("movie_star"));
    assert!(position("star_dim") < position("movie_star"));
    assert!(position("customer_dim") < position("transaction_fact"));
    assert_eq!(stmts.len(), 10);
}
