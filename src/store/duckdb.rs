//! DuckDB-backed store.

use super::Store;
use crate::config::DatabaseConfig;
use crate::schema::Dialect;
use crate::value::{quote_ident, render_insert, SqlValue};
use anyhow::{Context, Result};
use duckdb::Connection;

/// Catalog alias used when a remote PostgreSQL database is attached
const REMOTE_CATALOG: &str = "seed_target";

/// Store writing into an embedded DuckDB database
pub struct DuckDbStore {
    conn: Connection,
    /// Set when writes go to an attached PostgreSQL catalog
    remote: bool,
}

impl DuckDbStore {
    /// Connect according to the database configuration.
    ///
    /// With a `host`, an in-memory DuckDB attaches the PostgreSQL database
    /// and makes it the default catalog. Otherwise `name` is a DuckDB file
    /// path, or `:memory:`.
    pub fn open(config: &DatabaseConfig) -> Result<Self> {
        if config.host.is_some() {
            return Self::attach_postgres(config);
        }

        if config.name == ":memory:" {
            return Self::open_in_memory();
        }

        let conn = Connection::open(&config.name)
            .with_context(|| format!("Failed to open DuckDB database: {}", config.name))?;
        Ok(Self {
            conn,
            remote: false,
        })
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn =
            Connection::open_in_memory().context("Failed to create in-memory DuckDB database")?;
        Ok(Self {
            conn,
            remote: false,
        })
    }

    fn attach_postgres(config: &DatabaseConfig) -> Result<Self> {
        let conn =
            Connection::open_in_memory().context("Failed to create in-memory DuckDB database")?;

        conn.execute_batch("INSTALL postgres; LOAD postgres;")
            .context("Failed to load the DuckDB postgres extension")?;

        let attach = format!(
            "ATTACH '{}' AS {} (TYPE postgres); USE {};",
            config.conninfo().replace('\'', "''"),
            REMOTE_CATALOG,
            REMOTE_CATALOG
        );
        conn.execute_batch(&attach).with_context(|| {
            format!(
                "Failed to connect to PostgreSQL database {} at {}",
                config.name,
                config.host.as_deref().unwrap_or_default()
            )
        })?;

        Ok(Self { conn, remote: true })
    }

    /// Underlying DuckDB connection
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Number of rows currently in `table`
    pub fn count_rows(&self, table: &str) -> Result<u64> {
        let sql = format!("SELECT COUNT(*) FROM {}", quote_ident(table));
        let count: i64 = self
            .conn
            .query_row(&sql, [], |row| row.get(0))
            .with_context(|| format!("Failed to count rows in {}", table))?;
        Ok(count as u64)
    }
}

impl Store for DuckDbStore {
    fn dialect(&self) -> Dialect {
        if self.remote {
            Dialect::Postgres
        } else {
            Dialect::DuckDb
        }
    }

    fn begin(&mut self) -> Result<()> {
        self.conn
            .execute_batch("BEGIN TRANSACTION;")
            .context("Failed to begin transaction")
    }

    fn commit(&mut self) -> Result<()> {
        self.conn
            .execute_batch("COMMIT;")
            .context("Failed to commit transaction")
    }

    fn rollback(&mut self) -> Result<()> {
        self.conn
            .execute_batch("ROLLBACK;")
            .context("Failed to roll back transaction")
    }

    fn insert_returning(
        &mut self,
        table: &str,
        key: &str,
        columns: &[&str],
        values: &[SqlValue],
    ) -> Result<i64> {
        let row = values.to_vec();
        let insert = render_insert(table, columns, std::slice::from_ref(&row));
        let sql = format!(
            "{} RETURNING {}",
            insert.trim_end_matches(';'),
            quote_ident(key)
        );
        self.conn
            .query_row(&sql, [], |row| row.get(0))
            .with_context(|| format!("Failed to insert into {}", table))
    }

    fn insert_rows(
        &mut self,
        table: &str,
        columns: &[&str],
        rows: &[Vec<SqlValue>],
    ) -> Result<u64> {
        if rows.is_empty() {
            return Ok(0);
        }
        let sql = render_insert(table, columns, rows);
        let inserted = self
            .conn
            .execute(&sql, [])
            .with_context(|| format!("Failed to insert {} rows into {}", rows.len(), table))?;
        Ok(inserted as u64)
    }

    fn execute_ddl(&mut self, statements: &[String]) -> Result<()> {
        for stmt in statements {
            if self.remote {
                // DuckDB cannot parse PostgreSQL DDL such as SERIAL; hand it
                // to the server verbatim.
                let call = format!(
                    "CALL postgres_execute('{}', '{}');",
                    REMOTE_CATALOG,
                    stmt.replace('\'', "''")
                );
                self.conn
                    .execute_batch(&call)
                    .with_context(|| format!("Failed to execute schema statement: {}", stmt))?;
            } else {
                self.conn
                    .execute_batch(stmt)
                    .with_context(|| format!("Failed to execute schema statement: {}", stmt))?;
            }
        }
        Ok(())
    }
}
