//! SQL script store.
//!
//! Writes the seeding run as a PostgreSQL script instead of executing it.
//! Generated keys are assigned from per-table counters, written as explicit
//! values, and the backing sequences are advanced with `setval` when the
//! script is finished.

use super::Store;
use crate::schema::Dialect;
use crate::value::{quote_ident, render_insert, SqlValue};
use ahash::AHashMap;
use anyhow::{Context, Result};
use flate2::write::GzEncoder;
use flate2::Compression;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

const WRITER_BUFFER_SIZE: usize = 256 * 1024;

/// Script output, plain or gzip-compressed
enum ScriptWriter {
    Plain(Box<dyn Write>),
    Gzip(GzEncoder<Box<dyn Write>>),
}

impl ScriptWriter {
    /// Write any gzip trailer and flush the underlying stream
    fn finish(self) -> Result<()> {
        let mut inner = match self {
            ScriptWriter::Plain(writer) => writer,
            ScriptWriter::Gzip(encoder) => encoder
                .finish()
                .context("Failed to finish gzip stream")?,
        };
        inner.flush().context("Failed to flush SQL script")?;
        Ok(())
    }
}

impl Write for ScriptWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        match self {
            ScriptWriter::Plain(w) => w.write(buf),
            ScriptWriter::Gzip(w) => w.write(buf),
        }
    }

    fn flush(&mut self) -> std::io::Result<()> {
        match self {
            ScriptWriter::Plain(w) => w.flush(),
            ScriptWriter::Gzip(w) => w.flush(),
        }
    }
}

/// Last generated key per table
struct KeyCounter {
    key: String,
    last: i64,
}

pub struct ScriptStore {
    writer: ScriptWriter,
    counters: AHashMap<String, KeyCounter>,
    /// Table order in which counters were first used, for stable output
    order: Vec<String>,
    statements: u64,
}

impl ScriptStore {
    /// Create a script file; a `.gz` extension enables gzip compression
    pub fn create(path: &Path) -> Result<Self> {
        let file = File::create(path)
            .with_context(|| format!("Failed to create output file: {}", path.display()))?;
        let writer: Box<dyn Write> = Box::new(BufWriter::with_capacity(WRITER_BUFFER_SIZE, file));
        if path.extension().and_then(|e| e.to_str()) == Some("gz") {
            Self::gzip_writer(writer)
        } else {
            Self::from_writer(writer)
        }
    }

    /// Write an uncompressed script to `writer`
    pub fn from_writer(writer: Box<dyn Write>) -> Result<Self> {
        Self::with_writer(ScriptWriter::Plain(writer))
    }

    /// Write a gzip-compressed script to `writer`
    pub fn gzip_writer(writer: Box<dyn Write>) -> Result<Self> {
        Self::with_writer(ScriptWriter::Gzip(GzEncoder::new(
            writer,
            Compression::default(),
        )))
    }

    fn with_writer(writer: ScriptWriter) -> Result<Self> {
        let mut store = Self {
            writer,
            counters: AHashMap::new(),
            order: Vec::new(),
            statements: 0,
        };
        store.write_header()?;
        Ok(store)
    }

    fn write_header(&mut self) -> Result<()> {
        writeln!(self.writer, "-- Generated by cinema-seeder")?;
        writeln!(self.writer, "SET client_encoding = 'UTF8';")?;
        writeln!(self.writer)?;
        Ok(())
    }

    fn write_statement(&mut self, stmt: &str) -> Result<()> {
        self.writer.write_all(stmt.as_bytes())?;
        self.writer.write_all(b"\n")?;
        self.statements += 1;
        Ok(())
    }

    /// Number of statements written so far
    pub fn statement_count(&self) -> u64 {
        self.statements
    }

    /// Advance sequences past the seeded keys and complete the output.
    ///
    /// Gzip output only becomes a valid archive once this returns `Ok`.
    pub fn finish(mut self) -> Result<()> {
        let order = std::mem::take(&mut self.order);
        if !order.is_empty() {
            writeln!(self.writer)?;
        }
        for table in order {
            let counter = &self.counters[&table];
            let stmt = format!(
                "SELECT setval(pg_get_serial_sequence('{}', '{}'), {});",
                quote_ident(&table),
                counter.key,
                counter.last
            );
            self.write_statement(&stmt)?;
        }
        self.writer.finish()
    }
}

impl Store for ScriptStore {
    fn dialect(&self) -> Dialect {
        Dialect::Postgres
    }

    fn begin(&mut self) -> Result<()> {
        self.write_statement("BEGIN;")
    }

    fn commit(&mut self) -> Result<()> {
        self.write_statement("COMMIT;")
    }

    fn rollback(&mut self) -> Result<()> {
        self.write_statement("ROLLBACK;")
    }

    fn insert_returning(
        &mut self,
        table: &str,
        key: &str,
        columns: &[&str],
        values: &[SqlValue],
    ) -> Result<i64> {
        if !self.counters.contains_key(table) {
            self.order.push(table.to_string());
        }
        let counter = self
            .counters
            .entry(table.to_string())
            .or_insert_with(|| KeyCounter {
                key: key.to_string(),
                last: 0,
            });
        counter.last += 1;
        let id = counter.last;

        let mut all_columns = Vec::with_capacity(columns.len() + 1);
        all_columns.push(key);
        all_columns.extend_from_slice(columns);

        let mut row = Vec::with_capacity(values.len() + 1);
        row.push(SqlValue::Int(id));
        row.extend_from_slice(values);

        let stmt = render_insert(table, &all_columns, &[row]);
        self.write_statement(&stmt)?;
        Ok(id)
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
        let stmt = render_insert(table, columns, rows);
        self.write_statement(&stmt)?;
        Ok(rows.len() as u64)
    }

    fn execute_ddl(&mut self, statements: &[String]) -> Result<()> {
        for stmt in statements {
            self.write_statement(stmt)?;
        }
        self.writer.write_all(b"\n")?;
        Ok(())
    }
}
