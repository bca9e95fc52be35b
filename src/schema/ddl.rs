//! DDL rendering for the star schema.
//!
//! Generated keys become a sequence-backed default in DuckDB and a
//! `SERIAL` column in PostgreSQL.

use super::{ColumnDef, ColumnKind, SchemaLayout, TableDef};
use crate::value::quote_ident;

/// Target SQL dialect for generated DDL and scripts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Dialect {
    #[default]
    DuckDb,
    Postgres,
}

impl std::str::FromStr for Dialect {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "duckdb" | "duck" => Ok(Dialect::DuckDb),
            "postgres" | "postgresql" | "pg" => Ok(Dialect::Postgres),
            _ => Err(format!(
                "Unknown dialect: {}. Valid options: duckdb, postgres",
                s
            )),
        }
    }
}

impl std::fmt::Display for Dialect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Dialect::DuckDb => write!(f, "duckdb"),
            Dialect::Postgres => write!(f, "postgres"),
        }
    }
}

/// Name of the DuckDB sequence backing a table's generated key
pub fn sequence_name(table: &str) -> String {
    format!("seq_{}", table)
}

/// Render all `CREATE` statements for a layout, in dependency order
pub fn create_statements(layout: &SchemaLayout, dialect: Dialect) -> Vec<String> {
    let mut stmts = Vec::new();
    for table in layout.tables() {
        if dialect == Dialect::DuckDb && table.generated_key.is_some() {
            stmts.push(format!(
                "CREATE SEQUENCE IF NOT EXISTS {} START 1;",
                quote_ident(&sequence_name(table.name))
            ));
        }
        stmts.push(create_table(&table, dialect));
    }
    stmts
}

/// Render a single `CREATE TABLE` statement
pub fn create_table(table: &TableDef, dialect: Dialect) -> String {
    let mut lines = Vec::with_capacity(table.columns.len() + 2);

    if let Some(key) = table.generated_key {
        let line = match dialect {
            Dialect::DuckDb => format!(
                "    {} INTEGER PRIMARY KEY DEFAULT nextval('{}')",
                quote_ident(key),
                sequence_name(table.name)
            ),
            Dialect::Postgres => format!("    {} SERIAL PRIMARY KEY", quote_ident(key)),
        };
        lines.push(line);
    }

    for column in &table.columns {
        lines.push(format!("    {}", column_definition(column)));
    }

    if !table.composite_key.is_empty() {
        let cols: Vec<String> = table.composite_key.iter().map(|c| quote_ident(c)).collect();
        lines.push(format!("    PRIMARY KEY ({})", cols.join(", ")));
    }

    format!(
        "CREATE TABLE IF NOT EXISTS {} (\n{}\n);",
        quote_ident(table.name),
        lines.join(",\n")
    )
}

fn column_definition(column: &ColumnDef) -> String {
    let mut def = format!("{} {}", quote_ident(column.name), sql_type(column.kind));
    if column.primary_key {
        def.push_str(" PRIMARY KEY");
    } else if !column.nullable {
        def.push_str(" NOT NULL");
    }
    if let Some((table, col)) = column.references {
        def.push_str(&format!(" REFERENCES {} ({})", quote_ident(table), quote_ident(col)));
    }
    def
}

fn sql_type(kind: ColumnKind) -> String {
    match kind {
        ColumnKind::Int => "INTEGER".to_string(),
        ColumnKind::Text(len) => format!("VARCHAR({})", len),
        ColumnKind::Decimal => "DECIMAL(10,2)".to_string(),
        ColumnKind::Date => "DATE".to_string(),
        ColumnKind::Time => "TIME".to_string(),
    }
}
