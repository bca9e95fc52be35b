//! Schema command: print the DDL for a layout.

use crate::schema::{create_statements, Dialect, SchemaLayout};
use anyhow::Result;
use clap::Args;

#[derive(Args, Debug)]
#[command(after_help = "Examples:
  cinema-seeder schema
  cinema-seeder schema --layout normalized --dialect postgres")]
pub struct SchemaArgs {
    /// Schema layout: classic, normalized, lean
    #[arg(short, long, default_value = "classic")]
    pub layout: String,

    /// SQL dialect: duckdb, postgres
    #[arg(short, long, default_value = "duckdb")]
    pub dialect: String,
}

pub fn run(args: SchemaArgs) -> Result<()> {
    let layout: SchemaLayout = args
        .layout
        .parse()
        .map_err(|e: String| anyhow::anyhow!(e))?;
    let dialect: Dialect = args
        .dialect
        .parse()
        .map_err(|e: String| anyhow::anyhow!(e))?;

    for stmt in create_statements(&layout, dialect) {
        println!("{}\n", stmt);
    }
    Ok(())
}
