//! Storage boundary for the seeder.
//!
//! A [`Store`] receives parameter-free `INSERT` statements built from
//! [`SqlValue`] rows. Two implementations ship with the crate:
//!
//! - [`DuckDbStore`]: an embedded DuckDB database, optionally attached to a
//!   remote PostgreSQL server through DuckDB's `postgres` extension
//! - [`ScriptStore`]: a PostgreSQL SQL script written to a file or stream

mod duckdb;
mod script;

pub use self::duckdb::DuckDbStore;
pub use self::script::ScriptStore;

use crate::schema::{create_statements, Dialect, SchemaLayout};
use crate::value::SqlValue;
use anyhow::Result;
use std::ops::{Deref, DerefMut};

/// A relational target the seeder can write rows into
pub trait Store {
    /// Dialect used for DDL sent to this store
    fn dialect(&self) -> Dialect;

    fn begin(&mut self) -> Result<()>;

    fn commit(&mut self) -> Result<()>;

    fn rollback(&mut self) -> Result<()>;

    /// Insert one row and return the key the store generated for it
    fn insert_returning(
        &mut self,
        table: &str,
        key: &str,
        columns: &[&str],
        values: &[SqlValue],
    ) -> Result<i64>;

    /// Insert a batch of rows, returning the number of rows written
    fn insert_rows(&mut self, table: &str, columns: &[&str], rows: &[Vec<SqlValue>])
        -> Result<u64>;

    /// Execute schema statements
    fn execute_ddl(&mut self, statements: &[String]) -> Result<()>;
}

/// Create every table of `layout` in the store
pub fn create_schema<S: Store + ?Sized>(store: &mut S, layout: &SchemaLayout) -> Result<()> {
    let statements = create_statements(layout, store.dialect());
    store.execute_ddl(&statements)
}

/// Transaction scope over a store.
///
/// The transaction begins when the scope is created. It must be finished
/// with [`Transaction::commit`]; dropping an open scope rolls it back.
pub struct Transaction<'a, S: Store + ?Sized> {
    store: &'a mut S,
    open: bool,
}

impl<'a, S: Store + ?Sized> Transaction<'a, S> {
    pub fn begin(store: &'a mut S) -> Result<Self> {
        store.begin()?;
        Ok(Self { store, open: true })
    }

    /// Commit the work so far and immediately open a new transaction
    pub fn checkpoint(&mut self) -> Result<()> {
        self.store.commit()?;
        self.open = false;
        self.store.begin()?;
        self.open = true;
        Ok(())
    }

    pub fn commit(mut self) -> Result<()> {
        self.store.commit()?;
        self.open = false;
        Ok(())
    }
}

impl<S: Store + ?Sized> Deref for Transaction<'_, S> {
    type Target = S;

    fn deref(&self) -> &S {
        self.store
    }
}

impl<S: Store + ?Sized> DerefMut for Transaction<'_, S> {
    fn deref_mut(&mut self) -> &mut S {
        self.store
    }
}

impl<S: Store + ?Sized> Drop for Transaction<'_, S> {
    fn drop(&mut self) {
        if self.open {
            // The original error is already propagating; a failed rollback
            // must not replace it.
            let _ = self.store.rollback();
        }
    }
}
