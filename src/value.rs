//! SQL values produced by the seeder and their literal rendering.

use chrono::{NaiveDate, NaiveTime};

/// A single column value in a generated row
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Null,
    Int(i64),
    /// Fixed-point amount with two decimal places, stored as cents
    Cents(i64),
    Text(String),
    Date(NaiveDate),
    Time(NaiveTime),
}

impl SqlValue {
    /// Render as a SQL literal understood by both DuckDB and PostgreSQL
    pub fn to_sql(&self) -> String {
        match self {
            SqlValue::Null => "NULL".to_string(),
            SqlValue::Int(n) => n.to_string(),
            SqlValue::Cents(c) => {
                let sign = if *c < 0 { "-" } else { "" };
                let abs = c.unsigned_abs();
                format!("{}{}.{:02}", sign, abs / 100, abs % 100)
            }
            SqlValue::Text(s) => format!("'{}'", escape_string(s)),
            SqlValue::Date(d) => format!("DATE '{}'", d.format("%Y-%m-%d")),
            SqlValue::Time(t) => format!("TIME '{}'", t.format("%H:%M:%S")),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, SqlValue::Null)
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            SqlValue::Int(n) => Some(*n),
            _ => None,
        }
    }
}

impl From<i64> for SqlValue {
    fn from(n: i64) -> Self {
        SqlValue::Int(n)
    }
}

impl From<String> for SqlValue {
    fn from(s: String) -> Self {
        SqlValue::Text(s)
    }
}

impl From<&str> for SqlValue {
    fn from(s: &str) -> Self {
        SqlValue::Text(s.to_string())
    }
}

impl<T: Into<SqlValue>> From<Option<T>> for SqlValue {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(SqlValue::Null)
    }
}

/// Standard SQL escaping: single quotes are doubled
fn escape_string(s: &str) -> String {
    s.replace('\'', "''")
}

/// Quote an identifier with double quotes
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Build a multi-row `INSERT ... VALUES` statement
pub fn render_insert(table: &str, columns: &[&str], rows: &[Vec<SqlValue>]) -> String {
    if rows.is_empty() {
        return String::new();
    }

    let mut sql = format!("INSERT INTO {}", quote_ident(table));

    if !columns.is_empty() {
        sql.push_str(" (");
        for (i, col) in columns.iter().enumerate() {
            if i > 0 {
                sql.push_str(", ");
            }
            sql.push_str(&quote_ident(col));
        }
        sql.push(')');
    }

    sql.push_str(" VALUES\n");

    for (i, row) in rows.iter().enumerate() {
        if i > 0 {
            sql.push_str(",\n");
        }
        sql.push('(');
        for (j, value) in row.iter().enumerate() {
            if j > 0 {
                sql.push_str(", ");
            }
            sql.push_str(&value.to_sql());
        }
        sql.push(')');
    }
    sql.push(';');

    sql
}
