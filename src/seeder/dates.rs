//! Date dimension.

use super::{DateDim, KeySet, Seeder};
use crate::schema::DATE_DIM;
use crate::store::{Store, Transaction};
use crate::value::SqlValue;
use anyhow::{Context, Result};
use chrono::{Datelike, Duration, NaiveDate};
use rand::Rng;

const DATE_COLUMNS: [&str; 5] = ["date_id", "date", "year", "month", "weekday"];

/// One row of `date_dim`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateEntry {
    pub id: i64,
    pub date: NaiveDate,
    pub year: i32,
    pub month: u32,
    pub weekday: String,
}

impl DateEntry {
    fn to_row(&self) -> Vec<SqlValue> {
        vec![
            SqlValue::Int(self.id),
            SqlValue::Date(self.date),
            SqlValue::Int(self.year as i64),
            SqlValue::Int(self.month as i64),
            SqlValue::Text(self.weekday.clone()),
        ]
    }
}

/// `days` consecutive dates from `start`, with ids 1..=days
pub fn date_rows(start: NaiveDate, days: u32) -> Result<Vec<DateEntry>> {
    (0..days)
        .map(|offset| {
            let date = start
                .checked_add_signed(Duration::days(offset as i64))
                .with_context(|| format!("Date window overflows at {} + {} days", start, offset))?;
            Ok(DateEntry {
                id: offset as i64 + 1,
                date,
                year: date.year(),
                month: date.month(),
                weekday: date.format("%A").to_string(),
            })
        })
        .collect()
}

impl<S: Store + ?Sized, R: Rng> Seeder<'_, S, R> {
    /// Insert the deterministic date dimension
    pub fn populate_dates(&mut self, start: NaiveDate, days: u32) -> Result<KeySet<DateDim>> {
        let entries = date_rows(start, days)?;
        let batch_size = self.config.batch.size.max(1);

        let mut tx = Transaction::begin(&mut *self.store)?;
        for chunk in entries.chunks(batch_size) {
            let rows: Vec<Vec<SqlValue>> = chunk.iter().map(DateEntry::to_row).collect();
            tx.insert_rows(DATE_DIM, &DATE_COLUMNS, &rows)?;
        }
        tx.commit()?;

        Ok(KeySet::from_ids(entries.iter().map(|e| e.id).collect()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_and_last_of_decade() {
        let start = NaiveDate::from_ymd_opt(2014, 1, 1).unwrap();
        let rows = date_rows(start, 3650).unwrap();
        assert_eq!(rows.len(), 3650);

        let first = &rows[0];
        assert_eq!(first.id, 1);
        assert_eq!(first.date, start);
        assert_eq!(first.weekday, "Wednesday");

        let last = rows.last().unwrap();
        assert_eq!(last.id, 3650);
        assert_eq!(last.date, NaiveDate::from_ymd_opt(2023, 12, 29).unwrap());
        assert_eq!(last.year, 2023);
        assert_eq!(last.month, 12);
    }

    #[test]
    fn test_ids_contiguous_and_date_ordered() {
        let start = NaiveDate::from_ymd_opt(2020, 2, 27).unwrap();
        let rows = date_rows(start, 5).unwrap();
        for (i, row) in rows.iter().enumerate() {
            assert_eq!(row.id, i as i64 + 1);
            assert_eq!(row.date, start + Duration::days(row.id - 1));
        }
        assert_eq!(rows[2].date, NaiveDate::from_ymd_opt(2020, 2, 29).unwrap());
        assert_eq!(rows[3].month, 3);
    }

    #[test]
    fn test_deterministic() {
        let start = NaiveDate::from_ymd_opt(2014, 1, 1).unwrap();
        assert_eq!(date_rows(start, 400).unwrap(), date_rows(start, 400).unwrap());
    }

    #[test]
    fn test_zero_days() {
        let start = NaiveDate::from_ymd_opt(2014, 1, 1).unwrap();
        assert!(date_rows(start, 0).unwrap().is_empty());
    }
}
