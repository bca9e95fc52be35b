//! Independent dimensions: directors, stars, cinemas, promotions, online
//! transactions and customers.
//!
//! Each row is inserted individually so the store can hand back the key it
//! generated.

use super::{Cinema, Customer, KeySet, NamedKeySet, OnlineTransaction, Promotion, Seeder};
use crate::fake::{truncate_chars, FakeData};
use crate::schema::{
    CINEMA_DIM, CUSTOMER_DIM, DIRECTOR_DIM, MAX_TEXT_LEN, ONLINE_TRANSACTION_DIM, PROMOTION_DIM,
    STAR_DIM,
};
use crate::store::{Store, Transaction};
use crate::value::SqlValue;
use anyhow::Result;
use rand::Rng;

pub const HALL_SIZE_MIN: i64 = 50;
pub const HALL_SIZE_MAX: i64 = 500;
pub const CUSTOMER_MIN_AGE: u32 = 10;
pub const CUSTOMER_MAX_AGE: u32 = 90;
const PROMOTION_WORDS: usize = 4;
const DESCRIPTION_MAX_LEN: usize = 255;
const BROWSER_MAX_LEN: usize = 255;

/// A dimension table with a generated key and a single name column
#[derive(Debug, Clone, Copy)]
pub struct NamedTable {
    pub table: &'static str,
    pub key: &'static str,
    pub column: &'static str,
}

impl NamedTable {
    pub const DIRECTORS: NamedTable = NamedTable {
        table: DIRECTOR_DIM,
        key: "director_id",
        column: "name",
    };

    pub const STARS: NamedTable = NamedTable {
        table: STAR_DIM,
        key: "star_id",
        column: "star_name",
    };
}

impl<S: Store + ?Sized, R: Rng> Seeder<'_, S, R> {
    /// Insert `count` rows of a single-name dimension
    pub fn populate_named<T, F>(
        &mut self,
        table: NamedTable,
        count: usize,
        mut name: F,
    ) -> Result<NamedKeySet<T>>
    where
        F: FnMut(&mut FakeData<R>) -> String,
    {
        let mut keys = NamedKeySet::new();
        let mut tx = Transaction::begin(&mut *self.store)?;
        for _ in 0..count {
            let value = truncate_chars(&name(&mut self.fake), MAX_TEXT_LEN);
            let id = tx.insert_returning(
                table.table,
                table.key,
                &[table.column],
                &[SqlValue::Text(value.clone())],
            )?;
            keys.push(id, value);
        }
        tx.commit()?;
        Ok(keys)
    }

    /// Insert `count` cinemas with a hall capacity between 50 and 500
    pub fn populate_cinemas(&mut self, count: usize) -> Result<KeySet<Cinema>> {
        let cities = self.config.values.cities.clone();
        let mut keys = KeySet::new();
        let mut tx = Transaction::begin(&mut *self.store)?;
        for _ in 0..count {
            let name = truncate_chars(&self.fake.company(), MAX_TEXT_LEN);
            let city = match cities.as_deref() {
                Some(list) => self.fake.pick(list).cloned().unwrap_or_default(),
                None => self.fake.city(),
            };
            let state = self.fake.state();
            let hall_size = self.fake.int(HALL_SIZE_MIN..=HALL_SIZE_MAX);

            let id = tx.insert_returning(
                CINEMA_DIM,
                "cinema_id",
                &["name", "city", "state", "hall_size"],
                &[
                    SqlValue::Text(name),
                    SqlValue::Text(truncate_chars(&city, MAX_TEXT_LEN)),
                    SqlValue::Text(truncate_chars(&state, MAX_TEXT_LEN)),
                    SqlValue::Int(hall_size),
                ],
            )?;
            keys.push(id);
        }
        tx.commit()?;
        Ok(keys)
    }

    /// Insert `count` promotions.
    ///
    /// With a configured description list the descriptions cycle through it
    /// in order; otherwise each is a generated four-word sentence.
    pub fn populate_promotions(&mut self, count: usize) -> Result<KeySet<Promotion>> {
        let fixed = self.config.values.promotions.clone();
        let mut keys = KeySet::new();
        let mut tx = Transaction::begin(&mut *self.store)?;
        for i in 0..count {
            let description = match fixed.as_deref() {
                Some(list) if !list.is_empty() => list[i % list.len()].clone(),
                _ => self.fake.sentence(PROMOTION_WORDS),
            };
            let description = truncate_chars(&description, DESCRIPTION_MAX_LEN);
            let id = tx.insert_returning(
                PROMOTION_DIM,
                "promotion_id",
                &["description"],
                &[SqlValue::Text(description)],
            )?;
            keys.push(id);
        }
        tx.commit()?;
        Ok(keys)
    }

    /// Insert `count` online-transaction rows, each tagged with a browser
    pub fn populate_online_transactions(
        &mut self,
        count: usize,
    ) -> Result<KeySet<OnlineTransaction>> {
        let browsers = self.config.values.browsers.clone();
        let mut keys = KeySet::new();
        let mut tx = Transaction::begin(&mut *self.store)?;
        for _ in 0..count {
            let browser = match browsers.as_deref() {
                Some(list) => self.fake.pick(list).cloned().unwrap_or_default(),
                None => self.fake.user_agent(),
            };
            let id = tx.insert_returning(
                ONLINE_TRANSACTION_DIM,
                "online_transaction_id",
                &["browser"],
                &[SqlValue::Text(truncate_chars(&browser, BROWSER_MAX_LEN))],
            )?;
            keys.push(id);
        }
        tx.commit()?;
        Ok(keys)
    }

    /// Insert `count` customers aged 10 to 90 on the reference date
    pub fn populate_customers(&mut self, count: usize) -> Result<KeySet<Customer>> {
        let today = self.today;
        let mut keys = KeySet::new();
        let mut tx = Transaction::begin(&mut *self.store)?;
        for _ in 0..count {
            let name = truncate_chars(&self.fake.person_name(), MAX_TEXT_LEN);
            let gender = self.fake.gender();
            let dob = self
                .fake
                .date_of_birth(today, CUSTOMER_MIN_AGE, CUSTOMER_MAX_AGE);
            let id = tx.insert_returning(
                CUSTOMER_DIM,
                "customer_id",
                &["name", "gender", "dob"],
                &[
                    SqlValue::Text(name),
                    SqlValue::from(gender.code()),
                    SqlValue::Date(dob),
                ],
            )?;
            keys.push(id);
        }
        tx.commit()?;
        Ok(keys)
    }
}
