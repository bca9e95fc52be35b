//! Transaction fact table.
//!
//! Facts are generated in batches of `batch.size` rows, each batch written
//! as one multi-row INSERT, with a commit checkpoint every
//! `batch.commit_every` rows so a failure loses at most one interval.

use super::{Cinema, Customer, DateDim, KeySet, Movie, OnlineTransaction, Promotion, Seeder};
use crate::fake::FakeData;
use crate::schema::{SchemaLayout, TRANSACTION_FACT};
use crate::store::{Store, Transaction};
use crate::value::SqlValue;
use anyhow::{anyhow, bail, Result};
use chrono::NaiveTime;
use rand::Rng;

pub const PRICE_CENTS_MIN: i64 = 500;
pub const PRICE_CENTS_MAX: i64 = 5000;
pub const TICKETS_MIN: i64 = 1;
pub const TICKETS_MAX: i64 = 5;
pub const OFFLINE_ID_MIN: i64 = 1000;
pub const OFFLINE_ID_MAX: i64 = 9999;

/// Dimension keys the fact table may reference
pub struct FactRefs<'a> {
    pub customers: &'a KeySet<Customer>,
    pub movies: &'a KeySet<Movie>,
    pub cinemas: &'a KeySet<Cinema>,
    pub dates: &'a KeySet<DateDim>,
    pub promotions: Option<&'a KeySet<Promotion>>,
    pub online_transactions: Option<&'a KeySet<OnlineTransaction>>,
}

impl FactRefs<'_> {
    /// Every key set the layout needs must be present and non-empty
    fn check(&self, layout: &SchemaLayout) -> Result<()> {
        let required = [
            ("customer", self.customers.len()),
            ("movie", self.movies.len()),
            ("cinema", self.cinemas.len()),
            ("date", self.dates.len()),
        ];
        for (name, len) in required {
            if len == 0 {
                bail!("no {} keys to reference", name);
            }
        }
        if layout.promotion && self.promotions.map_or(true, |k| k.is_empty()) {
            bail!("no promotion keys to reference");
        }
        if layout.channel && self.online_transactions.map_or(true, |k| k.is_empty()) {
            bail!("no online transaction keys to reference");
        }
        Ok(())
    }
}

/// Sales channel of a ticket transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    Online(i64),
    Offline(i64),
}

/// One generated row of `transaction_fact`
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionFact {
    pub customer_id: i64,
    pub movie_id: i64,
    pub cinema_id: i64,
    pub date_id: i64,
    pub promotion_id: Option<i64>,
    pub price_cents: i64,
    pub ticket_count: i64,
    pub channel: Option<Channel>,
    pub showtime: NaiveTime,
}

impl TransactionFact {
    /// Values in the column order of [`SchemaLayout::fact_columns`]
    pub fn to_row(&self, layout: &SchemaLayout) -> Vec<SqlValue> {
        let mut row = Vec::with_capacity(10);
        row.push(SqlValue::Int(self.customer_id));
        row.push(SqlValue::Int(self.movie_id));
        row.push(SqlValue::Int(self.cinema_id));
        row.push(SqlValue::Int(self.date_id));
        if layout.promotion {
            row.push(SqlValue::from(self.promotion_id));
        }
        row.push(SqlValue::Cents(self.price_cents));
        row.push(SqlValue::Int(self.ticket_count));
        if layout.channel {
            let (online, offline) = match self.channel {
                Some(Channel::Online(id)) => (Some(id), None),
                Some(Channel::Offline(id)) => (None, Some(id)),
                None => (None, None),
            };
            row.push(SqlValue::from(online));
            row.push(SqlValue::from(offline));
        }
        row.push(SqlValue::Time(self.showtime));
        row
    }
}

/// Draw one fact, sampling every foreign key from `refs` with replacement
pub fn generate_fact<R: Rng>(
    fake: &mut FakeData<R>,
    refs: &FactRefs<'_>,
    layout: &SchemaLayout,
) -> Result<TransactionFact> {
    let customer_id = refs
        .customers
        .sample(fake.rng())
        .ok_or_else(|| anyhow!("no customer keys to reference"))?;
    let movie_id = refs
        .movies
        .sample(fake.rng())
        .ok_or_else(|| anyhow!("no movie keys to reference"))?;
    let cinema_id = refs
        .cinemas
        .sample(fake.rng())
        .ok_or_else(|| anyhow!("no cinema keys to reference"))?;
    let date_id = refs
        .dates
        .sample(fake.rng())
        .ok_or_else(|| anyhow!("no date keys to reference"))?;

    let promotion_id = if layout.promotion {
        refs.promotions.and_then(|k| k.sample(fake.rng()))
    } else {
        None
    };

    let price_cents = fake.int(PRICE_CENTS_MIN..=PRICE_CENTS_MAX);
    let ticket_count = fake.int(TICKETS_MIN..=TICKETS_MAX);

    let channel = if layout.channel {
        let online = refs.online_transactions.and_then(|k| k.sample(fake.rng()));
        let prefer_online = fake.coin();
        match online {
            Some(id) if prefer_online => Some(Channel::Online(id)),
            _ => Some(Channel::Offline(fake.int(OFFLINE_ID_MIN..=OFFLINE_ID_MAX))),
        }
    } else {
        None
    };

    Ok(TransactionFact {
        customer_id,
        movie_id,
        cinema_id,
        date_id,
        promotion_id,
        price_cents,
        ticket_count,
        channel,
        showtime: fake.time_of_day(),
    })
}

impl<S: Store + ?Sized, R: Rng> Seeder<'_, S, R> {
    /// Insert exactly `count` facts, returning the number of rows written
    pub fn populate_transactions(&mut self, count: u64, refs: &FactRefs<'_>) -> Result<u64> {
        let layout = self.config.layout;
        refs.check(&layout)?;

        let columns = layout.fact_columns();
        let batch_size = self.config.batch.size.max(1);
        let commit_every = self.config.batch.commit_every.max(1);

        let mut inserted = 0u64;
        let mut since_commit = 0u64;
        let mut batch: Vec<Vec<SqlValue>> = Vec::with_capacity(batch_size.min(count as usize));

        let mut tx = Transaction::begin(&mut *self.store)?;
        while inserted < count {
            let remaining = count - inserted;
            let take = remaining.min(batch_size as u64);

            batch.clear();
            for _ in 0..take {
                let fact = generate_fact(&mut self.fake, refs, &layout)?;
                batch.push(fact.to_row(&layout));
            }

            let written = tx.insert_rows(TRANSACTION_FACT, &columns, &batch)?;
            if written != take {
                bail!(
                    "store wrote {} of {} rows into {}",
                    written,
                    take,
                    TRANSACTION_FACT
                );
            }
            inserted += written;
            since_commit += written;

            if since_commit >= commit_every && inserted < count {
                tx.checkpoint()?;
                self.checkpointed = inserted;
                since_commit = 0;
            }

            if let Some(ref mut callback) = self.on_rows {
                callback(inserted);
            }
        }
        tx.commit()?;

        Ok(inserted)
    }
}
