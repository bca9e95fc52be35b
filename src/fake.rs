//! Generated-value provider.
//!
//! Wraps an RNG and produces names, titles, places, user agents and the
//! bounded numbers, dates and times the seeding phases need.

use chrono::{Months, NaiveDate, NaiveTime};
use fake::faker::address::en::{CityName, StateName};
use fake::faker::company::en::CompanyName;
use fake::faker::internet::en::UserAgent;
use fake::faker::lorem::en::Sentence;
use fake::faker::name::en::Name;
use fake::Fake;
use rand::Rng;
use std::fmt;
use std::ops::RangeInclusive;

/// Movie genres
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Genre {
    Action,
    Drama,
    Comedy,
    Horror,
    SciFi,
}

impl Genre {
    pub const ALL: [Genre; 5] = [
        Genre::Action,
        Genre::Drama,
        Genre::Comedy,
        Genre::Horror,
        Genre::SciFi,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Genre::Action => "Action",
            Genre::Drama => "Drama",
            Genre::Comedy => "Comedy",
            Genre::Horror => "Horror",
            Genre::SciFi => "Sci-Fi",
        }
    }
}

impl fmt::Display for Genre {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Customer gender codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Gender {
    Male,
    Female,
    Other,
}

impl Gender {
    pub const ALL: [Gender; 3] = [Gender::Male, Gender::Female, Gender::Other];

    pub fn code(&self) -> &'static str {
        match self {
            Gender::Male => "M",
            Gender::Female => "F",
            Gender::Other => "O",
        }
    }
}

/// Fake data generator
pub struct FakeData<R: Rng> {
    rng: R,
}

impl<R: Rng> FakeData<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }

    /// Direct access to the RNG for sampling
    pub fn rng(&mut self) -> &mut R {
        &mut self.rng
    }

    /// Full person name
    pub fn person_name(&mut self) -> String {
        Name().fake_with_rng(&mut self.rng)
    }

    /// Sentence with exactly `words` words
    pub fn sentence(&mut self, words: usize) -> String {
        Sentence(words..words + 1).fake_with_rng(&mut self.rng)
    }

    pub fn company(&mut self) -> String {
        CompanyName().fake_with_rng(&mut self.rng)
    }

    pub fn city(&mut self) -> String {
        CityName().fake_with_rng(&mut self.rng)
    }

    pub fn state(&mut self) -> String {
        StateName().fake_with_rng(&mut self.rng)
    }

    pub fn user_agent(&mut self) -> String {
        UserAgent().fake_with_rng(&mut self.rng)
    }

    pub fn genre(&mut self) -> Genre {
        Genre::ALL[self.rng.random_range(0..Genre::ALL.len())]
    }

    pub fn gender(&mut self) -> Gender {
        Gender::ALL[self.rng.random_range(0..Gender::ALL.len())]
    }

    /// Uniform integer in an inclusive range
    pub fn int(&mut self, range: RangeInclusive<i64>) -> i64 {
        self.rng.random_range(range)
    }

    /// Fair coin
    pub fn coin(&mut self) -> bool {
        self.rng.random_bool(0.5)
    }

    /// Pick one element of a non-empty slice
    pub fn pick<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> {
        if items.is_empty() {
            return None;
        }
        Some(&items[self.rng.random_range(0..items.len())])
    }

    /// Uniform date in `[earliest, latest]`
    pub fn date_between(&mut self, earliest: NaiveDate, latest: NaiveDate) -> NaiveDate {
        let span = (latest - earliest).num_days().max(0);
        let offset = self.rng.random_range(0..=span);
        earliest + chrono::Duration::days(offset)
    }

    /// Date of birth for someone aged between `min_age` and `max_age` years on `today`
    pub fn date_of_birth(&mut self, today: NaiveDate, min_age: u32, max_age: u32) -> NaiveDate {
        let (earliest, latest) = birth_window(today, min_age, max_age);
        self.date_between(earliest, latest)
    }

    /// Uniform time of day with second precision
    pub fn time_of_day(&mut self) -> NaiveTime {
        let secs = self.rng.random_range(0..86_400u32);
        NaiveTime::from_num_seconds_from_midnight_opt(secs, 0).unwrap_or(NaiveTime::MIN)
    }
}

/// Earliest and latest birth dates for an age range on `today`
pub fn birth_window(today: NaiveDate, min_age: u32, max_age: u32) -> (NaiveDate, NaiveDate) {
    let earliest = today
        .checked_sub_months(Months::new(12 * max_age))
        .unwrap_or(NaiveDate::MIN);
    let latest = today
        .checked_sub_months(Months::new(12 * min_age))
        .unwrap_or(today);
    (earliest, latest)
}

/// Truncate to at most `max_chars` characters without splitting a character
pub fn truncate_chars(s: &str, max_chars: usize) -> String {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => s[..idx].to_string(),
        None => s.to_string(),
    }
}
