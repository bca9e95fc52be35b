//! Typed primary-key sets passed from one phase to the next.

use rand::Rng;
use std::fmt;
use std::marker::PhantomData;

/// Rows of `date_dim`
pub enum DateDim {}
/// Rows of `director_dim`
pub enum Director {}
/// Rows of `star_dim`
pub enum Star {}
/// Rows of `movie_dim`
pub enum Movie {}
/// Rows of `cinema_dim`
pub enum Cinema {}
/// Rows of `promotion_dim`
pub enum Promotion {}
/// Rows of `online_transaction_dim`
pub enum OnlineTransaction {}
/// Rows of `customer_dim`
pub enum Customer {}

/// Primary keys of one dimension, in insertion order
pub struct KeySet<T> {
    ids: Vec<i64>,
    _kind: PhantomData<fn() -> T>,
}

impl<T> KeySet<T> {
    pub fn new() -> Self {
        Self::from_ids(Vec::new())
    }

    pub fn from_ids(ids: Vec<i64>) -> Self {
        Self {
            ids,
            _kind: PhantomData,
        }
    }

    pub fn push(&mut self, id: i64) {
        self.ids.push(id);
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn ids(&self) -> &[i64] {
        &self.ids
    }

    pub fn get(&self, index: usize) -> Option<i64> {
        self.ids.get(index).copied()
    }

    pub fn contains(&self, id: i64) -> bool {
        self.ids.contains(&id)
    }

    /// Uniformly pick one key, with replacement
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<i64> {
        if self.ids.is_empty() {
            return None;
        }
        Some(self.ids[rng.random_range(0..self.ids.len())])
    }
}

impl<T> Default for KeySet<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for KeySet<T> {
    fn clone(&self) -> Self {
        Self::from_ids(self.ids.clone())
    }
}

impl<T> fmt::Debug for KeySet<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeySet").field("len", &self.ids.len()).finish()
    }
}

/// Keys of a dimension together with the display name stored for each
pub struct NamedKeySet<T> {
    keys: KeySet<T>,
    names: Vec<String>,
}

impl<T> NamedKeySet<T> {
    pub fn new() -> Self {
        Self {
            keys: KeySet::new(),
            names: Vec::new(),
        }
    }

    pub fn push(&mut self, id: i64, name: String) {
        self.keys.push(id);
        self.names.push(name);
    }

    pub fn keys(&self) -> &KeySet<T> {
        &self.keys
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Key and name of the row at `index`
    pub fn entry(&self, index: usize) -> Option<(i64, &str)> {
        let id = self.keys.get(index)?;
        Some((id, self.names[index].as_str()))
    }
}

impl<T> Default for NamedKeySet<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for NamedKeySet<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NamedKeySet")
            .field("len", &self.keys.len())
            .finish()
    }
}
