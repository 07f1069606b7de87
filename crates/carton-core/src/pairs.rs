//! Ordered key/value attribute lists
//!
//! Component inputs, outputs and environment variables are stored as lists of
//! `{"key": .., "value": ..}` pairs. Keys are not unique at the type level;
//! lookups treat the list as a map and return the first match.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::codec::{self, DecodeReport};
use crate::error::Result;

/// A single attribute
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Pair {
    pub key: String,
    pub value: String,
}

impl Pair {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }

    /// Stored string form of this pair
    pub fn encode(&self) -> Result<String> {
        codec::encode(self)
    }

    /// Parse a stored pair string
    pub fn decode(raw: &str) -> Result<Self> {
        codec::decode("pair", raw)
    }
}

/// Ordered list of attributes
///
/// Insertion order is kept so that re-encoding a decoded list yields the
/// same column value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Pairs(Vec<Pair>);

impl Pairs {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Pair> {
        self.0.iter()
    }

    pub fn push(&mut self, pair: Pair) {
        self.0.push(pair);
    }

    /// Value of the first pair with `key`, or `""` when absent
    pub fn matching(&self, key: &str) -> &str {
        self.0
            .iter()
            .find(|p| p.key == key)
            .map(|p| p.value.as_str())
            .unwrap_or("")
    }

    /// Number of pairs carrying `key`
    pub fn count_of(&self, key: &str) -> usize {
        self.0.iter().filter(|p| p.key == key).count()
    }

    /// Flatten into a key-unique map; later duplicates overwrite earlier ones
    pub fn to_map(&self) -> BTreeMap<String, String> {
        self.0
            .iter()
            .map(|p| (p.key.clone(), p.value.clone()))
            .collect()
    }

    /// Replace every pair whose key appears in `updates`
    ///
    /// For each key, all existing pairs with that key are removed and one
    /// pair per value is inserted where the first removed pair was, or
    /// appended when the key was absent. Applying the same updates twice
    /// leaves the list unchanged after the first application.
    pub fn nuke_and_set(&mut self, updates: &BTreeMap<String, Vec<String>>) {
        for (key, values) in updates {
            let at = self.0.iter().position(|p| &p.key == key);
            self.0.retain(|p| &p.key != key);
            let at = at.unwrap_or(self.0.len());
            let fresh = values.iter().map(|v| Pair::new(key.clone(), v.clone()));
            self.0.splice(at..at, fresh);
        }
    }

    /// Encode every pair for persistence
    pub fn to_encoded(&self) -> Result<Vec<String>> {
        codec::encode_each(&self.0)
    }

    /// Decode a stored list column, skipping malformed entries
    pub fn decode(field: &str, raw: &[String], report: &mut DecodeReport) -> Self {
        Self(codec::decode_each(field, raw, report))
    }
}

impl FromIterator<Pair> for Pairs {
    fn from_iter<I: IntoIterator<Item = Pair>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a Pairs {
    type Item = &'a Pair;
    type IntoIter = std::slice::Iter<'a, Pair>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl From<Vec<Pair>> for Pairs {
    fn from(pairs: Vec<Pair>) -> Self {
        Self(pairs)
    }
}
