//! Hashing utilities for identity keys

use blake3::Hasher;
use std::collections::HashMap;

/// A hash value represented as a hex string
pub type HashValue = String;

/// Hash computer for unit, row and column identities
#[derive(Debug, Clone, Copy, Default)]
pub struct HashComputer;

impl HashComputer {
    pub fn new() -> Self {
        Self
    }

    /// Compute hash for a single value
    pub fn hash_value(&self, value: &str) -> HashValue {
        let mut hasher = Hasher::new();
        hasher.update(value.as_bytes());
        hasher.finalize().to_hex().to_string()
    }

    /// Compute hash for multiple values (e.g., a row); order matters
    pub fn hash_values<S: AsRef<str>>(&self, values: &[S]) -> HashValue {
        let mut hasher = Hasher::new();
        for value in values {
            hasher.update(value.as_ref().as_bytes());
            hasher.update(b"|"); // Separator to avoid hash collisions
        }
        hasher.finalize().to_hex().to_string()
    }

    /// Compute an order-independent hash over a multiset of values
    pub fn hash_multiset<S: AsRef<str>>(&self, values: &[S]) -> HashValue {
        let mut sorted: Vec<&str> = values.iter().map(|v| v.as_ref()).collect();
        sorted.sort_unstable();
        self.hash_values(&sorted)
    }
}

/// Shorthand for `HashComputer::new().hash_value(..)`
pub fn hash_value(value: &str) -> HashValue {
    HashComputer.hash_value(value)
}

/// Duplicate statistics of a list of identity keys, logged by the aligner
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyQuality {
    pub total: usize,
    pub unique: usize,
}

impl KeyQuality {
    pub fn from_keys<S: AsRef<str>>(keys: &[S]) -> Self {
        let mut counts: HashMap<&str, usize> = HashMap::new();
        for key in keys {
            *counts.entry(key.as_ref()).or_insert(0) += 1;
        }
        Self {
            total: keys.len(),
            unique: counts.len(),
        }
    }

    pub fn duplicates(&self) -> usize {
        self.total.saturating_sub(self.unique)
    }
}
