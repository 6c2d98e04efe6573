//! Exact-key phase

use super::{Alignable, MatchedPair};
use crate::hash::KeyQuality;
use log::debug;
use std::collections::{HashMap, VecDeque};

/// Match units with identical identity keys. Duplicate keys pair up
/// first-to-first in document order; surplus duplicates stay unmatched.
pub fn match_exact<T: Alignable>(a: &[T], b: &[T]) -> Vec<MatchedPair> {
    let b_keys: Vec<String> = b.iter().map(|u| u.identity_key()).collect();

    let quality = KeyQuality::from_keys(&b_keys);
    if quality.duplicates() > 0 {
        debug!(
            "{} of {} identity keys are duplicates",
            quality.duplicates(),
            quality.total
        );
    }

    let mut lookup: HashMap<String, VecDeque<usize>> = HashMap::with_capacity(b_keys.len());
    for (j, key) in b_keys.into_iter().enumerate() {
        lookup.entry(key).or_default().push_back(j);
    }

    let mut pairs = Vec::new();
    for (i, unit) in a.iter().enumerate() {
        if let Some(queue) = lookup.get_mut(&unit.identity_key()) {
            if let Some(j) = queue.pop_front() {
                pairs.push(MatchedPair::new(i, j, 1.0));
            }
        }
    }
    pairs
}
