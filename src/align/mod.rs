//! Alignment engine: decides which unit in A corresponds to which unit in B
//!
//! Alignment runs in three steps over the units of one section:
//! exact identity-key matching, similarity-weighted LCS over whatever is left,
//! and a longest increasing chain that separates in-order pairs from moves.

pub mod chain;
pub mod exact;
pub mod fuzzy;
pub mod sections;

use crate::config::CompareConfig;
use log::debug;
use serde::Serialize;

/// Capabilities the aligner needs from anything it aligns
pub trait Alignable {
    /// Exact identity; equal keys on both sides are matched without scoring
    fn identity_key(&self) -> String;

    /// Normalized content used for similarity scoring
    fn content_signature(&self) -> String;

    /// Similarity in `[0, 1]`, symmetric
    fn similarity(&self, other: &Self) -> f64;

    /// Geometric distance mapped into `[0, 1)`, used only to break ties
    fn spatial_offset(&self, _other: &Self) -> f64 {
        0.0
    }

    /// Whether the two may be paired at all; identities that exclude each
    /// other (different record keys) never pair, whatever their similarity
    fn can_pair(&self, _other: &Self) -> bool {
        true
    }
}

/// One correspondence between a unit of A and a unit of B
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MatchedPair {
    pub a: usize,
    pub b: usize,
    pub confidence: f64,
    /// Part of every longest monotone chain
    pub in_order: bool,
    /// Off the chain and displaced beyond tolerance
    pub moved: bool,
}

impl MatchedPair {
    pub fn new(a: usize, b: usize, confidence: f64) -> Self {
        Self {
            a,
            b,
            confidence,
            in_order: true,
            moved: false,
        }
    }
}

/// Partial injection between the units of A and B
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Alignment {
    /// Sorted by `a`
    pub pairs: Vec<MatchedPair>,
    /// Unmatched A indices, ascending
    pub removed: Vec<usize>,
    /// Unmatched B indices, ascending
    pub added: Vec<usize>,
}

impl Alignment {
    /// Alignment for a section that only exists in A
    pub fn all_removed(len_a: usize) -> Self {
        Self {
            pairs: Vec::new(),
            removed: (0..len_a).collect(),
            added: Vec::new(),
        }
    }

    /// Alignment for a section that only exists in B
    pub fn all_added(len_b: usize) -> Self {
        Self {
            pairs: Vec::new(),
            removed: Vec::new(),
            added: (0..len_b).collect(),
        }
    }

    fn from_pairs(mut pairs: Vec<MatchedPair>, len_a: usize, len_b: usize) -> Self {
        pairs.sort_by_key(|p| p.a);
        let mut a_used = vec![false; len_a];
        let mut b_used = vec![false; len_b];
        for pair in &pairs {
            a_used[pair.a] = true;
            b_used[pair.b] = true;
        }
        Self {
            pairs,
            removed: unused_indices(&a_used),
            added: unused_indices(&b_used),
        }
    }

    pub fn moved_count(&self) -> usize {
        self.pairs.iter().filter(|p| p.moved).count()
    }

    /// Pair leftovers that sit in the same gap between two in-order anchors
    /// when both sides of the gap hold the same number of them.
    ///
    /// A grid row or column that did not move keeps its identity even when its
    /// content changed beyond the similarity threshold.
    pub fn pair_in_place<T: Alignable>(&mut self, a: &[T], b: &[T]) {
        if self.removed.is_empty() || self.added.is_empty() {
            return;
        }

        let anchors: Vec<(usize, usize)> = self
            .pairs
            .iter()
            .filter(|p| p.in_order)
            .map(|p| (p.a, p.b))
            .collect();

        let mut new_pairs = Vec::new();
        for (a_range, b_range) in gaps(&anchors) {
            let gap_a: Vec<usize> = self
                .removed
                .iter()
                .copied()
                .filter(|i| a_range.0 <= *i && *i < a_range.1)
                .collect();
            let gap_b: Vec<usize> = self
                .added
                .iter()
                .copied()
                .filter(|j| b_range.0 <= *j && *j < b_range.1)
                .collect();
            if gap_a.is_empty() || gap_a.len() != gap_b.len() {
                continue;
            }
            for (i, j) in gap_a.into_iter().zip(gap_b) {
                if a[i].can_pair(&b[j]) {
                    new_pairs.push(MatchedPair::new(i, j, a[i].similarity(&b[j])));
                }
            }
        }

        if new_pairs.is_empty() {
            return;
        }
        debug!("Paired {} leftover units in place", new_pairs.len());

        let mut pairs = std::mem::take(&mut self.pairs);
        pairs.extend(new_pairs);
        *self = Alignment::from_pairs(pairs, a.len(), b.len());
    }
}

fn unused_indices(used: &[bool]) -> Vec<usize> {
    used.iter()
        .enumerate()
        .filter(|(_, u)| !**u)
        .map(|(i, _)| i)
        .collect()
}

/// Half-open index ranges on both sides between consecutive anchors, including
/// the head before the first anchor and the tail after the last one.
pub(crate) fn gaps(anchors: &[(usize, usize)]) -> Vec<((usize, usize), (usize, usize))> {
    let mut result = Vec::with_capacity(anchors.len() + 1);
    let mut prev_a = 0;
    let mut prev_b = 0;
    for &(a, b) in anchors {
        result.push(((prev_a, a), (prev_b, b)));
        prev_a = a + 1;
        prev_b = b + 1;
    }
    result.push(((prev_a, usize::MAX), (prev_b, usize::MAX)));
    result
}

/// Align two unit sequences
///
/// Exact keys match first (duplicates first-to-first), then leftovers inside
/// each gap of the exact chain go through the fuzzy matcher, then whatever is
/// still unmatched gets one global fuzzy pass so that moved-and-edited units
/// can be found. Finally the chain step classifies every pair.
pub fn align_units<T: Alignable>(a: &[T], b: &[T], config: &CompareConfig) -> Alignment {
    if a.is_empty() || b.is_empty() {
        return Alignment::from_pairs(Vec::new(), a.len(), b.len());
    }

    let mut pairs = exact::match_exact(a, b);
    let exact_count = pairs.len();

    let mut a_used = vec![false; a.len()];
    let mut b_used = vec![false; b.len()];
    for pair in &pairs {
        a_used[pair.a] = true;
        b_used[pair.b] = true;
    }

    if exact_count < a.len() && exact_count < b.len() {
        // Gap-local pass, anchored on the in-order exact matches
        chain::classify(&mut pairs, 0);
        let anchors: Vec<(usize, usize)> = pairs
            .iter()
            .filter(|p| p.in_order)
            .map(|p| (p.a, p.b))
            .collect();

        for (a_range, b_range) in gaps(&anchors) {
            let gap_a: Vec<usize> = (a_range.0..a_range.1.min(a.len()))
                .filter(|&i| !a_used[i])
                .collect();
            let gap_b: Vec<usize> = (b_range.0..b_range.1.min(b.len()))
                .filter(|&j| !b_used[j])
                .collect();
            let found = fuzzy::match_fuzzy(a, b, &gap_a, &gap_b, config);
            for pair in found {
                a_used[pair.a] = true;
                b_used[pair.b] = true;
                pairs.push(pair);
            }
        }

        // Global pass for units that left their gap
        let rest_a: Vec<usize> = (0..a.len()).filter(|&i| !a_used[i]).collect();
        let rest_b: Vec<usize> = (0..b.len()).filter(|&j| !b_used[j]).collect();
        pairs.extend(fuzzy::match_fuzzy(a, b, &rest_a, &rest_b, config));
    }

    chain::classify(&mut pairs, config.move_tolerance);
    let alignment = Alignment::from_pairs(pairs, a.len(), b.len());

    debug!(
        "Aligned {} x {} units: {} exact, {} fuzzy, {} moved, {} removed, {} added",
        a.len(),
        b.len(),
        exact_count,
        alignment.pairs.len() - exact_count,
        alignment.moved_count(),
        alignment.removed.len(),
        alignment.added.len()
    );

    alignment
}
