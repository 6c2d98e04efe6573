//! Fuzzy phase: similarity-weighted longest common subsequence

use super::{Alignable, MatchedPair};
use crate::config::CompareConfig;
use log::debug;

const EPSILON: f64 = 1e-9;

#[derive(Debug, Clone, Copy, Default)]
struct Score {
    weight: f64,
    displacement: f64,
}

impl Score {
    /// Higher total similarity wins; equal similarity prefers less displacement
    fn better_than(&self, other: &Score) -> bool {
        if (self.weight - other.weight).abs() > EPSILON {
            self.weight > other.weight
        } else {
            self.displacement + EPSILON < other.displacement
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    SkipA,
    SkipB,
    Match,
}

/// Align the candidate indices `a_idx` / `b_idx` (each ascending) with a
/// weighted LCS. Only pairs scoring at least the threshold can match.
/// Returns an empty list when the DP table would exceed `max_fuzzy_cells`.
pub fn match_fuzzy<T: Alignable>(
    a: &[T],
    b: &[T],
    a_idx: &[usize],
    b_idx: &[usize],
    config: &CompareConfig,
) -> Vec<MatchedPair> {
    let n = a_idx.len();
    let m = b_idx.len();
    if n == 0 || m == 0 {
        return Vec::new();
    }
    if n.saturating_mul(m) > config.max_fuzzy_cells {
        debug!(
            "Skipping fuzzy phase: {} x {} candidates exceed the limit of {}",
            n, m, config.max_fuzzy_cells
        );
        return Vec::new();
    }

    let threshold = config.similarity_threshold;
    let mut sim = vec![0.0f64; n * m];
    for (i, &ia) in a_idx.iter().enumerate() {
        for (j, &jb) in b_idx.iter().enumerate() {
            sim[i * m + j] = a[ia].similarity(&b[jb]);
        }
    }

    let width = m + 1;
    let mut score = vec![Score::default(); (n + 1) * width];
    let mut steps = vec![Step::SkipA; n * m];

    for i in (0..n).rev() {
        for j in (0..m).rev() {
            let mut best = score[(i + 1) * width + j];
            let mut step = Step::SkipA;

            let skip_b = score[i * width + j + 1];
            if skip_b.better_than(&best) {
                best = skip_b;
                step = Step::SkipB;
            }

            let s = sim[i * m + j];
            if s >= threshold && a[a_idx[i]].can_pair(&b[b_idx[j]]) {
                let (ia, jb) = (a_idx[i], b_idx[j]);
                let rest = score[(i + 1) * width + j + 1];
                let candidate = Score {
                    weight: rest.weight + s,
                    displacement: rest.displacement
                        + ia.abs_diff(jb) as f64
                        + a[ia].spatial_offset(&b[jb]),
                };
                if !best.better_than(&candidate) {
                    best = candidate;
                    step = Step::Match;
                }
            }

            score[i * width + j] = best;
            steps[i * m + j] = step;
        }
    }

    let mut pairs = Vec::new();
    let (mut i, mut j) = (0, 0);
    while i < n && j < m {
        match steps[i * m + j] {
            Step::Match => {
                pairs.push(MatchedPair::new(a_idx[i], b_idx[j], sim[i * m + j]));
                i += 1;
                j += 1;
            }
            Step::SkipA => i += 1,
            Step::SkipB => j += 1,
        }
    }
    pairs
}
