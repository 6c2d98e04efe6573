//! String and multiset similarity measures used by the fuzzy aligner

use std::collections::HashMap;

/// Above this many DP cells the edit distance falls back to token overlap
const EDIT_DISTANCE_LIMIT: usize = 1_000_000;

/// Levenshtein distance over chars
pub fn edit_distance(a: &[char], b: &[char]) -> usize {
    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0usize; b.len() + 1];

    for (i, ca) in a.iter().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let cost = if ca == cb { 0 } else { 1 };
            curr[j + 1] = (prev[j] + cost).min(prev[j + 1] + 1).min(curr[j] + 1);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b.len()]
}

/// `1 - distance / max_len`, in `[0, 1]`; two empty strings are identical
pub fn normalized_edit_similarity(a: &str, b: &str) -> f64 {
    if a == b {
        return 1.0;
    }
    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();
    let longest = a_chars.len().max(b_chars.len());
    if longest == 0 {
        return 1.0;
    }

    if a_chars.len().saturating_mul(b_chars.len()) > EDIT_DISTANCE_LIMIT {
        let a_tokens: Vec<&str> = a.split_whitespace().collect();
        let b_tokens: Vec<&str> = b.split_whitespace().collect();
        return multiset_jaccard(&a_tokens, &b_tokens);
    }

    let distance = edit_distance(&a_chars, &b_chars);
    1.0 - distance as f64 / longest as f64
}

/// Multiset Jaccard: sum of min counts over sum of max counts
pub fn multiset_jaccard<S: AsRef<str>>(a: &[S], b: &[S]) -> f64 {
    if a.is_empty() && b.is_empty() {
        return 1.0;
    }

    let mut counts: HashMap<&str, (usize, usize)> = HashMap::new();
    for value in a {
        counts.entry(value.as_ref()).or_insert((0, 0)).0 += 1;
    }
    for value in b {
        counts.entry(value.as_ref()).or_insert((0, 0)).1 += 1;
    }

    let (intersection, union) = counts
        .values()
        .fold((0usize, 0usize), |(i, u), &(ca, cb)| (i + ca.min(cb), u + ca.max(cb)));

    if union == 0 {
        1.0
    } else {
        intersection as f64 / union as f64
    }
}

/// Collapse runs of whitespace into single spaces and trim
pub fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Header normalization: punctuation becomes space, whitespace collapses, case folds
pub fn normalize_header(s: &str) -> String {
    let replaced: String = s
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '_' { c } else { ' ' })
        .collect();
    collapse_whitespace(&replaced).to_lowercase()
}
