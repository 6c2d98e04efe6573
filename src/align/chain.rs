//! Monotone chain over matched pairs
//!
//! A pair is in order when it belongs to every longest chain that is increasing
//! in both A and B. Pairs that only belong to some of the longest chains (two
//! swapped neighbours, say) are ambiguous and get reported as moves on both
//! sides, which keeps the result symmetric when A and B are swapped.

use super::MatchedPair;

/// Length of the longest strictly increasing run ending at each position
fn lis_lengths(values: &[usize]) -> Vec<usize> {
    let mut tails: Vec<usize> = Vec::new();
    let mut lengths = Vec::with_capacity(values.len());
    for &v in values {
        let pos = tails.partition_point(|&t| t < v);
        if pos == tails.len() {
            tails.push(v);
        } else {
            tails[pos] = v;
        }
        lengths.push(pos + 1);
    }
    lengths
}

/// Flags for pairs that sit on every longest chain. Input must be sorted by `a`.
pub fn essential_chain(pairs: &[MatchedPair]) -> Vec<bool> {
    let n = pairs.len();
    if n == 0 {
        return Vec::new();
    }

    let b_values: Vec<usize> = pairs.iter().map(|p| p.b).collect();
    let ending = lis_lengths(&b_values);

    // Longest chain starting at i = longest decreasing run in the reversed sequence
    let reversed: Vec<usize> = b_values.iter().rev().map(|&b| usize::MAX - b).collect();
    let mut starting = lis_lengths(&reversed);
    starting.reverse();

    let longest = ending.iter().copied().max().unwrap_or(0);
    let on_some: Vec<bool> = (0..n)
        .map(|i| ending[i] + starting[i] - 1 == longest)
        .collect();

    let mut per_level = vec![0usize; longest + 1];
    for i in 0..n {
        if on_some[i] {
            per_level[ending[i]] += 1;
        }
    }

    (0..n)
        .map(|i| on_some[i] && per_level[ending[i]] == 1)
        .collect()
}

/// Sort pairs by A and set `in_order` / `moved`
///
/// An off-chain pair is moved when its B index differs from the position the
/// nearest preceding chain anchor predicts by more than `tolerance`.
pub fn classify(pairs: &mut [MatchedPair], tolerance: usize) {
    pairs.sort_by_key(|p| p.a);
    let essential = essential_chain(pairs);

    let mut anchor: Option<(usize, usize)> = None;
    for (pair, on_chain) in pairs.iter_mut().zip(essential) {
        if on_chain {
            pair.in_order = true;
            pair.moved = false;
            anchor = Some((pair.a, pair.b));
            continue;
        }

        let predicted = match anchor {
            Some((a, b)) => b + (pair.a - a),
            None => pair.a,
        };
        let displacement = pair.b.abs_diff(predicted);
        pair.in_order = false;
        pair.moved = displacement > tolerance;
    }
}
