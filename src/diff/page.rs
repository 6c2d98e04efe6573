//! Block diff for one pair of pages

use super::DiffEntry;
use crate::align::align_units;
use crate::config::CompareConfig;
use crate::model::{Section, Unit};
use log::debug;

/// A block counts as moved only when it left the reading chain and its box
/// shifted by more than one font size
fn displaced(a: &Unit, b: &Unit) -> bool {
    match (a.as_block(), b.as_block()) {
        (Some(a), Some(b)) => a.bbox.center_distance(&b.bbox) > b.style.size.max(1.0),
        _ => true,
    }
}

/// Diff two versions of one page; `name` labels the entries
pub fn diff_page(name: &str, a: &Section, b: &Section, config: &CompareConfig) -> Vec<DiffEntry> {
    let units_a = a.units();
    let units_b = b.units();
    let alignment = align_units(units_a, units_b, config);

    debug!(
        "{}: {} blocks matched, {} moved, {} removed, {} added",
        name,
        alignment.pairs.len(),
        alignment.moved_count(),
        alignment.removed.len(),
        alignment.added.len()
    );

    // B order for everything that exists in B, then removed blocks in A order
    let mut keyed: Vec<((u8, usize), DiffEntry)> = Vec::with_capacity(units_a.len().max(units_b.len()));
    for pair in &alignment.pairs {
        let (unit_a, unit_b) = (&units_a[pair.a], &units_b[pair.b]);
        let moved = pair.moved && displaced(unit_a, unit_b);
        keyed.push((
            (0, pair.b),
            DiffEntry::matched(name, unit_a, unit_b, moved, pair.confidence),
        ));
    }
    for &j in &alignment.added {
        keyed.push(((0, j), DiffEntry::added(name, &units_b[j])));
    }
    for &i in &alignment.removed {
        keyed.push(((1, i), DiffEntry::removed(name, &units_a[i])));
    }

    keyed.sort_by_key(|(key, _)| *key);
    keyed.into_iter().map(|(_, entry)| entry).collect()
}
