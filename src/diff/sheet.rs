//! Grid diff for one pair of sheets
//!
//! Columns are aligned first, then rows (whose identity depends on the column
//! mapping), and finally cells are paired through the two mappings.

use super::DiffEntry;
use crate::align::{align_units, Alignable, Alignment};
use crate::config::CompareConfig;
use crate::hash::HashComputer;
use crate::model::{Cell, CellValue, Section, Unit};
use crate::similarity::{multiset_jaccard, normalize_header, normalized_edit_similarity};
use log::debug;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

/// Row/column index over the cells of one sheet
struct Grid<'a> {
    units: &'a [Unit],
    rows: Vec<u32>,
    cols: Vec<u32>,
    row_cells: BTreeMap<u32, Vec<usize>>,
    col_cells: BTreeMap<u32, Vec<usize>>,
    by_coord: HashMap<(u32, u32), usize>,
}

impl<'a> Grid<'a> {
    fn new(section: &'a Section) -> Self {
        let units = section.units();
        let mut row_cells: BTreeMap<u32, Vec<usize>> = BTreeMap::new();
        let mut col_cells: BTreeMap<u32, Vec<usize>> = BTreeMap::new();
        let mut by_coord = HashMap::with_capacity(units.len());

        for (idx, unit) in units.iter().enumerate() {
            if let Some(cell) = unit.as_cell() {
                row_cells.entry(cell.row).or_default().push(idx);
                col_cells.entry(cell.col).or_default().push(idx);
                by_coord.insert((cell.row, cell.col), idx);
            }
        }
        for indices in row_cells.values_mut() {
            indices.sort_by_key(|&i| units[i].as_cell().map_or(0, |c| c.col));
        }
        for indices in col_cells.values_mut() {
            indices.sort_by_key(|&i| units[i].as_cell().map_or(0, |c| c.row));
        }

        Self {
            units,
            rows: row_cells.keys().copied().collect(),
            cols: col_cells.keys().copied().collect(),
            row_cells,
            col_cells,
            by_coord,
        }
    }

    fn cell(&self, idx: usize) -> Option<&'a Cell> {
        self.units.get(idx).and_then(Unit::as_cell)
    }

    fn signature(&self, idx: usize) -> String {
        self.units[idx].content_signature()
    }

    /// Locate the header row holding `key`: top rows first, then the row with
    /// the most text cells, then the smallest row and column.
    fn locate_header(&self, key: &str, search_rows: u32) -> Option<(u32, u32)> {
        let wanted = normalize_header(key);
        let mut text_per_row: HashMap<u32, usize> = HashMap::new();
        for unit in self.units {
            if let Some(Cell {
                row,
                value: CellValue::Text(_),
                ..
            }) = unit.as_cell()
            {
                *text_per_row.entry(*row).or_insert(0) += 1;
            }
        }

        self.units
            .iter()
            .filter_map(Unit::as_cell)
            .filter(|cell| match &cell.value {
                CellValue::Text(text) => normalize_header(text) == wanted,
                _ => false,
            })
            .min_by_key(|cell| {
                let texts = text_per_row.get(&cell.row).copied().unwrap_or(0);
                (cell.row >= search_rows, std::cmp::Reverse(texts), cell.row, cell.col)
            })
            .map(|cell| (cell.row, cell.col))
    }
}

struct ColumnView {
    identity: String,
    values: Vec<String>,
    header: Option<String>,
    header_weight: f64,
}

impl Alignable for ColumnView {
    fn identity_key(&self) -> String {
        self.identity.clone()
    }

    fn content_signature(&self) -> String {
        self.values.join("|")
    }

    fn similarity(&self, other: &Self) -> f64 {
        let content = multiset_jaccard(&self.values, &other.values);
        match (&self.header, &other.header) {
            (Some(a), Some(b)) => {
                self.header_weight * normalized_edit_similarity(a, b)
                    + (1.0 - self.header_weight) * content
            }
            _ => content,
        }
    }
}

fn column_views(grid: &Grid, header_row: Option<u32>, config: &CompareConfig) -> Vec<ColumnView> {
    let hasher = HashComputer::new();
    grid.cols
        .iter()
        .map(|col| {
            let values: Vec<String> = grid.col_cells[col].iter().map(|&i| grid.signature(i)).collect();
            let header = header_row.and_then(|row| {
                let idx = *grid.by_coord.get(&(row, *col))?;
                Some(normalize_header(&grid.units[idx].content_signature()))
            });
            ColumnView {
                identity: hasher.hash_multiset(&values),
                values,
                header,
                header_weight: config.header_name_weight,
            }
        })
        .collect()
}

struct RowView {
    identity: String,
    /// Normalized record key when rows are keyed
    key: Option<String>,
    /// Aligned column id → cell signature, matched columns only
    cells: BTreeMap<usize, String>,
}

impl Alignable for RowView {
    fn identity_key(&self) -> String {
        self.identity.clone()
    }

    fn content_signature(&self) -> String {
        self.cells.values().cloned().collect::<Vec<_>>().join("|")
    }

    /// Mean edit similarity over the aligned columns of either row; a cell
    /// present on one side only scores 0
    fn similarity(&self, other: &Self) -> f64 {
        if !self.can_pair(other) {
            return 0.0;
        }
        let keys: BTreeSet<usize> = self.cells.keys().chain(other.cells.keys()).copied().collect();
        if keys.is_empty() {
            return 0.0;
        }
        let total: f64 = keys
            .iter()
            .map(|k| match (self.cells.get(k), other.cells.get(k)) {
                (Some(x), Some(y)) => normalized_edit_similarity(x, y),
                _ => 0.0,
            })
            .sum();
        total / keys.len() as f64
    }

    fn can_pair(&self, other: &Self) -> bool {
        match (&self.key, &other.key) {
            (Some(a), Some(b)) => a == b,
            _ => true,
        }
    }
}

/// Which side a grid sits on; rows made only of unmatched columns must not
/// collide across sides
#[derive(Clone, Copy)]
enum Side {
    A,
    B,
}

struct KeyColumn {
    header_row: u32,
    col: u32,
}

fn row_views(
    grid: &Grid,
    side: Side,
    column_ids: &HashMap<u32, usize>,
    key: Option<&KeyColumn>,
) -> Vec<RowView> {
    let hasher = HashComputer::new();
    grid.rows
        .iter()
        .map(|row| {
            let cells: BTreeMap<usize, String> = grid.row_cells[row]
                .iter()
                .filter_map(|&i| {
                    let cell = grid.cell(i)?;
                    let id = *column_ids.get(&cell.col)?;
                    Some((id, grid.signature(i)))
                })
                .collect();

            let key_value = key.and_then(|k| {
                if *row <= k.header_row {
                    return None;
                }
                let idx = *grid.by_coord.get(&(*row, k.col))?;
                let value = normalize_header(&grid.units[idx].content_signature());
                (!value.is_empty()).then_some(value)
            });

            let identity = match &key_value {
                Some(value) => format!("key:{}", value),
                None if cells.is_empty() => match side {
                    Side::A => format!("a-only:{}", row),
                    Side::B => format!("b-only:{}", row),
                },
                None => {
                    let parts: Vec<String> = cells.iter().map(|(id, sig)| format!("{}={}", id, sig)).collect();
                    hasher.hash_values(&parts)
                }
            };
            RowView {
                identity,
                key: key_value,
                cells,
            }
        })
        .collect()
}

/// Diff two versions of one sheet; `name` labels the entries
pub fn diff_sheet(name: &str, a: &Section, b: &Section, config: &CompareConfig) -> Vec<DiffEntry> {
    let grid_a = Grid::new(a);
    let grid_b = Grid::new(b);

    let (key_a, key_b) = match &config.key_header {
        Some(key) => {
            let ka = grid_a.locate_header(key, config.header_search_rows);
            let kb = grid_b.locate_header(key, config.header_search_rows);
            if ka.is_none() || kb.is_none() {
                debug!("Key header '{}' not found on both sides of '{}'", key, name);
            }
            (
                ka.map(|(header_row, col)| KeyColumn { header_row, col }),
                kb.map(|(header_row, col)| KeyColumn { header_row, col }),
            )
        }
        None => (None, None),
    };
    // Keyed identity only makes sense when both sides have the key column
    let (key_a, key_b) = match (key_a, key_b) {
        (Some(ka), Some(kb)) => (Some(ka), Some(kb)),
        _ => (None, None),
    };

    let cols_a = column_views(&grid_a, key_a.as_ref().map(|k| k.header_row), config);
    let cols_b = column_views(&grid_b, key_b.as_ref().map(|k| k.header_row), config);
    let mut col_alignment = align_units(&cols_a, &cols_b, config);
    col_alignment.pair_in_place(&cols_a, &cols_b);

    let mut ids_a: HashMap<u32, usize> = HashMap::new();
    let mut ids_b: HashMap<u32, usize> = HashMap::new();
    for pair in &col_alignment.pairs {
        ids_a.insert(grid_a.cols[pair.a], pair.a);
        ids_b.insert(grid_b.cols[pair.b], pair.a);
    }

    let rows_a = row_views(&grid_a, Side::A, &ids_a, key_a.as_ref());
    let rows_b = row_views(&grid_b, Side::B, &ids_b, key_b.as_ref());
    let mut row_alignment = align_units(&rows_a, &rows_b, config);
    row_alignment.pair_in_place(&rows_a, &rows_b);

    debug!(
        "Sheet '{}': {} of {} columns and {} of {} rows matched, {} rows moved",
        name,
        col_alignment.pairs.len(),
        cols_a.len().max(cols_b.len()),
        row_alignment.pairs.len(),
        rows_a.len().max(rows_b.len()),
        row_alignment.moved_count()
    );

    pair_cells(name, &grid_a, &grid_b, &col_alignment, &row_alignment)
}

/// Entry with its sort key: B-side entries by B position, then removed ones by A position
type Keyed = ((u8, u32, u32), DiffEntry);

fn pair_cells(
    name: &str,
    grid_a: &Grid,
    grid_b: &Grid,
    cols: &Alignment,
    rows: &Alignment,
) -> Vec<DiffEntry> {
    // A column → (B column, moved, confidence)
    let col_map: HashMap<u32, (u32, bool, f64)> = cols
        .pairs
        .iter()
        .map(|p| (grid_a.cols[p.a], (grid_b.cols[p.b], p.moved, p.confidence)))
        .collect();

    let mut entries: Vec<Keyed> = Vec::new();
    let push_added = |entries: &mut Vec<Keyed>, idx: usize| {
        if let Some(cell) = grid_b.cell(idx) {
            entries.push(((0, cell.row, cell.col), DiffEntry::added(name, &grid_b.units[idx])));
        }
    };

    for pair in &rows.pairs {
        let row_a = grid_a.rows[pair.a];
        let row_b = grid_b.rows[pair.b];
        let mut used_b: HashSet<usize> = HashSet::new();

        for &ia in &grid_a.row_cells[&row_a] {
            let Some(cell_a) = grid_a.cell(ia) else {
                continue;
            };
            let partner = col_map.get(&cell_a.col).and_then(|&(col_b, col_moved, col_conf)| {
                let ib = *grid_b.by_coord.get(&(row_b, col_b))?;
                Some((ib, col_moved, col_conf))
            });

            match partner {
                Some((ib, col_moved, col_conf)) => {
                    used_b.insert(ib);
                    let confidence = if grid_a.signature(ia) == grid_b.signature(ib) {
                        1.0
                    } else {
                        pair.confidence.min(col_conf)
                    };
                    let entry = DiffEntry::matched(
                        name,
                        &grid_a.units[ia],
                        &grid_b.units[ib],
                        pair.moved || col_moved,
                        confidence,
                    );
                    let (row, col) = grid_b.cell(ib).map_or((row_b, 0), |c| (c.row, c.col));
                    entries.push(((0, row, col), entry));
                }
                None => entries.push((
                    (1, cell_a.row, cell_a.col),
                    DiffEntry::removed(name, &grid_a.units[ia]),
                )),
            }
        }

        for &ib in &grid_b.row_cells[&row_b] {
            if !used_b.contains(&ib) {
                push_added(&mut entries, ib);
            }
        }
    }

    for &i in &rows.removed {
        for &ia in &grid_a.row_cells[&grid_a.rows[i]] {
            if let Some(cell) = grid_a.cell(ia) {
                entries.push(((1, cell.row, cell.col), DiffEntry::removed(name, &grid_a.units[ia])));
            }
        }
    }
    for &j in &rows.added {
        for &ib in &grid_b.row_cells[&grid_b.rows[j]] {
            push_added(&mut entries, ib);
        }
    }

    entries.sort_by_key(|(key, _)| *key);
    entries.into_iter().map(|(_, entry)| entry).collect()
}
