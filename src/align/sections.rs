//! Section pairing: sheets by name, pages by index

use crate::align::Alignable;
use crate::config::CompareConfig;
use crate::model::{Document, DocumentKind, Section};
use crate::similarity::multiset_jaccard;
use log::debug;
use std::collections::HashMap;

/// A section of A and/or a section of B that are compared with each other
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SectionPair {
    pub a: Option<usize>,
    pub b: Option<usize>,
}

impl SectionPair {
    pub fn is_paired(&self) -> bool {
        self.a.is_some() && self.b.is_some()
    }
}

/// Pair the sections of two documents
///
/// The returned list follows document B, with sections that only exist in A
/// appended in A order.
pub fn pair_sections(a: &Document, b: &Document, config: &CompareConfig) -> Vec<SectionPair> {
    let partner_of_b = match a.kind() {
        DocumentKind::Pdf => pair_by_index(a.sections().len(), b.sections().len()),
        DocumentKind::Spreadsheet => pair_by_name(a.sections(), b.sections(), config),
    };

    let mut a_taken = vec![false; a.sections().len()];
    let mut pairs = Vec::with_capacity(a.sections().len().max(b.sections().len()));
    for (j, partner) in partner_of_b.into_iter().enumerate() {
        if let Some(i) = partner {
            a_taken[i] = true;
        }
        pairs.push(SectionPair {
            a: partner,
            b: Some(j),
        });
    }
    for (i, taken) in a_taken.into_iter().enumerate() {
        if !taken {
            pairs.push(SectionPair { a: Some(i), b: None });
        }
    }
    debug!(
        "Paired {} of {} sections",
        pairs.iter().filter(|p| p.is_paired()).count(),
        pairs.len()
    );
    pairs
}

fn pair_by_index(len_a: usize, len_b: usize) -> Vec<Option<usize>> {
    (0..len_b).map(|j| if j < len_a { Some(j) } else { None }).collect()
}

/// Same name first; each leftover B sheet then takes the unpaired A sheet with
/// the most similar content, if it reaches the threshold.
fn pair_by_name(a: &[Section], b: &[Section], config: &CompareConfig) -> Vec<Option<usize>> {
    let mut by_name: HashMap<&str, usize> = HashMap::new();
    for (i, section) in a.iter().enumerate() {
        by_name.entry(section.name()).or_insert(i);
    }

    let mut a_taken = vec![false; a.len()];
    let mut partner: Vec<Option<usize>> = b
        .iter()
        .map(|section| {
            let i = *by_name.get(section.name())?;
            if a_taken[i] {
                return None;
            }
            a_taken[i] = true;
            Some(i)
        })
        .collect();

    for j in 0..b.len() {
        if partner[j].is_some() {
            continue;
        }
        let mut best: Option<(usize, f64)> = None;
        for i in (0..a.len()).filter(|&i| !a_taken[i]) {
            let score = content_similarity(&a[i], &b[j]);
            if score >= config.similarity_threshold && best.map_or(true, |(_, s)| score > s) {
                best = Some((i, score));
            }
        }
        if let Some((i, score)) = best {
            debug!(
                "Pairing sheet '{}' with '{}' as a rename ({:.2})",
                a[i].name(),
                b[j].name(),
                score
            );
            a_taken[i] = true;
            partner[j] = Some(i);
        }
    }
    partner
}

fn content_similarity(a: &Section, b: &Section) -> f64 {
    let sig_a: Vec<String> = a.units().iter().map(|u| u.content_signature()).collect();
    let sig_b: Vec<String> = b.units().iter().map(|u| u.content_signature()).collect();
    multiset_jaccard(&sig_a, &sig_b)
}
