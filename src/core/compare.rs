//! Equality strategies between paragraph-level text units.
//!
//! The list-diff engine needs a total order whose `Equal` means "these two
//! units are the same paragraph". Exact comparison is literal content
//! identity (optionally including inline codes); fuzzy comparison declares
//! equality once the Dice coefficient over character trigrams reaches a
//! configured threshold, falling back to the exact ordering below it so
//! the order stays total. Referent units (footnote-style content referenced
//! from elsewhere) never compare equal to non-referent ones; the referent
//! side orders first purely for sort stability.

use std::cmp::Ordering;
use std::collections::BTreeSet;

use crate::core::unit::TextUnit;

/// Trigram size for fuzzy similarity.
const NGRAM_LEN: usize = 3;

/// A total order over text units whose `Equal` drives diff matching.
pub trait UnitComparator {
    fn compare(&self, a: &TextUnit, b: &TextUnit) -> Ordering;

    fn equal(&self, a: &TextUnit, b: &TextUnit) -> bool {
        self.compare(a, b) == Ordering::Equal
    }
}

/// Fixed ordering across referent status; `None` when both sides agree.
fn referent_order(a: &TextUnit, b: &TextUnit) -> Option<Ordering> {
    match (a.referent, b.referent) {
        (true, false) => Some(Ordering::Less),
        (false, true) => Some(Ordering::Greater),
        _ => None,
    }
}

/// Literal source-content identity.
#[derive(Debug, Clone, Copy)]
pub struct ExactComparator {
    /// Include inline codes in the compared text
    pub code_sensitive: bool,
}

impl ExactComparator {
    pub fn new(code_sensitive: bool) -> Self {
        Self { code_sensitive }
    }

    fn key(&self, unit: &TextUnit) -> String {
        if self.code_sensitive {
            unit.source.coded_text()
        } else {
            unit.source.plain_text()
        }
    }
}

impl UnitComparator for ExactComparator {
    fn compare(&self, a: &TextUnit, b: &TextUnit) -> Ordering {
        if let Some(ord) = referent_order(a, b) {
            return ord;
        }
        self.key(a).cmp(&self.key(b))
    }
}

/// Trigram-similarity equality with an exact-order fallback.
#[derive(Debug, Clone, Copy)]
pub struct FuzzyComparator {
    /// Dice score (0-100) at or above which two units are equal
    pub threshold: u8,
    exact: ExactComparator,
}

impl FuzzyComparator {
    pub fn new(threshold: u8, code_sensitive: bool) -> Self {
        Self {
            threshold,
            exact: ExactComparator::new(code_sensitive),
        }
    }
}

impl UnitComparator for FuzzyComparator {
    fn compare(&self, a: &TextUnit, b: &TextUnit) -> Ordering {
        if let Some(ord) = referent_order(a, b) {
            return ord;
        }
        // Fuzzy similarity works on visible text; codes are the exact
        // comparator's concern
        if dice(&a.source.plain_text(), &b.source.plain_text()) >= self.threshold {
            return Ordering::Equal;
        }
        self.exact.compare(a, b)
    }
}

/// Character trigrams over lowercase alphabetic runs. Runs shorter than the
/// trigram size contribute themselves, so short words still count.
pub fn ngrams(text: &str) -> BTreeSet<String> {
    let mut grams = BTreeSet::new();
    let lowered = text.to_lowercase();
    for run in lowered.split(|c: char| !c.is_alphabetic()) {
        if run.is_empty() {
            continue;
        }
        let chars: Vec<char> = run.chars().collect();
        if chars.len() < NGRAM_LEN {
            grams.insert(run.to_owned());
            continue;
        }
        for window in chars.windows(NGRAM_LEN) {
            grams.insert(window.iter().collect());
        }
    }
    grams
}

/// Dice similarity over the two texts' trigram sets, scaled to 0-100.
///
/// Symmetric by construction; identical texts score 100, texts sharing no
/// grams score 0. Two texts with no grams at all (both empty or pure
/// punctuation) count as identical only when their raw text matches.
pub fn dice(a: &str, b: &str) -> u8 {
    let grams_a = ngrams(a);
    let grams_b = ngrams(b);

    if grams_a.is_empty() && grams_b.is_empty() {
        return if a == b { 100 } else { 0 };
    }

    let shared = grams_a.intersection(&grams_b).count();
    let total = grams_a.len() + grams_b.len();
    ((2.0 * shared as f64 / total as f64) * 100.0).round() as u8
}
