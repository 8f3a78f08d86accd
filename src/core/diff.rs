//! Comparator-driven list diff between two revisions of a document.
//!
//! A classic longest-common-subsequence table over the old and new unit
//! lists, except that "equal" is whatever the supplied [`UnitComparator`]
//! says: exact identity or fuzzy trigram similarity. The output is just
//! the matched index pairs, in document order; everything unmatched is an
//! insertion or deletion the caller does not need spelled out.

use crate::core::compare::UnitComparator;
use crate::core::unit::TextUnit;

/// Match old units against new units, returning ascending
/// `(old_index, new_index)` pairs.
pub fn match_units(
    old: &[TextUnit],
    new: &[TextUnit],
    comparator: &dyn UnitComparator,
) -> Vec<(usize, usize)> {
    let m = old.len();
    let n = new.len();
    if m == 0 || n == 0 {
        return Vec::new();
    }

    // LCS length table, (m+1) x (n+1)
    let width = n + 1;
    let mut lcs = vec![0usize; (m + 1) * width];
    for i in 1..=m {
        for j in 1..=n {
            lcs[i * width + j] = if comparator.equal(&old[i - 1], &new[j - 1]) {
                lcs[(i - 1) * width + (j - 1)] + 1
            } else {
                lcs[(i - 1) * width + j].max(lcs[i * width + (j - 1)])
            };
        }
    }

    // Backtrack into matched pairs. On a tie, stepping the old side first
    // keeps the choice deterministic and independent of content.
    let mut pairs = Vec::with_capacity(lcs[m * width + n]);
    let mut i = m;
    let mut j = n;
    while i > 0 && j > 0 {
        if comparator.equal(&old[i - 1], &new[j - 1])
            && lcs[i * width + j] == lcs[(i - 1) * width + (j - 1)] + 1
        {
            pairs.push((i - 1, j - 1));
            i -= 1;
            j -= 1;
        } else if lcs[(i - 1) * width + j] >= lcs[i * width + (j - 1)] {
            i -= 1;
        } else {
            j -= 1;
        }
    }
    pairs.reverse();
    pairs
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::compare::{ExactComparator, FuzzyComparator};

    fn units(texts: &[&str]) -> Vec<TextUnit> {
        texts
            .iter()
            .enumerate()
            .map(|(i, t)| TextUnit::new(format!("u{i}"), *t))
            .collect()
    }

    #[test]
    fn identical_lists_match_positionally() {
        let old = units(&["One.", "Two.", "Three."]);
        let new = units(&["One.", "Two.", "Three."]);
        let pairs = match_units(&old, &new, &ExactComparator::new(false));
        assert_eq!(pairs, vec![(0, 0), (1, 1), (2, 2)]);
    }

    #[test]
    fn inserted_paragraph_shifts_later_matches() {
        let old = units(&["One.", "Two."]);
        let new = units(&["One.", "Inserted.", "Two."]);
        let pairs = match_units(&old, &new, &ExactComparator::new(false));
        assert_eq!(pairs, vec![(0, 0), (1, 2)]);
    }

    #[test]
    fn deleted_paragraph_drops_out() {
        let old = units(&["One.", "Gone.", "Two."]);
        let new = units(&["One.", "Two."]);
        let pairs = match_units(&old, &new, &ExactComparator::new(false));
        assert_eq!(pairs, vec![(0, 0), (2, 1)]);
    }

    #[test]
    fn reordered_content_keeps_the_longest_run() {
        let old = units(&["A.", "B.", "C."]);
        let new = units(&["B.", "C.", "A."]);
        let pairs = match_units(&old, &new, &ExactComparator::new(false));
        assert_eq!(pairs, vec![(1, 0), (2, 1)]);
    }

    #[test]
    fn fuzzy_comparator_matches_edited_paragraphs() {
        let old = units(&["The cat sat.", "Unrelated paragraph."]);
        let new = units(&["The cat sits.", "Entirely different."]);
        let pairs = match_units(&old, &new, &FuzzyComparator::new(50, false));
        assert_eq!(pairs, vec![(0, 0)]);
    }

    #[test]
    fn empty_sides_produce_no_pairs() {
        let old = units(&["One."]);
        assert!(match_units(&old, &[], &ExactComparator::new(false)).is_empty());
        assert!(match_units(&[], &old, &ExactComparator::new(false)).is_empty());
    }
}
