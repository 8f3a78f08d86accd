//! Generalized sequence-alignment dynamic programming.
//!
//! Builds an (m+1) x (n+1) score table over two ordered element sequences,
//! then backtraces the globally best path into an ordered list of
//! [`AlignmentCell`]s. Each cell is a tagged state carrying only the fields
//! that state needs, so a consumer can never read a span range off a plain
//! 1-1 match.

use std::ops::Range;

use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::core::error::EngineError;
use crate::core::score::{ScoringStrategy, combined_score};

/// Admission-control ceiling on the DP table size. Inputs whose
/// m x n product exceeds this are rejected before any table is built.
pub const MAX_CELLS: usize = 80_000;

/// Widest window of consecutive elements one multi-match may collapse,
/// per side.
pub const MAX_SPAN: usize = 3;

/// Cost of leaving one element unpaired (an insert or delete step).
const GAP_PENALTY: f64 = 4.6;

/// Per-collapsed-element cost of a multi-match window. Scaling with the
/// window size keeps a wide window from beating a tighter one at equal fit.
const SPAN_PENALTY: f64 = 2.42;

/// One step of the best alignment path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum AlignmentCell {
    /// Element `source` corresponds to element `target`
    Match { source: usize, target: usize },
    /// Source element left unpaired
    Delete { source: usize },
    /// Target element left unpaired
    Insert { target: usize },
    /// A window of consecutive elements on each side collapsed into one
    /// correspondence
    MultiMatch {
        source: Range<usize>,
        target: Range<usize>,
    },
}

impl AlignmentCell {
    pub fn is_one_to_one(&self) -> bool {
        matches!(self, AlignmentCell::Match { .. })
    }
}

/// Backpointer per table cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    Start,
    Match,
    Delete,
    Insert,
    Multi { ds: usize, dt: usize },
}

/// Compute the best-scoring correspondence between two ordered sequences of
/// element texts.
///
/// Ties are broken by a fixed preference order: match, then delete, then
/// insert, then multi-match. An empty side yields a trivial all-insert or
/// all-delete alignment.
pub fn align(
    source: &[&str],
    target: &[&str],
    strategies: &[Box<dyn ScoringStrategy>],
) -> Result<Vec<AlignmentCell>, EngineError> {
    let m = source.len();
    let n = target.len();

    let cells = m.saturating_mul(n);
    if cells > MAX_CELLS {
        return Err(EngineError::AlignmentTooLarge {
            source_len: m,
            target_len: n,
            cells,
            ceiling: MAX_CELLS,
        });
    }

    let width = n + 1;
    let mut best = vec![f64::NEG_INFINITY; (m + 1) * width];
    let mut step = vec![Step::Start; (m + 1) * width];
    best[0] = 0.0;

    for i in 0..=m {
        for j in 0..=n {
            if i == 0 && j == 0 {
                continue;
            }
            let mut cell_best = f64::NEG_INFINITY;
            let mut cell_step = Step::Start;

            // Candidates in tie-break preference order; a later candidate
            // must be strictly better to replace an earlier one.
            if i > 0 && j > 0 {
                let s = best[(i - 1) * width + (j - 1)]
                    + combined_score(strategies, source[i - 1], target[j - 1]);
                if s > cell_best {
                    cell_best = s;
                    cell_step = Step::Match;
                }
            }
            if i > 0 {
                let s = best[(i - 1) * width + j] - GAP_PENALTY;
                if s > cell_best {
                    cell_best = s;
                    cell_step = Step::Delete;
                }
            }
            if j > 0 {
                let s = best[i * width + (j - 1)] - GAP_PENALTY;
                if s > cell_best {
                    cell_best = s;
                    cell_step = Step::Insert;
                }
            }
            for ds in 1..=MAX_SPAN.min(i) {
                for dt in 1..=MAX_SPAN.min(j) {
                    if ds == 1 && dt == 1 {
                        continue;
                    }
                    let joined_source = source[i - ds..i].iter().join(" ");
                    let joined_target = target[j - dt..j].iter().join(" ");
                    let penalty = SPAN_PENALTY * (ds + dt - 2) as f64;
                    let s = best[(i - ds) * width + (j - dt)]
                        + combined_score(strategies, &joined_source, &joined_target)
                        - penalty;
                    if s > cell_best {
                        cell_best = s;
                        cell_step = Step::Multi { ds, dt };
                    }
                }
            }

            best[i * width + j] = cell_best;
            step[i * width + j] = cell_step;
        }
    }

    // Backtrace from (m, n) to (0, 0)
    let mut path = Vec::new();
    let mut i = m;
    let mut j = n;
    while i > 0 || j > 0 {
        match step[i * width + j] {
            Step::Match => {
                path.push(AlignmentCell::Match {
                    source: i - 1,
                    target: j - 1,
                });
                i -= 1;
                j -= 1;
            }
            Step::Delete => {
                path.push(AlignmentCell::Delete { source: i - 1 });
                i -= 1;
            }
            Step::Insert => {
                path.push(AlignmentCell::Insert { target: j - 1 });
                j -= 1;
            }
            Step::Multi { ds, dt } => {
                path.push(AlignmentCell::MultiMatch {
                    source: (i - ds)..i,
                    target: (j - dt)..j,
                });
                i -= ds;
                j -= dt;
            }
            Step::Start => unreachable!("backtrace reached an unfilled cell"),
        }
    }
    path.reverse();
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::score::GaleChurchScorer;

    fn gale_church() -> Vec<Box<dyn ScoringStrategy>> {
        vec![Box::new(GaleChurchScorer::default())]
    }

    #[test]
    fn equal_pairs_align_one_to_one_in_order() {
        let source = ["Hello.", "Goodbye."];
        let target = ["Bonjour.", "Au revoir."];
        let path = align(&source, &target, &gale_church()).unwrap();
        assert_eq!(
            path,
            vec![
                AlignmentCell::Match {
                    source: 0,
                    target: 0
                },
                AlignmentCell::Match {
                    source: 1,
                    target: 1
                },
            ]
        );
    }

    #[test]
    fn merged_sentence_becomes_multi_match() {
        // B merges into A in translation: two source sentences map onto one
        let source = ["A.", "B.", "C."];
        let target = ["AB.", "C."];
        let path = align(&source, &target, &gale_church()).unwrap();
        assert_eq!(
            path,
            vec![
                AlignmentCell::MultiMatch {
                    source: 0..2,
                    target: 0..1
                },
                AlignmentCell::Match {
                    source: 2,
                    target: 1
                },
            ]
        );
    }

    #[test]
    fn empty_source_yields_all_inserts() {
        let source: [&str; 0] = [];
        let target = ["Un.", "Deux."];
        let path = align(&source, &target, &gale_church()).unwrap();
        assert_eq!(
            path,
            vec![
                AlignmentCell::Insert { target: 0 },
                AlignmentCell::Insert { target: 1 },
            ]
        );
    }

    #[test]
    fn empty_target_yields_all_deletes() {
        let source = ["One.", "Two."];
        let target: [&str; 0] = [];
        let path = align(&source, &target, &gale_church()).unwrap();
        assert_eq!(
            path,
            vec![
                AlignmentCell::Delete { source: 0 },
                AlignmentCell::Delete { source: 1 },
            ]
        );
    }

    #[test]
    fn oversized_input_is_rejected_before_computation() {
        let source: Vec<&str> = std::iter::repeat_n("s", 300).collect();
        let target: Vec<&str> = std::iter::repeat_n("t", 300).collect();
        let err = align(&source, &target, &gale_church()).unwrap_err();
        match err {
            EngineError::AlignmentTooLarge {
                source_len,
                target_len,
                cells,
                ceiling,
            } => {
                assert_eq!((source_len, target_len), (300, 300));
                assert_eq!(cells, 90_000);
                assert_eq!(ceiling, MAX_CELLS);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn boundary_size_is_accepted() {
        // 280 x 285 = 79,800 cells, just under the ceiling
        let source: Vec<&str> = std::iter::repeat_n("s.", 280).collect();
        let target: Vec<&str> = std::iter::repeat_n("t.", 285).collect();
        assert!(align(&source, &target, &gale_church()).is_ok());
    }

    #[test]
    fn score_tie_prefers_match_over_gap_pair() {
        // A scorer tuned so match exactly equals a delete-then-insert pair;
        // the fixed preference order must pick the match.
        struct Tied;
        impl ScoringStrategy for Tied {
            fn score(&self, _: &str, _: &str) -> f64 {
                -(GAP_PENALTY * 2.0)
            }
        }
        let strategies: Vec<Box<dyn ScoringStrategy>> = vec![Box::new(Tied)];
        let path = align(&["a"], &["b"], &strategies).unwrap();
        assert_eq!(
            path,
            vec![AlignmentCell::Match {
                source: 0,
                target: 0
            }]
        );
    }
}
