//! Sentence alignment orchestration.
//!
//! Drives the alignment matrix over one pair of segment sequences, turns
//! the backtraced cells into [`AlignedPair`]s, and merges the result back
//! into the text-unit model so source and target share one segmentation.
//! Non-1-1 correspondences are reported as warnings for a translator to
//! confirm, never as errors.

use anyhow::{Context as _, Result};
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::cli::{AlignArgs, AppContext};
use crate::core::codes::transfer_codes;
use crate::core::error::EngineError;
use crate::core::fragment::TextFragment;
use crate::core::matrix::{self, AlignmentCell};
use crate::core::score::{GaleChurchScorer, ScoringStrategy};
use crate::core::unit::{Content, LocaleId, Segment, Target, TextUnit};
use crate::infra::config::Settings;
use crate::infra::diag::Diagnostics;

/// One correspondence produced by sentence alignment. Either side may be
/// absent (1-0 / 0-1); a multi-match arrives with its window already joined
/// into one segment per side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlignedPair {
    pub source: Option<Segment>,
    pub target: Option<Segment>,
}

impl AlignedPair {
    pub fn is_one_to_one(&self) -> bool {
        self.source.is_some() && self.target.is_some()
    }
}

/// Sentence aligner configured once per invocation; holds the ordered
/// scoring-strategy list and the alignment options.
pub struct SentenceAligner {
    strategies: Vec<Box<dyn ScoringStrategy>>,
    one_to_one_only: bool,
    force_simple: bool,
    collapse_whitespace: bool,
}

impl SentenceAligner {
    pub fn new(settings: &Settings) -> Self {
        Self {
            strategies: vec![Box::new(GaleChurchScorer::default())],
            one_to_one_only: settings.output_one_to_one_only,
            force_simple: settings.force_simple_alignment,
            collapse_whitespace: settings.collapse_whitespace,
        }
    }

    /// Add a scoring strategy after the defaults; scores are summed in
    /// order.
    pub fn with_strategy(mut self, strategy: Box<dyn ScoringStrategy>) -> Self {
        self.strategies.push(strategy);
        self
    }

    /// Align two segment sequences into an ordered pair list.
    ///
    /// `unit_label` only feeds the warning messages emitted for non-1-1
    /// cells.
    pub fn align_segments(
        &self,
        source: &[Segment],
        target: &[Segment],
        unit_label: &str,
        diag: &mut Diagnostics,
    ) -> Result<Vec<AlignedPair>, EngineError> {
        let source = self.prepared(source);
        let target = self.prepared(target);

        if self.force_simple {
            return Ok(self.simple_pairs(&source, &target));
        }

        let source_texts: Vec<String> = source.iter().map(|s| s.fragment.plain_text()).collect();
        let target_texts: Vec<String> = target.iter().map(|s| s.fragment.plain_text()).collect();
        let cells = matrix::align(
            &source_texts.iter().map(String::as_str).collect::<Vec<_>>(),
            &target_texts.iter().map(String::as_str).collect::<Vec<_>>(),
            &self.strategies,
        )?;
        debug!(
            unit = unit_label,
            cells = cells.len(),
            "alignment path computed"
        );

        let mut pairs = Vec::with_capacity(cells.len());
        for cell in &cells {
            // Every non-1-1 cell gets a warning; in one-to-one-only mode it
            // is then dropped from the output entirely (a joined multi-match
            // would otherwise masquerade as a plain pair)
            if !cell.is_one_to_one() {
                diag.warn(Some(unit_label), describe_cell(cell, &source, &target));
                if self.one_to_one_only {
                    continue;
                }
            }
            match cell {
                AlignmentCell::Match { source: i, target: j } => pairs.push(AlignedPair {
                    source: Some(source[*i].clone()),
                    target: Some(target[*j].clone()),
                }),
                AlignmentCell::Delete { source: i } => pairs.push(AlignedPair {
                    source: Some(source[*i].clone()),
                    target: None,
                }),
                AlignmentCell::Insert { target: j } => pairs.push(AlignedPair {
                    source: None,
                    target: Some(target[*j].clone()),
                }),
                AlignmentCell::MultiMatch { source: si, target: tj } => pairs.push(AlignedPair {
                    source: Some(join_segments(&source[si.clone()])),
                    target: Some(join_segments(&target[tj.clone()])),
                }),
            }
        }
        Ok(pairs)
    }

    /// Positional pairing that explicitly skips the DP job: equal-length
    /// sequences pair index-by-index, anything else collapses each side to
    /// a single segment first.
    fn simple_pairs(&self, source: &[Segment], target: &[Segment]) -> Vec<AlignedPair> {
        if source.len() == target.len() {
            return source
                .iter()
                .zip(target)
                .map(|(s, t)| AlignedPair {
                    source: Some(s.clone()),
                    target: Some(t.clone()),
                })
                .collect();
        }
        vec![AlignedPair {
            source: Some(join_segments(source)),
            target: Some(join_segments(target)),
        }]
    }

    fn prepared(&self, segments: &[Segment]) -> Vec<Segment> {
        let mut out = segments.to_vec();
        if self.collapse_whitespace {
            for seg in &mut out {
                seg.fragment.collapse_whitespace();
            }
        }
        out
    }

    /// Call shape (a): both sequences live on one bilingual unit. The
    /// resulting pairs are merged back into the unit so both sides share
    /// one segmentation, with inline codes reconciled per pair.
    pub fn align_unit(
        &self,
        unit: &mut TextUnit,
        locale: &LocaleId,
        diag: &mut Diagnostics,
    ) -> Result<Vec<AlignedPair>, EngineError> {
        let target_segments = unit
            .target(locale)
            .map(|t| t.content.segments.clone())
            .unwrap_or_default();
        let label = unit.label().to_owned();
        let pairs = self.align_segments(&unit.source.segments, &target_segments, &label, diag)?;
        self.apply_pairs(unit, locale, &pairs, diag);
        Ok(pairs)
    }

    /// Call shape (b): the two sequences come from two monolingual units
    /// read in lockstep. Produces a bilingual unit carrying the aligned
    /// result.
    pub fn align_document_pair(
        &self,
        source_unit: &TextUnit,
        target_unit: &TextUnit,
        locale: &LocaleId,
        diag: &mut Diagnostics,
    ) -> Result<TextUnit, EngineError> {
        let mut aligned = source_unit.clone();
        aligned.set_target(
            locale.clone(),
            Target {
                content: target_unit.source.clone(),
                ..Target::default()
            },
        );
        self.align_unit(&mut aligned, locale, diag)?;
        Ok(aligned)
    }

    /// Align two whole documents read in lockstep. Unequal unit counts mean
    /// the streams desynchronized; the document is rejected as a whole.
    pub fn align_documents(
        &self,
        source_units: &[TextUnit],
        target_units: &[TextUnit],
        locale: &LocaleId,
        diag: &mut Diagnostics,
    ) -> Result<Vec<TextUnit>, EngineError> {
        if source_units.len() != target_units.len() {
            return Err(EngineError::Desynchronized {
                source_units: source_units.len(),
                target_units: target_units.len(),
            });
        }
        source_units
            .iter()
            .zip(target_units)
            .map(|(s, t)| self.align_document_pair(s, t, locale, diag))
            .collect()
    }

    /// Rebuild the unit's source and target contents from the pair list so
    /// both sides line up index-for-index, then reconcile codes on every
    /// pair that has both sides.
    fn apply_pairs(
        &self,
        unit: &mut TextUnit,
        locale: &LocaleId,
        pairs: &[AlignedPair],
        diag: &mut Diagnostics,
    ) {
        let mut source_segments = Vec::with_capacity(pairs.len());
        let mut target_segments = Vec::with_capacity(pairs.len());

        for (idx, pair) in pairs.iter().enumerate() {
            let id = idx.to_string();
            let source_frag = pair
                .source
                .as_ref()
                .map(|s| s.fragment.clone())
                .unwrap_or_default();
            let mut target_frag = pair
                .target
                .as_ref()
                .map(|s| s.fragment.clone())
                .unwrap_or_default();

            if pair.is_one_to_one() {
                if let Err(err) = transfer_codes(&mut target_frag, &source_frag, unit.label(), diag)
                {
                    // Tolerant by contract: the pair stays aligned, the
                    // codes stay as the translator left them
                    diag.error(Some(unit.label()), err.to_string());
                    target_frag =
                        pair.target.as_ref().map(|s| s.fragment.clone()).unwrap_or_default();
                }
            }

            source_segments.push(Segment::new(id.clone(), source_frag));
            target_segments.push(Segment::new(id, target_frag));
        }

        unit.source.segments = source_segments;
        let target = unit.target_or_default(locale);
        target.content.segments = target_segments;
    }
}

/// Warning text for a non-1-1 cell, naming the segments involved.
fn describe_cell(cell: &AlignmentCell, source: &[Segment], target: &[Segment]) -> String {
    match cell {
        AlignmentCell::Match { .. } => unreachable!("1-1 cells are not described"),
        AlignmentCell::Delete { source: i } => format!(
            "source segment '{}' has no aligned translation (1-0)",
            source[*i].id
        ),
        AlignmentCell::Insert { target: j } => format!(
            "target segment '{}' has no aligned source (0-1)",
            target[*j].id
        ),
        AlignmentCell::MultiMatch { source: si, target: tj } => format!(
            "multi-match: source segments {}..{} align to target segments {}..{}; \
             needs manual confirmation",
            si.start, si.end, tj.start, tj.end
        ),
    }
}

/// Join a run of segments into one, keeping the first id.
fn join_segments(segments: &[Segment]) -> Segment {
    let id = segments.first().map(|s| s.id.clone()).unwrap_or_else(|| "0".into());
    let mut fragment = TextFragment::new();
    for seg in segments {
        fragment.append(&seg.fragment);
    }
    Segment::new(id, fragment)
}

/// CLI entry point for the `align` command: read two plain-text documents
/// in lockstep, sentence-align them, and emit the aligned units as JSON.
pub fn run(args: AlignArgs, ctx: &AppContext) -> Result<()> {
    use crate::infra::reader;

    let source_path = reader::expand_path(&args.source);
    let target_path = reader::expand_path(&args.target);

    let mut source_units = reader::read_units(&source_path)
        .with_context(|| format!("read source document {}", source_path.display()))?;
    let mut target_units = reader::read_units(&target_path)
        .with_context(|| format!("read target document {}", target_path.display()))?;
    for unit in source_units.iter_mut().chain(target_units.iter_mut()) {
        reader::segment_unit(unit);
    }

    let settings = Settings {
        output_one_to_one_only: args.one_to_one,
        force_simple_alignment: args.force_simple,
        collapse_whitespace: args.collapse_whitespace,
        ..Settings::default()
    };
    let locale = LocaleId::new(&args.target_locale);
    let aligner = SentenceAligner::new(&settings);
    let mut diag = Diagnostics::new();

    let aligned = aligner.align_documents(&source_units, &target_units, &locale, &mut diag)?;

    let json = if args.compact {
        serde_json::to_string(&aligned)?
    } else {
        serde_json::to_string_pretty(&aligned)?
    };
    match &args.output {
        Some(path) => {
            std::fs::write(path, json).with_context(|| format!("write {}", path.display()))?;
            if !ctx.quiet {
                eprintln!("Wrote aligned output to {}", path.display());
            }
        }
        None => println!("{json}"),
    }

    if !ctx.quiet && !diag.is_empty() {
        let summary = diag
            .entries()
            .iter()
            .map(|d| d.message.as_str())
            .join("\n  ");
        eprintln!("{} alignment warning(s):\n  {summary}", diag.len());
    }
    Ok(())
}
