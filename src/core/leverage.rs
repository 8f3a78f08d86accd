//! Paragraph-level leverage: recycle translations across document revisions.
//!
//! Matches the units of an old document revision against the new revision
//! with the list-diff engine, then, for every matched pair whose old unit
//! carries a target, reconciles inline codes and attaches the old
//! translation to the new unit as an alternate-translation candidate
//! (optionally copying it straight into the target). Anything the diff
//! did not match is left exactly as the upstream filter produced it.

use anyhow::{Context as _, Result};
use chrono::{DateTime, Utc};
use indicatif::ProgressBar;
use owo_colors::OwoColorize;
use rayon::prelude::*;
use serde::Serialize;
use tracing::debug;

use crate::cli::{AppContext, LeverageArgs};
use crate::core::codes::transfer_codes;
use crate::core::compare::{ExactComparator, FuzzyComparator, UnitComparator, dice};
use crate::core::diff::match_units;
use crate::core::error::EngineError;
use crate::core::files::{FileAligner, FileAlignment};
use crate::core::unit::{
    AltTranslation, Content, DiffMatch, LocaleId, MatchRecord, MatchType, TextUnit,
};
use crate::infra::config::Settings;
use crate::infra::diag::Diagnostics;

/// Identifier recorded as the origin of every annotation this step attaches.
pub const ORIGIN: &str = "diff-leverage";

/// Paragraph leverage configured once per invocation.
pub struct Leverager {
    fuzzy_threshold: u8,
    code_sensitive: bool,
    diff_only: bool,
    copy_to_target: bool,
}

impl Leverager {
    pub fn new(settings: &Settings) -> Self {
        Self {
            fuzzy_threshold: settings.fuzzy_threshold,
            code_sensitive: settings.code_sensitive,
            diff_only: settings.diff_only,
            copy_to_target: settings.copy_to_target,
        }
    }

    /// Threshold 100 means exact-only matching.
    fn exact_only(&self) -> bool {
        self.fuzzy_threshold >= 100
    }

    /// Leverage `old` onto `new` for one locale.
    ///
    /// Preconditions: every unit on both sides must be unsegmented. The
    /// engine compares whole paragraphs, and pre-segmented input would make
    /// the comparison silently wrong.
    pub fn leverage(
        &self,
        old: &[TextUnit],
        new: &mut [TextUnit],
        locale: &LocaleId,
        diag: &mut Diagnostics,
    ) -> Result<Vec<MatchRecord>, EngineError> {
        for unit in old.iter().chain(new.iter()) {
            if unit.source.is_segmented() {
                return Err(EngineError::AlreadySegmented {
                    unit_id: unit.id.clone(),
                });
            }
        }

        let comparator: Box<dyn UnitComparator> = if self.exact_only() {
            Box::new(ExactComparator::new(self.code_sensitive))
        } else {
            Box::new(FuzzyComparator::new(self.fuzzy_threshold, self.code_sensitive))
        };
        let pairs = match_units(old, new, comparator.as_ref());
        debug!(matched = pairs.len(), old = old.len(), new = new.len(), "units diffed");

        let mut records = Vec::with_capacity(pairs.len());
        for (old_index, new_index) in pairs {
            let old_unit = &old[old_index];

            // An old unit without a target for this locale has nothing to
            // leverage; the pair is skipped without comment
            let Some(old_target) = old_unit.target(locale) else {
                continue;
            };

            let (score, match_type) = self.score_pair(old_unit, &new[new_index]);
            let record = MatchRecord {
                old_index,
                new_index,
                score,
                match_type,
            };

            let new_unit = &mut new[new_index];
            if self.diff_only {
                // Review-only workflow: mark the match, copy nothing
                new_unit.target_or_default(locale).diff_match = Some(DiffMatch {
                    old_unit_id: old_unit.id.clone(),
                    score,
                    match_type,
                });
                records.push(record);
                continue;
            }

            let new_source = new_unit.source.whole_fragment();
            let mut leveraged = old_target.content.whole_fragment();
            if let Err(err) = transfer_codes(&mut leveraged, &new_source, new_unit.label(), diag) {
                // Broken coded text must never reach the output; fall back
                // to the unit's own source content
                diag.error(
                    Some(new_unit.label()),
                    format!("discarding leveraged text: {err}"),
                );
                leveraged = new_source.clone();
            }

            let target = new_unit.target_or_default(locale);
            target.alt_translations.push(AltTranslation {
                source: new_source,
                original_source: old_unit.source.whole_fragment(),
                target: leveraged.clone(),
                match_type,
                score,
                origin: ORIGIN.to_owned(),
            });
            if self.copy_to_target {
                target.content = Content::from_fragment(leveraged);
            }
            records.push(record);
        }
        Ok(records)
    }

    /// Similarity score and match type for one matched pair. Exact-only
    /// mode always scores 100; fuzzy mode recomputes the Dice coefficient
    /// on visible text.
    fn score_pair(&self, old_unit: &TextUnit, new_unit: &TextUnit) -> (u8, MatchType) {
        if self.exact_only() {
            return (100, MatchType::ExactPreviousVersion);
        }
        let score = dice(
            &old_unit.source.plain_text(),
            &new_unit.source.plain_text(),
        );
        let match_type = if score == 100 {
            MatchType::ExactPreviousVersion
        } else {
            MatchType::FuzzyPreviousVersion
        };
        (score, match_type)
    }
}

/// Per-file outcome in the leverage report.
#[derive(Debug, Serialize)]
pub struct FileOutcome {
    pub path: String,
    pub old_source: Option<String>,
    pub old_target: Option<String>,
    pub unit_count: usize,
    pub matches: Vec<MatchRecord>,
    pub warnings: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// The new revision's units, annotations attached, ready for a
    /// downstream export step
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub units: Vec<TextUnit>,
}

/// Machine-readable summary of one leverage run.
#[derive(Debug, Serialize)]
pub struct LeverageReport {
    pub schema_version: &'static str,
    pub generated_at: DateTime<Utc>,
    pub locale: String,
    pub fuzzy_threshold: u8,
    pub files: Vec<FileOutcome>,
}

/// CLI entry point for the `leverage` command: align the new tree against
/// the old tree(s), leverage each matched file pair (pairs run in
/// parallel), and write a JSON report.
pub fn run(args: LeverageArgs, ctx: &AppContext) -> Result<()> {
    use crate::infra::reader;

    let mut settings = Settings::load()?;
    if let Some(threshold) = args.threshold {
        settings.fuzzy_threshold = threshold;
    }
    settings.diff_only |= args.diff_only;
    settings.copy_to_target |= args.copy_to_target;
    settings.case_insensitive_paths |= args.case_insensitive;
    settings.ignore_patterns.extend(args.ignore.iter().cloned());
    settings.validate()?;

    let locale = LocaleId::new(&args.target_locale);

    let new_root = reader::expand_path(&args.new_root);
    let old_root = reader::expand_path(&args.old_root);
    let old_target_root = args.old_target_root.as_deref().map(reader::expand_path);

    let aligner = FileAligner::new(settings.case_insensitive_paths, &settings.ignore_patterns)?;
    let alignments = aligner.align_trees(&new_root, &old_root, old_target_root.as_deref())?;

    if !ctx.quiet {
        eprintln!(
            "Aligned {} file(s) under {}",
            alignments.len(),
            new_root.display()
        );
    }

    let progress = if ctx.quiet {
        ProgressBar::hidden()
    } else {
        ProgressBar::new(alignments.len() as u64)
    };

    let leverager = Leverager::new(&settings);
    let mut outcomes: Vec<FileOutcome> = alignments
        .par_iter()
        .map(|alignment| {
            let outcome = leverage_one_file(&leverager, alignment, &locale);
            progress.inc(1);
            outcome
        })
        .collect();
    progress.finish_and_clear();
    // Parallel collection preserves input order; sort anyway so the report
    // is stable under any future executor change
    outcomes.sort_by(|a, b| a.path.cmp(&b.path));

    let report = LeverageReport {
        schema_version: "1",
        generated_at: Utc::now(),
        locale: locale.to_string(),
        fuzzy_threshold: settings.fuzzy_threshold,
        files: outcomes,
    };

    if !ctx.dry_run {
        let output = reader::expand_path(&args.output);
        write_report_atomically(&report, &output)
            .with_context(|| format!("write report {}", output.display()))?;
        if !ctx.quiet {
            eprintln!("Wrote report to {}", output.display());
        }
    }

    print_summary(&report, ctx);
    Ok(())
}

/// Leverage one aligned file pair. Errors are recorded on the outcome, not
/// propagated: one broken document must not stop the rest of the batch.
fn leverage_one_file(
    leverager: &Leverager,
    alignment: &FileAlignment,
    locale: &LocaleId,
) -> FileOutcome {
    use crate::infra::reader;

    let mut outcome = FileOutcome {
        path: alignment.relative.clone(),
        old_source: alignment.old_source.as_ref().map(|p| p.to_string()),
        old_target: alignment.old_target.as_ref().map(|p| p.to_string()),
        unit_count: 0,
        matches: Vec::new(),
        warnings: 0,
        error: None,
        units: Vec::new(),
    };

    let mut diag = Diagnostics::new();
    let result = (|| -> Result<(Vec<TextUnit>, Vec<MatchRecord>)> {
        let mut new_units = reader::read_units(alignment.new_file.as_std_path())?;
        let Some(old_source) = &alignment.old_source else {
            // 1-0 record: nothing to leverage from
            return Ok((new_units, Vec::new()));
        };
        let mut old_units = reader::read_units(old_source.as_std_path())?;

        if let Some(old_target) = &alignment.old_target {
            // 1-1-1 record: the old translation lives in a separate file
            // read in lockstep with the old source
            let target_units = reader::read_units(old_target.as_std_path())?;
            if target_units.len() != old_units.len() {
                return Err(EngineError::Desynchronized {
                    source_units: old_units.len(),
                    target_units: target_units.len(),
                }
                .into());
            }
            for (unit, target_unit) in old_units.iter_mut().zip(&target_units) {
                unit.target_or_default(locale).content = target_unit.source.clone();
            }
        }

        let records = leverager.leverage(&old_units, &mut new_units, locale, &mut diag)?;
        Ok((new_units, records))
    })();

    match result {
        Ok((units, records)) => {
            outcome.unit_count = units.len();
            outcome.matches = records;
            outcome.units = units;
        }
        Err(err) => {
            tracing::error!(file = %alignment.relative, "leverage failed: {err:#}");
            outcome.error = Some(format!("{err:#}"));
        }
    }
    outcome.warnings = diag.len();
    outcome
}

/// Write the report through a temp file in the destination directory so a
/// crash never leaves a half-written report behind.
fn write_report_atomically(report: &LeverageReport, output: &std::path::Path) -> Result<()> {
    use std::io::Write as _;

    let dir = output.parent().filter(|p| !p.as_os_str().is_empty());
    let mut tmp = match dir {
        Some(dir) => tempfile::NamedTempFile::new_in(dir)?,
        None => tempfile::NamedTempFile::new_in(".")?,
    };
    serde_json::to_writer_pretty(&mut tmp, report)?;
    tmp.write_all(b"\n")?;
    tmp.persist(output)?;
    Ok(())
}

fn print_summary(report: &LeverageReport, ctx: &AppContext) {
    if ctx.quiet {
        return;
    }
    let matched: usize = report.files.iter().map(|f| f.matches.len()).sum();
    let warnings: usize = report.files.iter().map(|f| f.warnings).sum();
    let failed = report.files.iter().filter(|f| f.error.is_some()).count();

    let headline = format!(
        "Leverage complete: {} file(s), {} match(es), {} warning(s), {} failed",
        report.files.len(),
        matched,
        warnings,
        failed
    );
    if ctx.no_color {
        eprintln!("{headline}");
    } else if failed > 0 {
        eprintln!("{}", headline.yellow());
    } else {
        eprintln!("{}", headline.green());
    }
}
