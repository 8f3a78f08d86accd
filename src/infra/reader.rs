//! Minimal plain-text reader for the CLI driver.
//!
//! One non-empty line is one paragraph is one [`TextUnit`]; a small
//! regex-based sentence splitter upgrades a unit to sentence segments when
//! the aligner needs them. Real format filters live outside this crate and
//! feed the engine the same model through its public API.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use anyhow::{Context, Result};
use regex::Regex;

use crate::core::unit::{Segment, TextUnit};

/// Sentence boundary: terminator punctuation, optional closing quote or
/// bracket, then whitespace or end of text.
static SENTENCE_BOUNDARY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"[.!?]+["')\]]*(?:\s+|\z)"#).expect("valid boundary regex"));

/// Expand `~` and `$VAR` in a user-supplied path.
pub fn expand_path(path: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(path).into_owned())
}

/// Read a plain-text document into unsegmented units, one per non-empty
/// line, with ids `u1`, `u2`, ... in document order.
pub fn read_units(path: impl AsRef<Path>) -> Result<Vec<TextUnit>> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("read document {}", path.display()))?;

    let units = text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .enumerate()
        .map(|(idx, line)| TextUnit::new(format!("u{}", idx + 1), line))
        .collect();
    Ok(units)
}

/// Split one paragraph into sentences. Text without any terminator comes
/// back as a single sentence.
pub fn split_sentences(text: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut start = 0;
    for boundary in SENTENCE_BOUNDARY.find_iter(text) {
        let sentence = text[start..boundary.end()].trim();
        if !sentence.is_empty() {
            out.push(sentence.to_owned());
        }
        start = boundary.end();
    }
    let tail = text[start..].trim();
    if !tail.is_empty() {
        out.push(tail.to_owned());
    }
    out
}

/// Replace an unsegmented unit's source with sentence segments. Units that
/// are already segmented, carry codes, or hold a single sentence are left
/// alone.
pub fn segment_unit(unit: &mut TextUnit) {
    if unit.source.is_segmented() {
        return;
    }
    let whole = unit.source.whole_fragment();
    if whole.codes().next().is_some() {
        return;
    }
    let sentences = split_sentences(&whole.plain_text());
    if sentences.len() < 2 {
        return;
    }
    unit.source.segments = sentences
        .into_iter()
        .enumerate()
        .map(|(idx, sentence)| Segment::from_text(idx.to_string(), sentence))
        .collect();
}
